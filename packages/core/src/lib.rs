//! Pure-logic core of the CREST explorer.
//!
//! A read-only, schema-driven browser for JSON APIs that follow the
//! hypermedia link convention: related resources are embedded as
//! `{ "href": …, "name": … }` objects, and each resource describes its
//! representations through an OPTIONS-derived JSON Schema.
//!
//! This crate has **no I/O**. It compiles to native Rust and to WebAssembly
//! unchanged; the `crestexplorer-client` crate and the WASM bindings do the
//! fetching and hand the results in here.
//!
//! # Crate layout
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`link`] | [`is_link`] classifier and link label policy |
//! | [`render`] | [`build_element`]: JSON value + schema fragment → [`DisplayNode`] |
//! | [`schema`] | [`Schema`] descriptors, [`SchemaResolver`], fragment lookups |
//! | [`media`] | Content-Type normalization, representation selection, schema artifact |
//! | [`address`] | `#<uri>[#<media-type>]` address fragments |
//! | [`auth`] | OAuth implicit-grant URL and CSRF-checked callback parsing |
//! | [`navigation`] | [`Navigator`]: per-session state and stale-response tickets |
//! | [`present`] | Text and HTML adapters over a [`DisplayNode`] tree |
//!
//! # Quick start
//!
//! ```rust,ignore
//! use crestexplorer::{build_element, present, DescriptorResolver, SchemaResolver};
//!
//! let schema = DescriptorResolver.resolve(&options_body)?;
//! let rep = crestexplorer::select_representation(&schema, &content_type, uri);
//! let tree = build_element(&body, rep.fragment);
//! print!("{}", present::to_text(&tree));
//! ```

pub mod address;
pub mod auth;
pub mod error;
pub mod link;
pub mod media;
pub mod navigation;
pub mod present;
pub mod render;
pub mod schema;

pub use address::Address;
pub use auth::{AuthorizationRequest, OAuthCallback};
pub use error::ExplorerError;
pub use link::{is_link, Link};
pub use media::{
    media_type_from_content_type, representation_from_media_type, schema_file_name,
    select_representation, Representation, RepresentationOption,
};
pub use navigation::{Navigator, Ticket};
pub use render::{build_element, DisplayNode, Item};
pub use schema::{DescriptorResolver, Schema, SchemaResolver};
