//! Fetch-then-render pipeline for the CREST explorer.
//!
//! The core crate is pure; this crate adds the I/O around it:
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`transport`] | [`Transport`] trait and its `reqwest` implementation |
//! | [`explorer`] | [`Explorer`]: OPTIONS → GET → render, with stale-result discard |
//! | [`refresh`] | Timer-driven re-rendering of the current address |
//! | [`config`] | [`ExplorerConfig`] from `CREST_*` environment variables |
//!
//! ```rust,ignore
//! let config = ExplorerConfig::from_env();
//! let explorer = Explorer::from_config(&config)?;
//! if let Some(page) = explorer.navigate("#https://crest-tq.eveonline.com/").await? {
//!     print!("{}", crestexplorer::present::to_text(&page.tree));
//! }
//! ```

pub mod config;
pub mod explorer;
pub mod refresh;
pub mod transport;

pub use config::ExplorerConfig;
pub use explorer::{Explorer, Page, PaneState};
pub use transport::{Fetched, HttpTransport, Transport};
