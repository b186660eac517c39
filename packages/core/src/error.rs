//! The error type shared by every stage of a navigation.

use thiserror::Error;

/// Errors that end a navigation attempt.
///
/// All variants are terminal for the attempt that produced them; nothing is
/// retried automatically. [`ExplorerError::SchemaLookupMiss`] is the one
/// advisory case: callers degrade to schema-less rendering instead of failing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExplorerError {
    /// The address is relative, fragment-only, or not an `http(s)` URI.
    #[error("addresses must be absolute http(s) URIs, got {0:?}")]
    NonAbsoluteUri(String),

    /// The request failed in transit or the server answered with a non-2xx status.
    #[error("transport error: {0}")]
    Transport(String),

    /// The OAuth callback's `state` does not match the stored CSRF token.
    #[error("CSRF token mismatch")]
    CsrfMismatch,

    /// The received media type has no entry in the schema's `GET` mapping.
    #[error("no GET schema for media type {0:?}")]
    SchemaLookupMiss(String),

    /// The OPTIONS payload could not be turned into a schema descriptor.
    #[error("invalid schema description: {0}")]
    InvalidSchema(String),
}
