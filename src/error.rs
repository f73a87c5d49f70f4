//! Error types for landmarks operations.

use thiserror::Error;

use crate::dom::ArenaNodeId;

/// Errors that can occur while loading or building a document.
///
/// Extraction itself never fails; these only surface from document
/// construction, I/O and serialization.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Node not found: {0:?}")]
    NodeNotFound(ArenaNodeId),

    #[error("Element <{0}> cannot host a shadow root")]
    InvalidShadowHost(String),

    #[error("Shadow root already attached to {0:?}")]
    ShadowRootExists(ArenaNodeId),

    #[error("Not a slot element: {0:?}")]
    NotASlot(ArenaNodeId),

    #[cfg(feature = "serde")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
