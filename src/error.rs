//! Error types shared by the engine.
//!
//! Nothing here is fatal: decode failures are recovered by the sessions
//! (demo dataset), color failures by the accent color, and store failures are
//! reported back to the UI thread as values.

use thiserror::Error;

use crate::canvas::ItemId;
use crate::graph::VertexId;

/// A state payload could not be decoded.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed state json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("state json is not an object")]
    NotAnObject,
    #[error("malformed nested graph data: {0}")]
    NestedData(serde_json::Error),
}

/// A color string is not `#rrggbb` / `#aarrggbb`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ColorError {
    #[error("color must start with '#'")]
    MissingHash,
    #[error("color has {0} hex digits, expected 6 or 8")]
    BadLength(usize),
    #[error("color {0:?} contains a non-hex digit")]
    BadDigit(String),
}

/// A mutation referenced something that does not exist or would break an invariant.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("no board item with id {0}")]
    UnknownItem(ItemId),
    #[error("no graph vertex with id {0}")]
    UnknownVertex(VertexId),
    #[error("an entity cannot be connected to itself")]
    SelfConnection,
    #[error("an edge between these vertices already exists")]
    DuplicateEdge,
    #[error("vertex id {0} is already taken")]
    DuplicateVertexId(VertexId),
    #[error("no connection has been started")]
    NoPendingConnection,
}

/// Failure reported by a [`crate::persistence::StateStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("store payload is not valid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no stored state named {0}")]
    NotFound(String),
    #[error("persistence worker is no longer running")]
    WorkerGone,
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot access settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid toml settings: {0}")]
    TomlDecode(#[from] toml::de::Error),
    #[error("cannot encode toml settings: {0}")]
    TomlEncode(#[from] toml::ser::Error),
    #[error("invalid json settings: {0}")]
    Json(#[from] serde_json::Error),
}
