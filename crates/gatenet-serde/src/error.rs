//! Error types for circuit files and exports.

use std::io;
use std::path::PathBuf;

use gatenet_core::NodeId;
use thiserror::Error;

/// Errors that can occur while reading or writing files.
#[derive(Debug, Error)]
pub enum SerdeError {
    /// Filesystem failure.
    #[error("{action} {path}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Payload is not a valid circuit document.
    #[error("invalid circuit document: {0}")]
    Json(#[from] serde_json::Error),

    /// Encoder produced bytes that are not UTF-8.
    #[error("encoded circuit is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Export requested for a node that is not in the graph.
    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    /// Export requested while the output value is unknown.
    #[error("output {0} has no resolved value")]
    UnresolvedOutput(NodeId),
}

impl SerdeError {
    pub(crate) fn read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            action: "failed to read",
            path: path.into(),
            source,
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            action: "failed to write",
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, SerdeError>;
