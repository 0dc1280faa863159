use thiserror::Error;
use uuid::Uuid;

use crate::model::port::PortAddress;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config parsing error: {0}")]
    Config(#[from] toml::de::Error),
    #[error("Node not found: {0}")]
    UnknownNode(Uuid),
    #[error("Node {node_id} has no port {port}")]
    UnknownPort { node_id: Uuid, port: PortAddress },
    #[error("Node {0} cannot be connected to itself")]
    SelfConnection(Uuid),
    #[error("Graph has a cycle through node {0}")]
    Cycle(Uuid),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl EngineError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        EngineError::InvalidArgument(msg.into())
    }
}

/// Failures reported by a media provider. These never reach evaluation
/// results; the node keeps its previous output and the error is logged.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MediaError {
    #[error("Unsupported content type: {0}")]
    Unsupported(String),
    #[error("Media load failed: {0}")]
    Load(String),
    #[error("Media request was cancelled")]
    Cancelled,
}
