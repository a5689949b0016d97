use thiserror::Error;

use crate::model::node::NodeId;

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("graph '{graph}' has no start node")]
    NoStartNode { graph: String },

    #[error("graph '{graph}' has {count} start nodes, expected exactly one")]
    MultipleStartNodes { graph: String, count: usize },

    #[error("graph '{graph}' declares node '{node}' twice")]
    DuplicateNode { graph: String, node: NodeId },

    #[error("graph '{graph}' references unknown node '{node}'")]
    UnknownNode { graph: String, node: NodeId },

    #[error("node '{node}' has no port named '{port}'")]
    InvalidPort { node: NodeId, port: String },

    #[error("port '{port}' of node '{node}' is already connected")]
    PortAlreadyConnected { node: NodeId, port: String },

    #[error("invalid graph document: {0}")]
    Parse(#[from] serde_json::Error),
}
