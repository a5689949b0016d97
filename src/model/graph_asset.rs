use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::model::graph::EventGraph;
use crate::model::node::{Node, NodeId};

/// Authored, on-disk form of an event graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphAsset {
    pub name: String,
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub connections: Vec<Connection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connection {
    pub from: NodeId,
    pub port: String,
    pub to: NodeId,
}

impl GraphAsset {
    pub fn into_graph(self) -> Result<EventGraph> {
        let builder = self
            .nodes
            .into_iter()
            .fold(EventGraph::builder(self.name), |builder, node| {
                builder.node(node.id, node.kind)
            });

        self.connections
            .into_iter()
            .fold(builder, |builder, c| builder.connect(c.from, c.port, c.to))
            .build()
    }
}

impl EventGraph {
    pub fn from_json(json: &str) -> Result<EventGraph> {
        let asset: GraphAsset = serde_json::from_str(json)?;
        asset.into_graph()
    }
}

pub fn load_graph(path: &Path) -> anyhow::Result<EventGraph> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read graph {}", path.display()))?;

    EventGraph::from_json(&json).with_context(|| format!("failed to load graph {}", path.display()))
}

/// Loads every `*.json` graph in `dir`, sorted by file name.
pub fn load_graph_dir(dir: &Path) -> anyhow::Result<Vec<EventGraph>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("failed to list {}", dir.display()))? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            paths.push(path);
        }
    }
    paths.sort();

    paths
        .iter()
        .map(|path| {
            debug!(path = %path.display(), "loading scenario graph");
            load_graph(path)
        })
        .collect()
}
