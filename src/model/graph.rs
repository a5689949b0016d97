use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::warn;

use crate::error::{GraphError, Result};
use crate::model::node::{outcome_port, Node, NodeId, NodeKind, OUTPUT_PORT};

#[derive(Debug, Clone)]
pub struct EventGraph {
    name: String,
    nodes: Vec<Node>,
    index: HashMap<NodeId, usize>,
    /// Outgoing connections keyed by source node, then port name.
    connections: HashMap<NodeId, BTreeMap<String, NodeId>>,
    start: usize,
}

impl EventGraph {
    pub fn builder(name: impl Into<String>) -> EventGraphBuilder {
        EventGraphBuilder {
            name: name.into(),
            nodes: Vec::new(),
            connections: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn start_node(&self) -> Result<&Node> {
        self.nodes
            .get(self.start)
            .filter(|node| matches!(node.kind, NodeKind::Start { .. }))
            .ok_or_else(|| GraphError::NoStartNode {
                graph: self.name.clone(),
            })
    }

    /// Node connected to `port` of `from`. `None` is a valid terminal.
    pub fn next_node(&self, from: &NodeId, port: &str) -> Option<&Node> {
        self.connections
            .get(from)
            .and_then(|ports| ports.get(port))
            .and_then(|to| self.node(to))
    }

    pub fn next_node_by_output(&self, from: &NodeId) -> Option<&Node> {
        self.next_node(from, OUTPUT_PORT)
    }

    /// Uniform pick among the connected outcome ports of a random node.
    pub fn next_node_by_random<R: Rng + ?Sized>(&self, from: &NodeId, rng: &mut R) -> Option<&Node> {
        let candidates: Vec<&Node> = self
            .outcome_targets(from)
            .into_iter()
            .map(|(node, _)| node)
            .collect();

        candidates.choose(rng).copied()
    }

    /// Weighted pick among the connected outcome ports of a multi-random node.
    pub fn next_node_by_multi_random<R: Rng + ?Sized>(
        &self,
        from: &NodeId,
        rng: &mut R,
    ) -> Option<&Node> {
        let candidates = self.outcome_targets(from);
        if candidates.is_empty() {
            return None;
        }

        match WeightedIndex::new(candidates.iter().map(|(_, weight)| *weight)) {
            Ok(dist) => Some(candidates[dist.sample(rng)].0),
            Err(_) => {
                warn!(
                    graph = %self.name,
                    node = %from,
                    "all connected outcomes have zero weight, picking uniformly"
                );
                candidates.choose(rng).map(|(node, _)| *node)
            }
        }
    }

    /// Connected outcome targets with their weights, in port order.
    fn outcome_targets(&self, from: &NodeId) -> Vec<(&Node, u32)> {
        let weights: Vec<u32> = match self.node(from).map(|node| &node.kind) {
            Some(NodeKind::Random { outcomes }) => vec![1; outcomes.len()],
            Some(NodeKind::MultiRandom { outcomes }) => {
                outcomes.iter().map(|outcome| outcome.weight).collect()
            }
            _ => return Vec::new(),
        };

        weights
            .into_iter()
            .enumerate()
            .filter_map(|(i, weight)| {
                self.next_node(from, &outcome_port(i))
                    .map(|node| (node, weight))
            })
            .collect()
    }

    fn reaches_end(&self) -> bool {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([self.start]);

        while let Some(i) = queue.pop_front() {
            if !seen.insert(i) {
                continue;
            }
            let node = &self.nodes[i];
            if matches!(node.kind, NodeKind::End) {
                return true;
            }
            if let Some(ports) = self.connections.get(&node.id) {
                queue.extend(ports.values().filter_map(|to| self.index.get(to).copied()));
            }
        }

        false
    }
}

pub struct EventGraphBuilder {
    name: String,
    nodes: Vec<Node>,
    connections: Vec<(NodeId, String, NodeId)>,
}

impl EventGraphBuilder {
    pub fn node(mut self, id: impl Into<NodeId>, kind: NodeKind) -> Self {
        self.nodes.push(Node::new(id, kind));
        self
    }

    pub fn connect(
        mut self,
        from: impl Into<NodeId>,
        port: impl Into<String>,
        to: impl Into<NodeId>,
    ) -> Self {
        self.connections.push((from.into(), port.into(), to.into()));
        self
    }

    pub fn build(self) -> Result<EventGraph> {
        let name = self.name;

        let mut index = HashMap::with_capacity(self.nodes.len());
        for (i, node) in self.nodes.iter().enumerate() {
            if index.insert(node.id.clone(), i).is_some() {
                return Err(GraphError::DuplicateNode {
                    graph: name,
                    node: node.id.clone(),
                });
            }
        }

        let starts: Vec<usize> = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| matches!(node.kind, NodeKind::Start { .. }))
            .map(|(i, _)| i)
            .collect();
        let start = match starts.as_slice() {
            [] => return Err(GraphError::NoStartNode { graph: name }),
            [start] => *start,
            many => {
                return Err(GraphError::MultipleStartNodes {
                    graph: name,
                    count: many.len(),
                })
            }
        };

        let mut connections: HashMap<NodeId, BTreeMap<String, NodeId>> = HashMap::new();
        for (from, port, to) in self.connections {
            let Some(&from_index) = index.get(&from) else {
                return Err(GraphError::UnknownNode { graph: name, node: from });
            };
            if !index.contains_key(&to) {
                return Err(GraphError::UnknownNode { graph: name, node: to });
            }
            if !self.nodes[from_index].kind.has_port(&port) {
                return Err(GraphError::InvalidPort { node: from, port });
            }

            let ports = connections.entry(from.clone()).or_default();
            if ports.contains_key(&port) {
                return Err(GraphError::PortAlreadyConnected { node: from, port });
            }
            ports.insert(port, to);
        }

        let graph = EventGraph {
            name,
            nodes: self.nodes,
            index,
            connections,
            start,
        };

        if !graph.reaches_end() {
            warn!(graph = %graph.name, "no end node is reachable from the start node");
        }

        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::model::node::{choice_port, EventCategory, WeightedOutcome, START_PORT};

    fn start() -> NodeKind {
        NodeKind::Start {
            event_type: EventCategory::default(),
        }
    }

    fn message(choices: &[&str]) -> NodeKind {
        NodeKind::Message {
            image: None,
            text: "hello".into(),
            choices: choices.iter().map(|c| c.to_string()).collect(),
            speaker: None,
        }
    }

    #[test]
    fn start_node_and_next_node() {
        let graph = EventGraph::builder("greeting")
            .node("start", start())
            .node("msg", message(&["A"]))
            .node("end", NodeKind::End)
            .connect("start", START_PORT, "msg")
            .connect("msg", choice_port(0), "end")
            .build()
            .unwrap();

        let first = graph.start_node().unwrap();
        assert_eq!(first.id, NodeId::new("start"));

        let next = graph.next_node(&first.id, START_PORT).unwrap();
        assert_eq!(next.id, NodeId::new("msg"));
        assert_eq!(
            graph.next_node(&next.id, "choices 0").map(|n| n.id.as_str()),
            Some("end")
        );
        assert!(graph.next_node(&next.id, OUTPUT_PORT).is_none());
    }

    #[test]
    fn graph_without_start_is_rejected() {
        let err = EventGraph::builder("empty")
            .node("end", NodeKind::End)
            .build()
            .unwrap_err();
        assert!(matches!(err, GraphError::NoStartNode { .. }));
    }

    #[test]
    fn two_start_nodes_are_rejected() {
        let err = EventGraph::builder("twice")
            .node("a", start())
            .node("b", start())
            .build()
            .unwrap_err();
        assert!(matches!(err, GraphError::MultipleStartNodes { count: 2, .. }));
    }

    #[test]
    fn ports_cannot_fan_out() {
        let err = EventGraph::builder("fan")
            .node("start", start())
            .node("a", NodeKind::End)
            .node("b", NodeKind::End)
            .connect("start", START_PORT, "a")
            .connect("start", START_PORT, "b")
            .build()
            .unwrap_err();
        assert!(matches!(err, GraphError::PortAlreadyConnected { .. }));
    }

    #[test]
    fn undeclared_port_is_rejected() {
        let err = EventGraph::builder("bad-port")
            .node("start", start())
            .node("msg", message(&["A"]))
            .node("end", NodeKind::End)
            .connect("start", START_PORT, "msg")
            .connect("msg", "choices 3", "end")
            .build()
            .unwrap_err();
        assert!(matches!(err, GraphError::InvalidPort { .. }));
    }

    #[test]
    fn unreachable_end_is_not_fatal() {
        let graph = EventGraph::builder("dangling")
            .node("start", start())
            .node("end", NodeKind::End)
            .build();
        assert!(graph.is_ok());
    }

    #[test]
    fn random_only_picks_connected_outcomes() {
        let graph = EventGraph::builder("coin")
            .node("start", start())
            .node(
                "coin",
                NodeKind::Random {
                    outcomes: vec!["heads".into(), "tails".into()],
                },
            )
            .node("heads", NodeKind::End)
            .connect("start", START_PORT, "coin")
            .connect("coin", outcome_port(0), "heads")
            .build()
            .unwrap();

        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let next = graph.next_node_by_random(&NodeId::new("coin"), &mut rng);
            assert_eq!(next.map(|n| n.id.as_str()), Some("heads"));
        }
    }

    #[test]
    fn multi_random_respects_zero_weight() {
        let graph = EventGraph::builder("loaded")
            .node("start", start())
            .node(
                "dice",
                NodeKind::MultiRandom {
                    outcomes: vec![
                        WeightedOutcome { label: "never".into(), weight: 0 },
                        WeightedOutcome { label: "always".into(), weight: 5 },
                    ],
                },
            )
            .node("never", NodeKind::End)
            .node("always", NodeKind::End)
            .connect("start", START_PORT, "dice")
            .connect("dice", outcome_port(0), "never")
            .connect("dice", outcome_port(1), "always")
            .build()
            .unwrap();

        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let next = graph.next_node_by_multi_random(&NodeId::new("dice"), &mut rng);
            assert_eq!(next.map(|n| n.id.as_str()), Some("always"));
        }
    }

    #[test]
    fn multi_random_without_connections_is_terminal() {
        let graph = EventGraph::builder("nothing")
            .node("start", start())
            .node(
                "dice",
                NodeKind::MultiRandom {
                    outcomes: vec![WeightedOutcome { label: "x".into(), weight: 1 }],
                },
            )
            .connect("start", START_PORT, "dice")
            .build()
            .unwrap();

        let mut rng = StdRng::seed_from_u64(3);
        assert!(graph
            .next_node_by_multi_random(&NodeId::new("dice"), &mut rng)
            .is_none());
    }
}
