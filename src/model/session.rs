use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::model::graph::EventGraph;
use crate::model::node::{EventCategory, Node, NodeId};

/// What a paused session is waiting for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Suspension {
    /// A message node awaiting the player's pick among `choices` options.
    Choice { node: NodeId, choices: usize },
    /// A time skip node awaiting the calendar's advance to finish.
    TimeAdvance { node: NodeId },
}

impl Suspension {
    pub fn node(&self) -> &NodeId {
        match self {
            Suspension::Choice { node, .. } | Suspension::TimeAdvance { node } => node,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Running,
    Paused(Suspension),
}

/// Transient state of the one active scenario.
#[derive(Debug, Clone)]
pub struct Session {
    pub graph: Arc<EventGraph>,
    /// `None` once the graph ran out of connections.
    pub current: Option<NodeId>,
    pub category: EventCategory,
    /// Remaining settling time after a resume before the next node runs.
    pub settle: Option<Duration>,
}

impl Session {
    pub fn new(graph: Arc<EventGraph>, current: NodeId, category: EventCategory) -> Self {
        Self {
            graph,
            current: Some(current),
            category,
            settle: None,
        }
    }

    pub fn current_node(&self) -> Option<&Node> {
        self.current.as_ref().and_then(|id| self.graph.node(id))
    }
}

/// Read-only view of the interpreter handed to hosts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterpreterStatus {
    pub phase: Phase,
    pub scenario: Option<String>,
    pub current_node: Option<NodeId>,
    pub category: Option<EventCategory>,
    pub pending_late_events: usize,
}
