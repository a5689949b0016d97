use std::fmt;

use serde::{Deserialize, Serialize};

/// Port every non-terminal node continues through by default.
pub const OUTPUT_PORT: &str = "output";
/// Port the start node continues through.
pub const START_PORT: &str = "start";

/// Identifier of a node, unique within its graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Category of a scenario, declared once by its start node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventCategory(pub String);

impl EventCategory {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl Default for EventCategory {
    fn default() -> Self {
        Self("general".to_string())
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipUnit {
    Day,
    Week,
    Month,
}

/// Player resources a result node may edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Happiness,
    Money,
    Salary,
    /// Non-zero value means the player owns a pet.
    Pet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditMode {
    #[default]
    Add,
    Set,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceEdit {
    pub resource: Resource,
    #[serde(default)]
    pub mode: EditMode,
    pub value: i64,
}

impl ResourceEdit {
    pub fn add(resource: Resource, value: i64) -> Self {
        Self {
            resource,
            mode: EditMode::Add,
            value,
        }
    }

    pub fn set(resource: Resource, value: i64) -> Self {
        Self {
            resource,
            mode: EditMode::Set,
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightedOutcome {
    #[serde(default)]
    pub label: String,
    pub weight: u32,
}

/// Deferred continuation descriptor: `amount` units of `duration` from today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LateInfo {
    pub duration: SkipUnit,
    pub amount: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShopAction {
    Buy,
    Sell,
    Give,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    #[serde(default)]
    pub price: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopCart {
    pub action: ShopAction,
    pub item: Item,
}

/// Interpreted node kinds and their payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeKind {
    Start {
        #[serde(default)]
        event_type: EventCategory,
    },

    Message {
        #[serde(default)]
        image: Option<String>,
        text: String,
        #[serde(default)]
        choices: Vec<String>,
        #[serde(default)]
        speaker: Option<String>,
    },

    Prompt {
        #[serde(default)]
        text: String,
        #[serde(default)]
        choices: Vec<String>,
    },

    TimeSkip {
        unit: SkipUnit,
        amount: u32,
    },

    Result {
        #[serde(default)]
        actions: Vec<ResourceEdit>,
    },

    Random {
        #[serde(default)]
        outcomes: Vec<String>,
    },

    MultiRandom {
        #[serde(default)]
        outcomes: Vec<WeightedOutcome>,
    },

    LateResult {
        #[serde(default)]
        infos: Vec<LateInfo>,
    },

    Shop {
        #[serde(default)]
        carts: Vec<ShopCart>,
    },

    End,
}

impl NodeKind {
    pub fn short_name(&self) -> &'static str {
        match self {
            NodeKind::Start { .. } => "Start",
            NodeKind::Message { .. } => "Message",
            NodeKind::Prompt { .. } => "Prompt",
            NodeKind::TimeSkip { .. } => "TimeSkip",
            NodeKind::Result { .. } => "Result",
            NodeKind::Random { .. } => "Random",
            NodeKind::MultiRandom { .. } => "MultiRandom",
            NodeKind::LateResult { .. } => "LateResult",
            NodeKind::Shop { .. } => "Shop",
            NodeKind::End => "End",
        }
    }

    /// Whether `port` is an output slot this kind declares.
    pub fn has_port(&self, port: &str) -> bool {
        match self {
            NodeKind::Start { .. } => port == START_PORT,
            NodeKind::Message { choices, .. } | NodeKind::Prompt { choices, .. } => {
                port == OUTPUT_PORT || indexed_port(port, "choices", choices.len())
            }
            NodeKind::Random { outcomes } => indexed_port(port, "outcomes", outcomes.len()),
            NodeKind::MultiRandom { outcomes } => {
                indexed_port(port, "outcomes", outcomes.len())
            }
            NodeKind::LateResult { infos } => {
                port == OUTPUT_PORT || indexed_port(port, "infos", infos.len())
            }
            NodeKind::TimeSkip { .. } | NodeKind::Result { .. } | NodeKind::Shop { .. } => {
                port == OUTPUT_PORT
            }
            NodeKind::End => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    #[serde(flatten)]
    pub kind: NodeKind,
}

impl Node {
    pub fn new(id: impl Into<NodeId>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

pub fn choice_port(index: usize) -> String {
    format!("choices {}", index)
}

pub fn info_port(index: usize) -> String {
    format!("infos {}", index)
}

pub fn outcome_port(index: usize) -> String {
    format!("outcomes {}", index)
}

fn indexed_port(port: &str, list: &str, len: usize) -> bool {
    port.strip_prefix(list)
        .and_then(|rest| rest.strip_prefix(' '))
        .and_then(|index| index.parse::<usize>().ok())
        .is_some_and(|index| index < len)
}
