//! Scenario director
//!
//! Interprets branching event graphs (dialog, random branches, time skips,
//! shop transactions) inside a host simulation loop, one scenario at a time.

pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod ui;

pub use config::{DirectorConfig, InterpreterConfig};
pub use engine::director::Director;
pub use engine::host::{Calendar, DialogDisplay, DialogPayload, Economy, Host};
pub use engine::interpreter::Interpreter;
pub use engine::notify::ScenarioNotification;
pub use error::GraphError;
pub use model::graph::EventGraph;
