pub mod graph;
pub mod graph_asset;
pub mod late_queue;
pub mod node;
pub mod session;
