use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use chrono::NaiveDate;

use crate::model::graph::EventGraph;
use crate::model::node::{EventCategory, NodeId};

/// A node to resume processing from, in the graph that owns it.
#[derive(Debug, Clone)]
pub struct LateContinuation {
    pub graph: Arc<EventGraph>,
    pub node: NodeId,
    /// Category of the scenario that scheduled this continuation.
    pub category: EventCategory,
}

#[derive(Debug, Default)]
pub struct LateEventQueue {
    buckets: BTreeMap<NaiveDate, VecDeque<LateContinuation>>,
}

impl LateEventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, date: NaiveDate, continuation: LateContinuation) {
        self.buckets.entry(date).or_default().push_back(continuation);
    }

    /// Removes the earliest continuation due on or before `today`.
    pub fn pop_due(&mut self, today: NaiveDate) -> Option<(NaiveDate, LateContinuation)> {
        let mut entry = self.buckets.first_entry()?;
        let date = *entry.key();
        if date > today {
            return None;
        }

        let continuation = entry.get_mut().pop_front();
        if entry.get().is_empty() {
            entry.remove();
        }
        continuation.map(|c| (date, c))
    }

    pub fn pending_on(&self, date: NaiveDate) -> usize {
        self.buckets.get(&date).map_or(0, VecDeque::len)
    }

    pub fn len(&self) -> usize {
        self.buckets.values().map(VecDeque::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::node::NodeKind;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn continuation(graph: &Arc<EventGraph>, node: &str) -> LateContinuation {
        LateContinuation {
            graph: Arc::clone(graph),
            node: NodeId::new(node),
            category: EventCategory::default(),
        }
    }

    fn graph() -> Arc<EventGraph> {
        Arc::new(
            EventGraph::builder("late")
                .node(
                    "start",
                    NodeKind::Start {
                        event_type: EventCategory::default(),
                    },
                )
                .node("a", NodeKind::End)
                .node("b", NodeKind::End)
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn pop_due_is_date_then_insertion_ordered() {
        let g = graph();
        let mut queue = LateEventQueue::new();
        queue.schedule(date(2024, 3, 1), continuation(&g, "b"));
        queue.schedule(date(2024, 2, 1), continuation(&g, "a"));
        queue.schedule(date(2024, 2, 1), continuation(&g, "b"));

        assert_eq!(queue.len(), 3);
        assert!(queue.pop_due(date(2024, 1, 31)).is_none());

        let (due, first) = queue.pop_due(date(2024, 2, 1)).unwrap();
        assert_eq!(due, date(2024, 2, 1));
        assert_eq!(first.node.as_str(), "a");

        let (_, second) = queue.pop_due(date(2024, 2, 1)).unwrap();
        assert_eq!(second.node.as_str(), "b");

        assert!(queue.pop_due(date(2024, 2, 20)).is_none());
        assert_eq!(queue.pending_on(date(2024, 3, 1)), 1);
    }
}
