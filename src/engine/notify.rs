use std::sync::mpsc::{self, Receiver, Sender};

use serde::{Deserialize, Serialize};

use crate::model::node::EventCategory;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "category", rename_all = "snake_case")]
pub enum ScenarioNotification {
    Started(EventCategory),
    Finished(EventCategory),
}

/// Fire-and-forget fan-out of scenario notifications.
#[derive(Debug, Default)]
pub struct Notifier {
    subscribers: Vec<Sender<ScenarioNotification>>,
}

impl Notifier {
    pub fn subscribe(&mut self) -> Receiver<ScenarioNotification> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn emit(&mut self, notification: ScenarioNotification) {
        // Subscribers that dropped their receiver are forgotten.
        self.subscribers
            .retain(|tx| tx.send(notification.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
