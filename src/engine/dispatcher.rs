use std::sync::Arc;

use chrono::{Duration, Months, NaiveDate};
use rand::Rng;
use tracing::{debug, error, info, warn};

use crate::engine::host::{DialogPayload, Host};
use crate::model::graph::EventGraph;
use crate::model::late_queue::{LateContinuation, LateEventQueue};
use crate::model::node::{info_port, EventCategory, Node, NodeId, NodeKind, SkipUnit, START_PORT};
use crate::model::session::Suspension;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Continue with the given node; `None` ends the scenario gracefully.
    Advance(Option<NodeId>),
    Suspend(Suspension),
    Finish,
}

/// Mutable state a handler may touch besides the host.
pub struct Dispatch<'a, R: Rng + ?Sized> {
    pub graph: &'a Arc<EventGraph>,
    pub category: &'a mut EventCategory,
    pub late_events: &'a mut LateEventQueue,
    pub rng: &'a mut R,
}

impl<R: Rng + ?Sized> Dispatch<'_, R> {
    pub fn run<H: Host + ?Sized>(&mut self, node: &Node, host: &mut H) -> Step {
        debug!(graph = %self.graph.name(), node = %node.id, kind = node.kind.short_name(), "dispatching node");

        match &node.kind {
            NodeKind::Start { event_type } => {
                *self.category = event_type.clone();
                self.advance_via(&node.id, START_PORT)
            }

            NodeKind::Message {
                image,
                text,
                choices,
                speaker,
            } => {
                host.display(&DialogPayload {
                    category: self.category.clone(),
                    image: image.clone(),
                    text: text.clone(),
                    choices: choices.clone(),
                    speaker: speaker.clone(),
                });
                Step::Suspend(Suspension::Choice {
                    node: node.id.clone(),
                    choices: choices.len(),
                })
            }

            NodeKind::Prompt { .. } => {
                error!(node = %node.id, "prompt nodes are not supported, continuing through output");
                self.advance_by_output(&node.id)
            }

            NodeKind::TimeSkip { unit, amount } => {
                let today = host.today();
                let delta = match skip_date(today, *unit, *amount) {
                    Some(target) => target - today,
                    None => {
                        warn!(node = %node.id, ?unit, amount, %today, "time skip overflows the calendar");
                        Duration::zero()
                    }
                };
                info!(node = %node.id, days = delta.num_days(), "advancing calendar");
                host.advance(delta);
                Step::Suspend(Suspension::TimeAdvance {
                    node: node.id.clone(),
                })
            }

            NodeKind::Result { actions } => {
                host.apply_resource_edits(actions);
                self.advance_by_output(&node.id)
            }

            NodeKind::Random { .. } => Step::Advance(
                self.graph
                    .next_node_by_random(&node.id, &mut *self.rng)
                    .map(|next| next.id.clone()),
            ),

            NodeKind::MultiRandom { .. } => Step::Advance(
                self.graph
                    .next_node_by_multi_random(&node.id, &mut *self.rng)
                    .map(|next| next.id.clone()),
            ),

            NodeKind::LateResult { infos } => {
                let today = host.today();
                for (i, late) in infos.iter().enumerate() {
                    let Some(target) = self.graph.next_node(&node.id, &info_port(i)) else {
                        info!(node = %node.id, info = i, "late result entry has no connected node, skipping");
                        continue;
                    };
                    let Some(due) = skip_date(today, late.duration, late.amount) else {
                        warn!(node = %node.id, info = i, "late result date overflows the calendar, skipping");
                        continue;
                    };

                    debug!(node = %node.id, target = %target.id, %due, "scheduling late event");
                    self.late_events.schedule(
                        due,
                        LateContinuation {
                            graph: Arc::clone(self.graph),
                            node: target.id.clone(),
                            category: self.category.clone(),
                        },
                    );
                }
                self.advance_by_output(&node.id)
            }

            NodeKind::Shop { carts } => {
                for cart in carts {
                    debug!(action = ?cart.action, item = %cart.item.name, "shop transaction");
                    host.trade(cart.action, &cart.item);
                }
                self.advance_by_output(&node.id)
            }

            NodeKind::End => Step::Finish,
        }
    }

    fn advance_via(&self, from: &NodeId, port: &str) -> Step {
        Step::Advance(self.graph.next_node(from, port).map(|next| next.id.clone()))
    }

    fn advance_by_output(&self, from: &NodeId) -> Step {
        Step::Advance(self.graph.next_node_by_output(from).map(|next| next.id.clone()))
    }
}

/// Date `amount` units after `from`, with calendar month arithmetic.
pub fn skip_date(from: NaiveDate, unit: SkipUnit, amount: u32) -> Option<NaiveDate> {
    match unit {
        SkipUnit::Day => from.checked_add_signed(Duration::days(i64::from(amount))),
        SkipUnit::Week => from.checked_add_signed(Duration::weeks(i64::from(amount))),
        SkipUnit::Month => from.checked_add_months(Months::new(amount)),
    }
}
