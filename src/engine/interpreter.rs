//! Scenario interpreter
//!
//! Walks one event graph at a time as an explicit state machine:
//! `Idle -> Running -> (Paused <-> Running)* -> Idle`. The host drives it
//! with `tick` once per frame and with the two resume callbacks; a paused
//! session consumes no ticks until the matching callback arrives.

use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, error, info, warn};

use crate::config::InterpreterConfig;
use crate::engine::dispatcher::{Dispatch, Step};
use crate::engine::host::Host;
use crate::engine::notify::{Notifier, ScenarioNotification};
use crate::model::graph::EventGraph;
use crate::model::late_queue::{LateContinuation, LateEventQueue};
use crate::model::node::{choice_port, EventCategory, NodeId, NodeKind, OUTPUT_PORT};
use crate::model::session::{InterpreterStatus, Phase, Session, Suspension};

pub struct Interpreter {
    config: InterpreterConfig,
    phase: Phase,
    session: Option<Session>,
    /// Set when a year boundary passes; consumed when the next scenario ends.
    end_game_requested: bool,
    late_events: LateEventQueue,
    notifier: Notifier,
    rng: StdRng,
}

impl Interpreter {
    pub fn new(config: InterpreterConfig) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            config,
            phase: Phase::Idle,
            session: None,
            end_game_requested: false,
            late_events: LateEventQueue::new(),
            notifier: Notifier::default(),
            rng,
        }
    }

    pub fn subscribe(&mut self) -> Receiver<ScenarioNotification> {
        self.notifier.subscribe()
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn late_events(&self) -> &LateEventQueue {
        &self.late_events
    }

    pub fn late_events_mut(&mut self) -> &mut LateEventQueue {
        &mut self.late_events
    }

    pub fn request_end_game(&mut self) {
        self.end_game_requested = true;
    }

    pub fn end_game_requested(&self) -> bool {
        self.end_game_requested
    }

    pub fn status(&self) -> InterpreterStatus {
        InterpreterStatus {
            phase: self.phase.clone(),
            scenario: self.session.as_ref().map(|s| s.graph.name().to_string()),
            current_node: self.session.as_ref().and_then(|s| s.current.clone()),
            category: self.session.as_ref().map(|s| s.category.clone()),
            pending_late_events: self.late_events.len(),
        }
    }

    /// Starts `graph` from its start node. Returns whether a session began;
    /// a request while another scenario is active is dropped.
    pub fn start<H: Host + ?Sized>(&mut self, graph: Arc<EventGraph>, host: &mut H) -> bool {
        if self.is_active() {
            debug!(scenario = %graph.name(), "a scenario is already running, ignoring start");
            return false;
        }

        let (start, category) = match graph.start_node() {
            Ok(node) => {
                let category = match &node.kind {
                    NodeKind::Start { event_type } => event_type.clone(),
                    _ => EventCategory::default(),
                };
                (node.id.clone(), category)
            }
            Err(err) => {
                error!(error = %err, "scenario will not process");
                return false;
            }
        };

        info!(scenario = %graph.name(), %category, "scenario has started");
        self.begin(Session::new(graph, start, category), host);
        true
    }

    /// Resumes a late event at its continuation node.
    pub fn start_late<H: Host + ?Sized>(
        &mut self,
        continuation: LateContinuation,
        host: &mut H,
    ) -> bool {
        if self.is_active() {
            debug!(node = %continuation.node, "a scenario is already running, ignoring late event");
            return false;
        }

        if continuation.graph.node(&continuation.node).is_none() {
            error!(
                scenario = %continuation.graph.name(),
                node = %continuation.node,
                "late event node is missing, it will not resume"
            );
            return false;
        }

        info!(
            scenario = %continuation.graph.name(),
            node = %continuation.node,
            "late scenario has started"
        );
        self.begin(
            Session::new(continuation.graph, continuation.node, continuation.category),
            host,
        );
        true
    }

    fn begin<H: Host + ?Sized>(&mut self, session: Session, host: &mut H) {
        let category = session.category.clone();
        self.session = Some(session);
        self.phase = Phase::Running;

        self.notifier.emit(ScenarioNotification::Started(category));
        host.pause(true);

        self.pump(host);
    }

    /// One scheduling tick of `elapsed` real time.
    pub fn tick<H: Host + ?Sized>(&mut self, elapsed: Duration, host: &mut H) {
        if self.phase != Phase::Running {
            return;
        }

        if let Some(session) = self.session.as_mut() {
            if let Some(remaining) = session.settle {
                if elapsed < remaining {
                    session.settle = Some(remaining - elapsed);
                    return;
                }
                session.settle = None;
            }
        }

        self.pump(host);
    }

    /// Runs automatic nodes until the session suspends, ends, or exhausts
    /// this tick's step budget.
    fn pump<H: Host + ?Sized>(&mut self, host: &mut H) {
        for _ in 0..self.config.max_steps_per_tick {
            if self.phase != Phase::Running {
                return;
            }
            let Some(session) = self.session.as_mut() else {
                return;
            };
            let Some(current) = session.current.clone() else {
                self.end(host);
                return;
            };

            let graph = Arc::clone(&session.graph);
            let Some(node) = graph.node(&current) else {
                warn!(scenario = %graph.name(), node = %current, "unresolved node, ending scenario");
                self.end(host);
                return;
            };

            let step = Dispatch {
                graph: &graph,
                category: &mut session.category,
                late_events: &mut self.late_events,
                rng: &mut self.rng,
            }
            .run(node, host);

            match step {
                Step::Advance(next) => session.current = next,
                Step::Suspend(suspension) => {
                    debug!(node = %suspension.node(), "scenario paused");
                    self.phase = Phase::Paused(suspension);
                    return;
                }
                Step::Finish => {
                    self.end(host);
                    return;
                }
            }
        }

        debug!("step budget exhausted, yielding until the next tick");
    }

    /// Choice callback from the dialog box.
    pub fn resume_from_choice<H: Host + ?Sized>(&mut self, choice: usize, host: &mut H) {
        let (node, choices) = match &self.phase {
            Phase::Paused(Suspension::Choice { node, choices }) => (node.clone(), *choices),
            _ => {
                warn!(choice, "choice received while no message is waiting");
                return;
            }
        };

        let has_custom_choices = choices > 0;
        if has_custom_choices && choice >= choices {
            warn!(choice, choices, "unknown choice, still waiting");
            return;
        }

        let port = if has_custom_choices {
            choice_port(choice)
        } else {
            OUTPUT_PORT.to_string()
        };

        host.hide();
        self.resume_via(&node, &port);
    }

    /// Completion callback from the calendar after a time skip.
    pub fn resume_from_time_advance(&mut self) {
        let node = match &self.phase {
            Phase::Paused(Suspension::TimeAdvance { node }) => node.clone(),
            _ => {
                debug!("time advance finished while no time skip is waiting");
                return;
            }
        };

        self.resume_via(&node, OUTPUT_PORT);
    }

    fn resume_via(&mut self, from: &NodeId, port: &str) {
        let Some(session) = self.session.as_mut() else {
            self.phase = Phase::Idle;
            return;
        };

        session.current = session.graph.next_node(from, port).map(|next| next.id.clone());
        session.settle = Some(self.config.resume_delay);
        self.phase = Phase::Running;
        debug!(node = %from, port, "scenario resumed");
    }

    /// Ends the active scenario. Does nothing when idle.
    pub fn end<H: Host + ?Sized>(&mut self, host: &mut H) {
        let Some(session) = self.session.take() else {
            return;
        };
        self.phase = Phase::Idle;

        self.notifier
            .emit(ScenarioNotification::Finished(session.category.clone()));
        host.hide();

        if !self.config.sandbox {
            host.pause(false);
        }

        info!(scenario = %session.graph.name(), category = %session.category, "scenario has finished");

        if std::mem::take(&mut self.end_game_requested) {
            info!("game over");
            host.game_over();
            host.reset();
        }
    }
}
