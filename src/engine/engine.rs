use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use tracing::{debug, info};

use crate::engine::director::Director;
use crate::engine::host::Host;
use crate::engine::protocol::{EngineCommand, EngineResponse};

/// Runs a director on one thread, serializing every callback through a
/// command channel so the interpreter never needs a lock.
pub struct Engine<H> {
    rx: Receiver<EngineCommand>,
    tx: Sender<EngineResponse>,
    director: Director,
    host: H,
}

impl<H: Host> Engine<H> {
    pub fn new(
        rx: Receiver<EngineCommand>,
        tx: Sender<EngineResponse>,
        director: Director,
        host: H,
    ) -> Self {
        Self {
            rx,
            tx,
            director,
            host,
        }
    }

    /// Handles commands until `Shutdown` or until every sender is gone,
    /// then hands the host back.
    pub fn run(mut self) -> H {
        while let Ok(cmd) = self.rx.recv() {
            debug!(?cmd, "engine command");

            match cmd {
                EngineCommand::Tick(elapsed) => self.director.tick(elapsed, &mut self.host),
                EngineCommand::ChoiceSelected(choice) => {
                    self.director.on_choice_selected(choice, &mut self.host)
                }
                EngineCommand::AdvanceFinished => self.director.on_advance_finished(),
                EngineCommand::DayPassed(date) => {
                    self.director.on_day_passed(date, &mut self.host)
                }
                EngineCommand::MonthPassed(date) => {
                    self.director.on_month_passed(date, &mut self.host)
                }
                EngineCommand::YearPassed(date) => self.director.on_year_passed(date),
                EngineCommand::BeginPlay => self.director.begin_play(&mut self.host),
                EngineCommand::StartScenario(name) => {
                    self.director.start_scenario(&name, &mut self.host);
                }
                EngineCommand::Shutdown => {
                    info!("engine shutting down");
                    break;
                }
            }

            let _ = self
                .tx
                .send(EngineResponse::Status(self.director.status()));
        }

        self.host
    }
}

/// Handle to an engine running on its own thread.
pub struct EngineHandle<H> {
    pub commands: Sender<EngineCommand>,
    pub responses: Receiver<EngineResponse>,
    thread: JoinHandle<H>,
}

impl<H> EngineHandle<H> {
    pub fn send(&self, cmd: EngineCommand) -> bool {
        self.commands.send(cmd).is_ok()
    }

    /// Stops the engine and returns its host.
    pub fn shutdown(self) -> thread::Result<H> {
        let _ = self.commands.send(EngineCommand::Shutdown);
        self.thread.join()
    }
}

pub fn spawn<H: Host + Send + 'static>(director: Director, host: H) -> EngineHandle<H> {
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (resp_tx, resp_rx) = mpsc::channel();

    let thread = thread::spawn(move || Engine::new(cmd_rx, resp_tx, director, host).run());

    EngineHandle {
        commands: cmd_tx,
        responses: resp_rx,
        thread,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::NaiveDate;

    use super::*;
    use crate::config::DirectorConfig;
    use crate::engine::notify::ScenarioNotification;
    use crate::engine::testing::FakeHost;
    use crate::model::graph::EventGraph;
    use crate::model::node::{EventCategory, NodeKind, OUTPUT_PORT, START_PORT};
    use crate::model::session::Phase;

    #[test]
    fn engine_thread_drives_a_scenario() {
        let graph = EventGraph::builder("salary")
            .node(
                "start",
                NodeKind::Start {
                    event_type: EventCategory::new("salary"),
                },
            )
            .node(
                "msg",
                NodeKind::Message {
                    image: None,
                    text: "Pay day".into(),
                    choices: vec![],
                    speaker: None,
                },
            )
            .node("end", NodeKind::End)
            .connect("start", START_PORT, "msg")
            .connect("msg", OUTPUT_PORT, "end")
            .build()
            .unwrap();
        let mut director = Director::new(
            DirectorConfig {
                resume_delay_ms: 0,
                ..DirectorConfig::default()
            },
            vec![graph],
        );
        let notifications = director.subscribe();

        let handle = spawn(director, FakeHost::default());
        assert!(handle.send(EngineCommand::MonthPassed(
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()
        )));
        let EngineResponse::Status(status) = handle.responses.recv().unwrap();
        assert!(matches!(status.phase, Phase::Paused(_)));

        handle.send(EngineCommand::ChoiceSelected(0));
        handle.send(EngineCommand::Tick(Duration::from_millis(16)));
        handle.responses.recv().unwrap();
        let EngineResponse::Status(status) = handle.responses.recv().unwrap();
        assert_eq!(status.phase, Phase::Idle);

        let host = handle.shutdown().unwrap();
        assert_eq!(host.monthly_credits, 1);
        assert_eq!(host.pauses, vec![true, false]);

        let received: Vec<ScenarioNotification> = notifications.try_iter().collect();
        assert_eq!(
            received,
            vec![
                ScenarioNotification::Started(EventCategory::new("salary")),
                ScenarioNotification::Finished(EventCategory::new("salary")),
            ]
        );
    }
}
