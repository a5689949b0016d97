use std::collections::HashMap;
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tracing::{debug, error, info, warn};

use crate::config::DirectorConfig;
use crate::engine::host::Host;
use crate::engine::interpreter::Interpreter;
use crate::engine::notify::ScenarioNotification;
use crate::model::graph::EventGraph;
use crate::model::graph_asset::load_graph_dir;
use crate::model::session::InterpreterStatus;

pub struct Director {
    config: DirectorConfig,
    interpreter: Interpreter,
    library: HashMap<String, Arc<EventGraph>>,
    /// Non-salary scenarios in load order.
    normal_scenarios: Vec<String>,
}

impl Director {
    pub fn new(config: DirectorConfig, scenarios: Vec<EventGraph>) -> Self {
        let interpreter = Interpreter::new(config.interpreter());
        let mut library = HashMap::with_capacity(scenarios.len());
        let mut normal_scenarios = Vec::new();

        for graph in scenarios {
            let name = graph.name().to_string();
            if library.insert(name.clone(), Arc::new(graph)).is_some() {
                warn!(scenario = %name, "duplicate scenario name, keeping the last one");
            } else if name != config.salary_scenario {
                normal_scenarios.push(name);
            }
        }

        if !library.contains_key(&config.salary_scenario) {
            warn!(scenario = %config.salary_scenario, "salary scenario is not in the library");
        }

        Self {
            config,
            interpreter,
            library,
            normal_scenarios,
        }
    }

    /// Builds a director from the scenarios in the configured directory.
    pub fn from_config(config: DirectorConfig) -> anyhow::Result<Self> {
        let scenarios = match &config.scenario_dir {
            Some(dir) => load_graph_dir(dir)?,
            None => Vec::new(),
        };
        info!(count = scenarios.len(), "scenario library loaded");
        Ok(Self::new(config, scenarios))
    }

    pub fn config(&self) -> &DirectorConfig {
        &self.config
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    pub fn interpreter_mut(&mut self) -> &mut Interpreter {
        &mut self.interpreter
    }

    pub fn subscribe(&mut self) -> Receiver<ScenarioNotification> {
        self.interpreter.subscribe()
    }

    pub fn status(&self) -> InterpreterStatus {
        self.interpreter.status()
    }

    pub fn scenario(&self, name: &str) -> Option<&Arc<EventGraph>> {
        self.library.get(name)
    }

    pub fn normal_scenarios(&self) -> &[String] {
        &self.normal_scenarios
    }

    pub fn begin_play<H: Host + ?Sized>(&mut self, host: &mut H) {
        if self.config.sandbox {
            match self.normal_scenarios.first().cloned() {
                Some(name) => {
                    self.start_scenario(&name, host);
                }
                None => error!("sandbox mode has no scenario to play"),
            }
        } else {
            host.start_clock();
        }
    }

    /// Starts a scenario by name. Dropped while another scenario runs.
    pub fn start_scenario<H: Host + ?Sized>(&mut self, name: &str, host: &mut H) -> bool {
        let Some(graph) = self.library.get(name).cloned() else {
            error!(scenario = %name, "cannot find the scenario, it will not process");
            return false;
        };

        self.interpreter.start(graph, host)
    }

    /// Deducts the daily salary and starts a due late event if idle. Hosts
    /// report a day's month and year boundaries before the day itself.
    pub fn on_day_passed<H: Host + ?Sized>(&mut self, date: NaiveDate, host: &mut H) {
        debug!(%date, "day passed");
        host.deduct_daily_salary();
        self.start_due_late_event(host);
    }

    pub fn on_month_passed<H: Host + ?Sized>(&mut self, date: NaiveDate, host: &mut H) {
        debug!(%date, "month passed");
        host.credit_monthly_salary();

        let salary = self.config.salary_scenario.clone();
        self.start_scenario(&salary, host);
    }

    pub fn on_year_passed(&mut self, date: NaiveDate) {
        info!(%date, "year passed, the game ends after the current scenario");
        self.interpreter.request_end_game();
    }

    pub fn on_choice_selected<H: Host + ?Sized>(&mut self, choice: usize, host: &mut H) {
        self.interpreter.resume_from_choice(choice, host);
    }

    pub fn on_advance_finished(&mut self) {
        self.interpreter.resume_from_time_advance();
    }

    pub fn tick<H: Host + ?Sized>(&mut self, elapsed: Duration, host: &mut H) {
        self.interpreter.tick(elapsed, host);
        self.start_due_late_event(host);
    }

    /// Resumes the earliest late event due today, if nothing else is running.
    fn start_due_late_event<H: Host + ?Sized>(&mut self, host: &mut H) {
        if self.interpreter.is_active() {
            return;
        }

        let today = host.today();
        if let Some((due, continuation)) = self.interpreter.late_events_mut().pop_due(today) {
            debug!(%due, %today, node = %continuation.node, "late event is due");
            self.interpreter.start_late(continuation, host);
        }
    }
}
