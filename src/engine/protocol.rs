use std::time::Duration;

use chrono::NaiveDate;

use crate::model::session::InterpreterStatus;

/// Callbacks and calendar notifications delivered to the engine thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    Tick(Duration),
    ChoiceSelected(usize),
    AdvanceFinished,
    DayPassed(NaiveDate),
    MonthPassed(NaiveDate),
    YearPassed(NaiveDate),
    BeginPlay,
    StartScenario(String),
    Shutdown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineResponse {
    /// Interpreter state after a command was handled.
    Status(InterpreterStatus),
}
