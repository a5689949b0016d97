#![allow(dead_code)]

use std::time::Duration;

use chrono::NaiveDate;
use scenario_director::model::node::{Item, ResourceEdit, ShopAction};
use scenario_director::model::session::{Phase, Suspension};
use scenario_director::{Calendar, DialogDisplay, DialogPayload, Director, Economy, Interpreter};

pub const FRAME: Duration = Duration::from_millis(50);

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[derive(Debug)]
pub struct RecordingHost {
    pub today: NaiveDate,
    pub displayed: Vec<DialogPayload>,
    pub edits: Vec<ResourceEdit>,
    pub trades: Vec<(ShopAction, String)>,
    pub advances: usize,
    pub pauses: Vec<bool>,
    pub game_overs: usize,
}

impl RecordingHost {
    pub fn on(today: NaiveDate) -> Self {
        Self {
            today,
            displayed: Vec::new(),
            edits: Vec::new(),
            trades: Vec::new(),
            advances: 0,
            pauses: Vec::new(),
            game_overs: 0,
        }
    }
}

impl DialogDisplay for RecordingHost {
    fn display(&mut self, payload: &DialogPayload) {
        self.displayed.push(payload.clone());
    }

    fn hide(&mut self) {}
}

impl Calendar for RecordingHost {
    fn today(&self) -> NaiveDate {
        self.today
    }

    fn advance(&mut self, delta: chrono::Duration) {
        self.advances += 1;
        self.today += delta;
    }

    fn pause(&mut self, paused: bool) {
        self.pauses.push(paused);
    }

    fn reset(&mut self) {}

    fn start_clock(&mut self) {}
}

impl Economy for RecordingHost {
    fn apply_resource_edits(&mut self, edits: &[ResourceEdit]) {
        self.edits.extend_from_slice(edits);
    }

    fn trade(&mut self, action: ShopAction, item: &Item) {
        self.trades.push((action, item.name.clone()));
    }

    fn deduct_daily_salary(&mut self) {}

    fn credit_monthly_salary(&mut self) {}

    fn game_over(&mut self) {
        self.game_overs += 1;
    }
}

/// Drives the interpreter to idle, answering every message with the next
/// entry of `picks` (0 once they run out). Gives up after `max_ticks`.
pub fn drive(
    interpreter: &mut Interpreter,
    host: &mut RecordingHost,
    picks: &[usize],
    max_ticks: usize,
) -> bool {
    let mut picks = picks.iter().copied();
    for _ in 0..max_ticks {
        match interpreter.phase().clone() {
            Phase::Idle => return true,
            Phase::Running => interpreter.tick(FRAME, host),
            Phase::Paused(Suspension::Choice { .. }) => {
                interpreter.resume_from_choice(picks.next().unwrap_or(0), host)
            }
            Phase::Paused(Suspension::TimeAdvance { .. }) => interpreter.resume_from_time_advance(),
        }
    }
    interpreter.phase() == &Phase::Idle
}

pub fn drive_director(director: &mut Director, host: &mut RecordingHost, max_ticks: usize) -> bool {
    drive(director.interpreter_mut(), host, &[], max_ticks)
}
