use chrono::{Duration, NaiveDate};

use crate::engine::host::{Calendar, DialogDisplay, DialogPayload, Economy};
use crate::model::node::{Item, ResourceEdit, ShopAction};

/// Host that records every call and advances its calendar immediately.
#[derive(Debug)]
pub struct FakeHost {
    pub today: NaiveDate,
    pub displayed: Vec<DialogPayload>,
    pub hides: usize,
    pub advances: Vec<Duration>,
    pub pauses: Vec<bool>,
    pub resets: usize,
    pub clock_started: bool,
    pub edits: Vec<ResourceEdit>,
    pub trades: Vec<(ShopAction, String)>,
    pub daily_deductions: usize,
    pub monthly_credits: usize,
    pub game_overs: usize,
}

impl FakeHost {
    pub fn on(today: NaiveDate) -> Self {
        Self {
            today,
            ..Self::default()
        }
    }

    pub fn clock_paused(&self) -> bool {
        self.pauses.last().copied().unwrap_or(false)
    }
}

impl Default for FakeHost {
    fn default() -> Self {
        Self {
            today: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            displayed: Vec::new(),
            hides: 0,
            advances: Vec::new(),
            pauses: Vec::new(),
            resets: 0,
            clock_started: false,
            edits: Vec::new(),
            trades: Vec::new(),
            daily_deductions: 0,
            monthly_credits: 0,
            game_overs: 0,
        }
    }
}

impl DialogDisplay for FakeHost {
    fn display(&mut self, payload: &DialogPayload) {
        self.displayed.push(payload.clone());
    }

    fn hide(&mut self) {
        self.hides += 1;
    }
}

impl Calendar for FakeHost {
    fn today(&self) -> NaiveDate {
        self.today
    }

    fn advance(&mut self, delta: Duration) {
        self.advances.push(delta);
        self.today += delta;
    }

    fn pause(&mut self, paused: bool) {
        self.pauses.push(paused);
    }

    fn reset(&mut self) {
        self.resets += 1;
    }

    fn start_clock(&mut self) {
        self.clock_started = true;
    }
}

impl Economy for FakeHost {
    fn apply_resource_edits(&mut self, edits: &[ResourceEdit]) {
        self.edits.extend_from_slice(edits);
    }

    fn trade(&mut self, action: ShopAction, item: &Item) {
        self.trades.push((action, item.name.clone()));
    }

    fn deduct_daily_salary(&mut self) {
        self.daily_deductions += 1;
    }

    fn credit_monthly_salary(&mut self) {
        self.monthly_credits += 1;
    }

    fn game_over(&mut self) {
        self.game_overs += 1;
    }
}
