use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::model::node::{EventCategory, Item, ResourceEdit, ShopAction};

/// Everything a dialog box needs to show one message node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogPayload {
    pub category: EventCategory,
    pub image: Option<String>,
    pub text: String,
    pub choices: Vec<String>,
    pub speaker: Option<String>,
}

pub trait DialogDisplay {
    fn display(&mut self, payload: &DialogPayload);
    fn hide(&mut self);
}

pub trait Calendar {
    fn today(&self) -> NaiveDate;
    /// Starts advancing simulated time by `delta`. The host reports
    /// completion through the interpreter's time-advance resume.
    fn advance(&mut self, delta: Duration);
    fn pause(&mut self, paused: bool);
    fn reset(&mut self);
    fn start_clock(&mut self);
}

pub trait Economy {
    fn apply_resource_edits(&mut self, edits: &[ResourceEdit]);
    fn trade(&mut self, action: ShopAction, item: &Item);
    fn deduct_daily_salary(&mut self);
    fn credit_monthly_salary(&mut self);
    fn game_over(&mut self);
}

pub trait Host: DialogDisplay + Calendar + Economy {}

impl<T: DialogDisplay + Calendar + Economy> Host for T {}
