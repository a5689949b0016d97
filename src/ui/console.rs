use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::engine::director::Director;
use crate::engine::host::{Calendar, DialogDisplay, DialogPayload, Economy};
use crate::model::node::{EditMode, Item, Resource, ResourceEdit, ShopAction};

/// Starting resources of the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub happiness: i64,
    pub money: i64,
    pub salary: i64,
    pub have_pet: bool,
    #[serde(default)]
    pub inventory: Vec<String>,
}

impl Default for PlayerProfile {
    fn default() -> Self {
        Self {
            happiness: 50,
            money: 1_000,
            salary: 3_000,
            have_pet: false,
            inventory: Vec::new(),
        }
    }
}

impl PlayerProfile {
    pub fn apply(&mut self, edit: &ResourceEdit) {
        let slot = match edit.resource {
            Resource::Happiness => &mut self.happiness,
            Resource::Money => &mut self.money,
            Resource::Salary => &mut self.salary,
            Resource::Pet => {
                self.have_pet = match edit.mode {
                    EditMode::Add => edit.value > 0 || self.have_pet,
                    EditMode::Set => edit.value != 0,
                };
                return;
            }
        };

        match edit.mode {
            EditMode::Add => *slot = slot.saturating_add(edit.value),
            EditMode::Set => *slot = edit.value,
        }
    }
}

/// Terminal stand-in for the game's dialog box, clock and player model.
#[derive(Debug)]
pub struct ConsoleHost {
    pub player: PlayerProfile,
    today: NaiveDate,
    /// Last day already reported to the director.
    announced: NaiveDate,
    clock_running: bool,
    paused: bool,
    advancing: bool,
    game_over: bool,
}

impl ConsoleHost {
    pub fn new(today: NaiveDate, player: PlayerProfile) -> Self {
        Self {
            player,
            today,
            announced: today,
            clock_running: false,
            paused: false,
            advancing: false,
            game_over: false,
        }
    }

    /// Whether simulated days should pass on their own right now.
    pub fn clock_ticking(&self) -> bool {
        self.clock_running && !self.paused && !self.game_over
    }

    pub fn next_day(&mut self) -> NaiveDate {
        self.today += Duration::days(1);
        self.today
    }

    /// Consumes the pending time-advance completion, if any.
    pub fn take_finished_advance(&mut self) -> bool {
        std::mem::take(&mut self.advancing)
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// The next day between the last announced one and today, in order.
    /// Time skips jump `today` ahead; every skipped day still comes out here.
    pub fn next_pending_day(&mut self) -> Option<DayTurn> {
        if self.announced >= self.today {
            return None;
        }

        let date = self.announced.succ_opt()?;
        let turn = DayTurn {
            date,
            new_month: date.month() != self.announced.month(),
            new_year: date.year() != self.announced.year(),
        };
        self.announced = date;
        Some(turn)
    }
}

/// One calendar day as the console clock reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayTurn {
    pub date: NaiveDate,
    pub new_month: bool,
    pub new_year: bool,
}

/// Reports a day to the director. Boundaries go first so the salary scenario
/// gets the session before a late event due the same day.
pub fn announce_day(director: &mut Director, host: &mut ConsoleHost, turn: DayTurn) {
    if turn.new_year {
        director.on_year_passed(turn.date);
    }
    if turn.new_month {
        director.on_month_passed(turn.date, host);
    }
    director.on_day_passed(turn.date, host);
}

impl DialogDisplay for ConsoleHost {
    fn display(&mut self, payload: &DialogPayload) {
        println!();
        println!("[{}] {}", payload.category, self.today);
        if let Some(image) = &payload.image {
            println!("  <{}>", image);
        }
        match &payload.speaker {
            Some(speaker) => println!("  {}: {}", speaker, payload.text),
            None => println!("  {}", payload.text),
        }
        for (i, choice) in payload.choices.iter().enumerate() {
            println!("    {}) {}", i, choice);
        }
        if payload.choices.is_empty() {
            println!("    (press enter)");
        }
    }

    fn hide(&mut self) {}
}

impl Calendar for ConsoleHost {
    fn today(&self) -> NaiveDate {
        self.today
    }

    fn advance(&mut self, delta: Duration) {
        self.today += delta;
        self.advancing = true;
        println!("  ... {} days later ({})", delta.num_days(), self.today);
    }

    fn pause(&mut self, paused: bool) {
        self.paused = paused;
    }

    fn reset(&mut self) {
        self.clock_running = false;
    }

    fn start_clock(&mut self) {
        self.clock_running = true;
    }
}

impl Economy for ConsoleHost {
    fn apply_resource_edits(&mut self, edits: &[ResourceEdit]) {
        for edit in edits {
            self.player.apply(edit);
        }
    }

    fn trade(&mut self, action: ShopAction, item: &Item) {
        match action {
            ShopAction::Buy => {
                self.player.money = self.player.money.saturating_sub(item.price);
                self.player.inventory.push(item.name.clone());
            }
            ShopAction::Sell => {
                if let Some(pos) = self.player.inventory.iter().position(|i| i == &item.name) {
                    self.player.inventory.remove(pos);
                    self.player.money = self.player.money.saturating_add(item.price);
                }
            }
            ShopAction::Give => self.player.inventory.push(item.name.clone()),
        }
    }

    fn deduct_daily_salary(&mut self) {
        self.player.money = self.player.money.saturating_sub(self.player.salary / 30);
    }

    fn credit_monthly_salary(&mut self) {
        self.player.money = self.player.money.saturating_add(self.player.salary);
    }

    fn game_over(&mut self) {
        self.game_over = true;
        println!();
        println!("Game over. Final money: {}", self.player.money);
    }
}
