use std::io::{self, BufRead};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use chrono::NaiveDate;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use scenario_director::config::load_config_from;
use scenario_director::model::session::{Phase, Suspension};
use scenario_director::ui::console::{announce_day, ConsoleHost, PlayerProfile};
use scenario_director::{config, Director, ScenarioNotification};

const FRAME: Duration = Duration::from_millis(16);

/// Plays authored event scenarios against a terminal dialog box.
#[derive(Parser)]
#[command(name = "scenario_director", version)]
struct Cli {
    /// Directory of scenario graphs (*.json).
    #[arg(long)]
    scenarios: Option<PathBuf>,

    /// Config file; defaults to the user config directory.
    #[arg(long)]
    config: Option<PathBuf>,

    /// First simulated day.
    #[arg(long, default_value = "2024-01-01")]
    start: NaiveDate,

    /// Stop after this many simulated days.
    #[arg(long, default_value_t = 400)]
    days: u32,

    /// Play the first scenario without running the calendar.
    #[arg(long)]
    sandbox: bool,

    #[arg(long)]
    seed: Option<u64>,
}

/// Drives the active scenario until it ends, reading choices from stdin.
fn play_until_idle(
    director: &mut Director,
    host: &mut ConsoleHost,
    choices: &mut impl Iterator<Item = io::Result<String>>,
) -> io::Result<()> {
    while director.interpreter().is_active() {
        match director.interpreter().phase().clone() {
            Phase::Running => director.tick(FRAME, host),
            Phase::Paused(Suspension::Choice { .. }) => {
                let line = choices.next().transpose()?.unwrap_or_default();
                let choice = line.trim().parse().unwrap_or(0);
                director.on_choice_selected(choice, host);
            }
            Phase::Paused(Suspension::TimeAdvance { .. }) => {
                if host.take_finished_advance() {
                    director.on_advance_finished();
                }
            }
            Phase::Idle => break,
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => config::load_config(),
    };
    if let Some(dir) = cli.scenarios {
        config.scenario_dir = Some(dir);
    }
    if config.scenario_dir.is_none() {
        config.scenario_dir = Some(PathBuf::from("scenarios"));
    }
    config.sandbox |= cli.sandbox;
    if cli.seed.is_some() {
        config.rng_seed = cli.seed;
    }

    let mut director = Director::from_config(config).context("failed to load scenarios")?;
    let notifications = director.subscribe();
    let mut host = ConsoleHost::new(cli.start, PlayerProfile::default());
    let mut choices = io::stdin().lock().lines();

    director.begin_play(&mut host);

    let mut days = 0;
    loop {
        play_until_idle(&mut director, &mut host, &mut choices)?;

        for notification in notifications.try_iter() {
            match notification {
                ScenarioNotification::Started(category) => info!(%category, "scenario started"),
                ScenarioNotification::Finished(category) => info!(%category, "scenario finished"),
            }
        }

        if host.is_game_over() {
            break;
        }

        if director.config().sandbox {
            break;
        }

        // Days jumped over by a time skip are reported before the clock moves on.
        if let Some(turn) = host.next_pending_day() {
            announce_day(&mut director, &mut host, turn);
            days += 1;
            continue;
        }

        if !host.clock_ticking() || days >= cli.days {
            break;
        }
        host.next_day();
    }

    println!();
    println!("{:#?}", host.player);
    Ok(())
}
