use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Tunables for the director and its interpreter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectorConfig {
    /// Playground mode: scenarios never resume the calendar when they end.
    pub sandbox: bool,

    /// Settling time after a resume before the next node runs.
    pub resume_delay_ms: u64,

    pub max_steps_per_tick: usize,

    /// Fixed seed for random branches; entropy when absent.
    pub rng_seed: Option<u64>,

    /// Scenario started on every month boundary.
    pub salary_scenario: String,

    pub scenario_dir: Option<PathBuf>,
}

impl Default for DirectorConfig {
    fn default() -> Self {
        Self {
            sandbox: false,
            resume_delay_ms: 120,
            max_steps_per_tick: 256,
            rng_seed: None,
            salary_scenario: "salary".into(),
            scenario_dir: None,
        }
    }
}

impl DirectorConfig {
    pub fn interpreter(&self) -> InterpreterConfig {
        InterpreterConfig {
            sandbox: self.sandbox,
            resume_delay: Duration::from_millis(self.resume_delay_ms),
            max_steps_per_tick: self.max_steps_per_tick.max(1),
            rng_seed: self.rng_seed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpreterConfig {
    pub sandbox: bool,
    pub resume_delay: Duration,
    pub max_steps_per_tick: usize,
    pub rng_seed: Option<u64>,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        DirectorConfig::default().interpreter()
    }
}

pub fn config_path() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("scenario_director");
    path.push("director.json");
    path
}

/// Loads the user's config, falling back to defaults.
pub fn load_config() -> DirectorConfig {
    let path = config_path();
    if !path.exists() {
        return DirectorConfig::default();
    }

    load_config_from(&path).unwrap_or_else(|err| {
        warn!(path = %path.display(), error = %err, "ignoring unreadable config");
        DirectorConfig::default()
    })
}

pub fn load_config_from(path: &Path) -> anyhow::Result<DirectorConfig> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("invalid config {}", path.display()))
}

pub fn save_config_to(path: &Path, config: &DirectorConfig) -> anyhow::Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }
    let json = serde_json::to_string_pretty(config)?;
    fs::write(path, json).with_context(|| format!("failed to write config {}", path.display()))
}
