//! Configuration for the Atari 2600 core
//!
//! Loaded from JSON; every field is optional:
//!
//! ```json
//! {
//!   "power_on_seed": 2600,
//!   "log": { "global": "warn", "tia": "debug", "rate_limit": 120 }
//! }
//! ```

use emu_core::logging::{LogCategory, LogConfig, LogLevel};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::Atari2600Error;

/// Log levels to apply to the global [`LogConfig`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Level for every category without its own level
    pub global: LogLevel,
    pub cpu: Option<LogLevel>,
    pub bus: Option<LogLevel>,
    pub tia: Option<LogLevel>,
    pub riot: Option<LogLevel>,
    pub cartridge: Option<LogLevel>,
    pub stubs: Option<LogLevel>,
    /// Messages per second per category
    pub rate_limit: Option<usize>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            global: LogLevel::Off,
            cpu: None,
            bus: None,
            tia: None,
            riot: None,
            cartridge: None,
            stubs: None,
            rate_limit: None,
        }
    }
}

impl LogSettings {
    fn category_levels(&self) -> [(LogCategory, Option<LogLevel>); 6] {
        [
            (LogCategory::CPU, self.cpu),
            (LogCategory::Bus, self.bus),
            (LogCategory::TIA, self.tia),
            (LogCategory::RIOT, self.riot),
            (LogCategory::Cartridge, self.cartridge),
            (LogCategory::Stubs, self.stubs),
        ]
    }

    /// Push these settings into `config`
    pub fn apply_to(&self, config: &LogConfig) {
        config.set_global_level(self.global);
        for (category, level) in self.category_levels() {
            config.set_level(category, level.unwrap_or(LogLevel::Off));
        }
        if let Some(rate_limit) = self.rate_limit {
            config.set_rate_limit(rate_limit);
        }
    }
}

/// Atari 2600 core configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Atari2600Config {
    /// Seed for the undefined power-on state; `None` uses OS entropy
    pub power_on_seed: Option<u64>,
    pub log: LogSettings,
}

impl Atari2600Config {
    /// Parse a configuration from JSON
    pub fn from_json(text: &str) -> Result<Self, Atari2600Error> {
        Ok(serde_json::from_str(text)?)
    }

    /// Random source for power-on state
    pub fn power_on_rng(&self) -> StdRng {
        match self.power_on_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Apply the log settings to the global logger
    pub fn apply_logging(&self) {
        self.log.apply_to(LogConfig::global());
    }
}
