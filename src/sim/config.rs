use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::utils::consts::*;

/// Traffic and medium parameters shared by every station of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub stations: usize,
    pub duration_secs: f64,
    pub arrival_interval_ms: u64,
    pub data_airtime_ms: u64,
    pub control_airtime_ms: u64,
    pub response_timeout_ms: u64,
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            stations: DEFAULT_STATIONS,
            duration_secs: DEFAULT_DURATION_S,
            arrival_interval_ms: DEFAULT_ARRIVAL_INTERVAL_MS,
            data_airtime_ms: DEFAULT_DATA_AIRTIME_MS,
            control_airtime_ms: DEFAULT_CONTROL_AIRTIME_MS,
            response_timeout_ms: DEFAULT_RESPONSE_TIMEOUT_MS,
            seed: DEFAULT_SEED,
        }
    }
}

impl SimConfig {
    /// Reads a JSON config; missing fields keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config: SimConfig = serde_json::from_str(&text)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.stations == 0 {
            return Err(SimError::InvalidConfig(
                "at least one station is required".into(),
            ));
        }
        if self.stations > MAX_STATIONS {
            return Err(SimError::InvalidConfig(format!(
                "{} stations requested, at most {} supported",
                self.stations, MAX_STATIONS
            )));
        }
        if !(self.duration_secs.is_finite() && self.duration_secs > 0.0) {
            return Err(SimError::InvalidConfig(format!(
                "duration must be positive, got {}",
                self.duration_secs
            )));
        }
        if self.duration_secs > MAX_DURATION_S {
            return Err(SimError::InvalidConfig(format!(
                "duration {} s exceeds the {} s limit",
                self.duration_secs, MAX_DURATION_S
            )));
        }
        if self.arrival_interval_ms == 0 {
            return Err(SimError::InvalidConfig(
                "arrival interval must be positive".into(),
            ));
        }
        if self.data_airtime_ms == 0 || self.control_airtime_ms == 0 {
            return Err(SimError::InvalidConfig(
                "frame airtimes must be positive".into(),
            ));
        }
        if self.response_timeout_ms <= self.data_airtime_ms {
            return Err(SimError::InvalidConfig(format!(
                "response timeout ({} ms) must exceed DATA airtime ({} ms)",
                self.response_timeout_ms, self.data_airtime_ms
            )));
        }
        Ok(())
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.duration_secs)
    }

    pub fn arrival_interval(&self) -> Duration {
        Duration::from_millis(self.arrival_interval_ms)
    }

    pub fn data_airtime(&self) -> Duration {
        Duration::from_millis(self.data_airtime_ms)
    }

    pub fn control_airtime(&self) -> Duration {
        Duration::from_millis(self.control_airtime_ms)
    }

    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }
}
