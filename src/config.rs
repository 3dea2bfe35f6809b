//! Simulator settings.

use crate::types::{MachineError, DEFAULT_SPEED_MS, MAX_EXECUTION_STEPS};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimulatorConfig {
    /// Milliseconds between scheduled steps. Zero steps as fast as the host polls.
    pub speed_ms: u64,
    /// Upper bound on steps when running to completion.
    pub max_steps: usize,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            speed_ms: DEFAULT_SPEED_MS,
            max_steps: MAX_EXECUTION_STEPS,
        }
    }
}

impl SimulatorConfig {
    pub fn speed(&self) -> Duration {
        Duration::from_millis(self.speed_ms)
    }

    /// Reads a JSON config file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, MachineError> {
        let content = fs::read_to_string(path).map_err(|e| {
            MachineError::File(format!("Failed to read config {}: {}", path.display(), e))
        })?;

        serde_json::from_str(&content).map_err(|e| MachineError::Parse(e.to_string()))
    }
}
