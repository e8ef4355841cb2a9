//! Timeout configuration from TOML (`[timeouts]` section)

use kin_application::TurnParams;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileTimeoutsConfig {
    /// Deadline for one model round, in seconds
    pub adapter_secs: u64,
    /// Deadline for one tool call, in seconds
    pub tool_secs: u64,
    /// Deadline for a provider status probe, in seconds
    pub status_secs: u64,
}

impl Default for FileTimeoutsConfig {
    fn default() -> Self {
        let params = TurnParams::default();
        Self {
            adapter_secs: params.adapter_timeout.as_secs(),
            tool_secs: params.tool_timeout.as_secs(),
            status_secs: params.status_timeout.as_secs(),
        }
    }
}

impl FileTimeoutsConfig {
    pub fn to_turn_params(&self) -> TurnParams {
        TurnParams::default()
            .with_adapter_timeout(Duration::from_secs(self.adapter_secs))
            .with_tool_timeout(Duration::from_secs(self.tool_secs))
            .with_status_timeout(Duration::from_secs(self.status_secs))
    }
}
