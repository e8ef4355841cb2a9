//! Turn parameters: the time limits applied while driving one turn.
//!
//! [`TurnParams`] is an application-layer concern. The composition root fills
//! it from the `[timeouts]` section of the config file.

use std::time::Duration;

/// Deadlines for a single turn.
///
/// | Limit             | Applies to                                   |
/// |-------------------|----------------------------------------------|
/// | `adapter_timeout` | draining one adapter stream (phase 1 or 2)   |
/// | `tool_timeout`    | one tool call, including the backend request |
/// | `status_timeout`  | one provider status probe                    |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnParams {
    pub adapter_timeout: Duration,
    pub tool_timeout: Duration,
    pub status_timeout: Duration,
}

impl Default for TurnParams {
    fn default() -> Self {
        Self {
            adapter_timeout: Duration::from_secs(60),
            tool_timeout: Duration::from_secs(15),
            status_timeout: Duration::from_secs(5),
        }
    }
}

impl TurnParams {
    // ==================== Builder Methods ====================

    pub fn with_adapter_timeout(mut self, timeout: Duration) -> Self {
        self.adapter_timeout = timeout;
        self
    }

    pub fn with_tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = timeout;
        self
    }

    pub fn with_status_timeout(mut self, timeout: Duration) -> Self {
        self.status_timeout = timeout;
        self
    }
}
