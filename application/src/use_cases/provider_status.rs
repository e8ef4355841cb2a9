//! Provider status use case.
//!
//! Reports whether a provider is reachable. Always produces a string: bad
//! names and slow providers are described rather than returned as errors.

use crate::config::TurnParams;
use crate::use_cases::provider_selector::ProviderSelector;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct ProviderStatusUseCase {
    selector: Arc<ProviderSelector>,
    params: TurnParams,
}

impl ProviderStatusUseCase {
    pub fn new(selector: Arc<ProviderSelector>) -> Self {
        Self {
            selector,
            params: TurnParams::default(),
        }
    }

    pub fn with_params(mut self, params: TurnParams) -> Self {
        self.params = params;
        self
    }

    pub async fn execute(&self, provider: Option<&str>) -> String {
        let adapter = match self.selector.resolve(provider) {
            Ok(adapter) => adapter,
            Err(e) => return format!("Error: {}", e),
        };
        let kind = adapter.kind();

        debug!(provider = kind.as_str(), "Checking provider status");
        match tokio::time::timeout(self.params.status_timeout, adapter.status()).await {
            Ok(status) => status,
            Err(_) => {
                warn!(provider = kind.as_str(), "Status check timed out");
                format!("{}: status check timed out", kind.as_str())
            }
        }
    }
}
