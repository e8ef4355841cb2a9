//! Provider selection.
//!
//! Maps an optional, user-supplied provider name to one of the registered
//! [`ProviderAdapter`]s. The set of variants is the closed [`ProviderKind`]
//! enum; only the adapters the composition root could build are registered.

use crate::ports::provider_adapter::ProviderAdapter;
use kin_domain::{ConfigurationError, ProviderKind};
use std::collections::BTreeMap;
use std::sync::Arc;

pub struct ProviderSelector {
    adapters: BTreeMap<ProviderKind, Arc<dyn ProviderAdapter>>,
    /// Name used when the caller does not pick one.
    default_name: String,
}

impl ProviderSelector {
    pub fn new(default_name: impl Into<String>) -> Self {
        Self {
            adapters: BTreeMap::new(),
            default_name: default_name.into(),
        }
    }

    /// Register an adapter under its own kind. A later registration of the
    /// same kind replaces the earlier one.
    pub fn with_adapter(mut self, adapter: Arc<dyn ProviderAdapter>) -> Self {
        self.adapters.insert(adapter.kind(), adapter);
        self
    }

    pub fn default_name(&self) -> &str {
        &self.default_name
    }

    /// Kinds that have an adapter, in declaration order.
    pub fn registered(&self) -> Vec<ProviderKind> {
        self.adapters.keys().copied().collect()
    }

    /// Resolve `name` (or the default when absent or blank).
    ///
    /// Fails when the name matches no variant, or matches a variant that was
    /// never registered. The error carries the name as the caller wrote it.
    pub fn resolve(
        &self,
        name: Option<&str>,
    ) -> Result<Arc<dyn ProviderAdapter>, ConfigurationError> {
        let requested = match name.map(str::trim) {
            Some(n) if !n.is_empty() => n,
            _ => self.default_name.trim(),
        };

        let kind: ProviderKind = requested.parse()?;
        self.adapters
            .get(&kind)
            .cloned()
            .ok_or_else(|| ConfigurationError::UnknownProvider(requested.to_string()))
    }
}
