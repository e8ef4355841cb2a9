//! Backend tool executor, the concrete implementation of [`ToolExecutorPort`].
//!
//! [`BackendToolExecutor`] turns a model-issued [`ToolCall`] into one
//! [`FamilyBackend`] request. It is total: every failure becomes an
//! `{"error": "..."}` payload that the model sees in the second round.
//!
//! # Execution order
//!
//! ```text
//! execute()
//!   ├─ arguments not a JSON object   → invalid JSON arguments
//!   ├─ authenticated tool, no token  → not authenticated (backend untouched)
//!   ├─ name not in catalog           → unknown tool
//!   ├─ typed decode fails            → missing / invalid argument
//!   └─ backend call                  → payload verbatim, or backend error text
//! ```

use async_trait::async_trait;
use kin_application::ports::family_backend::FamilyBackend;
use kin_application::ports::tool_executor::ToolExecutorPort;
use kin_domain::{
    CatalogTool, Credential, ToolCall, ToolCatalog, ToolError, ToolRequest, ToolResult,
    parse_arguments,
};
use std::sync::Arc;
use tracing::debug;

use super::catalog::default_tool_catalog;

#[derive(Clone)]
pub struct BackendToolExecutor {
    catalog: ToolCatalog,
    backend: Arc<dyn FamilyBackend>,
}

impl BackendToolExecutor {
    /// Executor over the default catalog.
    pub fn new(backend: Arc<dyn FamilyBackend>) -> Self {
        Self::with_catalog(default_tool_catalog(), backend)
    }

    /// Executor restricted to `catalog`. Names outside it are unknown even if
    /// the backend could serve them.
    pub fn with_catalog(catalog: ToolCatalog, backend: Arc<dyn FamilyBackend>) -> Self {
        Self { catalog, backend }
    }

    fn resolve(&self, name: &str) -> Option<CatalogTool> {
        CatalogTool::from_name(name).filter(|_| self.catalog.contains(name))
    }

    async fn run(
        &self,
        call: &ToolCall,
        credential: Option<&Credential>,
    ) -> Result<serde_json::Value, ToolError> {
        let name = call.function_name.as_str();
        let args = parse_arguments(name, &call.function_args)?;
        let tool = self.resolve(name);

        if let Some(tool) = tool
            && tool.requires_auth()
            && credential.is_none()
        {
            return Err(ToolError::NotAuthenticated {
                tool: name.to_string(),
            });
        }

        let tool = tool.ok_or_else(|| ToolError::UnknownTool {
            tool: name.to_string(),
        })?;
        let request = ToolRequest::decode(tool, &args)?;
        debug!(tool = %request.tool(), call_id = %call.id, "Dispatching to backend");

        let backend = self.backend.as_ref();
        let response = match &request {
            ToolRequest::SearchFamily(a) => backend.search_family(a, credential).await,
            ToolRequest::GetFamily(a) => backend.get_family(a, credential).await,
            ToolRequest::SearchMembers(a) => backend.search_members(a, credential).await,
            ToolRequest::GetMember(a) => backend.get_member(a, credential).await,
            ToolRequest::SearchEvents(a) => backend.search_events(a, credential).await,
            ToolRequest::GetEvent(a) => backend.get_event(a, credential).await,
        };
        response.map_err(|e| ToolError::Backend(e.to_string()))
    }
}

#[async_trait]
impl ToolExecutorPort for BackendToolExecutor {
    fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    async fn execute(&self, call: &ToolCall, credential: Option<&Credential>) -> ToolResult {
        match self.run(call, credential).await {
            Ok(value) => ToolResult::success(&call.id, &value),
            Err(error) => {
                debug!(
                    tool = %call.function_name,
                    call_id = %call.id,
                    category = error.category().as_str(),
                    "Tool call rejected: {}",
                    error
                );
                ToolResult::failure(&call.id, &error)
            }
        }
    }
}
