//! Tool domain entities

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;

/// Value type of a tool parameter as advertised to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    /// Free-form text
    String,
    /// GUID of a backend entity (family, member, event)
    Guid,
    /// Calendar date in ISO 8601 form (`YYYY-MM-DD`)
    Date,
}

impl ParamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Guid => "guid",
            ParamType::Date => "date",
        }
    }
}

impl std::fmt::Display for ParamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Schema of a single named parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSpec {
    #[serde(rename = "type")]
    pub param_type: ParamType,
    pub description: String,
}

/// Parameter schema of a tool: named properties plus the set of required names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolParameters {
    pub properties: BTreeMap<String, ParameterSpec>,
    pub required: BTreeSet<String>,
}

/// Definition of an operation the model may invoke.
///
/// Built once at startup as part of the [`ToolCatalog`] and never mutated
/// by a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique name of the tool (e.g., "search_family")
    pub name: String,
    /// Natural-language description consumed by the model
    pub description: String,
    /// Parameter schema
    pub parameters: ToolParameters,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: ToolParameters::default(),
        }
    }

    /// Add a parameter (builder pattern)
    pub fn with_parameter(
        mut self,
        name: impl Into<String>,
        param_type: ParamType,
        description: impl Into<String>,
        required: bool,
    ) -> Self {
        let name = name.into();
        if required {
            self.parameters.required.insert(name.clone());
        }
        self.parameters.properties.insert(
            name,
            ParameterSpec {
                param_type,
                description: description.into(),
            },
        );
        self
    }

    pub fn is_required(&self, parameter: &str) -> bool {
        self.parameters.required.contains(parameter)
    }

    pub fn parameter(&self, parameter: &str) -> Option<&ParameterSpec> {
        self.parameters.properties.get(parameter)
    }
}

/// The fixed set of tools offered to the model.
///
/// Cloning is cheap and shares the underlying storage, so the catalog handed
/// to the second model round is the very same value as the first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCatalog {
    tools: Arc<[ToolDefinition]>,
}

impl ToolCatalog {
    /// Build a catalog. Later definitions with an already-seen name are dropped.
    pub fn new(tools: Vec<ToolDefinition>) -> Self {
        let mut seen = HashSet::new();
        let tools: Vec<ToolDefinition> = tools
            .into_iter()
            .filter(|t| seen.insert(t.name.clone()))
            .collect();
        Self {
            tools: tools.into(),
        }
    }

    pub fn list(&self) -> &[ToolDefinition] {
        &self.tools
    }

    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.iter().find(|t| t.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// True when both handles point at the same storage.
    pub fn shares_storage(&self, other: &ToolCatalog) -> bool {
        Arc::ptr_eq(&self.tools, &other.tools)
    }
}

/// A model-issued request to invoke one named tool.
///
/// `function_args` is the raw, untrusted JSON text produced by the model.
/// It is only interpreted by the tool executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Correlates this call with its result within one turn
    pub id: String,
    pub function_name: String,
    pub function_args: String,
}

impl ToolCall {
    pub fn new(
        id: impl Into<String>,
        function_name: impl Into<String>,
        function_args: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            function_name: function_name.into(),
            function_args: function_args.into(),
        }
    }
}
