//! JSON Schema tool converter.
//!
//! Produces provider-neutral JSON Schema for the tool catalog. Each provider
//! adapter wraps the result in its own envelope.

use kin_domain::{ParamType, ParameterSpec, ToolCatalog, ToolDefinition};
use serde_json::{Map, Value, json};

/// Converts [`ToolDefinition`]s to JSON Schema.
///
/// Handles param_type → JSON Schema mapping:
/// - `string` → `{"type": "string"}`
/// - `guid` → `{"type": "string", "format": "uuid"}`
/// - `date` → `{"type": "string", "format": "date"}`
///
/// Some vendors reject unknown `format` values. For those,
/// [`without_formats`](Self::without_formats) folds the hint into the
/// description instead.
#[derive(Debug, Clone, Copy)]
pub struct JsonSchemaToolConverter {
    formats: bool,
}

impl Default for JsonSchemaToolConverter {
    fn default() -> Self {
        Self { formats: true }
    }
}

impl JsonSchemaToolConverter {
    pub fn without_formats() -> Self {
        Self { formats: false }
    }

    fn property_schema(&self, spec: &ParameterSpec) -> Value {
        let format = match spec.param_type {
            ParamType::String => None,
            ParamType::Guid => Some(("uuid", "UUID")),
            ParamType::Date => Some(("date", "date, YYYY-MM-DD")),
        };

        let mut prop = Map::new();
        prop.insert("type".to_string(), json!("string"));
        match format {
            Some((format, _)) if self.formats => {
                prop.insert("format".to_string(), json!(format));
                prop.insert("description".to_string(), json!(spec.description));
            }
            Some((_, hint)) => {
                prop.insert(
                    "description".to_string(),
                    json!(format!("{} ({})", spec.description, hint)),
                );
            }
            None => {
                prop.insert("description".to_string(), json!(spec.description));
            }
        }
        Value::Object(prop)
    }

    /// The `{"type": "object", ...}` schema of a tool's arguments.
    pub fn parameters_schema(&self, tool: &ToolDefinition) -> Value {
        let properties: Map<String, Value> = tool
            .parameters
            .properties
            .iter()
            .map(|(name, spec)| (name.clone(), self.property_schema(spec)))
            .collect();
        let required: Vec<&String> = tool.parameters.required.iter().collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    pub fn tool_to_schema(&self, tool: &ToolDefinition) -> Value {
        json!({
            "name": tool.name,
            "description": tool.description,
            "parameters": self.parameters_schema(tool),
        })
    }

    /// Schemas for every tool, sorted by name.
    pub fn catalog_schema(&self, catalog: &ToolCatalog) -> Vec<Value> {
        let mut tools: Vec<&ToolDefinition> = catalog.list().iter().collect();
        tools.sort_by_key(|t| &t.name);
        tools.into_iter().map(|t| self.tool_to_schema(t)).collect()
    }
}
