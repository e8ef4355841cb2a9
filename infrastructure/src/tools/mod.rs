//! Tool implementations for the family assistant
//!
//! - `catalog`: the fixed set of tool definitions offered to the model
//! - `executor`: dispatches model-issued calls to the family backend
//! - `schema`: JSON Schema rendering of the catalog for provider requests

pub mod catalog;
pub mod schema;

mod executor;

pub use catalog::default_tool_catalog;
pub use executor::BackendToolExecutor;
pub use schema::JsonSchemaToolConverter;
