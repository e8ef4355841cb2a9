//! The fixed tool catalog: family, member and event lookups.
//!
//! Definitions are plain data. Whether a tool needs a credential is decided by
//! [`CatalogTool::requires_auth`](kin_domain::CatalogTool::requires_auth), and
//! argument decoding lives in the domain layer.

use kin_domain::{CatalogTool, ParamType, ToolCatalog, ToolDefinition};

pub fn search_family_definition() -> ToolDefinition {
    ToolDefinition::new(
        CatalogTool::SearchFamily.as_str(),
        "Search families by name. Returns matching families with their ids.",
    )
    .with_parameter(
        "query",
        ParamType::String,
        "Family name or part of it",
        true,
    )
}

pub fn get_family_definition() -> ToolDefinition {
    ToolDefinition::new(
        CatalogTool::GetFamily.as_str(),
        "Get one family by id, including its address and member count.",
    )
    .with_parameter("family_id", ParamType::Guid, "Id of the family", true)
}

pub fn search_members_definition() -> ToolDefinition {
    ToolDefinition::new(
        CatalogTool::SearchMembers.as_str(),
        "Search family members by name, optionally within one family.",
    )
    .with_parameter("query", ParamType::String, "Member name or part of it", true)
    .with_parameter(
        "family_id",
        ParamType::Guid,
        "Only return members of this family",
        false,
    )
}

pub fn get_member_definition() -> ToolDefinition {
    ToolDefinition::new(
        CatalogTool::GetMember.as_str(),
        "Get one family member by id, including birthday and relations.",
    )
    .with_parameter("member_id", ParamType::Guid, "Id of the member", true)
}

pub fn search_events_definition() -> ToolDefinition {
    ToolDefinition::new(
        CatalogTool::SearchEvents.as_str(),
        "Search family events (birthdays, anniversaries, gatherings). All filters are optional.",
    )
    .with_parameter(
        "family_id",
        ParamType::Guid,
        "Only return events of this family",
        false,
    )
    .with_parameter("query", ParamType::String, "Text to match in the event title", false)
    .with_parameter("from", ParamType::Date, "Earliest event date (inclusive)", false)
    .with_parameter("to", ParamType::Date, "Latest event date (inclusive)", false)
}

pub fn get_event_definition() -> ToolDefinition {
    ToolDefinition::new(
        CatalogTool::GetEvent.as_str(),
        "Get one family event by id.",
    )
    .with_parameter("event_id", ParamType::Guid, "Id of the event", true)
}

/// Create the catalog offered to every model round.
pub fn default_tool_catalog() -> ToolCatalog {
    ToolCatalog::new(vec![
        search_family_definition(),
        get_family_definition(),
        search_members_definition(),
        get_member_definition(),
        search_events_definition(),
        get_event_definition(),
    ])
}
