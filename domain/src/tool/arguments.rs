//! Typed tool arguments.
//!
//! The model hands us raw JSON text. [`parse_arguments`] turns it into a JSON
//! object, and [`ToolRequest::decode`] turns that object into one typed
//! request per catalog tool. Every failure is a [`ToolError`] whose text is
//! fed back to the model, never a panic.

use super::value_objects::ToolError;
use chrono::NaiveDate;
use serde_json::{Map, Value};
use uuid::Uuid;

/// The closed set of tools the executor knows how to dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogTool {
    SearchFamily,
    GetFamily,
    SearchMembers,
    GetMember,
    SearchEvents,
    GetEvent,
}

impl CatalogTool {
    pub const ALL: [CatalogTool; 6] = [
        CatalogTool::SearchFamily,
        CatalogTool::GetFamily,
        CatalogTool::SearchMembers,
        CatalogTool::GetMember,
        CatalogTool::SearchEvents,
        CatalogTool::GetEvent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogTool::SearchFamily => "search_family",
            CatalogTool::GetFamily => "get_family",
            CatalogTool::SearchMembers => "search_members",
            CatalogTool::GetMember => "get_member",
            CatalogTool::SearchEvents => "search_events",
            CatalogTool::GetEvent => "get_event",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }

    /// Member and event data is personal; reading it needs a bearer credential.
    pub fn requires_auth(&self) -> bool {
        matches!(
            self,
            CatalogTool::SearchMembers
                | CatalogTool::GetMember
                | CatalogTool::SearchEvents
                | CatalogTool::GetEvent
        )
    }
}

impl std::fmt::Display for CatalogTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFamilyArgs {
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetFamilyArgs {
    pub family_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchMembersArgs {
    pub query: String,
    pub family_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetMemberArgs {
    pub member_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchEventsArgs {
    pub family_id: Option<Uuid>,
    pub query: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetEventArgs {
    pub event_id: Uuid,
}

/// A decoded, well-typed tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolRequest {
    SearchFamily(SearchFamilyArgs),
    GetFamily(GetFamilyArgs),
    SearchMembers(SearchMembersArgs),
    GetMember(GetMemberArgs),
    SearchEvents(SearchEventsArgs),
    GetEvent(GetEventArgs),
}

impl ToolRequest {
    pub fn tool(&self) -> CatalogTool {
        match self {
            ToolRequest::SearchFamily(_) => CatalogTool::SearchFamily,
            ToolRequest::GetFamily(_) => CatalogTool::GetFamily,
            ToolRequest::SearchMembers(_) => CatalogTool::SearchMembers,
            ToolRequest::GetMember(_) => CatalogTool::GetMember,
            ToolRequest::SearchEvents(_) => CatalogTool::SearchEvents,
            ToolRequest::GetEvent(_) => CatalogTool::GetEvent,
        }
    }

    /// Decode an argument object for `tool`.
    ///
    /// Unknown keys are ignored; `null` counts as absent.
    pub fn decode(tool: CatalogTool, args: &Map<String, Value>) -> Result<Self, ToolError> {
        let reader = ArgReader { tool, args };
        let request = match tool {
            CatalogTool::SearchFamily => ToolRequest::SearchFamily(SearchFamilyArgs {
                query: reader.required_string("query")?,
            }),
            CatalogTool::GetFamily => ToolRequest::GetFamily(GetFamilyArgs {
                family_id: reader.required_guid("family_id")?,
            }),
            CatalogTool::SearchMembers => ToolRequest::SearchMembers(SearchMembersArgs {
                query: reader.required_string("query")?,
                family_id: reader.optional_guid("family_id")?,
            }),
            CatalogTool::GetMember => ToolRequest::GetMember(GetMemberArgs {
                member_id: reader.required_guid("member_id")?,
            }),
            CatalogTool::SearchEvents => {
                let args = SearchEventsArgs {
                    family_id: reader.optional_guid("family_id")?,
                    query: reader.optional_string("query")?,
                    from: reader.optional_date("from")?,
                    to: reader.optional_date("to")?,
                };
                if let (Some(from), Some(to)) = (args.from, args.to)
                    && to < from
                {
                    return Err(reader.invalid("to", "must not be before 'from'"));
                }
                ToolRequest::SearchEvents(args)
            }
            CatalogTool::GetEvent => ToolRequest::GetEvent(GetEventArgs {
                event_id: reader.required_guid("event_id")?,
            }),
        };
        Ok(request)
    }
}

/// Parse the model's raw argument text into a JSON object.
///
/// Blank text is read as `{}`; anything else must parse to an object.
pub fn parse_arguments(tool_name: &str, raw: &str) -> Result<Map<String, Value>, ToolError> {
    if raw.trim().is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        _ => Err(ToolError::InvalidJson {
            tool: tool_name.to_string(),
        }),
    }
}

struct ArgReader<'a> {
    tool: CatalogTool,
    args: &'a Map<String, Value>,
}

impl ArgReader<'_> {
    fn missing(&self, field: &str) -> ToolError {
        ToolError::MissingArgument {
            tool: self.tool.as_str().to_string(),
            field: field.to_string(),
        }
    }

    fn invalid(&self, field: &str, reason: impl Into<String>) -> ToolError {
        ToolError::InvalidArgument {
            tool: self.tool.as_str().to_string(),
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// Present, non-blank string value. Blank strings read as absent.
    fn optional_string(&self, field: &str) -> Result<Option<String>, ToolError> {
        match self.args.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => {
                let trimmed = s.trim();
                Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
            }
            Some(_) => Err(self.invalid(field, "expected a string")),
        }
    }

    fn required_string(&self, field: &str) -> Result<String, ToolError> {
        self.optional_string(field)?
            .ok_or_else(|| self.missing(field))
    }

    fn optional_guid(&self, field: &str) -> Result<Option<Uuid>, ToolError> {
        self.optional_string(field)?
            .map(|s| {
                Uuid::parse_str(&s).map_err(|_| self.invalid(field, format!("'{}' is not a GUID", s)))
            })
            .transpose()
    }

    fn required_guid(&self, field: &str) -> Result<Uuid, ToolError> {
        self.optional_guid(field)?.ok_or_else(|| self.missing(field))
    }

    /// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp (date part kept).
    fn optional_date(&self, field: &str) -> Result<Option<NaiveDate>, ToolError> {
        self.optional_string(field)?
            .map(|s| {
                NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                    .or_else(|_| {
                        chrono::DateTime::parse_from_rfc3339(&s).map(|dt| dt.date_naive())
                    })
                    .map_err(|_| self.invalid(field, format!("'{}' is not a YYYY-MM-DD date", s)))
            })
            .transpose()
    }
}
