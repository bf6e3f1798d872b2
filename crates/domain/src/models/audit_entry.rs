//! Audit entry domain model.
//!
//! Every state-changing action on a tracked resource produces exactly one
//! audit entry before the action is considered complete. Entries are
//! append-only: once written they are never mutated, and the only deletion
//! path is the age-based retention sweep.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::net::IpAddr;
use std::str::FromStr;
use uuid::Uuid;

/// Audited action verbs. The set is open: verbs the engine does not know
/// about round-trip through `Other`, so records written by newer versions
/// still parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Approve,
    Reject,
    Cancel,
    Login,
    LoginFailed,
    #[serde(untagged)]
    Other(String),
}

impl FromStr for AuditAction {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "create" => AuditAction::Create,
            "update" => AuditAction::Update,
            "delete" => AuditAction::Delete,
            "approve" => AuditAction::Approve,
            "reject" => AuditAction::Reject,
            "cancel" => AuditAction::Cancel,
            "login" => AuditAction::Login,
            "login_failed" => AuditAction::LoginFailed,
            other => AuditAction::Other(other.to_string()),
        })
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditAction::Create => write!(f, "create"),
            AuditAction::Update => write!(f, "update"),
            AuditAction::Delete => write!(f, "delete"),
            AuditAction::Approve => write!(f, "approve"),
            AuditAction::Reject => write!(f, "reject"),
            AuditAction::Cancel => write!(f, "cancel"),
            AuditAction::Login => write!(f, "login"),
            AuditAction::LoginFailed => write!(f, "login_failed"),
            AuditAction::Other(s) => write!(f, "{}", s),
        }
    }
}

/// Resource kinds that can be audited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditResourceType {
    TimeEntry,
    LeaveRequest,
    User,
}

impl FromStr for AuditResourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "time_entry" => Ok(AuditResourceType::TimeEntry),
            "leave_request" => Ok(AuditResourceType::LeaveRequest),
            "user" => Ok(AuditResourceType::User),
            _ => Err(format!("Unknown audit resource type: {}", s)),
        }
    }
}

impl std::fmt::Display for AuditResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditResourceType::TimeEntry => write!(f, "time_entry"),
            AuditResourceType::LeaveRequest => write!(f, "leave_request"),
            AuditResourceType::User => write!(f, "user"),
        }
    }
}

/// Where the triggering request came from, when known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub struct RequestOrigin {
    pub ip_address: Option<IpAddr>,
    pub user_agent: Option<String>,
}

impl RequestOrigin {
    pub fn new(ip_address: Option<IpAddr>, user_agent: Option<String>) -> Self {
        Self {
            ip_address,
            user_agent,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ip_address.is_none() && self.user_agent.is_none()
    }
}

/// One immutable record of who did what to which resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AuditEntry {
    pub id: Uuid,
    /// The user who performed the action.
    pub actor_id: Uuid,
    pub action: AuditAction,
    pub resource_type: AuditResourceType,
    pub resource_id: Uuid,
    /// Insertion-order tie-break for identical timestamps.
    pub seq: i64,
    pub timestamp: DateTime<Utc>,
    /// Snapshot of the resource before the action, if it existed.
    pub previous_state: Option<JsonValue>,
    /// Snapshot of the resource after the action, if it still exists.
    pub new_state: Option<JsonValue>,
    pub note: Option<String>,
    pub origin: Option<RequestOrigin>,
}

/// Input for appending a new audit entry.
#[derive(Debug, Clone)]
pub struct CreateAuditEntryInput {
    pub actor_id: Uuid,
    pub action: AuditAction,
    pub resource_type: AuditResourceType,
    pub resource_id: Uuid,
    pub previous_state: Option<JsonValue>,
    pub new_state: Option<JsonValue>,
    pub note: Option<String>,
    pub origin: Option<RequestOrigin>,
}

impl CreateAuditEntryInput {
    pub fn new(
        actor_id: Uuid,
        action: AuditAction,
        resource_type: AuditResourceType,
        resource_id: Uuid,
    ) -> Self {
        Self {
            actor_id,
            action,
            resource_type,
            resource_id,
            previous_state: None,
            new_state: None,
            note: None,
            origin: None,
        }
    }

    pub fn with_previous_state(mut self, state: JsonValue) -> Self {
        self.previous_state = Some(state);
        self
    }

    pub fn with_new_state(mut self, state: JsonValue) -> Self {
        self.new_state = Some(state);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_origin(mut self, origin: RequestOrigin) -> Self {
        self.origin = Some(origin);
        self
    }
}

/// Query parameters for listing audit entries.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ListAuditEntriesQuery {
    pub page: Option<i32>,
    pub per_page: Option<i32>,
    pub actor_id: Option<Uuid>,
    pub action: Option<String>,
    pub resource_type: Option<String>,
    pub resource_id: Option<Uuid>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_action_roundtrip() {
        assert_eq!(AuditAction::from_str("create").unwrap(), AuditAction::Create);
        assert_eq!(
            AuditAction::from_str("login_failed").unwrap(),
            AuditAction::LoginFailed
        );
        assert_eq!(AuditAction::Approve.to_string(), "approve");
    }

    #[test]
    fn test_unknown_action_is_preserved() {
        let action = AuditAction::from_str("bulk_import").unwrap();
        assert_eq!(action, AuditAction::Other("bulk_import".to_string()));
        assert_eq!(action.to_string(), "bulk_import");
    }

    #[test]
    fn test_resource_type_roundtrip() {
        assert_eq!(
            AuditResourceType::from_str("time_entry").unwrap(),
            AuditResourceType::TimeEntry
        );
        assert_eq!(AuditResourceType::LeaveRequest.to_string(), "leave_request");
        assert!(AuditResourceType::from_str("holiday_calendar").is_err());
    }

    #[test]
    fn test_origin_is_empty() {
        assert!(RequestOrigin::default().is_empty());
        let origin = RequestOrigin::new(
            Some(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1))),
            Some("Mozilla/5.0".to_string()),
        );
        assert!(!origin.is_empty());
    }

    #[test]
    fn test_input_builder() {
        let actor = Uuid::new_v4();
        let resource = Uuid::new_v4();

        let input = CreateAuditEntryInput::new(
            actor,
            AuditAction::Update,
            AuditResourceType::TimeEntry,
            resource,
        )
        .with_previous_state(serde_json::json!({"description": "old"}))
        .with_new_state(serde_json::json!({"description": "new"}))
        .with_note("Time entry updated");

        assert_eq!(input.actor_id, actor);
        assert_eq!(input.resource_id, resource);
        assert_eq!(input.action, AuditAction::Update);
        assert!(input.previous_state.is_some());
        assert!(input.new_state.is_some());
        assert_eq!(input.note.as_deref(), Some("Time entry updated"));
    }
}
