//! Group (team) and membership models for the API service

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Color assigned to a membership until the member picks one
pub const DEFAULT_MEMBER_COLOR: &str = "#ed6c02";

/// Membership role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Leader,
    Member,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Leader => "leader",
            Role::Member => "member",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "leader" => Ok(Role::Leader),
            "member" => Ok(Role::Member),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

/// A group as seen by one of its members
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSummary {
    pub id: i64,
    pub name: String,
    #[serde(rename = "desc")]
    pub description: Option<String>,
    pub invite_code: Option<String>,
    pub role: Role,
    pub color: String,
    pub member_count: i64,
}

impl GroupSummary {
    /// Hide the invite code from anyone but the leader
    pub fn for_viewer(mut self) -> Self {
        if self.role != Role::Leader {
            self.invite_code = None;
        }
        self
    }
}

/// Member listing entry
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberView {
    /// Membership id, used to kick the member
    pub id: i64,
    pub user_id: String,
    pub nickname: String,
    pub role: Role,
}

/// Validated group fields
#[derive(Debug, Clone)]
pub struct NewGroup {
    pub name: String,
    pub description: Option<String>,
}

/// Request for group creation
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateGroupRequest {
    pub name: String,
    pub description: Option<String>,
}

/// Response for group creation
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupResponse {
    pub id: i64,
    pub invite_code: String,
}

/// Request for updating group information; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateGroupRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Request for joining a group
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JoinGroupRequest {
    pub invite_code: String,
}

/// Request for changing the caller's display color in a group
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ColorRequest {
    pub color: String,
}
