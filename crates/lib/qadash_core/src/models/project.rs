//! Project, membership and invite domain models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ParseEnumError;

/// Name of the tab every project starts with. It cannot be deleted.
pub const DEFAULT_TAB: &str = "General";

/// Role a non-owner holds within a project.
///
/// Variants are ordered by privilege so `Admin > Editor > Viewer`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "project_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProjectRole {
    Viewer,
    Editor,
    Admin,
}

impl ProjectRole {
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectRole::Admin => "admin",
            ProjectRole::Editor => "editor",
            ProjectRole::Viewer => "viewer",
        }
    }
}

impl fmt::Display for ProjectRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectRole {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(ProjectRole::Admin),
            "editor" => Ok(ProjectRole::Editor),
            "viewer" => Ok(ProjectRole::Viewer),
            _ => Err(ParseEnumError {
                kind: "role",
                allowed: "admin, editor, viewer",
            }),
        }
    }
}

/// Database row for `projects`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: String,
    pub invite_code: String,
    pub tabs: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A project as seen by one caller, annotated with the caller's role
/// (`owner`, `admin`, `editor` or `viewer`).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProjectListItem {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub project: ProjectRow,
    pub my_role: String,
}

/// Minimal project view returned by invite-code lookup.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub owner_username: String,
}

/// Project member with user profile fields, for listings.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MemberRow {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub role: ProjectRole,
    pub added_at: DateTime<Utc>,
}

/// Database row for `project_invites` (the token hash is never selected).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct InviteRow {
    pub id: Uuid,
    pub project_id: Uuid,
    pub email: String,
    pub role: ProjectRole,
    pub invited_by: Uuid,
    pub expires_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub accepted_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Lifecycle state of an invite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InviteState {
    Pending,
    Accepted,
    Expired,
}

impl InviteState {
    /// State at `now`. Acceptance wins over expiry.
    pub fn at(
        accepted_at: Option<DateTime<Utc>>,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        if accepted_at.is_some() {
            InviteState::Accepted
        } else if expires_at <= now {
            InviteState::Expired
        } else {
            InviteState::Pending
        }
    }
}

impl InviteRow {
    pub fn state_at(&self, now: DateTime<Utc>) -> InviteState {
        InviteState::at(self.accepted_at, self.expires_at, now)
    }
}

/// Public view of an invite, shown before the recipient signs in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitePreview {
    pub project_id: Uuid,
    pub project_name: String,
    pub email: String,
    pub role: ProjectRole,
    pub invited_by: String,
    pub expires_at: DateTime<Utc>,
    pub state: InviteState,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn invite(expires_in: Duration, accepted: bool) -> InviteRow {
        let now = Utc::now();
        InviteRow {
            id: Uuid::nil(),
            project_id: Uuid::nil(),
            email: "a@example.com".into(),
            role: ProjectRole::Editor,
            invited_by: Uuid::nil(),
            expires_at: now + expires_in,
            accepted_at: accepted.then_some(now),
            accepted_by: None,
            created_at: now,
        }
    }

    #[test]
    fn roles_are_ordered_by_privilege() {
        assert!(ProjectRole::Admin > ProjectRole::Editor);
        assert!(ProjectRole::Editor > ProjectRole::Viewer);
    }

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!("Editor".parse::<ProjectRole>(), Ok(ProjectRole::Editor));
        assert_eq!(" admin ".parse::<ProjectRole>(), Ok(ProjectRole::Admin));
        assert!("owner".parse::<ProjectRole>().is_err());
    }

    #[test]
    fn invite_state_tracks_expiry_and_acceptance() {
        let now = Utc::now();
        assert_eq!(
            invite(Duration::hours(1), false).state_at(now),
            InviteState::Pending
        );
        assert_eq!(
            invite(Duration::hours(-1), false).state_at(now),
            InviteState::Expired
        );
        assert_eq!(
            invite(Duration::hours(-1), true).state_at(now),
            InviteState::Accepted
        );
    }
}
