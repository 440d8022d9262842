//! Request and response bodies. All JSON uses camelCase field names.

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use qadash_core::models::auth::{User, UserRole};
use qadash_core::models::project::{InviteRow, MemberRow, ProjectRole};

/// Body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub database: bool,
    pub version: String,
}

// =============================================================================
// Auth
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// The identifier may be an email address or a username.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(alias = "email", alias = "username")]
    pub identifier: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: User,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub token: String,
    #[serde(alias = "password")]
    pub new_password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProfileRequest {
    pub username: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateUserRoleRequest {
    pub role: UserRole,
}

// =============================================================================
// Projects
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddTabRequest {
    #[serde(alias = "tabName")]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameTabRequest {
    pub old_name: String,
    pub new_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteTabRequest {
    #[serde(alias = "tabName")]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabsResponse {
    pub message: String,
    pub tabs: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_test_cases: Option<u64>,
}

// =============================================================================
// Members & invites
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerSummary {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MembersResponse {
    pub owner: OwnerSummary,
    pub members: Vec<MemberRow>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddMemberRequest {
    pub email: String,
    pub role: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateMemberRoleRequest {
    pub role: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateInviteRequest {
    pub email: String,
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvitesResponse {
    pub invites: Vec<InviteRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptInviteResponse {
    pub message: String,
    pub project_id: Uuid,
    pub role: ProjectRole,
}

// =============================================================================
// Test cases
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTestCaseRequest {
    pub project_id: Uuid,
    #[serde(alias = "tabSection")]
    pub tab_name: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<String>,
    #[serde(alias = "type")]
    pub test_type: Option<String>,
    pub steps: String,
    pub expected_result: String,
    pub actual_result: Option<String>,
    pub assigned_to: Option<Uuid>,
    #[serde(default)]
    pub is_template: bool,
}

/// Partial update. Omitted fields are left unchanged; `"assignedTo": null`
/// clears the assignee.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTestCaseRequest {
    #[serde(alias = "tabSection")]
    pub tab_name: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    #[serde(alias = "type")]
    pub test_type: Option<String>,
    pub steps: Option<String>,
    pub expected_result: Option<String>,
    pub actual_result: Option<String>,
    pub status: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub assigned_to: Option<Option<Uuid>>,
    pub is_template: Option<bool>,
}

/// Distinguish an absent field (`None`) from an explicit `null` (`Some(None)`).
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTestCasesQuery {
    pub project_id: Uuid,
    #[serde(alias = "tabName")]
    pub tab: Option<String>,
    pub status: Option<String>,
    pub is_template: Option<bool>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkStatusRequest {
    #[serde(alias = "testCaseIds")]
    pub ids: Vec<Uuid>,
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkDeleteRequest {
    #[serde(alias = "testCaseIds")]
    pub ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkResponse {
    pub message: String,
    pub count: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCommentRequest {
    #[serde(alias = "text", alias = "content")]
    pub body: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstantiateTemplateRequest {
    pub tab_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assigned_to_distinguishes_null_from_absent() {
        let absent: UpdateTestCaseRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.assigned_to, None);

        let cleared: UpdateTestCaseRequest =
            serde_json::from_str(r#"{"assignedTo": null}"#).unwrap();
        assert_eq!(cleared.assigned_to, Some(None));

        let id = Uuid::now_v7();
        let set: UpdateTestCaseRequest =
            serde_json::from_str(&format!(r#"{{"assignedTo": "{id}"}}"#)).unwrap();
        assert_eq!(set.assigned_to, Some(Some(id)));
    }

    #[test]
    fn login_accepts_email_or_username_keys() {
        let by_email: LoginRequest =
            serde_json::from_str(r#"{"email": "a@b.io", "password": "x"}"#).unwrap();
        assert_eq!(by_email.identifier, "a@b.io");
        let by_name: LoginRequest =
            serde_json::from_str(r#"{"username": "alice", "password": "x"}"#).unwrap();
        assert_eq!(by_name.identifier, "alice");
    }

    #[test]
    fn create_test_case_accepts_legacy_keys() {
        let body = format!(
            r#"{{"projectId": "{}", "tabSection": "Smoke", "title": "Login", "type": "api",
                "steps": "s", "expectedResult": "e"}}"#,
            Uuid::nil()
        );
        let req: CreateTestCaseRequest = serde_json::from_str(&body).unwrap();
        assert_eq!(req.tab_name.as_deref(), Some("Smoke"));
        assert_eq!(req.test_type.as_deref(), Some("api"));
        assert!(!req.is_template);
    }
}
