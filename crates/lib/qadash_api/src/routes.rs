//! Route paths.

pub const GET_HEALTH: &str = "/health";

pub const POST_AUTH_REGISTER: &str = "/api/auth/register";
pub const POST_AUTH_LOGIN: &str = "/api/auth/login";
pub const POST_AUTH_FORGOT_PASSWORD: &str = "/api/auth/forgot-password";
pub const POST_AUTH_RESET_PASSWORD: &str = "/api/auth/reset-password";
pub const AUTH_ME: &str = "/api/auth/me";
pub const POST_AUTH_CHANGE_PASSWORD: &str = "/api/auth/change-password";

pub const GET_USERS: &str = "/api/users";
pub const PUT_USERS_ID_ROLE: &str = "/api/users/{id}/role";

pub const PROJECTS: &str = "/api/projects";
pub const PROJECTS_ID: &str = "/api/projects/{id}";
pub const GET_PROJECTS_INVITE_CODE: &str = "/api/projects/invite/{code}";
pub const PROJECTS_ID_TABS: &str = "/api/projects/{id}/tabs";
pub const PROJECTS_ID_MEMBERS: &str = "/api/projects/{id}/members";
pub const PROJECTS_ID_MEMBERS_USER_ID: &str = "/api/projects/{id}/members/{user_id}";
pub const PROJECTS_ID_INVITES: &str = "/api/projects/{id}/invites";
pub const DELETE_PROJECTS_ID_INVITES_INVITE_ID: &str = "/api/projects/{id}/invites/{invite_id}";

pub const GET_INVITES_TOKEN: &str = "/api/invites/{token}";
pub const POST_INVITES_TOKEN_ACCEPT: &str = "/api/invites/{token}/accept";

pub const TEST_CASES: &str = "/api/test-cases";
pub const TEST_CASES_ID: &str = "/api/test-cases/{id}";
pub const PATCH_TEST_CASES_ID_STATUS: &str = "/api/test-cases/{id}/status";
pub const TEST_CASES_ID_COMMENTS: &str = "/api/test-cases/{id}/comments";
pub const POST_TEST_CASES_ID_INSTANTIATE: &str = "/api/test-cases/{id}/instantiate";
pub const POST_TEST_CASES_BULK_STATUS: &str = "/api/test-cases/bulk-status";
pub const DELETE_TEST_CASES_BULK: &str = "/api/test-cases/bulk";
pub const GET_TEST_CASES_EXPORT: &str = "/api/test-cases/export/{format}/{project_id}";

pub const GET_STATISTICS: &str = "/api/statistics";
