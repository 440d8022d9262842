//! Test case and comment domain models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ParseEnumError;

// =============================================================================
// Enums
// =============================================================================

/// Test case priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "test_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// Kind of test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "test_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TestType {
    Functional,
    Negative,
    #[sqlx(rename = "ui/ux")]
    #[serde(rename = "ui/ux")]
    UiUx,
    Smoke,
    Regression,
    Api,
}

/// Execution status. Any status may be set from any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "test_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Draft,
    Success,
    Fail,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl TestType {
    pub fn as_str(self) -> &'static str {
        match self {
            TestType::Functional => "functional",
            TestType::Negative => "negative",
            TestType::UiUx => "ui/ux",
            TestType::Smoke => "smoke",
            TestType::Regression => "regression",
            TestType::Api => "api",
        }
    }
}

impl TestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TestStatus::Draft => "draft",
            TestStatus::Success => "success",
            TestStatus::Fail => "fail",
        }
    }

    /// Whether reaching this status means the case was executed.
    pub fn is_executed(self) -> bool {
        !matches!(self, TestStatus::Draft)
    }
}

impl FromStr for Priority {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(ParseEnumError {
                kind: "priority",
                allowed: "low, medium, high",
            }),
        }
    }
}

impl FromStr for TestType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "functional" => Ok(TestType::Functional),
            "negative" => Ok(TestType::Negative),
            "ui/ux" => Ok(TestType::UiUx),
            "smoke" => Ok(TestType::Smoke),
            "regression" => Ok(TestType::Regression),
            "api" => Ok(TestType::Api),
            _ => Err(ParseEnumError {
                kind: "test type",
                allowed: "functional, negative, ui/ux, smoke, regression, api",
            }),
        }
    }
}

impl FromStr for TestStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(TestStatus::Draft),
            "success" => Ok(TestStatus::Success),
            "fail" => Ok(TestStatus::Fail),
            _ => Err(ParseEnumError {
                kind: "status",
                allowed: "draft, success, fail",
            }),
        }
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// DB row structs
// =============================================================================

/// Database row for `test_cases`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseRow {
    pub id: Uuid,
    pub project_id: Uuid,
    pub tab_name: String,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub test_type: TestType,
    pub steps: String,
    pub expected_result: String,
    pub actual_result: String,
    pub status: TestStatus,
    pub assigned_to: Option<Uuid>,
    pub executed_at: Option<DateTime<Utc>>,
    pub is_template: bool,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A comment joined with its author's username.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CommentRow {
    pub id: Uuid,
    pub test_case_id: Uuid,
    pub author_id: Option<Uuid>,
    pub author_username: Option<String>,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Write models
// =============================================================================

/// Validated fields for a new test case.
#[derive(Debug, Clone)]
pub struct NewTestCase {
    pub project_id: Uuid,
    pub tab_name: String,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub test_type: TestType,
    pub steps: String,
    pub expected_result: String,
    pub actual_result: String,
    pub assigned_to: Option<Uuid>,
    pub is_template: bool,
}

/// Validated partial update. `None` leaves a column unchanged.
///
/// `assigned_to` is doubly optional: `Some(None)` clears the assignee.
#[derive(Debug, Clone, Default)]
pub struct TestCaseChanges {
    pub tab_name: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub test_type: Option<TestType>,
    pub steps: Option<String>,
    pub expected_result: Option<String>,
    pub actual_result: Option<String>,
    pub status: Option<TestStatus>,
    pub assigned_to: Option<Option<Uuid>>,
    pub is_template: Option<bool>,
}

/// Listing filter for test cases within one project.
#[derive(Debug, Clone, Default)]
pub struct TestCaseFilter {
    pub tab_name: Option<String>,
    pub status: Option<TestStatus>,
    pub is_template: Option<bool>,
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ui_ux_round_trips_through_serde() {
        let json = serde_json::to_string(&TestType::UiUx).unwrap();
        assert_eq!(json, "\"ui/ux\"");
        let back: TestType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, TestType::UiUx);
    }

    #[test]
    fn enums_parse_trimmed_lowercase() {
        assert_eq!("HIGH".parse::<Priority>(), Ok(Priority::High));
        assert_eq!(" UI/UX".parse::<TestType>(), Ok(TestType::UiUx));
        assert_eq!("Fail".parse::<TestStatus>(), Ok(TestStatus::Fail));
    }

    #[test]
    fn unknown_status_names_allowed_values() {
        let err = "done".parse::<TestStatus>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid status. Must be one of: draft, success, fail"
        );
    }

    #[test]
    fn only_draft_is_unexecuted() {
        assert!(!TestStatus::Draft.is_executed());
        assert!(TestStatus::Success.is_executed());
        assert!(TestStatus::Fail.is_executed());
    }
}
