//! Input validation for user-supplied fields.
//!
//! Each validator returns the normalized value (trimmed, lower-cased where
//! appropriate) or a message suitable for a 400 response.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// A field failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

pub type Result<T> = std::result::Result<T, ValidationError>;

pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const MAX_PASSWORD_LENGTH: usize = 100;
pub const MIN_USERNAME_LENGTH: usize = 3;
pub const MAX_USERNAME_LENGTH: usize = 30;
pub const MAX_EMAIL_LENGTH: usize = 255;
pub const MAX_PROJECT_NAME_LENGTH: usize = 100;
pub const MAX_DESCRIPTION_LENGTH: usize = 500;
pub const MIN_TITLE_LENGTH: usize = 3;
pub const MAX_TITLE_LENGTH: usize = 200;
pub const MAX_STEPS_LENGTH: usize = 5000;
pub const MAX_RESULT_LENGTH: usize = 1000;
pub const MAX_COMMENT_LENGTH: usize = 1000;
pub const MAX_TAB_NAME_LENGTH: usize = 50;
pub const MAX_SEARCH_LENGTH: usize = 200;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
});

static USERNAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("valid username regex"));

const TAB_FORBIDDEN_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

fn err<T>(msg: impl Into<String>) -> Result<T> {
    Err(ValidationError(msg.into()))
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Validate and normalize an email address (trimmed, lower-cased).
pub fn email(value: &str) -> Result<String> {
    let value = value.trim().to_lowercase();
    if value.is_empty() {
        return err("Email is required");
    }
    if char_len(&value) > MAX_EMAIL_LENGTH {
        return err(format!(
            "Email is too long (max {MAX_EMAIL_LENGTH} characters)"
        ));
    }
    if !EMAIL_PATTERN.is_match(&value) {
        return err("Invalid email format");
    }
    Ok(value)
}

/// Validate a username: 3–30 letters, digits, hyphens or underscores.
pub fn username(value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return err("Username is required");
    }
    let len = char_len(value);
    if len < MIN_USERNAME_LENGTH {
        return err(format!(
            "Username must be at least {MIN_USERNAME_LENGTH} characters"
        ));
    }
    if len > MAX_USERNAME_LENGTH {
        return err(format!(
            "Username must be at most {MAX_USERNAME_LENGTH} characters"
        ));
    }
    if !USERNAME_PATTERN.is_match(value) {
        return err("Username can only contain letters, numbers, hyphens, and underscores");
    }
    Ok(value.to_string())
}

/// Check password strength. Passwords are never trimmed.
pub fn password(value: &str) -> Result<()> {
    if value.is_empty() {
        return err("Password is required");
    }
    let len = char_len(value);
    if len < MIN_PASSWORD_LENGTH {
        return err(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        ));
    }
    if len > MAX_PASSWORD_LENGTH {
        return err(format!(
            "Password is too long (max {MAX_PASSWORD_LENGTH} characters)"
        ));
    }
    if !value.chars().any(|c| c.is_ascii_alphabetic()) {
        return err("Password must contain at least one letter");
    }
    if !value.chars().any(|c| c.is_ascii_digit()) {
        return err("Password must contain at least one number");
    }
    Ok(())
}

pub fn project_name(value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return err("Project name is required");
    }
    if char_len(value) > MAX_PROJECT_NAME_LENGTH {
        return err(format!(
            "Project name is too long (max {MAX_PROJECT_NAME_LENGTH} characters)"
        ));
    }
    Ok(value.to_string())
}

/// Optional free-text description; missing means empty.
pub fn description(value: Option<&str>) -> Result<String> {
    let value = value.unwrap_or_default().trim();
    if char_len(value) > MAX_DESCRIPTION_LENGTH {
        return err(format!(
            "Description is too long (max {MAX_DESCRIPTION_LENGTH} characters)"
        ));
    }
    Ok(value.to_string())
}

pub fn title(value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return err("Title is required");
    }
    let len = char_len(value);
    if len < MIN_TITLE_LENGTH {
        return err(format!(
            "Title must be at least {MIN_TITLE_LENGTH} characters"
        ));
    }
    if len > MAX_TITLE_LENGTH {
        return err(format!(
            "Title is too long (max {MAX_TITLE_LENGTH} characters)"
        ));
    }
    Ok(value.to_string())
}

pub fn steps(value: &str) -> Result<String> {
    required_text(value, "Test steps are required", "Steps", MAX_STEPS_LENGTH)
}

pub fn expected_result(value: &str) -> Result<String> {
    required_text(
        value,
        "Expected result is required",
        "Expected result",
        MAX_RESULT_LENGTH,
    )
}

pub fn actual_result(value: Option<&str>) -> Result<String> {
    let value = value.unwrap_or_default().trim();
    if char_len(value) > MAX_RESULT_LENGTH {
        return err(format!(
            "Actual result is too long (max {MAX_RESULT_LENGTH} characters)"
        ));
    }
    Ok(value.to_string())
}

pub fn comment(value: &str) -> Result<String> {
    required_text(
        value,
        "Comment cannot be empty",
        "Comment",
        MAX_COMMENT_LENGTH,
    )
}

/// Validate a tab name: 1–50 chars, none of `<>:"/\|?*`.
pub fn tab_name(value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return err("Tab name is required");
    }
    if char_len(value) > MAX_TAB_NAME_LENGTH {
        return err(format!(
            "Tab name is too long (max {MAX_TAB_NAME_LENGTH} characters)"
        ));
    }
    if value.contains(TAB_FORBIDDEN_CHARS) {
        return err("Tab name contains invalid characters");
    }
    Ok(value.to_string())
}

/// Trim, cap and strip bracket characters from a search query.
/// Returns `None` when nothing searchable is left.
pub fn search_query(value: &str) -> Option<String> {
    let cleaned: String = value
        .trim()
        .chars()
        .take(MAX_SEARCH_LENGTH)
        .filter(|c| !matches!(c, '<' | '>' | '{' | '}' | '[' | ']' | '\\'))
        .collect();
    let cleaned = cleaned.trim();
    (!cleaned.is_empty()).then(|| cleaned.to_string())
}

fn required_text(value: &str, missing: &str, field: &str, max: usize) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return err(missing);
    }
    if char_len(value) > max {
        return err(format!("{field} is too long (max {max} characters)"));
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_normalized() {
        assert_eq!(email("  Jane.Doe@Example.COM ").unwrap(), "jane.doe@example.com");
    }

    #[test]
    fn email_rejects_bad_shapes() {
        assert!(email("").is_err());
        assert!(email("not-an-email").is_err());
        assert!(email("a@b").is_err());
        let long = format!("{}@example.com", "a".repeat(250));
        assert_eq!(
            email(&long).unwrap_err().0,
            "Email is too long (max 255 characters)"
        );
    }

    #[test]
    fn username_rules() {
        assert_eq!(username(" qa_tester-1 ").unwrap(), "qa_tester-1");
        assert!(username("ab").is_err());
        assert!(username(&"a".repeat(31)).is_err());
        assert!(username("has space").is_err());
    }

    #[test]
    fn password_requires_letter_and_digit() {
        assert!(password("abc123").is_ok());
        assert_eq!(
            password("abc12").unwrap_err().0,
            "Password must be at least 6 characters"
        );
        assert_eq!(
            password("abcdefg").unwrap_err().0,
            "Password must contain at least one number"
        );
        assert_eq!(
            password("1234567").unwrap_err().0,
            "Password must contain at least one letter"
        );
        assert!(password(&format!("a1{}", "x".repeat(99))).is_err());
    }

    #[test]
    fn optional_fields_default_to_empty() {
        assert_eq!(description(None).unwrap(), "");
        assert_eq!(actual_result(Some("  ")).unwrap(), "");
        assert!(description(Some(&"d".repeat(501))).is_err());
    }

    #[test]
    fn title_bounds() {
        assert!(title("ab").is_err());
        assert_eq!(title(" Login works ").unwrap(), "Login works");
        assert!(title(&"t".repeat(201)).is_err());
    }

    #[test]
    fn required_texts() {
        assert_eq!(steps("").unwrap_err().0, "Test steps are required");
        assert_eq!(expected_result(" ").unwrap_err().0, "Expected result is required");
        assert_eq!(comment("").unwrap_err().0, "Comment cannot be empty");
        assert_eq!(
            comment(&"c".repeat(1001)).unwrap_err().0,
            "Comment is too long (max 1000 characters)"
        );
    }

    #[test]
    fn tab_names() {
        assert_eq!(tab_name(" Smoke ").unwrap(), "Smoke");
        assert!(tab_name("").is_err());
        assert!(tab_name("a/b").is_err());
        assert!(tab_name(&"x".repeat(51)).is_err());
    }

    #[test]
    fn search_is_sanitized() {
        assert_eq!(search_query(" <login> "), Some("login".to_string()));
        assert_eq!(search_query("[]{}"), None);
        assert_eq!(search_query(&"q".repeat(300)).map(|s| s.len()), Some(200));
    }
}
