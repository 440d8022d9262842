//! Domain models shared by the query modules and the API layer.

pub mod auth;
pub mod project;
pub mod test_case;

use thiserror::Error;

/// A string did not name a known enum variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid {kind}. Must be one of: {allowed}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub allowed: &'static str,
}
