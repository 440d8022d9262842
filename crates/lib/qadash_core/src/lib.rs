//! # qadash_core
//!
//! Core domain logic for QA Dashboard.

pub mod access;
pub mod auth;
pub mod export;
pub mod mail;
pub mod migrate;
pub mod models;
pub mod projects;
pub mod statistics;
pub mod test_cases;
pub mod tokens;
pub mod uuid;
pub mod validation;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_not_empty() {
        assert!(!version().is_empty());
    }
}
