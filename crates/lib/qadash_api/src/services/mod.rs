//! Business logic between handlers and `qadash_core`: validation, access
//! checks and response shaping.

pub mod auth;
pub mod invites;
pub mod members;
pub mod projects;
pub mod test_cases;
