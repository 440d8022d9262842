//! Request handlers.

pub mod auth;
pub mod health;
pub mod invites;
pub mod members;
pub mod projects;
pub mod statistics;
pub mod test_cases;
pub mod users;
