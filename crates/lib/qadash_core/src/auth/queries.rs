//! User database queries.

use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use super::AuthError;
use crate::models::auth::{User, UserRole, UserWithPassword};

const USER_COLUMNS: &str = "id, email, username, role, created_at";

/// Fetch a user (with password hash) by email or username.
pub async fn find_user_by_login(
    pool: &PgPool,
    identifier: &str,
) -> Result<Option<UserWithPassword>, AuthError> {
    let row = sqlx::query_as::<_, UserWithPassword>(&format!(
        "SELECT {USER_COLUMNS}, password_hash FROM users \
         WHERE email = lower($1) OR username = $1 \
         LIMIT 1"
    ))
    .bind(identifier.trim())
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Fetch a user by email.
pub async fn find_user_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, AuthError> {
    let row = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
    ))
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Fetch a user by ID.
pub async fn get_user_by_id(pool: &PgPool, user_id: &Uuid) -> Result<Option<User>, AuthError> {
    let row = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Fetch a user's password hash.
pub async fn get_password_hash(pool: &PgPool, user_id: &Uuid) -> Result<String, AuthError> {
    sqlx::query_scalar::<_, String>("SELECT password_hash FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AuthError::UserNotFound)
}

/// Check whether an email or username is already registered.
/// Returns the name of the clashing field.
pub async fn find_identity_clash(
    pool: &PgPool,
    email: &str,
    username: &str,
) -> Result<Option<&'static str>, AuthError> {
    let (email_taken, username_taken) = sqlx::query_as::<_, (bool, bool)>(
        "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1), \
                EXISTS(SELECT 1 FROM users WHERE username = $2)",
    )
    .bind(email)
    .bind(username)
    .fetch_one(pool)
    .await?;
    Ok(if email_taken {
        Some("email")
    } else if username_taken {
        Some("username")
    } else {
        None
    })
}

/// Create a new user. The first user ever created is granted `admin`.
///
/// The first-user check runs inside the insert so two concurrent first
/// registrations cannot both become admin.
pub async fn create_user(
    pool: &PgPool,
    email: &str,
    username: &str,
    password_hash: &str,
) -> Result<User, AuthError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (email, username, password_hash, role) \
         VALUES ($1, $2, $3, \
                 CASE WHEN EXISTS(SELECT 1 FROM users) THEN 'user'::user_role \
                      ELSE 'admin'::user_role END) \
         RETURNING {USER_COLUMNS}"
    ))
    .bind(email)
    .bind(username)
    .bind(password_hash)
    .fetch_one(pool)
    .await
    .map_err(unique_violation_to_conflict)?;
    Ok(user)
}

/// Change a user's username.
pub async fn update_username(
    pool: &PgPool,
    user_id: &Uuid,
    username: &str,
) -> Result<User, AuthError> {
    sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET username = $1, updated_at = now() WHERE id = $2 \
         RETURNING {USER_COLUMNS}"
    ))
    .bind(username)
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .map_err(unique_violation_to_conflict)?
    .ok_or(AuthError::UserNotFound)
}

/// Replace a user's password hash.
pub async fn set_password_hash<'e>(
    executor: impl PgExecutor<'e>,
    user_id: &Uuid,
    password_hash: &str,
) -> Result<(), AuthError> {
    sqlx::query("UPDATE users SET password_hash = $1, updated_at = now() WHERE id = $2")
        .bind(password_hash)
        .bind(user_id)
        .execute(executor)
        .await?;
    Ok(())
}

/// List all users, newest first.
pub async fn list_users(pool: &PgPool) -> Result<Vec<User>, AuthError> {
    let rows = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Set a user's role-of-record.
pub async fn set_user_role(
    pool: &PgPool,
    user_id: &Uuid,
    role: UserRole,
) -> Result<User, AuthError> {
    sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET role = $1, updated_at = now() WHERE id = $2 \
         RETURNING {USER_COLUMNS}"
    ))
    .bind(role)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AuthError::UserNotFound)
}

/// Map a unique-constraint violation on `users` to a conflict error.
fn unique_violation_to_conflict(e: sqlx::Error) -> AuthError {
    if let sqlx::Error::Database(db) = &e
        && db.is_unique_violation()
    {
        let field = match db.constraint() {
            Some(c) if c.contains("username") => "Username",
            _ => "Email",
        };
        return AuthError::Conflict(format!("{field} already registered"));
    }
    AuthError::DbError(e)
}
