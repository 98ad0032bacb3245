//! User accounts and the request/response bodies that carry them.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A registered user as stored in the `users` table.
///
/// The password column only ever holds an Argon2 PHC string and is never
/// serialized into a response.
#[derive(Serialize, Clone, FromRow, Debug, PartialEq, Eq)]
pub struct User {
    /// Identifier assigned by the database on insert.
    pub id: i32,

    /// Display name.
    #[sqlx(rename = "user_name")]
    pub name: String,

    /// Login key, unique across users.
    #[sqlx(rename = "user_email")]
    pub email: String,

    #[sqlx(rename = "user_password")]
    #[serde(skip_serializing)]
    pub password_hash: String,
}

/// Body of `POST /users`.
#[derive(Deserialize, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Returned by `POST /users` once the account exists.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CreatedUser {
    pub id: i32,
    pub name: String,
    pub email: String,
}

/// Body of `POST /login`.
#[derive(Deserialize, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Returned by a successful `POST /login`.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct LoginResponse {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub token: String,
}
