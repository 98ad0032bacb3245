//! Credential store: user rows in Postgres plus password verification.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    models::user::User,
    services::password::{PasswordError, PasswordHasher},
};

#[derive(Debug, Error)]
pub enum UserStoreError {
    #[error("a user with email `{0}` already exists")]
    EmailTaken(String),
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error("password hashing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type UserStoreResult<T> = Result<T, UserStoreError>;

/// Persistence and credential checks for user accounts.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Hash the password, insert the row and return the new id.
    async fn create_user(&self, name: &str, email: &str, password: &str) -> UserStoreResult<i32>;

    async fn get_users(&self) -> UserStoreResult<Vec<User>>;

    /// `Ok(None)` when no user has this id.
    async fn get_user_by_id(&self, id: i32) -> UserStoreResult<Option<User>>;

    /// `Ok(None)` both for an unknown email and for a wrong password.
    async fn verify_login(&self, email: &str, password: &str) -> UserStoreResult<Option<User>>;
}

/// [`CredentialStore`] over the `users` table.
#[derive(Clone)]
pub struct PgUserRepository {
    db: Arc<PgPool>,
    hasher: PasswordHasher,
}

impl PgUserRepository {
    pub fn new(db: Arc<PgPool>) -> Self {
        Self {
            db,
            hasher: PasswordHasher::new(),
        }
    }
}

#[async_trait]
impl CredentialStore for PgUserRepository {
    async fn create_user(&self, name: &str, email: &str, password: &str) -> UserStoreResult<i32> {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        let hash = tokio::task::spawn_blocking(move || hasher.hash(&password)).await??;

        match sqlx::query_scalar::<_, i32>(
            "INSERT INTO users (user_name, user_email, user_password)
             VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(name)
        .bind(email)
        .bind(&hash)
        .fetch_one(&*self.db)
        .await
        {
            Ok(id) => {
                info!("Created user {} ({})", id, email);
                Ok(id)
            }
            Err(err) if is_unique_violation(&err) => {
                Err(UserStoreError::EmailTaken(email.to_string()))
            }
            Err(err) => Err(UserStoreError::Sqlx(err)),
        }
    }

    async fn get_users(&self) -> UserStoreResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, user_name, user_email, user_password FROM users",
        )
        .fetch_all(&*self.db)
        .await?;
        Ok(users)
    }

    async fn get_user_by_id(&self, id: i32) -> UserStoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, user_name, user_email, user_password FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&*self.db)
        .await?;
        Ok(user)
    }

    async fn verify_login(&self, email: &str, password: &str) -> UserStoreResult<Option<User>> {
        let Some(user) = sqlx::query_as::<_, User>(
            "SELECT id, user_name, user_email, user_password FROM users WHERE user_email = $1",
        )
        .bind(email)
        .fetch_optional(&*self.db)
        .await?
        else {
            debug!("Login attempt for unknown email {}", email);
            return Ok(None);
        };

        let hasher = self.hasher.clone();
        let password = password.to_string();
        let stored = user.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || hasher.verify(&password, &stored)).await??;

        if matches {
            Ok(Some(user))
        } else {
            warn!("Password mismatch for user {}", user.id);
            Ok(None)
        }
    }
}

/// Return true if the error is a Postgres unique constraint violation.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505")
    )
}
