//! Registration, login and user lookup.

use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    models::user::{CreatedUser, LoginResponse, NewUser, User},
    repository::user_repository::{CredentialStore, UserStoreError},
    services::{
        object_storage::{ObjectStorage, StorageError},
        token_service::{TokenError, TokenService},
    },
};

#[derive(Debug, Error)]
pub enum UserError {
    #[error(transparent)]
    Store(#[from] UserStoreError),
    /// The user row exists but its bucket could not be provisioned.
    #[error("user {user_id} was created but bucket provisioning failed: {source}")]
    BucketProvisioning {
        user_id: i32,
        #[source]
        source: StorageError,
    },
    #[error(transparent)]
    Token(#[from] TokenError),
}

pub type UserResult<T> = Result<T, UserError>;

/// Name of the bucket provisioned for a freshly registered user.
pub fn user_bucket_name(prefix: &str, user_id: i32) -> String {
    format!("{prefix}-{user_id}")
}

#[derive(Clone)]
pub struct UserUseCase {
    store: Arc<dyn CredentialStore>,
    storage: Arc<dyn ObjectStorage>,
    tokens: TokenService,
    bucket_prefix: String,
}

impl UserUseCase {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        storage: Arc<dyn ObjectStorage>,
        tokens: TokenService,
        bucket_prefix: impl Into<String>,
    ) -> Self {
        Self {
            store,
            storage,
            tokens,
            bucket_prefix: bucket_prefix.into(),
        }
    }

    /// Create the user row, then the user's bucket.
    ///
    /// The row is not rolled back if the bucket cannot be created.
    pub async fn register(&self, user: NewUser) -> UserResult<CreatedUser> {
        let id = self
            .store
            .create_user(&user.name, &user.email, &user.password)
            .await?;

        let bucket = user_bucket_name(&self.bucket_prefix, id);
        match self.storage.create_bucket(&bucket).await {
            Ok(_) => info!("Provisioned bucket {} for user {}", bucket, id),
            Err(StorageError::AlreadyOwned(_)) => {
                info!("Bucket {} for user {} already provisioned", bucket, id)
            }
            Err(source) => {
                warn!(
                    "User {} has no bucket, provisioning {} failed: {}",
                    id, bucket, source
                );
                return Err(UserError::BucketProvisioning {
                    user_id: id,
                    source,
                });
            }
        }

        Ok(CreatedUser {
            id,
            name: user.name,
            email: user.email,
        })
    }

    /// Verify credentials and issue a token; `Ok(None)` when they do not match.
    pub async fn login(&self, email: &str, password: &str) -> UserResult<Option<LoginResponse>> {
        let Some(user) = self.store.verify_login(email, password).await? else {
            return Ok(None);
        };

        let token = self.tokens.issue(user.id, &user.name)?;
        Ok(Some(LoginResponse {
            id: user.id,
            name: user.name,
            email: user.email,
            token,
        }))
    }

    pub async fn get_users(&self) -> UserResult<Vec<User>> {
        Ok(self.store.get_users().await?)
    }

    pub async fn get_user_by_id(&self, id: i32) -> UserResult<Option<User>> {
        Ok(self.store.get_user_by_id(id).await?)
    }
}
