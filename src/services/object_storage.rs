//! Object-storage capability used by the use cases.
//!
//! The production implementation lives in [`super::s3_storage`]; tests
//! substitute an in-memory double.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::bucket::{BucketSummary, CreatedBucket, Listing, ObjectSummary, PresignedUrl};

#[derive(Debug, Error)]
pub enum StorageError {
    /// The bucket already exists and belongs to this account.
    #[error("bucket `{0}` is already owned by this account")]
    AlreadyOwned(String),
    /// Another account owns the name.
    #[error("bucket `{0}` already exists")]
    AlreadyExistsElsewhere(String),
    #[error("bucket `{0}` not found")]
    NoSuchBucket(String),
    #[error("bucket `{name}` did not become visible: {reason}")]
    NotVisible { name: String, reason: String },
    #[error("object storage request failed: {0}")]
    Upstream(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Remote bucket and object operations.
///
/// Pagination and retries are left to the underlying SDK.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Create `name` and wait until the provider reports it as visible.
    async fn create_bucket(&self, name: &str) -> StorageResult<CreatedBucket>;

    /// Every bucket of the account, across all pages.
    async fn list_buckets(&self) -> Listing<BucketSummary>;

    /// Every object in `bucket`, across all pages.
    async fn list_objects(&self, bucket: &str) -> Listing<ObjectSummary>;

    async fn presign_get(&self, bucket: &str, key: &str, ttl_secs: u64)
    -> StorageResult<PresignedUrl>;

    async fn presign_put(&self, bucket: &str, key: &str, ttl_secs: u64)
    -> StorageResult<PresignedUrl>;
}
