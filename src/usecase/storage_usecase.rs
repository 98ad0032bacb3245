//! Per-user bucket operations.
//!
//! There is no user → bucket table. A user's bucket is found by listing every
//! bucket and taking the last one whose name ends in `-<userId>`. Two buckets
//! sharing a suffix, or none at all, are not detected here: the first case
//! picks whichever the listing returns last and the second resolves to an
//! empty name, which the storage client reports as a missing bucket.

use std::sync::Arc;
use tracing::debug;

use crate::{
    models::bucket::{BucketSummary, CreatedBucket, Listing, ObjectSummary, PresignedUrl},
    services::object_storage::{ObjectStorage, StorageResult},
};

/// Default lifetime of presigned URLs.
pub const DEFAULT_PRESIGN_TTL_SECS: u64 = 60;

/// Last bucket in `buckets` whose name ends with `-<user_id>`, or `""`.
pub fn resolve_user_bucket(buckets: &[BucketSummary], user_id: i32) -> String {
    let suffix = format!("-{user_id}");
    buckets
        .iter()
        .rev()
        .find(|b| b.name.ends_with(&suffix))
        .map(|b| b.name.clone())
        .unwrap_or_default()
}

#[derive(Clone)]
pub struct StorageUseCase {
    storage: Arc<dyn ObjectStorage>,
    presign_ttl_secs: u64,
}

impl StorageUseCase {
    pub fn new(storage: Arc<dyn ObjectStorage>, presign_ttl_secs: u64) -> Self {
        Self {
            storage,
            presign_ttl_secs,
        }
    }

    /// Create `<base>-<user_id>` without consulting the bucket list.
    pub async fn create_bucket(&self, user_id: i32, base: &str) -> StorageResult<CreatedBucket> {
        self.storage
            .create_bucket(&format!("{base}-{user_id}"))
            .await
    }

    /// All buckets of the account, not scoped to any user.
    pub async fn list_buckets(&self) -> Listing<BucketSummary> {
        self.storage.list_buckets().await
    }

    pub async fn list_items(&self, user_id: i32) -> Listing<ObjectSummary> {
        let bucket = match self.user_bucket(user_id).await {
            Ok(bucket) => bucket,
            Err(err) => return Listing::partial(Vec::new(), err),
        };
        self.storage.list_objects(&bucket).await
    }

    pub async fn presign_get(&self, user_id: i32, key: &str) -> StorageResult<PresignedUrl> {
        let bucket = self.user_bucket(user_id).await?;
        self.storage
            .presign_get(&bucket, key, self.presign_ttl_secs)
            .await
    }

    pub async fn presign_put(&self, user_id: i32, key: &str) -> StorageResult<PresignedUrl> {
        let bucket = self.user_bucket(user_id).await?;
        self.storage
            .presign_put(&bucket, key, self.presign_ttl_secs)
            .await
    }

    async fn user_bucket(&self, user_id: i32) -> StorageResult<String> {
        let buckets = self.storage.list_buckets().await.into_result()?;
        let bucket = resolve_user_bucket(&buckets, user_id);
        debug!("Resolved bucket {:?} for user {}", bucket, user_id);
        Ok(bucket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{services::object_storage::StorageError, test_support::MemoryObjectStorage};

    fn summaries(names: &[&str]) -> Vec<BucketSummary> {
        names
            .iter()
            .map(|n| BucketSummary {
                name: n.to_string(),
                creation_date: None,
            })
            .collect()
    }

    #[test]
    fn resolves_bucket_by_user_suffix() {
        let buckets = summaries(&["files-10", "files-77"]);
        assert_eq!(resolve_user_bucket(&buckets, 77), "files-77");
        assert_eq!(resolve_user_bucket(&buckets, 10), "files-10");
    }

    #[test]
    fn no_match_resolves_to_empty_name() {
        let buckets = summaries(&["files-10", "files-77"]);
        assert_eq!(resolve_user_bucket(&buckets, 5), "");
        assert_eq!(resolve_user_bucket(&[], 5), "");
    }

    #[test]
    fn last_matching_bucket_wins() {
        let buckets = summaries(&["photos-7", "files-17", "docs-7"]);
        assert_eq!(resolve_user_bucket(&buckets, 7), "docs-7");
    }

    #[tokio::test]
    async fn create_bucket_appends_user_id() {
        let storage = Arc::new(MemoryObjectStorage::default());
        let usecase = StorageUseCase::new(storage.clone(), DEFAULT_PRESIGN_TTL_SECS);

        let created = usecase.create_bucket(12, "base").await.unwrap();

        assert_eq!(created.name, "base-12");
        assert_eq!(storage.created(), vec!["base-12"]);
    }

    #[tokio::test]
    async fn list_items_reads_the_callers_bucket() {
        let storage = Arc::new(MemoryObjectStorage::with_buckets(&["files-10", "files-77"]));
        storage
            .objects
            .lock()
            .unwrap()
            .extend([("files-77".to_string(), "doc.txt".to_string()), ("files-10".to_string(), "other.txt".to_string())]);
        let usecase = StorageUseCase::new(storage, DEFAULT_PRESIGN_TTL_SECS);

        let items = usecase.list_items(77).await.into_result().unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].key, "doc.txt");
    }

    #[tokio::test]
    async fn unmatched_user_gets_not_found() {
        let storage = Arc::new(MemoryObjectStorage::with_buckets(&["files-10", "files-77"]));
        let usecase = StorageUseCase::new(storage, DEFAULT_PRESIGN_TTL_SECS);

        let listing = usecase.list_items(5).await;
        assert!(matches!(listing.error, Some(StorageError::NoSuchBucket(ref name)) if name.is_empty()));

        let err = usecase.presign_get(5, "photo.png").await.unwrap_err();
        assert!(matches!(err, StorageError::NoSuchBucket(_)));
    }

    #[tokio::test]
    async fn presign_uses_resolved_bucket_and_ttl() {
        let storage = Arc::new(MemoryObjectStorage::with_buckets(&["files-9", "files-22"]));
        let usecase = StorageUseCase::new(storage.clone(), DEFAULT_PRESIGN_TTL_SECS);

        let get = usecase.presign_get(22, "photo.png").await.unwrap();
        let put = usecase.presign_put(22, "upload.bin").await.unwrap();

        assert_eq!(get.method, "GET");
        assert_eq!(put.method, "PUT");
        assert_eq!(
            *storage.presigned.lock().unwrap(),
            vec![
                ("GET".to_string(), "files-22".to_string(), "photo.png".to_string(), 60),
                ("PUT".to_string(), "files-22".to_string(), "upload.bin".to_string(), 60),
            ]
        );
    }

    #[tokio::test]
    async fn interrupted_bucket_listing_aborts_resolution() {
        let storage = Arc::new(MemoryObjectStorage::with_buckets(&["files-22"]));
        *storage.list_error.lock().unwrap() = Some(StorageError::Upstream("throttled".into()));
        let usecase = StorageUseCase::new(storage.clone(), DEFAULT_PRESIGN_TTL_SECS);

        let err = usecase.presign_put(22, "a").await.unwrap_err();

        assert!(matches!(err, StorageError::Upstream(_)));
        assert!(storage.presigned.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn partial_bucket_listing_keeps_accumulated_items() {
        let storage = Arc::new(MemoryObjectStorage::with_buckets(&["a-1", "b-2"]));
        *storage.list_error.lock().unwrap() = Some(StorageError::Upstream("page 2".into()));
        let usecase = StorageUseCase::new(storage, DEFAULT_PRESIGN_TTL_SECS);

        let listing = usecase.list_buckets().await;

        assert!(listing.is_partial());
        assert_eq!(listing.items.len(), 2);
    }
}
