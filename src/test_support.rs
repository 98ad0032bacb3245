//! In-memory doubles of the credential store and object storage.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::{
    models::{
        bucket::{BucketSummary, CreatedBucket, Listing, ObjectSummary, PresignedUrl},
        user::User,
    },
    repository::user_repository::{CredentialStore, UserStoreError, UserStoreResult},
    services::{
        object_storage::{ObjectStorage, StorageError, StorageResult},
        password::PasswordHasher,
    },
};

/// Users kept in a vector; ids start at 1 like a SERIAL column.
#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<User>>,
    hasher: PasswordHasher,
}

impl MemoryUserStore {
    pub fn stored(&self) -> Vec<User> {
        self.users.lock().unwrap().clone()
    }
}

#[async_trait]
impl CredentialStore for MemoryUserStore {
    async fn create_user(&self, name: &str, email: &str, password: &str) -> UserStoreResult<i32> {
        let password_hash = self.hasher.hash(password)?;
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == email) {
            return Err(UserStoreError::EmailTaken(email.to_string()));
        }
        let id = users.len() as i32 + 1;
        users.push(User {
            id,
            name: name.to_string(),
            email: email.to_string(),
            password_hash,
        });
        Ok(id)
    }

    async fn get_users(&self) -> UserStoreResult<Vec<User>> {
        Ok(self.stored())
    }

    async fn get_user_by_id(&self, id: i32) -> UserStoreResult<Option<User>> {
        Ok(self.stored().into_iter().find(|u| u.id == id))
    }

    async fn verify_login(&self, email: &str, password: &str) -> UserStoreResult<Option<User>> {
        let Some(user) = self.stored().into_iter().find(|u| u.email == email) else {
            return Ok(None);
        };
        if self.hasher.verify(password, &user.password_hash)? {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }
}

/// Records every call and serves buckets/objects from fixed lists.
#[derive(Default)]
pub struct MemoryObjectStorage {
    pub buckets: Mutex<Vec<String>>,
    /// `(bucket, key)` pairs.
    pub objects: Mutex<Vec<(String, String)>>,
    pub created: Mutex<Vec<String>>,
    pub presigned: Mutex<Vec<(String, String, String, u64)>>,
    /// Returned by `create_bucket` instead of succeeding.
    pub create_error: Mutex<Option<StorageError>>,
    /// Appended to the bucket listing as a mid-stream failure.
    pub list_error: Mutex<Option<StorageError>>,
}

impl MemoryObjectStorage {
    pub fn with_buckets(names: &[&str]) -> Self {
        let storage = Self::default();
        *storage.buckets.lock().unwrap() = names.iter().map(|n| n.to_string()).collect();
        storage
    }

    pub fn created(&self) -> Vec<String> {
        self.created.lock().unwrap().clone()
    }

    fn presign(&self, method: &str, bucket: &str, key: &str, ttl_secs: u64) -> StorageResult<PresignedUrl> {
        if !self.buckets.lock().unwrap().iter().any(|b| b == bucket) {
            return Err(StorageError::NoSuchBucket(bucket.to_string()));
        }
        self.presigned.lock().unwrap().push((
            method.to_string(),
            bucket.to_string(),
            key.to_string(),
            ttl_secs,
        ));
        Ok(PresignedUrl {
            url: format!("https://{bucket}.s3.example.com/{key}?X-Amz-Expires={ttl_secs}"),
            method: method.to_string(),
            headers: Default::default(),
            expires_in_secs: ttl_secs,
        })
    }
}

#[async_trait]
impl ObjectStorage for MemoryObjectStorage {
    async fn create_bucket(&self, name: &str) -> StorageResult<CreatedBucket> {
        self.created.lock().unwrap().push(name.to_string());
        if let Some(err) = self.create_error.lock().unwrap().take() {
            return Err(err);
        }
        self.buckets.lock().unwrap().push(name.to_string());
        Ok(CreatedBucket {
            name: name.to_string(),
            location: Some(format!("/{name}")),
        })
    }

    async fn list_buckets(&self) -> Listing<BucketSummary> {
        let items = self
            .buckets
            .lock()
            .unwrap()
            .iter()
            .map(|name| BucketSummary {
                name: name.clone(),
                creation_date: None,
            })
            .collect();
        match self.list_error.lock().unwrap().take() {
            Some(err) => Listing::partial(items, err),
            None => Listing::complete(items),
        }
    }

    async fn list_objects(&self, bucket: &str) -> Listing<ObjectSummary> {
        if !self.buckets.lock().unwrap().iter().any(|b| b == bucket) {
            return Listing::partial(Vec::new(), StorageError::NoSuchBucket(bucket.to_string()));
        }
        let items = self
            .objects
            .lock()
            .unwrap()
            .iter()
            .filter(|(b, _)| b == bucket)
            .map(|(_, key)| ObjectSummary {
                key: key.clone(),
                size: Some(0),
                last_modified: None,
                etag: None,
            })
            .collect();
        Listing::complete(items)
    }

    async fn presign_get(&self, bucket: &str, key: &str, ttl_secs: u64) -> StorageResult<PresignedUrl> {
        self.presign("GET", bucket, key, ttl_secs)
    }

    async fn presign_put(&self, bucket: &str, key: &str, ttl_secs: u64) -> StorageResult<PresignedUrl> {
        self.presign("PUT", bucket, key, ttl_secs)
    }
}
