//! Buckets and objects as reported by the object-storage provider.
//!
//! None of these are persisted locally; the provider account owns them and
//! the service only refers to buckets by name.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::services::object_storage::StorageError;

/// A bucket as returned by the provider's bucket listing.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct BucketSummary {
    /// Globally unique bucket name, `<base>-<userId>` for buckets made here.
    pub name: String,

    /// When the provider reports the bucket was created.
    pub creation_date: Option<DateTime<Utc>>,
}

/// An object key inside a bucket.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ObjectSummary {
    pub key: String,
    pub size: Option<i64>,
    pub last_modified: Option<DateTime<Utc>>,
    pub etag: Option<String>,
}

/// Result of a successful bucket creation.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CreatedBucket {
    pub name: String,
    pub location: Option<String>,
}

/// A time-limited URL granting one GET or PUT on a single object.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PresignedUrl {
    pub url: String,
    pub method: String,
    /// Headers the caller must send along with the request.
    pub headers: BTreeMap<String, String>,
    pub expires_in_secs: u64,
}

/// Items gathered from a paginated listing.
///
/// When `error` is set the listing stopped early and `items` holds only the
/// pages fetched before the failure.
#[derive(Debug)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub error: Option<StorageError>,
}

impl<T> Listing<T> {
    pub fn complete(items: Vec<T>) -> Self {
        Self { items, error: None }
    }

    pub fn partial(items: Vec<T>, error: StorageError) -> Self {
        Self {
            items,
            error: Some(error),
        }
    }

    pub fn is_partial(&self) -> bool {
        self.error.is_some()
    }

    /// Collapse into a plain result, dropping any partial items on error.
    pub fn into_result(self) -> Result<Vec<T>, StorageError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.items),
        }
    }
}
