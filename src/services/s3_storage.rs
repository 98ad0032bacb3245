//! [`ObjectStorage`] backed by Amazon S3 through `aws-sdk-s3`.

use async_trait::async_trait;
use aws_sdk_s3::{
    Client,
    client::Waiters,
    error::DisplayErrorContext,
    presigning::{PresignedRequest, PresigningConfig},
    types::{
        Bucket, BucketLocationConstraint, CorsConfiguration, CorsRule, CreateBucketConfiguration,
        Object,
    },
};
use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::object_storage::{ObjectStorage, StorageError, StorageResult};
use crate::models::bucket::{BucketSummary, CreatedBucket, Listing, ObjectSummary, PresignedUrl};

/// Upper bound on waiting for a new bucket to show up.
const BUCKET_VISIBLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Region that rejects an explicit location constraint.
const DEFAULT_REGION: &str = "us-east-1";

const CORS_ALLOWED_METHODS: [&str; 4] = ["GET", "PUT", "POST", "HEAD"];

#[derive(Clone)]
pub struct S3ObjectStorage {
    client: Client,
    region: String,
    cors_origins: Vec<String>,
}

impl S3ObjectStorage {
    /// Wrap an already configured SDK client.
    ///
    /// `region` is used as the location constraint for new buckets and
    /// `cors_origins` as the allowed origins of their CORS rule.
    pub fn new(client: Client, region: impl Into<String>, cors_origins: Vec<String>) -> Self {
        Self {
            client,
            region: region.into(),
            cors_origins,
        }
    }

    fn bucket_configuration(&self) -> Option<CreateBucketConfiguration> {
        if self.region == DEFAULT_REGION {
            return None;
        }
        Some(
            CreateBucketConfiguration::builder()
                .location_constraint(BucketLocationConstraint::from(self.region.as_str()))
                .build(),
        )
    }

    async fn apply_cors(&self, name: &str) -> StorageResult<()> {
        let config = CorsConfiguration::builder()
            .cors_rules(cors_rule(&self.cors_origins)?)
            .build()
            .map_err(|err| StorageError::Upstream(err.to_string()))?;

        self.client
            .put_bucket_cors()
            .bucket(name)
            .cors_configuration(config)
            .send()
            .await
            .map_err(|err| {
                warn!("Failed to configure CORS on bucket {}: {}", name, DisplayErrorContext(&err));
                StorageError::Upstream(DisplayErrorContext(&err).to_string())
            })?;

        Ok(())
    }

    fn presigning_config(ttl_secs: u64) -> StorageResult<PresigningConfig> {
        PresigningConfig::expires_in(Duration::from_secs(ttl_secs))
            .map_err(|err| StorageError::Upstream(err.to_string()))
    }
}

#[async_trait]
impl ObjectStorage for S3ObjectStorage {
    async fn create_bucket(&self, name: &str) -> StorageResult<CreatedBucket> {
        let output = self
            .client
            .create_bucket()
            .bucket(name)
            .set_create_bucket_configuration(self.bucket_configuration())
            .send()
            .await
            .map_err(|err| {
                let service_err = err.as_service_error();
                if service_err.is_some_and(|e| e.is_bucket_already_owned_by_you()) {
                    info!("Bucket {} is already owned by this account", name);
                    StorageError::AlreadyOwned(name.to_string())
                } else if service_err.is_some_and(|e| e.is_bucket_already_exists()) {
                    warn!("Bucket {} already exists under another account", name);
                    StorageError::AlreadyExistsElsewhere(name.to_string())
                } else {
                    warn!("Failed to create bucket {}: {}", name, DisplayErrorContext(&err));
                    StorageError::Upstream(DisplayErrorContext(&err).to_string())
                }
            })?;

        debug!("Waiting for bucket {} to become visible", name);
        self.client
            .wait_until_bucket_exists()
            .bucket(name)
            .wait(BUCKET_VISIBLE_TIMEOUT)
            .await
            .map_err(|err| {
                warn!("Gave up waiting for bucket {}: {}", name, DisplayErrorContext(&err));
                StorageError::NotVisible {
                    name: name.to_string(),
                    reason: DisplayErrorContext(&err).to_string(),
                }
            })?;

        self.apply_cors(name).await?;

        info!("Created bucket {}", name);
        Ok(CreatedBucket {
            name: name.to_string(),
            location: output.location().map(str::to_string),
        })
    }

    async fn list_buckets(&self) -> Listing<BucketSummary> {
        let mut pages = self.client.list_buckets().into_paginator().send();
        let mut buckets = Vec::new();

        while let Some(page) = pages.next().await {
            match page {
                Ok(output) => buckets.extend(output.buckets().iter().map(bucket_summary)),
                Err(err) => {
                    warn!(
                        "Bucket listing stopped after {} entries: {}",
                        buckets.len(),
                        DisplayErrorContext(&err)
                    );
                    let reason = DisplayErrorContext(&err).to_string();
                    return Listing::partial(buckets, StorageError::Upstream(reason));
                }
            }
        }

        Listing::complete(buckets)
    }

    async fn list_objects(&self, bucket: &str) -> Listing<ObjectSummary> {
        if bucket.is_empty() {
            return Listing::partial(Vec::new(), StorageError::NoSuchBucket(String::new()));
        }

        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .into_paginator()
            .send();
        let mut objects = Vec::new();

        while let Some(page) = pages.next().await {
            match page {
                Ok(output) => objects.extend(output.contents().iter().map(object_summary)),
                Err(err) => {
                    let error = if err.as_service_error().is_some_and(|e| e.is_no_such_bucket()) {
                        info!("Bucket {} does not exist", bucket);
                        StorageError::NoSuchBucket(bucket.to_string())
                    } else {
                        warn!(
                            "Object listing of {} stopped after {} entries: {}",
                            bucket,
                            objects.len(),
                            DisplayErrorContext(&err)
                        );
                        StorageError::Upstream(DisplayErrorContext(&err).to_string())
                    };
                    return Listing::partial(objects, error);
                }
            }
        }

        Listing::complete(objects)
    }

    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        ttl_secs: u64,
    ) -> StorageResult<PresignedUrl> {
        if bucket.is_empty() {
            return Err(StorageError::NoSuchBucket(String::new()));
        }
        let request = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .presigned(Self::presigning_config(ttl_secs)?)
            .await
            .map_err(|err| {
                warn!(
                    "Could not presign GET {}/{}: {}",
                    bucket,
                    key,
                    DisplayErrorContext(&err)
                );
                StorageError::Upstream(DisplayErrorContext(&err).to_string())
            })?;

        Ok(presigned_url(&request, ttl_secs))
    }

    async fn presign_put(
        &self,
        bucket: &str,
        key: &str,
        ttl_secs: u64,
    ) -> StorageResult<PresignedUrl> {
        if bucket.is_empty() {
            return Err(StorageError::NoSuchBucket(String::new()));
        }
        let request = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .presigned(Self::presigning_config(ttl_secs)?)
            .await
            .map_err(|err| {
                warn!(
                    "Could not presign PUT {}/{}: {}",
                    bucket,
                    key,
                    DisplayErrorContext(&err)
                );
                StorageError::Upstream(DisplayErrorContext(&err).to_string())
            })?;

        Ok(presigned_url(&request, ttl_secs))
    }
}

/// CORS rule attached to every new bucket. S3 requires at least one
/// allowed origin, so an empty list opens the bucket to any origin.
fn cors_rule(origins: &[String]) -> StorageResult<CorsRule> {
    let origins = if origins.is_empty() {
        vec!["*".to_string()]
    } else {
        origins.to_vec()
    };
    CorsRule::builder()
        .allowed_headers("*")
        .set_allowed_methods(Some(
            CORS_ALLOWED_METHODS.iter().map(|m| m.to_string()).collect(),
        ))
        .set_allowed_origins(Some(origins))
        .build()
        .map_err(|err| StorageError::Upstream(err.to_string()))
}

fn bucket_summary(bucket: &Bucket) -> BucketSummary {
    BucketSummary {
        name: bucket.name().unwrap_or_default().to_string(),
        creation_date: bucket.creation_date().and_then(|d| to_chrono(d.secs())),
    }
}

fn object_summary(object: &Object) -> ObjectSummary {
    ObjectSummary {
        key: object.key().unwrap_or_default().to_string(),
        size: object.size(),
        last_modified: object.last_modified().and_then(|d| to_chrono(d.secs())),
        etag: object.e_tag().map(|e| e.trim_matches('"').to_string()),
    }
}

fn presigned_url(request: &PresignedRequest, ttl_secs: u64) -> PresignedUrl {
    PresignedUrl {
        url: request.uri().to_string(),
        method: request.method().to_string(),
        headers: request
            .headers()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect(),
        expires_in_secs: ttl_secs,
    }
}

fn to_chrono(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
}
