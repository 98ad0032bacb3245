//! HTTP handlers for the caller's buckets and presigned object URLs.
//! Every route here sits behind [`crate::middleware::require_token`].

use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    response::IntoResponse,
};
use serde::Deserialize;

use crate::{errors::AppError, middleware::AuthenticatedUser, state::AppState};

/// Body of `POST /aws/bucket`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBucketReq {
    #[serde(default)]
    pub bucket_name: String,
}

/// Body of the presign endpoints.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectKeyReq {
    #[serde(default)]
    pub object_key: String,
}

/// POST `/aws/bucket`: create `<bucketName>-<userId>`.
pub async fn create_bucket(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    payload: Result<Json<CreateBucketReq>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;
    let base = req.bucket_name.trim();
    if base.is_empty() {
        return Err(AppError::bad_request("bucketName is required"));
    }

    let created = state.storage.create_bucket(user.id, base).await?;
    Ok(Json(created))
}

/// GET `/aws/bucket`: every bucket of the account.
pub async fn list_buckets(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let listing = state.storage.list_buckets().await;
    if listing.is_partial() {
        tracing::warn!(
            "Bucket listing interrupted after {} entries",
            listing.items.len()
        );
    }
    Ok(Json(listing.into_result()?))
}

/// GET `/aws/bucket/items`: objects in the caller's bucket.
pub async fn list_bucket_items(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, AppError> {
    let items = state.storage.list_items(user.id).await.into_result()?;
    Ok(Json(items))
}

/// POST `/aws/object/download`: presigned GET for a key in the caller's bucket.
pub async fn presign_download(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    payload: Result<Json<ObjectKeyReq>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let key = object_key(payload)?;
    let url = state.storage.presign_get(user.id, &key).await?;
    Ok(Json(url))
}

/// POST `/aws/object/upload`: presigned PUT for a key in the caller's bucket.
pub async fn presign_upload(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    payload: Result<Json<ObjectKeyReq>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let key = object_key(payload)?;
    let url = state.storage.presign_put(user.id, &key).await?;
    Ok(Json(url))
}

fn object_key(payload: Result<Json<ObjectKeyReq>, JsonRejection>) -> Result<String, AppError> {
    let Json(req) = payload?;
    if req.object_key.trim().is_empty() {
        return Err(AppError::bad_request("objectKey is required"));
    }
    Ok(req.object_key)
}
