//! Defines the HTTP surface of the service.
//!
//! ## Structure
//! - **Public endpoints**
//!   - `GET  /ping`   - liveness
//!   - `GET  /readyz` - readiness (database check)
//!   - `GET  /users`  - list users
//!   - `POST /users`  - register user + provision bucket
//!   - `POST /login`  - verify credentials, issue token
//!
//! - **Token-protected endpoints** (`Authorization: <token>`)
//!   - `GET  /users/{id}`           - one user
//!   - `POST /aws/bucket`           - create `<bucketName>-<userId>`
//!   - `GET  /aws/bucket`           - list all buckets
//!   - `GET  /aws/bucket/items`     - list objects in the caller's bucket
//!   - `POST /aws/object/download`  - presigned GET in the caller's bucket
//!   - `POST /aws/object/upload`    - presigned PUT in the caller's bucket

use crate::{
    handlers::{
        health_handlers::{ping, readyz},
        storage_handlers::{
            create_bucket, list_bucket_items, list_buckets, presign_download, presign_upload,
        },
        user_handlers::{create_user, get_user, list_users, login},
    },
    middleware::require_token,
    state::AppState,
};
use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method, header},
    middleware::from_fn_with_state,
    routing::{get, post},
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

/// Build the full router with state, CORS and request tracing applied.
///
/// Only origins listed in `allowed_origins` receive CORS headers.
pub fn routes(state: AppState, allowed_origins: &[String]) -> Router {
    let protected = Router::new()
        .route("/users/{id}", get(get_user))
        .route("/aws/bucket", post(create_bucket).get(list_buckets))
        .route("/aws/bucket/items", get(list_bucket_items))
        .route("/aws/object/download", post(presign_download))
        .route("/aws/object/upload", post(presign_upload))
        .route_layer(from_fn_with_state(state.clone(), require_token));

    Router::new()
        .route("/ping", get(ping))
        .route("/readyz", get(readyz))
        .route("/users", get(list_users).post(create_user))
        .route("/login", post(login))
        .merge(protected)
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([Method::POST, Method::OPTIONS, Method::GET, Method::PUT])
        .allow_headers([
            header::CONTENT_TYPE,
            header::CONTENT_LENGTH,
            header::ACCEPT_ENCODING,
            HeaderName::from_static("x-csrf-token"),
            header::AUTHORIZATION,
            header::ACCEPT,
            header::ORIGIN,
            header::CACHE_CONTROL,
            HeaderName::from_static("x-requested-with"),
        ])
}
