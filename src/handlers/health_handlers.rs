//! Liveness & readiness handlers.
//!
//! - GET /ping    -> liveness ("PONG")
//! - GET /readyz  -> readiness that checks database connectivity

use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

/// `GET /ping`
///
/// Always 200; never performs I/O.
pub async fn ping() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(PingResponse {
            message: "PONG".into(),
        }),
    )
}

/// `GET /readyz`
///
/// Runs `SELECT 1` against the pool. 200 when it succeeds, 503 otherwise.
pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    let database = match state.db.as_deref() {
        Some(pool) => match sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(pool).await {
            Ok(1) => CheckStatus {
                ok: true,
                error: None,
            },
            Ok(v) => CheckStatus {
                ok: false,
                error: Some(format!("unexpected result: {}", v)),
            },
            Err(e) => CheckStatus {
                ok: false,
                error: Some(format!("error: {}", e)),
            },
        },
        None => CheckStatus {
            ok: false,
            error: Some("no database configured".into()),
        },
    };

    let status = if database.ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let body = ReadyResponse {
        status: if database.ok { "ok" } else { "error" },
        database,
    };
    (status, Json(body))
}

#[derive(Serialize)]
struct PingResponse {
    message: String,
}

#[derive(Serialize)]
struct ReadyResponse {
    status: &'static str,
    database: CheckStatus,
}

#[derive(Serialize)]
struct CheckStatus {
    ok: bool,
    error: Option<String>,
}
