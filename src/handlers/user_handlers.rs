//! HTTP handlers for user accounts and login.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    errors::AppError,
    models::user::{LoginRequest, NewUser},
    state::AppState,
};

/// `GET /users`
pub async fn list_users(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let users = state.users.get_users().await?;
    Ok(Json(users))
}

/// `GET /users/{id}`: 400 for a non-numeric id, 404 when absent.
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    if id.trim().is_empty() {
        return Err(AppError::bad_request("user id is required"));
    }
    let id: i32 = id
        .parse()
        .map_err(|_| AppError::bad_request("user id must be a number"))?;

    match state.users.get_user_by_id(id).await? {
        Some(user) => Ok(Json(user)),
        None => Err(AppError::not_found("user not found")),
    }
}

/// `POST /users`: create the account and its bucket.
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<NewUser>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(user) = payload?;
    if user.name.trim().is_empty() || user.email.trim().is_empty() || user.password.is_empty() {
        return Err(AppError::bad_request("name, email and password are required"));
    }

    let created = state.users.register(user).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `POST /login`: 404 when the credentials do not match.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(credentials) = payload?;
    if credentials.email.trim().is_empty() || credentials.password.is_empty() {
        return Err(AppError::bad_request("email and password are required"));
    }

    match state
        .users
        .login(&credentials.email, &credentials.password)
        .await?
    {
        Some(response) => Ok(Json(response)),
        None => Err(AppError::not_found("user not found")),
    }
}
