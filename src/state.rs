//! Shared application state handed to every handler.

use sqlx::PgPool;
use std::sync::Arc;

use crate::{
    services::token_service::TokenService,
    usecase::{storage_usecase::StorageUseCase, user_usecase::UserUseCase},
};

#[derive(Clone)]
pub struct AppState {
    pub users: UserUseCase,
    pub storage: StorageUseCase,
    pub tokens: TokenService,
    /// Pool used by the readiness check; `None` when running without a database.
    pub db: Option<Arc<PgPool>>,
}
