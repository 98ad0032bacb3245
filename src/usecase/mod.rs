//! Business rules sitting between the HTTP handlers and the leaf services.

pub mod storage_usecase;
pub mod user_usecase;
