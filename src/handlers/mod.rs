pub mod health_handlers;
pub mod storage_handlers;
pub mod user_handlers;
