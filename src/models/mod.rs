//! Data models for user accounts and the storage resources they own.
//!
//! Users map to the `users` table via `sqlx::FromRow`; buckets and objects
//! are provider-side resources that only pass through as JSON via `serde`.

pub mod bucket;
pub mod user;
