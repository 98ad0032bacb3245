use anyhow::{Context, Result};
use aws_config::{BehaviorVersion, Region};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use std::{fs, io::ErrorKind, path::Path, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod config;
mod errors;
mod handlers;
mod middleware;
mod models;
mod repository;
mod routes;
mod services;
mod state;
mod usecase;

#[cfg(test)]
mod test_support;

use repository::user_repository::PgUserRepository;
use services::{s3_storage::S3ObjectStorage, token_service::TokenService};
use state::AppState;
use usecase::{storage_usecase::StorageUseCase, user_usecase::UserUseCase};

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // --- Parse config + migrate flag ---
    let (cfg, migrate) = config::AppConfig::from_env_and_args()?;

    tracing::info!("Starting cloud-file-manager with config: {:?}", cfg);

    // --- Initialize Postgres connection ---
    let db: Arc<sqlx::PgPool> = Arc::new(
        PgPoolOptions::new()
            .max_connections(5)
            .connect(&cfg.database_url)
            .await
            .context("connecting to Postgres")?,
    );
    tracing::info!("Connected to database");

    // --- Handle migration mode ---
    if migrate {
        run_migrations(&db).await?;
        tracing::info!("Database migration complete.");
        return Ok(()); // exit after migration
    }

    // --- Initialize S3 client ---
    let aws = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(cfg.aws_region.clone()))
        .load()
        .await;
    let storage = Arc::new(S3ObjectStorage::new(
        aws_sdk_s3::Client::new(&aws),
        cfg.aws_region.clone(),
        cfg.allowed_origins.clone(),
    ));

    // --- Wire use cases ---
    let tokens = TokenService::new(&cfg.jwt_secret);
    let state = AppState {
        users: UserUseCase::new(
            Arc::new(PgUserRepository::new(db.clone())),
            storage.clone(),
            tokens.clone(),
            cfg.bucket_prefix.clone(),
        ),
        storage: StorageUseCase::new(storage, cfg.presign_ttl_secs),
        tokens,
        db: Some(db),
    };

    // --- Build router ---
    let app: Router = routes::routes::routes(state, &cfg.allowed_origins);

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Run Postgres migrations manually from the SQL file.
async fn run_migrations(db: &Arc<sqlx::PgPool>) -> Result<()> {
    let path = "migrations/0001_init.sql";

    if !Path::new(path).exists() {
        anyhow::bail!("Migration file not found: {}", path);
    }

    let sql = fs::read_to_string(path)?;
    let statements = sql
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>();

    tracing::info!("Running {} migration statements...", statements.len());

    for stmt in statements {
        tracing::debug!("Executing migration SQL: {}", stmt);
        sqlx::query(stmt).execute(&**db).await?;
    }

    Ok(())
}
