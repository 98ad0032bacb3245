use anyhow::{Context, Result, bail};
use clap::Parser;
use std::{env, fmt, str::FromStr};

use crate::usecase::storage_usecase::DEFAULT_PRESIGN_TTL_SECS;

const DEFAULT_BUCKET_PREFIX: &str = "myawss3bucket-90902222345";
const DEFAULT_REGION: &str = "us-east-2";

/// Centralized application configuration.
/// Combines environment variables (optionally from `.env`) and CLI arguments.
#[derive(Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    /// Front-end origins allowed by CORS, both on the API and on new buckets.
    pub allowed_origins: Vec<String>,
    pub aws_region: String,
    pub bucket_prefix: String,
    pub presign_ttl_secs: u64,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "User accounts and per-user S3 buckets")]
pub struct Args {
    /// Host to bind to (overrides SERVER_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides SERVER_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Postgres URL (overrides DATABASE_URL and the HOST/PORT/DB_USER/DB_PASSWORD/DBNAME parts)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Region for new buckets (overrides AWS_REGION)
    #[arg(long)]
    pub region: Option<String>,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        // Missing .env is fine; real environment variables still apply
        let _ = dotenvy::dotenv();
        let args = Args::parse();

        // --- Environment fallback ---
        let env_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = parse_var("SERVER_PORT", 8000u16)?;
        let env_db = match env::var("DATABASE_URL") {
            Ok(url) => url,
            Err(_) => database_url_from_parts()?,
        };
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        if jwt_secret.trim().is_empty() {
            bail!("JWT_SECRET must not be empty");
        }
        let allowed_origins = parse_origins(&env::var("ORIGIN_FRONT").unwrap_or_default());
        let env_region = env::var("AWS_REGION").unwrap_or_else(|_| DEFAULT_REGION.into());

        // --- Merge ---
        let cfg = Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            database_url: args.database_url.unwrap_or(env_db),
            jwt_secret,
            allowed_origins,
            aws_region: args.region.unwrap_or(env_region),
            bucket_prefix: env::var("BUCKET_PREFIX").unwrap_or_else(|_| DEFAULT_BUCKET_PREFIX.into()),
            presign_ttl_secs: parse_var("PRESIGN_TTL_SECS", DEFAULT_PRESIGN_TTL_SECS)?,
        };

        Ok((cfg, args.migrate))
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database_url", &redact_url_password(&self.database_url))
            .field("jwt_secret", &"<redacted>")
            .field("allowed_origins", &self.allowed_origins)
            .field("aws_region", &self.aws_region)
            .field("bucket_prefix", &self.bucket_prefix)
            .field("presign_ttl_secs", &self.presign_ttl_secs)
            .finish()
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(value) => value
            .parse::<T>()
            .with_context(|| format!("parsing {} value `{}`", name, value)),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(err) => Err(err).with_context(|| format!("reading {}", name)),
    }
}

/// Build a Postgres URL from the individual `HOST`/`PORT`/`DB_USER`/
/// `DB_PASSWORD`/`DBNAME` variables.
fn database_url_from_parts() -> Result<String> {
    let host = env::var("HOST").unwrap_or_else(|_| "localhost".into());
    let port = env::var("PORT").unwrap_or_else(|_| "5432".into());
    let user = env::var("DB_USER").context("DB_USER must be set when DATABASE_URL is not")?;
    let password = env::var("DB_PASSWORD").unwrap_or_default();
    let name = env::var("DBNAME").context("DBNAME must be set when DATABASE_URL is not")?;
    Ok(build_database_url(&host, &port, &user, &password, &name))
}

fn build_database_url(host: &str, port: &str, user: &str, password: &str, name: &str) -> String {
    if password.is_empty() {
        format!("postgres://{user}@{host}:{port}/{name}?sslmode=disable")
    } else {
        format!("postgres://{user}:{password}@{host}:{port}/{name}?sslmode=disable")
    }
}

/// Split a comma-separated origin list, dropping blanks.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn redact_url_password(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    let Some((credentials, host)) = rest.split_once('@') else {
        return url.to_string();
    };
    match credentials.split_once(':') {
        Some((user, _)) => format!("{scheme}://{user}:***@{host}"),
        None => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_are_split_and_trimmed() {
        assert_eq!(
            parse_origins("http://a.com, http://b.com,,"),
            vec!["http://a.com", "http://b.com"]
        );
        assert!(parse_origins("").is_empty());
    }

    #[test]
    fn database_url_from_components() {
        assert_eq!(
            build_database_url("db", "5432", "app", "s3cret", "files"),
            "postgres://app:s3cret@db:5432/files?sslmode=disable"
        );
        assert_eq!(
            build_database_url("db", "5432", "app", "", "files"),
            "postgres://app@db:5432/files?sslmode=disable"
        );
    }

    #[test]
    fn debug_output_hides_secrets() {
        let cfg = AppConfig {
            host: "0.0.0.0".into(),
            port: 8000,
            database_url: "postgres://app:s3cret@db:5432/files".into(),
            jwt_secret: "very-secret".into(),
            allowed_origins: vec![],
            aws_region: DEFAULT_REGION.into(),
            bucket_prefix: DEFAULT_BUCKET_PREFIX.into(),
            presign_ttl_secs: 60,
        };
        let printed = format!("{:?}", cfg);

        assert!(!printed.contains("s3cret"));
        assert!(!printed.contains("very-secret"));
        assert!(printed.contains("postgres://app:***@db:5432/files"));
    }
}
