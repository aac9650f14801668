use std::{
    net::{IpAddr, SocketAddr},
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use todo_core::{service::DEFAULT_WEEKEND_MARKER, StoreLocation};

use crate::HttpSettings;

#[derive(Debug, Parser)]
#[command(name = "todo-server")]
#[command(about = "HTTP service for a dated todo list")]
pub struct Cli {
    /// Load environment overrides from a dotenv `FILE`.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub db_location: StoreLocation,
    pub db_name: String,
    pub url_prefix: String,
    pub request_timeout: Duration,
    pub shutdown_timeout: Duration,
    pub weekend_marker: String,
}

/// Values in `path` override variables already set in the environment.
pub fn load_env_file(path: &Path) -> Result<()> {
    dotenvy::from_path_override(path)
        .with_context(|| format!("failed to load config file {}", path.display()))
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let host = var("HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .context("HOST must be an IP address")?;
        let port = var("PORT", "8080")
            .parse::<u16>()
            .context("PORT must be a valid port number")?;

        let db_uri = var("DB_URI", "memory://");
        let db_location = db_uri
            .parse::<StoreLocation>()
            .with_context(|| format!("DB_URI {db_uri:?} is not a supported store location"))?;

        let db_name = var("DB_NAME", "todo");
        if db_name.is_empty() {
            bail!("DB_NAME must not be empty");
        }

        let url_prefix = var("URL_PREFIX", "");
        if !url_prefix.is_empty() && (!url_prefix.starts_with('/') || url_prefix.ends_with('/')) {
            bail!("URL_PREFIX must start with '/' and must not end with '/', got {url_prefix:?}");
        }

        let request_timeout = seconds(&var("REQUEST_TIMEOUT_SECS", "20"), "REQUEST_TIMEOUT_SECS")?;
        let shutdown_timeout = seconds(&var("SHUTDOWN_TIMEOUT_SECS", "20"), "SHUTDOWN_TIMEOUT_SECS")?;

        Ok(Self {
            bind_addr: SocketAddr::new(host, port),
            db_location,
            db_name,
            url_prefix,
            request_timeout,
            shutdown_timeout,
            weekend_marker: var("WEEKEND_MARKER", DEFAULT_WEEKEND_MARKER),
        })
    }

    pub fn http_settings(&self) -> HttpSettings {
        HttpSettings {
            url_prefix: self.url_prefix.clone(),
            request_timeout: self.request_timeout,
        }
    }
}

fn seconds(raw: &str, key: &str) -> Result<Duration> {
    let secs = raw
        .parse::<u64>()
        .with_context(|| format!("{key} must be a whole number of seconds"))?;
    Ok(Duration::from_secs(secs))
}
