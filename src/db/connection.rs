use anyhow::{Context, Result};
use sqlx::ConnectOptions;
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::info;
use tracing::log::LevelFilter;

/// Mask password in database URL for display
pub fn mask_url_password(url: &str) -> String {
    let Some((protocol, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    let Some((user_info, host_and_path)) = rest.split_once('@') else {
        return url.to_string();
    };
    match user_info.split_once(':') {
        Some((username, _)) => format!("{protocol}://{username}:***@{host_and_path}"),
        None => url.to_string(),
    }
}

/// Open a small pool for catalog introspection.
///
/// Introspection queries can be slow on large catalogs, so slow-statement
/// logging is off. The `label` names the database in error messages along
/// with the masked URL.
pub async fn connect_to_database(url: &str, label: &str) -> Result<PgPool> {
    let masked = mask_url_password(url);
    let options = PgConnectOptions::from_str(url)
        .with_context(|| format!("Invalid URL for {label}: {masked}"))?
        .log_slow_statements(LevelFilter::Off, Duration::from_secs(0));

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to connect to {label} at {masked}"))?;
    info!("Connected to {label} at {masked}");
    Ok(pool)
}
