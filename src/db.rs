use std::time::Duration;

use anyhow::Context;
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    PgPool,
};
use tracing::{info, warn};

use crate::config::{DatabaseConfig, DatabaseTarget};

pub fn connect_options(target: &DatabaseTarget) -> anyhow::Result<PgConnectOptions> {
    let options = match target {
        DatabaseTarget::Url(url) => url
            .parse::<PgConnectOptions>()
            .context("parse DATABASE_URL")?,
        DatabaseTarget::Parts {
            host,
            port,
            user,
            password,
            name,
        } => PgConnectOptions::new()
            .host(host)
            .port(*port)
            .username(user)
            .password(password)
            .database(name),
    };
    Ok(options)
}

pub async fn connect(cfg: &DatabaseConfig) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(cfg.max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(connect_options(&cfg.target)?)
        .await
        .context("connect to database")?;
    info!("connected to database");
    Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) {
    if let Err(e) = sqlx::migrate!("./migrations").run(pool).await {
        warn!(error = %e, "migration failed; continuing");
    }
}
