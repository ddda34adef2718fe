#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
// easier to use when using the functions as callback of foreign functions
#![allow(clippy::needless_pass_by_value)]
// #![doc = include_str!("../README.md")]

use std::net::SocketAddr;

use anyhow::Result;
use axum::Extension;
use axum::Router;
use axum::routing::get;
use sqlx::PgPool;
use tower_http::trace::TraceLayer;
use tracing_subscriber::prelude::*;

use crate::api::JwtKeys;
use crate::settings::Settings;
use crate::settings::env_var;
use crate::settings::env_var_or_else;
use crate::storage::Memory;
use crate::storage::Postgres;
use crate::storage::Storage;
use crate::users::ensure_initial_user;

mod api;
mod basic_auth;
mod graceful_shutdown;
mod headers;
mod health;
mod password;
mod qr;
mod quick_create;
mod redirects;
mod resolver;
mod root;
mod settings;
mod storage;
#[cfg(test)]
mod tests;
mod users;

const DEFAULT_RUST_LOG: &str = "waypost=debug,tower_http=debug";
const DEFAULT_ADDRESS: &str = "0.0.0.0:6000";

/// Where the redirects and operators are stored
pub enum DatabaseConfig {
    /// Postgres when `DATABASE_URL` is set, in memory otherwise
    DetectConfig,

    /// Use existing Postgres connection
    ExistingConnection(PgPool),

    /// Keep everything in memory, gone after a restart
    #[allow(dead_code)]
    Memory,
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_environment();
    setup_tracing();

    let settings = Settings::from_env();
    let app = setup_app(DatabaseConfig::DetectConfig, settings).await?;

    let address = setup_address()?;
    tracing::info!("Listening on {}", address);

    let listener = tokio::net::TcpListener::bind(address).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(graceful_shutdown::handler())
        .await?;

    Ok(())
}

/// Create and setup the app with its dependencies
///
/// # Errors
///
/// Will return `Err` if any of its dependencies fail to load:
/// - Database connection
/// - Initial user setup
pub async fn setup_app(config: DatabaseConfig, settings: Settings) -> Result<Router> {
    match config {
        DatabaseConfig::DetectConfig => match env_var("DATABASE_URL") {
            Some(database_url) => {
                tracing::info!("Storing redirects in Postgres");

                let storage = Postgres::connect(&database_url).await?;
                setup_storage(storage, settings).await
            }
            None => {
                tracing::info!("`DATABASE_URL` is not set, storing redirects in memory");

                setup_storage(Memory::new(), settings).await
            }
        },
        DatabaseConfig::ExistingConnection(pool) => {
            let storage = Postgres::new_with_pool(pool).await?;
            setup_storage(storage, settings).await
        }
        DatabaseConfig::Memory => setup_storage(Memory::new(), settings).await,
    }
}

/// Make sure the storage is usable before routing to it
async fn setup_storage<S: Storage>(storage: S, settings: Settings) -> Result<Router> {
    ensure_initial_user(&storage, &settings).await?;

    Ok(create_router(storage, settings))
}

/// Create the router for Waypost
fn create_router<S: Storage>(storage: S, settings: Settings) -> Router {
    let jwt_keys = JwtKeys::new(settings.jwt_secret.as_bytes());

    api::router::<S>()
        .route("/-/health/", get(health::health::<S>))
        .fallback(root::root::<S>)
        .layer(TraceLayer::new_for_http())
        .layer(Extension(storage))
        .layer(Extension(jwt_keys))
        .layer(Extension(settings))
}

fn setup_environment() {
    dotenvy::dotenv().ok();
}

fn setup_tracing() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::registry;

    registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_RUST_LOG.into()),
        ))
        .with(fmt::layer())
        .init();
}

fn setup_address() -> Result<SocketAddr> {
    let mut address =
        env_var_or_else("ADDRESS", || String::from(DEFAULT_ADDRESS)).parse::<SocketAddr>()?;

    // optional override of just the port
    if let Some(port) = env_var("PORT") {
        let port = port.parse::<u16>()?;

        address.set_port(port);
    }

    Ok(address)
}
