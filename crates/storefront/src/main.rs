//! Agatha Oeiras Storefront - ceramics shop and its admin area.
//!
//! This binary serves the public shop and `/admin` on port 3000.
//!
//! # Architecture
//!
//! - Axum web framework, Askama templates for server-side rendering
//! - Products and the about page in a `PostgreSQL` document store with an
//!   in-process fallback, so pages render through a database outage
//! - Cart in the visitor's session (`PostgreSQL` or in-memory session store)
//! - Cognito for admin sign-in, object storage for product images, SMTP
//!   for the contact form

#![cfg_attr(not(test), forbid(unsafe_code))]

use oeiras_cloud::{ImageUploader, db, email, identity};
use oeiras_storefront::config::StorefrontConfig;
use oeiras_storefront::state::{AppState, Services};
use sentry::integrations::tracing as sentry_tracing;
use tower_sessions::MemoryStore;
use tower_sessions_sqlx_store::PostgresStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            sample_rate: config.sentry_sample_rate,
            traces_sample_rate: config.sentry_traces_sample_rate,
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    // Load configuration from environment (needed for Sentry init)
    let config = StorefrontConfig::from_env().expect("Failed to load configuration");

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "oeiras_storefront=info,oeiras_cloud=info,tower_http=debug".into()
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    // NOTE: Migrations are NOT run automatically on startup.
    // Run them explicitly via: cargo run -p oeiras-cli -- migrate
    let (backends, pool) = db::build_backends(&config.store)
        .await
        .expect("Failed to initialize document store");

    let services = Services {
        identity: identity::provider_from_config(config.cognito.as_ref())
            .expect("Failed to create identity client"),
        uploader: ImageUploader::from_config(config.object_storage.as_ref(), &config.uploads_dir)
            .expect("Failed to create object storage client"),
        mailer: email::mailer_from_config(config.smtp.as_ref())
            .expect("Failed to create SMTP transport"),
    };

    let addr = config.socket_addr();
    let state = AppState::new(config, backends, services);

    let app = match pool {
        Some(pool) => oeiras_storefront::app(state, PostgresStore::new(pool)),
        None => {
            tracing::warn!("No database, sessions are kept in memory");
            oeiras_storefront::app(state, MemoryStore::default())
        }
    };

    // Sentry layers (outermost for full request coverage)
    let app = app
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    tracing::info!("storefront listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
