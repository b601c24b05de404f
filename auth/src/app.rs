use axum::{Router, routing::get};
use std::{panic, process, sync::Arc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::Config;
use crate::error::AppError;
use crate::middleware;
use crate::services::auth::clients::ClientRegistry;
use crate::services::auth::jwt::TokenSigner;
use crate::services::auth::jwt_grant_processor::{JwtGrantProcessor, TokenLifespans};
use crate::services::auth::token_issuer::TokenIssuer;
use crate::state::AppState;

fn init_tracing() {
    // RUST_LOG overrides, e.g. `info,auth=debug`
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<(), AppError> {
    init_tracing();
    let config = Config::from_env()?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        env = ?config.app_env,
        addr = %config.addr,
        issuer = config.issuer.as_deref().unwrap_or("<from request>"),
        "starting authorization server"
    );

    let state = build_state(&config)?;
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("authorization server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

/// Build process-level services and inject them into the shared application state.
pub fn build_state(config: &Config) -> Result<AppState, AppError> {
    let signer = Arc::new(TokenSigner::new(
        &config.access_jwt_private_key_pem,
        &config.access_jwt_public_key_pem,
    )?);

    let clients = match &config.clients_path {
        Some(path) => ClientRegistry::from_json_file(path)?,
        None => {
            tracing::warn!("OAUTH_CLIENTS_PATH not set; registering default clients");
            ClientRegistry::defaults()
        }
    };

    let processor = JwtGrantProcessor::new(
        Arc::new(clients),
        signer,
        TokenLifespans {
            access_token_seconds: config.access_token_ttl_seconds,
            refresh_token_seconds: config.refresh_token_ttl_seconds,
        },
        config.issuer.clone(),
    )
    .with_requested_scope_prefix(config.requested_scope_prefix.clone());

    let tokens = TokenIssuer::new(
        Arc::new(processor),
        config.issuer.clone(),
        config.requested_scope_prefix.clone(),
    );

    Ok(AppState::new(Arc::new(tokens)))
}

pub fn build_router(state: AppState) -> Router {
    async fn health() -> &'static str {
        "ok"
    }

    let router = Router::new()
        .route("/health", get(health))
        .merge(api::v1::routes(state.clone()))
        .with_state(state);

    middleware::http::apply(router)
}
