/*
 * Responsibility
 * - tracing / panic hook の初期化
 * - Config 読み込み → 依存生成 → Router 組み立て (認証 gate + HTTP middleware)
 * - axum::serve() で起動
 */
use std::{panic, process, sync::Arc};

use anyhow::Result;
use axum::Router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::{Config, HttpSettings};
use crate::middleware::{self, auth::AccessGate};
use crate::repos::{
    author_repo::InMemoryAuthorRepo, book_repo::InMemoryBookRepo, user_repo::InMemoryUserRepo,
};
use crate::services::account::AccountService;
use crate::services::catalog::CatalogService;
use crate::services::auth::{AccessTokenCodec, build_auth_services};
use crate::services::clock::{Clock, SystemClock};
use crate::state::AppState;

fn init_tracing() {
    // RUST_LOG wins; e.g. RUST_LOG=info,library_api=debug,tower_http=debug
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

        // development: crash the whole process; production: default hook, keep serving
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();

    // Missing/invalid security settings stop the process here, before binding.
    let config = Config::from_env().inspect_err(|e| tracing::error!(error = %e, "configuration error"))?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting library API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let (state, codec) = build_state(&config, Arc::new(SystemClock));
    let app = build_router(state, codec, &config.http);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_state(config: &Config, clock: Arc<dyn Clock>) -> (AppState, Arc<AccessTokenCodec>) {
    let (codec, issuer) = build_auth_services(config, clock);
    let accounts = AccountService::new(
        Arc::new(InMemoryUserRepo::new()),
        issuer,
        config.password_hash_cost,
    );
    let catalog = CatalogService::new(
        Arc::new(InMemoryBookRepo::seeded()),
        Arc::new(InMemoryAuthorRepo::seeded()),
    );

    (AppState::new(accounts, catalog), codec)
}

fn build_router(state: AppState, codec: Arc<AccessTokenCodec>, http: &HttpSettings) -> Router {
    let (routes, policies) = api::v1::routes().into_parts();
    let gate = AccessGate::new(codec, Arc::new(policies));

    let router = middleware::auth::apply(routes, gate).with_state(state);
    middleware::http::apply(router, http)
}
