// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::time::Duration;

use axum_server::{tls_rustls::RustlsConfig, Handle};
use tracing_subscriber::EnvFilter;

use badge_issuance_server::{
    api::router,
    config::AppConfig,
    state::{AppState, AuthConfig, ServiceContext},
};

/// Time allowed for in-flight requests after a shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn shutdown_signal(handle: Handle<std::net::SocketAddr>) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
    handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    // Must run before any TLS operation.
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| "failed to install rustls crypto provider")?;

    let config = AppConfig::from_env()?;
    let ctx = ServiceContext::connect(&config).await?;
    let state = AppState::new(ctx).with_auth_config(AuthConfig {
        admin_public_keys: config.admin_public_keys.clone(),
    });
    let ctx = state.ctx.clone();
    let app = router(state);

    let handle = Handle::new();
    tokio::spawn(shutdown_signal(handle.clone()));

    let addr = config.bind_addr;
    match &config.tls {
        Some(tls) => {
            let tls_config = RustlsConfig::from_pem_file(&tls.cert, &tls.key).await?;
            tracing::info!(%addr, "Badge issuance server listening on https (docs at /docs)");
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            tracing::warn!(%addr, "TLS not configured, serving plain http (docs at /docs)");
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
    }

    ctx.close().await;
    Ok(())
}
