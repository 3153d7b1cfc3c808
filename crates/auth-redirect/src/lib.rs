//! # Auth Redirect
//!
//! A tiny web service that sits between the OAuth provider and the PawMatch app.
//!
//! The provider can only send the browser back to an `https://` URL. This service receives
//! that request and bounces it to the app's custom scheme, keeping every token the provider
//! attached:
//!
//! - `GET /login-callback?code=...` answers `302` to `pawmatch://login-callback?code=...`.
//! - `GET /login-callback` whose tokens travel in the `#fragment` gets a small page that
//!   forwards `location.hash` from the browser, since fragments never reach a server.
//!
//! It also serves the `apple-app-site-association` file so iOS can open `/login-callback*`
//! links straight in the app, plus `GET /health` for the load balancer.
//!
//! ```sh
//! APPLE_TEAM_ID=ABCDE12345 APPLE_BUNDLE_ID=app.pawmatch.ios RUST_LOG=info cargo run -p auth-redirect
//! ```

pub mod config;
pub mod error;
pub mod routes;
pub mod tracing;

use axum::{routing::get, Router};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use ::tracing::info;

pub use config::RedirectConfig;
pub use error::BridgeError;

pub fn router(config: RedirectConfig) -> Router {
    Router::new()
        .route(
            "/.well-known/apple-app-site-association",
            get(routes::apple_app_site_association),
        )
        .route(
            "/apple-app-site-association",
            get(routes::apple_app_site_association),
        )
        .route("/login-callback", get(routes::login_callback))
        .route("/health", get(routes::health))
        .with_state(Arc::new(config))
}

/// Serves on an already bound listener until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    config: RedirectConfig,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), BridgeError> {
    if let Ok(address) = listener.local_addr() {
        info!(%address, scheme = %config.app_scheme, "Redirect bridge running");
    }
    axum::serve(listener, router(config))
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("Redirect bridge stopped");
    Ok(())
}

/// Binds `0.0.0.0:<port>` and serves until Ctrl+C or SIGTERM.
pub async fn start_server(config: RedirectConfig) -> Result<(), BridgeError> {
    let address = format!("0.0.0.0:{}", config.port);
    info!("Binding to {address}");
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| BridgeError::Bind { address, source })?;
    serve(listener, config, shutdown_signal()).await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, shutting down");
        } else {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
