use auth_redirect::tracing::setup_tracing;
use auth_redirect::{start_server, RedirectConfig};
use tracing::error;

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let config = RedirectConfig::from_env().map_err(|e| {
        error!(error = %e, "Invalid configuration");
        e.to_string()
    })?;

    start_server(config).await.map_err(|e| e.to_string())
}
