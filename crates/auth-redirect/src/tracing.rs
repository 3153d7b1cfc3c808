//! Logging for the bridge binary.
//!
//! Every request the bridge answers is logged at `info`, so `RUST_LOG=info` shows one line
//! per callback:
//!
//! ```text
//! INFO Forwarding callback query to app
//! ```

/// Initializes the tracing subscriber from `RUST_LOG`.
///
/// Panics when a global subscriber is already installed.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
