//! # Observability & Tracing
//!
//! [`setup_tracing`] installs the process-wide subscriber. Store tasks, repositories and
//! interactors log with structured fields (`record_type`, `%id`, counts) so the compact
//! single-line format stays readable.
//!
//! ```bash
//! RUST_LOG=info cargo run                       # lifecycle and writes
//! RUST_LOG=debug cargo run                      # every request with payloads
//! RUST_LOG=pawmatch::interactor=debug cargo run # one layer only
//! ```
//!
//! With `RUST_LOG=info` a liked-dogs load in the stub environment reads:
//!
//! ```text
//! INFO Store started record_type="Dog" size=7
//! INFO load_liked_dogs: Load finished what="liked_dogs"
//! ```

/// Initializes the tracing subscriber from `RUST_LOG`.
///
/// Calling it twice panics (the global subscriber can only be set once); tests should use
/// [`try_setup_tracing`] instead.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}

/// Like [`setup_tracing`] but returns `false` instead of panicking when a subscriber is
/// already installed.
pub fn try_setup_tracing() -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .try_init()
        .is_ok()
}
