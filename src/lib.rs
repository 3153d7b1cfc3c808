//! # PawMatch
//!
//! The client core of a dog-adoption matching app. Adopters swipe through dogs listed by
//! rescuers, like or pass, get matched, schedule visits and chat with rescuers. A magazine of
//! care articles comes from a headless CMS.
//!
//! Everything a screen needs lives here: the data model, repositories for the hosted backend
//! and the CMS, stub repositories for previews and tests, a single observable [`AppState`],
//! and interactors that turn user actions into repository calls and state changes.
//!
//! ## Core Design Principles
//!
//! ### 1. One observable state
//! All shared UI state lives in one [`AppState`] value held by an [`AppStore`]. Mutations go
//! through typed key paths ([`state::path`]) or a closure over the whole value, and every
//! subscriber sees the change.
//!
//! ### 2. Results as values
//! A load never returns "nothing yet" through an error. Interactors publish
//! [`Loadable`](interactor::Loadable) values into a sink: first `Loading`, then exactly one
//! terminal value (`Loaded` or `Failed`).
//!
//! ### 3. Swappable backends
//! Interactors only see `Arc<dyn ...Repository>`. The live implementations speak HTTP; the
//! stub implementations sit on top of in-process `record_store` tasks seeded from
//! [`fixtures`].
//!
//! ### 4. Observability
//! `tracing` everywhere with structured fields. Interactor and repository entry points carry
//! `#[instrument]` spans.
//!
//! ## Module Tour
//!
//! ### 1. Data ([`model`], [`dto`])
//! Domain types and the wire rows they are decoded from.
//!
//! ### 2. Transports ([`supabase`], [`sanity`])
//! Thin HTTP clients for the backend's REST and auth endpoints and for the CMS query API.
//!
//! ### 3. Repositories ([`repository`])
//! One trait per resource, with live and stub implementations.
//!
//! ### 4. Behaviour ([`interactor`], [`state`])
//! Use cases over the repositories, writing into the shared state.
//!
//! ### 5. Wiring ([`lifecycle`])
//! [`Container`](lifecycle::Container) builds the whole graph and tears it down.
//!
//! ## Running the Demo
//!
//! ```bash
//! # Walks the stub container through a sign-in and a few swipes
//! RUST_LOG=info cargo run
//! ```
//!
//! [`AppState`]: state::AppState
//! [`AppStore`]: state::AppStore

pub mod config;
pub mod dto;
pub mod error;
pub mod fixtures;
pub mod interactor;
pub mod lifecycle;
pub mod model;
pub mod repository;
pub mod sanity;
pub mod state;
pub mod supabase;

pub use config::Config;
pub use error::{AuthError, ConfigError, RepositoryError};
pub use lifecycle::Container;
