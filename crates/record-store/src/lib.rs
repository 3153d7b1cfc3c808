//! # Record Store
//!
//! An in-process, task-per-resource record store. Every stub repository in PawMatch is a thin
//! adapter over one of these stores, so previews and tests exercise the same request/response
//! shape the live repositories have, without any network I/O.
//!
//! ## Architecture Overview
//!
//! 1. **Record layer** ([`Record`]): the resource type, its id, create and update payloads.
//! 2. **Runtime layer** ([`RecordStore`]): owns the records and serves requests sequentially.
//! 3. **Interface layer** ([`StoreHandle`]): cloneable, type-safe async API.
//!
//! ```rust
//! use record_store::{Record, RecordStore};
//!
//! #[derive(Clone, Debug)]
//! struct Shelter { id: u32, name: String }
//! #[derive(Debug)] struct ShelterCreate { name: String }
//! #[derive(Debug, thiserror::Error)] #[error("shelter error")] struct ShelterError;
//!
//! impl Record for Shelter {
//!     type Id = u32;
//!     type Create = ShelterCreate;
//!     type Update = ShelterCreate;
//!     type Error = ShelterError;
//!
//!     fn id(&self) -> &u32 { &self.id }
//!     fn from_create(id: u32, params: ShelterCreate) -> Result<Self, ShelterError> {
//!         Ok(Self { id, name: params.name })
//!     }
//!     fn apply_update(&mut self, update: ShelterCreate) -> Result<(), ShelterError> {
//!         self.name = update.name;
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let (store, handle) = RecordStore::<Shelter>::new(10, || 1);
//!     tokio::spawn(store.run());
//!
//!     let shelter = handle.create(ShelterCreate { name: "Harbor".into() }).await.unwrap();
//!     assert_eq!(handle.get(shelter.id).await.unwrap().unwrap().name, "Harbor");
//! }
//! ```
//!
//! ## Concurrency Model
//!
//! - Each store runs in its own Tokio task and processes one request at a time.
//! - Stores run in parallel with each other.
//! - Dropping every handle closes the channel and ends the task.
//!
//! ## Testing
//!
//! [`mock::MockStore`] answers requests from scripted expectations; see the [`mock`] module.

pub mod error;
pub mod handle;
pub mod message;
pub mod mock;
pub mod record;
pub mod store;
pub mod tracing;

pub use error::StoreError;
pub use handle::StoreHandle;
pub use message::{Filter, Response, StoreRequest};
pub use record::Record;
pub use store::RecordStore;
