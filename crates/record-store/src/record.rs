//! # Record Trait
//!
//! The `Record` trait is the contract every stored resource (Dog, Adopter, Match, ...) must
//! implement to be held by a [`RecordStore`](crate::RecordStore). It names the identifier,
//! the create and update payloads, and the error type, and it tells the store how to build
//! a record from a payload and how to apply an update to it.
//!
//! # Architecture Note
//! The store loop is written *once* against this trait and reused for every resource.
//! Associated types keep the payloads apart: a `DogCreate` can never reach the adopter store.

use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Trait that any resource must implement to be managed by a `RecordStore`.
pub trait Record: Clone + Send + Sync + 'static {
    /// The unique identifier for this record (e.g., `Uuid`, `String`).
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug;

    /// The data required to create a new record.
    type Create: Send + Sync + Debug;

    /// The data required to update an existing record.
    type Update: Send + Sync + Debug;

    /// The error type raised by `from_create` and `apply_update`.
    type Error: std::error::Error + Send + Sync + 'static;

    /// The identifier of this record. Stores key seeded records by it.
    fn id(&self) -> &Self::Id;

    /// Construct the full record from a freshly generated ID and the payload.
    fn from_create(id: Self::Id, params: Self::Create) -> Result<Self, Self::Error>;

    /// Apply an update payload in place.
    fn apply_update(&mut self, update: Self::Update) -> Result<(), Self::Error>;
}
