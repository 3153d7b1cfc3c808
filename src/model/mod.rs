//! Domain records mirrored from the backend tables and CMS documents.
//!
//! These are the types the interactors and [`crate::state::AppState`] work with. Wire
//! shapes live in [`crate::dto`]; each record also has `*Create`/`*Update` payloads used by
//! both the live and the stub repositories.

pub mod adopter;
pub mod article;
pub mod dog;
pub mod id_set;
pub mod matching;
pub mod message;
pub mod visit;

pub use adopter::*;
pub use article::*;
pub use dog::*;
pub use id_set::*;
pub use matching::*;
pub use message::*;
pub use visit::*;

/// A payload that cannot be turned into a record.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
#[error("Validation error: {0}")]
pub struct ValidationError(pub String);
