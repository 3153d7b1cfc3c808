//! # Store Messages
//!
//! Request types sent from a [`StoreHandle`](crate::StoreHandle) to its
//! [`RecordStore`](crate::RecordStore) task.

use crate::error::StoreError;
use crate::record::Record;
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by stores.
pub type Response<T> = oneshot::Sender<Result<T, StoreError>>;

/// Predicate used by `List` and `DeleteWhere` requests.
pub type Filter<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

/// Message sent to the store task.
///
/// The variants map onto the operations a table-backed repository needs:
/// create, read one, read many (optionally filtered), update, delete by id and
/// delete by predicate.
pub enum StoreRequest<T: Record> {
    Create {
        params: T::Create,
        respond_to: Response<T>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    List {
        filter: Option<Filter<T>>,
        respond_to: Response<Vec<T>>,
    },
    Update {
        id: T::Id,
        update: T::Update,
        respond_to: Response<T>,
    },
    Delete {
        id: T::Id,
        respond_to: Response<()>,
    },
    DeleteWhere {
        filter: Filter<T>,
        respond_to: Response<usize>,
    },
}

impl<T: Record> std::fmt::Debug for StoreRequest<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreRequest::Create { params, .. } => f.debug_struct("Create").field("params", params).finish(),
            StoreRequest::Get { id, .. } => f.debug_struct("Get").field("id", id).finish(),
            StoreRequest::List { filter, .. } => f
                .debug_struct("List")
                .field("filtered", &filter.is_some())
                .finish(),
            StoreRequest::Update { id, update, .. } => f
                .debug_struct("Update")
                .field("id", id)
                .field("update", update)
                .finish(),
            StoreRequest::Delete { id, .. } => f.debug_struct("Delete").field("id", id).finish(),
            StoreRequest::DeleteWhere { .. } => f.debug_struct("DeleteWhere").finish(),
        }
    }
}
