//! # Store Handle
//!
//! The client half of a [`RecordStore`](crate::RecordStore).

use crate::error::StoreError;
use crate::message::StoreRequest;
use crate::record::Record;
use tokio::sync::{mpsc, oneshot};

/// A type-safe, cloneable handle for sending requests to a `RecordStore`.
///
/// Holds only a channel sender, so cloning is cheap and handles can be shared across
/// tasks. The store task shuts down once every handle has been dropped.
pub struct StoreHandle<T: Record> {
    sender: mpsc::Sender<StoreRequest<T>>,
}

impl<T: Record> Clone for StoreHandle<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<T: Record> StoreHandle<T> {
    pub fn new(sender: mpsc::Sender<StoreRequest<T>>) -> Self {
        Self { sender }
    }

    async fn request<R>(
        &self,
        build: impl FnOnce(oneshot::Sender<Result<R, StoreError>>) -> StoreRequest<T>,
    ) -> Result<R, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| StoreError::StoreClosed)?;
        response.await.map_err(|_| StoreError::StoreDropped)?
    }

    pub async fn create(&self, params: T::Create) -> Result<T, StoreError> {
        self.request(|respond_to| StoreRequest::Create { params, respond_to })
            .await
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<T>, StoreError> {
        self.request(|respond_to| StoreRequest::Get { id, respond_to })
            .await
    }

    /// All records in insertion order.
    pub async fn list(&self) -> Result<Vec<T>, StoreError> {
        self.request(|respond_to| StoreRequest::List {
            filter: None,
            respond_to,
        })
        .await
    }

    /// Records matching `keep`, in insertion order.
    pub async fn list_where(
        &self,
        keep: impl Fn(&T) -> bool + Send + Sync + 'static,
    ) -> Result<Vec<T>, StoreError> {
        self.request(|respond_to| StoreRequest::List {
            filter: Some(Box::new(keep)),
            respond_to,
        })
        .await
    }

    pub async fn update(&self, id: T::Id, update: T::Update) -> Result<T, StoreError> {
        self.request(|respond_to| StoreRequest::Update {
            id,
            update,
            respond_to,
        })
        .await
    }

    pub async fn delete(&self, id: T::Id) -> Result<(), StoreError> {
        self.request(|respond_to| StoreRequest::Delete { id, respond_to })
            .await
    }

    /// Removes every record matching `doomed` and returns how many went.
    pub async fn delete_where(
        &self,
        doomed: impl Fn(&T) -> bool + Send + Sync + 'static,
    ) -> Result<usize, StoreError> {
        self.request(|respond_to| StoreRequest::DeleteWhere {
            filter: Box::new(doomed),
            respond_to,
        })
        .await
    }
}
