//! # Record Store Task
//!
//! `RecordStore<T>` is the server half of the store: it owns the records for one resource
//! type and the receiving end of the request channel, and processes requests one at a time.
//! Each store runs in its own Tokio task, so the map needs no lock.
//!
//! Records are kept in insertion order; `List` returns them in that order, which is the
//! order the seed fixtures were given in followed by anything created later.

use crate::error::StoreError;
use crate::handle::StoreHandle;
use crate::message::StoreRequest;
use crate::record::Record;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// The in-memory store for one record type.
///
/// # Usage Pattern
///
/// 1. **Create**: `RecordStore::new(buffer, next_id)` returns the store and a handle.
/// 2. **Seed**: optionally call [`RecordStore::seed`] with fixture records.
/// 3. **Run**: spawn `store.run()`; it exits once every handle is dropped.
pub struct RecordStore<T: Record> {
    receiver: mpsc::Receiver<StoreRequest<T>>,
    records: HashMap<T::Id, T>,
    order: Vec<T::Id>,
    next_id: Box<dyn Fn() -> T::Id + Send + Sync>,
}

impl<T: Record> RecordStore<T> {
    /// Creates a new store and its handle.
    ///
    /// * `buffer_size` - capacity of the request channel.
    /// * `next_id` - generator for the IDs of created records.
    pub fn new(
        buffer_size: usize,
        next_id: impl Fn() -> T::Id + Send + Sync + 'static,
    ) -> (Self, StoreHandle<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let store = Self {
            receiver,
            records: HashMap::new(),
            order: Vec::new(),
            next_id: Box::new(next_id),
        };
        (store, StoreHandle::new(sender))
    }

    /// Loads fixture records before the store starts serving requests.
    /// A record whose id is already present replaces the earlier one in place.
    pub fn seed(mut self, records: impl IntoIterator<Item = T>) -> Self {
        for record in records {
            self.insert(record);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn insert(&mut self, record: T) {
        let id = record.id().clone();
        if self.records.insert(id.clone(), record).is_none() {
            self.order.push(id);
        }
    }

    fn remove(&mut self, id: &T::Id) -> Option<T> {
        let removed = self.records.remove(id);
        if removed.is_some() {
            self.order.retain(|existing| existing != id);
        }
        removed
    }

    fn ordered(&self) -> impl Iterator<Item = &T> {
        self.order.iter().filter_map(|id| self.records.get(id))
    }

    /// Runs the request loop until the channel closes.
    pub async fn run(mut self) {
        // "Dog" instead of "pawmatch::model::dog::Dog"
        let record_type = std::any::type_name::<T>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        info!(record_type, size = self.records.len(), "Store started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                StoreRequest::Create { params, respond_to } => {
                    debug!(record_type, ?params, "Create");
                    let id = (self.next_id)();
                    match T::from_create(id.clone(), params) {
                        Ok(record) => {
                            // Records may keep an id carried by the payload instead.
                            let id = record.id().clone();
                            self.insert(record.clone());
                            info!(record_type, %id, size = self.records.len(), "Created");
                            let _ = respond_to.send(Ok(record));
                        }
                        Err(e) => {
                            warn!(record_type, error = %e, "Create failed");
                            let _ = respond_to.send(Err(StoreError::Record(Box::new(e))));
                        }
                    }
                }
                StoreRequest::Get { id, respond_to } => {
                    let record = self.records.get(&id).cloned();
                    let found = record.is_some();
                    debug!(record_type, %id, found, "Get");
                    let _ = respond_to.send(Ok(record));
                }
                StoreRequest::List { filter, respond_to } => {
                    let records: Vec<T> = match &filter {
                        Some(keep) => self.ordered().filter(|r| keep(*r)).cloned().collect(),
                        None => self.ordered().cloned().collect(),
                    };
                    debug!(record_type, count = records.len(), filtered = filter.is_some(), "List");
                    let _ = respond_to.send(Ok(records));
                }
                StoreRequest::Update {
                    id,
                    update,
                    respond_to,
                } => {
                    debug!(record_type, %id, ?update, "Update");
                    if let Some(record) = self.records.get_mut(&id) {
                        if let Err(e) = record.apply_update(update) {
                            warn!(record_type, %id, error = %e, "Update failed");
                            let _ = respond_to.send(Err(StoreError::Record(Box::new(e))));
                            continue;
                        }
                        info!(record_type, %id, "Updated");
                        let _ = respond_to.send(Ok(record.clone()));
                    } else {
                        warn!(record_type, %id, "Not found");
                        let _ = respond_to.send(Err(StoreError::NotFound(id.to_string())));
                    }
                }
                StoreRequest::Delete { id, respond_to } => {
                    debug!(record_type, %id, "Delete");
                    if self.remove(&id).is_some() {
                        info!(record_type, %id, size = self.records.len(), "Deleted");
                        let _ = respond_to.send(Ok(()));
                    } else {
                        warn!(record_type, %id, "Not found");
                        let _ = respond_to.send(Err(StoreError::NotFound(id.to_string())));
                    }
                }
                StoreRequest::DeleteWhere { filter, respond_to } => {
                    let doomed: Vec<T::Id> = self
                        .ordered()
                        .filter(|r| filter(*r))
                        .map(|r| r.id().clone())
                        .collect();
                    for id in &doomed {
                        self.remove(id);
                    }
                    info!(record_type, removed = doomed.len(), size = self.records.len(), "Deleted matching");
                    let _ = respond_to.send(Ok(doomed.len()));
                }
            }
        }

        info!(record_type, size = self.records.len(), "Shutdown");
    }
}
