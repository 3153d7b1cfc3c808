//! # Mock Store
//!
//! `MockStore<T>` hands out a real [`StoreHandle<T>`] whose requests are answered from a
//! queue of expectations instead of a live [`RecordStore`](crate::RecordStore). Use it to
//! drive code that sits on top of a store (repositories, interactors) into exact states,
//! error paths included, without seeding fixtures.
//!
//! | | MockStore | RecordStore |
//! |---|---|---|
//! | **State** | none, scripted responses | real records |
//! | **Error injection** | `return_err` | needs a failing record |
//! | **Use case** | logic *around* the handle | the store itself or full stacks |
//!
//! Expectations are consumed in order. A request that does not match the next expectation
//! (wrong operation or wrong id) panics inside the mock task; the caller then observes
//! `StoreError::StoreDropped`, and [`MockStore::verify`] reports the unmet expectations.
//!
//! ```rust
//! use record_store::mock::MockStore;
//! use record_store::Record;
//!
//! #[derive(Clone, Debug)]
//! struct Note { id: u32, text: String }
//! #[derive(Debug, thiserror::Error)] #[error("note error")] struct NoteError;
//!
//! impl Record for Note {
//!     type Id = u32; type Create = String; type Update = String; type Error = NoteError;
//!     fn id(&self) -> &u32 { &self.id }
//!     fn from_create(id: u32, text: String) -> Result<Self, NoteError> { Ok(Self { id, text }) }
//!     fn apply_update(&mut self, text: String) -> Result<(), NoteError> { self.text = text; Ok(()) }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut mock = MockStore::<Note>::new();
//!     mock.expect_get(1).return_ok(Some(Note { id: 1, text: "walk at 9".into() }));
//!
//!     let note = mock.handle().get(1).await.unwrap().unwrap();
//!     assert_eq!(note.text, "walk at 9");
//!     mock.verify();
//! }
//! ```

use crate::error::StoreError;
use crate::handle::StoreHandle;
use crate::message::StoreRequest;
use crate::record::Record;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

enum Expectation<T: Record> {
    Get {
        id: T::Id,
        response: Result<Option<T>, StoreError>,
    },
    List {
        response: Result<Vec<T>, StoreError>,
    },
    Create {
        response: Result<T, StoreError>,
    },
    Update {
        id: T::Id,
        response: Result<T, StoreError>,
    },
    Delete {
        id: T::Id,
        response: Result<(), StoreError>,
    },
    DeleteWhere {
        response: Result<usize, StoreError>,
    },
}

type Queue<T> = Arc<Mutex<VecDeque<Expectation<T>>>>;

/// A store stand-in answering requests from scripted expectations.
pub struct MockStore<T: Record> {
    handle: StoreHandle<T>,
    expectations: Queue<T>,
    _task: tokio::task::JoinHandle<()>,
}

impl<T: Record> Default for MockStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> MockStore<T> {
    /// Creates a mock with no expectations. Must be called inside a Tokio runtime.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<StoreRequest<T>>(100);
        let expectations: Queue<T> = Arc::new(Mutex::new(VecDeque::new()));
        let queue = expectations.clone();

        let task = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let next = queue.lock().unwrap().pop_front();

                match (request, next) {
                    (StoreRequest::Get { id, respond_to }, Some(Expectation::Get { id: expected, response })) => {
                        assert_eq!(id, expected, "get called with unexpected id");
                        let _ = respond_to.send(response);
                    }
                    (StoreRequest::List { respond_to, .. }, Some(Expectation::List { response })) => {
                        let _ = respond_to.send(response);
                    }
                    (StoreRequest::Create { respond_to, .. }, Some(Expectation::Create { response })) => {
                        let _ = respond_to.send(response);
                    }
                    (StoreRequest::Update { id, respond_to, .. }, Some(Expectation::Update { id: expected, response })) => {
                        assert_eq!(id, expected, "update called with unexpected id");
                        let _ = respond_to.send(response);
                    }
                    (StoreRequest::Delete { id, respond_to }, Some(Expectation::Delete { id: expected, response })) => {
                        assert_eq!(id, expected, "delete called with unexpected id");
                        let _ = respond_to.send(response);
                    }
                    (StoreRequest::DeleteWhere { respond_to, .. }, Some(Expectation::DeleteWhere { response })) => {
                        let _ = respond_to.send(response);
                    }
                    (request, _) => {
                        panic!("Unexpected request or expectation mismatch: {request:?}");
                    }
                }
            }
        });

        Self {
            handle: StoreHandle::new(sender),
            expectations,
            _task: task,
        }
    }

    /// The handle to give to the code under test.
    pub fn handle(&self) -> StoreHandle<T> {
        self.handle.clone()
    }

    fn builder<R>(
        &self,
        wrap: impl FnOnce(Result<R, StoreError>) -> Expectation<T> + Send + 'static,
    ) -> ExpectationBuilder<T, R> {
        ExpectationBuilder {
            expectations: self.expectations.clone(),
            wrap: Box::new(wrap),
        }
    }

    pub fn expect_get(&mut self, id: T::Id) -> ExpectationBuilder<T, Option<T>> {
        self.builder(move |response| Expectation::Get { id, response })
    }

    pub fn expect_list(&mut self) -> ExpectationBuilder<T, Vec<T>> {
        self.builder(|response| Expectation::List { response })
    }

    pub fn expect_create(&mut self) -> ExpectationBuilder<T, T> {
        self.builder(|response| Expectation::Create { response })
    }

    pub fn expect_update(&mut self, id: T::Id) -> ExpectationBuilder<T, T> {
        self.builder(move |response| Expectation::Update { id, response })
    }

    pub fn expect_delete(&mut self, id: T::Id) -> ExpectationBuilder<T, ()> {
        self.builder(move |response| Expectation::Delete { id, response })
    }

    pub fn expect_delete_where(&mut self) -> ExpectationBuilder<T, usize> {
        self.builder(|response| Expectation::DeleteWhere { response })
    }

    /// Panics if any expectation was not consumed.
    pub fn verify(&self) {
        let remaining = self.expectations.lock().unwrap().len();
        if remaining != 0 {
            panic!("Not all expectations were met. {remaining} remaining");
        }
    }
}

/// Completes an expectation with the value the mock should answer.
pub struct ExpectationBuilder<T: Record, R> {
    expectations: Queue<T>,
    wrap: Box<dyn FnOnce(Result<R, StoreError>) -> Expectation<T> + Send>,
}

impl<T: Record, R> ExpectationBuilder<T, R> {
    pub fn return_ok(self, value: R) {
        self.push(Ok(value));
    }

    pub fn return_err(self, error: StoreError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<R, StoreError>) {
        let expectation = (self.wrap)(response);
        self.expectations.lock().unwrap().push_back(expectation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Tag {
        id: u32,
        label: String,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("tag error")]
    struct TagError;

    impl Record for Tag {
        type Id = u32;
        type Create = String;
        type Update = String;
        type Error = TagError;

        fn id(&self) -> &u32 {
            &self.id
        }

        fn from_create(id: u32, label: String) -> Result<Self, TagError> {
            Ok(Self { id, label })
        }

        fn apply_update(&mut self, label: String) -> Result<(), TagError> {
            self.label = label;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_expectations_answer_in_order() {
        let mut mock = MockStore::<Tag>::new();
        mock.expect_create().return_ok(Tag {
            id: 9,
            label: "calm".into(),
        });
        mock.expect_list().return_ok(vec![]);
        mock.expect_delete(9).return_err(StoreError::NotFound("9".into()));

        let handle = mock.handle();
        assert_eq!(handle.create("calm".into()).await.unwrap().id, 9);
        assert!(handle.list().await.unwrap().is_empty());
        assert!(matches!(handle.delete(9).await, Err(StoreError::NotFound(_))));
        mock.verify();
    }

    #[tokio::test]
    async fn test_mismatch_drops_the_response() {
        let mut mock = MockStore::<Tag>::new();
        mock.expect_list().return_ok(vec![]);

        let result = mock.handle().get(1).await;
        assert!(matches!(result, Err(StoreError::StoreDropped)));
    }
}
