//! # Interactors
//!
//! Thin request/response shims between the UI and the repositories. Each interactor reads
//! and writes [`AppStore`](crate::state::AppStore) through its key paths and reports loads
//! as [`Loadable`] values pushed into a [`LoadSink`].
//!
//! A load publishes `Loading` and then exactly one terminal value (`Loaded` or `Failed`).
//! Bulk loads are additionally bounded by the configured load timeout; nothing retries.

pub mod adopter;
pub mod dogs;
pub mod magazine;
pub mod matches;
pub mod session;

pub use adopter::AdopterInteractor;
pub use dogs::DogsInteractor;
pub use magazine::MagazineInteractor;
pub use matches::MatchesInteractor;
pub use session::SessionInteractor;

use crate::error::RepositoryError;
use crate::state::{path, AppStore};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};
use uuid::Uuid;

/// The state of a UI-triggered load.
#[derive(Debug, Clone, Default)]
pub enum Loadable<T> {
    #[default]
    NotRequested,
    Loading,
    Loaded(T),
    Failed(Arc<RepositoryError>),
}

impl<T> Loadable<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Loadable::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&RepositoryError> {
        match self {
            Loadable::Failed(error) => Some(error),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Loadable::Loading)
    }

    /// `Loaded` or `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Loadable::Loaded(_) | Loadable::Failed(_))
    }

    pub fn into_result(self) -> Option<Result<T, Arc<RepositoryError>>> {
        match self {
            Loadable::Loaded(value) => Some(Ok(value)),
            Loadable::Failed(error) => Some(Err(error)),
            Loadable::NotRequested | Loadable::Loading => None,
        }
    }
}

impl<T> From<Result<T, RepositoryError>> for Loadable<T> {
    fn from(result: Result<T, RepositoryError>) -> Self {
        match result {
            Ok(value) => Loadable::Loaded(value),
            Err(error) => Loadable::Failed(Arc::new(error)),
        }
    }
}

/// Where a load reports its progress.
pub trait LoadSink<T>: Send + Sync {
    fn publish(&self, value: Loadable<T>);
}

impl<T: Send + Sync> LoadSink<T> for watch::Sender<Loadable<T>> {
    fn publish(&self, value: Loadable<T>) {
        self.send_replace(value);
    }
}

impl<T: Send> LoadSink<T> for mpsc::UnboundedSender<Loadable<T>> {
    fn publish(&self, value: Loadable<T>) {
        let _ = self.send(value);
    }
}

/// A sink for callers that only use the returned value.
#[derive(Debug, Clone, Copy, Default)]
pub struct Discard;

impl<T> LoadSink<T> for Discard {
    fn publish(&self, _value: Loadable<T>) {}
}

/// Runs `fut` and reports it to `sink`.
pub(crate) async fn load<T: Clone>(
    sink: &impl LoadSink<T>,
    what: &'static str,
    fut: impl Future<Output = Result<T, RepositoryError>>,
) -> Loadable<T> {
    sink.publish(Loadable::Loading);
    let outcome = Loadable::from(fut.await);
    match &outcome {
        Loadable::Failed(e) => warn!(what, error = %e, "Load failed"),
        _ => info!(what, "Load finished"),
    }
    sink.publish(outcome.clone());
    outcome
}

/// Like [`load`], failing with [`RepositoryError::Timeout`] if `fut` has not resolved
/// within `limit`. The abandoned future is dropped.
pub(crate) async fn guarded<T: Clone>(
    sink: &impl LoadSink<T>,
    what: &'static str,
    limit: Duration,
    fut: impl Future<Output = Result<T, RepositoryError>>,
) -> Loadable<T> {
    load(sink, what, async move {
        tokio::time::timeout(limit, fut)
            .await
            .unwrap_or_else(|_| Err(RepositoryError::Timeout(limit)))
    })
    .await
}

/// The signed-in adopter, or `NotFound` when nobody is signed in.
pub(crate) fn current_adopter(state: &AppStore) -> Result<Uuid, RepositoryError> {
    state
        .get(path::CURRENT_ADOPTER_ID)
        .ok_or_else(|| RepositoryError::NotFound("no signed-in adopter".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_publishes_loading_then_value() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let outcome = load(&tx, "numbers", async { Ok::<_, RepositoryError>(vec![1, 2]) }).await;
        assert_eq!(outcome.value(), Some(&vec![1, 2]));

        assert!(rx.recv().await.unwrap().is_loading());
        assert_eq!(rx.recv().await.unwrap().value(), Some(&vec![1, 2]));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_guarded_times_out_once() {
        let (tx, mut rx) = mpsc::unbounded_channel::<Loadable<u32>>();
        let limit = Duration::from_secs(10);
        let outcome = guarded(&tx, "never", limit, std::future::pending()).await;

        assert!(matches!(outcome.error(), Some(RepositoryError::Timeout(d)) if *d == limit));
        assert!(rx.recv().await.unwrap().is_loading());
        assert!(matches!(rx.recv().await.unwrap(), Loadable::Failed(_)));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_watch_sink_keeps_terminal_value() {
        let (tx, rx) = watch::channel(Loadable::<u8>::NotRequested);
        load(&tx, "err", async { Err::<u8, _>(RepositoryError::NotFound("x".into())) }).await;
        assert!(rx.borrow().error().is_some_and(RepositoryError::is_not_found));
        assert!(Loadable::<u8>::default().into_result().is_none());
    }
}
