//! Swiping: the liked-dogs list, the Discover deck, and like/dislike/unlike.

use super::{current_adopter, guarded, LoadSink, Loadable};
use crate::error::RepositoryError;
use crate::model::{Dog, DogSets, IdSet, MatchCreate};
use crate::repository::{AdopterRepository, DogRepository, MatchRepository};
use crate::state::{path, AppStore, UserData};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument};
use uuid::Uuid;

/// The dogs whose id is in `liked`, in `liked` order. Ids with no matching dog are skipped.
pub fn liked_subset(liked: &IdSet, dogs: Vec<Dog>) -> Vec<Dog> {
    let mut by_id: HashMap<Uuid, Dog> = dogs.into_iter().map(|dog| (dog.id, dog)).collect();
    liked.iter().filter_map(|id| by_id.remove(id)).collect()
}

#[derive(Clone)]
pub struct DogsInteractor {
    dogs: Arc<dyn DogRepository>,
    adopters: Arc<dyn AdopterRepository>,
    matches: Arc<dyn MatchRepository>,
    state: AppStore,
    load_timeout: Duration,
}

impl DogsInteractor {
    pub fn new(
        dogs: Arc<dyn DogRepository>,
        adopters: Arc<dyn AdopterRepository>,
        matches: Arc<dyn MatchRepository>,
        state: AppStore,
        load_timeout: Duration,
    ) -> Self {
        Self {
            dogs,
            adopters,
            matches,
            state,
            load_timeout,
        }
    }

    /// Fetches every dog and keeps the liked ones, ordered as the liked set is.
    #[instrument(skip(self, sink))]
    pub async fn load_liked_dogs(&self, sink: &impl LoadSink<Vec<Dog>>) -> Loadable<Vec<Dog>> {
        let liked = self.state.get(path::LIKED);
        guarded(sink, "liked_dogs", self.load_timeout, async {
            let dogs = self.dogs.fetch_all().await?;
            Ok(liked_subset(&liked, dogs))
        })
        .await
    }

    /// Dogs not yet swiped on that fit the adopter's preferences, in fetch order.
    #[instrument(skip(self, sink))]
    pub async fn load_discover_deck(&self, sink: &impl LoadSink<Vec<Dog>>) -> Loadable<Vec<Dog>> {
        let state = self.state.snapshot();
        guarded(sink, "discover_deck", self.load_timeout, async {
            let adopter_id = current_adopter(&self.state)?;
            let (adopter, dogs) =
                tokio::try_join!(self.adopters.fetch(adopter_id), self.dogs.fetch_all())?;
            let seen = &state.user_data;
            Ok(dogs
                .into_iter()
                .filter(|dog| {
                    !seen.liked.contains(&dog.id)
                        && !seen.disliked.contains(&dog.id)
                        && !seen.matched.contains(&dog.id)
                })
                .filter(|dog| adopter.preferences.accepts(dog))
                .collect())
        })
        .await
    }

    /// Likes a dog: it moves into the liked and matched sets and a pending match is created
    /// unless the dog was already matched.
    ///
    /// Remote writes happen first; the state only changes once they have all succeeded.
    #[instrument(skip(self))]
    pub async fn like(&self, dog_id: Uuid) -> Result<(), RepositoryError> {
        let adopter_id = current_adopter(&self.state)?;
        let mut sets = self.state.snapshot().user_data;
        if apply_like(&mut sets, dog_id) {
            self.matches
                .create(MatchCreate { adopter_id, dog_id })
                .await?;
        }
        self.persist(adopter_id, &sets).await?;
        self.state.update(|state| {
            apply_like(&mut state.user_data, dog_id);
        });
        info!(%dog_id, "Liked");
        Ok(())
    }

    /// Passes on a dog. A match left over from an earlier like is removed.
    #[instrument(skip(self))]
    pub async fn dislike(&self, dog_id: Uuid) -> Result<(), RepositoryError> {
        let adopter_id = current_adopter(&self.state)?;
        let mut sets = self.state.snapshot().user_data;
        if apply_dislike(&mut sets, dog_id) {
            self.matches.delete_for(adopter_id, dog_id).await?;
        }
        self.persist(adopter_id, &sets).await?;
        self.state.update(|state| {
            apply_dislike(&mut state.user_data, dog_id);
        });
        info!(%dog_id, "Disliked");
        Ok(())
    }

    /// Removes a dog from the liked and matched sets and deletes its match.
    #[instrument(skip(self))]
    pub async fn unlike(&self, dog_id: Uuid) -> Result<(), RepositoryError> {
        let adopter_id = current_adopter(&self.state)?;
        let mut sets = self.state.snapshot().user_data;
        apply_unlike(&mut sets, dog_id);
        self.matches.delete_for(adopter_id, dog_id).await?;
        self.persist(adopter_id, &sets).await?;
        self.state.update(|state| apply_unlike(&mut state.user_data, dog_id));
        info!(%dog_id, "Unliked");
        Ok(())
    }

    /// Writes `sets` to the adopter row.
    async fn persist(&self, adopter_id: Uuid, sets: &UserData) -> Result<(), RepositoryError> {
        self.adopters
            .set_dog_sets(
                adopter_id,
                DogSets {
                    liked: sets.liked.clone(),
                    disliked: sets.disliked.clone(),
                    matched: sets.matched.clone(),
                },
            )
            .await?;
        Ok(())
    }
}

/// Returns `true` if the dog was not matched before.
fn apply_like(sets: &mut UserData, dog_id: Uuid) -> bool {
    sets.disliked.remove(&dog_id);
    sets.liked.insert(dog_id);
    sets.matched.insert(dog_id)
}

/// Returns `true` if the dog was matched before.
fn apply_dislike(sets: &mut UserData, dog_id: Uuid) -> bool {
    sets.liked.remove(&dog_id);
    let was_matched = sets.matched.remove(&dog_id);
    sets.disliked.insert(dog_id);
    was_matched
}

fn apply_unlike(sets: &mut UserData, dog_id: Uuid) {
    sets.liked.remove(&dog_id);
    sets.matched.remove(&dog_id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::interactor::Discard;
    use crate::model::{Adopter, Match};
    use crate::repository::{StubAdopterRepository, StubDogRepository, StubMatchRepository};
    use crate::state::AppState;
    use async_trait::async_trait;
    use record_store::mock::MockStore;
    use record_store::StoreError;
    use tokio::sync::mpsc;

    struct Harness {
        interactor: DogsInteractor,
        adopters: StubAdopterRepository,
        matches: StubMatchRepository,
        state: AppStore,
    }

    fn signed_in_state() -> AppState {
        let adopter = fixtures::adopter();
        let mut state = AppState::default();
        state.session.is_authenticated = true;
        state.session.current_adopter_id = Some(adopter.id);
        state.user_data.liked = adopter.liked_dog_ids;
        state.user_data.disliked = adopter.disliked_dog_ids;
        state.user_data.matched = adopter.matched_dog_ids;
        state
    }

    fn harness() -> Harness {
        let (dogs, _) = StubDogRepository::spawn(fixtures::dogs());
        let (adopters, _) = StubAdopterRepository::spawn(vec![fixtures::adopter()]);
        let (matches, _) = StubMatchRepository::spawn(fixtures::matches());
        let state = AppStore::new(signed_in_state());
        let interactor = DogsInteractor::new(
            Arc::new(dogs),
            Arc::new(adopters.clone()),
            Arc::new(matches.clone()),
            state.clone(),
            Duration::from_secs(10),
        );
        Harness {
            interactor,
            adopters,
            matches,
            state,
        }
    }

    #[test]
    fn test_liked_subset_is_exact_and_in_liked_order() {
        let liked: IdSet = [fixtures::ZIGGY, Uuid::new_v4(), fixtures::BISCUIT]
            .into_iter()
            .collect();
        let subset = liked_subset(&liked, fixtures::dogs());
        let ids: Vec<Uuid> = subset.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![fixtures::ZIGGY, fixtures::BISCUIT]);
    }

    #[tokio::test]
    async fn test_load_liked_dogs() {
        let h = harness();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let outcome = h.interactor.load_liked_dogs(&tx).await;

        let names: Vec<String> = outcome.value().unwrap().iter().map(|d| d.name.clone()).collect();
        assert_eq!(names, vec!["Hazel", "Biscuit"]);
        assert!(rx.recv().await.unwrap().is_loading());
        assert!(rx.recv().await.unwrap().is_terminal());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_unlike_removes_from_liked_and_matched() {
        let h = harness();
        h.interactor.unlike(fixtures::BISCUIT).await.unwrap();

        let data = h.state.snapshot().user_data;
        assert!(!data.liked.contains(&fixtures::BISCUIT));
        assert!(!data.matched.contains(&fixtures::BISCUIT));
        assert!(data.liked.contains(&fixtures::HAZEL));

        let stored = h.adopters.fetch(fixtures::ADOPTER_ID).await.unwrap();
        assert!(!stored.liked_dog_ids.contains(&fixtures::BISCUIT));
        assert!(!stored.matched_dog_ids.contains(&fixtures::BISCUIT));
        assert!(h
            .matches
            .fetch_for_adopter(fixtures::ADOPTER_ID)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_like_creates_pending_match() {
        let h = harness();
        h.interactor.like(fixtures::ZIGGY).await.unwrap();

        let data = h.state.snapshot().user_data;
        assert!(data.liked.contains(&fixtures::ZIGGY));
        assert!(data.matched.contains(&fixtures::ZIGGY));

        let matches = h.matches.fetch_for_adopter(fixtures::ADOPTER_ID).await.unwrap();
        assert!(matches
            .iter()
            .any(|m| m.dog_id == fixtures::ZIGGY && m.status == crate::model::MatchStatus::Pending));
    }

    #[tokio::test]
    async fn test_dislike_after_like_drops_the_match() {
        let h = harness();
        h.interactor.dislike(fixtures::BISCUIT).await.unwrap();

        let data = h.state.snapshot().user_data;
        assert!(data.disliked.contains(&fixtures::BISCUIT));
        assert!(!data.liked.contains(&fixtures::BISCUIT));
        assert!(!data.matched.contains(&fixtures::BISCUIT));
        assert!(h
            .matches
            .fetch_for_adopter(fixtures::ADOPTER_ID)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_discover_deck_skips_seen_and_unwanted_dogs() {
        let h = harness();
        let deck = h.interactor.load_discover_deck(&Discard).await;
        let names: Vec<String> = deck.value().unwrap().iter().map(|d| d.name.clone()).collect();
        // Small or medium, at most 8, not Hazel/Biscuit/Moose; newest listing first.
        assert_eq!(names, vec!["Ziggy", "Pepper", "Juniper"]);
    }

    #[tokio::test]
    async fn test_signed_out_swipe_is_rejected() {
        let h = harness();
        h.state.set(path::CURRENT_ADOPTER_ID, None);
        assert!(h.interactor.like(fixtures::ATLAS).await.unwrap_err().is_not_found());
        assert!(!h.state.snapshot().user_data.liked.contains(&fixtures::ATLAS));
    }

    #[tokio::test]
    async fn test_like_on_matched_dog_keeps_one_match() {
        let h = harness();
        h.interactor.like(fixtures::BISCUIT).await.unwrap();

        let matches = h.matches.fetch_for_adopter(fixtures::ADOPTER_ID).await.unwrap();
        let biscuit = matches.iter().filter(|m| m.dog_id == fixtures::BISCUIT).count();
        assert_eq!(biscuit, 1);
        assert_eq!(h.state.get(path::LIKED).len(), 2);
    }

    /// Stub adopters and dogs, matches answered by `mock`.
    fn with_match_mock(mock: &MockStore<Match>) -> (DogsInteractor, StubAdopterRepository, AppStore) {
        let (dogs, _) = StubDogRepository::spawn(fixtures::dogs());
        let (adopters, _) = StubAdopterRepository::spawn(vec![fixtures::adopter()]);
        let state = AppStore::new(signed_in_state());
        let interactor = DogsInteractor::new(
            Arc::new(dogs),
            Arc::new(adopters.clone()),
            Arc::new(StubMatchRepository::new(mock.handle())),
            state.clone(),
            Duration::from_secs(10),
        );
        (interactor, adopters, state)
    }

    #[tokio::test]
    async fn test_failed_match_create_leaves_like_unapplied() {
        let mut mock = MockStore::<Match>::new();
        mock.expect_create().return_err(StoreError::StoreClosed);
        let (interactor, adopters, state) = with_match_mock(&mock);
        let before = state.snapshot();

        assert!(interactor.like(fixtures::ZIGGY).await.is_err());

        assert_eq!(state.snapshot(), before);
        let stored = adopters.fetch(fixtures::ADOPTER_ID).await.unwrap();
        assert!(!stored.liked_dog_ids.contains(&fixtures::ZIGGY));
        mock.verify();
    }

    #[tokio::test]
    async fn test_failed_match_delete_leaves_unlike_and_dislike_unapplied() {
        let mut mock = MockStore::<Match>::new();
        mock.expect_delete_where().return_err(StoreError::StoreClosed);
        mock.expect_delete_where().return_err(StoreError::StoreClosed);
        let (interactor, adopters, state) = with_match_mock(&mock);
        let before = state.snapshot();

        assert!(interactor.unlike(fixtures::BISCUIT).await.is_err());
        assert!(interactor.dislike(fixtures::BISCUIT).await.is_err());

        assert_eq!(state.snapshot(), before);
        let stored = adopters.fetch(fixtures::ADOPTER_ID).await.unwrap();
        assert!(stored.liked_dog_ids.contains(&fixtures::BISCUIT));
        assert!(stored.matched_dog_ids.contains(&fixtures::BISCUIT));
        assert!(!stored.disliked_dog_ids.contains(&fixtures::BISCUIT));
        mock.verify();
    }

    #[tokio::test]
    async fn test_failed_row_write_leaves_state_alone() {
        let mut adopters = MockStore::<Adopter>::new();
        adopters
            .expect_update(fixtures::ADOPTER_ID)
            .return_err(StoreError::StoreClosed);
        let (dogs, _) = StubDogRepository::spawn(fixtures::dogs());
        let (matches, _) = StubMatchRepository::spawn(fixtures::matches());
        let state = AppStore::new(signed_in_state());
        let before = state.snapshot();
        let interactor = DogsInteractor::new(
            Arc::new(dogs),
            Arc::new(StubAdopterRepository::new(adopters.handle())),
            Arc::new(matches),
            state.clone(),
            Duration::from_secs(10),
        );

        let err = interactor.dislike(fixtures::PEPPER).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Store(_)));
        assert_eq!(state.snapshot(), before);
        adopters.verify();
    }

    struct StalledDogs;

    #[async_trait]
    impl DogRepository for StalledDogs {
        async fn fetch_all(&self) -> Result<Vec<Dog>, RepositoryError> {
            std::future::pending().await
        }
        async fn fetch(&self, _: Uuid) -> Result<Dog, RepositoryError> {
            std::future::pending().await
        }
        async fn fetch_many(&self, _: &[Uuid]) -> Result<Vec<Dog>, RepositoryError> {
            std::future::pending().await
        }
        async fn create(&self, _: crate::model::DogCreate) -> Result<Dog, RepositoryError> {
            std::future::pending().await
        }
        async fn update(&self, _: Uuid, _: crate::model::DogUpdate) -> Result<Dog, RepositoryError> {
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_load_fails_once_after_timeout() {
        let (adopters, _) = StubAdopterRepository::spawn(vec![fixtures::adopter()]);
        let (matches, _) = StubMatchRepository::spawn(Vec::new());
        let interactor = DogsInteractor::new(
            Arc::new(StalledDogs),
            Arc::new(adopters),
            Arc::new(matches),
            AppStore::new(signed_in_state()),
            Duration::from_secs(10),
        );

        let (tx, mut rx) = mpsc::unbounded_channel();
        let started = tokio::time::Instant::now();
        let outcome = interactor.load_liked_dogs(&tx).await;

        assert!(started.elapsed() >= Duration::from_secs(10));
        assert!(matches!(outcome.error(), Some(RepositoryError::Timeout(_))));
        let mut published = Vec::new();
        while let Ok(value) = rx.try_recv() {
            published.push(value);
        }
        assert_eq!(published.len(), 2);
        assert!(published[0].is_loading());
        assert!(matches!(published[1], Loadable::Failed(_)));
    }
}
