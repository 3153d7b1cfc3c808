//! # Lifecycle
//!
//! Builds the object graph the UI talks to: one [`AppStore`], the repositories, and the
//! interactors wired over them.
//!
//! - [`Container::live`] talks to the hosted backend and the CMS.
//! - [`Container::stub`] spawns one record-store task per resource, seeded from
//!   [`crate::fixtures`]. No network I/O happens.
//!
//! ## Shutdown
//!
//! [`Container::shutdown`] stops the auth observer, drops every interactor (and with them the
//! last store handles), then awaits the store tasks. Store tasks end when their channel
//! closes, so any handle cloned out of the container must be dropped first.

use crate::config::{Config, DEFAULT_LOAD_TIMEOUT};
use crate::error::RepositoryError;
use crate::interactor::{
    AdopterInteractor, DogsInteractor, MagazineInteractor, MatchesInteractor, SessionInteractor,
};
use crate::repository::{
    AdopterRepository, ArticleRepository, AuthService, DogRepository, MatchRepository,
    MessageRepository, SanityArticleRepository, StubAdopterRepository, StubArticleRepository,
    StubAuthService, StubDogRepository, StubMatchRepository, StubMessageRepository,
    StubVisitRepository, SupabaseAdopterRepository, SupabaseAuthService, SupabaseDogRepository,
    SupabaseMatchRepository, SupabaseMessageRepository, SupabaseVisitRepository, VisitRepository,
};
use crate::fixtures;
use crate::sanity::SanityClient;
use crate::state::AppStore;
use crate::supabase::SupabaseClient;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::info;

/// One implementation of every repository.
struct Repositories {
    dogs: Arc<dyn DogRepository>,
    adopters: Arc<dyn AdopterRepository>,
    matches: Arc<dyn MatchRepository>,
    visits: Arc<dyn VisitRepository>,
    messages: Arc<dyn MessageRepository>,
    articles: Arc<dyn ArticleRepository>,
    auth: Arc<dyn AuthService>,
}

pub struct Container {
    pub app_state: AppStore,
    pub dogs: DogsInteractor,
    pub adopter: AdopterInteractor,
    pub matches: MatchesInteractor,
    pub magazine: MagazineInteractor,
    pub session: SessionInteractor,
    observer: JoinHandle<()>,
    stores: Vec<JoinHandle<()>>,
}

impl Container {
    /// Wires the live repositories. Must be called inside a Tokio runtime.
    pub fn live(config: &Config) -> Result<Self, RepositoryError> {
        let supabase = SupabaseClient::new(&config.supabase, config.http_timeout)?;
        let sanity = SanityClient::new(&config.sanity, config.http_timeout)?;
        let repositories = Repositories {
            dogs: Arc::new(SupabaseDogRepository::new(supabase.clone())),
            adopters: Arc::new(SupabaseAdopterRepository::new(supabase.clone())),
            matches: Arc::new(SupabaseMatchRepository::new(supabase.clone())),
            visits: Arc::new(SupabaseVisitRepository::new(supabase.clone())),
            messages: Arc::new(SupabaseMessageRepository::new(supabase.clone())),
            articles: Arc::new(SanityArticleRepository::new(sanity)),
            auth: Arc::new(SupabaseAuthService::new(supabase)),
        };
        info!(backend = %config.supabase.url, "Live container ready");
        Ok(Self::wire(repositories, config.load_timeout, Vec::new()))
    }

    /// Wires fixture-backed repositories. Must be called inside a Tokio runtime.
    pub fn stub() -> Self {
        Self::stub_with_timeout(DEFAULT_LOAD_TIMEOUT)
    }

    pub fn stub_with_timeout(load_timeout: Duration) -> Self {
        let (dogs, dogs_task) = StubDogRepository::spawn(fixtures::dogs());
        let (adopters, adopters_task) = StubAdopterRepository::spawn(vec![fixtures::adopter()]);
        let (matches, matches_task) = StubMatchRepository::spawn(fixtures::matches());
        let (visits, visits_task) = StubVisitRepository::spawn(fixtures::visits());
        let (messages, messages_task) = StubMessageRepository::spawn(fixtures::messages());
        let (articles, articles_task) = StubArticleRepository::spawn(fixtures::articles());

        let repositories = Repositories {
            dogs: Arc::new(dogs),
            adopters: Arc::new(adopters),
            matches: Arc::new(matches),
            visits: Arc::new(visits),
            messages: Arc::new(messages),
            articles: Arc::new(articles),
            auth: Arc::new(StubAuthService::new()),
        };
        let stores = vec![
            dogs_task,
            adopters_task,
            matches_task,
            visits_task,
            messages_task,
            articles_task,
        ];
        info!(stores = stores.len(), "Stub container ready");
        Self::wire(repositories, load_timeout, stores)
    }

    fn wire(repos: Repositories, load_timeout: Duration, stores: Vec<JoinHandle<()>>) -> Self {
        let app_state = AppStore::default();
        let session = SessionInteractor::new(repos.auth, repos.adopters.clone(), app_state.clone());
        let observer = session.observe();
        Self {
            dogs: DogsInteractor::new(
                repos.dogs.clone(),
                repos.adopters.clone(),
                repos.matches.clone(),
                app_state.clone(),
                load_timeout,
            ),
            adopter: AdopterInteractor::new(repos.adopters, app_state.clone()),
            matches: MatchesInteractor::new(
                repos.matches,
                repos.visits,
                repos.messages,
                repos.dogs,
                app_state.clone(),
            ),
            magazine: MagazineInteractor::new(repos.articles, app_state.clone()),
            session,
            app_state,
            observer,
            stores,
        }
    }

    /// Stops the observer, drops all interactors and waits for the store tasks to finish.
    pub async fn shutdown(self) {
        self.observer.abort();
        let _ = self.observer.await;

        drop(self.dogs);
        drop(self.adopter);
        drop(self.matches);
        drop(self.magazine);
        drop(self.session);

        for store in self.stores {
            let _ = store.await;
        }
        info!("Container shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interactor::Discard;
    use crate::repository::stub::STUB_PASSWORD;

    #[tokio::test]
    async fn test_stub_container_round_trip() {
        let container = Container::stub();
        container
            .session
            .sign_in("rae@example.com", STUB_PASSWORD)
            .await
            .unwrap();

        let liked = container.dogs.load_liked_dogs(&Discard).await;
        assert_eq!(liked.value().unwrap().len(), 2);

        let articles = container.magazine.load_articles(&Discard).await;
        assert_eq!(articles.value().unwrap().len(), 3);

        tokio::time::timeout(Duration::from_secs(5), container.shutdown())
            .await
            .unwrap();
    }
}
