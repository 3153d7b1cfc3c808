//! # Repositories
//!
//! One capability trait per remote resource. Interactors only ever see
//! `Arc<dyn ...Repository>`, so the live implementations (HTTP to the backend and the CMS)
//! and the stub implementations (in-process record stores seeded from
//! [`crate::fixtures`]) are interchangeable.

pub mod live;
pub mod stub;

use crate::error::{AuthError, RepositoryError};
use crate::model::{
    Adopter, AdopterCreate, AdopterUpdate, Article, Dog, DogCreate, DogSets, DogUpdate, Match,
    MatchCreate, MatchStatus, Message, MessageCreate, Visit, VisitCreate, VisitStatus,
};
use crate::supabase::{AuthEvent, AuthUser};
use async_trait::async_trait;
use tokio::sync::watch;
use url::Url;
use uuid::Uuid;

pub use live::{
    SanityArticleRepository, SupabaseAdopterRepository, SupabaseAuthService,
    SupabaseDogRepository, SupabaseMatchRepository, SupabaseMessageRepository,
    SupabaseVisitRepository,
};
pub use stub::{
    StubAdopterRepository, StubArticleRepository, StubAuthService, StubDogRepository,
    StubMatchRepository, StubMessageRepository, StubVisitRepository,
};

#[async_trait]
pub trait DogRepository: Send + Sync {
    /// Every listed dog, newest listing first.
    async fn fetch_all(&self) -> Result<Vec<Dog>, RepositoryError>;

    async fn fetch(&self, id: Uuid) -> Result<Dog, RepositoryError>;

    /// The dogs with the given ids that still exist. Order is unspecified.
    async fn fetch_many(&self, ids: &[Uuid]) -> Result<Vec<Dog>, RepositoryError>;

    async fn create(&self, params: DogCreate) -> Result<Dog, RepositoryError>;

    async fn update(&self, id: Uuid, update: DogUpdate) -> Result<Dog, RepositoryError>;
}

#[async_trait]
pub trait AdopterRepository: Send + Sync {
    async fn fetch(&self, id: Uuid) -> Result<Adopter, RepositoryError>;

    async fn create(&self, params: AdopterCreate) -> Result<Adopter, RepositoryError>;

    async fn update(&self, id: Uuid, update: AdopterUpdate) -> Result<Adopter, RepositoryError>;

    /// Overwrites the liked, disliked and matched sets in one write.
    async fn set_dog_sets(&self, id: Uuid, sets: DogSets) -> Result<Adopter, RepositoryError> {
        self.update(
            id,
            AdopterUpdate {
                dog_sets: Some(sets),
                ..Default::default()
            },
        )
        .await
    }
}

#[async_trait]
pub trait MatchRepository: Send + Sync {
    /// Newest first.
    async fn fetch_for_adopter(&self, adopter_id: Uuid) -> Result<Vec<Match>, RepositoryError>;

    async fn create(&self, params: MatchCreate) -> Result<Match, RepositoryError>;

    async fn update_status(&self, id: Uuid, status: MatchStatus) -> Result<Match, RepositoryError>;

    /// Removes the match between `adopter_id` and `dog_id`, if any. Deleting a match that
    /// does not exist is not an error.
    async fn delete_for(&self, adopter_id: Uuid, dog_id: Uuid) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait VisitRepository: Send + Sync {
    /// Soonest first.
    async fn fetch_for_adopter(&self, adopter_id: Uuid) -> Result<Vec<Visit>, RepositoryError>;

    async fn schedule(&self, params: VisitCreate) -> Result<Visit, RepositoryError>;

    async fn update_status(&self, id: Uuid, status: VisitStatus) -> Result<Visit, RepositoryError>;
}

#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Oldest first.
    async fn fetch_for_match(&self, match_id: Uuid) -> Result<Vec<Message>, RepositoryError>;

    async fn send(&self, params: MessageCreate) -> Result<Message, RepositoryError>;

    async fn mark_read(&self, id: Uuid) -> Result<Message, RepositoryError>;
}

#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// Published articles, newest first.
    async fn fetch_all(&self) -> Result<Vec<Article>, RepositoryError>;

    async fn fetch_by_slug(&self, slug: &str) -> Result<Article, RepositoryError>;
}

/// Sign-in and session observation.
#[async_trait]
pub trait AuthService: Send + Sync {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthUser, AuthError>;

    /// Completes an OAuth sign-in from the callback URL handed back to the app.
    async fn sign_in_with_callback(&self, callback: &Url) -> Result<AuthUser, AuthError>;

    fn current_user(&self) -> Option<AuthUser>;

    async fn sign_out(&self) -> Result<(), AuthError>;

    fn auth_events(&self) -> watch::Receiver<AuthEvent>;
}
