//! Fixture-backed repositories for previews and tests.
//!
//! Each stub is a thin adapter over a [`StoreHandle`]: the records live in a
//! [`RecordStore`] task seeded with [`crate::fixtures`], so stubs share the request/response
//! shape of the live repositories without touching the network.

use super::{
    AdopterRepository, ArticleRepository, AuthService, DogRepository, MatchRepository,
    MessageRepository, VisitRepository,
};
use crate::error::{AuthError, RepositoryError};
use crate::model::{
    Adopter, AdopterCreate, AdopterUpdate, Article, Dog, DogCreate, DogUpdate, Match, MatchCreate,
    MatchStatus, Message, MessageCreate, ValidationError, Visit, VisitCreate, VisitStatus,
};
use crate::supabase::{parse_callback, AuthEvent, AuthUser};
use async_trait::async_trait;
use chrono::Utc;
use record_store::{Record, RecordStore, StoreHandle};
use std::sync::RwLock;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};
use url::Url;
use uuid::Uuid;

const STORE_BUFFER: usize = 32;

/// Seeds a store with `records`, spawns it, and returns its handle and task.
pub fn spawn_store<T: Record>(
    records: impl IntoIterator<Item = T>,
    next_id: impl Fn() -> T::Id + Send + Sync + 'static,
) -> (StoreHandle<T>, JoinHandle<()>) {
    let (store, handle) = RecordStore::new(STORE_BUFFER, next_id);
    let task = tokio::spawn(store.seed(records).run());
    (handle, task)
}

fn not_found(what: &str, id: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::NotFound(format!("{what} {id}"))
}

// --- Record impls -------------------------------------------------------------

impl Record for Dog {
    type Id = Uuid;
    type Create = DogCreate;
    type Update = DogUpdate;
    type Error = ValidationError;

    fn id(&self) -> &Uuid {
        &self.id
    }

    fn from_create(id: Uuid, params: DogCreate) -> Result<Self, ValidationError> {
        if params.name.trim().is_empty() {
            return Err(ValidationError("dog name must not be empty".into()));
        }
        let now = Utc::now();
        Ok(Dog {
            id,
            name: params.name,
            breed: params.breed,
            age_years: params.age_years,
            size: params.size,
            gender: params.gender,
            image_urls: params.image_urls,
            bio: params.bio,
            shelter_id: params.shelter_id,
            location: params.location,
            rescuer_id: params.rescuer_id,
            traits: params.traits,
            energy_level: params.energy_level,
            created_at: now,
            updated_at: now,
        })
    }

    fn apply_update(&mut self, update: DogUpdate) -> Result<(), ValidationError> {
        if let Some(name) = update.name {
            if name.trim().is_empty() {
                return Err(ValidationError("dog name must not be empty".into()));
            }
            self.name = name;
        }
        if let Some(bio) = update.bio {
            self.bio = bio;
        }
        if let Some(age) = update.age_years {
            self.age_years = age;
        }
        if let Some(image_urls) = update.image_urls {
            self.image_urls = image_urls;
        }
        if let Some(traits) = update.traits {
            self.traits = traits;
        }
        if let Some(energy_level) = update.energy_level {
            self.energy_level = energy_level;
        }
        if let Some(location) = update.location {
            self.location = Some(location);
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}

impl Record for Adopter {
    type Id = Uuid;
    type Create = AdopterCreate;
    type Update = AdopterUpdate;
    type Error = ValidationError;

    fn id(&self) -> &Uuid {
        &self.id
    }

    /// Keeps the auth user id from the payload; the generated id is unused.
    fn from_create(_id: Uuid, params: AdopterCreate) -> Result<Self, ValidationError> {
        if !params.email.contains('@') {
            return Err(ValidationError(format!("invalid email {}", params.email)));
        }
        Ok(Adopter {
            id: params.id,
            name: params.name,
            email: params.email,
            location: params.location,
            bio: None,
            preferences: Default::default(),
            liked_dog_ids: Default::default(),
            disliked_dog_ids: Default::default(),
            matched_dog_ids: Default::default(),
            registered_at: Utc::now(),
        })
    }

    fn apply_update(&mut self, update: AdopterUpdate) -> Result<(), ValidationError> {
        if let Some(preferences) = &update.preferences {
            if let (Some(min), Some(max)) = (preferences.min_age, preferences.max_age) {
                if min > max {
                    return Err(ValidationError(format!("min_age {min} is above max_age {max}")));
                }
            }
        }
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(location) = update.location {
            self.location = Some(location);
        }
        if let Some(bio) = update.bio {
            self.bio = Some(bio);
        }
        if let Some(preferences) = update.preferences {
            self.preferences = preferences;
        }
        if let Some(sets) = update.dog_sets {
            self.liked_dog_ids = sets.liked;
            self.disliked_dog_ids = sets.disliked;
            self.matched_dog_ids = sets.matched;
        }
        Ok(())
    }
}

impl Record for Match {
    type Id = Uuid;
    type Create = MatchCreate;
    type Update = MatchStatus;
    type Error = ValidationError;

    fn id(&self) -> &Uuid {
        &self.id
    }

    fn from_create(id: Uuid, params: MatchCreate) -> Result<Self, ValidationError> {
        let now = Utc::now();
        Ok(Match {
            id,
            adopter_id: params.adopter_id,
            dog_id: params.dog_id,
            status: MatchStatus::Pending,
            created_at: now,
            updated_at: now,
        })
    }

    fn apply_update(&mut self, status: MatchStatus) -> Result<(), ValidationError> {
        self.status = status;
        self.updated_at = Utc::now();
        Ok(())
    }
}

impl Record for Visit {
    type Id = Uuid;
    type Create = VisitCreate;
    type Update = VisitStatus;
    type Error = ValidationError;

    fn id(&self) -> &Uuid {
        &self.id
    }

    fn from_create(id: Uuid, params: VisitCreate) -> Result<Self, ValidationError> {
        Ok(Visit {
            id,
            adopter_id: params.adopter_id,
            dog_id: params.dog_id,
            rescuer_id: params.rescuer_id,
            scheduled_for: params.scheduled_for,
            status: VisitStatus::Requested,
            notes: params.notes,
            created_at: Utc::now(),
        })
    }

    fn apply_update(&mut self, status: VisitStatus) -> Result<(), ValidationError> {
        if matches!(self.status, VisitStatus::Completed | VisitStatus::Cancelled) && self.status != status {
            return Err(ValidationError(format!("visit {} is already {}", self.id, self.status)));
        }
        self.status = status;
        Ok(())
    }
}

impl Record for Message {
    type Id = Uuid;
    type Create = MessageCreate;
    /// The new `read` flag.
    type Update = bool;
    type Error = ValidationError;

    fn id(&self) -> &Uuid {
        &self.id
    }

    fn from_create(id: Uuid, params: MessageCreate) -> Result<Self, ValidationError> {
        if params.body.trim().is_empty() {
            return Err(ValidationError("message body must not be empty".into()));
        }
        Ok(Message {
            id,
            match_id: params.match_id,
            sender: params.sender,
            body: params.body,
            sent_at: Utc::now(),
            read: false,
        })
    }

    fn apply_update(&mut self, read: bool) -> Result<(), ValidationError> {
        self.read = read;
        Ok(())
    }
}

impl Record for Article {
    type Id = String;
    type Create = Article;
    type Update = Article;
    type Error = ValidationError;

    fn id(&self) -> &String {
        &self.id
    }

    fn from_create(id: String, article: Article) -> Result<Self, ValidationError> {
        Ok(Article { id, ..article })
    }

    fn apply_update(&mut self, article: Article) -> Result<(), ValidationError> {
        *self = Article {
            id: self.id.clone(),
            ..article
        };
        Ok(())
    }
}

// --- Repositories -------------------------------------------------------------

#[derive(Clone)]
pub struct StubDogRepository {
    store: StoreHandle<Dog>,
}

impl StubDogRepository {
    pub fn new(store: StoreHandle<Dog>) -> Self {
        Self { store }
    }

    pub fn spawn(dogs: Vec<Dog>) -> (Self, JoinHandle<()>) {
        let (handle, task) = spawn_store(dogs, Uuid::new_v4);
        (Self::new(handle), task)
    }
}

#[async_trait]
impl DogRepository for StubDogRepository {
    #[instrument(skip(self))]
    async fn fetch_all(&self) -> Result<Vec<Dog>, RepositoryError> {
        let mut dogs = self.store.list().await?;
        dogs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        debug!(count = dogs.len(), "Fetched dogs");
        Ok(dogs)
    }

    #[instrument(skip(self))]
    async fn fetch(&self, id: Uuid) -> Result<Dog, RepositoryError> {
        self.store.get(id).await?.ok_or_else(|| not_found("dog", id))
    }

    #[instrument(skip(self), fields(count = ids.len()))]
    async fn fetch_many(&self, ids: &[Uuid]) -> Result<Vec<Dog>, RepositoryError> {
        let wanted = ids.to_vec();
        Ok(self
            .store
            .list_where(move |dog| wanted.contains(&dog.id))
            .await?)
    }

    #[instrument(skip(self, params))]
    async fn create(&self, params: DogCreate) -> Result<Dog, RepositoryError> {
        Ok(self.store.create(params).await?)
    }

    #[instrument(skip(self, update))]
    async fn update(&self, id: Uuid, update: DogUpdate) -> Result<Dog, RepositoryError> {
        Ok(self.store.update(id, update).await?)
    }
}

#[derive(Clone)]
pub struct StubAdopterRepository {
    store: StoreHandle<Adopter>,
}

impl StubAdopterRepository {
    pub fn new(store: StoreHandle<Adopter>) -> Self {
        Self { store }
    }

    pub fn spawn(adopters: Vec<Adopter>) -> (Self, JoinHandle<()>) {
        let (handle, task) = spawn_store(adopters, Uuid::new_v4);
        (Self::new(handle), task)
    }
}

#[async_trait]
impl AdopterRepository for StubAdopterRepository {
    #[instrument(skip(self))]
    async fn fetch(&self, id: Uuid) -> Result<Adopter, RepositoryError> {
        self.store.get(id).await?.ok_or_else(|| not_found("adopter", id))
    }

    #[instrument(skip(self, params))]
    async fn create(&self, params: AdopterCreate) -> Result<Adopter, RepositoryError> {
        Ok(self.store.create(params).await?)
    }

    #[instrument(skip(self, update))]
    async fn update(&self, id: Uuid, update: AdopterUpdate) -> Result<Adopter, RepositoryError> {
        Ok(self.store.update(id, update).await?)
    }
}

#[derive(Clone)]
pub struct StubMatchRepository {
    store: StoreHandle<Match>,
}

impl StubMatchRepository {
    pub fn new(store: StoreHandle<Match>) -> Self {
        Self { store }
    }

    pub fn spawn(matches: Vec<Match>) -> (Self, JoinHandle<()>) {
        let (handle, task) = spawn_store(matches, Uuid::new_v4);
        (Self::new(handle), task)
    }
}

#[async_trait]
impl MatchRepository for StubMatchRepository {
    #[instrument(skip(self))]
    async fn fetch_for_adopter(&self, adopter_id: Uuid) -> Result<Vec<Match>, RepositoryError> {
        let mut matches = self
            .store
            .list_where(move |m| m.adopter_id == adopter_id)
            .await?;
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matches)
    }

    #[instrument(skip(self, params))]
    async fn create(&self, params: MatchCreate) -> Result<Match, RepositoryError> {
        Ok(self.store.create(params).await?)
    }

    #[instrument(skip(self))]
    async fn update_status(&self, id: Uuid, status: MatchStatus) -> Result<Match, RepositoryError> {
        Ok(self.store.update(id, status).await?)
    }

    #[instrument(skip(self))]
    async fn delete_for(&self, adopter_id: Uuid, dog_id: Uuid) -> Result<(), RepositoryError> {
        let removed = self
            .store
            .delete_where(move |m| m.adopter_id == adopter_id && m.dog_id == dog_id)
            .await?;
        debug!(removed, "Deleted matches");
        Ok(())
    }
}

#[derive(Clone)]
pub struct StubVisitRepository {
    store: StoreHandle<Visit>,
}

impl StubVisitRepository {
    pub fn new(store: StoreHandle<Visit>) -> Self {
        Self { store }
    }

    pub fn spawn(visits: Vec<Visit>) -> (Self, JoinHandle<()>) {
        let (handle, task) = spawn_store(visits, Uuid::new_v4);
        (Self::new(handle), task)
    }
}

#[async_trait]
impl VisitRepository for StubVisitRepository {
    #[instrument(skip(self))]
    async fn fetch_for_adopter(&self, adopter_id: Uuid) -> Result<Vec<Visit>, RepositoryError> {
        let mut visits = self
            .store
            .list_where(move |v| v.adopter_id == adopter_id)
            .await?;
        visits.sort_by_key(|v| v.scheduled_for);
        Ok(visits)
    }

    #[instrument(skip(self, params))]
    async fn schedule(&self, params: VisitCreate) -> Result<Visit, RepositoryError> {
        Ok(self.store.create(params).await?)
    }

    #[instrument(skip(self))]
    async fn update_status(&self, id: Uuid, status: VisitStatus) -> Result<Visit, RepositoryError> {
        Ok(self.store.update(id, status).await?)
    }
}

#[derive(Clone)]
pub struct StubMessageRepository {
    store: StoreHandle<Message>,
}

impl StubMessageRepository {
    pub fn new(store: StoreHandle<Message>) -> Self {
        Self { store }
    }

    pub fn spawn(messages: Vec<Message>) -> (Self, JoinHandle<()>) {
        let (handle, task) = spawn_store(messages, Uuid::new_v4);
        (Self::new(handle), task)
    }
}

#[async_trait]
impl MessageRepository for StubMessageRepository {
    #[instrument(skip(self))]
    async fn fetch_for_match(&self, match_id: Uuid) -> Result<Vec<Message>, RepositoryError> {
        let mut messages = self
            .store
            .list_where(move |m| m.match_id == match_id)
            .await?;
        messages.sort_by_key(|m| m.sent_at);
        Ok(messages)
    }

    #[instrument(skip(self, params))]
    async fn send(&self, params: MessageCreate) -> Result<Message, RepositoryError> {
        Ok(self.store.create(params).await?)
    }

    #[instrument(skip(self))]
    async fn mark_read(&self, id: Uuid) -> Result<Message, RepositoryError> {
        Ok(self.store.update(id, true).await?)
    }
}

#[derive(Clone)]
pub struct StubArticleRepository {
    store: StoreHandle<Article>,
}

impl StubArticleRepository {
    pub fn new(store: StoreHandle<Article>) -> Self {
        Self { store }
    }

    pub fn spawn(articles: Vec<Article>) -> (Self, JoinHandle<()>) {
        let (handle, task) = spawn_store(articles, || Uuid::new_v4().to_string());
        (Self::new(handle), task)
    }
}

#[async_trait]
impl ArticleRepository for StubArticleRepository {
    #[instrument(skip(self))]
    async fn fetch_all(&self) -> Result<Vec<Article>, RepositoryError> {
        let mut articles = self.store.list().await?;
        articles.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        Ok(articles)
    }

    #[instrument(skip(self))]
    async fn fetch_by_slug(&self, slug: &str) -> Result<Article, RepositoryError> {
        let wanted = slug.to_string();
        self.store
            .list_where(move |a| a.slug == wanted)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| not_found("article", slug))
    }
}

/// Password of the fixture account in [`StubAuthService::new`].
pub const STUB_PASSWORD: &str = "good-boy-42";

struct Account {
    password: String,
    user: AuthUser,
}

/// Accepts a fixed set of accounts. Any well-formed OAuth callback signs in the first one.
pub struct StubAuthService {
    accounts: Vec<Account>,
    current: RwLock<Option<AuthUser>>,
    events: watch::Sender<AuthEvent>,
}

impl Default for StubAuthService {
    fn default() -> Self {
        Self::new()
    }
}

impl StubAuthService {
    /// One account: the fixture adopter with [`STUB_PASSWORD`].
    pub fn new() -> Self {
        let adopter = crate::fixtures::adopter();
        Self::empty().with_account(&adopter.email, STUB_PASSWORD, adopter.id)
    }

    pub fn empty() -> Self {
        let (events, _) = watch::channel(AuthEvent::SignedOut);
        Self {
            accounts: Vec::new(),
            current: RwLock::new(None),
            events,
        }
    }

    pub fn with_account(mut self, email: &str, password: &str, id: Uuid) -> Self {
        self.accounts.push(Account {
            password: password.to_string(),
            user: AuthUser {
                id,
                email: Some(email.to_string()),
            },
        });
        self
    }

    fn set_current(&self, user: Option<AuthUser>) {
        let event = match &user {
            Some(user) => AuthEvent::SignedIn(user.clone()),
            None => AuthEvent::SignedOut,
        };
        if let Ok(mut current) = self.current.write() {
            *current = user;
        }
        info!(?event, "Auth state changed");
        self.events.send_replace(event);
    }
}

#[async_trait]
impl AuthService for StubAuthService {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let account = self
            .accounts
            .iter()
            .find(|a| a.user.email.as_deref() == Some(email) && a.password == password)
            .ok_or(AuthError::InvalidCredentials)?;
        self.set_current(Some(account.user.clone()));
        Ok(account.user.clone())
    }

    async fn sign_in_with_callback(&self, callback: &Url) -> Result<AuthUser, AuthError> {
        parse_callback(callback)?;
        let user = self
            .accounts
            .first()
            .map(|a| a.user.clone())
            .ok_or(AuthError::InvalidCredentials)?;
        self.set_current(Some(user.clone()));
        Ok(user)
    }

    fn current_user(&self) -> Option<AuthUser> {
        self.current.read().map(|c| c.clone()).unwrap_or_default()
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.set_current(None);
        Ok(())
    }

    fn auth_events(&self) -> watch::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}
