//! Repositories backed by the hosted backend and the CMS.

use super::{
    AdopterRepository, ArticleRepository, AuthService, DogRepository, MatchRepository,
    MessageRepository, VisitRepository,
};
use crate::dto::{
    decode_rows, AdopterInsert, AdopterPatch, AdopterRow, ArticleDocument, DogRow, MatchInsert,
    MatchRow, MessageRow, VisitInsert, VisitRow, ADOPTERS_TABLE, DOGS_TABLE, MATCHES_TABLE,
    MESSAGES_TABLE, VISITS_TABLE,
};
use crate::error::{AuthError, RepositoryError};
use crate::model::{
    Adopter, AdopterCreate, AdopterUpdate, Article, Dog, DogCreate, DogUpdate, Match, MatchCreate,
    MatchStatus, Message, MessageCreate, Visit, VisitCreate, VisitStatus,
};
use crate::sanity::{queries, SanityClient};
use crate::supabase::{AuthEvent, AuthUser, Filter, SupabaseClient};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::watch;
use tracing::{debug, instrument};
use url::Url;
use uuid::Uuid;

/// Decodes a `return=representation` or filtered-by-id body that must hold one row.
fn single<R, T>(body: &[u8], what: &str) -> Result<T, RepositoryError>
where
    R: for<'de> Deserialize<'de>,
    T: TryFrom<R, Error = RepositoryError>,
{
    decode_rows::<R, T>(body)?
        .into_iter()
        .next()
        .ok_or_else(|| RepositoryError::NotFound(what.to_string()))
}

fn by_id(id: Uuid) -> Filter {
    Filter::new().eq("id", id)
}

// Rows that convert infallibly still go through `decode_rows`; these bridge the
// `From` impls to the `TryFrom<Error = RepositoryError>` bound.
macro_rules! infallible_row {
    ($wrapper:ident, $row:ty, $record:ty) => {
        struct $wrapper($record);

        impl TryFrom<$row> for $wrapper {
            type Error = RepositoryError;

            fn try_from(row: $row) -> Result<Self, Self::Error> {
                Ok(Self(<$record>::from(row)))
            }
        }
    };
}

infallible_row!(MatchRecord, MatchRow, Match);
infallible_row!(VisitRecord, VisitRow, Visit);
infallible_row!(MessageRecord, MessageRow, Message);

#[derive(Clone)]
pub struct SupabaseDogRepository {
    client: SupabaseClient,
}

impl SupabaseDogRepository {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DogRepository for SupabaseDogRepository {
    #[instrument(skip(self))]
    async fn fetch_all(&self) -> Result<Vec<Dog>, RepositoryError> {
        let body = self
            .client
            .select(DOGS_TABLE, &Filter::new().order_desc("created_at"))
            .await?;
        let dogs = decode_rows::<DogRow, Dog>(&body)?;
        debug!(count = dogs.len(), "Fetched dogs");
        Ok(dogs)
    }

    #[instrument(skip(self))]
    async fn fetch(&self, id: Uuid) -> Result<Dog, RepositoryError> {
        let body = self.client.select(DOGS_TABLE, &by_id(id)).await?;
        single::<DogRow, Dog>(&body, &format!("dog {id}"))
    }

    #[instrument(skip(self), fields(count = ids.len()))]
    async fn fetch_many(&self, ids: &[Uuid]) -> Result<Vec<Dog>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let body = self
            .client
            .select(DOGS_TABLE, &Filter::new().in_list("id", ids))
            .await?;
        decode_rows::<DogRow, Dog>(&body)
    }

    #[instrument(skip(self, params), fields(name = %params.name))]
    async fn create(&self, params: DogCreate) -> Result<Dog, RepositoryError> {
        let body = self.client.insert(DOGS_TABLE, &params).await?;
        single::<DogRow, Dog>(&body, "inserted dog")
    }

    #[instrument(skip(self, update))]
    async fn update(&self, id: Uuid, update: DogUpdate) -> Result<Dog, RepositoryError> {
        let body = self.client.update(DOGS_TABLE, &by_id(id), &update).await?;
        single::<DogRow, Dog>(&body, &format!("dog {id}"))
    }
}

#[derive(Clone)]
pub struct SupabaseAdopterRepository {
    client: SupabaseClient,
}

impl SupabaseAdopterRepository {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AdopterRepository for SupabaseAdopterRepository {
    #[instrument(skip(self))]
    async fn fetch(&self, id: Uuid) -> Result<Adopter, RepositoryError> {
        let body = self.client.select(ADOPTERS_TABLE, &by_id(id)).await?;
        single::<AdopterRow, Adopter>(&body, &format!("adopter {id}"))
    }

    #[instrument(skip(self, params), fields(id = %params.id))]
    async fn create(&self, params: AdopterCreate) -> Result<Adopter, RepositoryError> {
        let body = self
            .client
            .insert(ADOPTERS_TABLE, &AdopterInsert::from(&params))
            .await?;
        single::<AdopterRow, Adopter>(&body, "inserted adopter")
    }

    #[instrument(skip(self, update))]
    async fn update(&self, id: Uuid, update: AdopterUpdate) -> Result<Adopter, RepositoryError> {
        let body = self
            .client
            .update(ADOPTERS_TABLE, &by_id(id), &AdopterPatch::from(&update))
            .await?;
        single::<AdopterRow, Adopter>(&body, &format!("adopter {id}"))
    }
}

#[derive(Clone)]
pub struct SupabaseMatchRepository {
    client: SupabaseClient,
}

impl SupabaseMatchRepository {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MatchRepository for SupabaseMatchRepository {
    #[instrument(skip(self))]
    async fn fetch_for_adopter(&self, adopter_id: Uuid) -> Result<Vec<Match>, RepositoryError> {
        let filter = Filter::new()
            .eq("adopter_id", adopter_id)
            .order_desc("created_at");
        let body = self.client.select(MATCHES_TABLE, &filter).await?;
        let rows = decode_rows::<MatchRow, MatchRecord>(&body)?;
        Ok(rows.into_iter().map(|MatchRecord(m)| m).collect())
    }

    #[instrument(skip(self), fields(adopter_id = %params.adopter_id, dog_id = %params.dog_id))]
    async fn create(&self, params: MatchCreate) -> Result<Match, RepositoryError> {
        let insert = MatchInsert {
            params: &params,
            status: MatchStatus::Pending,
        };
        let body = self.client.insert(MATCHES_TABLE, &insert).await?;
        single::<MatchRow, MatchRecord>(&body, "inserted match").map(|MatchRecord(m)| m)
    }

    #[instrument(skip(self))]
    async fn update_status(&self, id: Uuid, status: MatchStatus) -> Result<Match, RepositoryError> {
        let body = self
            .client
            .update(MATCHES_TABLE, &by_id(id), &json!({ "status": status }))
            .await?;
        single::<MatchRow, MatchRecord>(&body, &format!("match {id}")).map(|MatchRecord(m)| m)
    }

    #[instrument(skip(self))]
    async fn delete_for(&self, adopter_id: Uuid, dog_id: Uuid) -> Result<(), RepositoryError> {
        let filter = Filter::new()
            .eq("adopter_id", adopter_id)
            .eq("dog_id", dog_id);
        self.client.delete(MATCHES_TABLE, &filter).await
    }
}

#[derive(Clone)]
pub struct SupabaseVisitRepository {
    client: SupabaseClient,
}

impl SupabaseVisitRepository {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl VisitRepository for SupabaseVisitRepository {
    #[instrument(skip(self))]
    async fn fetch_for_adopter(&self, adopter_id: Uuid) -> Result<Vec<Visit>, RepositoryError> {
        let filter = Filter::new()
            .eq("adopter_id", adopter_id)
            .order_asc("scheduled_for");
        let body = self.client.select(VISITS_TABLE, &filter).await?;
        let rows = decode_rows::<VisitRow, VisitRecord>(&body)?;
        Ok(rows.into_iter().map(|VisitRecord(v)| v).collect())
    }

    #[instrument(skip(self, params), fields(dog_id = %params.dog_id, at = %params.scheduled_for))]
    async fn schedule(&self, params: VisitCreate) -> Result<Visit, RepositoryError> {
        let insert = VisitInsert {
            params: &params,
            status: VisitStatus::Requested,
        };
        let body = self.client.insert(VISITS_TABLE, &insert).await?;
        single::<VisitRow, VisitRecord>(&body, "inserted visit").map(|VisitRecord(v)| v)
    }

    #[instrument(skip(self))]
    async fn update_status(&self, id: Uuid, status: VisitStatus) -> Result<Visit, RepositoryError> {
        let body = self
            .client
            .update(VISITS_TABLE, &by_id(id), &json!({ "status": status }))
            .await?;
        single::<VisitRow, VisitRecord>(&body, &format!("visit {id}")).map(|VisitRecord(v)| v)
    }
}

#[derive(Clone)]
pub struct SupabaseMessageRepository {
    client: SupabaseClient,
}

impl SupabaseMessageRepository {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MessageRepository for SupabaseMessageRepository {
    #[instrument(skip(self))]
    async fn fetch_for_match(&self, match_id: Uuid) -> Result<Vec<Message>, RepositoryError> {
        let filter = Filter::new().eq("match_id", match_id).order_asc("sent_at");
        let body = self.client.select(MESSAGES_TABLE, &filter).await?;
        let rows = decode_rows::<MessageRow, MessageRecord>(&body)?;
        Ok(rows.into_iter().map(|MessageRecord(m)| m).collect())
    }

    #[instrument(skip(self, params), fields(match_id = %params.match_id))]
    async fn send(&self, params: MessageCreate) -> Result<Message, RepositoryError> {
        let body = self.client.insert(MESSAGES_TABLE, &params).await?;
        single::<MessageRow, MessageRecord>(&body, "inserted message").map(|MessageRecord(m)| m)
    }

    #[instrument(skip(self))]
    async fn mark_read(&self, id: Uuid) -> Result<Message, RepositoryError> {
        let body = self
            .client
            .update(MESSAGES_TABLE, &by_id(id), &json!({ "read": true }))
            .await?;
        single::<MessageRow, MessageRecord>(&body, &format!("message {id}")).map(|MessageRecord(m)| m)
    }
}

#[derive(Clone)]
pub struct SanityArticleRepository {
    client: SanityClient,
}

impl SanityArticleRepository {
    pub fn new(client: SanityClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ArticleRepository for SanityArticleRepository {
    #[instrument(skip(self))]
    async fn fetch_all(&self) -> Result<Vec<Article>, RepositoryError> {
        let response = self
            .client
            .fetch::<Vec<ArticleDocument>>(queries::ARTICLES, &[])
            .await?;
        response.result.into_iter().map(Article::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn fetch_by_slug(&self, slug: &str) -> Result<Article, RepositoryError> {
        let response = self
            .client
            .fetch::<Vec<ArticleDocument>>(queries::ARTICLE_BY_SLUG, &[("slug", json!(slug))])
            .await?;
        let document = response
            .result
            .into_iter()
            .next()
            .ok_or_else(|| RepositoryError::NotFound(format!("article {slug}")))?;
        Article::try_from(document)
    }
}

/// Auth against the hosted backend; shares the session with the table repositories.
#[derive(Clone)]
pub struct SupabaseAuthService {
    client: SupabaseClient,
}

impl SupabaseAuthService {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AuthService for SupabaseAuthService {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        Ok(self.client.sign_in_with_password(email, password).await?.user)
    }

    async fn sign_in_with_callback(&self, callback: &Url) -> Result<AuthUser, AuthError> {
        Ok(self.client.session_from_callback_url(callback).await?.user)
    }

    fn current_user(&self) -> Option<AuthUser> {
        self.client.session().map(|session| session.user)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.client.sign_out().await
    }

    fn auth_events(&self) -> watch::Receiver<AuthEvent> {
        self.client.auth_events()
    }
}
