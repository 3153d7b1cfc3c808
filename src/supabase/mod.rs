//! HTTP client for the hosted backend: PostgREST tables under `/rest/v1` and the auth
//! service under `/auth/v1`.
//!
//! Only the plain request/response calls the app issues are implemented; realtime
//! channels and storage are not.

pub mod auth;
pub mod filter;

pub use auth::{parse_callback, AuthEvent, AuthUser, CallbackTokens, Session};
pub use filter::Filter;

use crate::config::SupabaseConfig;
use crate::error::{AuthError, RepositoryError};
use auth::{PasswordCredentials, RefreshGrant};
use reqwest::{RequestBuilder, StatusCode};
use serde::Serialize;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Shared client for every live repository and the session interactor.
///
/// Cheap to clone; clones share the HTTP connection pool and the current session.
#[derive(Clone)]
pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: Url,
    anon_key: String,
    session: Arc<RwLock<Option<Session>>>,
    auth_events: Arc<watch::Sender<AuthEvent>>,
}

impl SupabaseClient {
    pub fn new(config: &SupabaseConfig, timeout: Duration) -> Result<Self, RepositoryError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let (auth_events, _) = watch::channel(AuthEvent::SignedOut);
        Ok(Self {
            http,
            base_url: config.url.clone(),
            anon_key: config.anon_key.clone(),
            session: Arc::new(RwLock::new(None)),
            auth_events: Arc::new(auth_events),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, RepositoryError> {
        self.base_url
            .join(path)
            .map_err(|e| RepositoryError::Transport(format!("bad endpoint {path}: {e}")))
    }

    fn table_url(&self, table: &str) -> Result<Url, RepositoryError> {
        self.endpoint(&format!("rest/v1/{table}"))
    }

    /// The access token of the current session, or the anon key.
    fn bearer(&self) -> String {
        self.session()
            .map(|session| session.access_token)
            .unwrap_or_else(|| self.anon_key.clone())
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.anon_key)
            .bearer_auth(self.bearer())
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Vec<u8>, RepositoryError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?.to_vec();
        if status == StatusCode::NOT_FOUND {
            return Err(RepositoryError::NotFound(String::from_utf8_lossy(&body).into_owned()));
        }
        if !status.is_success() {
            warn!(%status, "Backend request failed");
            return Err(RepositoryError::Transport(format!(
                "{status}: {}",
                String::from_utf8_lossy(&body)
            )));
        }
        Ok(body)
    }

    // --- Tables ---------------------------------------------------------------

    /// `GET /rest/v1/{table}?select=*&...` returning the raw JSON array.
    #[instrument(skip(self, filter))]
    pub async fn select(&self, table: &str, filter: &Filter) -> Result<Vec<u8>, RepositoryError> {
        debug!(params = ?filter.query_pairs(), "Sending request");
        let request = self
            .http
            .get(self.table_url(table)?)
            .query(&[("select", "*")])
            .query(filter.query_pairs());
        self.execute(self.authorized(request)).await
    }

    /// `POST /rest/v1/{table}` returning the inserted rows.
    #[instrument(skip(self, body))]
    pub async fn insert<B: Serialize + ?Sized>(&self, table: &str, body: &B) -> Result<Vec<u8>, RepositoryError> {
        debug!("Sending request");
        let request = self
            .http
            .post(self.table_url(table)?)
            .header("Prefer", "return=representation")
            .json(body);
        self.execute(self.authorized(request)).await
    }

    /// `PATCH /rest/v1/{table}?...` returning the updated rows.
    #[instrument(skip(self, filter, body))]
    pub async fn update<B: Serialize + ?Sized>(
        &self,
        table: &str,
        filter: &Filter,
        body: &B,
    ) -> Result<Vec<u8>, RepositoryError> {
        debug!(params = ?filter.query_pairs(), "Sending request");
        let request = self
            .http
            .patch(self.table_url(table)?)
            .query(filter.query_pairs())
            .header("Prefer", "return=representation")
            .json(body);
        self.execute(self.authorized(request)).await
    }

    /// `DELETE /rest/v1/{table}?...`.
    #[instrument(skip(self, filter))]
    pub async fn delete(&self, table: &str, filter: &Filter) -> Result<(), RepositoryError> {
        debug!(params = ?filter.query_pairs(), "Sending request");
        let request = self
            .http
            .delete(self.table_url(table)?)
            .query(filter.query_pairs());
        self.execute(self.authorized(request)).await.map(|_| ())
    }

    // --- Auth -----------------------------------------------------------------

    pub fn session(&self) -> Option<Session> {
        self.session.read().map(|guard| guard.clone()).unwrap_or_default()
    }

    /// Observe sign-in, refresh and sign-out. The receiver starts at the current state.
    pub fn auth_events(&self) -> watch::Receiver<AuthEvent> {
        self.auth_events.subscribe()
    }

    fn store_session(&self, session: Option<Session>, event: AuthEvent) {
        if let Ok(mut guard) = self.session.write() {
            *guard = session;
        }
        info!(?event, "Auth state changed");
        self.auth_events.send_replace(event);
    }

    async fn token_request<B: Serialize>(&self, grant: &str, body: &B) -> Result<Session, AuthError> {
        let url = self.endpoint("auth/v1/token")?;
        let response = self
            .http
            .post(url)
            .query(&[("grant_type", grant)])
            .header("apikey", &self.anon_key)
            .json(body)
            .send()
            .await?;
        match response.status() {
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => Err(AuthError::InvalidCredentials),
            status if !status.is_success() => Err(AuthError::Repository(RepositoryError::Transport(
                status.to_string(),
            ))),
            _ => {
                let body = response.bytes().await?;
                Ok(serde_json::from_slice(&body).map_err(RepositoryError::from)?)
            }
        }
    }

    #[instrument(skip(self, password))]
    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let session = self
            .token_request("password", &PasswordCredentials { email, password })
            .await?;
        self.store_session(Some(session.clone()), AuthEvent::SignedIn(session.user.clone()));
        Ok(session)
    }

    /// Registers an account. With email confirmation enabled the service answers with a
    /// bare user and no session; `None` is returned in that case.
    #[instrument(skip(self, password))]
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<Option<Session>, AuthError> {
        let request = self
            .http
            .post(self.endpoint("auth/v1/signup")?)
            .header("apikey", &self.anon_key)
            .json(&PasswordCredentials { email, password });
        let body = self.execute(request).await?;
        match serde_json::from_slice::<Session>(&body) {
            Ok(session) => {
                self.store_session(Some(session.clone()), AuthEvent::SignedIn(session.user.clone()));
                Ok(Some(session))
            }
            Err(_) => {
                let user: AuthUser = serde_json::from_slice(&body).map_err(RepositoryError::from)?;
                info!(user_id = %user.id, "Signed up, awaiting confirmation");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn refresh_session(&self) -> Result<Session, AuthError> {
        let current = self.session().ok_or(AuthError::NoSession)?;
        let session = self
            .token_request(
                "refresh_token",
                &RefreshGrant {
                    refresh_token: &current.refresh_token,
                },
            )
            .await?;
        self.store_session(Some(session.clone()), AuthEvent::TokenRefreshed(session.user.clone()));
        Ok(session)
    }

    /// `GET /auth/v1/user` for the given access token.
    #[instrument(skip(self, access_token))]
    pub async fn user(&self, access_token: &str) -> Result<AuthUser, AuthError> {
        let response = self
            .http
            .get(self.endpoint("auth/v1/user")?)
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(AuthError::InvalidCredentials);
        }
        if !response.status().is_success() {
            return Err(AuthError::Repository(RepositoryError::Transport(
                response.status().to_string(),
            )));
        }
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body).map_err(RepositoryError::from)?)
    }

    /// Completes an OAuth sign-in from the URL the redirect bridge handed to the app.
    #[instrument(skip(self, callback))]
    pub async fn session_from_callback_url(&self, callback: &Url) -> Result<Session, AuthError> {
        let tokens = parse_callback(callback)?;
        let user = self.user(&tokens.access_token).await?;
        let session = Session {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            token_type: tokens.token_type,
            expires_in: tokens.expires_in,
            expires_at: None,
            user: user.clone(),
        };
        self.store_session(Some(session.clone()), AuthEvent::SignedIn(user));
        Ok(session)
    }

    /// The provider authorization URL to open in the browser.
    pub fn authorize_url(&self, provider: &str, redirect_to: Option<&str>) -> Result<Url, RepositoryError> {
        let mut url = self.endpoint("auth/v1/authorize")?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("provider", provider);
            if let Some(redirect_to) = redirect_to {
                query.append_pair("redirect_to", redirect_to);
            }
        }
        Ok(url)
    }

    /// Revokes the session server side (best effort) and clears it locally.
    #[instrument(skip(self))]
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        if let Some(session) = self.session() {
            let request = self
                .http
                .post(self.endpoint("auth/v1/logout")?)
                .header("apikey", &self.anon_key)
                .bearer_auth(&session.access_token);
            if let Err(e) = self.execute(request).await {
                warn!(error = %e, "Remote sign-out failed; clearing local session anyway");
            }
        }
        self.store_session(None, AuthEvent::SignedOut);
        Ok(())
    }
}
