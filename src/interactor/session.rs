//! Sign-in, OAuth completion and the auth observer that keeps [`AppState`] in step with
//! the session.
//!
//! [`AppState`]: crate::state::AppState

use crate::error::AuthError;
use crate::model::{Adopter, AdopterCreate};
use crate::repository::{AdopterRepository, AuthService};
use crate::state::{path, AppStore, Routing, SessionState, UserData};
use crate::supabase::{AuthEvent, AuthUser};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};
use url::Url;

#[derive(Clone)]
pub struct SessionInteractor {
    auth: Arc<dyn AuthService>,
    adopters: Arc<dyn AdopterRepository>,
    state: AppStore,
    /// Held while the session is being written, so an auth event and the call that
    /// caused it never rebuild the state concurrently.
    establishing: Arc<Mutex<()>>,
}

impl SessionInteractor {
    pub fn new(auth: Arc<dyn AuthService>, adopters: Arc<dyn AdopterRepository>, state: AppStore) -> Self {
        Self {
            auth,
            adopters,
            state,
            establishing: Arc::new(Mutex::new(())),
        }
    }

    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Adopter, AuthError> {
        let user = self.auth.sign_in_with_password(email, password).await?;
        self.establish(&user).await
    }

    /// Finishes an OAuth sign-in from the URL the redirect bridge opened the app with.
    #[instrument(skip(self, callback))]
    pub async fn complete_oauth(&self, callback: &Url) -> Result<Adopter, AuthError> {
        let user = self.auth.sign_in_with_callback(callback).await?;
        self.establish(&user).await
    }

    /// Rebuilds the state for a session that is still alive, if any.
    #[instrument(skip(self))]
    pub async fn restore(&self) -> Result<Option<Adopter>, AuthError> {
        match self.auth.current_user() {
            Some(user) => self.establish(&user).await.map(Some),
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        self.auth.sign_out().await?;
        self.clear();
        Ok(())
    }

    /// Follows auth events until the task is aborted: sign-in and refresh rebuild the
    /// state from the adopter row, sign-out clears it.
    pub fn observe(&self) -> JoinHandle<()> {
        let mut events = self.auth.auth_events();
        let this = self.clone();
        tokio::spawn(async move {
            while events.changed().await.is_ok() {
                let event = events.borrow_and_update().clone();
                match event {
                    AuthEvent::SignedIn(user) | AuthEvent::TokenRefreshed(user) => {
                        let _guard = this.establishing.lock().await;
                        if this.state.get(path::CURRENT_ADOPTER_ID) == Some(user.id) {
                            continue;
                        }
                        if let Err(e) = this.write_session(&user).await {
                            warn!(user_id = %user.id, error = %e, "Could not rebuild session state");
                        }
                    }
                    AuthEvent::SignedOut => this.clear(),
                }
            }
        })
    }

    async fn establish(&self, user: &AuthUser) -> Result<Adopter, AuthError> {
        let _guard = self.establishing.lock().await;
        self.write_session(user).await
    }

    /// Loads (or registers) the adopter row for `user` and writes the session into the state.
    async fn write_session(&self, user: &AuthUser) -> Result<Adopter, AuthError> {
        let adopter = match self.adopters.fetch(user.id).await {
            Ok(adopter) => adopter,
            Err(e) if e.is_not_found() => {
                let email = user.email.clone().unwrap_or_default();
                let name = email.split('@').next().unwrap_or_default().to_string();
                info!(user_id = %user.id, "Registering adopter");
                self.adopters
                    .create(AdopterCreate {
                        id: user.id,
                        name,
                        email,
                        location: None,
                    })
                    .await?
            }
            Err(e) => return Err(e.into()),
        };

        self.state.update(|state| {
            state.session = SessionState {
                is_authenticated: true,
                current_adopter_id: Some(adopter.id),
            };
            state.user_data = UserData {
                liked: adopter.liked_dog_ids.clone(),
                disliked: adopter.disliked_dog_ids.clone(),
                matched: adopter.matched_dog_ids.clone(),
            };
        });
        info!(adopter_id = %adopter.id, liked = adopter.liked_dog_ids.len(), "Session established");
        Ok(adopter)
    }

    fn clear(&self) {
        self.state.update(|state| {
            state.session = SessionState::default();
            state.user_data = UserData::default();
            state.routing = Routing::default();
        });
        info!("Session cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::repository::stub::STUB_PASSWORD;
    use crate::repository::{StubAdopterRepository, StubAuthService};
    use std::time::Duration;
    use uuid::Uuid;

    fn session(auth: StubAuthService) -> (SessionInteractor, Arc<StubAuthService>, AppStore) {
        let (adopters, _) = StubAdopterRepository::spawn(vec![fixtures::adopter()]);
        let auth = Arc::new(auth);
        let state = AppStore::default();
        let interactor = SessionInteractor::new(auth.clone(), Arc::new(adopters), state.clone());
        (interactor, auth, state)
    }

    #[tokio::test]
    async fn test_sign_in_rebuilds_state_from_adopter_row() {
        let (interactor, _, state) = session(StubAuthService::new());
        interactor.sign_in("rae@example.com", STUB_PASSWORD).await.unwrap();

        let snapshot = state.snapshot();
        let adopter = fixtures::adopter();
        assert!(snapshot.session.is_authenticated);
        assert_eq!(snapshot.session.current_adopter_id, Some(adopter.id));
        assert_eq!(snapshot.user_data.liked, adopter.liked_dog_ids);
        assert_eq!(snapshot.user_data.disliked, adopter.disliked_dog_ids);
        assert_eq!(snapshot.user_data.matched, adopter.matched_dog_ids);
    }

    #[tokio::test]
    async fn test_first_sign_in_registers_adopter() {
        let id = Uuid::new_v4();
        let auth = StubAuthService::empty().with_account("noor@example.com", "pw", id);
        let (interactor, _, state) = session(auth);

        let adopter = interactor.sign_in("noor@example.com", "pw").await.unwrap();
        assert_eq!(adopter.id, id);
        assert_eq!(adopter.name, "noor");
        assert!(state.snapshot().user_data.liked.is_empty());
    }

    #[tokio::test]
    async fn test_bad_password_leaves_state_alone() {
        let (interactor, _, state) = session(StubAuthService::new());
        let err = interactor.sign_in("rae@example.com", "nope").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        assert!(!state.snapshot().session.is_authenticated);
    }

    #[tokio::test]
    async fn test_oauth_callback_signs_in() {
        let (interactor, _, state) = session(StubAuthService::new());
        let callback = Url::parse("pawmatch://login-callback#access_token=t&refresh_token=r").unwrap();
        interactor.complete_oauth(&callback).await.unwrap();
        assert_eq!(state.get(path::CURRENT_ADOPTER_ID), Some(fixtures::ADOPTER_ID));
    }

    #[tokio::test]
    async fn test_observer_follows_auth_events() {
        let (interactor, auth, state) = session(StubAuthService::new());
        let observer = interactor.observe();
        let mut changes = state.subscribe();

        auth.sign_in_with_password("rae@example.com", STUB_PASSWORD)
            .await
            .unwrap();
        tokio::time::timeout(
            Duration::from_secs(5),
            changes.wait_for(|s| s.session.is_authenticated),
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(state.get(path::LIKED), fixtures::adopter().liked_dog_ids);

        auth.sign_out().await.unwrap();
        tokio::time::timeout(
            Duration::from_secs(5),
            changes.wait_for(|s| !s.session.is_authenticated),
        )
        .await
        .unwrap()
        .unwrap();
        assert!(state.get(path::LIKED).is_empty());

        observer.abort();
    }
}
