use super::{current_adopter, load, LoadSink, Loadable};
use crate::error::RepositoryError;
use crate::model::{Adopter, AdopterPreferences, AdopterUpdate};
use crate::repository::AdopterRepository;
use crate::state::AppStore;
use std::sync::Arc;
use tracing::{info, instrument};

/// Profile tab: the signed-in adopter's row and preferences.
#[derive(Clone)]
pub struct AdopterInteractor {
    adopters: Arc<dyn AdopterRepository>,
    state: AppStore,
}

impl AdopterInteractor {
    pub fn new(adopters: Arc<dyn AdopterRepository>, state: AppStore) -> Self {
        Self { adopters, state }
    }

    #[instrument(skip(self, sink))]
    pub async fn load_profile(&self, sink: &impl LoadSink<Adopter>) -> Loadable<Adopter> {
        load(sink, "profile", async {
            let id = current_adopter(&self.state)?;
            self.adopters.fetch(id).await
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn update_preferences(&self, preferences: AdopterPreferences) -> Result<Adopter, RepositoryError> {
        let id = current_adopter(&self.state)?;
        let adopter = self
            .adopters
            .update(
                id,
                AdopterUpdate {
                    preferences: Some(preferences),
                    ..Default::default()
                },
            )
            .await?;
        info!(%id, "Preferences updated");
        Ok(adopter)
    }

    /// Updates name, location and bio; `None` fields are left alone.
    #[instrument(skip(self))]
    pub async fn update_profile(
        &self,
        name: Option<String>,
        location: Option<String>,
        bio: Option<String>,
    ) -> Result<Adopter, RepositoryError> {
        let id = current_adopter(&self.state)?;
        self.adopters
            .update(
                id,
                AdopterUpdate {
                    name,
                    location,
                    bio,
                    ..Default::default()
                },
            )
            .await
    }
}
