use super::{current_adopter, load, LoadSink, Loadable};
use crate::error::RepositoryError;
use crate::model::{Match, Message, MessageCreate, MessageSender, Visit, VisitCreate, VisitStatus};
use crate::repository::{DogRepository, MatchRepository, MessageRepository, VisitRepository};
use crate::state::{path, AppStore, Sheet};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Matches, visits and the per-match conversation.
#[derive(Clone)]
pub struct MatchesInteractor {
    matches: Arc<dyn MatchRepository>,
    visits: Arc<dyn VisitRepository>,
    messages: Arc<dyn MessageRepository>,
    dogs: Arc<dyn DogRepository>,
    state: AppStore,
}

impl MatchesInteractor {
    pub fn new(
        matches: Arc<dyn MatchRepository>,
        visits: Arc<dyn VisitRepository>,
        messages: Arc<dyn MessageRepository>,
        dogs: Arc<dyn DogRepository>,
        state: AppStore,
    ) -> Self {
        Self {
            matches,
            visits,
            messages,
            dogs,
            state,
        }
    }

    #[instrument(skip(self, sink))]
    pub async fn load_matches(&self, sink: &impl LoadSink<Vec<Match>>) -> Loadable<Vec<Match>> {
        load(sink, "matches", async {
            let adopter_id = current_adopter(&self.state)?;
            self.matches.fetch_for_adopter(adopter_id).await
        })
        .await
    }

    #[instrument(skip(self, sink))]
    pub async fn load_visits(&self, sink: &impl LoadSink<Vec<Visit>>) -> Loadable<Vec<Visit>> {
        load(sink, "visits", async {
            let adopter_id = current_adopter(&self.state)?;
            self.visits.fetch_for_adopter(adopter_id).await
        })
        .await
    }

    /// Requests a visit with the dog's rescuer.
    #[instrument(skip(self, notes))]
    pub async fn schedule_visit(
        &self,
        dog_id: Uuid,
        scheduled_for: DateTime<Utc>,
        notes: Option<String>,
    ) -> Result<Visit, RepositoryError> {
        let adopter_id = current_adopter(&self.state)?;
        let dog = self.dogs.fetch(dog_id).await?;
        let visit = self
            .visits
            .schedule(VisitCreate {
                adopter_id,
                dog_id,
                rescuer_id: dog.rescuer_id,
                scheduled_for,
                notes,
            })
            .await?;
        info!(visit_id = %visit.id, dog = %dog.name, "Visit requested");
        Ok(visit)
    }

    #[instrument(skip(self))]
    pub async fn cancel_visit(&self, visit_id: Uuid) -> Result<Visit, RepositoryError> {
        self.visits.update_status(visit_id, VisitStatus::Cancelled).await
    }

    /// Loads a conversation and marks the rescuer's unread messages read. The chat sheet
    /// opens only once the messages are loaded.
    #[instrument(skip(self, sink))]
    pub async fn open_conversation(
        &self,
        match_id: Uuid,
        sink: &impl LoadSink<Vec<Message>>,
    ) -> Loadable<Vec<Message>> {
        let outcome = load(sink, "messages", async {
            let mut messages = self.messages.fetch_for_match(match_id).await?;
            for message in messages
                .iter_mut()
                .filter(|m| m.sender == MessageSender::Rescuer && !m.read)
            {
                *message = self.messages.mark_read(message.id).await?;
            }
            Ok(messages)
        })
        .await;
        if outcome.value().is_some() {
            self.state.set(path::SHEET, Some(Sheet::Chat { match_id }));
        }
        outcome
    }

    #[instrument(skip(self, body))]
    pub async fn send_message(&self, match_id: Uuid, body: String) -> Result<Message, RepositoryError> {
        self.messages
            .send(MessageCreate {
                match_id,
                sender: MessageSender::Adopter,
                body,
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::interactor::Discard;
    use crate::repository::{
        StubDogRepository, StubMatchRepository, StubMessageRepository, StubVisitRepository,
    };
    use chrono::Duration;
    use record_store::mock::MockStore;
    use record_store::StoreError;

    fn interactor() -> (MatchesInteractor, AppStore) {
        let (matches, _) = StubMatchRepository::spawn(fixtures::matches());
        let (visits, _) = StubVisitRepository::spawn(fixtures::visits());
        let (messages, _) = StubMessageRepository::spawn(fixtures::messages());
        let (dogs, _) = StubDogRepository::spawn(fixtures::dogs());
        let state = AppStore::default();
        state.set(path::CURRENT_ADOPTER_ID, Some(fixtures::ADOPTER_ID));
        let interactor = MatchesInteractor::new(
            Arc::new(matches),
            Arc::new(visits),
            Arc::new(messages),
            Arc::new(dogs),
            state.clone(),
        );
        (interactor, state)
    }

    #[tokio::test]
    async fn test_schedule_visit_uses_dog_rescuer() {
        let (interactor, _) = interactor();
        let when = Utc::now() + Duration::days(3);
        let visit = interactor
            .schedule_visit(fixtures::HAZEL, when, Some("Afternoon works".into()))
            .await
            .unwrap();
        assert_eq!(visit.status, VisitStatus::Requested);
        assert_eq!(visit.rescuer_id, Some(fixtures::RESCUER_ID));

        let visits = interactor.load_visits(&Discard).await;
        assert_eq!(visits.value().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_open_conversation_marks_rescuer_messages_read() {
        let (interactor, state) = interactor();
        let messages = interactor.open_conversation(fixtures::MATCH_ID, &Discard).await;
        let messages = messages.value().unwrap();

        assert_eq!(messages.len(), 2);
        assert!(messages.iter().all(|m| m.read));
        assert_eq!(
            state.get(path::SHEET),
            Some(Sheet::Chat {
                match_id: fixtures::MATCH_ID
            })
        );
    }

    #[tokio::test]
    async fn test_failed_conversation_load_keeps_routing() {
        let mut messages = MockStore::<Message>::new();
        messages.expect_list().return_err(StoreError::StoreClosed);
        let (matches, _) = StubMatchRepository::spawn(fixtures::matches());
        let (visits, _) = StubVisitRepository::spawn(fixtures::visits());
        let (dogs, _) = StubDogRepository::spawn(fixtures::dogs());
        let state = AppStore::default();
        let interactor = MatchesInteractor::new(
            Arc::new(matches),
            Arc::new(visits),
            Arc::new(StubMessageRepository::new(messages.handle())),
            Arc::new(dogs),
            state.clone(),
        );

        let outcome = interactor.open_conversation(fixtures::MATCH_ID, &Discard).await;
        assert!(outcome.error().is_some());
        assert_eq!(state.get(path::SHEET), None);
        messages.verify();
    }

    #[tokio::test]
    async fn test_empty_message_is_rejected() {
        let (interactor, _) = interactor();
        let err = interactor
            .send_message(fixtures::MATCH_ID, "   ".into())
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Store(_)));
    }
}
