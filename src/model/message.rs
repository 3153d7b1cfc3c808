use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageSender {
    Adopter,
    Rescuer,
}

/// A chat line inside a match conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: Uuid,
    pub match_id: Uuid,
    pub sender: MessageSender,
    pub body: String,
    pub sent_at: DateTime<Utc>,
    pub read: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageCreate {
    pub match_id: Uuid,
    pub sender: MessageSender,
    pub body: String,
}
