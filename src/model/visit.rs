use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitStatus {
    Requested,
    Confirmed,
    Completed,
    Cancelled,
}

impl VisitStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VisitStatus::Requested => "requested",
            VisitStatus::Confirmed => "confirmed",
            VisitStatus::Completed => "completed",
            VisitStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for VisitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A meet-and-greet between an adopter and a dog.
#[derive(Debug, Clone, PartialEq)]
pub struct Visit {
    pub id: Uuid,
    pub adopter_id: Uuid,
    pub dog_id: Uuid,
    pub rescuer_id: Option<Uuid>,
    pub scheduled_for: DateTime<Utc>,
    pub status: VisitStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VisitCreate {
    pub adopter_id: Uuid,
    pub dog_id: Uuid,
    pub rescuer_id: Option<Uuid>,
    pub scheduled_for: DateTime<Utc>,
    pub notes: Option<String>,
}
