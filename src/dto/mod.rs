//! Wire records exactly as the backend and the CMS return them.
//!
//! Each row converts into its domain record with `TryFrom`; anything that does not fit
//! (out-of-range numbers, a preferences column that is not an object, a document without
//! a slug) becomes [`RepositoryError::Decoding`]. Unknown enum strings and bad timestamps
//! already fail at `serde_json` level and map to the same error.

use crate::error::RepositoryError;
use crate::model::{
    Adopter, AdopterCreate, AdopterPreferences, AdopterUpdate, Article, Dog, DogGender, DogSize,
    EnergyLevel, IdSet, Match, MatchCreate, MatchStatus, Message, MessageSender, Visit,
    VisitCreate, VisitStatus,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DOGS_TABLE: &str = "dogs";
pub const ADOPTERS_TABLE: &str = "adopters";
pub const MATCHES_TABLE: &str = "matches";
pub const VISITS_TABLE: &str = "visits";
pub const MESSAGES_TABLE: &str = "messages";

#[derive(Debug, Clone, Deserialize)]
pub struct DogRow {
    pub id: Uuid,
    pub name: String,
    pub breed: String,
    pub age: i32,
    pub size: DogSize,
    pub gender: DogGender,
    #[serde(default)]
    pub image_urls: Option<Vec<String>>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub shelter_id: Option<Uuid>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub rescuer_id: Option<Uuid>,
    #[serde(default)]
    pub traits: Option<Vec<String>>,
    pub energy_level: EnergyLevel,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DogRow> for Dog {
    type Error = RepositoryError;

    fn try_from(row: DogRow) -> Result<Self, Self::Error> {
        let age_years = u8::try_from(row.age)
            .map_err(|_| RepositoryError::Decoding(format!("dog {} has age {}", row.id, row.age)))?;
        Ok(Dog {
            id: row.id,
            name: row.name,
            breed: row.breed,
            age_years,
            size: row.size,
            gender: row.gender,
            image_urls: row.image_urls.unwrap_or_default(),
            bio: row.bio.unwrap_or_default(),
            shelter_id: row.shelter_id,
            location: row.location,
            rescuer_id: row.rescuer_id,
            traits: row.traits.unwrap_or_default(),
            energy_level: row.energy_level,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdopterRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub preferences: Option<serde_json::Value>,
    #[serde(default)]
    pub liked_dogs: IdSet,
    #[serde(default)]
    pub disliked_dogs: IdSet,
    #[serde(default)]
    pub matched_dogs: IdSet,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<AdopterRow> for Adopter {
    type Error = RepositoryError;

    fn try_from(row: AdopterRow) -> Result<Self, Self::Error> {
        let preferences = match row.preferences {
            None | Some(serde_json::Value::Null) => AdopterPreferences::default(),
            Some(value) => serde_json::from_value(value).map_err(|e| {
                RepositoryError::Decoding(format!("adopter {} preferences: {e}", row.id))
            })?,
        };
        Ok(Adopter {
            id: row.id,
            name: row.name,
            email: row.email,
            location: row.location,
            bio: row.bio,
            preferences,
            liked_dog_ids: row.liked_dogs,
            disliked_dog_ids: row.disliked_dogs,
            matched_dog_ids: row.matched_dogs,
            registered_at: row.created_at,
        })
    }
}

/// Insert body for a new adopter row.
#[derive(Debug, Serialize)]
pub struct AdopterInsert<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub email: &'a str,
    pub location: Option<&'a str>,
    pub preferences: AdopterPreferences,
    pub liked_dogs: IdSet,
    pub disliked_dogs: IdSet,
    pub matched_dogs: IdSet,
}

impl<'a> From<&'a AdopterCreate> for AdopterInsert<'a> {
    fn from(params: &'a AdopterCreate) -> Self {
        Self {
            id: params.id,
            name: &params.name,
            email: &params.email,
            location: params.location.as_deref(),
            preferences: AdopterPreferences::default(),
            liked_dogs: IdSet::new(),
            disliked_dogs: IdSet::new(),
            matched_dogs: IdSet::new(),
        }
    }
}

/// PATCH body for an adopter row; absent fields are left alone by PostgREST.
#[derive(Debug, Default, Serialize)]
pub struct AdopterPatch<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferences: Option<&'a AdopterPreferences>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liked_dogs: Option<&'a IdSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disliked_dogs: Option<&'a IdSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_dogs: Option<&'a IdSet>,
}

impl<'a> From<&'a AdopterUpdate> for AdopterPatch<'a> {
    fn from(update: &'a AdopterUpdate) -> Self {
        Self {
            name: update.name.as_deref(),
            location: update.location.as_deref(),
            bio: update.bio.as_deref(),
            preferences: update.preferences.as_ref(),
            liked_dogs: update.dog_sets.as_ref().map(|sets| &sets.liked),
            disliked_dogs: update.dog_sets.as_ref().map(|sets| &sets.disliked),
            matched_dogs: update.dog_sets.as_ref().map(|sets| &sets.matched),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchRow {
    pub id: Uuid,
    pub adopter_id: Uuid,
    pub dog_id: Uuid,
    pub status: MatchStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<MatchRow> for Match {
    fn from(row: MatchRow) -> Self {
        Match {
            id: row.id,
            adopter_id: row.adopter_id,
            dog_id: row.dog_id,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MatchInsert<'a> {
    #[serde(flatten)]
    pub params: &'a MatchCreate,
    pub status: MatchStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VisitRow {
    pub id: Uuid,
    pub adopter_id: Uuid,
    pub dog_id: Uuid,
    #[serde(default)]
    pub rescuer_id: Option<Uuid>,
    pub scheduled_for: DateTime<Utc>,
    pub status: VisitStatus,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<VisitRow> for Visit {
    fn from(row: VisitRow) -> Self {
        Visit {
            id: row.id,
            adopter_id: row.adopter_id,
            dog_id: row.dog_id,
            rescuer_id: row.rescuer_id,
            scheduled_for: row.scheduled_for,
            status: row.status,
            notes: row.notes,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VisitInsert<'a> {
    #[serde(flatten)]
    pub params: &'a VisitCreate,
    pub status: VisitStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageRow {
    pub id: Uuid,
    pub match_id: Uuid,
    pub sender: MessageSender,
    pub body: String,
    pub sent_at: DateTime<Utc>,
    #[serde(default)]
    pub read: bool,
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        Message {
            id: row.id,
            match_id: row.match_id,
            sender: row.sender,
            body: row.body,
            sent_at: row.sent_at,
            read: row.read,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Slug {
    pub current: Option<String>,
}

/// An `article` document as projected by [`crate::sanity::queries::ARTICLES`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub slug: Option<Slug>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub body_text: Option<String>,
    #[serde(default)]
    pub cover_image_url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    pub published_at: DateTime<Utc>,
}

impl TryFrom<ArticleDocument> for Article {
    type Error = RepositoryError;

    fn try_from(doc: ArticleDocument) -> Result<Self, Self::Error> {
        let slug = doc
            .slug
            .and_then(|slug| slug.current)
            .filter(|slug| !slug.is_empty())
            .ok_or_else(|| RepositoryError::Decoding(format!("article {} has no slug", doc.id)))?;
        Ok(Article {
            id: doc.id,
            title: doc.title,
            slug,
            summary: doc.summary.unwrap_or_default(),
            body_text: doc.body_text.unwrap_or_default(),
            cover_image_url: doc.cover_image_url,
            category: doc.category,
            published_at: doc.published_at,
        })
    }
}

/// Decodes a JSON array of rows and converts every row, failing on the first bad one.
pub fn decode_rows<R, T>(body: &[u8]) -> Result<Vec<T>, RepositoryError>
where
    R: for<'de> Deserialize<'de>,
    T: TryFrom<R, Error = RepositoryError>,
{
    let rows: Vec<R> = serde_json::from_slice(body)?;
    rows.into_iter().map(T::try_from).collect()
}
