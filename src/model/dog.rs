use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use uuid::Uuid;

/// Size class of a dog, as stored in the `size` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DogSize {
    Small,
    Medium,
    Large,
    ExtraLarge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DogGender {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnergyLevel {
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl DogSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            DogSize::Small => "small",
            DogSize::Medium => "medium",
            DogSize::Large => "large",
            DogSize::ExtraLarge => "extra_large",
        }
    }
}

impl fmt::Display for DogSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl EnergyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnergyLevel::Low => "low",
            EnergyLevel::Moderate => "moderate",
            EnergyLevel::High => "high",
            EnergyLevel::VeryHigh => "very_high",
        }
    }
}

impl fmt::Display for EnergyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dog profile shown in the Discover deck.
///
/// Identity is the `id`: two values with the same id are the same dog even if one of
/// them is a stale copy, so `PartialEq` and `Hash` look at the id only.
#[derive(Debug, Clone)]
pub struct Dog {
    pub id: Uuid,
    pub name: String,
    pub breed: String,
    pub age_years: u8,
    pub size: DogSize,
    pub gender: DogGender,
    pub image_urls: Vec<String>,
    pub bio: String,
    pub shelter_id: Option<Uuid>,
    pub location: Option<String>,
    pub rescuer_id: Option<Uuid>,
    pub traits: Vec<String>,
    pub energy_level: EnergyLevel,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PartialEq for Dog {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Dog {}

impl Hash for Dog {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Dog {
    /// The first image, used as the card cover.
    pub fn cover_image(&self) -> Option<&str> {
        self.image_urls.first().map(String::as_str)
    }
}

/// Payload for listing a new dog.
#[derive(Debug, Clone, Serialize)]
pub struct DogCreate {
    pub name: String,
    pub breed: String,
    #[serde(rename = "age")]
    pub age_years: u8,
    pub size: DogSize,
    pub gender: DogGender,
    pub image_urls: Vec<String>,
    pub bio: String,
    pub shelter_id: Option<Uuid>,
    pub location: Option<String>,
    pub rescuer_id: Option<Uuid>,
    pub traits: Vec<String>,
    pub energy_level: EnergyLevel,
}

/// Partial update of a dog profile. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DogUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(rename = "age", skip_serializing_if = "Option::is_none")]
    pub age_years: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_urls: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traits: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub energy_level: Option<EnergyLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use std::collections::HashSet;

    #[test]
    fn test_equality_is_by_id_only() {
        let dog = fixtures::dogs().remove(0);
        let mut renamed = dog.clone();
        renamed.name = "Someone Else".into();
        renamed.bio.clear();
        assert_eq!(dog, renamed);

        let set: HashSet<Dog> = [dog, renamed].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(serde_json::to_string(&DogSize::ExtraLarge).unwrap(), "\"extra_large\"");
        assert_eq!(serde_json::to_string(&EnergyLevel::VeryHigh).unwrap(), "\"very_high\"");
        assert_eq!(DogSize::ExtraLarge.to_string(), "extra_large");
    }
}
