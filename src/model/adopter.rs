use super::{Dog, DogSize, EnergyLevel, IdSet};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What an adopter wants to see in the Discover deck.
///
/// Empty `sizes`/`energy_levels` mean "any". Distance is kept for the backend's
/// geo filter and is not evaluated client side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdopterPreferences {
    pub sizes: Vec<DogSize>,
    pub min_age: Option<u8>,
    pub max_age: Option<u8>,
    pub energy_levels: Vec<EnergyLevel>,
    pub max_distance_km: Option<u32>,
}

impl AdopterPreferences {
    pub fn accepts(&self, dog: &Dog) -> bool {
        let size_ok = self.sizes.is_empty() || self.sizes.contains(&dog.size);
        let energy_ok = self.energy_levels.is_empty() || self.energy_levels.contains(&dog.energy_level);
        let min_ok = self.min_age.map_or(true, |min| dog.age_years >= min);
        let max_ok = self.max_age.map_or(true, |max| dog.age_years <= max);
        size_ok && energy_ok && min_ok && max_ok
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Adopter {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub preferences: AdopterPreferences,
    pub liked_dog_ids: IdSet,
    pub disliked_dog_ids: IdSet,
    pub matched_dog_ids: IdSet,
    pub registered_at: DateTime<Utc>,
}

/// Payload for registering an adopter. The id is the auth user id.
#[derive(Debug, Clone)]
pub struct AdopterCreate {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AdopterUpdate {
    pub name: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub preferences: Option<AdopterPreferences>,
    pub dog_sets: Option<DogSets>,
}

/// The three swipe outcome sets, written together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DogSets {
    pub liked: IdSet,
    pub disliked: IdSet,
    pub matched: IdSet,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn test_empty_preferences_accept_everything() {
        let prefs = AdopterPreferences::default();
        assert!(fixtures::dogs().iter().all(|dog| prefs.accepts(dog)));
    }

    #[test]
    fn test_preferences_filter_size_age_and_energy() {
        let prefs = AdopterPreferences {
            sizes: vec![DogSize::Small, DogSize::Medium],
            min_age: Some(2),
            max_age: Some(8),
            energy_levels: vec![EnergyLevel::Low, EnergyLevel::Moderate],
            max_distance_km: Some(25),
        };
        for dog in fixtures::dogs() {
            let expected = matches!(dog.size, DogSize::Small | DogSize::Medium)
                && (2..=8).contains(&dog.age_years)
                && matches!(dog.energy_level, EnergyLevel::Low | EnergyLevel::Moderate);
            assert_eq!(prefs.accepts(&dog), expected, "{}", dog.name);
        }
    }
}
