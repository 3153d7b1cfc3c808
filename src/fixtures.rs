//! Canned records served by the stub repositories.
//!
//! Ids are fixed so previews and tests can refer to specific dogs. Dog order here is the
//! order the stub dog store lists them in.

use crate::model::{
    Adopter, AdopterPreferences, Article, Dog, DogGender, DogSize, EnergyLevel, IdSet, Match,
    MatchStatus, Message, MessageSender, Visit, VisitStatus,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub const ADOPTER_ID: Uuid = Uuid::from_u128(0x0a0d_0000_0000_4000_8000_0000_0000_0001);
pub const RESCUER_ID: Uuid = Uuid::from_u128(0x0e5c_0000_0000_4000_8000_0000_0000_0001);
pub const SHELTER_ID: Uuid = Uuid::from_u128(0x05e1_0000_0000_4000_8000_0000_0000_0001);
pub const MATCH_ID: Uuid = Uuid::from_u128(0x0a7c_0000_0000_4000_8000_0000_0000_0001);

pub const BISCUIT: Uuid = Uuid::from_u128(0xd0_0000_0000_4000_8000_0000_0000_0001);
pub const JUNIPER: Uuid = Uuid::from_u128(0xd0_0000_0000_4000_8000_0000_0000_0002);
pub const ATLAS: Uuid = Uuid::from_u128(0xd0_0000_0000_4000_8000_0000_0000_0003);
pub const PEPPER: Uuid = Uuid::from_u128(0xd0_0000_0000_4000_8000_0000_0000_0004);
pub const MOOSE: Uuid = Uuid::from_u128(0xd0_0000_0000_4000_8000_0000_0000_0005);
pub const HAZEL: Uuid = Uuid::from_u128(0xd0_0000_0000_4000_8000_0000_0000_0006);
pub const ZIGGY: Uuid = Uuid::from_u128(0xd0_0000_0000_4000_8000_0000_0000_0007);

/// Seconds after 2024-01-01T00:00:00Z.
fn at(offset_secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(1_704_067_200 + offset_secs, 0).unwrap_or_default()
}

const DAY: i64 = 86_400;

#[allow(clippy::too_many_arguments)]
fn dog(
    id: Uuid,
    name: &str,
    breed: &str,
    age_years: u8,
    size: DogSize,
    gender: DogGender,
    energy_level: EnergyLevel,
    traits: &[&str],
    listed_day: i64,
) -> Dog {
    Dog {
        id,
        name: name.to_string(),
        breed: breed.to_string(),
        age_years,
        size,
        gender,
        image_urls: vec![format!("https://images.pawmatch.app/dogs/{}.jpg", name.to_lowercase())],
        bio: format!("{name} is a {age_years} year old {breed} looking for a home."),
        shelter_id: Some(SHELTER_ID),
        location: Some("Portland, OR".to_string()),
        rescuer_id: Some(RESCUER_ID),
        traits: traits.iter().map(|t| t.to_string()).collect(),
        energy_level,
        created_at: at(listed_day * DAY),
        updated_at: at(listed_day * DAY),
    }
}

pub fn dogs() -> Vec<Dog> {
    use DogGender::*;
    use DogSize::*;
    use EnergyLevel::*;
    vec![
        dog(BISCUIT, "Biscuit", "Beagle", 3, Medium, Male, High, &["friendly", "food-motivated"], 1),
        dog(JUNIPER, "Juniper", "Shih Tzu", 5, Small, Female, Low, &["calm", "lap dog"], 2),
        dog(ATLAS, "Atlas", "German Shepherd", 7, Large, Male, Moderate, &["loyal", "trained"], 3),
        dog(PEPPER, "Pepper", "Jack Russell Terrier", 1, Small, Female, VeryHigh, &["playful"], 4),
        dog(MOOSE, "Moose", "Great Dane", 9, ExtraLarge, Male, Low, &["gentle giant"], 5),
        dog(HAZEL, "Hazel", "Cocker Spaniel", 4, Medium, Female, Moderate, &["cuddly", "good with kids"], 6),
        dog(ZIGGY, "Ziggy", "Dachshund", 2, Small, Male, Moderate, &["curious"], 7),
    ]
}

/// The signed-in adopter: likes Hazel then Biscuit, passed on Moose, matched with Biscuit.
pub fn adopter() -> Adopter {
    Adopter {
        id: ADOPTER_ID,
        name: "Rae Okafor".to_string(),
        email: "rae@example.com".to_string(),
        location: Some("Portland, OR".to_string()),
        bio: Some("Weekend hiker with a fenced yard.".to_string()),
        preferences: AdopterPreferences {
            sizes: vec![DogSize::Small, DogSize::Medium],
            min_age: None,
            max_age: Some(8),
            energy_levels: Vec::new(),
            max_distance_km: Some(40),
        },
        liked_dog_ids: [HAZEL, BISCUIT].into_iter().collect::<IdSet>(),
        disliked_dog_ids: [MOOSE].into_iter().collect::<IdSet>(),
        matched_dog_ids: [BISCUIT].into_iter().collect::<IdSet>(),
        registered_at: at(0),
    }
}

pub fn matches() -> Vec<Match> {
    vec![Match {
        id: MATCH_ID,
        adopter_id: ADOPTER_ID,
        dog_id: BISCUIT,
        status: MatchStatus::Pending,
        created_at: at(8 * DAY),
        updated_at: at(8 * DAY),
    }]
}

pub fn visits() -> Vec<Visit> {
    vec![Visit {
        id: Uuid::from_u128(0x0715_0000_0000_4000_8000_0000_0000_0001),
        adopter_id: ADOPTER_ID,
        dog_id: BISCUIT,
        rescuer_id: Some(RESCUER_ID),
        scheduled_for: at(12 * DAY + 15 * 3600),
        status: VisitStatus::Confirmed,
        notes: Some("Bring a leash.".to_string()),
        created_at: at(9 * DAY),
    }]
}

pub fn messages() -> Vec<Message> {
    vec![
        Message {
            id: Uuid::from_u128(0x0333_0000_0000_4000_8000_0000_0000_0001),
            match_id: MATCH_ID,
            sender: MessageSender::Adopter,
            body: "Hi! Is Biscuit good with cats?".to_string(),
            sent_at: at(8 * DAY + 600),
            read: true,
        },
        Message {
            id: Uuid::from_u128(0x0333_0000_0000_4000_8000_0000_0000_0002),
            match_id: MATCH_ID,
            sender: MessageSender::Rescuer,
            body: "He lived with two, so yes.".to_string(),
            sent_at: at(8 * DAY + 4200),
            read: false,
        },
    ]
}

fn article(n: u32, title: &str, slug: &str, category: &str, day: i64) -> Article {
    Article {
        id: format!("article-{n}"),
        title: title.to_string(),
        slug: slug.to_string(),
        summary: format!("{title}, in five minutes."),
        body_text: format!("{title}. A longer read for new adopters."),
        cover_image_url: Some(format!("https://cdn.sanity.io/images/pawmatch/{slug}.jpg")),
        category: Some(category.to_string()),
        published_at: at(day * DAY),
    }
}

/// Newest first, as the CMS query orders them.
pub fn articles() -> Vec<Article> {
    vec![
        article(3, "The first week home", "first-week-home", "Guides", 20),
        article(2, "Crate training without tears", "crate-training", "Training", 14),
        article(1, "Reading a shelter bio", "reading-a-shelter-bio", "Adoption", 10),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_fixture_ids_are_unique() {
        let ids: HashSet<Uuid> = dogs().iter().map(|d| d.id).collect();
        assert_eq!(ids.len(), dogs().len());
    }

    #[test]
    fn test_adopter_sets_reference_fixture_dogs() {
        let ids: HashSet<Uuid> = dogs().iter().map(|d| d.id).collect();
        let adopter = adopter();
        for id in adopter
            .liked_dog_ids
            .iter()
            .chain(adopter.disliked_dog_ids.iter())
            .chain(adopter.matched_dog_ids.iter())
        {
            assert!(ids.contains(id));
        }
        assert!(adopter.registered_at < dogs()[0].created_at);
    }
}
