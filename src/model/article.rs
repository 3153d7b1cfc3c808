use chrono::{DateTime, Utc};

/// A Magazine entry published through the CMS.
#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub summary: String,
    pub body_text: String,
    pub cover_image_url: Option<String>,
    pub category: Option<String>,
    pub published_at: DateTime<Utc>,
}
