//! GROQ queries issued by the Magazine.

/// Published articles, newest first, projected onto [`crate::dto::ArticleDocument`].
pub const ARTICLES: &str = r#"*[_type == "article" && defined(slug.current)] | order(publishedAt desc) {
  _id,
  title,
  slug,
  summary,
  "bodyText": pt::text(body),
  "coverImageUrl": coverImage.asset->url,
  "category": category->title,
  publishedAt
}"#;

/// A single article by slug; binds `$slug`.
pub const ARTICLE_BY_SLUG: &str = r#"*[_type == "article" && slug.current == $slug][0...1] {
  _id,
  title,
  slug,
  summary,
  "bodyText": pt::text(body),
  "coverImageUrl": coverImage.asset->url,
  "category": category->title,
  publishedAt
}"#;
