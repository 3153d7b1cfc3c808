//! Live repositories against a fake backend served by axum on a local port.

use axum::{
    extract::RawQuery,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use pawmatch::config::{Config, DEFAULT_HTTP_TIMEOUT};
use pawmatch::error::{AuthError, RepositoryError};
use pawmatch::interactor::Discard;
use pawmatch::repository::{
    ArticleRepository, DogRepository, SanityArticleRepository, SupabaseDogRepository,
};
use pawmatch::sanity::SanityClient;
use pawmatch::state::path;
use pawmatch::supabase::SupabaseClient;
use pawmatch::Container;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use url::Url;
use uuid::Uuid;

const BISCUIT: &str = "00000000-0000-4000-8000-0000000000b1";
const HAZEL: &str = "00000000-0000-4000-8000-0000000000b2";
const ADOPTER: &str = "00000000-0000-4000-8000-0000000000a1";

async fn spawn_backend(app: Router) -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    Url::parse(&format!("http://{address}/")).unwrap()
}

fn dog_row(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "breed": "Mixed",
        "age": 3,
        "size": "medium",
        "gender": "female",
        "image_urls": null,
        "bio": "Loves naps.",
        "shelter_id": null,
        "location": "Portland, OR",
        "rescuer_id": null,
        "traits": ["calm"],
        "energy_level": "moderate",
        "created_at": "2024-03-01T12:00:00Z",
        "updated_at": "2024-03-02T12:00:00Z"
    })
}

fn dogs_repository(base: Url) -> SupabaseDogRepository {
    let config = Config::for_tests(base);
    SupabaseDogRepository::new(SupabaseClient::new(&config.supabase, DEFAULT_HTTP_TIMEOUT).unwrap())
}

#[tokio::test]
async fn test_fetch_all_decodes_rows_and_orders_newest_first() {
    let seen = Arc::new(Mutex::new(Vec::<String>::new()));
    let recorded = seen.clone();
    let app = Router::new().route(
        "/rest/v1/dogs",
        get(move |RawQuery(query): RawQuery| {
            let recorded = recorded.clone();
            async move {
                recorded.lock().unwrap().push(query.unwrap_or_default());
                Json(json!([dog_row(BISCUIT, "Biscuit"), dog_row(HAZEL, "Hazel")]))
            }
        }),
    );
    let dogs = dogs_repository(spawn_backend(app).await);

    let fetched = dogs.fetch_all().await.unwrap();
    let names: Vec<&str> = fetched.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, ["Biscuit", "Hazel"]);
    assert!(fetched[0].image_urls.is_empty());
    assert_eq!(fetched[0].age_years, 3);

    let queries = seen.lock().unwrap().clone();
    assert_eq!(queries.len(), 1);
    assert!(queries[0].contains("select=*"));
    assert!(queries[0].contains("order=created_at.desc"));
}

#[tokio::test]
async fn test_malformed_payload_is_decoding_error() {
    let app = Router::new().route(
        "/rest/v1/dogs",
        get(|| async { Json(json!([{ "id": "not-a-uuid", "name": 7 }])) }),
    );
    let dogs = dogs_repository(spawn_backend(app).await);

    let err = dogs.fetch_all().await.unwrap_err();
    assert!(matches!(err, RepositoryError::Decoding(_)), "got {err:?}");
}

#[tokio::test]
async fn test_out_of_range_age_is_decoding_error() {
    let app = Router::new().route(
        "/rest/v1/dogs",
        get(|| async {
            let mut row = dog_row(BISCUIT, "Biscuit");
            row["age"] = json!(-2);
            Json(json!([row]))
        }),
    );
    let dogs = dogs_repository(spawn_backend(app).await);

    assert!(matches!(
        dogs.fetch_all().await,
        Err(RepositoryError::Decoding(_))
    ));
}

#[tokio::test]
async fn test_missing_row_is_not_found() {
    let app = Router::new().route("/rest/v1/dogs", get(|| async { Json(json!([])) }));
    let dogs = dogs_repository(spawn_backend(app).await);

    let err = dogs.fetch(Uuid::new_v4()).await.unwrap_err();
    assert!(err.is_not_found(), "got {err:?}");
}

#[tokio::test]
async fn test_status_codes_map_to_errors() {
    let app = Router::new()
        .route(
            "/rest/v1/dogs",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
    let dogs = dogs_repository(spawn_backend(app).await);
    assert!(matches!(
        dogs.fetch_all().await,
        Err(RepositoryError::Transport(message)) if message.contains("boom")
    ));

    // No route at all: the fake server answers 404.
    let dogs = dogs_repository(spawn_backend(Router::new()).await);
    assert!(dogs.fetch_all().await.unwrap_err().is_not_found());
}

fn session_body() -> Value {
    json!({
        "access_token": "access-1",
        "refresh_token": "refresh-1",
        "token_type": "bearer",
        "expires_in": 3600,
        "user": { "id": ADOPTER, "email": "rae@example.com" }
    })
}

fn adopter_row() -> Value {
    json!({
        "id": ADOPTER,
        "name": "Rae",
        "email": "rae@example.com",
        "location": null,
        "bio": null,
        "preferences": { "sizes": ["medium"], "max_age": 8 },
        "liked_dogs": [HAZEL, BISCUIT],
        "disliked_dogs": null,
        "matched_dogs": [BISCUIT],
        "created_at": "2024-01-05T09:00:00Z"
    })
}

fn backend() -> Router {
    Router::new()
        .route(
            "/auth/v1/token",
            post(|Json(body): Json<Value>| async move {
                if body["password"] == "good-boy-42" {
                    Ok(Json(session_body()))
                } else {
                    Err((StatusCode::BAD_REQUEST, Json(json!({ "error": "invalid_grant" }))))
                }
            }),
        )
        .route("/auth/v1/logout", post(|| async { StatusCode::NO_CONTENT }))
        .route("/rest/v1/adopters", get(|| async { Json(json!([adopter_row()])) }))
        .route(
            "/rest/v1/dogs",
            get(|| async { Json(json!([dog_row(BISCUIT, "Biscuit"), dog_row(HAZEL, "Hazel")])) }),
        )
}

#[tokio::test]
async fn test_password_sign_in_populates_state() {
    let base = spawn_backend(backend()).await;
    let container = Container::live(&Config::for_tests(base)).unwrap();

    let adopter = container
        .session
        .sign_in("rae@example.com", "good-boy-42")
        .await
        .unwrap();
    assert_eq!(adopter.name, "Rae");

    let state = container.app_state.snapshot();
    assert!(state.session.is_authenticated);
    assert_eq!(state.session.current_adopter_id, Some(adopter.id));
    assert_eq!(state.user_data.liked.len(), 2);
    assert!(state.user_data.disliked.is_empty());

    // Rows come back in backend order; the list follows the liked set.
    let liked = container.dogs.load_liked_dogs(&Discard).await;
    let names: Vec<String> = liked
        .value()
        .unwrap()
        .iter()
        .map(|d| d.name.clone())
        .collect();
    assert_eq!(names, ["Hazel", "Biscuit"]);

    container.session.sign_out().await.unwrap();
    assert!(!container.app_state.get(path::IS_AUTHENTICATED));
    container.shutdown().await;
}

#[tokio::test]
async fn test_wrong_password_is_invalid_credentials() {
    let base = spawn_backend(backend()).await;
    let container = Container::live(&Config::for_tests(base)).unwrap();

    let err = container
        .session
        .sign_in("rae@example.com", "squirrel")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));
    assert!(!container.app_state.get(path::IS_AUTHENTICATED));
    container.shutdown().await;
}

fn article_document(slug: Option<&str>) -> Value {
    json!({
        "_id": "article-1",
        "title": "Your first week at home",
        "slug": slug.map(|current| json!({ "current": current })),
        "summary": "Settling in.",
        "bodyText": "Keep it quiet.",
        "coverImageUrl": null,
        "category": "care",
        "publishedAt": "2024-02-01T08:00:00Z"
    })
}

async fn articles_repository(app: Router) -> SanityArticleRepository {
    let base = spawn_backend(app).await;
    let config = Config::for_tests(base.clone());
    let client = SanityClient::with_base_url(
        base.join("v2023-05-03/").unwrap(),
        &config.sanity,
        DEFAULT_HTTP_TIMEOUT,
    )
    .unwrap();
    SanityArticleRepository::new(client)
}

#[tokio::test]
async fn test_articles_from_query_envelope() {
    let app = Router::new().route(
        "/v2023-05-03/data/query/production",
        get(|RawQuery(query): RawQuery| async move {
            let query = query.unwrap_or_default();
            let result = if query.contains("%24slug=") {
                json!([])
            } else {
                json!([article_document(Some("first-week-home"))])
            };
            Json(json!({ "ms": 4, "query": "*", "result": result }))
        }),
    );
    let articles = articles_repository(app).await;

    let all = articles.fetch_all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].slug, "first-week-home");

    let err = articles.fetch_by_slug("missing").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_article_without_slug_is_decoding_error() {
    let app = Router::new().route(
        "/v2023-05-03/data/query/production",
        get(|| async { Json(json!({ "ms": 1, "query": "*", "result": [article_document(None)] })) }),
    );
    let articles = articles_repository(app).await;

    assert!(matches!(
        articles.fetch_all().await,
        Err(RepositoryError::Decoding(_))
    ));
}
