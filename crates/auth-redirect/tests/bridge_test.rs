use auth_redirect::{serve, RedirectConfig};
use reqwest::{redirect::Policy, StatusCode};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

struct Bridge {
    base: String,
    stop: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl Bridge {
    async fn start() -> Self {
        let config = RedirectConfig {
            port: 0,
            app_scheme: "pawmatch".to_string(),
            apple_team_id: "ABCDE12345".to_string(),
            apple_bundle_id: "app.pawmatch.ios".to_string(),
        };
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let (stop, stopped) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            serve(listener, config, async move {
                let _ = stopped.await;
            })
            .await
            .unwrap();
        });
        Self { base, stop, task }
    }

    async fn stop(self) {
        let _ = self.stop.send(());
        self.task.await.unwrap();
    }
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(Policy::none())
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_query_callback_redirects_to_app() {
    let bridge = Bridge::start().await;

    let response = client()
        .get(format!("{}/login-callback?code=abc123&state=xyz", bridge.base))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers()["location"],
        "pawmatch://login-callback?code=abc123&state=xyz"
    );

    bridge.stop().await;
}

#[tokio::test]
async fn test_fragment_callback_serves_forwarding_page() {
    let bridge = Bridge::start().await;

    let response = client()
        .get(format!("{}/login-callback", bridge.base))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/html"));
    let body = response.text().await.unwrap();
    assert!(body.contains(r#""pawmatch://login-callback" + (location.hash || location.search)"#));

    bridge.stop().await;
}

#[tokio::test]
async fn test_association_file_on_both_paths() {
    let bridge = Bridge::start().await;

    for path in [
        "/.well-known/apple-app-site-association",
        "/apple-app-site-association",
    ] {
        let response = client()
            .get(format!("{}{path}", bridge.base))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "application/json");

        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "applinks": {
                    "apps": [],
                    "details": [{
                        "appID": "ABCDE12345.app.pawmatch.ios",
                        "paths": ["/login-callback*"]
                    }]
                }
            })
        );
    }

    bridge.stop().await;
}

#[tokio::test]
async fn test_health() {
    let bridge = Bridge::start().await;

    let response = client()
        .get(format!("{}/health", bridge.base))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "OK");

    bridge.stop().await;
}
