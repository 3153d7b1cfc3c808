use crate::config::RedirectConfig;
use axum::{
    extract::{RawQuery, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};

pub type SharedConfig = Arc<RedirectConfig>;

/// The association file iOS fetches to decide which paths open the app.
pub async fn apple_app_site_association(State(config): State<SharedConfig>) -> Json<Value> {
    debug!(app_id = %config.app_id(), "Serving apple-app-site-association");
    Json(json!({
        "applinks": {
            "apps": [],
            "details": [{
                "appID": config.app_id(),
                "paths": ["/login-callback*"],
            }],
        }
    }))
}

/// Hands the OAuth result back to the app.
///
/// Query parameters reach the server, so those are forwarded with a redirect. A fragment
/// never does; the page forwards it from the browser instead.
pub async fn login_callback(
    State(config): State<SharedConfig>,
    RawQuery(query): RawQuery,
) -> Response {
    let base = config.callback_base();
    match query.filter(|q| !q.is_empty()) {
        Some(query) => {
            info!("Forwarding callback query to app");
            (
                StatusCode::FOUND,
                [(header::LOCATION, format!("{base}?{query}"))],
            )
                .into_response()
        }
        None => {
            info!("Serving fragment forwarding page");
            Html(forwarding_page(&base)).into_response()
        }
    }
}

pub async fn health() -> &'static str {
    "OK"
}

fn forwarding_page(base: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Signing in to PawMatch</title>
</head>
<body>
<p>Returning you to PawMatch&hellip;</p>
<p><a id="open" href="{base}">Open PawMatch</a></p>
<script>
var target = "{base}" + (location.hash || location.search);
document.getElementById("open").href = target;
location.replace(target);
</script>
</body>
</html>
"#
    )
}
