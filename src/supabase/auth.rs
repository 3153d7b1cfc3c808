//! Session types and the OAuth callback parser for the hosted auth service.

use crate::error::AuthError;
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

/// An authenticated session as returned by the token endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "bearer")]
    pub token_type: String,
    pub expires_in: u64,
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: AuthUser,
}

fn bearer() -> String {
    "bearer".to_string()
}

/// Auth state transitions broadcast to observers.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthEvent {
    SignedOut,
    SignedIn(AuthUser),
    TokenRefreshed(AuthUser),
}

impl AuthEvent {
    pub fn user(&self) -> Option<&AuthUser> {
        match self {
            AuthEvent::SignedOut => None,
            AuthEvent::SignedIn(user) | AuthEvent::TokenRefreshed(user) => Some(user),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct PasswordCredentials<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct RefreshGrant<'a> {
    pub refresh_token: &'a str,
}

/// Tokens carried by the OAuth callback URL, before the user has been fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct CallbackTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
    pub token_type: String,
}

/// Extracts the session tokens from an OAuth callback URL.
///
/// The provider delivers them in the fragment (`#access_token=...`); some flows use the
/// query string instead, so both are read, fragment first. A callback carrying
/// `error_description` is reported as malformed with that description.
pub fn parse_callback(url: &Url) -> Result<CallbackTokens, AuthError> {
    let params: Vec<(String, String)> = url
        .fragment()
        .filter(|fragment| !fragment.is_empty())
        .map(|fragment| {
            url::form_urlencoded::parse(fragment.as_bytes())
                .into_owned()
                .collect()
        })
        .unwrap_or_else(|| url.query_pairs().into_owned().collect());

    let get = |key: &str| {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    };

    if let Some(description) = get("error_description").or_else(|| get("error")) {
        return Err(AuthError::MalformedCallback(description));
    }

    let access_token = get("access_token")
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AuthError::MalformedCallback("missing access_token".to_string()))?;
    let refresh_token = get("refresh_token").unwrap_or_default();
    let expires_in = match get("expires_in") {
        Some(raw) => raw
            .parse()
            .map_err(|_| AuthError::MalformedCallback(format!("bad expires_in {raw}")))?,
        None => 3600,
    };

    Ok(CallbackTokens {
        access_token,
        refresh_token,
        expires_in,
        token_type: get("token_type").unwrap_or_else(bearer),
    })
}
