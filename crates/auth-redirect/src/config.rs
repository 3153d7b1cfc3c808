//! Environment configuration for the bridge.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `REDIRECT_PORT` | `3000` |
//! | `APP_SCHEME` | `pawmatch` |
//! | `APPLE_TEAM_ID` | required |
//! | `APPLE_BUNDLE_ID` | required |

use crate::error::BridgeError;
use tracing::info;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_SCHEME: &str = "pawmatch";

#[derive(Debug, Clone, PartialEq)]
pub struct RedirectConfig {
    pub port: u16,
    /// Custom URL scheme the app registers, without `://`.
    pub app_scheme: String,
    pub apple_team_id: String,
    pub apple_bundle_id: String,
}

impl RedirectConfig {
    pub fn from_env() -> Result<Self, BridgeError> {
        if let Ok(path) = dotenvy::dotenv() {
            info!(path = %path.display(), "Loaded .env");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, BridgeError> {
        let port = match lookup("REDIRECT_PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| BridgeError::InvalidVar {
                key: "REDIRECT_PORT",
                value: raw,
            })?,
            None => DEFAULT_PORT,
        };

        let app_scheme = lookup("APP_SCHEME").unwrap_or_else(|| DEFAULT_SCHEME.to_string());
        if app_scheme.is_empty() || !is_scheme(&app_scheme) {
            return Err(BridgeError::InvalidVar {
                key: "APP_SCHEME",
                value: app_scheme,
            });
        }

        Ok(Self {
            port,
            app_scheme,
            apple_team_id: lookup("APPLE_TEAM_ID").ok_or(BridgeError::MissingVar("APPLE_TEAM_ID"))?,
            apple_bundle_id: lookup("APPLE_BUNDLE_ID")
                .ok_or(BridgeError::MissingVar("APPLE_BUNDLE_ID"))?,
        })
    }

    /// `<team>.<bundle>`, the app id universal links are bound to.
    pub fn app_id(&self) -> String {
        format!("{}.{}", self.apple_team_id, self.apple_bundle_id)
    }

    /// The deep link the browser is handed back to, without query or fragment.
    pub fn callback_base(&self) -> String {
        format!("{}://login-callback", self.app_scheme)
    }
}

/// RFC 3986 scheme: a letter followed by letters, digits, `+`, `-` or `.`.
fn is_scheme(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
