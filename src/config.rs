//! Runtime configuration read from the environment (and a `.env` file when present).
//!
//! | Variable | Default |
//! |----------|---------|
//! | `SUPABASE_URL` | required |
//! | `SUPABASE_ANON_KEY` | required |
//! | `SANITY_PROJECT_ID` | required |
//! | `SANITY_DATASET` | `production` |
//! | `SANITY_API_VERSION` | `2023-05-03` |
//! | `SANITY_USE_CDN` | `true` |
//! | `SANITY_TOKEN` | unset |
//! | `PAWMATCH_LOAD_TIMEOUT_SECS` | `10` |
//! | `PAWMATCH_HTTP_TIMEOUT_SECS` | `15` |
//! | `PAWMATCH_REDIRECT_URL` | unset |

use crate::error::ConfigError;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, PartialEq)]
pub struct SupabaseConfig {
    pub url: Url,
    pub anon_key: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SanityConfig {
    pub project_id: String,
    pub dataset: String,
    pub api_version: String,
    pub use_cdn: bool,
    pub token: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub supabase: SupabaseConfig,
    pub sanity: SanityConfig,
    /// Bound on guarded loads (liked dogs, deck).
    pub load_timeout: Duration,
    /// Per-request bound applied by the HTTP client.
    pub http_timeout: Duration,
    /// Where the OAuth provider sends the browser back to; the redirect bridge.
    pub redirect_url: Option<String>,
}

impl Config {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            info!(path = %path.display(), "Loaded .env");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let supabase_url = required(&lookup, "SUPABASE_URL")?;
        let url = Url::parse(&supabase_url)
            .map(as_directory)
            .map_err(|e| ConfigError::Invalid {
                key: "SUPABASE_URL",
                reason: e.to_string(),
            })?;

        let config = Self {
            supabase: SupabaseConfig {
                url,
                anon_key: required(&lookup, "SUPABASE_ANON_KEY")?,
            },
            sanity: SanityConfig {
                project_id: required(&lookup, "SANITY_PROJECT_ID")?,
                dataset: lookup("SANITY_DATASET").unwrap_or_else(|| "production".to_string()),
                api_version: lookup("SANITY_API_VERSION").unwrap_or_else(|| "2023-05-03".to_string()),
                use_cdn: parsed(&lookup, "SANITY_USE_CDN", true)?,
                token: lookup("SANITY_TOKEN"),
            },
            load_timeout: Duration::from_secs(parsed(
                &lookup,
                "PAWMATCH_LOAD_TIMEOUT_SECS",
                DEFAULT_LOAD_TIMEOUT.as_secs(),
            )?),
            http_timeout: Duration::from_secs(parsed(
                &lookup,
                "PAWMATCH_HTTP_TIMEOUT_SECS",
                DEFAULT_HTTP_TIMEOUT.as_secs(),
            )?),
            redirect_url: lookup("PAWMATCH_REDIRECT_URL"),
        };

        if config.load_timeout.is_zero() {
            return Err(ConfigError::Invalid {
                key: "PAWMATCH_LOAD_TIMEOUT_SECS",
                reason: "must be at least 1".to_string(),
            });
        }

        info!(
            supabase = %config.supabase.url,
            sanity_project = %config.sanity.project_id,
            load_timeout = ?config.load_timeout,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// A configuration pointing at `supabase_url` with fixture credentials.
    pub fn for_tests(supabase_url: Url) -> Self {
        Self {
            supabase: SupabaseConfig {
                url: as_directory(supabase_url),
                anon_key: "test-anon-key".to_string(),
            },
            sanity: SanityConfig {
                project_id: "testproject".to_string(),
                dataset: "production".to_string(),
                api_version: "2023-05-03".to_string(),
                use_cdn: false,
                token: None,
            },
            load_timeout: DEFAULT_LOAD_TIMEOUT,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            redirect_url: None,
        }
    }
}

/// Endpoints are joined onto the backend URL, so its path must end in `/` or the last
/// segment would be replaced.
fn as_directory(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn required(lookup: &impl Fn(&str) -> Option<String>, key: &'static str) -> Result<String, ConfigError> {
    lookup(key)
        .filter(|value| !value.trim().is_empty())
        .ok_or(ConfigError::Missing(key))
}

fn parsed<T>(lookup: &impl Fn(&str) -> Option<String>, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr + Display,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
        None => {
            debug!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}
