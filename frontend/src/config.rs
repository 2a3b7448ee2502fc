use thiserror::Error;
use url::Url;

const DEFAULT_STORAGE_KEY: &str = "garden-tracker-auth-token";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} must be set at build time")]
    Missing(&'static str),

    #[error("{name} is not a valid URL: {reason}")]
    InvalidUrl { name: &'static str, reason: String },

    #[error("{name} must be true or false, got {value:?}")]
    InvalidBool { name: &'static str, value: String },
}

/// Settings baked into the wasm bundle.
///
/// Values come from the environment `trunk build` runs in:
/// - `SUPABASE_URL`: base URL of the Supabase project
/// - `SUPABASE_ANON_KEY`: public anon key sent as `apikey`
/// - `OAUTH_REDIRECT_TO`: where OAuth returns to (optional)
/// - `AUTH_STORAGE_KEY`: local storage key for the session (optional)
/// - `AUTH_DETECT_SESSION_IN_URL`: pick up OAuth tokens from the URL
///   fragment, defaults to true
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub oauth_redirect_to: Option<String>,
    pub storage_key: String,
    pub detect_session_in_url: bool,
}

impl AppConfig {
    pub fn from_build_env() -> Result<Self, ConfigError> {
        Self::from_values(
            option_env!("SUPABASE_URL"),
            option_env!("SUPABASE_ANON_KEY"),
            option_env!("OAUTH_REDIRECT_TO"),
            option_env!("AUTH_STORAGE_KEY"),
            option_env!("AUTH_DETECT_SESSION_IN_URL"),
        )
    }

    fn from_values(
        supabase_url: Option<&str>,
        supabase_anon_key: Option<&str>,
        oauth_redirect_to: Option<&str>,
        storage_key: Option<&str>,
        detect_session_in_url: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let supabase_url = non_empty(supabase_url).ok_or(ConfigError::Missing("SUPABASE_URL"))?;
        let parsed = Url::parse(supabase_url).map_err(|e| ConfigError::InvalidUrl {
            name: "SUPABASE_URL",
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl {
                name: "SUPABASE_URL",
                reason: format!("unsupported scheme {}", parsed.scheme()),
            });
        }

        let supabase_anon_key =
            non_empty(supabase_anon_key).ok_or(ConfigError::Missing("SUPABASE_ANON_KEY"))?;

        let detect_session_in_url = match non_empty(detect_session_in_url) {
            None => true,
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidBool {
                name: "AUTH_DETECT_SESSION_IN_URL",
                value: value.to_string(),
            })?,
        };

        Ok(Self {
            supabase_url: supabase_url.trim_end_matches('/').to_string(),
            supabase_anon_key: supabase_anon_key.to_string(),
            oauth_redirect_to: non_empty(oauth_redirect_to).map(str::to_string),
            storage_key: non_empty(storage_key)
                .unwrap_or(DEFAULT_STORAGE_KEY)
                .to_string(),
            detect_session_in_url,
        })
    }

    /// Base URL of the auth REST API.
    pub fn auth_url(&self) -> String {
        format!("{}/auth/v1", self.supabase_url)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
