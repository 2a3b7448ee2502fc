use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity record owned by the identity provider.
///
/// Nothing in the auth shell looks past whether a user exists; the fields are
/// kept so the dashboard header can show who is signed in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub app_metadata: serde_json::Value,
    #[serde(default)]
    pub user_metadata: serde_json::Value,
}

/// Provider-issued proof of an authenticated user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub expires_in: i64,
    /// Unix timestamp (seconds). Filled in from `expires_in` when the
    /// provider leaves it out.
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: User,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl Session {
    /// Stamp `expires_at` relative to `now` if the provider did not send it.
    pub fn with_expiry_from(mut self, now: DateTime<Utc>) -> Self {
        if self.expires_at.is_none() {
            self.expires_at = Some(now.timestamp() + self.expires_in);
        }
        self
    }

    /// Whether the access token expires within `margin_secs` of `now`.
    /// A session without `expires_at` never expires locally.
    pub fn is_expired(&self, now: DateTime<Utc>, margin_secs: i64) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at - margin_secs <= now.timestamp(),
            None => false,
        }
    }
}

/// Kinds of session-change notifications a provider emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionEvent {
    InitialSession,
    SignedIn,
    SignedOut,
    TokenRefreshed,
    UserUpdated,
    PasswordRecovery,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Result of a sign-up or password sign-in.
///
/// Sign-up returns a user without a session while email confirmation is
/// pending.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: Option<User>,
    pub session: Option<Session>,
}

impl From<Session> for AuthResponse {
    fn from(session: Session) -> Self {
        Self {
            user: Some(session.user.clone()),
            session: Some(session),
        }
    }
}

/// Third-party identity providers available for OAuth sign-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OAuthProvider {
    Google,
}

impl OAuthProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Google => "google",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthOptions {
    pub redirect_to: Option<String>,
    /// Extra query parameters forwarded to the provider's consent screen.
    pub query_params: BTreeMap<String, String>,
}

impl OAuthOptions {
    /// Options used for Google sign-in: always show the consent screen and
    /// ask for offline access so a refresh token is issued.
    pub fn google_offline_consent() -> Self {
        let mut query_params = BTreeMap::new();
        query_params.insert("prompt".to_string(), "consent".to_string());
        query_params.insert("access_type".to_string(), "offline".to_string());
        Self {
            redirect_to: None,
            query_params,
        }
    }
}

/// The authorization URL the browser was sent to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthResponse {
    pub provider: OAuthProvider,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn session_json() -> &'static str {
        r#"{
            "access_token": "at",
            "refresh_token": "rt",
            "token_type": "bearer",
            "expires_in": 3600,
            "expires_at": 1700003600,
            "user": {
                "id": "6f1c2b3a-1d2e-4f5a-8b9c-0d1e2f3a4b5c",
                "email": "grower@example.com",
                "aud": "authenticated",
                "app_metadata": { "provider": "email" }
            }
        }"#
    }

    #[test]
    fn test_session_deserializes_provider_payload() {
        let session: Session = serde_json::from_str(session_json()).unwrap();
        assert_eq!(session.user.email.as_deref(), Some("grower@example.com"));
        assert_eq!(session.expires_at, Some(1_700_003_600));
        assert_eq!(session.user.app_metadata["provider"], "email");
        assert!(session.user.user_metadata.is_null());
    }

    #[test]
    fn test_session_expiry_respects_margin() {
        let session: Session = serde_json::from_str(session_json()).unwrap();
        let well_before = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let just_before = Utc.timestamp_opt(1_700_003_595, 0).unwrap();

        assert!(!session.is_expired(well_before, 10));
        assert!(session.is_expired(just_before, 10));
        assert!(!session.is_expired(just_before, 0));
    }

    #[test]
    fn test_session_without_expiry_is_stamped() {
        let mut session: Session = serde_json::from_str(session_json()).unwrap();
        session.expires_at = None;
        assert!(!session.is_expired(Utc::now(), 10));

        let now = Utc.timestamp_opt(1_000, 0).unwrap();
        let stamped = session.with_expiry_from(now);
        assert_eq!(stamped.expires_at, Some(4_600));
    }

    #[test]
    fn test_google_options_force_consent_and_offline_access() {
        let options = OAuthOptions::google_offline_consent();
        assert_eq!(options.query_params.get("prompt").map(String::as_str), Some("consent"));
        assert_eq!(
            options.query_params.get("access_type").map(String::as_str),
            Some("offline")
        );
        assert!(options.redirect_to.is_none());
    }

    #[test]
    fn test_session_event_wire_names() {
        let json = serde_json::to_string(&SessionEvent::TokenRefreshed).unwrap();
        assert_eq!(json, r#""TOKEN_REFRESHED""#);
    }
}
