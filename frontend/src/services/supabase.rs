//! Supabase Auth client backing the session store.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use chrono::Utc;
use gloo::storage::errors::StorageError;
use gloo::storage::{LocalStorage, Storage};
use gloo_net::http::{Request, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use shared::{
    AuthError, AuthResponse, AuthResult, Credentials, IdentityProvider, OAuthOptions,
    OAuthProvider, OAuthResponse, Session, SessionCallback, SessionEvent, Subscription, User,
};
use url::Url;
use wasm_bindgen::JsValue;

use crate::config::AppConfig;

/// Refresh a stored session this many seconds before it actually expires.
const EXPIRY_MARGIN_SECS: i64 = 10;

type Listeners = Rc<RefCell<Vec<(u64, SessionCallback)>>>;

pub struct SupabaseClient {
    config: AppConfig,
    listeners: Listeners,
    next_listener_id: Cell<u64>,
}

impl SupabaseClient {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            listeners: Rc::new(RefCell::new(Vec::new())),
            next_listener_id: Cell::new(0),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.auth_url(), path)
    }

    fn with_api_key(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.config.supabase_anon_key)
            .header("Content-Type", "application/json")
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> AuthResult<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        tracing::debug!(path, "POST auth endpoint");
        let response = self
            .with_api_key(Request::post(&self.endpoint(path)))
            .json(body)
            .map_err(|e| AuthError::Decode(format!("Failed to serialize request: {}", e)))?
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        read_json(response).await
    }

    async fn fetch_user(&self, access_token: &str) -> AuthResult<User> {
        tracing::debug!("GET auth user");
        let response = self
            .with_api_key(Request::get(&self.endpoint("/user")))
            .header("Authorization", &format!("Bearer {}", access_token))
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        read_json(response).await
    }

    async fn refresh(&self, refresh_token: &str) -> AuthResult<Session> {
        self.post_json(
            "/token?grant_type=refresh_token",
            &RefreshRequest { refresh_token },
        )
        .await
    }

    async fn logout(&self, access_token: &str) -> AuthResult<()> {
        tracing::debug!("POST auth logout");
        let response = self
            .with_api_key(Request::post(&self.endpoint("/logout")))
            .header("Authorization", &format!("Bearer {}", access_token))
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        if response.ok() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(api_error(response.status(), &body))
    }

    fn load_stored(&self) -> Option<Session> {
        match LocalStorage::get::<Session>(&self.config.storage_key) {
            Ok(session) => Some(session),
            Err(StorageError::KeyNotFound(_)) => None,
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable stored session");
                self.clear_stored();
                None
            }
        }
    }

    fn persist(&self, session: &Session) -> AuthResult<()> {
        LocalStorage::set(&self.config.storage_key, session)
            .map_err(|e| AuthError::Storage(e.to_string()))
    }

    fn clear_stored(&self) {
        LocalStorage::delete(&self.config.storage_key);
    }

    /// Persist a freshly issued session and tell listeners about it.
    fn accept(&self, session: Session, event: SessionEvent) -> AuthResult<Session> {
        let session = session.with_expiry_from(Utc::now());
        self.persist(&session)?;
        self.emit(event, Some(&session));
        Ok(session)
    }

    fn emit(&self, event: SessionEvent, session: Option<&Session>) {
        let callbacks: Vec<SessionCallback> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, callback)| callback.clone())
            .collect();

        tracing::debug!(?event, listeners = callbacks.len(), "Emitting session event");
        for callback in callbacks {
            callback(event, session);
        }
    }

    /// Finish an implicit OAuth redirect by reading tokens from the URL
    /// fragment.
    async fn session_from_url(&self) -> AuthResult<Option<Session>> {
        let hash = window()?.location().hash().map_err(js_error)?;
        let tokens = match parse_fragment(&hash) {
            Ok(Some(tokens)) => tokens,
            Ok(None) => return Ok(None),
            Err(e) => {
                clear_url_fragment()?;
                return Err(e);
            }
        };

        // Tokens leave the address bar before any request can fail.
        clear_url_fragment()?;
        let user = self.fetch_user(&tokens.access_token).await?;
        self.accept(tokens.into_session(user), SessionEvent::SignedIn)
            .map(Some)
    }
}

impl IdentityProvider for SupabaseClient {
    async fn get_session(&self) -> AuthResult<Option<Session>> {
        if self.config.detect_session_in_url {
            if let Some(session) = self.session_from_url().await? {
                return Ok(Some(session));
            }
        }

        let Some(session) = self.load_stored() else {
            return Ok(None);
        };
        if !session.is_expired(Utc::now(), EXPIRY_MARGIN_SECS) {
            return Ok(Some(session));
        }

        tracing::debug!("Stored session expired, refreshing");
        match self.refresh(&session.refresh_token).await {
            Ok(fresh) => self.accept(fresh, SessionEvent::TokenRefreshed).map(Some),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to refresh stored session");
                if discards_session(&e) {
                    self.clear_stored();
                }
                Err(e)
            }
        }
    }

    fn on_session_change(&self, callback: SessionCallback) -> Subscription {
        let id = self.next_listener_id.get();
        self.next_listener_id.set(id + 1);
        self.listeners.borrow_mut().push((id, callback));

        let listeners = self.listeners.clone();
        Subscription::new(move || {
            listeners.borrow_mut().retain(|(other, _)| *other != id);
        })
    }

    async fn sign_up(&self, credentials: Credentials) -> AuthResult<AuthResponse> {
        let body: serde_json::Value = self.post_json("/signup", &credentials).await?;
        let response = parse_signup(body)?;

        match response.session {
            Some(session) => self
                .accept(session, SessionEvent::SignedIn)
                .map(AuthResponse::from),
            None => Ok(AuthResponse {
                user: response.user,
                session: None,
            }),
        }
    }

    async fn sign_in_with_password(&self, credentials: Credentials) -> AuthResult<AuthResponse> {
        let session: Session = self
            .post_json("/token?grant_type=password", &credentials)
            .await?;

        self.accept(session, SessionEvent::SignedIn)
            .map(AuthResponse::from)
    }

    async fn sign_in_with_oauth(
        &self,
        provider: OAuthProvider,
        mut options: OAuthOptions,
    ) -> AuthResult<OAuthResponse> {
        if options.redirect_to.is_none() {
            options.redirect_to = self.config.oauth_redirect_to.clone();
        }
        let url = authorize_url(&self.config.auth_url(), provider, &options)?;

        tracing::info!(provider = provider.as_str(), "Redirecting to OAuth provider");
        window()?.location().set_href(&url).map_err(js_error)?;

        Ok(OAuthResponse { provider, url })
    }

    async fn sign_out(&self) -> AuthResult<()> {
        if let Some(session) = self.load_stored() {
            match self.logout(&session.access_token).await {
                Ok(()) => {}
                Err(e) if e.is_session_missing() => {
                    tracing::debug!(error = %e, "Remote session already gone");
                }
                Err(e) => return Err(e),
            }
        }

        self.clear_stored();
        self.emit(SessionEvent::SignedOut, None);
        Ok(())
    }
}

/// Whether a failed refresh means the stored session is dead. Only a
/// rejection by the auth API counts; network and decode failures keep the
/// refresh token for the next load.
fn discards_session(error: &AuthError) -> bool {
    matches!(error, AuthError::Api { status: 400..=499, .. })
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

/// Error payloads the auth API returns, across its versions.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
}

async fn read_json<T: DeserializeOwned>(response: Response) -> AuthResult<T> {
    if !response.ok() {
        let body = response.text().await.unwrap_or_default();
        return Err(api_error(response.status(), &body));
    }

    response
        .json()
        .await
        .map_err(|e| AuthError::Decode(e.to_string()))
}

fn api_error(status: u16, body: &str) -> AuthError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error_description.or(b.msg).or(b.message).or(b.error))
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                format!("HTTP error: {}", status)
            } else {
                trimmed.to_string()
            }
        });

    AuthError::Api { status, message }
}

/// Sign-up answers with a session when the project auto-confirms users, and
/// with the bare user while an email confirmation is pending.
fn parse_signup(body: serde_json::Value) -> AuthResult<AuthResponse> {
    let decode = |e: serde_json::Error| AuthError::Decode(e.to_string());

    if body.get("access_token").is_some() {
        let session: Session = serde_json::from_value(body).map_err(decode)?;
        return Ok(AuthResponse::from(session));
    }
    if body.get("id").is_some() {
        let user: User = serde_json::from_value(body).map_err(decode)?;
        return Ok(AuthResponse {
            user: Some(user),
            session: None,
        });
    }
    serde_json::from_value(body).map_err(decode)
}

fn authorize_url(
    auth_url: &str,
    provider: OAuthProvider,
    options: &OAuthOptions,
) -> AuthResult<String> {
    let mut url = Url::parse(&format!("{}/authorize", auth_url))
        .map_err(|e| AuthError::Browser(format!("Invalid auth URL: {}", e)))?;

    {
        let mut query = url.query_pairs_mut();
        query.append_pair("provider", provider.as_str());
        if let Some(redirect_to) = &options.redirect_to {
            query.append_pair("redirect_to", redirect_to);
        }
        for (key, value) in &options.query_params {
            query.append_pair(key, value);
        }
    }

    Ok(url.into())
}

/// Tokens handed back in the URL fragment after an implicit OAuth flow.
#[derive(Debug, PartialEq, Eq)]
struct FragmentTokens {
    access_token: String,
    refresh_token: String,
    token_type: String,
    expires_in: i64,
    expires_at: Option<i64>,
}

impl FragmentTokens {
    fn into_session(self, user: User) -> Session {
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            token_type: self.token_type,
            expires_in: self.expires_in,
            expires_at: self.expires_at,
            user,
        }
    }
}

fn parse_fragment(hash: &str) -> AuthResult<Option<FragmentTokens>> {
    let fragment = hash.strip_prefix('#').unwrap_or(hash);
    if fragment.is_empty() {
        return Ok(None);
    }

    let mut access_token = None;
    let mut refresh_token = None;
    let mut token_type = None;
    let mut expires_in = None;
    let mut expires_at = None;
    let mut error = None;
    let mut error_description = None;
    let mut error_code = None;

    for (key, value) in url::form_urlencoded::parse(fragment.as_bytes()) {
        let value = value.into_owned();
        match key.as_ref() {
            "access_token" => access_token = Some(value),
            "refresh_token" => refresh_token = Some(value),
            "token_type" => token_type = Some(value),
            "expires_in" => expires_in = value.parse::<i64>().ok(),
            "expires_at" => expires_at = value.parse::<i64>().ok(),
            "error" => error = Some(value),
            "error_description" => error_description = Some(value),
            "error_code" => error_code = value.parse::<u16>().ok(),
            _ => {}
        }
    }

    if let Some(error) = error {
        return Err(AuthError::Api {
            status: error_code.unwrap_or(400),
            message: error_description.unwrap_or(error),
        });
    }

    let (Some(access_token), Some(refresh_token)) = (access_token, refresh_token) else {
        return Ok(None);
    };

    Ok(Some(FragmentTokens {
        access_token,
        refresh_token,
        token_type: token_type.unwrap_or_else(|| "bearer".to_string()),
        expires_in: expires_in.unwrap_or(3600),
        expires_at,
    }))
}

fn window() -> AuthResult<web_sys::Window> {
    web_sys::window().ok_or_else(|| AuthError::Browser("No window available".to_string()))
}

fn js_error(value: JsValue) -> AuthError {
    AuthError::Browser(format!("{:?}", value))
}

fn clear_url_fragment() -> AuthResult<()> {
    let window = window()?;
    let location = window.location();
    let path = format!(
        "{}{}",
        location.pathname().map_err(js_error)?,
        location.search().map_err(js_error)?
    );

    window
        .history()
        .map_err(js_error)?
        .replace_state_with_url(&JsValue::NULL, "", Some(path.as_str()))
        .map_err(js_error)
}


#[cfg(all(test, target_arch = "wasm32"))]
mod browser_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    /// Points at a closed port so every request fails with a network error.
    fn offline_client(storage_key: &str) -> SupabaseClient {
        SupabaseClient::new(AppConfig {
            supabase_url: "http://127.0.0.1:9".to_string(),
            supabase_anon_key: "anon".to_string(),
            oauth_redirect_to: None,
            storage_key: storage_key.to_string(),
            detect_session_in_url: true,
        })
    }

    fn session(expires_at: i64) -> Session {
        serde_json::from_value(serde_json::json!({
            "access_token": "at",
            "refresh_token": "rt",
            "expires_in": 3600,
            "expires_at": expires_at,
            "user": { "id": "6f1c2b3a-1d2e-4f5a-8b9c-0d1e2f3a4b5c" }
        }))
        .unwrap()
    }

    fn record_events(client: &SupabaseClient) -> (Rc<RefCell<Vec<SessionEvent>>>, Subscription) {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        let subscription = client.on_session_change(Rc::new(
            move |event: SessionEvent, _session: Option<&Session>| sink.borrow_mut().push(event),
        ));
        (events, subscription)
    }

    #[wasm_bindgen_test]
    async fn test_valid_stored_session_is_returned() {
        let client = offline_client("test-valid-session");
        let stored = session(Utc::now().timestamp() + 3600);
        client.persist(&stored).unwrap();

        let loaded = client.get_session().await.unwrap();

        assert_eq!(loaded, Some(stored));
        client.clear_stored();
    }

    #[wasm_bindgen_test]
    async fn test_offline_refresh_keeps_stored_session() {
        let client = offline_client("test-offline-refresh");
        let (events, _subscription) = record_events(&client);
        client.persist(&session(Utc::now().timestamp() - 60)).unwrap();

        let result = client.get_session().await;

        assert!(matches!(result, Err(AuthError::Network(_))));
        assert!(client.load_stored().is_some());
        assert!(events.borrow().is_empty());
        client.clear_stored();
    }

    #[wasm_bindgen_test]
    async fn test_fragment_cleared_even_when_user_lookup_fails() {
        let client = offline_client("test-fragment");
        window()
            .unwrap()
            .location()
            .set_hash("access_token=at&refresh_token=rt&expires_in=3600&token_type=bearer")
            .unwrap();

        let result = client.get_session().await;

        assert!(result.is_err());
        let hash = window().unwrap().location().hash().unwrap();
        assert!(hash.is_empty());
    }

    #[wasm_bindgen_test]
    async fn test_sign_out_without_session_emits_signed_out() {
        let client = offline_client("test-sign-out");
        let (events, _subscription) = record_events(&client);

        client.sign_out().await.unwrap();

        assert_eq!(*events.borrow(), vec![SessionEvent::SignedOut]);
        assert!(client.load_stored().is_none());
    }

    #[wasm_bindgen_test]
    async fn test_sign_out_network_failure_keeps_session() {
        let client = offline_client("test-sign-out-offline");
        let (events, _subscription) = record_events(&client);
        client.persist(&session(Utc::now().timestamp() + 3600)).unwrap();

        let result = client.sign_out().await;

        assert!(matches!(result, Err(AuthError::Network(_))));
        assert!(client.load_stored().is_some());
        assert!(events.borrow().is_empty());
        client.clear_stored();
    }
}
