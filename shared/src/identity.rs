//! The seam between the auth shell and the external identity provider.

use std::fmt;
use std::rc::Rc;

use crate::error::AuthResult;
use crate::models::{
    AuthResponse, Credentials, OAuthOptions, OAuthProvider, OAuthResponse, Session, SessionEvent,
};

/// Listener invoked for every session change the provider observes.
pub type SessionCallback = Rc<dyn Fn(SessionEvent, Option<&Session>)>;

/// Client for an external identity provider.
///
/// Everything runs on the browser's event loop, so futures are not required
/// to be `Send`.
#[allow(async_fn_in_trait)]
pub trait IdentityProvider {
    /// One-shot lookup of the current session.
    async fn get_session(&self) -> AuthResult<Option<Session>>;

    /// Register a persistent listener for login, logout and refresh events.
    fn on_session_change(&self, callback: SessionCallback) -> Subscription;

    async fn sign_up(&self, credentials: Credentials) -> AuthResult<AuthResponse>;

    async fn sign_in_with_password(&self, credentials: Credentials) -> AuthResult<AuthResponse>;

    /// Start a redirect-based OAuth flow.
    async fn sign_in_with_oauth(
        &self,
        provider: OAuthProvider,
        options: OAuthOptions,
    ) -> AuthResult<OAuthResponse>;

    async fn sign_out(&self) -> AuthResult<()>;
}

/// Handle to a registered session listener.
///
/// The listener is released once, either by [`Subscription::unsubscribe`] or
/// when the handle is dropped.
pub struct Subscription {
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    pub fn unsubscribe(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}
