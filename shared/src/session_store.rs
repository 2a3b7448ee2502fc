//! Reactive holder of the current user.
//!
//! A [`SessionStore`] owns one session-change subscription on an
//! [`IdentityProvider`] from construction until [`SessionStore::dispose`].
//! Every notification it receives, from the initial lookup or from a change
//! event, overwrites the user in arrival order and is published to watchers.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::error::AuthResult;
use crate::identity::{IdentityProvider, Subscription};
use crate::models::{
    AuthResponse, Credentials, OAuthOptions, OAuthProvider, OAuthResponse, Session, SessionEvent,
    User,
};

/// What the rest of the application sees of the session.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthSnapshot {
    pub user: Option<User>,
    /// True until the initial session lookup has resolved.
    pub loading: bool,
}

impl AuthSnapshot {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Whether dependents may render. Closed until the initial lookup
    /// resolves so a signed-in user never sees the signed-out view first.
    pub fn is_ready(&self) -> bool {
        !self.loading
    }
}

impl Default for AuthSnapshot {
    fn default() -> Self {
        Self {
            user: None,
            loading: true,
        }
    }
}

pub type SnapshotCallback = Rc<dyn Fn(&AuthSnapshot)>;

#[derive(Default)]
struct StoreState {
    snapshot: AuthSnapshot,
    disposed: bool,
    watchers: Vec<SnapshotCallback>,
}

/// Record a new user and publish the snapshot. Returns false once the store
/// has been disposed.
fn apply(state: &RefCell<StoreState>, user: Option<User>, resolves_loading: bool) -> bool {
    let (snapshot, watchers) = {
        let mut state = state.borrow_mut();
        if state.disposed {
            return false;
        }
        state.snapshot.user = user;
        if resolves_loading {
            state.snapshot.loading = false;
        }
        (state.snapshot.clone(), state.watchers.clone())
    };

    // Watchers run outside the borrow so they may read the store.
    for watcher in watchers {
        watcher(&snapshot);
    }
    true
}

pub struct SessionStore<P: IdentityProvider> {
    provider: Rc<P>,
    state: Rc<RefCell<StoreState>>,
    subscription: RefCell<Option<Subscription>>,
    initial_requested: Cell<bool>,
}

impl<P: IdentityProvider> SessionStore<P> {
    /// Create the store and subscribe to the provider's session changes.
    pub fn new(provider: Rc<P>) -> Self {
        let state = Rc::new(RefCell::new(StoreState::default()));

        let weak_state = Rc::downgrade(&state);
        let subscription = provider.on_session_change(Rc::new(
            move |event: SessionEvent, session: Option<&Session>| {
                let Some(state) = weak_state.upgrade() else {
                    return;
                };
                tracing::debug!(?event, has_session = session.is_some(), "Session changed");
                if !apply(&state, session.map(|s| s.user.clone()), false) {
                    tracing::debug!(?event, "Ignoring session change after dispose");
                }
            },
        ));

        Self {
            provider,
            state,
            subscription: RefCell::new(Some(subscription)),
            initial_requested: Cell::new(false),
        }
    }

    /// Ask the provider for the current session and leave the loading state.
    ///
    /// Only the first call reaches the provider. A lookup that fails counts
    /// as "no session"; one that resolves after [`dispose`](Self::dispose)
    /// is dropped.
    pub async fn load_initial_session(&self) {
        if self.initial_requested.replace(true) {
            tracing::debug!("Initial session already requested");
            return;
        }

        let user = match self.provider.get_session().await {
            Ok(session) => session.map(|s| s.user),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load current session");
                None
            }
        };

        if !apply(&self.state, user, true) {
            tracing::debug!("Initial session resolved after dispose; ignoring");
        }
    }

    /// Register a callback for every published snapshot.
    pub fn watch(&self, callback: impl Fn(&AuthSnapshot) + 'static) {
        let mut state = self.state.borrow_mut();
        if !state.disposed {
            state.watchers.push(Rc::new(callback));
        }
    }

    pub fn snapshot(&self) -> AuthSnapshot {
        self.state.borrow().snapshot.clone()
    }

    pub fn user(&self) -> Option<User> {
        self.state.borrow().snapshot.user.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().snapshot.loading
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().snapshot.is_authenticated()
    }

    pub fn is_disposed(&self) -> bool {
        self.state.borrow().disposed
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> AuthResult<AuthResponse> {
        self.provider.sign_up(Credentials::new(email, password)).await
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> AuthResult<AuthResponse> {
        self.provider
            .sign_in_with_password(Credentials::new(email, password))
            .await
    }

    pub async fn sign_in_with_google(&self) -> AuthResult<OAuthResponse> {
        self.provider
            .sign_in_with_oauth(OAuthProvider::Google, OAuthOptions::google_offline_consent())
            .await
    }

    /// End the remote session. The user is cleared by the provider's
    /// follow-up `SignedOut` event, not by this call.
    pub async fn sign_out(&self) -> AuthResult<()> {
        self.provider.sign_out().await
    }

    /// Release the session subscription and detach watchers. Safe to call
    /// more than once.
    pub fn dispose(&self) {
        let Some(subscription) = self.subscription.borrow_mut().take() else {
            return;
        };

        {
            let mut state = self.state.borrow_mut();
            state.disposed = true;
            state.watchers.clear();
        }

        subscription.unsubscribe();
        tracing::info!("Session store disposed");
    }
}

impl<P: IdentityProvider> Drop for SessionStore<P> {
    fn drop(&mut self) {
        self.dispose();
    }
}
