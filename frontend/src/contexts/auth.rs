//! Session state for the component tree.
//!
//! [`AuthProvider`] owns one [`SessionStore`] for as long as it is mounted and
//! hands an [`AuthContext`] to its children once the initial session lookup
//! has finished.

use std::future::Future;
use std::rc::Rc;

use shared::{AuthResponse, AuthResult, AuthSnapshot, OAuthResponse, SessionStore, User};
use yew::prelude::*;

use crate::config::AppConfig;
use crate::services::supabase::SupabaseClient;

pub type AuthStore = SessionStore<SupabaseClient>;

/// Current user plus the auth actions. A new value is provided on every
/// session change.
#[derive(Clone)]
pub struct AuthContext {
    snapshot: AuthSnapshot,
    store: Rc<AuthStore>,
}

impl PartialEq for AuthContext {
    fn eq(&self, other: &Self) -> bool {
        self.snapshot == other.snapshot && Rc::ptr_eq(&self.store, &other.store)
    }
}

impl AuthContext {
    pub fn user(&self) -> Option<&User> {
        self.snapshot.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.snapshot.is_authenticated()
    }

    pub fn sign_up(
        &self,
        email: String,
        password: String,
    ) -> impl Future<Output = AuthResult<AuthResponse>> {
        let store = self.store.clone();
        async move { store.sign_up(&email, &password).await }
    }

    pub fn sign_in(
        &self,
        email: String,
        password: String,
    ) -> impl Future<Output = AuthResult<AuthResponse>> {
        let store = self.store.clone();
        async move { store.sign_in(&email, &password).await }
    }

    pub fn sign_in_with_google(&self) -> impl Future<Output = AuthResult<OAuthResponse>> {
        let store = self.store.clone();
        async move { store.sign_in_with_google().await }
    }

    pub fn sign_out(&self) -> impl Future<Output = AuthResult<()>> {
        let store = self.store.clone();
        async move { store.sign_out().await }
    }
}

#[derive(Properties, PartialEq)]
pub struct AuthProviderProps {
    pub config: AppConfig,
    #[prop_or_default]
    pub children: Html,
}

#[function_component(AuthProvider)]
pub fn auth_provider(props: &AuthProviderProps) -> Html {
    let store = use_memo(props.config.clone(), |config| {
        SessionStore::new(Rc::new(SupabaseClient::new(config.clone())))
    });
    let snapshot = use_state_eq(|| store.snapshot());

    {
        let store = store.clone();
        let snapshot = snapshot.clone();

        use_effect_with(props.config.clone(), move |_| {
            let watcher = snapshot.clone();
            store.watch(move |next| watcher.set(next.clone()));
            snapshot.set(store.snapshot());

            let loader = store.clone();
            wasm_bindgen_futures::spawn_local(async move {
                loader.load_initial_session().await;
            });

            move || store.dispose()
        });
    }

    if !snapshot.is_ready() {
        return html! {};
    }

    let context = AuthContext {
        snapshot: (*snapshot).clone(),
        store: store.clone(),
    };

    html! {
        <ContextProvider<AuthContext> context={context}>
            { props.children.clone() }
        </ContextProvider<AuthContext>>
    }
}

/// The auth context of the nearest [`AuthProvider`], if any.
#[hook]
pub fn use_auth() -> Option<AuthContext> {
    use_context::<AuthContext>()
}
