//! Session and routing core of the garden tracker's web shell.
//!
//! Nothing here touches the browser: the identity provider is reached
//! through [`identity::IdentityProvider`], and the UI consumes
//! [`session_store::SessionStore`] snapshots and [`routing`] decisions.

pub mod error;
pub mod identity;
pub mod models;
pub mod routing;
pub mod session_store;

pub use error::{AuthError, AuthResult, RoutingError};
pub use identity::{IdentityProvider, SessionCallback, Subscription};
pub use models::{
    AuthResponse, Credentials, OAuthOptions, OAuthProvider, OAuthResponse, Session, SessionEvent,
    User,
};
pub use routing::{guard, navigate, resolve_route, Access, AppPath, Navigation, RouteDecision, View};
pub use session_store::{AuthSnapshot, SessionStore};
