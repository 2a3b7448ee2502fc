//! Route table and guard decisions for the application shell.
//!
//! The router asks [`resolve_route`] what to do with a path instead of
//! rendering redirect elements itself.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::RoutingError;
use crate::models::User;

/// Upper bound on redirects followed by [`navigate`].
pub const MAX_REDIRECTS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppPath {
    Login,
    Dashboard,
    Root,
}

impl AppPath {
    pub const ALL: [AppPath; 3] = [AppPath::Login, AppPath::Dashboard, AppPath::Root];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Dashboard => "/dashboard",
            Self::Root => "/",
        }
    }

    /// Match a URL path against the static table. Paths outside the table
    /// have no route.
    pub fn parse(path: &str) -> Option<Self> {
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Some(Self::Root),
            "/login" => Some(Self::Login),
            "/dashboard" => Some(Self::Dashboard),
            _ => None,
        }
    }
}

impl fmt::Display for AppPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level views the router can mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum View {
    LoginForm,
    Dashboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Render(View),
    Redirect(AppPath),
}

/// Outcome of the protected-route guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    Redirect(AppPath),
}

/// Let a signed-in user through, send everyone else to the login form.
pub fn guard(user: Option<&User>) -> Access {
    match user {
        Some(_) => Access::Granted,
        None => Access::Redirect(AppPath::Login),
    }
}

pub fn resolve_route(path: AppPath, is_authenticated: bool) -> RouteDecision {
    match path {
        AppPath::Login => RouteDecision::Render(View::LoginForm),
        AppPath::Dashboard => {
            if is_authenticated {
                RouteDecision::Render(View::Dashboard)
            } else {
                RouteDecision::Redirect(AppPath::Login)
            }
        }
        AppPath::Root => RouteDecision::Redirect(AppPath::Dashboard),
    }
}

/// Route decision for a guarded path, driven by the current user.
pub fn resolve_for_user(path: AppPath, user: Option<&User>) -> RouteDecision {
    resolve_route(path, guard(user) == Access::Granted)
}

/// Where a navigation ends up after following every redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub view: View,
    /// Paths redirected to, in order. Empty when the first path rendered.
    pub redirects: Vec<AppPath>,
}

impl Navigation {
    pub fn final_path(&self, requested: AppPath) -> AppPath {
        self.redirects.last().copied().unwrap_or(requested)
    }
}

pub fn navigate(path: AppPath, is_authenticated: bool) -> Result<Navigation, RoutingError> {
    let mut current = path;
    let mut redirects = Vec::new();

    loop {
        match resolve_route(current, is_authenticated) {
            RouteDecision::Render(view) => return Ok(Navigation { view, redirects }),
            RouteDecision::Redirect(next) => {
                if redirects.len() == MAX_REDIRECTS {
                    return Err(RoutingError::RedirectLoop { path });
                }
                redirects.push(next);
                current = next;
            }
        }
    }
}
