use shared::routing::{resolve_for_user, AppPath, RouteDecision, View};
use shared::User;
use yew::prelude::*;
use yew_router::prelude::*;

use crate::contexts::auth::use_auth;
use crate::pages::{dashboard::Dashboard, login::Login};

#[derive(Debug, Clone, Copy, Routable, PartialEq)]
pub enum Route {
    #[at("/")]
    Root,
    #[at("/login")]
    Login,
    #[at("/dashboard")]
    Dashboard,
}

impl From<Route> for AppPath {
    fn from(route: Route) -> Self {
        match route {
            Route::Root => AppPath::Root,
            Route::Login => AppPath::Login,
            Route::Dashboard => AppPath::Dashboard,
        }
    }
}

impl From<AppPath> for Route {
    fn from(path: AppPath) -> Self {
        match path {
            AppPath::Root => Route::Root,
            AppPath::Login => Route::Login,
            AppPath::Dashboard => Route::Dashboard,
        }
    }
}

pub fn switch(route: Route) -> Html {
    html! { <RouteOutlet {route} /> }
}

#[derive(Properties, PartialEq)]
struct RouteOutletProps {
    route: Route,
}

fn decide(route: Route, user: Option<&User>) -> RouteDecision {
    resolve_for_user(route.into(), user)
}

/// Mounts whatever the route table decides for the current session.
#[function_component(RouteOutlet)]
fn route_outlet(props: &RouteOutletProps) -> Html {
    let auth = use_auth();
    if auth.is_none() {
        tracing::warn!("Route rendered outside AuthProvider; treating as signed out");
    }
    let user = auth.as_ref().and_then(|a| a.user());

    match decide(props.route, user) {
        RouteDecision::Render(View::LoginForm) => html! { <Login /> },
        RouteDecision::Render(View::Dashboard) => html! { <Dashboard /> },
        RouteDecision::Redirect(path) => {
            tracing::debug!(from = %AppPath::from(props.route), to = %path, "Redirecting");
            html! { <Redirect<Route> to={Route::from(path)} /> }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routes_match_path_table() {
        for path in AppPath::ALL {
            let route = Route::from(path);
            assert_eq!(route.to_path(), path.as_str());
            assert_eq!(AppPath::from(route), path);
        }
    }

    fn user() -> User {
        serde_json::from_value(serde_json::json!({
            "id": "6f1c2b3a-1d2e-4f5a-8b9c-0d1e2f3a4b5c",
            "email": "grower@example.com"
        }))
        .unwrap()
    }

    #[test]
    fn test_outlet_without_user() {
        assert_eq!(
            decide(Route::Dashboard, None),
            RouteDecision::Redirect(AppPath::Login)
        );
        assert_eq!(decide(Route::Login, None), RouteDecision::Render(View::LoginForm));
        assert_eq!(decide(Route::Root, None), RouteDecision::Redirect(AppPath::Dashboard));
    }

    #[test]
    fn test_outlet_with_user() {
        let user = user();
        assert_eq!(
            decide(Route::Dashboard, Some(&user)),
            RouteDecision::Render(View::Dashboard)
        );
        assert_eq!(
            decide(Route::Login, Some(&user)),
            RouteDecision::Render(View::LoginForm)
        );
        assert_eq!(
            decide(Route::Root, Some(&user)),
            RouteDecision::Redirect(AppPath::Dashboard)
        );
    }

    #[test]
    fn test_recognize_paths() {
        assert_eq!(Route::recognize("/"), Some(Route::Root));
        assert_eq!(Route::recognize("/login"), Some(Route::Login));
        assert_eq!(Route::recognize("/dashboard"), Some(Route::Dashboard));
        assert_eq!(Route::recognize("/settings"), None);
    }
}
