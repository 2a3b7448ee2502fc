mod components;
mod config;
mod contexts;
mod pages;
mod router;
mod services;

use yew::prelude::*;
use yew_router::BrowserRouter;

use crate::config::AppConfig;
use crate::contexts::auth::AuthProvider;
use crate::router::{switch, Route};

#[derive(Properties, PartialEq)]
struct AppProps {
    config: AppConfig,
}

#[function_component(App)]
fn app(props: &AppProps) -> Html {
    html! {
        <AuthProvider config={props.config.clone()}>
            <BrowserRouter>
                <div id="app">
                    <yew_router::Switch<Route> render={switch} />
                </div>
            </BrowserRouter>
        </AuthProvider>
    }
}

fn main() {
    // Initialize tracing
    tracing_wasm::set_as_global_default();

    let config = match AppConfig::from_build_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            return;
        }
    };
    tracing::info!(supabase_url = %config.supabase_url, "Starting garden tracker");

    yew::Renderer::<App>::with_props(AppProps { config }).render();
}
