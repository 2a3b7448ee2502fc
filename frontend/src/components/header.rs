use yew::prelude::*;

use crate::contexts::auth::use_auth;

#[function_component(Header)]
pub fn header() -> Html {
    let auth = use_auth();
    let email = auth
        .as_ref()
        .and_then(|a| a.user())
        .and_then(|u| u.email.clone());

    // Local state is left alone; the provider's SignedOut event clears the
    // user and the router sends us to /login.
    let on_sign_out = Callback::from(move |_: MouseEvent| {
        let Some(auth) = auth.clone() else {
            return;
        };
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = auth.sign_out().await {
                tracing::error!("Failed to sign out: {}", e);
            }
        });
    });

    html! {
        <header class="header">
            <div class="container">
                <h1>{ "My Balcony Garden" }</h1>
                <nav>
                    if let Some(email) = email {
                        <span class="header-user">{ email }</span>
                        { " | " }
                    }
                    <button class="btn btn-secondary" onclick={on_sign_out}>{ "Sign out" }</button>
                </nav>
            </div>
        </header>
    }
}
