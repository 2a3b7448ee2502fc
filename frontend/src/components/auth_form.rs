use web_sys::HtmlInputElement;
use yew::prelude::*;
use yew_router::prelude::*;

use crate::contexts::auth::use_auth;
use crate::router::Route;

#[derive(Clone, Copy, PartialEq)]
enum Mode {
    SignIn,
    SignUp,
}

#[function_component(AuthForm)]
pub fn auth_form() -> Html {
    let auth = use_auth();
    let navigator = use_navigator();
    let mode = use_state(|| Mode::SignIn);
    let email = use_state(String::new);
    let password = use_state(String::new);
    let busy = use_state(|| false);
    let error = use_state(|| None::<String>);
    let notice = use_state(|| None::<String>);

    let on_email = {
        let email = email.clone();
        Callback::from(move |e: InputEvent| {
            email.set(e.target_unchecked_into::<HtmlInputElement>().value());
        })
    };

    let on_password = {
        let password = password.clone();
        Callback::from(move |e: InputEvent| {
            password.set(e.target_unchecked_into::<HtmlInputElement>().value());
        })
    };

    let on_toggle_mode = {
        let mode = mode.clone();
        let error = error.clone();
        let notice = notice.clone();
        Callback::from(move |_: MouseEvent| {
            error.set(None);
            notice.set(None);
            mode.set(match *mode {
                Mode::SignIn => Mode::SignUp,
                Mode::SignUp => Mode::SignIn,
            });
        })
    };

    let on_submit = {
        let auth = auth.clone();
        let mode = *mode;
        let email = email.clone();
        let password = password.clone();
        let busy = busy.clone();
        let error = error.clone();
        let notice = notice.clone();
        let navigator = navigator.clone();

        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let Some(auth) = auth.clone() else {
                return;
            };
            let email = (*email).clone();
            let password = (*password).clone();
            let busy = busy.clone();
            let error = error.clone();
            let notice = notice.clone();
            let navigator = navigator.clone();

            busy.set(true);
            error.set(None);
            notice.set(None);

            wasm_bindgen_futures::spawn_local(async move {
                let result = match mode {
                    Mode::SignIn => auth.sign_in(email, password).await,
                    Mode::SignUp => auth.sign_up(email, password).await,
                };
                busy.set(false);

                match result {
                    Ok(response) if response.session.is_some() => {
                        if let Some(navigator) = navigator {
                            navigator.push(&Route::Dashboard);
                        }
                    }
                    Ok(_) => {
                        notice.set(Some("Check your email to confirm your account.".to_string()));
                    }
                    Err(e) => {
                        tracing::warn!("Authentication failed: {}", e);
                        error.set(Some(e.to_string()));
                    }
                }
            });
        })
    };

    let on_google = {
        let auth = auth.clone();
        let error = error.clone();
        Callback::from(move |_: MouseEvent| {
            let Some(auth) = auth.clone() else {
                return;
            };
            let error = error.clone();
            wasm_bindgen_futures::spawn_local(async move {
                if let Err(e) = auth.sign_in_with_google().await {
                    tracing::warn!("Google sign-in failed: {}", e);
                    error.set(Some(e.to_string()));
                }
            });
        })
    };

    let (title, submit_label, toggle_label) = match *mode {
        Mode::SignIn => ("Sign in", "Sign in", "Need an account? Sign up"),
        Mode::SignUp => ("Create account", "Sign up", "Already have an account? Sign in"),
    };

    html! {
        <div class="auth-form">
            <h2>{ title }</h2>
            if let Some(message) = (*error).clone() {
                <div class="auth-error">{ message }</div>
            }
            if let Some(message) = (*notice).clone() {
                <div class="auth-notice">{ message }</div>
            }
            <form onsubmit={on_submit}>
                <input
                    type="email"
                    placeholder="Email"
                    value={(*email).clone()}
                    oninput={on_email}
                    required=true
                />
                <input
                    type="password"
                    placeholder="Password"
                    value={(*password).clone()}
                    oninput={on_password}
                    required=true
                />
                <button type="submit" class="btn btn-primary" disabled={*busy}>
                    { submit_label }
                </button>
            </form>
            <button class="btn btn-secondary" onclick={on_google} disabled={*busy}>
                { "Continue with Google" }
            </button>
            <button class="btn btn-link" onclick={on_toggle_mode}>{ toggle_label }</button>
        </div>
    }
}
