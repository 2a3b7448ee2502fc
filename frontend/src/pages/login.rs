use yew::prelude::*;

use crate::components::auth_form::AuthForm;

#[function_component(Login)]
pub fn login() -> Html {
    html! {
        <div class="container login-page">
            <AuthForm />
        </div>
    }
}
