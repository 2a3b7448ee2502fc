use yew::prelude::*;

#[function_component(AIRecommendations)]
pub fn ai_recommendations() -> Html {
    html! {
        <section class="panel panel-wide">
            <h2>{ "AI Recommendations" }</h2>
            <p>{ "Personalised tips for your plants will appear here." }</p>
        </section>
    }
}
