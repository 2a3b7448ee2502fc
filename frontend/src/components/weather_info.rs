use yew::prelude::*;

#[function_component(WeatherInfo)]
pub fn weather_info() -> Html {
    html! {
        <section class="panel">
            <h2>{ "Weather" }</h2>
            <p>{ "Local conditions for your balcony will appear here." }</p>
        </section>
    }
}
