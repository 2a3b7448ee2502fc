use yew::prelude::*;

#[function_component(PlantingCalendar)]
pub fn planting_calendar() -> Html {
    html! {
        <section class="panel">
            <h2>{ "Planting Calendar" }</h2>
            <p>{ "Upcoming sowing and harvest dates will appear here." }</p>
        </section>
    }
}
