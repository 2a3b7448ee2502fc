use yew::prelude::*;

#[function_component(GardenOverview)]
pub fn garden_overview() -> Html {
    html! {
        <section class="panel">
            <h2>{ "Garden Overview" }</h2>
            <div class="empty-state">
                <p>{ "No plants yet. Add your first plant to start tracking your garden." }</p>
            </div>
        </section>
    }
}
