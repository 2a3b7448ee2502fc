use yew::prelude::*;

use crate::components::{
    ai_recommendations::AIRecommendations, garden_overview::GardenOverview, header::Header,
    planting_calendar::PlantingCalendar, weather_info::WeatherInfo,
};

/// The panels are independent; nothing is passed between them.
#[function_component(Dashboard)]
pub fn dashboard() -> Html {
    html! {
        <div class="dashboard">
            <Header />
            <main class="container">
                <div class="panel-grid">
                    <GardenOverview />
                    <WeatherInfo />
                    <PlantingCalendar />
                </div>
                <AIRecommendations />
            </main>
        </div>
    }
}
