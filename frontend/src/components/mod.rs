pub mod ai_recommendations;
pub mod auth_form;
pub mod garden_overview;
pub mod header;
pub mod planting_calendar;
pub mod weather_info;
