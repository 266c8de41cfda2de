pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

use rocket::{routes, Build, Rocket};
use services::analyzer::AnalysisSession;

pub struct AppState {
    pub session: AnalysisSession,
}

pub fn build_rocket(state: AppState) -> Rocket<Build> {
    rocket::build().manage(state).mount(
        "/api",
        routes![api::analyze, api::status, api::get_transcript],
    )
}
