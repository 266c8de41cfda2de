use channel_analyzer::build_rocket;
use channel_analyzer::config::{
    create_app_state, create_cors, init_logger, load_environment, AnalyzerConfig,
};
use log::info;

#[rocket::main]
async fn main() -> anyhow::Result<()> {
    load_environment();
    init_logger();

    let config = AnalyzerConfig::from_env()?;
    let cors = create_cors(&config)?;
    let state = create_app_state(config)?;

    let _rocket = build_rocket(state)
        .attach(cors)
        .launch()
        .await
        .map_err(|e| anyhow::anyhow!("Rocket failed: {e}"))?;

    info!("Channel analyzer shut down.");
    Ok(())
}
