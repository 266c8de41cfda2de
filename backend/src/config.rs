use crate::services::analyzer::AnalysisSession;
use crate::services::provider::YouTubeDataApi;
use crate::services::transcript::YtTranscriptSource;
use crate::AppState;
use anyhow::{Context, Result};
use env_logger::Builder;
use log::{info, LevelFilter};
use rocket::http::Method;
use rocket_cors::{AllowedHeaders, AllowedOrigins, CorsOptions};
use std::env;
use std::sync::Arc;

pub const DEFAULT_API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";
pub const DEFAULT_RESULT_CAP: usize = 200;
pub const MAX_RESULT_CAP: usize = 1000;

/// Settings fixed at the start of a session and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerConfig {
    pub api_key: String,
    pub api_base_url: String,
    pub transcript_languages: Vec<String>,
    pub default_cap: usize,
    pub max_cap: usize,
    pub cors_allowed_origin: String,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            transcript_languages: vec!["en".to_string()],
            default_cap: DEFAULT_RESULT_CAP,
            max_cap: MAX_RESULT_CAP,
            cors_allowed_origin: "http://localhost:8080".to_string(),
        }
    }
}

impl AnalyzerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_key = lookup("YOUTUBE_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .context("YOUTUBE_API_KEY environment variable must be set")?;

        let transcript_languages = lookup("TRANSCRIPT_LANGUAGES")
            .map(|raw| parse_language_list(&raw))
            .filter(|languages| !languages.is_empty())
            .unwrap_or(defaults.transcript_languages);

        let max_cap = match lookup("MAX_RESULT_CAP") {
            Some(raw) => raw
                .parse::<usize>()
                .with_context(|| format!("MAX_RESULT_CAP is not a number: {raw}"))?,
            None => defaults.max_cap,
        };

        let default_cap = match lookup("DEFAULT_RESULT_CAP") {
            Some(raw) => raw
                .parse::<usize>()
                .with_context(|| format!("DEFAULT_RESULT_CAP is not a number: {raw}"))?,
            None => defaults.default_cap,
        };

        Ok(Self {
            api_key: api_key.trim().to_string(),
            api_base_url: lookup("YOUTUBE_API_BASE_URL").unwrap_or(defaults.api_base_url),
            transcript_languages,
            default_cap: default_cap.min(max_cap),
            max_cap,
            cors_allowed_origin: lookup("CORS_ALLOWED_ORIGIN")
                .unwrap_or(defaults.cors_allowed_origin),
        })
    }
}

pub fn parse_language_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(String::from)
        .collect()
}

pub fn init_logger() {
    Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();
    info!("Starting channel analyzer backend...");
}

pub fn load_environment() {
    dotenv::dotenv().ok();
}

pub fn create_app_state(config: AnalyzerConfig) -> Result<AppState> {
    let provider = YouTubeDataApi::new(config.api_key.clone(), config.api_base_url.clone())?;
    info!("Using YouTube Data API at: {}", config.api_base_url);

    let session = AnalysisSession::new(
        Arc::new(provider),
        Arc::new(YtTranscriptSource),
        config.clone(),
    );

    Ok(AppState { session })
}

pub fn create_cors(config: &AnalyzerConfig) -> Result<rocket_cors::Cors> {
    let cors = CorsOptions::default()
        .allowed_origins(AllowedOrigins::some_exact(&[config.cors_allowed_origin.as_str()]))
        .allowed_methods(
            vec![Method::Get, Method::Post, Method::Options]
                .into_iter()
                .map(From::from)
                .collect(),
        )
        .allowed_headers(AllowedHeaders::some(&["Accept", "Content-Type"]))
        .allow_credentials(true)
        .to_cors()
        .map_err(|e| anyhow::anyhow!("Failed to create CORS options: {}", e))?;

    Ok(cors)
}
