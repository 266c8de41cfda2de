use crate::error::{AnalyzerError, ProviderError, ResolutionError};
use crate::models::{AnalysisReport, AnalysisRequest, ErrorResponse, StatusResponse};
use crate::AppState;
use log::{error, info};
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{get, post, State};

pub fn analyzer_error_response(e: &AnalyzerError) -> ErrorResponse {
    let status = match e {
        AnalyzerError::Resolution(ResolutionError::UnsupportedFormat(_))
        | AnalyzerError::InvalidRequest(_) => Status::BadRequest,
        AnalyzerError::Resolution(ResolutionError::NotFound(_))
        | AnalyzerError::Provider(ProviderError::NotFound(_)) => Status::NotFound,
        AnalyzerError::Provider(ProviderError::QuotaExceeded(_)) => Status::TooManyRequests,
        AnalyzerError::Provider(ProviderError::Transient(_)) => Status::BadGateway,
    };

    ErrorResponse {
        status,
        error: e.code_str().to_string(),
        message: e.to_string(),
    }
}

#[post("/analyze", data = "<request>")]
pub async fn analyze(
    request: Json<AnalysisRequest>,
    state: &State<AppState>,
) -> Result<Json<AnalysisReport>, ErrorResponse> {
    let request = request.into_inner();
    info!("Analysis requested: {:?}", request.source);

    match state.session.analyze(&request).await {
        Ok(report) => Ok(Json(report)),
        Err(e) => {
            error!("Analysis failed: {e}");
            Err(analyzer_error_response(&e))
        }
    }
}

#[get("/status")]
pub async fn status(state: &State<AppState>) -> Json<StatusResponse> {
    let config = state.session.config();
    Json(StatusResponse {
        cached_entries: state.session.cached_entries(),
        default_cap: config.default_cap,
        transcript_languages: config.transcript_languages.clone(),
    })
}
