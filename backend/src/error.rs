use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("unsupported channel reference format: {0}")]
    UnsupportedFormat(String),

    #[error("no channel found for {0}")]
    NotFound(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("provider quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("provider resource not found: {0}")]
    NotFound(String),

    #[error("transient provider failure: {0}")]
    Transient(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        ProviderError::Transient(e.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranscriptError {
    #[error("transcript unavailable for video {video_id}: {reason}")]
    Unavailable { video_id: String, reason: String },
}

/// Everything that can abort one aggregation request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalyzerError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl AnalyzerError {
    pub fn code_str(&self) -> &'static str {
        match self {
            AnalyzerError::Resolution(ResolutionError::UnsupportedFormat(_)) => "unsupported_format",
            AnalyzerError::Resolution(ResolutionError::NotFound(_)) => "channel_not_found",
            AnalyzerError::Provider(ProviderError::QuotaExceeded(_)) => "quota_exceeded",
            AnalyzerError::Provider(ProviderError::NotFound(_)) => "not_found",
            AnalyzerError::Provider(ProviderError::Transient(_)) => "upstream_error",
            AnalyzerError::InvalidRequest(_) => "invalid_request",
        }
    }
}
