use chrono::{DateTime, Utc};
use rocket::http::{ContentType, Status};
use rocket::request::Request;
use rocket::response::Responder;
use rocket::{response, Response};
use rocket::serde::{Deserialize, Serialize};
use std::io::Cursor;

/// A channel reference after its shape has been recognised, before any lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelRef {
    Id(String),
    Username(String),
    Handle(String),
}

/// One entry of a list-style endpoint (uploads playlist or search results).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListedVideo {
    pub video_id: String,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub id: String,
    pub title: String,
    pub thumbnail_url: String,
    pub views: u64,
    pub published_at: Option<DateTime<Utc>>,
    pub channel_id: String,
    pub channel_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelStats {
    pub channel_id: String,
    pub subscribers: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Grade {
    Great,
    Good,
    Bad,
    Zero,
}

impl Grade {
    /// Position used when sorting by grade, best first.
    pub fn rank(self) -> u8 {
        match self {
            Grade::Great => 0,
            Grade::Good => 1,
            Grade::Bad => 2,
            Grade::Zero => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RatioBucket {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationBucket {
    #[default]
    Any,
    Short,
    Long,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecencyWindow {
    #[default]
    All,
    Last30Days,
    Last90Days,
    OlderThan150Days,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchOrder {
    #[default]
    Relevance,
    Date,
    ViewCount,
}

/// Keyword search parameters. The result cap lives on [`AnalysisRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCriteria {
    pub keyword: String,
    #[serde(default)]
    pub region_code: Option<String>,
    #[serde(default)]
    pub duration: DurationBucket,
    #[serde(default)]
    pub recency: RecencyWindow,
    #[serde(default)]
    pub order: SearchOrder,
}

/// Fully resolved search call, with the recency window turned into timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub keyword: String,
    pub region_code: Option<String>,
    pub duration: DurationBucket,
    pub published_after: Option<String>,
    pub published_before: Option<String>,
    pub order: SearchOrder,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortCriterion {
    ViewsAsc,
    #[default]
    ViewsDesc,
    SubscribersAsc,
    SubscribersDesc,
    PublishedAsc,
    PublishedDesc,
    Grade,
}

/// Which set of videos the reference average is taken over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceBaseline {
    ChannelCorpus,
    ResultSet,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisSource {
    Channel { reference: String },
    Search(SearchCriteria),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub source: AnalysisSource,
    #[serde(default)]
    pub cap: Option<usize>,
    #[serde(default)]
    pub sort: SortCriterion,
    #[serde(default)]
    pub ratio_filter: Option<RatioBucket>,
    #[serde(default)]
    pub baseline: Option<ReferenceBaseline>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradedVideo {
    #[serde(flatten)]
    pub video: Video,
    pub subscribers: u64,
    pub grade: Grade,
    pub star: bool,
    pub ratio: f64,
    pub ratio_bucket: RatioBucket,
    pub published_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub channel_id: Option<String>,
    pub channel_subscribers: Option<u64>,
    pub baseline: ReferenceBaseline,
    pub reference_average: f64,
    pub baseline_size: usize,
    pub videos: Vec<GradedVideo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub video_id: String,
    /// Languages asked for, most preferred first.
    pub language_priority: Vec<String>,
    pub segments: Vec<TranscriptSegment>,
}

impl Transcript {
    pub fn text(&self) -> String {
        self.segments
            .iter()
            .map(|segment| segment.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn file_name(&self) -> String {
        format!("{}.txt", self.video_id)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub cached_entries: usize,
    pub default_cap: usize,
    pub transcript_languages: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(skip, default = "default_error_status")]
    pub status: Status,
    pub error: String,
    pub message: String,
}

fn default_error_status() -> Status {
    Status::BadRequest
}

impl<'r> Responder<'r, 'static> for ErrorResponse {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let json = serde_json::to_string(&self).map_err(|_| Status::InternalServerError)?;
        Response::build()
            .status(self.status)
            .header(ContentType::JSON)
            .sized_body(json.len(), Cursor::new(json))
            .ok()
    }
}
