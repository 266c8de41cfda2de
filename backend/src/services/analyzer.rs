use crate::config::AnalyzerConfig;
use crate::error::{AnalyzerError, TranscriptError};
use crate::models::{
    AnalysisReport, AnalysisRequest, AnalysisSource, GradedVideo, ListedVideo, RecencyWindow,
    ReferenceBaseline, SearchCriteria, SearchQuery, Transcript, Video,
};
use crate::services::cache::CachedProvider;
use crate::services::enrichment::{enrich, fetch_subscribers};
use crate::services::grading::{grade, is_star, ratio_bucket, reference_average, view_ratio};
use crate::services::paginator::{fetch_channel_uploads, fetch_search_results};
use crate::services::provider::VideoProvider;
use crate::services::resolver::resolve;
use crate::services::sorting::{filter_by_ratio, order};
use crate::services::transcript::{fetch_transcript, TranscriptSource};
use crate::utils::format_published_date;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use log::info;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// Everything one session's requests share: the memoizing provider, the caption
/// source and the configuration fixed at startup.
pub struct AnalysisSession {
    provider: CachedProvider,
    transcripts: Arc<dyn TranscriptSource>,
    config: AnalyzerConfig,
}

struct Corpus {
    channel_id: Option<String>,
    videos: Vec<Video>,
}

impl AnalysisSession {
    pub fn new(
        provider: Arc<dyn VideoProvider>,
        transcripts: Arc<dyn TranscriptSource>,
        config: AnalyzerConfig,
    ) -> Self {
        Self {
            provider: CachedProvider::new(provider),
            transcripts,
            config,
        }
    }

    pub fn cached_entries(&self) -> usize {
        self.provider.cached_entries()
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Run one aggregation request. Any resolution or provider failure aborts the
    /// whole request; no partial result set is returned.
    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisReport, AnalyzerError> {
        let cap = request
            .cap
            .unwrap_or(self.config.default_cap)
            .min(self.config.max_cap);
        let baseline = effective_baseline(request)?;

        let corpus = match &request.source {
            AnalysisSource::Channel { reference } => {
                let channel_id = resolve(&self.provider, reference).await?;
                let list_cap = match baseline {
                    ReferenceBaseline::ChannelCorpus => None,
                    ReferenceBaseline::ResultSet => Some(cap),
                };
                let listed = fetch_channel_uploads(&self.provider, &channel_id, list_cap).await?;
                Corpus {
                    videos: self.enrich_listed(&listed).await?,
                    channel_id: Some(channel_id),
                }
            }
            AnalysisSource::Search(criteria) => {
                let query = build_search_query(criteria, Utc::now())?;
                let listed = fetch_search_results(&self.provider, &query, Some(cap)).await?;
                Corpus {
                    videos: self.enrich_listed(&listed).await?,
                    channel_id: None,
                }
            }
        };

        // Taken once, before truncation and filtering, and never recomputed.
        let average = reference_average(&corpus.videos);
        let baseline_size = corpus.videos.len();

        let mut videos = corpus.videos;
        videos.truncate(cap);

        let channel_ids: BTreeSet<String> = videos
            .iter()
            .map(|video| video.channel_id.clone())
            .chain(corpus.channel_id.iter().cloned())
            .filter(|id| !id.is_empty())
            .collect();
        let subscribers = fetch_subscribers(&self.provider, &channel_ids).await?;

        let graded = videos
            .into_iter()
            .map(|video| grade_video(video, &subscribers, average))
            .collect();
        let graded = order(filter_by_ratio(graded, request.ratio_filter), request.sort);

        info!(
            "Analysis finished: {} videos, reference average {average:.1} over {baseline_size} ({:?})",
            graded.len(),
            baseline
        );

        Ok(AnalysisReport {
            channel_subscribers: corpus
                .channel_id
                .as_ref()
                .map(|id| subscribers.get(id).copied().unwrap_or(0)),
            channel_id: corpus.channel_id,
            baseline,
            reference_average: average,
            baseline_size,
            videos: graded,
        })
    }

    async fn enrich_listed(&self, listed: &[ListedVideo]) -> Result<Vec<Video>, AnalyzerError> {
        let ids: Vec<String> = listed.iter().map(|item| item.video_id.clone()).collect();
        let known_publish_times: HashMap<String, DateTime<Utc>> = listed
            .iter()
            .filter_map(|item| Some((item.video_id.clone(), item.published_at?)))
            .collect();
        Ok(enrich(&self.provider, &ids, &known_publish_times).await?)
    }

    /// Per-video, on-demand transcript. An empty priority list uses the configured languages.
    pub async fn transcript(
        &self,
        video_id: &str,
        language_priority: &[String],
    ) -> Result<Transcript, TranscriptError> {
        let languages = if language_priority.is_empty() {
            &self.config.transcript_languages[..]
        } else {
            language_priority
        };
        fetch_transcript(self.transcripts.as_ref(), video_id, languages).await
    }
}

fn effective_baseline(request: &AnalysisRequest) -> Result<ReferenceBaseline, AnalyzerError> {
    match (&request.source, request.baseline) {
        (AnalysisSource::Channel { .. }, None) => Ok(ReferenceBaseline::ChannelCorpus),
        (AnalysisSource::Search(_), None) => Ok(ReferenceBaseline::ResultSet),
        (AnalysisSource::Search(_), Some(ReferenceBaseline::ChannelCorpus)) => {
            Err(AnalyzerError::InvalidRequest(
                "a keyword search has no channel corpus to average over".to_string(),
            ))
        }
        (_, Some(baseline)) => Ok(baseline),
    }
}

fn grade_video(video: Video, subscribers: &HashMap<String, u64>, average: f64) -> GradedVideo {
    let channel_subscribers = subscribers.get(&video.channel_id).copied().unwrap_or(0);
    let ratio = view_ratio(video.views, channel_subscribers, average);
    GradedVideo {
        grade: grade(video.views, average),
        star: is_star(video.views, channel_subscribers),
        ratio,
        ratio_bucket: ratio_bucket(ratio),
        published_date: format_published_date(video.published_at),
        subscribers: channel_subscribers,
        video,
    }
}

fn rfc3339(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn build_search_query(
    criteria: &SearchCriteria,
    now: DateTime<Utc>,
) -> Result<SearchQuery, AnalyzerError> {
    let keyword = criteria.keyword.trim();
    if keyword.is_empty() {
        return Err(AnalyzerError::InvalidRequest(
            "search keyword must not be empty".to_string(),
        ));
    }

    let (published_after, published_before) = match criteria.recency {
        RecencyWindow::All => (None, None),
        RecencyWindow::Last30Days => (Some(rfc3339(now - Duration::days(30))), None),
        RecencyWindow::Last90Days => (Some(rfc3339(now - Duration::days(90))), None),
        RecencyWindow::OlderThan150Days => (None, Some(rfc3339(now - Duration::days(150)))),
    };

    Ok(SearchQuery {
        keyword: keyword.to_string(),
        region_code: criteria
            .region_code
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .map(str::to_uppercase),
        duration: criteria.duration,
        published_after,
        published_before,
        order: criteria.order,
    })
}
