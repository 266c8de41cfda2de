use crate::error::TranscriptError;
use crate::models::{Transcript, TranscriptSegment};
use async_trait::async_trait;
use log::{error, info};
use yt_transcript_rs::api::YouTubeTranscriptApi;

/// Caption track lookup. Resolves to the first available track matching any of
/// `languages`, in priority order.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    async fn fetch_segments(
        &self,
        video_id: &str,
        languages: &[String],
    ) -> Result<Vec<TranscriptSegment>, TranscriptError>;
}

pub struct YtTranscriptSource;

#[async_trait]
impl TranscriptSource for YtTranscriptSource {
    async fn fetch_segments(
        &self,
        video_id: &str,
        languages: &[String],
    ) -> Result<Vec<TranscriptSegment>, TranscriptError> {
        let unavailable = |reason: String| TranscriptError::Unavailable {
            video_id: video_id.to_string(),
            reason,
        };

        let api = YouTubeTranscriptApi::new(None, None, None)
            .map_err(|e| unavailable(format!("transcript client: {e:?}")))?;
        let languages: Vec<&str> = languages.iter().map(String::as_str).collect();

        let transcript = api
            .fetch_transcript(video_id, &languages, false)
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        Ok(transcript
            .into_iter()
            .map(|entry| TranscriptSegment {
                text: entry.text,
                start: entry.start,
                duration: entry.duration,
            })
            .collect())
    }
}

/// Fetch one video's transcript. Failures stay local to this call.
pub async fn fetch_transcript(
    source: &dyn TranscriptSource,
    video_id: &str,
    language_priority: &[String],
) -> Result<Transcript, TranscriptError> {
    match source.fetch_segments(video_id, language_priority).await {
        Ok(segments) => {
            info!(
                "Fetched {} captions for video ID: {video_id}",
                segments.len()
            );
            Ok(Transcript {
                video_id: video_id.to_string(),
                language_priority: language_priority.to_vec(),
                segments,
            })
        }
        Err(e) => {
            error!("Failed to fetch transcript for video ID {video_id}: {e}");
            Err(e)
        }
    }
}
