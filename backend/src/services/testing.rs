//! Scripted in-memory provider and transcript source for tests.

use crate::error::{ProviderError, TranscriptError};
use crate::models::{ChannelStats, ListedVideo, Page, SearchQuery, TranscriptSegment, Video};
use crate::services::provider::VideoProvider;
use crate::services::transcript::TranscriptSource;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

pub const FAKE_CHANNEL: &str = "UCfakechannel00000000000";

pub fn listed(video_id: &str) -> ListedVideo {
    ListedVideo {
        video_id: video_id.to_string(),
        published_at: None,
    }
}

pub fn video(id: &str, views: u64, channel_id: &str) -> Video {
    Video {
        id: id.to_string(),
        title: format!("Video {id}"),
        thumbnail_url: format!("https://i.ytimg.com/vi/{id}/mqdefault.jpg"),
        views,
        published_at: None,
        channel_id: channel_id.to_string(),
        channel_name: format!("Channel {channel_id}"),
    }
}

#[derive(Default)]
pub struct FakeProvider {
    usernames: HashMap<String, String>,
    channel_searches: HashMap<String, String>,
    uploads: HashMap<String, String>,
    playlists: HashMap<String, Vec<ListedVideo>>,
    search_results: Vec<ListedVideo>,
    videos: HashMap<String, Video>,
    subscribers: HashMap<String, u64>,
    failure: Option<ProviderError>,
    calls: Mutex<HashMap<&'static str, usize>>,
    page_sizes: Mutex<Vec<u32>>,
    batch_sizes: Mutex<Vec<usize>>,
    searches: Mutex<Vec<SearchQuery>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_username(mut self, username: &str, channel_id: &str) -> Self {
        self.usernames
            .insert(username.to_string(), channel_id.to_string());
        self
    }

    pub fn with_channel_search(mut self, query: &str, channel_id: &str) -> Self {
        self.channel_searches
            .insert(query.to_string(), channel_id.to_string());
        self
    }

    pub fn with_channel(mut self, channel_id: &str, playlist_id: &str, subscribers: u64) -> Self {
        self.uploads
            .insert(channel_id.to_string(), playlist_id.to_string());
        self.subscribers.insert(channel_id.to_string(), subscribers);
        self.playlists.entry(playlist_id.to_string()).or_default();
        self
    }

    pub fn with_uploads(mut self, playlist_id: &str, items: Vec<ListedVideo>) -> Self {
        self.playlists.insert(playlist_id.to_string(), items);
        self
    }

    pub fn with_search_results(mut self, items: Vec<ListedVideo>) -> Self {
        self.search_results = items;
        self
    }

    pub fn with_video(mut self, video: Video) -> Self {
        self.videos.insert(video.id.clone(), video);
        self
    }

    /// Detail records on [`FAKE_CHANNEL`] for each `(id, views)` pair.
    pub fn with_videos(mut self, videos: &[(&str, u64)]) -> Self {
        for (id, views) in videos {
            self.videos
                .insert(id.to_string(), video(id, *views, FAKE_CHANNEL));
        }
        self
    }

    pub fn with_subscribers(mut self, channel_id: &str, subscribers: u64) -> Self {
        self.subscribers.insert(channel_id.to_string(), subscribers);
        self
    }

    pub fn failing_with(mut self, error: ProviderError) -> Self {
        self.failure = Some(error);
        self
    }

    pub fn calls(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .get(operation)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    pub fn page_sizes(&self) -> Vec<u32> {
        self.page_sizes.lock().unwrap().clone()
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batch_sizes.lock().unwrap().clone()
    }

    pub fn searches(&self) -> Vec<SearchQuery> {
        self.searches.lock().unwrap().clone()
    }

    fn record(&self, operation: &'static str) -> Result<(), ProviderError> {
        *self.calls.lock().unwrap().entry(operation).or_insert(0) += 1;
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn page_of(
        &self,
        items: &[ListedVideo],
        page_token: Option<String>,
        max_results: u32,
    ) -> Page<ListedVideo> {
        self.page_sizes.lock().unwrap().push(max_results);
        let start = page_token
            .and_then(|token| token.parse::<usize>().ok())
            .unwrap_or(0)
            .min(items.len());
        let end = (start + max_results as usize).min(items.len());
        Page {
            items: items[start..end].to_vec(),
            next_page_token: (end < items.len()).then(|| end.to_string()),
        }
    }
}

#[async_trait]
impl VideoProvider for FakeProvider {
    async fn channel_id_for_username(&self, username: &str) -> Result<Option<String>, ProviderError> {
        self.record("channel_id_for_username")?;
        Ok(self.usernames.get(username).cloned())
    }

    async fn search_channel(&self, query: &str) -> Result<Option<String>, ProviderError> {
        self.record("search_channel")?;
        Ok(self.channel_searches.get(query).cloned())
    }

    async fn uploads_playlist_id(&self, channel_id: &str) -> Result<String, ProviderError> {
        self.record("uploads_playlist_id")?;
        self.uploads
            .get(channel_id)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(channel_id.to_string()))
    }

    async fn list_playlist_items(
        &self,
        playlist_id: &str,
        page_token: Option<String>,
        max_results: u32,
    ) -> Result<Page<ListedVideo>, ProviderError> {
        self.record("list_playlist_items")?;
        let items = self
            .playlists
            .get(playlist_id)
            .ok_or_else(|| ProviderError::NotFound(playlist_id.to_string()))?;
        Ok(self.page_of(items, page_token, max_results))
    }

    async fn list_video_details(&self, ids: &[String]) -> Result<Vec<Video>, ProviderError> {
        self.record("list_video_details")?;
        self.batch_sizes.lock().unwrap().push(ids.len());
        Ok(ids
            .iter()
            .filter_map(|id| self.videos.get(id).cloned())
            .collect())
    }

    async fn list_channel_statistics(
        &self,
        ids: &[String],
    ) -> Result<Vec<ChannelStats>, ProviderError> {
        self.record("list_channel_statistics")?;
        self.batch_sizes.lock().unwrap().push(ids.len());
        Ok(ids
            .iter()
            .filter_map(|id| {
                self.subscribers.get(id).map(|subscribers| ChannelStats {
                    channel_id: id.clone(),
                    subscribers: *subscribers,
                })
            })
            .collect())
    }

    async fn search_videos(
        &self,
        query: &SearchQuery,
        page_token: Option<String>,
        max_results: u32,
    ) -> Result<Page<ListedVideo>, ProviderError> {
        self.record("search_videos")?;
        self.searches.lock().unwrap().push(query.clone());
        Ok(self.page_of(&self.search_results, page_token, max_results))
    }
}

/// Transcripts keyed by video id, each with the languages it is available in.
#[derive(Default)]
pub struct FakeTranscripts {
    tracks: HashMap<String, Vec<(String, Vec<TranscriptSegment>)>>,
    requests: Mutex<Vec<(String, Vec<String>)>>,
}

impl FakeTranscripts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_track(mut self, video_id: &str, language: &str, lines: &[&str]) -> Self {
        let segments = lines
            .iter()
            .enumerate()
            .map(|(i, line)| TranscriptSegment {
                text: line.to_string(),
                start: i as f64 * 2.0,
                duration: 2.0,
            })
            .collect();
        self.tracks
            .entry(video_id.to_string())
            .or_default()
            .push((language.to_string(), segments));
        self
    }

    pub fn requests(&self) -> Vec<(String, Vec<String>)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TranscriptSource for FakeTranscripts {
    async fn fetch_segments(
        &self,
        video_id: &str,
        languages: &[String],
    ) -> Result<Vec<TranscriptSegment>, TranscriptError> {
        self.requests
            .lock()
            .unwrap()
            .push((video_id.to_string(), languages.to_vec()));

        let unavailable = |reason: &str| TranscriptError::Unavailable {
            video_id: video_id.to_string(),
            reason: reason.to_string(),
        };

        let tracks = self
            .tracks
            .get(video_id)
            .ok_or_else(|| unavailable("subtitles are disabled for this video"))?;

        languages
            .iter()
            .find_map(|wanted| {
                tracks
                    .iter()
                    .find(|(language, _)| language == wanted)
                    .map(|(_, segments)| segments.clone())
            })
            .ok_or_else(|| unavailable("no transcript in the requested languages"))
    }
}
