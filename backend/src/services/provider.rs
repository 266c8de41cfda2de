use crate::error::ProviderError;
use crate::models::{
    ChannelStats, DurationBucket, ListedVideo, Page, SearchOrder, SearchQuery, Video,
};
use crate::utils::parse_published_at;
use async_trait::async_trait;
use log::debug;
use reqwest::{Client, StatusCode};
use serde_json::Value;

/// Provider maximum for `maxResults` and for multi-id lookups.
pub const MAX_PAGE_SIZE: u32 = 50;

/// The remote video/channel/search API, seen only through the calls the pipeline needs.
#[async_trait]
pub trait VideoProvider: Send + Sync {
    async fn channel_id_for_username(&self, username: &str) -> Result<Option<String>, ProviderError>;

    /// Channel-type search, returning the top hit's channel id.
    async fn search_channel(&self, query: &str) -> Result<Option<String>, ProviderError>;

    async fn uploads_playlist_id(&self, channel_id: &str) -> Result<String, ProviderError>;

    async fn list_playlist_items(
        &self,
        playlist_id: &str,
        page_token: Option<String>,
        max_results: u32,
    ) -> Result<Page<ListedVideo>, ProviderError>;

    /// At most [`MAX_PAGE_SIZE`] ids per call. Unknown ids are silently absent.
    async fn list_video_details(&self, ids: &[String]) -> Result<Vec<Video>, ProviderError>;

    /// At most [`MAX_PAGE_SIZE`] ids per call.
    async fn list_channel_statistics(
        &self,
        ids: &[String],
    ) -> Result<Vec<ChannelStats>, ProviderError>;

    async fn search_videos(
        &self,
        query: &SearchQuery,
        page_token: Option<String>,
        max_results: u32,
    ) -> Result<Page<ListedVideo>, ProviderError>;
}

/// YouTube Data API v3 over HTTP.
pub struct YouTubeDataApi {
    client: Client,
    api_key: String,
    base_url: String,
}

impl YouTubeDataApi {
    pub fn new(api_key: String, base_url: String) -> Result<Self, ProviderError> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Value, ProviderError> {
        // Documentation: https://developers.google.com/youtube/v3/docs
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!("GET {url} {:?}", params);

        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // Proxies and rate limiters may answer with plain text or HTML.
            let body = response.json::<Value>().await.unwrap_or(Value::Null);
            return Err(classify_error(endpoint, status, &body));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ProviderError::Transient(format!("undecodable {endpoint} response: {e}")))
    }
}

fn classify_error(endpoint: &str, status: StatusCode, body: &Value) -> ProviderError {
    let message = body["error"]["message"]
        .as_str()
        .unwrap_or("no error message")
        .to_string();
    let reason = body["error"]["errors"][0]["reason"].as_str().unwrap_or("");
    let detail = format!("{endpoint}: {status} {message}");

    let quota_reason = matches!(
        reason,
        "quotaExceeded" | "dailyLimitExceeded" | "rateLimitExceeded"
    );

    if status == StatusCode::TOO_MANY_REQUESTS || (status == StatusCode::FORBIDDEN && quota_reason) {
        ProviderError::QuotaExceeded(detail)
    } else if status == StatusCode::NOT_FOUND {
        ProviderError::NotFound(detail)
    } else {
        ProviderError::Transient(detail)
    }
}

fn parse_page(response: &Value, video_id_of: fn(&Value) -> Option<&str>) -> Page<ListedVideo> {
    let items = response["items"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    let video_id = video_id_of(item)?;
                    let published_at = item["contentDetails"]["videoPublishedAt"]
                        .as_str()
                        .or_else(|| item["snippet"]["publishedAt"].as_str())
                        .and_then(parse_published_at);
                    Some(ListedVideo {
                        video_id: video_id.to_string(),
                        published_at,
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    Page {
        items,
        next_page_token: response["nextPageToken"]
            .as_str()
            .filter(|token| !token.is_empty())
            .map(String::from),
    }
}

fn parse_count(value: &Value) -> u64 {
    // The API encodes counts as strings; numbers are accepted too.
    value
        .as_str()
        .and_then(|raw| raw.parse().ok())
        .or_else(|| value.as_u64())
        .unwrap_or(0)
}

fn parse_video(item: &Value) -> Option<Video> {
    let id = item["id"].as_str()?.to_string();
    let snippet = &item["snippet"];
    let thumbnails = &snippet["thumbnails"];
    let thumbnail_url = ["medium", "high", "default"]
        .iter()
        .find_map(|size| thumbnails[*size]["url"].as_str())
        .map(String::from)
        .unwrap_or_else(|| format!("https://i.ytimg.com/vi/{id}/mqdefault.jpg"));

    Some(Video {
        title: snippet["title"].as_str().unwrap_or("").to_string(),
        thumbnail_url,
        views: parse_count(&item["statistics"]["viewCount"]),
        published_at: snippet["publishedAt"].as_str().and_then(parse_published_at),
        channel_id: snippet["channelId"].as_str().unwrap_or("").to_string(),
        channel_name: snippet["channelTitle"].as_str().unwrap_or("").to_string(),
        id,
    })
}

fn parse_channel_stats(item: &Value) -> Option<ChannelStats> {
    let channel_id = item["id"].as_str()?.to_string();
    let statistics = &item["statistics"];
    let subscribers = if statistics["hiddenSubscriberCount"].as_bool().unwrap_or(false) {
        0
    } else {
        parse_count(&statistics["subscriberCount"])
    };
    Some(ChannelStats {
        channel_id,
        subscribers,
    })
}

fn duration_param(duration: DurationBucket) -> &'static str {
    match duration {
        DurationBucket::Any => "any",
        DurationBucket::Short => "short",
        DurationBucket::Long => "long",
    }
}

fn order_param(order: SearchOrder) -> &'static str {
    match order {
        SearchOrder::Relevance => "relevance",
        SearchOrder::Date => "date",
        SearchOrder::ViewCount => "viewCount",
    }
}

#[async_trait]
impl VideoProvider for YouTubeDataApi {
    async fn channel_id_for_username(&self, username: &str) -> Result<Option<String>, ProviderError> {
        let response = self
            .get(
                "channels",
                &[("part", "id".to_string()), ("forUsername", username.to_string())],
            )
            .await?;
        Ok(response["items"][0]["id"].as_str().map(String::from))
    }

    async fn search_channel(&self, query: &str) -> Result<Option<String>, ProviderError> {
        let response = self
            .get(
                "search",
                &[
                    ("part", "snippet".to_string()),
                    ("type", "channel".to_string()),
                    ("q", query.to_string()),
                    ("maxResults", "1".to_string()),
                ],
            )
            .await?;
        Ok(response["items"][0]["snippet"]["channelId"]
            .as_str()
            .or_else(|| response["items"][0]["id"]["channelId"].as_str())
            .map(String::from))
    }

    async fn uploads_playlist_id(&self, channel_id: &str) -> Result<String, ProviderError> {
        let response = self
            .get(
                "channels",
                &[("part", "contentDetails".to_string()), ("id", channel_id.to_string())],
            )
            .await?;

        response["items"][0]["contentDetails"]["relatedPlaylists"]["uploads"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| {
                ProviderError::NotFound(format!("no uploads playlist for channel {channel_id}"))
            })
    }

    async fn list_playlist_items(
        &self,
        playlist_id: &str,
        page_token: Option<String>,
        max_results: u32,
    ) -> Result<Page<ListedVideo>, ProviderError> {
        let mut params = vec![
            ("part", "snippet,contentDetails".to_string()),
            ("playlistId", playlist_id.to_string()),
            ("maxResults", max_results.min(MAX_PAGE_SIZE).to_string()),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token));
        }

        let response = self.get("playlistItems", &params).await?;
        Ok(parse_page(&response, |item| {
            item["contentDetails"]["videoId"]
                .as_str()
                .or_else(|| item["snippet"]["resourceId"]["videoId"].as_str())
        }))
    }

    async fn list_video_details(&self, ids: &[String]) -> Result<Vec<Video>, ProviderError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let response = self
            .get(
                "videos",
                &[("part", "snippet,statistics".to_string()), ("id", ids.join(","))],
            )
            .await?;

        Ok(response["items"]
            .as_array()
            .map(|items| items.iter().filter_map(parse_video).collect())
            .unwrap_or_default())
    }

    async fn list_channel_statistics(
        &self,
        ids: &[String],
    ) -> Result<Vec<ChannelStats>, ProviderError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let response = self
            .get(
                "channels",
                &[("part", "statistics".to_string()), ("id", ids.join(","))],
            )
            .await?;

        Ok(response["items"]
            .as_array()
            .map(|items| items.iter().filter_map(parse_channel_stats).collect())
            .unwrap_or_default())
    }

    async fn search_videos(
        &self,
        query: &SearchQuery,
        page_token: Option<String>,
        max_results: u32,
    ) -> Result<Page<ListedVideo>, ProviderError> {
        let mut params = vec![
            ("part", "snippet".to_string()),
            ("type", "video".to_string()),
            ("q", query.keyword.clone()),
            ("videoDuration", duration_param(query.duration).to_string()),
            ("order", order_param(query.order).to_string()),
            ("maxResults", max_results.min(MAX_PAGE_SIZE).to_string()),
        ];
        if let Some(region) = &query.region_code {
            params.push(("regionCode", region.clone()));
        }
        if let Some(after) = &query.published_after {
            params.push(("publishedAfter", after.clone()));
        }
        if let Some(before) = &query.published_before {
            params.push(("publishedBefore", before.clone()));
        }
        if let Some(token) = page_token {
            params.push(("pageToken", token));
        }

        let response = self.get("search", &params).await?;
        Ok(parse_page(&response, |item| item["id"]["videoId"].as_str()))
    }
}
