use crate::error::ProviderError;
use crate::models::Video;
use crate::services::provider::{VideoProvider, MAX_PAGE_SIZE};
use chrono::{DateTime, Utc};
use log::{debug, info};
use std::collections::{BTreeSet, HashMap, HashSet};

const BATCH_SIZE: usize = MAX_PAGE_SIZE as usize;

/// Fetch details for `ids` in batches of at most fifty, keeping input order.
///
/// Publish times already known from the listing step win over the detail
/// response's own. Ids the provider leaves out (deleted, private) are dropped,
/// and a repeated id is only kept at its first position.
pub async fn enrich(
    provider: &dyn VideoProvider,
    ids: &[String],
    known_publish_times: &HashMap<String, DateTime<Utc>>,
) -> Result<Vec<Video>, ProviderError> {
    let mut seen = HashSet::with_capacity(ids.len());
    let ids: Vec<String> = ids
        .iter()
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect();
    let mut videos = Vec::with_capacity(ids.len());

    for (batch_no, batch) in ids.chunks(BATCH_SIZE).enumerate() {
        let details = provider.list_video_details(batch).await?;
        debug!(
            "Batch {}: requested {} videos, received {}",
            batch_no + 1,
            batch.len(),
            details.len()
        );

        let mut by_id: HashMap<String, Video> = details
            .into_iter()
            .map(|video| (video.id.clone(), video))
            .collect();

        for id in batch {
            if let Some(mut video) = by_id.remove(id) {
                if let Some(published_at) = known_publish_times.get(id) {
                    video.published_at = Some(*published_at);
                }
                videos.push(video);
            }
        }
    }

    let skipped = ids.len() - videos.len();
    if skipped > 0 {
        info!("Provider omitted {skipped} of {} requested videos", ids.len());
    }
    Ok(videos)
}

/// Subscriber counts for a set of channels; hidden or missing counts are 0.
pub async fn fetch_subscribers(
    provider: &dyn VideoProvider,
    channel_ids: &BTreeSet<String>,
) -> Result<HashMap<String, u64>, ProviderError> {
    let ids: Vec<String> = channel_ids.iter().cloned().collect();
    let mut subscribers: HashMap<String, u64> =
        ids.iter().map(|id| (id.clone(), 0)).collect();

    for batch in ids.chunks(BATCH_SIZE) {
        for stats in provider.list_channel_statistics(batch).await? {
            if let Some(count) = subscribers.get_mut(&stats.channel_id) {
                *count = stats.subscribers;
            }
        }
    }

    info!("Fetched subscriber counts for {} channels", subscribers.len());
    Ok(subscribers)
}
