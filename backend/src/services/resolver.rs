use crate::error::{AnalyzerError, ResolutionError};
use crate::models::ChannelRef;
use crate::services::provider::VideoProvider;
use lazy_static::lazy_static;
use log::info;
use regex::Regex;

lazy_static! {
    static ref CANONICAL_CHANNEL_ID: Regex =
        Regex::new(r"^UC[a-zA-Z0-9_-]{22}$").expect("channel id pattern is valid");
}

/// Text following `marker` up to the next path separator, percent-decoded.
fn segment_after(input: &str, marker: &str) -> Option<String> {
    let rest = input.split(marker).nth(1)?;
    let segment = rest.split('/').next().unwrap_or("").trim();
    if segment.is_empty() {
        return None;
    }
    urlencoding::decode(segment)
        .map(|decoded| decoded.into_owned())
        .ok()
        .or_else(|| Some(segment.to_string()))
}

/// Recognise the shape of a channel reference without touching the network.
pub fn parse_channel_ref(input: &str) -> Result<ChannelRef, ResolutionError> {
    let trimmed = input.trim();
    // Query strings and fragments never carry the channel identity.
    let path = trimmed
        .split(['?', '#'])
        .next()
        .unwrap_or("")
        .trim_end_matches('/');

    if CANONICAL_CHANNEL_ID.is_match(path) {
        return Ok(ChannelRef::Id(path.to_string()));
    }

    if let Some(id) = segment_after(path, "/channel/") {
        // Format: https://www.youtube.com/channel/UCTeLqJq1mXUX5WWoNXLmOIA
        Ok(ChannelRef::Id(id))
    } else if let Some(username) = segment_after(path, "/user/") {
        // Format: https://www.youtube.com/user/RobertsSpaceInd
        Ok(ChannelRef::Username(username))
    } else if let Some(handle) = segment_after(path, "/@") {
        // Format: https://youtube.com/@RobertsSpaceInd
        Ok(ChannelRef::Handle(handle))
    } else if let Some(handle) = path.strip_prefix('@').filter(|h| !h.is_empty() && !h.contains('/')) {
        Ok(ChannelRef::Handle(handle.to_string()))
    } else {
        Err(ResolutionError::UnsupportedFormat(trimmed.to_string()))
    }
}

/// Turn any supported channel reference into a canonical channel id.
///
/// Canonical ids are returned as-is. Usernames cost one channel lookup and handles
/// one channel-type search; an empty answer is [`ResolutionError::NotFound`].
pub async fn resolve(provider: &dyn VideoProvider, input: &str) -> Result<String, AnalyzerError> {
    let channel_id = match parse_channel_ref(input)? {
        ChannelRef::Id(id) => id,
        ChannelRef::Username(username) => provider
            .channel_id_for_username(&username)
            .await?
            .ok_or_else(|| ResolutionError::NotFound(format!("user/{username}")))?,
        ChannelRef::Handle(handle) => provider
            .search_channel(&handle)
            .await?
            .ok_or_else(|| ResolutionError::NotFound(format!("@{handle}")))?,
    };

    info!("Resolved channel reference {input} -> {channel_id}");
    Ok(channel_id)
}
