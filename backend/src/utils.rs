use crate::services::sorting::SortOrder;
use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use std::cmp::Ordering;

lazy_static! {
    static ref VIDEO_URL_PATTERN: Regex = Regex::new(
        r"(?:youtube\.com/watch\?(?:.*&)?v=|youtu\.be/|youtube\.com/embed/|youtube\.com/shorts/)([a-zA-Z0-9_-]{11})",
    )
    .expect("video url pattern is valid");
    static ref VIDEO_ID_PATTERN: Regex =
        Regex::new(r"^[a-zA-Z0-9_-]{11}$").expect("video id pattern is valid");
}

/// Parse an ISO8601 timestamp; empty or malformed input is unknown.
pub fn parse_published_at(date_str: &str) -> Option<DateTime<Utc>> {
    if date_str.is_empty() {
        return None;
    }
    date_str.parse::<DateTime<Utc>>().ok()
}

/// `YYYY-MM-DD`, or an empty string when the publish time is unknown.
pub fn format_published_date(published_at: Option<DateTime<Utc>>) -> String {
    published_at
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

pub fn compare_with_order<T: PartialOrd>(a: T, b: T, order: SortOrder) -> Ordering {
    match order {
        SortOrder::Asc => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        SortOrder::Desc => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

/// Accepts a bare video id or any watch/short/embed URL.
pub fn extract_youtube_video_id(input: &str) -> Option<String> {
    let input = input.trim();
    if VIDEO_ID_PATTERN.is_match(input) {
        return Some(input.to_string());
    }
    VIDEO_URL_PATTERN
        .captures(input)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
}
