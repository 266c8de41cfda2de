use crate::models::{GradedVideo, RatioBucket, SortCriterion};
use crate::utils::compare_with_order;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

fn compare(a: &GradedVideo, b: &GradedVideo, criterion: SortCriterion) -> Ordering {
    match criterion {
        SortCriterion::ViewsAsc => compare_with_order(a.video.views, b.video.views, SortOrder::Asc),
        SortCriterion::ViewsDesc => {
            compare_with_order(a.video.views, b.video.views, SortOrder::Desc)
        }
        SortCriterion::SubscribersAsc => {
            compare_with_order(a.subscribers, b.subscribers, SortOrder::Asc)
        }
        SortCriterion::SubscribersDesc => {
            compare_with_order(a.subscribers, b.subscribers, SortOrder::Desc)
        }
        SortCriterion::PublishedAsc => compare_published(a, b, SortOrder::Asc),
        SortCriterion::PublishedDesc => compare_published(a, b, SortOrder::Desc),
        SortCriterion::Grade => compare_with_order(a.grade.rank(), b.grade.rank(), SortOrder::Asc),
    }
}

// Unknown publish times go last in either direction.
fn compare_published(a: &GradedVideo, b: &GradedVideo, order: SortOrder) -> Ordering {
    match (a.video.published_at, b.video.published_at) {
        (Some(a), Some(b)) => compare_with_order(a, b, order),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stable sort: videos comparing equal keep their arrival order.
pub fn order(mut videos: Vec<GradedVideo>, criterion: SortCriterion) -> Vec<GradedVideo> {
    videos.sort_by(|a, b| compare(a, b, criterion));
    videos
}

pub fn filter_by_ratio(videos: Vec<GradedVideo>, bucket: Option<RatioBucket>) -> Vec<GradedVideo> {
    match bucket {
        Some(bucket) => videos
            .into_iter()
            .filter(|video| video.ratio_bucket == bucket)
            .collect(),
        None => videos,
    }
}
