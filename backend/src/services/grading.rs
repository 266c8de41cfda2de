use crate::models::{Grade, RatioBucket, Video};

const GREAT_FACTOR: f64 = 1.5;
const STAR_FACTOR: f64 = 1.5;

pub fn grade(views: u64, reference_average: f64) -> Grade {
    if views == 0 {
        return Grade::Zero;
    }
    if reference_average <= 0.0 {
        return Grade::Bad;
    }

    let views = views as f64;
    if views >= GREAT_FACTOR * reference_average {
        Grade::Great
    } else if views >= reference_average {
        Grade::Good
    } else {
        Grade::Bad
    }
}

/// Arithmetic mean of view counts; 0 for an empty set.
pub fn reference_average(videos: &[Video]) -> f64 {
    if videos.is_empty() {
        return 0.0;
    }
    let total: u64 = videos.iter().map(|video| video.views).sum();
    total as f64 / videos.len() as f64
}

/// Views at least one and a half times the subscriber count. Never set when the
/// count is unknown or hidden.
pub fn is_star(views: u64, subscribers: u64) -> bool {
    subscribers > 0 && views as f64 >= STAR_FACTOR * subscribers as f64
}

/// `views / max(denominator, 1)`, where the denominator is the subscriber count
/// when known and the reference average otherwise.
pub fn view_ratio(views: u64, subscribers: u64, reference_average: f64) -> f64 {
    let denominator = if subscribers > 0 {
        subscribers as f64
    } else {
        reference_average
    };
    views as f64 / denominator.max(1.0)
}

pub fn ratio_bucket(ratio: f64) -> RatioBucket {
    if ratio >= 1.0 {
        RatioBucket::High
    } else if ratio >= 0.5 {
        RatioBucket::Medium
    } else {
        RatioBucket::Low
    }
}
