use risklens_core::RiskEvent;
use risklens_logging::lens_debug;
use url::Url;

use crate::payload::{parse_events, parse_summary};
use crate::{CycleError, FailureKind, Feed, FetchError, Fetcher};

/// Resolved URLs of the two backend feeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEndpoints {
    pub events: Url,
    pub summary: Url,
}

impl FeedEndpoints {
    /// Joins `events` and `summary` onto `base`, treating it as a directory
    /// even without a trailing slash.
    pub fn from_base(base: &str) -> Result<Self, FetchError> {
        let trimmed = base.trim();
        if trimmed.is_empty() {
            return Err(FetchError::new(FailureKind::InvalidUrl, "empty base url"));
        }
        let mut base = Url::parse(trimmed)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(FetchError::new(
                FailureKind::InvalidUrl,
                format!("{trimmed} cannot be used as a base url"),
            ));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let join = |segment: &str| {
            base.join(segment)
                .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))
        };
        Ok(Self {
            events: join("events")?,
            summary: join("summary")?,
        })
    }
}

/// Events and summary from one successful round trip, adopted together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSnapshot {
    pub events: Vec<RiskEvent>,
    pub summary: String,
}

/// Fetches both feeds concurrently. Any failure on either feed fails the
/// whole call; a partial result is never returned.
pub async fn fetch_feeds(
    fetcher: &dyn Fetcher,
    endpoints: &FeedEndpoints,
) -> Result<FeedSnapshot, CycleError> {
    let (events, summary) = tokio::join!(
        fetcher.fetch(&endpoints.events),
        fetcher.fetch(&endpoints.summary)
    );

    let events = events.map_err(|err| CycleError::new(Feed::Events, err))?;
    let summary = summary.map_err(|err| CycleError::new(Feed::Summary, err))?;
    lens_debug!(
        "Feeds fetched events_bytes={} summary_bytes={}",
        events.metadata.byte_len,
        summary.metadata.byte_len
    );

    let events = parse_events(&events.bytes).map_err(|err| shape_error(Feed::Events, err))?;
    let summary = parse_summary(&summary.bytes).map_err(|err| shape_error(Feed::Summary, err))?;

    Ok(FeedSnapshot { events, summary })
}

fn shape_error(feed: Feed, err: crate::PayloadError) -> CycleError {
    CycleError::new(feed, FetchError::new(FailureKind::Shape, err.to_string()))
}
