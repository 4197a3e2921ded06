//! RiskLens engine: feed IO, payload normalization and the polling task.
mod feeds;
mod fetch;
mod payload;
mod poller;
mod types;

pub use feeds::{fetch_feeds, FeedEndpoints, FeedSnapshot};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher};
pub use payload::{
    classify_events, classify_summary, parse_events, parse_summary, EventsShape, PayloadError,
    SummaryShape,
};
pub use poller::{spawn_poller, PollerConfig, PollerHandle};
pub use types::{CycleError, FailureKind, Feed, FetchError, FetchMetadata, FetchOutput};
