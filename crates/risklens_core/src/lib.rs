//! RiskLens core: pure fetch-state machine, event aggregation and view-model helpers.
mod effect;
mod event;
mod fallback;
mod msg;
mod state;
mod stats;
mod update;
mod view_model;

pub use effect::Effect;
pub use event::{EventId, RiskEvent, Tag};
pub use fallback::{fallback_events, FALLBACK_SUMMARY};
pub use msg::{CycleOutcome, Msg, RefreshTrigger};
pub use state::{AppState, CycleId};
pub use stats::{
    compute_stats, compute_stats_with_tags, is_critical_severity, DerivedStats,
    CRITICAL_SEVERITIES, DEFAULT_SOURCE_TAGS,
};
pub use update::update;
pub use view_model::DashboardViewModel;
