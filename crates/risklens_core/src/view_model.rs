use chrono::{DateTime, Utc};

use crate::{DerivedStats, RiskEvent};

/// Read-only snapshot published after every state change.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DashboardViewModel {
    /// In the order the source sent them.
    pub events: Vec<RiskEvent>,
    pub summary: String,
    pub loading: bool,
    pub error: Option<String>,
    /// Completion time of the latest cycle, including fallback cycles.
    pub last_updated: Option<DateTime<Utc>>,
    pub stats: DerivedStats,
    pub source_tags: Vec<String>,
    pub completed_cycles: u64,
}

