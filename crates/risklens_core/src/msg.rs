use chrono::{DateTime, Utc};

use crate::{CycleId, RiskEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTrigger {
    /// First cycle, fired as soon as the poller starts.
    Startup,
    /// Recurring timer.
    Scheduled,
    /// User asked for a refresh.
    Manual,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Both feeds answered and parsed.
    Fetched {
        events: Vec<RiskEvent>,
        summary: String,
    },
    /// Any transport, status, shape or timeout failure on either feed.
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Request a new fetch cycle.
    RefreshRequested { trigger: RefreshTrigger },
    /// A fetch cycle finished, successfully or not.
    CycleCompleted {
        cycle_id: CycleId,
        outcome: CycleOutcome,
        completed_at: DateTime<Utc>,
    },
}
