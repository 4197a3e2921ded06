use chrono::{DateTime, Utc};

use crate::stats::{compute_stats_with_tags, DEFAULT_SOURCE_TAGS};
use crate::view_model::DashboardViewModel;
use crate::RiskEvent;

pub type CycleId = u64;

/// The single FetchState of a running dashboard. Only `update` mutates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    events: Vec<RiskEvent>,
    summary: String,
    loading: bool,
    error: Option<String>,
    last_updated: Option<DateTime<Utc>>,
    source_tags: Vec<String>,
    in_flight: Option<CycleId>,
    next_cycle_id: CycleId,
    completed_cycles: u64,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_source_tags(DEFAULT_SOURCE_TAGS)
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source_tags<S: AsRef<str>>(tags: &[S]) -> Self {
        Self {
            events: Vec::new(),
            summary: String::new(),
            loading: false,
            error: None,
            last_updated: None,
            source_tags: tags.iter().map(|t| t.as_ref().to_string()).collect(),
            in_flight: None,
            next_cycle_id: 1,
            completed_cycles: 0,
            dirty: false,
        }
    }

    pub fn view(&self) -> DashboardViewModel {
        DashboardViewModel {
            events: self.events.clone(),
            summary: self.summary.clone(),
            loading: self.loading,
            error: self.error.clone(),
            last_updated: self.last_updated,
            stats: compute_stats_with_tags(&self.events, &self.source_tags),
            source_tags: self.source_tags.clone(),
            completed_cycles: self.completed_cycles,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn in_flight(&self) -> Option<CycleId> {
        self.in_flight
    }

    /// Returns whether anything changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn begin_cycle(&mut self) -> CycleId {
        let cycle_id = self.next_cycle_id;
        self.next_cycle_id += 1;
        self.loading = true;
        self.error = None;
        self.in_flight = Some(cycle_id);
        self.dirty = true;
        cycle_id
    }

    /// Events and summary are always replaced together.
    pub(crate) fn complete_cycle(
        &mut self,
        events: Vec<RiskEvent>,
        summary: String,
        error: Option<String>,
        completed_at: DateTime<Utc>,
    ) {
        self.events = events;
        self.summary = summary;
        self.error = error;
        self.last_updated = Some(completed_at);
        self.loading = false;
        self.in_flight = None;
        self.completed_cycles += 1;
        self.dirty = true;
    }
}
