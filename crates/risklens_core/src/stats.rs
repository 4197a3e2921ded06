use std::collections::BTreeMap;

use crate::RiskEvent;

/// Source tags counted when the caller does not supply its own list.
pub const DEFAULT_SOURCE_TAGS: &[&str] = &["hr", "finance"];

/// Severity keys that count towards `DerivedStats::critical`. Fixed taxonomy:
/// nothing outside this list is counted, however alarming it sounds.
pub const CRITICAL_SEVERITIES: &[&str] = &["critical", "high"];

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DerivedStats {
    pub total: usize,
    pub critical: usize,
    /// One entry per requested tag, keyed by its normalized form.
    pub by_source: BTreeMap<String, usize>,
}

impl DerivedStats {
    /// Case-insensitive lookup; tags that were not requested report 0.
    pub fn source_count(&self, tag: &str) -> usize {
        self.by_source
            .get(&normalize_tag(tag))
            .copied()
            .unwrap_or(0)
    }
}

pub fn is_critical_severity(key: &str) -> bool {
    CRITICAL_SEVERITIES.contains(&key)
}

pub fn compute_stats(events: &[RiskEvent]) -> DerivedStats {
    compute_stats_with_tags(events, DEFAULT_SOURCE_TAGS)
}

pub fn compute_stats_with_tags<S: AsRef<str>>(events: &[RiskEvent], tags: &[S]) -> DerivedStats {
    let mut by_source: BTreeMap<String, usize> = tags
        .iter()
        .map(|tag| normalize_tag(tag.as_ref()))
        .filter(|tag| !tag.is_empty())
        .map(|tag| (tag, 0))
        .collect();

    let mut critical = 0;
    for event in events {
        if let Some(count) = event.source_key().and_then(|key| by_source.get_mut(key)) {
            *count += 1;
        }
        if event.severity_key().is_some_and(is_critical_severity) {
            critical += 1;
        }
    }

    DerivedStats {
        total: events.len(),
        critical,
        by_source,
    }
}

fn normalize_tag(tag: &str) -> String {
    tag.trim().to_lowercase()
}
