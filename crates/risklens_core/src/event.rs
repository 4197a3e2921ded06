use std::fmt;

/// Identifier of an event within one fetched batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId(pub String);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EventId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Free-text tag that keeps its original spelling for display and a
/// lower-cased key, computed once, for matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    raw: String,
    key: String,
}

impl Tag {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let key = raw.trim().to_lowercase();
        Self { raw, key }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskEvent {
    pub id: EventId,
    pub source_system: Option<Tag>,
    pub event_type: String,
    pub severity: Option<Tag>,
    pub description: String,
    /// ISO-8601 text as received; never parsed or reordered here.
    pub created_at: String,
}

impl RiskEvent {
    pub fn source_key(&self) -> Option<&str> {
        self.source_system.as_ref().map(Tag::key)
    }

    pub fn severity_key(&self) -> Option<&str> {
        self.severity.as_ref().map(Tag::key)
    }
}
