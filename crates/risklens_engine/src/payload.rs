//! Normalizes the loosely shaped feed bodies into core types.
//!
//! Both feeds accept a bare value or an object wrapping it under a
//! conventional key. Classification happens once, here; nothing downstream
//! inspects raw JSON.

use std::collections::HashSet;

use risklens_core::{EventId, RiskEvent, Tag};
use risklens_logging::lens_warn;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
    #[error("body is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("event at index {index} is malformed: {message}")]
    MalformedEvent { index: usize, message: String },
    #[error("duplicate event id {0}")]
    DuplicateId(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventsShape {
    /// `[ {...}, ... ]`
    Bare(Vec<Value>),
    /// `{ "events": [ {...}, ... ] }`
    Wrapped(Vec<Value>),
    Unrecognized,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryShape {
    /// `"text"`
    Bare(String),
    /// `{ "summary": "text" }` or `{ "message": "text" }`
    Wrapped(String),
    Unrecognized,
}

#[derive(Debug, Deserialize)]
struct WireEvent {
    #[serde(default)]
    id: Option<WireId>,
    #[serde(default)]
    source_system: Option<String>,
    #[serde(default)]
    event_type: Option<String>,
    #[serde(default)]
    severity: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireId {
    Text(String),
    Number(serde_json::Number),
}

impl WireEvent {
    fn into_event(self, index: usize) -> RiskEvent {
        let id = match self.id {
            Some(WireId::Text(text)) => text,
            Some(WireId::Number(number)) => number.to_string(),
            None => format!("#{index}"),
        };
        RiskEvent {
            id: EventId(id),
            source_system: self.source_system.map(Tag::new),
            event_type: self.event_type.unwrap_or_default(),
            severity: self.severity.map(Tag::new),
            description: self.description.unwrap_or_default(),
            created_at: self.created_at.unwrap_or_default(),
        }
    }
}

pub fn classify_events(value: Value) -> EventsShape {
    match value {
        Value::Array(items) => EventsShape::Bare(items),
        Value::Object(mut map) => match map.remove("events") {
            Some(Value::Array(items)) => EventsShape::Wrapped(items),
            _ => EventsShape::Unrecognized,
        },
        _ => EventsShape::Unrecognized,
    }
}

pub fn classify_summary(value: Value) -> SummaryShape {
    match value {
        Value::String(text) => SummaryShape::Bare(text),
        Value::Object(map) => ["summary", "message"]
            .iter()
            .find_map(|key| match map.get(*key) {
                Some(Value::String(text)) if !text.is_empty() => Some(text.clone()),
                _ => None,
            })
            .map_or(SummaryShape::Unrecognized, SummaryShape::Wrapped),
        _ => SummaryShape::Unrecognized,
    }
}

/// Parses an events body. An unrecognized but valid JSON shape yields an
/// empty batch.
pub fn parse_events(bytes: &[u8]) -> Result<Vec<RiskEvent>, PayloadError> {
    let value = parse_json(bytes)?;
    let items = match classify_events(value) {
        EventsShape::Bare(items) | EventsShape::Wrapped(items) => items,
        EventsShape::Unrecognized => {
            lens_warn!("events payload has an unrecognized shape; using empty batch");
            return Ok(Vec::new());
        }
    };

    let mut seen = HashSet::with_capacity(items.len());
    let mut events = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        if !item.is_object() {
            return Err(PayloadError::MalformedEvent {
                index,
                message: "expected an object".to_string(),
            });
        }
        let wire: WireEvent =
            serde_json::from_value(item).map_err(|err| PayloadError::MalformedEvent {
                index,
                message: err.to_string(),
            })?;
        let event = wire.into_event(index);
        if !seen.insert(event.id.clone()) {
            return Err(PayloadError::DuplicateId(event.id.0));
        }
        events.push(event);
    }
    Ok(events)
}

/// Parses a summary body. An unrecognized but valid JSON shape yields an
/// empty string.
pub fn parse_summary(bytes: &[u8]) -> Result<String, PayloadError> {
    match classify_summary(parse_json(bytes)?) {
        SummaryShape::Bare(text) | SummaryShape::Wrapped(text) => Ok(text),
        SummaryShape::Unrecognized => {
            lens_warn!("summary payload has an unrecognized shape; using empty text");
            Ok(String::new())
        }
    }
}

fn parse_json(bytes: &[u8]) -> Result<Value, PayloadError> {
    serde_json::from_slice(bytes).map_err(|err| PayloadError::InvalidJson(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_and_wrapped_event_arrays_are_accepted() {
        let bare = br#"[{"id": 1, "source_system": "HR", "severity": "High"}]"#;
        let wrapped = br#"{"events": [{"id": 1, "source_system": "HR", "severity": "High"}]}"#;
        assert_eq!(parse_events(bare).unwrap(), parse_events(wrapped).unwrap());
    }

    #[test]
    fn event_fields_are_mapped() {
        let body = br#"[{
            "id": "evt-9",
            "source_system": "Finance",
            "event_type": "Budget Variance",
            "severity": "CRITICAL",
            "description": "over budget",
            "created_at": "2026-01-05T10:00:00Z"
        }]"#;
        let events = parse_events(body).unwrap();
        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.id, EventId::from("evt-9"));
        assert_eq!(event.source_key(), Some("finance"));
        assert_eq!(event.source_system.as_ref().unwrap().raw(), "Finance");
        assert_eq!(event.severity_key(), Some("critical"));
        assert_eq!(event.event_type, "Budget Variance");
        assert_eq!(event.created_at, "2026-01-05T10:00:00Z");
    }

    #[test]
    fn missing_fields_become_unknown() {
        let events = parse_events(br#"[{"source_system": null}, {}]"#).unwrap();
        assert_eq!(events[0].id, EventId::from("#0"));
        assert_eq!(events[1].id, EventId::from("#1"));
        assert_eq!(events[0].source_system, None);
        assert_eq!(events[1].severity, None);
        assert_eq!(events[1].description, "");
    }

    #[test]
    fn unrecognized_events_shape_is_empty() {
        assert_eq!(parse_events(b"{}").unwrap(), Vec::new());
        assert_eq!(parse_events(b"null").unwrap(), Vec::new());
        assert_eq!(parse_events(br#"{"events": "nope"}"#).unwrap(), Vec::new());
        assert_eq!(classify_events(json!(42)), EventsShape::Unrecognized);
    }

    #[test]
    fn invalid_json_is_a_shape_failure() {
        assert!(matches!(
            parse_events(b"<html>"),
            Err(PayloadError::InvalidJson(_))
        ));
        assert!(matches!(
            parse_summary(b"not json"),
            Err(PayloadError::InvalidJson(_))
        ));
    }

    #[test]
    fn non_object_element_is_rejected() {
        assert_eq!(
            parse_events(br#"[{"id": 1}, 7]"#),
            Err(PayloadError::MalformedEvent {
                index: 1,
                message: "expected an object".to_string()
            })
        );
    }

    #[test]
    fn wrongly_typed_field_is_rejected() {
        assert!(matches!(
            parse_events(br#"[{"id": 1, "severity": 3}]"#),
            Err(PayloadError::MalformedEvent { index: 0, .. })
        ));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        assert_eq!(
            parse_events(br#"[{"id": 1}, {"id": "1"}]"#),
            Err(PayloadError::DuplicateId("1".to_string()))
        );
    }

    #[test]
    fn summary_shapes() {
        assert_eq!(parse_summary(br#""plain""#).unwrap(), "plain");
        assert_eq!(parse_summary(br#"{"summary": "s"}"#).unwrap(), "s");
        assert_eq!(parse_summary(br#"{"message": "m"}"#).unwrap(), "m");
        assert_eq!(
            parse_summary(br#"{"summary": "", "message": "m"}"#).unwrap(),
            "m"
        );
        assert_eq!(parse_summary(br#"{"other": 1}"#).unwrap(), "");
        assert_eq!(parse_summary(b"[1, 2]").unwrap(), "");
    }

    #[test]
    fn summary_prefers_summary_key() {
        assert_eq!(
            classify_summary(json!({"summary": "s", "message": "m"})),
            SummaryShape::Wrapped("s".to_string())
        );
    }
}
