use chrono::{DateTime, Duration, SecondsFormat, Utc};

use crate::{EventId, RiskEvent, Tag};

pub const FALLBACK_SUMMARY: &str = "\
ELEVATED RISK: Several correlated signals point to rising operational risk over the next two to four weeks.

KEY FINDING: Departures of experienced warehouse staff coincide with overdue vendor payments, which together put fulfillment capacity under pressure.

CURRENT CONCERNS:
- Three senior warehouse operators have resigned in the same week, removing a large share of experienced staff from the Midwest distribution center.
- The primary logistics vendor has flagged an overdue invoice and may downgrade service levels during peak season.
- A packaging supplier has placed the account on credit hold, leaving roughly two weeks of inventory buffer.

SUGGESTED ACTIONS:
1. Settle the outstanding logistics invoice.
2. Open emergency hiring for warehouse roles.
3. Agree a payment plan with the packaging supplier to lift the credit hold.

OUTLOOK: Without intervention, fulfillment capacity is likely to drop by 15-20% within three weeks.";

struct Template {
    id: &'static str,
    source: &'static str,
    event_type: &'static str,
    severity: &'static str,
    description: &'static str,
    age_minutes: i64,
}

const TEMPLATES: &[Template] = &[
    Template {
        id: "1",
        source: "HR",
        event_type: "Mass Resignation Alert",
        severity: "critical",
        description: "Three senior warehouse operators handed in notice this week. Average tenure is eight years; Q1 fulfillment capacity may fall by 15%.",
        age_minutes: 30,
    },
    Template {
        id: "2",
        source: "Finance",
        event_type: "Payment Delay Detected",
        severity: "high",
        description: "Invoice INV-2024-4521 to the primary logistics vendor is 12 days overdue and the vendor has put the account under review.",
        age_minutes: 2 * 60,
    },
    Template {
        id: "3",
        source: "HR",
        event_type: "Training Compliance Gap",
        severity: "medium",
        description: "23% of forklift operators hold expired certifications ahead of the mandatory recertification deadline.",
        age_minutes: 5 * 60,
    },
    Template {
        id: "4",
        source: "Finance",
        event_type: "Budget Variance Alert",
        severity: "high",
        description: "Logistics Q1 budget is projected to overrun by 34%, driven by emergency shipping costs.",
        age_minutes: 8 * 60,
    },
    Template {
        id: "5",
        source: "HR",
        event_type: "Overtime Threshold Exceeded",
        severity: "medium",
        description: "The shipping team logged 847 overtime hours this week against a threshold of 400.",
        age_minutes: 12 * 60,
    },
    Template {
        id: "6",
        source: "Finance",
        event_type: "Vendor Credit Hold",
        severity: "critical",
        description: "The secondary packaging supplier placed the account on credit hold with $127,450 outstanding; two weeks of buffer remain.",
        age_minutes: 24 * 60,
    },
];

/// Fixed substitute batch served when a cycle fails. Timestamps are relative
/// to `now`, so the output is deterministic for a given clock value.
pub fn fallback_events(now: DateTime<Utc>) -> Vec<RiskEvent> {
    TEMPLATES
        .iter()
        .map(|template| RiskEvent {
            id: EventId::from(template.id),
            source_system: Some(Tag::new(template.source)),
            event_type: template.event_type.to_string(),
            severity: Some(Tag::new(template.severity)),
            description: template.description.to_string(),
            created_at: (now - Duration::minutes(template.age_minutes))
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute_stats;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn fallback_is_deterministic_for_a_clock_value() {
        assert_eq!(fallback_events(fixed_now()), fallback_events(fixed_now()));
    }

    #[test]
    fn fallback_timestamps_trail_now() {
        let events = fallback_events(fixed_now());
        assert_eq!(events[0].created_at, "2026-02-01T11:30:00.000Z");
        assert_eq!(events[5].created_at, "2026-01-31T12:00:00.000Z");
    }

    #[test]
    fn fallback_ids_are_unique() {
        let events = fallback_events(fixed_now());
        let mut ids: Vec<_> = events.iter().map(|e| e.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), events.len());
    }

    #[test]
    fn fallback_stats() {
        let stats = compute_stats(&fallback_events(fixed_now()));
        assert_eq!(stats.total, 6);
        assert_eq!(stats.source_count("hr"), 3);
        assert_eq!(stats.source_count("finance"), 3);
        assert_eq!(stats.critical, 4);
        assert!(!FALLBACK_SUMMARY.is_empty());
    }
}
