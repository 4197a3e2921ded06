use std::sync::Once;

use chrono::{DateTime, TimeZone, Utc};
use pretty_assertions::assert_eq;
use risklens_core::{
    fallback_events, update, AppState, CycleId, CycleOutcome, Effect, EventId, Msg,
    RefreshTrigger, RiskEvent, Tag, FALLBACK_SUMMARY,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(risklens_logging::initialize_for_tests);
}

fn at(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 4, 9, minute, 0).unwrap()
}

fn event(id: &str, source: &str, severity: &str) -> RiskEvent {
    RiskEvent {
        id: EventId::from(id),
        source_system: Some(Tag::new(source)),
        event_type: "Signal".to_string(),
        severity: Some(Tag::new(severity)),
        description: format!("event {id}"),
        created_at: "2026-03-04T08:00:00Z".to_string(),
    }
}

fn request(state: AppState, trigger: RefreshTrigger) -> (AppState, Vec<Effect>) {
    update(state, Msg::RefreshRequested { trigger })
}

fn started_cycle(effects: &[Effect]) -> CycleId {
    match effects {
        [Effect::StartCycle { cycle_id }] => *cycle_id,
        other => panic!("expected a single StartCycle, got {other:?}"),
    }
}

fn complete(state: AppState, cycle_id: CycleId, outcome: CycleOutcome, minute: u32) -> AppState {
    let (state, effects) = update(
        state,
        Msg::CycleCompleted {
            cycle_id,
            outcome,
            completed_at: at(minute),
        },
    );
    assert!(effects.is_empty());
    state
}

#[test]
fn refresh_marks_loading_and_emits_start() {
    init_logging();
    let (mut state, effects) = request(AppState::new(), RefreshTrigger::Startup);

    assert_eq!(effects, vec![Effect::StartCycle { cycle_id: 1 }]);
    let view = state.view();
    assert!(view.loading);
    assert_eq!(view.error, None);
    assert_eq!(view.last_updated, None);
    assert!(state.consume_dirty());
    assert!(!state.consume_dirty());
}

#[test]
fn refresh_while_loading_is_dropped() {
    init_logging();
    let (mut state, _) = request(AppState::new(), RefreshTrigger::Startup);
    assert!(state.consume_dirty());

    let (mut state, effects) = request(state, RefreshTrigger::Manual);
    assert!(effects.is_empty());
    assert!(!state.consume_dirty());

    let (state, effects) = request(state, RefreshTrigger::Scheduled);
    assert!(effects.is_empty());
    assert_eq!(state.in_flight(), Some(1));
}

#[test]
fn successful_cycle_adopts_payload() {
    init_logging();
    let (state, effects) = request(AppState::new(), RefreshTrigger::Startup);
    let cycle_id = started_cycle(&effects);
    let events = vec![
        event("a", "HR", "critical"),
        event("b", "Finance", "low"),
        event("c", "hr", "High"),
    ];

    let state = complete(
        state,
        cycle_id,
        CycleOutcome::Fetched {
            events: events.clone(),
            summary: "All quiet".to_string(),
        },
        5,
    );

    let view = state.view();
    assert!(!view.loading);
    assert_eq!(view.error, None);
    assert_eq!(view.events, events);
    assert_eq!(view.summary, "All quiet");
    assert_eq!(view.last_updated, Some(at(5)));
    assert_eq!(view.stats.total, 3);
    assert_eq!(view.stats.source_count("hr"), 2);
    assert_eq!(view.stats.source_count("finance"), 1);
    assert_eq!(view.stats.critical, 2);
    assert_eq!(view.completed_cycles, 1);
}

#[test]
fn failed_cycle_serves_full_fallback_pair() {
    init_logging();
    let (state, effects) = request(AppState::new(), RefreshTrigger::Startup);
    let state = complete(
        state,
        started_cycle(&effects),
        CycleOutcome::Fetched {
            events: vec![event("real", "HR", "low")],
            summary: "real summary".to_string(),
        },
        1,
    );

    let (state, effects) = request(state, RefreshTrigger::Scheduled);
    let state = complete(
        state,
        started_cycle(&effects),
        CycleOutcome::Failed {
            reason: "events feed: http status 503".to_string(),
        },
        2,
    );

    let view = state.view();
    assert!(!view.loading);
    assert_eq!(view.error.as_deref(), Some("events feed: http status 503"));
    assert_eq!(view.events, fallback_events(at(2)));
    assert_eq!(view.summary, FALLBACK_SUMMARY);
    assert_eq!(view.last_updated, Some(at(2)));
}

#[test]
fn next_cycle_clears_error_but_keeps_last_updated() {
    init_logging();
    let (state, effects) = request(AppState::new(), RefreshTrigger::Startup);
    let state = complete(
        state,
        started_cycle(&effects),
        CycleOutcome::Failed {
            reason: "offline".to_string(),
        },
        1,
    );

    let (state, effects) = request(state, RefreshTrigger::Manual);
    assert_eq!(started_cycle(&effects), 2);
    let view = state.view();
    assert!(view.loading);
    assert_eq!(view.error, None);
    // Mid-cycle snapshots still carry the previous completion time.
    assert_eq!(view.last_updated, Some(at(1)));
}

#[test]
fn stale_completion_is_ignored() {
    init_logging();
    let (state, effects) = request(AppState::new(), RefreshTrigger::Startup);
    let first = started_cycle(&effects);
    let state = complete(
        state,
        first,
        CycleOutcome::Fetched {
            events: Vec::new(),
            summary: String::new(),
        },
        1,
    );
    let (mut state, _) = request(state, RefreshTrigger::Manual);
    assert!(state.consume_dirty());

    let (mut state, effects) = update(
        state,
        Msg::CycleCompleted {
            cycle_id: first,
            outcome: CycleOutcome::Failed {
                reason: "late".to_string(),
            },
            completed_at: at(9),
        },
    );

    assert!(effects.is_empty());
    assert!(!state.consume_dirty());
    let view = state.view();
    assert!(view.loading);
    assert_eq!(view.error, None);
    assert_eq!(view.last_updated, Some(at(1)));
}

#[test]
fn completion_without_request_is_ignored() {
    init_logging();
    let state = AppState::new();
    let (next, effects) = update(
        state.clone(),
        Msg::CycleCompleted {
            cycle_id: 1,
            outcome: CycleOutcome::Failed {
                reason: "x".to_string(),
            },
            completed_at: at(0),
        },
    );
    assert_eq!(next, state);
    assert!(effects.is_empty());
}

#[test]
fn custom_source_tags_flow_into_view() {
    init_logging();
    let state = AppState::with_source_tags(&["hr", "finance", "legal"]);
    let (state, effects) = request(state, RefreshTrigger::Startup);
    let state = complete(
        state,
        started_cycle(&effects),
        CycleOutcome::Fetched {
            events: vec![event("1", "Legal", "medium"), event("2", "LEGAL", "high")],
            summary: String::new(),
        },
        3,
    );

    let view = state.view();
    assert_eq!(view.source_tags, vec!["hr", "finance", "legal"]);
    assert_eq!(view.stats.source_count("legal"), 2);
    assert_eq!(view.stats.source_count("hr"), 0);
    assert_eq!(view.stats.critical, 1);
}
