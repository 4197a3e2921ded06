use crate::{fallback_events, AppState, CycleOutcome, Effect, Msg, FALLBACK_SUMMARY};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::RefreshRequested { .. } => {
            // At most one cycle in flight; extra triggers are dropped, not queued.
            if state.is_loading() {
                return (state, Vec::new());
            }
            let cycle_id = state.begin_cycle();
            vec![Effect::StartCycle { cycle_id }]
        }
        Msg::CycleCompleted {
            cycle_id,
            outcome,
            completed_at,
        } => {
            if state.in_flight() != Some(cycle_id) {
                return (state, Vec::new());
            }
            match outcome {
                CycleOutcome::Fetched { events, summary } => {
                    state.complete_cycle(events, summary, None, completed_at);
                }
                CycleOutcome::Failed { reason } => {
                    state.complete_cycle(
                        fallback_events(completed_at),
                        FALLBACK_SUMMARY.to_string(),
                        Some(reason),
                        completed_at,
                    );
                }
            }
            Vec::new()
        }
    };

    (state, effects)
}
