use crate::CycleId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Fetch both feeds and report back with `Msg::CycleCompleted` for this id.
    StartCycle { cycle_id: CycleId },
}
