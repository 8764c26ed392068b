pub mod controller;
pub mod state;

pub use controller::{SessionCompleteCallback, TimerConfig, TimerController};
pub use state::{
    format_time, PhaseCompletion, PhaseDurations, TickOutcome, TimerMode, TimerSnapshot,
    TimerState, DEFAULT_BREAK_SECS, DEFAULT_WORK_SECS,
};
