use serde::{Deserialize, Serialize};

pub const DEFAULT_WORK_SECS: u32 = 30;
pub const DEFAULT_BREAK_SECS: u32 = 60;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TimerMode {
    Work,
    Break,
}

impl Default for TimerMode {
    fn default() -> Self {
        TimerMode::Work
    }
}

impl TimerMode {
    pub fn opposite(self) -> Self {
        match self {
            TimerMode::Work => TimerMode::Break,
            TimerMode::Break => TimerMode::Work,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimerMode::Work => "Work",
            TimerMode::Break => "Break",
        }
    }
}

/// Fixed phase lengths, in seconds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PhaseDurations {
    pub work_secs: u32,
    pub break_secs: u32,
}

impl Default for PhaseDurations {
    fn default() -> Self {
        Self {
            work_secs: DEFAULT_WORK_SECS,
            break_secs: DEFAULT_BREAK_SECS,
        }
    }
}

impl PhaseDurations {
    pub fn for_mode(&self, mode: TimerMode) -> u32 {
        match mode {
            TimerMode::Work => self.work_secs,
            TimerMode::Break => self.break_secs,
        }
    }
}

/// A phase that just ran out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseCompletion {
    pub finished: TimerMode,
    pub next: TimerMode,
    pub rounds: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The timer was paused; nothing changed.
    Idle,
    Counting { time_left: u32 },
    PhaseComplete(PhaseCompletion),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub time_left: u32,
    pub is_running: bool,
    pub mode: TimerMode,
    pub rounds: u32,
    pub durations: PhaseDurations,
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new(PhaseDurations::default())
    }
}

impl TimerState {
    pub fn new(durations: PhaseDurations) -> Self {
        Self {
            time_left: durations.work_secs,
            is_running: false,
            mode: TimerMode::Work,
            rounds: 0,
            durations,
        }
    }

    pub fn phase_duration(&self) -> u32 {
        self.durations.for_mode(self.mode)
    }

    /// Fraction of the current phase already elapsed, in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        let total = self.phase_duration();
        if total == 0 {
            return 0.0;
        }
        let elapsed = total.saturating_sub(self.time_left);
        (elapsed as f64 / total as f64).clamp(0.0, 1.0)
    }

    pub fn toggle(&mut self) -> bool {
        self.is_running = !self.is_running;
        self.is_running
    }

    pub fn reset(&mut self) {
        self.is_running = false;
        self.time_left = self.phase_duration();
    }

    pub fn tick(&mut self) -> TickOutcome {
        if !self.is_running {
            return TickOutcome::Idle;
        }

        self.time_left = self.time_left.saturating_sub(1);
        if self.time_left > 0 {
            return TickOutcome::Counting {
                time_left: self.time_left,
            };
        }

        TickOutcome::PhaseComplete(self.complete_phase())
    }

    /// Switches to the other phase and pauses. Work completions count as a round.
    fn complete_phase(&mut self) -> PhaseCompletion {
        let finished = self.mode;
        if finished == TimerMode::Work {
            self.rounds = self.rounds.saturating_add(1);
        }

        self.mode = finished.opposite();
        self.time_left = self.phase_duration();
        self.is_running = false;

        PhaseCompletion {
            finished,
            next: self.mode,
            rounds: self.rounds,
        }
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            time_left: self.time_left,
            is_running: self.is_running,
            mode: self.mode,
            rounds: self.rounds,
            progress: self.progress(),
            formatted: format_time(self.time_left),
        }
    }
}

/// Read-only view handed to renderers after every state change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub time_left: u32,
    pub is_running: bool,
    pub mode: TimerMode,
    pub rounds: u32,
    pub progress: f64,
    pub formatted: String,
}

/// `MM:SS`, minutes zero-padded to two digits.
pub fn format_time(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
