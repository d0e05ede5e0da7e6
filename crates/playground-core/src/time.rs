//! Tick-based timers.
//!
//! Timers advance by one unit per call to `step` while running and raise a
//! one-shot `tic` flag on the tick their duration elapses. The flag is
//! cleared on the next `step`.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// CountDownTimer
// ---------------------------------------------------------------------------

/// Fires once after `duration` ticks, then stops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountDownTimer {
    duration: u64,
    elapsed: u64,
    running: bool,
    autostart: bool,
    tic: bool,
}

impl CountDownTimer {
    pub fn new(duration: u64) -> Result<Self, ConfigError> {
        if duration == 0 {
            return Err(ConfigError::invalid("duration", "must be >= 1"));
        }
        Ok(Self {
            duration,
            elapsed: 0,
            running: false,
            autostart: false,
            tic: false,
        })
    }

    /// Start running on construction and after every reset.
    #[must_use]
    pub const fn autostart(mut self) -> Self {
        self.autostart = true;
        self.running = true;
        self
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Back to zero elapsed ticks; running again only if autostarted.
    pub fn reset(&mut self) {
        self.elapsed = 0;
        self.tic = false;
        self.running = self.autostart;
    }

    pub fn step(&mut self) {
        self.tic = false;
        if !self.running {
            return;
        }
        self.elapsed += 1;
        if self.elapsed >= self.duration {
            self.tic = true;
            self.running = false;
            self.elapsed = 0;
        }
    }

    #[must_use]
    pub const fn tic(&self) -> bool {
        self.tic
    }

    #[must_use]
    pub const fn running(&self) -> bool {
        self.running
    }

    #[must_use]
    pub const fn remaining(&self) -> u64 {
        self.duration - self.elapsed
    }

    #[must_use]
    pub const fn duration(&self) -> u64 {
        self.duration
    }
}

// ---------------------------------------------------------------------------
// PeriodicTimer
// ---------------------------------------------------------------------------

/// Fires at the end of each duration in `durations`, cycling forever.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodicTimer {
    durations: Vec<u64>,
    index: usize,
    elapsed: u64,
    running: bool,
    tic: bool,
}

impl PeriodicTimer {
    /// Periodic timers always run from construction and after reset.
    pub fn new(durations: Vec<u64>) -> Result<Self, ConfigError> {
        if durations.is_empty() {
            return Err(ConfigError::invalid("durations", "must not be empty"));
        }
        if durations.contains(&0) {
            return Err(ConfigError::invalid("durations", "every duration must be >= 1"));
        }
        Ok(Self {
            durations,
            index: 0,
            elapsed: 0,
            running: true,
            tic: false,
        })
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn reset(&mut self) {
        self.index = 0;
        self.elapsed = 0;
        self.running = true;
        self.tic = false;
    }

    pub fn step(&mut self) {
        self.tic = false;
        if !self.running {
            return;
        }
        self.elapsed += 1;
        if self.elapsed >= self.durations[self.index] {
            self.tic = true;
            self.elapsed = 0;
            self.index = (self.index + 1) % self.durations.len();
        }
    }

    #[must_use]
    pub const fn tic(&self) -> bool {
        self.tic
    }

    #[must_use]
    pub const fn running(&self) -> bool {
        self.running
    }

    /// Index of the duration currently counting.
    #[must_use]
    pub const fn phase(&self) -> usize {
        self.index
    }
}

// ---------------------------------------------------------------------------
// Timer
// ---------------------------------------------------------------------------

/// Either timer kind behind one interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Timer {
    CountDown(CountDownTimer),
    Periodic(PeriodicTimer),
}

impl Timer {
    pub fn step(&mut self) {
        match self {
            Self::CountDown(t) => t.step(),
            Self::Periodic(t) => t.step(),
        }
    }

    pub fn reset(&mut self) {
        match self {
            Self::CountDown(t) => t.reset(),
            Self::Periodic(t) => t.reset(),
        }
    }

    pub fn start(&mut self) {
        match self {
            Self::CountDown(t) => t.start(),
            Self::Periodic(t) => t.start(),
        }
    }

    pub fn stop(&mut self) {
        match self {
            Self::CountDown(t) => t.stop(),
            Self::Periodic(t) => t.stop(),
        }
    }

    #[must_use]
    pub const fn tic(&self) -> bool {
        match self {
            Self::CountDown(t) => t.tic(),
            Self::Periodic(t) => t.tic(),
        }
    }

    #[must_use]
    pub const fn running(&self) -> bool {
        match self {
            Self::CountDown(t) => t.running(),
            Self::Periodic(t) => t.running(),
        }
    }

    pub fn from_config(config: &TimerConfig) -> Result<Self, ConfigError> {
        match config {
            TimerConfig::CountDown {
                duration,
                autostart,
            } => {
                let t = CountDownTimer::new(*duration)?;
                Ok(Self::CountDown(if *autostart { t.autostart() } else { t }))
            }
            TimerConfig::Periodic { durations } => {
                Ok(Self::Periodic(PeriodicTimer::new(durations.clone())?))
            }
        }
    }
}

/// Serializable timer description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimerConfig {
    CountDown {
        duration: u64,
        #[serde(default)]
        autostart: bool,
    },
    Periodic {
        durations: Vec<u64>,
    },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
