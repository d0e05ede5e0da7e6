//! Episode lifecycle: `Idle` until the first reset, then `Running` until a
//! terminal element fires (`Done`) or the time limit runs out (`Truncated`).

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EpisodeState {
    #[default]
    Idle,
    Running,
    Done,
    Truncated,
}

impl EpisodeState {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Truncated)
    }
}

/// Counters for the current episode.
#[derive(Clone, Debug, Default)]
pub struct Episode {
    pub state: EpisodeState,
    pub tick: u64,
    /// Summed over every agent.
    pub total_reward: f32,
    pub seed: Option<u64>,
    /// 1 for the first episode after construction.
    pub number: u64,
}

impl Episode {
    pub const fn reset(&mut self, seed: u64) {
        *self = Self {
            state: EpisodeState::Running,
            tick: 0,
            total_reward: 0.0,
            seed: Some(seed),
            number: self.number + 1,
        };
    }

    /// Book one tick of reward and settle the state.
    ///
    /// A terminal element wins over the time limit when both hit on the same
    /// tick. Returns `true` only on the tick that ends the episode; a call
    /// outside a running episode changes nothing.
    pub fn close_tick(&mut self, reward: f32, terminated: bool, time_limit: Option<u64>) -> bool {
        if self.state != EpisodeState::Running {
            return false;
        }
        self.tick += 1;
        self.total_reward += reward;
        if terminated {
            self.state = EpisodeState::Done;
        } else if time_limit.is_some_and(|limit| self.tick >= limit) {
            self.state = EpisodeState::Truncated;
        }
        self.state.is_terminal()
    }

    #[must_use]
    pub const fn is_done(&self) -> bool {
        self.state.is_terminal()
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self.state, EpisodeState::Running)
    }
}
