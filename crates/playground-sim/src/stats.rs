//! Running totals over finished episodes.

use crate::episode::{Episode, EpisodeState};

#[derive(Clone, Debug, Default)]
pub struct EpisodeStats {
    pub episodes_completed: u32,
    pub total_ticks: u64,
    /// Episodes ended by a terminal element.
    pub terminated: u32,
    /// Episodes cut by the time limit.
    pub truncated: u32,
    /// Total reward of each finished episode, oldest first.
    pub rewards: Vec<f32>,
}

impl EpisodeStats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            episodes_completed: 0,
            total_ticks: 0,
            terminated: 0,
            truncated: 0,
            rewards: Vec::new(),
        }
    }

    /// Fold in an episode. Anything not yet finished is skipped.
    pub fn record(&mut self, episode: &Episode) {
        match episode.state {
            EpisodeState::Done => self.terminated += 1,
            EpisodeState::Truncated => self.truncated += 1,
            EpisodeState::Idle | EpisodeState::Running => return,
        }
        self.episodes_completed += 1;
        self.total_ticks += episode.tick;
        self.rewards.push(episode.total_reward);
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mean_episode_length(&self) -> Option<f32> {
        (self.episodes_completed > 0)
            .then(|| self.total_ticks as f32 / self.episodes_completed as f32)
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mean_reward(&self) -> Option<f32> {
        (!self.rewards.is_empty())
            .then(|| self.rewards.iter().sum::<f32>() / self.rewards.len() as f32)
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ended(state: EpisodeState, tick: u64, total_reward: f32) -> Episode {
        Episode {
            state,
            tick,
            total_reward,
            seed: Some(0),
            number: 1,
        }
    }

    #[test]
    fn nothing_recorded_means_no_means() {
        let stats = EpisodeStats::new();
        assert!(stats.mean_reward().is_none());
        assert!(stats.mean_episode_length().is_none());
    }

    #[test]
    fn unfinished_episodes_are_skipped() {
        let mut stats = EpisodeStats::new();
        stats.record(&ended(EpisodeState::Running, 40, 1.0));
        stats.record(&ended(EpisodeState::Idle, 0, 0.0));
        assert_eq!(stats.episodes_completed, 0);
        assert_eq!(stats.total_ticks, 0);
    }

    #[test]
    fn splits_outcomes_and_averages() {
        let mut stats = EpisodeStats::new();
        stats.record(&ended(EpisodeState::Done, 30, 6.0));
        stats.record(&ended(EpisodeState::Truncated, 90, -2.0));
        assert_eq!(stats.episodes_completed, 2);
        assert_eq!((stats.terminated, stats.truncated), (1, 1));
        assert_eq!(stats.total_ticks, 120);
        assert_eq!(stats.mean_episode_length(), Some(60.0));
        assert_eq!(stats.mean_reward(), Some(2.0));
    }

    #[test]
    fn reset_forgets_history() {
        let mut stats = EpisodeStats::new();
        stats.record(&ended(EpisodeState::Done, 5, 1.0));
        stats.reset();
        assert_eq!(stats.episodes_completed, 0);
        assert!(stats.rewards.is_empty());
    }
}
