//! Training statistics tracking
//!
//! Tracks the rolling history of episode rewards used for the moving average,
//! plus lifetime counters for episodes, steps, and wins on each side.

use std::collections::VecDeque;

use crate::game::Side;

/// Training statistics tracker with a rolling reward window
///
/// # Example
///
/// ```rust
/// use arena_rl::game::Side;
/// use arena_rl::metrics::TrainingStats;
///
/// let mut stats = TrainingStats::new(100);
/// stats.record_episode(4.5, 320, Side::Learner);
///
/// assert_eq!(stats.total_episodes(), 1);
/// println!("{}", stats.format_summary());
/// ```
#[derive(Debug, Clone)]
pub struct TrainingStats {
    /// Episode rewards (rolling window, oldest first)
    episode_rewards: VecDeque<f32>,

    /// Episode lengths in ticks (rolling window)
    episode_lengths: VecDeque<usize>,

    /// Reward of the most recently completed episode
    last_reward: f32,

    total_episodes: usize,
    total_steps: usize,
    learner_wins: usize,
    opponent_wins: usize,

    /// Window size for rolling averages
    window_size: usize,
}

impl TrainingStats {
    /// Create a new tracker keeping the last `window_size` episodes
    pub fn new(window_size: usize) -> Self {
        Self {
            episode_rewards: VecDeque::with_capacity(window_size),
            episode_lengths: VecDeque::with_capacity(window_size),
            last_reward: 0.0,
            total_episodes: 0,
            total_steps: 0,
            learner_wins: 0,
            opponent_wins: 0,
            window_size,
        }
    }

    /// Rebuild a tracker from persisted counters
    ///
    /// Only the newest `window_size` rewards are kept. Episode lengths are
    /// not persisted, so the length window starts empty.
    pub fn from_snapshot(
        window_size: usize,
        reward_history: &[f32],
        total_episodes: usize,
        total_steps: usize,
        learner_wins: usize,
        opponent_wins: usize,
    ) -> Self {
        let mut stats = Self::new(window_size);
        for &reward in reward_history {
            Self::push_deque(&mut stats.episode_rewards, reward, window_size);
        }
        stats.last_reward = reward_history.last().copied().unwrap_or(0.0);
        stats.total_episodes = total_episodes;
        stats.total_steps = total_steps;
        stats.learner_wins = learner_wins;
        stats.opponent_wins = opponent_wins;
        stats
    }

    /// Record the completion of an episode
    pub fn record_episode(&mut self, reward: f32, length: usize, winner: Side) {
        Self::push_deque(&mut self.episode_rewards, reward, self.window_size);
        Self::push_deque(&mut self.episode_lengths, length, self.window_size);
        self.last_reward = reward;
        self.total_episodes += 1;
        self.total_steps += length;
        match winner {
            Side::Learner => self.learner_wins += 1,
            Side::Opponent => self.opponent_wins += 1,
        }
    }

    /// Mean episode reward over the rolling window, 0.0 when empty
    pub fn mean_episode_reward(&self) -> f32 {
        if self.episode_rewards.is_empty() {
            0.0
        } else {
            self.episode_rewards.iter().sum::<f32>() / self.episode_rewards.len() as f32
        }
    }

    /// Mean episode length over the rolling window
    pub fn mean_episode_length(&self) -> f32 {
        let sum: usize = self.episode_lengths.iter().sum();
        if self.episode_lengths.is_empty() {
            0.0
        } else {
            sum as f32 / self.episode_lengths.len() as f32
        }
    }

    /// Share of all completed episodes won by the learner
    pub fn win_rate(&self) -> f32 {
        if self.total_episodes == 0 {
            0.0
        } else {
            self.learner_wins as f32 / self.total_episodes as f32
        }
    }

    /// Rolling reward history in completion order
    pub fn reward_history(&self) -> Vec<f32> {
        self.episode_rewards.iter().copied().collect()
    }

    pub fn last_reward(&self) -> f32 {
        self.last_reward
    }

    pub fn total_episodes(&self) -> usize {
        self.total_episodes
    }

    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    pub fn learner_wins(&self) -> usize {
        self.learner_wins
    }

    pub fn opponent_wins(&self) -> usize {
        self.opponent_wins
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Format a one-line summary of the current statistics
    pub fn format_summary(&self) -> String {
        format!(
            "Episodes: {} | Steps: {} | Last: {:.2} | Avg({}): {:.2} | Len: {:.1} | \
             Wins: {} - {} ({:.1}%)",
            self.total_episodes,
            self.total_steps,
            self.last_reward,
            self.episode_rewards.len(),
            self.mean_episode_reward(),
            self.mean_episode_length(),
            self.learner_wins,
            self.opponent_wins,
            self.win_rate() * 100.0,
        )
    }

    fn push_deque<T>(deque: &mut VecDeque<T>, value: T, window_size: usize) {
        if deque.len() >= window_size {
            deque.pop_front();
        }
        deque.push_back(value);
    }
}

impl Default for TrainingStats {
    fn default() -> Self {
        Self::new(100)
    }
}
