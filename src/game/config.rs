use serde::{Deserialize, Serialize};

/// Reward shaping applied by the engine each tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// Granted whenever the learner chooses to approach
    pub approach: f32,
    /// Granted for firing while the opponent is within attack range
    pub attack_in_range: f32,
    /// Applied for attacking while the opponent is out of range
    pub attack_out_of_range: f32,
    /// Applied when an opponent projectile hits the learner
    pub hit_taken: f32,
    /// Granted when a learner projectile hits the opponent
    pub hit_dealt: f32,
    /// Granted when the opponent is defeated
    pub win: f32,
    /// Applied when the learner is defeated
    pub loss: f32,
    /// Added every tick the episode is active
    pub survival: f32,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            approach: 0.01,
            attack_in_range: 0.1,
            attack_out_of_range: -0.05,
            hit_taken: -1.0,
            hit_dealt: 1.0,
            win: 5.0,
            loss: -5.0,
            survival: 0.005,
        }
    }
}

/// Configuration for the arena simulation
///
/// Distances are in arena pixels, durations in ticks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Width of the arena
    pub width: f32,
    /// Height of the arena
    pub height: f32,
    /// Vertical margin combatants cannot cross
    pub margin: f32,

    /// Learner start position
    pub learner_start: (f32, f32),
    /// Opponent start position
    pub opponent_start: (f32, f32),
    pub learner_speed: f32,

    pub max_health: f32,
    /// Maximum distance at which the learner may fire
    pub attack_range: f32,
    /// Ticks a combatant must wait after firing
    pub attack_cooldown: u32,
    pub projectile_speed: f32,
    /// Projectiles closer than this to their target count as a hit
    pub hit_radius: f32,
    pub hit_damage: f32,
    /// Approach only moves while the horizontal gap is larger than this
    pub approach_min_gap: f32,

    /// The opponent only fires when the learner is closer than this
    pub opponent_detection_radius: f32,
    /// Per-tick probability of a random vertical jitter
    pub opponent_jitter_probability: f32,
    /// Size of the jitter window, centered on zero
    pub opponent_jitter_amplitude: f32,
    /// Per-tick probability of firing when ready
    pub opponent_fire_probability: f32,

    /// Normaliser for the distance feature of the observation
    pub distance_scale: f32,

    pub rewards: RewardConfig,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width: 600.0,
            height: 400.0,
            margin: 30.0,
            learner_start: (500.0, 200.0),
            opponent_start: (100.0, 200.0),
            learner_speed: 2.5,
            max_health: 100.0,
            attack_range: 60.0,
            attack_cooldown: 30,
            projectile_speed: 5.0,
            hit_radius: 20.0,
            hit_damage: 20.0,
            approach_min_gap: 70.0,
            opponent_detection_radius: 200.0,
            opponent_jitter_probability: 0.02,
            opponent_jitter_amplitude: 10.0,
            opponent_fire_probability: 0.05,
            distance_scale: 500.0,
            rewards: RewardConfig::default(),
        }
    }
}

impl ArenaConfig {
    /// Lowest y coordinate a combatant may occupy
    pub fn min_y(&self) -> f32 {
        self.margin
    }

    /// Highest y coordinate a combatant may occupy
    pub fn max_y(&self) -> f32 {
        self.height - self.margin
    }

    /// Check that the configuration describes a playable arena
    pub fn validate(&self) -> Result<(), String> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(format!(
                "arena must have positive size, got {}x{}",
                self.width, self.height
            ));
        }

        if self.margin < 0.0 || 2.0 * self.margin >= self.height {
            return Err(format!(
                "margin must be in [0, height/2), got {}",
                self.margin
            ));
        }

        if self.max_health <= 0.0 {
            return Err(format!(
                "max_health must be positive, got {}",
                self.max_health
            ));
        }

        if self.attack_cooldown == 0 {
            return Err("attack_cooldown must be at least 1".to_string());
        }

        if self.distance_scale <= 0.0 {
            return Err(format!(
                "distance_scale must be positive, got {}",
                self.distance_scale
            ));
        }

        for (name, p) in [
            ("opponent_jitter_probability", self.opponent_jitter_probability),
            ("opponent_fire_probability", self.opponent_fire_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(format!("{} must be in [0, 1], got {}", name, p));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ArenaConfig::default();
        assert_eq!(config.width, 600.0);
        assert_eq!(config.height, 400.0);
        assert_eq!(config.attack_cooldown, 30);
        assert_eq!(config.min_y(), 30.0);
        assert_eq!(config.max_y(), 370.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_rewards() {
        let rewards = RewardConfig::default();
        assert_eq!(rewards.win, 5.0);
        assert_eq!(rewards.loss, -5.0);
        assert_eq!(rewards.survival, 0.005);
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let config: ArenaConfig =
            serde_json::from_str(r#"{"opponent_speed": 3.0, "learner_speed": 4.0}"#).unwrap();
        assert_eq!(config.learner_speed, 4.0);
    }

    #[test]
    fn test_validation_rejects_bad_probability() {
        let config = ArenaConfig {
            opponent_fire_probability: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_oversized_margin() {
        let config = ArenaConfig {
            margin: 250.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ArenaConfig = serde_json::from_str(r#"{"width": 800.0}"#).unwrap();
        assert_eq!(config.width, 800.0);
        assert_eq!(config.height, 400.0);
        assert_eq!(config.rewards, RewardConfig::default());
    }
}
