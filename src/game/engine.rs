use super::{
    action::Action,
    config::ArenaConfig,
    state::{ArenaState, Combatant, Position, Projectile, Side},
};
use rand::{Rng, SeedableRng, distributions::Standard, rngs::StdRng};

/// Information about a step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepInfo {
    /// Whether the learner spawned a projectile this step
    pub learner_fired: bool,
    /// Whether the opponent spawned a projectile this step
    pub opponent_fired: bool,
    /// Learner projectiles that hit the opponent this step
    pub hits_dealt: u32,
    /// Opponent projectiles that hit the learner this step
    pub hits_taken: u32,
    /// Winner, if the episode ended on this step
    pub winner: Option<Side>,
}

/// Result of an arena step
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// Shaped reward for the learner
    pub reward: f32,
    /// Whether the episode has ended
    pub terminated: bool,
    /// Additional information about the step
    pub info: StepInfo,
}

/// The arena engine that handles physics, the scripted opponent, and reward shaping
pub struct ArenaEngine {
    config: ArenaConfig,
    rng: StdRng,
}

impl ArenaEngine {
    /// Create a new engine drawing opponent randomness from `rng`
    pub fn new(config: ArenaConfig, rng: StdRng) -> Self {
        Self { config, rng }
    }

    /// Create an engine with a reproducible random source
    pub fn with_seed(config: ArenaConfig, seed: u64) -> Self {
        Self::new(config, StdRng::seed_from_u64(seed))
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    /// Build the start-of-episode state
    pub fn reset(&self) -> ArenaState {
        let c = &self.config;
        let learner = Combatant::new(
            Position::new(c.learner_start.0, c.learner_start.1),
            c.max_health,
            c.learner_speed,
            c.attack_range,
        );
        // The opponent never walks; it only jitters vertically
        let opponent = Combatant::new(
            Position::new(c.opponent_start.0, c.opponent_start.1),
            c.max_health,
            0.0,
            c.attack_range,
        );

        ArenaState::new(learner, opponent, c.width, c.height)
    }

    /// Execute one tick of the arena
    pub fn step(&mut self, state: &mut ArenaState, action: Action) -> StepResult {
        if state.is_done() {
            return StepResult {
                reward: 0.0,
                terminated: true,
                info: StepInfo::default(),
            };
        }

        let mut info = StepInfo::default();
        let mut reward = self.apply_learner_action(state, action, &mut info);

        self.run_opponent(state, &mut info);
        reward += self.advance_projectiles(state, &mut info);

        state.learner.tick_cooldown();
        state.opponent.tick_cooldown();

        // Learner defeat is checked first; a double knockout counts as a loss
        let rewards = &self.config.rewards;
        if state.learner.is_defeated() {
            reward += rewards.loss;
            state.winner = Some(Side::Opponent);
        } else if state.opponent.is_defeated() {
            reward += rewards.win;
            state.winner = Some(Side::Learner);
        }
        info.winner = state.winner;

        reward += rewards.survival;

        state.total_reward += reward;
        state.ticks += 1;

        StepResult {
            reward,
            terminated: state.is_done(),
            info,
        }
    }

    fn apply_learner_action(
        &self,
        state: &mut ArenaState,
        action: Action,
        info: &mut StepInfo,
    ) -> f32 {
        let c = &self.config;
        let learner = &mut state.learner;

        match action {
            Action::MoveUp => {
                let y = learner.position.y - learner.speed;
                learner.position.y = y.clamp(c.min_y(), c.max_y());
                0.0
            }
            Action::MoveDown => {
                let y = learner.position.y + learner.speed;
                learner.position.y = y.clamp(c.min_y(), c.max_y());
                0.0
            }
            Action::Approach => {
                let dx = state.opponent.position.x - learner.position.x;
                if dx.abs() > c.approach_min_gap {
                    learner.position.x += learner.speed.copysign(dx);
                }
                c.rewards.approach
            }
            Action::Attack => {
                if !learner.can_attack() {
                    return 0.0;
                }

                let target = state.opponent.position;
                if learner.position.distance_to(target) < learner.attack_range {
                    state.projectiles.push(Projectile::aimed(
                        learner.position,
                        target,
                        c.projectile_speed,
                        Side::Learner,
                    ));
                    learner.cooldown = c.attack_cooldown;
                    info.learner_fired = true;
                    c.rewards.attack_in_range
                } else {
                    c.rewards.attack_out_of_range
                }
            }
        }
    }

    /// Scripted opponent: occasional vertical jitter, occasional shot when close
    fn run_opponent(&mut self, state: &mut ArenaState, info: &mut StepInfo) {
        let c = &self.config;
        let opponent = &mut state.opponent;

        let jitter_roll: f32 = self.rng.sample(Standard);
        if jitter_roll < c.opponent_jitter_probability {
            let offset: f32 = self.rng.sample(Standard);
            opponent.position.y += (offset - 0.5) * c.opponent_jitter_amplitude;
        }
        opponent.position.y = opponent.position.y.clamp(c.min_y(), c.max_y());

        let fire_roll: f32 = self.rng.sample(Standard);
        if opponent.can_attack() && fire_roll < c.opponent_fire_probability {
            let target = state.learner.position;
            if opponent.position.distance_to(target) < c.opponent_detection_radius {
                state.projectiles.push(Projectile::aimed(
                    opponent.position,
                    target,
                    c.projectile_speed,
                    Side::Opponent,
                ));
                opponent.cooldown = c.attack_cooldown;
                info.opponent_fired = true;
            }
        }
    }

    /// Move projectiles, resolve hits, and drop those that left the arena
    fn advance_projectiles(&self, state: &mut ArenaState, info: &mut StepInfo) -> f32 {
        let c = &self.config;
        let mut reward = 0.0;
        let mut in_flight = Vec::with_capacity(state.projectiles.len());

        for mut projectile in std::mem::take(&mut state.projectiles) {
            projectile.advance();

            let target = projectile.owner.other();
            let target_position = state.combatant(target).position;
            if projectile.position.distance_to(target_position) < c.hit_radius {
                state.combatant_mut(target).take_damage(c.hit_damage, c.max_health);
                match target {
                    Side::Learner => {
                        reward += c.rewards.hit_taken;
                        info.hits_taken += 1;
                    }
                    Side::Opponent => {
                        reward += c.rewards.hit_dealt;
                        info.hits_dealt += 1;
                    }
                }
                continue;
            }

            if state.is_in_bounds(projectile.position) {
                in_flight.push(projectile);
            }
        }

        state.projectiles = in_flight;
        reward
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    /// Opponent that never moves or fires
    fn passive_config() -> ArenaConfig {
        ArenaConfig {
            opponent_jitter_probability: 0.0,
            opponent_fire_probability: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_reset() {
        let engine = ArenaEngine::with_seed(ArenaConfig::default(), 7);
        let state = engine.reset();

        assert!(!state.is_done());
        assert_eq!(state.learner.position, Position::new(500.0, 200.0));
        assert_eq!(state.opponent.position, Position::new(100.0, 200.0));
        assert_eq!(state.learner.health, 100.0);
        assert_eq!(state.learner.cooldown, 0);
        assert!(state.projectiles.is_empty());
        assert_eq!(state.total_reward, 0.0);
    }

    #[test]
    fn test_vertical_movement_is_clamped() {
        let mut engine = ArenaEngine::with_seed(passive_config(), 1);
        let mut state = engine.reset();
        state.learner.position.y = 31.0;

        let result = engine.step(&mut state, Action::MoveUp);
        assert_eq!(state.learner.position.y, 30.0);
        assert!((result.reward - 0.005).abs() < EPS);

        state.learner.position.y = 369.0;
        engine.step(&mut state, Action::MoveDown);
        assert_eq!(state.learner.position.y, 370.0);
    }

    #[test]
    fn test_approach_moves_towards_opponent() {
        let mut engine = ArenaEngine::with_seed(passive_config(), 1);
        let mut state = engine.reset();

        let result = engine.step(&mut state, Action::Approach);
        assert_eq!(state.learner.position.x, 497.5);
        assert!((result.reward - (0.01 + 0.005)).abs() < EPS);
    }

    #[test]
    fn test_approach_stops_inside_min_gap() {
        let mut engine = ArenaEngine::with_seed(passive_config(), 1);
        let mut state = engine.reset();
        state.learner.position.x = 160.0;

        let result = engine.step(&mut state, Action::Approach);
        assert_eq!(state.learner.position.x, 160.0);
        assert!((result.reward - 0.015).abs() < EPS);
    }

    #[test]
    fn test_attack_in_range_spawns_projectile() {
        let mut engine = ArenaEngine::with_seed(passive_config(), 1);
        let mut state = engine.reset();
        state.learner.position = Position::new(150.0, 200.0);

        let result = engine.step(&mut state, Action::Attack);

        assert!(result.info.learner_fired);
        assert_eq!(state.projectiles.len(), 1);
        assert_eq!(state.projectiles[0].owner, Side::Learner);
        // Cooldown was set to 30 and already ticked once
        assert_eq!(state.learner.cooldown, 29);
        assert!((result.reward - (0.1 + 0.005)).abs() < EPS);
    }

    #[test]
    fn test_attack_out_of_range_keeps_cooldown() {
        let mut engine = ArenaEngine::with_seed(ArenaConfig::default(), 3);
        let mut state = engine.reset();
        state.learner.position = Position::new(1100.0, 200.0);
        assert_eq!(state.separation(), 1000.0);

        let result = engine.step(&mut state, Action::Attack);

        assert!(!result.info.learner_fired);
        assert!(state.projectiles.is_empty());
        assert_eq!(state.learner.cooldown, 0);
        assert!((result.reward - (-0.05 + 0.005)).abs() < EPS);
    }

    #[test]
    fn test_attack_on_cooldown_does_nothing() {
        let mut engine = ArenaEngine::with_seed(passive_config(), 1);
        let mut state = engine.reset();
        state.learner.position = Position::new(150.0, 200.0);
        state.learner.cooldown = 5;

        let result = engine.step(&mut state, Action::Attack);

        assert!(state.projectiles.is_empty());
        assert_eq!(state.learner.cooldown, 4);
        assert!((result.reward - 0.005).abs() < EPS);
    }

    #[test]
    fn test_learner_hit_on_opponent() {
        let mut engine = ArenaEngine::with_seed(passive_config(), 1);
        let mut state = engine.reset();
        let target = state.opponent.position;
        state.projectiles.push(Projectile {
            position: target.moved_by(10.0, 0.0),
            velocity: (-5.0, 0.0),
            owner: Side::Learner,
        });

        let result = engine.step(&mut state, Action::MoveUp);

        assert_eq!(result.info.hits_dealt, 1);
        assert_eq!(state.opponent.health, 80.0);
        assert!(state.projectiles.is_empty());
        assert!((result.reward - (1.0 + 0.005)).abs() < EPS);
    }

    #[test]
    fn test_projectile_leaves_arena() {
        let mut engine = ArenaEngine::with_seed(passive_config(), 1);
        let mut state = engine.reset();
        state.projectiles.push(Projectile {
            position: Position::new(300.0, 2.0),
            velocity: (0.0, -5.0),
            owner: Side::Opponent,
        });

        engine.step(&mut state, Action::MoveDown);
        assert!(state.projectiles.is_empty());
        assert_eq!(state.learner.health, 100.0);
    }

    #[test]
    fn test_opponent_fires_when_learner_close() {
        let config = ArenaConfig {
            opponent_jitter_probability: 0.0,
            opponent_fire_probability: 1.0,
            ..Default::default()
        };
        let mut engine = ArenaEngine::with_seed(config, 1);
        let mut state = engine.reset();
        state.learner.position = Position::new(250.0, 200.0);

        let result = engine.step(&mut state, Action::MoveUp);

        assert!(result.info.opponent_fired);
        assert_eq!(state.projectiles.len(), 1);
        assert_eq!(state.projectiles[0].owner, Side::Opponent);
        assert_eq!(state.opponent.cooldown, 29);
    }

    #[test]
    fn test_opponent_holds_fire_when_learner_far() {
        let config = ArenaConfig {
            opponent_fire_probability: 1.0,
            ..Default::default()
        };
        let mut engine = ArenaEngine::with_seed(config, 1);
        let mut state = engine.reset();

        let result = engine.step(&mut state, Action::MoveUp);

        assert!(!result.info.opponent_fired);
        assert_eq!(state.opponent.cooldown, 0);
    }

    #[test]
    fn test_learner_defeat_ends_episode() {
        let mut engine = ArenaEngine::with_seed(passive_config(), 1);
        let mut state = engine.reset();
        state.learner.health = 20.0;
        let target = state.learner.position;
        state.projectiles.push(Projectile {
            position: target.moved_by(-10.0, 0.0),
            velocity: (5.0, 0.0),
            owner: Side::Opponent,
        });

        let result = engine.step(&mut state, Action::MoveUp);

        assert!(result.terminated);
        assert_eq!(state.learner.health, 0.0);
        assert_eq!(state.winner, Some(Side::Opponent));
        assert_eq!(result.info.winner, Some(Side::Opponent));
        assert!((result.reward - (-1.0 - 5.0 + 0.005)).abs() < EPS);
        assert!((state.total_reward - result.reward).abs() < EPS);
    }

    #[test]
    fn test_opponent_defeat_ends_episode() {
        let mut engine = ArenaEngine::with_seed(passive_config(), 1);
        let mut state = engine.reset();
        state.opponent.health = 20.0;
        let target = state.opponent.position;
        state.projectiles.push(Projectile {
            position: target.moved_by(10.0, 0.0),
            velocity: (-5.0, 0.0),
            owner: Side::Learner,
        });

        let result = engine.step(&mut state, Action::MoveUp);

        assert!(result.terminated);
        assert_eq!(state.winner, Some(Side::Learner));
        assert!((result.reward - (1.0 + 5.0 + 0.005)).abs() < EPS);
    }

    #[test]
    fn test_double_knockout_counts_as_loss() {
        let mut engine = ArenaEngine::with_seed(passive_config(), 1);
        let mut state = engine.reset();
        state.learner.health = 20.0;
        state.opponent.health = 20.0;
        let learner_pos = state.learner.position;
        let opponent_pos = state.opponent.position;
        state.projectiles.push(Projectile {
            position: learner_pos.moved_by(-10.0, 0.0),
            velocity: (5.0, 0.0),
            owner: Side::Opponent,
        });
        state.projectiles.push(Projectile {
            position: opponent_pos.moved_by(10.0, 0.0),
            velocity: (-5.0, 0.0),
            owner: Side::Learner,
        });

        let result = engine.step(&mut state, Action::MoveDown);

        assert_eq!(state.winner, Some(Side::Opponent));
        assert!((result.reward - (-1.0 + 1.0 - 5.0 + 0.005)).abs() < EPS);
    }

    #[test]
    fn test_terminated_game_no_update() {
        let mut engine = ArenaEngine::with_seed(passive_config(), 1);
        let mut state = engine.reset();
        state.winner = Some(Side::Learner);
        let before = state.clone();

        let result = engine.step(&mut state, Action::Approach);

        assert!(result.terminated);
        assert_eq!(result.reward, 0.0);
        assert_eq!(state, before);
    }

    #[test]
    fn test_invariants_hold_over_long_run() {
        let config = ArenaConfig {
            opponent_fire_probability: 1.0,
            ..Default::default()
        };
        let mut engine = ArenaEngine::with_seed(config, 42);
        let mut state = engine.reset();
        state.learner.position = Position::new(160.0, 200.0);

        for i in 0..5_000 {
            if state.is_done() {
                state = engine.reset();
            }
            let action = Action::ALL[i % Action::ALL.len()];
            engine.step(&mut state, action);

            for c in [&state.learner, &state.opponent] {
                assert!((0.0..=100.0).contains(&c.health));
                assert!(c.cooldown <= 30);
                assert!(c.position.y >= 30.0 && c.position.y <= 370.0);
            }
        }
    }

    #[test]
    fn test_opponent_never_moves_horizontally() {
        let config = ArenaConfig {
            opponent_jitter_probability: 1.0,
            ..Default::default()
        };
        let mut engine = ArenaEngine::with_seed(config, 9);
        let mut state = engine.reset();
        assert_eq!(state.opponent.speed, 0.0);

        let mut jittered = false;
        for i in 0..500 {
            if state.is_done() {
                state = engine.reset();
            }
            let before = state.opponent.position;
            engine.step(&mut state, Action::ALL[i % 2]);
            assert_eq!(state.opponent.position.x, 100.0);
            jittered |= state.opponent.position.y != before.y;
        }
        assert!(jittered);
    }
}
