use serde::{Deserialize, Serialize};

/// A position in arena coordinates (y grows downwards)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Move position by delta
    pub fn moved_by(&self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Euclidean distance to another position
    pub fn distance_to(&self, other: Position) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Which side fired a projectile, or won an episode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Learner,
    Opponent,
}

impl Side {
    /// The other combatant
    pub fn other(&self) -> Side {
        match self {
            Side::Learner => Side::Opponent,
            Side::Opponent => Side::Learner,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Learner => "learner",
            Side::Opponent => "opponent",
        }
    }
}

/// A fighter in the arena
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    pub position: Position,
    pub health: f32,
    pub speed: f32,
    /// Ticks remaining until the next attack is allowed
    pub cooldown: u32,
    pub attack_range: f32,
}

impl Combatant {
    pub fn new(position: Position, health: f32, speed: f32, attack_range: f32) -> Self {
        Self {
            position,
            health,
            speed,
            cooldown: 0,
            attack_range,
        }
    }

    pub fn is_defeated(&self) -> bool {
        self.health <= 0.0
    }

    pub fn can_attack(&self) -> bool {
        self.cooldown == 0
    }

    /// Apply damage, keeping health within `[0, max_health]`
    pub fn take_damage(&mut self, amount: f32, max_health: f32) {
        self.health = (self.health - amount).clamp(0.0, max_health);
    }

    pub fn tick_cooldown(&mut self) {
        self.cooldown = self.cooldown.saturating_sub(1);
    }
}

/// A projectile in flight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub position: Position,
    pub velocity: (f32, f32),
    pub owner: Side,
}

impl Projectile {
    /// Create a projectile at `from` travelling towards `to` at `speed`
    ///
    /// Coincident points produce a stationary projectile.
    pub fn aimed(from: Position, to: Position, speed: f32, owner: Side) -> Self {
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        let distance = if dx != 0.0 || dy != 0.0 {
            dx.hypot(dy)
        } else {
            1.0
        };

        Self {
            position: from,
            velocity: (dx / distance * speed, dy / distance * speed),
            owner,
        }
    }

    pub fn advance(&mut self) {
        self.position = self.position.moved_by(self.velocity.0, self.velocity.1);
    }
}

/// Complete arena state for one episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArenaState {
    pub learner: Combatant,
    pub opponent: Combatant,
    pub projectiles: Vec<Projectile>,
    pub arena_width: f32,
    pub arena_height: f32,
    pub ticks: u32,
    /// Reward accumulated over the episode so far
    pub total_reward: f32,
    /// Set exactly once, when the episode ends
    pub winner: Option<Side>,
}

impl ArenaState {
    pub fn new(
        learner: Combatant,
        opponent: Combatant,
        arena_width: f32,
        arena_height: f32,
    ) -> Self {
        Self {
            learner,
            opponent,
            projectiles: Vec::new(),
            arena_width,
            arena_height,
            ticks: 0,
            total_reward: 0.0,
            winner: None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.winner.is_some()
    }

    /// Check if a position lies strictly inside the arena
    pub fn is_in_bounds(&self, pos: Position) -> bool {
        pos.x > 0.0 && pos.x < self.arena_width && pos.y > 0.0 && pos.y < self.arena_height
    }

    pub fn combatant(&self, side: Side) -> &Combatant {
        match side {
            Side::Learner => &self.learner,
            Side::Opponent => &self.opponent,
        }
    }

    pub fn combatant_mut(&mut self, side: Side) -> &mut Combatant {
        match side {
            Side::Learner => &mut self.learner,
            Side::Opponent => &mut self.opponent,
        }
    }

    /// Distance between the two combatants
    pub fn separation(&self) -> f32 {
        self.learner.position.distance_to(self.opponent.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_distance() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(3.0, 4.0);
        assert_eq!(a.distance_to(b), 5.0);
        assert_eq!(b.distance_to(a), 5.0);
    }

    #[test]
    fn test_damage_is_clamped() {
        let mut c = Combatant::new(Position::new(0.0, 0.0), 10.0, 1.0, 60.0);
        c.take_damage(20.0, 100.0);
        assert_eq!(c.health, 0.0);
        assert!(c.is_defeated());

        c.take_damage(-500.0, 100.0);
        assert_eq!(c.health, 100.0);
    }

    #[test]
    fn test_cooldown_saturates() {
        let mut c = Combatant::new(Position::new(0.0, 0.0), 100.0, 1.0, 60.0);
        c.cooldown = 1;
        c.tick_cooldown();
        assert_eq!(c.cooldown, 0);
        c.tick_cooldown();
        assert_eq!(c.cooldown, 0);
        assert!(c.can_attack());
    }

    #[test]
    fn test_projectile_aim() {
        let from = Position::new(0.0, 0.0);
        let p = Projectile::aimed(from, Position::new(30.0, 40.0), 5.0, Side::Learner);
        assert!((p.velocity.0 - 3.0).abs() < 1e-6);
        assert!((p.velocity.1 - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_projectile_aim_coincident_points() {
        let here = Position::new(10.0, 10.0);
        let mut p = Projectile::aimed(here, here, 5.0, Side::Opponent);
        assert_eq!(p.velocity, (0.0, 0.0));
        p.advance();
        assert_eq!(p.position, here);
    }

    #[test]
    fn test_bounds_checking() {
        let c = Combatant::new(Position::new(0.0, 0.0), 100.0, 1.0, 60.0);
        let state = ArenaState::new(c.clone(), c, 600.0, 400.0);

        assert!(state.is_in_bounds(Position::new(1.0, 1.0)));
        assert!(!state.is_in_bounds(Position::new(0.0, 10.0)));
        assert!(!state.is_in_bounds(Position::new(600.0, 10.0)));
        assert!(!state.is_in_bounds(Position::new(10.0, 400.0)));
    }

    #[test]
    fn test_side_other() {
        assert_eq!(Side::Learner.other(), Side::Opponent);
        assert_eq!(Side::Opponent.other(), Side::Learner);
    }
}
