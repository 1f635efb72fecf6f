use serde::{Deserialize, Serialize};

/// Number of discrete actions available to the learner
pub const NUM_ACTIONS: usize = 4;

/// Action the learner can take for a single tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Move towards the top edge of the arena
    MoveUp,
    /// Move towards the bottom edge of the arena
    MoveDown,
    /// Close the horizontal gap to the opponent
    Approach,
    /// Fire a projectile if the cooldown allows it
    Attack,
}

impl Action {
    /// All actions, ordered by their network output index
    pub const ALL: [Action; NUM_ACTIONS] = [
        Action::MoveUp,
        Action::MoveDown,
        Action::Approach,
        Action::Attack,
    ];

    /// Index of this action in the network output vector
    pub fn index(&self) -> usize {
        match self {
            Action::MoveUp => 0,
            Action::MoveDown => 1,
            Action::Approach => 2,
            Action::Attack => 3,
        }
    }

    /// Convert a network output index back into an action
    pub fn from_index(idx: usize) -> Option<Action> {
        Self::ALL.get(idx).copied()
    }
}
