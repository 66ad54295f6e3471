use battle_core::Side;
use serde::{Deserialize, Serialize};
use strum::Display;

/// Turn-loop states.
///
/// `Initializing → (PlayerPhase ⇄ FoePhase)* → Concluding`. The phase follows
/// the side of whoever the action queue hands the next turn to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BattlePhase {
    #[default]
    Initializing,
    PlayerPhase,
    FoePhase,
    Concluding,
}

impl BattlePhase {
    pub const fn for_side(side: Side) -> Self {
        match side {
            Side::Party => Self::PlayerPhase,
            Side::Foe => Self::FoePhase,
        }
    }
}
