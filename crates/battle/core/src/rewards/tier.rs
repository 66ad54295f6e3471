use core::ops::Range;

use strum::{Display, EnumString};

/// Encounter difficulty class; drives enrage fuse and loot tables.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EncounterTier {
    #[default]
    Normal,
    Elite,
    Boss,
}

impl EncounterTier {
    pub const fn is_boss(&self) -> bool {
        matches!(self, Self::Boss)
    }

    pub const fn base_gold(&self) -> f64 {
        match self {
            Self::Normal => 5.0,
            Self::Elite => 10.0,
            Self::Boss => 20.0,
        }
    }

    /// Range of the random gold multiplier.
    pub fn gold_multiplier_range(&self) -> Range<f64> {
        match self {
            Self::Normal => 1.53..2.25,
            Self::Elite => 1.75..3.0,
            Self::Boss => 2.05..4.25,
        }
    }

    pub const fn base_experience(&self) -> u64 {
        match self {
            Self::Normal => 10,
            Self::Elite => 25,
            Self::Boss => 50,
        }
    }

    /// Relic drop chance before rare-drop-rate scaling.
    pub const fn base_relic_chance(&self) -> f64 {
        match self {
            Self::Normal => 0.1,
            Self::Elite => 0.3,
            Self::Boss => 0.5,
        }
    }

    /// Upgrade items granted per victory.
    pub const fn item_count(&self) -> usize {
        match self {
            Self::Normal => 1,
            Self::Elite => 2,
            Self::Boss => 3,
        }
    }

    /// Maps a uniform draw in `[0, 1)` to a star rating.
    pub fn stars_for(&self, draw: f64) -> u32 {
        match self {
            Self::Normal => {
                if draw < 0.80 {
                    1
                } else if draw < 0.98 {
                    2
                } else {
                    3
                }
            }
            Self::Elite => {
                if draw < 0.5 {
                    1
                } else if draw < 0.9 {
                    2
                } else if draw < 0.99 {
                    3
                } else {
                    4
                }
            }
            Self::Boss => {
                if draw < 0.5 {
                    3
                } else if draw < 0.9 {
                    4
                } else {
                    5
                }
            }
        }
    }
}
