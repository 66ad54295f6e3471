//! Stat identifiers and their runtime bounds.

use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Enum representing every stat an effect may target.
///
/// Used as the key of effect delta maps, diminishing-returns tables and
/// catalog payloads.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter, EnumString, AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StatKind {
    MaxHp,
    Atk,
    Defense,
    CritRate,
    CritDamage,
    Mitigation,
    Vitality,
    Speed,
    DodgeOdds,
    Regain,
    EffectHitRate,
    EffectResistance,
}

impl StatKind {
    /// Inclusive `(min, max)` bounds applied to the runtime value.
    pub const fn bounds(&self) -> (f64, f64) {
        match self {
            Self::MaxHp => (1.0, f64::MAX),
            Self::Atk | Self::Defense | Self::Regain => (0.0, f64::MAX),
            Self::CritRate | Self::DodgeOdds => (0.0, 1.0),
            Self::CritDamage => (1.0, f64::MAX),
            Self::Mitigation => (0.1, f64::MAX),
            Self::Vitality => (0.01, f64::MAX),
            Self::Speed => (1.0, f64::MAX),
            Self::EffectHitRate | Self::EffectResistance => (0.0, f64::MAX),
        }
    }

    /// Clamp a raw value into this stat's bounds. NaN collapses to the lower bound.
    pub fn clamp_value(&self, value: f64) -> f64 {
        let (min, max) = self.bounds();
        if value.is_nan() {
            return min;
        }
        value.clamp(min, max)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn names_round_trip_through_strings() {
        for kind in StatKind::iter() {
            let name = kind.to_string();
            assert_eq!(StatKind::from_str(&name).unwrap(), kind);
        }
        assert_eq!(StatKind::DodgeOdds.as_ref(), "dodge_odds");
    }

    #[test]
    fn mitigation_floor_is_enforced() {
        assert_eq!(StatKind::Mitigation.clamp_value(0.0), 0.1);
        assert_eq!(StatKind::DodgeOdds.clamp_value(3.0), 1.0);
        assert_eq!(StatKind::DodgeOdds.clamp_value(-1.0), 0.0);
        assert_eq!(StatKind::Atk.clamp_value(f64::NAN), 0.0);
    }
}
