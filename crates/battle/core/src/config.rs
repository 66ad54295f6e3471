//! Battle configuration constants and tunable parameters.

use std::collections::BTreeMap;

use crate::stats::StatKind;

/// Diminishing-returns parameters for a single stat.
///
/// `effectiveness = 1 / scaling_factor ^ floor((value - base_offset) / threshold)`,
/// clamped to `[MIN_EFFECTIVENESS, 1.0]`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiminishingRule {
    pub threshold: f64,
    pub scaling_factor: f64,
    pub base_offset: f64,
}

impl DiminishingRule {
    pub const MIN_EFFECTIVENESS: f64 = 1e-6;

    pub const fn new(threshold: f64, scaling_factor: f64, base_offset: f64) -> Self {
        Self {
            threshold,
            scaling_factor,
            base_offset,
        }
    }

    /// True if every parameter is finite, the threshold positive and the
    /// scaling factor above one.
    pub fn is_well_formed(&self) -> bool {
        self.threshold.is_finite()
            && self.scaling_factor.is_finite()
            && self.base_offset.is_finite()
            && self.threshold > 0.0
            && self.scaling_factor > 1.0
    }

    /// Effectiveness multiplier for an additive buff landing on `current`.
    pub fn effectiveness(&self, current: f64) -> f64 {
        if !current.is_finite() {
            return Self::MIN_EFFECTIVENESS;
        }
        let threshold = self.threshold.max(f64::EPSILON);
        let steps = ((current - self.base_offset) / threshold).floor();
        if steps.is_nan() || steps <= 0.0 {
            return 1.0;
        }
        let scaling = self.scaling_factor.max(1.0);
        (1.0 / scaling.powf(steps)).clamp(Self::MIN_EFFECTIVENESS, 1.0)
    }
}

/// Per-stat diminishing-returns table. Stats without a rule are never scaled.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct DiminishingTable {
    rules: BTreeMap<StatKind, DiminishingRule>,
}

impl DiminishingTable {
    pub fn empty() -> Self {
        Self {
            rules: BTreeMap::new(),
        }
    }

    pub fn with_rule(mut self, stat: StatKind, rule: DiminishingRule) -> Self {
        self.rules.insert(stat, rule);
        self
    }

    pub fn rule(&self, stat: StatKind) -> Option<&DiminishingRule> {
        self.rules.get(&stat)
    }

    pub fn iter(&self) -> impl Iterator<Item = (StatKind, &DiminishingRule)> {
        self.rules.iter().map(|(stat, rule)| (*stat, rule))
    }

    /// Effectiveness for a buff to `stat` when its runtime value is `current`.
    pub fn effectiveness(&self, stat: StatKind, current: f64) -> f64 {
        self.rule(stat)
            .map_or(1.0, |rule| rule.effectiveness(current))
    }
}

impl Default for DiminishingTable {
    fn default() -> Self {
        Self::empty()
            .with_rule(StatKind::MaxHp, DiminishingRule::new(1000.0, 2.0, 0.0))
            .with_rule(StatKind::Atk, DiminishingRule::new(500.0, 2.0, 0.0))
            .with_rule(StatKind::Defense, DiminishingRule::new(500.0, 2.0, 0.0))
            .with_rule(StatKind::CritRate, DiminishingRule::new(0.25, 2.0, 0.05))
            .with_rule(StatKind::CritDamage, DiminishingRule::new(1.0, 2.0, 2.0))
            .with_rule(StatKind::Vitality, DiminishingRule::new(0.5, 2.0, 1.0))
            .with_rule(StatKind::Mitigation, DiminishingRule::new(0.5, 2.0, 1.0))
            .with_rule(StatKind::Speed, DiminishingRule::new(200.0, 2.0, 0.0))
            .with_rule(StatKind::DodgeOdds, DiminishingRule::new(0.1, 2.0, 0.05))
            .with_rule(StatKind::Regain, DiminishingRule::new(100.0, 2.0, 0.0))
            .with_rule(StatKind::EffectHitRate, DiminishingRule::new(0.5, 2.0, 0.0))
            .with_rule(StatKind::EffectResistance, DiminishingRule::new(0.5, 2.0, 0.0))
    }
}

/// Battle configuration shared by every encounter in a runtime.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BattleConfig {
    /// Gauge every combatant drains before acting; base AV = gauge / speed.
    pub gauge_start: f64,
    /// Turns before enrage activates in a normal or elite encounter.
    pub enrage_threshold_normal: u32,
    /// Turns before enrage activates in a boss encounter.
    pub enrage_threshold_boss: u32,
    /// Damage-taken increase per enrage stack (1.35 = +135%).
    pub enrage_damage_per_stack: f64,
    /// Enrage stacks between two waves of bleed.
    pub enrage_bleed_interval: u32,
    /// Fraction of max HP per stack dealt by each bleed tick.
    pub enrage_bleed_fraction: f64,
    /// Duration in turns of an enrage bleed.
    pub enrage_bleed_turns: u32,
    /// Rare-drop-rate credited per unique foe kill.
    pub rdr_per_kill: f64,
    /// Ultimate charge needed before an ultimate fires.
    pub ultimate_charge_cap: u32,
    /// Diminishing returns for additive buffs.
    pub diminishing: DiminishingTable,
}

impl BattleConfig {
    pub const GAUGE_START: f64 = 10_000.0;
    pub const ENRAGE_THRESHOLD_NORMAL: u32 = 100;
    pub const ENRAGE_THRESHOLD_BOSS: u32 = 500;
    pub const ENRAGE_DAMAGE_PER_STACK: f64 = 1.35;
    pub const ENRAGE_BLEED_INTERVAL: u32 = 10;
    pub const ENRAGE_BLEED_FRACTION: f64 = 0.005;
    pub const ENRAGE_BLEED_TURNS: u32 = 10;
    pub const RDR_PER_KILL: f64 = 0.55;
    pub const ULTIMATE_CHARGE_CAP: u32 = 15;
    /// Shield gained from overhealing an already shielded target.
    pub const OVERHEAL_SHIELD_EFFECTIVENESS: f64 = 0.2;

    pub fn new() -> Self {
        Self {
            gauge_start: Self::GAUGE_START,
            enrage_threshold_normal: Self::ENRAGE_THRESHOLD_NORMAL,
            enrage_threshold_boss: Self::ENRAGE_THRESHOLD_BOSS,
            enrage_damage_per_stack: Self::ENRAGE_DAMAGE_PER_STACK,
            enrage_bleed_interval: Self::ENRAGE_BLEED_INTERVAL,
            enrage_bleed_fraction: Self::ENRAGE_BLEED_FRACTION,
            enrage_bleed_turns: Self::ENRAGE_BLEED_TURNS,
            rdr_per_kill: Self::RDR_PER_KILL,
            ultimate_charge_cap: Self::ULTIMATE_CHARGE_CAP,
            diminishing: DiminishingTable::default(),
        }
    }

    /// Enrage threshold for an encounter, boss encounters get the longer fuse.
    pub fn enrage_threshold(&self, boss: bool) -> u32 {
        if boss {
            self.enrage_threshold_boss
        } else {
            self.enrage_threshold_normal
        }
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self::new()
    }
}
