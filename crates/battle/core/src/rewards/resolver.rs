use std::collections::BTreeSet;

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::debug;

use super::EncounterTier;

/// A catalog id eligible as loot, with its star rating.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RewardCandidate {
    pub id: String,
    pub stars: u32,
}

impl RewardCandidate {
    pub fn new(id: impl Into<String>, stars: u32) -> Self {
        Self {
            id: id.into(),
            stars,
        }
    }
}

/// Loot the resolver may draw from.
#[derive(Clone, Debug, Default)]
pub struct RewardPool {
    pub cards: Vec<RewardCandidate>,
    pub relics: Vec<RewardCandidate>,
    owned_cards: BTreeSet<String>,
}

impl RewardPool {
    pub fn new(cards: Vec<RewardCandidate>, relics: Vec<RewardCandidate>) -> Self {
        Self {
            cards,
            relics,
            owned_cards: BTreeSet::new(),
        }
    }

    /// Excludes cards the party already owns from card draws.
    pub fn excluding_cards<I, S>(mut self, owned: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.owned_cards.extend(owned.into_iter().map(Into::into));
        self
    }

    fn card_candidates(&self, stars: u32) -> Vec<&RewardCandidate> {
        self.cards
            .iter()
            .filter(|card| card.stars == stars && !self.owned_cards.contains(&card.id))
            .collect()
    }
}

/// Battle telemetry consumed by [`RewardResolver::resolve`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RewardInput {
    pub victory: bool,
    pub tier: EncounterTier,
    /// Map loop the encounter belongs to, starting at 1.
    pub loop_count: u32,
    pub turns: u32,
    pub foe_levels: Vec<u32>,
    /// Rare-drop-rate after per-kill credit.
    pub rare_drop_rate: f64,
}

/// An upgrade material.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemReward {
    pub id: String,
    pub stars: u32,
}

/// Everything granted for one encounter.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RewardBundle {
    pub gold: u64,
    pub experience: u64,
    pub cards: Vec<String>,
    pub relics: Vec<String>,
    pub items: Vec<ItemReward>,
}

impl RewardBundle {
    pub fn is_empty(&self) -> bool {
        self.gold == 0
            && self.experience == 0
            && self.cards.is_empty()
            && self.relics.is_empty()
            && self.items.is_empty()
    }
}

/// Converts battle telemetry into loot.
#[derive(Clone, Debug)]
pub struct RewardResolver {
    pub max_card_attempts: u32,
    pub upgrade_thresholds: Vec<f64>,
    pub max_stars: u32,
}

impl Default for RewardResolver {
    fn default() -> Self {
        Self {
            max_card_attempts: Self::MAX_CARD_ATTEMPTS,
            upgrade_thresholds: Self::UPGRADE_THRESHOLDS.to_vec(),
            max_stars: Self::MAX_STARS,
        }
    }
}

impl RewardResolver {
    pub const MAX_CARD_ATTEMPTS: u32 = 5;
    pub const UPGRADE_THRESHOLDS: [f64; 3] = [10.0, 10_000.0, 10_000_000.0];
    pub const MAX_STARS: u32 = 5;
    pub const MAX_UPGRADE_CHANCE: f64 = 0.99;
    pub const EXP_PER_FOE_LEVEL: u64 = 10;
    pub const EXP_PER_FOE: u64 = 5;
    pub const ITEM_ELEMENTS: [&'static str; 4] = ["generic", "fire", "light", "wind"];

    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves the full bundle. A defeat yields nothing.
    pub fn resolve<R: Rng + ?Sized>(
        &self,
        input: &RewardInput,
        pool: &RewardPool,
        rng: &mut R,
    ) -> RewardBundle {
        if !input.victory {
            return RewardBundle::default();
        }

        let mut bundle = RewardBundle {
            gold: self.gold(input, rng),
            experience: self.experience(input),
            ..RewardBundle::default()
        };

        match self.draw_card(input, pool, rng) {
            Some(card) => bundle.cards.push(card),
            None => {
                let stars = self.roll_stars(input.tier, input.rare_drop_rate, rng);
                bundle.items.push(self.item(stars, rng));
            }
        }

        if let Some(relic) = self.draw_relic(input, pool, rng) {
            bundle.relics.push(relic);
        }

        for _ in 0..input.tier.item_count() {
            let stars = self.roll_stars(input.tier, input.rare_drop_rate, rng);
            bundle.items.push(self.item(stars, rng));
        }

        debug!(
            target: "battle::rewards",
            gold = bundle.gold,
            experience = bundle.experience,
            cards = bundle.cards.len(),
            relics = bundle.relics.len(),
            items = bundle.items.len(),
            "Rewards resolved"
        );
        bundle
    }

    /// `base × loop multiplier × random tier multiplier × rdr`, floored.
    pub fn gold<R: Rng + ?Sized>(&self, input: &RewardInput, rng: &mut R) -> u64 {
        let loop_multiplier = 1.0 + 0.5 * f64::from(input.loop_count.max(1) - 1);
        let random = rng.gen_range(input.tier.gold_multiplier_range());
        let rdr = input.rare_drop_rate.max(0.0);
        let gold = input.tier.base_gold() * loop_multiplier * random * rdr;
        if gold.is_finite() { gold.floor() as u64 } else { u64::MAX }
    }

    /// `base + 10 per foe level + 5 per foe`, boosted for short battles.
    pub fn experience(&self, input: &RewardInput) -> u64 {
        let levels: u64 = input.foe_levels.iter().map(|&level| u64::from(level)).sum();
        let count = input.foe_levels.len() as u64;
        let base = input.tier.base_experience()
            + levels * Self::EXP_PER_FOE_LEVEL
            + count * Self::EXP_PER_FOE;
        let efficiency = if input.turns < 10 {
            1.2
        } else if input.turns < 20 {
            1.1
        } else {
            1.0
        };
        (base as f64 * efficiency).floor() as u64
    }

    /// Tier table draw followed by rare-drop-rate upgrades.
    pub fn roll_stars<R: Rng + ?Sized>(&self, tier: EncounterTier, rdr: f64, rng: &mut R) -> u32 {
        let stars = tier.stars_for(rng.gen_range(0.0..1.0));
        self.upgrade_stars(stars, rdr, rng)
    }

    /// Bumps `stars` once per passed threshold with
    /// `chance = min(rdr / (threshold × 10), 0.99)`, stopping at the first
    /// failed roll or at the star cap.
    pub fn upgrade_stars<R: Rng + ?Sized>(&self, stars: u32, rdr: f64, rng: &mut R) -> u32 {
        let mut stars = stars.min(self.max_stars);
        for &threshold in &self.upgrade_thresholds {
            if stars >= self.max_stars || rdr.is_nan() || rdr < threshold {
                break;
            }
            let chance = (rdr / (threshold * 10.0)).min(Self::MAX_UPGRADE_CHANCE);
            if rng.gen_range(0.0..1.0) >= chance {
                break;
            }
            stars += 1;
        }
        stars
    }

    fn draw_card<R: Rng + ?Sized>(
        &self,
        input: &RewardInput,
        pool: &RewardPool,
        rng: &mut R,
    ) -> Option<String> {
        for _ in 0..self.max_card_attempts {
            let stars = self.roll_stars(input.tier, input.rare_drop_rate, rng);
            let candidates = pool.card_candidates(stars);
            if let Some(card) = candidates.choose(rng) {
                return Some(card.id.clone());
            }
        }
        debug!(target: "battle::rewards", attempts = self.max_card_attempts, "No card drawn, substituting an item");
        None
    }

    fn draw_relic<R: Rng + ?Sized>(
        &self,
        input: &RewardInput,
        pool: &RewardPool,
        rng: &mut R,
    ) -> Option<String> {
        if pool.relics.is_empty() {
            return None;
        }
        let chance = (input.tier.base_relic_chance() * input.rare_drop_rate.max(0.0)).min(1.0);
        if rng.gen_range(0.0..1.0) >= chance {
            return None;
        }
        let stars = self.roll_stars(input.tier, input.rare_drop_rate, rng);
        let matching: Vec<&RewardCandidate> =
            pool.relics.iter().filter(|relic| relic.stars == stars).collect();
        let relic = match matching.choose(rng) {
            Some(relic) => *relic,
            None => pool.relics.choose(rng)?,
        };
        Some(relic.id.clone())
    }

    fn item<R: Rng + ?Sized>(&self, stars: u32, rng: &mut R) -> ItemReward {
        let element = Self::ITEM_ELEMENTS.choose(rng).copied().unwrap_or("generic");
        ItemReward {
            id: format!("{element}_upgrade"),
            stars,
        }
    }
}
