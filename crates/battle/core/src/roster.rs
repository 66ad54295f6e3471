//! Persistent party state read before and written after an encounter.

use crate::rewards::{ItemReward, RewardBundle};
use crate::stats::StatEntity;

/// Party roster as stored between battles.
///
/// The runtime deep-copies `party` into the encounter; only a victory writes
/// the mutated members and the loot back.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RosterSnapshot {
    pub run_id: String,
    pub gold: u64,
    /// Persistent rare-drop-rate; per-kill credit never lands here.
    pub rare_drop_rate: f64,
    pub party: Vec<StatEntity>,
    pub cards: Vec<String>,
    pub relics: Vec<String>,
    pub items: Vec<ItemReward>,
    pub experience: u64,
}

impl RosterSnapshot {
    pub fn new(run_id: impl Into<String>, party: Vec<StatEntity>) -> Self {
        Self {
            run_id: run_id.into(),
            gold: 0,
            rare_drop_rate: 1.0,
            party,
            cards: Vec::new(),
            relics: Vec::new(),
            items: Vec::new(),
            experience: 0,
        }
    }

    pub fn with_cards(mut self, cards: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.cards.extend(cards.into_iter().map(Into::into));
        self
    }

    pub fn with_relics(mut self, relics: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.relics.extend(relics.into_iter().map(Into::into));
        self
    }

    pub fn with_rare_drop_rate(mut self, rdr: f64) -> Self {
        self.rare_drop_rate = rdr;
        self
    }

    /// Adds loot to the roster. Owned cards are not duplicated.
    pub fn apply_rewards(&mut self, rewards: &RewardBundle) {
        self.gold = self.gold.saturating_add(rewards.gold);
        self.experience = self.experience.saturating_add(rewards.experience);
        for card in &rewards.cards {
            if !self.cards.contains(card) {
                self.cards.push(card.clone());
            }
        }
        self.relics.extend(rewards.relics.iter().cloned());
        self.items.extend(rewards.items.iter().cloned());
    }

    /// Copies post-battle HP onto party members.
    ///
    /// Members missing from `combatants` fell in battle and are stored at zero
    /// HP. Shields and effects never persist.
    pub fn write_back(&mut self, combatants: &[StatEntity]) {
        for member in &mut self.party {
            match combatants.iter().find(|c| c.id == member.id) {
                Some(after) => member.hp = after.hp.min(member.max_hp()),
                None => member.hp = 0,
            }
            member.shields = 0;
            member.ultimate_charge = 0;
            member.ultimate_ready = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{BaseStats, CombatantId, Side};

    fn member(id: u32) -> StatEntity {
        StatEntity::new(CombatantId(id), "M", Side::Party, BaseStats::default())
    }

    #[test]
    fn rewards_accumulate_without_duplicate_cards() {
        let mut roster = RosterSnapshot::new("run", vec![member(1)]).with_cards(["focus"]);
        roster.apply_rewards(&RewardBundle {
            gold: 30,
            experience: 12,
            cards: vec!["focus".into(), "spark".into()],
            relics: vec!["coin".into()],
            items: vec![ItemReward { id: "fire_upgrade".into(), stars: 1 }],
        });
        assert_eq!(roster.gold, 30);
        assert_eq!(roster.cards, vec!["focus".to_string(), "spark".to_string()]);
        assert_eq!(roster.relics.len(), 1);
        assert_eq!(roster.items.len(), 1);
    }

    #[test]
    fn write_back_copies_hp_and_zeroes_the_fallen() {
        let mut roster = RosterSnapshot::new("run", vec![member(1), member(2)]);
        let mut survivor = member(1);
        survivor.hp = 420;
        survivor.shields = 99;

        roster.write_back(&[survivor]);

        assert_eq!(roster.party[0].hp, 420);
        assert_eq!(roster.party[0].shields, 0);
        assert_eq!(roster.party[1].hp, 0);
    }
}
