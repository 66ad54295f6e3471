//! Owned combatant list with target selection.

use battle_core::{CombatantId, Side, StatEntity};
use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;

/// Every combatant in an encounter, party first, in setup order.
#[derive(Debug, Clone, Default)]
pub(crate) struct Combatants {
    entities: Vec<StatEntity>,
}

impl Combatants {
    pub fn new(party: Vec<StatEntity>, foes: Vec<StatEntity>) -> Self {
        let mut entities = party;
        entities.extend(foes);
        Self { entities }
    }

    pub fn index_of(&self, id: CombatantId) -> Option<usize> {
        self.entities.iter().position(|entity| entity.id == id)
    }

    pub fn get(&self, id: CombatantId) -> Option<&StatEntity> {
        self.entities.iter().find(|entity| entity.id == id)
    }

    pub fn get_mut(&mut self, id: CombatantId) -> Option<&mut StatEntity> {
        self.entities.iter_mut().find(|entity| entity.id == id)
    }

    pub fn contains(&self, id: CombatantId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn push(&mut self, entity: StatEntity) {
        self.entities.push(entity);
    }

    pub fn remove(&mut self, id: CombatantId) -> Option<StatEntity> {
        let index = self.index_of(id)?;
        Some(self.entities.remove(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatEntity> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut StatEntity> {
        self.entities.iter_mut()
    }

    pub fn as_slice(&self) -> &[StatEntity] {
        &self.entities
    }

    pub fn as_mut_slice(&mut self) -> &mut [StatEntity] {
        &mut self.entities
    }

    pub fn living(&self, side: Side) -> impl Iterator<Item = &StatEntity> {
        self.entities
            .iter()
            .filter(move |entity| entity.side == side && entity.is_alive())
    }

    pub fn living_ids(&self, side: Side) -> Vec<CombatantId> {
        self.living(side).map(|entity| entity.id).collect()
    }

    pub fn any_alive(&self, side: Side) -> bool {
        self.living(side).next().is_some()
    }

    /// Two distinct combatants borrowed mutably at once.
    pub fn pair_mut(
        &mut self,
        first: CombatantId,
        second: CombatantId,
    ) -> Option<(&mut StatEntity, &mut StatEntity)> {
        let a = self.index_of(first)?;
        let b = self.index_of(second)?;
        if a == b {
            return None;
        }
        if a < b {
            let (left, right) = self.entities.split_at_mut(b);
            Some((&mut left[a], &mut right[0]))
        } else {
            let (left, right) = self.entities.split_at_mut(a);
            Some((&mut right[0], &mut left[b]))
        }
    }

    /// Picks a living member of `side`, weighted by aggro.
    ///
    /// Falls back to a uniform pick when every weight is zero.
    pub fn pick_target<R: Rng + ?Sized>(&self, side: Side, rng: &mut R) -> Option<CombatantId> {
        let candidates: Vec<&StatEntity> = self.living(side).collect();
        if candidates.is_empty() {
            return None;
        }
        match WeightedIndex::new(candidates.iter().map(|entity| entity.aggro())) {
            Ok(weights) => Some(candidates[weights.sample(rng)].id),
            Err(_) => candidates.choose(rng).map(|entity| entity.id),
        }
    }
}
