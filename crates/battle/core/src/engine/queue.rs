use std::collections::VecDeque;

use tracing::trace;

use crate::error::{BattleError, ErrorSeverity};
use crate::stats::{CombatantId, StatEntity};

/// Errors that can occur during turn operations
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    #[error("no living combatant is waiting in the action queue")]
    Empty,

    #[error("combatant {0} is not in the action queue")]
    UnknownCombatant(CombatantId),
}

impl BattleError for QueueError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Empty => ErrorSeverity::Recoverable,
            Self::UnknownCombatant(_) => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Empty => "queue.empty",
            Self::UnknownCombatant(_) => "queue.unknown_combatant",
        }
    }
}

/// A combatant's position on the gauge.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QueueEntry {
    pub id: CombatantId,
    /// Distance to the next turn; lower acts sooner.
    pub action_value: f64,
    /// Value restored after acting: `gauge_start / max(speed, 1)`.
    pub base_action_value: f64,
    pub alive: bool,
}

impl QueueEntry {
    /// Switches to a new base, never pushing the entry further back.
    fn rebase(&mut self, base: f64) {
        self.base_action_value = base;
        self.action_value = self.action_value.min(base);
    }
}

/// Speed-based turn order.
///
/// Every combatant drains a shared gauge. The one with the lowest action
/// value acts; the value it spent is subtracted from everyone else (floored at
/// zero), its own value resets to its base and it moves to the back of the
/// ordering. Faster combatants have smaller bases and therefore act more
/// often without any special "double turn" handling.
///
/// Bonus turns preempt the gauge in FIFO order and leave action values
/// untouched.
#[derive(Clone, Debug)]
pub struct ActionQueue {
    gauge_start: f64,
    entries: Vec<QueueEntry>,
    bonus: VecDeque<CombatantId>,
}

impl ActionQueue {
    pub fn new(gauge_start: f64) -> Self {
        Self {
            gauge_start,
            entries: Vec::new(),
            bonus: VecDeque::new(),
        }
    }

    /// Builds a queue from combatants in insertion order.
    pub fn from_entities<'a>(
        gauge_start: f64,
        entities: impl IntoIterator<Item = &'a StatEntity>,
    ) -> Self {
        let mut queue = Self::new(gauge_start);
        for entity in entities {
            queue.insert(entity.id, entity.speed());
            queue.set_alive(entity.id, entity.is_alive());
        }
        queue
    }

    /// Base action value for a given speed.
    pub fn base_action_value(&self, speed: f64) -> f64 {
        let speed = if speed.is_finite() { speed.max(1.0) } else { 1.0 };
        self.gauge_start / speed
    }

    /// Adds a combatant at the back with a full gauge. Re-inserting an id
    /// refreshes its speed instead.
    pub fn insert(&mut self, id: CombatantId, speed: f64) {
        let base = self.base_action_value(speed);
        if let Some(index) = self.position(id) {
            self.entries[index].rebase(base);
            return;
        }
        self.entries.push(QueueEntry {
            id,
            action_value: base,
            base_action_value: base,
            alive: true,
        });
    }

    /// Drops a combatant entirely (including pending bonus turns).
    pub fn remove(&mut self, id: CombatantId) -> Option<QueueEntry> {
        self.bonus.retain(|&b| b != id);
        let index = self.position(id)?;
        Some(self.entries.remove(index))
    }

    pub fn set_alive(&mut self, id: CombatantId, alive: bool) {
        if let Some(index) = self.position(id) {
            self.entries[index].alive = alive;
        }
    }

    /// Mirrors each entity's living state into the queue.
    pub fn sync_living<'a>(&mut self, entities: impl IntoIterator<Item = &'a StatEntity>) {
        for entity in entities {
            self.set_alive(entity.id, entity.is_alive());
        }
    }

    /// Recomputes the base action value after a speed change.
    ///
    /// A pending action value larger than the new base is pulled down to it.
    pub fn refresh_speed(&mut self, id: CombatantId, speed: f64) -> Result<(), QueueError> {
        let base = self.base_action_value(speed);
        let index = self.position(id).ok_or(QueueError::UnknownCombatant(id))?;
        self.entries[index].rebase(base);
        Ok(())
    }

    /// Queues an immediate extra turn for `id`.
    pub fn grant_bonus_turn(&mut self, id: CombatantId) -> Result<(), QueueError> {
        self.position(id).ok_or(QueueError::UnknownCombatant(id))?;
        self.bonus.push_back(id);
        Ok(())
    }

    /// Selects the next actor and advances the gauge.
    ///
    /// Pending bonus turns for living combatants are served first. Otherwise
    /// the living entry with the lowest action value wins, ties going to the
    /// earlier position in the current ordering and then to the lower id.
    pub fn next_actor(&mut self) -> Result<CombatantId, QueueError> {
        while let Some(id) = self.bonus.pop_front() {
            if self.is_alive(id) {
                trace!(target: "battle::queue", actor = %id, "Bonus turn");
                return Ok(id);
            }
        }

        let index = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.alive)
            .min_by(|(ia, a), (ib, b)| {
                a.action_value
                    .total_cmp(&b.action_value)
                    .then(ia.cmp(ib))
                    .then(a.id.cmp(&b.id))
            })
            .map(|(index, _)| index)
            .ok_or(QueueError::Empty)?;

        let elapsed = self.entries[index].action_value;
        for (other, entry) in self.entries.iter_mut().enumerate() {
            if other != index && entry.alive {
                entry.action_value = (entry.action_value - elapsed).max(0.0);
            }
        }

        let mut actor = self.entries.remove(index);
        actor.action_value = actor.base_action_value;
        let id = actor.id;
        self.entries.push(actor);

        trace!(target: "battle::queue", actor = %id, elapsed, "Next actor");
        Ok(id)
    }

    pub fn entry(&self, id: CombatantId) -> Option<&QueueEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Entries in internal (rotation) order.
    pub fn entries(&self) -> &[QueueEntry] {
        &self.entries
    }

    /// Living entries sorted by who acts first, for display.
    pub fn preview(&self) -> Vec<QueueEntry> {
        let mut preview: Vec<QueueEntry> = self
            .entries
            .iter()
            .filter(|entry| entry.alive)
            .copied()
            .collect();
        preview.sort_by(|a, b| a.action_value.total_cmp(&b.action_value));
        preview
    }

    /// Copies queue positions onto the matching entities.
    pub fn write_back<'a>(&self, entities: impl IntoIterator<Item = &'a mut StatEntity>) {
        for entity in entities {
            if let Some(entry) = self.entry(entity.id) {
                entity.action_value = entry.action_value;
                entity.base_action_value = entry.base_action_value;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn is_alive(&self, id: CombatantId) -> bool {
        self.entry(id).is_some_and(|entry| entry.alive)
    }

    fn position(&self, id: CombatantId) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue(speeds: &[f64]) -> ActionQueue {
        let mut queue = ActionQueue::new(10_000.0);
        for (i, &speed) in speeds.iter().enumerate() {
            queue.insert(CombatantId(i as u32), speed);
        }
        queue
    }

    #[test]
    fn equal_speeds_rotate_in_insertion_order() {
        let mut q = queue(&[100.0, 100.0, 100.0]);
        let order: Vec<u32> = (0..6).map(|_| q.next_actor().unwrap().0).collect();
        assert_eq!(order, vec![0, 1, 2, 0, 1, 2]);
    }

    #[test]
    fn faster_combatant_acts_more_often() {
        let mut q = queue(&[200.0, 100.0]);
        let order: Vec<u32> = (0..6).map(|_| q.next_actor().unwrap().0).collect();
        let fast = order.iter().filter(|&&id| id == 0).count();
        assert_eq!(fast, 4);
    }

    #[test]
    fn elapsed_value_drains_others() {
        let mut q = queue(&[100.0, 50.0]);
        assert_eq!(q.next_actor().unwrap(), CombatantId(0));
        assert_eq!(q.entry(CombatantId(1)).unwrap().action_value, 100.0);
        assert_eq!(q.entry(CombatantId(0)).unwrap().action_value, 100.0);
    }

    #[test]
    fn zero_speed_is_treated_as_one() {
        let q = queue(&[0.0]);
        assert_eq!(q.entry(CombatantId(0)).unwrap().base_action_value, 10_000.0);
    }

    #[test]
    fn dead_combatants_are_skipped() {
        let mut q = queue(&[100.0, 100.0]);
        q.set_alive(CombatantId(0), false);
        assert_eq!(q.next_actor().unwrap(), CombatantId(1));
        assert_eq!(q.next_actor().unwrap(), CombatantId(1));
    }

    #[test]
    fn empty_queue_fails() {
        let mut q = queue(&[100.0]);
        q.set_alive(CombatantId(0), false);
        assert_eq!(q.next_actor(), Err(QueueError::Empty));
        assert_eq!(ActionQueue::new(10_000.0).next_actor(), Err(QueueError::Empty));
    }

    #[test]
    fn bonus_turns_preempt_without_touching_gauge() {
        let mut q = queue(&[100.0, 100.0]);
        q.grant_bonus_turn(CombatantId(1)).unwrap();
        let before: Vec<f64> = q.entries().iter().map(|e| e.action_value).collect();
        assert_eq!(q.next_actor().unwrap(), CombatantId(1));
        let after: Vec<f64> = q.entries().iter().map(|e| e.action_value).collect();
        assert_eq!(before, after);
        assert_eq!(q.next_actor().unwrap(), CombatantId(0));
    }

    #[test]
    fn bonus_turn_for_unknown_id_fails() {
        let mut q = queue(&[100.0]);
        assert_eq!(
            q.grant_bonus_turn(CombatantId(9)),
            Err(QueueError::UnknownCombatant(CombatantId(9)))
        );
    }

    #[test]
    fn refresh_speed_pulls_value_down() {
        let mut q = queue(&[100.0]);
        q.refresh_speed(CombatantId(0), 200.0).unwrap();
        let entry = q.entry(CombatantId(0)).unwrap();
        assert_eq!(entry.base_action_value, 50.0);
        assert_eq!(entry.action_value, 50.0);
    }

    #[test]
    fn reinserting_an_entry_only_rebases_it() {
        let mut q = queue(&[100.0, 100.0]);
        q.insert(CombatantId(1), 400.0);
        let entry = q.entry(CombatantId(1)).unwrap();
        assert_eq!(entry.base_action_value, 25.0);
        assert_eq!(entry.action_value, 25.0);
        assert_eq!(q.len(), 2);
    }

    #[test]
    fn summons_join_at_the_back() {
        let mut q = queue(&[100.0]);
        q.next_actor().unwrap();
        q.insert(CombatantId(5), 100.0);
        assert_eq!(q.next_actor().unwrap(), CombatantId(0));
        assert_eq!(q.next_actor().unwrap(), CombatantId(5));
    }
}
