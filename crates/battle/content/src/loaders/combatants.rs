//! Party roster and foe group loaders.

use std::path::Path;

use battle_core::{
    BaseStats, CombatantId, DamageKind, EncounterTier, RosterSnapshot, Side, StatEntity,
};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Authoring form of a combatant; the side comes from the file it sits in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatantTemplate {
    pub id: u32,
    pub name: String,
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default)]
    pub damage_kind: DamageKind,
    #[serde(default)]
    pub stats: BaseStats,
    #[serde(default)]
    pub hp: Option<u64>,
    #[serde(default = "default_aggro")]
    pub aggro: f64,
    #[serde(default)]
    pub overheal: bool,
}

fn default_level() -> u32 {
    1
}

fn default_aggro() -> f64 {
    1.0
}

impl CombatantTemplate {
    pub fn build(&self, side: Side) -> StatEntity {
        let entity = StatEntity::new(CombatantId(self.id), self.name.clone(), side, self.stats.clone())
            .with_level(self.level)
            .with_damage_kind(self.damage_kind)
            .with_aggro(self.aggro)
            .with_overheal(self.overheal);
        match self.hp {
            Some(hp) => entity.with_hp(hp),
            None => entity,
        }
    }
}

/// Roster structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterFile {
    pub run_id: String,
    #[serde(default)]
    pub gold: u64,
    #[serde(default = "default_rdr")]
    pub rare_drop_rate: f64,
    #[serde(default)]
    pub cards: Vec<String>,
    #[serde(default)]
    pub relics: Vec<String>,
    pub party: Vec<CombatantTemplate>,
}

fn default_rdr() -> f64 {
    1.0
}

/// Loader for party rosters from RON files.
pub struct RosterLoader;

impl RosterLoader {
    pub fn load(path: &Path) -> LoadResult<RosterSnapshot> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<RosterSnapshot> {
        let file: RosterFile = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse roster RON: {}", e))?;
        if file.party.is_empty() {
            anyhow::bail!("Roster `{}` has no party members", file.run_id);
        }

        let party = file
            .party
            .iter()
            .map(|template| template.build(Side::Party))
            .collect();
        let mut roster = RosterSnapshot::new(file.run_id, party)
            .with_cards(file.cards)
            .with_relics(file.relics)
            .with_rare_drop_rate(file.rare_drop_rate);
        roster.gold = file.gold;
        Ok(roster)
    }
}

/// Foe group structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncounterFile {
    #[serde(default)]
    pub tier: EncounterTier,
    #[serde(default = "default_loop")]
    pub loop_count: u32,
    pub foes: Vec<CombatantTemplate>,
}

fn default_loop() -> u32 {
    1
}

impl EncounterFile {
    pub fn foes(&self) -> Vec<StatEntity> {
        self.foes.iter().map(|template| template.build(Side::Foe)).collect()
    }
}

/// Loader for foe groups from RON files.
pub struct EncounterLoader;

impl EncounterLoader {
    pub fn load(path: &Path) -> LoadResult<EncounterFile> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<EncounterFile> {
        let file: EncounterFile = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse encounter RON: {}", e))?;
        if file.foes.is_empty() {
            anyhow::bail!("Encounter has no foes");
        }
        Ok(file)
    }
}
