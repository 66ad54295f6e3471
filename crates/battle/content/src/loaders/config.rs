//! Battle configuration loader.

use std::path::Path;

use battle_core::BattleConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for battle configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    ///
    /// Missing keys fall back to [`BattleConfig::default`].
    pub fn load(path: &Path) -> LoadResult<BattleConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<BattleConfig> {
        let config: BattleConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse battle config TOML: {}", e))?;

        if config.gauge_start <= 0.0 || !config.gauge_start.is_finite() {
            anyhow::bail!("gauge_start must be a positive number, got {}", config.gauge_start);
        }
        if config.ultimate_charge_cap == 0 {
            anyhow::bail!("ultimate_charge_cap must be at least 1");
        }
        for (stat, rule) in config.diminishing.iter() {
            if !rule.is_well_formed() {
                anyhow::bail!(
                    "diminishing rule for {} needs finite values, threshold > 0 and scaling_factor > 1, got {:?}",
                    stat,
                    rule
                );
            }
        }

        Ok(config)
    }
}
