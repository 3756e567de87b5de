//! Farm configuration
//!
//! Loaded from TOML. Amounts may be written as integers or, for values
//! beyond 64 bits, as decimal strings (`"460000_000000000000000000"`).

use crate::error::FarmError;
use anyhow::{Context, Result};
use brew_economics::EmissionParams;
use brew_types::{AccountId, Amount, AssetId, BlockHeight};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

fn default_custody() -> AccountId {
    AccountId::from("brew-farm")
}

fn default_reward_asset() -> AssetId {
    AssetId::from("BREW")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FarmConfig {
    /// Administers pools, the emission rate and the burn fee
    pub owner: AccountId,
    /// Receives the operator cut of every settlement
    pub operator: AccountId,
    /// Receives deposit fees
    pub fee_collector: AccountId,
    /// Farm's own account: holds staked assets and mints the reward token
    #[serde(default = "default_custody")]
    pub custody: AccountId,
    #[serde(default = "default_reward_asset")]
    pub reward_asset: AssetId,
    #[serde(with = "brew_types::amount_serde")]
    pub rate_per_block: Amount,
    pub start_block: BlockHeight,
    #[serde(default)]
    pub emission: EmissionParams,
}

impl FarmConfig {
    /// Config with default emission parameters and one account in every role.
    pub fn new(
        owner: AccountId,
        rate_per_block: Amount,
        start_block: BlockHeight,
    ) -> Self {
        Self {
            operator: owner.clone(),
            fee_collector: owner.clone(),
            owner,
            custody: default_custody(),
            reward_asset: default_reward_asset(),
            rate_per_block,
            start_block,
            emission: EmissionParams::default(),
        }
    }

    pub fn validate(&self) -> std::result::Result<(), FarmError> {
        self.emission.validate()?;

        let roles = [
            ("owner", &self.owner),
            ("operator", &self.operator),
            ("fee_collector", &self.fee_collector),
            ("custody", &self.custody),
        ];
        for (name, account) in roles {
            if account.as_str().is_empty() {
                return Err(FarmError::Config(format!("{name} must not be empty")));
            }
        }
        if self.reward_asset.as_str().is_empty() {
            return Err(FarmError::Config("reward_asset must not be empty".into()));
        }
        if self.custody == self.owner {
            return Err(FarmError::Config(
                "custody account must differ from owner".into(),
            ));
        }
        Ok(())
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: FarmConfig =
            toml::from_str(content).context("Failed to parse farm configuration")?;
        config.validate().context("Farm configuration validation failed")?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file {}", path.display()))?;
        let config = Self::from_toml_str(&content)
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        info!(target: "farm", "Configuration loaded from {}", path.display());
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content =
            toml::to_string_pretty(self).context("Failed to serialize farm configuration")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write configuration file {}", path.display()))?;
        Ok(())
    }
}
