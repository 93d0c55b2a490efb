//! Gacha machine configuration.
//!
//! ```toml
//! id = "town-gacha"
//! pull_cost = 10
//! refund_percent = 0.1
//! pool = ["ness", "keqing"]
//!
//! [rarity_weights]
//! common = 70
//! rare = 25
//! ultraRare = 5
//! ```
//!
//! Pool entries are catalog ids; the catalog supplies names, categories and
//! rarities.

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use covey_shared::{ItemId, Rarity, WardrobeItem};
use serde::{Deserialize, Serialize};

use crate::catalog::ItemCatalog;
use crate::error::{WardrobeError, WardrobeResult};
use crate::gacha::GachaPicker;
use crate::rates::{RarityWeights, RefundRate};
use crate::sink::ChangeSink;

/// Raw gacha configuration as it appears on disk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GachaConfig {
    /// Picker id.
    pub id: String,
    /// Price of one pull.
    pub pull_cost: u32,
    /// Share of the price refunded on a duplicate, in `[0, 1]`.
    #[serde(default)]
    pub refund_percent: f64,
    /// Catalog ids offered, in draw order.
    #[serde(default)]
    pub pool: Vec<ItemId>,
    /// Rarity name -> weight. Empty means uniform.
    #[serde(default)]
    pub rarity_weights: BTreeMap<String, u32>,
}

impl GachaConfig {
    /// Parses a config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `WardrobeError::InvalidConfig` if the text is not a gacha config.
    pub fn from_toml_str(text: &str) -> WardrobeResult<Self> {
        toml::from_str(text).map_err(|e| WardrobeError::InvalidConfig(e.to_string()))
    }

    /// Loads a config from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `WardrobeError::InvalidConfig` if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> WardrobeResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| WardrobeError::InvalidConfig(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Converts the weight table, rejecting unknown rarity names.
    ///
    /// # Errors
    ///
    /// Returns `WardrobeError::InvalidConfig` for an unknown rarity name.
    pub fn rarity_weights(&self) -> WardrobeResult<RarityWeights> {
        self.rarity_weights
            .iter()
            .map(|(name, &weight)| {
                Rarity::from_str(name)
                    .map(|rarity| (rarity, weight))
                    .map_err(WardrobeError::InvalidConfig)
            })
            .collect()
    }

    /// Resolves pool ids against the catalog.
    ///
    /// # Errors
    ///
    /// Returns `WardrobeError::UnknownItem` for an id the catalog lacks.
    pub fn resolve_pool(&self, catalog: &ItemCatalog) -> WardrobeResult<Vec<WardrobeItem>> {
        self.pool
            .iter()
            .map(|id| catalog.resolve(id).cloned())
            .collect()
    }

    /// Builds a live picker from this config.
    ///
    /// # Errors
    ///
    /// - `UnknownItem` if a pool id is not in the catalog
    /// - `InvalidRefundRate` if `refund_percent` is outside `[0, 1]`
    /// - `InvalidConfig` for an unknown rarity name
    /// - `InvalidRarityWeight` if a non-empty pool weighs nothing
    pub fn build_picker(&self, catalog: &Arc<ItemCatalog>, sink: Arc<dyn ChangeSink>) -> WardrobeResult<GachaPicker> {
        let refund = RefundRate::from_fraction(self.refund_percent)?;
        let weights = self.rarity_weights()?;
        let pool = self.resolve_pool(catalog)?;

        let picker = GachaPicker::new(self.id.clone(), Arc::clone(catalog), pool, self.pull_cost, refund, sink)?
            .with_rarity_weights(weights)?;

        tracing::info!(
            picker_id = %self.id,
            pool_size = self.pool.len(),
            pull_cost = self.pull_cost,
            refund = refund.as_fraction(),
            "gacha picker configured"
        );
        Ok(picker)
    }
}
