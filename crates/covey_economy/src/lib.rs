//! # Covey Economy
//!
//! Server-authoritative wardrobe and gacha logic for the Covey town server.
//!
//! ## Design Principles
//!
//! 1. **No floating point in the ledger** - refunds are 18-decimal fixed point, currency is `i64`
//! 2. **All-or-nothing** - a pull or key import fully applies or changes nothing
//! 3. **Injected broadcast** - every change goes through a [`ChangeSink`]
//! 4. **External configuration** - catalog and gacha machines load from TOML
//!
//! ## Example
//!
//! ```rust,ignore
//! use covey_economy::{GachaConfig, ItemCatalog, NullSink, TownEconomy};
//!
//! let catalog = Arc::new(ItemCatalog::from_file("data/catalog.toml")?);
//! let economy = TownEconomy::new(catalog, Arc::new(NullSink));
//! economy.register_picker_from_config(&GachaConfig::from_file("data/gacha.toml")?)?;
//!
//! economy.join("p1", "ana");
//! economy.grant_currency("p1", 30)?;
//! let result = economy.pull("p1", "town-gacha")?;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]

pub mod catalog;
pub mod config;
pub mod error;
pub mod gacha;
pub mod integration;
pub mod key;
pub mod player;
pub mod rates;
pub mod sink;
pub mod wardrobe;

pub use catalog::{CatalogEntry, ItemCatalog};
pub use config::GachaConfig;
pub use error::{WardrobeError, WardrobeResult};
pub use gacha::{weighted_index, GachaPicker, PullResult};
pub use integration::TownEconomy;
pub use key::WardrobeKey;
pub use player::{Player, PlayerId, WardrobeHolder};
pub use rates::{RarityWeights, RefundRate};
pub use sink::{BufferedSink, ChangeSink, ChannelSink, NullSink};
pub use wardrobe::Wardrobe;
