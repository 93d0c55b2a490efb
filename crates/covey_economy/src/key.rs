//! # Wardrobe Keys
//!
//! The only persisted artifact the economy defines: a JSON string a player
//! copies out of one session and pastes into another.
//!
//! ```text
//! {"currency":20,"currentSkinID":"skin0","currentOutfitID":"ness","inventory":["ness"]}
//! ```
//!
//! `inventory` lists non-default ids only; defaults are implied by the
//! catalog. There is no version field.

use covey_shared::ItemId;
use serde::{Deserialize, Serialize};

use crate::error::{WardrobeError, WardrobeResult};

/// Decoded wardrobe key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WardrobeKey {
    /// Balance. Signed so a negative value can be rejected by name.
    pub currency: i64,
    /// Equipped skin.
    #[serde(rename = "currentSkinID")]
    pub current_skin_id: ItemId,
    /// Equipped outfit.
    #[serde(rename = "currentOutfitID")]
    pub current_outfit_id: ItemId,
    /// Owned non-default items.
    pub inventory: Vec<ItemId>,
}

impl WardrobeKey {
    /// Parses a key string. Shape only; catalog checks happen on import.
    ///
    /// # Errors
    ///
    /// Returns `WardrobeError::MalformedKey` if the text is not a key.
    pub fn decode(text: &str) -> WardrobeResult<Self> {
        serde_json::from_str(text.trim()).map_err(|e| WardrobeError::MalformedKey(e.to_string()))
    }

    /// Renders the key string.
    ///
    /// # Errors
    ///
    /// Returns `WardrobeError::MalformedKey` if serialization fails.
    pub fn encode(&self) -> WardrobeResult<String> {
        serde_json::to_string(self).map_err(|e| WardrobeError::MalformedKey(e.to_string()))
    }
}
