//! Wardrobe item records.
//!
//! An item is identified by its catalog id alone. Name, category and rarity
//! travel with it so clients can render without a catalog lookup.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Catalog-unique identifier of a wardrobe item.
pub type ItemId = String;

/// Which equip slot an item belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemCategory {
    /// Body colour.
    Skin,
    /// Clothing worn over the skin.
    Outfit,
}

impl ItemCategory {
    /// All categories, in display order.
    pub const ALL: [Self; 2] = [Self::Skin, Self::Outfit];

    /// Wire name of the category.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Skin => "skin",
            Self::Outfit => "outfit",
        }
    }
}

impl fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rarity tier used to weight gacha draws.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Rarity {
    /// Most frequent tier.
    Common,
    /// Less frequent tier.
    Rare,
    /// Least frequent tier.
    UltraRare,
}

impl Rarity {
    /// All tiers, most common first.
    pub const ALL: [Self; 3] = [Self::Common, Self::Rare, Self::UltraRare];

    /// Wire name of the tier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Rare => "rare",
            Self::UltraRare => "ultraRare",
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rarity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|rarity| rarity.as_str() == s)
            .ok_or_else(|| format!("unknown rarity: {s}"))
    }
}

/// A catalog entry. Immutable once created.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WardrobeItem {
    /// Catalog-unique id.
    pub id: ItemId,
    /// Display name.
    pub name: String,
    /// Equip slot.
    pub category: ItemCategory,
    /// Draw tier. `None` means the item is weighted like every other
    /// unranked item.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rarity: Option<Rarity>,
}

impl WardrobeItem {
    /// Creates an unranked item.
    pub fn new(id: impl Into<ItemId>, name: impl Into<String>, category: ItemCategory) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category,
            rarity: None,
        }
    }

    /// Sets the rarity tier.
    #[must_use]
    pub fn with_rarity(mut self, rarity: Rarity) -> Self {
        self.rarity = Some(rarity);
        self
    }

    /// Returns true if this item goes in the skin slot.
    #[inline]
    #[must_use]
    pub fn is_skin(&self) -> bool {
        self.category == ItemCategory::Skin
    }

    /// Returns true if this item goes in the outfit slot.
    #[inline]
    #[must_use]
    pub fn is_outfit(&self) -> bool {
        self.category == ItemCategory::Outfit
    }
}
