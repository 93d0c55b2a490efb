//! # Item Catalog
//!
//! The fixed registry every wardrobe resolves ids against.
//!
//! Two kinds of entries:
//!
//! - **Default** items are granted to every wardrobe at construction and can
//!   never be removed. The first default of each category is what a fresh
//!   wardrobe wears.
//! - **Unlockable** items are only obtainable through gacha pulls or a
//!   wardrobe key import.
//!
//! Loaded once at startup (TOML) and shared read-only behind an `Arc`.

use std::collections::HashMap;
use std::path::Path;

use covey_shared::{ItemCategory, ItemId, Rarity, WardrobeItem};
use serde::Deserialize;

use crate::error::{WardrobeError, WardrobeResult};

/// A catalog entry: the item plus whether every wardrobe starts with it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogEntry {
    /// The item.
    pub item: WardrobeItem,
    /// Granted at construction, never removable.
    pub default: bool,
}

impl CatalogEntry {
    /// A default (always owned) entry.
    #[must_use]
    pub fn default_item(item: WardrobeItem) -> Self {
        Self { item, default: true }
    }

    /// An unlockable entry.
    #[must_use]
    pub fn unlockable(item: WardrobeItem) -> Self {
        Self {
            item,
            default: false,
        }
    }
}

/// On-disk shape of one `[[items]]` table.
#[derive(Debug, Deserialize)]
struct CatalogFileEntry {
    id: ItemId,
    name: String,
    category: ItemCategory,
    #[serde(default)]
    rarity: Option<Rarity>,
    #[serde(default)]
    default: bool,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    items: Vec<CatalogFileEntry>,
}

/// The item registry.
#[derive(Clone, Debug)]
pub struct ItemCatalog {
    /// Entries in declaration order.
    entries: Vec<CatalogEntry>,
    /// Id -> position in `entries`.
    index: HashMap<ItemId, usize>,
    /// Position of the skin a fresh wardrobe wears.
    default_skin: usize,
    /// Position of the outfit a fresh wardrobe wears.
    default_outfit: usize,
}

impl ItemCatalog {
    /// Builds a catalog from entries.
    ///
    /// # Errors
    ///
    /// Returns `WardrobeError::InvalidConfig` if an id repeats or if there is
    /// no default skin or no default outfit.
    pub fn new(entries: Vec<CatalogEntry>) -> WardrobeResult<Self> {
        let mut index = HashMap::with_capacity(entries.len());
        for (position, entry) in entries.iter().enumerate() {
            if index.insert(entry.item.id.clone(), position).is_some() {
                return Err(WardrobeError::InvalidConfig(format!(
                    "duplicate catalog id: {}",
                    entry.item.id
                )));
            }
        }

        let first_default = |category: ItemCategory| {
            entries
                .iter()
                .position(|e| e.default && e.item.category == category)
                .ok_or_else(|| {
                    WardrobeError::InvalidConfig(format!("catalog has no default {category} item"))
                })
        };
        let default_skin = first_default(ItemCategory::Skin)?;
        let default_outfit = first_default(ItemCategory::Outfit)?;

        Ok(Self {
            entries,
            index,
            default_skin,
            default_outfit,
        })
    }

    /// Parses a catalog from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `WardrobeError::InvalidConfig` on parse or validation failure.
    pub fn from_toml_str(text: &str) -> WardrobeResult<Self> {
        let file: CatalogFile =
            toml::from_str(text).map_err(|e| WardrobeError::InvalidConfig(e.to_string()))?;

        let entries = file
            .items
            .into_iter()
            .map(|raw| CatalogEntry {
                item: WardrobeItem {
                    id: raw.id,
                    name: raw.name,
                    category: raw.category,
                    rarity: raw.rarity,
                },
                default: raw.default,
            })
            .collect();

        Self::new(entries)
    }

    /// Loads a catalog from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `WardrobeError::InvalidConfig` if the file cannot be read or is invalid.
    pub fn from_file(path: impl AsRef<Path>) -> WardrobeResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| WardrobeError::InvalidConfig(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// The stock town catalog.
    ///
    /// # Errors
    ///
    /// Fails only if the built-in table stops satisfying [`ItemCatalog::new`].
    pub fn covey_town() -> WardrobeResult<Self> {
        let outfit = |id: &str, name: &str| WardrobeItem::new(id, name, ItemCategory::Outfit);
        let skin = |id: &str| WardrobeItem::new(id, id, ItemCategory::Skin);

        Self::new(vec![
            CatalogEntry::default_item(outfit("misa", "Default Outfit")),
            CatalogEntry::default_item(skin("skin0")),
            CatalogEntry::default_item(skin("skin1")),
            CatalogEntry::default_item(skin("skin2")),
            CatalogEntry::default_item(skin("skin3")),
            CatalogEntry::default_item(skin("skin4")),
            CatalogEntry::unlockable(outfit("ness", "Ness").with_rarity(Rarity::Common)),
            CatalogEntry::unlockable(outfit("keqing", "Keqing").with_rarity(Rarity::Rare)),
            CatalogEntry::unlockable(outfit("bday", "Birthday Suit").with_rarity(Rarity::Common)),
            CatalogEntry::unlockable(outfit("xiaohei", "Cat Boy").with_rarity(Rarity::UltraRare)),
        ])
    }

    /// Looks up an item by id.
    #[inline]
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&WardrobeItem> {
        self.index.get(id).map(|&position| &self.entries[position].item)
    }

    /// Looks up an item by id, failing on unknown ids.
    ///
    /// # Errors
    ///
    /// Returns `WardrobeError::UnknownItem` if the id is not in the catalog.
    pub fn resolve(&self, id: &str) -> WardrobeResult<&WardrobeItem> {
        self.get(id)
            .ok_or_else(|| WardrobeError::UnknownItem(id.to_owned()))
    }

    /// Returns true if every wardrobe owns this id from construction.
    #[must_use]
    pub fn is_default(&self, id: &str) -> bool {
        self.index
            .get(id)
            .is_some_and(|&position| self.entries[position].default)
    }

    /// All default items, in declaration order.
    pub fn defaults(&self) -> impl Iterator<Item = &WardrobeItem> {
        self.entries.iter().filter(|e| e.default).map(|e| &e.item)
    }

    /// All unlockable items, in declaration order.
    pub fn unlockables(&self) -> impl Iterator<Item = &WardrobeItem> {
        self.entries.iter().filter(|e| !e.default).map(|e| &e.item)
    }

    /// The skin a fresh wardrobe wears.
    #[must_use]
    pub fn default_skin(&self) -> &WardrobeItem {
        &self.entries[self.default_skin].item
    }

    /// The outfit a fresh wardrobe wears.
    #[must_use]
    pub fn default_outfit(&self) -> &WardrobeItem {
        &self.entries[self.default_outfit].item
    }

    /// Positions of the default skin and default outfit within
    /// [`ItemCatalog::defaults`].
    #[must_use]
    pub fn default_ranks(&self) -> (usize, usize) {
        let rank = |position: usize| self.entries[..position].iter().filter(|e| e.default).count();
        (rank(self.default_skin), rank(self.default_outfit))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the catalog has no entries. Never true for a valid catalog.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
