//! # Wardrobe
//!
//! A player's cosmetic inventory and currency ledger.
//!
//! ## Invariants
//!
//! 1. Currency is never negative.
//! 2. The equipped skin and outfit are always in the inventory and always of
//!    the right category. They are stored as inventory positions, and the
//!    inventory only ever grows, so they cannot dangle.
//! 3. Every catalog default is owned from construction and never removed.
//!
//! A wardrobe does not broadcast anything itself. Whoever owns it (the
//! player/session) notifies the change sink after a successful mutation.

use std::sync::Arc;

use covey_shared::{ItemCategory, WardrobeItem, WardrobeModel};

use crate::catalog::ItemCatalog;
use crate::error::{WardrobeError, WardrobeResult};
use crate::key::WardrobeKey;

/// A player's wardrobe.
#[derive(Clone, Debug)]
pub struct Wardrobe {
    /// Catalog ids resolve against.
    catalog: Arc<ItemCatalog>,
    /// Spendable balance.
    currency: i64,
    /// Owned items, unique by id, in acquisition order.
    inventory: Vec<WardrobeItem>,
    /// Position of the equipped skin in `inventory`.
    current_skin: usize,
    /// Position of the equipped outfit in `inventory`.
    current_outfit: usize,
}

impl Wardrobe {
    /// Creates a wardrobe holding every catalog default, wearing the
    /// catalog's default skin and outfit, with zero currency.
    #[must_use]
    pub fn new(catalog: Arc<ItemCatalog>) -> Self {
        let inventory: Vec<WardrobeItem> = catalog.defaults().cloned().collect();
        let (current_skin, current_outfit) = catalog.default_ranks();

        Self {
            catalog,
            currency: 0,
            inventory,
            current_skin,
            current_outfit,
        }
    }

    /// The catalog this wardrobe resolves ids against.
    #[must_use]
    pub fn catalog(&self) -> &Arc<ItemCatalog> {
        &self.catalog
    }

    // ========================================================================
    // Currency
    // ========================================================================

    /// Current balance.
    #[inline]
    #[must_use]
    pub const fn currency(&self) -> i64 {
        self.currency
    }

    /// Sets the balance.
    ///
    /// # Errors
    ///
    /// Returns `WardrobeError::InvalidCurrency` for negative values; the
    /// previous balance is kept.
    pub fn set_currency(&mut self, value: i64) -> WardrobeResult<()> {
        if value < 0 {
            return Err(WardrobeError::InvalidCurrency(value));
        }
        self.currency = value;
        Ok(())
    }

    /// Adds to the balance and returns the new balance.
    ///
    /// # Errors
    ///
    /// - `InvalidCurrency` if `amount` is negative
    /// - `ArithmeticOverflow` if the balance would overflow
    pub fn credit(&mut self, amount: i64) -> WardrobeResult<i64> {
        if amount < 0 {
            return Err(WardrobeError::InvalidCurrency(amount));
        }
        self.currency = self
            .currency
            .checked_add(amount)
            .ok_or(WardrobeError::ArithmeticOverflow)?;
        Ok(self.currency)
    }

    /// Removes from the balance and returns the new balance.
    ///
    /// # Errors
    ///
    /// - `InvalidCurrency` if `amount` is negative
    /// - `InsufficientFunds` if the balance is below `amount` (nothing is charged)
    pub fn debit(&mut self, amount: i64) -> WardrobeResult<i64> {
        if amount < 0 {
            return Err(WardrobeError::InvalidCurrency(amount));
        }
        if self.currency < amount {
            return Err(WardrobeError::InsufficientFunds {
                required: amount,
                available: self.currency,
            });
        }
        self.currency -= amount;
        Ok(self.currency)
    }

    // ========================================================================
    // Inventory
    // ========================================================================

    /// Owned items, defaults first, then in acquisition order.
    #[must_use]
    pub fn inventory(&self) -> &[WardrobeItem] {
        &self.inventory
    }

    /// Owned items of one category.
    pub fn items_in_category(&self, category: ItemCategory) -> impl Iterator<Item = &WardrobeItem> {
        self.inventory.iter().filter(move |item| item.category == category)
    }

    /// Returns true if an item with this id is owned.
    #[must_use]
    pub fn owns(&self, item_id: &str) -> bool {
        self.position(item_id).is_some()
    }

    /// Returns true if this id is a catalog default (always owned).
    #[must_use]
    pub fn is_default(&self, item_id: &str) -> bool {
        self.catalog.is_default(item_id)
    }

    /// Adds an item unless one with the same id is already owned.
    ///
    /// Returns whether the item was newly added. `false` means duplicate and
    /// nothing changed.
    pub fn add_item(&mut self, item: &WardrobeItem) -> bool {
        if self.owns(&item.id) {
            return false;
        }
        self.inventory.push(item.clone());
        true
    }

    fn position(&self, item_id: &str) -> Option<usize> {
        self.inventory.iter().position(|item| item.id == item_id)
    }

    // ========================================================================
    // Equipping
    // ========================================================================

    /// Equipped skin.
    #[must_use]
    pub fn current_skin(&self) -> &WardrobeItem {
        &self.inventory[self.current_skin]
    }

    /// Equipped outfit.
    #[must_use]
    pub fn current_outfit(&self) -> &WardrobeItem {
        &self.inventory[self.current_outfit]
    }

    /// Equips an owned skin.
    ///
    /// # Errors
    ///
    /// - `ItemNotOwned` if the item is not in the inventory
    /// - `CategoryMismatch` if the item is not a skin
    pub fn equip_skin(&mut self, item: &WardrobeItem) -> WardrobeResult<()> {
        self.equip_slot(ItemCategory::Skin, &item.id)
    }

    /// Equips an owned outfit.
    ///
    /// # Errors
    ///
    /// - `ItemNotOwned` if the item is not in the inventory
    /// - `CategoryMismatch` if the item is not an outfit
    pub fn equip_outfit(&mut self, item: &WardrobeItem) -> WardrobeResult<()> {
        self.equip_slot(ItemCategory::Outfit, &item.id)
    }

    /// Equips an owned item in the slot its category tag names.
    ///
    /// # Errors
    ///
    /// Returns `ItemNotOwned` if the item is not in the inventory.
    pub fn equip(&mut self, item: &WardrobeItem) -> WardrobeResult<()> {
        self.equip_slot(item.category, &item.id)
    }

    /// Equips an owned item by id, in the slot its category names.
    ///
    /// # Errors
    ///
    /// Returns `ItemNotOwned` if no owned item has this id.
    pub fn equip_by_id(&mut self, item_id: &str) -> WardrobeResult<()> {
        let position = self
            .position(item_id)
            .ok_or_else(|| WardrobeError::ItemNotOwned(item_id.to_owned()))?;
        let category = self.inventory[position].category;
        self.equip_slot(category, item_id)
    }

    fn equip_slot(&mut self, slot: ItemCategory, item_id: &str) -> WardrobeResult<()> {
        let position = self
            .position(item_id)
            .ok_or_else(|| WardrobeError::ItemNotOwned(item_id.to_owned()))?;

        let actual = self.inventory[position].category;
        if actual != slot {
            return Err(WardrobeError::CategoryMismatch {
                item_id: item_id.to_owned(),
                expected: slot,
                actual,
            });
        }

        match slot {
            ItemCategory::Skin => self.current_skin = position,
            ItemCategory::Outfit => self.current_outfit = position,
        }
        tracing::debug!(item_id = %item_id, slot = %slot, "equipped");
        Ok(())
    }

    // ========================================================================
    // Snapshots and keys
    // ========================================================================

    /// Immutable copy of the current state.
    #[must_use]
    pub fn to_snapshot(&self) -> WardrobeModel {
        WardrobeModel {
            currency: self.currency,
            current_skin: self.current_skin().clone(),
            current_outfit: self.current_outfit().clone(),
            inventory: self.inventory.clone(),
        }
    }

    /// The key this wardrobe exports to.
    #[must_use]
    pub fn to_key(&self) -> WardrobeKey {
        WardrobeKey {
            currency: self.currency,
            current_skin_id: self.current_skin().id.clone(),
            current_outfit_id: self.current_outfit().id.clone(),
            inventory: self
                .inventory
                .iter()
                .filter(|item| !self.catalog.is_default(&item.id))
                .map(|item| item.id.clone())
                .collect(),
        }
    }

    /// Serializes the wardrobe to a key string.
    ///
    /// # Errors
    ///
    /// Returns `WardrobeError::MalformedKey` if serialization fails.
    pub fn export_key(&self) -> WardrobeResult<String> {
        self.to_key().encode()
    }

    /// Builds a wardrobe from a decoded key, in isolation.
    ///
    /// Checks run in order: currency, inventory ids, equipped ids.
    ///
    /// # Errors
    ///
    /// - `InvalidCurrency` for a negative balance
    /// - `UnknownItem` for an inventory id missing from the catalog
    /// - `ItemNotOwned` / `CategoryMismatch` for a bad equipped id
    pub fn from_key(catalog: Arc<ItemCatalog>, key: &WardrobeKey) -> WardrobeResult<Self> {
        let mut candidate = Self::new(catalog);
        candidate.set_currency(key.currency)?;

        for item_id in &key.inventory {
            let item = candidate.catalog.resolve(item_id)?.clone();
            candidate.add_item(&item);
        }

        candidate.equip_slot(ItemCategory::Skin, &key.current_skin_id)?;
        candidate.equip_slot(ItemCategory::Outfit, &key.current_outfit_id)?;
        Ok(candidate)
    }

    /// Replaces this wardrobe's state with the one a key describes.
    ///
    /// **ATOMIC**: the replacement is built and validated separately and
    /// swapped in only on success. A failed import changes nothing.
    ///
    /// # Errors
    ///
    /// `MalformedKey`, then whatever [`Wardrobe::from_key`] reports.
    pub fn import_key(&mut self, text: &str) -> WardrobeResult<()> {
        let key = WardrobeKey::decode(text)?;
        let candidate = Self::from_key(Arc::clone(&self.catalog), &key)?;
        *self = candidate;
        Ok(())
    }
}
