//! # Town Economy Service
//!
//! The single entry point the town server calls for wardrobe and gacha
//! operations.
//!
//! ```text
//! socket handler ──> TownEconomy::pull(player, picker)
//!                         │
//!                         ├── players[player]  (per-player Mutex)
//!                         ├── pickers[picker]  (shared Arc)
//!                         │
//!                         ▼
//!                  GachaPicker transaction ──(unlock)──> ChangeSink::emit(PlayerWardrobeChanged)
//! ```
//!
//! ## Locking
//!
//! The registries are read-locked only long enough to clone an `Arc`. All
//! wardrobe work happens under the player's own mutex, so two players never
//! wait on each other and one player's mutations are applied one at a time.
//! The mutex is released before the change is emitted, so a sink may call
//! straight back into the economy.

use std::collections::HashMap;
use std::sync::Arc;

use covey_shared::{ChangeEvent, PlayerModel, WardrobeModel};
use parking_lot::{Mutex, RwLock};

use crate::catalog::ItemCatalog;
use crate::config::GachaConfig;
use crate::error::{WardrobeError, WardrobeResult};
use crate::gacha::{GachaPicker, PullResult};
use crate::player::{Player, PlayerId, WardrobeHolder};
use crate::sink::ChangeSink;

/// Wardrobe and gacha state for one town.
///
/// `Send + Sync`; share it behind an `Arc`.
pub struct TownEconomy {
    /// Shared item registry.
    catalog: Arc<ItemCatalog>,
    /// Connected players.
    players: RwLock<HashMap<PlayerId, Arc<Mutex<Player>>>>,
    /// Registered gacha machines.
    pickers: RwLock<HashMap<String, Arc<GachaPicker>>>,
    /// Broadcast channel for every change.
    sink: Arc<dyn ChangeSink>,
}

impl TownEconomy {
    /// Creates an economy with no players and no pickers.
    pub fn new(catalog: Arc<ItemCatalog>, sink: Arc<dyn ChangeSink>) -> Self {
        Self {
            catalog,
            players: RwLock::new(HashMap::new()),
            pickers: RwLock::new(HashMap::new()),
            sink,
        }
    }

    /// The shared catalog.
    #[must_use]
    pub fn catalog(&self) -> &Arc<ItemCatalog> {
        &self.catalog
    }

    // ========================================================================
    // Players
    // ========================================================================

    /// Adds a player with a fresh wardrobe.
    ///
    /// Joining again with a known id keeps the existing wardrobe.
    pub fn join(&self, id: impl Into<PlayerId>, user_name: impl Into<String>) -> PlayerModel {
        let id = id.into();
        let handle = {
            let mut players = self.players.write();
            Arc::clone(players.entry(id.clone()).or_insert_with(|| {
                tracing::info!(player_id = %id, "player joined");
                Arc::new(Mutex::new(Player::new(id.clone(), user_name, Arc::clone(&self.catalog))))
            }))
        };
        let model = handle.lock().to_player_model();
        model
    }

    /// Removes a player and returns their final state.
    ///
    /// # Errors
    ///
    /// Returns `WardrobeError::UnknownPlayer` if the id is not connected.
    pub fn leave(&self, id: &str) -> WardrobeResult<PlayerModel> {
        let handle = self
            .players
            .write()
            .remove(id)
            .ok_or_else(|| WardrobeError::UnknownPlayer(id.to_owned()))?;
        tracing::info!(player_id = %id, "player left");
        let model = handle.lock().to_player_model();
        Ok(model)
    }

    /// Current state of one player.
    ///
    /// # Errors
    ///
    /// Returns `WardrobeError::UnknownPlayer` if the id is not connected.
    pub fn player_model(&self, id: &str) -> WardrobeResult<PlayerModel> {
        let handle = self.player(id)?;
        let model = handle.lock().to_player_model();
        Ok(model)
    }

    /// Number of connected players.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.players.read().len()
    }

    fn player(&self, id: &str) -> WardrobeResult<Arc<Mutex<Player>>> {
        self.players
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| WardrobeError::UnknownPlayer(id.to_owned()))
    }

    /// Applies `op` under the player's lock and broadcasts the result.
    ///
    /// Nothing is emitted when `op` fails.
    fn mutate_player<T>(
        &self,
        id: &str,
        op: impl FnOnce(&mut Player) -> WardrobeResult<T>,
    ) -> WardrobeResult<(T, WardrobeModel)> {
        let handle = self.player(id)?;
        let mut player = handle.lock();
        let value = op(&mut *player)?;
        let model = player.to_player_model();
        drop(player);

        let wardrobe = model.wardrobe.clone();
        self.sink.emit(ChangeEvent::PlayerWardrobeChanged(model));
        Ok((value, wardrobe))
    }

    // ========================================================================
    // Pickers
    // ========================================================================

    /// Registers a picker under its id.
    ///
    /// # Errors
    ///
    /// Returns `WardrobeError::DuplicatePicker` if the id is taken.
    pub fn register_picker(&self, picker: GachaPicker) -> WardrobeResult<Arc<GachaPicker>> {
        let mut pickers = self.pickers.write();
        if pickers.contains_key(picker.id()) {
            return Err(WardrobeError::DuplicatePicker(picker.id().to_owned()));
        }
        let picker = Arc::new(picker);
        pickers.insert(picker.id().to_owned(), Arc::clone(&picker));
        tracing::info!(picker_id = %picker.id(), "gacha picker registered");
        Ok(picker)
    }

    /// Builds a picker from configuration, wired to this economy's sink, and
    /// registers it.
    ///
    /// # Errors
    ///
    /// Whatever [`GachaConfig::build_picker`] or
    /// [`TownEconomy::register_picker`] reports.
    pub fn register_picker_from_config(&self, config: &GachaConfig) -> WardrobeResult<Arc<GachaPicker>> {
        let picker = config.build_picker(&self.catalog, Arc::clone(&self.sink))?;
        self.register_picker(picker)
    }

    /// Looks up a picker.
    ///
    /// # Errors
    ///
    /// Returns `WardrobeError::UnknownPicker` if no picker has the id.
    pub fn picker(&self, id: &str) -> WardrobeResult<Arc<GachaPicker>> {
        self.pickers
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| WardrobeError::UnknownPicker(id.to_owned()))
    }

    // ========================================================================
    // Wardrobe operations
    // ========================================================================

    /// One paid pull. The picker's sink receives the wardrobe change once
    /// the player's lock is released.
    ///
    /// # Errors
    ///
    /// `UnknownPlayer`, `UnknownPicker`, then whatever
    /// [`GachaPicker::pull`] reports.
    pub fn pull(&self, player_id: &str, picker_id: &str) -> WardrobeResult<PullResult> {
        let handle = self.player(player_id)?;
        let picker = self.picker(picker_id)?;
        let mut player = handle.lock();
        let result = picker.transact(&mut *player)?;
        let model = player.to_player_model();
        drop(player);

        picker.announce(model);
        Ok(result)
    }

    /// Equips an owned item by id, routing by its category.
    ///
    /// # Errors
    ///
    /// `UnknownPlayer` or `ItemNotOwned`.
    pub fn equip(&self, player_id: &str, item_id: &str) -> WardrobeResult<WardrobeModel> {
        self.mutate_player(player_id, |player| player.wardrobe_mut().equip_by_id(item_id))
            .map(|((), wardrobe)| wardrobe)
    }

    /// Overwrites a player's balance.
    ///
    /// # Errors
    ///
    /// `UnknownPlayer` or `InvalidCurrency`.
    pub fn set_currency(&self, player_id: &str, value: i64) -> WardrobeResult<WardrobeModel> {
        self.mutate_player(player_id, |player| player.wardrobe_mut().set_currency(value))
            .map(|((), wardrobe)| wardrobe)
    }

    /// Adds to a player's balance.
    ///
    /// # Errors
    ///
    /// `UnknownPlayer`, `InvalidCurrency` for a negative grant, or
    /// `ArithmeticOverflow`.
    pub fn grant_currency(&self, player_id: &str, amount: i64) -> WardrobeResult<WardrobeModel> {
        let (balance, wardrobe) =
            self.mutate_player(player_id, |player| player.wardrobe_mut().credit(amount))?;
        tracing::debug!(player_id, amount, balance, "currency granted");
        Ok(wardrobe)
    }

    /// Exports a player's wardrobe key.
    ///
    /// # Errors
    ///
    /// `UnknownPlayer` or `MalformedKey`.
    pub fn export_key(&self, player_id: &str) -> WardrobeResult<String> {
        let handle = self.player(player_id)?;
        let key = handle.lock().wardrobe().export_key();
        key
    }

    /// Replaces a player's wardrobe with the one a key describes.
    ///
    /// # Errors
    ///
    /// `UnknownPlayer`, then whatever [`crate::Wardrobe::import_key`]
    /// reports. A failed import leaves the wardrobe untouched.
    pub fn import_key(&self, player_id: &str, key: &str) -> WardrobeResult<WardrobeModel> {
        let result = self
            .mutate_player(player_id, |player| player.wardrobe_mut().import_key(key))
            .map(|((), wardrobe)| wardrobe);
        if let Err(error) = &result {
            tracing::warn!(player_id, %error, "wardrobe key rejected");
        }
        result
    }
}
