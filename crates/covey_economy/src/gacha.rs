//! # Gacha Picker
//!
//! Spends currency for one rarity-weighted draw from an item pool, refunding
//! part of the cost when the draw is a duplicate.
//!
//! ## The Pull Transaction
//!
//! ```text
//! pull(player)
//!   1. pool empty?            -> EmptyPool          (nothing charged)
//!   2. currency < pull_cost?  -> InsufficientFunds  (nothing charged)
//!   3. draw one item
//!   4. drawn item unknown to the wardrobe's catalog? -> UnknownItem (nothing charged)
//!   5. debit pull_cost
//!   6. add_item(drawn) == false (duplicate) -> credit round(cost * refund)
//!   7. emit PlayerWardrobeChanged
//!   8. return { item, wardrobe snapshot }
//! ```
//!
//! Steps 5-6 cannot fail once 1-4 pass, so a debited pull always completes.
//! The caller's `&mut` on the player serializes pulls per wardrobe.
//!
//! ## Pool Contents
//!
//! Every pool entry must be the catalog's own record for its id. Anything a
//! pull can add to a wardrobe is therefore something a wardrobe key can
//! name and restore.
//!
//! ## Weighted Draw
//!
//! Prefix sums `S[i]` of item weights over the pool, `r` uniform in
//! `[0, S[last])`, pick the smallest `i` with `S[i] > r`. Zero-weight items
//! are never picked while any positive-weight item exists, and ties at a
//! boundary go to the earlier pool entry.

use std::fmt;
use std::sync::Arc;

use covey_shared::{ChangeEvent, GachaModel, PlayerModel, WardrobeItem, WardrobeModel};
use parking_lot::{Mutex, RwLock};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::catalog::ItemCatalog;
use crate::error::{WardrobeError, WardrobeResult};
use crate::player::WardrobeHolder;
use crate::rates::{RarityWeights, RefundRate};
use crate::sink::ChangeSink;

/// Outcome of a successful pull. Returned, never stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PullResult {
    /// The drawn item.
    pub item: WardrobeItem,
    /// Wardrobe state after the transaction.
    pub wardrobe: WardrobeModel,
    /// The drawn item was already owned.
    pub duplicate: bool,
    /// Currency returned for the duplicate (0 for a new item).
    pub refunded: i64,
}

/// Picks the pool index for a draw.
///
/// Returns `None` if the pool is empty or weighs nothing in total.
pub fn weighted_index<R: Rng + ?Sized>(
    pool: &[WardrobeItem],
    weights: &RarityWeights,
    rng: &mut R,
) -> Option<usize> {
    let prefix_sums: Vec<u64> = pool
        .iter()
        .scan(0u64, |running, item| {
            *running += u64::from(weights.weight_of(item));
            Some(*running)
        })
        .collect();

    let total = *prefix_sums.last()?;
    if total == 0 {
        return None;
    }

    let roll = rng.gen_range(0..total);
    Some(prefix_sums.partition_point(|&sum| sum <= roll))
}

/// Fails if a non-empty pool could never produce a draw.
fn ensure_drawable(picker_id: &str, pool: &[WardrobeItem], weights: &RarityWeights) -> WardrobeResult<()> {
    if !pool.is_empty() && weights.total_for(pool) == 0 {
        return Err(WardrobeError::InvalidRarityWeight {
            picker_id: picker_id.to_owned(),
        });
    }
    Ok(())
}

/// Fails unless `item` is exactly the catalog's record for its id.
fn ensure_cataloged(catalog: &ItemCatalog, item: &WardrobeItem) -> WardrobeResult<()> {
    if catalog.get(&item.id) == Some(item) {
        Ok(())
    } else {
        Err(WardrobeError::UnknownItem(item.id.clone()))
    }
}

/// A configured gacha machine.
///
/// Stateless across pulls apart from its pool, which is edited under a
/// write lock so draws never see a half-replaced pool.
pub struct GachaPicker {
    /// Picker id.
    id: String,
    /// Registry every pool entry must come from.
    catalog: Arc<ItemCatalog>,
    /// Offerable items, in draw order.
    pool: RwLock<Vec<WardrobeItem>>,
    /// Price of one pull.
    pull_cost: u32,
    /// Share of the price returned on a duplicate.
    refund: RefundRate,
    /// Per-rarity draw weights.
    weights: RarityWeights,
    /// Draw RNG.
    rng: Mutex<ChaCha20Rng>,
    /// Where wardrobe and pool changes are published.
    sink: Arc<dyn ChangeSink>,
}

impl GachaPicker {
    /// Creates a picker with uniform weights and an entropy-seeded RNG.
    ///
    /// # Errors
    ///
    /// Returns `WardrobeError::UnknownItem` if a pool entry is not the
    /// catalog's record for its id.
    pub fn new(
        id: impl Into<String>,
        catalog: Arc<ItemCatalog>,
        pool: Vec<WardrobeItem>,
        pull_cost: u32,
        refund: RefundRate,
        sink: Arc<dyn ChangeSink>,
    ) -> WardrobeResult<Self> {
        for item in &pool {
            ensure_cataloged(&catalog, item)?;
        }
        let picker = Self {
            id: id.into(),
            catalog,
            pool: RwLock::new(pool),
            pull_cost,
            refund,
            weights: RarityWeights::uniform(),
            rng: Mutex::new(ChaCha20Rng::from_entropy()),
            sink,
        };
        ensure_drawable(&picker.id, &picker.pool.read(), &picker.weights)?;
        Ok(picker)
    }

    /// Replaces the rarity weights.
    ///
    /// # Errors
    ///
    /// Returns `WardrobeError::InvalidRarityWeight` if the current pool is
    /// non-empty and weighs nothing under the new table.
    pub fn with_rarity_weights(mut self, weights: RarityWeights) -> WardrobeResult<Self> {
        ensure_drawable(&self.id, &self.pool.read(), &weights)?;
        self.weights = weights;
        Ok(self)
    }

    /// Reseeds the draw RNG deterministically.
    #[must_use]
    pub fn with_seed(self, seed: u64) -> Self {
        *self.rng.lock() = ChaCha20Rng::seed_from_u64(seed);
        self
    }

    /// Rebuilds a picker, weights included, from its broadcast model.
    ///
    /// # Errors
    ///
    /// - `InvalidRefundRate` if the model's refund is outside `[0, 1]`
    /// - `UnknownItem` if a pool entry does not match the catalog
    /// - `InvalidRarityWeight` if the pool weighs nothing
    pub fn from_model(
        model: &GachaModel,
        catalog: Arc<ItemCatalog>,
        sink: Arc<dyn ChangeSink>,
    ) -> WardrobeResult<Self> {
        let refund = RefundRate::from_fraction(model.refund_percent)?;
        let weights: RarityWeights = model
            .rarity_weights
            .iter()
            .map(|(&rarity, &weight)| (rarity, weight))
            .collect();
        Self::new(model.id.clone(), catalog, model.item_pool.clone(), model.pull_cost, refund, sink)?
            .with_rarity_weights(weights)
    }

    /// Picker id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The catalog pool entries are checked against.
    #[must_use]
    pub fn catalog(&self) -> &Arc<ItemCatalog> {
        &self.catalog
    }

    /// Price of one pull.
    #[must_use]
    pub const fn pull_cost(&self) -> u32 {
        self.pull_cost
    }

    /// Share of the price returned on a duplicate.
    #[must_use]
    pub const fn refund_rate(&self) -> RefundRate {
        self.refund
    }

    /// Per-rarity draw weights.
    #[must_use]
    pub fn rarity_weights(&self) -> &RarityWeights {
        &self.weights
    }

    /// Copy of the pool.
    #[must_use]
    pub fn item_pool(&self) -> Vec<WardrobeItem> {
        self.pool.read().clone()
    }

    /// Broadcastable representation.
    #[must_use]
    pub fn to_gacha_model(&self) -> GachaModel {
        GachaModel {
            item_pool: self.item_pool(),
            pull_cost: self.pull_cost,
            refund_percent: self.refund.as_fraction(),
            rarity_weights: self.weights.to_map(),
            id: self.id.clone(),
        }
    }

    /// Draws one item without charging anyone.
    #[must_use]
    pub fn draw(&self) -> Option<WardrobeItem> {
        let pool = self.pool.read();
        let index = weighted_index(&pool, &self.weights, &mut *self.rng.lock())?;
        pool.get(index).cloned()
    }

    /// Performs one paid pull for a player and broadcasts the new wardrobe.
    ///
    /// # Errors
    ///
    /// - `EmptyPool` if there is nothing to draw
    /// - `InsufficientFunds` if the wardrobe cannot cover the pull cost
    /// - `UnknownItem` if the player's wardrobe resolves ids against a
    ///   catalog that lacks the drawn item
    ///
    /// On error nothing is charged and nothing is emitted.
    pub fn pull<P: WardrobeHolder + ?Sized>(&self, player: &mut P) -> WardrobeResult<PullResult> {
        let result = self.transact(player)?;
        self.announce(player.to_player_model());
        Ok(result)
    }

    /// The pull transaction without the broadcast. Callers that hold a lock
    /// on the player release it and then call [`GachaPicker::announce`].
    pub(crate) fn transact<P: WardrobeHolder + ?Sized>(&self, player: &mut P) -> WardrobeResult<PullResult> {
        let cost = i64::from(self.pull_cost);
        let available = player.wardrobe().currency();

        let item = {
            let pool = self.pool.read();
            if pool.is_empty() {
                tracing::warn!(picker_id = %self.id, "pull rejected: empty pool");
                return Err(WardrobeError::EmptyPool {
                    picker_id: self.id.clone(),
                });
            }
            if available < cost {
                tracing::warn!(picker_id = %self.id, cost, available, "pull rejected: insufficient funds");
                return Err(WardrobeError::InsufficientFunds {
                    required: cost,
                    available,
                });
            }
            let index = weighted_index(&pool, &self.weights, &mut *self.rng.lock()).ok_or_else(|| {
                WardrobeError::InvalidRarityWeight {
                    picker_id: self.id.clone(),
                }
            })?;
            pool[index].clone()
        };

        let wardrobe = player.wardrobe_mut();
        if let Err(error) = ensure_cataloged(wardrobe.catalog(), &item) {
            tracing::warn!(picker_id = %self.id, item_id = %item.id, "pull rejected: item outside the wardrobe's catalog");
            return Err(error);
        }

        wardrobe.debit(cost)?;
        let duplicate = !wardrobe.add_item(&item);
        let refunded = if duplicate {
            self.refund.refund_for(self.pull_cost)
        } else {
            0
        };
        if refunded > 0 {
            // Never more than the debit just taken.
            wardrobe.credit(refunded)?;
        }

        tracing::info!(
            picker_id = %self.id,
            item_id = %item.id,
            duplicate,
            refunded,
            balance = wardrobe.currency(),
            "gacha pull"
        );

        Ok(PullResult {
            item,
            wardrobe: wardrobe.to_snapshot(),
            duplicate,
            refunded,
        })
    }

    /// Publishes a player's state after a pull.
    pub(crate) fn announce(&self, player: PlayerModel) {
        self.sink.emit(ChangeEvent::PlayerWardrobeChanged(player));
    }

    /// Appends an item to the pool and broadcasts the new pool.
    ///
    /// # Errors
    ///
    /// - `UnknownItem` if the item is not the catalog's record for its id
    /// - `InvalidRarityWeight` if the pool would still weigh nothing
    ///
    /// The pool is left unchanged on error.
    pub fn add_item_to_pool(&self, item: WardrobeItem) -> WardrobeResult<()> {
        ensure_cataloged(&self.catalog, &item)?;
        {
            let mut pool = self.pool.write();
            let total = self.weights.total_for(&pool) + u64::from(self.weights.weight_of(&item));
            if total == 0 {
                return Err(WardrobeError::InvalidRarityWeight {
                    picker_id: self.id.clone(),
                });
            }
            tracing::debug!(picker_id = %self.id, item_id = %item.id, "item added to pool");
            pool.push(item);
        }
        self.sink.emit(ChangeEvent::PoolChanged(self.to_gacha_model()));
        Ok(())
    }

    /// Replaces the whole pool in one step and broadcasts it.
    ///
    /// # Errors
    ///
    /// - `UnknownItem` if an entry is not the catalog's record for its id
    /// - `InvalidRarityWeight` if the new pool is non-empty and weighs nothing
    ///
    /// The old pool is kept on error.
    pub fn set_item_pool(&self, pool: Vec<WardrobeItem>) -> WardrobeResult<()> {
        for item in &pool {
            ensure_cataloged(&self.catalog, item)?;
        }
        ensure_drawable(&self.id, &pool, &self.weights)?;
        let size = pool.len();
        *self.pool.write() = pool;
        tracing::info!(picker_id = %self.id, size, "gacha pool replaced");
        self.sink.emit(ChangeEvent::PoolChanged(self.to_gacha_model()));
        Ok(())
    }
}

impl fmt::Debug for GachaPicker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GachaPicker")
            .field("id", &self.id)
            .field("pool_size", &self.pool.read().len())
            .field("pull_cost", &self.pull_cost)
            .field("refund", &self.refund)
            .field("weights", &self.weights)
            .finish_non_exhaustive()
    }
}
