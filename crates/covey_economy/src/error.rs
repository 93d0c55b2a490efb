//! # Wardrobe Error Types
//!
//! All errors that can occur in the wardrobe economy. Every one of them is
//! raised before any state is touched, so a returned error always means
//! "nothing happened".

use covey_shared::{ItemCategory, ItemId};
use thiserror::Error;

/// Errors that can occur in the wardrobe economy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WardrobeError {
    /// Pulled from a picker that offers nothing.
    #[error("gacha picker {picker_id} has no items in its pool")]
    EmptyPool {
        /// The picker that was pulled.
        picker_id: String,
    },

    /// Balance is below the pull cost. No charge was applied.
    #[error("insufficient funds: pull costs {required}, wardrobe holds {available}")]
    InsufficientFunds {
        /// The pull cost.
        required: i64,
        /// The balance at the time of the pull.
        available: i64,
    },

    /// Attempted to set a negative balance.
    #[error("currency cannot be negative: {0}")]
    InvalidCurrency(i64),

    /// Equip target is not in the inventory.
    #[error("item not owned: {0}")]
    ItemNotOwned(ItemId),

    /// Equip target belongs to the other slot.
    #[error("item {item_id} belongs to the {actual} slot, not {expected}")]
    CategoryMismatch {
        /// The item that was equipped.
        item_id: ItemId,
        /// The slot being equipped.
        expected: ItemCategory,
        /// The item's own category.
        actual: ItemCategory,
    },

    /// Wardrobe key is not valid JSON of the expected shape.
    #[error("malformed wardrobe key: {0}")]
    MalformedKey(String),

    /// Id does not resolve in the item catalog.
    #[error("unknown item: {0}")]
    UnknownItem(ItemId),

    /// Picker configured so that nothing can ever be drawn.
    #[error("gacha picker {picker_id} has zero total rarity weight")]
    InvalidRarityWeight {
        /// The misconfigured picker.
        picker_id: String,
    },

    /// Refund share outside `[0, 1]`.
    #[error("invalid refund rate: {0}")]
    InvalidRefundRate(String),

    /// Invalid configuration file.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// No player with this id is in the town.
    #[error("unknown player: {0}")]
    UnknownPlayer(String),

    /// No picker with this id is registered.
    #[error("unknown gacha picker: {0}")]
    UnknownPicker(String),

    /// A picker with this id is already registered.
    #[error("gacha picker already registered: {0}")]
    DuplicatePicker(String),

    /// Arithmetic overflow in a currency calculation.
    #[error("arithmetic overflow in currency calculation")]
    ArithmeticOverflow,
}

/// Result type for wardrobe operations.
pub type WardrobeResult<T> = Result<T, WardrobeError>;
