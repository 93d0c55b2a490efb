//! # Covey Shared
//!
//! Plain records exchanged between the town server and its clients.
//!
//! ## RULE
//!
//! Nothing in this crate mutates anything. The server-authoritative
//! wardrobe and gacha logic lives in `covey_economy`; this crate only
//! describes what gets broadcast.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod events;
pub mod item;

pub use events::{ChangeEvent, EventType, GachaModel, PlayerModel, WardrobeModel};
pub use item::{ItemCategory, ItemId, Rarity, WardrobeItem};
