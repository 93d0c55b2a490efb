//! Player handle.
//!
//! The economy only needs three things from a player: read access to the
//! wardrobe, write access to it, and a broadcastable representation.

use std::sync::Arc;

use covey_shared::PlayerModel;

use crate::catalog::ItemCatalog;
use crate::wardrobe::Wardrobe;

/// Player identifier.
pub type PlayerId = String;

/// Anything that owns a wardrobe and can be broadcast.
pub trait WardrobeHolder {
    /// The wardrobe, read-only.
    fn wardrobe(&self) -> &Wardrobe;

    /// The wardrobe, for mutation.
    fn wardrobe_mut(&mut self) -> &mut Wardrobe;

    /// Full representation sent with `PlayerWardrobeChanged`.
    fn to_player_model(&self) -> PlayerModel;
}

/// A town player. Location, video and session state live elsewhere.
#[derive(Clone, Debug)]
pub struct Player {
    id: PlayerId,
    user_name: String,
    /// Mutable wardrobe.
    pub wardrobe: Wardrobe,
}

impl Player {
    /// Creates a player with a fresh default wardrobe.
    pub fn new(id: impl Into<PlayerId>, user_name: impl Into<String>, catalog: Arc<ItemCatalog>) -> Self {
        Self {
            id: id.into(),
            user_name: user_name.into(),
            wardrobe: Wardrobe::new(catalog),
        }
    }

    /// Player id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name.
    #[must_use]
    pub fn user_name(&self) -> &str {
        &self.user_name
    }
}

impl WardrobeHolder for Player {
    fn wardrobe(&self) -> &Wardrobe {
        &self.wardrobe
    }

    fn wardrobe_mut(&mut self) -> &mut Wardrobe {
        &mut self.wardrobe
    }

    fn to_player_model(&self) -> PlayerModel {
        PlayerModel {
            id: self.id.clone(),
            user_name: self.user_name.clone(),
            wardrobe: self.wardrobe.to_snapshot(),
        }
    }
}
