//! Broadcast records.
//!
//! The server emits these after a mutation other clients must observe.
//! Clients treat them as replacements, never as deltas.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::item::{Rarity, WardrobeItem};

/// Event type discriminator
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    /// A player's wardrobe changed (pull, equip, import, currency grant)
    PlayerWardrobeChanged = 0,
    /// A gacha picker's pool changed
    PoolChanged = 1,
}

/// Full wardrobe state as seen by clients.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WardrobeModel {
    /// Spendable balance, never negative.
    pub currency: i64,
    /// Equipped skin.
    pub current_skin: WardrobeItem,
    /// Equipped outfit.
    pub current_outfit: WardrobeItem,
    /// Every owned item, defaults included, in acquisition order.
    pub inventory: Vec<WardrobeItem>,
}

impl WardrobeModel {
    /// Returns true if an item with this id is in the inventory.
    #[must_use]
    pub fn owns(&self, item_id: &str) -> bool {
        self.inventory.iter().any(|item| item.id == item_id)
    }
}

/// A player as broadcast to the town.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerModel {
    /// Player id.
    pub id: String,
    /// Display name.
    pub user_name: String,
    /// Wardrobe state.
    pub wardrobe: WardrobeModel,
}

/// A gacha picker as broadcast to the town.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GachaModel {
    /// Offerable items, in draw order.
    pub item_pool: Vec<WardrobeItem>,
    /// Price of one pull.
    pub pull_cost: u32,
    /// Share of the pull cost returned on a duplicate, in `[0, 1]`.
    pub refund_percent: f64,
    /// Per-rarity draw weights. Empty means every item weighs 1; otherwise
    /// tiers left out weigh 0.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub rarity_weights: BTreeMap<Rarity, u32>,
    /// Picker id.
    pub id: String,
}

/// Everything the economy broadcasts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload")]
pub enum ChangeEvent {
    /// Carries the full updated player.
    #[serde(rename = "playerWardrobeChanged")]
    PlayerWardrobeChanged(PlayerModel),
    /// Carries the full updated picker.
    #[serde(rename = "gachaUpdate")]
    PoolChanged(GachaModel),
}

impl ChangeEvent {
    /// Returns the event type
    #[must_use]
    pub const fn event_type(&self) -> EventType {
        match self {
            Self::PlayerWardrobeChanged(_) => EventType::PlayerWardrobeChanged,
            Self::PoolChanged(_) => EventType::PoolChanged,
        }
    }

    /// Returns the player id this event concerns (if applicable)
    #[must_use]
    pub fn player_id(&self) -> Option<&str> {
        match self {
            Self::PlayerWardrobeChanged(player) => Some(&player.id),
            Self::PoolChanged(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemCategory;

    fn sample_player() -> PlayerModel {
        let skin = WardrobeItem::new("skin0", "skin0", ItemCategory::Skin);
        let outfit = WardrobeItem::new("misa", "Default Outfit", ItemCategory::Outfit);
        PlayerModel {
            id: "p1".into(),
            user_name: "ness-fan".into(),
            wardrobe: WardrobeModel {
                currency: 30,
                current_skin: skin.clone(),
                current_outfit: outfit.clone(),
                inventory: vec![outfit, skin],
            },
        }
    }

    #[test]
    fn test_event_type() {
        let event = ChangeEvent::PlayerWardrobeChanged(sample_player());
        assert_eq!(event.event_type(), EventType::PlayerWardrobeChanged);
        assert_eq!(event.player_id(), Some("p1"));

        let pool = ChangeEvent::PoolChanged(GachaModel {
            item_pool: Vec::new(),
            pull_cost: 10,
            refund_percent: 0.1,
            rarity_weights: BTreeMap::new(),
            id: "g".into(),
        });
        assert_eq!(pool.event_type(), EventType::PoolChanged);
        assert_eq!(pool.player_id(), None);
    }

    #[test]
    fn test_wire_shape() {
        let event = ChangeEvent::PlayerWardrobeChanged(sample_player());
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"event\":\"playerWardrobeChanged\""));
        assert!(json.contains("\"currentSkin\""));
        assert!(json.contains("\"userName\":\"ness-fan\""));

        let back: ChangeEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_gacha_wire_shape_carries_weights() {
        let mut rarity_weights = BTreeMap::new();
        rarity_weights.insert(Rarity::UltraRare, 5);
        let event = ChangeEvent::PoolChanged(GachaModel {
            item_pool: Vec::new(),
            pull_cost: 10,
            refund_percent: 0.25,
            rarity_weights,
            id: "g".into(),
        });
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"event\":\"gachaUpdate\""));
        assert!(json.contains("\"rarityWeights\":{\"ultraRare\":5}"));
        assert_eq!(serde_json::from_str::<ChangeEvent>(&json).unwrap(), event);

        let bare = r#"{"itemPool":[],"pullCost":3,"refundPercent":0.0,"id":"old"}"#;
        let model: GachaModel = serde_json::from_str(bare).unwrap();
        assert!(model.rarity_weights.is_empty());
        assert!(!serde_json::to_string(&model).unwrap().contains("rarityWeights"));
    }

    #[test]
    fn test_model_owns() {
        let player = sample_player();
        assert!(player.wardrobe.owns("misa"));
        assert!(!player.wardrobe.owns("ness"));
    }
}
