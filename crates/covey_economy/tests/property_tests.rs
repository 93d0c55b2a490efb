//! Property-based tests using proptest
//!
//! Invariants that must hold for ALL inputs:
//! - Currency: negative values rejected, state unchanged
//! - Ledger: a duplicate refunds round(cost * refund_percent), inventory only grows
//! - Ledger: balance after pulls = start - cost * pulls + refunds
//! - Keys: export then import reproduces the wardrobe
//! - Keys: a rejected import changes nothing

use std::sync::Arc;

use covey_economy::{GachaPicker, ItemCatalog, NullSink, Player, RefundRate, Wardrobe, WardrobeError, WardrobeHolder};
use covey_shared::ItemCategory;
use proptest::prelude::*;

fn stock() -> Arc<ItemCatalog> {
    Arc::new(ItemCatalog::covey_town().unwrap())
}

/// Builds a wardrobe from a generated description.
fn build(catalog: &Arc<ItemCatalog>, currency: i64, unlocks: &[bool], skin: usize, outfit: usize) -> Wardrobe {
    let mut wardrobe = Wardrobe::new(Arc::clone(catalog));
    wardrobe.set_currency(currency).unwrap();
    for (item, &take) in catalog.unlockables().zip(unlocks) {
        if take {
            wardrobe.add_item(item);
        }
    }

    let skins: Vec<_> = wardrobe.items_in_category(ItemCategory::Skin).cloned().collect();
    let outfits: Vec<_> = wardrobe.items_in_category(ItemCategory::Outfit).cloned().collect();
    wardrobe.equip_skin(&skins[skin % skins.len()]).unwrap();
    wardrobe.equip_outfit(&outfits[outfit % outfits.len()]).unwrap();
    wardrobe
}

// ============================================================
// Currency
// ============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_negative_currency_rejected(start in 0i64..1_000_000, value in i64::MIN..0) {
        let mut wardrobe = Wardrobe::new(stock());
        wardrobe.set_currency(start).unwrap();
        prop_assert_eq!(wardrobe.set_currency(value), Err(WardrobeError::InvalidCurrency(value)));
        prop_assert_eq!(wardrobe.currency(), start);
    }

    #[test]
    fn prop_non_negative_currency_accepted(value in 0i64..=i64::MAX) {
        let mut wardrobe = Wardrobe::new(stock());
        prop_assert!(wardrobe.set_currency(value).is_ok());
        prop_assert_eq!(wardrobe.currency(), value);
    }
}

// ============================================================
// Ledger
// ============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_ledger_balances(
        seed in any::<u64>(),
        start in 0i64..500,
        cost in 0u32..40,
        refund_percent in 0.0f64..=1.0,
        attempts in 1usize..30,
    ) {
        let catalog = stock();
        let pool: Vec<_> = catalog.unlockables().cloned().collect();
        let refund = RefundRate::from_fraction(refund_percent).unwrap();
        let picker = GachaPicker::new("g", Arc::clone(&catalog), pool, cost, refund, Arc::new(NullSink))
            .unwrap()
            .with_seed(seed);

        let mut player = Player::new("p", "prop", Arc::clone(&catalog));
        player.wardrobe_mut().set_currency(start).unwrap();
        let expected_refund = (f64::from(cost) * refund_percent).round() as i64;

        let mut pulls = 0i64;
        let mut refunds = 0i64;
        for _ in 0..attempts {
            let before = player.wardrobe().to_snapshot();
            match picker.pull(&mut player) {
                Ok(result) => {
                    pulls += 1;
                    let after = player.wardrobe().to_snapshot();
                    prop_assert!(after.inventory.len() <= before.inventory.len() + 1);
                    prop_assert_eq!(&after.inventory[..before.inventory.len()], &before.inventory[..]);
                    if result.duplicate {
                        prop_assert!(before.inventory.contains(&result.item));
                        prop_assert_eq!(after.inventory.len(), before.inventory.len());
                        prop_assert_eq!(result.refunded, expected_refund);
                    } else {
                        prop_assert_eq!(after.inventory.last(), Some(&result.item));
                        prop_assert_eq!(result.refunded, 0);
                    }
                    prop_assert_eq!(after.currency, before.currency - i64::from(cost) + result.refunded);
                    refunds += result.refunded;
                }
                Err(WardrobeError::InsufficientFunds { .. }) => {
                    prop_assert_eq!(&player.wardrobe().to_snapshot(), &before);
                }
                Err(other) => prop_assert!(false, "unexpected error {other}"),
            }
            prop_assert!(player.wardrobe().currency() >= 0);
        }

        prop_assert_eq!(
            player.wardrobe().currency(),
            start - i64::from(cost) * pulls + refunds
        );
    }
}

// ============================================================
// Keys
// ============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_key_round_trip(
        currency in 0i64..=i64::MAX,
        unlocks in prop::collection::vec(any::<bool>(), 4),
        skin in 0usize..16,
        outfit in 0usize..16,
    ) {
        let catalog = stock();
        let original = build(&catalog, currency, &unlocks, skin, outfit);

        let key = original.export_key().unwrap();
        let mut restored = Wardrobe::new(catalog);
        restored.import_key(&key).unwrap();

        prop_assert_eq!(restored.to_snapshot(), original.to_snapshot());
    }

    #[test]
    fn prop_rejected_import_changes_nothing(
        currency in 0i64..10_000,
        unlocks in prop::collection::vec(any::<bool>(), 4),
        skin in 0usize..16,
        outfit in 0usize..16,
        garbage in "[a-z{}\":,0-9 ]{0,40}",
        bad_currency in i64::MIN..0,
    ) {
        let catalog = stock();
        let mut wardrobe = build(&catalog, currency, &unlocks, skin, outfit);
        let before = wardrobe.to_snapshot();

        // Key field names need uppercase letters, so this is never a valid key.
        prop_assert!(wardrobe.import_key(&garbage).is_err());
        prop_assert_eq!(&wardrobe.to_snapshot(), &before);

        let negative = format!(
            r#"{{"currency":{bad_currency},"currentSkinID":"skin0","currentOutfitID":"misa","inventory":[]}}"#
        );
        prop_assert!(wardrobe.import_key(&negative).is_err());
        prop_assert_eq!(wardrobe.to_snapshot(), before);
    }
}
