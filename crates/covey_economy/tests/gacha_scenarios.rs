//! End-to-end wardrobe and gacha scenarios against the stock catalog.

use std::path::PathBuf;
use std::sync::Arc;

use covey_economy::{
    BufferedSink, GachaConfig, GachaPicker, ItemCatalog, NullSink, Player, RarityWeights, RefundRate, TownEconomy,
    Wardrobe, WardrobeError, WardrobeHolder,
};
use covey_shared::{ChangeEvent, ItemCategory, Rarity, WardrobeItem};

fn data_file(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data").join(name)
}

fn stock() -> Arc<ItemCatalog> {
    Arc::new(ItemCatalog::covey_town().unwrap())
}

// ============================================================
// Data files
// ============================================================

#[test]
fn test_shipped_catalog_matches_builtin() {
    let loaded = ItemCatalog::from_file(data_file("catalog.toml")).unwrap();
    let builtin = ItemCatalog::covey_town().unwrap();

    assert_eq!(loaded.len(), builtin.len());
    assert_eq!(loaded.default_skin(), builtin.default_skin());
    assert_eq!(loaded.default_outfit(), builtin.default_outfit());
    for item in builtin.unlockables() {
        assert_eq!(loaded.get(&item.id), Some(item));
    }
}

#[test]
fn test_shipped_gacha_builds() {
    let config = GachaConfig::from_file(data_file("gacha.toml")).unwrap();
    let picker = config.build_picker(&stock(), Arc::new(NullSink)).unwrap();
    assert_eq!(picker.pull_cost(), 10);
    assert_eq!(picker.item_pool().len(), 4);
    assert!(picker.item_pool().iter().all(|item| item.is_outfit()));
}

// ============================================================
// Fresh wardrobe
// ============================================================

#[test]
fn test_fresh_wardrobe() {
    let wardrobe = Wardrobe::new(stock());
    let snapshot = wardrobe.to_snapshot();

    assert_eq!(snapshot.currency, 0);
    assert_eq!(snapshot.current_outfit.id, "misa");
    assert_eq!(snapshot.current_skin.category, ItemCategory::Skin);
    assert_eq!(wardrobe.items_in_category(ItemCategory::Skin).count(), 5);
    assert_eq!(wardrobe.items_in_category(ItemCategory::Outfit).count(), 1);
}

// ============================================================
// Pull scenarios
// ============================================================

#[test]
fn test_pull_then_duplicate_refund() {
    let catalog = stock();
    let sink = Arc::new(BufferedSink::new());
    let ness = catalog.resolve("ness").unwrap().clone();
    let picker = GachaPicker::new("g", Arc::clone(&catalog), vec![ness], 10, RefundRate::from_fraction(0.1).unwrap(), sink.clone())
        .unwrap()
        .with_seed(11);

    let mut player = Player::new("p1", "ana", catalog);
    player.wardrobe_mut().set_currency(30).unwrap();

    assert_eq!(picker.pull(&mut player).unwrap().wardrobe.currency, 20);
    assert_eq!(picker.pull(&mut player).unwrap().wardrobe.currency, 11);
    assert_eq!(player.wardrobe().items_in_category(ItemCategory::Outfit).count(), 2);

    let events = sink.drain();
    assert_eq!(events.len(), 2);
    match &events[1] {
        ChangeEvent::PlayerWardrobeChanged(model) => {
            assert_eq!(model.id, "p1");
            assert_eq!(model.wardrobe.currency, 11);
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn test_pull_then_equip_then_round_trip() {
    let catalog = stock();
    let keqing = catalog.resolve("keqing").unwrap().clone();
    let picker = GachaPicker::new("g", Arc::clone(&catalog), vec![keqing.clone()], 5, RefundRate::NONE, Arc::new(NullSink)).unwrap();

    let mut player = Player::new("p1", "ana", Arc::clone(&catalog));
    player.wardrobe_mut().set_currency(12).unwrap();
    picker.pull(&mut player).unwrap();
    player.wardrobe_mut().equip_outfit(&keqing).unwrap();
    player.wardrobe_mut().equip_by_id("skin3").unwrap();

    let key = player.wardrobe().export_key().unwrap();
    let mut restored = Wardrobe::new(catalog);
    restored.import_key(&key).unwrap();

    assert_eq!(restored.to_snapshot(), player.wardrobe().to_snapshot());
    assert_eq!(restored.current_outfit().id, "keqing");
    assert_eq!(restored.current_skin().id, "skin3");
    assert_eq!(restored.currency(), 7);
}

#[test]
fn test_rarity_weight_excludes_zero_tier() {
    let catalog = stock();
    let pool = vec![
        catalog.resolve("ness").unwrap().clone(),
        catalog.resolve("keqing").unwrap().clone(),
    ];
    let picker = GachaPicker::new("g", Arc::clone(&catalog), pool, 1, RefundRate::FULL, Arc::new(NullSink))
        .unwrap()
        .with_rarity_weights(RarityWeights::uniform().with(Rarity::Common, 10).with(Rarity::Rare, 0))
        .unwrap()
        .with_seed(3);

    for _ in 0..500 {
        assert_eq!(picker.draw().unwrap().id, "ness");
    }
}

#[test]
fn test_empty_pool_and_poor_player() {
    let catalog = stock();
    let empty = GachaPicker::new("empty", Arc::clone(&catalog), Vec::new(), 10, RefundRate::NONE, Arc::new(NullSink)).unwrap();
    let mut player = Player::new("p1", "ana", Arc::clone(&catalog));
    player.wardrobe_mut().set_currency(100).unwrap();
    assert!(matches!(empty.pull(&mut player), Err(WardrobeError::EmptyPool { .. })));

    let full = GachaPicker::new(
        "full",
        Arc::clone(&catalog),
        vec![catalog.resolve("bday").unwrap().clone()],
        101,
        RefundRate::NONE,
        Arc::new(NullSink),
    )
    .unwrap();
    assert!(matches!(
        full.pull(&mut player),
        Err(WardrobeError::InsufficientFunds {
            required: 101,
            available: 100
        })
    ));
    assert_eq!(player.wardrobe().currency(), 100);
    assert!(!player.wardrobe().owns("bday"));
}

#[test]
fn test_pool_outside_catalog_rejected() {
    let dragon = WardrobeItem::new("dragon", "Dragon", ItemCategory::Outfit);
    assert_eq!(
        GachaPicker::new("g", stock(), vec![dragon.clone()], 1, RefundRate::NONE, Arc::new(NullSink)).unwrap_err(),
        WardrobeError::UnknownItem("dragon".into())
    );

    let picker = GachaPicker::new("g", stock(), Vec::new(), 1, RefundRate::NONE, Arc::new(NullSink)).unwrap();
    assert_eq!(picker.add_item_to_pool(dragon), Err(WardrobeError::UnknownItem("dragon".into())));

    let mut model = picker.to_gacha_model();
    model.item_pool.push(WardrobeItem::new("keqing", "Keqing", ItemCategory::Outfit));
    assert_eq!(
        GachaPicker::from_model(&model, stock(), Arc::new(NullSink)).unwrap_err(),
        WardrobeError::UnknownItem("keqing".into())
    );
}

#[test]
fn test_every_pull_exports_an_importable_key() {
    let catalog = stock();
    let pool: Vec<_> = catalog.unlockables().cloned().collect();
    let picker = GachaPicker::new("g", Arc::clone(&catalog), pool, 1, RefundRate::NONE, Arc::new(NullSink))
        .unwrap()
        .with_seed(5);

    let mut player = Player::new("p1", "ana", Arc::clone(&catalog));
    player.wardrobe_mut().set_currency(20).unwrap();
    for _ in 0..20 {
        let result = picker.pull(&mut player).unwrap();
        let mut fresh = Wardrobe::new(Arc::clone(&catalog));
        fresh.import_key(&player.wardrobe().export_key().unwrap()).unwrap();
        assert!(fresh.owns(&result.item.id));
        assert_eq!(fresh.to_snapshot(), player.wardrobe().to_snapshot());
    }
}

// ============================================================
// Key imports
// ============================================================

#[test]
fn test_import_rejections_leave_wardrobe_untouched() {
    let catalog = stock();
    let mut wardrobe = Wardrobe::new(Arc::clone(&catalog));
    wardrobe.set_currency(42).unwrap();
    let before = wardrobe.to_snapshot();

    let cases = [
        ("{not json", "malformed"),
        (
            r#"{"currency":-1,"currentSkinID":"skin0","currentOutfitID":"misa","inventory":[]}"#,
            "negative currency",
        ),
        (
            r#"{"currency":5,"currentSkinID":"skin0","currentOutfitID":"misa","inventory":["dragon"]}"#,
            "unknown item",
        ),
        (
            r#"{"currency":5,"currentSkinID":"skin0","currentOutfitID":"ness","inventory":[]}"#,
            "equipped but not owned",
        ),
        (
            r#"{"currency":5,"currentSkinID":"ness","currentOutfitID":"misa","inventory":["ness"]}"#,
            "outfit in skin slot",
        ),
    ];

    for (key, case) in cases {
        assert!(wardrobe.import_key(key).is_err(), "accepted {case}");
        assert_eq!(wardrobe.to_snapshot(), before, "{case} changed state");
    }
}

#[test]
fn test_import_ignores_listed_defaults() {
    let mut wardrobe = Wardrobe::new(stock());
    wardrobe
        .import_key(r#"{"currency":3,"currentSkinID":"skin2","currentOutfitID":"misa","inventory":["misa","ness"]}"#)
        .unwrap();

    let misa_count = wardrobe.inventory().iter().filter(|item| item.id == "misa").count();
    assert_eq!(misa_count, 1);
    assert!(wardrobe.owns("ness"));
    assert_eq!(wardrobe.to_key().inventory, vec!["ness".to_owned()]);
}

// ============================================================
// Service
// ============================================================

#[test]
fn test_town_session() {
    let sink = Arc::new(BufferedSink::new());
    let economy = TownEconomy::new(
        Arc::new(ItemCatalog::from_file(data_file("catalog.toml")).unwrap()),
        sink.clone(),
    );
    let picker = economy
        .register_picker_from_config(&GachaConfig::from_file(data_file("gacha.toml")).unwrap())
        .unwrap();

    economy.join("p1", "ana");
    economy.grant_currency("p1", 100).unwrap();
    for _ in 0..5 {
        economy.pull("p1", picker.id()).unwrap();
    }

    let model = economy.player_model("p1").unwrap();
    let owned_unlockables = model.wardrobe.inventory.len() - 6;
    let duplicates = 5 - owned_unlockables;
    assert_eq!(
        model.wardrobe.currency,
        100 - 50 + i64::try_from(duplicates).unwrap()
    );

    // grant + 5 pulls
    assert_eq!(sink.drain().len(), 6);

    picker.add_item_to_pool(economy.catalog().resolve("bday").unwrap().clone()).unwrap();
    assert!(matches!(sink.drain().as_slice(), [ChangeEvent::PoolChanged(_)]));
}
