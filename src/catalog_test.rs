use std::collections::HashSet;

use rand::SeedableRng;
use rand::rngs::StdRng;

use super::*;

fn five_countries() -> FlagCatalog {
    FlagCatalog::from_entries([
        FlagEntry::new("Italy", "url1"),
        FlagEntry::new("France", "url2"),
        FlagEntry::new("Japan", "url3"),
        FlagEntry::new("Brazil", "url4"),
        FlagEntry::new("Kenya", "url5"),
    ])
}

fn names(entries: &[FlagEntry]) -> HashSet<String> {
    entries.iter().map(|e| e.country_name().to_string()).collect()
}

// =============================================================================
// populate
// =============================================================================

#[test]
fn populate_filters_incomplete_records() {
    let records = vec![
        ProviderRecord::new("Italy", "it.png"),
        ProviderRecord { name: None, ..ProviderRecord::new("x", "x.png") },
        ProviderRecord { flags: None, ..ProviderRecord::new("Atlantis", "") },
        ProviderRecord::new("", "blank.png"),
        ProviderRecord::new("Peru", "pe.png"),
    ];
    let catalog = FlagCatalog::populate(records);
    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog.available_len(), 2);
    assert!(catalog.used().is_empty());
    assert!(catalog.correct().is_empty());
}

#[test]
fn populate_drops_duplicate_names() {
    let catalog = FlagCatalog::populate(vec![
        ProviderRecord::new("Chad", "td-1.png"),
        ProviderRecord::new("Chad", "td-2.png"),
    ]);
    assert_eq!(catalog.len(), 1);
}

#[test]
fn populate_empty_input_is_empty() {
    let catalog = FlagCatalog::populate(Vec::new());
    assert!(catalog.is_empty());
}

// =============================================================================
// draw_target
// =============================================================================

#[test]
fn draw_target_returns_every_entry_once_then_exhausts() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut catalog = five_countries();

    let mut drawn = HashSet::new();
    for _ in 0..5 {
        let entry = catalog.draw_target(&mut rng).unwrap();
        assert!(drawn.insert(entry.country_name().to_string()));
    }
    assert_eq!(drawn.len(), 5);
    assert!(catalog.draw_target(&mut rng).is_none());
    assert_eq!(catalog.used().len(), 5);
    assert_eq!(catalog.len(), 5);
}

#[test]
fn draw_target_on_empty_catalog_is_exhausted() {
    let mut rng = StdRng::seed_from_u64(1);
    assert!(FlagCatalog::default().draw_target(&mut rng).is_none());
}

// =============================================================================
// sample_distractors
// =============================================================================

#[test]
fn sample_distractors_excludes_target_and_duplicates() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..50 {
        let mut catalog = five_countries();
        let target = catalog.draw_target(&mut rng).unwrap();
        let picks = catalog.sample_distractors(3, &mut rng);

        assert_eq!(picks.len(), 3);
        assert!(!picks.contains(&target));
        assert_eq!(names(&picks).len(), 3);
    }
}

#[test]
fn sample_distractors_does_not_consume_available() {
    let mut rng = StdRng::seed_from_u64(3);
    let catalog = five_countries();
    let _ = catalog.sample_distractors(3, &mut rng);
    assert_eq!(catalog.available_len(), 5);
}

#[test]
fn sample_distractors_short_catalog_returns_fewer() {
    let mut rng = StdRng::seed_from_u64(9);
    let mut catalog = FlagCatalog::from_entries([FlagEntry::new("Chad", "td.png"), FlagEntry::new("Mali", "ml.png")]);
    let _ = catalog.draw_target(&mut rng).unwrap();

    let picks = catalog.sample_distractors(3, &mut rng);
    assert_eq!(picks.len(), 1);
    assert!(catalog.sample_distractors(0, &mut rng).is_empty());
}

// =============================================================================
// mark_correct / recycle_all
// =============================================================================

#[test]
fn mark_correct_moves_used_entry() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut catalog = five_countries();
    let target = catalog.draw_target(&mut rng).unwrap();

    assert!(catalog.mark_correct(target.country_name()));
    assert!(catalog.used().is_empty());
    assert_eq!(catalog.correct(), &[target.clone()]);
    assert!(!catalog.mark_correct(target.country_name()));
    assert_eq!(catalog.len(), 5);
}

#[test]
fn recycle_all_restores_full_available_set() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut catalog = five_countries();
    let first = catalog.draw_target(&mut rng).unwrap();
    catalog.mark_correct(first.country_name());
    let _second = catalog.draw_target(&mut rng).unwrap();

    catalog.recycle_all();
    assert_eq!(catalog.available_len(), 5);
    assert!(catalog.used().is_empty());
    assert!(catalog.correct().is_empty());

    let mut all = Vec::new();
    while let Some(entry) = catalog.draw_target(&mut rng) {
        all.push(entry);
    }
    assert_eq!(names(&all), names(&five_countries().sample_distractors(5, &mut rng)));
}

// =============================================================================
// FlagEntry links
// =============================================================================

#[test]
fn wikipedia_url_uses_underscores() {
    let entry = FlagEntry::new("New Zealand", "nz.png");
    assert_eq!(entry.wikipedia_url(), "https://en.wikipedia.org/wiki/New_Zealand");
}

#[test]
fn maps_url_encodes_query() {
    let entry = FlagEntry::new("São Tomé and Príncipe", "st.png");
    let url = entry.maps_url();
    assert!(url.starts_with("https://www.google.com/maps/search/?api=1&query="));
    assert!(url.contains("S%C3%A3o+Tom%C3%A9+and+Pr%C3%ADncipe"));
}
