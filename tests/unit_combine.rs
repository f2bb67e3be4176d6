// Unit tests for the cross-source combiner and per-item datasets.
//
// Tests the pure views (pool, unique, common, threshold) on small hand-built
// item maps, plus the CSV/word-list writers against a temp directory.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;

use wordpool::combine::{
    common_view, membership_distribution, pool_view, require_two_items, subtract_exclusions,
    threshold_min_items, threshold_view, unique_view, write_common_csv, write_coverage_csv,
    write_pool_csv, ItemCounts,
};
use wordpool::dataset::{
    read_dataset_totals, read_word_list, write_dataset_csv, write_word_list, ItemAggregator,
    UnitId,
};
use wordpool::text::WordCounts;

fn counts(pairs: &[(&str, u64)]) -> ItemCounts {
    pairs.iter().map(|(w, c)| (w.to_string(), *c)).collect()
}

fn words(list: &[&str]) -> BTreeSet<String> {
    list.iter().map(|w| w.to_string()).collect()
}

/// A: {cat:3, dog:1}, B: {cat:2, bird:5}
fn two_items() -> BTreeMap<String, ItemCounts> {
    let mut items = BTreeMap::new();
    items.insert("A".to_string(), counts(&[("cat", 3), ("dog", 1)]));
    items.insert("B".to_string(), counts(&[("cat", 2), ("bird", 5)]));
    items
}

// ============================================================
// Unique / common views
// ============================================================

#[test]
fn unique_view_is_exclusive_per_item() {
    let items = two_items();
    assert_eq!(unique_view(&items, "A"), vec![("dog".to_string(), 1)]);
    assert_eq!(unique_view(&items, "B"), vec![("bird".to_string(), 5)]);
}

#[test]
fn unique_view_unknown_item_is_empty() {
    assert!(unique_view(&two_items(), "C").is_empty());
}

#[test]
fn common_view_sums_counts_in_name_order() {
    let rows = common_view(&two_items());
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].word, "cat");
    assert_eq!(rows[0].total, 5);
    assert_eq!(rows[0].counts, vec![3, 2]);
}

#[test]
fn common_view_sorted_by_total_then_word() {
    let mut items = BTreeMap::new();
    items.insert("x".to_string(), counts(&[("b", 1), ("a", 1), ("c", 9)]));
    items.insert("y".to_string(), counts(&[("b", 1), ("a", 1), ("c", 1)]));
    let order: Vec<String> = common_view(&items).into_iter().map(|r| r.word).collect();
    assert_eq!(order, vec!["c", "a", "b"]);
}

#[test]
fn single_item_is_rejected_for_combine() {
    assert!(require_two_items(1, "books").is_err());
    assert!(require_two_items(2, "books").is_ok());
}

// ============================================================
// Pool view
// ============================================================

#[test]
fn pool_orders_by_membership_then_word() {
    let a = words(&["cat", "dog"]);
    let b = words(&["cat", "bird"]);
    let pool = pool_view([("A", &a), ("B", &b)]);

    let order: Vec<&str> = pool.iter().map(|e| e.word.as_str()).collect();
    assert_eq!(order, vec!["cat", "bird", "dog"]);
    assert_eq!(pool[0].member_count(), 2);
    assert_eq!(pool[1].members, words(&["B"]));
}

#[test]
fn pool_member_count_matches_label_set() {
    let a = words(&["x"]);
    let b = words(&["x"]);
    // Two items sharing a label count once
    let pool = pool_view([("Same", &a), ("Same", &b)]);
    assert_eq!(pool[0].member_count(), 1);
}

#[test]
fn exclusions_are_subtracted_before_pooling() {
    let clean = subtract_exclusions(&words(&["cat", "dog", "gatsby"]), &words(&["gatsby"]));
    assert_eq!(clean, words(&["cat", "dog"]));
}

#[test]
fn distribution_counts_words_per_membership() {
    let a = words(&["cat", "dog"]);
    let b = words(&["cat", "bird"]);
    let dist = membership_distribution(&pool_view([("A", &a), ("B", &b)]));
    assert_eq!(dist.get(&1), Some(&2));
    assert_eq!(dist.get(&2), Some(&1));
}

// ============================================================
// Threshold view, rounded up
// ============================================================

#[test]
fn threshold_rounds_up() {
    assert_eq!(threshold_min_items(10, 90), 9);
    assert_eq!(threshold_min_items(3, 50), 2);
    assert_eq!(threshold_min_items(3, 75), 3);
    assert_eq!(threshold_min_items(4, 100), 4);
}

#[test]
fn threshold_is_at_least_one() {
    assert_eq!(threshold_min_items(3, 0), 1);
}

#[test]
fn threshold_view_is_alphabetical() {
    let a = words(&["zeal", "apple", "mid"]);
    let b = words(&["zeal", "apple"]);
    let c = words(&["zeal"]);
    let pool = pool_view([("a", &a), ("b", &b), ("c", &c)]);
    assert_eq!(threshold_view(&pool, 3, 100), vec!["zeal"]);
    assert_eq!(threshold_view(&pool, 3, 50), vec!["apple", "zeal"]);
}

// ============================================================
// Writers
// ============================================================

#[test]
fn pool_csv_header_and_labels() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("common_pool.csv");
    let a = words(&["cat"]);
    let b = words(&["cat"]);
    write_pool_csv(&path, "books", "book", &pool_view([("Gatsby", &a), ("Dune", &b)])).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(text, "word,books,book_count\ncat,Dune|Gatsby,2\n");
}

#[test]
fn common_csv_has_item_columns() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("common_words.csv");
    let items = two_items();
    let names: Vec<String> = items.keys().cloned().collect();
    write_common_csv(&path, &names, &common_view(&items)).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(text, "word,total,A,B\ncat,5,3,2\n");
}

#[test]
fn coverage_csv_percentages() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("coverage.csv");
    let a = words(&["love", "night"]);
    let b = words(&["love"]);
    let c = words(&["love"]);
    let pool = pool_view([("adele", &a), ("drake", &b), ("eminem", &c)]);
    write_coverage_csv(&path, "artist", "artists", 3, &pool).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "word,artist_count,artist_pct,artists");
    assert_eq!(lines[1], "love,3,100.0,adele; drake; eminem");
    assert_eq!(lines[2], "night,1,33.3,adele");
}

// ============================================================
// Per-item dataset
// ============================================================

fn wc(pairs: &[(&str, u64)]) -> WordCounts {
    pairs.iter().map(|(w, c)| (w.to_string(), *c)).collect()
}

#[test]
fn aggregator_totals_equal_breakdown_sum() {
    let mut agg = ItemAggregator::new();
    agg.add_unit(UnitId::Chapter(1), &wc(&[("cat", 2), ("dog", 1)]));
    agg.add_unit(UnitId::Chapter(2), &wc(&[("cat", 1)]));
    agg.add_unit(UnitId::Chapter(3), &WordCounts::new());

    assert_eq!(agg.unit_count(), 2);
    let records = agg.into_records();
    for r in &records {
        assert_eq!(r.total_count, r.unit_breakdown.values().sum::<u64>());
    }
    assert_eq!(records[0].word, "cat");
    assert_eq!(records[0].total_count, 3);
}

#[test]
fn dataset_csv_round_trips_totals() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dataset.csv");

    let mut agg = ItemAggregator::new();
    agg.add_unit(UnitId::Episode { season: 1, episode: 2 }, &wc(&[("cook", 4)]));
    agg.add_unit(UnitId::Episode { season: 1, episode: 10 }, &wc(&[("cook", 1), ("money", 2)]));
    write_dataset_csv(&path, "episode", &agg.into_records()).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("word,total_count,episode_count,episodes\n"));
    assert!(text.contains("cook,5,2,\"1x02:4,1x10:1\""));

    let totals = read_dataset_totals(&path).unwrap();
    assert_eq!(totals.get("cook"), Some(&5));
    assert_eq!(totals.get("money"), Some(&2));
}

#[test]
fn word_list_is_sorted_with_trailing_newline() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("words.txt");
    write_word_list(&path, ["pear", "apple", "fig"]).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "apple\nfig\npear\n");
    assert_eq!(read_word_list(&path).unwrap(), words(&["apple", "fig", "pear"]));
}
