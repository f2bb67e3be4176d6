// Shared combine steps: unique/common, pool and artist coverage.
//
// Books, shows and artists all store one directory per item under an
// output directory, holding `dataset.csv`, `words.txt` and optionally a
// hand-curated `exclude.csv`. These steps read those files, run the
// combine views and write the cross-item reports next to the items.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use colored::Colorize;
use tracing::{info, warn};
use walkdir::WalkDir;

use super::ItemFamily;
use crate::combine::{self, ItemCounts, PoolEntry};
use crate::dataset::{read_csv_word_column, read_dataset_totals, read_word_list};
use crate::output::terminal;

/// Percentages always reported by the coverage step.
pub const COVERAGE_THRESHOLDS: [u32; 4] = [100, 90, 75, 50];

/// Words shown when listing the words every artist shares.
const SHARED_SAMPLE: usize = 30;

/// A configured item: directory name plus display label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolMember {
    pub name: String,
    pub label: String,
}

impl PoolMember {
    pub fn new(name: &str, label: &str) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
        }
    }
}

/// Result of the unique/common step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueReport {
    /// Unique word count per item
    pub unique: BTreeMap<String, usize>,
    pub common: usize,
}

/// Write `unique.csv` for every item plus `common_words.csv` and
/// `common_words.txt` in `output_dir`. A missing dataset is fatal.
pub fn build_unique(output_dir: &Path, names: &[String], family: ItemFamily) -> Result<UniqueReport> {
    combine::require_two_items(names.len(), family.plural)?;

    let mut items: BTreeMap<String, ItemCounts> = BTreeMap::new();
    for name in names {
        let path = output_dir.join(name).join("dataset.csv");
        if !path.exists() {
            bail!("{} not found. Run parse first.", path.display());
        }
        let totals = read_dataset_totals(&path)?;
        println!("Loaded {name}: {} words", totals.len());
        items.insert(name.clone(), totals);
    }

    println!();
    let mut unique = BTreeMap::new();
    for name in items.keys() {
        let rows = combine::unique_view(&items, name);
        let path = output_dir.join(name).join("unique.csv");
        combine::write_unique_csv(&path, &rows)?;
        terminal::display_unique(name, &rows);
        unique.insert(name.clone(), rows.len());
    }

    let names_sorted: Vec<String> = items.keys().cloned().collect();
    let rows = combine::common_view(&items);
    combine::write_common_csv(&output_dir.join("common_words.csv"), &names_sorted, &rows)?;
    let words: Vec<&str> = rows.iter().map(|r| r.word.as_str()).collect();
    combine::write_lines(&output_dir.join("common_words.txt"), &words)?;

    println!(
        "\n{} common words across {} {}",
        rows.len().to_string().bold(),
        items.len(),
        family.plural
    );
    info!(items = items.len(), common = rows.len(), "Unique and common views written");

    Ok(UniqueReport {
        unique,
        common: rows.len(),
    })
}

/// Build `common_pool.csv` from each member's `words.txt` minus its
/// `exclude.csv`. Members without a word list are skipped with a warning.
pub fn build_pool(output_dir: &Path, members: &[PoolMember], family: ItemFamily) -> Result<Vec<PoolEntry>> {
    let mut loaded: Vec<(String, BTreeSet<String>)> = Vec::new();

    for member in members {
        let item_dir = output_dir.join(&member.name);
        let words_path = item_dir.join("words.txt");
        if !words_path.exists() {
            terminal::warning(&format!(
                "{} not found, skipping {}",
                words_path.display(),
                member.name
            ));
            warn!(item = member.name, "No word list, skipped from pool");
            continue;
        }
        let words = read_word_list(&words_path)?;

        let exclude_path = item_dir.join("exclude.csv");
        let exclude = if exclude_path.exists() {
            read_csv_word_column(&exclude_path)?
        } else {
            BTreeSet::new()
        };

        let clean = combine::subtract_exclusions(&words, &exclude);
        terminal::display_pool_member(
            &member.label,
            words.len(),
            words.len() - clean.len(),
            clean.len(),
        );
        loaded.push((member.label.clone(), clean));
    }

    combine::require_two_items(loaded.len(), family.plural)?;

    let pool = combine::pool_view(loaded.iter().map(|(label, words)| (label.as_str(), words)));
    let path = output_dir.join("common_pool.csv");
    combine::write_pool_csv(&path, family.plural, family.singular, &pool)?;

    println!("\nTotal unique words: {}", pool.len().to_string().bold());
    terminal::display_distribution(&combine::membership_distribution(&pool), family.singular);
    terminal::wrote(&path);
    Ok(pool)
}

/// Item directories under `output_dir` that contain `file_name`, sorted by name.
pub fn discover_items(output_dir: &Path, file_name: &str) -> Vec<(String, PathBuf)> {
    WalkDir::new(output_dir)
        .min_depth(2)
        .max_depth(2)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && e.file_name().to_string_lossy() == file_name)
        .filter_map(|e| {
            let name = e.path().parent()?.file_name()?.to_string_lossy().into_owned();
            Some((name, e.path().to_path_buf()))
        })
        .collect()
}

/// Coverage thresholds: the fixed set plus an optional extra percentage,
/// highest first, without duplicates.
pub fn coverage_thresholds(extra_pct: Option<u32>) -> Vec<u32> {
    let mut pcts: BTreeSet<u32> = COVERAGE_THRESHOLDS.into_iter().collect();
    if let Some(pct) = extra_pct {
        pcts.insert(pct.clamp(1, 100));
    }
    pcts.into_iter().rev().collect()
}

/// Result of the artist coverage step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageReport {
    pub artists: usize,
    pub words: usize,
    /// `(pct, words meeting it)`, highest percentage first
    pub thresholds: Vec<(u32, usize)>,
}

/// Words shared across artists: `coverage.csv` with per-word artist counts
/// and one `coverage_<pct>.txt` list per threshold. Artists with an empty
/// word list are ignored; with none left nothing is written.
pub fn build_coverage(output_dir: &Path, extra_pct: Option<u32>) -> Result<Option<CoverageReport>> {
    let mut artists: Vec<(String, BTreeSet<String>)> = Vec::new();
    for (name, path) in discover_items(output_dir, "words.txt") {
        let words = read_word_list(&path)?;
        if words.is_empty() {
            continue;
        }
        println!("  {name}: {} words", words.len());
        artists.push((name, words));
    }

    if artists.is_empty() {
        println!("No artist word lists found in {}", output_dir.display());
        return Ok(None);
    }

    let total = artists.len();
    let pool = combine::pool_view(artists.iter().map(|(name, words)| (name.as_str(), words)));
    let csv_path = output_dir.join("coverage.csv");
    combine::write_coverage_csv(&csv_path, "artist", "artists", total, &pool)?;
    println!("\n{} words across {total} artists", pool.len());
    terminal::wrote(&csv_path);

    println!();
    let mut thresholds = Vec::new();
    for pct in coverage_thresholds(extra_pct) {
        let words = combine::threshold_view(&pool, total, pct);
        let file = format!("coverage_{pct}.txt");
        combine::write_lines(&output_dir.join(&file), &words)?;
        println!(
            "  {pct:>3}% ({}+ artists): {} words -> {file}",
            combine::threshold_min_items(total, pct),
            words.len()
        );
        thresholds.push((pct, words.len()));
    }

    let shared: Vec<&str> = pool
        .iter()
        .filter(|e| e.member_count() == total)
        .map(|e| e.word.as_str())
        .collect();
    println!("\nWords used by all {total} artists ({}):", shared.len());
    if !shared.is_empty() {
        let sample = shared.iter().take(SHARED_SAMPLE).copied().collect::<Vec<_>>();
        let more = if shared.len() > SHARED_SAMPLE { ", ..." } else { "" };
        println!("  {}{more}", sample.join(", "));
    }

    Ok(Some(CoverageReport {
        artists: total,
        words: pool.len(),
        thresholds,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thresholds_with_extra() {
        assert_eq!(coverage_thresholds(None), vec![100, 90, 75, 50]);
        assert_eq!(coverage_thresholds(Some(60)), vec![100, 90, 75, 60, 50]);
        assert_eq!(coverage_thresholds(Some(90)), vec![100, 90, 75, 50]);
    }
}
