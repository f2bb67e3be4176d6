// Cross-family merge: combine the books/shows/lyrics pools, then split
// the result by presence in a Wiktionary dump.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::DATASETS;
use crate::combine::{self, PoolEntry};
use crate::dataset::read_csv_word_column;
use crate::output::terminal;

/// Progress is reported every this many dump lines.
const PROGRESS_EVERY: usize = 500_000;

/// Family name -> location of its `common_pool.csv` under `root`.
pub fn default_pools(root: &Path) -> BTreeMap<String, PathBuf> {
    [("books", "books"), ("tv_shows", "tv_shows"), ("lyrics", "lyrics")]
        .into_iter()
        .map(|(name, dir)| {
            (
                name.to_string(),
                root.join(dir).join("output").join("common_pool.csv"),
            )
        })
        .collect()
}

/// Merge the given pools into `output` (`word,datasets,dataset_count`).
/// Pools whose file is missing are skipped with a warning.
pub fn merge_pools(pools: &BTreeMap<String, PathBuf>, output: &Path) -> Result<Vec<PoolEntry>> {
    let mut loaded: Vec<(String, BTreeSet<String>)> = Vec::new();
    for (name, path) in pools {
        if !path.exists() {
            terminal::warning(&format!("{} not found, skipping {name}", path.display()));
            warn!(dataset = name, "Pool file missing");
            continue;
        }
        let words = read_csv_word_column(path)?;
        println!("  {name}: {} words", words.len());
        loaded.push((name.clone(), words));
    }

    let merged = combine::pool_view(loaded.iter().map(|(name, words)| (name.as_str(), words)));
    combine::write_pool_csv(output, DATASETS.plural, DATASETS.singular, &merged)?;

    println!("\nTotal unique words: {}", merged.len());
    terminal::wrote(output);
    terminal::display_ranked_distribution(
        &combine::membership_distribution(&merged),
        pools.len(),
        DATASETS.singular,
    );
    info!(words = merged.len(), pools = loaded.len(), "Pools merged");
    Ok(merged)
}

#[derive(Deserialize)]
struct DumpEntry {
    #[serde(default)]
    word: String,
    #[serde(default)]
    lang: String,
}

/// Stream a Kaikki JSONL dump and collect trimmed, lowercased English
/// headwords. Lines that are not valid JSON are skipped.
pub fn load_wiktionary_words(path: &Path) -> Result<HashSet<String>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut words = HashSet::new();
    let mut skipped = 0usize;
    for (i, line) in reader.lines().enumerate() {
        if i > 0 && i % PROGRESS_EVERY == 0 {
            eprintln!("  ...scanned {i} lines, {} unique words", words.len());
        }
        let Ok(line) = line else {
            skipped += 1;
            continue;
        };
        let Ok(entry) = serde_json::from_str::<DumpEntry>(&line) else {
            skipped += 1;
            continue;
        };
        if entry.lang != "English" {
            continue;
        }
        let word = entry.word.trim().to_lowercase();
        if !word.is_empty() {
            words.insert(word);
        }
    }
    debug!(skipped = skipped, "Unparseable dump lines skipped");
    Ok(words)
}

/// Split the `word` column of `pool` into words present in `known` and
/// the rest, each sorted.
pub fn split_by_dictionary(pool: &Path, known: &HashSet<String>) -> Result<(Vec<String>, Vec<String>)> {
    let words = read_csv_word_column(pool)?;
    let (matched, unmatched): (Vec<String>, Vec<String>) =
        words.into_iter().partition(|w| known.contains(w));
    Ok((matched, unmatched))
}

/// Keep the merged pool words that Wiktionary knows as English words.
pub fn filter_by_wiktionary(
    wiktionary: &Path,
    pool: &Path,
    matched_out: &Path,
    unmatched_out: &Path,
) -> Result<(usize, usize)> {
    eprintln!("Loading Wiktionary words...");
    let known = load_wiktionary_words(wiktionary)?;
    eprintln!("Wiktionary contains {} unique English words", known.len());

    let (matched, unmatched) = split_by_dictionary(pool, &known)?;
    combine::write_lines(matched_out, &matched)?;
    combine::write_lines(unmatched_out, &unmatched)?;

    eprintln!("Matched: {} | Unmatched: {}", matched.len(), unmatched.len());
    Ok((matched.len(), unmatched.len()))
}
