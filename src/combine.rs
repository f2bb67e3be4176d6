// Cross-source combiner: pool, unique, common and threshold views.
//
// All views are pure functions over per-item word maps. Items are held in
// BTreeMaps so iteration order (and therefore every output file) is fixed
// by the item names alone. Output rows are sorted by descending count or
// membership, ties broken alphabetically by word.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

/// word -> count for one source item.
pub type ItemCounts = BTreeMap<String, u64>;

/// One word of a pool with the labels of the items that contain it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolEntry {
    pub word: String,
    pub members: BTreeSet<String>,
}

impl PoolEntry {
    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}

/// A word present in every item, with counts aligned to the sorted item names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonRow {
    pub word: String,
    pub total: u64,
    pub counts: Vec<u64>,
}

/// Fail unless at least two items are available for a multi-item combine.
pub fn require_two_items(available: usize, kind: &str) -> Result<()> {
    if available < 2 {
        bail!("Need at least 2 {kind} to combine, found {available}");
    }
    Ok(())
}

/// Remove excluded words from an item's word set.
pub fn subtract_exclusions(words: &BTreeSet<String>, exclude: &BTreeSet<String>) -> BTreeSet<String> {
    words.difference(exclude).cloned().collect()
}

/// Union of all items' words with membership labels, sorted by
/// `(-member_count, word)`. Items sharing a label count once.
pub fn pool_view<'a, I>(items: I) -> Vec<PoolEntry>
where
    I: IntoIterator<Item = (&'a str, &'a BTreeSet<String>)>,
{
    let mut members: BTreeMap<&str, BTreeSet<String>> = BTreeMap::new();
    for (label, words) in items {
        for word in words {
            members
                .entry(word.as_str())
                .or_default()
                .insert(label.to_string());
        }
    }

    let mut pool: Vec<PoolEntry> = members
        .into_iter()
        .map(|(word, members)| PoolEntry {
            word: word.to_string(),
            members,
        })
        .collect();
    pool.sort_by(|a, b| {
        b.member_count()
            .cmp(&a.member_count())
            .then_with(|| a.word.cmp(&b.word))
    });
    pool
}

/// How many pool words sit in exactly N items, keyed by N.
pub fn membership_distribution(pool: &[PoolEntry]) -> BTreeMap<usize, usize> {
    let mut dist = BTreeMap::new();
    for entry in pool {
        *dist.entry(entry.member_count()).or_insert(0) += 1;
    }
    dist
}

/// Words present in `name` and absent from every other item, sorted by
/// `(-count, word)`.
pub fn unique_view(items: &BTreeMap<String, ItemCounts>, name: &str) -> Vec<(String, u64)> {
    let Some(own) = items.get(name) else {
        return Vec::new();
    };
    let mut rows: Vec<(String, u64)> = own
        .iter()
        .filter(|(word, _)| {
            items
                .iter()
                .all(|(other, counts)| other == name || !counts.contains_key(*word))
        })
        .map(|(word, count)| (word.clone(), *count))
        .collect();
    sort_counted(&mut rows);
    rows
}

/// Words present in every item, with per-item counts in item-name order
/// and their sum, sorted by `(-total, word)`.
pub fn common_view(items: &BTreeMap<String, ItemCounts>) -> Vec<CommonRow> {
    let mut maps = items.values();
    let Some(first) = maps.next() else {
        return Vec::new();
    };
    let rest: Vec<&ItemCounts> = maps.collect();

    let mut rows: Vec<CommonRow> = first
        .keys()
        .filter(|word| rest.iter().all(|m| m.contains_key(*word)))
        .map(|word| {
            let counts: Vec<u64> = items.values().map(|m| m[word]).collect();
            CommonRow {
                word: word.clone(),
                total: counts.iter().sum(),
                counts,
            }
        })
        .collect();
    rows.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.word.cmp(&b.word)));
    rows
}

/// Minimum number of items a word must appear in to meet `pct` percent of
/// `total_items`: `ceil(total_items * pct / 100)`, at least 1.
pub fn threshold_min_items(total_items: usize, pct: u32) -> usize {
    let needed = (total_items as u64 * pct as u64).div_ceil(100) as usize;
    needed.max(1)
}

/// Words in at least `threshold_min_items(total_items, pct)` items, sorted
/// alphabetically.
pub fn threshold_view(pool: &[PoolEntry], total_items: usize, pct: u32) -> Vec<String> {
    let min_items = threshold_min_items(total_items, pct);
    let words: BTreeSet<&str> = pool
        .iter()
        .filter(|e| e.member_count() >= min_items)
        .map(|e| e.word.as_str())
        .collect();
    words.into_iter().map(str::to_string).collect()
}

pub fn sort_counted(rows: &mut [(String, u64)]) {
    rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
}

// -- Report writers --

/// `word,<plural>,<singular>_count` with member labels joined by `|`.
pub fn write_pool_csv(path: &Path, plural: &str, singular: &str, pool: &[PoolEntry]) -> Result<()> {
    let mut writer = csv_writer(path)?;
    writer.write_record(["word", plural, format!("{singular}_count").as_str()])?;
    for entry in pool {
        let labels = entry.members.iter().cloned().collect::<Vec<_>>().join("|");
        writer.write_record([
            entry.word.as_str(),
            labels.as_str(),
            entry.member_count().to_string().as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// `word,total_count`.
pub fn write_unique_csv(path: &Path, rows: &[(String, u64)]) -> Result<()> {
    let mut writer = csv_writer(path)?;
    writer.write_record(["word", "total_count"])?;
    for (word, count) in rows {
        writer.write_record([word.as_str(), count.to_string().as_str()])?;
    }
    writer.flush()?;
    Ok(())
}

/// `word,total,<item names...>`.
pub fn write_common_csv(path: &Path, names: &[String], rows: &[CommonRow]) -> Result<()> {
    let mut writer = csv_writer(path)?;
    let mut header = vec!["word".to_string(), "total".to_string()];
    header.extend(names.iter().cloned());
    writer.write_record(&header)?;
    for row in rows {
        let mut record = vec![row.word.clone(), row.total.to_string()];
        record.extend(row.counts.iter().map(u64::to_string));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

/// `word,<singular>_count,<singular>_pct,<plural>` with member names joined by `; `.
pub fn write_coverage_csv(
    path: &Path,
    singular: &str,
    plural: &str,
    total_items: usize,
    pool: &[PoolEntry],
) -> Result<()> {
    let mut writer = csv_writer(path)?;
    writer.write_record([
        "word".to_string(),
        format!("{singular}_count"),
        format!("{singular}_pct"),
        plural.to_string(),
    ])?;
    for entry in pool {
        let pct = entry.member_count() as f64 / total_items.max(1) as f64 * 100.0;
        let members = entry.members.iter().cloned().collect::<Vec<_>>().join("; ");
        writer.write_record([
            entry.word.clone(),
            entry.member_count().to_string(),
            format!("{pct:.1}"),
            members,
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// One word per line in the given order, with a trailing newline.
pub fn write_lines<S: AsRef<str>>(path: &Path, words: &[S]) -> Result<()> {
    let mut body = words
        .iter()
        .map(|w| w.as_ref())
        .collect::<Vec<_>>()
        .join("\n");
    body.push('\n');
    fs::write(path, body).with_context(|| format!("Failed to write {}", path.display()))
}

fn csv_writer(path: &Path) -> Result<csv::Writer<fs::File>> {
    csv::Writer::from_path(path).with_context(|| format!("Failed to create {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_rounds_up() {
        assert_eq!(threshold_min_items(10, 100), 10);
        assert_eq!(threshold_min_items(10, 90), 9);
        assert_eq!(threshold_min_items(10, 75), 8);
        assert_eq!(threshold_min_items(3, 50), 2);
        assert_eq!(threshold_min_items(1, 50), 1);
        assert_eq!(threshold_min_items(4, 0), 1);
    }

    #[test]
    fn test_require_two_items() {
        assert!(require_two_items(1, "books").is_err());
        assert!(require_two_items(2, "books").is_ok());
    }

    #[test]
    fn test_subtract_exclusions() {
        let words: BTreeSet<String> = ["cat", "dog", "bird"].iter().map(|s| s.to_string()).collect();
        let exclude: BTreeSet<String> = ["dog", "fish"].iter().map(|s| s.to_string()).collect();
        let clean = subtract_exclusions(&words, &exclude);
        assert!(!clean.contains("dog"));
        assert_eq!(clean.len(), 2);
    }
}
