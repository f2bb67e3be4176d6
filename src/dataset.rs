// Per-item word datasets.
//
// Every pipeline reduces one source item (a book, a show, an artist) to a
// set of WordRecords keyed by word, each with a per-unit breakdown. This
// module owns that aggregation and the two files written per item:
// `dataset.csv` (sorted by descending total, then word) and `words.txt`
// (sorted word list, one per line).

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::text::WordCounts;

/// Addressable sub-part of a source item.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UnitId {
    Chapter(u32),
    Episode { season: u32, episode: u32 },
    Song(String),
}

impl UnitId {
    /// Column stem used in dataset headers ("chapter" -> `chapter_count`, `chapters`).
    pub fn kind(&self) -> &'static str {
        match self {
            UnitId::Chapter(_) => "chapter",
            UnitId::Episode { .. } => "episode",
            UnitId::Song(_) => "song",
        }
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitId::Chapter(n) => write!(f, "{n}"),
            UnitId::Episode { season, episode } => write!(f, "{season}x{episode:02}"),
            UnitId::Song(title) => f.write_str(title),
        }
    }
}

/// One word of a source item with its per-unit counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordRecord {
    pub word: String,
    pub total_count: u64,
    pub unit_breakdown: BTreeMap<UnitId, u64>,
}

/// Accumulates per-unit word counts for one source item.
#[derive(Debug, Default)]
pub struct ItemAggregator {
    words: BTreeMap<String, WordRecord>,
    units: BTreeSet<UnitId>,
}

impl ItemAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the counts of one unit. Adding the same unit twice sums.
    pub fn add_unit(&mut self, unit: UnitId, counts: &WordCounts) {
        if counts.is_empty() {
            return;
        }
        for (word, &count) in counts {
            let record = self
                .words
                .entry(word.clone())
                .or_insert_with(|| WordRecord {
                    word: word.clone(),
                    total_count: 0,
                    unit_breakdown: BTreeMap::new(),
                });
            record.total_count += count;
            *record.unit_breakdown.entry(unit.clone()).or_insert(0) += count;
        }
        self.units.insert(unit);
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Number of distinct units that contributed at least one word.
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// Records sorted by `(-total_count, word)`.
    pub fn into_records(self) -> Vec<WordRecord> {
        let mut records: Vec<WordRecord> = self.words.into_values().collect();
        sort_records(&mut records);
        records
    }
}

pub fn sort_records(records: &mut [WordRecord]) {
    records.sort_by(|a, b| {
        b.total_count
            .cmp(&a.total_count)
            .then_with(|| a.word.cmp(&b.word))
    });
}

/// Write `dataset.csv`: `word,total_count,<unit>_count,<unit>s` where the
/// last column lists `unit:count` pairs in unit order joined by `,`.
pub fn write_dataset_csv(path: &Path, unit_kind: &str, records: &[WordRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    writer.write_record([
        "word".to_string(),
        "total_count".to_string(),
        format!("{unit_kind}_count"),
        format!("{unit_kind}s"),
    ])?;

    for record in records {
        let breakdown = record
            .unit_breakdown
            .iter()
            .map(|(unit, count)| format!("{unit}:{count}"))
            .collect::<Vec<_>>()
            .join(",");
        writer.write_record([
            &record.word,
            &record.total_count.to_string(),
            &record.unit_breakdown.len().to_string(),
            &breakdown,
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Write a sorted, one-per-line word list with a trailing newline.
pub fn write_word_list<'a, I>(path: &Path, words: I) -> Result<()>
where
    I: IntoIterator<Item = &'a str>,
{
    let sorted: BTreeSet<&str> = words.into_iter().collect();
    let mut body = sorted.into_iter().collect::<Vec<_>>().join("\n");
    body.push('\n');
    fs::write(path, body).with_context(|| format!("Failed to write {}", path.display()))
}

/// Read a word list: trimmed, lowercased, blank lines dropped.
pub fn read_word_list(path: &Path) -> Result<BTreeSet<String>> {
    let text =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(text
        .lines()
        .map(|l| l.trim().to_lowercase())
        .filter(|l| !l.is_empty())
        .collect())
}

/// Read the `word` column of a CSV file (lowercased, blanks dropped).
pub fn read_csv_word_column(path: &Path) -> Result<BTreeSet<String>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let headers = reader.headers()?.clone();
    let Some(idx) = headers.iter().position(|h| h == "word") else {
        bail!("{} has no 'word' column", path.display());
    };

    let mut words = BTreeSet::new();
    for row in reader.records() {
        let row = row.with_context(|| format!("Malformed row in {}", path.display()))?;
        if let Some(w) = row.get(idx) {
            let w = w.trim().to_lowercase();
            if !w.is_empty() {
                words.insert(w);
            }
        }
    }
    Ok(words)
}

/// Read `word -> total_count` from a dataset CSV.
pub fn read_dataset_totals(path: &Path) -> Result<BTreeMap<String, u64>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let headers = reader.headers()?.clone();
    let word_idx = headers.iter().position(|h| h == "word");
    let total_idx = headers.iter().position(|h| h == "total_count");
    let (Some(word_idx), Some(total_idx)) = (word_idx, total_idx) else {
        bail!(
            "{} must have 'word' and 'total_count' columns",
            path.display()
        );
    };

    let mut totals = BTreeMap::new();
    for row in reader.records() {
        let row = row.with_context(|| format!("Malformed row in {}", path.display()))?;
        let word = row.get(word_idx).unwrap_or_default().to_string();
        let total: u64 = row
            .get(total_idx)
            .unwrap_or_default()
            .trim()
            .parse()
            .with_context(|| format!("Bad total_count for '{word}' in {}", path.display()))?;
        totals.insert(word, total);
    }
    Ok(totals)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(pairs: &[(&str, u64)]) -> WordCounts {
        pairs.iter().map(|(w, c)| (w.to_string(), *c)).collect()
    }

    #[test]
    fn test_unit_display() {
        assert_eq!(UnitId::Chapter(3).to_string(), "3");
        assert_eq!(
            UnitId::Episode {
                season: 1,
                episode: 2
            }
            .to_string(),
            "1x02"
        );
        assert_eq!(
            UnitId::Episode {
                season: 2,
                episode: 13
            }
            .to_string(),
            "2x13"
        );
    }

    #[test]
    fn test_aggregator_totals_match_breakdown() {
        let mut agg = ItemAggregator::new();
        agg.add_unit(UnitId::Chapter(2), &counts(&[("cat", 2), ("dog", 1)]));
        agg.add_unit(UnitId::Chapter(1), &counts(&[("cat", 1)]));
        assert_eq!(agg.unit_count(), 2);

        let records = agg.into_records();
        assert_eq!(records[0].word, "cat");
        assert_eq!(records[0].total_count, 3);
        assert_eq!(
            records[0].total_count,
            records[0].unit_breakdown.values().sum::<u64>()
        );
        let units: Vec<_> = records[0].unit_breakdown.keys().cloned().collect();
        assert_eq!(units, vec![UnitId::Chapter(1), UnitId::Chapter(2)]);
    }

    #[test]
    fn test_empty_unit_is_not_counted() {
        let mut agg = ItemAggregator::new();
        agg.add_unit(UnitId::Chapter(1), &WordCounts::new());
        assert!(agg.is_empty());
        assert_eq!(agg.unit_count(), 0);
    }

    #[test]
    fn test_sort_ties_alphabetical() {
        let mut agg = ItemAggregator::new();
        agg.add_unit(UnitId::Chapter(1), &counts(&[("pear", 1), ("apple", 1), ("fig", 5)]));
        let words: Vec<String> = agg.into_records().into_iter().map(|r| r.word).collect();
        assert_eq!(words, vec!["fig", "apple", "pear"]);
    }

    #[test]
    fn test_episode_units_order_numerically() {
        let a = UnitId::Episode {
            season: 1,
            episode: 10,
        };
        let b = UnitId::Episode {
            season: 1,
            episode: 9,
        };
        assert!(b < a);
    }
}
