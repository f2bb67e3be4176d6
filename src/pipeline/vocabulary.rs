// Lyrics vocabulary: per-artist word frequency table from cleaned songs.
//
// Unlike books and shows this counts every word form (function words
// included) and keeps the analyzer's lemma, tag and stopword flag next to
// it; the stopword flag only decides what goes into `words.txt`.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::output::terminal;
use crate::sources::lyrics::{preprocess_for_vocabulary, read_song_records, SongRecord};
use crate::text::filter::chunk_paragraphs;
use crate::text::token::AnalyzedToken;
use crate::text::TextAnalyzer;

const TRIM_CHARS: &[char] = &['\'', '"', '.', ',', '!', '?', ';', ':', '-'];

/// Content words echoed in the summary.
const TOP_CONTENT: usize = 15;

/// One row of an artist's `dataset.csv`.
#[derive(Debug, Clone, PartialEq)]
pub struct VocabRow {
    pub word: String,
    pub lemma: String,
    pub pos: String,
    pub total_count: u64,
    /// Titles of the songs using the word, sorted
    pub songs: Vec<String>,
    pub is_stopword: bool,
    /// 1 = most frequent
    pub frequency_rank: usize,
}

impl VocabRow {
    pub fn song_count(&self) -> usize {
        self.songs.len()
    }

    pub fn avg_per_song(&self) -> f64 {
        self.total_count as f64 / self.songs.len().max(1) as f64
    }
}

/// First-seen analysis of a word form.
struct WordInfo {
    lemma: String,
    pos: String,
    is_stopword: bool,
    total_count: u64,
    songs: BTreeSet<String>,
}

/// The lowercased word form a token contributes, if any.
pub fn vocabulary_word(token: &AnalyzedToken) -> Option<String> {
    if token.is_punct || token.is_space || token.like_num {
        return None;
    }
    let lower = token.text.to_lowercase();
    let stripped = lower.trim();
    if stripped.chars().count() <= 1 && stripped != "i" && stripped != "a" {
        return None;
    }
    let word = lower.trim_matches(TRIM_CHARS);
    if word.is_empty() || !word.chars().any(char::is_alphabetic) {
        return None;
    }
    Some(word.to_string())
}

/// Count word forms across `songs`. Words below `min_count` are dropped;
/// rows are ranked by total count, ties alphabetical.
pub fn build_vocabulary(
    analyzer: &dyn TextAnalyzer,
    songs: &[SongRecord],
    min_count: u64,
) -> Result<Vec<VocabRow>> {
    let mut vocab: BTreeMap<String, WordInfo> = BTreeMap::new();

    for song in songs {
        let text = preprocess_for_vocabulary(&song.lyrics);
        let mut song_words: BTreeMap<String, u64> = BTreeMap::new();

        for chunk in chunk_paragraphs(&text, analyzer.max_input_chars()) {
            let tokens = analyzer
                .analyze(&chunk)
                .with_context(|| format!("Failed to analyze '{}'", song.title))?;
            for token in &tokens {
                let Some(word) = vocabulary_word(token) else {
                    continue;
                };
                vocab.entry(word.clone()).or_insert_with(|| WordInfo {
                    lemma: token.lemma.to_lowercase(),
                    pos: token.pos.tag().to_string(),
                    is_stopword: token.is_stop,
                    total_count: 0,
                    songs: BTreeSet::new(),
                });
                *song_words.entry(word).or_insert(0) += 1;
            }
        }

        for (word, count) in song_words {
            if let Some(info) = vocab.get_mut(&word) {
                info.total_count += count;
                info.songs.insert(song.title.clone());
            }
        }
    }

    let mut rows: Vec<VocabRow> = vocab
        .into_iter()
        .filter(|(_, info)| info.total_count >= min_count)
        .map(|(word, info)| VocabRow {
            word,
            lemma: info.lemma,
            pos: info.pos,
            total_count: info.total_count,
            songs: info.songs.into_iter().collect(),
            is_stopword: info.is_stopword,
            frequency_rank: 0,
        })
        .collect();

    rows.sort_by(|a, b| b.total_count.cmp(&a.total_count).then_with(|| a.word.cmp(&b.word)));
    for (i, row) in rows.iter_mut().enumerate() {
        row.frequency_rank = i + 1;
    }
    Ok(rows)
}

/// Average with at most two decimals and at least one ("1.0", "1.5", "1.33").
pub fn format_avg(value: f64) -> String {
    let fixed = format!("{value:.2}");
    let trimmed = fixed.trim_end_matches('0');
    if trimmed.ends_with('.') {
        format!("{trimmed}0")
    } else {
        trimmed.to_string()
    }
}

pub fn write_vocabulary_csv(path: &Path, rows: &[VocabRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    writer.write_record([
        "word",
        "lemma",
        "pos",
        "total_count",
        "song_count",
        "songs",
        "avg_per_song",
        "is_stopword",
        "frequency_rank",
    ])?;
    for row in rows {
        writer.write_record([
            row.word.clone(),
            row.lemma.clone(),
            row.pos.clone(),
            row.total_count.to_string(),
            row.song_count().to_string(),
            row.songs.join("; "),
            format_avg(row.avg_per_song()),
            if row.is_stopword { "True" } else { "False" }.to_string(),
            row.frequency_rank.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Sorted unique lemmas of the non-stopword rows.
pub fn content_lemmas(rows: &[VocabRow]) -> BTreeSet<&str> {
    rows.iter()
        .filter(|r| !r.is_stopword && !r.lemma.is_empty())
        .map(|r| r.lemma.as_str())
        .collect()
}

/// Counts reported after a vocabulary build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabSummary {
    pub occurrences: u64,
    pub unique_words: usize,
    pub content_words: usize,
    pub lemmas: usize,
}

/// Build `dataset.csv` and `words.txt` from `artist_dir/songs.json`.
/// Returns `None` when the directory has no songs.json or no words.
pub fn process_artist(
    artist_dir: &Path,
    analyzer: &dyn TextAnalyzer,
    min_count: u64,
) -> Result<Option<VocabSummary>> {
    let dir_name = artist_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let songs_path = artist_dir.join("songs.json");
    if !songs_path.exists() {
        println!("  Skipping {dir_name}: no songs.json");
        return Ok(None);
    }

    let songs = read_song_records(&songs_path)?;
    let artist = songs.first().map(|s| s.artist.clone()).unwrap_or(dir_name);

    let rows = build_vocabulary(analyzer, &songs, min_count)?;
    if rows.is_empty() {
        println!("  {artist}: no words found");
        return Ok(None);
    }

    let csv_path = artist_dir.join("dataset.csv");
    write_vocabulary_csv(&csv_path, &rows)?;

    let lemmas = content_lemmas(&rows);
    let words_path = artist_dir.join("words.txt");
    let mut body = lemmas.iter().copied().collect::<Vec<_>>().join("\n");
    body.push('\n');
    fs::write(&words_path, body).with_context(|| format!("Failed to write {}", words_path.display()))?;

    let content: Vec<&VocabRow> = rows.iter().filter(|r| !r.is_stopword).collect();
    let summary = VocabSummary {
        occurrences: rows.iter().map(|r| r.total_count).sum(),
        unique_words: rows.len(),
        content_words: content.len(),
        lemmas: lemmas.len(),
    };
    let top: Vec<&str> = content.iter().take(TOP_CONTENT).map(|r| r.word.as_str()).collect();

    terminal::display_vocabulary(
        &format!("{artist} ({} songs)", songs.len()),
        summary.occurrences,
        summary.unique_words,
        summary.content_words,
        &top,
    );
    terminal::wrote(&csv_path);
    terminal::wrote(&words_path);
    info!(artist = artist, words = summary.unique_words, lemmas = summary.lemmas, "Vocabulary built");
    Ok(Some(summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::token::PartOfSpeech;

    #[test]
    fn test_vocabulary_word_strips_edges() {
        let t = AnalyzedToken::word("'Cause", "cause", PartOfSpeech::Adv);
        assert_eq!(vocabulary_word(&t), Some("cause".to_string()));
    }

    #[test]
    fn test_vocabulary_word_single_chars() {
        let i = AnalyzedToken::word("I", "I", PartOfSpeech::Pronoun);
        let x = AnalyzedToken::word("x", "x", PartOfSpeech::Noun);
        assert_eq!(vocabulary_word(&i), Some("i".to_string()));
        assert_eq!(vocabulary_word(&x), None);
    }

    #[test]
    fn test_vocabulary_word_skips_numbers_and_punct() {
        let num = AnalyzedToken::word("12", "12", PartOfSpeech::Numeral);
        let dash = AnalyzedToken::word("--", "--", PartOfSpeech::Other);
        assert_eq!(vocabulary_word(&num), None);
        assert_eq!(vocabulary_word(&dash), None);
    }

    #[test]
    fn test_format_avg() {
        assert_eq!(format_avg(1.0), "1.0");
        assert_eq!(format_avg(1.5), "1.5");
        assert_eq!(format_avg(4.0 / 3.0), "1.33");
    }
}
