// Colored terminal output for pipeline progress and summaries.
//
// Library code logs through tracing; everything the user is meant to read
// (per-item lines, distributions, result tables) is printed here.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use super::truncate_chars;

/// Progress bar in the house style: `  Label [=====>    ] 3/10 (eta)`.
pub fn progress_bar(len: u64, label: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    let style = ProgressStyle::default_bar()
        .template(&format!("  {label} [{{bar:30}}] {{pos}}/{{len}} ({{eta}})"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb
}

pub fn heading(text: &str) {
    println!("\n{}", format!("=== {text} ===").bold());
}

pub fn warning(text: &str) {
    println!("{} {text}", "Warning:".yellow().bold());
}

/// `  -> file` lines for written outputs.
pub fn wrote(path: &std::path::Path) {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    println!("  {} {}", "->".dimmed(), name);
}

/// Membership distribution, fewest memberships first.
pub fn display_distribution(dist: &BTreeMap<usize, usize>, singular: &str) {
    println!("\n{}", "Distribution:".bold());
    for (n, words) in dist {
        println!("  in {n} {singular}(s): {words} words");
    }
}

/// Distribution with the largest membership first; a membership equal to
/// `total` is shown as "all N".
pub fn display_ranked_distribution(dist: &BTreeMap<usize, usize>, total: usize, singular: &str) {
    println!("\n{}", "Distribution:".bold());
    for (n, words) in dist.iter().rev() {
        let label = if *n == total {
            format!("all {n}")
        } else {
            n.to_string()
        };
        println!("  in {label} {singular}(s): {words} words");
    }
}

/// `label: total - exclude = clean` for one pool member.
pub fn display_pool_member(label: &str, total: usize, excluded: usize, clean: usize) {
    println!("{label:>12}: {total:>6} total - {excluded:>5} exclude = {clean:>6} clean");
}

/// One item's unique-word line with the top five words.
pub fn display_unique(name: &str, rows: &[(String, u64)]) {
    println!("  {}: {} unique words", name.bold(), rows.len());
    if !rows.is_empty() {
        let top = rows
            .iter()
            .take(5)
            .map(|(w, c)| format!("{w}({c})"))
            .collect::<Vec<_>>()
            .join(", ");
        println!("    top 5: {top}");
    }
}

/// Words per list and how many appear in more than one.
pub fn display_lexicon_summary(per_list: &[(String, usize)], total: usize, multi: usize) {
    heading("Lexicon merge");
    for (tag, count) in per_list {
        println!("  {tag:<14} {count:>6} words");
    }
    println!("\n  Total unique words: {}", total.to_string().bold());
    println!("  In more than one list: {multi}");
}

/// Book or show parse result.
pub fn display_item_parsed(name: &str, units: usize, unit_kind: &str, words: usize) {
    println!(
        "  {} {units} {unit_kind}s, {words} unique words",
        "✓".green(),
    );
    tracing::debug!(item = name, units = units, words = words, "Item parsed");
}

/// Summary of a lyrics dataset build.
pub fn display_song_summary(songs: usize, total_words: usize, albums: &[String]) {
    println!("\n{}", "Dataset summary:".bold());
    println!("  Songs:           {songs}");
    println!("  Total words:     {total_words}");
    let avg = if songs > 0 { total_words / songs } else { 0 };
    println!("  Avg words/song:  {avg}");
    let album_list = truncate_chars(&albums.join(", "), 120);
    println!("  Albums:          {} ({album_list})", albums.len());
}

/// Vocabulary statistics for one artist.
pub fn display_vocabulary(
    artist: &str,
    occurrences: u64,
    unique: usize,
    content: usize,
    top: &[&str],
) {
    heading(artist);
    println!("  Total word occurrences: {occurrences}");
    println!("  Unique words:           {unique}");
    println!("  Unique content words:   {content} (excl. stopwords)");
    println!("  Top 15 content words:   {}", top.join(", "));
}

/// Outcome of one artist's run through the lyrics pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistOutcome {
    pub artist: String,
    /// `None` on success, else the failed step and reason
    pub failure: Option<String>,
}

impl ArtistOutcome {
    pub fn ok(artist: &str) -> Self {
        Self {
            artist: artist.to_string(),
            failure: None,
        }
    }

    pub fn failed(artist: &str, reason: impl Into<String>) -> Self {
        Self {
            artist: artist.to_string(),
            failure: Some(reason.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.failure.is_none()
    }
}

/// Final results table of the lyrics pipeline.
pub fn display_lyrics_results(outcomes: &[ArtistOutcome], elapsed: Duration) {
    println!("\n{}", "=".repeat(60));
    println!("{}", format!("Results ({:.0}s):", elapsed.as_secs_f64()).bold());

    let mut sorted: Vec<&ArtistOutcome> = outcomes.iter().collect();
    sorted.sort_by(|a, b| a.artist.cmp(&b.artist));
    for outcome in sorted {
        match &outcome.failure {
            None => println!("  {} {}: OK", "[+]".green(), outcome.artist),
            Some(reason) => println!("  {} {}: FAILED {reason}", "[-]".red(), outcome.artist),
        }
    }

    let ok = outcomes.iter().filter(|o| o.is_ok()).count();
    println!("\n{ok}/{} artists completed successfully.", outcomes.len());
    println!("{}", "=".repeat(60));
}

/// Serializes `[artist] message` lines from concurrent workers.
#[derive(Default)]
pub struct ConsoleLogger {
    lock: Mutex<()>,
}

impl ConsoleLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self, artist: &str, message: &str) {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        println!("  [{}] {message}", artist.cyan());
    }
}
