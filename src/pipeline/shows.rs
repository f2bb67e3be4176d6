// TV shows: subtitle files -> per-episode content-word dataset.
//
// Sources live in `sources/<show>/<season>/*.srt`. Each episode's dialogue
// lines are analyzed as one text, one line per sentence.

use anyhow::{Context, Result};
use tracing::info;

use super::books::{write_item, ParseSummary};
use super::views::{self, PoolMember, UniqueReport};
use super::{select_items, SHOWS};
use crate::combine::PoolEntry;
use crate::config::Layout;
use crate::dataset::{ItemAggregator, UnitId};
use crate::output::terminal;
use crate::sources::srt::{discover_episodes, read_srt};
use crate::text::{count_content_words, ContentWordFilter, FilterPolicy, TextAnalyzer};

/// Parse one show into `output/<name>/dataset.csv` and `words.txt`.
/// A missing source directory is fatal; an empty result is skipped.
pub fn parse_show(layout: &Layout, name: &str, analyzer: &dyn TextAnalyzer) -> Result<Option<ParseSummary>> {
    let episodes = discover_episodes(&layout.sources_dir().join(name))?;
    terminal::heading(name);
    println!("  {} episodes found", episodes.len());

    let filter = ContentWordFilter::new(FilterPolicy::subtitles());
    let mut aggregator = ItemAggregator::new();

    let pb = terminal::progress_bar(episodes.len() as u64, "Episodes");
    for (&(season, episode), path) in &episodes {
        let lines = read_srt(path);
        if !lines.is_empty() {
            let counts = count_content_words(analyzer, &filter, &lines.join("\n"))
                .with_context(|| format!("Failed to analyze {}", path.display()))?;
            aggregator.add_unit(UnitId::Episode { season, episode }, &counts);
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    if aggregator.is_empty() {
        terminal::warning(&format!("No data extracted, skipping {name}"));
        return Ok(None);
    }

    let summary = write_item(&layout.item_dir(name), "episode", aggregator)?;
    terminal::display_item_parsed(name, summary.units, "episode", summary.words);
    info!(show = name, episodes = summary.units, words = summary.words, "Show parsed");
    Ok(Some(summary))
}

/// Parse the selected shows (`None` = all, in config order).
pub fn run_parse(layout: &Layout, only: Option<&str>, analyzer: &dyn TextAnalyzer) -> Result<usize> {
    let config = layout.load_shows()?;
    let names = select_items(&config.shows, only)?;

    let mut parsed = 0;
    for name in &names {
        if parse_show(layout, name, analyzer)?.is_some() {
            parsed += 1;
        }
    }
    println!("\nParsed {parsed}/{} shows", names.len());
    Ok(parsed)
}

pub fn run_unique(layout: &Layout) -> Result<UniqueReport> {
    let config = layout.load_shows()?;
    let names: Vec<String> = config.shows.keys().cloned().collect();
    views::build_unique(&layout.output_dir(), &names, SHOWS)
}

pub fn run_pool(layout: &Layout) -> Result<Vec<PoolEntry>> {
    let config = layout.load_shows()?;
    let members: Vec<PoolMember> = config
        .shows
        .iter()
        .map(|(name, entry)| PoolMember::new(name, &entry.label))
        .collect();
    views::build_pool(&layout.output_dir(), &members, SHOWS)
}
