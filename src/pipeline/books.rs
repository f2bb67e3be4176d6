// Books: EPUB -> per-chapter content-word dataset, plus markdown export.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::{info, warn};
use walkdir::WalkDir;

use super::views::{self, PoolMember, UniqueReport};
use super::{select_items, BOOKS};
use crate::combine::PoolEntry;
use crate::config::{BookEntry, Layout};
use crate::dataset::{write_dataset_csv, write_word_list, ItemAggregator, UnitId};
use crate::output::terminal;
use crate::sources::epub::{assign_chapters, markdown_file_name, read_epub, render_markdown};
use crate::text::{count_content_words, ContentWordFilter, FilterPolicy, TextAnalyzer};

/// What parsing one item produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseSummary {
    pub units: usize,
    pub words: usize,
}

/// Parse one book into `output/<name>/dataset.csv` and `words.txt`.
/// Returns `None` when no chapter yields a content word or the archive is
/// unreadable. A missing EPUB file is an error.
pub fn parse_book(
    layout: &Layout,
    name: &str,
    entry: &BookEntry,
    analyzer: &dyn TextAnalyzer,
) -> Result<Option<ParseSummary>> {
    let epub = layout.epub_path(&entry.epub);
    if !epub.exists() {
        bail!("EPUB not found: {}", epub.display());
    }

    terminal::heading(&format!("{name} ({})", entry.label));
    let docs = match read_epub(&epub) {
        Ok(docs) => docs,
        Err(e) => {
            terminal::warning(&format!("{}: {e:#}, skipping {name}", epub.display()));
            warn!(book = name, error = %e, "Unreadable EPUB, skipped");
            return Ok(None);
        }
    };
    let chapters = assign_chapters(&docs);
    println!("  {} documents, {} chapters", docs.len(), chapters.len());

    let filter = ContentWordFilter::new(FilterPolicy::books());
    let mut aggregator = ItemAggregator::new();

    let pb = terminal::progress_bar(chapters.len() as u64, "Chapters");
    for (chapter, text) in &chapters {
        let counts = count_content_words(analyzer, &filter, text)
            .with_context(|| format!("Failed to analyze chapter {chapter} of {name}"))?;
        aggregator.add_unit(UnitId::Chapter(*chapter), &counts);
        pb.inc(1);
    }
    pb.finish_and_clear();

    if aggregator.is_empty() {
        terminal::warning(&format!("No data extracted, skipping {name}"));
        return Ok(None);
    }

    let summary = write_item(&layout.item_dir(name), "chapter", aggregator)?;
    terminal::display_item_parsed(name, summary.units, "chapter", summary.words);
    info!(book = name, chapters = summary.units, words = summary.words, "Book parsed");
    Ok(Some(summary))
}

/// Write `dataset.csv` and `words.txt` for one aggregated item.
pub(crate) fn write_item(dir: &Path, unit_kind: &str, aggregator: ItemAggregator) -> Result<ParseSummary> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    let units = aggregator.unit_count();
    let records = aggregator.into_records();

    write_dataset_csv(&dir.join("dataset.csv"), unit_kind, &records)?;
    write_word_list(&dir.join("words.txt"), records.iter().map(|r| r.word.as_str()))?;

    Ok(ParseSummary {
        units,
        words: records.len(),
    })
}

/// Parse the selected books (`None` = all, in config order).
pub fn run_parse(layout: &Layout, only: Option<&str>, analyzer: &dyn TextAnalyzer) -> Result<usize> {
    let config = layout.load_books()?;
    let names = select_items(&config.books, only)?;

    let mut parsed = 0;
    for name in &names {
        if let Some(entry) = config.books.get(name) {
            if parse_book(layout, name, entry, analyzer)?.is_some() {
                parsed += 1;
            }
        }
    }
    println!("\nParsed {parsed}/{} books", names.len());
    Ok(parsed)
}

pub fn run_unique(layout: &Layout) -> Result<UniqueReport> {
    let config = layout.load_books()?;
    let names: Vec<String> = config.books.keys().cloned().collect();
    views::build_unique(&layout.output_dir(), &names, BOOKS)
}

pub fn run_pool(layout: &Layout) -> Result<Vec<PoolEntry>> {
    let config = layout.load_books()?;
    let members: Vec<PoolMember> = config
        .books
        .iter()
        .map(|(name, entry)| PoolMember::new(name, &entry.label))
        .collect();
    views::build_pool(&layout.output_dir(), &members, BOOKS)
}

/// Every `*.epub` under `dir`, recursively, in path order.
pub fn find_epubs(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        bail!("Directory {} not found", dir.display());
    }
    Ok(WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.is_file() && p.extension().and_then(|e| e.to_str()) == Some("epub"))
        .collect())
}

/// Convert EPUBs to markdown files in `output_dir`. A book that cannot be
/// read is skipped. Returns the files written.
pub fn export_markdown(epubs: &[PathBuf], output_dir: &Path) -> Result<Vec<PathBuf>> {
    if epubs.is_empty() {
        println!("No EPUB files found.");
        return Ok(Vec::new());
    }
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;
    println!("Found {} EPUB file(s)\n", epubs.len());

    let mut written = Vec::new();
    for epub in epubs {
        let file = epub.file_name().map(|f| f.to_string_lossy().into_owned()).unwrap_or_default();
        println!("Processing: {file}");
        let docs = match read_epub(epub) {
            Ok(docs) => docs,
            Err(e) => {
                terminal::warning(&format!("{file}: {e:#}, skipping"));
                warn!(file = %epub.display(), error = %e, "Unreadable EPUB, skipped");
                continue;
            }
        };
        let markdown = render_markdown(&docs);
        println!("  Length: {} chars", markdown.chars().count());

        let target = output_dir.join(markdown_file_name(epub));
        fs::write(&target, &markdown).with_context(|| format!("Failed to write {}", target.display()))?;
        terminal::wrote(&target);
        written.push(target);
    }

    println!("\nConverted {}/{} books", written.len(), epubs.len());
    Ok(written)
}
