// Lyrics pipeline: download -> clean dataset -> vocabulary, per artist.
//
// Artists run concurrently (buffer_unordered, one future per artist).
// Network calls share one provider; vocabulary analysis is CPU-bound and
// runs on the blocking pool with an analyzer checked out of AnalyzerPool.
// A failure in one artist's step is recorded in its outcome and never
// stops the other artists.

use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{anyhow, bail, Context, Result};
use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use super::views::{self, PoolMember, UniqueReport};
use super::{vocabulary, ARTISTS};
use crate::combine::PoolEntry;
use crate::config::{ArtistEntry, LyricsConfig};
use crate::genius::{collect_top_songs, pick_artist, LyricsProvider};
use crate::output::terminal::{self, ArtistOutcome, ConsoleLogger};
use crate::sources::lyrics::{
    clean_downloaded, group_thousands, index_markdown, read_raw_songs, sanitize_file_stem,
    song_markdown, write_raw_songs, write_song_records, write_songs_csv, AlbumField, RawSong,
    SongRecord,
};
use crate::text::pool::AnalyzerPool;

/// Raw download log, rewritten after every saved song.
pub const RAW_DATASET: &str = "_dataset.json";

/// Cleaned song records consumed by the vocabulary step.
pub const SONGS_JSON: &str = "songs.json";

/// What a download run saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSummary {
    pub artist: String,
    pub artist_dir: PathBuf,
    /// Songs in `_dataset.json` after the run, including resumed ones
    pub saved: usize,
    /// Songs added by this run
    pub added: usize,
}

/// Download an artist's most popular songs into `output_dir/<artist>/`
/// and markdown copies into `sources_dir/<artist>/md_lyrics/`.
///
/// Songs already present in an existing `_dataset.json` (matched by
/// provider id) are kept and not fetched again. A song whose details or
/// lyrics fail to load is logged and skipped.
pub async fn download_artist(
    provider: &dyn LyricsProvider,
    artist_name: &str,
    output_dir: &Path,
    sources_dir: &Path,
    max_songs: usize,
    logger: &ConsoleLogger,
) -> Result<DownloadSummary> {
    logger.log(artist_name, &format!("Searching for: {artist_name}..."));
    let hits = provider.search_songs(artist_name).await?;
    let Some(artist) = pick_artist(&hits, artist_name) else {
        bail!("Artist not found: {artist_name}");
    };

    let stem = sanitize_file_stem(&artist.name);
    let artist_dir = output_dir.join(&stem);
    let md_dir = sources_dir.join(&stem).join("md_lyrics");
    for dir in [&artist_dir, &md_dir] {
        fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    logger.log(artist_name, &format!("Found: {} (id={})", artist.name, artist.id));

    let dataset_path = artist_dir.join(RAW_DATASET);
    let mut dataset: Vec<RawSong> = if dataset_path.exists() {
        read_raw_songs(&dataset_path)?
    } else {
        Vec::new()
    };
    let known: HashSet<u64> = dataset.iter().filter_map(|s| s.genius_id).collect();
    if !known.is_empty() {
        logger.log(artist_name, &format!("Resuming: {} songs already saved", known.len()));
    }

    let songs = collect_top_songs(provider, artist.id, max_songs).await?;
    logger.log(
        artist_name,
        &format!("Found {} songs. Downloading lyrics...", songs.len()),
    );

    let mut added = 0usize;
    for (i, song) in songs.iter().enumerate() {
        let i = i + 1;
        if known.contains(&song.id) {
            continue;
        }

        let fetched = async {
            let detail = provider.song(song.id).await?;
            let lyrics = provider.lyrics(song).await?;
            Ok::<_, anyhow::Error>((detail, lyrics))
        }
        .await;
        let (detail, lyrics) = match fetched {
            Ok(pair) => pair,
            Err(e) => {
                logger.log(artist_name, &format!("[{i}] ERROR: {}: {e:#}", song.title));
                warn!(artist = artist_name, song = song.title, error = %e, "Song download failed, skipping");
                continue;
            }
        };
        let Some(lyrics) = lyrics.filter(|l| !l.trim().is_empty()) else {
            logger.log(artist_name, &format!("[{i}] SKIP (no lyrics): {}", song.title));
            continue;
        };

        let lyrics = clean_downloaded(&lyrics);
        let album = detail.album.map(|a| a.name);
        let raw = RawSong {
            number: dataset.len() as u32 + 1,
            title: song.title.clone(),
            artist: artist.name.clone(),
            album: album.clone().map(AlbumField::Name),
            genius_url: (!song.url.is_empty()).then(|| song.url.clone()),
            genius_id: Some(song.id),
            featured_artists: song.featured_artists.iter().map(|a| a.name.clone()).collect(),
            release_date: song.release_date_for_display.clone(),
            pageviews: song.stats.pageviews,
            lyrics_length: lyrics.chars().count(),
            lyrics,
        };

        let file_name = format!("{:03}_{}.md", raw.number, sanitize_file_stem(&raw.title));
        let md_path = md_dir.join(&file_name);
        fs::write(&md_path, song_markdown(&raw))
            .with_context(|| format!("Failed to write {}", md_path.display()))?;

        let views = raw
            .pageviews
            .filter(|v| *v > 0)
            .map(|v| format!(" ({} views)", group_thousands(v)))
            .unwrap_or_default();
        let album = album.map(|a| format!(" [{a}]")).unwrap_or_default();
        logger.log(
            artist_name,
            &format!("[{}] {}{album}{views} -> {file_name}", raw.number, raw.title),
        );

        dataset.push(raw);
        added += 1;
        write_raw_songs(&dataset_path, &dataset)?;
    }

    let index_path = artist_dir.join("_index.md");
    fs::write(&index_path, index_markdown(&artist.name, &dataset))
        .with_context(|| format!("Failed to write {}", index_path.display()))?;

    info!(artist = artist.name, saved = dataset.len(), added = added, "Download finished");
    Ok(DownloadSummary {
        artist: artist.name,
        artist_dir,
        saved: dataset.len(),
        added,
    })
}

/// Turn `artist_dir/_dataset.json` into `songs.json`, `songs.csv` and one
/// clean text file per song under `clean_lyrics_dir`.
pub fn build_dataset(artist_dir: &Path, clean_lyrics_dir: &Path) -> Result<Vec<SongRecord>> {
    let raw_path = artist_dir.join(RAW_DATASET);
    if !raw_path.exists() {
        bail!("{} not found", raw_path.display());
    }
    let raw = read_raw_songs(&raw_path)?;
    let records: Vec<SongRecord> = raw.iter().map(SongRecord::from_raw).collect();

    write_song_records(&artist_dir.join(SONGS_JSON), &records)?;
    write_songs_csv(&artist_dir.join("songs.csv"), &records)?;

    fs::create_dir_all(clean_lyrics_dir)
        .with_context(|| format!("Failed to create {}", clean_lyrics_dir.display()))?;
    for record in &records {
        let path = clean_lyrics_dir.join(record.text_file_name());
        fs::write(&path, &record.lyrics).with_context(|| format!("Failed to write {}", path.display()))?;
    }

    let albums: BTreeSet<String> = records.iter().filter_map(|r| r.album.clone()).collect();
    let albums: Vec<String> = albums.into_iter().collect();
    let total_words: usize = records.iter().map(|r| r.word_count).sum();
    terminal::display_song_summary(records.len(), total_words, &albums);

    Ok(records)
}

/// The output directory holding an artist's downloads: the sanitised name
/// if it exists, else any directory whose `_dataset.json` names the artist.
pub fn find_artist_dir(output_dir: &Path, artist_name: &str) -> Option<PathBuf> {
    let candidate = output_dir.join(sanitize_file_stem(artist_name));
    if candidate.is_dir() {
        return Some(candidate);
    }

    let wanted = artist_name.to_lowercase();
    let mut dirs: Vec<PathBuf> = fs::read_dir(output_dir)
        .ok()?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();

    dirs.into_iter().find(|dir| {
        let path = dir.join(RAW_DATASET);
        path.exists()
            && read_raw_songs(&path)
                .ok()
                .and_then(|songs| songs.first().map(|s| s.artist.to_lowercase() == wanted))
                .unwrap_or(false)
    })
}

/// Shared state for one pipeline run.
pub struct LyricsRun<'a> {
    pub config: &'a LyricsConfig,
    /// `None` when no token is configured; downloads then fail per artist
    pub provider: Option<&'a dyn LyricsProvider>,
    pub analyzers: AnalyzerPool,
    pub skip_download: bool,
    pub logger: ConsoleLogger,
}

impl LyricsRun<'_> {
    /// Run download, dataset and vocabulary for one artist.
    pub async fn process_artist(&self, entry: &ArtistEntry) -> ArtistOutcome {
        let name = entry.name.as_str();
        self.logger.log(name, "Starting...");

        if !self.skip_download {
            let Some(provider) = self.provider else {
                return ArtistOutcome::failed(name, "(no Genius API token)");
            };
            self.logger.log(
                name,
                &format!("Step 1/3: Downloading lyrics ({} songs)", entry.max_songs),
            );
            if let Err(e) = download_artist(
                provider,
                name,
                &self.config.output_dir,
                &self.config.sources_dir,
                entry.max_songs,
                &self.logger,
            )
            .await
            {
                return ArtistOutcome::failed(name, format!("at download: {e:#}"));
            }
        }

        let Some(artist_dir) = find_artist_dir(&self.config.output_dir, name) else {
            return ArtistOutcome::failed(
                name,
                "(artist directory not found, run without --skip-download)",
            );
        };

        if !artist_dir.join(RAW_DATASET).exists() {
            return ArtistOutcome::failed(name, format!("(no {RAW_DATASET})"));
        }
        self.logger.log(name, "Step 2/3: Building clean dataset");
        let clean_dir = self.clean_lyrics_dir(&artist_dir);
        if let Err(e) = build_dataset(&artist_dir, &clean_dir) {
            return ArtistOutcome::failed(name, format!("at dataset: {e:#}"));
        }

        if !artist_dir.join(SONGS_JSON).exists() {
            return ArtistOutcome::failed(name, format!("(no {SONGS_JSON})"));
        }
        self.logger.log(
            name,
            &format!("Step 3/3: Building vocabulary (min_count={})", entry.min_word_count),
        );
        if let Err(e) = run_vocabulary_blocking(&self.analyzers, &artist_dir, entry.min_word_count).await {
            return ArtistOutcome::failed(name, format!("at vocabulary: {e:#}"));
        }

        self.logger.log(name, "Done!");
        ArtistOutcome::ok(name)
    }

    fn clean_lyrics_dir(&self, artist_dir: &Path) -> PathBuf {
        let stem = artist_dir.file_name().unwrap_or_default();
        self.config.sources_dir.join(stem).join("clean_lyrics")
    }

    /// Process the selected artists with at most `workers` in flight and
    /// print the results table.
    pub async fn run(&self, only: Option<&str>, workers: usize) -> Result<Vec<ArtistOutcome>> {
        let artists = self.config.select(only);
        if artists.is_empty() {
            bail!("No artists to process. Check your config or --only filter.");
        }

        let workers = workers.clamp(1, artists.len());
        println!(
            "Pipeline: {} artist(s), {workers} parallel worker(s)\n",
            artists.len()
        );
        for artist in &artists {
            println!("  - {} ({} songs)", artist.name, artist.max_songs);
        }
        println!();

        let start = Instant::now();
        let outcomes: Vec<ArtistOutcome> = stream::iter(artists.iter())
            .map(|entry| self.process_artist(entry))
            .buffer_unordered(workers)
            .collect()
            .await;

        terminal::display_lyrics_results(&outcomes, start.elapsed());
        Ok(outcomes)
    }
}

/// Vocabulary for one artist directory on the blocking pool.
pub async fn run_vocabulary_blocking(
    analyzers: &AnalyzerPool,
    artist_dir: &Path,
    min_count: u64,
) -> Result<Option<vocabulary::VocabSummary>> {
    let analyzers = analyzers.clone();
    let dir = artist_dir.to_path_buf();
    tokio::task::spawn_blocking(move || {
        analyzers.with_analyzer(|analyzer| vocabulary::process_artist(&dir, analyzer, min_count))
    })
    .await
    .map_err(|e| anyhow!("Vocabulary task failed: {e}"))??
}

// -- Single-step entry points --

/// Download only, artists one after another.
pub async fn run_download(
    config: &LyricsConfig,
    provider: &dyn LyricsProvider,
    only: Option<&str>,
) -> Result<Vec<DownloadSummary>> {
    let logger = ConsoleLogger::new();
    let mut summaries = Vec::new();
    for entry in config.select(only) {
        match download_artist(
            provider,
            &entry.name,
            &config.output_dir,
            &config.sources_dir,
            entry.max_songs,
            &logger,
        )
        .await
        {
            Ok(summary) => {
                println!("  {}: {} songs saved", summary.artist, summary.saved);
                summaries.push(summary);
            }
            Err(e) => {
                terminal::warning(&format!("{}: {e:#}", entry.name));
                warn!(artist = entry.name, error = %e, "Download failed");
            }
        }
    }
    Ok(summaries)
}

/// Rebuild clean datasets from existing downloads.
pub fn run_dataset(config: &LyricsConfig, only: Option<&str>) -> Result<usize> {
    let mut built = 0;
    for entry in config.select(only) {
        let Some(dir) = find_artist_dir(&config.output_dir, &entry.name) else {
            terminal::warning(&format!("No downloads found for {}, skipping", entry.name));
            continue;
        };
        terminal::heading(&entry.name);
        let stem = dir.file_name().unwrap_or_default();
        let clean_dir = config.sources_dir.join(stem).join("clean_lyrics");
        build_dataset(&dir, &clean_dir)?;
        built += 1;
    }
    Ok(built)
}

/// Vocabulary for the named artist directories, or every directory under
/// the output directory when `names` is empty.
pub fn run_vocabulary(
    config: &LyricsConfig,
    names: &[String],
    min_count: u64,
    analyzers: &AnalyzerPool,
) -> Result<usize> {
    let dirs: Vec<PathBuf> = if names.is_empty() {
        let mut dirs: Vec<PathBuf> = fs::read_dir(&config.output_dir)
            .with_context(|| format!("Directory {} not found", config.output_dir.display()))?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_dir())
            .collect();
        dirs.sort();
        dirs
    } else {
        names.iter().map(|n| config.output_dir.join(n)).collect()
    };

    let mut built = 0;
    for dir in dirs {
        if !dir.is_dir() {
            terminal::warning(&format!("{} is not a directory, skipping", dir.display()));
            continue;
        }
        let summary =
            analyzers.with_analyzer(|analyzer| vocabulary::process_artist(&dir, analyzer, min_count))??;
        if summary.is_some() {
            built += 1;
        }
    }
    Ok(built)
}

/// Unique/common views over every artist with a vocabulary dataset.
pub fn run_unique(config: &LyricsConfig) -> Result<UniqueReport> {
    if !config.output_dir.is_dir() {
        bail!("Directory {} not found", config.output_dir.display());
    }
    let names: Vec<String> = views::discover_items(&config.output_dir, "dataset.csv")
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    views::build_unique(&config.output_dir, &names, ARTISTS)
}

/// Pool over every artist with a `words.txt`, labelled by directory name.
pub fn run_pool(config: &LyricsConfig) -> Result<Vec<PoolEntry>> {
    let members: Vec<PoolMember> = views::discover_items(&config.output_dir, "words.txt")
        .into_iter()
        .map(|(name, _)| PoolMember::new(&name, &name))
        .collect();
    views::build_pool(&config.output_dir, &members, ARTISTS)
}

pub fn run_coverage(config: &LyricsConfig, extra_pct: Option<u32>) -> Result<Option<views::CoverageReport>> {
    views::build_coverage(&config.output_dir, extra_pct)
}
