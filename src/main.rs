use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use wordpool::config::{Config, Layout, LyricsConfig};
use wordpool::genius::{GeniusClient, LyricsProvider};
use wordpool::output::terminal::ConsoleLogger;
use wordpool::pipeline::{books, lexicon, lyrics, merged, shows};
use wordpool::text::pool::AnalyzerPool;
use wordpool::text::{RuleAnalyzer, TextAnalyzer};

/// Wordpool: vocabulary datasets from books, TV subtitles and song lyrics.
///
/// Each source item is reduced to lemmatized content-word counts, then
/// items are combined into pools, unique and common word lists.
#[derive(Parser)]
#[command(name = "wordpool", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge published word lists into one tagged CSV
    Lexicon {
        /// Directory holding the list files (and an optional lists.yaml)
        #[arg(long, default_value = ".")]
        dir: PathBuf,

        /// Output CSV (default: <dir>/NGSL_combined.csv)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Book datasets from EPUB files
    Books {
        /// Books root with config.yaml, sources/ and output/
        #[arg(long, default_value = ".")]
        root: PathBuf,

        #[command(subcommand)]
        action: BookAction,
    },

    /// TV show datasets from SRT subtitles
    Shows {
        /// Shows root with config.yaml, sources/ and output/
        #[arg(long, default_value = ".")]
        root: PathBuf,

        #[command(subcommand)]
        action: ShowAction,
    },

    /// Lyrics datasets from the Genius API
    Lyrics {
        /// Path to the lyrics config YAML
        #[arg(long, default_value = "config.yaml")]
        config: PathBuf,

        #[command(subcommand)]
        action: LyricsAction,
    },

    /// Combine pools across dataset families
    Merge {
        #[command(subcommand)]
        action: MergeAction,
    },
}

#[derive(Args)]
struct BookSelection {
    /// Book directory name to parse
    #[arg(long, conflicts_with = "all", required_unless_present = "all")]
    book: Option<String>,

    /// Parse all books
    #[arg(long)]
    all: bool,
}

#[derive(Subcommand)]
enum BookAction {
    /// Parse EPUBs into dataset.csv + words.txt
    Parse {
        #[command(flatten)]
        selection: BookSelection,
    },
    /// Per-book unique words and words common to all books
    Unique,
    /// Union of all books' word lists with membership
    Pool,
    /// Convert EPUBs to paragraph-marked markdown
    Markdown {
        /// Process a single EPUB file
        #[arg(long)]
        file: Option<PathBuf>,

        /// Directory to scan for EPUBs (default: <root>/sources/epub)
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Output directory (default: <root>/markdown)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum ShowAction {
    /// Parse subtitles into dataset.csv + words.txt
    Parse {
        /// Show directory name to parse
        #[arg(long, conflicts_with = "all", required_unless_present = "all")]
        show: Option<String>,

        /// Parse all shows
        #[arg(long)]
        all: bool,
    },
    /// Per-show unique words and words common to all shows
    Unique,
    /// Union of all shows' word lists with membership
    Pool,
}

#[derive(Subcommand)]
enum LyricsAction {
    /// Full pipeline: download -> dataset -> vocabulary
    Run {
        /// Genius API token (or set GENIUS_TOKEN)
        #[arg(long)]
        token: Option<String>,

        /// Comma-separated artist names to process (default: all)
        #[arg(long)]
        only: Option<String>,

        /// Skip download, only rebuild dataset + vocabulary
        #[arg(long)]
        skip_download: bool,

        /// Number of artists processed in parallel (default: 4)
        #[arg(long, default_value = "4")]
        workers: usize,
    },
    /// Download lyrics only
    Download {
        #[arg(long)]
        token: Option<String>,

        #[arg(long)]
        only: Option<String>,
    },
    /// Rebuild songs.json/songs.csv from downloaded lyrics
    Dataset {
        #[arg(long)]
        only: Option<String>,
    },
    /// Build vocabulary dataset.csv + words.txt per artist
    Vocabulary {
        /// Artist directory names (default: all)
        artists: Vec<String>,

        /// Minimum total count to include a word
        #[arg(long, default_value = "1")]
        min_count: u64,
    },
    /// Per-artist unique words and words common to all artists
    Unique,
    /// Union of all artists' word lists with membership
    Pool,
    /// Words shared across artists at coverage thresholds
    Common {
        /// Extra coverage threshold, in percent
        #[arg(long)]
        min_pct: Option<u32>,
    },
}

#[derive(Subcommand)]
enum MergeAction {
    /// Merge books/tv_shows/lyrics common_pool.csv files
    Pools {
        /// Directory holding books/, tv_shows/ and lyrics/
        #[arg(long, default_value = ".")]
        root: PathBuf,

        #[arg(long, default_value = "merged_pool.csv")]
        output: PathBuf,
    },
    /// Keep merged words found in a Wiktionary (kaikki.org) JSONL dump
    Filter {
        #[arg(long)]
        wiktionary: PathBuf,

        #[arg(long, default_value = "merged_pool.csv")]
        pool: PathBuf,

        #[arg(long, default_value = "seed_wordlist.txt")]
        matched: PathBuf,

        #[arg(long, default_value = "unmatched_words.txt")]
        unmatched: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("wordpool=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Lexicon { dir, output } => {
            lexicon::run(&dir, output.as_deref())?;
        }

        Commands::Books { root, action } => {
            let layout = Layout::new(root);
            match action {
                BookAction::Parse { selection } => {
                    let analyzer = build_analyzer(&config);
                    let only = if selection.all { None } else { selection.book.as_deref() };
                    books::run_parse(&layout, only, analyzer.as_ref())?;
                }
                BookAction::Unique => {
                    books::run_unique(&layout)?;
                }
                BookAction::Pool => {
                    books::run_pool(&layout)?;
                }
                BookAction::Markdown { file, dir, output } => {
                    let epubs = match file {
                        Some(file) => vec![file],
                        None => {
                            let dir = dir.unwrap_or_else(|| layout.sources_dir().join("epub"));
                            books::find_epubs(&dir)?
                        }
                    };
                    let output = output.unwrap_or_else(|| layout.root.join("markdown"));
                    books::export_markdown(&epubs, &output)?;
                }
            }
        }

        Commands::Shows { root, action } => {
            let layout = Layout::new(root);
            match action {
                ShowAction::Parse { show, all } => {
                    let analyzer = build_analyzer(&config);
                    let only = if all { None } else { show.as_deref() };
                    shows::run_parse(&layout, only, analyzer.as_ref())?;
                }
                ShowAction::Unique => {
                    shows::run_unique(&layout)?;
                }
                ShowAction::Pool => {
                    shows::run_pool(&layout)?;
                }
            }
        }

        Commands::Lyrics {
            config: config_path,
            action,
        } => {
            let lyrics_config = LyricsConfig::load(&config_path)?;
            match action {
                LyricsAction::Run {
                    token,
                    only,
                    skip_download,
                    workers,
                } => {
                    let config = config.with_token_override(token);
                    let client = match (&config.genius_token, skip_download) {
                        (Some(token), false) => Some(GeniusClient::new(&config.genius_api_url, token)?),
                        _ => None,
                    };
                    let run = lyrics::LyricsRun {
                        config: &lyrics_config,
                        provider: client.as_ref().map(|c| c as &dyn LyricsProvider),
                        analyzers: analyzer_pool(&config),
                        skip_download,
                        logger: ConsoleLogger::new(),
                    };
                    let outcomes = run.run(only.as_deref(), workers).await?;
                    info!(
                        artists = outcomes.len(),
                        ok = outcomes.iter().filter(|o| o.is_ok()).count(),
                        "Lyrics pipeline finished"
                    );
                }
                LyricsAction::Download { token, only } => {
                    let config = config.with_token_override(token);
                    let token = config.require_genius()?;
                    let client = GeniusClient::new(&config.genius_api_url, token)?;
                    lyrics::run_download(&lyrics_config, &client, only.as_deref()).await?;
                }
                LyricsAction::Dataset { only } => {
                    lyrics::run_dataset(&lyrics_config, only.as_deref())?;
                }
                LyricsAction::Vocabulary { artists, min_count } => {
                    let built = lyrics::run_vocabulary(
                        &lyrics_config,
                        &artists,
                        min_count,
                        &analyzer_pool(&config),
                    )?;
                    println!("\n{} vocabulary datasets written", built.to_string().bold());
                }
                LyricsAction::Unique => {
                    lyrics::run_unique(&lyrics_config)?;
                }
                LyricsAction::Pool => {
                    lyrics::run_pool(&lyrics_config)?;
                }
                LyricsAction::Common { min_pct } => {
                    lyrics::run_coverage(&lyrics_config, min_pct)?;
                }
            }
        }

        Commands::Merge { action } => match action {
            MergeAction::Pools { root, output } => {
                merged::merge_pools(&merged::default_pools(&root), &output)?;
            }
            MergeAction::Filter {
                wiktionary,
                pool,
                matched,
                unmatched,
            } => {
                merged::filter_by_wiktionary(&wiktionary, &pool, &matched, &unmatched)?;
            }
        },
    }

    println!("{}", "Done.".dimmed());
    Ok(())
}

fn build_analyzer(config: &Config) -> Box<dyn TextAnalyzer> {
    Box::new(RuleAnalyzer::new().with_max_input_chars(config.chunk_chars))
}

fn analyzer_pool(config: &Config) -> AnalyzerPool {
    let chunk_chars = config.chunk_chars;
    AnalyzerPool::new(move || Box::new(RuleAnalyzer::new().with_max_input_chars(chunk_chars)))
}
