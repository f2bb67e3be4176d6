// Configuration: environment settings plus the YAML item catalogs.
//
// Secrets and tunables come from environment variables (a .env file is
// loaded at startup via dotenvy). Which books, shows and artists exist is
// declared in per-family config.yaml files, read with serde_yaml into
// IndexMaps so `--all` walks items in the order the file lists them.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::text::filter::DEFAULT_CHUNK_CHARS;

/// Default Genius API endpoint.
pub const DEFAULT_GENIUS_API_URL: &str = "https://api.genius.com";

/// Settings loaded from environment variables.
pub struct Config {
    /// Genius API access token (GENIUS_TOKEN). Only the download step needs it.
    pub genius_token: Option<String>,
    /// Genius API base URL (GENIUS_API_URL), overridable for testing
    pub genius_api_url: String,
    /// Largest text handed to the analyzer in one call (WORDPOOL_CHUNK_CHARS)
    pub chunk_chars: usize,
}

impl Config {
    /// Load configuration from environment variables. Nothing is required
    /// up front; use the `require_*` checks before operations that need a value.
    pub fn load() -> Result<Self> {
        let chunk_chars = match env::var("WORDPOOL_CHUNK_CHARS") {
            Ok(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("WORDPOOL_CHUNK_CHARS must be a number, got '{raw}'"))?,
            Err(_) => DEFAULT_CHUNK_CHARS,
        };

        Ok(Self {
            genius_token: env::var("GENIUS_TOKEN").ok().filter(|t| !t.trim().is_empty()),
            genius_api_url: env::var("GENIUS_API_URL")
                .unwrap_or_else(|_| DEFAULT_GENIUS_API_URL.to_string()),
            chunk_chars,
        })
    }

    /// A `--token` flag wins over the environment.
    pub fn with_token_override(mut self, token: Option<String>) -> Self {
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            self.genius_token = Some(token);
        }
        self
    }

    /// Check that a Genius token is available.
    pub fn require_genius(&self) -> Result<&str> {
        match self.genius_token.as_deref() {
            Some(token) => Ok(token),
            None => bail!(
                "GENIUS_TOKEN not set. Add it to your .env file or pass --token.\n\
                 Use --skip-download to rebuild from already downloaded lyrics."
            ),
        }
    }
}

/// Read and deserialize a YAML file. A missing file is a configuration error.
pub fn load_yaml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        bail!("Config not found: {}", path.display());
    }
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_yaml::from_str(&text).with_context(|| format!("Malformed config {}", path.display()))
}

/// Accept any YAML scalar as a label, so `label: 1984` reads as "1984".
fn scalar_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match serde_yaml::Value::deserialize(deserializer)? {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string, got {other:?}"
        ))),
    }
}

// -- Books --

#[derive(Debug, Clone, Deserialize)]
pub struct BookEntry {
    #[serde(deserialize_with = "scalar_string")]
    pub label: String,
    /// EPUB file name under `sources/epub/`
    pub epub: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BooksConfig {
    pub books: IndexMap<String, BookEntry>,
}

// -- Shows --

#[derive(Debug, Clone, Deserialize)]
pub struct ShowEntry {
    #[serde(deserialize_with = "scalar_string")]
    pub label: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShowsConfig {
    pub shows: IndexMap<String, ShowEntry>,
}

// -- Lyrics --

fn default_max_songs() -> usize {
    50
}

fn default_min_word_count() -> u64 {
    1
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_sources_dir() -> PathBuf {
    PathBuf::from("sources")
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArtistEntry {
    #[serde(deserialize_with = "scalar_string")]
    pub name: String,
    #[serde(default = "default_max_songs")]
    pub max_songs: usize,
    #[serde(default = "default_min_word_count")]
    pub min_word_count: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LyricsConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_sources_dir")]
    pub sources_dir: PathBuf,
    #[serde(default)]
    pub artists: Vec<ArtistEntry>,
}

impl LyricsConfig {
    /// Load a lyrics config and resolve its directories against the
    /// directory that holds the config file.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config: LyricsConfig = load_yaml(path)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        config.output_dir = base.join(&config.output_dir);
        config.sources_dir = base.join(&config.sources_dir);
        Ok(config)
    }

    /// Artists selected by a comma-separated, case-insensitive `--only` list.
    pub fn select(&self, only: Option<&str>) -> Vec<ArtistEntry> {
        let artists = self.artists.iter().map(|a| ArtistEntry {
            name: a.name.trim().to_string(),
            ..a.clone()
        });
        match only {
            None => artists.collect(),
            Some(list) => {
                let wanted: Vec<String> = list
                    .split(',')
                    .map(|n| n.trim().to_lowercase())
                    .filter(|n| !n.is_empty())
                    .collect();
                artists
                    .filter(|a| wanted.contains(&a.name.to_lowercase()))
                    .collect()
            }
        }
    }
}

/// Directory layout of one dataset family (books or shows):
/// `<root>/config.yaml`, inputs under `<root>/sources`, results under `<root>/output`.
#[derive(Debug, Clone)]
pub struct Layout {
    pub root: PathBuf,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join("config.yaml")
    }

    pub fn sources_dir(&self) -> PathBuf {
        self.root.join("sources")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.join("output")
    }

    /// Per-item output directory.
    pub fn item_dir(&self, name: &str) -> PathBuf {
        self.output_dir().join(name)
    }

    pub fn epub_path(&self, file_name: &str) -> PathBuf {
        self.sources_dir().join("epub").join(file_name)
    }

    pub fn load_books(&self) -> Result<BooksConfig> {
        load_yaml(&self.config_path())
    }

    pub fn load_shows(&self) -> Result<ShowsConfig> {
        load_yaml(&self.config_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_books_config_preserves_order() {
        let yaml = "books:\n  zeta:\n    label: Z\n    epub: z.epub\n  alpha:\n    label: 1984\n    epub: a.epub\n";
        let config: BooksConfig = serde_yaml::from_str(yaml).unwrap();
        let names: Vec<&String> = config.books.keys().collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
        assert_eq!(config.books["alpha"].label, "1984");
    }

    #[test]
    fn test_artist_defaults() {
        let yaml = "artists:\n  - name: ' Adele '\n  - name: Queen\n    max_songs: 10\n";
        let config: LyricsConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.artists[0].max_songs, 50);
        assert_eq!(config.artists[0].min_word_count, 1);
        assert_eq!(config.artists[1].max_songs, 10);

        let picked = config.select(Some("adele"));
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].name, "Adele");
    }

    #[test]
    fn test_missing_config_is_error() {
        let err = load_yaml::<BooksConfig>(Path::new("/nonexistent/config.yaml")).unwrap_err();
        assert!(err.to_string().contains("Config not found"));
    }
}
