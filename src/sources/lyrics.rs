// Lyrics records and provider artifact cleaning.
//
// Downloaded songs are kept in `_dataset.json` as RawSong entries exactly
// as fetched. The build step turns them into SongRecords (section tags,
// "You might also like" and trailing "NNNEmbed" removed, blank runs
// collapsed) and writes `songs.json`, a fully quoted `songs.csv` and one
// plain text file per song.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex_lite::Regex;
use serde::{Deserialize, Serialize};

static RE_SECTION_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]*\]").expect("valid regex"));
static RE_PAREN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\([^)]*\)").expect("valid regex"));
static RE_YOU_MIGHT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)you might also like").expect("valid regex"));
static RE_EMBED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d*Embed\s*$").expect("valid regex"));
static RE_EMBED_STRICT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d*Embed$").expect("valid regex"));
static RE_BLANK_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));
static RE_NOT_ALNUM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("valid regex"));

/// Album as stored by the downloader: a bare name, or the provider's album object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AlbumField {
    Name(String),
    Detail {
        name: Option<String>,
        #[serde(default)]
        release_date_for_display: Option<String>,
    },
}

impl AlbumField {
    pub fn name(&self) -> Option<&str> {
        match self {
            AlbumField::Name(name) => Some(name),
            AlbumField::Detail { name, .. } => name.as_deref(),
        }
    }

    pub fn release_date(&self) -> Option<&str> {
        match self {
            AlbumField::Name(_) => None,
            AlbumField::Detail {
                release_date_for_display,
                ..
            } => release_date_for_display.as_deref(),
        }
    }
}

/// One downloaded song, as persisted in `_dataset.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSong {
    pub number: u32,
    pub title: String,
    pub artist: String,
    #[serde(default)]
    pub album: Option<AlbumField>,
    #[serde(default)]
    pub genius_url: Option<String>,
    #[serde(default)]
    pub genius_id: Option<u64>,
    #[serde(default)]
    pub featured_artists: Vec<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub pageviews: Option<u64>,
    #[serde(default)]
    pub lyrics: String,
    #[serde(default)]
    pub lyrics_length: usize,
}

/// One cleaned song, as written to `songs.json` / `songs.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongRecord {
    pub number: u32,
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    pub album_release_date: Option<String>,
    pub release_date: Option<String>,
    pub genius_url: Option<String>,
    pub genius_id: Option<u64>,
    pub pageviews: Option<u64>,
    pub featured_artists: Option<String>,
    pub word_count: usize,
    pub line_count: usize,
    pub lyrics: String,
}

impl SongRecord {
    pub fn from_raw(raw: &RawSong) -> Self {
        let lyrics = clean_lyrics(&raw.lyrics);
        let featured = raw.featured_artists.join(", ");
        Self {
            number: raw.number,
            title: raw.title.clone(),
            artist: raw.artist.clone(),
            album: raw.album.as_ref().and_then(|a| a.name()).map(str::to_string),
            album_release_date: raw
                .album
                .as_ref()
                .and_then(|a| a.release_date())
                .map(str::to_string),
            release_date: raw.release_date.clone(),
            genius_url: raw.genius_url.clone(),
            genius_id: raw.genius_id,
            pageviews: raw.pageviews,
            featured_artists: (!featured.is_empty()).then_some(featured),
            word_count: count_words(&lyrics),
            line_count: count_lines(&lyrics),
            lyrics,
        }
    }

    /// `NNN_title.txt` for the per-song plain text export.
    pub fn text_file_name(&self) -> String {
        format!("{:03}_{}.txt", self.number, title_stem(&self.title))
    }
}

/// First-pass cleanup applied right after download: trailing embed
/// counter, "You might also like", and a `... Lyrics` title line.
pub fn clean_downloaded(raw: &str) -> String {
    let text = RE_EMBED_STRICT.replace(raw, "");
    let text = text.trim().replace("You might also like", "");
    let mut lines: Vec<&str> = text.split('\n').collect();
    if lines.first().is_some_and(|l| l.ends_with("Lyrics")) {
        lines.remove(0);
    }
    lines.join("\n").trim().to_string()
}

/// Build-step cleanup: section tags, promo text, embed suffix, blank runs,
/// per-line whitespace.
pub fn clean_lyrics(raw: &str) -> String {
    let text = RE_SECTION_TAG.replace_all(raw, "");
    let text = RE_YOU_MIGHT.replace_all(&text, "");
    let text = RE_EMBED.replace(&text, "");
    let text = RE_BLANK_RUNS.replace_all(&text, "\n\n");
    text.split('\n')
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Normalise lyrics before vocabulary analysis: drop `[tags]` and
/// `(asides)`, straighten quotes.
pub fn preprocess_for_vocabulary(text: &str) -> String {
    let text = RE_SECTION_TAG.replace_all(text, " ");
    let text = RE_PAREN.replace_all(&text, " ");
    text.replace(['\u{2019}', '\u{2018}'], "'")
        .replace(['\u{201c}', '\u{201d}'], "")
}

pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Non-blank lines.
pub fn count_lines(text: &str) -> usize {
    text.split('\n').filter(|l| !l.trim().is_empty()).count()
}

/// Directory/file stem for an artist or song title: punctuation dropped,
/// whitespace runs to `_`, lowercased. Letters outside ASCII are kept
/// ("Beyoncé" -> "beyoncé").
pub fn sanitize_file_stem(name: &str) -> String {
    let kept: String = name
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || matches!(c, '_' | '-'))
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join("_").to_lowercase()
}

/// Lowercase title with every non-alphanumeric run turned into `_`.
pub fn title_stem(title: &str) -> String {
    RE_NOT_ALNUM
        .replace_all(&title.to_lowercase(), "_")
        .trim_matches('_')
        .to_string()
}

/// Thousands separators: 1234567 -> "1,234,567".
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Markdown page for one downloaded song.
pub fn song_markdown(song: &RawSong) -> String {
    let mut md = format!("# {}\n\n**Artist:** {}\n", song.title, song.artist);
    if let Some(album) = song.album.as_ref().and_then(|a| a.name()) {
        md.push_str(&format!("**Album:** {album}\n"));
    }
    if let Some(released) = &song.release_date {
        md.push_str(&format!("**Released:** {released}\n"));
    }
    if !song.featured_artists.is_empty() {
        md.push_str(&format!("**Featuring:** {}\n", song.featured_artists.join(", ")));
    }
    if let Some(views) = song.pageviews.filter(|v| *v > 0) {
        md.push_str(&format!("**Genius pageviews:** {}\n", group_thousands(views)));
    }
    md.push_str(&format!("\n---\n\n{}\n", song.lyrics));
    md
}

/// `_index.md` listing every saved song.
pub fn index_markdown(artist: &str, songs: &[RawSong]) -> String {
    let mut md = format!("# {artist}: Top {} Songs (by popularity)\n\n", songs.len());
    for song in songs {
        let safe = format!("{:03}_{}", song.number, sanitize_file_stem(&song.title));
        let album = song
            .album
            .as_ref()
            .and_then(|a| a.name())
            .map(|a| format!(" - *{a}*"))
            .unwrap_or_default();
        let released = song
            .release_date
            .as_ref()
            .map(|r| format!(" ({r})"))
            .unwrap_or_default();
        let views = song
            .pageviews
            .filter(|v| *v > 0)
            .map(|v| format!(" - {} views", group_thousands(v)))
            .unwrap_or_default();
        md.push_str(&format!(
            "{}. [{}]({safe}.md){album}{released}{views}\n",
            song.number, song.title
        ));
    }
    md
}

pub fn read_raw_songs(path: &Path) -> Result<Vec<RawSong>> {
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Malformed song list {}", path.display()))
}

pub fn write_raw_songs(path: &Path, songs: &[RawSong]) -> Result<()> {
    let json = serde_json::to_string_pretty(songs)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

pub fn read_song_records(path: &Path) -> Result<Vec<SongRecord>> {
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Malformed song list {}", path.display()))
}

pub fn write_song_records(path: &Path, records: &[SongRecord]) -> Result<()> {
    let json = serde_json::to_string_pretty(records)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

/// Every field quoted; column order puts lyrics last.
pub fn write_songs_csv(path: &Path, records: &[SongRecord]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    writer.write_record([
        "number",
        "title",
        "artist",
        "album",
        "album_release_date",
        "release_date",
        "pageviews",
        "word_count",
        "line_count",
        "featured_artists",
        "genius_url",
        "genius_id",
        "lyrics",
    ])?;

    let opt = |v: &Option<String>| v.clone().unwrap_or_default();
    for r in records {
        writer.write_record([
            r.number.to_string(),
            r.title.clone(),
            r.artist.clone(),
            opt(&r.album),
            opt(&r.album_release_date),
            opt(&r.release_date),
            r.pageviews.map(|v| v.to_string()).unwrap_or_default(),
            r.word_count.to_string(),
            r.line_count.to_string(),
            opt(&r.featured_artists),
            opt(&r.genius_url),
            r.genius_id.map(|v| v.to_string()).unwrap_or_default(),
            r.lyrics.clone(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
