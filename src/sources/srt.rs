// SRT subtitle reader.
//
// Shows are laid out as `<show>/<season dir>/<file>.srt`; the episode
// identity comes from an `NxNN` pattern in the file name. Sequence numbers,
// timestamps, markup, sound cues and speaker dashes are stripped so only
// dialogue reaches the analyzer.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{bail, Result};
use regex_lite::Regex;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::text::encoding::{decode_text, normalize_newlines};

static RE_TIMESTAMP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}:\d{2}:\d{2},\d{3}\s*-->").expect("valid regex"));
static RE_SEQUENCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+$").expect("valid regex"));
static RE_HTML_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));
static RE_BRACKETS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]*\]").expect("valid regex"));
static RE_PARENS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\([^)]*\)").expect("valid regex"));
static RE_EPISODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)x(\d+)").expect("valid regex"));

/// `(season, episode)` from a name like `Show - 1x01 - Pilot.srt`.
pub fn parse_episode(file_name: &str) -> Option<(u32, u32)> {
    let caps = RE_EPISODE.captures(file_name)?;
    let season = caps[1].parse().ok()?;
    let episode = caps[2].parse().ok()?;
    Some((season, episode))
}

/// Strip markup, `[cues]`, `(asides)` and a leading speaker dash.
pub fn clean_line(line: &str) -> String {
    let line = RE_HTML_TAG.replace_all(line, "");
    let line = RE_BRACKETS.replace_all(&line, "");
    let line = RE_PARENS.replace_all(&line, "");
    let line = line.trim();

    let line = if let Some(rest) = line.strip_prefix("- ") {
        rest
    } else if line.len() > 1 && line.starts_with('-') && !line.starts_with("--") {
        &line[1..]
    } else {
        line
    };
    line.trim().to_string()
}

/// Dialogue lines of an SRT document.
pub fn parse_srt_text(text: &str) -> Vec<String> {
    normalize_newlines(text)
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !RE_SEQUENCE.is_match(l) && !RE_TIMESTAMP.is_match(l))
        .map(clean_line)
        .filter(|l| !l.is_empty())
        .collect()
}

/// Read and clean one SRT file. An unreadable file yields no lines.
pub fn read_srt(path: &Path) -> Vec<String> {
    match fs::read(path) {
        Ok(bytes) => parse_srt_text(&decode_text(&bytes)),
        Err(e) => {
            warn!(file = %path.display(), error = %e, "Unreadable subtitle file, skipped");
            Vec::new()
        }
    }
}

/// One SRT per episode under `show_dir/<season>/`. Directories and files
/// are visited in name order, so the alphabetically first file wins when
/// an episode has several.
pub fn discover_episodes(show_dir: &Path) -> Result<BTreeMap<(u32, u32), PathBuf>> {
    if !show_dir.is_dir() {
        bail!("Directory {} not found", show_dir.display());
    }

    let mut episodes = BTreeMap::new();
    let walker = WalkDir::new(show_dir)
        .min_depth(2)
        .max_depth(2)
        .sort_by_file_name();

    for entry in walker.into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().and_then(|e| e.to_str()) != Some("srt") {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        let Some(ep) = parse_episode(&name) else {
            debug!(file = %path.display(), "No episode number in file name");
            continue;
        };
        episodes.entry(ep).or_insert_with(|| path.to_path_buf());
    }
    Ok(episodes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_episode() {
        assert_eq!(parse_episode("Breaking Bad - 1x01 - Pilot.srt"), Some((1, 1)));
        assert_eq!(parse_episode("show.2x13.srt"), Some((2, 13)));
        assert_eq!(parse_episode("pilot.srt"), None);
    }

    #[test]
    fn test_clean_line() {
        assert_eq!(clean_line("<i>Hello there</i>"), "Hello there");
        assert_eq!(clean_line("- [door slams] Who's there?"), "Who's there?");
        assert_eq!(clean_line("-(laughing) Stop it"), "Stop it");
        assert_eq!(clean_line("-- and then"), "-- and then");
        assert_eq!(clean_line("[MUSIC PLAYING]"), "");
    }

    #[test]
    fn test_parse_srt_text() {
        let text = "1\r\n00:00:01,000 --> 00:00:02,000\r\n<i>We need to cook.</i>\r\n\r\n2\r\n00:00:03,000 --> 00:00:04,000\r\n[sighs]\r\n";
        assert_eq!(parse_srt_text(text), vec!["We need to cook."]);
    }
}
