// Word-list readers for the lexicon merger.
//
// Each published list ships in its own format: CSV with a named column,
// text files with a prose description header, rank tables, comment-prefixed
// lists and spreadsheets. A reader that cannot find the structure it
// expects returns no words and logs a warning; a missing description-header
// boundary falls back to reading from the top of the file.

use std::fs;
use std::io::Read;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{bail, Context, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use regex_lite::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::text::encoding::{decode_latin1, decode_text};

static RE_RANK_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s+(.*)$").expect("valid regex"));

/// Declared text encoding of a CSV list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum TextEncoding {
    #[default]
    #[serde(rename = "utf-8")]
    Utf8,
    /// UTF-8 with a leading byte-order mark
    #[serde(rename = "utf-8-sig")]
    Utf8Sig,
    #[serde(rename = "latin-1")]
    Latin1,
}

impl TextEncoding {
    pub fn decode(&self, bytes: &[u8]) -> String {
        match self {
            TextEncoding::Utf8 | TextEncoding::Utf8Sig => decode_text(bytes),
            TextEncoding::Latin1 => decode_latin1(bytes),
        }
    }
}

/// Rules for finding where the words start in a file with a prose header.
///
/// The header ends with a references section: skip to the first blank line
/// after a line containing `marker`, then take the first non-blank line
/// that neither starts with a citation prefix nor exceeds `max_word_line`
/// characters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HeaderRules {
    pub marker: String,
    pub citation_prefixes: Vec<String>,
    pub max_word_line: usize,
}

impl Default for HeaderRules {
    fn default() -> Self {
        Self {
            marker: "references".to_string(),
            citation_prefixes: vec!["Browne".to_string(), "http".to_string()],
            max_word_line: 100,
        }
    }
}

/// How to read one list file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ListFormat {
    /// CSV with a header row; words come from `column`
    Csv {
        column: String,
        #[serde(default)]
        encoding: TextEncoding,
    },
    /// Text with a description header; entries may hold alternates split by `separator`
    Description {
        #[serde(default)]
        separator: Option<String>,
        #[serde(default)]
        header: HeaderRules,
    },
    /// Lines after a `Rank ... Word` header, formatted `N.<tab>word` or `N. word`
    RankTable,
    /// One word per line, `##` lines are comments
    CommentList,
    /// Spreadsheet; first cell of each row on the first sheet
    Xlsx,
}

/// One list to merge: its tag in the output and where to read it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ListSpec {
    pub tag: String,
    pub file: String,
    pub format: ListFormat,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListsConfig {
    pub lists: Vec<ListSpec>,
}

/// Built-in table for the NGSL family of lists.
pub fn default_lists() -> Vec<ListSpec> {
    let description = |separator: Option<&str>| ListFormat::Description {
        separator: separator.map(str::to_string),
        header: HeaderRules::default(),
    };
    let csv = |column: &str, encoding| ListFormat::Csv {
        column: column.to_string(),
        encoding,
    };
    let spec = |tag: &str, file: &str, format| ListSpec {
        tag: tag.to_string(),
        file: file.to_string(),
        format,
    };

    vec![
        spec("NGSL", "NGSL_1.2_stats.csv", csv("Lemma", TextEncoding::Utf8)),
        spec("BSL", "BSL_1.20_alphabetized_description.txt", description(None)),
        spec("FEL", "FEL_1.2_alphabetized_description.txt", description(Some(" / "))),
        spec("NAWL", "NAWL_1.2_alphabetized_description.txt", description(None)),
        spec("NDL", "NDL_1.1_alphabetized_description.txt", ListFormat::RankTable),
        spec(
            "NGSL-Spoken",
            "NGSL-Spoken_1.2_alphabetized_description.txt",
            ListFormat::CommentList,
        ),
        spec("TSL", "TSL_1.2_stats.csv", csv("Word", TextEncoding::Latin1)),
        spec("NGSL-GR", "NGSL-GR_rank(1).csv", csv("Word", TextEncoding::Utf8Sig)),
        spec("Medical", "Oral+English+Medical+Corpus.xlsx", ListFormat::Xlsx),
    ]
}

/// Lowercase, trim, and turn non-breaking spaces into plain spaces.
pub fn normalize_entry(raw: &str) -> String {
    raw.replace('\u{a0}', " ").trim().to_lowercase()
}

/// Read one list file into raw (un-normalised) entries.
pub fn read_list(path: &Path, format: &ListFormat) -> Result<Vec<String>> {
    if let ListFormat::Xlsx = format {
        return read_xlsx_first_column(path);
    }

    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let entries = match format {
        ListFormat::Csv { column, encoding } => {
            let text = encoding.decode(&bytes);
            read_csv_column(&text, column).unwrap_or_else(|| {
                warn!(file = %path.display(), column = %column, "CSV column not found, list skipped");
                Vec::new()
            })
        }
        ListFormat::Description { separator, header } => {
            let entries = parse_description(&decode_text(&bytes), header);
            match separator {
                Some(sep) => split_alternates(entries, sep),
                None => entries,
            }
        }
        ListFormat::RankTable => parse_rank_table(&decode_text(&bytes)).unwrap_or_else(|| {
            warn!(file = %path.display(), "No 'Rank ... Word' header found, list skipped");
            Vec::new()
        }),
        ListFormat::CommentList => parse_comment_list(&decode_text(&bytes)),
        ListFormat::Xlsx => Vec::new(),
    };
    Ok(entries)
}

/// Index of the first word line after a description header, or 0 when the
/// header boundary cannot be found.
pub fn find_word_start(lines: &[&str], rules: &HeaderRules) -> usize {
    let marker = rules.marker.to_lowercase();
    let mut found_marker = false;
    let mut start = 0usize;

    for (i, line) in lines.iter().enumerate() {
        let trimmed = line.trim();
        if trimmed.to_lowercase().contains(&marker) {
            found_marker = true;
        }
        if !found_marker {
            continue;
        }
        if trimmed.is_empty() {
            start = i + 1;
            continue;
        }
        let is_citation = rules
            .citation_prefixes
            .iter()
            .any(|p| line.starts_with(p.as_str()) || trimmed.starts_with(p.as_str()));
        if start > 0 && !is_citation && trimmed.chars().count() < rules.max_word_line {
            return i;
        }
    }

    if !found_marker || start == 0 {
        debug!("Description header boundary not found, reading from the top");
        return 0;
    }
    start.min(lines.len())
}

/// Entries of a description-header list: lines after the header, minus
/// blanks and `#` comments.
pub fn parse_description(text: &str, rules: &HeaderRules) -> Vec<String> {
    let lines: Vec<&str> = text.lines().collect();
    let start = find_word_start(&lines, rules);
    lines[start..]
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Split `a / b` style entries into separate words.
pub fn split_alternates(entries: Vec<String>, separator: &str) -> Vec<String> {
    entries
        .into_iter()
        .flat_map(|entry| {
            if entry.contains(separator) {
                entry
                    .split(separator)
                    .map(|p| p.trim().to_string())
                    .filter(|p| !p.is_empty())
                    .collect::<Vec<_>>()
            } else {
                vec![entry]
            }
        })
        .collect()
}

/// Words of a rank table, or `None` when no `Rank ... Word` header exists.
pub fn parse_rank_table(text: &str) -> Option<Vec<String>> {
    let mut in_words = false;
    let mut words = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.starts_with("Rank") && line.contains("Word") {
            in_words = true;
            continue;
        }
        if !in_words || line.is_empty() {
            continue;
        }
        let parts: Vec<&str> = line.split('\t').collect();
        if parts.len() >= 2 {
            words.push(parts[parts.len() - 1].trim().to_string());
        } else if let Some(caps) = RE_RANK_LINE.captures(line) {
            words.push(caps[1].trim().to_string());
        }
    }

    in_words.then_some(words)
}

/// One word per line; `##` lines and blanks are skipped.
pub fn parse_comment_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with("##"))
        .map(str::to_string)
        .collect()
}

/// Values of `column`, or `None` if the header lacks it.
pub fn read_csv_column(text: &str, column: &str) -> Option<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());
    let idx = reader.headers().ok()?.iter().position(|h| h.trim() == column)?;

    let words = reader
        .records()
        .filter_map(|row| row.ok())
        .filter_map(|row| row.get(idx).map(|w| w.trim().to_string()))
        .filter(|w| !w.is_empty())
        .collect();
    Some(words)
}

fn xml_text(raw: &[u8]) -> String {
    let raw = String::from_utf8_lossy(raw);
    quick_xml::escape::unescape(raw.as_ref())
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.into_owned())
}

fn zip_entry_to_string<R: std::io::Read + std::io::Seek>(
    archive: &mut zip::ZipArchive<R>,
    name: &str,
) -> Result<Option<String>> {
    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("Failed to open {name}")),
    };
    let mut text = String::new();
    entry
        .read_to_string(&mut text)
        .with_context(|| format!("Failed to read {name}"))?;
    Ok(Some(text))
}

/// Parse `xl/sharedStrings.xml`: one string per `<si>`, rich-text runs joined.
pub fn parse_shared_strings(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut strings = Vec::new();
    let mut current: Option<String> = None;
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"si" => current = Some(String::new()),
                b"t" => in_text = true,
                _ => {}
            },
            Ok(Event::Empty(ref e)) if e.local_name().as_ref() == b"si" => {
                strings.push(String::new());
            }
            Ok(Event::Text(e)) if in_text => {
                if let Some(s) = current.as_mut() {
                    s.push_str(&xml_text(e.as_ref()));
                }
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"si" => strings.push(current.take().unwrap_or_default()),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => bail!("Malformed sharedStrings.xml: {e}"),
            _ => {}
        }
        buf.clear();
    }
    Ok(strings)
}

/// First cell of every row in a worksheet, resolving shared-string indices.
pub fn parse_sheet_first_column(xml: &str, shared: &[String]) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut values = Vec::new();

    // Per row: only the first <c> is looked at
    let mut cells_seen = 0usize;
    let mut in_first_cell = false;
    let mut cell_is_shared = false;
    let mut in_value = false;
    let mut value = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"row" => cells_seen = 0,
                b"c" => {
                    cells_seen += 1;
                    in_first_cell = cells_seen == 1;
                    cell_is_shared = e.attributes().flatten().any(|a| {
                        a.key.as_ref() == b"t" && a.value.as_ref() == b"s"
                    });
                    value.clear();
                }
                b"v" if in_first_cell => in_value = true,
                _ => {}
            },
            Ok(Event::Empty(ref e)) if e.local_name().as_ref() == b"c" => {
                cells_seen += 1;
            }
            Ok(Event::Text(e)) if in_value => value.push_str(&xml_text(e.as_ref())),
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"v" => in_value = false,
                b"c" if in_first_cell => {
                    in_first_cell = false;
                    let raw = value.trim();
                    if raw.is_empty() {
                        continue;
                    }
                    let resolved = if cell_is_shared {
                        raw.parse::<usize>()
                            .ok()
                            .and_then(|i| shared.get(i))
                            .cloned()
                            .unwrap_or_default()
                    } else {
                        raw.to_string()
                    };
                    let resolved = resolved.replace('\u{a0}', " ").trim().to_string();
                    if !resolved.is_empty() {
                        values.push(resolved);
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => bail!("Malformed worksheet: {e}"),
            _ => {}
        }
        buf.clear();
    }
    Ok(values)
}

/// First column of the first worksheet of an xlsx file.
pub fn read_xlsx_first_column(path: &Path) -> Result<Vec<String>> {
    let file = fs::File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut archive = zip::ZipArchive::new(file)
        .with_context(|| format!("{} is not a valid xlsx archive", path.display()))?;

    let shared = match zip_entry_to_string(&mut archive, "xl/sharedStrings.xml")? {
        Some(xml) => parse_shared_strings(&xml)?,
        None => Vec::new(),
    };
    let Some(sheet) = zip_entry_to_string(&mut archive, "xl/worksheets/sheet1.xml")? else {
        warn!(file = %path.display(), "No first worksheet, list skipped");
        return Ok(Vec::new());
    };
    parse_sheet_first_column(&sheet, &shared)
}
