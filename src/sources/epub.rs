// EPUB reader: container parsing, chapter recovery and markdown export.
//
// An EPUB is a zip archive. META-INF/container.xml points at the OPF
// package document, whose manifest lists the XHTML content documents.
// Each document is parsed with a tolerant HTML parser into a flat list of
// blocks (headings, paragraphs, blockquotes). Chapter numbering is a pure
// function over those blocks: h1-h3 start a chapter, and a document with
// no headings but more than IMPLICIT_CHAPTER_CHARS of text starts one too.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{bail, Context, Result};
use percent_encoding::percent_decode_str;
use quick_xml::events::Event;
use quick_xml::Reader;
use regex_lite::Regex;
use select::document::Document;
use select::node::Node;
use select::predicate::{Name, Predicate};
use tracing::{debug, warn};
use unicode_normalization::UnicodeNormalization;

/// Blocks shorter than this (characters) are dropped as noise.
pub const MIN_BLOCK_CHARS: usize = 40;

/// A heading-less document with more text than this starts a new chapter.
pub const IMPLICIT_CHAPTER_CHARS: usize = 200;

static RE_SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]+").expect("valid regex"));
static RE_MULTI_NEWLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{2,}").expect("valid regex"));
static RE_BLANK_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));
static RE_LEADING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+_").expect("valid regex"));
static RE_UNDERSCORES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_+").expect("valid regex"));

const SKIPPED_INLINE: &[&str] = &["img", "script", "style", "svg", "figure", "figcaption"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// h1..h6
    Heading(u8),
    Paragraph,
    Blockquote,
}

impl BlockKind {
    /// h1-h3 open a new chapter; h4-h6 are sub-headings.
    pub fn starts_chapter(&self) -> bool {
        matches!(self, BlockKind::Heading(level) if *level <= 3)
    }
}

/// One block-level element of a content document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    /// Plain text, text nodes joined by single spaces
    pub text: String,
    /// Inline markdown rendering (emphasis kept), NFKC-normalised
    pub markdown: String,
}

/// Blocks of one content document plus what chapter detection needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentDocument {
    pub blocks: Vec<Block>,
    /// Length of all body text with whitespace stripped from each text node
    pub plain_chars: usize,
}

impl ContentDocument {
    pub fn has_headings(&self) -> bool {
        self.blocks.iter().any(|b| b.kind.starts_chapter())
    }
}

// -- Container --

/// Attribute value by local name.
fn attr_value(e: &quick_xml::events::BytesStart, name: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == name)
        .map(|a| {
            let raw = String::from_utf8_lossy(&a.value).into_owned();
            quick_xml::escape::unescape(&raw)
                .map(|s| s.into_owned())
                .unwrap_or(raw)
        })
}

/// Path of the OPF package document from `META-INF/container.xml`.
pub fn parse_container(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e))
                if e.local_name().as_ref() == b"rootfile" =>
            {
                if let Some(path) = attr_value(e, b"full-path") {
                    return Ok(path);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => bail!("Malformed container.xml: {e}"),
            _ => {}
        }
        buf.clear();
    }
    bail!("container.xml has no rootfile")
}

/// Manifest hrefs of the XHTML content documents, in manifest order.
pub fn parse_manifest_documents(opf: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(opf);
    let mut buf = Vec::new();
    let mut docs = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e))
                if e.local_name().as_ref() == b"item" =>
            {
                let media = attr_value(e, b"media-type").unwrap_or_default();
                if media == "application/xhtml+xml" || media == "text/html" {
                    if let Some(href) = attr_value(e, b"href") {
                        docs.push(href);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => bail!("Malformed package document: {e}"),
            _ => {}
        }
        buf.clear();
    }
    Ok(docs)
}

/// Resolve a manifest href against the OPF directory, undoing `%XX` escapes
/// and `..` segments.
pub fn resolve_href(opf_path: &str, href: &str) -> String {
    let href = href.split('#').next().unwrap_or_default();
    let decoded = percent_decode_str(href).decode_utf8_lossy();
    let mut parts: Vec<&str> = match opf_path.rfind('/') {
        Some(i) => opf_path[..i].split('/').collect(),
        None => Vec::new(),
    };
    for seg in decoded.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            seg => parts.push(seg),
        }
    }
    parts.join("/")
}

fn read_entry<R: Read + std::io::Seek>(archive: &mut zip::ZipArchive<R>, name: &str) -> Result<Vec<u8>> {
    let mut entry = archive
        .by_name(name)
        .with_context(|| format!("Missing {name} in archive"))?;
    let mut bytes = Vec::new();
    entry
        .read_to_end(&mut bytes)
        .with_context(|| format!("Failed to read {name}"))?;
    Ok(bytes)
}

/// Read every content document of an EPUB. A document that cannot be read
/// or parsed is skipped with a warning; a broken container is an error.
pub fn read_epub(path: &Path) -> Result<Vec<ContentDocument>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut archive = zip::ZipArchive::new(file)
        .with_context(|| format!("{} is not a valid EPUB archive", path.display()))?;

    let container = read_entry(&mut archive, "META-INF/container.xml")?;
    let opf_path = parse_container(&String::from_utf8_lossy(&container))?;
    let opf = read_entry(&mut archive, &opf_path)?;
    let hrefs = parse_manifest_documents(&String::from_utf8_lossy(&opf))?;
    debug!(book = %path.display(), documents = hrefs.len(), "Read EPUB manifest");

    let mut docs = Vec::with_capacity(hrefs.len());
    for href in hrefs {
        let name = resolve_href(&opf_path, &href);
        match read_entry(&mut archive, &name) {
            Ok(bytes) => docs.push(parse_document(&String::from_utf8_lossy(&bytes))),
            Err(e) => warn!(document = %name, error = %e, "Skipping unreadable EPUB document"),
        }
    }
    Ok(docs)
}

// -- HTML blocks --

/// Text nodes under `node`, each trimmed, blanks dropped, joined by `sep`.
fn joined_text(node: &Node, sep: &str) -> String {
    node.descendants()
        .filter_map(|n| n.as_text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(sep)
}

fn push_inline(node: &Node, out: &mut String) {
    if let Some(text) = node.as_text() {
        out.push_str(text);
        return;
    }
    let Some(name) = node.name() else {
        return;
    };
    if SKIPPED_INLINE.contains(&name) {
        return;
    }
    let marker = match name {
        "em" | "i" => Some("*"),
        "strong" | "b" => Some("**"),
        "br" => {
            out.push('\n');
            return;
        }
        _ => None,
    };
    let mut inner = String::new();
    for child in node.children() {
        push_inline(&child, &mut inner);
    }
    match marker {
        Some(m) if !inner.trim().is_empty() => {
            // Emphasis markers must hug the text
            let leading = &inner[..inner.len() - inner.trim_start().len()];
            let trailing = &inner[inner.trim_end().len()..];
            out.push_str(leading);
            out.push_str(m);
            out.push_str(inner.trim());
            out.push_str(m);
            out.push_str(trailing);
        }
        _ => out.push_str(&inner),
    }
    if matches!(name, "p" | "div") {
        out.push('\n');
    }
}

/// Inline markdown for a block element.
pub fn inline_markdown(node: &Node) -> String {
    let mut raw = String::new();
    for child in node.children() {
        push_inline(&child, &mut raw);
    }
    let text: String = raw.nfkc().collect();
    let text = RE_SPACES.replace_all(&text, " ");
    let text = RE_MULTI_NEWLINE.replace_all(&text, "\n");
    text.lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Parse one XHTML content document into blocks. Never fails: the parser
/// recovers from malformed markup.
pub fn parse_document(html: &str) -> ContentDocument {
    let doc = Document::from(html);
    let Some(body) = doc.find(Name("body")).next() else {
        return ContentDocument::default();
    };

    let plain_chars = body
        .descendants()
        .filter_map(|n| n.as_text())
        .map(|t| t.trim().chars().count())
        .sum();

    let blocks_pred = Name("h1")
        .or(Name("h2"))
        .or(Name("h3"))
        .or(Name("h4"))
        .or(Name("h5"))
        .or(Name("h6"))
        .or(Name("p"))
        .or(Name("blockquote"));

    let blocks = body
        .find(blocks_pred)
        .filter_map(|node| {
            let name = node.name()?;
            let kind = match name {
                "p" => BlockKind::Paragraph,
                "blockquote" => BlockKind::Blockquote,
                h => BlockKind::Heading(h[1..].parse().ok()?),
            };
            Some(Block {
                kind,
                text: joined_text(&node, " "),
                markdown: inline_markdown(&node),
            })
        })
        .collect();

    ContentDocument {
        blocks,
        plain_chars,
    }
}

// -- Chapters --

/// Number chapters across documents and return `(chapter, text)` pairs with
/// each chapter's blocks joined by newlines. Chapter 0 holds text before
/// the first boundary; chapters without text are omitted.
pub fn assign_chapters(docs: &[ContentDocument]) -> Vec<(u32, String)> {
    let mut chapter = 0u32;
    let mut chapters: HashMap<u32, Vec<&str>> = HashMap::new();

    for doc in docs {
        if !doc.has_headings() && doc.plain_chars > IMPLICIT_CHAPTER_CHARS {
            chapter += 1;
        }
        for block in &doc.blocks {
            match block.kind {
                BlockKind::Heading(_) if block.kind.starts_chapter() => {
                    if !block.text.is_empty() {
                        chapter += 1;
                    }
                }
                BlockKind::Heading(_) => {}
                BlockKind::Paragraph | BlockKind::Blockquote => {
                    if block.text.chars().count() >= MIN_BLOCK_CHARS {
                        chapters.entry(chapter).or_default().push(&block.text);
                    }
                }
            }
        }
    }

    let mut result: Vec<(u32, String)> = chapters
        .into_iter()
        .map(|(n, paras)| (n, paras.join("\n")))
        .filter(|(_, text)| !text.trim().is_empty())
        .collect();
    result.sort_by_key(|(n, _)| *n);
    result
}

/// Render documents as markdown with `[chN:pM]` paragraph markers.
pub fn render_markdown(docs: &[ContentDocument]) -> String {
    let mut chapter = 0u32;
    let mut para = 0u32;
    let mut lines: Vec<String> = Vec::new();

    for doc in docs {
        if !doc.has_headings() && doc.plain_chars > IMPLICIT_CHAPTER_CHARS {
            chapter += 1;
            para = 0;
        }
        for block in &doc.blocks {
            match block.kind {
                BlockKind::Heading(level) => {
                    if block.text.is_empty() {
                        continue;
                    }
                    let heading = format!("{} {}", "#".repeat(level as usize), block.text);
                    if block.kind.starts_chapter() {
                        chapter += 1;
                        para = 0;
                        lines.push(String::new());
                    }
                    lines.push(heading);
                    lines.push(String::new());
                }
                BlockKind::Paragraph | BlockKind::Blockquote => {
                    let text = &block.markdown;
                    if text.is_empty() || text.chars().count() < MIN_BLOCK_CHARS {
                        continue;
                    }
                    para += 1;
                    let marker = format!("[ch{chapter}:p{para}]");
                    if block.kind == BlockKind::Blockquote {
                        let mut quoted = text.lines();
                        let first = quoted.next().unwrap_or_default();
                        lines.push(format!("{marker} > {first}"));
                        lines.extend(quoted.map(|l| format!("> {l}")));
                    } else {
                        lines.push(format!("{marker} {text}"));
                    }
                    lines.push(String::new());
                }
            }
        }
    }

    let joined = lines.join("\n");
    RE_BLANK_RUNS.replace_all(&joined, "\n\n").trim().to_string()
}

/// Markdown file name for an EPUB: leading `NN_` dropped, lowercased,
/// spaces to underscores, only `[a-z0-9_]` kept.
pub fn markdown_file_name(epub_path: &Path) -> String {
    let stem = epub_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = RE_LEADING_NUMBER.replace(&stem, "");
    let name = name.trim().to_lowercase().replace(' ', "_");
    let name = RE_UNDERSCORES.replace_all(&name, "_");
    let name: String = name
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_')
        .collect();
    format!("{}.md", name.trim_matches('_'))
}
