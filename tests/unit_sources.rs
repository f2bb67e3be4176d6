// Unit tests for the source readers against files on disk: word lists in
// every supported format, EPUB archives, subtitle trees and song records.

use std::fs;
use std::io::Write;
use std::path::Path;

use wordpool::pipeline::lexicon::{load_lists, merge_lists, words_per_list, write_tagged_csv};
use wordpool::sources::epub::{assign_chapters, read_epub, render_markdown};
use wordpool::sources::lexicon::{read_list, HeaderRules, ListFormat, TextEncoding};
use wordpool::sources::lyrics::{
    index_markdown, preprocess_for_vocabulary, read_raw_songs, song_markdown, write_raw_songs,
    write_songs_csv, AlbumField, RawSong, SongRecord,
};
use wordpool::sources::srt::{discover_episodes, read_srt};

/// Write a zip archive with the given `(name, contents)` entries.
fn write_zip(path: &Path, entries: &[(&str, &str)]) {
    let file = fs::File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    for (name, contents) in entries {
        zip.start_file(*name, zip::write::FileOptions::default()).unwrap();
        zip.write_all(contents.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

const LONG: &str = "The harbour lights were dim and the fishermen mended their nets slowly.";

// ============================================================
// Word lists
// ============================================================

#[test]
fn latin1_csv_column_is_decoded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("TSL.csv");
    fs::write(&path, b"Word,Freq\ncaf\xE9,10\ninvoice,7\n").unwrap();

    let format = ListFormat::Csv {
        column: "Word".to_string(),
        encoding: TextEncoding::Latin1,
    };
    assert_eq!(read_list(&path, &format).unwrap(), vec!["café", "invoice"]);
}

#[test]
fn bom_csv_header_matches_column() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("GR.csv");
    fs::write(&path, b"\xEF\xBB\xBFWord,Rank\nthe,1\nof,2\n").unwrap();

    let format = ListFormat::Csv {
        column: "Word".to_string(),
        encoding: TextEncoding::Utf8Sig,
    };
    assert_eq!(read_list(&path, &format).unwrap(), vec!["the", "of"]);
}

#[test]
fn csv_without_column_reads_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("x.csv");
    fs::write(&path, "Lemma\nthe\n").unwrap();

    let format = ListFormat::Csv {
        column: "Word".to_string(),
        encoding: TextEncoding::Utf8,
    };
    assert!(read_list(&path, &format).unwrap().is_empty());
}

#[test]
fn description_list_skips_header_and_splits_alternates() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("FEL.txt");
    fs::write(
        &path,
        "Fitness English List\nA list of words for the gym.\n\nReferences\nBrowne, C. (2016).\nhttp://www.newgeneralservicelist.org\n\nabdominal / abs\n# comment\nache\n",
    )
    .unwrap();

    let format = ListFormat::Description {
        separator: Some(" / ".to_string()),
        header: HeaderRules::default(),
    };
    assert_eq!(read_list(&path, &format).unwrap(), vec!["abdominal", "abs", "ache"]);
}

#[test]
fn rank_table_and_comment_list() {
    let dir = tempfile::tempdir().unwrap();
    let ndl = dir.path().join("NDL.txt");
    fs::write(&ndl, "Dictionary list\nRank\tWord\n1.\tafford\n2. bargain\n").unwrap();
    assert_eq!(
        read_list(&ndl, &ListFormat::RankTable).unwrap(),
        vec!["afford", "bargain"]
    );

    let spoken = dir.path().join("spoken.txt");
    fs::write(&spoken, "## NGSL Spoken\n\nyeah\nokay\n").unwrap();
    assert_eq!(
        read_list(&spoken, &ListFormat::CommentList).unwrap(),
        vec!["yeah", "okay"]
    );
}

#[test]
fn rank_table_without_header_reads_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("NDL.txt");
    fs::write(&path, "1. afford\n").unwrap();
    assert!(read_list(&path, &ListFormat::RankTable).unwrap().is_empty());
}

#[test]
fn xlsx_first_column_through_shared_strings() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("medical.xlsx");
    write_zip(
        &path,
        &[
            (
                "xl/sharedStrings.xml",
                r#"<sst><si><t>fever</t></si><si><t>Nausea&#160;</t></si></sst>"#,
            ),
            (
                "xl/worksheets/sheet1.xml",
                r#"<worksheet><sheetData>
                    <row><c t="s"><v>0</v></c><c><v>3</v></c></row>
                    <row><c t="s"><v>1</v></c></row>
                </sheetData></worksheet>"#,
            ),
        ],
    );

    assert_eq!(read_list(&path, &ListFormat::Xlsx).unwrap(), vec!["fever", "Nausea"]);
}

#[test]
fn xlsx_without_sheet_reads_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.xlsx");
    write_zip(&path, &[("xl/workbook.xml", "<workbook/>")]);
    assert!(read_list(&path, &ListFormat::Xlsx).unwrap().is_empty());
}

#[test]
fn lexicon_merge_tags_words_from_configured_lists() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("lists.yaml"),
        "lists:\n  - tag: CORE\n    file: core.csv\n    format:\n      kind: csv\n      column: Lemma\n  - tag: SPOKEN\n    file: spoken.txt\n    format:\n      kind: comment_list\n  - tag: GONE\n    file: missing.txt\n    format:\n      kind: comment_list\n",
    )
    .unwrap();
    fs::write(dir.path().join("core.csv"), "Lemma\nThe\nhouse\n").unwrap();
    fs::write(dir.path().join("spoken.txt"), "## spoken\nthe\nyeah\n").unwrap();

    let lists = load_lists(dir.path()).unwrap();
    assert_eq!(lists.len(), 3);
    let tagged = merge_lists(dir.path(), &lists).unwrap();

    let out = dir.path().join("combined.csv");
    write_tagged_csv(&out, &tagged).unwrap();
    assert_eq!(
        fs::read_to_string(&out).unwrap(),
        "word,tags\nhouse,CORE\nthe,\"CORE,SPOKEN\"\nyeah,SPOKEN\n"
    );
    assert_eq!(
        words_per_list(&tagged),
        vec![("CORE".to_string(), 2), ("SPOKEN".to_string(), 2)]
    );
}

#[test]
fn lexicon_defaults_without_config() {
    let dir = tempfile::tempdir().unwrap();
    let lists = load_lists(dir.path()).unwrap();
    assert_eq!(lists.len(), 9);
    assert_eq!(lists[0].tag, "NGSL");
}

// ============================================================
// EPUB archives
// ============================================================

fn write_epub(path: &Path) {
    let ch1 = format!("<html><body><h1>Chapter One</h1><p>{LONG}</p><p>Short.</p></body></html>");
    let ch2 = format!("<html><body><p>{LONG}</p><p>{LONG}</p><p>{LONG}</p></body></html>");
    write_zip(
        path,
        &[
            (
                "META-INF/container.xml",
                r#"<?xml version="1.0"?><container><rootfiles><rootfile full-path="OEBPS/content.opf"/></rootfiles></container>"#,
            ),
            (
                "OEBPS/content.opf",
                r#"<package><manifest>
                    <item id="a" href="text/one.xhtml" media-type="application/xhtml+xml"/>
                    <item id="img" href="cover.jpg" media-type="image/jpeg"/>
                    <item id="b" href="text/two.xhtml" media-type="application/xhtml+xml"/>
                    <item id="c" href="text/missing.xhtml" media-type="application/xhtml+xml"/>
                </manifest></package>"#,
            ),
            ("OEBPS/text/one.xhtml", &ch1),
            ("OEBPS/text/two.xhtml", &ch2),
        ],
    );
}

#[test]
fn epub_documents_read_in_manifest_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("book.epub");
    write_epub(&path);

    let docs = read_epub(&path).unwrap();
    assert_eq!(docs.len(), 2);

    let chapters = assign_chapters(&docs);
    let numbers: Vec<u32> = chapters.iter().map(|(n, _)| *n).collect();
    assert_eq!(numbers, vec![1, 2]);
    assert_eq!(chapters[0].1, LONG);
    assert_eq!(chapters[1].1.lines().count(), 3);
}

#[test]
fn epub_markdown_numbers_paragraphs_per_chapter() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("book.epub");
    write_epub(&path);

    let md = render_markdown(&read_epub(&path).unwrap());
    assert!(md.starts_with("# Chapter One"));
    assert!(md.contains(&format!("[ch1:p1] {LONG}")));
    assert!(md.contains(&format!("[ch2:p3] {LONG}")));
    assert!(!md.contains("Short."));
}

#[test]
fn non_zip_epub_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.epub");
    fs::write(&path, "not a zip").unwrap();
    assert!(read_epub(&path).is_err());
}

// ============================================================
// Subtitle trees
// ============================================================

#[test]
fn episodes_discovered_one_per_number() {
    let dir = tempfile::tempdir().unwrap();
    let show = dir.path().join("breaking_bad");
    let s1 = show.join("Season 1");
    let s2 = show.join("Season 2");
    fs::create_dir_all(&s1).unwrap();
    fs::create_dir_all(&s2).unwrap();
    fs::write(s1.join("BB - 1x02 - Cat.srt"), "").unwrap();
    fs::write(s1.join("BB - 1x01 - Pilot.srt"), "").unwrap();
    fs::write(s1.join("BB - 1x01 - Pilot.en.srt"), "").unwrap();
    fs::write(s1.join("notes.txt"), "").unwrap();
    fs::write(s2.join("BB - 2x01 - Seven.srt"), "").unwrap();
    fs::write(show.join("BB - 9x09.srt"), "").unwrap();

    let episodes = discover_episodes(&show).unwrap();
    let keys: Vec<(u32, u32)> = episodes.keys().copied().collect();
    assert_eq!(keys, vec![(1, 1), (1, 2), (2, 1)]);
    assert!(episodes[&(1, 1)].ends_with("BB - 1x01 - Pilot.en.srt"));
}

#[test]
fn missing_show_dir_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(discover_episodes(&dir.path().join("nope")).is_err());
}

#[test]
fn latin1_subtitles_are_decoded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("1x01.srt");
    fs::write(&path, b"1\n00:00:01,000 --> 00:00:02,000\n- (whispers) Se\xF1or, listen.\n").unwrap();
    assert_eq!(read_srt(&path), vec!["Señor, listen."]);
}

#[test]
fn unreadable_subtitle_yields_nothing() {
    let dir = tempfile::tempdir().unwrap();
    assert!(read_srt(&dir.path().join("absent.srt")).is_empty());
}

// ============================================================
// Song records
// ============================================================

fn raw_song(number: u32, title: &str) -> RawSong {
    RawSong {
        number,
        title: title.to_string(),
        artist: "Adele".to_string(),
        album: Some(AlbumField::Name("25".to_string())),
        genius_url: Some("https://genius.com/adele-hello-lyrics".to_string()),
        genius_id: Some(100 + number as u64),
        featured_artists: Vec::new(),
        release_date: Some("October 23, 2015".to_string()),
        pageviews: Some(1_234_567),
        lyrics: "[Verse 1]\nHello, it's me".to_string(),
        lyrics_length: 22,
    }
}

#[test]
fn song_markdown_has_metadata_block() {
    let md = song_markdown(&raw_song(1, "Hello"));
    assert!(md.starts_with("# Hello\n\n**Artist:** Adele\n**Album:** 25\n"));
    assert!(md.contains("**Genius pageviews:** 1,234,567\n"));
    assert!(md.ends_with("\n---\n\n[Verse 1]\nHello, it's me\n"));
    assert!(!md.contains("Featuring"));
}

#[test]
fn index_links_each_song() {
    let md = index_markdown("Adele", &[raw_song(1, "Hello"), raw_song(2, "Send My Love (To Your New Lover)")]);
    assert!(md.starts_with("# Adele: Top 2 Songs (by popularity)\n\n"));
    assert!(md.contains("1. [Hello](001_hello.md) - *25* (October 23, 2015) - 1,234,567 views\n"));
    assert!(md.contains("(002_send_my_love_to_your_new_lover.md)"));
}

#[test]
fn raw_songs_survive_a_save() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("_dataset.json");
    let songs = vec![raw_song(1, "Hello")];
    write_raw_songs(&path, &songs).unwrap();
    assert_eq!(read_raw_songs(&path).unwrap(), songs);
}

#[test]
fn songs_csv_quotes_every_field() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("songs.csv");
    let record = SongRecord::from_raw(&raw_song(1, "Hello"));
    write_songs_csv(&path, &[record]).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    let mut lines = text.lines();
    assert!(lines.next().unwrap().starts_with("\"number\",\"title\",\"artist\""));
    assert!(lines.next().unwrap().starts_with("\"1\",\"Hello\",\"Adele\",\"25\""));
}

#[test]
fn vocabulary_preprocessing_drops_asides_and_curly_quotes() {
    let text = preprocess_for_vocabulary("[Chorus]\nI’m “fine” (yeah)");
    assert_eq!(text.split_whitespace().collect::<Vec<_>>(), vec!["I'm", "fine"]);
}
