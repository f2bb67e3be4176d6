// Lexicon merge: combine published word lists into one tagged CSV.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::config::load_yaml;
use crate::output::terminal;
use crate::sources::lexicon::{default_lists, normalize_entry, read_list, ListSpec, ListsConfig};

/// Default output file name, written into the list directory.
pub const DEFAULT_OUTPUT: &str = "NGSL_combined.csv";

/// Word -> tags of the lists containing it.
pub type TaggedWords = BTreeMap<String, BTreeSet<String>>;

/// Lists to merge: `lists.yaml` in `dir` if present, else the built-in table.
pub fn load_lists(dir: &Path) -> Result<Vec<ListSpec>> {
    let path = dir.join("lists.yaml");
    if path.exists() {
        let config: ListsConfig = load_yaml(&path)?;
        Ok(config.lists)
    } else {
        Ok(default_lists())
    }
}

/// Read every list present in `dir` and tag each normalised word with the
/// lists it came from. Missing files are skipped with a warning.
pub fn merge_lists(dir: &Path, lists: &[ListSpec]) -> Result<TaggedWords> {
    let mut tagged = TaggedWords::new();

    for spec in lists {
        let path = dir.join(&spec.file);
        if !path.exists() {
            terminal::warning(&format!("{} not found, skipping", spec.file));
            warn!(list = spec.tag, file = spec.file, "List file missing");
            continue;
        }

        let mut count = 0usize;
        for raw in read_list(&path, &spec.format)? {
            let word = normalize_entry(&raw);
            if word.is_empty() {
                continue;
            }
            tagged.entry(word).or_default().insert(spec.tag.clone());
            count += 1;
        }
        println!("{}: {count} words extracted from {}", spec.tag, spec.file);
    }

    Ok(tagged)
}

/// `word,tags` sorted by word, tags comma-joined in sorted order.
pub fn write_tagged_csv(path: &Path, tagged: &TaggedWords) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    writer.write_record(["word", "tags"])?;
    for (word, tags) in tagged {
        let tags = tags.iter().cloned().collect::<Vec<_>>().join(",");
        writer.write_record([word.as_str(), tags.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}

/// Words per tag, in tag order.
pub fn words_per_list(tagged: &TaggedWords) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for tags in tagged.values() {
        for tag in tags {
            *counts.entry(tag.as_str()).or_insert(0) += 1;
        }
    }
    counts.into_iter().map(|(t, c)| (t.to_string(), c)).collect()
}

/// Run the merge for `dir`, writing to `output` (default: `dir/NGSL_combined.csv`).
pub fn run(dir: &Path, output: Option<&Path>) -> Result<TaggedWords> {
    let lists = load_lists(dir)?;
    let tagged = merge_lists(dir, &lists)?;

    let default_output = dir.join(DEFAULT_OUTPUT);
    let output = output.unwrap_or(&default_output);
    write_tagged_csv(output, &tagged)?;

    let multi = tagged.values().filter(|tags| tags.len() > 1).count();
    terminal::display_lexicon_summary(&words_per_list(&tagged), tagged.len(), multi);
    terminal::wrote(output);
    info!(words = tagged.len(), multi_list = multi, "Lexicon merged");
    Ok(tagged)
}
