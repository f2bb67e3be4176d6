// Content-word filter: keep/reject policy applied to analyzer output.
//
// This is the only original logic in the text stage. Everything upstream
// (segmentation, lemmas, tags, entities) comes from the TextAnalyzer; this
// module decides which of those tokens count as content words and how they
// are normalised before counting.

use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

use anyhow::Result;
use regex_lite::Regex;
use stop_words::{get, LANGUAGE};
use tracing::debug;

use super::token::{AnalyzedToken, PartOfSpeech};
use super::traits::TextAnalyzer;

/// Default input ceiling (characters) for one analyzer call.
pub const DEFAULT_CHUNK_CHARS: usize = 500_000;

/// Word -> occurrence count. Ordered so downstream output is deterministic.
pub type WordCounts = BTreeMap<String, u64>;

static RE_ONLY_ALPHA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z']*[a-z]$|^[a-z]$").expect("valid regex"));

/// Knobs that differ between the book and subtitle variants of the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterPolicy {
    /// Keep modal verbs ("might", "must") alongside nouns/verbs/adjectives/adverbs
    pub keep_modals: bool,
    /// Also reject when the lemma or the lowercased surface form is a stopword,
    /// not just when the analyzer flagged the token
    pub lemma_stopwords: bool,
}

impl FilterPolicy {
    /// Policy used for book chapters.
    pub fn books() -> Self {
        Self {
            keep_modals: false,
            lemma_stopwords: false,
        }
    }

    /// Policy used for subtitle dialogue.
    pub fn subtitles() -> Self {
        Self {
            keep_modals: true,
            lemma_stopwords: true,
        }
    }

    fn keeps(&self, pos: PartOfSpeech) -> bool {
        match pos {
            PartOfSpeech::Noun | PartOfSpeech::Verb | PartOfSpeech::Adj | PartOfSpeech::Adv => {
                true
            }
            PartOfSpeech::Modal => self.keep_modals,
            _ => false,
        }
    }
}

impl Default for FilterPolicy {
    fn default() -> Self {
        Self::books()
    }
}

/// Applies a `FilterPolicy` to analyzed tokens.
pub struct ContentWordFilter {
    policy: FilterPolicy,
    stopwords: HashSet<String>,
}

impl ContentWordFilter {
    pub fn new(policy: FilterPolicy) -> Self {
        let stopwords: Vec<String> = get(LANGUAGE::English);
        Self {
            policy,
            stopwords: stopwords.into_iter().collect(),
        }
    }

    pub fn policy(&self) -> FilterPolicy {
        self.policy
    }

    /// Normalised content-word form of a token, or `None` if it is rejected.
    pub fn accept(&self, token: &AnalyzedToken) -> Option<String> {
        if token.is_punct || token.is_space || token.like_num {
            return None;
        }
        if token.is_contraction_part {
            return None;
        }
        if token.pos == PartOfSpeech::ProperNoun {
            return None;
        }
        if token.entity.is_some_and(|label| label.is_rejected()) {
            return None;
        }
        if !self.policy.keeps(token.pos) {
            return None;
        }

        let lemma = normalize_lemma(&token.lemma);
        if !RE_ONLY_ALPHA.is_match(&lemma) {
            return None;
        }
        if lemma.chars().count() < 2 {
            return None;
        }

        if token.is_stop {
            return None;
        }
        if self.policy.lemma_stopwords {
            let lower = normalize_lemma(&token.text);
            if self.stopwords.contains(&lemma) || self.stopwords.contains(&lower) {
                return None;
            }
        }

        Some(lemma)
    }

    /// Count content words in an already-analyzed token stream.
    pub fn count(&self, tokens: &[AnalyzedToken]) -> WordCounts {
        let mut counts = WordCounts::new();
        for token in tokens {
            if let Some(word) = self.accept(token) {
                *counts.entry(word).or_insert(0) += 1;
            }
        }
        counts
    }
}

/// Lowercase and straighten curly apostrophes.
pub fn normalize_lemma(lemma: &str) -> String {
    lemma.to_lowercase().replace('\u{2019}', "'")
}

/// Split `text` into chunks of at most `ceiling` characters on `\n`
/// boundaries. A paragraph is never split; one longer than the ceiling
/// becomes a chunk of its own. Text under the ceiling comes back whole.
pub fn chunk_paragraphs(text: &str, ceiling: usize) -> Vec<String> {
    if text.chars().count() <= ceiling {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut chunk: Vec<&str> = Vec::new();
    let mut chunk_len = 0usize;

    for para in text.split('\n') {
        let para_len = para.chars().count();
        if chunk_len + para_len + 1 > ceiling && !chunk.is_empty() {
            chunks.push(chunk.join("\n"));
            chunk.clear();
            chunk_len = 0;
        }
        chunk.push(para);
        chunk_len += para_len + 1;
    }

    if !chunk.is_empty() {
        chunks.push(chunk.join("\n"));
    }

    chunks
}

/// Merge `other` into `into`, summing counts.
pub fn merge_counts(into: &mut WordCounts, other: WordCounts) {
    for (word, count) in other {
        *into.entry(word).or_insert(0) += count;
    }
}

/// Analyze `text` and count its content words, chunking on paragraph
/// boundaries when it exceeds the analyzer's input ceiling.
pub fn count_content_words(
    analyzer: &dyn TextAnalyzer,
    filter: &ContentWordFilter,
    text: &str,
) -> Result<WordCounts> {
    let chunks = chunk_paragraphs(text, analyzer.max_input_chars());
    if chunks.len() > 1 {
        debug!(chunks = chunks.len(), "Text exceeds analyzer ceiling, chunking");
    }

    let mut counts = WordCounts::new();
    for chunk in &chunks {
        let tokens = analyzer.analyze(chunk)?;
        merge_counts(&mut counts, filter.count(&tokens));
    }
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::token::EntityLabel;

    fn noun(text: &str) -> AnalyzedToken {
        AnalyzedToken::word(text, &text.to_lowercase(), PartOfSpeech::Noun)
    }

    #[test]
    fn test_keeps_common_noun_lemma() {
        let filter = ContentWordFilter::new(FilterPolicy::books());
        let t = AnalyzedToken::word("Cats", "cat", PartOfSpeech::Noun);
        assert_eq!(filter.accept(&t), Some("cat".to_string()));
    }

    #[test]
    fn test_rejects_proper_noun_and_entity() {
        let filter = ContentWordFilter::new(FilterPolicy::books());
        let propn = AnalyzedToken::word("Gatsby", "Gatsby", PartOfSpeech::ProperNoun);
        assert_eq!(filter.accept(&propn), None);

        let in_person = noun("rose").with_entity(EntityLabel::Person);
        assert_eq!(filter.accept(&in_person), None);

        // Date entities are not in the rejected set
        let in_date = noun("morning").with_entity(EntityLabel::Date);
        assert_eq!(filter.accept(&in_date), Some("morning".to_string()));
    }

    #[test]
    fn test_modal_only_kept_by_subtitle_policy() {
        let modal = AnalyzedToken::word("might", "might", PartOfSpeech::Modal);
        let books = ContentWordFilter::new(FilterPolicy::books());
        assert_eq!(books.accept(&modal), None);

        let subs = ContentWordFilter::new(FilterPolicy::subtitles());
        assert_eq!(subs.accept(&modal), Some("might".to_string()));
    }

    #[test]
    fn test_shape_and_length_checks() {
        let filter = ContentWordFilter::new(FilterPolicy::books());
        assert_eq!(filter.accept(&noun("x")), None);
        assert_eq!(filter.accept(&noun("e-mail")), None);
        assert_eq!(filter.accept(&noun("'tis")), None);
        assert_eq!(
            filter.accept(&AnalyzedToken::word("rock’n’roll", "rock’n’roll", PartOfSpeech::Noun)),
            Some("rock'n'roll".to_string())
        );
    }

    #[test]
    fn test_stop_flag_and_lemma_stopwords() {
        let books = ContentWordFilter::new(FilterPolicy::books());
        let flagged = noun("thing").with_stop(true);
        assert_eq!(books.accept(&flagged), None);

        // "being" lemmatizes to "be"; only the subtitle policy checks lemmas
        let being = AnalyzedToken::word("being", "be", PartOfSpeech::Verb);
        assert_eq!(books.accept(&being), Some("be".to_string()));
        let subs = ContentWordFilter::new(FilterPolicy::subtitles());
        assert_eq!(subs.accept(&being), None);
    }

    #[test]
    fn test_chunk_short_text_is_whole() {
        assert_eq!(chunk_paragraphs("a\nb", 100), vec!["a\nb".to_string()]);
    }

    #[test]
    fn test_chunk_never_splits_paragraph() {
        let text = "aaaa\nbbbb\ncccccccccc\ndd";
        let chunks = chunk_paragraphs(text, 10);
        assert_eq!(chunks, vec!["aaaa\nbbbb", "cccccccccc", "dd"]);
        assert_eq!(chunks.join("\n"), text);
    }
}
