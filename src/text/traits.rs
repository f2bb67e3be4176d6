// Text analyzer trait: the seam in front of the NLP collaborator.
//
// Tokenization, lemmatization, POS tagging and entity recognition are all
// delegated to whatever implements this trait. The default is the built-in
// RuleAnalyzer; a heavier model-backed analyzer can be dropped in without
// touching the filter, the aggregators or the pipelines.

use anyhow::Result;

use super::token::AnalyzedToken;

/// Trait for turning raw text into annotated tokens.
///
/// Implementations may hold large models, so they are created explicitly by
/// the caller and handed to processing functions (one per worker when run
/// concurrently, see `AnalyzerPool`). `Send` lets a handle move into a
/// blocking task; no `Sync` bound is needed because a handle is only ever
/// used by one worker at a time.
pub trait TextAnalyzer: Send {
    /// Analyze one block of text. Newlines are treated as hard sentence
    /// boundaries.
    fn analyze(&self, text: &str) -> Result<Vec<AnalyzedToken>>;

    /// Largest input, in characters, this analyzer accepts in one call.
    /// Longer texts are split on paragraph boundaries by the caller.
    fn max_input_chars(&self) -> usize {
        super::filter::DEFAULT_CHUNK_CHARS
    }
}

impl<T: TextAnalyzer + ?Sized> TextAnalyzer for Box<T> {
    fn analyze(&self, text: &str) -> Result<Vec<AnalyzedToken>> {
        (**self).analyze(text)
    }

    fn max_input_chars(&self) -> usize {
        (**self).max_input_chars()
    }
}
