// Text normalisation: analyzer seam, rule-based analyzer and the
// content-word policy that turns a text unit into word counts.

pub mod encoding;
pub mod filter;
pub mod lemma;
pub mod pool;
pub mod rules;
pub mod token;
pub mod traits;

pub use filter::{count_content_words, ContentWordFilter, FilterPolicy, WordCounts};
pub use rules::RuleAnalyzer;
pub use traits::TextAnalyzer;
