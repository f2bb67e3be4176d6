// Source readers: one module per input format.
//
// Readers only extract text (or words) from a source; counting and
// aggregation happen downstream in `text` and `dataset`.

pub mod epub;
pub mod lexicon;
pub mod lyrics;
pub mod srt;
