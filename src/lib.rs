// Wordpool: vocabulary datasets from books, TV subtitles and song lyrics
//
// This is the library root. Each module corresponds to a stage of the
// pipeline: reading sources, turning text into content-word counts,
// aggregating per item and combining items into pools.

pub mod combine;
pub mod config;
pub mod dataset;
pub mod genius;
pub mod output;
pub mod pipeline;
pub mod sources;
pub mod text;
