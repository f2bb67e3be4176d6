// Lyrics provider: trait seam plus the Genius implementation.
//
// The download step only needs four operations from a provider (search,
// list an artist's songs by popularity, song details, lyrics text). They
// live behind LyricsProvider so the pipeline can run against a stub.

pub mod client;
pub mod retry;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;

pub use client::GeniusClient;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ArtistRef {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SongStats {
    #[serde(default)]
    pub pageviews: Option<u64>,
}

/// A song as listed by search and artist-song endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SongSummary {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub url: String,
    pub primary_artist: ArtistRef,
    #[serde(default)]
    pub featured_artists: Vec<ArtistRef>,
    #[serde(default)]
    pub release_date_for_display: Option<String>,
    #[serde(default)]
    pub stats: SongStats,
}

/// One page of an artist's song listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SongPage {
    pub songs: Vec<SongSummary>,
    #[serde(default)]
    pub next_page: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AlbumRef {
    pub name: String,
}

/// Full song details; only the album is used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SongDetail {
    #[serde(default)]
    pub album: Option<AlbumRef>,
}

/// Operations the download step needs from a lyrics source.
#[async_trait]
pub trait LyricsProvider: Send + Sync {
    /// Search hits for a free-text query.
    async fn search_songs(&self, query: &str) -> Result<Vec<SongSummary>>;

    /// One page (1-based) of an artist's songs, most popular first.
    async fn artist_songs(&self, artist_id: u64, page: u32) -> Result<SongPage>;

    async fn song(&self, song_id: u64) -> Result<SongDetail>;

    /// Raw lyrics text, or `None` when the song has no lyrics.
    async fn lyrics(&self, song: &SongSummary) -> Result<Option<String>>;
}

/// Pick the artist for a name: the first hit whose primary artist matches
/// case-insensitively, else the first hit's primary artist.
pub fn pick_artist(hits: &[SongSummary], name: &str) -> Option<ArtistRef> {
    let wanted = name.to_lowercase();
    hits.iter()
        .find(|h| h.primary_artist.name.to_lowercase() == wanted)
        .or_else(|| hits.first())
        .map(|h| h.primary_artist.clone())
}

/// Walk an artist's listing until `max_songs` songs with that artist as
/// primary artist are collected or the listing runs out.
pub async fn collect_top_songs(
    provider: &dyn LyricsProvider,
    artist_id: u64,
    max_songs: usize,
) -> Result<Vec<SongSummary>> {
    let mut songs = Vec::new();
    let mut page = Some(1u32);

    while let Some(n) = page {
        if songs.len() >= max_songs {
            break;
        }
        let listing = provider.artist_songs(artist_id, n).await?;
        for song in listing.songs {
            if song.primary_artist.id != artist_id {
                continue;
            }
            songs.push(song);
            if songs.len() >= max_songs {
                break;
            }
        }
        page = listing.next_page;
    }
    Ok(songs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(id: u64, artist: &str) -> SongSummary {
        SongSummary {
            id,
            title: format!("song {id}"),
            url: String::new(),
            primary_artist: ArtistRef {
                id: id * 10,
                name: artist.to_string(),
            },
            featured_artists: Vec::new(),
            release_date_for_display: None,
            stats: SongStats::default(),
        }
    }

    #[test]
    fn test_pick_artist_prefers_exact_name() {
        let hits = vec![hit(1, "Adele Tribute Band"), hit(2, "ADELE")];
        assert_eq!(pick_artist(&hits, "adele").unwrap().id, 20);
    }

    #[test]
    fn test_pick_artist_falls_back_to_first_hit() {
        let hits = vec![hit(1, "Someone Else"), hit(2, "Another")];
        assert_eq!(pick_artist(&hits, "adele").unwrap().id, 10);
        assert!(pick_artist(&[], "adele").is_none());
    }

    #[test]
    fn test_song_summary_deserializes_sparse_json() {
        let song: SongSummary = serde_json::from_str(
            r#"{"id": 7, "title": "Hello", "primary_artist": {"id": 1, "name": "Adele"}}"#,
        )
        .unwrap();
        assert_eq!(song.stats.pageviews, None);
        assert!(song.featured_artists.is_empty());
    }
}
