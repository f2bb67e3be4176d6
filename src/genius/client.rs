// Genius API client.
//
// Metadata comes from the authenticated REST API (`/search`,
// `/artists/{id}/songs`, `/songs/{id}`), which wraps every payload in a
// `{"meta": ..., "response": ...}` envelope. Lyrics are not in the API, so
// they are scraped from the song page's lyrics containers.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use select::document::Document;
use select::node::Node;
use select::predicate::Attr;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::retry::{with_retry, Pacer, RetryPolicy};
use super::{LyricsProvider, SongDetail, SongPage, SongSummary};

/// Per-request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Songs requested per listing page (the API maximum).
pub const PAGE_SIZE: u32 = 50;

/// Authenticated client for the Genius REST API plus song-page scraping.
pub struct GeniusClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
    pacer: Pacer,
    retry: RetryPolicy,
}

impl GeniusClient {
    /// Create a client for `base_url` (normally `https://api.genius.com`).
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("wordpool/0.1 (lyrics vocabulary datasets)")
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            pacer: Pacer::new(Duration::from_millis(250)),
            retry: RetryPolicy::default(),
        })
    }

    /// GET an API path and unwrap the `response` envelope.
    pub async fn api_get<T: DeserializeOwned>(&self, path: &str, params: &[(&str, String)]) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(path = path, "Genius API request");

        let url = &url;
        let envelope: Envelope<T> = with_retry(&self.pacer, self.retry, || async move {
            let response = self
                .client
                .get(url)
                .bearer_auth(&self.token)
                .query(params)
                .send()
                .await
                .with_context(|| format!("GET {path} failed"))?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                anyhow::bail!("GET {path} returned {status}: {body}");
            }

            response
                .json::<Envelope<T>>()
                .await
                .with_context(|| format!("Failed to deserialize {path} response"))
        })
        .await?;

        Ok(envelope.response)
    }

    async fn fetch_page(&self, url: &str) -> Result<String> {
        with_retry(&self.pacer, self.retry, || async move {
            let response = self
                .client
                .get(url)
                .send()
                .await
                .with_context(|| format!("GET {url} failed"))?;
            if !response.status().is_success() {
                let status = response.status();
                anyhow::bail!("GET {url} returned {status}");
            }
            response.text().await.context("Failed to read song page")
        })
        .await
    }
}

#[async_trait]
impl LyricsProvider for GeniusClient {
    async fn search_songs(&self, query: &str) -> Result<Vec<SongSummary>> {
        let resp: SearchResponse = self
            .api_get("/search", &[("q", query.to_string())])
            .await
            .with_context(|| format!("Search for '{query}' failed"))?;
        Ok(resp.hits.into_iter().map(|h| h.result).collect())
    }

    async fn artist_songs(&self, artist_id: u64, page: u32) -> Result<SongPage> {
        self.api_get(
            &format!("/artists/{artist_id}/songs"),
            &[
                ("sort", "popularity".to_string()),
                ("per_page", PAGE_SIZE.to_string()),
                ("page", page.to_string()),
            ],
        )
        .await
    }

    async fn song(&self, song_id: u64) -> Result<SongDetail> {
        let resp: SongResponse = self.api_get(&format!("/songs/{song_id}"), &[]).await?;
        Ok(resp.song)
    }

    async fn lyrics(&self, song: &SongSummary) -> Result<Option<String>> {
        if song.url.is_empty() {
            return Ok(None);
        }
        let html = self.fetch_page(&song.url).await?;
        let lyrics = extract_lyrics(&html);
        Ok((!lyrics.trim().is_empty()).then_some(lyrics))
    }
}

fn push_lyrics_text(node: &Node, out: &mut String) {
    if let Some(text) = node.as_text() {
        out.push_str(text);
        return;
    }
    if node.name() == Some("br") {
        out.push('\n');
        return;
    }
    // Page chrome (contributor counts, headers) inside the containers
    if node.attr("data-exclude-from-selection") == Some("true") {
        return;
    }
    for child in node.children() {
        push_lyrics_text(&child, out);
    }
}

/// Lyrics text from a song page: every `data-lyrics-container` block with
/// `<br>` turned into newlines, blocks joined by a newline.
pub fn extract_lyrics(html: &str) -> String {
    let doc = Document::from(html);
    doc.find(Attr("data-lyrics-container", "true"))
        .map(|container| {
            let mut text = String::new();
            for child in container.children() {
                push_lyrics_text(&child, &mut text);
            }
            text
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

// -- Serde types for API envelopes --

#[derive(Deserialize)]
struct Envelope<T> {
    response: T,
}

#[derive(Deserialize)]
struct SearchResponse {
    hits: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    result: SongSummary,
}

#[derive(Deserialize)]
struct SongResponse {
    song: SongDetail,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_lyrics_joins_containers() {
        let html = r#"<html><body>
            <div data-lyrics-container="true">[Verse 1]<br>Hello, it's me<br><i>I was wondering</i></div>
            <div class="ad">Buy tickets</div>
            <div data-lyrics-container="true"><div data-exclude-from-selection="true">12 Contributors</div>[Chorus]<br>Hello from the other side</div>
        </body></html>"#;
        assert_eq!(
            extract_lyrics(html),
            "[Verse 1]\nHello, it's me\nI was wondering\n[Chorus]\nHello from the other side"
        );
    }

    #[test]
    fn test_extract_lyrics_missing_container() {
        assert_eq!(extract_lyrics("<html><body><p>Nothing</p></body></html>"), "");
    }

    #[test]
    fn test_search_envelope_deserializes() {
        let json = r#"{"meta": {"status": 200}, "response": {"hits": [
            {"type": "song", "result": {"id": 1, "title": "Hello", "url": "https://genius.com/hello",
             "primary_artist": {"id": 9, "name": "Adele"}, "stats": {"pageviews": 1000}}}
        ]}}"#;
        let env: Envelope<SearchResponse> = serde_json::from_str(json).unwrap();
        assert_eq!(env.response.hits[0].result.primary_artist.name, "Adele");
        assert_eq!(env.response.hits[0].result.stats.pageviews, Some(1000));
    }
}
