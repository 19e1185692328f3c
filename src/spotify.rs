use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::config::SpotifyCredentials;
use crate::models::{PlayEvent, TopTrack};

const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const API_BASE: &str = "https://api.spotify.com/v1";

/// Scopes the updater needs: recently-played for the now-playing card,
/// top-read for the long-term ranking.
pub const REQUIRED_SCOPES: [&str; 2] = ["user-read-recently-played", "user-top-read"];

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RecentlyPlayedResponse {
    items: Vec<PlayItem>,
}

#[derive(Debug, Deserialize)]
struct PlayItem {
    track: Track,
    played_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct TopTracksResponse {
    items: Vec<Track>,
}

#[derive(Debug, Deserialize)]
struct Track {
    id: Option<String>,
    name: String,
    artists: Vec<Artist>,
    album: Album,
    duration_ms: Option<i64>,
    popularity: Option<i32>,
    external_urls: ExternalUrls,
}

#[derive(Debug, Deserialize)]
struct Artist {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Album {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ExternalUrls {
    spotify: Option<String>,
}

impl Track {
    fn artist_names(&self) -> String {
        self.artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn basic_auth(client_id: &str, client_secret: &str) -> String {
    let auth = format!("{}:{}", client_id, client_secret);
    base64::Engine::encode(&base64::engine::general_purpose::STANDARD, auth.as_bytes())
}

pub struct SpotifyClient {
    http: Client,
    credentials: SpotifyCredentials,
    access_token: Option<String>,
}

impl SpotifyClient {
    pub fn new(credentials: SpotifyCredentials) -> Self {
        Self {
            http: Client::new(),
            credentials,
            access_token: None,
        }
    }

    /// Exchange the stored refresh token for a short-lived access token.
    /// A non-success response here means bad credentials and aborts the run.
    pub async fn refresh_access_token(&mut self) -> Result<()> {
        let encoded = basic_auth(&self.credentials.client_id, &self.credentials.client_secret);

        let response = self
            .http
            .post(TOKEN_URL)
            .header("Authorization", format!("Basic {}", encoded))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", self.credentials.refresh_token.as_str()),
            ])
            .send()
            .await
            .context("token refresh request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("token refresh rejected: {} - {}", status, body);
        }

        let token: TokenResponse = response
            .json()
            .await
            .context("failed to decode token response")?;
        self.access_token = Some(token.access_token);

        Ok(())
    }

    fn token(&self) -> Result<&str> {
        self.access_token
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("no access token, call refresh_access_token first"))
    }

    /// Most recent plays, newest first. Items without a track id or timestamp
    /// are skipped with a warning.
    pub async fn recently_played(&self, limit: usize) -> Result<Vec<PlayEvent>> {
        let response = self
            .http
            .get(format!("{}/me/player/recently-played", API_BASE))
            .bearer_auth(self.token()?)
            .query(&[("limit", limit.to_string())])
            .send()
            .await
            .context("recently-played request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("recently-played fetch failed: {} - {}", status, body);
        }

        let recent: RecentlyPlayedResponse = response
            .json()
            .await
            .context("failed to decode recently-played response")?;

        let mut events = Vec::with_capacity(recent.items.len());
        for item in recent.items {
            let (Some(id), Some(played_at)) = (item.track.id.clone(), item.played_at) else {
                tracing::warn!("skipping play item without track id or timestamp");
                continue;
            };
            events.push(PlayEvent {
                track_id: id,
                track_name: item.track.name.clone(),
                artist_name: item.track.artist_names(),
                album_name: item.track.album.name.clone(),
                played_at,
                duration_ms: item.track.duration_ms,
                popularity: item.track.popularity,
                external_url: item.track.external_urls.spotify,
            });
        }

        tracing::info!("fetched {} recent plays", events.len());
        Ok(events)
    }

    /// Long-term top tracks as ranked by the service. The order is preserved
    /// as-is for display; no local re-ranking.
    pub async fn top_tracks(&self, limit: usize) -> Result<Vec<TopTrack>> {
        let response = self
            .http
            .get(format!("{}/me/top/tracks", API_BASE))
            .bearer_auth(self.token()?)
            .query(&[
                ("time_range", "long_term".to_string()),
                ("limit", limit.to_string()),
            ])
            .send()
            .await
            .context("top-tracks request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("top-tracks fetch failed: {} - {}", status, body);
        }

        let top: TopTracksResponse = response
            .json()
            .await
            .context("failed to decode top-tracks response")?;

        let tracks = top
            .items
            .into_iter()
            .map(|track| TopTrack {
                track_name: track.name.clone(),
                artist_name: track.artist_names(),
                album_name: track.album.name.clone(),
                popularity: track.popularity,
                external_url: track.external_urls.spotify,
            })
            .collect::<Vec<_>>();

        tracing::info!("fetched {} top tracks", tracks.len());
        Ok(tracks)
    }
}

/// Build the user-facing authorization URL for the token helper.
pub fn authorize_url(client_id: &str, redirect_uri: &str) -> Result<String> {
    let url = reqwest::Url::parse_with_params(
        "https://accounts.spotify.com/authorize",
        &[
            ("client_id", client_id),
            ("response_type", "code"),
            ("redirect_uri", redirect_uri),
            ("scope", &REQUIRED_SCOPES.join(" ")),
            ("show_dialog", "true"),
        ],
    )?;
    Ok(url.to_string())
}

/// Pull the `code` query parameter out of the redirect URL the user pastes in.
pub fn extract_code(redirect_url: &str) -> Result<String> {
    let url = reqwest::Url::parse(redirect_url).context("could not parse redirect URL")?;
    url.query_pairs()
        .find(|(key, _)| key == "code")
        .map(|(_, value)| value.into_owned())
        .ok_or_else(|| anyhow::anyhow!("no code parameter in redirect URL"))
}

/// Authorization-code exchange used by the token helper binary.
pub async fn exchange_code(
    client_id: &str,
    client_secret: &str,
    code: &str,
    redirect_uri: &str,
) -> Result<TokenResponse> {
    let client = Client::new();
    let encoded = basic_auth(client_id, client_secret);

    let response = client
        .post(TOKEN_URL)
        .header("Authorization", format!("Basic {}", encoded))
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
        ])
        .send()
        .await
        .context("token exchange request failed")?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        anyhow::bail!("token exchange rejected: {} - {}", status, body);
    }

    response
        .json()
        .await
        .context("failed to decode token response")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorize_url_carries_scopes() {
        let url = authorize_url("client123", "http://localhost:8888/callback").unwrap();

        assert!(url.starts_with("https://accounts.spotify.com/authorize?"));
        assert!(url.contains("client_id=client123"));
        assert!(url.contains("user-read-recently-played"));
        assert!(url.contains("user-top-read"));
    }

    #[test]
    fn extract_code_from_redirect() {
        let code =
            extract_code("http://localhost:8888/callback?code=AQBx123&state=xyz").unwrap();
        assert_eq!(code, "AQBx123");
    }

    #[test]
    fn extract_code_missing_is_an_error() {
        assert!(extract_code("http://localhost:8888/callback?error=denied").is_err());
    }

    #[test]
    fn recently_played_items_decode() {
        let recent: RecentlyPlayedResponse = serde_json::from_value(serde_json::json!({
            "items": [{
                "track": {
                    "id": "abc",
                    "name": "Song",
                    "artists": [{ "name": "A" }, { "name": "B" }],
                    "album": { "name": "Album" },
                    "duration_ms": 200000,
                    "popularity": 55,
                    "external_urls": { "spotify": "https://open.spotify.com/track/abc" }
                },
                "played_at": "2025-06-01T10:00:00Z"
            }]
        }))
        .unwrap();

        assert_eq!(recent.items.len(), 1);
        assert_eq!(recent.items[0].track.artist_names(), "A, B");
    }
}
