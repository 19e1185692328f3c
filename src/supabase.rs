use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::config::SupabaseCredentials;
use crate::models::PlayEvent;

const LOG_TABLE: &str = "spotify_logs";

/// Raw PostgREST row. Everything is optional so a malformed row deserializes
/// instead of failing the whole batch; validation happens in `into_event`.
#[derive(Debug, Deserialize)]
struct LogRow {
    track_id: Option<String>,
    track_name: Option<String>,
    artist_name: Option<String>,
    album_name: Option<String>,
    played_at: Option<DateTime<Utc>>,
    duration_ms: Option<i64>,
    popularity: Option<i32>,
    external_urls: Option<ExternalUrls>,
}

#[derive(Debug, Deserialize)]
struct ExternalUrls {
    spotify: Option<String>,
}

impl LogRow {
    /// `track_id` and `played_at` are required downstream (grouping key and
    /// window/tie-break); rows missing either are dropped here.
    fn into_event(self) -> Option<PlayEvent> {
        let track_id = self.track_id?;
        let played_at = self.played_at?;

        Some(PlayEvent {
            track_id,
            track_name: self.track_name.unwrap_or_else(|| "Unknown Track".to_string()),
            artist_name: self
                .artist_name
                .unwrap_or_else(|| "Unknown Artist".to_string()),
            album_name: self.album_name.unwrap_or_default(),
            played_at,
            duration_ms: self.duration_ms,
            popularity: self.popularity,
            external_url: self.external_urls.and_then(|u| u.spotify),
        })
    }
}

pub struct SupabaseClient {
    http: Client,
    credentials: SupabaseCredentials,
}

impl SupabaseClient {
    pub fn new(credentials: SupabaseCredentials) -> Self {
        Self {
            http: Client::new(),
            credentials,
        }
    }

    /// Fetch play-log rows from the trailing window, newest first. Rows that
    /// fail validation are skipped with a warning rather than aborting the
    /// run.
    pub async fn fetch_recent_plays(&self, window_days: i64) -> Result<Vec<PlayEvent>> {
        let since = Utc::now() - Duration::days(window_days);
        let url = format!(
            "{}/rest/v1/{}",
            self.credentials.url.trim_end_matches('/'),
            LOG_TABLE
        );
        let window_filter = format!("gte.{}", since.to_rfc3339());

        let response = self
            .http
            .get(&url)
            .header("apikey", &self.credentials.key)
            .bearer_auth(&self.credentials.key)
            .query(&[
                (
                    "select",
                    "track_id,track_name,artist_name,album_name,played_at,duration_ms,popularity,external_urls",
                ),
                ("played_at", window_filter.as_str()),
                ("order", "played_at.desc"),
            ])
            .send()
            .await
            .context("failed to query supabase")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("supabase query failed: {} - {}", status, body);
        }

        let rows: Vec<LogRow> = response
            .json()
            .await
            .context("failed to decode supabase response")?;

        let total = rows.len();
        let events: Vec<PlayEvent> = rows.into_iter().filter_map(LogRow::into_event).collect();

        if events.len() < total {
            tracing::warn!(
                "skipped {} malformed rows (missing track_id or played_at)",
                total - events.len()
            );
        }
        tracing::info!("fetched {} play events from supabase", events.len());

        Ok(events)
    }
}
