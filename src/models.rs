use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One observed play of a track. `played_at` drives both the trailing-window
/// filter and the ranking tie-break; `track_id` is the grouping key (two
/// tracks may share a display name).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayEvent {
    pub track_id: String,
    pub track_name: String,
    pub artist_name: String,
    pub album_name: String,
    pub played_at: DateTime<Utc>,
    pub duration_ms: Option<i64>,
    pub popularity: Option<i32>,
    pub external_url: Option<String>,
}

/// Aggregation result for one track within the window. `track` is the most
/// recent instance, kept for display in case the service-side metadata
/// changed between observations.
#[derive(Debug, Clone)]
pub struct RankedTrack {
    pub track: PlayEvent,
    pub play_count: u32,
}

/// One entry of the service-side long-term ranking (direct-API variant).
/// Ordering comes from the service and is passed through for display.
#[derive(Debug, Clone)]
pub struct TopTrack {
    pub track_name: String,
    pub artist_name: String,
    pub album_name: String,
    pub popularity: Option<i32>,
    pub external_url: Option<String>,
}

/// Summary numbers over the fetched window, rendered as a footer.
#[derive(Debug, Clone, Default)]
pub struct ActivityStats {
    pub total_plays: u32,
    pub unique_tracks: u32,
    pub unique_artists: u32,
    pub total_hours: f64,
    pub avg_popularity: Option<f64>,
}
