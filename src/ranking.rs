use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

use crate::models::{ActivityStats, PlayEvent, RankedTrack};

/// Rank plays over a trailing window.
///
/// Filters `events` to those played within `[now - window, now]`, groups by
/// `track_id`, counts plays per group, and returns at most `limit` entries
/// ordered by play count descending. Ties break on the representative's
/// `played_at` descending (most recently played wins), then `track_id`
/// ascending so the ordering is total and repeated runs on identical input
/// produce identical output.
///
/// Pure transformation: no I/O, empty input yields empty output.
pub fn rank_tracks(
    events: &[PlayEvent],
    now: DateTime<Utc>,
    window: Duration,
    limit: usize,
) -> Vec<RankedTrack> {
    let cutoff = now - window;

    let mut groups: HashMap<&str, RankedTrack> = HashMap::new();
    for event in events {
        if event.played_at < cutoff || event.played_at > now {
            continue;
        }

        groups
            .entry(event.track_id.as_str())
            .and_modify(|entry| {
                entry.play_count += 1;
                // Keep the most recent instance as the display record.
                if event.played_at > entry.track.played_at {
                    entry.track = event.clone();
                }
            })
            .or_insert_with(|| RankedTrack {
                track: event.clone(),
                play_count: 1,
            });
    }

    let mut ranked: Vec<RankedTrack> = groups.into_values().collect();
    ranked.sort_by(|a, b| {
        b.play_count
            .cmp(&a.play_count)
            .then(b.track.played_at.cmp(&a.track.played_at))
            .then(a.track.track_id.cmp(&b.track.track_id))
    });
    ranked.truncate(limit);

    ranked
}

/// Summary numbers over a batch of in-window events.
pub fn activity_stats(events: &[PlayEvent]) -> ActivityStats {
    let mut track_ids: Vec<&str> = events.iter().map(|e| e.track_id.as_str()).collect();
    track_ids.sort_unstable();
    track_ids.dedup();

    let mut artists: Vec<&str> = events.iter().map(|e| e.artist_name.as_str()).collect();
    artists.sort_unstable();
    artists.dedup();

    let total_ms: i64 = events.iter().filter_map(|e| e.duration_ms).sum();

    let popularities: Vec<i32> = events.iter().filter_map(|e| e.popularity).collect();
    let avg_popularity = if popularities.is_empty() {
        None
    } else {
        Some(popularities.iter().map(|&p| p as f64).sum::<f64>() / popularities.len() as f64)
    };

    ActivityStats {
        total_plays: events.len() as u32,
        unique_tracks: track_ids.len() as u32,
        unique_artists: artists.len() as u32,
        total_hours: total_ms as f64 / (1000.0 * 3600.0),
        avg_popularity,
    }
}
