use crate::models::{ActivityStats, PlayEvent, RankedTrack, TopTrack};

/// Shown between the markers when a run finds nothing to display.
pub const EMPTY_PLACEHOLDER: &str = "🎵 No recent listening activity";

/// Markdown link to the track page when one is known, plain bold title
/// otherwise.
fn track_label(name: &str, url: Option<&str>) -> String {
    match url {
        Some(url) => format!("[**{}**]({})", name, url),
        None => format!("**{}**", name),
    }
}

/// `m:ss` from milliseconds, like the service shows track lengths.
fn format_duration(duration_ms: i64) -> String {
    let minutes = duration_ms / 60_000;
    let seconds = (duration_ms % 60_000) / 1000;
    format!("{}:{:02}", minutes, seconds)
}

/// The "last played" card at the top of the section.
pub fn now_playing_card(event: &PlayEvent) -> String {
    let mut line = format!(
        "🎧 Last played: {} — {}",
        track_label(&event.track_name, event.external_url.as_deref()),
        event.artist_name
    );
    if !event.album_name.is_empty() {
        line.push_str(&format!(" - *{}*", event.album_name));
    }
    line.push_str(&format!(
        " ({})",
        event.played_at.format("%Y-%m-%d %H:%M UTC")
    ));
    if let Some(duration_ms) = event.duration_ms {
        line.push_str(&format!(" [{}]", format_duration(duration_ms)));
    }
    if let Some(popularity) = event.popularity.filter(|&p| p > 0) {
        line.push_str(&format!(" ⭐{}", popularity));
    }
    line
}

/// Table of locally ranked tracks for the windowed-log variant.
pub fn ranked_table(ranked: &[RankedTrack], window_days: i64) -> String {
    let mut lines = vec![
        format!("### 🏆 Top tracks (last {} days)", window_days),
        String::new(),
        "| # | Track | Artist | Plays |".to_string(),
        "|---|-------|--------|-------|".to_string(),
    ];
    for (i, entry) in ranked.iter().enumerate() {
        lines.push(format!(
            "| {} | {} | {} | {} |",
            i + 1,
            track_label(&entry.track.track_name, entry.track.external_url.as_deref()),
            entry.track.artist_name,
            entry.play_count
        ));
    }
    lines.join("\n")
}

/// Table of service-ranked tracks for the direct-API variant. Order comes
/// from the service and is kept as-is.
pub fn top_tracks_table(tracks: &[TopTrack]) -> String {
    let mut lines = vec![
        "### 🏆 All-time top tracks".to_string(),
        String::new(),
        "| # | Track | Artist | Popularity |".to_string(),
        "|---|-------|--------|------------|".to_string(),
    ];
    for (i, track) in tracks.iter().enumerate() {
        lines.push(format!(
            "| {} | {} | {} | {} |",
            i + 1,
            track_label(&track.track_name, track.external_url.as_deref()),
            track.artist_name,
            track
                .popularity
                .map(|p| p.to_string())
                .unwrap_or_else(|| "-".to_string())
        ));
    }
    lines.join("\n")
}

/// Stats footer for the windowed-log variant.
pub fn stats_footer(stats: &ActivityStats) -> String {
    let mut lines = vec![
        "### 📊 This week in numbers".to_string(),
        String::new(),
        format!("- **Plays**: {}", stats.total_plays),
        format!("- **Unique tracks**: {}", stats.unique_tracks),
        format!("- **Unique artists**: {}", stats.unique_artists),
        format!("- **Listening time**: {:.1}h", stats.total_hours),
    ];
    if let Some(avg) = stats.avg_popularity {
        lines.push(format!("- **Average popularity**: {:.1}", avg));
    }
    lines.join("\n")
}

/// Full section body for the windowed-log variant.
pub fn windowed_section(
    events: &[PlayEvent],
    ranked: &[RankedTrack],
    stats: &ActivityStats,
    window_days: i64,
) -> String {
    if events.is_empty() {
        return EMPTY_PLACEHOLDER.to_string();
    }

    let mut blocks = vec!["## 🎵 Recent Music Activity".to_string()];
    if let Some(latest) = events.iter().max_by_key(|e| e.played_at) {
        blocks.push(now_playing_card(latest));
    }
    if !ranked.is_empty() {
        blocks.push(ranked_table(ranked, window_days));
    }
    blocks.push(stats_footer(stats));
    blocks.join("\n\n")
}

/// Full section body for the direct-API variant.
pub fn service_section(latest: Option<&PlayEvent>, top: &[TopTrack]) -> String {
    if latest.is_none() && top.is_empty() {
        return EMPTY_PLACEHOLDER.to_string();
    }

    let mut blocks = vec!["## 🎵 Recent Music Activity".to_string()];
    if let Some(event) = latest {
        blocks.push(now_playing_card(event));
    }
    if !top.is_empty() {
        blocks.push(top_tracks_table(top));
    }
    blocks.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn event() -> PlayEvent {
        PlayEvent {
            track_id: "abc".to_string(),
            track_name: "Song".to_string(),
            artist_name: "Artist".to_string(),
            album_name: "Album".to_string(),
            played_at: Utc.with_ymd_and_hms(2025, 6, 1, 10, 30, 0).unwrap(),
            duration_ms: Some(192_000),
            popularity: Some(64),
            external_url: Some("https://open.spotify.com/track/abc".to_string()),
        }
    }

    #[test]
    fn duration_formats_as_minutes_seconds() {
        assert_eq!(format_duration(192_000), "3:12");
        assert_eq!(format_duration(59_999), "0:59");
        assert_eq!(format_duration(600_000), "10:00");
    }

    #[test]
    fn card_links_and_annotates() {
        let card = now_playing_card(&event());

        assert!(card.contains("[**Song**](https://open.spotify.com/track/abc)"));
        assert!(card.contains("Artist"));
        assert!(card.contains("*Album*"));
        assert!(card.contains("[3:12]"));
        assert!(card.contains("⭐64"));
        assert!(card.contains("2025-06-01 10:30 UTC"));
    }

    #[test]
    fn card_without_url_is_plain_bold() {
        let mut e = event();
        e.external_url = None;
        e.popularity = None;

        let card = now_playing_card(&e);
        assert!(card.contains("**Song**"));
        assert!(!card.contains("]("));
        assert!(!card.contains('⭐'));
    }

    #[test]
    fn ranked_table_has_one_row_per_entry() {
        let ranked = vec![
            RankedTrack {
                track: event(),
                play_count: 5,
            },
            RankedTrack {
                track: event(),
                play_count: 3,
            },
        ];

        let table = ranked_table(&ranked, 7);
        assert!(table.contains("last 7 days"));
        assert!(table.contains("| 1 |"));
        assert!(table.contains("| 5 |"));
        assert!(table.contains("| 2 |"));
        assert!(table.contains("| 3 |"));
    }

    #[test]
    fn empty_events_render_placeholder() {
        let section = windowed_section(&[], &[], &ActivityStats::default(), 7);
        assert_eq!(section, EMPTY_PLACEHOLDER);
    }

    #[test]
    fn windowed_section_stacks_blocks() {
        let events = vec![event()];
        let ranked = vec![RankedTrack {
            track: event(),
            play_count: 1,
        }];
        let stats = ActivityStats {
            total_plays: 1,
            unique_tracks: 1,
            unique_artists: 1,
            total_hours: 0.05,
            avg_popularity: Some(64.0),
        };

        let section = windowed_section(&events, &ranked, &stats, 7);
        assert!(section.starts_with("## 🎵 Recent Music Activity"));
        assert!(section.contains("🎧 Last played"));
        assert!(section.contains("### 🏆 Top tracks"));
        assert!(section.contains("### 📊 This week in numbers"));
    }

    #[test]
    fn service_section_without_data_is_placeholder() {
        assert_eq!(service_section(None, &[]), EMPTY_PLACEHOLDER);
    }

    #[test]
    fn service_table_shows_missing_popularity_as_dash() {
        let top = vec![TopTrack {
            track_name: "Song".to_string(),
            artist_name: "Artist".to_string(),
            album_name: "Album".to_string(),
            popularity: None,
            external_url: None,
        }];

        let table = top_tracks_table(&top);
        assert!(table.contains("| - |"));
    }
}
