use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use std::path::Path;

pub mod config;
pub mod models;
pub mod ranking;
pub mod readme;
pub mod render;
pub mod spotify;
pub mod supabase;

use config::{Config, Source};

/// One full update cycle: fetch from the configured source, aggregate,
/// render, and rewrite the README section. The README is only touched once
/// everything before it succeeded.
pub async fn run(config: &Config) -> Result<()> {
    let section = match config.source {
        Source::Supabase => run_supabase(config).await?,
        Source::Spotify => run_spotify(config).await?,
    };

    readme::update(Path::new(&config.readme_path), &section)
}

/// Windowed-log variant: pull the trailing window from the play log and rank
/// it locally.
async fn run_supabase(config: &Config) -> Result<String> {
    let credentials = config
        .supabase
        .clone()
        .context("supabase credentials missing")?;
    let client = supabase::SupabaseClient::new(credentials);

    let events = client.fetch_recent_plays(config.window_days).await?;

    let ranked = ranking::rank_tracks(
        &events,
        Utc::now(),
        Duration::days(config.window_days),
        config.top_limit,
    );
    let stats = ranking::activity_stats(&events);

    tracing::info!(
        "ranked {} tracks from {} plays",
        ranked.len(),
        events.len()
    );

    Ok(render::windowed_section(
        &events,
        &ranked,
        &stats,
        config.window_days,
    ))
}

/// Direct-API variant: one call for the most recent play, one for the
/// long-term top tracks. Ranking is the service's, passed through for
/// display.
async fn run_spotify(config: &Config) -> Result<String> {
    let credentials = config
        .spotify
        .clone()
        .context("spotify credentials missing")?;
    let mut client = spotify::SpotifyClient::new(credentials);

    client.refresh_access_token().await?;

    let recent = client.recently_played(1).await?;
    let top = client.top_tracks(config.top_limit).await?;

    tracing::info!(
        "fetched {} recent plays and {} top tracks",
        recent.len(),
        top.len()
    );

    Ok(render::service_section(recent.first(), &top))
}
