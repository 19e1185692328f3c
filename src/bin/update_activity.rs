use anyhow::Result;
use clap::Parser;
use spotify_activity::config::Config;

/// Rewrites the marked activity section of the profile README from recent
/// listening data. Configuration comes from the environment; runs to
/// completion and exits, leaving scheduling to the caller.
#[derive(Parser)]
#[command(name = "update-activity")]
#[command(about = "Update the README music-activity section", long_about = None)]
struct Cli {}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter("update_activity=info,spotify_activity=info")
        .init();

    let Cli {} = Cli::parse();

    let config = Config::from_env()?;
    tracing::info!(
        "starting update (source: {:?}, window: {} days, limit: {})",
        config.source,
        config.window_days,
        config.top_limit
    );

    spotify_activity::run(&config).await?;

    tracing::info!("update complete");
    Ok(())
}
