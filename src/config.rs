use anyhow::{bail, Context, Result};
use std::env;

const DEFAULT_WINDOW_DAYS: i64 = 7;
const DEFAULT_TOP_LIMIT: usize = 3;

/// Which data-source adapter this deployment uses. The two designs are not
/// composable: the windowed log is ranked locally, the direct API variant
/// displays the service-side ranking as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Supabase,
    Spotify,
}

#[derive(Debug, Clone)]
pub struct SupabaseCredentials {
    pub url: String,
    pub key: String,
}

#[derive(Debug, Clone)]
pub struct SpotifyCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

/// Per-run configuration, read from the environment once at startup and
/// passed down explicitly. Nothing here outlives the run.
#[derive(Debug, Clone)]
pub struct Config {
    pub source: Source,
    pub window_days: i64,
    pub top_limit: usize,
    pub readme_path: String,
    pub supabase: Option<SupabaseCredentials>,
    pub spotify: Option<SpotifyCredentials>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let source = match env::var("ACTIVITY_SOURCE").as_deref() {
            Ok("spotify") => Source::Spotify,
            Ok("supabase") | Err(_) => Source::Supabase,
            Ok(other) => bail!("unknown ACTIVITY_SOURCE: {}", other),
        };

        let window_days = parse_var("ACTIVITY_WINDOW_DAYS", DEFAULT_WINDOW_DAYS)?;
        if window_days <= 0 {
            bail!("ACTIVITY_WINDOW_DAYS must be positive, got {}", window_days);
        }
        let top_limit = parse_var("ACTIVITY_TOP_LIMIT", DEFAULT_TOP_LIMIT)?;

        let readme_path = env::var("README_PATH").unwrap_or_else(|_| "README.md".to_string());

        let supabase = match (env::var("SUPABASE_URL"), env::var("SUPABASE_KEY")) {
            (Ok(url), Ok(key)) => Some(SupabaseCredentials { url, key }),
            _ => None,
        };

        let spotify = match (
            env::var("SPOTIFY_CLIENT_ID"),
            env::var("SPOTIFY_CLIENT_SECRET"),
            env::var("SPOTIFY_REFRESH_TOKEN"),
        ) {
            (Ok(client_id), Ok(client_secret), Ok(refresh_token)) => Some(SpotifyCredentials {
                client_id,
                client_secret,
                refresh_token,
            }),
            _ => None,
        };

        let config = Config {
            source,
            window_days,
            top_limit,
            readme_path,
            supabase,
            spotify,
        };
        config.check_credentials()?;

        Ok(config)
    }

    fn check_credentials(&self) -> Result<()> {
        match self.source {
            Source::Supabase if self.supabase.is_none() => {
                bail!("SUPABASE_URL and SUPABASE_KEY must be set for the supabase source")
            }
            Source::Spotify if self.spotify.is_none() => {
                bail!(
                    "SPOTIFY_CLIENT_ID, SPOTIFY_CLIENT_SECRET and SPOTIFY_REFRESH_TOKEN \
                     must be set for the spotify source"
                )
            }
            _ => Ok(()),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("invalid {}: {}", name, raw)),
        Err(_) => Ok(default),
    }
}
