use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Write};

use spotify_activity::spotify;

const DEFAULT_REDIRECT_URI: &str = "http://localhost:8888/callback";

/// Interactive helper that walks through the authorization-code flow and
/// prints a refresh token with the scopes the updater needs.
#[derive(Parser)]
#[command(name = "get-token")]
#[command(about = "Obtain a Spotify refresh token", long_about = None)]
struct Cli {
    /// Application client id (prompted for when omitted)
    #[arg(long)]
    client_id: Option<String>,

    /// Application client secret (prompted for when omitted)
    #[arg(long)]
    client_secret: Option<String>,

    /// Redirect URI registered for the application
    #[arg(long, default_value = DEFAULT_REDIRECT_URI)]
    redirect_uri: String,
}

fn prompt(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .context("failed to read input")?;
    Ok(line.trim().to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let client_id = match cli.client_id {
        Some(id) => id,
        None => prompt("Spotify client id")?,
    };
    let client_secret = match cli.client_secret {
        Some(secret) => secret,
        None => prompt("Spotify client secret")?,
    };

    let auth_url = spotify::authorize_url(&client_id, &cli.redirect_uri)?;

    println!("\nOpen this URL in a browser and approve access:\n");
    println!("{}\n", auth_url);
    println!(
        "After approving you will be redirected to {} - paste the full redirected URL below.\n",
        cli.redirect_uri
    );

    let redirect_url = prompt("Redirected URL")?;
    let code = spotify::extract_code(&redirect_url)?;

    let token = spotify::exchange_code(&client_id, &client_secret, &code, &cli.redirect_uri)
        .await
        .context("token exchange failed")?;

    let refresh_token = token
        .refresh_token
        .context("response did not include a refresh token")?;

    println!("\nRefresh token:\n");
    println!("{}", refresh_token);
    println!("\nStore it as SPOTIFY_REFRESH_TOKEN (env or repository secret).");

    if let Some(granted) = token.scope {
        let granted: Vec<&str> = granted.split_whitespace().collect();
        let missing: Vec<&str> = spotify::REQUIRED_SCOPES
            .iter()
            .copied()
            .filter(|s| !granted.contains(s))
            .collect();

        if missing.is_empty() {
            println!("\nAll required scopes granted.");
        } else {
            println!("\nWarning: missing scopes: {}", missing.join(", "));
        }
    }

    Ok(())
}
