use anyhow::Context;
use clap::{Parser, Subcommand};
use suggest_core::{
    Config, DataSource, ProviderId, SuggestReport, SuggestRequest, SuggestService,
};

use crate::server;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "suggest", version, about = "Weather-aware suggestions for nearby spots")]
pub struct Cli {
    /// Log debug output (overridden by RUST_LOG).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure credentials for a specific provider.
    Configure {
        /// Provider short name, e.g. "openweather" or "googleplaces".
        provider: String,
    },

    /// Show the current weather and the top suggestions around a point.
    Show {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lng: f64,

        /// Print the response as JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Serve the suggest API over HTTP.
    Serve {
        #[arg(long, env = "PORT", default_value_t = 8080)]
        port: u16,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { provider } => configure(&provider),
            Command::Show { lat, lng, json } => {
                let config = Config::load()?;
                let service = SuggestService::from_config(&config)?;
                let report = service.suggest_detailed(&SuggestRequest { lat, lng }).await?;

                if json {
                    println!("{}", serde_json::to_string_pretty(&report.suggestion)?);
                } else {
                    print!("{}", render_report(&report));
                }
                Ok(())
            }
            Command::Serve { port } => {
                let config = Config::load()?;
                for id in ProviderId::all() {
                    if !config.is_provider_configured(*id) {
                        tracing::warn!(provider = %id, "No API key configured, serving mock data");
                    }
                }
                let service = SuggestService::from_config(&config)?;
                server::run(service, port).await
            }
        }
    }
}

fn configure(provider: &str) -> anyhow::Result<()> {
    let id = ProviderId::try_from(provider)?;
    let mut config = Config::load()?;

    let api_key = inquire::Password::new(&format!("API key for {id}:"))
        .without_confirmation()
        .with_display_mode(inquire::PasswordDisplayMode::Masked)
        .prompt()
        .context("Failed to read API key")?;

    config.upsert_provider_api_key(id, api_key.trim().to_string());
    config.save()?;

    println!(
        "Saved {id} credentials to {}",
        Config::config_file_path()?.display()
    );
    Ok(())
}

fn source_note(source: DataSource) -> &'static str {
    match source {
        DataSource::Live => "",
        DataSource::Unconfigured => " (mock data: no API key)",
        DataSource::Fallback => " (mock data: provider unavailable)",
    }
}

fn render_report(report: &SuggestReport) -> String {
    let weather = &report.suggestion.weather;
    let mut out = format!(
        "Weather: {} ({}), {:.1}°C{}\n",
        weather.main,
        weather.description,
        weather.temperature,
        source_note(report.weather_source),
    );

    if report.suggestion.suggestions.is_empty() {
        out.push_str("No spots found nearby.\n");
        return out;
    }

    out.push_str(&format!("Suggestions{}:\n", source_note(report.places_source)));
    for (i, spot) in report.suggestion.suggestions.iter().enumerate() {
        let suitability = spot
            .weather_suitability
            .map(|s| s.to_string())
            .unwrap_or_default();
        let crowd = spot.crowd_level.map(|c| c.to_string()).unwrap_or_default();

        out.push_str(&format!(
            "{}. {} [score {:.1}] rating {:.1} ({} reviews), {}, crowd {}\n",
            i + 1,
            spot.name,
            spot.score,
            spot.rating,
            spot.user_ratings_total,
            suitability,
            crowd,
        ));
    }
    out
}
