use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use reqwest::Client;
use tracing::info;

use cuaca::{
    BmkgScraper, CardRenderer, CuacaConfig, ExtractionPolicy, GotenbergRenderer, Horizon,
    HtmlRenderer, NominatimClient, OpenMeteoClient, PipelineOptions, WeatherPipeline,
    api::AppState,
    http, telemetry,
    telegram::{Telegram, WeatherBot},
    web,
};

/// Weather lookups for Indonesian places and BMKG pages
#[derive(Parser)]
#[command(name = "cuaca")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, env = "CUACA_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP API and static files
    Serve {
        /// Listen port (overrides configuration)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Run the Telegram bot
    Bot,

    /// Resolve one query and print the result as JSON
    Lookup {
        /// Place name, address or BMKG page URL
        query: String,

        /// Forecast days (1-14)
        #[arg(short, long)]
        days: Option<String>,
    },
}

/// Collaborators shared by every surface
struct Components {
    client: Client,
    renderer: Option<Arc<dyn HtmlRenderer>>,
}

impl Components {
    fn new(config: &CuacaConfig) -> Result<Self> {
        let client = http::build_client(&config.http)?;
        let renderer = config.render.gotenberg_url.as_ref().map(|url| {
            Arc::new(GotenbergRenderer::new(
                client.clone(),
                url.clone(),
                Duration::from_secs(u64::from(config.render.timeout_seconds)),
            )) as Arc<dyn HtmlRenderer>
        });
        Ok(Self { client, renderer })
    }

    fn pipeline(
        &self,
        config: &CuacaConfig,
        screenshot_fallback: bool,
        raster_fallback: bool,
    ) -> WeatherPipeline {
        WeatherPipeline::new(
            Arc::new(NominatimClient::new(
                self.client.clone(),
                config.geocoding.base_url.clone(),
            )),
            Arc::new(OpenMeteoClient::new(
                self.client.clone(),
                config.weather.base_url.clone(),
            )),
            Arc::new(BmkgScraper::new(
                self.client.clone(),
                config.bmkg.base_origin.clone(),
                ExtractionPolicy { raster_fallback },
            )),
            self.renderer.clone(),
            PipelineOptions {
                authority_host: config.bmkg.host_fragment.clone(),
                screenshot_fallback,
            },
        )
    }

    fn cards(&self) -> CardRenderer {
        CardRenderer::new(self.renderer.clone())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config =
        CuacaConfig::load_from_path(cli.config.clone()).context("Failed to load configuration")?;
    if let Commands::Serve { port: Some(port) } = &cli.command {
        config.server.port = *port;
    }

    let _telemetry = telemetry::init(&config.logging, cli.verbose)?;
    let components = Components::new(&config)?;
    if components.renderer.is_none() {
        info!("No renderer configured; card and screenshot features are disabled");
    }

    match cli.command {
        Commands::Serve { .. } => {
            let server = &config.server;
            let state = AppState {
                pipeline: components.pipeline(
                    &config,
                    server.screenshot_fallback,
                    server.raster_fallback,
                ),
                cards: components.cards(),
                client: components.client.clone(),
            };
            web::run(server, state).await
        }
        Commands::Bot => {
            let Some(token) = config.bot.secret_token() else {
                bail!("TELEGRAM_TOKEN is not set; configure bot.token or the TELEGRAM_TOKEN variable");
            };
            let telegram = Telegram::new(components.client.clone(), token, config.bot.api_url.clone());
            let pipeline = components.pipeline(
                &config,
                config.bot.screenshot_fallback,
                config.bot.raster_fallback,
            );
            WeatherBot::new(
                telegram,
                pipeline,
                components.cards(),
                u64::from(config.bot.poll_timeout_seconds),
            )
            .run()
            .await
        }
        Commands::Lookup { query, days } => {
            let pipeline = components.pipeline(
                &config,
                config.server.screenshot_fallback,
                config.server.raster_fallback,
            );
            let result = pipeline
                .resolve(&query, Horizon::parse(days.as_deref()))
                .await
                .with_context(|| format!("Lookup failed for '{query}'"))?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
    }
}
