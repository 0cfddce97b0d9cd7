//! jobscout: search several job boards at once
//!
//! This is the main entry point for the application.

use anyhow::Result;
use clap::{Parser, Subcommand};
use jobscout::{
    config::{self, Settings},
    network::HttpClient,
    proxy::ProxyPool,
    results::{write_csv, SearchSummary},
    search::{Aggregator, SearchRequest},
    sources::{SourceLoader, SourceRegistry},
    web::{create_router, AppState},
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// jobscout - search several job boards at once
#[derive(Parser, Debug)]
#[command(name = "jobscout")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP API
    Serve {
        /// Port to listen on (overrides settings)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Run one search and write the results to CSV
    Search {
        /// Job role or title, e.g. "Software Engineer"
        #[arg(short, long)]
        role: Option<String>,

        /// Location, e.g. "Bangalore, India"
        #[arg(short, long)]
        location: Option<String>,

        /// Job sites to search (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        sources: Vec<String>,

        /// Results per site
        #[arg(long)]
        results: Option<u32>,

        /// Only jobs posted within this many hours
        #[arg(long)]
        hours: Option<u32>,

        /// Country passed to the job sites
        #[arg(long)]
        country: Option<String>,

        /// Do not route requests through proxies
        #[arg(long)]
        no_proxies: bool,

        /// Do not send the enriched free-text query
        #[arg(long)]
        no_auxiliary: bool,

        /// CSV output path (overrides settings)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List configured job sites
    Sources,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = config::load(cli.config.as_deref())?;
    init_logging(&settings);
    let settings = config::init(settings)?;

    match cli.command {
        Commands::Serve { port } => serve(settings, port).await,
        Commands::Search {
            role,
            location,
            sources,
            results,
            hours,
            country,
            no_proxies,
            no_auxiliary,
            output,
        } => {
            let mut request = SearchRequest::from_settings(&settings.search);
            if let Some(role) = role {
                request = request.with_role(role);
            }
            if let Some(location) = location {
                request = request.with_location(location);
            }
            if !sources.is_empty() {
                request = request.with_sources(sources);
            }
            if let Some(n) = results {
                request = request.with_results_per_source(n);
            }
            if let Some(hours) = hours {
                request = request.with_max_age_hours(hours);
            }
            if let Some(country) = country {
                request = request.with_country(country);
            }
            if no_proxies {
                request = request.with_proxies(false);
            }
            if no_auxiliary {
                request = request.with_auxiliary_query(false);
            }

            let output = output.unwrap_or_else(|| PathBuf::from(&settings.search.csv_path));
            search(settings, request, output).await
        }
        Commands::Sources => {
            let registry = load_registry(settings)?.0;
            for id in registry.ids() {
                println!(
                    "{:<12} proxies: {:?}, auxiliary query: {}",
                    id,
                    registry.proxy_policy(id),
                    registry.supports_auxiliary_query(id)
                );
            }
            Ok(())
        }
    }
}

fn init_logging(settings: &Settings) {
    let default_level = if settings.general.debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn load_registry(settings: &Settings) -> Result<(SourceRegistry, HttpClient)> {
    let client = HttpClient::with_settings(&settings.outgoing)?;
    info!("HTTP client initialized");

    let registry = SourceLoader::load(settings, &client)?;
    Ok((registry, client))
}

async fn serve(settings: &'static Settings, port: Option<u16>) -> Result<()> {
    info!("Starting jobscout v{}", jobscout::VERSION);

    let (registry, client) = load_registry(settings)?;
    let proxies = Arc::new(ProxyPool::from_settings(&settings.proxies, &client));

    let state = AppState::new(settings.clone(), registry, proxies)?;
    let app = create_router(state);

    let addr = SocketAddr::new(
        settings.server.bind_address.parse()?,
        port.unwrap_or(settings.server.port),
    );
    info!("Starting server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn search(settings: &'static Settings, request: SearchRequest, output: PathBuf) -> Result<()> {
    let (registry, client) = load_registry(settings)?;
    let proxies = Arc::new(ProxyPool::from_settings(&settings.proxies, &client));
    let aggregator = Aggregator::from_settings(settings, Arc::new(registry), proxies)?;

    let result = aggregator.aggregate(&request).await?;

    println!("{}", SearchSummary::from_result(&result));
    if write_csv(&output, &result.rows)? {
        println!("Saved {} jobs to {}", result.total(), output.display());
    }

    Ok(())
}
