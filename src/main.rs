// src/main.rs
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use search_lib::catalog::{CatalogSource, DatasetCache, PokeApiClient};
use search_lib::extraction::{build_model, FeatureExtractor};
use search_lib::history::SearchHistory;
use search_lib::matching::RankingEngine;
use search_lib::models::{MatchResult, SearchResponse};
use search_lib::search::SearchService;
use search_lib::server::{self, AppState};
use search_lib::utils::config::{CatalogConfig, HistoryConfig, ModelConfig, ServerConfig};
use search_lib::utils::env::load_env;
use search_lib::utils::get_memory_usage;
use search_lib::utils::progress_config::ProgressConfig;

#[derive(Parser)]
#[command(author, version, about = "Find creatures from free-text descriptions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search the catalog with a free-text description
    Search {
        /// Description of the creature, in any language
        query: String,

        /// Print the raw JSON response instead of a table
        #[arg(long)]
        json: bool,

        /// Do not record the top result in the local history
        #[arg(long)]
        no_history: bool,

        /// Maximum number of rows to print
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Serve the HTTP API
    Serve {
        /// Address to bind, overrides SEARCH_BIND_ADDR
        #[arg(long)]
        addr: Option<SocketAddr>,
    },
    /// Populate the catalog cache and report coverage
    Warm,
    /// Show one entity with its localized names
    Show {
        id: u32,
    },
    /// List recent top results
    History {
        /// Delete the history file
        #[arg(long)]
        clear: bool,
    },
}

struct App {
    search: Arc<SearchService>,
    profiles: Arc<PokeApiClient>,
}

fn build_app(catalog_config: &CatalogConfig, model_config: &ModelConfig, progress: &ProgressConfig) -> Result<App> {
    let client = Arc::new(PokeApiClient::new(catalog_config).context("Failed to build catalog client")?);
    let source: Arc<dyn CatalogSource> = client.clone();

    let cache = Arc::new(
        DatasetCache::new(source, catalog_config).with_progress(progress.create_multi_progress()),
    );
    let model = build_model(model_config).context("Failed to configure the generative model")?;

    let search = SearchService::new(FeatureExtractor::new(model), RankingEngine::new(cache));
    Ok(App {
        search: Arc::new(search),
        profiles: client,
    })
}

fn print_results(results: &[MatchResult], limit: usize) {
    if results.is_empty() {
        println!("No matching creatures found.");
        return;
    }
    println!("{:>4}  {:<20} {:>10}  {}", "ID", "NAME", "CONFIDENCE", "WHY");
    for result in results.iter().take(limit) {
        println!(
            "{:>4}  {:<20} {:>10.2}  {}",
            result.entity.id, result.entity.name, result.confidence, result.reason
        );
    }
    if results.len() > limit {
        println!("... and {} more", results.len() - limit);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    load_env();
    env_logger::init();

    let cli = Cli::parse();

    let catalog_config = CatalogConfig::from_env();
    catalog_config.log_config();
    let progress_config = ProgressConfig::from_env();

    match cli.command {
        Command::Search {
            query,
            json,
            no_history,
            limit,
        } => {
            let model_config = ModelConfig::from_env();
            model_config.log_config();
            let app = build_app(&catalog_config, &model_config, &progress_config)?;

            let outcome = app.search.clone().search_guarded(query).await;
            let results = match outcome {
                Ok(results) => results,
                Err(e) => {
                    if json {
                        println!("{}", serde_json::to_string_pretty(&SearchResponse::failed(e.user_message()))?);
                    }
                    return Err(e).context("Search failed");
                }
            };

            if !no_history {
                if let Some(top) = results.first() {
                    let history_config = HistoryConfig::from_env();
                    if let Err(e) = SearchHistory::new(&history_config).record(top) {
                        warn!("⚠️  Could not record search history: {:#}", e);
                    }
                }
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&SearchResponse::ok(results))?);
            } else {
                print_results(&results, limit);
            }
        }
        Command::Serve { addr } => {
            let model_config = ModelConfig::from_env();
            model_config.log_config();
            let mut server_config = ServerConfig::from_env();
            if let Some(addr) = addr {
                server_config.bind_addr = addr;
            }
            server_config.log_config();

            let app = build_app(&catalog_config, &model_config, &ProgressConfig {
                enabled: false,
                ..progress_config
            })?;
            let state = Arc::new(AppState {
                search: app.search,
                profiles: app.profiles,
            });
            server::serve(state, server_config.bind_addr, server_config.warm_on_start).await?;
        }
        Command::Warm => {
            let client = Arc::new(PokeApiClient::new(&catalog_config).context("Failed to build catalog client")?);
            let cache = DatasetCache::new(client, &catalog_config)
                .with_progress(progress_config.create_multi_progress());

            let start = Instant::now();
            let catalog = cache.ensure_ready().await.context("Catalog warm-up failed")?;
            println!(
                "Cached {} entities in {:.1}s",
                catalog.len(),
                start.elapsed().as_secs_f32()
            );
            if progress_config.should_show_memory() {
                info!("💾 Memory in use after warm-up: {} MB", get_memory_usage().await);
            }
        }
        Command::Show { id } => {
            let client = PokeApiClient::new(&catalog_config).context("Failed to build catalog client")?;
            let profile = client.fetch_profile(id).await?;
            println!("{}", serde_json::to_string_pretty(&profile)?);
        }
        Command::History { clear } => {
            let history_config = HistoryConfig::from_env();
            history_config.log_config();
            let history = SearchHistory::new(&history_config);

            if clear {
                history.clear()?;
                println!("History cleared.");
                return Ok(());
            }

            let entries = history.load()?;
            if entries.is_empty() {
                println!("No search history yet.");
            }
            for entry in entries {
                println!(
                    "{}  #{:<4} {:<20} {:.2}  {}",
                    entry.recorded_at.format("%Y-%m-%d %H:%M"),
                    entry.entity.id,
                    entry.entity.name,
                    entry.confidence,
                    entry.reason
                );
            }
        }
    }

    Ok(())
}
