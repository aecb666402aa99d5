use crate::{
    commands::{OutputArgs, QueryArgs},
    env::EnvManager,
    error::CliError,
};
use clap::Parser;
use commands::Commands;
use connectors::{
    api::{cache::CachedSource, client::ApiSession, source::{FileSource, SearchSource}},
    file::csv::writer::export_csv,
    retry::RetryPolicy,
};
use engine_config::settings::AppConfig;
use engine_processing::{
    facets::{facet_by_name, facets_to_table},
    search::SearchResultPipeline,
};
use model::records::record_set::RecordSet;
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;
mod env;
mod error;
mod output;

#[derive(Parser)]
#[command(name = "jobscope", version, about = "Job-offer search normalizer")]
struct Cli {
    #[arg(long, global = true, help = "Config file path (JSON)")]
    config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Log at debug level")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    // Initialize logger
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Search {
            query,
            output,
            env_file,
        } => search(&config, query, output, env_file).await?,
        Commands::Normalize { input, output } => {
            let raw = FileSource::new(&input).load().await?;
            normalize(&config, &raw, &output)?;
        }
        Commands::Facets {
            input,
            name,
            output,
        } => facets(&config, &input, name.as_deref(), output.as_deref()).await?,
        Commands::Config { output } => {
            let json = config.to_json()?;
            match output {
                Some(path) => tokio::fs::write(path, json).await?,
                None => println!("{json}"),
            }
        }
    }

    Ok(())
}

/// Explicit `--config`, else `~/.jobscope/config.json` when present, else defaults.
fn load_config(path: Option<&Path>) -> Result<AppConfig, CliError> {
    if let Some(path) = path {
        return Ok(AppConfig::load(path)?);
    }

    match dirs::home_dir().map(|home| home.join(".jobscope").join("config.json")) {
        Some(path) if path.is_file() => Ok(AppConfig::load(&path)?),
        _ => Ok(AppConfig::default()),
    }
}

fn pipeline_for(config: &AppConfig, threshold: Option<f64>) -> Result<SearchResultPipeline, CliError> {
    let settings = config
        .pipeline
        .clone()
        .with_threshold(threshold.or(config.pipeline.missing_threshold))?;
    Ok(SearchResultPipeline::from_settings(&settings))
}

async fn search(
    config: &AppConfig,
    query: QueryArgs,
    output: OutputArgs,
    env_file: Option<PathBuf>,
) -> Result<(), CliError> {
    let params = query.into_params()?;
    let pipeline = pipeline_for(config, output.threshold)?;

    let mut env = EnvManager::new();
    env.load_default_files()?;
    if let Some(path) = env_file {
        env.load_from_file(path)?;
    }

    let session = ApiSession::new(config.api.clone(), env.credentials()?)?;
    let source = CachedSource::new(session, config.api.cache_ttl());
    let policy = RetryPolicy::for_search(config.api.max_attempts);

    let result = policy
        .run(|| source.search(&params), RetryPolicy::classify_api)
        .await;
    source.logout().await;
    let raw = result.map_err(|e| CliError::Api(e.into_inner()))?;

    info!("Search answered, running the pipeline");
    normalize_with(&pipeline, &raw, &output)
}

fn normalize(config: &AppConfig, raw: &JsonValue, output: &OutputArgs) -> Result<(), CliError> {
    let pipeline = pipeline_for(config, output.threshold)?;
    normalize_with(&pipeline, raw, output)
}

fn normalize_with(
    pipeline: &SearchResultPipeline,
    raw: &JsonValue,
    output: &OutputArgs,
) -> Result<(), CliError> {
    let outcome = pipeline.run(raw)?;
    output::emit(&outcome, output.output.as_deref(), output.report.as_deref())
}

async fn facets(
    config: &AppConfig,
    input: &Path,
    name: Option<&str>,
    output: Option<&Path>,
) -> Result<(), CliError> {
    let raw = FileSource::new(input).load().await?;
    let records = RecordSet::from_response(&raw, &config.pipeline.id_field)?;

    let selected = match name {
        Some(name) => vec![
            facet_by_name(records.facets(), name)
                .cloned()
                .ok_or_else(|| CliError::UnknownFacet(name.to_string()))?,
        ],
        None => records.facets().to_vec(),
    };

    match output {
        Some(path) => {
            export_csv(&facets_to_table(&selected)?, path)?;
            println!("Facets exported to {}", path.display());
        }
        None => output::print_facets(&selected),
    }
    Ok(())
}
