use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use ai_client::OpenAi;
use bgg_client::BggClient;
use firecrawl_client::FirecrawlClient;
use gameshelf_common::{Config, ImportOptions, ImportRequest};
use gameshelf_import::extractor::GameFieldExtractor;
use gameshelf_import::store::PgCatalogStore;
use gameshelf_import::{BatchImporter, ImportDeps};

#[derive(Parser)]
#[command(name = "gameshelf-import", about = "Bulk-import board games into the catalog")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import from a CSV file with a title column
    Csv {
        file: PathBuf,
        #[command(flatten)]
        batch: BatchArgs,
    },
    /// Import a BoardGameGeek user's owned collection
    Collection {
        username: String,
        #[command(flatten)]
        batch: BatchArgs,
    },
    /// Import BoardGameGeek game links
    Links {
        #[arg(required = true)]
        urls: Vec<String>,
        #[command(flatten)]
        batch: BatchArgs,
    },
    /// Apply database migrations
    Migrate,
}

#[derive(Args)]
struct BatchArgs {
    /// Enrich each game from its BoardGameGeek page
    #[arg(long)]
    enrich: bool,
    /// JSON file of default options applied to every created game
    #[arg(long)]
    options: Option<PathBuf>,
    /// Require this user to hold the admin role
    #[arg(long)]
    as_user: Option<Uuid>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the batch result.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("gameshelf=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = Config::from_env()?;
    config.log_redacted();

    let store = Arc::new(PgCatalogStore::connect(&config.database_url).await?);

    let (request, batch) = match cli.command {
        Command::Migrate => {
            store.migrate().await?;
            info!("Migrations applied");
            return Ok(());
        }
        Command::Csv { file, batch } => {
            let data = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            (ImportRequest::csv(data), batch)
        }
        Command::Collection { username, batch } => (ImportRequest::collection(username), batch),
        Command::Links { urls, batch } => (ImportRequest::links(urls), batch),
    };

    let options = match &batch.options {
        Some(path) => load_options(path)?,
        None => ImportOptions::default(),
    };
    let request = request.with_enrichment(batch.enrich).with_options(options);

    let importer = BatchImporter::new(build_deps(&config, store)?);

    let result = match batch.as_user {
        Some(caller) => importer.run_as(caller, &request).await?,
        None => importer.run(&request).await?,
    };

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn build_deps(config: &Config, store: Arc<PgCatalogStore>) -> Result<ImportDeps> {
    let bgg = Arc::new(BggClient::new()?.with_base_url(&config.bgg_base_url));

    let mut deps = ImportDeps::builder()
        .store(store.clone())
        .collection(bgg.clone())
        .search(bgg)
        .access(store)
        .bgg_base_url(config.bgg_base_url.clone())
        .collection_max_attempts(config.collection_max_attempts)
        .collection_backoff(Duration::from_millis(config.collection_backoff_ms))
        .enrichment_pacing(Duration::from_millis(config.enrichment_pacing_ms))
        .build();

    if let (Some(firecrawl_key), Some(gateway_key)) =
        (&config.firecrawl_api_key, &config.ai_gateway_api_key)
    {
        let ai = OpenAi::new(gateway_key.clone(), config.extraction_model.clone())
            .with_base_url(config.ai_gateway_url.clone());
        deps.scraper = Some(Arc::new(FirecrawlClient::new(firecrawl_key.clone())?));
        deps.extractor = Some(Arc::new(
            GameFieldExtractor::new(ai).with_max_chars(config.enrichment_max_chars),
        ));
    }

    Ok(deps)
}

fn load_options(path: &Path) -> Result<ImportOptions> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid options JSON in {}", path.display()))
}
