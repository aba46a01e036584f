use clap::Parser;
use email_indexer::config::AppConfig;
use email_indexer::db::{self, EmailStore};
use email_indexer::ingest::IngestPipeline;
use email_indexer::search::SearchClient;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "email-indexer",
    about = "Ingest a plain-text email corpus into Postgres and ZincSearch, then serve it"
)]
struct Cli {
    /// Corpus root directory; overrides BASE_DIR.
    #[arg(long, value_name = "PATH")]
    base_dir: Option<PathBuf>,

    /// Start the query server without ingesting.
    #[arg(long, conflicts_with = "ingest_only")]
    skip_ingest: bool,

    /// Exit after ingestion instead of starting the query server.
    #[arg(long)]
    ingest_only: bool,
}

#[rocket::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    email_indexer::init_logger();

    let config = AppConfig::load(cli.base_dir).inspect_err(|err| {
        log::error!("invalid configuration: {}", err);
    })?;
    let search = SearchClient::new(config.search.clone())?;

    if !cli.skip_ingest {
        let pool = db::connect(&config.database).await.inspect_err(|err| {
            log::error!("failed to connect to the database: {}", err);
        })?;

        let pipeline = IngestPipeline::new(EmailStore::new(pool.clone()), search.clone(), config.ingest);
        let report = pipeline.ingest(&config.base_dir).await.inspect_err(|err| {
            log::error!("ingestion aborted: {}", err);
        })?;
        report.log_summary();
        pool.close().await;
    }

    if cli.ingest_only {
        return Ok(());
    }

    log::info!("starting query server");
    email_indexer::rocket(&config.database, search)?
        .launch()
        .await?;
    Ok(())
}
