use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use docsearch::generators::DataGenerator;
use docsearch::{AppConfig, Demo, DemoError, Dependencies};

#[derive(Parser)]
#[command(name = "docsearch")]
#[command(about = "Index, search and update documents in OpenSearch", long_about = None)]
struct Cli {
    /// JSON settings file; environment variables override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of documents generated per collection
    #[arg(long, default_value = "10", value_parser = clap::value_parser!(u64).range(1..=1000))]
    documents: u64,

    /// Exit when the run completes instead of waiting for ENTER
    #[arg(long)]
    no_wait: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json")) {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn run(cli: &Cli) -> Result<(), DemoError> {
    let config = AppConfig::load(cli.config.as_deref())?;
    let deps = Dependencies::new(config).await?;

    let mut generator = DataGenerator::new();
    let report = Demo::new(&deps)
        .run(&mut generator, cli.documents as usize)
        .await?;

    info!(
        files = report.files_inserted,
        catalog_items = report.catalog_inserted,
        exact_title_matches = report.exact_title_matches,
        any_matches = report.any_matches,
        bool_or_matches = report.bool_or_matches,
        updated_by_query = report.updated_by_query,
        point_update = ?report.point_update,
        "Run completed"
    );

    if !cli.no_wait {
        println!("Press ENTER to exit: ");
        let mut line = String::new();
        BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    if let Err(e) = run(&cli).await {
        error!(error = %e, "Run failed");
        eprintln!("Error: {}", e);

        // Print error chain for debugging
        let mut source = e.source();
        while let Some(err) = source {
            eprintln!("  Caused by: {}", err);
            source = err.source();
        }

        std::process::exit(1);
    }
}
