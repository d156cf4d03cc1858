mod analyze;
mod data;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "voc-cli")]
#[command(about = "VOC Radar command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Generate synthetic reviews as a JSON file
    Generate {
        #[arg(long, default_value = "data/reviews.json")]
        output: PathBuf,
        /// Reviews per product, before the seeded complaint burst
        #[arg(long, default_value_t = voc_analysis::synthetic::DEFAULT_REVIEWS_PER_PRODUCT)]
        count: usize,
        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Create the reviews index and bulk-upload a reviews file
    Index {
        #[arg(long, default_value = "data/reviews.json")]
        input: PathBuf,
        /// Delete the index first
        #[arg(long)]
        recreate: bool,
        #[arg(long, default_value_t = 500)]
        batch_size: usize,
    },
    /// Analyze one product and print progress and results
    Analyze {
        #[arg(long)]
        product: String,
        /// Read reviews from a JSON file instead of Elasticsearch
        #[arg(long)]
        from_file: Option<PathBuf>,
        /// Where the file backend writes detected issues
        #[arg(long, requires = "from_file")]
        issues_dir: Option<PathBuf>,
    },
    /// List the product catalog
    Products,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();
    let config = voc_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Generate {
            output,
            count,
            seed,
        } => data::run_generate(&output, count, seed).await,
        Commands::Index {
            input,
            recreate,
            batch_size,
        } => data::run_index(&config, &input, recreate, batch_size).await,
        Commands::Analyze {
            product,
            from_file,
            issues_dir,
        } => analyze::run_analyze(&config, &product, from_file.as_deref(), issues_dir).await,
        Commands::Products => {
            let catalog = voc_core::load_products(&config.products_path)?;
            for product in &catalog.products {
                match &product.description {
                    Some(description) => println!("{}  {description}", product.name),
                    None => println!("{}", product.name),
                }
            }
            Ok(())
        }
    }
}
