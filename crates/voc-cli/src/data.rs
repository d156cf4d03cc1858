//! Synthetic data generation and bulk indexing into Elasticsearch.

use std::path::Path;

use chrono::Utc;
use rand::{rngs::StdRng, SeedableRng};
use voc_analysis::synthetic::{self, DEFAULT_REVIEWS_PER_PRODUCT};
use voc_core::{AppConfig, ReviewRow};
use voc_elastic::{mappings::reviews_mapping, ElasticClient};

/// Generates reviews for every catalog product and writes them to `output`.
///
/// # Errors
///
/// Returns an error if the file or its parent directory cannot be written.
pub(crate) async fn run_generate(
    output: &Path,
    count: usize,
    seed: Option<u64>,
) -> anyhow::Result<()> {
    let reviews = write_reviews(output, count, seed).await?;
    println!("Generated {} reviews", reviews.len());
    println!("Products: {}", synthetic::PRODUCTS.join(", "));
    println!("Platforms: {}", synthetic::PLATFORMS.join(", "));
    println!("Saved to {}", output.display());
    Ok(())
}

pub(crate) async fn write_reviews(
    output: &Path,
    count: usize,
    seed: Option<u64>,
) -> anyhow::Result<Vec<ReviewRow>> {
    let mut rng = seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
    let reviews = synthetic::generate_all_reviews(&mut rng, count, Utc::now());

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(output, serde_json::to_vec_pretty(&reviews)?).await?;
    tracing::debug!(path = %output.display(), count = reviews.len(), "reviews written");
    Ok(reviews)
}

/// Uploads `input` into the configured reviews index, generating it first if
/// the file does not exist.
///
/// # Errors
///
/// Returns an error if Elasticsearch is not configured, the file is invalid,
/// or index creation fails. Individual document rejections are reported, not
/// propagated.
pub(crate) async fn run_index(
    config: &AppConfig,
    input: &Path,
    recreate: bool,
    batch_size: usize,
) -> anyhow::Result<()> {
    let settings = config.elastic.as_ref().ok_or_else(|| {
        anyhow::anyhow!("ELASTIC_BASE_URL and ELASTIC_API_KEY must be set to index reviews")
    })?;
    anyhow::ensure!(batch_size > 0, "--batch-size must be at least 1");

    let reviews: Vec<ReviewRow> = if tokio::fs::try_exists(input).await? {
        serde_json::from_slice(&tokio::fs::read(input).await?)?
    } else {
        println!("{} not found; generating reviews first", input.display());
        write_reviews(input, DEFAULT_REVIEWS_PER_PRODUCT, None).await?
    };

    let client = ElasticClient::new(settings)?;
    let index = settings.reviews_index.as_str();

    if recreate {
        client.delete_index(index).await?;
        println!("Deleted index {index}");
    }
    client.create_index(index, Some(&reviews_mapping())).await?;

    let mut indexed = 0usize;
    let mut failed = 0usize;
    for (batch_no, batch) in reviews.chunks(batch_size).enumerate() {
        let report = client.bulk_index(index, batch).await?;
        indexed += report.indexed;
        failed += report.failed;
        tracing::info!(
            batch = batch_no + 1,
            indexed = report.indexed,
            failed = report.failed,
            "batch uploaded"
        );
    }
    println!("Indexed {indexed} reviews into {index} ({failed} failed)");

    let total = client.count(index).await?;
    println!("Index {index} now holds {total} documents");
    Ok(())
}
