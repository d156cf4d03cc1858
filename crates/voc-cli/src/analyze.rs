use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::sync::mpsc;
use voc_analysis::{
    AnalysisOutcome, AnalyticsBackend, Analyzer, ElasticBackend, FileBackend, ProgressEvent,
    ProgressReporter,
};
use voc_core::AppConfig;

/// Runs one analysis. Progress lines go to stderr and the result to stdout as JSON.
///
/// # Errors
///
/// Returns an error if the reviews file cannot be loaded or the Elastic client
/// cannot be built.
pub(crate) async fn run_analyze(
    config: &AppConfig,
    product: &str,
    from_file: Option<&Path>,
    issues_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    let outcome = if let Some(path) = from_file {
        let mut backend = FileBackend::load(path, Utc::now()).await?;
        if let Some(dir) = issues_dir {
            backend = backend.with_issues_dir(dir);
        }
        let analyzer = Analyzer::new(Some(backend), config.thresholds.clone());
        analyze_with_progress(&analyzer, product, &mut std::io::stderr()).await?
    } else {
        let backend = config
            .elastic
            .as_ref()
            .map(ElasticBackend::new)
            .transpose()?;
        let analyzer = Analyzer::new(backend, config.thresholds.clone());
        analyze_with_progress(&analyzer, product, &mut std::io::stderr()).await?
    };

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

pub(crate) async fn analyze_with_progress<B: AnalyticsBackend, W: Write>(
    analyzer: &Analyzer<B>,
    product: &str,
    out: &mut W,
) -> anyhow::Result<AnalysisOutcome> {
    let (tx, mut rx) = mpsc::channel::<ProgressEvent>(16);

    let run = async move {
        let mut progress = ProgressReporter::channel(tx);
        analyzer.analyze(product, &mut progress).await
    };
    let print = async move {
        while let Some(event) = rx.recv().await {
            writeln!(
                out,
                "[{}/{}] {}: {}",
                event.index, event.total, event.label, event.detail
            )?;
        }
        Ok::<(), std::io::Error>(())
    };

    let (outcome, printed) = tokio::join!(run, print);
    printed?;
    Ok(outcome?)
}
