//! Command-line entry point.
//!
//! Resolves the source, downloads GitHub archives into a temporary file,
//! runs the pipeline and maps the outcome to an exit code.

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use ziplinear::logging::{self, Verbosity};
use ziplinear::{
    ArchiveFetcher, Cli, GitHubClient, GitHubConfig, HttpTransport, LinearizationPipeline,
    LinearizeError, LocalFileReader, LogProgress, ProcessingStatistics, ReqwestTransport,
    ResolvedSource, SourceResolver, TransportSettings,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::initialize(cli.verbosity());

    match run(&cli).await {
        Ok(stats) if stats.has_failures() => ExitCode::from(1),
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{:#}", err);
            ExitCode::from(1)
        }
    }
}

async fn run(cli: &Cli) -> Result<ProcessingStatistics> {
    let pipeline = LinearizationPipeline::new(cli.settings())?.with_progress(LogProgress);

    let transport: Arc<dyn HttpTransport> =
        Arc::new(ReqwestTransport::new(TransportSettings::default())?);
    let config = GitHubConfig::default().with_token(cli.github_token.clone());
    let client = GitHubClient::new(transport.clone(), config.clone());

    match SourceResolver::new(&client).resolve(&cli.source).await? {
        ResolvedSource::Local(path) => {
            let output = cli.local_output(&path);
            log::info!("Processing {}", path.display());
            let stats = process_file(&pipeline, &path, &output).await?;
            report(cli, &stats, &output);
            Ok(stats)
        }
        ResolvedSource::Remote(reference) => {
            let output = cli.remote_output(&reference);
            log::info!("Processing GitHub repository {}", reference);

            // Acquired before the download so it is cleaned up on every path.
            let temp = tempfile::Builder::new()
                .prefix(&format!("{}-{}-", reference.owner, reference.repo))
                .suffix(".zip")
                .tempfile()
                .context("failed to create temporary archive file")?;

            let fetcher = ArchiveFetcher::new(transport, config);
            fetcher.fetch_to(&reference, temp.path()).await?;

            let result = process_file(&pipeline, temp.path(), &output).await;
            if cli.keep_temp {
                let (_, kept) = temp.keep().context("failed to keep temporary archive")?;
                log::info!("Downloaded archive kept at {}", kept.display());
            }

            let stats = result?;
            report(cli, &stats, &output);
            Ok(stats)
        }
    }
}

async fn process_file(
    pipeline: &LinearizationPipeline,
    archive: &Path,
    output: &Path,
) -> Result<ProcessingStatistics> {
    let reader = LocalFileReader::new(archive).map_err(|err| {
        LinearizeError::InvalidSource(format!("{}: {:#}", archive.display(), err))
    })?;
    Ok(pipeline.process(Arc::new(reader), output).await?)
}

fn report(cli: &Cli, stats: &ProcessingStatistics, output: &Path) {
    if cli.verbosity() == Verbosity::Quiet {
        return;
    }
    eprintln!("\nProcessing completed!");
    eprintln!("{}", stats);
    eprintln!("Result saved to: {}", output.display());
}
