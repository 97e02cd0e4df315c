//! Run dispatch: obtain a catalog, filter it, render it.

use anyhow::Context;
use dbcatalog_core::{
    Catalog, CatalogConfig, ExportOptions, OutputMode, Orchestrator, create_renderer,
    load_snapshot,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cli::Cli;
use crate::config::FileConfig;

/// Counts reported at the end of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub entries: usize,
    pub introspection_errors: usize,
    pub written: usize,
    pub write_failures: usize,
}

/// Builds the renderer options from the command line and configuration.
///
/// A template given on the command line wins over the configuration file.
pub fn export_options(cli: &Cli, config: &CatalogConfig) -> ExportOptions {
    ExportOptions {
        snapshot_path: cli.snapshot.clone(),
        xml_path: cli.xml.clone(),
        root: cli.out_dir.clone(),
        template: cli.template.clone().or_else(|| config.template.clone()),
        type_target: cli.type_target.into(),
    }
}

/// Executes one run.
///
/// # Errors
/// Returns error if the configuration is invalid, the snapshot cannot be
/// loaded, no database could be reached, or the renderer fails as a whole.
/// Per-object and per-artifact failures are logged and counted instead.
pub async fn run(cli: &Cli, cancel: &CancellationToken) -> anyhow::Result<RunSummary> {
    let config = FileConfig::load(&cli.config)
        .await?
        .into_catalog_config(cli.password.clone())
        .with_context(|| format!("invalid configuration in {}", cli.config.display()))?;

    let mut summary = RunSummary::default();

    let catalog = if cli.cached {
        info!("Reading catalog from snapshot {}", cli.snapshot.display());
        load_snapshot(&cli.snapshot)
            .await
            .with_context(|| format!("cannot use snapshot {}", cli.snapshot.display()))?
    } else {
        let (catalog, errors) = collect(&config, cancel).await?;
        summary.introspection_errors = errors;
        catalog
    };

    let catalog = catalog.filter(&config.include_tables, &config.exclude_tables);
    summary.entries = catalog.len();

    let mode = OutputMode::from(cli.output);
    info!("Rendering {} entries as {}", catalog.len(), mode);

    let renderer = create_renderer(mode, &export_options(cli, &config));
    let report = renderer
        .render(&catalog)
        .await
        .with_context(|| format!("{} export failed", mode))?;

    for failure in &report.failures {
        warn!("Not written: {}", failure);
    }
    summary.written = report.written.len();
    summary.write_failures = report.failures.len();

    info!(
        "Done: {} entries, {} introspection errors, {} files written, {} write failures",
        summary.entries, summary.introspection_errors, summary.written, summary.write_failures
    );
    Ok(summary)
}

/// Runs the live introspection. Non-fatal errors are logged and counted.
async fn collect(
    config: &CatalogConfig,
    cancel: &CancellationToken,
) -> anyhow::Result<(Catalog, usize)> {
    info!(
        "Collecting {} database(s) from {}",
        config.databases.len(),
        config.connection
    );

    let result = Orchestrator::for_connection(config.connection.clone())
        .run(config, cancel)
        .await?;

    for error in &result.errors {
        warn!("{}", error);
    }
    if cancel.is_cancelled() {
        warn!("Run was cancelled; the catalog may be incomplete");
    }

    Ok((result.catalog, result.errors.len()))
}
