use crate::align::{self, AlignSummary};
use crate::cli::PipelineConfig;
use crate::errors::Result;
use crate::runner::CommandRunner;
use crate::trim;
use crate::workspace::Workspace;
use tracing::info;

/// Trim then align, strictly in that order. The first error stops the run.
pub fn run(
    config: &PipelineConfig,
    workspace: &Workspace,
    runner: &mut dyn CommandRunner,
) -> Result<AlignSummary> {
    info!("===================================");
    info!("Starting bioinformatics pipeline");
    info!("===================================");
    info!(
        fastq = %workspace.fastq_dir.display(),
        reference = %workspace.reference_genome.display(),
        threads = config.trim.threads,
        "starting pipeline run"
    );

    let trim_dir = trim::run(&workspace.fastq_dir, &config.trim, runner)?;
    let summary = align::run(
        &trim_dir,
        &workspace.reference_genome,
        &config.align,
        runner,
    )?;

    info!("All steps completed successfully!");
    info!("===================================");
    Ok(summary)
}
