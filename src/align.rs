use crate::errors::Result;
use crate::progress::StageProgress;
use crate::runner::{CommandRunner, ToolCommand};
use crate::samples::{group_trimmed_pairs, list_file_names};
use std::path::Path;
use tracing::{error, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignSettings {
    pub aligner: String,
    pub output_extension: String,
    pub progress: bool,
}

impl Default for AlignSettings {
    fn default() -> Self {
        Self {
            aligner: "bwa-mem2".to_string(),
            output_extension: "sam".to_string(),
            progress: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlignSummary {
    pub aligned: Vec<String>,
    pub skipped: Vec<String>,
}

pub fn align_command(
    settings: &AlignSettings,
    reference: &Path,
    forward: &Path,
    reverse: &Path,
    output: &Path,
) -> ToolCommand {
    ToolCommand::new(&settings.aligner)
        .arg("mem")
        .arg(reference)
        .arg(forward)
        .arg(reverse)
        .stdout_to(output)
}

/// Aligns every complete `<sample>_{1,2}_paired.fastq` pair in `trim_dir`,
/// writing `<sample>.sam` next to the reads. Incomplete pairs are logged and
/// skipped; an aligner failure aborts the stage.
pub fn run(
    trim_dir: &Path,
    reference: &Path,
    settings: &AlignSettings,
    runner: &mut dyn CommandRunner,
) -> Result<AlignSummary> {
    if !reference.is_file() {
        warn!(reference = %reference.display(), "reference genome not found");
    }

    let groups = group_trimmed_pairs(list_file_names(trim_dir)?);
    let mut summary = AlignSummary::default();
    let mut progress = StageProgress::new(settings.progress, "align", groups.len());

    for (sample, pair) in &groups {
        progress.on_sample_started(sample);
        let Some((forward, reverse)) = pair.complete() else {
            error!(
                sample = %sample,
                "Missing paired trimmed files for sample {sample}. Skipping."
            );
            summary.skipped.push(sample.clone());
            progress.on_sample_done();
            continue;
        };

        let output = trim_dir.join(format!("{sample}.{}", settings.output_extension));
        let command = align_command(
            settings,
            reference,
            &trim_dir.join(forward),
            &trim_dir.join(reverse),
            &output,
        );
        runner.run(&format!("BWA alignment for sample {sample}"), &command)?;

        summary.aligned.push(sample.clone());
        progress.on_sample_done();
    }
    progress.finish();

    info!(
        aligned = summary.aligned.len(),
        skipped = summary.skipped.len(),
        "alignment stage completed"
    );
    Ok(summary)
}
