use crate::errors::Result;
use crate::progress::StageProgress;
use crate::runner::{CommandRunner, ToolCommand, locate_tool};
use crate::samples::{Direction, RawSample, discover_raw_samples, trimmed_output_name};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const TRIMMED_DIR_NAME: &str = "trimmed";

/// Fixed Trimmomatic filter parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrimParams {
    pub window_size: u32,
    pub window_quality: u32,
    pub min_len: u32,
    pub seed_mismatches: u32,
    pub palindrome_clip: u32,
    pub simple_clip: u32,
    pub adapter_file: String,
}

impl Default for TrimParams {
    fn default() -> Self {
        Self {
            window_size: 4,
            window_quality: 20,
            min_len: 50,
            seed_mismatches: 2,
            palindrome_clip: 30,
            simple_clip: 10,
            adapter_file: "TruSeq3-PE.fa".to_string(),
        }
    }
}

impl TrimParams {
    pub fn illumina_clip(&self, adapters: &Path) -> OsString {
        let mut step = OsString::from("ILLUMINACLIP:");
        step.push(adapters.as_os_str());
        step.push(format!(
            ":{}:{}:{}",
            self.seed_mismatches, self.palindrome_clip, self.simple_clip
        ));
        step
    }

    pub fn sliding_window(&self) -> String {
        format!("SLIDINGWINDOW:{}:{}", self.window_size, self.window_quality)
    }

    pub fn min_len(&self) -> String {
        format!("MINLEN:{}", self.min_len)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrimSettings {
    pub trimmomatic: String,
    pub java: String,
    pub threads: usize,
    pub params: TrimParams,
    pub search_path: Option<OsString>,
    pub progress: bool,
}

impl Default for TrimSettings {
    fn default() -> Self {
        Self {
            trimmomatic: "trimmomatic".to_string(),
            java: "java".to_string(),
            threads: 4,
            params: TrimParams::default(),
            search_path: std::env::var_os("PATH"),
            progress: false,
        }
    }
}

/// Where the Trimmomatic jar and adapter set live, relative to the wrapper
/// script found on the search path (`<prefix>/bin/trimmomatic`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrimmomaticInstall {
    pub wrapper: PathBuf,
    pub jar: PathBuf,
    pub adapters: PathBuf,
}

impl TrimmomaticInstall {
    pub fn locate(settings: &TrimSettings) -> Result<Self> {
        let wrapper = locate_tool(&settings.trimmomatic, settings.search_path.as_deref())?;
        Ok(Self::from_wrapper(wrapper, &settings.params.adapter_file))
    }

    pub fn from_wrapper(wrapper: PathBuf, adapter_file: &str) -> Self {
        let prefix = wrapper
            .parent()
            .and_then(Path::parent)
            .unwrap_or_else(|| Path::new(""));
        let share = prefix.join("share").join("trimmomatic");
        Self {
            jar: share.join("trimmomatic.jar"),
            adapters: share.join("adapters").join(adapter_file),
            wrapper,
        }
    }
}

/// Paired-end invocation: two inputs, then paired/unpaired outputs for each
/// mate, then the clipping and quality steps.
pub fn trim_command(
    settings: &TrimSettings,
    install: &TrimmomaticInstall,
    sample: &RawSample,
    trim_dir: &Path,
) -> ToolCommand {
    let output = |direction, paired| {
        trim_dir.join(trimmed_output_name(&sample.name, direction, paired))
    };

    ToolCommand::new(&settings.java)
        .arg("-jar")
        .arg(&install.jar)
        .arg("PE")
        .arg("-threads")
        .arg(settings.threads.to_string())
        .arg(&sample.forward)
        .arg(&sample.reverse)
        .arg(output(Direction::Forward, true))
        .arg(output(Direction::Forward, false))
        .arg(output(Direction::Reverse, true))
        .arg(output(Direction::Reverse, false))
        .arg(settings.params.illumina_clip(&install.adapters))
        .arg(settings.params.sliding_window())
        .arg(settings.params.min_len())
}

/// Trims every `<sample>_1.fastq` / `<sample>_2.fastq` pair in `fastq_dir`
/// into `<fastq_dir>/trimmed`. The first failing sample aborts the stage.
pub fn run(
    fastq_dir: &Path,
    settings: &TrimSettings,
    runner: &mut dyn CommandRunner,
) -> Result<PathBuf> {
    let trim_dir = fastq_dir.join(TRIMMED_DIR_NAME);
    fs::create_dir_all(&trim_dir)?;

    let install = TrimmomaticInstall::locate(settings)?;
    info!(
        wrapper = %install.wrapper.display(),
        jar = %install.jar.display(),
        adapters = %install.adapters.display(),
        "located Trimmomatic"
    );

    let samples = discover_raw_samples(fastq_dir)?;
    if samples.is_empty() {
        warn!(dir = %fastq_dir.display(), "no *_1.fastq reads found");
    }

    let mut progress = StageProgress::new(settings.progress, "trim", samples.len());
    for sample in &samples {
        if !sample.reverse.exists() {
            warn!(
                sample = %sample.name,
                missing = %sample.reverse.display(),
                "reverse read not found; invoking Trimmomatic anyway"
            );
        }
        progress.on_sample_started(&sample.name);
        info!(sample = %sample.name, "running Trimmomatic");

        let command = trim_command(settings, &install, sample, &trim_dir);
        runner.run(&format!("Trimmomatic for sample {}", sample.name), &command)?;

        info!(sample = %sample.name, "finished trimming sample");
        progress.on_sample_done();
    }
    progress.finish();

    info!(
        samples = samples.len(),
        output = %trim_dir.display(),
        "all Trimmomatic steps completed"
    );
    Ok(trim_dir)
}
