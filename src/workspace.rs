use crate::errors::{AppError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const STATE_DIR_NAME: &str = ".bio_pipeline";
pub const LOG_DIR_NAME: &str = "logs";
pub const DATA_DIR_NAME: &str = "bio_data";
pub const FASTQ_DIR_NAME: &str = "fastq";
pub const REFERENCE_DIR_NAME: &str = "reference";
pub const REFERENCE_FILE_NAME: &str = "reference.fasta";

/// Fixed directory layout of a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    pub state_dir: PathBuf,
    pub log_dir: PathBuf,
    pub data_dir: PathBuf,
    pub fastq_dir: PathBuf,
    pub reference_dir: PathBuf,
    pub reference_genome: PathBuf,
}

impl Workspace {
    /// Default layout rooted at `home`.
    pub fn under_home(home: &Path) -> Self {
        Self::new(home, home.join(DATA_DIR_NAME), None)
    }

    pub fn new(home: &Path, data_dir: PathBuf, reference_genome: Option<PathBuf>) -> Self {
        let state_dir = home.join(STATE_DIR_NAME);
        let fastq_dir = data_dir.join(FASTQ_DIR_NAME);
        let reference_dir = data_dir.join(REFERENCE_DIR_NAME);
        let reference_genome =
            reference_genome.unwrap_or_else(|| reference_dir.join(REFERENCE_FILE_NAME));
        Self {
            log_dir: state_dir.join(LOG_DIR_NAME),
            state_dir,
            data_dir,
            fastq_dir,
            reference_dir,
            reference_genome,
        }
    }

    /// Creates every missing directory of the layout. Existing directories
    /// and their contents are left alone.
    pub fn ensure(&self) -> Result<()> {
        for dir in [
            &self.state_dir,
            &self.log_dir,
            &self.data_dir,
            &self.fastq_dir,
            &self.reference_dir,
        ] {
            fs::create_dir_all(dir)?;
            debug!(dir = %dir.display(), "directory ready");
        }
        Ok(())
    }
}

pub fn home_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
    explicit
        .or_else(dirs::home_dir)
        .ok_or(AppError::HomeDirUnavailable)
}
