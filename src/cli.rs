use crate::align::AlignSettings;
use crate::errors::{AppError, Result};
use crate::trim::TrimSettings;
use crate::workspace::{DATA_DIR_NAME, Workspace, home_dir};
use clap::error::ErrorKind;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Trim paired-end FASTQ reads with Trimmomatic, then align them with bwa-mem2.
#[derive(Debug, Clone, Parser)]
#[command(name = "bio_pipeline", version)]
struct CliArgs {
    /// Root for `.bio_pipeline/` and `bio_data/` (defaults to $HOME).
    #[arg(long = "home")]
    home: Option<PathBuf>,
    /// Data directory holding `fastq/` and `reference/`.
    #[arg(long = "data-dir")]
    data_dir: Option<PathBuf>,
    /// Reference genome (defaults to <data-dir>/reference/reference.fasta).
    #[arg(long = "reference")]
    reference: Option<PathBuf>,
    #[arg(short = 't', long = "threads", default_value = "4")]
    threads: String,
    #[arg(long = "trimmomatic", default_value = "trimmomatic")]
    trimmomatic: String,
    #[arg(long = "java", default_value = "java")]
    java: String,
    #[arg(long = "aligner", default_value = "bwa-mem2")]
    aligner: String,
    #[arg(long = "progress", action = ArgAction::SetTrue)]
    progress: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PipelineConfig {
    pub home: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub reference: Option<PathBuf>,
    pub trim: TrimSettings,
    pub align: AlignSettings,
}

impl PipelineConfig {
    pub fn workspace(&self) -> Result<Workspace> {
        let home = home_dir(self.home.clone())?;
        let data_dir = self
            .data_dir
            .clone()
            .unwrap_or_else(|| home.join(DATA_DIR_NAME));
        Ok(Workspace::new(&home, data_dir, self.reference.clone()))
    }
}

pub fn parse_from_env() -> Result<PipelineConfig> {
    parse_args(std::env::args())
}

pub fn parse_args<I, S>(args: I) -> Result<PipelineConfig>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut tokens: Vec<String> = args.into_iter().map(Into::into).collect();
    if tokens.is_empty() {
        tokens.push("bio_pipeline".to_string());
    }

    let cli = CliArgs::try_parse_from(tokens).map_err(map_clap_error)?;

    Ok(PipelineConfig {
        home: cli.home,
        data_dir: cli.data_dir,
        reference: cli.reference,
        trim: TrimSettings {
            trimmomatic: cli.trimmomatic,
            java: cli.java,
            threads: parse_threads("--threads", &cli.threads)?,
            progress: cli.progress,
            ..TrimSettings::default()
        },
        align: AlignSettings {
            aligner: cli.aligner,
            progress: cli.progress,
            ..AlignSettings::default()
        },
    })
}

fn map_clap_error(error: clap::Error) -> AppError {
    let kind = error.kind();
    let rendered = error.to_string();
    match kind {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            AppError::DisplayRequested { text: rendered }
        }
        ErrorKind::UnknownArgument => AppError::UnsupportedArgument {
            arg: first_quoted_token(&rendered).unwrap_or(rendered),
        },
        ErrorKind::TooFewValues | ErrorKind::WrongNumberOfValues => AppError::MissingValue {
            flag: first_quoted_token(&rendered).unwrap_or_else(|| "argument".to_string()),
        },
        _ => AppError::ParseError {
            message: clap_error_message(&rendered),
        },
    }
}

fn first_quoted_token(message: &str) -> Option<String> {
    let start = message.find('\'')?;
    let end = message[start + 1..].find('\'')?;
    Some(message[start + 1..start + 1 + end].to_string())
}

fn clap_error_message(message: &str) -> String {
    message
        .lines()
        .find_map(|line| line.strip_prefix("error: "))
        .or_else(|| message.lines().next())
        .unwrap_or("failed to parse arguments")
        .to_string()
}

fn parse_threads(flag: &str, value: &str) -> Result<usize> {
    match value.parse::<usize>() {
        Ok(threads) if threads > 0 => Ok(threads),
        _ => Err(AppError::InvalidValue {
            flag: flag.to_string(),
            value: value.to_string(),
            reason: "must be a positive integer".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::parse_args;
    use crate::errors::AppError;
    use std::path::{Path, PathBuf};

    #[test]
    fn defaults_match_fixed_pipeline() {
        let config = parse_args(["bio_pipeline"]).expect("expected parse success");

        assert_eq!(config.trim.trimmomatic, "trimmomatic");
        assert_eq!(config.trim.java, "java");
        assert_eq!(config.trim.threads, 4);
        assert_eq!(config.align.aligner, "bwa-mem2");
        assert!(!config.trim.progress);
        assert!(config.home.is_none());
    }

    #[test]
    fn overrides_tools_and_layout() {
        let config = parse_args([
            "bio_pipeline",
            "--home",
            "/scratch/me",
            "--data-dir",
            "/data/run7",
            "--reference",
            "/refs/hg38.fa",
            "-t",
            "8",
            "--aligner",
            "/opt/bwa-mem2/bwa-mem2",
            "--progress",
        ])
        .expect("expected parse success");

        assert_eq!(config.trim.threads, 8);
        assert_eq!(config.align.aligner, "/opt/bwa-mem2/bwa-mem2");
        assert!(config.align.progress);

        let workspace = config.workspace().expect("expected workspace");
        assert_eq!(workspace.log_dir, Path::new("/scratch/me/.bio_pipeline/logs"));
        assert_eq!(workspace.fastq_dir, Path::new("/data/run7/fastq"));
        assert_eq!(workspace.reference_genome, PathBuf::from("/refs/hg38.fa"));
    }

    #[test]
    fn home_override_places_data_under_it() {
        let config = parse_args(["bio_pipeline", "--home", "/h"]).expect("expected parse success");
        let workspace = config.workspace().expect("expected workspace");

        assert_eq!(
            workspace.reference_genome,
            Path::new("/h/bio_data/reference/reference.fasta")
        );
    }

    #[test]
    fn rejects_zero_threads() {
        let result = parse_args(["bio_pipeline", "--threads", "0"]);
        assert!(matches!(result, Err(AppError::InvalidValue { .. })));
    }

    #[test]
    fn help_is_returned_instead_of_exiting() {
        match parse_args(["bio_pipeline", "--help"]) {
            Err(AppError::DisplayRequested { text }) => {
                assert!(text.contains("--threads"));
                assert!(text.contains("--reference"));
            }
            other => panic!("expected DisplayRequested, got {other:?}"),
        }
        assert!(matches!(
            parse_args(["bio_pipeline", "--version"]),
            Err(AppError::DisplayRequested { .. })
        ));
    }

    #[test]
    fn rejects_unknown_flag() {
        let result = parse_args(["bio_pipeline", "--parallel", "4"]);
        assert!(matches!(result, Err(AppError::UnsupportedArgument { .. })));
    }
}
