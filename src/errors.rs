use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("missing value for argument: {flag}")]
    MissingValue { flag: String },
    #[error("invalid value for {flag}={value}: {reason}")]
    InvalidValue {
        flag: String,
        value: String,
        reason: String,
    },
    #[error("unsupported argument: {arg}")]
    UnsupportedArgument { arg: String },
    #[error("parse error: {message}")]
    ParseError { message: String },
    /// `--help` or `--version` was requested; `text` is what clap rendered.
    #[error("{text}")]
    DisplayRequested { text: String },
    #[error("could not determine the home directory; pass --home")]
    HomeDirUnavailable,
    #[error("required tool not found in PATH: {tool}")]
    ToolNotFound { tool: String },
    #[error("{step} failed (exit: {code:?}) running: {command}. See log for details.")]
    StageExecution {
        step: String,
        command: String,
        code: Option<i32>,
    },
    #[error("failed to initialize logging: {message}")]
    Logging { message: String },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
