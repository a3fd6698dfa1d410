pub mod align;
pub mod cli;
pub mod errors;
pub mod logging;
pub mod pipeline;
pub mod progress;
pub mod runner;
pub mod samples;
pub mod trim;
pub mod workspace;

use cli::PipelineConfig;
use errors::Result;
use runner::ProcessRunner;
use std::path::PathBuf;
use tracing::{error, info};
use workspace::Workspace;

/// A prepared run: directories exist and the session log is installed.
#[derive(Debug, Clone)]
pub struct Session {
    pub config: PipelineConfig,
    pub workspace: Workspace,
    pub log_file: PathBuf,
}

/// Creates the workspace and installs logging. Errors from here happen before
/// any log sink exists, so the caller has to report them itself.
pub fn start_session(config: PipelineConfig) -> Result<Session> {
    let workspace = config.workspace()?;
    workspace.ensure()?;

    let log_file = logging::session_log_path(&workspace.log_dir)?;
    logging::init_tracing(&log_file)?;
    info!(log = %log_file.display(), "session log");

    Ok(Session {
        config,
        workspace,
        log_file,
    })
}

/// Runs both stages with real child processes. A failure is logged as
/// critical before it is returned.
pub fn run_session(session: &Session) -> Result<()> {
    match pipeline::run(&session.config, &session.workspace, &mut ProcessRunner) {
        Ok(_) => Ok(()),
        Err(err) => {
            error!("Pipeline terminated due to a critical error: {err}");
            Err(err)
        }
    }
}
