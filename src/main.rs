use bio_pipeline::errors::AppError;
use mimalloc::MiMalloc;
use std::process::ExitCode;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> ExitCode {
    let prepared = bio_pipeline::cli::parse_from_env().and_then(bio_pipeline::start_session);
    let session = match prepared {
        Ok(session) => session,
        Err(AppError::DisplayRequested { text }) => {
            print!("{text}");
            return ExitCode::SUCCESS;
        }
        Err(error) => {
            eprintln!("bio_pipeline: {error}");
            return ExitCode::from(1);
        }
    };

    // Failures past this point were already written to the console and log.
    match bio_pipeline::run_session(&session) {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::from(1),
    }
}
