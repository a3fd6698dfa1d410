use crate::errors::{AppError, Result};
use std::ffi::{OsStr, OsString};
use std::fmt::Write as _;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{error, info};

/// A single external tool invocation: program, argument vector and an
/// optional file that receives the child's stdout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: OsString,
    pub args: Vec<OsString>,
    pub stdout: Option<PathBuf>,
}

impl ToolCommand {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            stdout: None,
        }
    }

    pub fn arg(mut self, value: impl Into<OsString>) -> Self {
        self.args.push(value.into());
        self
    }

    pub fn args<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(values.into_iter().map(Into::into));
        self
    }

    pub fn stdout_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdout = Some(path.into());
        self
    }

    /// Renders the invocation as a copy-pasteable shell line, for logs only.
    pub fn render(&self) -> String {
        let mut rendered = shell_quote(&self.program);
        for arg in &self.args {
            rendered.push(' ');
            rendered.push_str(&shell_quote(arg));
        }
        if let Some(path) = &self.stdout {
            let _ = write!(rendered, " > {}", shell_quote(path.as_os_str()));
        }
        rendered
    }
}

fn shell_quote(value: &OsStr) -> String {
    let text = value.to_string_lossy();
    let plain = !text.is_empty()
        && text
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=+,@%".contains(c));
    if plain {
        text.into_owned()
    } else {
        format!("'{}'", text.replace('\'', r"'\''"))
    }
}

pub trait CommandRunner {
    /// Runs `command` to completion under the human-readable label `step`.
    fn run(&mut self, step: &str, command: &ToolCommand) -> Result<()>;
}

/// Runs commands as real child processes, one at a time.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&mut self, step: &str, command: &ToolCommand) -> Result<()> {
        let rendered = command.render();
        info!(step = %step, "starting step");
        info!(command = %rendered, "command");

        let mut process = Command::new(&command.program);
        process.args(&command.args);
        if let Some(path) = &command.stdout {
            process.stdout(Stdio::from(File::create(path)?));
        }

        let status = process.status().map_err(|err| {
            error!(step = %step, error = %err, "failed to launch command");
            if err.kind() == std::io::ErrorKind::NotFound {
                AppError::ToolNotFound {
                    tool: command.program.to_string_lossy().into_owned(),
                }
            } else {
                AppError::Io(err)
            }
        })?;

        if !status.success() {
            error!(step = %step, code = ?status.code(), "step failed");
            error!("{rendered}: {status}");
            return Err(AppError::StageExecution {
                step: step.to_string(),
                command: rendered,
                code: status.code(),
            });
        }

        info!(step = %step, "completed successfully");
        Ok(())
    }
}

/// Resolves `tool` to an executable path. A name containing a path
/// separator is checked as given; a bare name is searched for in each
/// directory of `search_path`.
pub fn locate_tool(tool: &str, search_path: Option<&OsStr>) -> Result<PathBuf> {
    let candidate = Path::new(tool);
    let found = if candidate.components().count() > 1 {
        is_executable(candidate).then(|| candidate.to_path_buf())
    } else {
        search_path.and_then(|paths| {
            std::env::split_paths(paths)
                .map(|dir| dir.join(tool))
                .find(|full| is_executable(full))
        })
    };

    found.ok_or_else(|| AppError::ToolNotFound {
        tool: tool.to_string(),
    })
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .is_ok_and(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}


#[cfg(test)]
mod tests {
    use super::testing::with_captured_logs;
    use super::{CommandRunner, ProcessRunner, ToolCommand, locate_tool};
    use crate::errors::AppError;
    use std::ffi::OsStr;

    #[test]
    fn renders_arguments_with_quoting_and_redirect() {
        let command = ToolCommand::new("bwa-mem2")
            .args(["mem", "/ref/genome.fa", "/reads/my sample_1.fastq"])
            .stdout_to("/out/s.sam");

        assert_eq!(
            command.render(),
            "bwa-mem2 mem /ref/genome.fa '/reads/my sample_1.fastq' > /out/s.sam"
        );
    }

    #[test]
    fn missing_tool_is_reported_by_name() {
        let dir = tempfile::tempdir().expect("expected tempdir");
        let result = locate_tool("no_such_trimmer", Some(dir.path().as_os_str()));

        match result {
            Err(AppError::ToolNotFound { tool }) => assert_eq!(tool, "no_such_trimmer"),
            other => panic!("expected ToolNotFound, got {other:?}"),
        }
        assert!(locate_tool("no_such_trimmer", None).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn locates_executable_on_search_path() {
        use std::os::unix::fs::PermissionsExt;

        let first = tempfile::tempdir().expect("expected tempdir");
        let second = tempfile::tempdir().expect("expected tempdir");
        let not_executable = first.path().join("tool");
        std::fs::write(&not_executable, "").expect("expected write");
        let executable = second.path().join("tool");
        std::fs::write(&executable, "#!/bin/sh\n").expect("expected write");
        std::fs::set_permissions(&executable, std::fs::Permissions::from_mode(0o755))
            .expect("expected chmod");

        let search = std::env::join_paths([first.path(), second.path()]).expect("expected join");
        let found = locate_tool("tool", Some(search.as_os_str())).expect("expected tool");
        assert_eq!(found, executable);

        let explicit = executable.to_string_lossy().into_owned();
        assert_eq!(
            locate_tool(&explicit, Some(OsStr::new(""))).expect("expected tool"),
            executable
        );
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_becomes_stage_execution_error() {
        let command = ToolCommand::new("sh").args(["-c", "exit 3"]);
        let (result, logs) =
            with_captured_logs(|| ProcessRunner.run("Trimmomatic for sample s1", &command));

        match result {
            Err(AppError::StageExecution { step, code, .. }) => {
                assert_eq!(step, "Trimmomatic for sample s1");
                assert_eq!(code, Some(3));
            }
            other => panic!("expected StageExecution, got {other:?}"),
        }
        assert!(logs.contains("starting step"));
        assert!(logs.contains("sh -c 'exit 3'"));
        assert!(logs.contains("ERROR"));
    }

    #[cfg(unix)]
    #[test]
    fn redirects_stdout_to_file() {
        let dir = tempfile::tempdir().expect("expected tempdir");
        let out = dir.path().join("s.sam");
        let command = ToolCommand::new("sh")
            .args(["-c", "echo aligned"])
            .stdout_to(&out);

        ProcessRunner
            .run("BWA alignment for sample s", &command)
            .expect("expected success");
        let content = std::fs::read_to_string(&out).expect("expected output");
        assert_eq!(content, "aligned\n");
    }

    #[test]
    fn unknown_program_maps_to_tool_not_found() {
        let command = ToolCommand::new("definitely_missing_aligner_binary");
        let result = ProcessRunner.run("alignment", &command);
        assert!(matches!(result, Err(AppError::ToolNotFound { .. })));
    }
}
