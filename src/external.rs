use crate::command::{Command, ExecutableCommand, Status};
use crate::env::Environment;
use crate::lexer::truncate_arg;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Resolve argument 0 of `cmd` to the path of a regular file.
///
/// Behavior:
/// - `PATH` not set (or not valid UTF-8, which the environment snapshot drops):
///   fails at once, whatever the name looks like.
/// - Bare name: every non-empty segment of the colon-separated `PATH` is tried in
///   order as `segment/name`, and the first regular file wins.
/// - Name containing `/`: tested as is (relative to the environment's current
///   directory) instead of being searched.
///
/// On success argument 0 is overwritten with the resolved path, bounded by
/// `max_arg_len`. On failure `cmd` is left untouched. An empty command never resolves.
pub fn find_full_path(cmd: &mut Command, env: &Environment, max_arg_len: usize) -> bool {
    let Some(name) = cmd.program() else {
        return false;
    };

    let Some(search_paths) = env.get_var("PATH") else {
        debug!(name, "PATH is not set");
        return false;
    };

    let resolved = if name.contains('/') {
        let candidate = truncate_arg(&env.current_dir.join(name).to_string_lossy(), max_arg_len);
        is_regular_file(Path::new(&candidate)).then_some(candidate)
    } else {
        find_in_path(search_paths, name, max_arg_len)
    };

    match resolved {
        Some(path) => {
            debug!(name, %path, "resolved");
            cmd.set_program(&path, max_arg_len);
            true
        }
        None => false,
    }
}

fn find_in_path(search_paths: &str, name: &str, max_arg_len: usize) -> Option<String> {
    search_paths
        .split(':')
        .filter(|segment| !segment.is_empty())
        .map(|segment| truncate_arg(&format!("{}/{}", segment, name), max_arg_len))
        .find(|candidate| {
            trace!(%candidate, "probing");
            is_regular_file(Path::new(candidate))
        })
}

/// Follows symlinks, so a link to a regular file qualifies and a link to a
/// directory does not.
fn is_regular_file(path: &Path) -> bool {
    fs::metadata(path).is_ok_and(|meta| meta.is_file())
}

/// A program found on disk, with the arguments to pass after argument 0.
pub struct ExternalCommand {
    program: PathBuf,
    args: Vec<String>,
}

impl ExternalCommand {
    /// Build from a command whose argument 0 was already resolved.
    pub fn new(cmd: &Command) -> Self {
        Self {
            program: PathBuf::from(cmd.program().unwrap_or_default()),
            args: cmd.args().to_vec(),
        }
    }
}

impl ExecutableCommand for ExternalCommand {
    /// Spawn the program and block until it terminates.
    ///
    /// The child gets the environment snapshot and the current directory and
    /// inherits the standard streams. A child that exited on its own is a
    /// success whatever its exit code; one that was killed is an error.
    fn execute(
        self: Box<Self>,
        _stderr: &mut dyn std::io::Write,
        env: &mut Environment,
    ) -> Result<Status> {
        let mut child = std::process::Command::new(&self.program)
            .args(&self.args)
            .env_clear()
            .envs(env.vars.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .current_dir(&env.current_dir)
            .spawn()
            .with_context(|| format!("{}: cannot execute", self.program.display()))?;
        debug!(pid = child.id(), program = %self.program.display(), "spawned");

        let exit_status = child
            .wait()
            .with_context(|| format!("{}: wait failed", self.program.display()))?;
        match exit_status.code() {
            Some(code) => {
                debug!(code, "child exited");
                Ok(Status::Success)
            }
            None => {
                #[cfg(unix)]
                {
                    use std::os::unix::process::ExitStatusExt;
                    debug!(
                        signal = ?exit_status.signal(),
                        core_dumped = exit_status.core_dumped(),
                        "child terminated abnormally"
                    );
                }
                #[cfg(not(unix))]
                debug!(%exit_status, "child terminated abnormally");
                Ok(Status::Error)
            }
        }
    }
}
