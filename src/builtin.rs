use crate::command::{Command, CommandFactory, ExecutableCommand, ExitCode, Status};
use crate::env::Environment;
use crate::interpreter::Factory;
use anyhow::{Context, Result, bail};
use argh::{EarlyExit, FromArgs};
use std::env;
use std::io::Write;
use std::path::PathBuf;

/// Commands handled inside the shell process.
///
/// Builtins are parsed using the [`argh`] crate (`FromArgs`) and executed directly
/// in-process without spawning a child process.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, matched exactly against argument 0.
    fn name() -> &'static str;

    /// Return value follows `chdir` conventions: 0 for success, non-zero for error.
    fn execute(self, stderr: &mut dyn Write, env: &mut Environment) -> Result<ExitCode>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(self: Box<Self>, stderr: &mut dyn Write, env: &mut Environment) -> Result<Status> {
        match T::execute(*self, stderr, env) {
            Ok(code) => Ok(Status::from_code(code)),
            Err(e) => {
                writeln!(stderr, "{:#}", e)?;
                Ok(Status::Error)
            }
        }
    }
}

/// Output of `argh` when it refuses the arguments or prints help.
struct InvalidArgs {
    output: String,
    is_error: bool,
}

impl ExecutableCommand for InvalidArgs {
    fn execute(self: Box<Self>, stderr: &mut dyn Write, _env: &mut Environment) -> Result<Status> {
        writeln!(stderr, "{}", self.output.trim_end())?;
        Ok(if self.is_error {
            Status::Error
        } else {
            Status::Success
        })
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn name(&self) -> &'static str {
        T::name()
    }

    fn try_create(&self, cmd: &Command) -> Option<Box<dyn ExecutableCommand>> {
        if cmd.program()? != T::name() {
            return None;
        }
        // Everything after the name is positional, including words like `-x` or `help`.
        let args: Vec<&str> = std::iter::once("--")
            .chain(cmd.args().iter().map(String::as_str))
            .collect();
        Some(match T::from_args(&[T::name()], &args) {
            Ok(builtin) => Box::new(builtin),
            Err(EarlyExit { output, status }) => Box::new(InvalidArgs {
                output,
                is_error: status.is_err(),
            }),
        })
    }
}

#[derive(FromArgs)]
/// Change the current working directory.
/// If no target is provided, changes to the directory specified by the HOME environment variable.
pub struct Cd {
    #[argh(positional, greedy)]
    /// directory to switch to; absolute or relative to the current directory. Defaults to $HOME when omitted.
    pub targets: Vec<String>,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn execute(self, _stderr: &mut dyn Write, env: &mut Environment) -> Result<ExitCode> {
        let target = match self.targets.as_slice() {
            // A non-UTF-8 HOME is not in the snapshot and counts as unset.
            [] => match env.get_var("HOME") {
                Some(home) => PathBuf::from(home),
                None => bail!("cd: HOME not set"),
            },
            [dir] => PathBuf::from(dir),
            _ => bail!("cd: too many arguments"),
        };

        // Joining an absolute path replaces the base.
        let new_dir = env.current_dir.join(&target);
        env::set_current_dir(&new_dir)
            .with_context(|| format!("cd: {}", target.display()))?;
        env.current_dir = env::current_dir().unwrap_or(new_dir);
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Exit the shell with a success status.
pub struct Exit {
    #[argh(positional, greedy)]
    /// ignored.
    pub _args: Vec<String>,
}

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn execute(self, _stderr: &mut dyn Write, env: &mut Environment) -> Result<ExitCode> {
        env.should_exit = true;
        Ok(0)
    }
}
