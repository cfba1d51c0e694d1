use crate::env::Environment;
use crate::lexer::truncate_arg;
use anyhow::Result;
use std::io::Write;

/// Conventional exit code type used by builtins.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// This mirrors the convention of `chdir(2)` and of POSIX shells.
pub type ExitCode = i32;

/// Outcome of executing one command line.
///
/// The specific exit code of a child process is not part of it:
/// a child that exited normally is a `Success` whatever its code was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Error,
}

impl Status {
    /// Map a `chdir`-style return value to a status: zero is success.
    pub fn from_code(code: ExitCode) -> Self {
        if code == 0 {
            Status::Success
        } else {
            Status::Error
        }
    }

    pub fn is_success(self) -> bool {
        self == Status::Success
    }
}

/// A parsed command line, argv-style.
///
/// Argument 0 is the program name, or its resolved full path once
/// [`find_full_path`](crate::find_full_path) succeeded. Every argument is
/// bounded by the configured maximum length, see [`truncate_arg`].
///
/// The vector length is the argument count; the null terminator exec-style
/// APIs expect is produced by `std::process::Command` when spawning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Command {
    args: Vec<String>,
}

impl Command {
    pub fn new(args: Vec<String>) -> Self {
        Self { args }
    }

    /// Number of arguments, program name included.
    pub fn argc(&self) -> usize {
        self.args.len()
    }

    pub fn argv(&self) -> &[String] {
        &self.args
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Argument 0, if the line had any words at all.
    pub fn program(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }

    /// Arguments after the program name.
    pub fn args(&self) -> &[String] {
        self.args.get(1..).unwrap_or(&[])
    }

    /// Overwrite argument 0 in place, truncated to `max_len` bytes.
    ///
    /// Does nothing on an empty command.
    pub fn set_program(&mut self, program: &str, max_len: usize) {
        if let Some(first) = self.args.first_mut() {
            *first = truncate_arg(program, max_len);
        }
    }
}

/// Object-safe trait for anything the interpreter can run.
///
/// Implemented by builtins via a blanket impl and by external commands.
pub trait ExecutableCommand {
    /// Executes the command. Diagnostics meant for the user go to `stderr`.
    fn execute(self: Box<Self>, stderr: &mut dyn Write, env: &mut Environment) -> Result<Status>;
}

/// Factory that tries to create a command from a parsed line.
///
/// Returns `None` when the factory doesn't recognize argument 0.
pub trait CommandFactory {
    /// Name matched exactly against argument 0.
    fn name(&self) -> &'static str;

    fn try_create(&self, cmd: &Command) -> Option<Box<dyn ExecutableCommand>>;
}
