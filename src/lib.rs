//! A tiny shell front-end: split a line into words, resolve the program
//! against `PATH`, and run it as a child process.
//!
//! The pipeline is `line -> lexer::parse -> Command -> Interpreter::execute`.
//! Only two commands are handled in-process, `cd` and `exit`; everything else
//! is looked up in the search path and spawned, and the caller blocks until
//! the child terminates. There are no pipelines, redirections or globbing.
//!
//! The main entry point is [`Interpreter`]. The public modules [`command`],
//! [`config`] and [`env`] expose the types needed to drive it from another
//! program or from tests.

mod builtin;
pub mod command;
pub mod config;
pub mod env;
mod external;
mod interpreter;
pub mod lexer;

pub use command::{Command, Status};
pub use config::ShellConfig;
pub use external::find_full_path;
/// Just a convenient re-export of the command runner.
///
/// See [`Interpreter`] for the high-level API and examples.
pub use interpreter::Interpreter;

#[cfg(test)]
pub(crate) fn lock_current_dir() -> std::sync::MutexGuard<'static, ()> {
    use std::sync::{Mutex, OnceLock};
    static MUTEX: OnceLock<Mutex<()>> = OnceLock::new();
    MUTEX
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}
