use std::collections::HashMap;
use std::env as stdenv;
use std::ffi::OsString;
use std::path::PathBuf;
use tracing::warn;

/// Snapshot of the process environment the interpreter works against.
///
/// The environment contains:
/// - `vars`: variables handed to child processes and consulted for `PATH` and `HOME`.
/// - `current_dir`: the working directory children are started in; `cd` updates it.
/// - `should_exit`: set by the `exit` builtin, checked by the driver loop.
#[derive(Debug, Clone)]
pub struct Environment {
    pub vars: HashMap<String, String>,
    pub current_dir: PathBuf,
    pub should_exit: bool,
}

impl Environment {
    /// Capture the current process state.
    ///
    /// Variables that are not valid UTF-8 are skipped with a warning: a
    /// non-UTF-8 `PATH` or `HOME` therefore behaves as unset, so lookups and
    /// `cd` without arguments fail.
    pub fn new() -> Self {
        let vars = stdenv::vars_os()
            .filter_map(|(k, v)| utf8_var(k, v))
            .collect();
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            vars,
            current_dir,
            should_exit: false,
        }
    }

    /// An environment with no variables at all, rooted at the current directory.
    pub fn empty() -> Self {
        Self {
            vars: HashMap::new(),
            current_dir: stdenv::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            should_exit: false,
        }
    }

    /// Get the value of a variable from the snapshot.
    pub fn get_var(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Set or override a variable in the snapshot.
    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.vars.insert(key.into(), val.into());
    }

}

fn utf8_var(key: OsString, val: OsString) -> Option<(String, String)> {
    match (key.into_string(), val.into_string()) {
        (Ok(key), Ok(val)) => Some((key, val)),
        (Ok(key), Err(_)) => {
            warn!(%key, "skipping variable with non-UTF-8 value");
            None
        }
        (Err(key), _) => {
            warn!(key = %key.to_string_lossy(), "skipping variable with non-UTF-8 name");
            None
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
