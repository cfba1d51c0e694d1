use crate::lexer::MAX_ARG_LEN;
use anyhow::{Result, ensure};

/// Knobs of the interpreter that are not part of the process environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    /// Bound, in bytes, on every argument and on resolved program paths.
    pub max_arg_len: usize,
    /// Prompt printed by the interactive loop.
    pub prompt: String,
}

impl ShellConfig {
    pub fn with_max_arg_len(mut self, max_arg_len: usize) -> Result<Self> {
        ensure!(max_arg_len > 0, "max argument length must be positive");
        self.max_arg_len = max_arg_len;
        Ok(self)
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            max_arg_len: MAX_ARG_LEN,
            prompt: "$ ".to_string(),
        }
    }
}
