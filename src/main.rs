use anyhow::{Context, Result};
use argh::FromArgs;
use simple_shell::{Interpreter, ShellConfig};
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(FromArgs)]
/// A minimal shell: runs one command per line, resolving programs through PATH.
struct Args {
    #[argh(option, short = 'c')]
    /// run a single command line and exit.
    command: Option<String>,

    #[argh(option, default = "simple_shell::lexer::MAX_ARG_LEN")]
    /// maximum length of a single argument, in bytes; longer ones are truncated.
    max_arg_len: usize,

    #[argh(option)]
    /// prompt shown before each line in interactive mode.
    prompt: Option<String>,
}

fn main() -> ExitCode {
    // Respects RUST_LOG; logs go to stderr so they never mix with command output.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    match run(argh::from_env()) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:?}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<ExitCode> {
    let mut config = ShellConfig::default().with_max_arg_len(args.max_arg_len)?;
    if let Some(prompt) = args.prompt {
        config = config.with_prompt(prompt);
    }
    let mut sh = Interpreter::new(config);

    if let Some(line) = args.command {
        let status = sh.run_line(&line);
        return Ok(if status.is_success() || sh.should_exit() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    sh.repl().context("line editor failed")?;
    Ok(ExitCode::SUCCESS)
}
