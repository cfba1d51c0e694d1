use crate::command::{Command, CommandFactory, ExecutableCommand, Status};
use crate::config::ShellConfig;
use crate::env::Environment;
use crate::external::{ExternalCommand, find_full_path};
use crate::lexer;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::Write;
use tracing::{debug, warn};

/// Factory allows creating instances of ExecutableCommand.
///
/// Only supports builtins defined in this crate.
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// Runs one command line at a time, either in-process (`cd`, `exit`) or as a
/// child process found through `PATH`.
///
/// Execution is synchronous: [`execute`](Interpreter::execute) returns only
/// after the child terminated.
///
/// Example
/// ```
/// use simple_shell::{Interpreter, Status};
/// let mut sh = Interpreter::default();
/// assert_eq!(sh.run_line("   \n"), Status::Success);
/// assert_eq!(sh.run_line("exit"), Status::Success);
/// assert!(sh.should_exit());
/// ```
pub struct Interpreter {
    env: Environment,
    config: ShellConfig,
    builtins: Vec<Box<dyn CommandFactory>>,
}

impl Interpreter {
    /// Create an interpreter over a snapshot of the current process environment.
    pub fn new(config: ShellConfig) -> Self {
        Self::with_env(config, Environment::new())
    }

    pub fn with_env(config: ShellConfig, env: Environment) -> Self {
        use crate::builtin::{Cd, Exit};
        Self {
            env,
            config,
            builtins: vec![
                Box::new(Factory::<Cd>::default()),
                Box::new(Factory::<Exit>::default()),
            ],
        }
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    /// True once the `exit` builtin ran.
    pub fn should_exit(&self) -> bool {
        self.env.should_exit
    }

    /// Whether argument 0 names a builtin. An empty command is not one.
    pub fn is_builtin(&self, cmd: &Command) -> bool {
        cmd.program()
            .is_some_and(|name| self.builtins.iter().any(|f| f.name() == name))
    }

    /// Parse `line` and execute it.
    pub fn run_line(&mut self, line: &str) -> Status {
        let mut cmd = lexer::parse(line, self.config.max_arg_len);
        self.execute(&mut cmd)
    }

    /// Execute a parsed command, reporting to the process's stdout and stderr.
    pub fn execute(&mut self, cmd: &mut Command) -> Status {
        let mut stdout = std::io::stdout();
        let mut stderr = std::io::stderr();
        self.execute_with_output(cmd, &mut stdout, &mut stderr)
    }

    /// Execute a parsed command.
    ///
    /// The "command not found" message goes to `out`, every other diagnostic to
    /// `err`. Children inherit the process's standard streams regardless.
    /// On success argument 0 of an external command holds its resolved path.
    pub fn execute_with_output(
        &mut self,
        cmd: &mut Command,
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> Status {
        let Some(name) = cmd.program().map(str::to_owned) else {
            return Status::Success;
        };

        let executable: Box<dyn ExecutableCommand> =
            match self.builtins.iter().find_map(|f| f.try_create(&*cmd)) {
                Some(builtin) => {
                    debug!(%name, "builtin");
                    builtin
                }
                None => {
                    if !find_full_path(cmd, &self.env, self.config.max_arg_len) {
                        report(out, format_args!("Command {} not found!", name));
                        return Status::Error;
                    }
                    Box::new(ExternalCommand::new(cmd))
                }
            };

        match executable.execute(err, &mut self.env) {
            Ok(status) => status,
            Err(e) => {
                report(err, format_args!("{:#}", e));
                Status::Error
            }
        }
    }

    /// Interactive loop: read a line, run it, repeat until `exit` or end of input.
    ///
    /// Ctrl-C discards the current line.
    pub fn repl(&mut self) -> rustyline::Result<()> {
        let mut rl = DefaultEditor::new()?;

        while !self.should_exit() {
            match rl.readline(&self.config.prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        rl.add_history_entry(line.as_str())?;
                    }
                    let status = self.run_line(&line);
                    debug!(?status, "line done");
                }
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => break,
                Err(err) => return Err(err),
            }
        }

        Ok(())
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new(ShellConfig::default())
    }
}

fn report(stream: &mut dyn Write, message: std::fmt::Arguments<'_>) {
    if let Err(e) = writeln!(stream, "{}", message) {
        warn!(error = %e, "failed to write diagnostic");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lock_current_dir;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    struct Captured {
        status: Status,
        out: String,
        err: String,
    }

    fn run(sh: &mut Interpreter, cmd: &mut Command) -> Captured {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let status = sh.execute_with_output(cmd, &mut out, &mut err);
        Captured {
            status,
            out: String::from_utf8(out).unwrap(),
            err: String::from_utf8(err).unwrap(),
        }
    }

    fn shell_with_path(path: &str) -> Interpreter {
        let mut env = Environment::empty();
        env.set_var("PATH", path);
        Interpreter::with_env(ShellConfig::default(), env)
    }

    #[cfg(unix)]
    fn write_script(dir: &Path, name: &str, body: &str, mode: u32) {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join(name);
        fs::write(&path, body).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(mode)).unwrap();
    }

    #[test]
    fn empty_command_is_a_no_op() {
        let mut sh = shell_with_path("/bin");
        let captured = run(&mut sh, &mut lexer::parse(" \t\n", 256));
        assert_eq!(captured.status, Status::Success);
        assert!(captured.out.is_empty());
        assert!(captured.err.is_empty());
        assert!(!sh.should_exit());
    }

    #[test]
    fn builtin_set_is_exact() {
        let sh = shell_with_path("/bin");
        assert!(sh.is_builtin(&lexer::parse("cd /tmp", 256)));
        assert!(sh.is_builtin(&lexer::parse("exit", 256)));
        assert!(!sh.is_builtin(&lexer::parse("ls", 256)));
        assert!(!sh.is_builtin(&lexer::parse("exit2", 256)));
        assert!(!sh.is_builtin(&lexer::parse("/bin/exit", 256)));
        assert!(!sh.is_builtin(&Command::default()));
    }

    #[test]
    fn missing_command_reports_typed_name() {
        let dir = tempdir().unwrap();
        let mut sh = shell_with_path(&dir.path().display().to_string());
        let mut cmd = lexer::parse("no_such_tool_for_tests --flag", 256);

        let captured = run(&mut sh, &mut cmd);

        assert_eq!(captured.status, Status::Error);
        assert_eq!(captured.out, "Command no_such_tool_for_tests not found!\n");
        assert_eq!(cmd.program(), Some("no_such_tool_for_tests"));
    }

    #[test]
    fn unset_path_means_not_found() {
        let mut sh = Interpreter::with_env(ShellConfig::default(), Environment::empty());
        let captured = run(&mut sh, &mut lexer::parse("ls", 256));
        assert_eq!(captured.status, Status::Error);
        assert!(captured.out.contains("ls"));
    }

    #[test]
    fn exit_stops_the_shell() {
        let mut sh = shell_with_path("/bin");
        assert_eq!(sh.run_line("exit"), Status::Success);
        assert!(sh.should_exit());
    }

    #[test]
    fn exit_with_flag_like_arguments_still_stops_the_shell() {
        for line in ["exit -1", "exit --help", "exit help"] {
            let mut sh = shell_with_path("/bin");
            let captured = run(&mut sh, &mut lexer::parse(line, 256));
            assert_eq!(captured.status, Status::Success, "{}: {}", line, captured.err);
            assert!(sh.should_exit(), "{}", line);
        }
    }

    #[test]
    #[cfg(unix)]
    fn absolute_program_without_path_is_not_found() {
        let mut sh = Interpreter::with_env(ShellConfig::default(), Environment::empty());
        let mut cmd = lexer::parse("/bin/true", 256);

        let captured = run(&mut sh, &mut cmd);

        assert_eq!(captured.status, Status::Error);
        assert_eq!(captured.out, "Command /bin/true not found!\n");
    }

    #[test]
    fn cd_with_too_many_arguments_fails() {
        let _lock = lock_current_dir();
        let orig = std::env::current_dir().unwrap();
        let mut sh = shell_with_path("/bin");

        let captured = run(&mut sh, &mut lexer::parse("cd a b", 256));

        assert_eq!(captured.status, Status::Error);
        assert!(captured.err.contains("too many arguments"));
        assert_eq!(std::env::current_dir().unwrap(), orig);
    }

    #[test]
    #[cfg(unix)]
    fn external_command_is_resolved_and_run() {
        let _lock = lock_current_dir();
        let mut sh = shell_with_path("/nonexistent_dir_for_tests:/bin:/usr/bin");
        let mut cmd = lexer::parse("  true   -l \n", 256);

        let captured = run(&mut sh, &mut cmd);

        assert_eq!(captured.status, Status::Success);
        assert!(cmd.program().unwrap().ends_with("/true"));
        assert_eq!(cmd.args(), ["-l".to_string()]);
    }

    #[test]
    #[cfg(unix)]
    fn non_zero_exit_code_is_still_success() {
        let _lock = lock_current_dir();
        let dir = tempdir().unwrap();
        write_script(dir.path(), "fails", "#!/bin/sh\nexit 3\n", 0o755);
        let mut sh = shell_with_path(&dir.path().display().to_string());

        assert_eq!(sh.run_line("fails"), Status::Success);
    }

    #[test]
    #[cfg(unix)]
    fn child_killed_by_signal_is_an_error() {
        let _lock = lock_current_dir();
        let dir = tempdir().unwrap();
        write_script(dir.path(), "suicide", "#!/bin/sh\nkill -9 $$\n", 0o755);
        let mut sh = shell_with_path(&dir.path().display().to_string());

        assert_eq!(sh.run_line("suicide"), Status::Error);
    }

    #[test]
    #[cfg(unix)]
    fn unexecutable_file_is_found_but_fails_to_start() {
        let _lock = lock_current_dir();
        let dir = tempdir().unwrap();
        write_script(dir.path(), "plain", "not a program\n", 0o644);
        let mut sh = shell_with_path(&dir.path().display().to_string());
        let mut cmd = lexer::parse("plain", 256);

        let captured = run(&mut sh, &mut cmd);

        assert_eq!(captured.status, Status::Error);
        assert!(captured.out.is_empty());
        assert!(captured.err.contains("cannot execute"), "err: {}", captured.err);
    }

    #[test]
    #[cfg(unix)]
    fn child_runs_in_current_dir_with_snapshot_env() {
        let _lock = lock_current_dir();
        let orig = std::env::current_dir().unwrap();
        let dir = tempdir().unwrap();
        let base = fs::canonicalize(dir.path()).unwrap();
        fs::create_dir(base.join("work")).unwrap();
        write_script(
            &base,
            "record",
            "#!/bin/sh\npwd > \"$OUT_FILE\"\necho \"$GREETING\" >> \"$OUT_FILE\"\n",
            0o755,
        );

        let mut env = Environment::empty();
        env.set_var("PATH", format!("{}:/bin:/usr/bin", base.display()));
        env.set_var("OUT_FILE", base.join("out.txt").to_string_lossy().to_string());
        env.set_var("GREETING", "hello");
        let mut sh = Interpreter::with_env(ShellConfig::default(), env);

        let cd_status = sh.run_line(&format!("cd {}", base.join("work").display()));
        let run_status = sh.run_line("record");
        std::env::set_current_dir(&orig).expect("failed to restore cwd");

        assert_eq!(cd_status, Status::Success);
        assert_eq!(run_status, Status::Success);
        let recorded = fs::read_to_string(base.join("out.txt")).unwrap();
        let mut lines = recorded.lines();
        assert_eq!(lines.next(), Some(base.join("work").to_string_lossy().as_ref()));
        assert_eq!(lines.next(), Some("hello"));
    }

    #[test]
    fn long_program_name_is_truncated_before_lookup() {
        let dir = tempdir().unwrap();
        let config = ShellConfig::default().with_max_arg_len(4).unwrap();
        let mut env = Environment::empty();
        env.set_var("PATH", dir.path().display().to_string());
        let mut sh = Interpreter::with_env(config, env);

        let mut cmd = lexer::parse("abcdefgh", sh.config().max_arg_len);
        let mut out = Vec::new();
        let status = sh.execute_with_output(&mut cmd, &mut out, &mut Vec::<u8>::new());

        assert_eq!(status, Status::Error);
        assert_eq!(String::from_utf8(out).unwrap(), "Command abcd not found!\n");
    }
}
