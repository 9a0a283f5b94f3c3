//! Subprocess-backed evaluator.

use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::OnceLock;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use regex::Regex;
use tracing::{debug, warn};
use wait_timeout::ChildExt;

use crate::{CancelToken, EvalRequest, EvaluationError, ModuleLocator, Result, SchemaProvider};

/// How often a running evaluator is checked for cancellation.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Runs an evaluator program and reads the wire dump from its stdout.
///
/// The request is appended to the configured base arguments as
/// `--arg <name> <expr>` pairs: `module` always, then `pkgs`, `specialArgs`
/// and `optionsPath` when the request sets them. Trailing arguments, usually
/// the dump expression file, come last.
#[derive(Debug, Clone)]
pub struct CommandProvider {
    program: String,
    args: Vec<String>,
    trailing: Vec<String>,
    parser: Option<(String, Vec<String>)>,
    timeout: Option<Duration>,
    cancel: Option<CancelToken>,
}

/// Exit status and captured pipes of one finished subprocess.
struct Finished {
    status: ExitStatus,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

impl CommandProvider {
    /// A provider running `program` with no base arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            trailing: Vec::new(),
            parser: None,
            timeout: None,
            cancel: None,
        }
    }

    /// Replace the base arguments.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the arguments placed after the request's own arguments.
    pub fn with_trailing_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.trailing = args.into_iter().map(Into::into).collect();
        self
    }

    /// Parse every expression of a request before evaluating it.
    ///
    /// Each expression is checked with `<program> <args..> --parse --expr <expr>`;
    /// a failing check aborts the request with [`EvaluationError::Syntax`].
    pub fn with_syntax_check<I, S>(mut self, program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parser = Some((program.into(), args.into_iter().map(Into::into).collect()));
        self
    }

    /// Kill the evaluator if it runs longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Kill the evaluator once `token` is cancelled.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// The full argument list for `request`, base arguments first.
    pub fn command_args(&self, request: &EvalRequest) -> Result<Vec<String>> {
        let mut args = self.args.clone();
        let module = match &request.locator {
            ModuleLocator::Path(path) => absolute(path)?,
            ModuleLocator::Expr(expr) => expr.clone(),
        };
        push_arg(&mut args, "module", module);
        if let Some(pkgs) = &request.pkgs {
            push_arg(&mut args, "pkgs", pkgs.clone());
        }
        if let Some(special_args) = special_args_expr(request) {
            push_arg(&mut args, "specialArgs", special_args);
        }
        if !request.options_path.is_empty() {
            let items: Vec<String> = request.options_path.iter().map(|s| nix_string(s)).collect();
            push_arg(&mut args, "optionsPath", format!("[ {} ]", items.join(" ")));
        }
        args.extend(self.trailing.iter().cloned());
        Ok(args)
    }

    /// Run the configured syntax check over every expression in `request`.
    fn check_request(&self, request: &EvalRequest) -> Result<()> {
        let Some((program, args)) = &self.parser else {
            return Ok(());
        };
        if let ModuleLocator::Expr(expr) = &request.locator {
            self.check_expr(program, args, "module expression", expr)?;
        }
        if let Some(pkgs) = &request.pkgs {
            self.check_expr(program, args, "pkgs expression", pkgs)?;
        }
        for (name, expr) in &request.special_args {
            self.check_expr(program, args, &format!("specialArgs at {:?}", name), expr)?;
        }
        if let Some(special_args) = special_args_expr(request) {
            self.check_expr(program, args, "specialArgs", &special_args)?;
        }
        Ok(())
    }

    fn check_expr(&self, program: &str, args: &[String], what: &str, expr: &str) -> Result<()> {
        let mut args = args.to_vec();
        args.extend(["--parse".to_string(), "--expr".to_string(), expr.to_string()]);
        let finished = self.run(program, &args)?;
        if finished.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&finished.stderr);
        debug!(program, what, "expression failed to parse");
        Err(EvaluationError::Syntax { what: what.to_string(), message: diagnostic(&stderr) })
    }

    /// Spawn `program`, collect both pipes and wait for it under the
    /// configured deadline and cancel token.
    fn run(&self, program: &str, args: &[String]) -> Result<Finished> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| EvaluationError::Spawn { program: program.to_string(), source })?;

        // Both pipes are drained on their own threads so a chatty evaluator
        // cannot block on a full pipe while we wait for it.
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        // On timeout or cancellation the readers are left detached: a
        // grandchild may still hold the pipes open after the child is killed.
        let status = self.wait(&mut child)?;
        let stdout = join(stdout)?;
        let stderr = join(stderr)?;
        Ok(Finished { status, stdout, stderr })
    }

    fn wait(&self, child: &mut Child) -> Result<ExitStatus> {
        let deadline = self.timeout.map(|timeout| (timeout, Instant::now() + timeout));
        loop {
            if let Some(status) = child.wait_timeout(POLL_INTERVAL)? {
                return Ok(status);
            }
            if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
                kill(child);
                return Err(EvaluationError::Cancelled);
            }
            if let Some((timeout, deadline)) = deadline {
                if Instant::now() >= deadline {
                    kill(child);
                    return Err(EvaluationError::TimedOut(timeout));
                }
            }
        }
    }
}

impl SchemaProvider for CommandProvider {
    fn evaluate(&self, request: &EvalRequest) -> Result<Vec<u8>> {
        if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
            return Err(EvaluationError::Cancelled);
        }

        self.check_request(request)?;

        let args = self.command_args(request)?;
        debug!(program = %self.program, ?args, "starting evaluator");

        let Finished { status, stdout, stderr } = self.run(&self.program, &args)?;

        if status.success() {
            debug!(program = %self.program, bytes = stdout.len(), "evaluator finished");
            return Ok(stdout);
        }

        let stderr = String::from_utf8_lossy(&stderr);
        warn!(program = %self.program, code = ?status.code(), "evaluator failed");
        Err(EvaluationError::Diagnostic(diagnostic(&stderr)))
    }

    fn describe(&self) -> String { format!("command `{}`", self.program) }
}

/// The `specialArgs` attribute set, if the request has any.
fn special_args_expr(request: &EvalRequest) -> Option<String> {
    if request.special_args.is_empty() {
        return None;
    }
    let bindings: String = request
        .special_args
        .iter()
        .map(|(name, expr)| format!("{} = {}; ", nix_string(name), expr))
        .collect();
    Some(format!("{{ {}}}", bindings))
}

fn push_arg(args: &mut Vec<String>, name: &str, value: String) {
    args.push("--arg".to_string());
    args.push(name.to_string());
    args.push(value);
}

fn absolute(path: &Path) -> Result<String> {
    let path =
        if path.is_absolute() { path.to_path_buf() } else { std::env::current_dir()?.join(path) };
    path.to_str().map(str::to_string).ok_or_else(|| {
        EvaluationError::InvalidRequest(format!("module path {:?} is not valid UTF-8", path))
    })
}

/// Quote `text` as a double-quoted expression string.
fn nix_string(text: &str) -> String {
    let escaped = text.replace('\\', "\\\\").replace('"', "\\\"").replace("${", "\\${");
    format!("\"{}\"", escaped)
}

fn kill(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<std::io::Result<Vec<u8>>>> {
    pipe.map(|mut pipe| {
        std::thread::spawn(move || {
            let mut buf = Vec::new();
            pipe.read_to_end(&mut buf)?;
            Ok(buf)
        })
    })
}

fn join(handle: Option<JoinHandle<std::io::Result<Vec<u8>>>>) -> Result<Vec<u8>> {
    match handle {
        Some(handle) => handle
            .join()
            .map_err(|_| EvaluationError::Io(std::io::Error::new(std::io::ErrorKind::Other, "pipe reader panicked")))?
            .map_err(EvaluationError::Io),
        None => Ok(Vec::new()),
    }
}

/// The evaluator's own message: the first `error:` line, else all of stderr.
pub(crate) fn diagnostic(stderr: &str) -> String {
    static ERROR_LINE: OnceLock<Option<Regex>> = OnceLock::new();
    let line = ERROR_LINE
        .get_or_init(|| Regex::new(r"(?m)^\s*error: (.*)$").ok())
        .as_ref()
        .and_then(|re| re.captures(stderr))
        .and_then(|caps| caps.get(1));
    match line {
        Some(line) => line.as_str().trim_end().to_string(),
        None => stderr.trim_end().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_prefers_error_line() {
        let stderr = "warning: something\n       error: attribute 'foo' missing\n\n  at line 3\n";
        assert_eq!(diagnostic(stderr), "attribute 'foo' missing");
    }

    #[test]
    fn test_diagnostic_falls_back_to_all_of_stderr() {
        assert_eq!(diagnostic("segmentation fault\n"), "segmentation fault");
    }

    #[test]
    fn test_nix_string_escapes() {
        assert_eq!(nix_string("plain"), "\"plain\"");
        assert_eq!(nix_string("a\"b\\c${d}"), "\"a\\\"b\\\\c\\${d}\"");
    }

    #[test]
    fn test_command_args() {
        let provider = CommandProvider::new("nix-instantiate").with_args(["--eval", "--json"]);
        let request = EvalRequest::expr("{ lib, ... }: { }")
            .with_pkgs("import <nixpkgs> { }")
            .with_special_arg("host", "\"box\"")
            .with_options_path(["services", "magics"]);
        let args = provider.command_args(&request).expect("args");
        assert_eq!(
            args,
            vec![
                "--eval",
                "--json",
                "--arg",
                "module",
                "{ lib, ... }: { }",
                "--arg",
                "pkgs",
                "import <nixpkgs> { }",
                "--arg",
                "specialArgs",
                "{ \"host\" = \"box\"; }",
                "--arg",
                "optionsPath",
                "[ \"services\" \"magics\" ]",
            ]
        );
    }

    #[test]
    fn test_relative_module_path_is_made_absolute() {
        let provider = CommandProvider::new("true");
        let args = provider.command_args(&EvalRequest::path("module.nix")).expect("args");
        assert_eq!(args[0], "--arg");
        assert!(Path::new(&args[2]).is_absolute());
        assert!(args[2].ends_with("module.nix"));
    }
}
