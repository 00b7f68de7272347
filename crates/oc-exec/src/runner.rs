use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::debug;

use crate::hider::OutputHider;
use crate::platform::Platform;
use crate::{OcExecError, Result};

// ─── ExecPolicy ───────────────────────────────────────────────────────────

/// How a single invocation treats its output and its exit code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecPolicy {
    /// When `false`, only the command line reaches the sink; stdout is captured.
    pub visible_output: bool,
    /// When `true`, a nonzero exit becomes [`OcExecError::Execution`].
    pub fail_on_nonzero: bool,
    /// Wrap the invocation in a `::group::` / `::endgroup::` pair.
    pub group: Option<String>,
}

impl ExecPolicy {
    pub fn visible() -> Self {
        Self {
            visible_output: true,
            fail_on_nonzero: true,
            group: None,
        }
    }

    pub fn hidden() -> Self {
        Self {
            visible_output: false,
            ..Self::visible()
        }
    }

    pub fn allow_failure(mut self) -> Self {
        self.fail_on_nonzero = false;
        self
    }

    pub fn in_group(mut self, name: impl Into<String>) -> Self {
        self.group = Some(name.into());
        self
    }
}

// ─── ExecResult ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecResult {
    /// `-1` when the process was terminated by a signal.
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ExecResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

// ─── Redact ───────────────────────────────────────────────────────────────

/// Scrubs known secrets from text the runner prints. Captured output in
/// [`ExecResult`] is never redacted.
pub trait Redact: fmt::Debug + Send + Sync {
    fn redact(&self, text: &str) -> String;
}

// ─── OcRunner ─────────────────────────────────────────────────────────────

/// Runs the `oc` executable with prepared argument vectors.
#[derive(Debug, Clone)]
pub struct OcRunner {
    executable: PathBuf,
    redactor: Option<Arc<dyn Redact>>,
}

impl OcRunner {
    /// Resolve the platform's `oc` binary on `PATH` up front.
    pub fn locate(platform: Platform) -> Result<Self> {
        let name = platform.executable_name();
        let executable =
            which::which(name).map_err(|_| OcExecError::NotFound(name.to_string()))?;
        debug!(path = %executable.display(), "located oc");
        Ok(Self {
            executable,
            redactor: None,
        })
    }

    pub fn with_executable(path: impl Into<PathBuf>) -> Self {
        Self {
            executable: path.into(),
            redactor: None,
        }
    }

    /// Pass every printed line, including the echoed command line, through
    /// `redactor`.
    pub fn with_redactor(mut self, redactor: Arc<dyn Redact>) -> Self {
        self.redactor = Some(redactor);
        self
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// The command line as echoed before each invocation.
    pub fn command_line(&self, args: &[String]) -> String {
        let mut line = self.executable.display().to_string();
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }

    /// Run with the process's stdout as the output sink.
    ///
    /// Without a [`Redact`] the echoed command line shows credential flags
    /// verbatim; only the CI host's own masking hides them then.
    pub async fn run(&self, args: &[String], policy: &ExecPolicy) -> Result<ExecResult> {
        let mut stdout = std::io::stdout();
        self.run_with_sink(args, policy, &mut stdout).await
    }

    /// Run with an explicit output sink.
    ///
    /// Stdout and stderr are always captured. Under a hidden policy the sink
    /// only ever sees the command line and the suppression marker.
    pub async fn run_with_sink<W: Write + ?Sized>(
        &self,
        args: &[String],
        policy: &ExecPolicy,
        sink: &mut W,
    ) -> Result<ExecResult> {
        if let Some(group) = &policy.group {
            writeln!(sink, "::group::{group}")?;
        }

        let result = if policy.visible_output {
            self.exec(args, &mut *sink).await
        } else {
            let mut hider = OutputHider::new(&mut *sink);
            let result = self.exec(args, &mut hider).await;
            debug!(
                captured_bytes = hider.captured_len(),
                "command output suppressed"
            );
            result
        };

        if policy.group.is_some() {
            writeln!(sink, "::endgroup::")?;
        }
        sink.flush()?;

        let result = result?;
        debug!(exit_code = result.exit_code, "oc exited");

        if policy.fail_on_nonzero && !result.success() {
            return Err(OcExecError::Execution {
                command: self.subcommand_line(args),
                exit_code: result.exit_code,
                stderr: result.stderr,
            });
        }

        Ok(result)
    }

    async fn exec<O: Write + ?Sized>(&self, args: &[String], out: &mut O) -> Result<ExecResult> {
        writeln!(out, "[command]{}", self.shown(&self.command_line(args)))?;

        // The exit status is inspected by the caller; spawning never fails on it.
        let mut child = Command::new(&self.executable)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| OcExecError::Spawn {
                program: self.executable.display().to_string(),
                source,
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| std::io::Error::other("stdout not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| std::io::Error::other("stderr not captured"))?;

        let drain_stdout = async {
            let mut captured = String::new();
            let mut reader = BufReader::new(stdout);
            let mut buf = Vec::new();
            while let Some(line) = next_line(&mut reader, &mut buf).await? {
                writeln!(out, "{}", self.shown(&line))?;
                captured.push_str(&line);
                captured.push('\n');
            }
            Ok::<_, std::io::Error>(captured)
        };

        let drain_stderr = async {
            let mut captured = String::new();
            let mut reader = BufReader::new(stderr);
            let mut buf = Vec::new();
            while let Some(line) = next_line(&mut reader, &mut buf).await? {
                eprintln!("{}", self.shown(&line));
                captured.push_str(&line);
                captured.push('\n');
            }
            Ok::<_, std::io::Error>(captured)
        };

        let (stdout, stderr) = tokio::join!(drain_stdout, drain_stderr);
        let status = child.wait().await?;

        Ok(ExecResult {
            exit_code: status.code().unwrap_or(-1),
            stdout: stdout?,
            stderr: stderr?,
        })
    }

    fn shown(&self, text: &str) -> String {
        match &self.redactor {
            Some(redactor) => redactor.redact(text),
            None => text.to_string(),
        }
    }

    /// Executable plus leading non-flag tokens; flag values are left out.
    fn subcommand_line(&self, args: &[String]) -> String {
        let program = self
            .executable
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.executable.display().to_string());
        std::iter::once(program)
            .chain(args.iter().take_while(|a| !a.starts_with('-')).cloned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Next line without its terminator, `None` at end of stream. Bytes that
/// are not UTF-8 are replaced rather than failing the read.
async fn next_line<R: AsyncBufRead + Unpin>(
    reader: &mut R,
    buf: &mut Vec<u8>,
) -> std::io::Result<Option<String>> {
    buf.clear();
    if reader.read_until(b'\n', buf).await? == 0 {
        return Ok(None);
    }
    if buf.ends_with(b"\n") {
        buf.pop();
        if buf.ends_with(b"\r") {
            buf.pop();
        }
    }
    Ok(Some(String::from_utf8_lossy(buf).into_owned()))
}
