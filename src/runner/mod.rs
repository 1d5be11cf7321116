//! Execution of a single rustfmt process.
//!
//! [`ProcessRunner::run`] feeds a buffer to rustfmt over stdin and collects the
//! formatted text from stdout. The process is bounded by a [`FormatTimeout`]
//! and by the caller's cancellation token; whichever of exit, timeout or
//! cancellation happens first settles the run, and the loser is discarded.

mod outcome;
mod timeout;

pub use outcome::ProcessOutcome;
pub use timeout::FormatTimeout;

use std::ffi::OsStr;
use std::io;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, Command};
use tokio_util::sync::CancellationToken;

use crate::args::build_args;
use crate::config::FormatterConfig;
use crate::context::ResolvedContext;

const LOG_TARGET: &str = "rustfmt_ls::runner";

/// Environment variable rustup consults to pick a toolchain.
pub const TOOLCHAIN_ENV: &str = "RUSTUP_TOOLCHAIN";

/// Spawn attempts while the binary is still open for writing (ETXTBSY).
const SPAWN_ATTEMPTS: u32 = 3;

/// Spawns rustfmt and settles each run exactly once.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    timeout: FormatTimeout,
}

/// Raw result of a process that ran to completion.
struct Exited {
    status: ExitStatus,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

/// First event observed while the process was alive.
enum Settlement {
    Exited(io::Result<Exited>),
    TimedOut,
    Canceled,
}

impl ProcessRunner {
    pub fn new(timeout: FormatTimeout) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> FormatTimeout {
        self.timeout
    }

    /// Format `text` with the configured tool in the given context.
    pub async fn run(
        &self,
        config: &FormatterConfig,
        text: &str,
        context: &ResolvedContext,
        cancel: &CancellationToken,
    ) -> ProcessOutcome {
        if cancel.is_cancelled() {
            log::debug!(target: LOG_TARGET, "Canceled before spawning {}", config.tool_path);
            return ProcessOutcome::Canceled;
        }

        let args = build_args(&config.extra_args, context);
        let mut command = Command::new(&config.tool_path);
        command
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &context.working_directory {
            command.current_dir(dir);
        }
        let ambient = std::env::var_os(TOOLCHAIN_ENV);
        if let Some(toolchain) = toolchain_override(context, ambient.as_deref()) {
            log::debug!(target: LOG_TARGET, "Setting {}={}", TOOLCHAIN_ENV, toolchain);
            command.env(TOOLCHAIN_ENV, toolchain);
        }

        log::debug!(
            target: LOG_TARGET,
            "Running {} {} in {:?}",
            config.tool_path,
            args.join(" "),
            context.working_directory
        );

        let mut child = match spawn(&mut command).await {
            Ok(child) => child,
            Err(e) => {
                log::error!(target: LOG_TARGET, "Failed to spawn {}: {}", config.tool_path, e);
                return ProcessOutcome::SpawnError(e.to_string());
            }
        };

        let settlement = tokio::select! {
            biased;
            _ = cancel.cancelled() => Settlement::Canceled,
            _ = tokio::time::sleep(self.timeout.as_duration()) => Settlement::TimedOut,
            result = communicate(&mut child, text) => Settlement::Exited(result),
        };

        match settlement {
            Settlement::Exited(Ok(exited)) => classify(exited),
            Settlement::Exited(Err(e)) => {
                log::error!(target: LOG_TARGET, "I/O error talking to {}: {}", config.tool_path, e);
                terminate(&mut child).await;
                ProcessOutcome::SpawnError(e.to_string())
            }
            Settlement::TimedOut => {
                log::warn!(
                    target: LOG_TARGET,
                    "{} exceeded {:?}, killing process",
                    config.tool_path,
                    self.timeout.as_duration()
                );
                terminate(&mut child).await;
                ProcessOutcome::TimedOut
            }
            Settlement::Canceled => {
                log::warn!(target: LOG_TARGET, "Format canceled, killing {}", config.tool_path);
                terminate(&mut child).await;
                ProcessOutcome::Canceled
            }
        }
    }
}

/// Toolchain to inject into the child environment, if any.
///
/// A toolchain already present in the ambient environment always wins over
/// the one pinned by the project.
pub fn toolchain_override<'a>(
    context: &'a ResolvedContext,
    ambient: Option<&OsStr>,
) -> Option<&'a str> {
    if ambient.is_some() {
        return None;
    }
    context.toolchain.as_deref()
}

/// Spawn `command`, retrying briefly while its executable is busy, as
/// happens right after rustup or a test rewrites it.
async fn spawn(command: &mut Command) -> io::Result<Child> {
    let mut attempt = 1;
    loop {
        match command.spawn() {
            Err(e) if e.kind() == io::ErrorKind::ExecutableFileBusy && attempt < SPAWN_ATTEMPTS => {
                log::debug!(target: LOG_TARGET, "Executable busy, retrying spawn ({})", attempt);
                tokio::time::sleep(Duration::from_millis(20 * u64::from(attempt))).await;
                attempt += 1;
            }
            other => return other,
        }
    }
}

/// Write stdin while draining stdout and stderr, then reap the child.
///
/// All three pipes are serviced concurrently so a large buffer cannot
/// deadlock against a full output pipe.
async fn communicate(child: &mut Child, text: &str) -> io::Result<Exited> {
    let stdin = child.stdin.take();
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let write = async move {
        let Some(mut stdin) = stdin else {
            return Ok(());
        };
        match stdin.write_all(text.as_bytes()).await {
            // rustfmt may exit before reading everything; its status decides.
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
            other => other,
        }
        // dropping stdin closes the pipe
    };

    let (written, stdout, stderr) = tokio::join!(write, read_all(stdout), read_all(stderr));
    written?;
    let stdout = stdout?;
    let stderr = stderr?;
    let status = child.wait().await?;

    Ok(Exited {
        status,
        stdout,
        stderr,
    })
}

async fn read_all<R: AsyncRead + Unpin>(pipe: Option<R>) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

async fn terminate(child: &mut Child) {
    if let Err(e) = child.kill().await {
        log::debug!(target: LOG_TARGET, "Kill after settlement failed: {}", e);
    }
}

fn classify(exited: Exited) -> ProcessOutcome {
    let stdout = String::from_utf8_lossy(&exited.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&exited.stderr).into_owned();

    if !exited.status.success() {
        // Killed by a signal has no code.
        let code = exited.status.code().unwrap_or(-1);
        log::debug!(target: LOG_TARGET, "rustfmt exited with {}: {}", code, stderr.trim());
        return ProcessOutcome::NonZeroExit { code, stderr };
    }

    if !stderr.trim().is_empty() {
        log::debug!(target: LOG_TARGET, "rustfmt stderr: {}", stderr.trim());
    }
    if stdout.trim().is_empty() {
        log::debug!(target: LOG_TARGET, "rustfmt produced no output");
        return ProcessOutcome::EmptyOutput;
    }

    log::debug!(target: LOG_TARGET, "rustfmt produced {} bytes", stdout.len());
    ProcessOutcome::Success(stdout)
}
