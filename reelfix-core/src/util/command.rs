// ============================================================================
// reelfix-core/src/util/command.rs
// ============================================================================
//
// COMMAND EXECUTION: Blocking Process Runner with Timeout and Cancellation
//
// Every external tool (yt-dlp, ffprobe, ffmpeg) runs through run_command.
// Output is drained on reader threads so a chatty child never blocks on a
// full pipe, while the calling thread polls the child for exit, the deadline
// and the cancellation flag.
//
// KEY COMPONENTS:
// - CancelFlag: cloneable cooperative cancellation signal
// - CommandOutput: exit status plus captured stdout/stderr
// - CommandError: classification of runner failures
// - run_command: spawn, drain, poll, kill-and-reap

use std::io::{self, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, warn};
use thiserror::Error;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Shared cancellation signal for one request (or a batch of them).
///
/// Cloning is cheap; all clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Captured result of a command that ran to completion.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }
}

/// Command execution errors
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("program not found: {0}")]
    NotFound(String),

    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("command timed out after {} seconds", .0.as_secs())]
    Timeout(Duration),

    #[error("command was cancelled")]
    Cancelled,

    #[error("error waiting for process: {0}")]
    Wait(#[source] io::Error),
}

/// Renders a command line for debug logging.
pub fn describe_command(cmd: &Command) -> String {
    let mut parts = vec![cmd.get_program().to_string_lossy().into_owned()];
    parts.extend(cmd.get_args().map(|a| {
        let arg = a.to_string_lossy();
        if arg.contains(' ') {
            format!("\"{arg}\"")
        } else {
            arg.into_owned()
        }
    }));
    parts.join(" ")
}

fn spawn_reader<R: Read + Send + 'static>(source: Option<R>) -> Option<JoinHandle<String>> {
    source.map(|mut stream| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = stream.read_to_end(&mut buf);
            String::from_utf8_lossy(&buf).into_owned()
        })
    })
}

fn kill_and_reap(child: &mut Child) {
    if let Err(e) = child.kill() {
        // Already exited between the last poll and now.
        debug!("kill failed: {e}");
    }
    if let Err(e) = child.wait() {
        warn!("failed to reap killed process: {e}");
    }
}

/// Runs `cmd` to completion, or until `timeout` elapses or `cancel` is set.
///
/// Stdout and stderr are always piped and captured. A nonzero exit is not an
/// error at this level; callers inspect [`CommandOutput::status`]. On timeout
/// or cancellation the child is killed and reaped before returning, and the
/// reader threads are left to finish on their own since grandchildren may
/// still hold the pipes open.
pub fn run_command(
    cmd: &mut Command,
    timeout: Option<Duration>,
    cancel: &CancelFlag,
) -> Result<CommandOutput, CommandError> {
    let program = cmd.get_program().to_string_lossy().into_owned();
    debug!("Running: {}", describe_command(cmd));

    if cancel.is_cancelled() {
        return Err(CommandError::Cancelled);
    }

    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                CommandError::NotFound(program.clone())
            } else {
                CommandError::Spawn {
                    program: program.clone(),
                    source: e,
                }
            }
        })?;

    let stdout_handle = spawn_reader(child.stdout.take());
    let stderr_handle = spawn_reader(child.stderr.take());

    let start = Instant::now();
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {}
            Err(e) => {
                kill_and_reap(&mut child);
                return Err(CommandError::Wait(e));
            }
        }

        if cancel.is_cancelled() {
            debug!("Cancelling {program}");
            kill_and_reap(&mut child);
            return Err(CommandError::Cancelled);
        }

        if let Some(limit) = timeout {
            if start.elapsed() >= limit {
                warn!("{program} exceeded {}s, killing it", limit.as_secs());
                kill_and_reap(&mut child);
                return Err(CommandError::Timeout(limit));
            }
        }

        thread::sleep(POLL_INTERVAL);
    };

    let stdout = stdout_handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default();
    let stderr = stderr_handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default();

    debug!(
        "{program} exited with {} after {:.1}s",
        status,
        start.elapsed().as_secs_f64()
    );

    Ok(CommandOutput {
        status,
        stdout,
        stderr,
    })
}
