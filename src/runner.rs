use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::process::Child;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use crate::command::ExecCommand;

/// What happened to one spawned command.
///
/// Produced once per attempt and consumed by the classifier; there are no
/// retries at this layer.
#[derive(Debug, Default)]
pub struct ExecutionOutcome {
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
    pub nonzero_exit: bool,
    /// The OS refused to start the process; `stderr` carries the launch
    /// error text instead of process output.
    pub launch_failed: bool,
}

/// Spawns the command and waits for it, bounded by the wall-clock limit.
///
/// stdout and stderr are captured through independent pipes and never
/// merged. On timeout (or external cancellation) the entire process group
/// is killed, not just the immediate child: build-then-run commands are
/// shell pipelines and killing only the shell would leave a compiler or
/// the program itself running. Output buffered up to that point is kept.
pub async fn run(
    command: ExecCommand,
    time_limit: Duration,
    cancel: &CancellationToken,
) -> ExecutionOutcome {
    let argv = command.into_argv();
    let mut cmd = tokio::process::Command::new(&argv[0]);
    cmd.args(&argv[1..])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    #[cfg(unix)]
    cmd.process_group(0); // fresh group so the whole tree can be signalled

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            log::warn!("Failed to launch {:?}: {e}", argv[0]);
            return ExecutionOutcome {
                stderr: e.to_string(),
                nonzero_exit: true,
                launch_failed: true,
                ..Default::default()
            };
        }
    };

    let stdout_task = tokio::spawn(drain_pipe(child.stdout.take()));
    let stderr_task = tokio::spawn(drain_pipe(child.stderr.take()));

    let mut outcome = ExecutionOutcome::default();
    tokio::select! {
        waited = timeout(time_limit, child.wait()) => match waited {
            Ok(Ok(status)) => {
                outcome.nonzero_exit = !status.success();
            }
            Ok(Err(e)) => {
                log::error!("Failed to wait on child process: {e}");
                outcome.stderr = e.to_string();
                outcome.nonzero_exit = true;
                outcome.launch_failed = true;
            }
            Err(_) => {
                log::info!("Execution exceeded {}s, killing process group", time_limit.as_secs());
                outcome.timed_out = true;
                kill_process_group(&mut child).await;
            }
        },
        _ = cancel.cancelled() => {
            // Shutdown cancels an in-flight run the same way the deadline
            // does: kill the tree, keep partial output.
            log::info!("Execution cancelled, killing process group");
            outcome.timed_out = true;
            kill_process_group(&mut child).await;
        }
    }

    // The readers hit EOF once the process (group) is gone.
    let stdout = stdout_task.await.unwrap_or_default();
    let stderr = stderr_task.await.unwrap_or_default();
    outcome.stdout = stdout;
    if outcome.stderr.is_empty() {
        outcome.stderr = stderr;
    }
    outcome
}

/// Reads a captured pipe to completion, tolerating invalid UTF-8.
async fn drain_pipe<R>(pipe: Option<R>) -> String
where
    R: tokio::io::AsyncRead + Unpin,
{
    let Some(mut pipe) = pipe else {
        return String::new();
    };
    let mut buf = Vec::new();
    let _ = pipe.read_to_end(&mut buf).await;
    String::from_utf8_lossy(&buf).into_owned()
}

/// Forcibly terminates the child's whole process group and reaps it.
#[cfg(unix)]
async fn kill_process_group(child: &mut Child) {
    if let Some(pid) = child.id() {
        // Spawned as its own group leader, so this reaches every process
        // in the tree, shell and compiler included.
        unsafe {
            libc::killpg(pid as i32, libc::SIGKILL);
        }
    }
    let _ = child.wait().await;
}

#[cfg(not(unix))]
async fn kill_process_group(child: &mut Child) {
    let _ = child.kill().await;
    let _ = child.wait().await;
}

/// Probes whether a toolchain binary is on PATH. Used by callers (and
/// tests) to decide whether an execution attempt can work at all.
pub fn toolchain_available(binary: &str) -> bool {
    std::process::Command::new("which")
        .arg(binary)
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}
