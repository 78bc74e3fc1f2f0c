//! Command Runner: invokes external programs with a timeout and classifies
//! the result rather than collapsing everything into pass/fail. Classifying
//! "missing binary" separately from "failed" is what lets collectors degrade
//! gracefully to "N/A" instead of crash-looping (see `CollectorOutcome`).

use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    Missing,
    Timeout,
    Nonzero,
    IoError,
}

#[derive(Debug, Clone)]
pub struct RunResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
    pub outcome: Outcome,
}

impl RunResult {
    fn failed(outcome: Outcome) -> Self {
        RunResult {
            stdout: String::new(),
            stderr: String::new(),
            exit_code: None,
            outcome,
        }
    }
}

/// Runs `argv[0]` with the remaining entries as arguments. No `$PATH`
/// shell-expansion, no shell at all: if the binary cannot be spawned because
/// it does not exist, that is `Outcome::Missing`, not `Outcome::IoError`.
pub async fn run(argv: &[&str], timeout_duration: Duration) -> RunResult {
    let Some((program, args)) = argv.split_first() else {
        return RunResult::failed(Outcome::IoError);
    };

    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = match command.spawn() {
        Ok(child) => child,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return RunResult::failed(Outcome::Missing);
        }
        Err(_) => return RunResult::failed(Outcome::IoError),
    };

    match timeout(timeout_duration, child.wait_with_output()).await {
        Err(_) => {
            // The timed-out child's process tree is reaped by `kill_on_drop`
            // when `child` drops here; partial output is discarded.
            RunResult::failed(Outcome::Timeout)
        }
        Ok(Err(_)) => RunResult::failed(Outcome::IoError),
        Ok(Ok(output)) => {
            let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            let exit_code = output.status.code();
            let outcome = if output.status.success() {
                Outcome::Ok
            } else {
                Outcome::Nonzero
            };
            RunResult {
                stdout,
                stderr,
                exit_code,
                outcome,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_missing_binary_does_not_invoke_shell() {
        let result = run(
            &["definitely-not-a-real-binary-name-xyz"],
            Duration::from_secs(1),
        )
        .await;
        assert_eq!(result.outcome, Outcome::Missing);
        assert_eq!(result.stdout, "");
    }

    #[tokio::test]
    async fn test_ok_exit_and_stdout_captured() {
        let result = run(&["echo", "hello"], Duration::from_secs(5)).await;
        assert_eq!(result.outcome, Outcome::Ok);
        assert_eq!(result.stdout.trim(), "hello");
    }

    #[tokio::test]
    async fn test_nonzero_exit_classified() {
        let result = run(&["false"], Duration::from_secs(5)).await;
        assert_eq!(result.outcome, Outcome::Nonzero);
    }

    #[tokio::test]
    async fn test_timeout_classified() {
        let result = run(&["sleep", "5"], Duration::from_millis(50)).await;
        assert_eq!(result.outcome, Outcome::Timeout);
    }
}
