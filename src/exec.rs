//! Bounded subprocess execution.
//!
//! The statusline must never stall the prompt, so every child process runs on
//! a throwaway current-thread runtime under a deadline. Children are killed
//! when the deadline drops their future.

use std::future::Future;
use std::process::{Output, Stdio};
use std::time::Duration;

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("timeout")]
    Timeout,

    #[error("failed to create tokio runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Drive `fut` to completion, giving up after `budget`.
pub fn block_on_with_timeout<F: Future>(budget: Duration, fut: F) -> Result<F::Output, ExecError> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(ExecError::Runtime)?;

    rt.block_on(async { tokio::time::timeout(budget, fut).await })
        .map_err(|_| ExecError::Timeout)
}

/// Run `cmd` to completion, optionally feeding `stdin`, capturing both
/// output streams.
pub async fn output(mut cmd: Command, stdin: Option<&[u8]>) -> std::io::Result<Output> {
    cmd.stdin(if stdin.is_some() {
        Stdio::piped()
    } else {
        Stdio::null()
    })
    .stdout(Stdio::piped())
    .stderr(Stdio::piped())
    .kill_on_drop(true);

    let mut child = cmd.spawn()?;
    let pipe = child.stdin.take();

    // Output is drained while stdin is fed, so a child that writes before
    // it reads cannot fill its pipe and stall.
    let feed = async move {
        if let (Some(bytes), Some(mut pipe)) = (stdin, pipe) {
            // The child may exit without reading; a broken pipe is not our error.
            let _ = pipe.write_all(bytes).await;
        }
    };

    let ((), output) = tokio::join!(feed, child.wait_with_output());
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ready_future_completes() {
        let out = block_on_with_timeout(Duration::from_secs(1), async { 7 }).unwrap();
        assert_eq!(out, 7);
    }

    #[test]
    fn test_slow_future_times_out() {
        let result = block_on_with_timeout(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
        });
        assert!(matches!(result, Err(ExecError::Timeout)));
        assert_eq!(result.unwrap_err().to_string(), "timeout");
    }

    #[cfg(unix)]
    #[test]
    fn test_output_feeds_stdin() {
        let mut cmd = Command::new("cat");
        cmd.arg("-");
        let out = block_on_with_timeout(Duration::from_secs(5), output(cmd, Some(b"hello")))
            .unwrap()
            .unwrap();
        assert!(out.status.success());
        assert_eq!(String::from_utf8_lossy(&out.stdout), "hello");
    }

    #[test]
    fn test_output_missing_program_is_io_error() {
        let cmd = Command::new("definitely-not-a-real-program-cc-statusline");
        let result = block_on_with_timeout(Duration::from_secs(5), output(cmd, None)).unwrap();
        assert!(result.is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_output_drains_while_feeding_stdin() {
        const SIZE: usize = 256 * 1024;
        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(format!("head -c {} /dev/zero; cat >/dev/null", SIZE));
        let input = vec![b'x'; SIZE];
        let out = block_on_with_timeout(
            Duration::from_secs(10),
            output(cmd, Some(input.as_slice())),
        )
        .unwrap()
        .unwrap();
        assert!(out.status.success());
        assert_eq!(out.stdout.len(), SIZE);
    }
}
