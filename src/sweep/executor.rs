//! External process execution.

use std::ffi::OsString;
use std::process::Stdio;

/// Captured outcome of one process invocation
#[derive(Debug, Clone, Default)]
pub struct ProcessOutput {
    /// Exit status code, `None` when terminated by a signal
    pub exit_code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Error stream as lossy UTF-8, trimmed
    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_string()
    }
}

/// Capability to run an external program to completion.
///
/// `argv[0]` is the program, the rest are its arguments. The call blocks the
/// sweep until the process exits; there is no timeout.
#[allow(async_fn_in_trait)]
pub trait ProcessExecutor {
    async fn execute(&self, argv: &[OsString]) -> std::io::Result<ProcessOutput>;
}

impl<E: ProcessExecutor> ProcessExecutor for std::sync::Arc<E> {
    async fn execute(&self, argv: &[OsString]) -> std::io::Result<ProcessOutput> {
        (**self).execute(argv).await
    }
}

/// Executor backed by `tokio::process`
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioExecutor;

impl ProcessExecutor for TokioExecutor {
    async fn execute(&self, argv: &[OsString]) -> std::io::Result<ProcessOutput> {
        let (program, args) = argv.split_first().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty argv")
        })?;

        let output = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        Ok(ProcessOutput {
            exit_code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}
