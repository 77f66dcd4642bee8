//! External text-completion capability used to improve suggestions.
//!
//! The suggestion engine only sees the [`Oracle`] trait, so tests can swap in
//! a stub. [`OllamaOracle`] drives a locally installed `ollama` binary.

use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

pub const DEFAULT_ORACLE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
pub enum OracleError {
    #[error("failed to run oracle: {0}")]
    Io(#[from] std::io::Error),

    #[error("oracle timed out after {0:?}")]
    Timeout(Duration),

    #[error("oracle failed: {0}")]
    Failed(String),

    #[error("all {0} oracle invocations failed")]
    Exhausted(usize),
}

#[async_trait]
pub trait Oracle: Send + Sync {
    /// Complete `prompt`, giving up after `timeout`.
    async fn complete(&self, prompt: &str, timeout: Duration) -> Result<String, OracleError>;
}

/// Runs `ollama` as a child process, trying each known argument layout in
/// turn until one exits cleanly with output.
#[derive(Debug, Clone)]
pub struct OllamaOracle {
    program: String,
    model: String,
}

impl OllamaOracle {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            program: "ollama".to_string(),
            model: model.into(),
        }
    }

    /// Use a different executable, e.g. a wrapper script or absolute path.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn invocations<'a>(&'a self, prompt: &'a str) -> [Vec<&'a str>; 3] {
        let model = self.model.as_str();
        [
            vec!["generate", model, prompt],
            vec![
                "generate",
                model,
                "--num-outputs",
                "1",
                "--no-stream",
                "--",
                prompt,
            ],
            vec!["run", model, "--", prompt],
        ]
    }

    async fn run(&self, args: &[&str], timeout: Duration) -> Result<String, OracleError> {
        let child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        // Dropping the future on timeout drops the child, which kills it
        let output = tokio::time::timeout(timeout, child.wait_with_output())
            .await
            .map_err(|_| OracleError::Timeout(timeout))??;

        if !output.status.success() {
            return Err(OracleError::Failed(format!("exited with {}", output.status)));
        }

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if stdout.is_empty() {
            return Err(OracleError::Failed("empty output".to_string()));
        }

        Ok(stdout)
    }
}

#[async_trait]
impl Oracle for OllamaOracle {
    async fn complete(&self, prompt: &str, timeout: Duration) -> Result<String, OracleError> {
        let invocations = self.invocations(prompt);
        for (idx, args) in invocations.iter().enumerate() {
            match self.run(args, timeout).await {
                Ok(reply) => return Ok(reply),
                Err(e) => debug!("{} invocation {} failed: {}", self.program, idx + 1, e),
            }
        }
        Err(OracleError::Exhausted(invocations.len()))
    }
}
