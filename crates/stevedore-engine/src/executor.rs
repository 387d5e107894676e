// crates/stevedore-engine/src/executor.rs
use std::path::{Path, PathBuf};
use std::process::Stdio;

use chrono::Utc;
use log::{debug, warn};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use stevedore_core::secrets::SecretSet;
use stevedore_core::types::{Module, StepResult, StepStatus};

/// Default bound on captured output per module.
pub const DEFAULT_OUTPUT_LIMIT: usize = 64 * 1024;

/// Appended to captured output when the bound is exceeded.
pub const TRUNCATION_MARKER: &str = "\n...[output truncated]";

enum CommandOutcome {
    Success(String),
    Failed { output: String, code: Option<i32> },
    SpawnError(String),
    Cancelled,
}

/// Executes one module's deployment commands in its working directory.
///
/// Never raises past its boundary: every lower-level failure (missing
/// directory, missing interpreter, permission error, non-zero exit,
/// cancellation) is translated into a `StepResult` failure.
pub struct StepExecutor {
    source_root: PathBuf,
    output_limit: usize,
}

impl StepExecutor {
    pub fn new(source_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            output_limit: DEFAULT_OUTPUT_LIMIT,
        }
    }

    pub fn with_output_limit(mut self, limit: usize) -> Self {
        self.output_limit = limit;
        self
    }

    /// Run the module's commands in order, short-circuiting on the first
    /// non-zero exit. An empty command list always yields success.
    pub async fn execute(
        &self,
        module: &Module,
        secrets: &SecretSet,
        cancel: &CancellationToken,
    ) -> StepResult {
        let started_at = Utc::now();
        debug!("Executing module '{}'", module.name);

        // Resolved once per module at execution time, not cached across runs.
        let dir = self.source_root.join(&module.working_directory);
        if !dir.is_dir() {
            warn!(
                "Module '{}': working directory not found: {}",
                module.name,
                dir.display()
            );
            return self.seal(
                module,
                StepStatus::Failure {
                    code: None,
                    reason: format!("working directory not found: {}", dir.display()),
                },
                String::new(),
                secrets,
                started_at,
            );
        }

        let mut output = String::new();
        let mut status = StepStatus::Success;

        for command in &module.commands {
            if cancel.is_cancelled() {
                status = cancellation_failure(command);
                break;
            }
            debug!("Module '{}': running command: {}", module.name, command);
            match self.run_command(command, &dir, secrets, cancel).await {
                CommandOutcome::Success(chunk) => {
                    output.push_str(&chunk);
                }
                CommandOutcome::Failed { output: chunk, code } => {
                    output.push_str(&chunk);
                    status = StepStatus::Failure {
                        code,
                        reason: format!("command failed: {}", command),
                    };
                    break;
                }
                CommandOutcome::SpawnError(reason) => {
                    status = StepStatus::Failure {
                        code: None,
                        reason: format!("failed to spawn '{}': {}", command, reason),
                    };
                    break;
                }
                CommandOutcome::Cancelled => {
                    status = cancellation_failure(command);
                    break;
                }
            }
        }

        self.seal(module, status, output, secrets, started_at)
    }

    async fn run_command(
        &self,
        command: &str,
        dir: &Path,
        secrets: &SecretSet,
        cancel: &CancellationToken,
    ) -> CommandOutcome {
        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(command)
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        for (key, value) in secrets.iter() {
            cmd.env(key, value);
        }

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => return CommandOutcome::SpawnError(e.to_string()),
        };
        let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
            return CommandOutcome::SpawnError("failed to attach output pipes".to_string());
        };

        // Retain one byte past the limit per stream so sealing sees the
        // overflow and appends the truncation marker; bytes beyond that
        // are drained and dropped, never buffered.
        let cap = self.output_limit.saturating_add(1);
        let run = async {
            let (stdout_bytes, stderr_bytes) =
                tokio::join!(drain_capped(stdout, cap), drain_capped(stderr, cap));
            let status = child.wait().await;
            (stdout_bytes, stderr_bytes, status)
        };

        tokio::select! {
            // Dropping the run future drops the child, which kill_on_drop reaps.
            _ = cancel.cancelled() => CommandOutcome::Cancelled,
            (stdout_bytes, stderr_bytes, status) = run => {
                let mut combined = String::from_utf8_lossy(&stdout_bytes).into_owned();
                combined.push_str(&String::from_utf8_lossy(&stderr_bytes));
                match status {
                    Ok(status) if status.success() => CommandOutcome::Success(combined),
                    Ok(status) => CommandOutcome::Failed {
                        output: combined,
                        code: status.code(),
                    },
                    Err(e) => CommandOutcome::SpawnError(e.to_string()),
                }
            }
        }
    }

    fn seal(
        &self,
        module: &Module,
        status: StepStatus,
        output: String,
        secrets: &SecretSet,
        started_at: chrono::DateTime<Utc>,
    ) -> StepResult {
        // Redact before bounding so a secret straddling the cut cannot leak.
        let captured_output = self.bound_output(secrets.redact(&output));
        StepResult {
            module_name: module.name.clone(),
            status,
            started_at,
            finished_at: Utc::now(),
            captured_output,
        }
    }

    fn bound_output(&self, text: String) -> String {
        if text.len() <= self.output_limit {
            return text;
        }
        let mut cut = self.output_limit;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        let mut bounded = text[..cut].to_string();
        bounded.push_str(TRUNCATION_MARKER);
        bounded
    }
}

/// Read a child output stream to EOF, keeping at most `cap` bytes in memory.
/// The stream is always drained fully so the child never blocks on a full
/// pipe after the cap is reached.
async fn drain_capped<R: AsyncRead + Unpin>(mut reader: R, cap: usize) -> Vec<u8> {
    let mut retained = Vec::new();
    let mut chunk = [0u8; 8192];
    loop {
        match reader.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                if retained.len() < cap {
                    let take = n.min(cap - retained.len());
                    retained.extend_from_slice(&chunk[..take]);
                }
            }
        }
    }
    retained
}

fn cancellation_failure(command: &str) -> StepStatus {
    StepStatus::Failure {
        code: None,
        reason: format!("cancelled while running: {}", command),
    }
}
