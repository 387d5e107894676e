// crates/stevedore-core/src/types.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One independently deployable unit: a logical name, a working directory
/// relative to the provisioned source tree, and the commands to run there.
///
/// An empty command list is a valid no-op module and always succeeds.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Module {
    pub name: String,
    pub working_directory: String,
    #[serde(default)]
    pub commands: Vec<String>,
}

/// A secret declaration from the pipeline definition. The template is either
/// a `${VAR}` environment reference or a literal value.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SecretEntry {
    pub key: String,
    pub value_template: String,
}

/// Rule governing whether a per-module failure halts subsequent modules.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Record the failure and proceed to the next module (default: modules
    /// are declared independently and should not block each other)
    #[default]
    ContinueOnError,
    /// Stop iterating and mark the remaining modules as skipped
    HaltOnError,
}

/// Outcome of one module's deployment attempt.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StepStatus {
    Success,
    Failure { code: Option<i32>, reason: String },
    Skipped,
}

impl StepStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, StepStatus::Success)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, StepStatus::Failure { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, StepStatus::Skipped)
    }
}

/// Outcome record for one attempted module. Exactly one exists per module
/// per run; skipped modules still produce one.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StepResult {
    pub module_name: String,
    #[serde(flatten)]
    pub status: StepStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub captured_output: String,
}

impl StepResult {
    /// A skipped result carries no output; its timestamps record when the
    /// skip was decided.
    pub fn skipped(module_name: &str) -> Self {
        let now = Utc::now();
        Self {
            module_name: module_name.to_string(),
            status: StepStatus::Skipped,
            started_at: now,
            finished_at: now,
            captured_output: String::new(),
        }
    }
}

/// Overall run status: completed iff every attempted module succeeded.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    Failed,
}

/// Aggregate outcome of one run. Step results appear in registry order,
/// which is part of the externally observable contract. The report is
/// sealed once the orchestrator reaches a terminal state.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RunReport {
    pub run_id: String,
    pub status: RunStatus,
    pub steps: Vec<StepResult>,
    pub total_duration_ms: u64,
    pub cancelled: bool,
    /// Fatal failure reason for best-effort partial reports, so callers can
    /// distinguish "nothing ran" from "some modules ran and one failed"
    pub failure: Option<String>,
}

impl RunReport {
    pub fn is_completed(&self) -> bool {
        self.status == RunStatus::Completed
    }
}
