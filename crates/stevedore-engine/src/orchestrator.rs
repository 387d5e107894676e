// crates/stevedore-engine/src/orchestrator.rs
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use stevedore_core::secrets::SecretSet;
use stevedore_core::types::{
    FailurePolicy, RunReport, RunStatus, SecretEntry, StepResult,
};

use crate::executor::StepExecutor;
use crate::registry::ModuleRegistry;

/// Run lifecycle. Terminal states seal the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    NotStarted,
    Provisioning,
    Running,
    Completed,
    Failed,
}

/// Walks the module registry in order, delegates each entry to the step
/// executor, applies the failure policy, and produces the run report.
pub struct Orchestrator {
    executor: StepExecutor,
    policy: FailurePolicy,
    strict_secrets: bool,
    timeout: Option<Duration>,
    cancel: CancellationToken,
}

impl Orchestrator {
    pub fn new(executor: StepExecutor, policy: FailurePolicy) -> Self {
        Self {
            executor,
            policy,
            strict_secrets: true,
            timeout: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Whole-run timeout budget. When it elapses, the in-flight module is
    /// failed with a cancellation reason and the rest are skipped.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_strict_secrets(mut self, strict: bool) -> Self {
        self.strict_secrets = strict;
        self
    }

    /// Handle for external cancellation (Ctrl-C, supervisor shutdown).
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Execute one run end to end. Always produces a report: a fatal secret
    /// loading failure yields a zero-step report carrying the reason.
    pub async fn run(
        &self,
        registry: &ModuleRegistry,
        secret_entries: &[SecretEntry],
    ) -> RunReport {
        let run_id = Uuid::new_v4().to_string();
        let started = Instant::now();
        let mut state = RunState::NotStarted;
        debug!("Run {}: state {:?}", run_id, state);

        state = RunState::Provisioning;
        debug!("Run {}: state {:?}", run_id, state);
        let secrets = match SecretSet::load(secret_entries, self.strict_secrets) {
            Ok(secrets) => secrets,
            Err(e) => {
                // Secrets are a precondition for every module: no module is
                // attempted and the report records why nothing ran.
                warn!("Run {}: secret loading failed: {}", run_id, e);
                return self.seal(run_id, vec![], started, Some(e.to_string()));
            }
        };
        secrets.export_process_env();

        let timeout_arm = self.timeout.map(|budget| {
            let cancel = self.cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(budget).await;
                warn!("Run timeout budget of {:?} exceeded, cancelling", budget);
                cancel.cancel();
            })
        });

        state = RunState::Running;
        debug!("Run {}: state {:?}", run_id, state);
        let mut steps: Vec<StepResult> = Vec::with_capacity(registry.len());
        let mut halted = false;

        for module in registry.list() {
            if halted || self.cancel.is_cancelled() {
                steps.push(StepResult::skipped(&module.name));
                continue;
            }
            info!("Deploying module '{}'", module.name);
            let result = self.executor.execute(module, &secrets, &self.cancel).await;
            if result.status.is_failure() {
                match self.policy {
                    FailurePolicy::HaltOnError => {
                        warn!(
                            "Module '{}' failed; halting remaining modules",
                            module.name
                        );
                        halted = true;
                    }
                    FailurePolicy::ContinueOnError => {
                        warn!("Module '{}' failed; continuing", module.name);
                    }
                }
            }
            steps.push(result);
        }

        if let Some(arm) = timeout_arm {
            arm.abort();
        }

        let report = self.seal(run_id, steps, started, None);
        state = if report.status == RunStatus::Completed {
            RunState::Completed
        } else {
            RunState::Failed
        };
        debug!("Run {}: state {:?}", report.run_id, state);
        report
    }

    fn seal(
        &self,
        run_id: String,
        steps: Vec<StepResult>,
        started: Instant,
        failure: Option<String>,
    ) -> RunReport {
        let all_succeeded = failure.is_none() && steps.iter().all(|s| s.status.is_success());
        RunReport {
            run_id,
            status: if all_succeeded {
                RunStatus::Completed
            } else {
                RunStatus::Failed
            },
            steps,
            total_duration_ms: started.elapsed().as_millis() as u64,
            cancelled: self.cancel.is_cancelled(),
            failure,
        }
    }
}
