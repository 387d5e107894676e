use std::time::Duration;

use anyhow::{anyhow, Result};
use log::{debug, info};

use stevedore_core::config::{load_pipeline_file, PipelineConfig};
use stevedore_core::types::FailurePolicy;
use stevedore_engine::provision::{Installer, LocalCheckout, NoopInstaller, Provisioner};
use stevedore_engine::{ModuleRegistry, Orchestrator, StepExecutor};

use super::{CommandHandler, CommandResult};
use crate::report::{self, EXIT_CONFIG_FAILURE};

/// `run` command: provision, load secrets, deploy every module, report.
pub struct RunCommand {
    pub config: String,
    pub halt_on_error: bool,
    pub timeout: Option<u64>,
    pub branch: Option<String>,
    pub source_root: String,
    pub json: bool,
    pub no_strict_secrets: bool,
}

impl RunCommand {
    fn policy(&self, config: &PipelineConfig) -> FailurePolicy {
        if self.halt_on_error {
            FailurePolicy::HaltOnError
        } else {
            config.failure_policy
        }
    }
}

impl CommandHandler for RunCommand {
    async fn execute(&self) -> Result<CommandResult> {
        let config = match load_pipeline_file(&self.config).await {
            Ok(config) => config,
            Err(e) => return Ok(CommandResult::failure(EXIT_CONFIG_FAILURE, e.to_string())),
        };

        if let Some(branch) = &self.branch {
            if !config.trigger.tracks(branch) {
                return Ok(CommandResult::success_with_message(format!(
                    "Branch '{}' is not tracked by this pipeline; nothing to do",
                    branch
                )));
            }
        }

        let registry = match ModuleRegistry::new(config.modules.clone()) {
            Ok(registry) => registry,
            Err(e) => return Ok(CommandResult::failure(EXIT_CONFIG_FAILURE, e.to_string())),
        };

        let provisioner = LocalCheckout::new(&self.source_root);
        let source_root = match provisioner.provision().await {
            Ok(root) => root,
            Err(e) => return Ok(CommandResult::failure(EXIT_CONFIG_FAILURE, e.to_string())),
        };
        if let Err(e) = NoopInstaller.install(&source_root).await {
            return Ok(CommandResult::failure(EXIT_CONFIG_FAILURE, e.to_string()));
        }

        info!(
            "Running pipeline '{}' ({} module(s))",
            config.name,
            registry.len()
        );
        let mut orchestrator = Orchestrator::new(
            StepExecutor::new(source_root),
            self.policy(&config),
        )
        .with_strict_secrets(!self.no_strict_secrets);
        if let Some(seconds) = self.timeout {
            orchestrator = orchestrator.with_timeout(Duration::from_secs(seconds));
        }

        let cancel = orchestrator.cancellation_token();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                debug!("Interrupt received, cancelling run");
                cancel.cancel();
            }
        });

        let run_report = orchestrator.run(&registry, &config.secrets).await;

        if self.json {
            let rendered = serde_json::to_string_pretty(&run_report)
                .map_err(|e| anyhow!("Failed to serialize run report: {}", e))?;
            println!("{}", rendered);
        } else {
            report::print_human(&run_report);
        }

        Ok(CommandResult {
            exit_code: report::exit_code_for(&run_report),
            message: None,
        })
    }
}
