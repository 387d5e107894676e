use anyhow::Result;

use stevedore_core::config::load_pipeline_file;
use stevedore_core::secrets::SecretSet;
use stevedore_engine::ModuleRegistry;

use super::{CommandHandler, CommandResult};
use crate::report::EXIT_CONFIG_FAILURE;

/// `validate` command: parse the definition and run construction-time
/// checks without executing anything.
pub struct ValidateCommand {
    pub config: String,
}

impl CommandHandler for ValidateCommand {
    async fn execute(&self) -> Result<CommandResult> {
        let config = match load_pipeline_file(&self.config).await {
            Ok(config) => config,
            Err(e) => return Ok(CommandResult::failure(EXIT_CONFIG_FAILURE, e.to_string())),
        };
        if let Err(e) = ModuleRegistry::new(config.modules.clone()) {
            return Ok(CommandResult::failure(EXIT_CONFIG_FAILURE, e.to_string()));
        }
        if let Err(e) = SecretSet::validate_entries(&config.secrets) {
            return Ok(CommandResult::failure(EXIT_CONFIG_FAILURE, e.to_string()));
        }
        Ok(CommandResult::success_with_message(format!(
            "Pipeline '{}' is valid: {} module(s), {} secret(s)",
            config.name,
            config.modules.len(),
            config.secrets.len()
        )))
    }
}
