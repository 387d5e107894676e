/// CLI command handlers
pub mod run;
pub mod validate;

#[cfg(test)]
mod tests;

use anyhow::Result;

/// Trait for CLI command handlers
#[allow(async_fn_in_trait)]
pub trait CommandHandler {
    /// Execute the command and produce the process exit outcome
    async fn execute(&self) -> Result<CommandResult>;
}

/// Command execution result: the exit code the process should report and an
/// optional message for the user.
#[derive(Debug)]
pub struct CommandResult {
    pub exit_code: i32,
    pub message: Option<String>,
}

impl CommandResult {
    pub fn success_with_message(message: String) -> Self {
        Self {
            exit_code: 0,
            message: Some(message),
        }
    }

    pub fn failure(exit_code: i32, message: String) -> Self {
        Self {
            exit_code,
            message: Some(message),
        }
    }
}
