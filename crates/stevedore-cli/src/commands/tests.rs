use clap::Parser;
use std::io::Write;
use tempfile::NamedTempFile;

use crate::args::{Commands, StevedoreArgs};
use crate::commands::{run::RunCommand, validate::ValidateCommand, CommandHandler};
use crate::report::{EXIT_COMPLETED, EXIT_CONFIG_FAILURE, EXIT_MODULE_FAILURE};

fn definition_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", content).unwrap();
    file
}

fn run_command(config: &str) -> RunCommand {
    RunCommand {
        config: config.to_string(),
        halt_on_error: false,
        timeout: None,
        branch: None,
        source_root: ".".to_string(),
        json: false,
        no_strict_secrets: false,
    }
}

#[test]
fn parses_run_arguments() {
    let args = StevedoreArgs::try_parse_from([
        "stevedore",
        "run",
        "--config",
        "pipeline.yaml",
        "--halt-on-error",
        "--timeout",
        "600",
        "--branch",
        "main",
    ])
    .unwrap();
    match args.command {
        Commands::Run {
            config,
            halt_on_error,
            timeout,
            branch,
            ..
        } => {
            assert_eq!(config, "pipeline.yaml");
            assert!(halt_on_error);
            assert_eq!(timeout, Some(600));
            assert_eq!(branch.as_deref(), Some("main"));
        }
        other => panic!("unexpected command: {:?}", other),
    }
}

#[test]
fn run_requires_a_config() {
    assert!(StevedoreArgs::try_parse_from(["stevedore", "run"]).is_err());
}

#[tokio::test]
async fn run_with_noop_modules_completes() {
    let file = definition_file(
        "modules:\n  - name: here\n    working_directory: .\n    commands: []\n",
    );
    let result = run_command(file.path().to_str().unwrap())
        .execute()
        .await
        .unwrap();
    assert_eq!(result.exit_code, EXIT_COMPLETED);
}

#[tokio::test]
async fn run_reports_module_failure() {
    let file = definition_file(
        "modules:\n  - name: here\n    working_directory: .\n    commands: [\"exit 7\"]\n",
    );
    let result = run_command(file.path().to_str().unwrap())
        .execute()
        .await
        .unwrap();
    assert_eq!(result.exit_code, EXIT_MODULE_FAILURE);
}

#[tokio::test]
async fn run_rejects_missing_definition() {
    let result = run_command("/nonexistent/pipeline.yaml")
        .execute()
        .await
        .unwrap();
    assert_eq!(result.exit_code, EXIT_CONFIG_FAILURE);
}

#[tokio::test]
async fn run_rejects_duplicate_modules() {
    let file = definition_file(
        "modules:\n  - name: dup\n    working_directory: a\n  - name: dup\n    working_directory: b\n",
    );
    let result = run_command(file.path().to_str().unwrap())
        .execute()
        .await
        .unwrap();
    assert_eq!(result.exit_code, EXIT_CONFIG_FAILURE);
}

#[tokio::test]
async fn untracked_branch_skips_the_run() {
    let file = definition_file(
        "trigger:\n  branches: [main]\nmodules:\n  - name: here\n    working_directory: .\n    commands: [\"exit 1\"]\n",
    );
    let mut command = run_command(file.path().to_str().unwrap());
    command.branch = Some("feature/unrelated".to_string());
    let result = command.execute().await.unwrap();
    // The failing command never ran: the branch gate exits cleanly first.
    assert_eq!(result.exit_code, EXIT_COMPLETED);
    assert!(result.message.unwrap().contains("not tracked"));
}

#[tokio::test]
async fn validate_accepts_a_good_definition() {
    let file = definition_file(
        "modules:\n  - name: badges\n    working_directory: lms/djangoapps/badges\n",
    );
    let result = ValidateCommand {
        config: file.path().to_str().unwrap().to_string(),
    }
    .execute()
    .await
    .unwrap();
    assert_eq!(result.exit_code, EXIT_COMPLETED);
}

#[tokio::test]
async fn validate_rejects_placeholder_secrets() {
    let file = definition_file(
        "secrets:\n  - key: DB_PASSWORD\n    value_template: \"mysql://u:<password>@db/prod\"\nmodules: []\n",
    );
    let result = ValidateCommand {
        config: file.path().to_str().unwrap().to_string(),
    }
    .execute()
    .await
    .unwrap();
    assert_eq!(result.exit_code, EXIT_CONFIG_FAILURE);
    assert!(result.message.unwrap().contains("DB_PASSWORD"));
}

#[tokio::test]
async fn validate_rejects_traversal_paths() {
    let file = definition_file(
        "modules:\n  - name: escape\n    working_directory: ../outside\n",
    );
    let result = ValidateCommand {
        config: file.path().to_str().unwrap().to_string(),
    }
    .execute()
    .await
    .unwrap();
    assert_eq!(result.exit_code, EXIT_CONFIG_FAILURE);
}
