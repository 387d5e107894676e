//! Run report rendering and exit-code mapping.

use owo_colors::OwoColorize;

use stevedore_core::types::{RunReport, StepStatus};

/// Every module deployed.
pub const EXIT_COMPLETED: i32 = 0;
/// At least one module failed.
pub const EXIT_MODULE_FAILURE: i32 = 1;
/// The run never started: bad pipeline definition, secrets, or provisioning.
pub const EXIT_CONFIG_FAILURE: i32 = 2;
/// The run was cancelled (timeout budget or signal).
pub const EXIT_CANCELLED: i32 = 124;

/// Map a sealed run report to the process exit code. A completed run exits
/// zero even when the cancellation token fired after the last module
/// succeeded: nothing was actually interrupted.
pub fn exit_code_for(report: &RunReport) -> i32 {
    if report.failure.is_some() {
        EXIT_CONFIG_FAILURE
    } else if report.is_completed() {
        EXIT_COMPLETED
    } else if report.cancelled {
        EXIT_CANCELLED
    } else {
        EXIT_MODULE_FAILURE
    }
}

/// Print the human-readable run summary to stdout.
pub fn print_human(report: &RunReport) {
    for step in &report.steps {
        match &step.status {
            StepStatus::Success => {
                println!("{} {}", "ok".green(), step.module_name);
            }
            StepStatus::Failure { code, reason } => match code {
                Some(code) => println!(
                    "{} {} (exit {}): {}",
                    "failed".red(),
                    step.module_name,
                    code,
                    reason
                ),
                None => println!("{} {}: {}", "failed".red(), step.module_name, reason),
            },
            StepStatus::Skipped => {
                println!("{} {}", "skipped".dimmed(), step.module_name);
            }
        }
    }
    if let Some(failure) = &report.failure {
        eprintln!("{}: {}", "run failed".red(), failure);
    }
    let status = if report.is_completed() {
        format!("{}", "completed".green())
    } else if report.cancelled {
        format!("{}", "cancelled".red())
    } else {
        format!("{}", "failed".red())
    };
    println!(
        "run {} {} in {} ms ({} module(s))",
        report.run_id,
        status,
        report.total_duration_ms,
        report.steps.len()
    );
}
