use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "stevedore",
    about = "Multi-module deployment orchestrator",
    version
)]
pub struct StevedoreArgs {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(about = "Execute a deployment run")]
    Run {
        #[arg(short, long, value_name = "FILE", help = "The YAML pipeline definition")]
        config: String,

        #[arg(long, help = "Stop at the first failed module and skip the rest")]
        halt_on_error: bool,

        #[arg(long, value_name = "SECONDS", help = "Whole-run timeout budget")]
        timeout: Option<u64>,

        #[arg(
            long,
            value_name = "NAME",
            help = "Branch that triggered this run; untracked branches skip the run"
        )]
        branch: Option<String>,

        #[arg(
            long,
            value_name = "DIR",
            default_value = ".",
            help = "Root of the provisioned source tree"
        )]
        source_root: String,

        #[arg(long, help = "Print the machine-readable JSON run report")]
        json: bool,

        #[arg(
            long,
            help = "Load secrets with unresolved placeholders instead of failing"
        )]
        no_strict_secrets: bool,
    },

    #[command(about = "Validate a pipeline definition without running it")]
    Validate {
        #[arg(short, long, value_name = "FILE", help = "The YAML pipeline definition")]
        config: String,
    },
}
