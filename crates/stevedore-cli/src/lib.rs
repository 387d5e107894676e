// crates/stevedore-cli/src/lib.rs
pub mod args;
pub mod cli;
pub mod commands;
pub mod report;
