// crates/stevedore-core/src/lib.rs
pub mod config;
pub mod error;
pub mod secrets;
pub mod types;
