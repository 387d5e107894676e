// crates/stevedore-engine/src/lib.rs
pub mod executor;
pub mod orchestrator;
pub mod provision;
pub mod registry;

pub use executor::StepExecutor;
pub use orchestrator::Orchestrator;
pub use registry::ModuleRegistry;
