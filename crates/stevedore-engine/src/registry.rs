// crates/stevedore-engine/src/registry.rs
use std::collections::HashSet;
use std::path::{Component, Path};

use stevedore_core::error::ConfigError;
use stevedore_core::types::Module;

/// The ordered list of deployable modules for one run.
///
/// Validated at construction and read-only afterwards; no component mutates
/// it mid-run. Order is significant: later modules may assume earlier ones
/// completed.
#[derive(Debug, Clone)]
pub struct ModuleRegistry {
    modules: Vec<Module>,
}

impl ModuleRegistry {
    /// Build a registry, rejecting duplicate module names and working
    /// directories that are empty or escape the source tree.
    ///
    /// Validation is lexical: an absolute path passes here and fails at
    /// execution time when the directory is not found under the source root.
    pub fn new(modules: Vec<Module>) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        for module in &modules {
            if !seen.insert(module.name.as_str()) {
                return Err(ConfigError::DuplicateModule(module.name.clone()));
            }
            validate_working_directory(module)?;
        }
        Ok(Self { modules })
    }

    pub fn list(&self) -> &[Module] {
        &self.modules
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

fn validate_working_directory(module: &Module) -> Result<(), ConfigError> {
    if module.working_directory.trim().is_empty() {
        return Err(ConfigError::InvalidPath {
            module: module.name.clone(),
            path: module.working_directory.clone(),
            reason: "working directory is empty".to_string(),
        });
    }
    let has_traversal = Path::new(&module.working_directory)
        .components()
        .any(|c| matches!(c, Component::ParentDir));
    if has_traversal {
        return Err(ConfigError::InvalidPath {
            module: module.name.clone(),
            path: module.working_directory.clone(),
            reason: "parent-directory traversal escapes the source tree".to_string(),
        });
    }
    Ok(())
}
