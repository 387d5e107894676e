// crates/stevedore-core/src/secrets.rs
use std::env;
use std::fmt;

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ConfigError;
use crate::types::SecretEntry;

/// Replacement text for secret values scrubbed from captured output.
pub const REDACTED: &str = "***REDACTED***";

// A literal `<password>`-style marker left in a template is a config bug,
// not a value to deploy with.
static RE_PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[A-Za-z][A-Za-z0-9_. -]*>").expect("valid regex"));

static RE_ENV_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\$\{([A-Za-z_][A-Za-z0-9_]*)\}$").expect("valid regex"));

/// A resolved name/value pair injected into every module's environment.
/// The value is immutable for the duration of the run and never logged
/// in full.
#[derive(Clone)]
pub struct SecretBinding {
    key: String,
    value: String,
}

impl SecretBinding {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Debug for SecretBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretBinding")
            .field("key", &self.key)
            .field("value", &REDACTED)
            .finish()
    }
}

/// The immutable binding set for one run. All modules observe the same set.
#[derive(Debug, Clone, Default)]
pub struct SecretSet {
    bindings: Vec<SecretBinding>,
}

impl SecretSet {
    /// Resolve the declared secret entries into a binding set.
    ///
    /// `${VAR}` templates resolve from the process environment; anything
    /// else is taken as a literal. In strict mode a literal that still
    /// carries an unresolved `<placeholder>` marker is rejected, otherwise
    /// it is loaded verbatim with a warning. The marker check applies to
    /// the template only: a value resolved from the environment is opaque
    /// and may legitimately contain angle-bracketed text.
    pub fn load(entries: &[SecretEntry], strict: bool) -> Result<Self, ConfigError> {
        let mut bindings = Vec::with_capacity(entries.len());
        for entry in entries {
            if let Some(m) = RE_PLACEHOLDER.find(&entry.value_template) {
                if strict {
                    return Err(ConfigError::UnresolvedPlaceholder {
                        key: entry.key.clone(),
                        placeholder: m.as_str().to_string(),
                    });
                }
                warn!(
                    "Secret '{}' contains an unresolved placeholder; loading literal value",
                    entry.key
                );
            }
            let value = Self::resolve_template(entry)?;
            debug!("Loaded secret binding for '{}'", entry.key);
            bindings.push(SecretBinding {
                key: entry.key.clone(),
                value,
            });
        }
        Ok(Self { bindings })
    }

    /// Check declared entries without touching the process environment:
    /// literal templates must not carry unresolved placeholder markers.
    /// Used by definition validation, where referenced variables may
    /// legitimately be absent.
    pub fn validate_entries(entries: &[SecretEntry]) -> Result<(), ConfigError> {
        for entry in entries {
            if RE_ENV_REF.is_match(&entry.value_template) {
                continue;
            }
            if let Some(m) = RE_PLACEHOLDER.find(&entry.value_template) {
                return Err(ConfigError::UnresolvedPlaceholder {
                    key: entry.key.clone(),
                    placeholder: m.as_str().to_string(),
                });
            }
        }
        Ok(())
    }

    fn resolve_template(entry: &SecretEntry) -> Result<String, ConfigError> {
        if let Some(caps) = RE_ENV_REF.captures(&entry.value_template) {
            let variable = &caps[1];
            debug!("Resolving secret '{}' from environment", entry.key);
            return env::var(variable).map_err(|_| ConfigError::EnvironmentResolution {
                key: entry.key.clone(),
                variable: variable.to_string(),
            });
        }
        Ok(entry.value_template.clone())
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Key/value pairs for injection into a child process environment.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.bindings.iter().map(|b| (b.key(), b.value()))
    }

    /// Write the bindings into the process environment. Called exactly once
    /// per run, before any module executes.
    pub fn export_process_env(&self) {
        for binding in &self.bindings {
            env::set_var(&binding.key, &binding.value);
        }
        debug!("Exported {} secret binding(s) to process env", self.len());
    }

    /// Scrub every verbatim occurrence of a loaded secret value from the
    /// given text. Applied to all captured output before it is stored.
    pub fn redact(&self, text: &str) -> String {
        let mut result = text.to_string();
        for binding in &self.bindings {
            if binding.value.is_empty() {
                continue;
            }
            result = result.replace(&binding.value, REDACTED);
        }
        result
    }
}
