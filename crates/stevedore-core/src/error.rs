use std::fmt;

/// Core error types for the stevedore system
#[derive(Debug)]
pub enum StevedoreError {
    /// Pipeline-definition and secret-configuration errors
    Config(ConfigError),

    /// Environment provisioning errors
    Provision(ProvisionError),

    /// Internal system errors
    Internal(String),
}

/// Configuration-related errors. All of these are fatal: the run never
/// starts and no module is attempted.
#[derive(Debug)]
pub enum ConfigError {
    /// Pipeline definition file not found
    FileNotFound(String),

    /// Invalid pipeline definition format
    InvalidFormat(String),

    /// Required field missing from the pipeline definition
    MissingField(String),

    /// Two modules share the same name
    DuplicateModule(String),

    /// Working directory is empty or escapes the source tree
    InvalidPath {
        module: String,
        path: String,
        reason: String,
    },

    /// Secret template still contains an unresolved placeholder marker
    UnresolvedPlaceholder { key: String, placeholder: String },

    /// Environment variable resolution failed for a secret template
    EnvironmentResolution { key: String, variable: String },
}

/// Environment provisioning errors (fatal, no modules attempted)
#[derive(Debug)]
pub enum ProvisionError {
    /// The provisioned source tree does not exist
    SourceRootMissing(String),

    /// Dependency installation failed
    InstallFailed(String),
}

impl fmt::Display for StevedoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StevedoreError::Config(e) => write!(f, "Configuration error: {}", e),
            StevedoreError::Provision(e) => write!(f, "Provisioning error: {}", e),
            StevedoreError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(file) => {
                write!(f, "Pipeline definition not found: {}", file)
            }
            ConfigError::InvalidFormat(msg) => {
                write!(f, "Invalid pipeline definition: {}", msg)
            }
            ConfigError::MissingField(field) => write!(f, "Required field missing: {}", field),
            ConfigError::DuplicateModule(name) => {
                write!(f, "Duplicate module name: {}", name)
            }
            ConfigError::InvalidPath {
                module,
                path,
                reason,
            } => {
                write!(
                    f,
                    "Invalid working directory '{}' for module '{}': {}",
                    path, module, reason
                )
            }
            ConfigError::UnresolvedPlaceholder { key, placeholder } => {
                write!(
                    f,
                    "Secret '{}' contains an unresolved placeholder: {}",
                    key, placeholder
                )
            }
            ConfigError::EnvironmentResolution { key, variable } => {
                write!(
                    f,
                    "Failed to resolve environment variable '{}' for secret '{}'",
                    variable, key
                )
            }
        }
    }
}

impl fmt::Display for ProvisionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProvisionError::SourceRootMissing(path) => {
                write!(f, "Source root does not exist: {}", path)
            }
            ProvisionError::InstallFailed(msg) => {
                write!(f, "Dependency installation failed: {}", msg)
            }
        }
    }
}

impl std::error::Error for StevedoreError {}
impl std::error::Error for ConfigError {}
impl std::error::Error for ProvisionError {}

impl From<ConfigError> for StevedoreError {
    fn from(err: ConfigError) -> Self {
        StevedoreError::Config(err)
    }
}

impl From<ProvisionError> for StevedoreError {
    fn from(err: ProvisionError) -> Self {
        StevedoreError::Provision(err)
    }
}

impl From<std::io::Error> for StevedoreError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => {
                StevedoreError::Config(ConfigError::FileNotFound(err.to_string()))
            }
            _ => StevedoreError::Internal(err.to_string()),
        }
    }
}

impl From<serde_yaml::Error> for StevedoreError {
    fn from(err: serde_yaml::Error) -> Self {
        StevedoreError::Config(ConfigError::InvalidFormat(err.to_string()))
    }
}

/// Result type alias for stevedore operations
pub type StevedoreResult<T> = Result<T, StevedoreError>;
