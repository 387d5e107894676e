// crates/stevedore-engine/src/provision.rs
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::debug;

use stevedore_core::error::{ProvisionError, StevedoreResult};

/// Produces a working directory with source code present. External
/// collaborator: checkout and toolchain installation live behind this seam
/// and are not reimplemented here.
#[async_trait]
pub trait Provisioner: Send + Sync {
    async fn provision(&self) -> StevedoreResult<PathBuf>;
}

/// Restores dependencies into a provisioned source tree.
#[async_trait]
pub trait Installer: Send + Sync {
    async fn install(&self, source_root: &Path) -> StevedoreResult<()>;
}

/// Uses an already-checked-out source tree on the local filesystem.
pub struct LocalCheckout {
    root: PathBuf,
}

impl LocalCheckout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl Provisioner for LocalCheckout {
    async fn provision(&self) -> StevedoreResult<PathBuf> {
        match tokio::fs::metadata(&self.root).await {
            Ok(meta) if meta.is_dir() => {
                debug!("Provisioned source root: {}", self.root.display());
                Ok(self.root.clone())
            }
            _ => Err(ProvisionError::SourceRootMissing(self.root.display().to_string()).into()),
        }
    }
}

/// Installer for source trees whose dependencies are already in place.
pub struct NoopInstaller;

#[async_trait]
impl Installer for NoopInstaller {
    async fn install(&self, source_root: &Path) -> StevedoreResult<()> {
        debug!("No dependencies to install under {}", source_root.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stevedore_core::error::StevedoreError;
    use tempfile::tempdir;

    #[tokio::test]
    async fn local_checkout_returns_existing_root() {
        let dir = tempdir().unwrap();
        let provisioner = LocalCheckout::new(dir.path());
        let root = provisioner.provision().await.unwrap();
        assert_eq!(root, dir.path());
    }

    #[tokio::test]
    async fn local_checkout_rejects_missing_root() {
        let provisioner = LocalCheckout::new("/nonexistent/source/tree");
        let err = provisioner.provision().await.unwrap_err();
        assert!(matches!(
            err,
            StevedoreError::Provision(ProvisionError::SourceRootMissing(_))
        ));
    }

    #[tokio::test]
    async fn noop_installer_always_succeeds() {
        let dir = tempdir().unwrap();
        assert!(NoopInstaller.install(dir.path()).await.is_ok());
    }

    struct BrokenToolchain;

    #[async_trait]
    impl Installer for BrokenToolchain {
        async fn install(&self, _source_root: &Path) -> StevedoreResult<()> {
            Err(ProvisionError::InstallFailed("npm ci exited with 1".to_string()).into())
        }
    }

    #[tokio::test]
    async fn installer_failures_surface_as_provision_errors() {
        let dir = tempdir().unwrap();
        let err = BrokenToolchain.install(dir.path()).await.unwrap_err();
        assert!(matches!(
            err,
            StevedoreError::Provision(ProvisionError::InstallFailed(_))
        ));
        assert!(err.to_string().contains("installation failed"));
    }
}
