//! Mount lifecycle: option assembly, spawning the FUSE session, unmount.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use fuser::{BackgroundSession, MountOption};
use tokio::runtime::Handle;

use common::tracker::Tracker;

use super::RedmineFs;

/// Name shown in the mount table
pub const FS_NAME: &str = "redmine filesystem";

/// FUSE subtype (`fuse.redminefs`)
pub const FS_SUBTYPE: &str = "redminefs";

#[derive(Debug, thiserror::Error)]
pub enum MountError {
    #[error("Mount point does not exist: {0}")]
    MountPointNotFound(PathBuf),
    #[error("Mount point is not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("FUSE error: {0}")]
    Fuse(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct MountConfig {
    pub mount_point: PathBuf,
    /// Unmount when the process exits, even abnormally
    pub auto_unmount: bool,
    /// How long the kernel may cache attributes and entries
    pub attr_ttl: Duration,
}

impl MountConfig {
    pub fn new(mount_point: impl Into<PathBuf>) -> Self {
        Self {
            mount_point: mount_point.into(),
            auto_unmount: false,
            attr_ttl: Duration::from_secs(1),
        }
    }

    /// Options passed to the kernel for this mount
    pub fn mount_options(&self) -> Vec<MountOption> {
        let mut options = vec![
            MountOption::RO,
            MountOption::FSName(FS_NAME.to_string()),
            MountOption::Subtype(FS_SUBTYPE.to_string()),
        ];

        if self.auto_unmount {
            options.push(MountOption::AutoUnmount);
        }

        // Volume name shown in Finder
        #[cfg(target_os = "macos")]
        options.push(MountOption::CUSTOM("volname=Redmine".to_string()));

        options
    }

    fn validate(&self) -> Result<(), MountError> {
        if !self.mount_point.exists() {
            return Err(MountError::MountPointNotFound(self.mount_point.clone()));
        }
        if !self.mount_point.is_dir() {
            return Err(MountError::NotADirectory(self.mount_point.clone()));
        }
        Ok(())
    }
}

/// A running mount. Dropping it unmounts.
pub struct LiveMount {
    session: Option<BackgroundSession>,
    mount_point: PathBuf,
}

impl LiveMount {
    /// Mount `tracker` at the configured mount point.
    ///
    /// FUSE requests are served on a background thread that drives tracker
    /// calls on `runtime`.
    pub fn spawn(
        tracker: Arc<dyn Tracker>,
        runtime: Handle,
        config: &MountConfig,
    ) -> Result<Self, MountError> {
        config.validate()?;

        let fs = RedmineFs::new(tracker, runtime, config.attr_ttl);
        let options = config.mount_options();
        let session = fuser::spawn_mount2(fs, &config.mount_point, &options)?;

        tracing::info!(mount_point = %config.mount_point.display(), "mounted tracker");

        Ok(Self {
            session: Some(session),
            mount_point: config.mount_point.clone(),
        })
    }

    pub fn mount_point(&self) -> &Path {
        &self.mount_point
    }

    /// Unmount and wait for the session thread to finish
    pub fn unmount(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(session) = self.session.take() {
            tracing::info!(mount_point = %self.mount_point.display(), "unmounting");
            session.join();
        }
    }
}

impl Drop for LiveMount {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mount_options() {
        let config = MountConfig::new("/mnt/redmine");
        let options = config.mount_options();

        assert!(options.contains(&MountOption::RO));
        assert!(options.contains(&MountOption::FSName(FS_NAME.to_string())));
        assert!(options.contains(&MountOption::Subtype(FS_SUBTYPE.to_string())));
        assert!(!options.contains(&MountOption::AutoUnmount));
    }

    #[test]
    fn test_auto_unmount_option() {
        let mut config = MountConfig::new("/mnt/redmine");
        config.auto_unmount = true;
        assert!(config.mount_options().contains(&MountOption::AutoUnmount));
    }

    #[test]
    fn test_missing_mount_point_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config = MountConfig::new(dir.path().join("absent"));
        assert!(matches!(
            config.validate(),
            Err(MountError::MountPointNotFound(_))
        ));
    }

    #[test]
    fn test_file_mount_point_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("file");
        std::fs::write(&file, b"").unwrap();

        let config = MountConfig::new(&file);
        assert!(matches!(config.validate(), Err(MountError::NotADirectory(_))));
        assert!(MountConfig::new(dir.path()).validate().is_ok());
    }
}
