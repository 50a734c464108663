use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;

use redminefs::api::ApiError;
use redminefs::fuse::{LiveMount, MountConfig, MountError};
use redminefs::state::StateError;

/// Mount the tracker and serve it until interrupted
#[derive(Args, Debug, Clone)]
pub struct Mount {
    /// Existing empty directory to mount on
    pub mount_point: PathBuf,

    /// Unmount automatically if the process dies
    #[arg(long)]
    pub auto_unmount: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum MountOpError {
    #[error("{0}")]
    State(#[from] StateError),
    #[error("API error: {0}")]
    Api(#[from] ApiError),
    #[error("mount failed: {0}")]
    Mount(#[from] MountError),
    #[error("signal handling failed: {0}")]
    Signal(#[from] std::io::Error),
    #[error("unmount failed: {0}")]
    Unmount(#[from] tokio::task::JoinError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Mount {
    type Error = MountOpError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = ctx.state()?;
        let tracker = Arc::new(state.settings.client()?);

        let config = MountConfig {
            mount_point: self.mount_point.clone(),
            auto_unmount: self.auto_unmount,
            attr_ttl: state.settings.attr_ttl(),
        };

        let mount = LiveMount::spawn(tracker, tokio::runtime::Handle::current(), &config)?;
        eprintln!(
            "Mounted {} at {} (Ctrl-C to unmount)",
            state.settings.endpoint,
            mount.mount_point().display()
        );

        tokio::signal::ctrl_c().await?;

        // Joining the session blocks until the kernel lets go
        tokio::task::spawn_blocking(move || mount.unmount()).await?;

        Ok(format!("Unmounted {}", self.mount_point.display()))
    }
}
