use std::{path::Path, sync::Arc};

use anyhow::{anyhow, Error};
use common::{BranchView, Store};
use tracing::info;

use crate::{config::MountConfig, fs::BranchFS};

/// Owns the repository for the lifetime of a mount.
#[derive(Debug, Clone)]
pub struct RepoManager {
    store: Arc<Store>,
    config: MountConfig,
}

impl RepoManager {
    pub fn new(store: Arc<Store>, config: MountConfig) -> Self {
        RepoManager { store, config }
    }

    /// Serve the repository at `mountpoint` until it is unmounted.
    pub fn mount(&self, mountpoint: &Path) -> Result<(), Error> {
        if !mountpoint.is_dir() {
            return Err(anyhow!("No directory to mount filesystem at {mountpoint:?}"));
        }

        info!("Initializing the FUSE mount for {mountpoint:?}");
        let fs = BranchFS::new(BranchView::new(self.store.clone()), self.config.ttl);
        fuser::mount2(fs, mountpoint, &self.config.options)?;
        info!("{mountpoint:?} unmounted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use common::testing::TestRepo;

    use super::*;
    use crate::config::Args;
    use clap::Parser;

    #[test]
    fn refuses_missing_mountpoint() {
        let repo = TestRepo::new();
        let args = Args::try_parse_from(["branchfs-daemon", "-r", "repo", "/nonexistent/mnt"])
            .unwrap();
        let manager = RepoManager::new(Arc::new(repo.store()), args.mount_config());

        let err = manager.mount(Path::new("/nonexistent/mnt")).unwrap_err();
        assert!(err.to_string().contains("No directory"));
    }
}
