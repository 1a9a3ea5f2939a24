use std::{path::PathBuf, time::Duration};

use fuser::MountOption;
use tracing::level_filters::LevelFilter;

/// Mount every local branch of a git repository as a read-only directory.
#[derive(clap::Parser, Debug, Clone)]
#[command(version)]
pub struct Args {
    /// Repository to expose; bare repositories work too.
    #[arg(short, long, env = "BRANCHFS_REPOSITORY")]
    pub repository: PathBuf,

    /// Existing directory to mount on.
    pub mountpoint: PathBuf,

    /// Let users other than the one mounting see the files.
    #[arg(long)]
    pub allow_other: bool,

    /// Unmount when the daemon exits.
    #[arg(long)]
    pub auto_unmount: bool,

    /// Seconds the kernel may cache attributes and lookups.
    #[arg(long, default_value_t = 0)]
    pub attr_ttl: u64,

    /// More logging; repeat for more.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MountConfig {
    pub options: Vec<MountOption>,
    pub ttl: Duration,
}

impl Args {
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }

    pub fn mount_config(&self) -> MountConfig {
        let mut options = vec![
            MountOption::RO,
            MountOption::FSName("branchfs".to_string()),
            MountOption::NoDev,
            MountOption::NoSuid,
        ];
        if self.allow_other {
            options.push(MountOption::AllowOther);
        }
        if self.auto_unmount {
            options.push(MountOption::AutoUnmount);
        }
        MountConfig {
            options,
            ttl: Duration::from_secs(self.attr_ttl),
        }
    }
}
