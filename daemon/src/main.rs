use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;

mod config;
mod fs;
mod inodes;
mod repo_manager;

use repo_manager::RepoManager;

fn main() -> Result<(), anyhow::Error> {
    let args = config::Args::parse();

    // fuser uses logs, enable for that
    tracing_log::LogTracer::init()?;

    let subscriber = tracing_subscriber::fmt()
        .compact()
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_target(false)
        .with_max_level(args.log_level())
        .finish();

    // use that subscriber to process traces emitted after this point
    tracing::subscriber::set_global_default(subscriber)?;

    info!("daemon started");

    let store = common::Store::open(&args.repository)
        .with_context(|| format!("cannot open repository {:?}", args.repository))?;

    let manager = RepoManager::new(Arc::new(store), args.mount_config());
    manager.mount(&args.mountpoint)?;

    Ok(())
}
