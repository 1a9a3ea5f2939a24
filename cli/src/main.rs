use std::{io::Write as _, path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::Context;
use clap::Parser;
use common::{lister, BranchView, Error, FileKind, Store};
use itertools::Itertools as _;
use tracing::level_filters::LevelFilter;

/// Inspect the directory view of a git repository without mounting it.
#[derive(clap::Parser, Debug)]
#[command(version)]
struct Args {
    /// Repository to inspect.
    #[arg(short, long, env = "BRANCHFS_REPOSITORY")]
    repository: PathBuf,

    /// More logging; repeat for more.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, clap::Subcommand)]
enum Command {
    /// Print the synthesized attributes of each path, and the entries of
    /// directories.
    Stat {
        #[arg(required = true)]
        paths: Vec<String>,
    },
    /// Write the content of a file to stdout.
    Cat { path: String },
}

fn describe(view: &BranchView, path: &str) -> Result<String, Error> {
    let entity = view.getattr(path)?;
    let attrs = entity.attributes();
    let id = entity
        .oid()
        .map_or_else(|| "branch-prefix".to_string(), |oid| oid.to_string());

    let mut out = String::new();
    out.push_str(&format!("{} [{id}]\n", entity.path()));
    out.push_str(&format!(
        "  mode {:o}  nlink {}  size {}\n",
        attrs.mode(),
        attrs.nlink(),
        attrs.size()
    ));
    if attrs.kind() == FileKind::Directory {
        let names = lister::list(view.store(), &entity)?
            .map(|entry| entry.name)
            .join(" ");
        out.push_str(&format!("  entries: {names}\n"));
    }
    Ok(out)
}

fn stat(view: &BranchView, paths: &[String]) -> (String, bool) {
    let mut out = String::new();
    let mut all_found = true;
    for path in paths {
        match describe(view, path) {
            Ok(description) => out.push_str(&description),
            Err(Error::NotFound(_)) => {
                all_found = false;
                out.push_str(&format!("{path}: not found\n"));
            }
            Err(e) => {
                all_found = false;
                out.push_str(&format!("{path}: {e}\n"));
            }
        }
    }
    (out, all_found)
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();

    let store = Store::open(&args.repository)
        .with_context(|| format!("cannot open repository {:?}", args.repository))?;
    let view = BranchView::new(Arc::new(store));

    match args.command {
        Command::Stat { paths } => {
            let (out, all_found) = stat(&view, &paths);
            print!("{out}");
            Ok(if all_found {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Cat { path } => {
            let content = view.read(&path, 0, usize::MAX)?;
            std::io::stdout().lock().write_all(&content)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
