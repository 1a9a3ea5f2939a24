//! Map an emulated path onto a branch root, an object inside a branch, or a
//! virtual directory of branch names.

use git2::Oid;
use tracing::debug;

use crate::attributes::{self, Attributes};
use crate::entity::{ResolvedEntity, Target};
use crate::error::{Error, Result};
use crate::path;
use crate::store::Store;

/// Resolve `path` against the current state of the store.
///
/// The branch is found by trying every split of the path at a separator,
/// shortest candidate first, and the whole path last. The first existing
/// branch wins: with branches `a` and `a/b`, the path `a/b/c` is the entry
/// `b/c` of branch `a` and never the entry `c` of branch `a/b`, even when
/// `a` has no `b/c`.
#[tracing::instrument(level = "debug", skip(store))]
pub fn resolve(store: &Store, path: &str) -> Result<ResolvedEntity> {
    let normalized = path::normalize(path);
    let emulated = path::absolute(normalized);

    for (branch, residual) in path::branch_candidates(normalized) {
        if let Some(commit) = store.branch_target(branch)? {
            debug!(branch, residual, "path names a branch");
            return resolve_in_branch(store, emulated, branch, commit, residual);
        }
    }

    resolve_prefix(store, emulated, normalized)
}

fn resolve_in_branch(
    store: &Store,
    emulated: String,
    branch: &str,
    commit: Oid,
    residual: &str,
) -> Result<ResolvedEntity> {
    let commit = store.commit(commit)?;

    if residual.is_empty() {
        let attributes = attributes::for_commit_root(store, &commit)?;
        let target = Target::BranchRoot {
            branch: branch.to_string(),
            tree: commit.tree,
        };
        return Ok(ResolvedEntity::new(emulated, target, attributes));
    }

    if !path::is_entry_path(residual) {
        debug!(residual, "residual cannot name a tree entry");
        return Err(Error::NotFound(emulated));
    }
    let Some(entry) = store.entry_by_path(commit.tree, residual)? else {
        return Err(Error::NotFound(emulated));
    };
    let attributes = attributes::for_entry(store, &entry)?.with_commit_time(commit.time);
    let target = Target::Object {
        branch: branch.to_string(),
        oid: entry.oid,
        kind: entry.kind,
        residual: residual.to_string(),
    };
    Ok(ResolvedEntity::new(emulated, target, attributes))
}

fn resolve_prefix(store: &Store, emulated: String, prefix: &str) -> Result<ResolvedEntity> {
    let matches = store
        .branch_names()?
        .iter()
        .filter(|branch| path::matches_prefix(branch, prefix))
        .count();

    // The root stays a directory even in a repository without branches.
    if matches == 0 && !prefix.is_empty() {
        debug!(prefix, "no branch at or below prefix");
        return Err(Error::NotFound(emulated));
    }

    let matches = u32::try_from(matches).unwrap_or(u32::MAX - 1);
    let target = Target::BranchPrefix {
        prefix: prefix.to_string(),
    };
    Ok(ResolvedEntity::new(
        emulated,
        target,
        Attributes::for_branch_prefix(matches),
    ))
}
