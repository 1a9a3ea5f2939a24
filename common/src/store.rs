//! Read-only access to the git object store.
//!
//! The libgit2 repository handle is not reentrant, so a [`Store`] keeps it
//! behind one mutex and holds the lock for a single lookup at a time. Nothing
//! borrowed from libgit2 escapes a method: callers get owned ids, names and
//! bytes back.

use std::path::Path;

use git2::{BranchType, ErrorCode, ObjectType, Oid, ReferenceType, Repository};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::error::{Error, Result};

const MODE_TREE: i32 = 0o040000;
const MODE_BLOB: i32 = 0o100644;
const MODE_BLOB_GROUP_WRITABLE: i32 = 0o100664;
const MODE_EXECUTABLE: i32 = 0o100755;
const MODE_LINK: i32 = 0o120000;
const MODE_COMMIT: i32 = 0o160000;

/// What a tree entry points at, as told by its git file mode.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EntryKind {
    Tree,
    Blob,
    Executable,
    Symlink,
    /// A gitlink. The commit it names lives in another repository.
    Submodule,
}

impl EntryKind {
    fn from_filemode(mode: i32) -> Option<EntryKind> {
        match mode {
            MODE_TREE => Some(EntryKind::Tree),
            MODE_BLOB | MODE_BLOB_GROUP_WRITABLE => Some(EntryKind::Blob),
            MODE_EXECUTABLE => Some(EntryKind::Executable),
            MODE_LINK => Some(EntryKind::Symlink),
            MODE_COMMIT => Some(EntryKind::Submodule),
            _ => None,
        }
    }

    /// Blob-backed kinds carry readable bytes.
    pub fn has_content(self) -> bool {
        matches!(
            self,
            EntryKind::Blob | EntryKind::Executable | EntryKind::Symlink
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeEntry {
    pub name: String,
    pub oid: Oid,
    pub kind: EntryKind,
}

impl TreeEntry {
    fn from_git(entry: &git2::TreeEntry<'_>) -> Result<TreeEntry> {
        let name = String::from_utf8_lossy(entry.name_bytes()).into_owned();
        let kind = EntryKind::from_filemode(entry.filemode()).ok_or_else(|| {
            Error::Invariant(format!(
                "tree entry {name} has unknown file mode {:o}",
                entry.filemode()
            ))
        })?;
        Ok(TreeEntry {
            name,
            oid: entry.id(),
            kind,
        })
    }
}

/// A snapshot of the immediate children of one tree, taken under the
/// repository lock. Subtrees are not expanded; a clone continues from the
/// current position.
#[derive(Clone, Debug)]
pub struct TreeEntries {
    entries: std::vec::IntoIter<TreeEntry>,
}

impl Iterator for TreeEntries {
    type Item = TreeEntry;

    fn next(&mut self) -> Option<TreeEntry> {
        self.entries.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CommitInfo {
    pub tree: Oid,
    /// Seconds since the epoch.
    pub time: i64,
}

/// Stores mount-agnostic information like trees or commits. Unaware of
/// filesystem information.
pub struct Store {
    repo: Mutex<Repository>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut debug = f.debug_struct("Store");
        match self.repo.try_lock() {
            Some(repo) => debug.field("path", &repo.path()),
            None => debug.field("path", &"<in use>"),
        };
        debug.finish()
    }
}

impl Store {
    /// Open the repository at exactly `path`; parent directories are not
    /// searched.
    pub fn open(path: impl AsRef<Path>) -> Result<Store> {
        let repo = Repository::open(path.as_ref())?;
        debug!("opened repository at {:?}", repo.path());
        Ok(Store::from_repository(repo))
    }

    pub fn from_repository(repo: Repository) -> Store {
        Store {
            repo: Mutex::new(repo),
        }
    }

    /// Commit id a local branch points at, following at most one symbolic
    /// indirection. `None` when no such branch exists.
    pub fn branch_target(&self, name: &str) -> Result<Option<Oid>> {
        let repo = self.repo.lock();
        let branch = match repo.find_branch(name, BranchType::Local) {
            Ok(branch) => branch,
            Err(e) if matches!(e.code(), ErrorCode::NotFound | ErrorCode::InvalidSpec) => {
                return Ok(None)
            }
            Err(e) => return Err(e.into()),
        };
        let reference = branch.into_reference();

        let direct = match reference.symbolic_target() {
            None => reference,
            Some(target) => {
                let resolved = match repo.find_reference(target) {
                    Ok(resolved) => resolved,
                    Err(e) if e.code() == ErrorCode::NotFound => {
                        return Err(Error::BrokenReference {
                            name: name.to_string(),
                            reason: "dangling symbolic target",
                        })
                    }
                    Err(e) => return Err(e.into()),
                };
                if resolved.kind() == Some(ReferenceType::Symbolic) {
                    return Err(Error::BrokenReference {
                        name: name.to_string(),
                        reason: "more than one level of symbolic indirection",
                    });
                }
                resolved
            }
        };

        direct.target().map(Some).ok_or_else(|| Error::BrokenReference {
            name: name.to_string(),
            reason: "reference has no target",
        })
    }

    /// Names of all local branches.
    pub fn branch_names(&self) -> Result<Vec<String>> {
        let repo = self.repo.lock();
        let mut names = Vec::new();
        for branch in repo.branches(Some(BranchType::Local))? {
            let (branch, _) = branch?;
            match branch.name() {
                Ok(Some(name)) => names.push(name.to_string()),
                Ok(None) | Err(_) => {
                    warn!("skipping local branch with a non UTF-8 name");
                }
            }
        }
        Ok(names)
    }

    pub fn commit(&self, oid: Oid) -> Result<CommitInfo> {
        let repo = self.repo.lock();
        let commit = repo.find_commit(oid)?;
        Ok(CommitInfo {
            tree: commit.tree_id(),
            time: commit.time().seconds(),
        })
    }

    pub fn tree_entries(&self, oid: Oid) -> Result<TreeEntries> {
        let repo = self.repo.lock();
        let tree = repo.find_tree(oid)?;
        let entries = tree
            .iter()
            .map(|entry| TreeEntry::from_git(&entry))
            .collect::<Result<Vec<_>>>()?;
        Ok(TreeEntries {
            entries: entries.into_iter(),
        })
    }

    /// Entry at a slash separated path relative to the tree `oid`.
    pub fn entry_by_path(&self, oid: Oid, path: &str) -> Result<Option<TreeEntry>> {
        let repo = self.repo.lock();
        let tree = repo.find_tree(oid)?;
        match tree.get_path(Path::new(path)) {
            Ok(entry) => TreeEntry::from_git(&entry).map(Some),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Raw byte length of a blob, read from the object header.
    pub fn blob_size(&self, oid: Oid) -> Result<u64> {
        let repo = self.repo.lock();
        let (size, kind) = repo.odb()?.read_header(oid)?;
        if kind != ObjectType::Blob {
            return Err(Error::Invariant(format!("{oid} is a {kind}, not a blob")));
        }
        Ok(size as u64)
    }

    /// Copy of `len` bytes of a blob starting at `offset`.
    pub fn blob_range(&self, oid: Oid, offset: usize, len: usize) -> Result<Vec<u8>> {
        let repo = self.repo.lock();
        let blob = repo.find_blob(oid)?;
        let range = offset
            .checked_add(len)
            .and_then(|end| blob.content().get(offset..end))
            .ok_or_else(|| {
                Error::Invariant(format!(
                    "range {offset}+{len} is outside blob {oid} of {} bytes",
                    blob.size()
                ))
            })?;
        Ok(range.to_vec())
    }
}
