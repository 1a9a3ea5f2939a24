//! POSIX attributes for things git does not give attributes to.

use crate::error::Result;
use crate::store::{CommitInfo, EntryKind, Store, TreeEntry};

const READ_ONLY: u16 = 0o444;
const READ_EXECUTE: u16 = 0o555;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FileKind {
    File,
    Directory,
    Symlink,
}

impl FileKind {
    fn format_bits(self) -> u32 {
        match self {
            FileKind::File => libc::S_IFREG as u32,
            FileKind::Directory => libc::S_IFDIR as u32,
            FileKind::Symlink => libc::S_IFLNK as u32,
        }
    }
}

/// A synthesized stat record.
///
/// Block accounting deliberately lies: the block size is the file size and
/// the block count is one, so a reader asks for the whole file in a single
/// request.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Attributes {
    kind: FileKind,
    // Permission bits only; the format bits come from `kind`.
    perm: u16,
    nlink: u32,
    size: u64,
    last_accessed: (i64, u32),
    last_modified: (i64, u32),
    last_metadata_changed: (i64, u32),
}

impl Attributes {
    fn new(kind: FileKind, perm: u16, nlink: u32, size: u64) -> Attributes {
        Attributes {
            kind,
            perm,
            nlink,
            size,
            last_accessed: (0, 0),
            last_modified: (0, 0),
            last_metadata_changed: (0, 0),
        }
    }

    /// A tree with `subtrees` immediate child trees: one link for its own
    /// `.`, one from its parent and one for each child's `..`.
    pub fn for_tree(subtrees: u32) -> Attributes {
        Attributes::new(FileKind::Directory, READ_EXECUTE, 2 + subtrees, 0)
    }

    pub fn for_blob(kind: EntryKind, size: u64) -> Attributes {
        match kind {
            EntryKind::Executable => Attributes::new(FileKind::File, READ_EXECUTE, 1, size),
            EntryKind::Symlink => Attributes::new(FileKind::Symlink, READ_ONLY, 1, size),
            _ => Attributes::new(FileKind::File, READ_ONLY, 1, size),
        }
    }

    /// A virtual directory standing for `matches` branches below a shared
    /// name prefix.
    pub fn for_branch_prefix(matches: u32) -> Attributes {
        Attributes::new(FileKind::Directory, READ_EXECUTE, 1 + matches, 0)
    }

    pub fn with_commit_time(self, secs: i64) -> Attributes {
        Attributes {
            last_accessed: (secs, 0),
            last_modified: (secs, 0),
            last_metadata_changed: (secs, 0),
            ..self
        }
    }

    pub fn kind(&self) -> FileKind {
        self.kind
    }

    pub fn perm(&self) -> u16 {
        self.perm
    }

    /// Format and permission bits, as `st_mode`.
    pub fn mode(&self) -> u32 {
        self.kind.format_bits() | u32::from(self.perm)
    }

    pub fn nlink(&self) -> u32 {
        self.nlink
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn block_size(&self) -> u64 {
        self.size
    }

    pub fn blocks(&self) -> u64 {
        1
    }

    pub fn last_accessed(&self) -> (i64, u32) {
        self.last_accessed
    }

    pub fn last_modified(&self) -> (i64, u32) {
        self.last_modified
    }

    pub fn last_metadata_changed(&self) -> (i64, u32) {
        self.last_metadata_changed
    }
}

/// Count the child trees of `tree` without descending into them.
///
/// Submodules are not counted; their commits live in another repository.
fn count_subtrees(store: &Store, tree: git2::Oid) -> Result<u32> {
    let count = store
        .tree_entries(tree)?
        .filter(|entry| entry.kind == EntryKind::Tree)
        .count();
    Ok(u32::try_from(count).unwrap_or(u32::MAX))
}

pub fn for_entry(store: &Store, entry: &TreeEntry) -> Result<Attributes> {
    match entry.kind {
        EntryKind::Tree => Ok(Attributes::for_tree(count_subtrees(store, entry.oid)?)),
        EntryKind::Submodule => Ok(Attributes::for_tree(0)),
        kind => Ok(Attributes::for_blob(kind, store.blob_size(entry.oid)?)),
    }
}

pub fn for_commit_root(store: &Store, commit: &CommitInfo) -> Result<Attributes> {
    Ok(Attributes::for_tree(count_subtrees(store, commit.tree)?).with_commit_time(commit.time))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{dir, exec, file, link, submodule, TestRepo};

    #[test]
    fn blob_modes() {
        let regular = Attributes::for_blob(EntryKind::Blob, 42);
        assert_eq!(regular.mode(), libc::S_IFREG as u32 | 0o444);
        assert_eq!(regular.nlink(), 1);
        assert_eq!(regular.size(), 42);
        assert_eq!(regular.block_size(), 42);
        assert_eq!(regular.blocks(), 1);

        let executable = Attributes::for_blob(EntryKind::Executable, 7);
        assert_eq!(executable.mode(), libc::S_IFREG as u32 | 0o555);

        let symlink = Attributes::for_blob(EntryKind::Symlink, 3);
        assert_eq!(symlink.kind(), FileKind::Symlink);
        assert_eq!(symlink.perm(), 0o444);
    }

    #[test]
    fn branch_prefix_has_no_size_or_times() {
        let prefix = Attributes::for_branch_prefix(3);
        assert_eq!(prefix.mode(), libc::S_IFDIR as u32 | 0o555);
        assert_eq!(prefix.nlink(), 4);
        assert_eq!(prefix.size(), 0);
        assert_eq!(prefix.last_modified(), (0, 0));
    }

    #[test]
    fn tree_links_count_immediate_subtrees_only() {
        let repo = TestRepo::new();
        let commit = repo.commit(
            "main",
            1_700_000_000,
            &[
                ("a", dir(&[("nested", dir(&[("deeper", dir(&[]))]))])),
                ("b", dir(&[])),
                ("c", file(b"c")),
                ("d", exec(b"d")),
                ("e", link(b"c")),
                ("vendored", submodule()),
            ],
        );
        let store = repo.store();
        let commit = store.commit(commit).unwrap();

        let root = for_commit_root(&store, &commit).unwrap();
        assert_eq!(root.kind(), FileKind::Directory);
        assert_eq!(root.nlink(), 4);
        assert_eq!(root.last_modified(), (1_700_000_000, 0));
        assert_eq!(root.last_accessed(), root.last_metadata_changed());

        let a = store.entry_by_path(commit.tree, "a").unwrap().unwrap();
        assert_eq!(for_entry(&store, &a).unwrap().nlink(), 3);

        let vendored = store.entry_by_path(commit.tree, "vendored").unwrap().unwrap();
        let vendored = for_entry(&store, &vendored).unwrap();
        assert_eq!(vendored.kind(), FileKind::Directory);
        assert_eq!(vendored.nlink(), 2);
    }
}
