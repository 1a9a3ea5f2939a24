//! Directory listings, from either a tree or the set of branch names.

use crate::attributes::FileKind;
use crate::entity::{ResolvedEntity, Target};
use crate::error::{Error, Result};
use crate::path;
use crate::store::{EntryKind, Store, TreeEntries};

/// One name in a listing, with the kind it will have once looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub kind: FileKind,
}

impl DirEntry {
    fn directory(name: &str) -> DirEntry {
        DirEntry {
            name: name.to_string(),
            kind: FileKind::Directory,
        }
    }
}

impl From<EntryKind> for FileKind {
    fn from(kind: EntryKind) -> FileKind {
        match kind {
            EntryKind::Tree | EntryKind::Submodule => FileKind::Directory,
            EntryKind::Blob | EntryKind::Executable => FileKind::File,
            EntryKind::Symlink => FileKind::Symlink,
        }
    }
}

#[derive(Clone, Debug)]
enum Source {
    Empty,
    Tree(TreeEntries),
    Branches {
        prefix: String,
        names: std::vec::IntoIter<String>,
    },
}

/// The entries of one directory: `.` and `..`, then the directory's own
/// children.
///
/// Branch segments are not deduplicated: `feature/x/1` and `feature/x/2`
/// both contribute `x` to the listing of `feature`.
#[derive(Clone, Debug)]
pub struct Listing {
    dots: std::array::IntoIter<&'static str, 2>,
    source: Source,
}

impl Iterator for Listing {
    type Item = DirEntry;

    fn next(&mut self) -> Option<DirEntry> {
        if let Some(dot) = self.dots.next() {
            return Some(DirEntry::directory(dot));
        }
        match &mut self.source {
            Source::Empty => None,
            Source::Tree(entries) => entries.next().map(|entry| DirEntry {
                name: entry.name,
                kind: entry.kind.into(),
            }),
            Source::Branches { prefix, names } => names.by_ref().find_map(|name| {
                path::next_segment(&name, prefix.as_str()).map(DirEntry::directory)
            }),
        }
    }
}

/// List the children of a directory entity.
///
/// Trees are walked one level deep only. A submodule lists as empty.
pub fn list(store: &Store, entity: &ResolvedEntity) -> Result<Listing> {
    let source = match entity.target() {
        Target::BranchRoot { tree, .. } => Source::Tree(store.tree_entries(*tree)?),
        Target::Object {
            oid,
            kind: EntryKind::Tree,
            ..
        } => Source::Tree(store.tree_entries(*oid)?),
        Target::Object {
            kind: EntryKind::Submodule,
            ..
        } => Source::Empty,
        Target::Object { .. } => return Err(Error::NotADirectory(entity.path().to_string())),
        Target::BranchPrefix { prefix } => Source::Branches {
            prefix: prefix.clone(),
            names: store.branch_names()?.into_iter(),
        },
    };
    Ok(Listing {
        dots: [".", ".."].into_iter(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::resolver::resolve;
    use crate::testing::{dir, file, link, submodule, TestRepo};

    fn names(listing: Listing) -> Vec<String> {
        listing.map(|entry| entry.name).collect()
    }

    #[test]
    fn branch_root_lists_immediate_children_once() {
        let repo = TestRepo::new();
        repo.commit(
            "main",
            1,
            &[
                ("README", file(b"hi")),
                ("docs", dir(&[("guide", dir(&[("intro", file(b""))]))])),
                ("latest", link(b"README")),
            ],
        );
        let store = repo.store();
        let main = resolve(&store, "/main").unwrap();

        let entries: Vec<_> = list(&store, &main).unwrap().collect();
        assert_eq!(
            entries,
            vec![
                DirEntry::directory("."),
                DirEntry::directory(".."),
                DirEntry {
                    name: "README".into(),
                    kind: FileKind::File
                },
                DirEntry::directory("docs"),
                DirEntry {
                    name: "latest".into(),
                    kind: FileKind::Symlink
                },
            ]
        );

        let docs = resolve(&store, "/main/docs").unwrap();
        assert_eq!(names(list(&store, &docs).unwrap()), [".", "..", "guide"]);
    }

    #[test]
    fn prefix_lists_next_segment() {
        let repo = TestRepo::new();
        repo.commit("main", 1, &[]);
        repo.commit("feature/x", 1, &[]);
        let store = repo.store();

        let feature = resolve(&store, "/feature").unwrap();
        insta::assert_snapshot!(names(list(&store, &feature).unwrap()).join(" "), @". .. x");

        let root = resolve(&store, "/").unwrap();
        let mut top = names(list(&store, &root).unwrap());
        top.sort();
        assert_eq!(top, [".", "..", "feature", "main"]);
    }

    #[test]
    fn shared_segments_are_listed_once_per_branch() {
        let repo = TestRepo::new();
        repo.commit("feature/x/one", 1, &[]);
        repo.commit("feature/x/two", 1, &[]);
        repo.commit("feature/y", 1, &[]);
        let store = repo.store();

        let feature = resolve(&store, "/feature").unwrap();
        let mut listed = names(list(&store, &feature).unwrap());
        listed.sort();
        assert_eq!(listed, [".", "..", "x", "x", "y"]);
        assert_eq!(feature.attributes().nlink(), 4);
    }

    #[test]
    fn listing_is_restartable() {
        let repo = TestRepo::new();
        repo.commit("main", 1, &[("a", file(b"")), ("b", file(b""))]);
        let store = repo.store();
        let main = resolve(&store, "/main").unwrap();

        let mut listing = list(&store, &main).unwrap();
        listing.next();
        let rest = listing.clone();
        assert_eq!(names(listing), names(rest));
    }

    #[test]
    fn files_are_not_directories() {
        let repo = TestRepo::new();
        repo.commit("main", 1, &[("a", file(b"")), ("sub", submodule())]);
        let store = repo.store();

        let a = resolve(&store, "/main/a").unwrap();
        assert_matches!(list(&store, &a), Err(Error::NotADirectory(path)) if path == "/main/a");

        let sub = resolve(&store, "/main/sub").unwrap();
        assert_eq!(names(list(&store, &sub).unwrap()), [".", ".."]);
    }
}
