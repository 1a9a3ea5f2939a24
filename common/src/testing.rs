//! Throwaway git repositories for tests.

use std::path::Path;

use git2::{FileMode, Oid, Repository, Signature, Time};
use tempfile::TempDir;

use crate::store::Store;

/// One node of a tree to be written into a fixture repository.
pub enum Node<'a> {
    File(&'a [u8], FileMode),
    Dir(&'a [(&'a str, Node<'a>)]),
    Submodule,
}

pub fn file(content: &[u8]) -> Node<'_> {
    Node::File(content, FileMode::Blob)
}

pub fn exec(content: &[u8]) -> Node<'_> {
    Node::File(content, FileMode::BlobExecutable)
}

pub fn link(target: &[u8]) -> Node<'_> {
    Node::File(target, FileMode::Link)
}

pub fn dir<'a>(children: &'a [(&'a str, Node<'a>)]) -> Node<'a> {
    Node::Dir(children)
}

pub fn submodule<'a>() -> Node<'a> {
    Node::Submodule
}

/// A bare repository in a temporary directory, removed on drop.
pub struct TestRepo {
    repo: Repository,
    _dir: TempDir,
}

impl Default for TestRepo {
    fn default() -> Self {
        Self::new()
    }
}

impl TestRepo {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let repo = Repository::init_bare(dir.path()).expect("init bare repository");
        TestRepo { repo, _dir: dir }
    }

    pub fn path(&self) -> &Path {
        self.repo.path()
    }

    /// A fresh store over this repository, as the daemon would open it.
    pub fn store(&self) -> Store {
        Store::open(self.path()).expect("open fixture repository")
    }

    /// Write `tree` as a root commit dated `time` and point `refs/heads/<branch>`
    /// at it.
    pub fn commit(&self, branch: &str, time: i64, tree: &[(&str, Node<'_>)]) -> Oid {
        let commit = self.dangling_commit(time, tree);
        self.repo
            .reference(&format!("refs/heads/{branch}"), commit, true, "fixture")
            .expect("create branch");
        commit
    }

    /// Write a root commit without pointing any reference at it.
    pub fn dangling_commit(&self, time: i64, tree: &[(&str, Node<'_>)]) -> Oid {
        let tree = self.write_tree(tree);
        let tree = self.repo.find_tree(tree).expect("find written tree");
        let sig = Signature::new("Fixture", "fixture@example.com", &Time::new(time, 0))
            .expect("signature");
        self.repo
            .commit(None, &sig, &sig, "fixture", &tree, &[])
            .expect("write commit")
    }

    pub fn symbolic(&self, branch: &str, target: &str) {
        self.repo
            .reference_symbolic(&format!("refs/heads/{branch}"), target, true, "fixture")
            .expect("create symbolic branch");
    }

    /// Record branches in `packed-refs`. Loose refs cannot hold both `a` and
    /// `a/b` since one would be a file and the other a directory of the same
    /// name; packed refs have no such restriction.
    pub fn packed_branches(&self, branches: &[(&str, Oid)]) {
        let mut packed = String::from("# pack-refs with: peeled fully-peeled \n");
        for (name, oid) in branches {
            packed.push_str(&format!("{oid} refs/heads/{name}\n"));
        }
        std::fs::write(self.path().join("packed-refs"), packed).expect("write packed-refs");
    }

    fn write_tree(&self, children: &[(&str, Node<'_>)]) -> Oid {
        let mut builder = self.repo.treebuilder(None).expect("tree builder");
        for (name, node) in children {
            let (oid, mode) = match node {
                Node::File(content, mode) => (self.repo.blob(content).expect("write blob"), *mode),
                Node::Dir(children) => (self.write_tree(children), FileMode::Tree),
                Node::Submodule => (self.dangling_commit(0, &[]), FileMode::Commit),
            };
            builder.insert(*name, oid, mode.into()).expect("insert tree entry");
        }
        builder.write().expect("write tree")
    }
}
