//! The path level surface of the filesystem: resolve, then list, read or
//! stat, logging misses quietly and store failures loudly.

use std::ffi::c_int;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::attributes::FileKind;
use crate::entity::ResolvedEntity;
use crate::error::{Error, Result};
use crate::lister::{self, Listing};
use crate::reader;
use crate::resolver;
use crate::store::Store;

/// Path level operations over a repository, one per kernel request.
///
/// Every call resolves its path from scratch, so branches that move while
/// mounted are picked up on the next request.
#[derive(Clone, Debug)]
pub struct BranchView {
    store: Arc<Store>,
}

fn logged<T>(path: &str, result: Result<T>) -> Result<T> {
    if let Err(e) = &result {
        if e.is_miss() {
            debug!("{path}: {e}");
        } else {
            warn!("{path}: {e:?}");
        }
    }
    result
}

impl BranchView {
    pub fn new(store: Arc<Store>) -> Self {
        BranchView { store }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn getattr(&self, path: &str) -> Result<ResolvedEntity> {
        logged(path, resolver::resolve(&self.store, path))
    }

    pub fn readdir(&self, path: &str) -> Result<Listing> {
        let result = resolver::resolve(&self.store, path).and_then(|entity| {
            if entity.attributes().kind() != FileKind::Directory {
                return Err(Error::NotADirectory(entity.path().to_string()));
            }
            lister::list(&self.store, &entity)
        });
        logged(path, result)
    }

    /// Succeeds for read-only opens of anything that resolves.
    pub fn open(&self, path: &str, flags: c_int) -> Result<ResolvedEntity> {
        let result = resolver::resolve(&self.store, path).and_then(|entity| {
            if flags & libc::O_ACCMODE != libc::O_RDONLY {
                return Err(Error::AccessDenied(entity.path().to_string()));
            }
            Ok(entity)
        });
        logged(path, result)
    }

    pub fn read(&self, path: &str, offset: u64, size: usize) -> Result<Vec<u8>> {
        let result = resolver::resolve(&self.store, path)
            .and_then(|entity| reader::read(&self.store, &entity, offset, size));
        logged(path, result)
    }

    pub fn readlink(&self, path: &str) -> Result<Vec<u8>> {
        let result = resolver::resolve(&self.store, path)
            .and_then(|entity| reader::read_link(&self.store, &entity));
        logged(path, result)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use tracing_test::traced_test;

    use super::*;
    use crate::testing::{file, link, TestRepo};

    fn view(repo: &TestRepo) -> BranchView {
        BranchView::new(Arc::new(repo.store()))
    }

    fn fixture() -> TestRepo {
        let repo = TestRepo::new();
        repo.commit(
            "main",
            1,
            &[("README", file(b"hello world")), ("latest", link(b"README"))],
        );
        repo
    }

    #[test]
    fn open_is_read_only() {
        let repo = fixture();
        let view = view(&repo);

        assert!(view.open("/main/README", libc::O_RDONLY).is_ok());
        assert!(view.open("/main", libc::O_RDONLY | libc::O_DIRECTORY).is_ok());
        assert_matches!(
            view.open("/main/README", libc::O_WRONLY),
            Err(Error::AccessDenied(_))
        );
        assert_matches!(
            view.open("/main/README", libc::O_RDWR | libc::O_APPEND),
            Err(Error::AccessDenied(_))
        );
        assert_matches!(view.open("/main/nope", libc::O_RDONLY), Err(Error::NotFound(_)));
    }

    #[test]
    fn readdir_wants_a_directory() {
        let repo = fixture();
        let view = view(&repo);

        assert_matches!(view.readdir("/main/README"), Err(Error::NotADirectory(_)));
        assert_matches!(view.readdir("/elsewhere"), Err(Error::NotFound(_)));
        let names: Vec<_> = view.readdir("/main").unwrap().map(|e| e.name).collect();
        assert_eq!(names, [".", "..", "README", "latest"]);
    }

    #[test]
    fn read_and_readlink_by_path() {
        let repo = fixture();
        let view = view(&repo);

        assert_eq!(view.read("/main/README", 6, 100).unwrap(), b"world");
        assert_eq!(view.readlink("/main/latest").unwrap(), b"README");
        assert_matches!(view.read("/main", 0, 1), Err(Error::IsADirectory(_)));
    }

    #[test]
    #[traced_test]
    fn broken_branches_are_logged_as_warnings() {
        let repo = fixture();
        repo.symbolic("dangling", "refs/heads/gone");
        let view = view(&repo);

        assert_matches!(view.getattr("/dangling"), Err(Error::BrokenReference { .. }));
        assert!(logs_contain("dangling symbolic target"));
    }
}
