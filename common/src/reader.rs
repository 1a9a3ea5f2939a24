//! Byte ranges out of blobs.
//!
//! Nothing is cached: each call fetches the blob again, so a read always
//! reflects the object the entity was resolved to.

use git2::Oid;

use crate::entity::{ResolvedEntity, Target};
use crate::error::{Error, Result};
use crate::store::{EntryKind, Store};

fn blob_oid(entity: &ResolvedEntity) -> Result<(Oid, EntryKind)> {
    match entity.target() {
        Target::Object { oid, kind, .. } if kind.has_content() => Ok((*oid, *kind)),
        _ => Err(Error::IsADirectory(entity.path().to_string())),
    }
}

/// Read at most `size` bytes from `offset`. Reading at or past the end of
/// the file gives an empty buffer.
pub fn read(store: &Store, entity: &ResolvedEntity, offset: u64, size: usize) -> Result<Vec<u8>> {
    let (oid, _) = blob_oid(entity)?;
    let file_size = entity.attributes().size();
    if offset >= file_size {
        return Ok(Vec::new());
    }

    let len = (size as u64).min(file_size - offset);
    let (offset, len) = match (usize::try_from(offset), usize::try_from(len)) {
        (Ok(offset), Ok(len)) => (offset, len),
        _ => {
            return Err(Error::Invariant(format!(
                "{}: range does not fit in memory",
                entity.path()
            )))
        }
    };
    store.blob_range(oid, offset, len)
}

/// The target of a symbolic link, as stored.
pub fn read_link(store: &Store, entity: &ResolvedEntity) -> Result<Vec<u8>> {
    match blob_oid(entity) {
        Ok((_, EntryKind::Symlink)) => read(store, entity, 0, usize::MAX),
        _ => Err(Error::NotASymlink(entity.path().to_string())),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::resolver::resolve;
    use crate::testing::{dir, file, link, TestRepo};

    fn fixture() -> TestRepo {
        let repo = TestRepo::new();
        repo.commit(
            "main",
            1,
            &[
                ("README", file(&[b'r'; 42])),
                ("docs", dir(&[])),
                ("latest", link(b"README")),
            ],
        );
        repo
    }

    #[test]
    fn reads_are_clamped_to_the_file() {
        let repo = fixture();
        let store = repo.store();
        let readme = resolve(&store, "/main/README").unwrap();

        assert_eq!(read(&store, &readme, 40, 10).unwrap(), b"rr");
        assert_eq!(read(&store, &readme, 0, 4096).unwrap().len(), 42);
        assert_eq!(read(&store, &readme, 10, 5).unwrap().len(), 5);
        assert!(read(&store, &readme, 42, 10).unwrap().is_empty());
        assert!(read(&store, &readme, u64::MAX, 10).unwrap().is_empty());
        assert!(read(&store, &readme, 0, 0).unwrap().is_empty());
    }

    #[test]
    fn directories_have_no_content() {
        let repo = fixture();
        let store = repo.store();

        for path in ["/main", "/main/docs", "/"] {
            let entity = resolve(&store, path).unwrap();
            assert_matches!(read(&store, &entity, 0, 1), Err(Error::IsADirectory(_)));
        }
    }

    #[test]
    fn symlink_targets() {
        let repo = fixture();
        let store = repo.store();

        let latest = resolve(&store, "/main/latest").unwrap();
        assert_eq!(read_link(&store, &latest).unwrap(), b"README");

        let readme = resolve(&store, "/main/README").unwrap();
        assert_matches!(read_link(&store, &readme), Err(Error::NotASymlink(_)));
        let docs = resolve(&store, "/main/docs").unwrap();
        assert_matches!(read_link(&store, &docs), Err(Error::NotASymlink(_)));
    }

    #[test]
    fn blob_removed_after_resolution_is_a_store_failure() {
        let repo = fixture();
        let store = repo.store();
        let readme = resolve(&store, "/main/README").unwrap();

        let hex = readme.oid().unwrap().to_string();
        let loose = repo.path().join("objects").join(&hex[..2]).join(&hex[2..]);
        std::fs::remove_file(loose).unwrap();

        let err = read(&store, &readme, 0, 5).unwrap_err();
        assert_matches!(err, Error::Store(ref e) if e.code() == git2::ErrorCode::NotFound);
        assert_eq!(err.errno(), libc::EIO);
    }
}
