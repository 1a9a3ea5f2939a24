use std::ffi::c_int;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failure of a path-level operation.
///
/// Every variant maps onto one errno through [`Error::errno`]; store
/// failures are all reported to the kernel as a generic I/O error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}: no such branch, branch prefix or tree entry")]
    NotFound(String),

    #[error("{0}: not a directory")]
    NotADirectory(String),

    #[error("{0}: is a directory")]
    IsADirectory(String),

    #[error("{0}: not a symbolic link")]
    NotASymlink(String),

    #[error("{0}: the filesystem is read-only")]
    AccessDenied(String),

    #[error("object store lookup failed: {0}")]
    Store(#[from] git2::Error),

    #[error("branch {name} cannot be followed: {reason}")]
    BrokenReference { name: String, reason: &'static str },

    #[error("internal invariant violated: {0}")]
    Invariant(String),
}

impl Error {
    pub fn errno(&self) -> c_int {
        match self {
            Error::NotFound(_) => libc::ENOENT,
            Error::NotADirectory(_) => libc::ENOTDIR,
            Error::IsADirectory(_) => libc::EISDIR,
            Error::NotASymlink(_) => libc::EINVAL,
            Error::AccessDenied(_) => libc::EACCES,
            Error::Store(_) | Error::BrokenReference { .. } | Error::Invariant(_) => libc::EIO,
        }
    }

    /// Misses are routine for a filesystem; everything else deserves a warning.
    pub fn is_miss(&self) -> bool {
        matches!(
            self,
            Error::NotFound(_)
                | Error::NotADirectory(_)
                | Error::IsADirectory(_)
                | Error::NotASymlink(_)
                | Error::AccessDenied(_)
        )
    }
}
