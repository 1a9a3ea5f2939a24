//! Read-only view of a git repository as a directory hierarchy: one
//! directory per local branch, holding the tree of the branch's latest
//! commit. Branch names containing `/` nest.

pub mod attributes;
pub mod entity;
pub mod error;
pub mod lister;
pub mod path;
pub mod reader;
pub mod resolver;
pub mod store;
pub mod view;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use attributes::{Attributes, FileKind};
pub use entity::{ResolvedEntity, Target};
pub use error::{Error, Result};
pub use lister::{DirEntry, Listing};
pub use store::Store;
pub use view::BranchView;
