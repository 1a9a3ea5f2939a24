use git2::Oid;

use crate::attributes::Attributes;
use crate::store::EntryKind;

/// What a resolved path is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A tree or blob inside the commit a branch points at.
    Object {
        branch: String,
        oid: Oid,
        kind: EntryKind,
        /// Path of the object relative to the commit's root tree. Never empty.
        residual: String,
    },
    /// The root tree of the commit a branch points at.
    BranchRoot { branch: String, tree: Oid },
    /// A virtual directory: a name prefix shared by one or more branches,
    /// none of which is named exactly by the path.
    BranchPrefix { prefix: String },
}

/// The result of resolving an emulated path.
///
/// Owned by the caller and never cached: resolving the same path again may
/// give different attributes once the repository has moved on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEntity {
    path: String,
    target: Target,
    attributes: Attributes,
}

impl ResolvedEntity {
    pub(crate) fn new(path: String, target: Target, attributes: Attributes) -> ResolvedEntity {
        ResolvedEntity {
            path,
            target,
            attributes,
        }
    }

    /// Absolute emulated path this entity was resolved from.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// The content identifier, for entities that have one.
    pub fn oid(&self) -> Option<Oid> {
        match &self.target {
            Target::Object { oid, .. } => Some(*oid),
            Target::BranchRoot { tree, .. } => Some(*tree),
            Target::BranchPrefix { .. } => None,
        }
    }

    /// Path below the branch root: empty for the root itself, absent for a
    /// branch prefix.
    pub fn residual(&self) -> Option<&str> {
        match &self.target {
            Target::Object { residual, .. } => Some(residual),
            Target::BranchRoot { .. } => Some(""),
            Target::BranchPrefix { .. } => None,
        }
    }

    pub fn is_branch_root(&self) -> bool {
        matches!(self.target, Target::BranchRoot { .. })
    }
}
