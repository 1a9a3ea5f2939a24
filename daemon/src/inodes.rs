use std::collections::HashMap;

use fuser::FUSE_ROOT_ID;

/// Index Node Number
pub type Inode = u64;

/// Two-way map between inode numbers and emulated paths.
///
/// An inode is handed out the first time a path is seen and is never reused
/// for another path while mounted, so the kernel's view stays stable across
/// branch updates.
#[derive(Debug)]
pub struct InodeTable {
    paths: HashMap<Inode, String>,
    inodes: HashMap<String, Inode>,
    next: Inode,
}

impl Default for InodeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl InodeTable {
    pub fn new() -> Self {
        let root = "/".to_string();
        InodeTable {
            paths: HashMap::from([(FUSE_ROOT_ID, root.clone())]),
            inodes: HashMap::from([(root, FUSE_ROOT_ID)]),
            next: FUSE_ROOT_ID + 1,
        }
    }

    pub fn path(&self, inode: Inode) -> Option<&str> {
        self.paths.get(&inode).map(String::as_str)
    }

    /// Inode for `path`, assigning a fresh one if the path is new.
    pub fn inode(&mut self, path: &str) -> Inode {
        if let Some(inode) = self.inodes.get(path) {
            return *inode;
        }
        let inode = self.next;
        self.next += 1;
        self.paths.insert(inode, path.to_string());
        self.inodes.insert(path.to_string(), inode);
        inode
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }
}
