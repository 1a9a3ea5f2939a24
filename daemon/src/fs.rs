use std::{
    ffi::{c_int, OsStr},
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use common::{path, Attributes, BranchView, FileKind};
use fuser::{
    FileAttr, FileType, Filesystem, KernelConfig, ReplyAttr, ReplyData, ReplyDirectory,
    ReplyEntry, ReplyOpen, Request,
};
use tracing::{debug, info};

use crate::inodes::{Inode, InodeTable};

fn system_time_from_time((secs, nsecs): (i64, u32)) -> SystemTime {
    if secs >= 0 {
        UNIX_EPOCH + Duration::new(secs as u64, nsecs)
    } else {
        UNIX_EPOCH - Duration::new(secs.unsigned_abs(), nsecs)
    }
}

fn file_type(kind: FileKind) -> FileType {
    match kind {
        FileKind::File => FileType::RegularFile,
        FileKind::Directory => FileType::Directory,
        FileKind::Symlink => FileType::Symlink,
    }
}

/// Kernel view of a synthesized record. Ownership is reported as the
/// requesting user's, since git records none.
pub(crate) fn file_attr(ino: Inode, attrs: &Attributes, uid: u32, gid: u32) -> FileAttr {
    FileAttr {
        ino,
        size: attrs.size(),
        blocks: attrs.blocks(),
        atime: system_time_from_time(attrs.last_accessed()),
        mtime: system_time_from_time(attrs.last_modified()),
        ctime: system_time_from_time(attrs.last_metadata_changed()),
        crtime: UNIX_EPOCH,
        kind: file_type(attrs.kind()),
        perm: attrs.perm(),
        nlink: attrs.nlink(),
        uid,
        gid,
        rdev: 0,
        blksize: u32::try_from(attrs.block_size()).unwrap_or(u32::MAX),
        flags: 0,
    }
}

pub struct BranchFS {
    view: BranchView,
    inodes: InodeTable,
    ttl: Duration,
}

impl BranchFS {
    pub fn new(view: BranchView, ttl: Duration) -> Self {
        BranchFS {
            view,
            inodes: InodeTable::new(),
            ttl,
        }
    }

    fn path(&self, inode: Inode) -> Result<String, c_int> {
        self.inodes
            .path(inode)
            .map(str::to_string)
            .ok_or(libc::ENOENT)
    }

    fn child_path(&self, parent: Inode, name: &OsStr) -> Result<String, c_int> {
        let parent = self.inodes.path(parent).ok_or(libc::ENOENT)?;
        // Every name the filesystem hands out is UTF-8.
        let name = name.to_str().ok_or(libc::ENOENT)?;
        Ok(path::join(parent, name))
    }

    fn attr(&mut self, path: &str, req: &Request) -> Result<FileAttr, c_int> {
        let entity = self.view.getattr(path).map_err(|e| e.errno())?;
        let ino = self.inodes.inode(entity.path());
        Ok(file_attr(ino, entity.attributes(), req.uid(), req.gid()))
    }
}

impl Filesystem for BranchFS {
    fn init(&mut self, _req: &Request, _config: &mut KernelConfig) -> Result<(), c_int> {
        let root = self.view.getattr("/").map_err(|e| e.errno())?;
        info!(
            "serving {:?} with {} top level entries",
            self.view.store(),
            root.attributes().nlink() - 1
        );
        Ok(())
    }

    fn lookup(&mut self, req: &Request, parent: u64, name: &OsStr, reply: ReplyEntry) {
        let attr = self
            .child_path(parent, name)
            .and_then(|path| self.attr(&path, req));
        match attr {
            Ok(attr) => reply.entry(&self.ttl, &attr, 0),
            Err(error_code) => reply.error(error_code),
        }
    }

    fn getattr(&mut self, req: &Request, inode: u64, reply: ReplyAttr) {
        match self.path(inode).and_then(|path| self.attr(&path, req)) {
            Ok(attr) => reply.attr(&self.ttl, &attr),
            Err(error_code) => reply.error(error_code),
        }
    }

    fn readlink(&mut self, _req: &Request, inode: u64, reply: ReplyData) {
        let target = self
            .path(inode)
            .and_then(|path| self.view.readlink(&path).map_err(|e| e.errno()));
        match target {
            Ok(target) => reply.data(&target),
            Err(error_code) => reply.error(error_code),
        }
    }

    fn open(&mut self, _req: &Request, inode: u64, flags: i32, reply: ReplyOpen) {
        let opened = self
            .path(inode)
            .and_then(|path| self.view.open(&path, flags).map_err(|e| e.errno()));
        match opened {
            Ok(entity) => {
                debug!(
                    "open {} mode {:o} nlink {} size {}",
                    entity.path(),
                    entity.attributes().mode(),
                    entity.attributes().nlink(),
                    entity.attributes().size()
                );
                reply.opened(0, 0)
            }
            Err(error_code) => reply.error(error_code),
        }
    }

    fn read(
        &mut self,
        _req: &Request,
        inode: u64,
        _fh: u64,
        offset: i64,
        size: u32,
        _flags: i32,
        _lock_owner: Option<u64>,
        reply: ReplyData,
    ) {
        let Ok(offset) = u64::try_from(offset) else {
            reply.error(libc::EINVAL);
            return;
        };
        let data = self.path(inode).and_then(|path| {
            self.view
                .read(&path, offset, size as usize)
                .map_err(|e| e.errno())
        });
        match data {
            Ok(data) => reply.data(&data),
            Err(error_code) => reply.error(error_code),
        }
    }

    fn opendir(&mut self, _req: &Request, inode: u64, _flags: i32, reply: ReplyOpen) {
        let entity = self
            .path(inode)
            .and_then(|path| self.view.getattr(&path).map_err(|e| e.errno()));
        match entity {
            Ok(entity) if entity.attributes().kind() == FileKind::Directory => reply.opened(0, 0),
            Ok(_) => reply.error(libc::ENOTDIR),
            Err(error_code) => reply.error(error_code),
        }
    }

    fn readdir(
        &mut self,
        _req: &Request,
        inode: u64,
        _fh: u64,
        offset: i64,
        mut reply: ReplyDirectory,
    ) {
        let Ok(offset) = usize::try_from(offset) else {
            reply.error(libc::EINVAL);
            return;
        };
        let path = match self.path(inode) {
            Ok(path) => path,
            Err(error_code) => {
                reply.error(error_code);
                return;
            }
        };
        let listing = match self.view.readdir(&path) {
            Ok(listing) => listing,
            Err(e) => {
                reply.error(e.errno());
                return;
            }
        };

        for (index, entry) in listing.enumerate().skip(offset) {
            let entry_inode = match entry.name.as_str() {
                "." => inode,
                ".." => self.inodes.inode(path::parent(&path)),
                name => self.inodes.inode(&path::join(&path, name)),
            };

            let buffer_full: bool = reply.add(
                entry_inode,
                index as i64 + 1,
                file_type(entry.kind),
                &entry.name,
            );

            if buffer_full {
                break;
            }
        }
        debug!("{path}: {} inodes known", self.inodes.len());

        reply.ok();
    }
}
