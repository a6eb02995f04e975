//! The attribute record and its validity bitmasks.
//!
//! A single [`Attr`] structure carries the union of POSIX stat, statvfs,
//! file handle, and filesystem identity. No field has validity of its own:
//! callers request attributes through `req_mask` and producers report what
//! they actually populated through `set_mask`. Bits not present in
//! `set_mask` must never be read.

use super::{FileHandle, VFS_TIME_NOW};

/// Stable bit assignments over a 64-bit mask word.
pub mod mask {
    /// File handle of the object
    pub const ATTR_FH: u64 = 1 << 0;
    /// Containing device / filesystem id
    pub const ATTR_DEV: u64 = 1 << 1;
    /// Inode number
    pub const ATTR_INUM: u64 = 1 << 2;
    /// Mode bits including the file type
    pub const ATTR_MODE: u64 = 1 << 3;
    /// Hard link count
    pub const ATTR_NLINK: u64 = 1 << 4;
    /// Owner user id
    pub const ATTR_UID: u64 = 1 << 5;
    /// Owner group id
    pub const ATTR_GID: u64 = 1 << 6;
    /// Device numbers for special files
    pub const ATTR_RDEV: u64 = 1 << 7;
    /// Size in bytes
    pub const ATTR_SIZE: u64 = 1 << 8;
    /// Bytes actually allocated
    pub const ATTR_SPACE_USED: u64 = 1 << 9;
    /// Access time
    pub const ATTR_ATIME: u64 = 1 << 10;
    /// Modification time
    pub const ATTR_MTIME: u64 = 1 << 11;
    /// Status change time
    pub const ATTR_CTIME: u64 = 1 << 12;
    /// Filesystem identity
    pub const ATTR_FSID: u64 = 1 << 13;
    /// Filesystem total bytes
    pub const ATTR_FS_SPACE_TOTAL: u64 = 1 << 14;
    /// Filesystem free bytes
    pub const ATTR_FS_SPACE_FREE: u64 = 1 << 15;
    /// Filesystem bytes available to unprivileged callers
    pub const ATTR_FS_SPACE_AVAIL: u64 = 1 << 16;
    /// Filesystem bytes in use
    pub const ATTR_FS_SPACE_USED: u64 = 1 << 17;
    /// Filesystem total file slots
    pub const ATTR_FS_FILES_TOTAL: u64 = 1 << 18;
    /// Filesystem free file slots
    pub const ATTR_FS_FILES_FREE: u64 = 1 << 19;
    /// Filesystem file slots available to unprivileged callers
    pub const ATTR_FS_FILES_AVAIL: u64 = 1 << 20;
    /// The pre/post pair around a mutation was captured atomically
    pub const ATTR_ATOMIC: u64 = 1 << 21;

    /// The classic stat attribute set.
    pub const ATTR_MASK_STAT: u64 = ATTR_DEV
        | ATTR_INUM
        | ATTR_MODE
        | ATTR_NLINK
        | ATTR_UID
        | ATTR_GID
        | ATTR_RDEV
        | ATTR_SIZE
        | ATTR_SPACE_USED
        | ATTR_ATIME
        | ATTR_MTIME
        | ATTR_CTIME;

    /// The filesystem totals set.
    pub const ATTR_MASK_STATFS: u64 = ATTR_FS_SPACE_TOTAL
        | ATTR_FS_SPACE_FREE
        | ATTR_FS_SPACE_AVAIL
        | ATTR_FS_SPACE_USED
        | ATTR_FS_FILES_TOTAL
        | ATTR_FS_FILES_FREE
        | ATTR_FS_FILES_AVAIL;

    /// The weak-cache-consistency subset captured around v3 mutations.
    pub const ATTR_MASK_WCC: u64 = ATTR_SIZE | ATTR_MTIME | ATTR_CTIME;
}

/// Seconds/nanoseconds timestamp.
///
/// In a set request, `nsec == VFS_TIME_NOW` means "the server's current
/// time"; otherwise both fields are literal.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct AttrTime {
    pub sec: i64,
    pub nsec: u32,
}

impl AttrTime {
    /// The sentinel requesting the server's current time.
    pub fn now_sentinel() -> AttrTime {
        AttrTime { sec: 0, nsec: VFS_TIME_NOW }
    }

    /// True when this value is the current-time sentinel.
    pub fn is_now(&self) -> bool {
        self.nsec == VFS_TIME_NOW
    }
}

/// The attribute record.
///
/// `req_mask` is set by the caller; `set_mask` is set by the producer and
/// is the only source of truth for which members are valid.
#[derive(Debug, Clone, Default)]
pub struct Attr {
    /// Attributes the caller asked for
    pub req_mask: u64,
    /// Attributes actually populated
    pub set_mask: u64,

    /// File handle, valid under ATTR_FH
    pub fh: Option<FileHandle>,
    /// Containing device, valid under ATTR_DEV
    pub dev: u64,
    /// Inode number, valid under ATTR_INUM
    pub inum: u64,
    /// Mode including file type bits, valid under ATTR_MODE
    pub mode: u32,
    /// Hard link count, valid under ATTR_NLINK
    pub nlink: u32,
    /// Owner uid, valid under ATTR_UID
    pub uid: u32,
    /// Owner gid, valid under ATTR_GID
    pub gid: u32,
    /// Device numbers packed major<<32|minor, valid under ATTR_RDEV
    pub rdev: u64,
    /// Size in bytes, valid under ATTR_SIZE
    pub size: u64,
    /// Allocated bytes, valid under ATTR_SPACE_USED
    pub space_used: u64,
    /// Access time, valid under ATTR_ATIME
    pub atime: AttrTime,
    /// Modification time, valid under ATTR_MTIME
    pub mtime: AttrTime,
    /// Change time, valid under ATTR_CTIME
    pub ctime: AttrTime,
    /// Filesystem id, valid under ATTR_FSID
    pub fsid: u64,
    /// Filesystem totals, valid under the corresponding ATTR_FS_* bits
    pub fs_space_total: u64,
    pub fs_space_free: u64,
    pub fs_space_avail: u64,
    pub fs_space_used: u64,
    pub fs_files_total: u64,
    pub fs_files_free: u64,
    pub fs_files_avail: u64,
}

impl Attr {
    /// A fresh record requesting the given attributes.
    pub fn request(req_mask: u64) -> Attr {
        Attr { req_mask, ..Attr::default() }
    }

    /// True when every bit of `bits` was populated by the producer.
    pub fn has(&self, bits: u64) -> bool {
        self.set_mask & bits == bits
    }

    /// File type bits of the mode word (valid under ATTR_MODE).
    pub fn file_type(&self) -> u32 {
        use crate::protocol::xdr::nfs4::type_bits::S_IFMT;
        self.mode & S_IFMT
    }

    /// True when the object is a symlink (requires ATTR_MODE).
    pub fn is_symlink(&self) -> bool {
        use crate::protocol::xdr::nfs4::type_bits::S_IFLNK;
        self.has(mask::ATTR_MODE) && self.file_type() == S_IFLNK
    }

    /// True when the object is a directory (requires ATTR_MODE).
    pub fn is_dir(&self) -> bool {
        use crate::protocol::xdr::nfs4::type_bits::S_IFDIR;
        self.has(mask::ATTR_MODE) && self.file_type() == S_IFDIR
    }
}

#[cfg(test)]
mod tests {
    use super::mask::*;
    use super::*;

    #[test]
    fn stat_superset_contains_wcc() {
        assert_eq!(ATTR_MASK_STAT & ATTR_MASK_WCC, ATTR_MASK_WCC);
        assert_eq!(ATTR_MASK_STAT & ATTR_MASK_STATFS, 0);
    }

    #[test]
    fn has_checks_all_bits() {
        let mut attr = Attr::request(ATTR_MODE | ATTR_SIZE);
        attr.set_mask = ATTR_MODE;
        assert!(attr.has(ATTR_MODE));
        assert!(!attr.has(ATTR_MODE | ATTR_SIZE));
    }

    #[test]
    fn time_now_sentinel() {
        assert!(AttrTime::now_sentinel().is_now());
        assert!(!AttrTime { sec: 5, nsec: 3 }.is_now());
    }
}
