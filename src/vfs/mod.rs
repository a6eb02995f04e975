//! Virtual File System layer: the uniform, asynchronous operation surface
//! that fronts pluggable storage backends.
//!
//! The pieces fit together like this:
//!
//! - [`backend::VfsBackend`] is the contract a storage plugin implements: a
//!   single dispatch entry accepting an opcode-tagged call.
//! - [`dispatch::VfsRouter`] resolves file handles to backends (by the FH
//!   magic byte), owns the open-handle caches and exposes typed wrappers
//!   for each operation.
//! - [`open_cache::OpenCache`] de-duplicates concurrent opens of the same
//!   file handle and guarantees orderly release.
//! - [`resolver`] walks multi-component paths with bounded symlink
//!   following.
//! - [`attr`] carries the attribute record and its request/set bitmasks.
//!
//! Protocol handlers never talk to a backend directly; everything funnels
//! through the router so handle lifetimes and error mapping stay uniform.

use std::fmt;

use smallvec::SmallVec;

use crate::protocol::xdr::nfs3::nfsstat3;
use crate::protocol::xdr::nfs4::nfsstat4;
use crate::protocol::xdr::rpc::{auth_flavor, auth_unix};

pub mod attr;
pub mod backend;
pub mod dispatch;
pub mod open_cache;
pub mod resolver;

/// Result alias used throughout the VFS layer.
pub type VfsResult<T> = Result<T, VfsError>;

/// Maximum length in bytes of a file handle.
pub const VFS_FH_SIZE: usize = 128;

/// Maximum length in bytes of a single name component.
pub const VFS_NAME_MAX: usize = 255;

/// Maximum length in bytes of a path handed to the resolver.
pub const VFS_PATH_MAX: usize = 4096;

/// Maximum number of symlink hops the resolver will follow before
/// reporting a loop. Conservative bound, matching SYMLOOP_MAX on most
/// systems times a safety margin.
pub const VFS_SYMLOOP_MAX: u32 = 40;

/// Sentinel nanosecond value: "use the server's current time".
pub const VFS_TIME_NOW: u32 = u32::MAX;

/// Anonymous credentials used when a request carries no usable identity.
pub const VFS_ANON_UID: u32 = 65534;
/// Anonymous group used when a request carries no usable identity.
pub const VFS_ANON_GID: u32 = 65534;

/// Closed enumeration of backend errors.
///
/// Backends report failures only through this taxonomy; the pure mapping
/// functions below translate each kind to the per-protocol status code.
/// Anything a backend cannot express here is `ServerFault`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum VfsError {
    /// Not owner; privileged operation attempted by non-owner.
    Perm,
    /// No such file or directory.
    NoEnt,
    /// Hard I/O error.
    Io,
    /// No such device or address.
    NxIo,
    /// Permission denied by access checks.
    Access,
    /// Object already exists.
    Exist,
    /// Cross-device hard link attempted.
    XDev,
    /// Not a directory.
    NotDir,
    /// Is a directory.
    IsDir,
    /// Invalid argument.
    Inval,
    /// File too large for the backend.
    FBig,
    /// No space left on the backing store.
    NoSpc,
    /// Read-only file system.
    RoFs,
    /// Too many hard links.
    MLink,
    /// Name or path exceeds limits.
    NameTooLong,
    /// Directory not empty.
    NotEmpty,
    /// Quota exceeded.
    DQuot,
    /// File handle no longer refers to a live object.
    Stale,
    /// Directory cookie no longer valid.
    BadCookie,
    /// File handle failed consistency checks.
    BadHandle,
    /// Operation not supported by the backend.
    NotSupp,
    /// Value cannot be represented in the reply.
    Overflow,
    /// Internal dispatch fault (wrong reply arm, bad module state).
    Fault,
    /// Symlink loop detected during resolution.
    Loop,
    /// Too many open files.
    MFile,
    /// Name rejected by policy ("." or ".." where a real name is needed).
    BadName,
    /// Unclassifiable server-side failure.
    ServerFault,
}

impl fmt::Display for VfsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for VfsError {}

/// Maps a VFS error to the NFSv3 status code. The table is authoritative;
/// kinds v3 cannot express degrade to SERVERFAULT/IO.
pub fn nfsstat3_from_vfs(err: VfsError) -> nfsstat3 {
    match err {
        VfsError::Perm => nfsstat3::NFS3ERR_PERM,
        VfsError::NoEnt => nfsstat3::NFS3ERR_NOENT,
        VfsError::Io => nfsstat3::NFS3ERR_IO,
        VfsError::NxIo => nfsstat3::NFS3ERR_NXIO,
        VfsError::Access => nfsstat3::NFS3ERR_ACCES,
        VfsError::Exist => nfsstat3::NFS3ERR_EXIST,
        VfsError::XDev => nfsstat3::NFS3ERR_XDEV,
        VfsError::NotDir => nfsstat3::NFS3ERR_NOTDIR,
        VfsError::IsDir => nfsstat3::NFS3ERR_ISDIR,
        VfsError::Inval => nfsstat3::NFS3ERR_INVAL,
        VfsError::FBig => nfsstat3::NFS3ERR_FBIG,
        VfsError::NoSpc => nfsstat3::NFS3ERR_NOSPC,
        VfsError::RoFs => nfsstat3::NFS3ERR_ROFS,
        VfsError::MLink => nfsstat3::NFS3ERR_MLINK,
        VfsError::NameTooLong => nfsstat3::NFS3ERR_NAMETOOLONG,
        VfsError::NotEmpty => nfsstat3::NFS3ERR_NOTEMPTY,
        VfsError::DQuot => nfsstat3::NFS3ERR_DQUOT,
        VfsError::Stale => nfsstat3::NFS3ERR_STALE,
        VfsError::BadCookie => nfsstat3::NFS3ERR_BAD_COOKIE,
        VfsError::BadHandle => nfsstat3::NFS3ERR_BADHANDLE,
        VfsError::NotSupp => nfsstat3::NFS3ERR_NOTSUPP,
        VfsError::Overflow => nfsstat3::NFS3ERR_TOOSMALL,
        VfsError::Loop => nfsstat3::NFS3ERR_NOENT,
        VfsError::MFile => nfsstat3::NFS3ERR_SERVERFAULT,
        VfsError::BadName => nfsstat3::NFS3ERR_INVAL,
        VfsError::Fault | VfsError::ServerFault => nfsstat3::NFS3ERR_SERVERFAULT,
    }
}

/// Maps a VFS error to the NFSv4 status code.
pub fn nfsstat4_from_vfs(err: VfsError) -> nfsstat4 {
    match err {
        VfsError::Perm => nfsstat4::NFS4ERR_PERM,
        VfsError::NoEnt => nfsstat4::NFS4ERR_NOENT,
        VfsError::Io => nfsstat4::NFS4ERR_IO,
        VfsError::NxIo => nfsstat4::NFS4ERR_NXIO,
        VfsError::Access => nfsstat4::NFS4ERR_ACCESS,
        VfsError::Exist => nfsstat4::NFS4ERR_EXIST,
        VfsError::XDev => nfsstat4::NFS4ERR_XDEV,
        VfsError::NotDir => nfsstat4::NFS4ERR_NOTDIR,
        VfsError::IsDir => nfsstat4::NFS4ERR_ISDIR,
        VfsError::Inval => nfsstat4::NFS4ERR_INVAL,
        VfsError::FBig => nfsstat4::NFS4ERR_FBIG,
        VfsError::NoSpc => nfsstat4::NFS4ERR_NOSPC,
        VfsError::RoFs => nfsstat4::NFS4ERR_ROFS,
        VfsError::MLink => nfsstat4::NFS4ERR_MLINK,
        VfsError::NameTooLong => nfsstat4::NFS4ERR_NAMETOOLONG,
        VfsError::NotEmpty => nfsstat4::NFS4ERR_NOTEMPTY,
        VfsError::DQuot => nfsstat4::NFS4ERR_DQUOT,
        VfsError::Stale => nfsstat4::NFS4ERR_STALE,
        VfsError::BadCookie => nfsstat4::NFS4ERR_BAD_COOKIE,
        VfsError::BadHandle => nfsstat4::NFS4ERR_BADHANDLE,
        VfsError::NotSupp => nfsstat4::NFS4ERR_NOTSUPP,
        VfsError::Overflow => nfsstat4::NFS4ERR_TOOSMALL,
        VfsError::Loop => nfsstat4::NFS4ERR_NOENT,
        VfsError::MFile => nfsstat4::NFS4ERR_SERVERFAULT,
        VfsError::BadName => nfsstat4::NFS4ERR_BADNAME,
        VfsError::Fault | VfsError::ServerFault => nfsstat4::NFS4ERR_SERVERFAULT,
    }
}

/// Opaque file handle: at most [`VFS_FH_SIZE`] bytes whose first byte is
/// the magic of the backend module that owns the object.
///
/// Handles are stable and unique within a mount; the server treats them as
/// persistent and never interprets the bytes past the magic.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct FileHandle(SmallVec<[u8; VFS_FH_SIZE]>);

impl FileHandle {
    /// Builds a handle from raw bytes, rejecting empty or oversized input.
    pub fn new(bytes: &[u8]) -> VfsResult<FileHandle> {
        if bytes.is_empty() || bytes.len() > VFS_FH_SIZE {
            return Err(VfsError::BadHandle);
        }
        Ok(FileHandle(SmallVec::from_slice(bytes)))
    }

    /// Builds a handle owned by the given backend magic.
    pub fn with_magic(magic: u8, rest: &[u8]) -> VfsResult<FileHandle> {
        let mut bytes = SmallVec::with_capacity(rest.len() + 1);
        bytes.push(magic);
        bytes.extend_from_slice(rest);
        if bytes.len() > VFS_FH_SIZE {
            return Err(VfsError::BadHandle);
        }
        Ok(FileHandle(bytes))
    }

    /// The backend module magic (first byte).
    pub fn magic(&self) -> u8 {
        self.0[0]
    }

    /// Raw handle bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Handle length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// A handle is never empty by construction.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl fmt::Debug for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fh:")?;
        for byte in self.0.iter() {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl AsRef<[u8]> for FileHandle {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Protocol-independent credentials attached to every VFS call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cred {
    /// Effective user id
    pub uid: u32,
    /// Effective group id
    pub gid: u32,
    /// Supplementary groups
    pub groups: Vec<u32>,
}

impl Cred {
    /// Anonymous identity for AUTH_NONE or unknown flavors.
    pub fn anonymous() -> Cred {
        Cred { uid: VFS_ANON_UID, gid: VFS_ANON_GID, groups: Vec::new() }
    }

    /// UNIX identity extracted from AUTH_SYS credentials.
    pub fn from_unix(uid: u32, gid: u32, groups: Vec<u32>) -> Cred {
        Cred { uid, gid, groups }
    }

    /// True when the credential names the superuser.
    pub fn is_superuser(&self) -> bool {
        self.uid == 0
    }

    /// True when the credential is a member of the given group.
    pub fn in_group(&self, gid: u32) -> bool {
        self.gid == gid || self.groups.contains(&gid)
    }
}

impl Default for Cred {
    fn default() -> Cred {
        Cred::anonymous()
    }
}

/// Maps RPC credentials to VFS credentials.
///
/// For AUTH_UNIX the UNIX identity is extracted directly; for AUTH_NULL or
/// any unknown flavor the anonymous identity is used.
pub fn map_cred(flavor: auth_flavor, auth: &auth_unix) -> Cred {
    match flavor {
        auth_flavor::AUTH_UNIX => Cred::from_unix(auth.uid, auth.gid, auth.gids.clone()),
        _ => Cred::anonymous(),
    }
}

/// Open flag bits accepted by the open family of backend operations.
pub mod open_flags {
    /// Open for reading only.
    pub const OPEN_RDONLY: u32 = 0x0001;
    /// Open for reading and writing.
    pub const OPEN_RDWR: u32 = 0x0002;
    /// Open for writing only.
    pub const OPEN_WRONLY: u32 = 0x0004;
    /// Create the object if absent.
    pub const OPEN_CREATE: u32 = 0x0008;
    /// With OPEN_CREATE: fail if the object exists.
    pub const OPEN_EXCLUSIVE: u32 = 0x0010;
    /// Metadata-only open; the handle cannot read, write or truncate.
    pub const OPEN_PATH: u32 = 0x0020;
    /// The open cache may satisfy this open from an existing handle.
    pub const OPEN_INFERRED: u32 = 0x0040;
    /// The object must be a directory.
    pub const OPEN_DIRECTORY: u32 = 0x0080;
    /// The caller promises not to mutate through this handle.
    pub const OPEN_READ_ONLY: u32 = 0x0100;
}

/// Resolver behavior flags.
pub mod lookup_flags {
    /// Follow a symlink in the final path component.
    pub const LOOKUP_FOLLOW: u32 = 0x0001;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_handle_bounds() {
        assert_eq!(FileHandle::new(&[]).unwrap_err(), VfsError::BadHandle);
        assert_eq!(FileHandle::new(&[0u8; VFS_FH_SIZE + 1]).unwrap_err(), VfsError::BadHandle);
        let fh = FileHandle::new(&[7, 1, 2, 3]).unwrap();
        assert_eq!(fh.magic(), 7);
        assert_eq!(fh.len(), 4);
    }

    #[test]
    fn unknown_errors_degrade_to_serverfault() {
        assert_eq!(nfsstat3_from_vfs(VfsError::ServerFault), nfsstat3::NFS3ERR_SERVERFAULT);
        assert_eq!(nfsstat4_from_vfs(VfsError::Fault), nfsstat4::NFS4ERR_SERVERFAULT);
    }

    #[test]
    fn badname_maps_per_protocol() {
        assert_eq!(nfsstat3_from_vfs(VfsError::BadName), nfsstat3::NFS3ERR_INVAL);
        assert_eq!(nfsstat4_from_vfs(VfsError::BadName), nfsstat4::NFS4ERR_BADNAME);
    }
}
