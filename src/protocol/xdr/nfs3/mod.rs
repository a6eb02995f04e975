//! The module defines XDR data types and constants for Network File System
//! (NFS) version 3, as defined in RFC 1813.
//!
//! NFS version 3 is a stateless distributed file system protocol that
//! provides transparent remote access to shared file systems over a network.
//! This module defines the constants, basic data types, and complex
//! structures that form the foundation of the NFSv3 protocol.

// Allow unused code since we're implementing the full NFS3 protocol specification
#![allow(dead_code)]
// Preserve original RFC naming conventions for consistency with the specification
#![allow(non_camel_case_types)]

use std::fmt;
use std::io::{Read, Write};

use num_derive::{FromPrimitive, ToPrimitive};

use super::{Deserialize, Serialize};
use crate::{DeserializeEnum, DeserializeStruct, SerializeEnum, SerializeStruct};

// Modules for different operation types
pub mod dir;
pub mod file;
pub mod fs;

// Section 2.2 Constants
/// The RPC program number for NFS version 3 service.
pub const PROGRAM: u32 = 100003;
/// The version number for NFS version 3 protocol.
pub const VERSION: u32 = 3;

// Section 2.4 Sizes
//
/// The maximum size in bytes of the opaque file handle.
///
/// RFC 1813 allows up to 64 bytes; the VFS layer produces handles of up
/// to 128 bytes, which NFSv4 permits and v3 clients in practice accept.
pub const NFS3_FHSIZE: u32 = 128;

/// The size in bytes of the opaque cookie verifier passed by
/// READDIR and READDIRPLUS.
pub const NFS3_COOKIEVERFSIZE: u32 = 8;

/// The size in bytes of the opaque verifier used for exclusive CREATE.
pub const NFS3_CREATEVERFSIZE: u32 = 8;

/// The size in bytes of the opaque verifier used for asynchronous WRITE.
pub const NFS3_WRITEVERFSIZE: u32 = 8;

// Section 2.5 Basic Data Types

/// A string type used in NFS for filenames and paths.
///
/// This is essentially a vector of bytes, but with specific formatting
/// for NFS protocol requirements.
#[derive(Default, Clone, PartialEq, Eq)]
pub struct nfsstring(pub Vec<u8>);

impl nfsstring {
    /// Returns the length of the string in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the string is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for nfsstring {
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}

impl From<&[u8]> for nfsstring {
    fn from(value: &[u8]) -> Self {
        Self(value.into())
    }
}

impl AsRef<[u8]> for nfsstring {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl std::ops::Deref for nfsstring {
    type Target = Vec<u8>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Debug for nfsstring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", String::from_utf8_lossy(&self.0))
    }
}

impl fmt::Display for nfsstring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", String::from_utf8_lossy(&self.0))
    }
}

impl Serialize for nfsstring {
    fn serialize<W: Write + ?Sized>(&self, dest: &mut W) -> std::io::Result<()> {
        self.0.serialize(dest)
    }
}

impl Deserialize for nfsstring {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        self.0.deserialize(src)
    }
}

/// Procedure numbers for NFS version 3 protocol.
#[allow(clippy::upper_case_acronyms)]
#[derive(Copy, Clone, Debug, FromPrimitive, ToPrimitive)]
pub enum NFSProgram {
    /// Do nothing - used primarily for performance measurement
    NFSPROC3_NULL = 0,
    /// Get file attributes
    NFSPROC3_GETATTR = 1,
    /// Set file attributes
    NFSPROC3_SETATTR = 2,
    /// Look up filename
    NFSPROC3_LOOKUP = 3,
    /// Check file access permission
    NFSPROC3_ACCESS = 4,
    /// Read from symbolic link
    NFSPROC3_READLINK = 5,
    /// Read from file
    NFSPROC3_READ = 6,
    /// Write to file
    NFSPROC3_WRITE = 7,
    /// Create file
    NFSPROC3_CREATE = 8,
    /// Create directory
    NFSPROC3_MKDIR = 9,
    /// Create symbolic link
    NFSPROC3_SYMLINK = 10,
    /// Create special device
    NFSPROC3_MKNOD = 11,
    /// Remove file
    NFSPROC3_REMOVE = 12,
    /// Remove directory
    NFSPROC3_RMDIR = 13,
    /// Rename file or directory
    NFSPROC3_RENAME = 14,
    /// Create hard link
    NFSPROC3_LINK = 15,
    /// Read directory
    NFSPROC3_READDIR = 16,
    /// Extended read directory
    NFSPROC3_READDIRPLUS = 17,
    /// Get file system statistics
    NFSPROC3_FSSTAT = 18,
    /// Get file system information
    NFSPROC3_FSINFO = 19,
    /// Get path configuration
    NFSPROC3_PATHCONF = 20,
    /// Commit cached data
    NFSPROC3_COMMIT = 21,
    /// Invalid procedure
    INVALID = 22,
}

/// Opaque byte type as defined in RFC 1813 section 2.5
pub type opaque = u8;
/// String used for a component of a pathname
pub type filename3 = nfsstring;
/// String used for a pathname or symbolic link contents
pub type nfspath3 = nfsstring;
/// A unique number that identifies a file within a filesystem
pub type fileid3 = u64;
/// Directory entry position cookie used in READDIR iteration
pub type cookie3 = u64;
/// Cookie verifier used to detect when a directory being read has changed
pub type cookieverf3 = [opaque; NFS3_COOKIEVERFSIZE as usize];
/// Create verifier used in CREATE with EXCLUSIVE mode
pub type createverf3 = [opaque; NFS3_CREATEVERFSIZE as usize];
/// Write verifier used to detect server reboots between WRITE and COMMIT
pub type writeverf3 = [opaque; NFS3_WRITEVERFSIZE as usize];
/// User ID identifying the owner of a file
pub type uid3 = u32;
/// Group ID identifying the group ownership of a file
pub type gid3 = u32;
/// File size in bytes
pub type size3 = u64;
/// A position within a file
pub type offset3 = u64;
/// File mode bits
pub type mode3 = u32;
/// Count of bytes or entries
pub type count3 = u32;

/// Status codes returned by NFS version 3 operations
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[repr(u32)]
pub enum nfsstat3 {
    /// Indicates the call completed successfully.
    #[default]
    NFS3_OK = 0,
    /// Not owner. The operation was not allowed because the caller is
    /// either not a privileged user (root) or not the owner of the
    /// target of the operation.
    NFS3ERR_PERM = 1,
    /// No such file or directory.
    NFS3ERR_NOENT = 2,
    /// I/O error. A hard error occurred while processing the requested
    /// operation.
    NFS3ERR_IO = 5,
    /// I/O error. No such device or address.
    NFS3ERR_NXIO = 6,
    /// Permission denied. The caller does not have the correct
    /// permission to perform the requested operation. Contrast this
    /// with NFS3ERR_PERM, which restricts itself to owner or privileged
    /// user permission failures.
    NFS3ERR_ACCES = 13,
    /// File exists. The file specified already exists.
    NFS3ERR_EXIST = 17,
    /// Attempt to do a cross-device hard link.
    NFS3ERR_XDEV = 18,
    /// No such device.
    NFS3ERR_NODEV = 19,
    /// Not a directory. The caller specified a non-directory in a
    /// directory operation.
    NFS3ERR_NOTDIR = 20,
    /// Is a directory. The caller specified a directory in a
    /// non-directory operation.
    NFS3ERR_ISDIR = 21,
    /// Invalid argument or unsupported argument for an operation.
    NFS3ERR_INVAL = 22,
    /// File too large. The operation would have caused a file to grow
    /// beyond the server's limit.
    NFS3ERR_FBIG = 27,
    /// No space left on device.
    NFS3ERR_NOSPC = 28,
    /// Read-only file system.
    NFS3ERR_ROFS = 30,
    /// Too many hard links.
    NFS3ERR_MLINK = 31,
    /// The filename in an operation was too long.
    NFS3ERR_NAMETOOLONG = 63,
    /// An attempt was made to remove a directory that was not empty.
    NFS3ERR_NOTEMPTY = 66,
    /// Resource (quota) hard limit exceeded.
    NFS3ERR_DQUOT = 69,
    /// Invalid file handle. The file referred to by that file handle no
    /// longer exists or access to it has been revoked.
    NFS3ERR_STALE = 70,
    /// Too many levels of remote in path.
    NFS3ERR_REMOTE = 71,
    /// Illegal NFS file handle. The file handle failed internal
    /// consistency checks.
    NFS3ERR_BADHANDLE = 10001,
    /// Update synchronization mismatch was detected during a SETATTR
    /// operation.
    NFS3ERR_NOT_SYNC = 10002,
    /// READDIR or READDIRPLUS cookie is stale
    NFS3ERR_BAD_COOKIE = 10003,
    /// Operation is not supported.
    NFS3ERR_NOTSUPP = 10004,
    /// Buffer or request is too small.
    NFS3ERR_TOOSMALL = 10005,
    /// An error occurred on the server which does not map to any of the
    /// legal NFS version 3 protocol error values.
    NFS3ERR_SERVERFAULT = 10006,
    /// An attempt was made to create an object of a type not supported
    /// by the server.
    NFS3ERR_BADTYPE = 10007,
    /// The server initiated the request, but was not able to complete
    /// it in a timely fashion.
    NFS3ERR_JUKEBOX = 10008,
}
SerializeEnum!(nfsstat3);
DeserializeEnum!(nfsstat3);

/// File type enumeration as defined in RFC 1813 section 2.3.5
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[repr(u32)]
pub enum ftype3 {
    /// Regular File
    #[default]
    NF3REG = 1,
    /// Directory
    NF3DIR = 2,
    /// Block Special Device
    NF3BLK = 3,
    /// Character Special Device
    NF3CHR = 4,
    /// Symbolic Link
    NF3LNK = 5,
    /// Socket
    NF3SOCK = 6,
    /// Named Pipe
    NF3FIFO = 7,
}
SerializeEnum!(ftype3);
DeserializeEnum!(ftype3);

/// Major and minor device numbers for character and block special devices
#[derive(Copy, Clone, Debug, Default)]
pub struct specdata3 {
    /// Major device number
    pub specdata1: u32,
    /// Minor device number
    pub specdata2: u32,
}
DeserializeStruct!(specdata3, specdata1, specdata2);
SerializeStruct!(specdata3, specdata1, specdata2);

/// The NFS version 3 file handle.
///
/// The file handle uniquely identifies a file or directory on the server;
/// the server is responsible for its internal format and interpretation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct nfs_fh3 {
    /// Raw file handle data (up to NFS3_FHSIZE bytes)
    pub data: Vec<u8>,
}
DeserializeStruct!(nfs_fh3, data);
SerializeStruct!(nfs_fh3, data);

/// NFS version 3 time structure used for file timestamps
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct nfstime3 {
    /// Seconds since Unix epoch (January 1, 1970)
    pub seconds: u32,
    /// Nanoseconds (0-999999999)
    pub nseconds: u32,
}
DeserializeStruct!(nfstime3, seconds, nseconds);
SerializeStruct!(nfstime3, seconds, nseconds);

/// File attributes in NFS version 3 as defined in RFC 1813 section 2.3.5
#[derive(Copy, Clone, Debug, Default)]
pub struct fattr3 {
    /// Type of file (regular, directory, symbolic link, etc.)
    pub ftype: ftype3,
    /// File access mode bits
    pub mode: mode3,
    /// Number of hard links to the file
    pub nlink: u32,
    /// User ID of the file owner
    pub uid: uid3,
    /// Group ID of the file's group
    pub gid: gid3,
    /// File size in bytes
    pub size: size3,
    /// Size in bytes actually allocated to the file
    pub used: size3,
    /// Device ID information for character or block special files
    pub rdev: specdata3,
    /// File system identifier
    pub fsid: u64,
    /// File identifier (inode number)
    pub fileid: fileid3,
    /// Time of last access to the file data
    pub atime: nfstime3,
    /// Time of last modification to the file data
    pub mtime: nfstime3,
    /// Time of last status change
    pub ctime: nfstime3,
}
DeserializeStruct!(
    fattr3, ftype, mode, nlink, uid, gid, size, used, rdev, fsid, fileid, atime, mtime, ctime
);
SerializeStruct!(
    fattr3, ftype, mode, nlink, uid, gid, size, used, rdev, fsid, fileid, atime, mtime, ctime
);

/// Attributes used in weak cache consistency checking as defined in
/// RFC 1813 section 2.3.8: values before and after an operation let the
/// client detect changes.
#[derive(Copy, Clone, Debug, Default)]
pub struct wcc_attr {
    /// File size in bytes
    pub size: size3,
    /// Last modification time of the file
    pub mtime: nfstime3,
    /// Last status change time of the file
    pub ctime: nfstime3,
}
DeserializeStruct!(wcc_attr, size, mtime, ctime);
SerializeStruct!(wcc_attr, size, mtime, ctime);

/// Pre-operation attributes for weak cache consistency.
pub type pre_op_attr = Option<wcc_attr>;

/// Post-operation attributes, returned in almost all NFS procedure
/// responses to allow clients to maintain an attribute cache.
pub type post_op_attr = Option<fattr3>;

/// Optional file handle response.
pub type post_op_fh3 = Option<nfs_fh3>;

/// Weak cache consistency data: file attributes before and after an
/// operation that modifies them.
#[derive(Copy, Clone, Debug, Default)]
pub struct wcc_data {
    /// File attributes before operation
    pub before: pre_op_attr,
    /// File attributes after operation
    pub after: post_op_attr,
}
DeserializeStruct!(wcc_data, before, after);
SerializeStruct!(wcc_data, before, after);

/// Optional file mode for SETATTR operations
pub type set_mode3 = Option<mode3>;
/// Optional user ID for SETATTR operations
pub type set_uid3 = Option<uid3>;
/// Optional group ID for SETATTR operations
pub type set_gid3 = Option<gid3>;
/// Optional file size for SETATTR operations
pub type set_size3 = Option<size3>;

/// Specifies how to modify a timestamp during a SETATTR operation:
/// leave it unchanged, set it to the server's current time, or set it to
/// a client-provided value. The discriminant follows the time_how
/// enumeration from RFC 1813.
#[derive(Copy, Clone, Debug, Default)]
#[repr(u32)]
pub enum set_time {
    /// Keep the current time unchanged
    #[default]
    DONT_CHANGE,
    /// Update the time to the server's current time
    SET_TO_SERVER_TIME,
    /// Set the time to a specific client-provided timestamp
    SET_TO_CLIENT_TIME(nfstime3),
}

impl Serialize for set_time {
    fn serialize<W: Write + ?Sized>(&self, dest: &mut W) -> std::io::Result<()> {
        match self {
            set_time::DONT_CHANGE => 0_u32.serialize(dest)?,
            set_time::SET_TO_SERVER_TIME => 1_u32.serialize(dest)?,
            set_time::SET_TO_CLIENT_TIME(v) => {
                2_u32.serialize(dest)?;
                v.serialize(dest)?;
            }
        }

        Ok(())
    }
}

impl Deserialize for set_time {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        match super::deserialize::<u32>(src)? {
            0 => *self = set_time::DONT_CHANGE,
            1 => *self = set_time::SET_TO_SERVER_TIME,
            2 => *self = set_time::SET_TO_CLIENT_TIME(super::deserialize(src)?),
            c => {
                return Err(super::invalid_data(&format!("Invalid set_time value: {}", c)));
            }
        }

        Ok(())
    }
}

/// Set of file attributes to change in SETATTR and create operations
#[derive(Copy, Clone, Debug, Default)]
pub struct sattr3 {
    /// File mode (permissions)
    pub mode: set_mode3,
    /// User ID of owner
    pub uid: set_uid3,
    /// Group ID of owner
    pub gid: set_gid3,
    /// File size
    pub size: set_size3,
    /// Last access time
    pub atime: set_time,
    /// Last modification time
    pub mtime: set_time,
}
DeserializeStruct!(sattr3, mode, uid, gid, size, atime, mtime);
SerializeStruct!(sattr3, mode, uid, gid, size, atime, mtime);

/// Arguments for directory operations (directory handle plus name)
#[derive(Clone, Debug, Default)]
pub struct diropargs3 {
    /// Directory file handle
    pub dir: nfs_fh3,
    /// Name within the directory
    pub name: filename3,
}
DeserializeStruct!(diropargs3, dir, name);
SerializeStruct!(diropargs3, dir, name);

/// Data for creating a symbolic link
#[derive(Debug, Default)]
pub struct symlinkdata3 {
    /// Attributes for the symbolic link
    pub symlink_attributes: sattr3,
    /// Target path for the symbolic link
    pub symlink_data: nfspath3,
}
DeserializeStruct!(symlinkdata3, symlink_attributes, symlink_data);
SerializeStruct!(symlinkdata3, symlink_attributes, symlink_data);

/// Access permission to read file data or read a directory
pub const ACCESS3_READ: u32 = 0x0001;
/// Access permission to look up names in a directory
pub const ACCESS3_LOOKUP: u32 = 0x0002;
/// Access permission to modify the contents of an existing file
pub const ACCESS3_MODIFY: u32 = 0x0004;
/// Access permission to grow the file or extend a directory
pub const ACCESS3_EXTEND: u32 = 0x0008;
/// Access permission to delete a file or directory entry
pub const ACCESS3_DELETE: u32 = 0x0010;
/// Access permission to execute a file or traverse a directory
pub const ACCESS3_EXECUTE: u32 = 0x0020;

/// File creation modes for CREATE operations
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[repr(u32)]
pub enum createmode3 {
    /// Normal file creation - doesn't error if file exists
    #[default]
    UNCHECKED = 0,
    /// Return error if file exists
    GUARDED = 1,
    /// Use exclusive create mechanism (with verifier)
    EXCLUSIVE = 2,
}
SerializeEnum!(createmode3);
DeserializeEnum!(createmode3);

/// Guard condition for SETATTR operations: change only if the file's
/// ctime matches the provided value.
pub type sattrguard3 = Option<nfstime3>;

/// Arguments for SETATTR operations
#[derive(Clone, Debug, Default)]
pub struct SETATTR3args {
    /// File handle for target file
    pub object: nfs_fh3,
    /// New attributes to set
    pub new_attributes: sattr3,
    /// Guard condition for atomic change
    pub guard: sattrguard3,
}
DeserializeStruct!(SETATTR3args, object, new_attributes, guard);
SerializeStruct!(SETATTR3args, object, new_attributes, guard);
