//! Module contains XDR data structures related to directories for NFS
//! version 3 protocol as defined in RFC 1813.
//!
//! This module includes data structures for the following directory
//! operations:
//! - MKDIR: Create a directory (procedure 9)
//! - SYMLINK: Create a symbolic link (procedure 10)
//! - MKNOD: Create a special device (procedure 11)
//! - READDIR: Read from a directory (procedure 16)
//! - READDIRPLUS: Extended read from a directory (procedure 17)

// Allow unused code warnings since we implement the complete RFC 1813 specification
#![allow(dead_code)]
// Preserve original RFC naming conventions (e.g. READDIR3args, MKDIR3resok)
#![allow(non_camel_case_types)]

use num_derive::{FromPrimitive, ToPrimitive};

use super::{
    cookie3, cookieverf3, count3, diropargs3, fileid3, filename3, ftype3, nfs_fh3, post_op_attr,
    post_op_fh3, sattr3, specdata3, symlinkdata3,
};
use crate::{DeserializeEnum, DeserializeStruct, SerializeEnum, SerializeStruct};

/// Enumeration of device types for special files (RFC 1813 section 3.3.11)
#[derive(Copy, Clone, Debug, Default, FromPrimitive, ToPrimitive)]
#[repr(u32)]
pub enum devicetype3 {
    /// Character special device
    #[default]
    NF3CHR = 0,
    /// Block special device
    NF3BLK = 1,
    /// Socket
    NF3SOCK = 2,
    /// FIFO pipe
    NF3FIFO = 3,
}
SerializeEnum!(devicetype3);
DeserializeEnum!(devicetype3);

/// Arguments for the MKDIR procedure (RFC 1813 section 3.3.9)
#[derive(Debug, Default)]
pub struct MKDIR3args {
    /// Directory where new directory should be created and its name
    pub dirops: diropargs3,
    /// Initial attributes for the new directory
    pub attributes: sattr3,
}
DeserializeStruct!(MKDIR3args, dirops, attributes);
SerializeStruct!(MKDIR3args, dirops, attributes);

/// Arguments for the SYMLINK procedure (RFC 1813 section 3.3.10)
#[derive(Debug, Default)]
pub struct SYMLINK3args {
    /// Directory where symbolic link should be created and its name
    pub dirops: diropargs3,
    /// Target path and attributes for the symbolic link
    pub symlink: symlinkdata3,
}
DeserializeStruct!(SYMLINK3args, dirops, symlink);
SerializeStruct!(SYMLINK3args, dirops, symlink);

/// Directory entry returned by READDIR (RFC 1813 section 3.3.16)
#[derive(Debug, Default)]
pub struct entry3 {
    /// File identifier (inode number)
    pub fileid: fileid3,
    /// Name of the directory entry
    pub name: filename3,
    /// Cookie for the next READDIR operation
    pub cookie: cookie3,
}
DeserializeStruct!(entry3, fileid, name, cookie);
SerializeStruct!(entry3, fileid, name, cookie);

/// Arguments for the READDIR procedure (RFC 1813 section 3.3.16)
#[derive(Debug, Default)]
pub struct READDIR3args {
    /// File handle for the directory to be read
    pub dir: nfs_fh3,
    /// Cookie indicating where to start reading directory entries;
    /// zero means start at the beginning of the directory
    pub cookie: cookie3,
    /// Cookie verifier to detect whether the directory has changed
    pub cookieverf: cookieverf3,
    /// Maximum number of bytes of directory information to return
    pub dircount: count3,
}
DeserializeStruct!(READDIR3args, dir, cookie, cookieverf, dircount);
SerializeStruct!(READDIR3args, dir, cookie, cookieverf, dircount);

/// Directory entry with additional attributes for READDIRPLUS
/// (RFC 1813 section 3.3.17)
#[derive(Debug, Default)]
pub struct entryplus3 {
    /// File identifier (inode number)
    pub fileid: fileid3,
    /// Name of the directory entry (filename)
    pub name: filename3,
    /// Cookie value for resuming the listing after this entry
    pub cookie: cookie3,
    /// File attributes for this directory entry
    pub name_attributes: post_op_attr,
    /// File handle for this directory entry
    pub name_handle: post_op_fh3,
}
DeserializeStruct!(entryplus3, fileid, name, cookie, name_attributes, name_handle);
SerializeStruct!(entryplus3, fileid, name, cookie, name_attributes, name_handle);

/// Arguments for the READDIRPLUS procedure (RFC 1813 section 3.3.17)
#[derive(Debug, Default)]
pub struct READDIRPLUS3args {
    /// Directory file handle
    pub dir: nfs_fh3,
    /// Cookie from previous READDIRPLUS - where to start reading
    pub cookie: cookie3,
    /// Cookie verifier to detect changed directories
    pub cookieverf: cookieverf3,
    /// Maximum number of bytes of directory entry information to return
    pub dircount: count3,
    /// Maximum number of bytes for the whole reply
    pub maxcount: count3,
}
DeserializeStruct!(READDIRPLUS3args, dir, cookie, cookieverf, dircount, maxcount);
SerializeStruct!(READDIRPLUS3args, dir, cookie, cookieverf, dircount, maxcount);

/// Arguments for the MKNOD procedure (RFC 1813 section 3.3.11)
#[derive(Debug, Default)]
pub struct MKNOD3args {
    /// Directory where the special file should be created and its name
    pub where_dir: diropargs3,
    /// Type and device information for the special file
    pub what: mknoddata3,
}
DeserializeStruct!(MKNOD3args, where_dir, what);
SerializeStruct!(MKNOD3args, where_dir, what);

/// Device data for special files: device type and device numbers
#[derive(Debug, Default)]
pub struct devicedata3 {
    /// Attributes for the new device node
    pub dev_attributes: sattr3,
    /// Major and minor device numbers
    pub spec: specdata3,
}
DeserializeStruct!(devicedata3, dev_attributes, spec);
SerializeStruct!(devicedata3, dev_attributes, spec);

/// Data structure for creating special files (RFC 1813 section 3.3.11).
///
/// The discriminated union carries device data for block/character nodes
/// and plain attributes for sockets and FIFOs.
#[derive(Debug)]
pub enum mknoddata3 {
    /// Character special device
    CHR(devicedata3),
    /// Block special device
    BLK(devicedata3),
    /// Socket
    SOCK(sattr3),
    /// Named pipe
    FIFO(sattr3),
}

impl Default for mknoddata3 {
    fn default() -> mknoddata3 {
        mknoddata3::FIFO(sattr3::default())
    }
}

impl crate::protocol::xdr::Serialize for mknoddata3 {
    fn serialize<W: std::io::Write + ?Sized>(&self, dest: &mut W) -> std::io::Result<()> {
        use crate::protocol::xdr::Serialize;
        match self {
            mknoddata3::CHR(v) => {
                (ftype3::NF3CHR as u32).serialize(dest)?;
                v.serialize(dest)
            }
            mknoddata3::BLK(v) => {
                (ftype3::NF3BLK as u32).serialize(dest)?;
                v.serialize(dest)
            }
            mknoddata3::SOCK(v) => {
                (ftype3::NF3SOCK as u32).serialize(dest)?;
                v.serialize(dest)
            }
            mknoddata3::FIFO(v) => {
                (ftype3::NF3FIFO as u32).serialize(dest)?;
                v.serialize(dest)
            }
        }
    }
}

impl crate::protocol::xdr::Deserialize for mknoddata3 {
    fn deserialize<R: std::io::Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        use crate::protocol::xdr::deserialize;
        let ftype: u32 = deserialize(src)?;
        *self = match ftype {
            x if x == ftype3::NF3CHR as u32 => mknoddata3::CHR(deserialize(src)?),
            x if x == ftype3::NF3BLK as u32 => mknoddata3::BLK(deserialize(src)?),
            x if x == ftype3::NF3SOCK as u32 => mknoddata3::SOCK(deserialize(src)?),
            x if x == ftype3::NF3FIFO as u32 => mknoddata3::FIFO(deserialize(src)?),
            other => {
                return Err(crate::protocol::xdr::invalid_data(&format!(
                    "Invalid mknod type: {other}"
                )))
            }
        };
        Ok(())
    }
}
