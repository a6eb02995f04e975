//! Bit-driven fattr4 marshalling.
//!
//! Encoding walks the client's requested bitmap in ascending bit order,
//! emits each attribute the record can supply, and sets the bit in the
//! response mask iff the attribute was emitted. Decoding walks a
//! client-supplied fattr4 the same way to build a set-request attribute
//! record.

use std::io::Cursor;

use crate::protocol::xdr::nfs4::{
    self, bitmap4, fattr4, fsid4, nfs_fh4, nfs_ftype4, nfstime4, specdata4, type_bits,
};
use crate::protocol::xdr::{deserialize, Deserialize, Serialize};
use crate::vfs::attr::mask::*;
use crate::vfs::attr::{Attr, AttrTime};
use crate::vfs::{VfsError, VfsResult};

/// Advertised lease time in seconds.
pub const LEASE_TIME: u32 = 90;
/// Advertised maximum read/write transfer size.
pub const MAX_XFER_SIZE: u64 = 1024 * 1024;

/// Supported-attribute bitmap advertised through FATTR4_SUPPORTED_ATTRS.
pub fn supported_attrs() -> bitmap4 {
    let mut mask = vec![0u32; 2];
    for bit in [
        nfs4::FATTR4_SUPPORTED_ATTRS,
        nfs4::FATTR4_TYPE,
        nfs4::FATTR4_FH_EXPIRE_TYPE,
        nfs4::FATTR4_CHANGE,
        nfs4::FATTR4_SIZE,
        nfs4::FATTR4_LINK_SUPPORT,
        nfs4::FATTR4_SYMLINK_SUPPORT,
        nfs4::FATTR4_NAMED_ATTR,
        nfs4::FATTR4_FSID,
        nfs4::FATTR4_UNIQUE_HANDLES,
        nfs4::FATTR4_LEASE_TIME,
        nfs4::FATTR4_RDATTR_ERROR,
        nfs4::FATTR4_ACLSUPPORT,
        nfs4::FATTR4_CANSETTIME,
        nfs4::FATTR4_CASE_INSENSITIVE,
        nfs4::FATTR4_CASE_PRESERVING,
        nfs4::FATTR4_CHOWN_RESTRICTED,
        nfs4::FATTR4_FILEHANDLE,
        nfs4::FATTR4_FILEID,
        nfs4::FATTR4_FILES_AVAIL,
        nfs4::FATTR4_FILES_FREE,
        nfs4::FATTR4_FILES_TOTAL,
        nfs4::FATTR4_HOMOGENEOUS,
        nfs4::FATTR4_MAXFILESIZE,
        nfs4::FATTR4_MAXLINK,
        nfs4::FATTR4_MAXNAME,
        nfs4::FATTR4_MAXREAD,
        nfs4::FATTR4_MAXWRITE,
        nfs4::FATTR4_MODE,
        nfs4::FATTR4_NO_TRUNC,
        nfs4::FATTR4_NUMLINKS,
        nfs4::FATTR4_OWNER,
        nfs4::FATTR4_OWNER_GROUP,
        nfs4::FATTR4_RAWDEV,
        nfs4::FATTR4_SPACE_AVAIL,
        nfs4::FATTR4_SPACE_FREE,
        nfs4::FATTR4_SPACE_TOTAL,
        nfs4::FATTR4_SPACE_USED,
        nfs4::FATTR4_TIME_ACCESS,
        nfs4::FATTR4_TIME_ACCESS_SET,
        nfs4::FATTR4_TIME_DELTA,
        nfs4::FATTR4_TIME_METADATA,
        nfs4::FATTR4_TIME_MODIFY,
        nfs4::FATTR4_TIME_MODIFY_SET,
        nfs4::FATTR4_MOUNTED_ON_FILEID,
    ] {
        set_bit(&mut mask, bit);
    }
    mask
}

/// True when `bit` is set in the bitmap.
pub fn bit_set(bitmap: &[u32], bit: u32) -> bool {
    let word = (bit / 32) as usize;
    word < bitmap.len() && bitmap[word] & (1 << (bit % 32)) != 0
}

/// Sets `bit`, growing the bitmap as needed.
pub fn set_bit(bitmap: &mut Vec<u32>, bit: u32) {
    let word = (bit / 32) as usize;
    if bitmap.len() <= word {
        bitmap.resize(word + 1, 0);
    }
    bitmap[word] |= 1 << (bit % 32);
}

/// Computes the minimum VFS attribute mask needed to satisfy the
/// client's attr_request bitmap.
pub fn vfs_mask_for(request: &[u32]) -> u64 {
    let mut mask = 0u64;
    for (bit, vfs_bits) in [
        (nfs4::FATTR4_TYPE, ATTR_MODE),
        (nfs4::FATTR4_CHANGE, ATTR_CTIME),
        (nfs4::FATTR4_SIZE, ATTR_SIZE),
        (nfs4::FATTR4_FSID, ATTR_DEV | ATTR_FSID),
        (nfs4::FATTR4_FILEHANDLE, ATTR_FH),
        (nfs4::FATTR4_FILEID, ATTR_INUM),
        (nfs4::FATTR4_FILES_AVAIL, ATTR_FS_FILES_AVAIL),
        (nfs4::FATTR4_FILES_FREE, ATTR_FS_FILES_FREE),
        (nfs4::FATTR4_FILES_TOTAL, ATTR_FS_FILES_TOTAL),
        (nfs4::FATTR4_MODE, ATTR_MODE),
        (nfs4::FATTR4_NUMLINKS, ATTR_NLINK),
        (nfs4::FATTR4_OWNER, ATTR_UID),
        (nfs4::FATTR4_OWNER_GROUP, ATTR_GID),
        (nfs4::FATTR4_RAWDEV, ATTR_RDEV),
        (nfs4::FATTR4_SPACE_AVAIL, ATTR_FS_SPACE_AVAIL),
        (nfs4::FATTR4_SPACE_FREE, ATTR_FS_SPACE_FREE),
        (nfs4::FATTR4_SPACE_TOTAL, ATTR_FS_SPACE_TOTAL),
        (nfs4::FATTR4_SPACE_USED, ATTR_SPACE_USED),
        (nfs4::FATTR4_TIME_ACCESS, ATTR_ATIME),
        (nfs4::FATTR4_TIME_METADATA, ATTR_CTIME),
        (nfs4::FATTR4_TIME_MODIFY, ATTR_MTIME),
        (nfs4::FATTR4_MOUNTED_ON_FILEID, ATTR_INUM),
    ] {
        if bit_set(request, bit) {
            mask |= vfs_bits;
        }
    }
    mask
}

fn ftype4_from_mode(mode: u32) -> nfs_ftype4 {
    match mode & type_bits::S_IFMT {
        type_bits::S_IFDIR => nfs_ftype4::NF4DIR,
        type_bits::S_IFBLK => nfs_ftype4::NF4BLK,
        type_bits::S_IFCHR => nfs_ftype4::NF4CHR,
        type_bits::S_IFLNK => nfs_ftype4::NF4LNK,
        type_bits::S_IFSOCK => nfs_ftype4::NF4SOCK,
        type_bits::S_IFIFO => nfs_ftype4::NF4FIFO,
        _ => nfs_ftype4::NF4REG,
    }
}

fn nfstime4_from(time: AttrTime) -> nfstime4 {
    nfstime4 { seconds: time.sec, nseconds: time.nsec }
}

/// The change attribute is synthesized from ctime at nanosecond
/// granularity.
fn change_of(attr: &Attr) -> u64 {
    (attr.ctime.sec as u64).wrapping_mul(1_000_000_000).wrapping_add(attr.ctime.nsec as u64)
}

/// Encodes the attributes the record can supply out of the requested
/// set. Emission order follows ascending bit numbers, as the wire format
/// requires.
pub fn marshall_fattr4(attr: &Attr, request: &[u32]) -> fattr4 {
    let mut rsp_mask: bitmap4 = Vec::new();
    let mut vals: Vec<u8> = Vec::new();

    let mut emit = |bit: u32, rsp_mask: &mut bitmap4, write: &mut dyn FnMut(&mut Vec<u8>)| {
        if bit_set(request, bit) {
            set_bit(rsp_mask, bit);
            write(&mut vals);
        }
    };

    // Word 0, ascending bit order.
    emit(nfs4::FATTR4_SUPPORTED_ATTRS, &mut rsp_mask, &mut |vals| {
        let _ = supported_attrs().serialize(vals);
    });
    if attr.has(ATTR_MODE) {
        emit(nfs4::FATTR4_TYPE, &mut rsp_mask, &mut |vals| {
            let _ = ftype4_from_mode(attr.mode).serialize(vals);
        });
    }
    emit(nfs4::FATTR4_FH_EXPIRE_TYPE, &mut rsp_mask, &mut |vals| {
        // FH4_PERSISTENT
        let _ = 0u32.serialize(vals);
    });
    if attr.has(ATTR_CTIME) {
        emit(nfs4::FATTR4_CHANGE, &mut rsp_mask, &mut |vals| {
            let _ = change_of(attr).serialize(vals);
        });
    }
    if attr.has(ATTR_SIZE) {
        emit(nfs4::FATTR4_SIZE, &mut rsp_mask, &mut |vals| {
            let _ = attr.size.serialize(vals);
        });
    }
    emit(nfs4::FATTR4_LINK_SUPPORT, &mut rsp_mask, &mut |vals| {
        let _ = true.serialize(vals);
    });
    emit(nfs4::FATTR4_SYMLINK_SUPPORT, &mut rsp_mask, &mut |vals| {
        let _ = true.serialize(vals);
    });
    emit(nfs4::FATTR4_NAMED_ATTR, &mut rsp_mask, &mut |vals| {
        let _ = false.serialize(vals);
    });
    if attr.has(ATTR_DEV) || attr.has(ATTR_FSID) {
        emit(nfs4::FATTR4_FSID, &mut rsp_mask, &mut |vals| {
            let major = if attr.has(ATTR_FSID) { attr.fsid } else { attr.dev };
            let _ = fsid4 { major, minor: 0 }.serialize(vals);
        });
    }
    emit(nfs4::FATTR4_UNIQUE_HANDLES, &mut rsp_mask, &mut |vals| {
        let _ = true.serialize(vals);
    });
    emit(nfs4::FATTR4_LEASE_TIME, &mut rsp_mask, &mut |vals| {
        let _ = LEASE_TIME.serialize(vals);
    });
    emit(nfs4::FATTR4_RDATTR_ERROR, &mut rsp_mask, &mut |vals| {
        let _ = 0u32.serialize(vals);
    });
    emit(nfs4::FATTR4_ACLSUPPORT, &mut rsp_mask, &mut |vals| {
        let _ = 0u32.serialize(vals);
    });
    emit(nfs4::FATTR4_CANSETTIME, &mut rsp_mask, &mut |vals| {
        let _ = true.serialize(vals);
    });
    emit(nfs4::FATTR4_CASE_INSENSITIVE, &mut rsp_mask, &mut |vals| {
        let _ = false.serialize(vals);
    });
    emit(nfs4::FATTR4_CASE_PRESERVING, &mut rsp_mask, &mut |vals| {
        let _ = true.serialize(vals);
    });
    emit(nfs4::FATTR4_CHOWN_RESTRICTED, &mut rsp_mask, &mut |vals| {
        let _ = true.serialize(vals);
    });
    if let Some(fh) = &attr.fh {
        emit(nfs4::FATTR4_FILEHANDLE, &mut rsp_mask, &mut |vals| {
            let _ = nfs_fh4 { data: fh.as_bytes().to_vec() }.serialize(vals);
        });
    }
    if attr.has(ATTR_INUM) {
        emit(nfs4::FATTR4_FILEID, &mut rsp_mask, &mut |vals| {
            let _ = attr.inum.serialize(vals);
        });
    }
    if attr.has(ATTR_FS_FILES_AVAIL) {
        emit(nfs4::FATTR4_FILES_AVAIL, &mut rsp_mask, &mut |vals| {
            let _ = attr.fs_files_avail.serialize(vals);
        });
    }
    if attr.has(ATTR_FS_FILES_FREE) {
        emit(nfs4::FATTR4_FILES_FREE, &mut rsp_mask, &mut |vals| {
            let _ = attr.fs_files_free.serialize(vals);
        });
    }
    if attr.has(ATTR_FS_FILES_TOTAL) {
        emit(nfs4::FATTR4_FILES_TOTAL, &mut rsp_mask, &mut |vals| {
            let _ = attr.fs_files_total.serialize(vals);
        });
    }
    emit(nfs4::FATTR4_HOMOGENEOUS, &mut rsp_mask, &mut |vals| {
        let _ = true.serialize(vals);
    });
    emit(nfs4::FATTR4_MAXFILESIZE, &mut rsp_mask, &mut |vals| {
        let _ = u64::MAX.serialize(vals);
    });
    emit(nfs4::FATTR4_MAXLINK, &mut rsp_mask, &mut |vals| {
        let _ = u32::MAX.serialize(vals);
    });
    emit(nfs4::FATTR4_MAXNAME, &mut rsp_mask, &mut |vals| {
        let _ = (crate::vfs::VFS_NAME_MAX as u32).serialize(vals);
    });
    emit(nfs4::FATTR4_MAXREAD, &mut rsp_mask, &mut |vals| {
        let _ = MAX_XFER_SIZE.serialize(vals);
    });
    emit(nfs4::FATTR4_MAXWRITE, &mut rsp_mask, &mut |vals| {
        let _ = MAX_XFER_SIZE.serialize(vals);
    });

    // Word 1, ascending bit order.
    if attr.has(ATTR_MODE) {
        emit(nfs4::FATTR4_MODE, &mut rsp_mask, &mut |vals| {
            let _ = (attr.mode & nfs4::MODE4_MASK).serialize(vals);
        });
    }
    emit(nfs4::FATTR4_NO_TRUNC, &mut rsp_mask, &mut |vals| {
        let _ = true.serialize(vals);
    });
    if attr.has(ATTR_NLINK) {
        emit(nfs4::FATTR4_NUMLINKS, &mut rsp_mask, &mut |vals| {
            let _ = attr.nlink.serialize(vals);
        });
    }
    if attr.has(ATTR_UID) {
        emit(nfs4::FATTR4_OWNER, &mut rsp_mask, &mut |vals| {
            let _ = attr.uid.to_string().serialize(vals);
        });
    }
    if attr.has(ATTR_GID) {
        emit(nfs4::FATTR4_OWNER_GROUP, &mut rsp_mask, &mut |vals| {
            let _ = attr.gid.to_string().serialize(vals);
        });
    }
    if attr.has(ATTR_RDEV) {
        emit(nfs4::FATTR4_RAWDEV, &mut rsp_mask, &mut |vals| {
            let spec = specdata4 {
                specdata1: (attr.rdev >> 32) as u32,
                specdata2: attr.rdev as u32,
            };
            let _ = spec.serialize(vals);
        });
    }
    if attr.has(ATTR_FS_SPACE_AVAIL) {
        emit(nfs4::FATTR4_SPACE_AVAIL, &mut rsp_mask, &mut |vals| {
            let _ = attr.fs_space_avail.serialize(vals);
        });
    }
    if attr.has(ATTR_FS_SPACE_FREE) {
        emit(nfs4::FATTR4_SPACE_FREE, &mut rsp_mask, &mut |vals| {
            let _ = attr.fs_space_free.serialize(vals);
        });
    }
    if attr.has(ATTR_FS_SPACE_TOTAL) {
        emit(nfs4::FATTR4_SPACE_TOTAL, &mut rsp_mask, &mut |vals| {
            let _ = attr.fs_space_total.serialize(vals);
        });
    }
    if attr.has(ATTR_SPACE_USED) {
        emit(nfs4::FATTR4_SPACE_USED, &mut rsp_mask, &mut |vals| {
            let _ = attr.space_used.serialize(vals);
        });
    }
    if attr.has(ATTR_ATIME) {
        emit(nfs4::FATTR4_TIME_ACCESS, &mut rsp_mask, &mut |vals| {
            let _ = nfstime4_from(attr.atime).serialize(vals);
        });
    }
    emit(nfs4::FATTR4_TIME_DELTA, &mut rsp_mask, &mut |vals| {
        let _ = nfstime4 { seconds: 0, nseconds: 1 }.serialize(vals);
    });
    if attr.has(ATTR_CTIME) {
        emit(nfs4::FATTR4_TIME_METADATA, &mut rsp_mask, &mut |vals| {
            let _ = nfstime4_from(attr.ctime).serialize(vals);
        });
    }
    if attr.has(ATTR_MTIME) {
        emit(nfs4::FATTR4_TIME_MODIFY, &mut rsp_mask, &mut |vals| {
            let _ = nfstime4_from(attr.mtime).serialize(vals);
        });
    }
    if attr.has(ATTR_INUM) {
        emit(nfs4::FATTR4_MOUNTED_ON_FILEID, &mut rsp_mask, &mut |vals| {
            let _ = attr.inum.serialize(vals);
        });
    }

    fattr4 { attrmask: rsp_mask, attr_vals: vals }
}

/// Decodes a client-supplied fattr4 into a set-request record: the
/// returned `req_mask` names the members to change, and the returned
/// bitmap reports what was accepted (SETATTR's attrsset).
pub fn unmarshall_fattr4(wire: &fattr4) -> VfsResult<(Attr, bitmap4)> {
    let mut attr = Attr::default();
    let mut accepted: bitmap4 = Vec::new();
    let mut src = Cursor::new(&wire.attr_vals[..]);

    let max_bit = wire.attrmask.len() as u32 * 32;
    for bit in 0..max_bit {
        if !bit_set(&wire.attrmask, bit) {
            continue;
        }
        match bit {
            nfs4::FATTR4_SIZE => {
                attr.req_mask |= ATTR_SIZE;
                attr.size = deserialize(&mut src).map_err(|_| VfsError::Inval)?;
                set_bit(&mut accepted, bit);
            }
            nfs4::FATTR4_MODE => {
                let mode: u32 = deserialize(&mut src).map_err(|_| VfsError::Inval)?;
                attr.req_mask |= ATTR_MODE;
                attr.mode = mode & nfs4::MODE4_MASK;
                set_bit(&mut accepted, bit);
            }
            nfs4::FATTR4_OWNER => {
                let owner: String = deserialize(&mut src).map_err(|_| VfsError::Inval)?;
                let uid = parse_identity(&owner).ok_or(VfsError::Inval)?;
                attr.req_mask |= ATTR_UID;
                attr.uid = uid;
                set_bit(&mut accepted, bit);
            }
            nfs4::FATTR4_OWNER_GROUP => {
                let group: String = deserialize(&mut src).map_err(|_| VfsError::Inval)?;
                let gid = parse_identity(&group).ok_or(VfsError::Inval)?;
                attr.req_mask |= ATTR_GID;
                attr.gid = gid;
                set_bit(&mut accepted, bit);
            }
            nfs4::FATTR4_TIME_ACCESS_SET => {
                attr.req_mask |= ATTR_ATIME;
                attr.atime = decode_settime(&mut src)?;
                set_bit(&mut accepted, bit);
            }
            nfs4::FATTR4_TIME_MODIFY_SET => {
                attr.req_mask |= ATTR_MTIME;
                attr.mtime = decode_settime(&mut src)?;
                set_bit(&mut accepted, bit);
            }
            // A bit we cannot apply; the values that follow it in the
            // stream cannot be skipped without its schema.
            _ => return Err(VfsError::NotSupp),
        }
    }

    Ok((attr, accepted))
}

/// settime4: discriminant 0 means the server's current time, 1 carries a
/// literal client timestamp.
fn decode_settime(src: &mut Cursor<&[u8]>) -> VfsResult<AttrTime> {
    let how: u32 = deserialize(src).map_err(|_| VfsError::Inval)?;
    match how {
        0 => Ok(AttrTime::now_sentinel()),
        1 => {
            let mut time = nfstime4::default();
            time.deserialize(src).map_err(|_| VfsError::Inval)?;
            Ok(AttrTime { sec: time.seconds, nsec: time.nseconds })
        }
        _ => Err(VfsError::Inval),
    }
}

/// Owner strings are numeric ids, optionally with an "@domain" suffix.
fn parse_identity(text: &str) -> Option<u32> {
    let numeric = text.split('@').next().unwrap_or(text);
    numeric.parse::<u32>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_mask_subset_of_request() {
        let mut attr = Attr::default();
        attr.set_mask = ATTR_SIZE | ATTR_MODE;
        attr.size = 10;
        attr.mode = type_bits::S_IFREG | 0o600;

        let mut request = Vec::new();
        set_bit(&mut request, nfs4::FATTR4_SIZE);
        set_bit(&mut request, nfs4::FATTR4_NUMLINKS);

        let encoded = marshall_fattr4(&attr, &request);
        assert!(bit_set(&encoded.attrmask, nfs4::FATTR4_SIZE));
        // nlink was requested but not populated, so it must not appear.
        assert!(!bit_set(&encoded.attrmask, nfs4::FATTR4_NUMLINKS));
        for (word, bits) in encoded.attrmask.iter().enumerate() {
            assert_eq!(bits & !request.get(word).copied().unwrap_or(0), 0);
        }
    }

    #[test]
    fn setattr_decode_roundtrip() {
        let mut attr = Attr::default();
        attr.set_mask = ATTR_SIZE | ATTR_MODE;
        attr.size = 4096;
        attr.mode = type_bits::S_IFREG | 0o640;

        let mut request = Vec::new();
        set_bit(&mut request, nfs4::FATTR4_SIZE);
        set_bit(&mut request, nfs4::FATTR4_MODE);

        let wire = marshall_fattr4(&attr, &request);
        let (decoded, accepted) = unmarshall_fattr4(&wire).unwrap();
        assert_eq!(decoded.req_mask, ATTR_SIZE | ATTR_MODE);
        assert_eq!(decoded.size, 4096);
        assert_eq!(decoded.mode, 0o640);
        assert!(bit_set(&accepted, nfs4::FATTR4_SIZE));
        assert!(bit_set(&accepted, nfs4::FATTR4_MODE));
    }

    #[test]
    fn unsupported_setattr_bit_is_rejected() {
        let mut wire = fattr4::default();
        set_bit(&mut wire.attrmask, nfs4::FATTR4_ACL);
        assert_eq!(unmarshall_fattr4(&wire).unwrap_err(), VfsError::NotSupp);
    }
}
