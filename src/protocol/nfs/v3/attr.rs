//! Bitmask-driven marshalling between the VFS attribute record and the
//! NFSv3 wire forms.
//!
//! A `fattr3` can only be emitted when the producer populated the whole
//! stat superset; anything less downgrades the reply to
//! "attributes_follow = false". Weak-cache-consistency pairs need only
//! size/mtime/ctime.

use crate::protocol::xdr::nfs3;
use crate::protocol::xdr::nfs4::type_bits;
use crate::vfs::attr::mask::{
    ATTR_ATIME, ATTR_GID, ATTR_MASK_STAT, ATTR_MASK_WCC, ATTR_MODE, ATTR_MTIME,
    ATTR_SIZE, ATTR_UID,
};
use crate::vfs::attr::{Attr, AttrTime};

/// Attributes required to build a complete `fattr3`.
pub const NFS3_ATTR_MASK: u64 = ATTR_MASK_STAT;

/// Attributes captured around mutations for WCC data.
pub const NFS3_WCC_MASK: u64 = ATTR_MASK_WCC;

fn ftype3_from_mode(mode: u32) -> nfs3::ftype3 {
    match mode & type_bits::S_IFMT {
        type_bits::S_IFREG => nfs3::ftype3::NF3REG,
        type_bits::S_IFDIR => nfs3::ftype3::NF3DIR,
        type_bits::S_IFBLK => nfs3::ftype3::NF3BLK,
        type_bits::S_IFCHR => nfs3::ftype3::NF3CHR,
        type_bits::S_IFLNK => nfs3::ftype3::NF3LNK,
        type_bits::S_IFSOCK => nfs3::ftype3::NF3SOCK,
        type_bits::S_IFIFO => nfs3::ftype3::NF3FIFO,
        _ => nfs3::ftype3::NF3REG,
    }
}

fn nfstime3_from(time: AttrTime) -> nfs3::nfstime3 {
    nfs3::nfstime3 { seconds: time.sec as u32, nseconds: time.nsec }
}

/// Builds a `fattr3` from a fully populated attribute record. The caller
/// must have verified [`NFS3_ATTR_MASK`] via [`post_op_attr_from`] or
/// [`Attr::has`].
pub fn marshall_fattr3(attr: &Attr) -> nfs3::fattr3 {
    nfs3::fattr3 {
        ftype: ftype3_from_mode(attr.mode),
        mode: attr.mode & !type_bits::S_IFMT,
        nlink: attr.nlink,
        uid: attr.uid,
        gid: attr.gid,
        size: attr.size,
        used: attr.space_used,
        rdev: nfs3::specdata3 {
            specdata1: (attr.rdev >> 32) as u32,
            specdata2: attr.rdev as u32,
        },
        fsid: attr.dev,
        fileid: attr.inum,
        atime: nfstime3_from(attr.atime),
        mtime: nfstime3_from(attr.mtime),
        ctime: nfstime3_from(attr.ctime),
    }
}

/// Post-op attributes: present only when the full stat set was produced.
pub fn post_op_attr_from(attr: &Attr) -> nfs3::post_op_attr {
    if attr.has(NFS3_ATTR_MASK) {
        Some(marshall_fattr3(attr))
    } else {
        None
    }
}

/// Pre-op WCC attributes: present only when size/mtime/ctime were
/// captured.
pub fn pre_op_attr_from(attr: &Attr) -> nfs3::pre_op_attr {
    if attr.has(NFS3_WCC_MASK) {
        Some(nfs3::wcc_attr {
            size: attr.size,
            mtime: nfstime3_from(attr.mtime),
            ctime: nfstime3_from(attr.ctime),
        })
    } else {
        None
    }
}

/// Assembles WCC data from captured pre/post attribute records.
pub fn wcc_data_from(pre: &Attr, post: &Attr) -> nfs3::wcc_data {
    nfs3::wcc_data { before: pre_op_attr_from(pre), after: post_op_attr_from(post) }
}

/// Converts a wire `sattr3` into a set-request attribute record:
/// `req_mask` names the members to change, and server-time requests use
/// the TIME_NOW nanosecond sentinel.
pub fn sattr3_to_attr(sattr: &nfs3::sattr3) -> Attr {
    let mut attr = Attr::default();

    if let Some(mode) = sattr.mode {
        attr.req_mask |= ATTR_MODE;
        attr.mode = mode;
    }
    if let Some(uid) = sattr.uid {
        attr.req_mask |= ATTR_UID;
        attr.uid = uid;
    }
    if let Some(gid) = sattr.gid {
        attr.req_mask |= ATTR_GID;
        attr.gid = gid;
    }
    if let Some(size) = sattr.size {
        attr.req_mask |= ATTR_SIZE;
        attr.size = size;
    }
    match sattr.atime {
        nfs3::set_time::DONT_CHANGE => {}
        nfs3::set_time::SET_TO_SERVER_TIME => {
            attr.req_mask |= ATTR_ATIME;
            attr.atime = AttrTime::now_sentinel();
        }
        nfs3::set_time::SET_TO_CLIENT_TIME(t) => {
            attr.req_mask |= ATTR_ATIME;
            attr.atime = AttrTime { sec: t.seconds as i64, nsec: t.nseconds };
        }
    }
    match sattr.mtime {
        nfs3::set_time::DONT_CHANGE => {}
        nfs3::set_time::SET_TO_SERVER_TIME => {
            attr.req_mask |= ATTR_MTIME;
            attr.mtime = AttrTime::now_sentinel();
        }
        nfs3::set_time::SET_TO_CLIENT_TIME(t) => {
            attr.req_mask |= ATTR_MTIME;
            attr.mtime = AttrTime { sec: t.seconds as i64, nsec: t.nseconds };
        }
    }

    attr
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::attr::mask::ATTR_FH;

    fn stat_attr() -> Attr {
        let mut attr = Attr::default();
        attr.set_mask = NFS3_ATTR_MASK;
        attr.mode = type_bits::S_IFREG | 0o644;
        attr.nlink = 1;
        attr.size = 42;
        attr.inum = 7;
        attr
    }

    #[test]
    fn partial_attrs_downgrade_to_void() {
        let mut attr = stat_attr();
        attr.set_mask &= !ATTR_SIZE;
        assert!(post_op_attr_from(&attr).is_none());
        attr.set_mask |= ATTR_SIZE;
        assert!(post_op_attr_from(&attr).is_some());
    }

    #[test]
    fn extra_bits_do_not_hurt() {
        let mut attr = stat_attr();
        attr.set_mask |= ATTR_FH;
        let fattr = post_op_attr_from(&attr).unwrap();
        assert_eq!(fattr.size, 42);
        assert_eq!(fattr.fileid, 7);
        assert!(matches!(fattr.ftype, nfs3::ftype3::NF3REG));
    }

    #[test]
    fn sattr_server_time_uses_sentinel() {
        let sattr = nfs3::sattr3 {
            mode: Some(0o600),
            atime: nfs3::set_time::SET_TO_SERVER_TIME,
            ..Default::default()
        };
        let attr = sattr3_to_attr(&sattr);
        assert_eq!(attr.req_mask, ATTR_MODE | ATTR_ATIME);
        assert!(attr.atime.is_now());
    }
}
