//! CREATE: create a non-regular object (directory, symlink, special
//! node) under the current FH; regular files go through OPEN.

use super::attr::unmarshall_fattr4;
use super::{change_info_from, CompoundContext};
use crate::protocol::xdr::nfs4::ops::{createtype4, CREATE4args, CREATE4res};
use crate::protocol::xdr::nfs4::{nfsstat4, type_bits};
use crate::vfs::attr::mask::{ATTR_MODE, ATTR_RDEV};
use crate::vfs::open_flags::{OPEN_DIRECTORY, OPEN_INFERRED, OPEN_PATH};
use crate::vfs::resolver::validate_leaf_name;

pub(super) async fn create(ctx: &mut CompoundContext<'_>, args: &CREATE4args) -> CREATE4res {
    if let Err(err) = validate_leaf_name(&args.objname) {
        return CREATE4res { status: super::status_of(err), ..Default::default() };
    }

    let fh = match ctx.current_backend_fh() {
        Ok(fh) => fh,
        Err(status) => return CREATE4res { status, ..Default::default() },
    };

    let (mut set_attr, attrset) = match unmarshall_fattr4(&args.createattrs) {
        Ok(decoded) => decoded,
        Err(err) => return CREATE4res { status: super::status_of(err), ..Default::default() },
    };

    let router = ctx.router();
    let dir = match router
        .open_fh(&ctx.cred, &fh, OPEN_PATH | OPEN_INFERRED | OPEN_DIRECTORY)
        .await
    {
        Ok(handle) => handle,
        Err(err) => return CREATE4res { status: super::status_of(err), ..Default::default() },
    };

    let attr_mask = crate::vfs::attr::mask::ATTR_FH;
    let result = match &args.objtype {
        createtype4::NF4DIR => {
            router.mkdir(&ctx.cred, &dir, &args.objname, set_attr, attr_mask).await
        }
        createtype4::NF4LNK(target) => {
            router
                .symlink(&ctx.cred, &dir, &args.objname, target, set_attr, attr_mask)
                .await
        }
        createtype4::NF4BLK(spec) => {
            set_attr.req_mask |= ATTR_MODE | ATTR_RDEV;
            set_attr.mode |= type_bits::S_IFBLK;
            set_attr.rdev = ((spec.specdata1 as u64) << 32) | spec.specdata2 as u64;
            router.mknod(&ctx.cred, &dir, &args.objname, set_attr, attr_mask).await
        }
        createtype4::NF4CHR(spec) => {
            set_attr.req_mask |= ATTR_MODE | ATTR_RDEV;
            set_attr.mode |= type_bits::S_IFCHR;
            set_attr.rdev = ((spec.specdata1 as u64) << 32) | spec.specdata2 as u64;
            router.mknod(&ctx.cred, &dir, &args.objname, set_attr, attr_mask).await
        }
        createtype4::NF4SOCK => {
            set_attr.req_mask |= ATTR_MODE;
            set_attr.mode |= type_bits::S_IFSOCK;
            router.mknod(&ctx.cred, &dir, &args.objname, set_attr, attr_mask).await
        }
        createtype4::NF4FIFO => {
            set_attr.req_mask |= ATTR_MODE;
            set_attr.mode |= type_bits::S_IFIFO;
            router.mknod(&ctx.cred, &dir, &args.objname, set_attr, attr_mask).await
        }
    };
    router.release(&dir);

    match result {
        Ok((attr, dir_pre, dir_post)) => match attr.fh {
            Some(obj_fh) => {
                ctx.set_current_fh(obj_fh.as_bytes().to_vec());
                CREATE4res {
                    status: nfsstat4::NFS4_OK,
                    cinfo: change_info_from(&dir_pre, &dir_post),
                    attrset,
                }
            }
            None => CREATE4res { status: nfsstat4::NFS4ERR_SERVERFAULT, ..Default::default() },
        },
        Err(err) => CREATE4res { status: super::status_of(err), ..Default::default() },
    }
}
