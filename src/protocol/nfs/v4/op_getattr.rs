//! GETATTR: fetch attributes of the current FH, marshalled per the
//! client's requested bitmap.
//!
//! The backend is called with the minimum VFS mask derived from the
//! request; the marshaller then walks requested bits and emits only the
//! attributes the record actually carries.

use super::attr::{marshall_fattr4, vfs_mask_for};
use super::{pseudo_root, CompoundContext};
use crate::protocol::xdr::nfs4::nfsstat4;
use crate::protocol::xdr::nfs4::ops::{GETATTR4args, GETATTR4res};
use crate::vfs::open_flags::{OPEN_INFERRED, OPEN_PATH};

pub(super) async fn getattr(ctx: &mut CompoundContext<'_>, args: &GETATTR4args) -> GETATTR4res {
    if ctx.current_is_pseudo_root() {
        let attr = pseudo_root::root_attr(ctx.server(), vfs_mask_for(&args.attr_request));
        return GETATTR4res {
            status: nfsstat4::NFS4_OK,
            obj_attributes: marshall_fattr4(&attr, &args.attr_request),
        };
    }

    let fh = match ctx.current_backend_fh() {
        Ok(fh) => fh,
        Err(status) => return GETATTR4res { status, ..Default::default() },
    };

    let router = ctx.router();
    let handle = match router.open_fh(&ctx.cred, &fh, OPEN_PATH | OPEN_INFERRED).await {
        Ok(handle) => handle,
        Err(err) => {
            return GETATTR4res { status: super::status_of(err), ..Default::default() }
        }
    };

    let result = router.getattr(&ctx.cred, &handle, vfs_mask_for(&args.attr_request)).await;
    router.release(&handle);

    match result {
        Ok(mut attr) => {
            // The filehandle attribute is satisfied from the register,
            // not from the backend.
            if attr.fh.is_none() {
                attr.fh = Some(fh);
                attr.set_mask |= crate::vfs::attr::mask::ATTR_FH;
            }
            GETATTR4res {
                status: nfsstat4::NFS4_OK,
                obj_attributes: marshall_fattr4(&attr, &args.attr_request),
            }
        }
        Err(err) => GETATTR4res { status: super::status_of(err), ..Default::default() },
    }
}
