//! SETATTR: mutate attributes of the current FH.
//!
//! The attrsset bitmap reports what the server accepted; a size change
//! needs a truncation-capable handle from the file cache.

use super::attr::unmarshall_fattr4;
use super::CompoundContext;
use crate::protocol::xdr::nfs4::nfsstat4;
use crate::protocol::xdr::nfs4::ops::{SETATTR4args, SETATTR4res};
use crate::vfs::attr::mask::{ATTR_MASK_WCC, ATTR_SIZE};
use crate::vfs::open_flags::{OPEN_INFERRED, OPEN_PATH, OPEN_RDWR};

pub(super) async fn setattr(ctx: &mut CompoundContext<'_>, args: &SETATTR4args) -> SETATTR4res {
    let fh = match ctx.current_backend_fh() {
        Ok(fh) => fh,
        Err(status) => return SETATTR4res { status, ..Default::default() },
    };

    let (set_attr, attrsset) = match unmarshall_fattr4(&args.obj_attributes) {
        Ok(decoded) => decoded,
        Err(err) => return SETATTR4res { status: super::status_of(err), ..Default::default() },
    };

    let flags = if set_attr.req_mask & ATTR_SIZE != 0 {
        OPEN_RDWR | OPEN_INFERRED
    } else {
        OPEN_PATH | OPEN_INFERRED
    };

    let router = ctx.router();
    let handle = match router.open_fh(&ctx.cred, &fh, flags).await {
        Ok(handle) => handle,
        Err(err) => return SETATTR4res { status: super::status_of(err), ..Default::default() },
    };

    let result = router
        .setattr(&ctx.cred, &handle, set_attr, ATTR_MASK_WCC, ATTR_MASK_WCC)
        .await;
    router.release(&handle);

    match result {
        Ok(_) => SETATTR4res { status: nfsstat4::NFS4_OK, attrsset },
        Err(err) => SETATTR4res { status: super::status_of(err), ..Default::default() },
    }
}
