//! LINK: hard-link the object at the saved FH as newname under the
//! current FH.

use super::{change_info_from, CompoundContext};
use crate::protocol::xdr::nfs4::nfsstat4;
use crate::protocol::xdr::nfs4::ops::{LINK4args, LINK4res};
use crate::vfs::open_flags::{OPEN_INFERRED, OPEN_PATH};
use crate::vfs::resolver::validate_leaf_name;
use crate::vfs::{FileHandle, VfsError};

pub(super) async fn link(ctx: &mut CompoundContext<'_>, args: &LINK4args) -> LINK4res {
    if let Err(err) = validate_leaf_name(&args.newname) {
        return LINK4res { status: super::status_of(err), ..Default::default() };
    }

    let dir_fh = match ctx.current_backend_fh() {
        Ok(fh) => fh,
        Err(status) => return LINK4res { status, ..Default::default() },
    };
    let source_fh = match &ctx.saved_fh {
        Some(bytes) => match FileHandle::new(bytes) {
            Ok(fh) => fh,
            Err(_) => return LINK4res { status: nfsstat4::NFS4ERR_BADHANDLE, ..Default::default() },
        },
        None => return LINK4res { status: nfsstat4::NFS4ERR_NOFILEHANDLE, ..Default::default() },
    };

    if source_fh.magic() != dir_fh.magic() {
        return LINK4res { status: super::status_of(VfsError::XDev), ..Default::default() };
    }

    let router = ctx.router();
    let source = match router.open_fh(&ctx.cred, &source_fh, OPEN_PATH | OPEN_INFERRED).await {
        Ok(handle) => handle,
        Err(err) => return LINK4res { status: super::status_of(err), ..Default::default() },
    };

    let result = router.link_at(&ctx.cred, &source, &dir_fh, &args.newname, 0).await;
    router.release(&source);

    match result {
        Ok((_, dir_pre, dir_post)) => LINK4res {
            status: nfsstat4::NFS4_OK,
            cinfo: change_info_from(&dir_pre, &dir_post),
        },
        Err(err) => LINK4res { status: super::status_of(err), ..Default::default() },
    }
}
