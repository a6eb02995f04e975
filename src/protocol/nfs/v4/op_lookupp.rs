//! LOOKUPP: resolve the parent of the current FH.
//!
//! The pseudo-root has no parent; elsewhere the backend resolves "..".

use super::CompoundContext;
use crate::protocol::xdr::nfs4::nfsstat4;
use crate::protocol::xdr::nfs4::ops::LOOKUPP4res;
use crate::vfs::attr::mask::ATTR_FH;
use crate::vfs::open_flags::{OPEN_DIRECTORY, OPEN_INFERRED, OPEN_PATH};

pub(super) async fn lookupp(ctx: &mut CompoundContext<'_>) -> LOOKUPP4res {
    if ctx.current_is_pseudo_root() {
        return LOOKUPP4res { status: nfsstat4::NFS4ERR_NOENT };
    }

    let fh = match ctx.current_backend_fh() {
        Ok(fh) => fh,
        Err(status) => return LOOKUPP4res { status },
    };

    let router = ctx.router();
    let dir = match router
        .open_fh(&ctx.cred, &fh, OPEN_PATH | OPEN_INFERRED | OPEN_DIRECTORY)
        .await
    {
        Ok(handle) => handle,
        Err(err) => return LOOKUPP4res { status: super::status_of(err) },
    };

    let result = router.lookup_at(&ctx.cred, &dir, b"..", ATTR_FH, 0).await;
    router.release(&dir);

    match result {
        Ok((attr, _)) => match attr.fh {
            Some(parent_fh) => {
                ctx.set_current_fh(parent_fh.as_bytes().to_vec());
                LOOKUPP4res { status: nfsstat4::NFS4_OK }
            }
            None => LOOKUPP4res { status: nfsstat4::NFS4ERR_SERVERFAULT },
        },
        Err(err) => LOOKUPP4res { status: super::status_of(err) },
    }
}
