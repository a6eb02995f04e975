//! READLINK: read the target of the symlink at the current FH.

use super::CompoundContext;
use crate::protocol::xdr::nfs4::nfsstat4;
use crate::protocol::xdr::nfs4::ops::READLINK4res;
use crate::vfs::open_flags::{OPEN_INFERRED, OPEN_PATH};

pub(super) async fn readlink(ctx: &mut CompoundContext<'_>) -> READLINK4res {
    let fh = match ctx.current_backend_fh() {
        Ok(fh) => fh,
        Err(status) => return READLINK4res { status, ..Default::default() },
    };

    let router = ctx.router();
    let handle = match router.open_fh(&ctx.cred, &fh, OPEN_PATH | OPEN_INFERRED).await {
        Ok(handle) => handle,
        Err(err) => {
            return READLINK4res { status: super::status_of(err), ..Default::default() }
        }
    };

    let result = router.readlink(&ctx.cred, &handle).await;
    router.release(&handle);

    match result {
        Ok(target) => READLINK4res { status: nfsstat4::NFS4_OK, link: target },
        Err(err) => READLINK4res { status: super::status_of(err), ..Default::default() },
    }
}
