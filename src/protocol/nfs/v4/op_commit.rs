//! COMMIT: flush through the open handle of the current FH's state.
//!
//! COMMIT carries no stateid, so the handle comes from the file cache
//! keyed by the current FH.

use super::CompoundContext;
use crate::protocol::xdr::nfs4::nfsstat4;
use crate::protocol::xdr::nfs4::ops::{COMMIT4args, COMMIT4res};
use crate::vfs::open_flags::{OPEN_INFERRED, OPEN_RDWR};

pub(super) async fn commit(ctx: &mut CompoundContext<'_>, args: &COMMIT4args) -> COMMIT4res {
    let fh = match ctx.current_backend_fh() {
        Ok(fh) => fh,
        Err(status) => return COMMIT4res { status, ..Default::default() },
    };

    let router = ctx.router();
    let handle = match router.open_fh(&ctx.cred, &fh, OPEN_RDWR | OPEN_INFERRED).await {
        Ok(handle) => handle,
        Err(err) => return COMMIT4res { status: super::status_of(err), ..Default::default() },
    };

    let result = router.commit(&ctx.cred, &handle, args.offset, args.count, 0).await;
    router.release(&handle);

    match result {
        Ok(_) => COMMIT4res {
            status: nfsstat4::NFS4_OK,
            writeverf: ctx.server().write_verifier(),
        },
        Err(err) => COMMIT4res { status: super::status_of(err), ..Default::default() },
    }
}
