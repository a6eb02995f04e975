//! WRITE: write through the stateid's open handle. The reply carries the
//! boot verifier so clients can detect restarts before COMMIT.

use super::CompoundContext;
use crate::protocol::xdr::nfs4::nfsstat4;
use crate::protocol::xdr::nfs4::ops::{stable_how4, WRITE4args, WRITE4res};

pub(super) async fn write(ctx: &mut CompoundContext<'_>, args: &WRITE4args) -> WRITE4res {
    let handle = match ctx.stateid_handle(&args.stateid) {
        Ok(handle) => handle,
        Err(status) => return WRITE4res { status, ..Default::default() },
    };

    let stable = !matches!(args.stable, stable_how4::UNSTABLE4);
    let result = ctx
        .router()
        .write(&ctx.cred, &handle, args.offset, args.data.clone(), stable)
        .await;

    match result {
        Ok((count, was_stable, _pre, _post)) => WRITE4res {
            status: nfsstat4::NFS4_OK,
            count,
            committed: if was_stable {
                stable_how4::FILE_SYNC4
            } else {
                stable_how4::UNSTABLE4
            },
            writeverf: ctx.server().write_verifier(),
        },
        Err(err) => WRITE4res { status: super::status_of(err), ..Default::default() },
    }
}
