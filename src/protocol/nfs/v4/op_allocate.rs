//! ALLOCATE and DEALLOCATE: reserve or punch a byte range through the
//! stateid's open handle. The two share a backend operation
//! distinguished by the hole-punching flag.

use super::CompoundContext;
use crate::protocol::xdr::nfs4::nfsstat4;
use crate::protocol::xdr::nfs4::ops::{
    ALLOCATE4args, ALLOCATE4res, DEALLOCATE4args, DEALLOCATE4res,
};

pub(super) async fn allocate(ctx: &mut CompoundContext<'_>, args: &ALLOCATE4args) -> ALLOCATE4res {
    let handle = match ctx.stateid_handle(&args.stateid) {
        Ok(handle) => handle,
        Err(status) => return ALLOCATE4res { status },
    };

    match ctx
        .router()
        .allocate(&ctx.cred, &handle, args.offset, args.length, false)
        .await
    {
        Ok(()) => ALLOCATE4res { status: nfsstat4::NFS4_OK },
        Err(err) => ALLOCATE4res { status: super::status_of(err) },
    }
}

pub(super) async fn deallocate(
    ctx: &mut CompoundContext<'_>,
    args: &DEALLOCATE4args,
) -> DEALLOCATE4res {
    let handle = match ctx.stateid_handle(&args.stateid) {
        Ok(handle) => handle,
        Err(status) => return DEALLOCATE4res { status },
    };

    match ctx
        .router()
        .allocate(&ctx.cred, &handle, args.offset, args.length, true)
        .await
    {
        Ok(()) => DEALLOCATE4res { status: nfsstat4::NFS4_OK },
        Err(err) => DEALLOCATE4res { status: super::status_of(err) },
    }
}
