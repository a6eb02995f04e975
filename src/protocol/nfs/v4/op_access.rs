//! ACCESS: evaluate the caller's rights on the current FH.

use super::CompoundContext;
use crate::protocol::xdr::nfs4::ops::{ACCESS4args, ACCESS4res};
use crate::protocol::xdr::nfs4::{self, nfsstat4};
use crate::vfs::open_flags::{OPEN_INFERRED, OPEN_PATH};

pub(super) async fn access(ctx: &mut CompoundContext<'_>, args: &ACCESS4args) -> ACCESS4res {
    if ctx.current_is_pseudo_root() {
        // The pseudo-root is world-readable and traversable.
        let granted =
            args.access & (nfs4::ACCESS4_READ | nfs4::ACCESS4_LOOKUP | nfs4::ACCESS4_EXECUTE);
        return ACCESS4res {
            status: nfsstat4::NFS4_OK,
            supported: args.access,
            access: granted,
        };
    }

    let fh = match ctx.current_backend_fh() {
        Ok(fh) => fh,
        Err(status) => return ACCESS4res { status, ..Default::default() },
    };

    let router = ctx.router();
    let handle = match router.open_fh(&ctx.cred, &fh, OPEN_PATH | OPEN_INFERRED).await {
        Ok(handle) => handle,
        Err(err) => return ACCESS4res { status: super::status_of(err), ..Default::default() },
    };

    let result = router.access(&ctx.cred, &handle, args.access, 0).await;
    router.release(&handle);

    match result {
        Ok((granted, _)) => ACCESS4res {
            status: nfsstat4::NFS4_OK,
            supported: args.access,
            access: granted,
        },
        Err(err) => ACCESS4res { status: super::status_of(err), ..Default::default() },
    }
}
