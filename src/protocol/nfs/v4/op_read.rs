//! READ: read through the stateid's open handle. The op never opens the
//! FH itself.

use super::CompoundContext;
use crate::protocol::xdr::nfs4::nfsstat4;
use crate::protocol::xdr::nfs4::ops::{READ4args, READ4res};

pub(super) async fn read(ctx: &mut CompoundContext<'_>, args: &READ4args) -> READ4res {
    let handle = match ctx.stateid_handle(&args.stateid) {
        Ok(handle) => handle,
        Err(status) => return READ4res { status, ..Default::default() },
    };

    match ctx.router().read(&ctx.cred, &handle, args.offset, args.count, 0).await {
        Ok((data, eof, _attr)) => READ4res { status: nfsstat4::NFS4_OK, eof, data },
        Err(err) => READ4res { status: super::status_of(err), ..Default::default() },
    }
}
