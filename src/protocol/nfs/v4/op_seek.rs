//! SEEK: locate the next data region or hole through the stateid's open
//! handle.

use super::CompoundContext;
use crate::protocol::xdr::nfs4::ops::{SEEK4args, SEEK4res};
use crate::protocol::xdr::nfs4::{self, nfsstat4};
use crate::vfs::backend::SeekWhence;

pub(super) async fn seek(ctx: &mut CompoundContext<'_>, args: &SEEK4args) -> SEEK4res {
    let handle = match ctx.stateid_handle(&args.sa_stateid) {
        Ok(handle) => handle,
        Err(status) => return SEEK4res { status, ..Default::default() },
    };

    let whence = match args.sa_what {
        nfs4::NFS4_CONTENT_DATA => SeekWhence::Data,
        nfs4::NFS4_CONTENT_HOLE => SeekWhence::Hole,
        _ => return SEEK4res { status: nfsstat4::NFS4ERR_INVAL, ..Default::default() },
    };

    match ctx.router().seek(&ctx.cred, &handle, args.sa_offset, whence).await {
        Ok((offset, eof)) => SEEK4res { status: nfsstat4::NFS4_OK, sr_eof: eof, sr_offset: offset },
        Err(err) => SEEK4res { status: super::status_of(err), ..Default::default() },
    }
}
