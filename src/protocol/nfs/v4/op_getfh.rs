//! GETFH: emit the current filehandle.

use super::CompoundContext;
use crate::protocol::xdr::nfs4::ops::GETFH4res;
use crate::protocol::xdr::nfs4::{nfs_fh4, nfsstat4};

pub(super) fn getfh(ctx: &CompoundContext<'_>) -> GETFH4res {
    match ctx.current_fh_bytes() {
        Ok(bytes) => GETFH4res {
            status: nfsstat4::NFS4_OK,
            object: nfs_fh4 { data: bytes.to_vec() },
        },
        Err(status) => GETFH4res { status, ..Default::default() },
    }
}
