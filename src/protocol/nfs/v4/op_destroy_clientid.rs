//! DESTROY_CLIENTID: drop a client registration once its sessions are
//! gone.

use super::CompoundContext;
use crate::protocol::xdr::nfs4::nfsstat4;
use crate::protocol::xdr::nfs4::ops::{DESTROY_CLIENTID4args, DESTROY_CLIENTID4res};

pub(super) fn destroy_clientid(
    ctx: &mut CompoundContext<'_>,
    args: &DESTROY_CLIENTID4args,
) -> DESTROY_CLIENTID4res {
    if !ctx.server().clients().is_registered(args.dca_clientid) {
        return DESTROY_CLIENTID4res { status: nfsstat4::NFS4ERR_STALE_CLIENTID };
    }
    if ctx.server().clients().unregister(args.dca_clientid) {
        DESTROY_CLIENTID4res { status: nfsstat4::NFS4_OK }
    } else {
        // Sessions still reference the client.
        DESTROY_CLIENTID4res { status: nfsstat4::NFS4ERR_CLID_INUSE }
    }
}
