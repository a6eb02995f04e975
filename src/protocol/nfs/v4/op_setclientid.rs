//! SETCLIENTID and SETCLIENTID_CONFIRM: the v4.0 client establishment
//! pair.
//!
//! Registration shares the owner table with EXCHANGE_ID; the confirm
//! verifier is the server's boot verifier.

use super::CompoundContext;
use crate::protocol::xdr::nfs4::nfsstat4;
use crate::protocol::xdr::nfs4::ops::{
    SETCLIENTID4args, SETCLIENTID4res, SETCLIENTID_CONFIRM4args, SETCLIENTID_CONFIRM4res,
};

pub(super) fn setclientid(
    ctx: &mut CompoundContext<'_>,
    args: &SETCLIENTID4args,
) -> SETCLIENTID4res {
    let verifier = u64::from_be_bytes(args.client.verifier);
    let clientid = ctx.server().clients().register(&args.client.id, verifier);

    SETCLIENTID4res {
        status: nfsstat4::NFS4_OK,
        clientid,
        setclientid_confirm: ctx.server().write_verifier(),
    }
}

pub(super) fn setclientid_confirm(
    ctx: &mut CompoundContext<'_>,
    args: &SETCLIENTID_CONFIRM4args,
) -> SETCLIENTID_CONFIRM4res {
    if ctx.server().clients().confirm(args.clientid) {
        SETCLIENTID_CONFIRM4res { status: nfsstat4::NFS4_OK }
    } else {
        SETCLIENTID_CONFIRM4res { status: nfsstat4::NFS4ERR_STALE_CLIENTID }
    }
}
