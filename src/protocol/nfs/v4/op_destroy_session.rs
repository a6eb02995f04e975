//! DESTROY_SESSION: tear down a session, releasing every open handle
//! its slots hold.

use super::CompoundContext;
use crate::protocol::xdr::nfs4::nfsstat4;
use crate::protocol::xdr::nfs4::ops::{DESTROY_SESSION4args, DESTROY_SESSION4res};

pub(super) fn destroy_session(
    ctx: &mut CompoundContext<'_>,
    args: &DESTROY_SESSION4args,
) -> DESTROY_SESSION4res {
    let destroyed = ctx
        .server()
        .clients()
        .destroy_session(&args.dsa_sessionid, ctx.router());

    if destroyed {
        if matches!(&ctx.session, Some(session) if session.id == args.dsa_sessionid) {
            ctx.session = None;
        }
        DESTROY_SESSION4res { status: nfsstat4::NFS4_OK }
    } else {
        DESTROY_SESSION4res { status: nfsstat4::NFS4ERR_BADSESSION }
    }
}
