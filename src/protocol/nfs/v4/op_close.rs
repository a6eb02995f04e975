//! CLOSE: free the open state named by a stateid and release its
//! backend handle.
//!
//! When the connection has no session attached yet, the client id
//! embedded in the stateid locates the owning session.

use tracing::debug;

use super::CompoundContext;
use crate::protocol::xdr::nfs4::nfsstat4;
use crate::protocol::xdr::nfs4::ops::{CLOSE4args, CLOSE4res};

pub(super) async fn close(ctx: &mut CompoundContext<'_>, args: &CLOSE4args) -> CLOSE4res {
    let session = match ctx.resolve_session(&args.open_stateid) {
        Some(session) => session,
        None => return CLOSE4res { status: nfsstat4::NFS4ERR_BAD_STATEID, ..Default::default() },
    };

    match session.free_slot(&args.open_stateid) {
        Some(handle) => {
            ctx.router().release(&handle);
            debug!("nfs4 close released state {:?}", args.open_stateid);
            CLOSE4res { status: nfsstat4::NFS4_OK, open_stateid: args.open_stateid }
        }
        None => CLOSE4res { status: nfsstat4::NFS4ERR_BAD_STATEID, ..Default::default() },
    }
}
