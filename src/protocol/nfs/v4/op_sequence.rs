//! SEQUENCE: session sequencing for v4.1 compounds.
//!
//! The reply mirrors the client's slot and sequence and echoes the
//! session id. No per-slot reply cache is maintained; replay protection
//! is delegated to operation idempotence and the RPC-layer transaction
//! tracker.

use super::CompoundContext;
use crate::protocol::xdr::nfs4::nfsstat4;
use crate::protocol::xdr::nfs4::ops::{SEQUENCE4args, SEQUENCE4res};

pub(super) async fn sequence(ctx: &mut CompoundContext<'_>, args: &SEQUENCE4args) -> SEQUENCE4res {
    let session = match ctx.server().clients().session(&args.sa_sessionid) {
        Some(session) => session,
        None => {
            return SEQUENCE4res { status: nfsstat4::NFS4ERR_BADSESSION, ..Default::default() }
        }
    };

    let max_requests = session.fore_attrs.ca_maxrequests;
    ctx.adopt_session(session.clone());

    SEQUENCE4res {
        status: nfsstat4::NFS4_OK,
        sr_sessionid: session.id,
        sr_sequenceid: args.sa_sequenceid,
        sr_slotid: args.sa_slotid,
        sr_highest_slotid: max_requests,
        sr_target_highest_slotid: max_requests,
        sr_status_flags: 0,
    }
}
