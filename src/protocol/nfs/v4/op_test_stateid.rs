//! TEST_STATEID: report per-stateid validity without side effects.

use super::CompoundContext;
use crate::protocol::xdr::nfs4::nfsstat4;
use crate::protocol::xdr::nfs4::ops::{TEST_STATEID4args, TEST_STATEID4res};

pub(super) fn test_stateid(
    ctx: &mut CompoundContext<'_>,
    args: &TEST_STATEID4args,
) -> TEST_STATEID4res {
    let mut status_codes = Vec::with_capacity(args.ts_stateids.len());
    for stateid in &args.ts_stateids {
        let session = ctx
            .server()
            .clients()
            .resolve_session(ctx.session.clone(), stateid);
        let status = match session {
            Some(session) if session.stateid_is_active(stateid) => nfsstat4::NFS4_OK,
            _ => nfsstat4::NFS4ERR_BAD_STATEID,
        };
        status_codes.push(status as u32);
    }

    TEST_STATEID4res { status: nfsstat4::NFS4_OK, tsr_status_codes: status_codes }
}
