//! OPEN_DOWNGRADE: reduce the share access recorded on an open state.
//!
//! The slot's share bits are adjusted in place; the backend handle is
//! never reopened.

use super::CompoundContext;
use crate::protocol::xdr::nfs4::nfsstat4;
use crate::protocol::xdr::nfs4::ops::{OPEN_DOWNGRADE4args, OPEN_DOWNGRADE4res};

pub(super) async fn open_downgrade(
    ctx: &mut CompoundContext<'_>,
    args: &OPEN_DOWNGRADE4args,
) -> OPEN_DOWNGRADE4res {
    let session = match ctx.resolve_session(&args.open_stateid) {
        Some(session) => session,
        None => {
            return OPEN_DOWNGRADE4res {
                status: nfsstat4::NFS4ERR_BAD_STATEID,
                ..Default::default()
            }
        }
    };

    if session.downgrade(&args.open_stateid, args.share_access) {
        OPEN_DOWNGRADE4res { status: nfsstat4::NFS4_OK, open_stateid: args.open_stateid }
    } else {
        OPEN_DOWNGRADE4res { status: nfsstat4::NFS4ERR_BAD_STATEID, ..Default::default() }
    }
}
