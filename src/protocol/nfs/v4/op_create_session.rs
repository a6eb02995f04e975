//! CREATE_SESSION: allocate a session for a registered client and
//! attach it to the connection.

use super::CompoundContext;
use crate::protocol::xdr::nfs4::ops::{CREATE_SESSION4args, CREATE_SESSION4res};
use crate::protocol::xdr::nfs4::{nfsstat4, CREATE_SESSION4_FLAG_CONN_BACK_CHAN};

pub(super) fn create_session(
    ctx: &mut CompoundContext<'_>,
    args: &CREATE_SESSION4args,
) -> CREATE_SESSION4res {
    let session = match ctx.server().clients().create_session(
        args.csa_clientid,
        args.csa_fore_chan_attrs.clone(),
        args.csa_back_chan_attrs.clone(),
    ) {
        Some(session) => session,
        None => {
            return CREATE_SESSION4res {
                status: nfsstat4::NFS4ERR_STALE_CLIENTID,
                ..Default::default()
            }
        }
    };

    let flags = args.csa_flags & CREATE_SESSION4_FLAG_CONN_BACK_CHAN;
    let res = CREATE_SESSION4res {
        status: nfsstat4::NFS4_OK,
        csr_sessionid: session.id,
        csr_sequence: 1,
        csr_flags: flags,
        csr_fore_chan_attrs: session.fore_attrs.clone(),
        csr_back_chan_attrs: session.back_attrs.clone(),
    };
    ctx.adopt_session(session);
    res
}
