//! EXCHANGE_ID: register or rediscover a client by its opaque owner and
//! advertise server identity.

use super::CompoundContext;
use crate::protocol::xdr::nfs4::ops::{EXCHANGE_ID4args, EXCHANGE_ID4res};
use crate::protocol::xdr::nfs4::{
    self, nfs_impl_id4, nfstime4, nfsstat4, server_owner4,
};

/// Server identity advertised to clients. The scope and owner only need
/// to be stable for this server's lifetime.
const SERVER_DOMAIN: &[u8] = b"chimera.example";
const SERVER_NAME: &[u8] = b"chimera-nfs";

pub(super) fn exchange_id(
    ctx: &mut CompoundContext<'_>,
    args: &EXCHANGE_ID4args,
) -> EXCHANGE_ID4res {
    let verifier = u64::from_be_bytes(args.eia_clientowner.co_verifier);
    let clientid = ctx
        .server()
        .clients()
        .register(&args.eia_clientowner.co_ownerid, verifier);

    let owner_token = ctx.server().write_verifier().to_vec();

    EXCHANGE_ID4res {
        status: nfsstat4::NFS4_OK,
        eir_clientid: clientid,
        eir_sequenceid: 1,
        eir_flags: nfs4::EXCHGID4_FLAG_USE_NON_PNFS,
        eir_state_protect: nfs4::SP4_NONE,
        eir_server_owner: server_owner4 {
            so_minor_id: 0,
            so_major_id: owner_token.clone(),
        },
        eir_server_scope: owner_token,
        eir_server_impl_id: vec![nfs_impl_id4 {
            nii_domain: SERVER_DOMAIN.to_vec(),
            nii_name: SERVER_NAME.to_vec(),
            nii_date: nfstime4::default(),
        }],
    }
}
