//! COMMIT procedure (procedure 21): flush previously written data to
//! stable storage.
//!
//! The reply returns the boot-time verifier; a client that sees the
//! verifier change between WRITE and COMMIT knows the server restarted
//! and must resend its uncommitted writes.

use std::io::{Read, Write};

use tracing::{debug, error};

use super::attr::{wcc_data_from, NFS3_ATTR_MASK, NFS3_WCC_MASK};
use crate::protocol::rpc;
use crate::protocol::xdr::{self, deserialize, nfs3, Serialize};
use crate::vfs::open_flags::{OPEN_INFERRED, OPEN_RDWR};

pub async fn nfsproc3_commit(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    context: &rpc::Context,
) -> Result<(), anyhow::Error> {
    let args = deserialize::<nfs3::file::COMMIT3args>(input)?;
    debug!("nfsproc3_commit({:?},{:?})", xid, args);

    let cred = super::call_cred(context);
    let router = context.server.router();

    let fh = match super::decode_fh(&args.file) {
        Ok(fh) => fh,
        Err(err) => {
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            super::status_of(err).serialize(output)?;
            nfs3::wcc_data::default().serialize(output)?;
            return Ok(());
        }
    };

    let handle = match router.open_fh(&cred, &fh, OPEN_RDWR | OPEN_INFERRED).await {
        Ok(handle) => handle,
        Err(err) => {
            error!("nfsproc3_commit open error {:?} --> {:?}", xid, err);
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            super::status_of(err).serialize(output)?;
            nfs3::wcc_data::default().serialize(output)?;
            return Ok(());
        }
    };

    let pre_attr = router.getattr(&cred, &handle, NFS3_WCC_MASK).await.unwrap_or_default();
    let result = router
        .commit(&cred, &handle, args.offset, args.count, NFS3_ATTR_MASK | NFS3_WCC_MASK)
        .await;
    router.release(&handle);

    match result {
        Ok(post_attr) => {
            let res = nfs3::file::COMMIT3resok {
                file_wcc: wcc_data_from(&pre_attr, &post_attr),
                verf: context.server.write_verifier(),
            };
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            nfs3::nfsstat3::NFS3_OK.serialize(output)?;
            res.serialize(output)?;
        }
        Err(err) => {
            error!("nfsproc3_commit error {:?} --> {:?}", xid, err);
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            super::status_of(err).serialize(output)?;
            nfs3::wcc_data::default().serialize(output)?;
        }
    }
    Ok(())
}
