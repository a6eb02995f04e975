//! GETATTR procedure (procedure 1): fetch file attributes.
//!
//! The only v3 procedure whose failure arm carries no attributes at all;
//! everything else degrades to attributes_follow = false.

use std::io::{Read, Write};

use tracing::{debug, error};

use super::attr::{marshall_fattr3, NFS3_ATTR_MASK};
use crate::protocol::rpc;
use crate::protocol::xdr::{self, deserialize, nfs3, Serialize};
use crate::vfs::open_flags::{OPEN_INFERRED, OPEN_PATH};

pub async fn nfsproc3_getattr(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    context: &rpc::Context,
) -> Result<(), anyhow::Error> {
    let args = deserialize::<nfs3::nfs_fh3>(input)?;
    debug!("nfsproc3_getattr({:?},{:?})", xid, args);

    let cred = super::call_cred(context);
    let router = context.server.router();

    let fh = match super::decode_fh(&args) {
        Ok(fh) => fh,
        Err(err) => {
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            super::status_of(err).serialize(output)?;
            return Ok(());
        }
    };

    let handle = match router.open_fh(&cred, &fh, OPEN_PATH | OPEN_INFERRED).await {
        Ok(handle) => handle,
        Err(err) => {
            error!("nfsproc3_getattr open error {:?} --> {:?}", xid, err);
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            super::status_of(err).serialize(output)?;
            return Ok(());
        }
    };

    let result = router.getattr(&cred, &handle, NFS3_ATTR_MASK).await;
    router.release(&handle);

    match result {
        Ok(attr) if attr.has(NFS3_ATTR_MASK) => {
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            nfs3::nfsstat3::NFS3_OK.serialize(output)?;
            marshall_fattr3(&attr).serialize(output)?;
        }
        Ok(_) => {
            // The backend failed to produce the stat set; nothing usable
            // can be put on the wire.
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            nfs3::nfsstat3::NFS3ERR_SERVERFAULT.serialize(output)?;
        }
        Err(err) => {
            error!("nfsproc3_getattr error {:?} --> {:?}", xid, err);
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            super::status_of(err).serialize(output)?;
        }
    }
    Ok(())
}
