//! ACCESS procedure (procedure 4): evaluate the caller's rights on an
//! object against the credentials on the call.

use std::io::{Read, Write};

use tracing::{debug, error};

use super::attr::{post_op_attr_from, NFS3_ATTR_MASK};
use crate::protocol::rpc;
use crate::protocol::xdr::{self, deserialize, nfs3, Serialize};
use crate::vfs::open_flags::{OPEN_INFERRED, OPEN_PATH};

pub async fn nfsproc3_access(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    context: &rpc::Context,
) -> Result<(), anyhow::Error> {
    let fh3 = deserialize::<nfs3::nfs_fh3>(input)?;
    let access: u32 = deserialize(input)?;
    debug!("nfsproc3_access({:?},{:?},{:#x})", xid, fh3, access);

    let cred = super::call_cred(context);
    let router = context.server.router();

    let fh = match super::decode_fh(&fh3) {
        Ok(fh) => fh,
        Err(err) => {
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            super::status_of(err).serialize(output)?;
            nfs3::post_op_attr::None.serialize(output)?;
            return Ok(());
        }
    };

    let handle = match router.open_fh(&cred, &fh, OPEN_PATH | OPEN_INFERRED).await {
        Ok(handle) => handle,
        Err(err) => {
            error!("nfsproc3_access open error {:?} --> {:?}", xid, err);
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            super::status_of(err).serialize(output)?;
            nfs3::post_op_attr::None.serialize(output)?;
            return Ok(());
        }
    };

    let result = router.access(&cred, &handle, access, NFS3_ATTR_MASK).await;
    router.release(&handle);

    match result {
        Ok((granted, attr)) => {
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            nfs3::nfsstat3::NFS3_OK.serialize(output)?;
            post_op_attr_from(&attr).serialize(output)?;
            granted.serialize(output)?;
        }
        Err(err) => {
            error!("nfsproc3_access error {:?} --> {:?}", xid, err);
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            super::status_of(err).serialize(output)?;
            nfs3::post_op_attr::None.serialize(output)?;
        }
    }
    Ok(())
}
