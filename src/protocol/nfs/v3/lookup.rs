//! LOOKUP procedure (procedure 3): resolve one name within a directory.

use std::io::{Read, Write};

use tracing::{debug, error};

use super::attr::{post_op_attr_from, NFS3_ATTR_MASK};
use crate::protocol::rpc;
use crate::protocol::xdr::{self, deserialize, nfs3, Serialize};
use crate::vfs::attr::mask::ATTR_FH;
use crate::vfs::open_flags::{OPEN_DIRECTORY, OPEN_INFERRED, OPEN_PATH};

pub async fn nfsproc3_lookup(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    context: &rpc::Context,
) -> Result<(), anyhow::Error> {
    let args = deserialize::<nfs3::diropargs3>(input)?;
    debug!("nfsproc3_lookup({:?},{:?})", xid, args);

    let cred = super::call_cred(context);
    let router = context.server.router();

    let dir_fh = match super::decode_fh(&args.dir) {
        Ok(fh) => fh,
        Err(err) => {
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            super::status_of(err).serialize(output)?;
            nfs3::post_op_attr::None.serialize(output)?;
            return Ok(());
        }
    };

    let dir = match router
        .open_fh(&cred, &dir_fh, OPEN_PATH | OPEN_INFERRED | OPEN_DIRECTORY)
        .await
    {
        Ok(handle) => handle,
        Err(err) => {
            error!("nfsproc3_lookup open error {:?} --> {:?}", xid, err);
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            super::status_of(err).serialize(output)?;
            nfs3::post_op_attr::None.serialize(output)?;
            return Ok(());
        }
    };

    let result = router
        .lookup_at(&cred, &dir, &args.name, NFS3_ATTR_MASK | ATTR_FH, NFS3_ATTR_MASK)
        .await;
    router.release(&dir);

    match result {
        Ok((obj_attr, dir_attr)) => {
            let obj_fh = match &obj_attr.fh {
                Some(fh) => nfs3::nfs_fh3 { data: fh.as_bytes().to_vec() },
                None => {
                    xdr::rpc::make_success_reply(xid).serialize(output)?;
                    nfs3::nfsstat3::NFS3ERR_SERVERFAULT.serialize(output)?;
                    nfs3::post_op_attr::None.serialize(output)?;
                    return Ok(());
                }
            };
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            nfs3::nfsstat3::NFS3_OK.serialize(output)?;
            obj_fh.serialize(output)?;
            post_op_attr_from(&obj_attr).serialize(output)?;
            post_op_attr_from(&dir_attr).serialize(output)?;
        }
        Err(err) => {
            debug!("nfsproc3_lookup error {:?} --> {:?}", xid, err);
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            super::status_of(err).serialize(output)?;
            nfs3::post_op_attr::None.serialize(output)?;
        }
    }
    Ok(())
}
