//! READ procedure (procedure 6): read data from a regular file.
//!
//! The handle comes from the file cache, so any number of concurrent
//! reads of the same FH share one backend open.

use std::io::{Read, Write};

use tracing::{debug, error};

use super::attr::{post_op_attr_from, NFS3_ATTR_MASK};
use crate::protocol::rpc;
use crate::protocol::xdr::{self, deserialize, nfs3, Serialize};
use crate::vfs::open_flags::{OPEN_INFERRED, OPEN_RDONLY};

pub async fn nfsproc3_read(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    context: &rpc::Context,
) -> Result<(), anyhow::Error> {
    let args = deserialize::<nfs3::file::READ3args>(input)?;
    debug!("nfsproc3_read({:?},{:?})", xid, args);

    let cred = super::call_cred(context);
    let router = context.server.router();

    let fh = match super::decode_fh(&args.file) {
        Ok(fh) => fh,
        Err(err) => {
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            super::status_of(err).serialize(output)?;
            nfs3::post_op_attr::None.serialize(output)?;
            return Ok(());
        }
    };

    let handle = match router.open_fh(&cred, &fh, OPEN_RDONLY | OPEN_INFERRED).await {
        Ok(handle) => handle,
        Err(err) => {
            error!("nfsproc3_read open error {:?} --> {:?}", xid, err);
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            super::status_of(err).serialize(output)?;
            nfs3::post_op_attr::None.serialize(output)?;
            return Ok(());
        }
    };

    let result = router.read(&cred, &handle, args.offset, args.count, NFS3_ATTR_MASK).await;
    router.release(&handle);

    match result {
        Ok((data, eof, attr)) => {
            let res = nfs3::file::READ3resok {
                file_attributes: post_op_attr_from(&attr),
                count: data.len() as u32,
                eof,
                data,
            };
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            nfs3::nfsstat3::NFS3_OK.serialize(output)?;
            res.serialize(output)?;
        }
        Err(err) => {
            error!("nfsproc3_read error {:?} --> {:?}", xid, err);
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            super::status_of(err).serialize(output)?;
            nfs3::post_op_attr::None.serialize(output)?;
        }
    }
    Ok(())
}
