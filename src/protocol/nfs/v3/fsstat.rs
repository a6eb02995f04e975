//! FSSTAT procedure (procedure 18): dynamic filesystem statistics.

use std::io::{Read, Write};

use tracing::{debug, error};

use super::attr::{post_op_attr_from, NFS3_ATTR_MASK};
use crate::protocol::rpc;
use crate::protocol::xdr::{self, deserialize, nfs3, Serialize};
use crate::vfs::attr::mask::ATTR_MASK_STATFS;
use crate::vfs::open_flags::{OPEN_INFERRED, OPEN_PATH};

pub async fn nfsproc3_fsstat(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    context: &rpc::Context,
) -> Result<(), anyhow::Error> {
    let fh3 = deserialize::<nfs3::nfs_fh3>(input)?;
    debug!("nfsproc3_fsstat({:?},{:?})", xid, fh3);

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
            error!("nfsproc3_fsstat open error {:?} --> {:?}", xid, err);
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            super::status_of(err).serialize(output)?;
            nfs3::post_op_attr::None.serialize(output)?;
            return Ok(());
        }
    };

    let result = router.getattr(&cred, &handle, NFS3_ATTR_MASK | ATTR_MASK_STATFS).await;
    router.release(&handle);

    match result {
        Ok(attr) => {
            let res = nfs3::fs::FSSTAT3resok {
                obj_attributes: post_op_attr_from(&attr),
                tbytes: attr.fs_space_total,
                fbytes: attr.fs_space_free,
                abytes: attr.fs_space_avail,
                tfiles: attr.fs_files_total,
                ffiles: attr.fs_files_free,
                afiles: attr.fs_files_avail,
                invarsec: 0,
            };
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            nfs3::nfsstat3::NFS3_OK.serialize(output)?;
            res.serialize(output)?;
        }
        Err(err) => {
            error!("nfsproc3_fsstat error {:?} --> {:?}", xid, err);
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            super::status_of(err).serialize(output)?;
            nfs3::post_op_attr::None.serialize(output)?;
        }
    }
    Ok(())
}
