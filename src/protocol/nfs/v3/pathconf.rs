//! PATHCONF procedure (procedure 20): POSIX path limits. Constants for
//! every object on this server.

use std::io::{Read, Write};

use tracing::{debug, error};

use super::attr::{post_op_attr_from, NFS3_ATTR_MASK};
use crate::protocol::rpc;
use crate::protocol::xdr::{self, deserialize, nfs3, Serialize};
use crate::vfs::open_flags::{OPEN_INFERRED, OPEN_PATH};
use crate::vfs::VFS_NAME_MAX;

pub async fn nfsproc3_pathconf(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    context: &rpc::Context,
) -> Result<(), anyhow::Error> {
    let fh3 = deserialize::<nfs3::nfs_fh3>(input)?;
    debug!("nfsproc3_pathconf({:?},{:?})", xid, fh3);

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

    let obj_attr = match router.open_fh(&cred, &fh, OPEN_PATH | OPEN_INFERRED).await {
        Ok(handle) => {
            let attr = router.getattr(&cred, &handle, NFS3_ATTR_MASK).await;
            router.release(&handle);
            match attr {
                Ok(attr) => post_op_attr_from(&attr),
                Err(_) => None,
            }
        }
        Err(err) => {
            error!("nfsproc3_pathconf open error {:?} --> {:?}", xid, err);
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            super::status_of(err).serialize(output)?;
            nfs3::post_op_attr::None.serialize(output)?;
            return Ok(());
        }
    };

    let res = nfs3::fs::PATHCONF3resok {
        obj_attributes: obj_attr,
        linkmax: u32::MAX,
        name_max: VFS_NAME_MAX as u32,
        no_trunc: true,
        chown_restricted: true,
        case_insensitive: false,
        case_preserving: true,
    };

    xdr::rpc::make_success_reply(xid).serialize(output)?;
    nfs3::nfsstat3::NFS3_OK.serialize(output)?;
    res.serialize(output)?;
    Ok(())
}
