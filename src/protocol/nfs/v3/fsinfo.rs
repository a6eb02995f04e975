//! FSINFO procedure (procedure 19): static filesystem information.
//!
//! The advertised transfer sizes depend on the connection transport:
//! RDMA framing supports 4 MiB transfers, plain TCP 1 MiB.

use std::io::{Read, Write};

use tracing::{debug, error};

use super::attr::{post_op_attr_from, NFS3_ATTR_MASK};
use crate::protocol::rpc::{self, Transport};
use crate::protocol::xdr::{self, deserialize, nfs3, Serialize};
use crate::vfs::open_flags::{OPEN_INFERRED, OPEN_PATH};

const TRANSFER_SIZE_TCP: u32 = 1024 * 1024;
const TRANSFER_SIZE_RDMA: u32 = 4 * 1024 * 1024;

pub async fn nfsproc3_fsinfo(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    context: &rpc::Context,
) -> Result<(), anyhow::Error> {
    let fh3 = deserialize::<nfs3::nfs_fh3>(input)?;
    debug!("nfsproc3_fsinfo({:?},{:?})", xid, fh3);

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
            error!("nfsproc3_fsinfo open error {:?} --> {:?}", xid, err);
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            super::status_of(err).serialize(output)?;
            nfs3::post_op_attr::None.serialize(output)?;
            return Ok(());
        }
    };

    let xfer = match context.transport {
        Transport::Rdma => TRANSFER_SIZE_RDMA,
        Transport::Tcp => TRANSFER_SIZE_TCP,
    };

    let res = nfs3::fs::fsinfo3 {
        obj_attributes: obj_attr,
        rtmax: xfer,
        rtpref: xfer,
        rtmult: 4096,
        wtmax: xfer,
        wtpref: xfer,
        wtmult: 4096,
        dtpref: xfer,
        maxfilesize: u64::MAX,
        time_delta: nfs3::nfstime3 { seconds: 0, nseconds: 1 },
        properties: nfs3::fs::FSF_LINK
            | nfs3::fs::FSF_SYMLINK
            | nfs3::fs::FSF_HOMOGENEOUS
            | nfs3::fs::FSF_CANSETTIME,
    };

    xdr::rpc::make_success_reply(xid).serialize(output)?;
    nfs3::nfsstat3::NFS3_OK.serialize(output)?;
    res.serialize(output)?;
    Ok(())
}
