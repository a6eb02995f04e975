//! WRITE procedure (procedure 7): write data to a regular file.
//!
//! Ownership of the decoded data buffer moves from the RPC message into
//! the VFS call before any suspension point, so the buffer is released
//! exactly once no matter which completion path runs. The reply carries
//! the boot verifier so clients can detect server restarts between
//! unstable WRITEs and COMMIT.

use std::io::{Read, Write};

use tracing::{debug, error};

use super::attr::wcc_data_from;
use crate::protocol::rpc;
use crate::protocol::xdr::{self, deserialize, nfs3, Serialize};
use crate::vfs::open_flags::{OPEN_INFERRED, OPEN_RDWR};

pub async fn nfsproc3_write(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    context: &rpc::Context,
) -> Result<(), anyhow::Error> {
    let args = deserialize::<nfs3::file::WRITE3args>(input)?;
    debug!(
        "nfsproc3_write({:?}, file={:?}, offset={}, count={}, stable={:?})",
        xid, args.file, args.offset, args.count, args.stable
    );

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
            error!("nfsproc3_write open error {:?} --> {:?}", xid, err);
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            super::status_of(err).serialize(output)?;
            nfs3::wcc_data::default().serialize(output)?;
            return Ok(());
        }
    };

    let stable = !matches!(args.stable, nfs3::file::stable_how::UNSTABLE);
    let result = router.write(&cred, &handle, args.offset, args.data, stable).await;
    router.release(&handle);

    match result {
        Ok((count, was_stable, pre_attr, post_attr)) => {
            let res = nfs3::file::WRITE3resok {
                file_wcc: wcc_data_from(&pre_attr, &post_attr),
                count,
                committed: if was_stable {
                    nfs3::file::stable_how::FILE_SYNC
                } else {
                    nfs3::file::stable_how::UNSTABLE
                },
                verf: context.server.write_verifier(),
            };
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            nfs3::nfsstat3::NFS3_OK.serialize(output)?;
            res.serialize(output)?;
        }
        Err(err) => {
            error!("nfsproc3_write error {:?} --> {:?}", xid, err);
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            super::status_of(err).serialize(output)?;
            nfs3::wcc_data::default().serialize(output)?;
        }
    }
    Ok(())
}
