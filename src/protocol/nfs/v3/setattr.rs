//! SETATTR procedure (procedure 2): mutate file attributes with an
//! optional ctime guard.
//!
//! A request that changes the size needs a truncation-capable open, so
//! the handle is taken from the file cache rather than the path cache.

use std::io::{Read, Write};

use tracing::{debug, error};

use super::attr::{sattr3_to_attr, wcc_data_from, NFS3_WCC_MASK};
use crate::protocol::rpc;
use crate::protocol::xdr::{self, deserialize, nfs3, Serialize};
use crate::vfs::attr::mask::{ATTR_CTIME, ATTR_MASK_STAT, ATTR_SIZE};
use crate::vfs::open_flags::{OPEN_INFERRED, OPEN_PATH, OPEN_RDWR};

pub async fn nfsproc3_setattr(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    context: &rpc::Context,
) -> Result<(), anyhow::Error> {
    let args = deserialize::<nfs3::SETATTR3args>(input)?;
    debug!("nfsproc3_setattr({:?},{:?})", xid, args);

    let cred = super::call_cred(context);
    let router = context.server.router();

    let fh = match super::decode_fh(&args.object) {
        Ok(fh) => fh,
        Err(err) => {
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            super::status_of(err).serialize(output)?;
            nfs3::wcc_data::default().serialize(output)?;
            return Ok(());
        }
    };

    let set_attr = sattr3_to_attr(&args.new_attributes);

    // Truncation cannot go through a metadata-only handle.
    let flags = if set_attr.req_mask & ATTR_SIZE != 0 {
        OPEN_RDWR | OPEN_INFERRED
    } else {
        OPEN_PATH | OPEN_INFERRED
    };

    let handle = match router.open_fh(&cred, &fh, flags).await {
        Ok(handle) => handle,
        Err(err) => {
            error!("nfsproc3_setattr open error {:?} --> {:?}", xid, err);
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            super::status_of(err).serialize(output)?;
            nfs3::wcc_data::default().serialize(output)?;
            return Ok(());
        }
    };

    // The guard compares the object's current ctime before any change.
    if let Some(guard_ctime) = args.guard {
        match router.getattr(&cred, &handle, ATTR_CTIME).await {
            Ok(attr)
                if attr.has(ATTR_CTIME)
                    && (attr.ctime.sec as u32 != guard_ctime.seconds
                        || attr.ctime.nsec != guard_ctime.nseconds) =>
            {
                router.release(&handle);
                xdr::rpc::make_success_reply(xid).serialize(output)?;
                nfs3::nfsstat3::NFS3ERR_NOT_SYNC.serialize(output)?;
                nfs3::wcc_data::default().serialize(output)?;
                return Ok(());
            }
            Ok(_) => {}
            Err(err) => {
                router.release(&handle);
                xdr::rpc::make_success_reply(xid).serialize(output)?;
                super::status_of(err).serialize(output)?;
                nfs3::wcc_data::default().serialize(output)?;
                return Ok(());
            }
        }
    }

    let result = router
        .setattr(&cred, &handle, set_attr, NFS3_WCC_MASK, NFS3_WCC_MASK | ATTR_MASK_STAT)
        .await;
    router.release(&handle);

    match result {
        Ok((pre_attr, post_attr)) => {
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            nfs3::nfsstat3::NFS3_OK.serialize(output)?;
            wcc_data_from(&pre_attr, &post_attr).serialize(output)?;
        }
        Err(err) => {
            error!("nfsproc3_setattr error {:?} --> {:?}", xid, err);
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            super::status_of(err).serialize(output)?;
            nfs3::wcc_data::default().serialize(output)?;
        }
    }
    Ok(())
}
