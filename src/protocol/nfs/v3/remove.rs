//! REMOVE and RMDIR procedures (procedures 12 and 13): delete a name
//! from a directory.
//!
//! The two procedures share wire layout and handler; the backend
//! enforces emptiness for directories. The WCC pair around the removal
//! is captured by the backend in the same operation when it can, which
//! is what makes the pre/post attributes atomic.

use std::io::{Read, Write};

use tracing::{debug, error};

use super::attr::wcc_data_from;
use crate::protocol::rpc;
use crate::protocol::xdr::{self, deserialize, nfs3, Serialize};
use crate::vfs::open_flags::{OPEN_DIRECTORY, OPEN_INFERRED, OPEN_PATH};
use crate::vfs::resolver::validate_leaf_name;

pub async fn nfsproc3_remove(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    context: &rpc::Context,
    is_rmdir: bool,
) -> Result<(), anyhow::Error> {
    let args = deserialize::<nfs3::diropargs3>(input)?;
    debug!("nfsproc3_{}({:?},{:?})", if is_rmdir { "rmdir" } else { "remove" }, xid, args);

    let cred = super::call_cred(context);
    let router = context.server.router();

    let fail = |output: &mut dyn Write, err| -> Result<(), anyhow::Error> {
        xdr::rpc::make_success_reply(xid).serialize(output)?;
        super::status_of(err).serialize(output)?;
        nfs3::wcc_data::default().serialize(output)?;
        Ok(())
    };

    if let Err(err) = validate_leaf_name(&args.name) {
        return fail(output, err);
    }

    let dir_fh = match super::decode_fh(&args.dir) {
        Ok(fh) => fh,
        Err(err) => return fail(output, err),
    };

    let dir = match router
        .open_fh(&cred, &dir_fh, OPEN_PATH | OPEN_INFERRED | OPEN_DIRECTORY)
        .await
    {
        Ok(handle) => handle,
        Err(err) => return fail(output, err),
    };

    let result = router.remove_at(&cred, &dir, &args.name).await;
    router.release(&dir);

    match result {
        Ok((dir_pre, dir_post)) => {
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            nfs3::nfsstat3::NFS3_OK.serialize(output)?;
            wcc_data_from(&dir_pre, &dir_post).serialize(output)?;
        }
        Err(err) => {
            error!("nfsproc3_remove error {:?} --> {:?}", xid, err);
            fail(output, err)?;
        }
    }
    Ok(())
}
