//! RENAME procedure (procedure 14): atomically move a file or directory.

use std::io::{Read, Write};

use tracing::{debug, error};

use super::attr::wcc_data_from;
use crate::protocol::rpc;
use crate::protocol::xdr::{self, deserialize, nfs3, Serialize};
use crate::vfs::open_flags::{OPEN_DIRECTORY, OPEN_INFERRED, OPEN_PATH};
use crate::vfs::resolver::validate_leaf_name;
use crate::vfs::VfsError;

pub async fn nfsproc3_rename(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    context: &rpc::Context,
) -> Result<(), anyhow::Error> {
    let from = deserialize::<nfs3::diropargs3>(input)?;
    let to = deserialize::<nfs3::diropargs3>(input)?;
    debug!("nfsproc3_rename({:?},{:?} -> {:?})", xid, from, to);

    let cred = super::call_cred(context);
    let router = context.server.router();

    let fail = |output: &mut dyn Write, err| -> Result<(), anyhow::Error> {
        xdr::rpc::make_success_reply(xid).serialize(output)?;
        super::status_of(err).serialize(output)?;
        // fromdir_wcc and todir_wcc
        nfs3::wcc_data::default().serialize(output)?;
        nfs3::wcc_data::default().serialize(output)?;
        Ok(())
    };

    if let Err(err) = validate_leaf_name(&from.name) {
        return fail(output, err);
    }
    if let Err(err) = validate_leaf_name(&to.name) {
        return fail(output, err);
    }

    let from_fh = match super::decode_fh(&from.dir) {
        Ok(fh) => fh,
        Err(err) => return fail(output, err),
    };
    let to_fh = match super::decode_fh(&to.dir) {
        Ok(fh) => fh,
        Err(err) => return fail(output, err),
    };

    // A cross-backend rename cannot be atomic; the protocol calls that a
    // cross-device move.
    if from_fh.magic() != to_fh.magic() {
        return fail(output, VfsError::XDev);
    }

    let dir = match router
        .open_fh(&cred, &from_fh, OPEN_PATH | OPEN_INFERRED | OPEN_DIRECTORY)
        .await
    {
        Ok(handle) => handle,
        Err(err) => return fail(output, err),
    };

    let result = router.rename_at(&cred, &dir, &from.name, &to_fh, &to.name).await;
    router.release(&dir);

    match result {
        Ok((from_pre, from_post, to_pre, to_post)) => {
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            nfs3::nfsstat3::NFS3_OK.serialize(output)?;
            wcc_data_from(&from_pre, &from_post).serialize(output)?;
            wcc_data_from(&to_pre, &to_post).serialize(output)?;
        }
        Err(err) => {
            error!("nfsproc3_rename error {:?} --> {:?}", xid, err);
            fail(output, err)?;
        }
    }
    Ok(())
}
