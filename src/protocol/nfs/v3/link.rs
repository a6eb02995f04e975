//! LINK procedure (procedure 15): create a hard link.
//!
//! Requires a source-file open followed by the directory-target link
//! call; a backend that resolves paths itself receives the destination
//! whole through the same call.

use std::io::{Read, Write};

use tracing::{debug, error};

use super::attr::{post_op_attr_from, wcc_data_from, NFS3_ATTR_MASK};
use crate::protocol::rpc;
use crate::protocol::xdr::{self, deserialize, nfs3, Serialize};
use crate::vfs::open_flags::{OPEN_INFERRED, OPEN_PATH};
use crate::vfs::resolver::validate_leaf_name;
use crate::vfs::VfsError;

pub async fn nfsproc3_link(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    context: &rpc::Context,
) -> Result<(), anyhow::Error> {
    let args = deserialize::<nfs3::file::LINK3args>(input)?;
    debug!("nfsproc3_link({:?},{:?})", xid, args);

    let cred = super::call_cred(context);
    let router = context.server.router();

    let fail = |output: &mut dyn Write, err| -> Result<(), anyhow::Error> {
        xdr::rpc::make_success_reply(xid).serialize(output)?;
        super::status_of(err).serialize(output)?;
        nfs3::post_op_attr::None.serialize(output)?;
        nfs3::wcc_data::default().serialize(output)?;
        Ok(())
    };

    if let Err(err) = validate_leaf_name(&args.link.name) {
        return fail(output, err);
    }

    let file_fh = match super::decode_fh(&args.file) {
        Ok(fh) => fh,
        Err(err) => return fail(output, err),
    };
    let dir_fh = match super::decode_fh(&args.link.dir) {
        Ok(fh) => fh,
        Err(err) => return fail(output, err),
    };

    if file_fh.magic() != dir_fh.magic() {
        return fail(output, VfsError::XDev);
    }

    let source = match router.open_fh(&cred, &file_fh, OPEN_PATH | OPEN_INFERRED).await {
        Ok(handle) => handle,
        Err(err) => return fail(output, err),
    };

    let result =
        router.link_at(&cred, &source, &dir_fh, &args.link.name, NFS3_ATTR_MASK).await;
    router.release(&source);

    match result {
        Ok((attr, dir_pre, dir_post)) => {
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            nfs3::nfsstat3::NFS3_OK.serialize(output)?;
            post_op_attr_from(&attr).serialize(output)?;
            wcc_data_from(&dir_pre, &dir_post).serialize(output)?;
        }
        Err(err) => {
            error!("nfsproc3_link error {:?} --> {:?}", xid, err);
            fail(output, err)?;
        }
    }
    Ok(())
}
