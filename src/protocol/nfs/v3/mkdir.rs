//! MKDIR procedure (procedure 9): create a directory.

use std::io::{Read, Write};

use tracing::{debug, error};

use super::attr::{post_op_attr_from, sattr3_to_attr, wcc_data_from, NFS3_ATTR_MASK};
use crate::protocol::rpc;
use crate::protocol::xdr::{self, deserialize, nfs3, Serialize};
use crate::vfs::open_flags::{OPEN_DIRECTORY, OPEN_INFERRED, OPEN_PATH};
use crate::vfs::resolver::validate_leaf_name;

pub async fn nfsproc3_mkdir(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    context: &rpc::Context,
) -> Result<(), anyhow::Error> {
    let args = deserialize::<nfs3::dir::MKDIR3args>(input)?;
    debug!("nfsproc3_mkdir({:?},{:?})", xid, args);

    let cred = super::call_cred(context);
    let router = context.server.router();

    let fail = |output: &mut dyn Write, err| -> Result<(), anyhow::Error> {
        xdr::rpc::make_success_reply(xid).serialize(output)?;
        super::status_of(err).serialize(output)?;
        nfs3::wcc_data::default().serialize(output)?;
        Ok(())
    };

    if let Err(err) = validate_leaf_name(&args.dirops.name) {
        return fail(output, err);
    }

    let dir_fh = match super::decode_fh(&args.dirops.dir) {
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

    let set_attr = sattr3_to_attr(&args.attributes);
    let result = router.mkdir(&cred, &dir, &args.dirops.name, set_attr, NFS3_ATTR_MASK).await;
    router.release(&dir);

    match result {
        Ok((attr, dir_pre, dir_post)) => {
            let obj_fh =
                attr.fh.as_ref().map(|fh| nfs3::nfs_fh3 { data: fh.as_bytes().to_vec() });
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            nfs3::nfsstat3::NFS3_OK.serialize(output)?;
            obj_fh.serialize(output)?;
            post_op_attr_from(&attr).serialize(output)?;
            wcc_data_from(&dir_pre, &dir_post).serialize(output)?;
        }
        Err(err) => {
            error!("nfsproc3_mkdir error {:?} --> {:?}", xid, err);
            fail(output, err)?;
        }
    }
    Ok(())
}
