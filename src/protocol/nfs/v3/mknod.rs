//! MKNOD procedure (procedure 11): create a special node.
//!
//! The node type and device numbers ride in the set-attribute record:
//! the type bits go into the mode word and the device pair packs into
//! rdev, which is how the backend contract carries them.

use std::io::{Read, Write};

use tracing::{debug, error};

use super::attr::{post_op_attr_from, sattr3_to_attr, wcc_data_from, NFS3_ATTR_MASK};
use crate::protocol::rpc;
use crate::protocol::xdr::nfs4::type_bits;
use crate::protocol::xdr::{self, deserialize, nfs3, Serialize};
use crate::vfs::attr::mask::{ATTR_MODE, ATTR_RDEV};
use crate::vfs::attr::Attr;
use crate::vfs::open_flags::{OPEN_DIRECTORY, OPEN_INFERRED, OPEN_PATH};
use crate::vfs::resolver::validate_leaf_name;

fn node_set_attr(what: &nfs3::dir::mknoddata3) -> Attr {
    let (sattr, ftype, spec) = match what {
        nfs3::dir::mknoddata3::CHR(dev) => {
            (&dev.dev_attributes, type_bits::S_IFCHR, Some(dev.spec))
        }
        nfs3::dir::mknoddata3::BLK(dev) => {
            (&dev.dev_attributes, type_bits::S_IFBLK, Some(dev.spec))
        }
        nfs3::dir::mknoddata3::SOCK(sattr) => (sattr, type_bits::S_IFSOCK, None),
        nfs3::dir::mknoddata3::FIFO(sattr) => (sattr, type_bits::S_IFIFO, None),
    };

    let mut attr = sattr3_to_attr(sattr);
    attr.req_mask |= ATTR_MODE;
    attr.mode |= ftype;
    if let Some(spec) = spec {
        attr.req_mask |= ATTR_RDEV;
        attr.rdev = ((spec.specdata1 as u64) << 32) | spec.specdata2 as u64;
    }
    attr
}

pub async fn nfsproc3_mknod(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    context: &rpc::Context,
) -> Result<(), anyhow::Error> {
    let args = deserialize::<nfs3::dir::MKNOD3args>(input)?;
    debug!("nfsproc3_mknod({:?},{:?})", xid, args);

    let cred = super::call_cred(context);
    let router = context.server.router();

    let fail = |output: &mut dyn Write, err| -> Result<(), anyhow::Error> {
        xdr::rpc::make_success_reply(xid).serialize(output)?;
        super::status_of(err).serialize(output)?;
        nfs3::wcc_data::default().serialize(output)?;
        Ok(())
    };

    if let Err(err) = validate_leaf_name(&args.where_dir.name) {
        return fail(output, err);
    }

    let dir_fh = match super::decode_fh(&args.where_dir.dir) {
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

    let set_attr = node_set_attr(&args.what);
    let result = router.mknod(&cred, &dir, &args.where_dir.name, set_attr, NFS3_ATTR_MASK).await;
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
            error!("nfsproc3_mknod error {:?} --> {:?}", xid, err);
            fail(output, err)?;
        }
    }
    Ok(())
}
