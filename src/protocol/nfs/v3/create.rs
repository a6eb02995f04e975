//! CREATE procedure (procedure 8): create a regular file.
//!
//! The `how` discriminator maps onto the VFS open flags: UNCHECKED is a
//! plain create, GUARDED adds the exclusive bit, and EXCLUSIVE adds the
//! exclusive bit plus the client's verifier so retried creates stay
//! idempotent.

use std::io::{Read, Write};

use tracing::{debug, error};

use super::attr::{post_op_attr_from, sattr3_to_attr, wcc_data_from, NFS3_ATTR_MASK};
use crate::protocol::rpc;
use crate::protocol::xdr::{self, deserialize, nfs3, Deserialize, Serialize};
use crate::vfs::attr::Attr;
use crate::vfs::open_flags::{
    OPEN_CREATE, OPEN_DIRECTORY, OPEN_EXCLUSIVE, OPEN_INFERRED, OPEN_PATH, OPEN_RDWR,
};
use crate::vfs::resolver::validate_leaf_name;

pub async fn nfsproc3_create(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    context: &rpc::Context,
) -> Result<(), anyhow::Error> {
    let dirops = deserialize::<nfs3::diropargs3>(input)?;
    let createhow = deserialize::<nfs3::createmode3>(input)?;
    debug!("nfsproc3_create({:?}, {:?}, {:?})", xid, dirops, createhow);

    let cred = super::call_cred(context);
    let router = context.server.router();

    let fail = |output: &mut dyn Write, err| -> Result<(), anyhow::Error> {
        xdr::rpc::make_success_reply(xid).serialize(output)?;
        super::status_of(err).serialize(output)?;
        nfs3::wcc_data::default().serialize(output)?;
        Ok(())
    };

    if let Err(err) = validate_leaf_name(&dirops.name) {
        return fail(output, err);
    }

    let dir_fh = match super::decode_fh(&dirops.dir) {
        Ok(fh) => fh,
        Err(err) => return fail(output, err),
    };

    let mut flags = OPEN_CREATE | OPEN_RDWR;
    let mut set_attr = Attr::default();
    let mut verifier = None;
    match createhow {
        nfs3::createmode3::UNCHECKED => {
            let mut attributes = nfs3::sattr3::default();
            attributes.deserialize(input)?;
            set_attr = sattr3_to_attr(&attributes);
        }
        nfs3::createmode3::GUARDED => {
            let mut attributes = nfs3::sattr3::default();
            attributes.deserialize(input)?;
            set_attr = sattr3_to_attr(&attributes);
            flags |= OPEN_EXCLUSIVE;
        }
        nfs3::createmode3::EXCLUSIVE => {
            let verf = deserialize::<nfs3::createverf3>(input)?;
            flags |= OPEN_EXCLUSIVE;
            verifier = Some(verf);
        }
    }

    let dir = match router
        .open_fh(&cred, &dir_fh, OPEN_PATH | OPEN_INFERRED | OPEN_DIRECTORY)
        .await
    {
        Ok(handle) => handle,
        Err(err) => return fail(output, err),
    };

    let result = router
        .open_at(&cred, &dir, &dirops.name, flags, set_attr, NFS3_ATTR_MASK, verifier)
        .await;
    router.release(&dir);

    match result {
        Ok((created, attr, dir_pre, dir_post)) => {
            router.release(&created);
            let obj_fh = attr
                .fh
                .as_ref()
                .map(|fh| nfs3::nfs_fh3 { data: fh.as_bytes().to_vec() });
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            nfs3::nfsstat3::NFS3_OK.serialize(output)?;
            obj_fh.serialize(output)?;
            post_op_attr_from(&attr).serialize(output)?;
            wcc_data_from(&dir_pre, &dir_post).serialize(output)?;
        }
        Err(err) => {
            error!("nfsproc3_create error {:?} --> {:?}", xid, err);
            fail(output, err)?;
        }
    }
    Ok(())
}
