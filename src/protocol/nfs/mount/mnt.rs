//! MOUNT MNT procedure: resolve an export name to its root file handle.
//!
//! A successful mount is recorded in the mount table (keyed by client
//! address) and advertises AUTH_NONE and AUTH_SYS as acceptable flavors.

use std::io::{Read, Write};

use tracing::{debug, info};

use crate::protocol::rpc;
use crate::protocol::xdr::{self, deserialize, mount, Serialize};

/// Flavors the server accepts on NFS calls.
const AUTH_FLAVORS: [u32; 2] = [
    xdr::rpc::auth_flavor::AUTH_NULL as u32,
    xdr::rpc::auth_flavor::AUTH_UNIX as u32,
];

pub async fn mountproc3_mnt(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    context: &rpc::Context,
) -> Result<(), anyhow::Error> {
    let path = deserialize::<mount::dirpath>(input)?;
    let utf8path = String::from_utf8_lossy(&path).to_string();
    debug!("mountproc3_mnt({:?},{:?})", xid, utf8path);

    match context.server.exports().resolve(&path) {
        Some(root_fh) => {
            let response = mount::mountres3_ok {
                fhandle: root_fh.as_bytes().to_vec(),
                auth_flavors: AUTH_FLAVORS.to_vec(),
            };
            info!("mount {:?} by {}", utf8path, context.client_addr);
            context.server.mounts().add(&context.client_addr, &path);
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            mount::mountstat3::MNT3_OK.serialize(output)?;
            response.serialize(output)?;
        }
        None => {
            debug!("mount failed: no export {:?}", utf8path);
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            mount::mountstat3::MNT3ERR_NOENT.serialize(output)?;
        }
    }
    Ok(())
}
