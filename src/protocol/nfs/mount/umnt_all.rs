//! MOUNT UMNTALL procedure: drop every mount record for the calling
//! client.

use std::io::{Read, Write};

use tracing::{debug, info};

use crate::protocol::rpc;
use crate::protocol::xdr::{self, Serialize};

pub async fn mountproc3_umnt_all(
    xid: u32,
    _input: &mut impl Read,
    output: &mut impl Write,
    context: &rpc::Context,
) -> Result<(), anyhow::Error> {
    debug!("mountproc3_umnt_all({:?})", xid);

    info!("unmount all by {}", context.client_addr);
    context.server.mounts().remove_all(&context.client_addr);

    xdr::rpc::make_success_reply(xid).serialize(output)?;
    Ok(())
}
