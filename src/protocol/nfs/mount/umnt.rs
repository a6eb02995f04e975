//! MOUNT UMNT procedure: remove one mount record for the calling client.
//!
//! Unmount notifications are advisory; the reply is void and always
//! succeeds.

use std::io::{Read, Write};

use tracing::{debug, info};

use crate::protocol::rpc;
use crate::protocol::xdr::{self, deserialize, mount, Serialize};

pub async fn mountproc3_umnt(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    context: &rpc::Context,
) -> Result<(), anyhow::Error> {
    let path = deserialize::<mount::dirpath>(input)?;
    let utf8path = String::from_utf8_lossy(&path).to_string();
    debug!("mountproc3_umnt({:?},{:?})", xid, utf8path);

    info!("unmount {:?} by {}", utf8path, context.client_addr);
    context.server.mounts().remove(&context.client_addr, &path);

    xdr::rpc::make_success_reply(xid).serialize(output)?;
    Ok(())
}
