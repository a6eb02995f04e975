//! MOUNT DUMP procedure: list the active mounts the server has recorded.
//!
//! The wire form is an XDR linked list of (hostname, directory) pairs
//! terminated by a FALSE discriminant.

use std::io::Write;

use tracing::debug;

use crate::protocol::rpc;
use crate::protocol::xdr::{self, Serialize};

pub fn mountproc3_dump(
    xid: u32,
    output: &mut impl Write,
    context: &rpc::Context,
) -> Result<(), anyhow::Error> {
    debug!("mountproc3_dump({:?})", xid);

    let entries = context.server.mounts().entries();

    xdr::rpc::make_success_reply(xid).serialize(output)?;
    for (hostname, directory) in entries {
        true.serialize(output)?;
        hostname.into_bytes().serialize(output)?;
        directory.serialize(output)?;
    }
    false.serialize(output)?;
    Ok(())
}
