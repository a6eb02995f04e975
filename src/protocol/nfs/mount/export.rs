//! MOUNT EXPORT procedure: list the exported file systems.
//!
//! The wire form is an XDR linked list of export entries, each carrying
//! a directory path and a (possibly empty) list of allowed groups; this
//! server exports to everyone, so the group list is always empty.

use std::io::{Read, Write};

use tracing::debug;

use crate::protocol::rpc;
use crate::protocol::xdr::{self, Serialize};

pub fn mountproc3_export(
    xid: u32,
    _input: &mut impl Read,
    output: &mut impl Write,
    context: &rpc::Context,
) -> Result<(), anyhow::Error> {
    debug!("mountproc3_export({:?})", xid);

    xdr::rpc::make_success_reply(xid).serialize(output)?;
    for name in context.server.exports().names() {
        // entry follows
        true.serialize(output)?;
        name.serialize(output)?;
        // no groups
        false.serialize(output)?;
    }
    // terminate the export list
    false.serialize(output)?;
    Ok(())
}
