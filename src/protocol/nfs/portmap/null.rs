//! PORTMAP/rpcbind NULL procedure: do nothing, successfully.

use std::io::{Read, Write};

use tracing::debug;

use crate::protocol::xdr::{self, Serialize};

pub fn pmapproc_null(
    xid: u32,
    _input: &mut impl Read,
    output: &mut impl Write,
) -> Result<(), anyhow::Error> {
    debug!("pmapproc_null({:?})", xid);
    let msg = xdr::rpc::make_success_reply(xid);
    msg.serialize(output)?;
    Ok(())
}
