//! NULL procedure (procedure 0): do nothing, successfully.

use std::io::Write;

use tracing::debug;

use crate::protocol::xdr::{self, Serialize};

pub fn nfsproc3_null(xid: u32, output: &mut impl Write) -> Result<(), anyhow::Error> {
    debug!("nfsproc3_null({:?})", xid);
    let msg = xdr::rpc::make_success_reply(xid);
    msg.serialize(output)?;
    Ok(())
}
