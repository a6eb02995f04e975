//! rpcbind v3/v4 GETADDR procedure: look up the universal address for a
//! program.
//!
//! An unknown program answers the empty string per the RFC.

use std::io::{Read, Write};

use tracing::debug;

use super::make_uaddr;
use crate::protocol::rpc;
use crate::protocol::xdr::{self, deserialize, portmap, Serialize};

pub fn rpcbproc_getaddr(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    context: &rpc::Context,
) -> Result<(), anyhow::Error> {
    let args = deserialize::<portmap::rpcb>(input)?;
    debug!("rpcbproc_getaddr({:?},{:?})", xid, args);

    let uaddr = context
        .server
        .portmap_services()
        .iter()
        .find(|svc| svc.prog == args.r_prog)
        .map(|svc| make_uaddr(&context.local_addr, svc.port))
        .unwrap_or_default();

    xdr::rpc::make_success_reply(xid).serialize(output)?;
    uaddr.serialize(output)?;
    Ok(())
}
