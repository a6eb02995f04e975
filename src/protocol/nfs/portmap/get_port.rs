//! PORTMAP v2 GETPORT procedure: look up the port for a program.
//!
//! An unknown program answers port 0 per the RFC.

use std::io::{Read, Write};

use tracing::debug;

use crate::protocol::rpc;
use crate::protocol::xdr::{self, deserialize, portmap, Serialize};

pub fn pmapproc_getport(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    context: &rpc::Context,
) -> Result<(), anyhow::Error> {
    let args = deserialize::<portmap::mapping>(input)?;
    debug!("pmapproc_getport({:?},{:?})", xid, args);

    let port: u32 = context
        .server
        .portmap_services()
        .iter()
        .find(|svc| svc.prog == args.prog)
        .map(|svc| svc.port)
        .unwrap_or(0);

    xdr::rpc::make_success_reply(xid).serialize(output)?;
    port.serialize(output)?;
    Ok(())
}
