//! PORTMAP version 2 and rpcbind version 3/4 implementation (RFC 1833).
//!
//! Both forms answer from the same static registration table advertising
//! the services this server runs: portmap itself on 111, NFS v3/v4 on
//! 2049 and MOUNT v3 on 20048, all over TCP. Version 2 speaks ports;
//! versions 3 and 4 speak universal addresses (`a.b.c.d.hi.lo`).

use std::io::{Read, Write};

use num_traits::cast::FromPrimitive;
use tracing::warn;

use crate::protocol::rpc;
use crate::protocol::xdr::{self, portmap, Serialize};

mod dump;
mod get_addr;
mod get_port;
mod null;

use dump::{pmapproc_dump, rpcbproc_dump};
use get_addr::rpcbproc_getaddr;
use get_port::pmapproc_getport;
use null::pmapproc_null;

/// Builds the universal address string for a service on this server's
/// local address: `a.b.c.d.hi.lo` where the port is split into its high
/// and low bytes.
pub(crate) fn make_uaddr(local_addr: &str, port: u32) -> String {
    let ip = local_addr.split(':').next().unwrap_or("0.0.0.0");
    format!("{}.{}.{}", ip, port >> 8, port & 0xff)
}

/// Main handler for the PORTMAP program, dispatching by version: 2 is
/// classic portmap, 3 and 4 are rpcbind.
pub fn handle_portmap(
    xid: u32,
    call: &xdr::rpc::call_body,
    input: &mut impl Read,
    output: &mut impl Write,
    context: &rpc::Context,
) -> Result<(), anyhow::Error> {
    match call.vers {
        portmap::VERSION => {
            let prog = portmap::PortmapProgram::from_u32(call.proc)
                .unwrap_or(portmap::PortmapProgram::INVALID);
            match prog {
                portmap::PortmapProgram::PMAPPROC_NULL => pmapproc_null(xid, input, output)?,
                portmap::PortmapProgram::PMAPPROC_GETPORT => {
                    pmapproc_getport(xid, input, output, context)?
                }
                portmap::PortmapProgram::PMAPPROC_DUMP => pmapproc_dump(xid, output, context)?,
                _ => {
                    xdr::rpc::proc_unavail_reply_message(xid).serialize(output)?;
                }
            }
        }
        portmap::RPCBIND_VERSION3 | portmap::RPCBIND_VERSION4 => {
            let prog = portmap::RpcbindProgram::from_u32(call.proc)
                .unwrap_or(portmap::RpcbindProgram::INVALID);
            match prog {
                portmap::RpcbindProgram::RPCBPROC_NULL => pmapproc_null(xid, input, output)?,
                portmap::RpcbindProgram::RPCBPROC_GETADDR => {
                    rpcbproc_getaddr(xid, input, output, context)?
                }
                portmap::RpcbindProgram::RPCBPROC_DUMP => rpcbproc_dump(xid, output, context)?,
                _ => {
                    xdr::rpc::proc_unavail_reply_message(xid).serialize(output)?;
                }
            }
        }
        vers => {
            warn!("unsupported portmap version {}", vers);
            xdr::rpc::prog_mismatch_reply_message(xid, portmap::VERSION).serialize(output)?;
        }
    }
    Ok(())
}
