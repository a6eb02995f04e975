//! PORTMAP/rpcbind DUMP procedures: list every service registration.
//!
//! Both forms serialize an XDR linked list terminated by a FALSE
//! discriminant; v2 entries carry ports, v3/v4 entries carry netids and
//! universal addresses.

use std::io::Write;

use tracing::debug;

use super::make_uaddr;
use crate::protocol::rpc;
use crate::protocol::xdr::{self, portmap, Serialize};

pub fn pmapproc_dump(
    xid: u32,
    output: &mut impl Write,
    context: &rpc::Context,
) -> Result<(), anyhow::Error> {
    debug!("pmapproc_dump({:?})", xid);

    xdr::rpc::make_success_reply(xid).serialize(output)?;
    for svc in context.server.portmap_services() {
        true.serialize(output)?;
        svc.serialize(output)?;
    }
    false.serialize(output)?;
    Ok(())
}

pub fn rpcbproc_dump(
    xid: u32,
    output: &mut impl Write,
    context: &rpc::Context,
) -> Result<(), anyhow::Error> {
    debug!("rpcbproc_dump({:?})", xid);

    xdr::rpc::make_success_reply(xid).serialize(output)?;
    for svc in context.server.portmap_services() {
        // Only the v3/v4 registrations are listed in rpcbind form.
        if svc.vers < portmap::RPCBIND_VERSION3 && svc.prog == portmap::PROGRAM {
            continue;
        }
        let entry = portmap::rpcb {
            r_prog: svc.prog,
            r_vers: svc.vers,
            r_netid: "tcp".to_string(),
            r_addr: make_uaddr(&context.local_addr, svc.port),
            r_owner: "superuser".to_string(),
        };
        true.serialize(output)?;
        entry.serialize(output)?;
    }
    false.serialize(output)?;
    Ok(())
}
