//! This module implements the Portmap protocol (RFC 1833) data structures
//! for XDR serialization and deserialization, covering both the classic
//! PMAP version 2 form and the rpcbind version 3/4 form.
//!
//! Portmap (also known as Portmapper) is a service that maps RPC program
//! numbers to network port numbers. Clients use it to locate the port for a
//! specific RPC service they wish to use; rpcbind generalizes the port to a
//! universal address string (`a.b.c.d.hi.lo` for IPv4).

// Allow unused code since we implement the complete RFC specification
#![allow(dead_code)]
// Keep original RFC naming conventions for consistency with the specification
#![allow(non_camel_case_types)]

use num_derive::{FromPrimitive, ToPrimitive};

use crate::{DeserializeEnum, DeserializeStruct, SerializeEnum, SerializeStruct};

/// Represents a mapping between an RPC program and a network port.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct mapping {
    /// The RPC program number
    pub prog: u32,
    /// The RPC program version number
    pub vers: u32,
    /// The transport protocol (TCP or UDP, see IPPROTO_* constants)
    pub prot: u32,
    /// The port number where the service is listening
    pub port: u32,
}
DeserializeStruct!(mapping, prog, vers, prot, port);
SerializeStruct!(mapping, prog, vers, prot, port);

/// rpcbind (versions 3 and 4) address mapping: the transport is named by a
/// netid and the endpoint by a universal address string.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct rpcb {
    /// The RPC program number
    pub r_prog: u32,
    /// The RPC program version number
    pub r_vers: u32,
    /// Network identifier, e.g. "tcp"
    pub r_netid: String,
    /// Universal address, e.g. "127.0.0.1.8.1"
    pub r_addr: String,
    /// Owner of this service registration
    pub r_owner: String,
}
DeserializeStruct!(rpcb, r_prog, r_vers, r_netid, r_addr, r_owner);
SerializeStruct!(rpcb, r_prog, r_vers, r_netid, r_addr, r_owner);

/// Protocol number for TCP/IP
pub const IPPROTO_TCP: u32 = 6;
/// Protocol number for UDP/IP
pub const IPPROTO_UDP: u32 = 17;
/// Portmap RPC program number
pub const PROGRAM: u32 = 100000;
/// Classic portmap RPC version number
pub const VERSION: u32 = 2;
/// rpcbind protocol version 3
pub const RPCBIND_VERSION3: u32 = 3;
/// rpcbind protocol version 4
pub const RPCBIND_VERSION4: u32 = 4;

/// Procedure numbers for the PMAP version 2 service.
#[allow(clippy::upper_case_acronyms)]
#[derive(Copy, Clone, Debug, FromPrimitive, ToPrimitive)]
pub enum PortmapProgram {
    /// Null procedure for service availability testing
    PMAPPROC_NULL = 0,
    /// Register a new program-to-port mapping
    PMAPPROC_SET = 1,
    /// Remove a program-to-port mapping
    PMAPPROC_UNSET = 2,
    /// Look up the port for a program
    PMAPPROC_GETPORT = 3,
    /// List all registered program-to-port mappings
    PMAPPROC_DUMP = 4,
    /// Call another registered procedure
    PMAPPROC_CALLIT = 5,
    /// Invalid procedure number
    INVALID,
}
SerializeEnum!(PortmapProgram);
DeserializeEnum!(PortmapProgram);

/// Procedure numbers for the rpcbind version 3/4 service.
///
/// Only the procedures shared between versions 3 and 4 are listed; the
/// version 4 extensions (GETVERSADDR and friends) are not advertised.
#[allow(clippy::upper_case_acronyms)]
#[derive(Copy, Clone, Debug, FromPrimitive, ToPrimitive)]
pub enum RpcbindProgram {
    /// Null procedure for service availability testing
    RPCBPROC_NULL = 0,
    /// Register an address mapping
    RPCBPROC_SET = 1,
    /// Remove an address mapping
    RPCBPROC_UNSET = 2,
    /// Look up the universal address for a program
    RPCBPROC_GETADDR = 3,
    /// List all registered address mappings
    RPCBPROC_DUMP = 4,
    /// Invalid procedure number
    INVALID,
}
SerializeEnum!(RpcbindProgram);
DeserializeEnum!(RpcbindProgram);
