//! chimera-nfs - a user-space NFS server over a pluggable virtual
//! filesystem, in Rust.
//!
//! The server exports VFS backends over NFSv3 (RFC 1813) and NFSv4.0/4.1
//! (RFC 7530/5661), with the ancillary MOUNT and PORTMAP/rpcbind
//! services.
//!
//! ## Main Components
//!
//! - `vfs`: the asynchronous backend abstraction - the dispatch contract
//!   storage plugins implement, the attribute-mask model, the shared
//!   open-handle cache and the path resolver.
//!
//! - `protocol`: the wire side - XDR codec, RPC record marking and
//!   dispatch, and the per-procedure handlers for NFSv3, the NFSv4
//!   COMPOUND engine, MOUNT and PORTMAP.
//!
//! - `server`: assembly - shared server context (exports, registries,
//!   boot verifier) and the TCP listener set.
//!
//! - `config`: the declarative TOML configuration surface.
//!
//! ## Usage
//!
//! Implement [`vfs::backend::VfsBackend`] for your store, build a
//! [`server::ServerContext`] from a [`config::ServerConfig`] and the
//! backends serving its exports, and run a
//! [`server::NfsTcpListener`] over it.

pub mod config;
pub mod protocol;
pub mod server;
pub mod vfs;

mod write_counter;

pub use protocol::xdr;
