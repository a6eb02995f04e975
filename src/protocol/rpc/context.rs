//! Per-connection RPC execution context.
//!
//! Each accepted connection gets its own `Context` carrying the client's
//! identity, the shared server state and the connection-scoped NFSv4
//! session attachment. Protocol handlers receive it with every call.

use std::fmt;
use std::sync::{Arc, Mutex};

use crate::protocol::xdr::nfs4::sessionid4;
use crate::protocol::xdr::rpc::{auth_flavor, auth_unix};
use crate::server::ServerContext;

/// The transport a connection arrived on; affects advertised transfer
/// sizes (FSINFO) only.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Transport {
    /// Plain TCP
    Tcp,
    /// RDMA or TCP-emulated RDMA framing
    Rdma,
}

/// Execution context for one RPC connection.
///
/// Cloned per command; the clones share the connection-scoped pieces
/// (session attachment) through `Arc`s.
#[derive(Clone)]
pub struct Context {
    /// Port the server accepted this connection on
    pub local_port: u16,

    /// Local address in "ip:port" form, for rpcbind universal addresses
    pub local_addr: String,

    /// Client's network address (IP:port), for logging and transaction
    /// tracking
    pub client_addr: String,

    /// Flavor of the credentials on the current call
    pub auth_flavor: auth_flavor,

    /// UNIX-style credentials from the current call (valid when the
    /// flavor is AUTH_UNIX)
    pub auth: auth_unix,

    /// Shared server state: VFS router, exports, registries, verifier
    pub server: Arc<ServerContext>,

    /// Transaction state tracker for retransmission dedup
    pub transaction_tracker: Arc<super::TransactionTracker>,

    /// The NFSv4 session this connection last attached to, if any;
    /// shared by all commands on the connection
    pub conn_session: Arc<Mutex<Option<sessionid4>>>,

    /// Transport kind of the connection
    pub transport: Transport,
}

impl Context {
    /// The session currently attached to this connection.
    pub fn attached_session(&self) -> Option<sessionid4> {
        *self.conn_session.lock().expect("conn session lock poisoned")
    }

    /// Attaches a session to this connection; later calls on the same
    /// connection resolve stateids through it first.
    pub fn attach_session(&self, id: sessionid4) {
        *self.conn_session.lock().expect("conn session lock poisoned") = Some(id);
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("rpc::Context")
            .field("local_port", &self.local_port)
            .field("client_addr", &self.client_addr)
            .field("auth_flavor", &self.auth_flavor)
            .field("transport", &self.transport)
            .finish()
    }
}
