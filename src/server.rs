//! Server assembly: shared context, export and mount tables, and the TCP
//! listener set for the NFS, MOUNT and PORTMAP services.
//!
//! The shared [`ServerContext`] is built once at startup and handed to
//! every connection; it owns the VFS router (and through it the
//! open-handle caches), the NFSv4 client registry, the export table, the
//! active-mount table and the boot-time write verifier.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use std::{io, net::IpAddr};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

use crate::config::ServerConfig;
use crate::protocol::nfs::v4::state::ClientTable;
use crate::protocol::rpc::{self, Transport};
use crate::protocol::xdr::portmap;
use crate::protocol::xdr::rpc::auth_unix;
use crate::vfs::backend::VfsBackend;
use crate::vfs::dispatch::VfsRouter;
use crate::vfs::FileHandle;

/// Well-known port of the portmap service.
pub const PORTMAP_PORT: u16 = 111;
/// Well-known port of the NFS service.
pub const NFS_PORT: u16 = 2049;
/// Port the MOUNT service is advertised on.
pub const MOUNT_PORT: u16 = 20048;

/// Maps export names to backend root file handles and backs the MOUNT
/// EXPORT listing.
pub struct ExportTable {
    by_name: HashMap<Vec<u8>, FileHandle>,
    listing: Vec<Vec<u8>>,
}

impl ExportTable {
    fn new() -> ExportTable {
        ExportTable { by_name: HashMap::new(), listing: Vec::new() }
    }

    fn add(&mut self, name: &str, root_fh: FileHandle) {
        let normalized = format!("/{}", name.trim_matches('/'));
        self.by_name.insert(normalized.as_bytes().to_vec(), root_fh);
        self.listing.push(normalized.into_bytes());
    }

    /// Resolves a mount path to the export's root file handle. A lone
    /// slash resolves to the first export, which keeps single-export
    /// configurations mountable as "/".
    pub fn resolve(&self, path: &[u8]) -> Option<FileHandle> {
        let trimmed: &[u8] = {
            let mut p = path;
            while let Some((&b'/', rest)) = p.split_last() {
                p = rest;
            }
            if p.is_empty() {
                b"/"
            } else {
                p
            }
        };
        if trimmed == b"/" {
            return self.listing.first().and_then(|name| self.by_name.get(name)).cloned();
        }
        let mut normalized = Vec::with_capacity(trimmed.len() + 1);
        if trimmed.first() != Some(&b'/') {
            normalized.push(b'/');
        }
        normalized.extend_from_slice(trimmed);
        self.by_name.get(&normalized).cloned()
    }

    /// Resolves a bare export component name (no slashes), as used by
    /// LOOKUP on the NFSv4 pseudo-root.
    pub fn resolve_component(&self, name: &[u8]) -> Option<FileHandle> {
        let mut normalized = Vec::with_capacity(name.len() + 1);
        normalized.push(b'/');
        normalized.extend_from_slice(name);
        self.by_name.get(&normalized).cloned()
    }

    /// The exported names, each with its leading slash.
    pub fn names(&self) -> Vec<Vec<u8>> {
        self.listing.clone()
    }
}

/// Active client mounts, keyed by client address; backs MOUNT DUMP.
#[derive(Default)]
pub struct MountTable {
    mounts: Mutex<Vec<(String, Vec<u8>)>>,
}

impl MountTable {
    /// Records a successful MNT.
    pub fn add(&self, client: &str, path: &[u8]) {
        let mut mounts = self.mounts.lock().expect("mount table lock poisoned");
        mounts.push((client.to_string(), path.to_vec()));
    }

    /// Drops one record matching the client and path.
    pub fn remove(&self, client: &str, path: &[u8]) {
        let mut mounts = self.mounts.lock().expect("mount table lock poisoned");
        if let Some(pos) =
            mounts.iter().position(|(c, p)| c == client && p.as_slice() == path)
        {
            mounts.remove(pos);
        }
    }

    /// Drops every record for the client.
    pub fn remove_all(&self, client: &str) {
        let mut mounts = self.mounts.lock().expect("mount table lock poisoned");
        mounts.retain(|(c, _)| c != client);
    }

    /// Snapshot of (hostname, directory) pairs.
    pub fn entries(&self) -> Vec<(String, Vec<u8>)> {
        self.mounts.lock().expect("mount table lock poisoned").clone()
    }
}

/// Shared server state handed to every connection.
pub struct ServerContext {
    router: VfsRouter,
    exports: ExportTable,
    mounts: MountTable,
    clients: ClientTable,
    config: ServerConfig,
    write_verifier: [u8; 8],
    portmap_services: Vec<portmap::mapping>,
}

impl ServerContext {
    /// Builds the shared state from a configuration and the backend
    /// modules serving its exports.
    ///
    /// The boot verifier is derived from the wall clock at nanosecond
    /// precision, so clients can detect a restarted server through
    /// WRITE/COMMIT replies.
    pub fn new(
        config: ServerConfig,
        backends: Vec<(String, Arc<dyn VfsBackend>)>,
    ) -> ServerContext {
        let mut router = VfsRouter::new();
        let mut exports = ExportTable::new();
        for (export_name, backend) in backends {
            let root_fh = backend.root_fh();
            router.register(backend);
            exports.add(&export_name, root_fh);
        }

        let boot_nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_nanos() as u64;

        let portmap_services = vec![
            portmap::mapping {
                prog: portmap::PROGRAM,
                vers: 2,
                prot: portmap::IPPROTO_TCP,
                port: PORTMAP_PORT as u32,
            },
            portmap::mapping {
                prog: portmap::PROGRAM,
                vers: 3,
                prot: portmap::IPPROTO_TCP,
                port: PORTMAP_PORT as u32,
            },
            portmap::mapping {
                prog: portmap::PROGRAM,
                vers: 4,
                prot: portmap::IPPROTO_TCP,
                port: PORTMAP_PORT as u32,
            },
            portmap::mapping {
                prog: crate::protocol::xdr::nfs3::PROGRAM,
                vers: 3,
                prot: portmap::IPPROTO_TCP,
                port: NFS_PORT as u32,
            },
            portmap::mapping {
                prog: crate::protocol::xdr::nfs3::PROGRAM,
                vers: 4,
                prot: portmap::IPPROTO_TCP,
                port: NFS_PORT as u32,
            },
            portmap::mapping {
                prog: crate::protocol::xdr::mount::PROGRAM,
                vers: 3,
                prot: portmap::IPPROTO_TCP,
                port: MOUNT_PORT as u32,
            },
        ];

        ServerContext {
            router,
            exports,
            mounts: MountTable::default(),
            clients: ClientTable::new(),
            config,
            write_verifier: boot_nanos.to_be_bytes(),
            portmap_services,
        }
    }

    /// The VFS router.
    pub fn router(&self) -> &VfsRouter {
        &self.router
    }

    /// The export table.
    pub fn exports(&self) -> &ExportTable {
        &self.exports
    }

    /// The active-mount table.
    pub fn mounts(&self) -> &MountTable {
        &self.mounts
    }

    /// The NFSv4 client/session registry.
    pub fn clients(&self) -> &ClientTable {
        &self.clients
    }

    /// The configuration the server was built with.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// The boot-time verifier returned by WRITE and COMMIT.
    pub fn write_verifier(&self) -> [u8; 8] {
        self.write_verifier
    }

    /// The static service registration table for PORTMAP/rpcbind.
    pub fn portmap_services(&self) -> &[portmap::mapping] {
        &self.portmap_services
    }
}

/// Generates a local loopback IP address from a 16-bit host number.
/// Used for creating multiple local test addresses in the 127.88.x.y
/// range.
pub fn generate_host_ip(hostnum: u16) -> String {
    format!("127.88.{}.{}", ((hostnum >> 8) & 0xFF) as u8, (hostnum & 0xFF) as u8)
}

/// Pumps one established TCP connection: socket bytes feed the RPC
/// record reassembler, completed replies flow back as record-marked
/// fragments.
async fn process_socket(
    mut socket: tokio::net::TcpStream,
    context: rpc::Context,
) -> Result<(), anyhow::Error> {
    let (mut message_handler, mut socksend, mut msgrecvchan) =
        rpc::SocketMessageHandler::new(&context);
    let _ = socket.set_nodelay(true);

    tokio::spawn(async move {
        loop {
            if let Err(e) = message_handler.read().await {
                debug!("message loop broken due to {:?}", e);
                break;
            }
        }
    });
    loop {
        tokio::select! {
            _ = socket.readable() => {
                let mut buf = [0; 128_000];

                match socket.try_read(&mut buf) {
                    Ok(0) => {
                        return Ok(());
                    }
                    Ok(n) => {
                        let _ = socksend.write_all(&buf[..n]).await;
                    }
                    Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => {
                        // spurious readiness, try again
                    }
                    Err(e) => {
                        debug!("message handling closed: {:?}", e);
                        return Err(e.into());
                    }
                }
            },
            reply = msgrecvchan.recv() => {
                match reply {
                    Some(Err(e)) => {
                        debug!("message handling closed: {:?}", e);
                        return Err(e);
                    }
                    Some(Ok(msg)) => {
                        if let Err(e) = rpc::write_fragment(&mut socket, &msg).await {
                            error!("write error {:?}", e);
                        }
                    }
                    None => {
                        return Err(anyhow::anyhow!("unexpected socket context termination"));
                    }
                }
            }
        }
    }
}

/// Interface of the NFS TCP listener set.
#[async_trait]
pub trait NfsTcp: Send + Sync {
    /// The actual port the NFS listener is bound to; useful after
    /// binding port 0.
    fn get_listen_port(&self) -> u16;

    /// The IP address the listeners are bound to.
    fn get_listen_ip(&self) -> IpAddr;

    /// Accepts and serves connections until the process ends.
    async fn handle_forever(&self) -> io::Result<()>;
}

/// The TCP listener set: NFS, MOUNT and (unless an external rpcbind is
/// configured) the built-in PORTMAP service, all sharing one server
/// context.
pub struct NfsTcpListener {
    nfs_listener: TcpListener,
    mount_listener: TcpListener,
    portmap_listener: Option<TcpListener>,
    ip: IpAddr,
    nfs_port: u16,
    server: Arc<ServerContext>,
    transaction_tracker: Arc<rpc::TransactionTracker>,
}

impl NfsTcpListener {
    /// Binds the listener set on the given IP. The NFS port follows
    /// `ip:port` form; MOUNT and PORTMAP use their well-known ports
    /// relative to it (port 0 picks ephemeral ports for all three,
    /// which the tests rely on).
    pub async fn bind(ipstr: &str, server: Arc<ServerContext>) -> io::Result<NfsTcpListener> {
        let (ip, port) = ipstr.split_once(':').ok_or_else(|| {
            io::Error::new(io::ErrorKind::AddrNotAvailable, "address must be of form ip:port")
        })?;
        let port = port.parse::<u16>().map_err(|_| {
            io::Error::new(io::ErrorKind::AddrNotAvailable, "port not in range 0..=65535")
        })?;

        if ip != "auto" {
            return NfsTcpListener::bind_internal(ip, port, server).await;
        }

        const NUM_TRIES: u16 = 32;
        for try_ip in 1..=NUM_TRIES {
            let ip = generate_host_ip(try_ip);
            let result = NfsTcpListener::bind_internal(&ip, port, server.clone()).await;
            if result.is_ok() {
                return result;
            }
        }

        Err(io::Error::other("can't bind automatically"))
    }

    async fn bind_internal(
        ip: &str,
        port: u16,
        server: Arc<ServerContext>,
    ) -> io::Result<NfsTcpListener> {
        let nfs_listener = TcpListener::bind(format!("{ip}:{port}")).await?;
        let nfs_port = local_port(&nfs_listener)?;

        let mount_port = if port == 0 { 0 } else { MOUNT_PORT };
        let mount_listener = TcpListener::bind(format!("{ip}:{mount_port}")).await?;

        let portmap_listener = if server.config().external_portmap {
            // The system rpcbind owns :111; registration with it happens
            // out of process.
            None
        } else {
            let pm_port = if port == 0 { 0 } else { PORTMAP_PORT };
            Some(TcpListener::bind(format!("{ip}:{pm_port}")).await?)
        };

        info!("listening on {}:{} (nfs), mount and portmap alongside", ip, nfs_port);

        let ip = nfs_listener.local_addr()?.ip();
        Ok(NfsTcpListener {
            nfs_listener,
            mount_listener,
            portmap_listener,
            ip,
            nfs_port,
            server,
            transaction_tracker: Arc::new(rpc::TransactionTracker::new(Duration::from_secs(60))),
        })
    }

    fn make_context(&self, socket: &tokio::net::TcpStream, local_port: u16) -> io::Result<rpc::Context> {
        let transport = if self.server.config().nfs_tcp_rdma_port != 0 {
            Transport::Rdma
        } else {
            Transport::Tcp
        };
        Ok(rpc::Context {
            local_port,
            local_addr: format!("{}:{}", self.ip, local_port),
            client_addr: socket.peer_addr()?.to_string(),
            auth_flavor: crate::protocol::xdr::rpc::auth_flavor::AUTH_NULL,
            auth: auth_unix::default(),
            server: self.server.clone(),
            transaction_tracker: self.transaction_tracker.clone(),
            conn_session: Arc::new(Mutex::new(None)),
            transport,
        })
    }

    async fn serve_listener(&self, which: &TcpListener) -> io::Result<()> {
        loop {
            let (socket, _) = which.accept().await?;
            let local_port = local_port(which)?;
            let context = self.make_context(&socket, local_port)?;
            info!("accepting connection from {}", context.client_addr);
            debug!("accepting socket {:?} {:?}", socket, context);
            tokio::spawn(async move {
                let _ = process_socket(socket, context).await;
            });
        }
    }
}

fn local_port(listener: &TcpListener) -> io::Result<u16> {
    Ok(match listener.local_addr()? {
        SocketAddr::V4(addr) => addr.port(),
        SocketAddr::V6(addr) => addr.port(),
    })
}

#[async_trait]
impl NfsTcp for NfsTcpListener {
    fn get_listen_port(&self) -> u16 {
        self.nfs_port
    }

    fn get_listen_ip(&self) -> IpAddr {
        self.ip
    }

    async fn handle_forever(&self) -> io::Result<()> {
        let nfs = self.serve_listener(&self.nfs_listener);
        let mount = self.serve_listener(&self.mount_listener);
        match &self.portmap_listener {
            Some(pm) => {
                let portmap = self.serve_listener(pm);
                tokio::try_join!(nfs, mount, portmap)?;
            }
            None => {
                tokio::try_join!(nfs, mount)?;
            }
        }
        Ok(())
    }
}
