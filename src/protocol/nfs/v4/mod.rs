//! NFSv4.0/4.1 protocol implementation: the NULL and COMPOUND
//! procedures.
//!
//! COMPOUND carries an ordered array of sub-operations sharing
//! per-request state: the current and saved filehandles, the resolved
//! session, and the reply array under construction. The driver loop
//! executes them strictly in order; the first non-OK status truncates
//! the reply array so the failing op is its last entry and aborts the
//! compound (RFC 7530 section 15.2).
//!
//! The driver is a plain async loop, so inline completions from fast
//! backends cannot grow the stack: there is no re-entrance to guard
//! against.

use std::io::{Read, Write};
use std::sync::Arc;

use num_traits::cast::FromPrimitive;
use tracing::{debug, warn};

use crate::protocol::rpc;
use crate::protocol::xdr::nfs4::ops::*;
use crate::protocol::xdr::nfs4::{self, nfsstat4, stateid4};
use crate::protocol::xdr::{self, deserialize, Serialize};
use crate::server::ServerContext;
use crate::vfs::open_cache::OpenHandle;
use crate::vfs::{map_cred, nfsstat4_from_vfs, Cred, FileHandle, VfsError};

pub mod attr;
pub mod pseudo_root;
pub mod state;

mod op_access;
mod op_allocate;
mod op_close;
mod op_commit;
mod op_create;
mod op_create_session;
mod op_destroy_clientid;
mod op_destroy_session;
mod op_exchange_id;
mod op_getattr;
mod op_getfh;
mod op_link;
mod op_lookup;
mod op_lookupp;
mod op_open;
mod op_open_downgrade;
mod op_putfh;
mod op_read;
mod op_readdir;
mod op_readlink;
mod op_remove;
mod op_rename;
mod op_seek;
mod op_sequence;
mod op_setattr;
mod op_setclientid;
mod op_test_stateid;
mod op_write;

use state::Session;

/// Per-COMPOUND shared state threaded through every sub-operation.
pub struct CompoundContext<'a> {
    /// The connection's RPC context
    pub rpc: &'a rpc::Context,
    /// Mapped VFS credentials of the call
    pub cred: Cred,
    /// COMPOUND minor version (0 or 1)
    pub minorversion: u32,
    /// The current filehandle register; raw bytes because the
    /// pseudo-root literal is not a backend handle
    pub current_fh: Option<Vec<u8>>,
    /// The saved filehandle register
    pub saved_fh: Option<Vec<u8>>,
    /// The session resolved for this request, if any
    pub session: Option<Arc<Session>>,
}

impl CompoundContext<'_> {
    /// The shared server state.
    pub fn server(&self) -> &ServerContext {
        &self.rpc.server
    }

    /// The VFS router.
    pub fn router(&self) -> &crate::vfs::dispatch::VfsRouter {
        self.rpc.server.router()
    }

    /// The current FH bytes, or NOFILEHANDLE when the register is
    /// empty.
    pub fn current_fh_bytes(&self) -> Result<&[u8], nfsstat4> {
        self.current_fh.as_deref().ok_or(nfsstat4::NFS4ERR_NOFILEHANDLE)
    }

    /// True when the current FH is the pseudo-root.
    pub fn current_is_pseudo_root(&self) -> bool {
        matches!(&self.current_fh, Some(fh) if pseudo_root::is_pseudo_root(fh))
    }

    /// The current FH as a backend handle; the pseudo-root is not one.
    pub fn current_backend_fh(&self) -> Result<FileHandle, nfsstat4> {
        let bytes = self.current_fh_bytes()?;
        if pseudo_root::is_pseudo_root(bytes) {
            return Err(nfsstat4::NFS4ERR_BADHANDLE);
        }
        FileHandle::new(bytes).map_err(|_| nfsstat4::NFS4ERR_BADHANDLE)
    }

    /// Installs a new current FH.
    pub fn set_current_fh(&mut self, bytes: Vec<u8>) {
        self.current_fh = Some(bytes);
    }

    /// Resolves the session owning a stateid: the session already on
    /// this request, else the connection's attached session, else the
    /// client id embedded in the stateid. A session found this way is
    /// attached to the connection for subsequent calls.
    pub fn resolve_session(&mut self, stateid: &stateid4) -> Option<Arc<Session>> {
        if let Some(session) = &self.session {
            return Some(session.clone());
        }
        let attached = self
            .rpc
            .attached_session()
            .and_then(|id| self.server().clients().session(&id));
        let session = self.server().clients().resolve_session(attached, stateid)?;
        self.rpc.attach_session(session.id);
        self.session = Some(session.clone());
        Some(session)
    }

    /// Attaches a session to the request and the connection.
    pub fn adopt_session(&mut self, session: Arc<Session>) {
        self.rpc.attach_session(session.id);
        self.session = Some(session);
    }

    /// The open handle behind a stateid, for ops that operate through
    /// an existing open (READ/WRITE/COMMIT/ALLOCATE/DEALLOCATE/SEEK).
    pub fn stateid_handle(&mut self, stateid: &stateid4) -> Result<Arc<OpenHandle>, nfsstat4> {
        let session = self.resolve_session(stateid).ok_or(nfsstat4::NFS4ERR_BAD_STATEID)?;
        session.handle_of(stateid).ok_or(nfsstat4::NFS4ERR_BAD_STATEID)
    }
}

/// Maps a VFS error to the v4 wire status.
pub(crate) fn status_of(err: VfsError) -> nfsstat4 {
    nfsstat4_from_vfs(err)
}

/// Builds directory change information from a captured pre/post
/// attribute pair; the change value is ctime at nanosecond granularity.
pub(crate) fn change_info_from(
    pre: &crate::vfs::attr::Attr,
    post: &crate::vfs::attr::Attr,
) -> nfs4::change_info4 {
    use crate::vfs::attr::mask::{ATTR_ATOMIC, ATTR_CTIME};
    let nanos = |attr: &crate::vfs::attr::Attr| {
        (attr.ctime.sec as u64)
            .wrapping_mul(1_000_000_000)
            .wrapping_add(attr.ctime.nsec as u64)
    };
    nfs4::change_info4 {
        atomic: pre.has(ATTR_ATOMIC) && post.has(ATTR_ATOMIC),
        before: if pre.has(ATTR_CTIME) { nanos(pre) } else { 0 },
        after: if post.has(ATTR_CTIME) { nanos(post) } else { 0 },
    }
}

/// Main handler for the NFSv4 program: NULL and COMPOUND.
pub async fn handle_nfs(
    xid: u32,
    call: xdr::rpc::call_body,
    input: &mut impl Read,
    output: &mut impl Write,
    context: &rpc::Context,
) -> Result<(), anyhow::Error> {
    let proc = nfs4::NFS4Program::from_u32(call.proc).unwrap_or(nfs4::NFS4Program::INVALID);
    match proc {
        nfs4::NFS4Program::NFSPROC4_NULL => {
            debug!("nfsproc4_null({:?})", xid);
            xdr::rpc::make_success_reply(xid).serialize(output)?;
        }
        nfs4::NFS4Program::NFSPROC4_COMPOUND => {
            let args = match deserialize::<COMPOUND4args>(input) {
                Ok(args) => args,
                Err(e) => {
                    warn!("garbage COMPOUND args: {:?}", e);
                    xdr::rpc::garbage_args_reply_message(xid).serialize(output)?;
                    return Ok(());
                }
            };
            let res = compound(args, context).await;
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            res.serialize(output)?;
        }
        _ => {
            warn!("unimplemented NFSv4 procedure {}", call.proc);
            xdr::rpc::proc_unavail_reply_message(xid).serialize(output)?;
        }
    }
    Ok(())
}

/// Runs one COMPOUND: the driver loop over the sub-operation array.
pub async fn compound(args: COMPOUND4args, context: &rpc::Context) -> COMPOUND4res {
    debug!(
        "nfsproc4_compound(minor={}, {} ops)",
        args.minorversion,
        args.argarray.len()
    );

    let mut res = COMPOUND4res {
        status: nfsstat4::NFS4_OK,
        tag: args.tag.clone(),
        resarray: Vec::with_capacity(args.argarray.len()),
    };

    if args.minorversion > 1 {
        res.status = nfsstat4::NFS4ERR_MINOR_VERS_MISMATCH;
        return res;
    }

    let session = context
        .attached_session()
        .and_then(|id| context.server.clients().session(&id));

    let mut ctx = CompoundContext {
        rpc: context,
        cred: map_cred(context.auth_flavor, &context.auth),
        minorversion: args.minorversion,
        current_fh: None,
        saved_fh: None,
        session,
    };

    for argop in &args.argarray {
        let resop = dispatch_op(&mut ctx, argop).await;
        let status = resop.status();
        res.resarray.push(resop);
        if status != nfsstat4::NFS4_OK {
            // The reply array ends with the failing op (RFC 7530 15.2).
            res.status = status;
            break;
        }
    }

    res
}

/// Dispatches one sub-operation to its handler.
async fn dispatch_op(ctx: &mut CompoundContext<'_>, argop: &nfs_argop4) -> nfs_resop4 {
    match argop {
        nfs_argop4::ACCESS(args) => nfs_resop4::ACCESS(op_access::access(ctx, args).await),
        nfs_argop4::CLOSE(args) => nfs_resop4::CLOSE(op_close::close(ctx, args).await),
        nfs_argop4::COMMIT(args) => nfs_resop4::COMMIT(op_commit::commit(ctx, args).await),
        nfs_argop4::CREATE(args) => nfs_resop4::CREATE(op_create::create(ctx, args).await),
        nfs_argop4::DELEGRETURN(_) => {
            // No delegations are ever granted, so returning one is a NOP.
            nfs_resop4::DELEGRETURN(DELEGRETURN4res { status: nfsstat4::NFS4_OK })
        }
        nfs_argop4::GETATTR(args) => nfs_resop4::GETATTR(op_getattr::getattr(ctx, args).await),
        nfs_argop4::GETFH => nfs_resop4::GETFH(op_getfh::getfh(ctx)),
        nfs_argop4::LINK(args) => nfs_resop4::LINK(op_link::link(ctx, args).await),
        nfs_argop4::LOOKUP(args) => nfs_resop4::LOOKUP(op_lookup::lookup(ctx, args).await),
        nfs_argop4::LOOKUPP => nfs_resop4::LOOKUPP(op_lookupp::lookupp(ctx).await),
        nfs_argop4::OPEN(args) => nfs_resop4::OPEN(op_open::open(ctx, args).await),
        nfs_argop4::OPEN_CONFIRM(args) => {
            // Confirmation is implicit; echo the stateid back.
            nfs_resop4::OPEN_CONFIRM(OPEN_CONFIRM4res {
                status: nfsstat4::NFS4_OK,
                open_stateid: args.open_stateid,
            })
        }
        nfs_argop4::OPEN_DOWNGRADE(args) => {
            nfs_resop4::OPEN_DOWNGRADE(op_open_downgrade::open_downgrade(ctx, args).await)
        }
        nfs_argop4::PUTFH(args) => nfs_resop4::PUTFH(op_putfh::putfh(ctx, args)),
        nfs_argop4::PUTPUBFH => {
            // The public FH is the pseudo-root on this server.
            ctx.set_current_fh(pseudo_root::ROOT_FH.to_vec());
            nfs_resop4::PUTPUBFH(PUTPUBFH4res { status: nfsstat4::NFS4_OK })
        }
        nfs_argop4::PUTROOTFH => {
            ctx.set_current_fh(pseudo_root::ROOT_FH.to_vec());
            nfs_resop4::PUTROOTFH(PUTROOTFH4res { status: nfsstat4::NFS4_OK })
        }
        nfs_argop4::READ(args) => nfs_resop4::READ(op_read::read(ctx, args).await),
        nfs_argop4::READDIR(args) => nfs_resop4::READDIR(op_readdir::readdir(ctx, args).await),
        nfs_argop4::READLINK => nfs_resop4::READLINK(op_readlink::readlink(ctx).await),
        nfs_argop4::REMOVE(args) => nfs_resop4::REMOVE(op_remove::remove(ctx, args).await),
        nfs_argop4::RENAME(args) => nfs_resop4::RENAME(op_rename::rename(ctx, args).await),
        nfs_argop4::RENEW(_) => {
            // Leases never expire here, so renewal always succeeds.
            nfs_resop4::RENEW(RENEW4res { status: nfsstat4::NFS4_OK })
        }
        nfs_argop4::RESTOREFH => {
            let res = match ctx.saved_fh.clone() {
                Some(fh) => {
                    ctx.current_fh = Some(fh);
                    RESTOREFH4res { status: nfsstat4::NFS4_OK }
                }
                None => RESTOREFH4res { status: nfsstat4::NFS4ERR_RESTOREFH },
            };
            nfs_resop4::RESTOREFH(res)
        }
        nfs_argop4::SAVEFH => {
            let res = match ctx.current_fh.clone() {
                Some(fh) => {
                    ctx.saved_fh = Some(fh);
                    SAVEFH4res { status: nfsstat4::NFS4_OK }
                }
                None => SAVEFH4res { status: nfsstat4::NFS4ERR_NOFILEHANDLE },
            };
            nfs_resop4::SAVEFH(res)
        }
        nfs_argop4::SECINFO_NO_NAME(_) => {
            // AUTH_NONE satisfies the advertised policy.
            nfs_resop4::SECINFO_NO_NAME(SECINFO_NO_NAME4res {
                status: nfsstat4::NFS4_OK,
                flavors: vec![secinfo4 {
                    flavor: xdr::rpc::auth_flavor::AUTH_NULL as u32,
                }],
            })
        }
        nfs_argop4::SEQUENCE(args) => {
            nfs_resop4::SEQUENCE(op_sequence::sequence(ctx, args).await)
        }
        nfs_argop4::SETATTR(args) => nfs_resop4::SETATTR(op_setattr::setattr(ctx, args).await),
        nfs_argop4::SETCLIENTID(args) => {
            nfs_resop4::SETCLIENTID(op_setclientid::setclientid(ctx, args))
        }
        nfs_argop4::SETCLIENTID_CONFIRM(args) => nfs_resop4::SETCLIENTID_CONFIRM(
            op_setclientid::setclientid_confirm(ctx, args),
        ),
        nfs_argop4::WRITE(args) => nfs_resop4::WRITE(op_write::write(ctx, args).await),
        nfs_argop4::EXCHANGE_ID(args) => {
            nfs_resop4::EXCHANGE_ID(op_exchange_id::exchange_id(ctx, args))
        }
        nfs_argop4::CREATE_SESSION(args) => {
            nfs_resop4::CREATE_SESSION(op_create_session::create_session(ctx, args))
        }
        nfs_argop4::DESTROY_SESSION(args) => {
            nfs_resop4::DESTROY_SESSION(op_destroy_session::destroy_session(ctx, args))
        }
        nfs_argop4::DESTROY_CLIENTID(args) => {
            nfs_resop4::DESTROY_CLIENTID(op_destroy_clientid::destroy_clientid(ctx, args))
        }
        nfs_argop4::RECLAIM_COMPLETE(_) => {
            // There is no reclaim state to complete.
            nfs_resop4::RECLAIM_COMPLETE(RECLAIM_COMPLETE4res { status: nfsstat4::NFS4_OK })
        }
        nfs_argop4::ALLOCATE(args) => {
            nfs_resop4::ALLOCATE(op_allocate::allocate(ctx, args).await)
        }
        nfs_argop4::DEALLOCATE(args) => {
            nfs_resop4::DEALLOCATE(op_allocate::deallocate(ctx, args).await)
        }
        nfs_argop4::SEEK(args) => nfs_resop4::SEEK(op_seek::seek(ctx, args).await),
        nfs_argop4::TEST_STATEID(args) => {
            nfs_resop4::TEST_STATEID(op_test_stateid::test_stateid(ctx, args))
        }
        nfs_argop4::ILLEGAL(op) => {
            warn!("unsupported NFSv4 operation {:?}", op);
            nfs_resop4::ILLEGAL(*op, nfsstat4::NFS4ERR_NOTSUPP)
        }
    }
}
