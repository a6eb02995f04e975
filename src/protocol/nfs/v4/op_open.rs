//! OPEN: open (and possibly create) a file and allocate an open state.
//!
//! share_access maps onto backend open flags, opentype/createhow onto
//! create/exclusive flags. On success a session slot is allocated and
//! the replied stateid encodes (seqid=1, slot index, client id). When
//! the request arrives before any SEQUENCE attached a session, the
//! owner's client id locates one.

use tracing::debug;

use super::attr::unmarshall_fattr4;
use super::{change_info_from, pseudo_root, CompoundContext};
use crate::protocol::xdr::nfs4::ops::{createhow4, open_claim4, openflag4, OPEN4args, OPEN4res};
use crate::protocol::xdr::nfs4::{self, nfsstat4};
use crate::vfs::attr::mask::{ATTR_FH, ATTR_MASK_WCC};
use crate::vfs::attr::Attr;
use crate::vfs::open_flags::{
    OPEN_CREATE, OPEN_DIRECTORY, OPEN_EXCLUSIVE, OPEN_INFERRED, OPEN_PATH, OPEN_RDWR,
    OPEN_READ_ONLY,
};
use crate::vfs::resolver::validate_leaf_name;

pub(super) async fn open(ctx: &mut CompoundContext<'_>, args: &OPEN4args) -> OPEN4res {
    // A v4.0 flow may reach OPEN without a session on the connection;
    // the open owner's client id finds one.
    if ctx.session.is_none() {
        if let Some(session) =
            ctx.server().clients().session_by_clientid(args.owner.clientid)
        {
            ctx.adopt_session(session);
        }
    }
    let session = match &ctx.session {
        Some(session) => session.clone(),
        None => return OPEN4res { status: nfsstat4::NFS4ERR_BAD_STATEID, ..Default::default() },
    };

    if ctx.current_is_pseudo_root() && matches!(args.claim, open_claim4::CLAIM_NULL(_)) {
        // Files cannot be opened in the pseudo-root itself.
        return OPEN4res { status: nfsstat4::NFS4ERR_ROFS, ..Default::default() };
    }

    let mut flags = OPEN_RDWR;
    if args.share_access == nfs4::OPEN4_SHARE_ACCESS_READ {
        flags |= OPEN_READ_ONLY;
    }

    let mut set_attr = Attr::default();
    let mut attrset = Vec::new();
    let mut verifier = None;
    if let openflag4::OPEN4_CREATE(how) = &args.openhow {
        flags |= OPEN_CREATE;
        match how {
            createhow4::UNCHECKED4(wire_attrs) => {
                match unmarshall_fattr4(wire_attrs) {
                    Ok((attr, accepted)) => {
                        set_attr = attr;
                        attrset = accepted;
                    }
                    Err(err) => {
                        return OPEN4res { status: super::status_of(err), ..Default::default() }
                    }
                }
            }
            createhow4::GUARDED4(wire_attrs) => {
                flags |= OPEN_EXCLUSIVE;
                match unmarshall_fattr4(wire_attrs) {
                    Ok((attr, accepted)) => {
                        set_attr = attr;
                        attrset = accepted;
                    }
                    Err(err) => {
                        return OPEN4res { status: super::status_of(err), ..Default::default() }
                    }
                }
            }
            // The RFC exclusive-create verifier protocol is not
            // implemented; the verifier is accepted and the create
            // behaves as unchecked without attributes.
            createhow4::EXCLUSIVE4(verf) => verifier = Some(*verf),
            createhow4::EXCLUSIVE4_1(verf, _) => verifier = Some(*verf),
        }
    }

    let router = ctx.router();
    match &args.claim {
        open_claim4::CLAIM_NULL(name) => {
            if let Err(err) = validate_leaf_name(name) {
                return OPEN4res { status: super::status_of(err), ..Default::default() };
            }
            let dir_fh = match ctx.current_backend_fh() {
                Ok(fh) => fh,
                Err(status) => return OPEN4res { status, ..Default::default() },
            };
            let dir = match router
                .open_fh(&ctx.cred, &dir_fh, OPEN_PATH | OPEN_INFERRED | OPEN_DIRECTORY)
                .await
            {
                Ok(handle) => handle,
                Err(err) => {
                    return OPEN4res { status: super::status_of(err), ..Default::default() }
                }
            };

            let result = router
                .open_at(&ctx.cred, &dir, name, flags, set_attr, ATTR_FH | ATTR_MASK_WCC, verifier)
                .await;
            router.release(&dir);

            match result {
                Ok((handle, attr, dir_pre, dir_post)) => {
                    let obj_fh = match &attr.fh {
                        Some(fh) => fh.as_bytes().to_vec(),
                        None => {
                            router.release(&handle);
                            return OPEN4res {
                                status: nfsstat4::NFS4ERR_SERVERFAULT,
                                ..Default::default()
                            };
                        }
                    };
                    let stateid = session.alloc_slot(handle, args.share_access);
                    ctx.set_current_fh(obj_fh);
                    debug!("nfs4 open allocated state {:?}", stateid);
                    OPEN4res {
                        status: nfsstat4::NFS4_OK,
                        stateid,
                        cinfo: change_info_from(&dir_pre, &dir_post),
                        rflags: 0,
                        attrset,
                        delegation: Default::default(),
                    }
                }
                Err(err) => OPEN4res { status: super::status_of(err), ..Default::default() },
            }
        }
        open_claim4::CLAIM_FH | open_claim4::CLAIM_PREVIOUS(_) => {
            let fh = match ctx.current_backend_fh() {
                Ok(fh) => fh,
                Err(status) => return OPEN4res { status, ..Default::default() },
            };
            match router.open_fh(&ctx.cred, &fh, flags | OPEN_INFERRED).await {
                Ok(handle) => {
                    let stateid = session.alloc_slot(handle, args.share_access);
                    OPEN4res {
                        status: nfsstat4::NFS4_OK,
                        stateid,
                        cinfo: Default::default(),
                        rflags: 0,
                        attrset,
                        delegation: Default::default(),
                    }
                }
                Err(err) => OPEN4res { status: super::status_of(err), ..Default::default() },
            }
        }
    }
}
