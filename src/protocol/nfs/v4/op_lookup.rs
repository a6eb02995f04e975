//! LOOKUP: resolve one name under the current FH and make the result
//! the new current FH.
//!
//! On the pseudo-root the name resolves against the exported-name table
//! instead of any backend.

use tracing::debug;

use super::{pseudo_root, CompoundContext};
use crate::protocol::xdr::nfs4::nfsstat4;
use crate::protocol::xdr::nfs4::ops::{LOOKUP4args, LOOKUP4res};
use crate::vfs::attr::mask::ATTR_FH;
use crate::vfs::open_flags::{OPEN_DIRECTORY, OPEN_INFERRED, OPEN_PATH};
use crate::vfs::resolver::validate_leaf_name;

pub(super) async fn lookup(ctx: &mut CompoundContext<'_>, args: &LOOKUP4args) -> LOOKUP4res {
    if let Err(err) = validate_leaf_name(&args.objname) {
        return LOOKUP4res { status: super::status_of(err) };
    }

    if ctx.current_is_pseudo_root() {
        return match pseudo_root::lookup(ctx.server(), &args.objname) {
            Some(root_fh) => {
                ctx.set_current_fh(root_fh.as_bytes().to_vec());
                LOOKUP4res { status: nfsstat4::NFS4_OK }
            }
            None => LOOKUP4res { status: nfsstat4::NFS4ERR_NOENT },
        };
    }

    let fh = match ctx.current_backend_fh() {
        Ok(fh) => fh,
        Err(status) => return LOOKUP4res { status },
    };

    let router = ctx.router();
    let dir = match router
        .open_fh(&ctx.cred, &fh, OPEN_PATH | OPEN_INFERRED | OPEN_DIRECTORY)
        .await
    {
        Ok(handle) => handle,
        Err(err) => return LOOKUP4res { status: super::status_of(err) },
    };

    let result = router.lookup_at(&ctx.cred, &dir, &args.objname, ATTR_FH, 0).await;
    router.release(&dir);

    match result {
        Ok((attr, _)) => match attr.fh {
            Some(obj_fh) => {
                ctx.set_current_fh(obj_fh.as_bytes().to_vec());
                LOOKUP4res { status: nfsstat4::NFS4_OK }
            }
            // A lookup that cannot return the handle is unusable.
            None => LOOKUP4res { status: nfsstat4::NFS4ERR_SERVERFAULT },
        },
        Err(err) => {
            debug!("nfs4 lookup {:?} failed: {:?}", args.objname, err);
            LOOKUP4res { status: super::status_of(err) }
        }
    }
}
