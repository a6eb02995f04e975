//! REMOVE: delete a name under the current FH.

use super::{change_info_from, CompoundContext};
use crate::protocol::xdr::nfs4::nfsstat4;
use crate::protocol::xdr::nfs4::ops::{REMOVE4args, REMOVE4res};
use crate::vfs::open_flags::{OPEN_DIRECTORY, OPEN_INFERRED, OPEN_PATH};
use crate::vfs::resolver::validate_leaf_name;

pub(super) async fn remove(ctx: &mut CompoundContext<'_>, args: &REMOVE4args) -> REMOVE4res {
    if let Err(err) = validate_leaf_name(&args.target) {
        return REMOVE4res { status: super::status_of(err), ..Default::default() };
    }

    let fh = match ctx.current_backend_fh() {
        Ok(fh) => fh,
        Err(status) => return REMOVE4res { status, ..Default::default() },
    };

    let router = ctx.router();
    let dir = match router
        .open_fh(&ctx.cred, &fh, OPEN_PATH | OPEN_INFERRED | OPEN_DIRECTORY)
        .await
    {
        Ok(handle) => handle,
        Err(err) => return REMOVE4res { status: super::status_of(err), ..Default::default() },
    };

    let result = router.remove_at(&ctx.cred, &dir, &args.target).await;
    router.release(&dir);

    match result {
        Ok((dir_pre, dir_post)) => REMOVE4res {
            status: nfsstat4::NFS4_OK,
            cinfo: change_info_from(&dir_pre, &dir_post),
        },
        Err(err) => REMOVE4res { status: super::status_of(err), ..Default::default() },
    }
}
