//! RENAME: move oldname under the saved FH to newname under the current
//! FH.

use super::{change_info_from, CompoundContext};
use crate::protocol::xdr::nfs4::nfsstat4;
use crate::protocol::xdr::nfs4::ops::{RENAME4args, RENAME4res};
use crate::vfs::open_flags::{OPEN_DIRECTORY, OPEN_INFERRED, OPEN_PATH};
use crate::vfs::resolver::validate_leaf_name;
use crate::vfs::{FileHandle, VfsError};

pub(super) async fn rename(ctx: &mut CompoundContext<'_>, args: &RENAME4args) -> RENAME4res {
    if let Err(err) = validate_leaf_name(&args.oldname) {
        return RENAME4res { status: super::status_of(err), ..Default::default() };
    }
    if let Err(err) = validate_leaf_name(&args.newname) {
        return RENAME4res { status: super::status_of(err), ..Default::default() };
    }

    let target_dir = match ctx.current_backend_fh() {
        Ok(fh) => fh,
        Err(status) => return RENAME4res { status, ..Default::default() },
    };
    let source_dir = match &ctx.saved_fh {
        Some(bytes) => match FileHandle::new(bytes) {
            Ok(fh) => fh,
            Err(_) => return RENAME4res { status: nfsstat4::NFS4ERR_BADHANDLE, ..Default::default() },
        },
        None => return RENAME4res { status: nfsstat4::NFS4ERR_NOFILEHANDLE, ..Default::default() },
    };

    if source_dir.magic() != target_dir.magic() {
        return RENAME4res {
            status: super::status_of(VfsError::XDev),
            ..Default::default()
        };
    }

    let router = ctx.router();
    let dir = match router
        .open_fh(&ctx.cred, &source_dir, OPEN_PATH | OPEN_INFERRED | OPEN_DIRECTORY)
        .await
    {
        Ok(handle) => handle,
        Err(err) => return RENAME4res { status: super::status_of(err), ..Default::default() },
    };

    let result = router
        .rename_at(&ctx.cred, &dir, &args.oldname, &target_dir, &args.newname)
        .await;
    router.release(&dir);

    match result {
        Ok((from_pre, from_post, to_pre, to_post)) => RENAME4res {
            status: nfsstat4::NFS4_OK,
            source_cinfo: change_info_from(&from_pre, &from_post),
            target_cinfo: change_info_from(&to_pre, &to_post),
        },
        Err(err) => RENAME4res { status: super::status_of(err), ..Default::default() },
    }
}
