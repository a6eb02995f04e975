//! PUTFH: install a client-supplied filehandle as the current FH.

use super::CompoundContext;
use crate::protocol::xdr::nfs4::nfsstat4;
use crate::protocol::xdr::nfs4::ops::{PUTFH4args, PUTFH4res};
use crate::vfs::VFS_FH_SIZE;

pub(super) fn putfh(ctx: &mut CompoundContext<'_>, args: &PUTFH4args) -> PUTFH4res {
    if args.object.data.is_empty() || args.object.data.len() > VFS_FH_SIZE {
        return PUTFH4res { status: nfsstat4::NFS4ERR_BADHANDLE };
    }
    ctx.set_current_fh(args.object.data.clone());
    PUTFH4res { status: nfsstat4::NFS4_OK }
}
