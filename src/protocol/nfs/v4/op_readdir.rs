//! READDIR: iterate the directory at the current FH, each entry carrying
//! the attributes the client's bitmap requested.
//!
//! Entries accumulate against the client's maxcount budget; iteration
//! stops with eof=false when the next entry would overflow. On the
//! pseudo-root the listing comes from the export table.

use super::attr::{marshall_fattr4, vfs_mask_for};
use super::{pseudo_root, CompoundContext};
use crate::protocol::xdr::nfs4::ops::{dirlist4, entry4, READDIR4args, READDIR4res};
use crate::protocol::xdr::nfs4::nfsstat4;
use crate::protocol::xdr::serialize_to_vec;
use crate::vfs::attr::mask::ATTR_FH;
use crate::vfs::open_flags::{OPEN_DIRECTORY, OPEN_INFERRED, OPEN_PATH};

/// Room reserved for the list terminator, eof flag and cookieverf.
const REPLY_TAIL_RESERVE: usize = 128;

pub(super) async fn readdir(ctx: &mut CompoundContext<'_>, args: &READDIR4args) -> READDIR4res {
    if ctx.current_is_pseudo_root() {
        return readdir_pseudo_root(ctx, args);
    }

    let fh = match ctx.current_backend_fh() {
        Ok(fh) => fh,
        Err(status) => return READDIR4res { status, ..Default::default() },
    };

    let router = ctx.router();
    let dir = match router
        .open_fh(&ctx.cred, &fh, OPEN_PATH | OPEN_INFERRED | OPEN_DIRECTORY)
        .await
    {
        Ok(handle) => handle,
        Err(err) => return READDIR4res { status: super::status_of(err), ..Default::default() },
    };

    let attr_mask = vfs_mask_for(&args.attr_request) | ATTR_FH;
    let estimated_max = (args.maxcount / 32).max(1);
    let verifier = u64::from_be_bytes(args.cookieverf);
    let result = router
        .readdir(&ctx.cred, &dir, args.cookie, verifier, estimated_max, attr_mask, 0)
        .await;
    router.release(&dir);

    let (entries, end, next_verifier, _) = match result {
        Ok(ok) => ok,
        Err(err) => return READDIR4res { status: super::status_of(err), ..Default::default() },
    };

    let budget = (args.maxcount as usize).saturating_sub(REPLY_TAIL_RESERVE);
    let mut reply = dirlist4::default();
    let mut used = 0usize;
    let mut all_written = true;
    for entry in entries {
        let wire_entry = entry4 {
            cookie: entry.cookie,
            name: entry.name,
            attrs: marshall_fattr4(&entry.attr, &args.attr_request),
        };
        let encoded = match serialize_to_vec(&wire_entry) {
            Ok(encoded) => encoded,
            Err(_) => return READDIR4res { status: nfsstat4::NFS4ERR_SERVERFAULT, ..Default::default() },
        };
        if used + encoded.len() >= budget {
            all_written = false;
            break;
        }
        used += encoded.len();
        reply.entries.push(wire_entry);
    }
    reply.eof = all_written && end;

    READDIR4res {
        status: nfsstat4::NFS4_OK,
        cookieverf: next_verifier.to_be_bytes(),
        reply,
    }
}

/// Lists the configured exports as the pseudo-root directory. Cookies
/// are entry indices offset past the reserved values 0..2.
fn readdir_pseudo_root(ctx: &CompoundContext<'_>, args: &READDIR4args) -> READDIR4res {
    let names = pseudo_root::entries(ctx.server());
    let start = if args.cookie < 3 { 0 } else { (args.cookie - 2) as usize };

    let mut reply = dirlist4::default();
    for (index, name) in names.iter().enumerate().skip(start) {
        let attr = pseudo_root::export_entry_attr(index as u64, vfs_mask_for(&args.attr_request));
        reply.entries.push(entry4 {
            cookie: index as u64 + 3,
            name: name.clone(),
            attrs: marshall_fattr4(&attr, &args.attr_request),
        });
    }
    reply.eof = true;

    READDIR4res { status: nfsstat4::NFS4_OK, cookieverf: [0; 8], reply }
}
