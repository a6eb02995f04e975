//! The NFSv4 pseudo-root filesystem.
//!
//! NFSv4 has no MOUNT protocol; clients start from PUTROOTFH and walk
//! into an export. The root is a virtual directory listing the
//! configured exports, identified by a reserved 21-byte literal handle
//! whose leading byte doubles as the reserved pseudo-FS magic.

use crate::protocol::xdr::nfs4::type_bits;
use crate::server::ServerContext;
use crate::vfs::attr::mask::{ATTR_MASK_STAT, ATTR_MODE};
use crate::vfs::attr::{Attr, AttrTime};
use crate::vfs::FileHandle;

/// The pseudo-root file handle literal (21 bytes including the trailing
/// NUL).
pub const ROOT_FH: &[u8; 21] = b"CHIMERA NFS4 ROOT FH\0";

/// Inode number reported for the pseudo-root directory.
const ROOT_INUM: u64 = 2;

/// True when the handle bytes name the pseudo-root.
pub fn is_pseudo_root(fh: &[u8]) -> bool {
    fh == ROOT_FH
}

/// Synthesized attributes of the pseudo-root directory.
pub fn root_attr(server: &ServerContext, req_mask: u64) -> Attr {
    let export_count = server.exports().names().len() as u32;
    let mut attr = Attr::request(req_mask);
    attr.set_mask = ATTR_MASK_STAT;
    attr.mode = type_bits::S_IFDIR | 0o555;
    attr.nlink = 2 + export_count;
    attr.uid = 0;
    attr.gid = 0;
    attr.size = 4096;
    attr.space_used = 4096;
    attr.inum = ROOT_INUM;
    attr.dev = 0;
    attr.atime = AttrTime::default();
    attr.mtime = AttrTime::default();
    attr.ctime = AttrTime::default();
    attr
}

/// Synthesized attributes of one export entry in the pseudo-root
/// listing.
pub fn export_entry_attr(index: u64, req_mask: u64) -> Attr {
    let mut attr = Attr::request(req_mask);
    attr.set_mask = ATTR_MASK_STAT;
    attr.mode = type_bits::S_IFDIR | 0o755;
    attr.nlink = 2;
    attr.size = 4096;
    attr.space_used = 4096;
    attr.inum = ROOT_INUM + 1 + index;
    attr
}

/// Resolves an export name under the pseudo-root to the export's
/// backend root handle.
pub fn lookup(server: &ServerContext, name: &[u8]) -> Option<FileHandle> {
    server.exports().resolve_component(name)
}

/// The pseudo-root directory listing: export names without their
/// leading slash, in configuration order.
pub fn entries(server: &ServerContext) -> Vec<Vec<u8>> {
    server
        .exports()
        .names()
        .into_iter()
        .map(|name| name.strip_prefix(b"/".as_slice()).map(|n| n.to_vec()).unwrap_or(name))
        .collect()
}
