//! The backend dispatch contract.
//!
//! Each storage backend implements a single asynchronous entry point
//! accepting a [`VfsRequest`] whose [`VfsCall`] discriminates the
//! operation. The backend fills the matching [`VfsReply`] arm; a reply
//! from the wrong arm is an internal fault, caught by the router's typed
//! wrappers.
//!
//! Attribute masks are honored cooperatively: the backend fills the bits
//! the caller requested (it may fill more when they are cheap) and reports
//! what it populated through `set_mask`.

use async_trait::async_trait;

use super::attr::Attr;
use super::{Cred, FileHandle, VfsResult};

/// Per-module capability bits.
pub mod caps {
    /// The backend performs blocking work and dispatches it to a blocking
    /// pool internally; callers may not assume sub-millisecond dispatch.
    pub const CAP_BLOCKING: u32 = 0x0001;
    /// The backend resolves multi-component relative paths itself; the
    /// resolver hands it whole paths instead of walking components.
    pub const CAP_FS_PATH_OP: u32 = 0x0002;
}

/// Backend-private open-handle token.
///
/// The value is opaque to everything above the backend; the open-handle
/// cache stores it and hands it back on every handle-based call until the
/// matching `Close`.
pub type OpenToken = u64;

/// Operation codes; one per [`VfsCall`] variant.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum VfsOpcode {
    Lookup,
    LookupAt,
    Open,
    OpenAt,
    OpenFh,
    Close,
    Read,
    Write,
    Commit,
    GetAttr,
    SetAttr,
    Mkdir,
    Mknod,
    Symlink,
    ReadLink,
    RemoveAt,
    RenameAt,
    LinkAt,
    ReadDir,
    Access,
    Allocate,
    Seek,
    Find,
}

/// Whence discriminator for `Seek`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SeekWhence {
    /// Find the next data region at or after the offset
    Data,
    /// Find the next hole at or after the offset
    Hole,
}

/// One directory entry produced by `ReadDir`.
#[derive(Debug, Clone, Default)]
pub struct DirEntry {
    /// Cookie that resumes iteration after this entry
    pub cookie: u64,
    /// Entry name (single component)
    pub name: Vec<u8>,
    /// Inode number
    pub inum: u64,
    /// Entry attributes, filled per the call's attr_mask
    pub attr: Attr,
}

/// One match produced by `Find`.
#[derive(Debug, Clone, Default)]
pub struct FindEntry {
    /// Path relative to the starting object
    pub path: Vec<u8>,
    /// Entry attributes, filled per the call's attr_mask
    pub attr: Attr,
}

/// The opcode-tagged argument union: one variant per backend operation.
///
/// Handle-based variants carry the backend's [`OpenToken`]; name-based
/// variants operate under an open directory handle. For a backend with
/// `CAP_FS_PATH_OP`, `LookupAt` and `OpenAt` names may be whole relative
/// paths rather than single components.
#[derive(Debug, Clone)]
pub enum VfsCall {
    /// Resolve a single name under the request FH without an open handle.
    Lookup { name: Vec<u8>, attr_mask: u64, dir_attr_mask: u64 },
    /// Resolve a name under an open directory handle.
    LookupAt { handle: OpenToken, name: Vec<u8>, attr_mask: u64, dir_attr_mask: u64 },
    /// Open the request FH.
    Open { flags: u32 },
    /// Open (and possibly create) a name under an open directory handle.
    OpenAt {
        handle: OpenToken,
        name: Vec<u8>,
        flags: u32,
        set_attr: Attr,
        attr_mask: u64,
        dir_pre_attr_mask: u64,
        dir_post_attr_mask: u64,
        /// Exclusive-create verifier when the open is CREATE|EXCLUSIVE
        verifier: Option<[u8; 8]>,
    },
    /// Open the request FH on behalf of the open-handle cache.
    OpenFh { flags: u32 },
    /// Release a backend open handle.
    Close { handle: OpenToken },
    /// Read data through an open handle.
    Read { handle: OpenToken, offset: u64, count: u32, attr_mask: u64 },
    /// Write data through an open handle.
    Write {
        handle: OpenToken,
        offset: u64,
        data: Vec<u8>,
        /// Require the data to be stable before completion
        stable: bool,
        pre_attr_mask: u64,
        post_attr_mask: u64,
    },
    /// Flush previously written data to stable storage.
    Commit { handle: OpenToken, offset: u64, count: u32, attr_mask: u64 },
    /// Fetch attributes through an open handle.
    GetAttr { handle: OpenToken, attr_mask: u64 },
    /// Mutate attributes through an open handle. `set_attr.req_mask`
    /// names the members to change.
    SetAttr { handle: OpenToken, set_attr: Attr, pre_attr_mask: u64, post_attr_mask: u64 },
    /// Create a directory under an open directory handle.
    Mkdir {
        handle: OpenToken,
        name: Vec<u8>,
        set_attr: Attr,
        attr_mask: u64,
        dir_pre_attr_mask: u64,
        dir_post_attr_mask: u64,
    },
    /// Create a special node under an open directory handle; the node
    /// type and device numbers ride in `set_attr` (mode type bits, rdev).
    Mknod {
        handle: OpenToken,
        name: Vec<u8>,
        set_attr: Attr,
        attr_mask: u64,
        dir_pre_attr_mask: u64,
        dir_post_attr_mask: u64,
    },
    /// Create a symlink under an open directory handle.
    Symlink {
        handle: OpenToken,
        name: Vec<u8>,
        target: Vec<u8>,
        set_attr: Attr,
        attr_mask: u64,
        dir_pre_attr_mask: u64,
        dir_post_attr_mask: u64,
    },
    /// Read a symlink's target through an open handle.
    ReadLink { handle: OpenToken },
    /// Remove a name under an open directory handle.
    RemoveAt { handle: OpenToken, name: Vec<u8>, dir_pre_attr_mask: u64, dir_post_attr_mask: u64 },
    /// Rename within the backend; the destination directory is named by
    /// FH since it need not be open.
    RenameAt {
        handle: OpenToken,
        old_name: Vec<u8>,
        new_dir: FileHandle,
        new_name: Vec<u8>,
        dir_pre_attr_mask: u64,
        dir_post_attr_mask: u64,
    },
    /// Hard-link the object behind `handle` into the directory named by
    /// `dir`.
    LinkAt {
        handle: OpenToken,
        dir: FileHandle,
        name: Vec<u8>,
        attr_mask: u64,
        dir_pre_attr_mask: u64,
        dir_post_attr_mask: u64,
    },
    /// Iterate a directory from a cookie.
    ReadDir {
        handle: OpenToken,
        cookie: u64,
        verifier: u64,
        max_entries: u32,
        attr_mask: u64,
        dir_attr_mask: u64,
    },
    /// Evaluate access rights against the call credentials.
    Access { handle: OpenToken, access: u32, attr_mask: u64 },
    /// Preallocate or punch a hole in a byte range.
    Allocate { handle: OpenToken, offset: u64, length: u64, punch_hole: bool },
    /// Locate the next data region or hole.
    Seek { handle: OpenToken, offset: u64, whence: SeekWhence },
    /// Enumerate the subtree below the request FH.
    Find { attr_mask: u64, max_entries: u32 },
}

impl VfsCall {
    /// The opcode tag of this call.
    pub fn opcode(&self) -> VfsOpcode {
        match self {
            VfsCall::Lookup { .. } => VfsOpcode::Lookup,
            VfsCall::LookupAt { .. } => VfsOpcode::LookupAt,
            VfsCall::Open { .. } => VfsOpcode::Open,
            VfsCall::OpenAt { .. } => VfsOpcode::OpenAt,
            VfsCall::OpenFh { .. } => VfsOpcode::OpenFh,
            VfsCall::Close { .. } => VfsOpcode::Close,
            VfsCall::Read { .. } => VfsOpcode::Read,
            VfsCall::Write { .. } => VfsOpcode::Write,
            VfsCall::Commit { .. } => VfsOpcode::Commit,
            VfsCall::GetAttr { .. } => VfsOpcode::GetAttr,
            VfsCall::SetAttr { .. } => VfsOpcode::SetAttr,
            VfsCall::Mkdir { .. } => VfsOpcode::Mkdir,
            VfsCall::Mknod { .. } => VfsOpcode::Mknod,
            VfsCall::Symlink { .. } => VfsOpcode::Symlink,
            VfsCall::ReadLink { .. } => VfsOpcode::ReadLink,
            VfsCall::RemoveAt { .. } => VfsOpcode::RemoveAt,
            VfsCall::RenameAt { .. } => VfsOpcode::RenameAt,
            VfsCall::LinkAt { .. } => VfsOpcode::LinkAt,
            VfsCall::ReadDir { .. } => VfsOpcode::ReadDir,
            VfsCall::Access { .. } => VfsOpcode::Access,
            VfsCall::Allocate { .. } => VfsOpcode::Allocate,
            VfsCall::Seek { .. } => VfsOpcode::Seek,
            VfsCall::Find { .. } => VfsOpcode::Find,
        }
    }
}

/// The result union: one variant per opcode, mirrored from [`VfsCall`].
#[derive(Debug, Clone)]
pub enum VfsReply {
    Lookup { attr: Attr, dir_attr: Attr },
    LookupAt { attr: Attr, dir_attr: Attr },
    Open { handle: OpenToken },
    OpenAt { handle: OpenToken, attr: Attr, dir_pre_attr: Attr, dir_post_attr: Attr },
    OpenFh { handle: OpenToken },
    Close,
    Read { data: Vec<u8>, eof: bool, attr: Attr },
    Write { count: u32, stable: bool, pre_attr: Attr, post_attr: Attr },
    Commit { attr: Attr },
    GetAttr { attr: Attr },
    SetAttr { pre_attr: Attr, post_attr: Attr },
    Mkdir { attr: Attr, dir_pre_attr: Attr, dir_post_attr: Attr },
    Mknod { attr: Attr, dir_pre_attr: Attr, dir_post_attr: Attr },
    Symlink { attr: Attr, dir_pre_attr: Attr, dir_post_attr: Attr },
    ReadLink { target: Vec<u8> },
    RemoveAt { dir_pre_attr: Attr, dir_post_attr: Attr },
    RenameAt { from_pre: Attr, from_post: Attr, to_pre: Attr, to_post: Attr },
    LinkAt { attr: Attr, dir_pre_attr: Attr, dir_post_attr: Attr },
    ReadDir { entries: Vec<DirEntry>, eof: bool, verifier: u64, dir_attr: Attr },
    Access { access: u32, attr: Attr },
    Allocate,
    Seek { offset: u64, eof: bool },
    Find { entries: Vec<FindEntry>, truncated: bool },
}

/// One dispatched backend operation: credentials, target FH and the call.
#[derive(Debug, Clone)]
pub struct VfsRequest {
    /// Caller identity
    pub cred: Cred,
    /// Target object (the FH whose magic routed here)
    pub fh: FileHandle,
    /// The operation and its arguments
    pub call: VfsCall,
}

/// The contract a storage backend implements.
///
/// The single `dispatch` entry matches on the call tag; every completed
/// operation either returns the matching [`VfsReply`] arm or a
/// [`VfsError`](super::VfsError) from the closed taxonomy.
#[async_trait]
pub trait VfsBackend: Send + Sync {
    /// The FH magic byte this module owns.
    fn magic(&self) -> u8;

    /// Capability bits (see [`caps`]).
    fn capabilities(&self) -> u32 {
        0
    }

    /// The root file handle of this backend's store.
    fn root_fh(&self) -> FileHandle;

    /// Executes one operation.
    async fn dispatch(&self, request: VfsRequest) -> VfsResult<VfsReply>;
}
