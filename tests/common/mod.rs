//! Shared test fixtures: an in-memory backend implementing the VFS
//! dispatch contract, plus helpers to assemble a server context around
//! it.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use chimera_nfs::config::ServerConfig;
use chimera_nfs::protocol::rpc::{Context, TransactionTracker, Transport};
use chimera_nfs::protocol::xdr::nfs4::type_bits;
use chimera_nfs::protocol::xdr::rpc::{auth_flavor, auth_unix};
use chimera_nfs::server::ServerContext;
use chimera_nfs::vfs::attr::mask::*;
use chimera_nfs::vfs::attr::{Attr, AttrTime};
use chimera_nfs::vfs::backend::{
    DirEntry, FindEntry, SeekWhence, VfsBackend, VfsCall, VfsReply, VfsRequest,
};
use chimera_nfs::vfs::open_flags::*;
use chimera_nfs::vfs::{FileHandle, VfsError, VfsResult};

/// Backend magic used by the memory filesystem in tests.
pub const MEMFS_MAGIC: u8 = 0x4d;

const ROOT_INO: u64 = 1;

#[derive(Clone)]
enum NodeKind {
    File { data: Vec<u8> },
    Dir { entries: BTreeMap<Vec<u8>, u64> },
    Symlink { target: Vec<u8> },
    Special,
}

#[derive(Clone)]
struct Node {
    ino: u64,
    kind: NodeKind,
    mode: u32,
    uid: u32,
    gid: u32,
    nlink: u32,
    rdev: u64,
    atime: AttrTime,
    mtime: AttrTime,
    ctime: AttrTime,
    exclusive_verifier: Option<[u8; 8]>,
}

impl Node {
    fn type_bits(&self) -> u32 {
        match self.kind {
            NodeKind::File { .. } => type_bits::S_IFREG,
            NodeKind::Dir { .. } => type_bits::S_IFDIR,
            NodeKind::Symlink { .. } => type_bits::S_IFLNK,
            NodeKind::Special => type_bits::S_IFIFO,
        }
    }

    fn size(&self) -> u64 {
        match &self.kind {
            NodeKind::File { data } => data.len() as u64,
            NodeKind::Dir { entries } => 512 + entries.len() as u64 * 32,
            NodeKind::Symlink { target } => target.len() as u64,
            NodeKind::Special => 0,
        }
    }
}

struct Inner {
    nodes: HashMap<u64, Node>,
    next_ino: u64,
    next_token: u64,
    opens: HashMap<u64, u64>,
    clock: i64,
}

impl Inner {
    fn tick(&mut self) -> AttrTime {
        self.clock += 1;
        AttrTime { sec: self.clock, nsec: 0 }
    }

    fn now(&self) -> AttrTime {
        AttrTime { sec: self.clock, nsec: 0 }
    }

    fn alloc_node(&mut self, kind: NodeKind, mode: u32) -> u64 {
        let ino = self.next_ino;
        self.next_ino += 1;
        let now = self.now();
        self.nodes.insert(
            ino,
            Node {
                ino,
                kind,
                mode,
                uid: 0,
                gid: 0,
                nlink: 1,
                rdev: 0,
                atime: now,
                mtime: now,
                ctime: now,
                exclusive_verifier: None,
            },
        );
        ino
    }

    fn resolve_token(&self, token: u64) -> VfsResult<u64> {
        self.opens.get(&token).copied().ok_or(VfsError::Stale)
    }

    fn dir_entries(&self, ino: u64) -> VfsResult<&BTreeMap<Vec<u8>, u64>> {
        match &self.nodes.get(&ino).ok_or(VfsError::Stale)?.kind {
            NodeKind::Dir { entries } => Ok(entries),
            _ => Err(VfsError::NotDir),
        }
    }

    fn lookup_name(&self, dir_ino: u64, name: &[u8]) -> VfsResult<u64> {
        if name == b"." {
            return Ok(dir_ino);
        }
        if name == b".." {
            // Flat parent tracking is enough for the tests; the root is
            // its own parent.
            for (ino, node) in &self.nodes {
                if let NodeKind::Dir { entries } = &node.kind {
                    if entries.values().any(|&child| child == dir_ino) {
                        return Ok(*ino);
                    }
                }
            }
            return Ok(ROOT_INO);
        }
        self.dir_entries(dir_ino)?.get(name).copied().ok_or(VfsError::NoEnt)
    }
}

/// In-memory filesystem backend. Counts backend open and close calls so
/// tests can assert the open-cache invariants.
pub struct MemFs {
    magic: u8,
    inner: Mutex<Inner>,
    pub open_calls: AtomicU32,
    pub close_calls: AtomicU32,
    /// When set, opens stall briefly, widening the window concurrent
    /// openers race in.
    pub slow_open: AtomicBool,
    /// When set, every open fails with EIO.
    pub fail_open: AtomicBool,
}

impl MemFs {
    pub fn new() -> MemFs {
        MemFs::with_magic(MEMFS_MAGIC)
    }

    pub fn with_magic(magic: u8) -> MemFs {
        let mut inner = Inner {
            nodes: HashMap::new(),
            next_ino: ROOT_INO,
            next_token: 1,
            opens: HashMap::new(),
            clock: 1_000,
        };
        let root = inner.alloc_node(NodeKind::Dir { entries: BTreeMap::new() }, 0o755);
        assert_eq!(root, ROOT_INO);
        if let Some(node) = inner.nodes.get_mut(&ROOT_INO) {
            node.nlink = 2;
        }
        MemFs {
            magic,
            inner: Mutex::new(inner),
            open_calls: AtomicU32::new(0),
            close_calls: AtomicU32::new(0),
            slow_open: AtomicBool::new(false),
            fail_open: AtomicBool::new(false),
        }
    }

    pub fn fh_of_ino(&self, ino: u64) -> FileHandle {
        FileHandle::with_magic(self.magic, &ino.to_le_bytes()).expect("memfs fh")
    }

    fn ino_of_fh(&self, fh: &FileHandle) -> VfsResult<u64> {
        let bytes = fh.as_bytes();
        if bytes.len() != 9 || bytes[0] != self.magic {
            return Err(VfsError::BadHandle);
        }
        Ok(u64::from_le_bytes(bytes[1..9].try_into().expect("memfs fh length")))
    }

    /// Builds a file under the root by path, creating directories along
    /// the way; test setup helper.
    pub fn populate_file(&self, path: &str, data: &[u8]) -> FileHandle {
        let mut inner = self.inner.lock().unwrap();
        let mut dir = ROOT_INO;
        let components: Vec<&str> = path.trim_matches('/').split('/').collect();
        for (i, component) in components.iter().enumerate() {
            let name = component.as_bytes().to_vec();
            let last = i + 1 == components.len();
            let existing = inner
                .dir_entries(dir)
                .ok()
                .and_then(|entries| entries.get(&name).copied());
            let ino = match existing {
                Some(ino) => ino,
                None => {
                    let kind = if last {
                        NodeKind::File { data: data.to_vec() }
                    } else {
                        NodeKind::Dir { entries: BTreeMap::new() }
                    };
                    let mode = if last { 0o644 } else { 0o755 };
                    let ino = inner.alloc_node(kind, mode);
                    if let NodeKind::Dir { entries } =
                        &mut inner.nodes.get_mut(&dir).unwrap().kind
                    {
                        entries.insert(name, ino);
                    }
                    ino
                }
            };
            dir = ino;
        }
        drop(inner);
        self.fh_of_ino(dir)
    }

    /// Creates a symlink under the root; test setup helper.
    pub fn populate_symlink(&self, name: &str, target: &str) -> FileHandle {
        let mut inner = self.inner.lock().unwrap();
        let ino =
            inner.alloc_node(NodeKind::Symlink { target: target.as_bytes().to_vec() }, 0o777);
        if let NodeKind::Dir { entries } = &mut inner.nodes.get_mut(&ROOT_INO).unwrap().kind {
            entries.insert(name.as_bytes().to_vec(), ino);
        }
        drop(inner);
        self.fh_of_ino(ino)
    }

    pub fn root_ino_fh(&self) -> FileHandle {
        self.fh_of_ino(ROOT_INO)
    }

    fn fill_attr(&self, inner: &Inner, ino: u64, req_mask: u64) -> VfsResult<Attr> {
        let node = inner.nodes.get(&ino).ok_or(VfsError::Stale)?;
        let mut attr = Attr::request(req_mask);
        attr.set_mask = ATTR_MASK_STAT | ATTR_FH | ATTR_INUM | ATTR_FSID | ATTR_MASK_STATFS;
        attr.fh = Some(self.fh_of_ino(ino));
        attr.dev = 7;
        attr.fsid = 7;
        attr.inum = node.ino;
        attr.mode = node.type_bits() | node.mode;
        attr.nlink = node.nlink;
        attr.uid = node.uid;
        attr.gid = node.gid;
        attr.rdev = node.rdev;
        attr.size = node.size();
        attr.space_used = node.size();
        attr.atime = node.atime;
        attr.mtime = node.mtime;
        attr.ctime = node.ctime;
        attr.fs_space_total = 1 << 30;
        attr.fs_space_free = 1 << 29;
        attr.fs_space_avail = 1 << 29;
        attr.fs_space_used = 1 << 29;
        attr.fs_files_total = 1 << 20;
        attr.fs_files_free = 1 << 19;
        attr.fs_files_avail = 1 << 19;
        Ok(attr)
    }

    fn wcc_attr(&self, inner: &Inner, ino: u64, atomic: bool) -> Attr {
        let mut attr = self.fill_attr(inner, ino, ATTR_MASK_WCC).unwrap_or_default();
        if atomic {
            attr.set_mask |= ATTR_ATOMIC;
        }
        attr
    }

    fn apply_set_attr(&self, inner: &mut Inner, ino: u64, set_attr: &Attr) -> VfsResult<()> {
        let now = inner.tick();
        let node = inner.nodes.get_mut(&ino).ok_or(VfsError::Stale)?;
        if set_attr.req_mask & ATTR_MODE != 0 {
            node.mode = set_attr.mode & 0o7777;
        }
        if set_attr.req_mask & ATTR_UID != 0 {
            node.uid = set_attr.uid;
        }
        if set_attr.req_mask & ATTR_GID != 0 {
            node.gid = set_attr.gid;
        }
        if set_attr.req_mask & ATTR_SIZE != 0 {
            match &mut node.kind {
                NodeKind::File { data } => data.resize(set_attr.size as usize, 0),
                _ => return Err(VfsError::IsDir),
            }
            node.mtime = now;
        }
        if set_attr.req_mask & ATTR_ATIME != 0 {
            node.atime = if set_attr.atime.is_now() { now } else { set_attr.atime };
        }
        if set_attr.req_mask & ATTR_MTIME != 0 {
            node.mtime = if set_attr.mtime.is_now() { now } else { set_attr.mtime };
        }
        node.ctime = now;
        Ok(())
    }

    fn create_entry(
        &self,
        inner: &mut Inner,
        dir_ino: u64,
        name: &[u8],
        kind: NodeKind,
        set_attr: &Attr,
    ) -> VfsResult<u64> {
        if inner.dir_entries(dir_ino)?.contains_key(name) {
            return Err(VfsError::Exist);
        }
        let mode =
            if set_attr.req_mask & ATTR_MODE != 0 { set_attr.mode & 0o7777 } else { 0o644 };
        let ino = inner.alloc_node(kind, mode);
        if set_attr.req_mask & ATTR_RDEV != 0 {
            inner.nodes.get_mut(&ino).unwrap().rdev = set_attr.rdev;
        }
        let now = inner.tick();
        if let NodeKind::Dir { entries } = &mut inner.nodes.get_mut(&dir_ino).unwrap().kind {
            entries.insert(name.to_vec(), ino);
        }
        let dir = inner.nodes.get_mut(&dir_ino).unwrap();
        dir.mtime = now;
        dir.ctime = now;
        Ok(ino)
    }
}

#[async_trait]
impl VfsBackend for MemFs {
    fn magic(&self) -> u8 {
        self.magic
    }

    fn root_fh(&self) -> FileHandle {
        self.fh_of_ino(ROOT_INO)
    }

    async fn dispatch(&self, request: VfsRequest) -> VfsResult<VfsReply> {
        match request.call {
            VfsCall::Open { flags } | VfsCall::OpenFh { flags } => {
                if self.fail_open.load(Ordering::SeqCst) {
                    return Err(VfsError::Io);
                }
                if self.slow_open.load(Ordering::SeqCst) {
                    tokio::time::sleep(Duration::from_millis(20)).await;
                }
                let ino = self.ino_of_fh(&request.fh)?;
                let mut inner = self.inner.lock().unwrap();
                let node = inner.nodes.get(&ino).ok_or(VfsError::Stale)?;
                if flags & OPEN_DIRECTORY != 0 && !matches!(node.kind, NodeKind::Dir { .. }) {
                    return Err(VfsError::NotDir);
                }
                let token = inner.next_token;
                inner.next_token += 1;
                inner.opens.insert(token, ino);
                self.open_calls.fetch_add(1, Ordering::SeqCst);
                Ok(VfsReply::OpenFh { handle: token })
            }
            VfsCall::Close { handle } => {
                let mut inner = self.inner.lock().unwrap();
                inner.opens.remove(&handle).ok_or(VfsError::Stale)?;
                self.close_calls.fetch_add(1, Ordering::SeqCst);
                Ok(VfsReply::Close)
            }
            VfsCall::Lookup { name, attr_mask, dir_attr_mask } => {
                let dir_ino = self.ino_of_fh(&request.fh)?;
                let inner = self.inner.lock().unwrap();
                let ino = inner.lookup_name(dir_ino, &name)?;
                Ok(VfsReply::Lookup {
                    attr: self.fill_attr(&inner, ino, attr_mask)?,
                    dir_attr: self.fill_attr(&inner, dir_ino, dir_attr_mask)?,
                })
            }
            VfsCall::LookupAt { handle, name, attr_mask, dir_attr_mask } => {
                let inner = self.inner.lock().unwrap();
                let dir_ino = inner.resolve_token(handle)?;
                let ino = inner.lookup_name(dir_ino, &name)?;
                Ok(VfsReply::LookupAt {
                    attr: self.fill_attr(&inner, ino, attr_mask)?,
                    dir_attr: self.fill_attr(&inner, dir_ino, dir_attr_mask)?,
                })
            }
            VfsCall::OpenAt { handle, name, flags, set_attr, attr_mask, verifier, .. } => {
                let mut inner = self.inner.lock().unwrap();
                let dir_ino = inner.resolve_token(handle)?;
                let pre = self.wcc_attr(&inner, dir_ino, true);

                let existing = inner.dir_entries(dir_ino)?.get(name.as_slice()).copied();
                let ino = match existing {
                    Some(ino) => {
                        if flags & OPEN_CREATE != 0 && flags & OPEN_EXCLUSIVE != 0 {
                            // A replayed exclusive create with the same
                            // verifier is idempotent success.
                            let same_verifier = verifier.is_some()
                                && inner.nodes.get(&ino).and_then(|n| n.exclusive_verifier)
                                    == verifier;
                            if !same_verifier {
                                return Err(VfsError::Exist);
                            }
                        }
                        ino
                    }
                    None => {
                        if flags & OPEN_CREATE == 0 {
                            return Err(VfsError::NoEnt);
                        }
                        let ino = self.create_entry(
                            &mut inner,
                            dir_ino,
                            &name,
                            NodeKind::File { data: Vec::new() },
                            &set_attr,
                        )?;
                        inner.nodes.get_mut(&ino).unwrap().exclusive_verifier = verifier;
                        ino
                    }
                };

                let token = inner.next_token;
                inner.next_token += 1;
                inner.opens.insert(token, ino);
                self.open_calls.fetch_add(1, Ordering::SeqCst);

                let post = self.wcc_attr(&inner, dir_ino, true);
                Ok(VfsReply::OpenAt {
                    handle: token,
                    attr: self.fill_attr(&inner, ino, attr_mask)?,
                    dir_pre_attr: pre,
                    dir_post_attr: post,
                })
            }
            VfsCall::Read { handle, offset, count, attr_mask } => {
                let inner = self.inner.lock().unwrap();
                let ino = inner.resolve_token(handle)?;
                let node = inner.nodes.get(&ino).ok_or(VfsError::Stale)?;
                let data = match &node.kind {
                    NodeKind::File { data } => data,
                    NodeKind::Dir { .. } => return Err(VfsError::IsDir),
                    _ => return Err(VfsError::Inval),
                };
                let start = (offset as usize).min(data.len());
                let end = (start + count as usize).min(data.len());
                Ok(VfsReply::Read {
                    data: data[start..end].to_vec(),
                    eof: end == data.len(),
                    attr: self.fill_attr(&inner, ino, attr_mask)?,
                })
            }
            VfsCall::Write { handle, offset, data, stable, .. } => {
                let mut inner = self.inner.lock().unwrap();
                let ino = inner.resolve_token(handle)?;
                let pre = self.wcc_attr(&inner, ino, true);
                let now = inner.tick();
                let node = inner.nodes.get_mut(&ino).ok_or(VfsError::Stale)?;
                let file = match &mut node.kind {
                    NodeKind::File { data } => data,
                    NodeKind::Dir { .. } => return Err(VfsError::IsDir),
                    _ => return Err(VfsError::Inval),
                };
                let end = offset as usize + data.len();
                if file.len() < end {
                    file.resize(end, 0);
                }
                file[offset as usize..end].copy_from_slice(&data);
                node.mtime = now;
                node.ctime = now;
                let count = data.len() as u32;
                let post = self.wcc_attr(&inner, ino, true);
                Ok(VfsReply::Write { count, stable, pre_attr: pre, post_attr: post })
            }
            VfsCall::Commit { handle, attr_mask, .. } => {
                let inner = self.inner.lock().unwrap();
                let ino = inner.resolve_token(handle)?;
                Ok(VfsReply::Commit { attr: self.fill_attr(&inner, ino, attr_mask)? })
            }
            VfsCall::GetAttr { handle, attr_mask } => {
                let inner = self.inner.lock().unwrap();
                let ino = inner.resolve_token(handle)?;
                Ok(VfsReply::GetAttr { attr: self.fill_attr(&inner, ino, attr_mask)? })
            }
            VfsCall::SetAttr { handle, set_attr, .. } => {
                let mut inner = self.inner.lock().unwrap();
                let ino = inner.resolve_token(handle)?;
                let pre = self.wcc_attr(&inner, ino, true);
                self.apply_set_attr(&mut inner, ino, &set_attr)?;
                let post = self.wcc_attr(&inner, ino, true);
                Ok(VfsReply::SetAttr { pre_attr: pre, post_attr: post })
            }
            VfsCall::Mkdir { handle, name, set_attr, attr_mask, .. } => {
                let mut inner = self.inner.lock().unwrap();
                let dir_ino = inner.resolve_token(handle)?;
                let pre = self.wcc_attr(&inner, dir_ino, true);
                let ino = self.create_entry(
                    &mut inner,
                    dir_ino,
                    &name,
                    NodeKind::Dir { entries: BTreeMap::new() },
                    &set_attr,
                )?;
                inner.nodes.get_mut(&ino).unwrap().nlink = 2;
                let post = self.wcc_attr(&inner, dir_ino, true);
                Ok(VfsReply::Mkdir {
                    attr: self.fill_attr(&inner, ino, attr_mask)?,
                    dir_pre_attr: pre,
                    dir_post_attr: post,
                })
            }
            VfsCall::Mknod { handle, name, set_attr, attr_mask, .. } => {
                let mut inner = self.inner.lock().unwrap();
                let dir_ino = inner.resolve_token(handle)?;
                let pre = self.wcc_attr(&inner, dir_ino, true);
                let ino =
                    self.create_entry(&mut inner, dir_ino, &name, NodeKind::Special, &set_attr)?;
                let post = self.wcc_attr(&inner, dir_ino, true);
                Ok(VfsReply::Mknod {
                    attr: self.fill_attr(&inner, ino, attr_mask)?,
                    dir_pre_attr: pre,
                    dir_post_attr: post,
                })
            }
            VfsCall::Symlink { handle, name, target, set_attr, attr_mask, .. } => {
                let mut inner = self.inner.lock().unwrap();
                let dir_ino = inner.resolve_token(handle)?;
                let pre = self.wcc_attr(&inner, dir_ino, true);
                let ino = self.create_entry(
                    &mut inner,
                    dir_ino,
                    &name,
                    NodeKind::Symlink { target },
                    &set_attr,
                )?;
                let post = self.wcc_attr(&inner, dir_ino, true);
                Ok(VfsReply::Symlink {
                    attr: self.fill_attr(&inner, ino, attr_mask)?,
                    dir_pre_attr: pre,
                    dir_post_attr: post,
                })
            }
            VfsCall::ReadLink { handle } => {
                let inner = self.inner.lock().unwrap();
                let ino = inner.resolve_token(handle)?;
                match &inner.nodes.get(&ino).ok_or(VfsError::Stale)?.kind {
                    NodeKind::Symlink { target } => {
                        Ok(VfsReply::ReadLink { target: target.clone() })
                    }
                    _ => Err(VfsError::Inval),
                }
            }
            VfsCall::RemoveAt { handle, name, .. } => {
                let mut inner = self.inner.lock().unwrap();
                let dir_ino = inner.resolve_token(handle)?;
                let pre = self.wcc_attr(&inner, dir_ino, true);
                let target = inner.lookup_name(dir_ino, &name)?;
                if let NodeKind::Dir { entries } =
                    &inner.nodes.get(&target).ok_or(VfsError::Stale)?.kind
                {
                    if !entries.is_empty() {
                        return Err(VfsError::NotEmpty);
                    }
                }
                let now = inner.tick();
                if let NodeKind::Dir { entries } =
                    &mut inner.nodes.get_mut(&dir_ino).unwrap().kind
                {
                    entries.remove(name.as_slice());
                }
                {
                    let dir = inner.nodes.get_mut(&dir_ino).unwrap();
                    dir.mtime = now;
                    dir.ctime = now;
                }
                let remaining_links = {
                    let target_node = inner.nodes.get_mut(&target).unwrap();
                    target_node.nlink = target_node.nlink.saturating_sub(1);
                    target_node.nlink
                };
                if remaining_links == 0 {
                    inner.nodes.remove(&target);
                }
                let post = self.wcc_attr(&inner, dir_ino, true);
                Ok(VfsReply::RemoveAt { dir_pre_attr: pre, dir_post_attr: post })
            }
            VfsCall::RenameAt { handle, old_name, new_dir, new_name, .. } => {
                let mut inner = self.inner.lock().unwrap();
                let from_ino = inner.resolve_token(handle)?;
                let to_ino = self.ino_of_fh(&new_dir)?;
                let from_pre = self.wcc_attr(&inner, from_ino, true);
                let to_pre = self.wcc_attr(&inner, to_ino, true);
                let moved = inner.lookup_name(from_ino, &old_name)?;
                let now = inner.tick();
                if let NodeKind::Dir { entries } =
                    &mut inner.nodes.get_mut(&from_ino).unwrap().kind
                {
                    entries.remove(old_name.as_slice());
                }
                if let NodeKind::Dir { entries } =
                    &mut inner.nodes.get_mut(&to_ino).unwrap().kind
                {
                    entries.insert(new_name, moved);
                }
                for ino in [from_ino, to_ino] {
                    let dir = inner.nodes.get_mut(&ino).unwrap();
                    dir.mtime = now;
                    dir.ctime = now;
                }
                let from_post = self.wcc_attr(&inner, from_ino, true);
                let to_post = self.wcc_attr(&inner, to_ino, true);
                Ok(VfsReply::RenameAt {
                    from_pre,
                    from_post,
                    to_pre,
                    to_post,
                })
            }
            VfsCall::LinkAt { handle, dir, name, attr_mask, .. } => {
                let mut inner = self.inner.lock().unwrap();
                let source = inner.resolve_token(handle)?;
                let dir_ino = self.ino_of_fh(&dir)?;
                let pre = self.wcc_attr(&inner, dir_ino, true);
                if inner.dir_entries(dir_ino)?.contains_key(name.as_slice()) {
                    return Err(VfsError::Exist);
                }
                let now = inner.tick();
                if let NodeKind::Dir { entries } =
                    &mut inner.nodes.get_mut(&dir_ino).unwrap().kind
                {
                    entries.insert(name, source);
                }
                {
                    let dir_node = inner.nodes.get_mut(&dir_ino).unwrap();
                    dir_node.mtime = now;
                    dir_node.ctime = now;
                }
                let node = inner.nodes.get_mut(&source).ok_or(VfsError::Stale)?;
                node.nlink += 1;
                node.ctime = now;
                let post = self.wcc_attr(&inner, dir_ino, true);
                Ok(VfsReply::LinkAt {
                    attr: self.fill_attr(&inner, source, attr_mask)?,
                    dir_pre_attr: pre,
                    dir_post_attr: post,
                })
            }
            VfsCall::ReadDir { handle, cookie, max_entries, attr_mask, dir_attr_mask, .. } => {
                let inner = self.inner.lock().unwrap();
                let dir_ino = inner.resolve_token(handle)?;
                let entries = inner.dir_entries(dir_ino)?;
                let mut out = Vec::new();
                let mut eof = true;
                for (index, (name, &ino)) in entries.iter().enumerate() {
                    let entry_cookie = index as u64 + 1;
                    if entry_cookie <= cookie {
                        continue;
                    }
                    if out.len() as u32 >= max_entries {
                        eof = false;
                        break;
                    }
                    out.push(DirEntry {
                        cookie: entry_cookie,
                        name: name.clone(),
                        inum: ino,
                        attr: self.fill_attr(&inner, ino, attr_mask)?,
                    });
                }
                let dir_node = inner.nodes.get(&dir_ino).ok_or(VfsError::Stale)?;
                let verifier = dir_node.mtime.sec as u64;
                Ok(VfsReply::ReadDir {
                    entries: out,
                    eof,
                    verifier,
                    dir_attr: self.fill_attr(&inner, dir_ino, dir_attr_mask)?,
                })
            }
            VfsCall::Access { handle, access, attr_mask } => {
                let inner = self.inner.lock().unwrap();
                let ino = inner.resolve_token(handle)?;
                let node = inner.nodes.get(&ino).ok_or(VfsError::Stale)?;
                // Owner/group/other read-write-execute evaluation against
                // the call credentials.
                let cred = &request.cred;
                let shift = if cred.is_superuser() || cred.uid == node.uid {
                    6
                } else if cred.in_group(node.gid) {
                    3
                } else {
                    0
                };
                let rwx = (node.mode >> shift) & 0o7;
                let mut granted = 0;
                if rwx & 0o4 != 0 {
                    granted |= 0x0001 | 0x0002; // READ, LOOKUP
                }
                if rwx & 0o2 != 0 {
                    granted |= 0x0004 | 0x0008 | 0x0010; // MODIFY, EXTEND, DELETE
                }
                if rwx & 0o1 != 0 {
                    granted |= 0x0020; // EXECUTE
                }
                Ok(VfsReply::Access {
                    access: access & granted,
                    attr: self.fill_attr(&inner, ino, attr_mask)?,
                })
            }
            VfsCall::Allocate { handle, offset, length, punch_hole } => {
                let mut inner = self.inner.lock().unwrap();
                let ino = inner.resolve_token(handle)?;
                let now = inner.tick();
                let node = inner.nodes.get_mut(&ino).ok_or(VfsError::Stale)?;
                let file = match &mut node.kind {
                    NodeKind::File { data } => data,
                    _ => return Err(VfsError::Inval),
                };
                let end = (offset + length) as usize;
                if punch_hole {
                    let zero_end = end.min(file.len());
                    for byte in &mut file[(offset as usize).min(zero_end)..zero_end] {
                        *byte = 0;
                    }
                } else if file.len() < end {
                    file.resize(end, 0);
                }
                node.mtime = now;
                node.ctime = now;
                Ok(VfsReply::Allocate)
            }
            VfsCall::Seek { handle, offset, whence } => {
                let inner = self.inner.lock().unwrap();
                let ino = inner.resolve_token(handle)?;
                let node = inner.nodes.get(&ino).ok_or(VfsError::Stale)?;
                let len = match &node.kind {
                    NodeKind::File { data } => data.len() as u64,
                    _ => return Err(VfsError::Inval),
                };
                if offset >= len {
                    return Err(VfsError::NxIo);
                }
                // The memory file is a single data extent; the next hole
                // is end-of-file.
                match whence {
                    SeekWhence::Data => Ok(VfsReply::Seek { offset, eof: false }),
                    SeekWhence::Hole => Ok(VfsReply::Seek { offset: len, eof: true }),
                }
            }
            VfsCall::Find { attr_mask, max_entries } => {
                let root_ino = self.ino_of_fh(&request.fh)?;
                let inner = self.inner.lock().unwrap();
                let mut out = Vec::new();
                let mut stack = vec![(root_ino, Vec::new())];
                let mut truncated = false;
                while let Some((ino, prefix)) = stack.pop() {
                    if let Ok(entries) = inner.dir_entries(ino) {
                        for (name, &child) in entries {
                            if out.len() as u32 >= max_entries {
                                truncated = true;
                                break;
                            }
                            let mut path = prefix.clone();
                            if !path.is_empty() {
                                path.push(b'/');
                            }
                            path.extend_from_slice(name);
                            out.push(FindEntry {
                                path: path.clone(),
                                attr: self.fill_attr(&inner, child, attr_mask)?,
                            });
                            stack.push((child, path));
                        }
                    }
                }
                Ok(VfsReply::Find { entries: out, truncated })
            }
        }
    }
}

/// Installs the log subscriber once per test binary.
fn init_tracing() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

/// Builds a server context exporting `share` from a fresh memory
/// filesystem.
pub fn memfs_server() -> (Arc<MemFs>, Arc<ServerContext>) {
    init_tracing();
    let memfs = Arc::new(MemFs::new());
    let server = Arc::new(ServerContext::new(
        ServerConfig::default(),
        vec![("share".to_string(), memfs.clone() as Arc<dyn VfsBackend>)],
    ));
    (memfs, server)
}

/// Builds an RPC context around a server, standing in for a connection.
pub fn test_context(server: Arc<ServerContext>) -> Context {
    Context {
        local_port: 2049,
        local_addr: "127.0.0.1:2049".to_string(),
        client_addr: "127.0.0.1:54321".to_string(),
        auth_flavor: auth_flavor::AUTH_UNIX,
        auth: auth_unix { stamp: 0, machinename: b"test".to_vec(), uid: 0, gid: 0, gids: vec![] },
        server,
        transaction_tracker: Arc::new(TransactionTracker::new(Duration::from_secs(60))),
        conn_session: Arc::new(Mutex::new(None)),
        transport: Transport::Tcp,
    }
}
