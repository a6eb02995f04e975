//! The VFS router: backend registry, open-handle management and typed
//! per-operation wrappers.
//!
//! A file handle's first byte names the backend module that owns the
//! object; the router resolves it, funnels cache-eligible opens through
//! the open-handle caches and exposes one typed method per operation so
//! protocol handlers never unpack [`VfsReply`] arms themselves. A reply
//! from the wrong arm is reported as [`VfsError::Fault`].

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{trace, warn};

use super::attr::Attr;
use super::backend::{
    DirEntry, FindEntry, OpenToken, SeekWhence, VfsBackend, VfsCall, VfsReply, VfsRequest,
};
use super::open_cache::{deferred_close, CacheKind, OpenCache, OpenHandle};
use super::open_flags::{OPEN_INFERRED, OPEN_PATH};
use super::{Cred, FileHandle, VfsError, VfsResult};

/// Routes operations to backend modules by FH magic and owns the two
/// open-handle caches.
pub struct VfsRouter {
    backends: HashMap<u8, Arc<dyn VfsBackend>>,
    path_cache: Arc<OpenCache>,
    file_cache: Arc<OpenCache>,
}

impl Default for VfsRouter {
    fn default() -> VfsRouter {
        VfsRouter::new()
    }
}

impl VfsRouter {
    /// Creates a router with no registered backends.
    pub fn new() -> VfsRouter {
        VfsRouter {
            backends: HashMap::new(),
            path_cache: Arc::new(OpenCache::new(CacheKind::Path)),
            file_cache: Arc::new(OpenCache::new(CacheKind::File)),
        }
    }

    /// Registers a backend under its magic byte. Registering two modules
    /// with the same magic is a wiring bug.
    pub fn register(&mut self, backend: Arc<dyn VfsBackend>) {
        let magic = backend.magic();
        let previous = self.backends.insert(magic, backend);
        assert!(previous.is_none(), "duplicate backend magic {magic:#x}");
    }

    /// Resolves the backend module owning `fh`.
    pub fn backend_for(&self, fh: &FileHandle) -> VfsResult<Arc<dyn VfsBackend>> {
        match self.backends.get(&fh.magic()) {
            Some(backend) => Ok(backend.clone()),
            None => {
                warn!("no backend for fh magic {:#x}", fh.magic());
                Err(VfsError::BadHandle)
            }
        }
    }

    /// Capability bits of the backend owning `fh`, or zero when the magic
    /// is unknown.
    pub fn capabilities_for(&self, fh: &FileHandle) -> u32 {
        self.backends.get(&fh.magic()).map(|b| b.capabilities()).unwrap_or(0)
    }

    /// The path-handle cache (metadata-only opens).
    pub fn path_cache(&self) -> &Arc<OpenCache> {
        &self.path_cache
    }

    /// The file-handle cache (data-capable opens).
    pub fn file_cache(&self) -> &Arc<OpenCache> {
        &self.file_cache
    }

    /// Opens `fh`, consulting the open-handle caches when the flags allow
    /// it. Every success must be balanced by [`VfsRouter::release`].
    pub async fn open_fh(
        &self,
        cred: &Cred,
        fh: &FileHandle,
        flags: u32,
    ) -> VfsResult<Arc<OpenHandle>> {
        let backend = self.backend_for(fh)?;
        if flags & OPEN_INFERRED != 0 {
            let cache =
                if flags & OPEN_PATH != 0 { &self.path_cache } else { &self.file_cache };
            return cache.open(backend, cred, fh, flags).await;
        }

        // Synthetic handle: per-request, never shared.
        let request =
            VfsRequest { cred: cred.clone(), fh: fh.clone(), call: VfsCall::Open { flags } };
        match backend.dispatch(request).await? {
            VfsReply::Open { handle } | VfsReply::OpenFh { handle } => Ok(Arc::new(OpenHandle {
                fh: fh.clone(),
                backend,
                token: handle,
                cache: CacheKind::Synthetic,
            })),
            _ => Err(VfsError::Fault),
        }
    }

    /// Releases a handle obtained from [`VfsRouter::open_fh`] or from an
    /// `open_at` wrapper.
    pub fn release(&self, handle: &Arc<OpenHandle>) {
        match handle.cache {
            CacheKind::Synthetic => deferred_close(handle.clone()),
            CacheKind::Path => self.path_cache.release(handle),
            CacheKind::File => self.file_cache.release(handle),
        }
    }

    /// Wraps a freshly produced backend token from `open_at` into a
    /// synthetic handle (create-style opens are per-caller by nature).
    fn synthetic_handle(
        &self,
        backend: Arc<dyn VfsBackend>,
        fh: FileHandle,
        token: OpenToken,
    ) -> Arc<OpenHandle> {
        Arc::new(OpenHandle { fh, backend, token, cache: CacheKind::Synthetic })
    }

    async fn dispatch_handle(
        &self,
        handle: &OpenHandle,
        cred: &Cred,
        call: VfsCall,
    ) -> VfsResult<VfsReply> {
        trace!("vfs dispatch {:?} on {:?}", call.opcode(), handle.fh);
        let request =
            VfsRequest { cred: cred.clone(), fh: handle.fh.clone(), call };
        handle.backend.dispatch(request).await
    }

    /// Resolves a single name under an open directory handle.
    pub async fn lookup_at(
        &self,
        cred: &Cred,
        handle: &OpenHandle,
        name: &[u8],
        attr_mask: u64,
        dir_attr_mask: u64,
    ) -> VfsResult<(Attr, Attr)> {
        let call = VfsCall::LookupAt {
            handle: handle.token,
            name: name.to_vec(),
            attr_mask,
            dir_attr_mask,
        };
        match self.dispatch_handle(handle, cred, call).await? {
            VfsReply::LookupAt { attr, dir_attr } => Ok((attr, dir_attr)),
            _ => Err(VfsError::Fault),
        }
    }

    /// Opens (and possibly creates) a name under an open directory
    /// handle. The returned handle is synthetic.
    #[allow(clippy::too_many_arguments)]
    pub async fn open_at(
        &self,
        cred: &Cred,
        dir: &OpenHandle,
        name: &[u8],
        flags: u32,
        set_attr: Attr,
        attr_mask: u64,
        verifier: Option<[u8; 8]>,
    ) -> VfsResult<(Arc<OpenHandle>, Attr, Attr, Attr)> {
        use super::attr::mask::ATTR_MASK_WCC;
        let call = VfsCall::OpenAt {
            handle: dir.token,
            name: name.to_vec(),
            flags,
            set_attr,
            attr_mask: attr_mask | super::attr::mask::ATTR_FH,
            dir_pre_attr_mask: ATTR_MASK_WCC,
            dir_post_attr_mask: ATTR_MASK_WCC,
            verifier,
        };
        match self.dispatch_handle(dir, cred, call).await? {
            VfsReply::OpenAt { handle, attr, dir_pre_attr, dir_post_attr } => {
                let fh = attr.fh.clone().ok_or(VfsError::Fault)?;
                let backend = dir.backend.clone();
                Ok((self.synthetic_handle(backend, fh, handle), attr, dir_pre_attr, dir_post_attr))
            }
            _ => Err(VfsError::Fault),
        }
    }

    /// Fetches attributes through an open handle.
    pub async fn getattr(
        &self,
        cred: &Cred,
        handle: &OpenHandle,
        attr_mask: u64,
    ) -> VfsResult<Attr> {
        let call = VfsCall::GetAttr { handle: handle.token, attr_mask };
        match self.dispatch_handle(handle, cred, call).await? {
            VfsReply::GetAttr { attr } => Ok(attr),
            _ => Err(VfsError::Fault),
        }
    }

    /// Mutates attributes; returns atomically captured pre/post pairs
    /// when the backend can provide them.
    pub async fn setattr(
        &self,
        cred: &Cred,
        handle: &OpenHandle,
        set_attr: Attr,
        pre_attr_mask: u64,
        post_attr_mask: u64,
    ) -> VfsResult<(Attr, Attr)> {
        let call = VfsCall::SetAttr {
            handle: handle.token,
            set_attr,
            pre_attr_mask,
            post_attr_mask,
        };
        match self.dispatch_handle(handle, cred, call).await? {
            VfsReply::SetAttr { pre_attr, post_attr } => Ok((pre_attr, post_attr)),
            _ => Err(VfsError::Fault),
        }
    }

    /// Reads through an open handle.
    pub async fn read(
        &self,
        cred: &Cred,
        handle: &OpenHandle,
        offset: u64,
        count: u32,
        attr_mask: u64,
    ) -> VfsResult<(Vec<u8>, bool, Attr)> {
        let call = VfsCall::Read { handle: handle.token, offset, count, attr_mask };
        match self.dispatch_handle(handle, cred, call).await? {
            VfsReply::Read { data, eof, attr } => Ok((data, eof, attr)),
            _ => Err(VfsError::Fault),
        }
    }

    /// Writes through an open handle; ownership of the data moves into
    /// the call before any await point.
    pub async fn write(
        &self,
        cred: &Cred,
        handle: &OpenHandle,
        offset: u64,
        data: Vec<u8>,
        stable: bool,
    ) -> VfsResult<(u32, bool, Attr, Attr)> {
        use super::attr::mask::ATTR_MASK_WCC;
        let call = VfsCall::Write {
            handle: handle.token,
            offset,
            data,
            stable,
            pre_attr_mask: ATTR_MASK_WCC,
            post_attr_mask: ATTR_MASK_WCC | super::attr::mask::ATTR_MASK_STAT,
        };
        match self.dispatch_handle(handle, cred, call).await? {
            VfsReply::Write { count, stable, pre_attr, post_attr } => {
                Ok((count, stable, pre_attr, post_attr))
            }
            _ => Err(VfsError::Fault),
        }
    }

    /// Commits previously written data to stable storage.
    pub async fn commit(
        &self,
        cred: &Cred,
        handle: &OpenHandle,
        offset: u64,
        count: u32,
        attr_mask: u64,
    ) -> VfsResult<Attr> {
        let call = VfsCall::Commit { handle: handle.token, offset, count, attr_mask };
        match self.dispatch_handle(handle, cred, call).await? {
            VfsReply::Commit { attr } => Ok(attr),
            _ => Err(VfsError::Fault),
        }
    }

    /// Creates a directory.
    pub async fn mkdir(
        &self,
        cred: &Cred,
        dir: &OpenHandle,
        name: &[u8],
        set_attr: Attr,
        attr_mask: u64,
    ) -> VfsResult<(Attr, Attr, Attr)> {
        use super::attr::mask::{ATTR_FH, ATTR_MASK_WCC};
        let call = VfsCall::Mkdir {
            handle: dir.token,
            name: name.to_vec(),
            set_attr,
            attr_mask: attr_mask | ATTR_FH,
            dir_pre_attr_mask: ATTR_MASK_WCC,
            dir_post_attr_mask: ATTR_MASK_WCC,
        };
        match self.dispatch_handle(dir, cred, call).await? {
            VfsReply::Mkdir { attr, dir_pre_attr, dir_post_attr } => {
                Ok((attr, dir_pre_attr, dir_post_attr))
            }
            _ => Err(VfsError::Fault),
        }
    }

    /// Creates a special node.
    pub async fn mknod(
        &self,
        cred: &Cred,
        dir: &OpenHandle,
        name: &[u8],
        set_attr: Attr,
        attr_mask: u64,
    ) -> VfsResult<(Attr, Attr, Attr)> {
        use super::attr::mask::{ATTR_FH, ATTR_MASK_WCC};
        let call = VfsCall::Mknod {
            handle: dir.token,
            name: name.to_vec(),
            set_attr,
            attr_mask: attr_mask | ATTR_FH,
            dir_pre_attr_mask: ATTR_MASK_WCC,
            dir_post_attr_mask: ATTR_MASK_WCC,
        };
        match self.dispatch_handle(dir, cred, call).await? {
            VfsReply::Mknod { attr, dir_pre_attr, dir_post_attr } => {
                Ok((attr, dir_pre_attr, dir_post_attr))
            }
            _ => Err(VfsError::Fault),
        }
    }

    /// Creates a symbolic link.
    pub async fn symlink(
        &self,
        cred: &Cred,
        dir: &OpenHandle,
        name: &[u8],
        target: &[u8],
        set_attr: Attr,
        attr_mask: u64,
    ) -> VfsResult<(Attr, Attr, Attr)> {
        use super::attr::mask::{ATTR_FH, ATTR_MASK_WCC};
        let call = VfsCall::Symlink {
            handle: dir.token,
            name: name.to_vec(),
            target: target.to_vec(),
            set_attr,
            attr_mask: attr_mask | ATTR_FH,
            dir_pre_attr_mask: ATTR_MASK_WCC,
            dir_post_attr_mask: ATTR_MASK_WCC,
        };
        match self.dispatch_handle(dir, cred, call).await? {
            VfsReply::Symlink { attr, dir_pre_attr, dir_post_attr } => {
                Ok((attr, dir_pre_attr, dir_post_attr))
            }
            _ => Err(VfsError::Fault),
        }
    }

    /// Reads a symlink target.
    pub async fn readlink(&self, cred: &Cred, handle: &OpenHandle) -> VfsResult<Vec<u8>> {
        let call = VfsCall::ReadLink { handle: handle.token };
        match self.dispatch_handle(handle, cred, call).await? {
            VfsReply::ReadLink { target } => Ok(target),
            _ => Err(VfsError::Fault),
        }
    }

    /// Removes a name from an open directory.
    pub async fn remove_at(
        &self,
        cred: &Cred,
        dir: &OpenHandle,
        name: &[u8],
    ) -> VfsResult<(Attr, Attr)> {
        use super::attr::mask::ATTR_MASK_WCC;
        let call = VfsCall::RemoveAt {
            handle: dir.token,
            name: name.to_vec(),
            dir_pre_attr_mask: ATTR_MASK_WCC,
            dir_post_attr_mask: ATTR_MASK_WCC,
        };
        match self.dispatch_handle(dir, cred, call).await? {
            VfsReply::RemoveAt { dir_pre_attr, dir_post_attr } => {
                Ok((dir_pre_attr, dir_post_attr))
            }
            _ => Err(VfsError::Fault),
        }
    }

    /// Renames `old_name` under `dir` to `new_name` under the directory
    /// named by `new_dir`.
    pub async fn rename_at(
        &self,
        cred: &Cred,
        dir: &OpenHandle,
        old_name: &[u8],
        new_dir: &FileHandle,
        new_name: &[u8],
    ) -> VfsResult<(Attr, Attr, Attr, Attr)> {
        use super::attr::mask::ATTR_MASK_WCC;
        let call = VfsCall::RenameAt {
            handle: dir.token,
            old_name: old_name.to_vec(),
            new_dir: new_dir.clone(),
            new_name: new_name.to_vec(),
            dir_pre_attr_mask: ATTR_MASK_WCC,
            dir_post_attr_mask: ATTR_MASK_WCC,
        };
        match self.dispatch_handle(dir, cred, call).await? {
            VfsReply::RenameAt { from_pre, from_post, to_pre, to_post } => {
                Ok((from_pre, from_post, to_pre, to_post))
            }
            _ => Err(VfsError::Fault),
        }
    }

    /// Hard-links the object behind `handle` as `name` under `dir`.
    pub async fn link_at(
        &self,
        cred: &Cred,
        handle: &OpenHandle,
        dir: &FileHandle,
        name: &[u8],
        attr_mask: u64,
    ) -> VfsResult<(Attr, Attr, Attr)> {
        use super::attr::mask::ATTR_MASK_WCC;
        let call = VfsCall::LinkAt {
            handle: handle.token,
            dir: dir.clone(),
            name: name.to_vec(),
            attr_mask,
            dir_pre_attr_mask: ATTR_MASK_WCC,
            dir_post_attr_mask: ATTR_MASK_WCC,
        };
        match self.dispatch_handle(handle, cred, call).await? {
            VfsReply::LinkAt { attr, dir_pre_attr, dir_post_attr } => {
                Ok((attr, dir_pre_attr, dir_post_attr))
            }
            _ => Err(VfsError::Fault),
        }
    }

    /// Iterates a directory from the given cookie.
    #[allow(clippy::too_many_arguments)]
    pub async fn readdir(
        &self,
        cred: &Cred,
        handle: &OpenHandle,
        cookie: u64,
        verifier: u64,
        max_entries: u32,
        attr_mask: u64,
        dir_attr_mask: u64,
    ) -> VfsResult<(Vec<DirEntry>, bool, u64, Attr)> {
        let call = VfsCall::ReadDir {
            handle: handle.token,
            cookie,
            verifier,
            max_entries,
            attr_mask,
            dir_attr_mask,
        };
        match self.dispatch_handle(handle, cred, call).await? {
            VfsReply::ReadDir { entries, eof, verifier, dir_attr } => {
                Ok((entries, eof, verifier, dir_attr))
            }
            _ => Err(VfsError::Fault),
        }
    }

    /// Evaluates access bits against the caller's credentials.
    pub async fn access(
        &self,
        cred: &Cred,
        handle: &OpenHandle,
        access: u32,
        attr_mask: u64,
    ) -> VfsResult<(u32, Attr)> {
        let call = VfsCall::Access { handle: handle.token, access, attr_mask };
        match self.dispatch_handle(handle, cred, call).await? {
            VfsReply::Access { access, attr } => Ok((access, attr)),
            _ => Err(VfsError::Fault),
        }
    }

    /// Preallocates or punches a hole in a byte range.
    pub async fn allocate(
        &self,
        cred: &Cred,
        handle: &OpenHandle,
        offset: u64,
        length: u64,
        punch_hole: bool,
    ) -> VfsResult<()> {
        let call = VfsCall::Allocate { handle: handle.token, offset, length, punch_hole };
        match self.dispatch_handle(handle, cred, call).await? {
            VfsReply::Allocate => Ok(()),
            _ => Err(VfsError::Fault),
        }
    }

    /// Locates the next data region or hole at or after `offset`.
    pub async fn seek(
        &self,
        cred: &Cred,
        handle: &OpenHandle,
        offset: u64,
        whence: SeekWhence,
    ) -> VfsResult<(u64, bool)> {
        let call = VfsCall::Seek { handle: handle.token, offset, whence };
        match self.dispatch_handle(handle, cred, call).await? {
            VfsReply::Seek { offset, eof } => Ok((offset, eof)),
            _ => Err(VfsError::Fault),
        }
    }

    /// Enumerates the subtree below `fh`.
    pub async fn find(
        &self,
        cred: &Cred,
        fh: &FileHandle,
        attr_mask: u64,
        max_entries: u32,
    ) -> VfsResult<(Vec<FindEntry>, bool)> {
        let backend = self.backend_for(fh)?;
        let request = VfsRequest {
            cred: cred.clone(),
            fh: fh.clone(),
            call: VfsCall::Find { attr_mask, max_entries },
        };
        match backend.dispatch(request).await? {
            VfsReply::Find { entries, truncated } => Ok((entries, truncated)),
            _ => Err(VfsError::Fault),
        }
    }
}
