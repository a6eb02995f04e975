//! The open-handle cache: a shared, reference-counted registry keyed by
//! file handle.
//!
//! For any FH opened with cache-eligible flags, at most one live backend
//! open exists at a time: the first open inserts a placeholder and
//! dispatches the backend, concurrent opens of the same FH queue behind
//! the placeholder as continuations, and completion drains the queue with
//! one refcount increment per waiter. Release decrements; at zero the
//! entry is detached and the backend close runs as a deferred task so
//! in-flight operations holding the handle observe a stable token.
//!
//! Two cache instances partition metadata-only (`OPEN_PATH`) handles from
//! data-capable ones. Synthetic (non-`INFERRED`) handles never enter a
//! cache; the router opens and closes them per request.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::oneshot;
use tracing::{debug, error, trace};

use super::backend::{OpenToken, VfsBackend, VfsCall, VfsReply, VfsRequest};
use super::{Cred, FileHandle, VfsError, VfsResult};

/// Which registry (if any) a handle lives in.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CacheKind {
    /// Per-request handle, never cached
    Synthetic,
    /// Metadata-only handle in the path cache
    Path,
    /// Data-capable handle in the file cache
    File,
}

/// A live backend open. Callers hold shared `Arc` views; the owning cache
/// entry tracks the reference count and the backend close runs exactly
/// once, after the last release.
pub struct OpenHandle {
    /// The file handle this open belongs to
    pub fh: FileHandle,
    /// The backend module that produced the open
    pub backend: Arc<dyn VfsBackend>,
    /// Backend-private open token
    pub token: OpenToken,
    /// Which cache owns this handle
    pub cache: CacheKind,
}

impl std::fmt::Debug for OpenHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenHandle")
            .field("fh", &self.fh)
            .field("token", &self.token)
            .field("cache", &self.cache)
            .finish()
    }
}

type Waiter = oneshot::Sender<VfsResult<Arc<OpenHandle>>>;

/// Cache entry: either an open in flight with queued continuations, or a
/// ready handle with its reference count.
enum Slot {
    Opening { waiters: Vec<Waiter> },
    Ready { handle: Arc<OpenHandle>, refs: u32 },
}

/// Reference-counted FH → open-handle registry.
pub struct OpenCache {
    kind: CacheKind,
    slots: Mutex<HashMap<Vec<u8>, Slot>>,
}

impl OpenCache {
    /// Creates an empty cache of the given kind.
    pub fn new(kind: CacheKind) -> OpenCache {
        OpenCache { kind, slots: Mutex::new(HashMap::new()) }
    }

    /// Opens `fh` through the cache.
    ///
    /// Exactly one backend open is dispatched per FH no matter how many
    /// callers arrive concurrently; every successful return carries a
    /// refcount the caller must balance with [`OpenCache::release`].
    pub async fn open(
        self: &Arc<Self>,
        backend: Arc<dyn VfsBackend>,
        cred: &Cred,
        fh: &FileHandle,
        flags: u32,
    ) -> VfsResult<Arc<OpenHandle>> {
        let waiter = {
            let mut slots = self.slots.lock().expect("open cache lock poisoned");
            match slots.get_mut(fh.as_bytes()) {
                Some(Slot::Ready { handle, refs }) => {
                    *refs += 1;
                    trace!("open cache hit {:?} refs={}", fh, *refs);
                    return Ok(handle.clone());
                }
                Some(Slot::Opening { waiters }) => {
                    let (tx, rx) = oneshot::channel();
                    waiters.push(tx);
                    trace!("open cache pending {:?} waiters={}", fh, waiters.len());
                    Some(rx)
                }
                None => {
                    slots.insert(fh.as_bytes().to_vec(), Slot::Opening { waiters: Vec::new() });
                    None
                }
            }
        };

        if let Some(rx) = waiter {
            // Queued behind the placeholder; the opener drains the queue.
            return match rx.await {
                Ok(result) => result,
                // The opener vanished without draining; treat as torn down.
                Err(_) => Err(VfsError::Stale),
            };
        }

        // We inserted the placeholder, so we dispatch the backend open.
        let request = VfsRequest { cred: cred.clone(), fh: fh.clone(), call: VfsCall::OpenFh { flags } };
        let opened = match backend.dispatch(request).await {
            Ok(VfsReply::OpenFh { handle }) | Ok(VfsReply::Open { handle }) => Ok(handle),
            Ok(_) => Err(VfsError::Fault),
            Err(err) => Err(err),
        };

        match opened {
            Ok(token) => {
                let handle = Arc::new(OpenHandle {
                    fh: fh.clone(),
                    backend,
                    token,
                    cache: self.kind,
                });
                let waiters = {
                    let mut slots = self.slots.lock().expect("open cache lock poisoned");
                    match slots.get_mut(fh.as_bytes()) {
                        Some(slot) => {
                            if let Slot::Opening { waiters } = slot {
                                let drained = std::mem::take(waiters);
                                *slot = Slot::Ready {
                                    handle: handle.clone(),
                                    refs: 1 + drained.len() as u32,
                                };
                                drained
                            } else {
                                Vec::new()
                            }
                        }
                        None => Vec::new(),
                    }
                };
                debug!("open cache filled {:?} waiters={}", fh, waiters.len());
                for waiter in waiters {
                    let _ = waiter.send(Ok(handle.clone()));
                }
                Ok(handle)
            }
            Err(err) => {
                // Fail every queued waiter with the open error and drop
                // the placeholder.
                let waiters = {
                    let mut slots = self.slots.lock().expect("open cache lock poisoned");
                    match slots.remove(fh.as_bytes()) {
                        Some(Slot::Opening { waiters }) => waiters,
                        _ => Vec::new(),
                    }
                };
                debug!("open cache open failed {:?}: {}", fh, err);
                for waiter in waiters {
                    let _ = waiter.send(Err(err));
                }
                Err(err)
            }
        }
    }

    /// Releases one reference. At zero the entry is detached and the
    /// backend close runs as a deferred task.
    pub fn release(&self, handle: &Arc<OpenHandle>) {
        let close_now = {
            let mut slots = self.slots.lock().expect("open cache lock poisoned");
            match slots.get_mut(handle.fh.as_bytes()) {
                Some(Slot::Ready { refs, .. }) => {
                    *refs -= 1;
                    if *refs == 0 {
                        slots.remove(handle.fh.as_bytes());
                        true
                    } else {
                        false
                    }
                }
                // Release against a missing or still-opening entry means a
                // refcount imbalance in a handler; a bug, not a user error.
                _ => panic!("open cache release without a ready entry"),
            }
        };

        if close_now {
            deferred_close(handle.clone());
        }
    }

    /// Number of live entries; test and introspection aid.
    pub fn len(&self) -> usize {
        self.slots.lock().expect("open cache lock poisoned").len()
    }

    /// True when no handles are cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Runs the backend close for a detached handle on a separate task, so
/// the releasing request's reply is not delayed by backend close latency.
pub(crate) fn deferred_close(handle: Arc<OpenHandle>) {
    tokio::spawn(async move {
        let request = VfsRequest {
            cred: Cred::anonymous(),
            fh: handle.fh.clone(),
            call: VfsCall::Close { handle: handle.token },
        };
        match handle.backend.dispatch(request).await {
            Ok(VfsReply::Close) => trace!("deferred close done {:?}", handle.fh),
            Ok(_) => error!("backend returned wrong reply arm for close"),
            Err(err) => error!("deferred close failed {:?}: {}", handle.fh, err),
        }
    });
}
