//! Open-handle cache invariants: single backend open under concurrency,
//! refcount balance, error propagation to queued waiters.

mod common;

use std::sync::atomic::Ordering;
use std::time::Duration;

use chimera_nfs::vfs::open_flags::*;
use chimera_nfs::vfs::{Cred, VfsError};
use common::memfs_server;

/// Waits for deferred close tasks to drain.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

#[tokio::test]
async fn concurrent_opens_share_one_backend_open() {
    let (memfs, server) = memfs_server();
    let fh = memfs.populate_file("f", b"hello");
    memfs.slow_open.store(true, Ordering::SeqCst);
    memfs.open_calls.store(0, Ordering::SeqCst);
    memfs.close_calls.store(0, Ordering::SeqCst);

    let mut tasks = Vec::new();
    for _ in 0..64 {
        let server = server.clone();
        let fh = fh.clone();
        tasks.push(tokio::spawn(async move {
            let cred = Cred::anonymous();
            let router = server.router();
            let handle = router
                .open_fh(&cred, &fh, OPEN_RDONLY | OPEN_INFERRED)
                .await
                .expect("open through cache");
            let (data, eof, _) = router
                .read(&cred, &handle, 0, 5, 0)
                .await
                .expect("read through shared handle");
            router.release(&handle);
            assert_eq!(data, b"hello");
            assert!(eof);
        }));
    }
    for task in tasks {
        task.await.expect("reader task");
    }
    settle().await;

    assert_eq!(memfs.open_calls.load(Ordering::SeqCst), 1, "exactly one backend open");
    assert_eq!(memfs.close_calls.load(Ordering::SeqCst), 1, "exactly one backend close");
    assert!(server.router().file_cache().is_empty());
}

#[tokio::test]
async fn release_balances_and_closes_once() {
    let (memfs, server) = memfs_server();
    let fh = memfs.populate_file("g", b"data");
    memfs.open_calls.store(0, Ordering::SeqCst);
    memfs.close_calls.store(0, Ordering::SeqCst);

    let cred = Cred::anonymous();
    let router = server.router();

    let first = router.open_fh(&cred, &fh, OPEN_RDONLY | OPEN_INFERRED).await.unwrap();
    let second = router.open_fh(&cred, &fh, OPEN_RDONLY | OPEN_INFERRED).await.unwrap();
    assert_eq!(first.token, second.token, "both callers observe the same backend opaque");
    assert_eq!(memfs.open_calls.load(Ordering::SeqCst), 1);

    router.release(&first);
    settle().await;
    // One reference remains; no close yet.
    assert_eq!(memfs.close_calls.load(Ordering::SeqCst), 0);

    router.release(&second);
    settle().await;
    assert_eq!(memfs.close_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn path_and_file_caches_are_partitioned() {
    let (memfs, server) = memfs_server();
    let fh = memfs.populate_file("h", b"x");
    memfs.open_calls.store(0, Ordering::SeqCst);

    let cred = Cred::anonymous();
    let router = server.router();

    let meta = router.open_fh(&cred, &fh, OPEN_PATH | OPEN_INFERRED).await.unwrap();
    let data = router.open_fh(&cred, &fh, OPEN_RDONLY | OPEN_INFERRED).await.unwrap();
    // Distinct caches mean distinct backend opens for the same FH.
    assert_eq!(memfs.open_calls.load(Ordering::SeqCst), 2);
    assert_eq!(router.path_cache().len(), 1);
    assert_eq!(router.file_cache().len(), 1);

    router.release(&meta);
    router.release(&data);
    settle().await;
    assert!(router.path_cache().is_empty());
    assert!(router.file_cache().is_empty());
}

#[tokio::test]
async fn synthetic_opens_bypass_the_cache() {
    let (memfs, server) = memfs_server();
    let fh = memfs.populate_file("i", b"x");
    memfs.open_calls.store(0, Ordering::SeqCst);
    memfs.close_calls.store(0, Ordering::SeqCst);

    let cred = Cred::anonymous();
    let router = server.router();

    let one = router.open_fh(&cred, &fh, OPEN_RDONLY).await.unwrap();
    let two = router.open_fh(&cred, &fh, OPEN_RDONLY).await.unwrap();
    assert_ne!(one.token, two.token, "synthetic handles are per-request");
    assert_eq!(memfs.open_calls.load(Ordering::SeqCst), 2);
    assert!(router.file_cache().is_empty());

    router.release(&one);
    router.release(&two);
    settle().await;
    assert_eq!(memfs.close_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn open_failure_reaches_every_waiter() {
    let (memfs, server) = memfs_server();
    let fh = memfs.populate_file("j", b"x");
    memfs.slow_open.store(true, Ordering::SeqCst);
    memfs.fail_open.store(true, Ordering::SeqCst);

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let server = server.clone();
        let fh = fh.clone();
        tasks.push(tokio::spawn(async move {
            let cred = Cred::anonymous();
            server.router().open_fh(&cred, &fh, OPEN_RDONLY | OPEN_INFERRED).await
        }));
    }
    for task in tasks {
        let result = task.await.expect("waiter task");
        assert_eq!(result.err(), Some(VfsError::Io));
    }
    // The placeholder is gone; a later successful open starts fresh.
    memfs.fail_open.store(false, Ordering::SeqCst);
    memfs.slow_open.store(false, Ordering::SeqCst);
    let cred = Cred::anonymous();
    let handle = server
        .router()
        .open_fh(&cred, &fh, OPEN_RDONLY | OPEN_INFERRED)
        .await
        .expect("open after failure clears placeholder");
    server.router().release(&handle);
}
