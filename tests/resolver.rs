//! Path resolver behavior: multi-component walks, symlink splicing, the
//! loop bound, and the empty-path identity.

mod common;

use chimera_nfs::vfs::attr::mask::{ATTR_FH, ATTR_INUM, ATTR_MODE};
use chimera_nfs::vfs::lookup_flags::LOOKUP_FOLLOW;
use chimera_nfs::vfs::resolver::lookup_path;
use chimera_nfs::vfs::{Cred, VfsError, VFS_PATH_MAX};
use common::memfs_server;

#[tokio::test]
async fn walks_multiple_components() {
    let (memfs, server) = memfs_server();
    let leaf_fh = memfs.populate_file("a/b/c/leaf", b"content");
    let root = memfs.root_ino_fh();

    let cred = Cred::anonymous();
    let attr = lookup_path(
        server.router(),
        &cred,
        &root,
        b"a/b/c/leaf",
        ATTR_FH | ATTR_MODE | ATTR_INUM,
        0,
    )
    .await
    .expect("walk succeeds");

    assert_eq!(attr.fh.as_ref().unwrap().as_bytes(), leaf_fh.as_bytes());
}

#[tokio::test]
async fn empty_path_returns_starting_fh() {
    let (memfs, server) = memfs_server();
    let root = memfs.root_ino_fh();

    let cred = Cred::anonymous();
    let attr = lookup_path(server.router(), &cred, &root, b"", ATTR_MODE, 0)
        .await
        .expect("empty path resolves");
    assert_eq!(attr.fh.as_ref().unwrap().as_bytes(), root.as_bytes());

    // Slashes only count as empty too.
    let attr = lookup_path(server.router(), &cred, &root, b"///", ATTR_MODE, 0)
        .await
        .expect("slash-only path resolves");
    assert_eq!(attr.fh.as_ref().unwrap().as_bytes(), root.as_bytes());
}

#[tokio::test]
async fn follows_absolute_symlink_through_path() {
    let (memfs, server) = memfs_server();
    let leaf_fh = memfs.populate_file("a/b/c/leaf", b"content");
    memfs.populate_symlink("s", "/a/b/c");
    let root = memfs.root_ino_fh();

    let cred = Cred::anonymous();
    let attr = lookup_path(server.router(), &cred, &root, b"s/leaf", ATTR_FH | ATTR_MODE, 0)
        .await
        .expect("symlink walk succeeds");
    assert_eq!(attr.fh.as_ref().unwrap().as_bytes(), leaf_fh.as_bytes());
}

#[tokio::test]
async fn follows_relative_symlink() {
    let (memfs, server) = memfs_server();
    let leaf_fh = memfs.populate_file("dir/real", b"x");
    memfs.populate_symlink("alias", "dir/real");
    let root = memfs.root_ino_fh();

    let cred = Cred::anonymous();
    // Without FOLLOW the final symlink itself is returned.
    let attr =
        lookup_path(server.router(), &cred, &root, b"alias", ATTR_FH | ATTR_MODE, 0)
            .await
            .unwrap();
    assert!(attr.is_symlink());

    // With FOLLOW the target is resolved.
    let attr = lookup_path(
        server.router(),
        &cred,
        &root,
        b"alias",
        ATTR_FH | ATTR_MODE,
        LOOKUP_FOLLOW,
    )
    .await
    .unwrap();
    assert_eq!(attr.fh.as_ref().unwrap().as_bytes(), leaf_fh.as_bytes());
}

#[tokio::test]
async fn symlink_cycle_terminates_with_loop() {
    let (memfs, server) = memfs_server();
    memfs.populate_symlink("x", "/y");
    memfs.populate_symlink("y", "/x");
    let root = memfs.root_ino_fh();

    let cred = Cred::anonymous();
    let err = lookup_path(
        server.router(),
        &cred,
        &root,
        b"x",
        ATTR_FH | ATTR_MODE,
        LOOKUP_FOLLOW,
    )
    .await
    .unwrap_err();
    assert_eq!(err, VfsError::Loop);
}

#[tokio::test]
async fn oversized_path_is_rejected_inline() {
    let (memfs, server) = memfs_server();
    let root = memfs.root_ino_fh();

    let cred = Cred::anonymous();
    let long_path = vec![b'a'; VFS_PATH_MAX + 1];
    let err = lookup_path(server.router(), &cred, &root, &long_path, ATTR_FH, 0)
        .await
        .unwrap_err();
    assert_eq!(err, VfsError::NameTooLong);
}

#[tokio::test]
async fn missing_component_propagates_noent() {
    let (memfs, server) = memfs_server();
    memfs.populate_file("a/b", b"x");
    let root = memfs.root_ino_fh();

    let cred = Cred::anonymous();
    let err = lookup_path(server.router(), &cred, &root, b"a/nope/c", ATTR_FH, 0)
        .await
        .unwrap_err();
    assert_eq!(err, VfsError::NoEnt);
}

#[tokio::test]
async fn walk_releases_every_parent_handle() {
    let (memfs, server) = memfs_server();
    memfs.populate_file("p/q/r", b"x");
    let root = memfs.root_ino_fh();

    let cred = Cred::anonymous();
    lookup_path(server.router(), &cred, &root, b"p/q/r", ATTR_FH, 0).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert!(server.router().path_cache().is_empty());
}

#[tokio::test]
async fn find_enumerates_the_subtree() {
    let (memfs, server) = memfs_server();
    memfs.populate_file("a/one", b"1");
    memfs.populate_file("a/b/two", b"2");
    let root = memfs.root_ino_fh();

    let cred = Cred::anonymous();
    let (entries, truncated) = server
        .router()
        .find(&cred, &root, ATTR_MODE | ATTR_INUM, 100)
        .await
        .expect("find succeeds");
    assert!(!truncated);
    let paths: Vec<Vec<u8>> = entries.iter().map(|e| e.path.clone()).collect();
    assert!(paths.contains(&b"a".to_vec()));
    assert!(paths.contains(&b"a/one".to_vec()));
    assert!(paths.contains(&b"a/b/two".to_vec()));

    // A tight entry budget reports truncation.
    let (_, truncated) =
        server.router().find(&cred, &root, ATTR_MODE, 1).await.expect("bounded find");
    assert!(truncated);
}
