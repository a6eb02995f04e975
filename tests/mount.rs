//! MOUNT protocol scenarios: MNT resolves an export to a usable root
//! handle, EXPORT lists the configuration, UMNT maintains the dump
//! table.

mod common;

use std::io::Cursor;

use chimera_nfs::protocol::nfs::mount::handle_mount;
use chimera_nfs::protocol::nfs::v3::handle_nfs;
use chimera_nfs::xdr::rpc::call_body;
use chimera_nfs::xdr::{deserialize, mount, nfs3, Serialize};
use common::{memfs_server, test_context};

async fn run_mount_proc(
    context: &chimera_nfs::protocol::rpc::Context,
    proc: mount::MountProgram,
    args: &[u8],
) -> Cursor<Vec<u8>> {
    let call = call_body {
        rpcvers: 2,
        prog: mount::PROGRAM,
        vers: mount::VERSION,
        proc: proc as u32,
        ..Default::default()
    };
    let mut input = Cursor::new(args.to_vec());
    let mut output = Vec::new();
    handle_mount(0x99, call, &mut input, &mut output, context).await.expect("handler runs");

    let mut cursor = Cursor::new(output);
    let header = deserialize::<chimera_nfs::xdr::rpc::rpc_msg>(&mut cursor).expect("rpc header");
    assert_eq!(header.xid, 0x99);
    cursor
}

#[tokio::test]
async fn mnt_returns_root_fh_and_readdir_works_on_it() {
    let (memfs, server) = memfs_server();
    memfs.populate_file("hello.txt", b"hi");
    let context = test_context(server);

    let mut args = Vec::new();
    b"/share".to_vec().serialize(&mut args).unwrap();

    let mut reply = run_mount_proc(&context, mount::MountProgram::MOUNTPROC3_MNT, &args).await;
    let status = deserialize::<mount::mountstat3>(&mut reply).unwrap();
    assert_eq!(status, mount::mountstat3::MNT3_OK);
    let resok = deserialize::<mount::mountres3_ok>(&mut reply).unwrap();
    assert!(!resok.fhandle.is_empty());
    assert!(resok.auth_flavors.contains(&(chimera_nfs::xdr::rpc::auth_flavor::AUTH_UNIX as u32)));

    // The returned handle works for a v3 READDIR.
    let mut args = Vec::new();
    nfs3::dir::READDIR3args {
        dir: nfs3::nfs_fh3 { data: resok.fhandle.clone() },
        cookie: 0,
        cookieverf: [0; 8],
        dircount: 4096,
    }
    .serialize(&mut args)
    .unwrap();

    let call = call_body {
        rpcvers: 2,
        prog: nfs3::PROGRAM,
        vers: nfs3::VERSION,
        proc: nfs3::NFSProgram::NFSPROC3_READDIR as u32,
        ..Default::default()
    };
    let mut input = Cursor::new(args);
    let mut output = Vec::new();
    handle_nfs(0x9a, call, &mut input, &mut output, &context).await.unwrap();
    let mut cursor = Cursor::new(output);
    let _ = deserialize::<chimera_nfs::xdr::rpc::rpc_msg>(&mut cursor).unwrap();
    let status = deserialize::<nfs3::nfsstat3>(&mut cursor).unwrap();
    assert_eq!(status, nfs3::nfsstat3::NFS3_OK);
    let _dir_attr = deserialize::<nfs3::post_op_attr>(&mut cursor).unwrap();
    let _verf = deserialize::<nfs3::cookieverf3>(&mut cursor).unwrap();
    let mut names = Vec::new();
    while deserialize::<bool>(&mut cursor).unwrap() {
        let entry = deserialize::<nfs3::dir::entry3>(&mut cursor).unwrap();
        names.push(entry.name.0);
    }
    assert!(names.contains(&b"hello.txt".to_vec()));
}

#[tokio::test]
async fn mnt_of_unknown_export_is_noent() {
    let (_memfs, server) = memfs_server();
    let context = test_context(server);

    let mut args = Vec::new();
    b"/no-such-export".to_vec().serialize(&mut args).unwrap();

    let mut reply = run_mount_proc(&context, mount::MountProgram::MOUNTPROC3_MNT, &args).await;
    let status = deserialize::<mount::mountstat3>(&mut reply).unwrap();
    assert_eq!(status, mount::mountstat3::MNT3ERR_NOENT);
}

#[tokio::test]
async fn export_lists_configured_shares() {
    let (_memfs, server) = memfs_server();
    let context = test_context(server);

    let mut reply =
        run_mount_proc(&context, mount::MountProgram::MOUNTPROC3_EXPORT, &[]).await;
    let mut names = Vec::new();
    while deserialize::<bool>(&mut reply).unwrap() {
        let dir: Vec<u8> = deserialize(&mut reply).unwrap();
        names.push(dir);
        // empty group list terminator
        let groups_present = deserialize::<bool>(&mut reply).unwrap();
        assert!(!groups_present);
    }
    assert_eq!(names, vec![b"/share".to_vec()]);
}

#[tokio::test]
async fn mount_table_tracks_mnt_and_umnt() {
    let (_memfs, server) = memfs_server();
    let context = test_context(server.clone());

    let mut args = Vec::new();
    b"/share".to_vec().serialize(&mut args).unwrap();
    run_mount_proc(&context, mount::MountProgram::MOUNTPROC3_MNT, &args).await;
    assert_eq!(server.mounts().entries().len(), 1);

    // DUMP lists the mount.
    let mut reply = run_mount_proc(&context, mount::MountProgram::MOUNTPROC3_DUMP, &[]).await;
    let present = deserialize::<bool>(&mut reply).unwrap();
    assert!(present);

    let mut args = Vec::new();
    b"/share".to_vec().serialize(&mut args).unwrap();
    run_mount_proc(&context, mount::MountProgram::MOUNTPROC3_UMNT, &args).await;
    assert!(server.mounts().entries().is_empty());

    // UMNTALL on an empty table stays empty.
    run_mount_proc(&context, mount::MountProgram::MOUNTPROC3_UMNTALL, &[]).await;
    assert!(server.mounts().entries().is_empty());
}
