//! NFSv3 handler scenarios driven through the procedure dispatcher with
//! wire-encoded arguments.

mod common;

use std::io::Cursor;

use chimera_nfs::protocol::nfs::v3::handle_nfs;
use chimera_nfs::xdr::rpc::call_body;
use chimera_nfs::xdr::{deserialize, nfs3, Serialize};
use common::{memfs_server, test_context};

/// Encodes a call and runs it through the v3 dispatcher, returning the
/// reply bytes positioned after the RPC header.
async fn run_proc(
    context: &chimera_nfs::protocol::rpc::Context,
    proc: nfs3::NFSProgram,
    args: &[u8],
) -> Cursor<Vec<u8>> {
    let call = call_body {
        rpcvers: 2,
        prog: nfs3::PROGRAM,
        vers: nfs3::VERSION,
        proc: proc as u32,
        ..Default::default()
    };
    let mut input = Cursor::new(args.to_vec());
    let mut output = Vec::new();
    handle_nfs(0x77, call, &mut input, &mut output, context).await.expect("handler runs");

    let mut cursor = Cursor::new(output);
    let header = deserialize::<chimera_nfs::xdr::rpc::rpc_msg>(&mut cursor).expect("rpc header");
    assert_eq!(header.xid, 0x77);
    cursor
}

fn wire_fh(fh: &chimera_nfs::vfs::FileHandle) -> nfs3::nfs_fh3 {
    nfs3::nfs_fh3 { data: fh.as_bytes().to_vec() }
}

#[tokio::test]
async fn create_write_read_roundtrip() {
    let (memfs, server) = memfs_server();
    let context = test_context(server);
    let root = wire_fh(&memfs.root_ino_fh());

    // CREATE(dir, "f") UNCHECKED
    let mut args = Vec::new();
    nfs3::diropargs3 { dir: root.clone(), name: b"f".as_slice().into() }
        .serialize(&mut args)
        .unwrap();
    nfs3::createmode3::UNCHECKED.serialize(&mut args).unwrap();
    nfs3::sattr3::default().serialize(&mut args).unwrap();

    let mut reply = run_proc(&context, nfs3::NFSProgram::NFSPROC3_CREATE, &args).await;
    let status = deserialize::<nfs3::nfsstat3>(&mut reply).unwrap();
    assert_eq!(status, nfs3::nfsstat3::NFS3_OK);
    let obj_fh = deserialize::<nfs3::post_op_fh3>(&mut reply).unwrap().expect("created fh");
    assert!(!obj_fh.data.is_empty());

    // WRITE(fh, 0, "hello")
    let mut args = Vec::new();
    nfs3::file::WRITE3args {
        file: obj_fh.clone(),
        offset: 0,
        count: 5,
        stable: nfs3::file::stable_how::FILE_SYNC,
        data: b"hello".to_vec(),
    }
    .serialize(&mut args)
    .unwrap();

    let mut reply = run_proc(&context, nfs3::NFSProgram::NFSPROC3_WRITE, &args).await;
    let status = deserialize::<nfs3::nfsstat3>(&mut reply).unwrap();
    assert_eq!(status, nfs3::nfsstat3::NFS3_OK);
    let resok = deserialize::<nfs3::file::WRITE3resok>(&mut reply).unwrap();
    assert_eq!(resok.count, 5);
    assert_eq!(resok.verf, context.server.write_verifier());

    // READ(fh, 0, 5)
    let mut args = Vec::new();
    nfs3::file::READ3args { file: obj_fh.clone(), offset: 0, count: 5 }
        .serialize(&mut args)
        .unwrap();

    let mut reply = run_proc(&context, nfs3::NFSProgram::NFSPROC3_READ, &args).await;
    let status = deserialize::<nfs3::nfsstat3>(&mut reply).unwrap();
    assert_eq!(status, nfs3::nfsstat3::NFS3_OK);
    let resok = deserialize::<nfs3::file::READ3resok>(&mut reply).unwrap();
    assert_eq!(resok.data, b"hello");
    assert!(resok.eof);
    let post = resok.file_attributes.expect("post attrs");
    assert_eq!(post.size, 5);
}

#[tokio::test]
async fn lookup_resolves_name_and_attrs() {
    let (memfs, server) = memfs_server();
    let file_fh = memfs.populate_file("doc", b"abc");
    let context = test_context(server);

    let mut args = Vec::new();
    nfs3::diropargs3 { dir: wire_fh(&memfs.root_ino_fh()), name: b"doc".as_slice().into() }
        .serialize(&mut args)
        .unwrap();

    let mut reply = run_proc(&context, nfs3::NFSProgram::NFSPROC3_LOOKUP, &args).await;
    let status = deserialize::<nfs3::nfsstat3>(&mut reply).unwrap();
    assert_eq!(status, nfs3::nfsstat3::NFS3_OK);
    let obj = deserialize::<nfs3::nfs_fh3>(&mut reply).unwrap();
    assert_eq!(obj.data, file_fh.as_bytes());
    let obj_attr = deserialize::<nfs3::post_op_attr>(&mut reply).unwrap().expect("obj attrs");
    assert_eq!(obj_attr.size, 3);
    assert!(matches!(obj_attr.ftype, nfs3::ftype3::NF3REG));
}

#[tokio::test]
async fn getattr_of_unknown_magic_is_badhandle() {
    let (_memfs, server) = memfs_server();
    let context = test_context(server);

    let mut args = Vec::new();
    nfs3::nfs_fh3 { data: vec![0xEE; 9] }.serialize(&mut args).unwrap();

    let mut reply = run_proc(&context, nfs3::NFSProgram::NFSPROC3_GETATTR, &args).await;
    let status = deserialize::<nfs3::nfsstat3>(&mut reply).unwrap();
    assert_eq!(status, nfs3::nfsstat3::NFS3ERR_BADHANDLE);
}

#[tokio::test]
async fn remove_reports_atomic_wcc_with_ordered_ctime() {
    let (memfs, server) = memfs_server();
    memfs.populate_file("victim", b"x");
    let context = test_context(server);

    let mut args = Vec::new();
    nfs3::diropargs3 { dir: wire_fh(&memfs.root_ino_fh()), name: b"victim".as_slice().into() }
        .serialize(&mut args)
        .unwrap();

    let mut reply = run_proc(&context, nfs3::NFSProgram::NFSPROC3_REMOVE, &args).await;
    let status = deserialize::<nfs3::nfsstat3>(&mut reply).unwrap();
    assert_eq!(status, nfs3::nfsstat3::NFS3_OK);
    let wcc = deserialize::<nfs3::wcc_data>(&mut reply).unwrap();
    let before = wcc.before.expect("pre attrs captured");
    let after = wcc.after.expect("post attrs captured");
    assert!(
        (before.ctime.seconds, before.ctime.nseconds)
            <= (after.ctime.seconds, after.ctime.nseconds),
        "pre ctime must not exceed post ctime"
    );
}

#[tokio::test]
async fn readdir_respects_byte_budget() {
    let (memfs, server) = memfs_server();
    for i in 0..50 {
        memfs.populate_file(&format!("file-{i:02}"), b"x");
    }
    let context = test_context(server);

    // A small budget cannot hold all 50 entries.
    let mut args = Vec::new();
    nfs3::dir::READDIR3args {
        dir: wire_fh(&memfs.root_ino_fh()),
        cookie: 0,
        cookieverf: [0; 8],
        dircount: 512,
    }
    .serialize(&mut args)
    .unwrap();

    let mut reply = run_proc(&context, nfs3::NFSProgram::NFSPROC3_READDIR, &args).await;
    let status = deserialize::<nfs3::nfsstat3>(&mut reply).unwrap();
    assert_eq!(status, nfs3::nfsstat3::NFS3_OK);
    let _dir_attr = deserialize::<nfs3::post_op_attr>(&mut reply).unwrap();
    let _verf = deserialize::<nfs3::cookieverf3>(&mut reply).unwrap();

    let mut count = 0usize;
    let mut last_cookie = 0;
    while deserialize::<bool>(&mut reply).unwrap() {
        let entry = deserialize::<nfs3::dir::entry3>(&mut reply).unwrap();
        last_cookie = entry.cookie;
        count += 1;
    }
    let eof = deserialize::<bool>(&mut reply).unwrap();
    assert!(!eof, "a truncated listing must not claim eof");
    assert!(count > 0 && count < 50, "listing was budget-limited, got {count}");

    // Resume from the last cookie and drain the rest.
    let mut total = count;
    let mut cookie = last_cookie;
    loop {
        let mut args = Vec::new();
        nfs3::dir::READDIR3args {
            dir: wire_fh(&memfs.root_ino_fh()),
            cookie,
            cookieverf: [0; 8],
            dircount: 4096,
        }
        .serialize(&mut args)
        .unwrap();
        let mut reply = run_proc(&context, nfs3::NFSProgram::NFSPROC3_READDIR, &args).await;
        let status = deserialize::<nfs3::nfsstat3>(&mut reply).unwrap();
        assert_eq!(status, nfs3::nfsstat3::NFS3_OK);
        let _ = deserialize::<nfs3::post_op_attr>(&mut reply).unwrap();
        let _ = deserialize::<nfs3::cookieverf3>(&mut reply).unwrap();
        while deserialize::<bool>(&mut reply).unwrap() {
            let entry = deserialize::<nfs3::dir::entry3>(&mut reply).unwrap();
            cookie = entry.cookie;
            total += 1;
        }
        if deserialize::<bool>(&mut reply).unwrap() {
            break;
        }
    }
    assert_eq!(total, 50);
}

#[tokio::test]
async fn fsinfo_advertises_tcp_transfer_sizes() {
    let (memfs, server) = memfs_server();
    let context = test_context(server);

    let mut args = Vec::new();
    wire_fh(&memfs.root_ino_fh()).serialize(&mut args).unwrap();

    let mut reply = run_proc(&context, nfs3::NFSProgram::NFSPROC3_FSINFO, &args).await;
    let status = deserialize::<nfs3::nfsstat3>(&mut reply).unwrap();
    assert_eq!(status, nfs3::nfsstat3::NFS3_OK);
    let resok = deserialize::<nfs3::fs::fsinfo3>(&mut reply).unwrap();
    assert_eq!(resok.rtmax, 1024 * 1024);
    assert_eq!(resok.wtmax, 1024 * 1024);
    assert_eq!(
        resok.properties,
        nfs3::fs::FSF_LINK | nfs3::fs::FSF_SYMLINK | nfs3::fs::FSF_HOMOGENEOUS
            | nfs3::fs::FSF_CANSETTIME
    );
}

#[tokio::test]
async fn pathconf_reports_constants() {
    let (memfs, server) = memfs_server();
    let context = test_context(server);

    let mut args = Vec::new();
    wire_fh(&memfs.root_ino_fh()).serialize(&mut args).unwrap();

    let mut reply = run_proc(&context, nfs3::NFSProgram::NFSPROC3_PATHCONF, &args).await;
    let status = deserialize::<nfs3::nfsstat3>(&mut reply).unwrap();
    assert_eq!(status, nfs3::nfsstat3::NFS3_OK);
    let resok = deserialize::<nfs3::fs::PATHCONF3resok>(&mut reply).unwrap();
    assert_eq!(resok.name_max, 255);
    assert!(resok.no_trunc);
    assert!(resok.case_preserving);
    assert_eq!(resok.linkmax, u32::MAX);
}

#[tokio::test]
async fn guarded_create_of_existing_file_fails_exist() {
    let (memfs, server) = memfs_server();
    memfs.populate_file("taken", b"x");
    let context = test_context(server);

    let mut args = Vec::new();
    nfs3::diropargs3 { dir: wire_fh(&memfs.root_ino_fh()), name: b"taken".as_slice().into() }
        .serialize(&mut args)
        .unwrap();
    nfs3::createmode3::GUARDED.serialize(&mut args).unwrap();
    nfs3::sattr3::default().serialize(&mut args).unwrap();

    let mut reply = run_proc(&context, nfs3::NFSProgram::NFSPROC3_CREATE, &args).await;
    let status = deserialize::<nfs3::nfsstat3>(&mut reply).unwrap();
    assert_eq!(status, nfs3::nfsstat3::NFS3ERR_EXIST);
}
