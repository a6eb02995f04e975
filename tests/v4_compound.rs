//! NFSv4 COMPOUND engine scenarios, driven through the compound
//! executor directly so results can be inspected as structures.

mod common;

use chimera_nfs::protocol::nfs::v4::{compound, pseudo_root, state};
use chimera_nfs::xdr::nfs4::ops::*;
use chimera_nfs::xdr::nfs4::{self, nfs_fh4, nfs_opnum4, nfsstat4};
use common::{memfs_server, test_context};

fn compound_args(ops: Vec<nfs_argop4>) -> COMPOUND4args {
    COMPOUND4args { tag: b"test".to_vec(), minorversion: 1, argarray: ops }
}

fn getattr_request() -> Vec<u32> {
    let mut request = Vec::new();
    chimera_nfs::protocol::nfs::v4::attr::set_bit(&mut request, nfs4::FATTR4_SIZE);
    chimera_nfs::protocol::nfs::v4::attr::set_bit(&mut request, nfs4::FATTR4_TYPE);
    request
}

/// Establishes a client and session, returning the session id and the
/// export root FH.
async fn establish_session(
    context: &chimera_nfs::protocol::rpc::Context,
) -> (Vec<u8>, nfs4::sessionid4) {
    let args = compound_args(vec![
        nfs_argop4::EXCHANGE_ID(EXCHANGE_ID4args {
            eia_clientowner: nfs4::client_owner4 {
                co_verifier: [1; 8],
                co_ownerid: b"client-under-test".to_vec(),
            },
            ..Default::default()
        }),
    ]);
    let res = compound(args, context).await;
    assert_eq!(res.status, nfsstat4::NFS4_OK);
    let clientid = match &res.resarray[0] {
        nfs_resop4::EXCHANGE_ID(res) => res.eir_clientid,
        other => panic!("unexpected result {:?}", other),
    };

    let args = compound_args(vec![nfs_argop4::CREATE_SESSION(CREATE_SESSION4args {
        csa_clientid: clientid,
        csa_sequence: 1,
        csa_fore_chan_attrs: nfs4::channel_attrs4 {
            ca_maxrequests: 64,
            ..Default::default()
        },
        ..Default::default()
    })]);
    let res = compound(args, context).await;
    assert_eq!(res.status, nfsstat4::NFS4_OK);
    let sessionid = match &res.resarray[0] {
        nfs_resop4::CREATE_SESSION(res) => res.csr_sessionid,
        other => panic!("unexpected result {:?}", other),
    };

    // Resolve the export root through the pseudo-root.
    let args = compound_args(vec![
        nfs_argop4::SEQUENCE(SEQUENCE4args {
            sa_sessionid: sessionid,
            sa_sequenceid: 1,
            sa_slotid: 0,
            sa_highest_slotid: 0,
            sa_cachethis: false,
        }),
        nfs_argop4::PUTROOTFH,
        nfs_argop4::LOOKUP(LOOKUP4args { objname: b"share".to_vec() }),
        nfs_argop4::GETFH,
    ]);
    let res = compound(args, context).await;
    assert_eq!(res.status, nfsstat4::NFS4_OK);
    let root_fh = match &res.resarray[3] {
        nfs_resop4::GETFH(res) => res.object.data.clone(),
        other => panic!("unexpected result {:?}", other),
    };

    (root_fh, sessionid)
}

#[tokio::test]
async fn compound_failure_truncates_reply_array() {
    let (_memfs, server) = memfs_server();
    let context = test_context(server);

    let args = compound_args(vec![
        nfs_argop4::PUTROOTFH,
        nfs_argop4::LOOKUP(LOOKUP4args { objname: b"nonexistent".to_vec() }),
        nfs_argop4::GETATTR(GETATTR4args { attr_request: getattr_request() }),
    ]);
    let res = compound(args, &context).await;

    assert_eq!(res.status, nfsstat4::NFS4ERR_NOENT);
    assert_eq!(res.resarray.len(), 2, "reply ends with the failing op");
    assert_eq!(res.resarray[1].opnum(), nfs_opnum4::OP_LOOKUP);
    assert_eq!(res.resarray[1].status(), nfsstat4::NFS4ERR_NOENT);
}

#[tokio::test]
async fn putrootfh_installs_pseudo_root_literal() {
    let (_memfs, server) = memfs_server();
    let context = test_context(server);

    let args = compound_args(vec![nfs_argop4::PUTROOTFH, nfs_argop4::GETFH]);
    let res = compound(args, &context).await;
    assert_eq!(res.status, nfsstat4::NFS4_OK);
    match &res.resarray[1] {
        nfs_resop4::GETFH(res) => {
            assert_eq!(res.object.data.len(), 21);
            assert_eq!(res.object.data, pseudo_root::ROOT_FH.to_vec());
        }
        other => panic!("unexpected result {:?}", other),
    }
}

#[tokio::test]
async fn pseudo_root_readdir_lists_exports() {
    let (_memfs, server) = memfs_server();
    let context = test_context(server);

    let args = compound_args(vec![
        nfs_argop4::PUTROOTFH,
        nfs_argop4::READDIR(READDIR4args {
            cookie: 0,
            cookieverf: [0; 8],
            dircount: 4096,
            maxcount: 4096,
            attr_request: getattr_request(),
        }),
    ]);
    let res = compound(args, &context).await;
    assert_eq!(res.status, nfsstat4::NFS4_OK);
    match &res.resarray[1] {
        nfs_resop4::READDIR(res) => {
            assert!(res.reply.eof);
            let names: Vec<&[u8]> =
                res.reply.entries.iter().map(|e| e.name.as_slice()).collect();
            assert_eq!(names, vec![b"share".as_slice()]);
        }
        other => panic!("unexpected result {:?}", other),
    }
}

#[tokio::test]
async fn stateid_open_write_close_read_roundtrip() {
    let (_memfs, server) = memfs_server();
    let context = test_context(server);
    let (root_fh, sessionid) = establish_session(&context).await;

    let payload = vec![0xAAu8; 16 * 1024];

    // OPEN(CREATE, UNCHECKED) "f" under the export root.
    let args = compound_args(vec![
        nfs_argop4::SEQUENCE(SEQUENCE4args {
            sa_sessionid: sessionid,
            sa_sequenceid: 2,
            sa_slotid: 0,
            sa_highest_slotid: 0,
            sa_cachethis: false,
        }),
        nfs_argop4::PUTFH(PUTFH4args { object: nfs_fh4 { data: root_fh.clone() } }),
        nfs_argop4::OPEN(OPEN4args {
            seqid: 0,
            share_access: nfs4::OPEN4_SHARE_ACCESS_BOTH,
            share_deny: nfs4::OPEN4_SHARE_DENY_NONE,
            owner: nfs4::open_owner4 { clientid: 0, owner: b"owner-1".to_vec() },
            openhow: openflag4::OPEN4_CREATE(createhow4::UNCHECKED4(Default::default())),
            claim: open_claim4::CLAIM_NULL(b"f".to_vec()),
        }),
    ]);
    let res = compound(args, &context).await;
    assert_eq!(res.status, nfsstat4::NFS4_OK);
    let stateid = match &res.resarray[2] {
        nfs_resop4::OPEN(res) => {
            assert_eq!(res.stateid.seqid, 1);
            res.stateid
        }
        other => panic!("unexpected result {:?}", other),
    };

    // The stateid encodes its slot and owning client.
    let clientid = state::stateid_client(&stateid);
    assert!(clientid > 0);
    let decoded = state::encode_stateid(state::stateid_slot(&stateid) as u16, clientid);
    assert_eq!(decoded, stateid);

    // WRITE through the stateid.
    let args = compound_args(vec![nfs_argop4::WRITE(WRITE4args {
        stateid,
        offset: 0,
        stable: stable_how4::FILE_SYNC4,
        data: payload.clone(),
    })]);
    let res = compound(args, &context).await;
    assert_eq!(res.status, nfsstat4::NFS4_OK);
    match &res.resarray[0] {
        nfs_resop4::WRITE(res) => assert_eq!(res.count as usize, payload.len()),
        other => panic!("unexpected result {:?}", other),
    }

    // CLOSE the state.
    let args = compound_args(vec![nfs_argop4::CLOSE(CLOSE4args {
        seqid: 0,
        open_stateid: stateid,
    })]);
    let res = compound(args, &context).await;
    assert_eq!(res.status, nfsstat4::NFS4_OK);

    // A closed stateid no longer reads.
    let args = compound_args(vec![nfs_argop4::READ(READ4args {
        stateid,
        offset: 0,
        count: 16,
    })]);
    let res = compound(args, &context).await;
    assert_eq!(res.status, nfsstat4::NFS4ERR_BAD_STATEID);

    // Re-OPEN without create and read the payload back.
    let args = compound_args(vec![
        nfs_argop4::PUTFH(PUTFH4args { object: nfs_fh4 { data: root_fh.clone() } }),
        nfs_argop4::OPEN(OPEN4args {
            seqid: 0,
            share_access: nfs4::OPEN4_SHARE_ACCESS_READ,
            share_deny: nfs4::OPEN4_SHARE_DENY_NONE,
            owner: nfs4::open_owner4 { clientid, owner: b"owner-1".to_vec() },
            openhow: openflag4::OPEN4_NOCREATE,
            claim: open_claim4::CLAIM_NULL(b"f".to_vec()),
        }),
    ]);
    let res = compound(args, &context).await;
    assert_eq!(res.status, nfsstat4::NFS4_OK);
    let stateid = match &res.resarray[1] {
        nfs_resop4::OPEN(res) => res.stateid,
        other => panic!("unexpected result {:?}", other),
    };

    let args = compound_args(vec![nfs_argop4::READ(READ4args {
        stateid,
        offset: 0,
        count: payload.len() as u32,
    })]);
    let res = compound(args, &context).await;
    assert_eq!(res.status, nfsstat4::NFS4_OK);
    match &res.resarray[0] {
        nfs_resop4::READ(res) => {
            assert!(res.eof);
            assert_eq!(res.data, payload);
        }
        other => panic!("unexpected result {:?}", other),
    }
}

#[tokio::test]
async fn destroy_session_releases_open_states() {
    let (memfs, server) = memfs_server();
    let context = test_context(server);
    let (root_fh, sessionid) = establish_session(&context).await;

    memfs.open_calls.store(0, std::sync::atomic::Ordering::SeqCst);
    memfs.close_calls.store(0, std::sync::atomic::Ordering::SeqCst);

    let args = compound_args(vec![
        nfs_argop4::PUTFH(PUTFH4args { object: nfs_fh4 { data: root_fh } }),
        nfs_argop4::OPEN(OPEN4args {
            seqid: 0,
            share_access: nfs4::OPEN4_SHARE_ACCESS_BOTH,
            share_deny: nfs4::OPEN4_SHARE_DENY_NONE,
            owner: nfs4::open_owner4 { clientid: 0, owner: b"owner-2".to_vec() },
            openhow: openflag4::OPEN4_CREATE(createhow4::UNCHECKED4(Default::default())),
            claim: open_claim4::CLAIM_NULL(b"leaked".to_vec()),
        }),
    ]);
    let res = compound(args, &context).await;
    assert_eq!(res.status, nfsstat4::NFS4_OK);

    let args = compound_args(vec![nfs_argop4::DESTROY_SESSION(DESTROY_SESSION4args {
        dsa_sessionid: sessionid,
    })]);
    let res = compound(args, &context).await;
    assert_eq!(res.status, nfsstat4::NFS4_OK);

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert_eq!(
        memfs.open_calls.load(std::sync::atomic::Ordering::SeqCst),
        memfs.close_calls.load(std::sync::atomic::Ordering::SeqCst),
        "every open held by the session was released"
    );
}

#[tokio::test]
async fn lookup_rejects_dot_names() {
    let (_memfs, server) = memfs_server();
    let context = test_context(server);

    for name in [b".".as_slice(), b".."] {
        let args = compound_args(vec![
            nfs_argop4::PUTROOTFH,
            nfs_argop4::LOOKUP(LOOKUP4args { objname: name.to_vec() }),
        ]);
        let res = compound(args, &context).await;
        assert_eq!(res.status, nfsstat4::NFS4ERR_BADNAME);
        assert_eq!(res.resarray.len(), 2);
    }

    let args = compound_args(vec![
        nfs_argop4::PUTROOTFH,
        nfs_argop4::LOOKUP(LOOKUP4args { objname: Vec::new() }),
    ]);
    let res = compound(args, &context).await;
    assert_eq!(res.status, nfsstat4::NFS4ERR_INVAL);
}

#[tokio::test]
async fn sequence_echoes_slot_and_session() {
    let (_memfs, server) = memfs_server();
    let context = test_context(server);
    let (_root_fh, sessionid) = establish_session(&context).await;

    let args = compound_args(vec![nfs_argop4::SEQUENCE(SEQUENCE4args {
        sa_sessionid: sessionid,
        sa_sequenceid: 9,
        sa_slotid: 5,
        sa_highest_slotid: 7,
        sa_cachethis: false,
    })]);
    let res = compound(args, &context).await;
    assert_eq!(res.status, nfsstat4::NFS4_OK);
    match &res.resarray[0] {
        nfs_resop4::SEQUENCE(res) => {
            assert_eq!(res.sr_sessionid, sessionid);
            assert_eq!(res.sr_sequenceid, 9);
            assert_eq!(res.sr_slotid, 5);
        }
        other => panic!("unexpected result {:?}", other),
    }
}

#[tokio::test]
async fn bad_session_is_rejected() {
    let (_memfs, server) = memfs_server();
    let context = test_context(server);

    let args = compound_args(vec![nfs_argop4::SEQUENCE(SEQUENCE4args {
        sa_sessionid: [9; 16],
        sa_sequenceid: 1,
        sa_slotid: 0,
        sa_highest_slotid: 0,
        sa_cachethis: false,
    })]);
    let res = compound(args, &context).await;
    assert_eq!(res.status, nfsstat4::NFS4ERR_BADSESSION);
}

#[tokio::test]
async fn savefh_and_restorefh_shuffle_registers() {
    let (_memfs, server) = memfs_server();
    let context = test_context(server);
    let (root_fh, _sessionid) = establish_session(&context).await;

    let args = compound_args(vec![
        nfs_argop4::PUTFH(PUTFH4args { object: nfs_fh4 { data: root_fh.clone() } }),
        nfs_argop4::SAVEFH,
        nfs_argop4::PUTROOTFH,
        nfs_argop4::RESTOREFH,
        nfs_argop4::GETFH,
    ]);
    let res = compound(args, &context).await;
    assert_eq!(res.status, nfsstat4::NFS4_OK);
    match &res.resarray[4] {
        nfs_resop4::GETFH(res) => assert_eq!(res.object.data, root_fh),
        other => panic!("unexpected result {:?}", other),
    }
}
