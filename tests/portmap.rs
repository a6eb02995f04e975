//! PORTMAP v2 and rpcbind v3/v4 behavior over the static registration
//! table.

mod common;

use std::io::Cursor;

use chimera_nfs::protocol::nfs::portmap::handle_portmap;
use chimera_nfs::xdr::rpc::call_body;
use chimera_nfs::xdr::{deserialize, portmap, Serialize};
use common::{memfs_server, test_context};

fn run_portmap_proc(
    context: &chimera_nfs::protocol::rpc::Context,
    vers: u32,
    proc: u32,
    args: &[u8],
) -> Cursor<Vec<u8>> {
    let call = call_body {
        rpcvers: 2,
        prog: portmap::PROGRAM,
        vers,
        proc,
        ..Default::default()
    };
    let mut input = Cursor::new(args.to_vec());
    let mut output = Vec::new();
    handle_portmap(0x42, &call, &mut input, &mut output, context).expect("handler runs");

    let mut cursor = Cursor::new(output);
    let header = deserialize::<chimera_nfs::xdr::rpc::rpc_msg>(&mut cursor).expect("rpc header");
    assert_eq!(header.xid, 0x42);
    cursor
}

#[tokio::test]
async fn getport_finds_registered_programs() {
    let (_memfs, server) = memfs_server();
    let context = test_context(server);

    for (prog, port) in [(100003u32, 2049u32), (100005, 20048), (100000, 111)] {
        let mut args = Vec::new();
        portmap::mapping { prog, vers: 3, prot: portmap::IPPROTO_TCP, port: 0 }
            .serialize(&mut args)
            .unwrap();
        let mut reply = run_portmap_proc(
            &context,
            portmap::VERSION,
            portmap::PortmapProgram::PMAPPROC_GETPORT as u32,
            &args,
        );
        let answer: u32 = deserialize(&mut reply).unwrap();
        assert_eq!(answer, port);
    }
}

#[tokio::test]
async fn getport_of_unknown_program_is_zero() {
    let (_memfs, server) = memfs_server();
    let context = test_context(server);

    let mut args = Vec::new();
    portmap::mapping { prog: 999_999, vers: 1, prot: portmap::IPPROTO_TCP, port: 0 }
        .serialize(&mut args)
        .unwrap();
    let mut reply = run_portmap_proc(
        &context,
        portmap::VERSION,
        portmap::PortmapProgram::PMAPPROC_GETPORT as u32,
        &args,
    );
    let answer: u32 = deserialize(&mut reply).unwrap();
    assert_eq!(answer, 0);
}

#[tokio::test]
async fn dump_lists_the_registration_table() {
    let (_memfs, server) = memfs_server();
    let context = test_context(server);

    let mut reply = run_portmap_proc(
        &context,
        portmap::VERSION,
        portmap::PortmapProgram::PMAPPROC_DUMP as u32,
        &[],
    );
    let mut mappings = Vec::new();
    while deserialize::<bool>(&mut reply).unwrap() {
        mappings.push(deserialize::<portmap::mapping>(&mut reply).unwrap());
    }
    // portmap v2/v3/v4, nfs v3/v4, mount v3
    assert_eq!(mappings.len(), 6);
    assert!(mappings
        .iter()
        .any(|m| m.prog == 100003 && m.vers == 4 && m.port == 2049));
    assert!(mappings.iter().any(|m| m.prog == 100005 && m.port == 20048));
    assert!(mappings.iter().all(|m| m.prot == portmap::IPPROTO_TCP));
}

#[tokio::test]
async fn rpcbind_getaddr_returns_universal_address() {
    let (_memfs, server) = memfs_server();
    let context = test_context(server);

    let mut args = Vec::new();
    portmap::rpcb {
        r_prog: 100003,
        r_vers: 4,
        r_netid: "tcp".to_string(),
        r_addr: String::new(),
        r_owner: String::new(),
    }
    .serialize(&mut args)
    .unwrap();

    let mut reply = run_portmap_proc(
        &context,
        portmap::RPCBIND_VERSION4,
        portmap::RpcbindProgram::RPCBPROC_GETADDR as u32,
        &args,
    );
    let uaddr: String = deserialize(&mut reply).unwrap();
    // 2049 = 8 * 256 + 1
    assert_eq!(uaddr, "127.0.0.1.8.1");
}

#[tokio::test]
async fn rpcbind_dump_lists_uaddr_entries() {
    let (_memfs, server) = memfs_server();
    let context = test_context(server);

    let mut reply = run_portmap_proc(
        &context,
        portmap::RPCBIND_VERSION3,
        portmap::RpcbindProgram::RPCBPROC_DUMP as u32,
        &[],
    );
    let mut entries = Vec::new();
    while deserialize::<bool>(&mut reply).unwrap() {
        entries.push(deserialize::<portmap::rpcb>(&mut reply).unwrap());
    }
    assert!(!entries.is_empty());
    assert!(entries.iter().all(|e| e.r_netid == "tcp"));
    assert!(entries.iter().any(|e| e.r_prog == 100003 && e.r_addr.ends_with(".8.1")));
}
