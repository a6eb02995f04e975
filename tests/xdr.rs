//! XDR primitive and structure bijection tests.

use std::fmt::Debug;

use chimera_nfs::xdr::{deserialize, Deserialize, Serialize};

#[derive(Default)]
struct Context {
    buf: Vec<u8>,
}

trait TestValue: Deserialize + Serialize + PartialEq + Default + Debug + Clone {}
impl<T: Deserialize + Serialize + PartialEq + Default + Debug + Clone> TestValue for T {}

impl Context {
    fn check<T: TestValue>(&mut self, src_value: &T) {
        self.buf.clear();
        src_value.serialize(&mut self.buf).expect("cannot serialize");
        assert_eq!(self.buf.len() % 4, 0, "XDR output must be 4-byte aligned");

        let result_value = deserialize::<T>(&mut &self.buf[..]).expect("cannot deserialize");
        assert_eq!(src_value, &result_value);
    }

    fn check_multi<T: TestValue>(&mut self, src_values: &[T]) {
        src_values.iter().for_each(|v| self.check(v));
    }
}

#[test]
fn test_scalar_bijection() {
    let mut ctx = Context::default();

    ctx.check_multi(&[true, false]);

    ctx.check_multi(&[i32::MIN, -1i32, 0i32, 1i32, i32::MAX]);
    ctx.check_multi(&[i64::MIN, -1i64, 0i64, 1i64, i64::MAX]);

    ctx.check_multi(&[u32::MIN, 1u32, 2u32, u32::MAX]);
    ctx.check_multi(&[u64::MIN, 1u64, 2u64, u64::MAX]);
}

#[test]
fn test_opaque_bijection() {
    let mut ctx = Context::default();

    ctx.check(&Vec::<u8>::new());
    ctx.check(&vec![1u8]);
    ctx.check(&vec![1u8, 2, 3]);
    ctx.check(&vec![1u8, 2, 3, 4]);
    ctx.check(&vec![1u8, 2, 3, 4, 5]);
    ctx.check(&(0..255u8).collect::<Vec<u8>>());
}

#[test]
fn test_u32_array_bijection() {
    let mut ctx = Context::default();

    ctx.check(&Vec::<u32>::new());
    ctx.check(&vec![7u32]);
    ctx.check(&vec![1u32, 2, 3, u32::MAX]);
}

#[test]
fn test_string_bijection() {
    let mut ctx = Context::default();

    ctx.check_multi(&[
        String::new(),
        String::from("abc1234+-"),
        String::from("abc"),
        String::from("universal.address.0.1"),
    ]);
}

#[test]
fn test_option_union_bijection() {
    let mut ctx = Context::default();

    ctx.check(&Option::<u64>::None);
    ctx.check(&Some(42u64));
    ctx.check(&Some(vec![1u8, 2, 3]));
}

#[test]
fn test_opaque_padding_layout() {
    // A 5-byte opaque occupies 4 (length) + 5 + 3 (padding) bytes.
    let mut buf = Vec::new();
    vec![9u8; 5].serialize(&mut buf).unwrap();
    assert_eq!(buf.len(), 12);
    assert_eq!(&buf[0..4], &[0, 0, 0, 5]);
    assert_eq!(&buf[9..12], &[0, 0, 0]);
}

mod rpc_types {
    use super::*;
    use chimera_nfs::xdr::rpc;

    #[test]
    fn rpc_message_roundtrip() {
        let msg = rpc::make_success_reply(0x1234_5678);
        let mut buf = Vec::new();
        msg.serialize(&mut buf).unwrap();
        let decoded = deserialize::<rpc::rpc_msg>(&mut &buf[..]).unwrap();
        assert_eq!(decoded.xid, 0x1234_5678);
        assert!(matches!(
            decoded.body,
            rpc::rpc_body::REPLY(rpc::reply_body::MSG_ACCEPTED(_))
        ));
    }

    #[test]
    fn auth_unix_roundtrip() {
        let auth = rpc::auth_unix {
            stamp: 7,
            machinename: b"client".to_vec(),
            uid: 1000,
            gid: 100,
            gids: vec![4, 24, 27],
        };
        let mut buf = Vec::new();
        auth.serialize(&mut buf).unwrap();
        let decoded = deserialize::<rpc::auth_unix>(&mut &buf[..]).unwrap();
        assert_eq!(decoded.uid, 1000);
        assert_eq!(decoded.gids, vec![4, 24, 27]);
        assert_eq!(decoded.machinename, b"client");
    }
}

mod nfs4_types {
    use super::*;
    use chimera_nfs::xdr::nfs4::ops::*;
    use chimera_nfs::xdr::nfs4::{nfs_fh4, nfs_opnum4};

    #[test]
    fn compound_args_roundtrip() {
        let args = COMPOUND4args {
            tag: b"t".to_vec(),
            minorversion: 1,
            argarray: vec![
                nfs_argop4::PUTROOTFH,
                nfs_argop4::LOOKUP(LOOKUP4args { objname: b"share".to_vec() }),
                nfs_argop4::GETFH,
                nfs_argop4::PUTFH(PUTFH4args { object: nfs_fh4 { data: vec![1, 2, 3] } }),
            ],
        };
        let mut buf = Vec::new();
        args.serialize(&mut buf).unwrap();
        let decoded = deserialize::<COMPOUND4args>(&mut &buf[..]).unwrap();
        assert_eq!(decoded.minorversion, 1);
        assert_eq!(decoded.argarray.len(), 4);
        assert_eq!(decoded.argarray[0].opnum(), nfs_opnum4::OP_PUTROOTFH);
        assert_eq!(decoded.argarray[2].opnum(), nfs_opnum4::OP_GETFH);
        match &decoded.argarray[1] {
            nfs_argop4::LOOKUP(lookup) => assert_eq!(lookup.objname, b"share"),
            other => panic!("unexpected op {:?}", other),
        }
    }

    #[test]
    fn dirlist_linked_list_form() {
        let list = dirlist4 {
            entries: vec![
                entry4 { cookie: 3, name: b"a".to_vec(), attrs: Default::default() },
                entry4 { cookie: 4, name: b"b".to_vec(), attrs: Default::default() },
            ],
            eof: true,
        };
        let mut buf = Vec::new();
        list.serialize(&mut buf).unwrap();
        let decoded = deserialize::<dirlist4>(&mut &buf[..]).unwrap();
        assert_eq!(decoded.entries.len(), 2);
        assert_eq!(decoded.entries[1].cookie, 4);
        assert!(decoded.eof);
    }
}
