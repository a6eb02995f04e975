//! Protocol layer: XDR codec, RPC machinery and the NFS program
//! handlers (NFSv3, NFSv4, MOUNT, PORTMAP/rpcbind).

pub mod nfs;
pub mod rpc;
pub mod xdr;
