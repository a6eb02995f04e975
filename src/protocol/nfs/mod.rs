//! Program handlers for the NFS protocol family.

pub mod mount;
pub mod portmap;
pub mod v3;
pub mod v4;
