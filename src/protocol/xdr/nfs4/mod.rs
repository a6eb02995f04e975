//! The module defines XDR data types and constants for Network File System
//! version 4 (RFC 7530 for 4.0, RFC 5661 for 4.1, RFC 7862 for the 4.2
//! operations ALLOCATE/DEALLOCATE/SEEK).
//!
//! NFSv4 folds the side protocols of v3 (MOUNT, lock manager) into a single
//! program with two procedures: NULL and COMPOUND. COMPOUND carries an
//! ordered array of sub-operations that share server-side state (current
//! and saved filehandle, session, stateids).

// Allow unused code since we implement the protocol surface we advertise
#![allow(dead_code)]
// Preserve original RFC naming conventions for consistency with the specification
#![allow(non_camel_case_types)]

use num_derive::{FromPrimitive, ToPrimitive};

use crate::{DeserializeEnum, DeserializeStruct, SerializeEnum, SerializeStruct};

pub mod ops;

/// The RPC program number for NFS (shared with v3; the version selects v4).
pub const PROGRAM: u32 = 100003;
/// The version number for the NFSv4 protocol.
pub const VERSION: u32 = 4;

/// The maximum size in bytes of the opaque file handle.
pub const NFS4_FHSIZE: u32 = 128;
/// The size in bytes of verifiers (write, exclusive-create, client).
pub const NFS4_VERIFIER_SIZE: usize = 8;
/// The size in bytes of a session identifier.
pub const NFS4_SESSIONID_SIZE: usize = 16;
/// The size in bytes of the non-seqid portion of a stateid.
pub const NFS4_OTHER_SIZE: usize = 12;
/// Upper bound for client-supplied opaque values (owners, tags).
pub const NFS4_OPAQUE_LIMIT: usize = 1024;

/// Procedure numbers for the NFSv4 program.
#[allow(clippy::upper_case_acronyms)]
#[derive(Copy, Clone, Debug, FromPrimitive, ToPrimitive)]
pub enum NFS4Program {
    /// Do nothing
    NFSPROC4_NULL = 0,
    /// Execute an ordered array of sub-operations
    NFSPROC4_COMPOUND = 1,
    /// Invalid procedure
    INVALID = 2,
}

/// Verifier used for writes, exclusive creates and client identity.
pub type verifier4 = [u8; NFS4_VERIFIER_SIZE];
/// Session identifier.
pub type sessionid4 = [u8; NFS4_SESSIONID_SIZE];
/// Server-assigned 64-bit client identifier.
pub type clientid4 = u64;
/// Per-slot sequence number.
pub type sequenceid4 = u32;
/// Session slot index.
pub type slotid4 = u32;
/// Open/lock sequence number (v4.0 owner sequencing).
pub type seqid4 = u32;
/// Byte count.
pub type count4 = u32;
/// Byte offset within a file.
pub type offset4 = u64;
/// Byte length of a range.
pub type length4 = u64;
/// Directory iteration cookie.
pub type nfs_cookie4 = u64;
/// Change attribute value.
pub type changeid4 = u64;
/// Filename component.
pub type component4 = Vec<u8>;
/// Link text or other pathname data.
pub type linktext4 = Vec<u8>;
/// UTF-8 string carried as opaque bytes.
pub type utf8str_cs = Vec<u8>;
/// Attribute bitmap: counted array of 32-bit mask words.
pub type bitmap4 = Vec<u32>;

/// The NFS version 4 file handle.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct nfs_fh4 {
    /// Raw file handle data (up to NFS4_FHSIZE bytes)
    pub data: Vec<u8>,
}
DeserializeStruct!(nfs_fh4, data);
SerializeStruct!(nfs_fh4, data);

/// NFSv4 time structure: signed 64-bit seconds since the epoch.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct nfstime4 {
    /// Seconds since Unix epoch (may be negative)
    pub seconds: i64,
    /// Nanoseconds (0-999999999)
    pub nseconds: u32,
}
DeserializeStruct!(nfstime4, seconds, nseconds);
SerializeStruct!(nfstime4, seconds, nseconds);

/// File system identifier reported through the fsid attribute.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct fsid4 {
    /// Major component of the identifier
    pub major: u64,
    /// Minor component of the identifier
    pub minor: u64,
}
DeserializeStruct!(fsid4, major, minor);
SerializeStruct!(fsid4, major, minor);

/// Device numbers for block and character special files.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct specdata4 {
    /// Major device number
    pub specdata1: u32,
    /// Minor device number
    pub specdata2: u32,
}
DeserializeStruct!(specdata4, specdata1, specdata2);
SerializeStruct!(specdata4, specdata1, specdata2);

/// 16-byte opaque state identifier: a sequence number plus 12 bytes that
/// the server encodes as it sees fit (here: slot index and client id).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct stateid4 {
    /// State transition counter, starts at 1 for a fresh state
    pub seqid: u32,
    /// Server-encoded state locator
    pub other: [u8; NFS4_OTHER_SIZE],
}
DeserializeStruct!(stateid4, seqid, other);
SerializeStruct!(stateid4, seqid, other);

/// Attribute bundle: which attributes are present plus their packed
/// XDR-encoded values in bit order.
#[derive(Clone, Debug, Default)]
pub struct fattr4 {
    /// Bitmap naming the attributes present in `attr_vals`
    pub attrmask: bitmap4,
    /// Attribute values, XDR-encoded in ascending bit order
    pub attr_vals: Vec<u8>,
}
DeserializeStruct!(fattr4, attrmask, attr_vals);
SerializeStruct!(fattr4, attrmask, attr_vals);

/// Directory change information returned by namespace-mutating ops.
#[derive(Copy, Clone, Debug, Default)]
pub struct change_info4 {
    /// True when before/after were captured atomically with the operation
    pub atomic: bool,
    /// Directory change value before the operation
    pub before: changeid4,
    /// Directory change value after the operation
    pub after: changeid4,
}
DeserializeStruct!(change_info4, atomic, before, after);
SerializeStruct!(change_info4, atomic, before, after);

/// Session channel attributes (RFC 5661 section 18.36).
#[derive(Clone, Debug, Default)]
pub struct channel_attrs4 {
    /// RDMA header padding size
    pub ca_headerpadsize: count4,
    /// Maximum request size the channel accepts
    pub ca_maxrequestsize: count4,
    /// Maximum response size the channel produces
    pub ca_maxresponsesize: count4,
    /// Maximum response size the channel will cache for replay
    pub ca_maxresponsesize_cached: count4,
    /// Maximum number of operations per COMPOUND
    pub ca_maxoperations: count4,
    /// Maximum number of concurrent requests (slot count)
    pub ca_maxrequests: count4,
    /// RDMA IRD attributes (at most one element)
    pub ca_rdma_ird: Vec<u32>,
}
DeserializeStruct!(
    channel_attrs4,
    ca_headerpadsize,
    ca_maxrequestsize,
    ca_maxresponsesize,
    ca_maxresponsesize_cached,
    ca_maxoperations,
    ca_maxrequests,
    ca_rdma_ird
);
SerializeStruct!(
    channel_attrs4,
    ca_headerpadsize,
    ca_maxrequestsize,
    ca_maxresponsesize,
    ca_maxresponsesize_cached,
    ca_maxoperations,
    ca_maxrequests,
    ca_rdma_ird
);

/// Client-supplied identity for EXCHANGE_ID.
#[derive(Clone, Debug, Default)]
pub struct client_owner4 {
    /// Client incarnation verifier
    pub co_verifier: verifier4,
    /// Client-unique opaque owner string
    pub co_ownerid: Vec<u8>,
}
DeserializeStruct!(client_owner4, co_verifier, co_ownerid);
SerializeStruct!(client_owner4, co_verifier, co_ownerid);

/// Client-supplied identity for SETCLIENTID (v4.0 form).
#[derive(Clone, Debug, Default)]
pub struct nfs_client_id4 {
    /// Client incarnation verifier
    pub verifier: verifier4,
    /// Client-unique opaque identifier
    pub id: Vec<u8>,
}
DeserializeStruct!(nfs_client_id4, verifier, id);
SerializeStruct!(nfs_client_id4, verifier, id);

/// Network address of a callback service.
#[derive(Clone, Debug, Default)]
pub struct clientaddr4 {
    /// Network identifier, e.g. "tcp"
    pub r_netid: String,
    /// Universal address string
    pub r_addr: String,
}
DeserializeStruct!(clientaddr4, r_netid, r_addr);
SerializeStruct!(clientaddr4, r_netid, r_addr);

/// Callback program registration supplied by SETCLIENTID.
#[derive(Clone, Debug, Default)]
pub struct cb_client4 {
    /// Callback RPC program number
    pub cb_program: u32,
    /// Callback service address
    pub cb_location: clientaddr4,
}
DeserializeStruct!(cb_client4, cb_program, cb_location);
SerializeStruct!(cb_client4, cb_program, cb_location);

/// State owner: client id plus an opaque per-client owner string.
#[derive(Clone, Debug, Default)]
pub struct open_owner4 {
    /// The client the owner belongs to
    pub clientid: clientid4,
    /// Opaque owner designation
    pub owner: Vec<u8>,
}
DeserializeStruct!(open_owner4, clientid, owner);
SerializeStruct!(open_owner4, clientid, owner);

/// Server or client implementation identity advertised in EXCHANGE_ID.
#[derive(Clone, Debug, Default)]
pub struct nfs_impl_id4 {
    /// Implementor domain name
    pub nii_domain: Vec<u8>,
    /// Implementation name
    pub nii_name: Vec<u8>,
    /// Implementation date
    pub nii_date: nfstime4,
}
DeserializeStruct!(nfs_impl_id4, nii_domain, nii_name, nii_date);
SerializeStruct!(nfs_impl_id4, nii_domain, nii_name, nii_date);

/// Server identity returned by EXCHANGE_ID.
#[derive(Clone, Debug, Default)]
pub struct server_owner4 {
    /// Minor identifier
    pub so_minor_id: u64,
    /// Major identifier
    pub so_major_id: Vec<u8>,
}
DeserializeStruct!(server_owner4, so_minor_id, so_major_id);
SerializeStruct!(server_owner4, so_minor_id, so_major_id);

/// File types enumerated by the type attribute.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[repr(u32)]
pub enum nfs_ftype4 {
    /// Regular file
    #[default]
    NF4REG = 1,
    /// Directory
    NF4DIR = 2,
    /// Block special device
    NF4BLK = 3,
    /// Character special device
    NF4CHR = 4,
    /// Symbolic link
    NF4LNK = 5,
    /// Socket
    NF4SOCK = 6,
    /// Named pipe
    NF4FIFO = 7,
    /// Attribute directory
    NF4ATTRDIR = 8,
    /// Named attribute
    NF4NAMEDATTR = 9,
}
SerializeEnum!(nfs_ftype4);
DeserializeEnum!(nfs_ftype4);

/// Status codes returned by NFSv4 operations.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[repr(u32)]
pub enum nfsstat4 {
    /// The operation completed successfully.
    #[default]
    NFS4_OK = 0,
    /// Caller is not the owner or a privileged user.
    NFS4ERR_PERM = 1,
    /// No such file or directory.
    NFS4ERR_NOENT = 2,
    /// Hard I/O error.
    NFS4ERR_IO = 5,
    /// No such device or address.
    NFS4ERR_NXIO = 6,
    /// Permission denied.
    NFS4ERR_ACCESS = 13,
    /// File exists.
    NFS4ERR_EXIST = 17,
    /// Attempted cross-device hard link.
    NFS4ERR_XDEV = 18,
    /// Not a directory.
    NFS4ERR_NOTDIR = 20,
    /// Is a directory.
    NFS4ERR_ISDIR = 21,
    /// Invalid argument.
    NFS4ERR_INVAL = 22,
    /// File too large.
    NFS4ERR_FBIG = 27,
    /// No space left on device.
    NFS4ERR_NOSPC = 28,
    /// Read-only file system.
    NFS4ERR_ROFS = 30,
    /// Too many hard links.
    NFS4ERR_MLINK = 31,
    /// Name too long.
    NFS4ERR_NAMETOOLONG = 63,
    /// Directory not empty.
    NFS4ERR_NOTEMPTY = 66,
    /// Quota hard limit exceeded.
    NFS4ERR_DQUOT = 69,
    /// File handle no longer valid.
    NFS4ERR_STALE = 70,
    /// Illegal NFS file handle.
    NFS4ERR_BADHANDLE = 10001,
    /// READDIR cookie is stale.
    NFS4ERR_BAD_COOKIE = 10003,
    /// Operation not supported.
    NFS4ERR_NOTSUPP = 10004,
    /// Response limit exceeded.
    NFS4ERR_TOOSMALL = 10005,
    /// Undefined server error.
    NFS4ERR_SERVERFAULT = 10006,
    /// Type not supported by the server.
    NFS4ERR_BADTYPE = 10007,
    /// File "busy" - retry later.
    NFS4ERR_DELAY = 10008,
    /// NVERIFY says attributes are the same.
    NFS4ERR_SAME = 10009,
    /// Lock unavailable.
    NFS4ERR_DENIED = 10010,
    /// Lock lease expired.
    NFS4ERR_EXPIRED = 10011,
    /// I/O failed due to lock.
    NFS4ERR_LOCKED = 10012,
    /// In grace period.
    NFS4ERR_GRACE = 10013,
    /// File handle expired.
    NFS4ERR_FHEXPIRED = 10014,
    /// Share reservation denied.
    NFS4ERR_SHARE_DENIED = 10015,
    /// Wrong security flavor.
    NFS4ERR_WRONGSEC = 10016,
    /// Client ID in use.
    NFS4ERR_CLID_INUSE = 10017,
    /// Resource exhaustion.
    NFS4ERR_RESOURCE = 10018,
    /// File system relocated.
    NFS4ERR_MOVED = 10019,
    /// Current FH is not set.
    NFS4ERR_NOFILEHANDLE = 10020,
    /// Minor version not supported.
    NFS4ERR_MINOR_VERS_MISMATCH = 10021,
    /// Server has rebooted; client ID is stale.
    NFS4ERR_STALE_CLIENTID = 10022,
    /// Server has rebooted; stateid is stale.
    NFS4ERR_STALE_STATEID = 10023,
    /// State is out of sync.
    NFS4ERR_OLD_STATEID = 10024,
    /// Incorrect stateid.
    NFS4ERR_BAD_STATEID = 10025,
    /// Request is out of sequence.
    NFS4ERR_BAD_SEQID = 10026,
    /// VERIFY says attributes are not the same.
    NFS4ERR_NOT_SAME = 10027,
    /// Overlapping lock range.
    NFS4ERR_LOCK_RANGE = 10028,
    /// Should be file/directory, is a symlink.
    NFS4ERR_SYMLINK = 10029,
    /// No saved filehandle to restore.
    NFS4ERR_RESTOREFH = 10030,
    /// Lease moved with the file system.
    NFS4ERR_LEASE_MOVED = 10031,
    /// Recommended attribute not supported.
    NFS4ERR_ATTRNOTSUPP = 10032,
    /// Reclaim outside of grace.
    NFS4ERR_NO_GRACE = 10033,
    /// Reclaim error at server.
    NFS4ERR_RECLAIM_BAD = 10034,
    /// Conflict on reclaim.
    NFS4ERR_RECLAIM_CONFLICT = 10035,
    /// XDR decode failed.
    NFS4ERR_BADXDR = 10036,
    /// Locks held at CLOSE.
    NFS4ERR_LOCKS_HELD = 10037,
    /// Conflict in OPEN and I/O mode.
    NFS4ERR_OPENMODE = 10038,
    /// Owner translation bad.
    NFS4ERR_BADOWNER = 10039,
    /// UTF-8 character not supported.
    NFS4ERR_BADCHAR = 10040,
    /// Name not supported (".", "..").
    NFS4ERR_BADNAME = 10041,
    /// Lock range not supported.
    NFS4ERR_BAD_RANGE = 10042,
    /// No atomic up/downgrade.
    NFS4ERR_LOCK_NOTSUPP = 10043,
    /// Undefined operation.
    NFS4ERR_OP_ILLEGAL = 10044,
    /// File locking deadlock.
    NFS4ERR_DEADLOCK = 10045,
    /// Open file blocks the operation.
    NFS4ERR_FILE_OPEN = 10046,
    /// Lockowner state revoked.
    NFS4ERR_ADMIN_REVOKED = 10047,
    /// Callback path down.
    NFS4ERR_CB_PATH_DOWN = 10048,
    /// Bad session identifier.
    NFS4ERR_BADSESSION = 10052,
    /// Bad slot identifier.
    NFS4ERR_BADSLOT = 10053,
    /// Session persistence not satisfied.
    NFS4ERR_REP_TOO_BIG = 10059,
    /// Reply would not fit in the cached slot.
    NFS4ERR_REP_TOO_BIG_TO_CACHE = 10060,
    /// Retry an uncached reply.
    NFS4ERR_RETRY_UNCACHED_REP = 10061,
    /// Sequence operation misordered.
    NFS4ERR_SEQ_MISORDERED = 10063,
    /// Operation not permitted in this position of the compound.
    NFS4ERR_OP_NOT_IN_SESSION = 10071,
}
SerializeEnum!(nfsstat4);
DeserializeEnum!(nfsstat4);

/// Operation numbers carried in COMPOUND arg and result arrays.
#[allow(clippy::upper_case_acronyms)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[repr(u32)]
pub enum nfs_opnum4 {
    #[default]
    OP_ACCESS = 3,
    OP_CLOSE = 4,
    OP_COMMIT = 5,
    OP_CREATE = 6,
    OP_DELEGPURGE = 7,
    OP_DELEGRETURN = 8,
    OP_GETATTR = 9,
    OP_GETFH = 10,
    OP_LINK = 11,
    OP_LOCK = 12,
    OP_LOCKT = 13,
    OP_LOCKU = 14,
    OP_LOOKUP = 15,
    OP_LOOKUPP = 16,
    OP_NVERIFY = 17,
    OP_OPEN = 18,
    OP_OPENATTR = 19,
    OP_OPEN_CONFIRM = 20,
    OP_OPEN_DOWNGRADE = 21,
    OP_PUTFH = 22,
    OP_PUTPUBFH = 23,
    OP_PUTROOTFH = 24,
    OP_READ = 25,
    OP_READDIR = 26,
    OP_READLINK = 27,
    OP_REMOVE = 28,
    OP_RENAME = 29,
    OP_RENEW = 30,
    OP_RESTOREFH = 31,
    OP_SAVEFH = 32,
    OP_SECINFO = 33,
    OP_SETATTR = 34,
    OP_SETCLIENTID = 35,
    OP_SETCLIENTID_CONFIRM = 36,
    OP_VERIFY = 37,
    OP_WRITE = 38,
    OP_RELEASE_LOCKOWNER = 39,
    OP_BACKCHANNEL_CTL = 40,
    OP_BIND_CONN_TO_SESSION = 41,
    OP_EXCHANGE_ID = 42,
    OP_CREATE_SESSION = 43,
    OP_DESTROY_SESSION = 44,
    OP_FREE_STATEID = 45,
    OP_GET_DIR_DELEGATION = 46,
    OP_GETDEVICEINFO = 47,
    OP_GETDEVICELIST = 48,
    OP_LAYOUTCOMMIT = 49,
    OP_LAYOUTGET = 50,
    OP_LAYOUTRETURN = 51,
    OP_SECINFO_NO_NAME = 52,
    OP_SEQUENCE = 53,
    OP_SET_SSV = 54,
    OP_TEST_STATEID = 55,
    OP_WANT_DELEGATION = 56,
    OP_DESTROY_CLIENTID = 57,
    OP_RECLAIM_COMPLETE = 58,
    OP_ALLOCATE = 59,
    OP_COPY = 60,
    OP_COPY_NOTIFY = 61,
    OP_DEALLOCATE = 62,
    OP_IO_ADVISE = 63,
    OP_LAYOUTERROR = 64,
    OP_LAYOUTSTATS = 65,
    OP_OFFLOAD_CANCEL = 66,
    OP_OFFLOAD_STATUS = 67,
    OP_READ_PLUS = 68,
    OP_SEEK = 69,
    OP_WRITE_SAME = 70,
    OP_CLONE = 71,
    OP_ILLEGAL = 10044,
}
SerializeEnum!(nfs_opnum4);
DeserializeEnum!(nfs_opnum4);

// Attribute numbers for the fattr4 bitmap (RFC 7530 section 5).
pub const FATTR4_SUPPORTED_ATTRS: u32 = 0;
pub const FATTR4_TYPE: u32 = 1;
pub const FATTR4_FH_EXPIRE_TYPE: u32 = 2;
pub const FATTR4_CHANGE: u32 = 3;
pub const FATTR4_SIZE: u32 = 4;
pub const FATTR4_LINK_SUPPORT: u32 = 5;
pub const FATTR4_SYMLINK_SUPPORT: u32 = 6;
pub const FATTR4_NAMED_ATTR: u32 = 7;
pub const FATTR4_FSID: u32 = 8;
pub const FATTR4_UNIQUE_HANDLES: u32 = 9;
pub const FATTR4_LEASE_TIME: u32 = 10;
pub const FATTR4_RDATTR_ERROR: u32 = 11;
pub const FATTR4_ACL: u32 = 12;
pub const FATTR4_ACLSUPPORT: u32 = 13;
pub const FATTR4_ARCHIVE: u32 = 14;
pub const FATTR4_CANSETTIME: u32 = 15;
pub const FATTR4_CASE_INSENSITIVE: u32 = 16;
pub const FATTR4_CASE_PRESERVING: u32 = 17;
pub const FATTR4_CHOWN_RESTRICTED: u32 = 18;
pub const FATTR4_FILEHANDLE: u32 = 19;
pub const FATTR4_FILEID: u32 = 20;
pub const FATTR4_FILES_AVAIL: u32 = 21;
pub const FATTR4_FILES_FREE: u32 = 22;
pub const FATTR4_FILES_TOTAL: u32 = 23;
pub const FATTR4_HIDDEN: u32 = 25;
pub const FATTR4_HOMOGENEOUS: u32 = 26;
pub const FATTR4_MAXFILESIZE: u32 = 27;
pub const FATTR4_MAXLINK: u32 = 28;
pub const FATTR4_MAXNAME: u32 = 29;
pub const FATTR4_MAXREAD: u32 = 30;
pub const FATTR4_MAXWRITE: u32 = 31;
pub const FATTR4_MODE: u32 = 33;
pub const FATTR4_NO_TRUNC: u32 = 34;
pub const FATTR4_NUMLINKS: u32 = 35;
pub const FATTR4_OWNER: u32 = 36;
pub const FATTR4_OWNER_GROUP: u32 = 37;
pub const FATTR4_RAWDEV: u32 = 41;
pub const FATTR4_SPACE_AVAIL: u32 = 42;
pub const FATTR4_SPACE_FREE: u32 = 43;
pub const FATTR4_SPACE_TOTAL: u32 = 44;
pub const FATTR4_SPACE_USED: u32 = 45;
pub const FATTR4_TIME_ACCESS: u32 = 47;
pub const FATTR4_TIME_ACCESS_SET: u32 = 48;
pub const FATTR4_TIME_DELTA: u32 = 51;
pub const FATTR4_TIME_METADATA: u32 = 52;
pub const FATTR4_TIME_MODIFY: u32 = 53;
pub const FATTR4_TIME_MODIFY_SET: u32 = 54;
pub const FATTR4_MOUNTED_ON_FILEID: u32 = 55;

// ACCESS bits (same values as v3).
pub const ACCESS4_READ: u32 = 0x0001;
pub const ACCESS4_LOOKUP: u32 = 0x0002;
pub const ACCESS4_MODIFY: u32 = 0x0004;
pub const ACCESS4_EXTEND: u32 = 0x0008;
pub const ACCESS4_DELETE: u32 = 0x0010;
pub const ACCESS4_EXECUTE: u32 = 0x0020;

// OPEN share access / deny bits.
pub const OPEN4_SHARE_ACCESS_READ: u32 = 0x0001;
pub const OPEN4_SHARE_ACCESS_WRITE: u32 = 0x0002;
pub const OPEN4_SHARE_ACCESS_BOTH: u32 = 0x0003;
pub const OPEN4_SHARE_DENY_NONE: u32 = 0x0000;

// OPEN result flags.
pub const OPEN4_RESULT_CONFIRM: u32 = 0x0002;
pub const OPEN4_RESULT_LOCKTYPE_POSIX: u32 = 0x0004;

// EXCHANGE_ID flags.
pub const EXCHGID4_FLAG_USE_NON_PNFS: u32 = 0x00010000;

// CREATE_SESSION flags.
pub const CREATE_SESSION4_FLAG_PERSIST: u32 = 0x0001;
pub const CREATE_SESSION4_FLAG_CONN_BACK_CHAN: u32 = 0x0002;

// State protection discriminants for EXCHANGE_ID.
pub const SP4_NONE: u32 = 0;

// SEEK content discriminants.
pub const NFS4_CONTENT_DATA: u32 = 0;
pub const NFS4_CONTENT_HOLE: u32 = 1;

// Mode bits for the mode attribute (lower 12 bits of POSIX mode).
pub const MODE4_MASK: u32 = 0o7777;

/// File type bits folded into the VFS mode word.
pub mod type_bits {
    pub const S_IFMT: u32 = 0o170000;
    pub const S_IFSOCK: u32 = 0o140000;
    pub const S_IFLNK: u32 = 0o120000;
    pub const S_IFREG: u32 = 0o100000;
    pub const S_IFBLK: u32 = 0o060000;
    pub const S_IFDIR: u32 = 0o040000;
    pub const S_IFCHR: u32 = 0o020000;
    pub const S_IFIFO: u32 = 0o010000;
}
