//! Argument and result structures for the NFSv4 COMPOUND sub-operations,
//! together with the `nfs_argop4`/`nfs_resop4` discriminated unions and the
//! COMPOUND procedure envelope.
//!
//! Result unions follow the RFC switch-on-status convention: the ok arm is
//! present on the wire only when the status is NFS4_OK. The local
//! `SerializeStatusRes!` macro captures that shape.

#![allow(dead_code)]
#![allow(non_camel_case_types)]

use std::io::{Read, Write};

use num_derive::{FromPrimitive, ToPrimitive};

use super::*;
use crate::protocol::xdr::{
    deserialize, deserialize_array, invalid_data, serialize_array, Deserialize, Serialize,
};
use crate::{DeserializeEnum, DeserializeStruct, SerializeEnum, SerializeStruct};

/// Upper bound on sub-operations accepted in one COMPOUND.
pub const COMPOUND_MAX_OPS: usize = 256;

/// Implements the RFC result-union shape: status discriminates whether the
/// remaining fields are present on the wire.
macro_rules! SerializeStatusRes {
    ($t:ident, $($element:ident),*) => {
        impl Serialize for $t {
            fn serialize<W: Write + ?Sized>(&self, dest: &mut W) -> std::io::Result<()> {
                self.status.serialize(dest)?;
                if self.status == nfsstat4::NFS4_OK {
                    $(self.$element.serialize(dest)?;)*
                }
                Ok(())
            }
        }

        impl Deserialize for $t {
            fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
                self.status.deserialize(src)?;
                if self.status == nfsstat4::NFS4_OK {
                    $(self.$element.deserialize(src)?;)*
                }
                Ok(())
            }
        }
    };
}

// ---------------------------------------------------------------- ACCESS

#[derive(Clone, Debug, Default)]
pub struct ACCESS4args {
    /// Access rights the client wants checked (ACCESS4_* bits)
    pub access: u32,
}
DeserializeStruct!(ACCESS4args, access);
SerializeStruct!(ACCESS4args, access);

#[derive(Clone, Debug, Default)]
pub struct ACCESS4res {
    pub status: nfsstat4,
    /// Rights the server evaluated
    pub supported: u32,
    /// Rights the caller holds
    pub access: u32,
}
SerializeStatusRes!(ACCESS4res, supported, access);

// ----------------------------------------------------------------- CLOSE

#[derive(Clone, Debug, Default)]
pub struct CLOSE4args {
    /// Owner sequencing (unused with sessions)
    pub seqid: seqid4,
    /// State being closed
    pub open_stateid: stateid4,
}
DeserializeStruct!(CLOSE4args, seqid, open_stateid);
SerializeStruct!(CLOSE4args, seqid, open_stateid);

#[derive(Clone, Debug, Default)]
pub struct CLOSE4res {
    pub status: nfsstat4,
    /// The closed stateid echoed back
    pub open_stateid: stateid4,
}
SerializeStatusRes!(CLOSE4res, open_stateid);

// ---------------------------------------------------------------- COMMIT

#[derive(Clone, Debug, Default)]
pub struct COMMIT4args {
    pub offset: offset4,
    pub count: count4,
}
DeserializeStruct!(COMMIT4args, offset, count);
SerializeStruct!(COMMIT4args, offset, count);

#[derive(Clone, Debug, Default)]
pub struct COMMIT4res {
    pub status: nfsstat4,
    /// Boot verifier so clients can detect server restarts
    pub writeverf: verifier4,
}
SerializeStatusRes!(COMMIT4res, writeverf);

// ---------------------------------------------------------------- CREATE

/// Object kind for the CREATE operation (non-regular objects only; regular
/// files are created by OPEN).
#[derive(Clone, Debug)]
pub enum createtype4 {
    /// Symbolic link with its target
    NF4LNK(linktext4),
    /// Block device with device numbers
    NF4BLK(specdata4),
    /// Character device with device numbers
    NF4CHR(specdata4),
    /// Socket
    NF4SOCK,
    /// Named pipe
    NF4FIFO,
    /// Directory
    NF4DIR,
}

impl Default for createtype4 {
    fn default() -> createtype4 {
        createtype4::NF4DIR
    }
}

impl Serialize for createtype4 {
    fn serialize<W: Write + ?Sized>(&self, dest: &mut W) -> std::io::Result<()> {
        match self {
            createtype4::NF4LNK(target) => {
                (nfs_ftype4::NF4LNK as u32).serialize(dest)?;
                target.serialize(dest)
            }
            createtype4::NF4BLK(spec) => {
                (nfs_ftype4::NF4BLK as u32).serialize(dest)?;
                spec.serialize(dest)
            }
            createtype4::NF4CHR(spec) => {
                (nfs_ftype4::NF4CHR as u32).serialize(dest)?;
                spec.serialize(dest)
            }
            createtype4::NF4SOCK => (nfs_ftype4::NF4SOCK as u32).serialize(dest),
            createtype4::NF4FIFO => (nfs_ftype4::NF4FIFO as u32).serialize(dest),
            createtype4::NF4DIR => (nfs_ftype4::NF4DIR as u32).serialize(dest),
        }
    }
}

impl Deserialize for createtype4 {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        let ftype: u32 = deserialize(src)?;
        *self = match ftype {
            x if x == nfs_ftype4::NF4LNK as u32 => createtype4::NF4LNK(deserialize(src)?),
            x if x == nfs_ftype4::NF4BLK as u32 => createtype4::NF4BLK(deserialize(src)?),
            x if x == nfs_ftype4::NF4CHR as u32 => createtype4::NF4CHR(deserialize(src)?),
            x if x == nfs_ftype4::NF4SOCK as u32 => createtype4::NF4SOCK,
            x if x == nfs_ftype4::NF4FIFO as u32 => createtype4::NF4FIFO,
            x if x == nfs_ftype4::NF4DIR as u32 => createtype4::NF4DIR,
            other => return Err(invalid_data(&format!("Invalid createtype4: {other}"))),
        };
        Ok(())
    }
}

#[derive(Clone, Debug, Default)]
pub struct CREATE4args {
    pub objtype: createtype4,
    pub objname: component4,
    pub createattrs: fattr4,
}
DeserializeStruct!(CREATE4args, objtype, objname, createattrs);
SerializeStruct!(CREATE4args, objtype, objname, createattrs);

#[derive(Clone, Debug, Default)]
pub struct CREATE4res {
    pub status: nfsstat4,
    pub cinfo: change_info4,
    /// Attributes the server actually applied
    pub attrset: bitmap4,
}
SerializeStatusRes!(CREATE4res, cinfo, attrset);

// ----------------------------------------------------------- DELEGRETURN

#[derive(Clone, Debug, Default)]
pub struct DELEGRETURN4args {
    pub deleg_stateid: stateid4,
}
DeserializeStruct!(DELEGRETURN4args, deleg_stateid);
SerializeStruct!(DELEGRETURN4args, deleg_stateid);

#[derive(Clone, Debug, Default)]
pub struct DELEGRETURN4res {
    pub status: nfsstat4,
}
SerializeStatusRes!(DELEGRETURN4res,);

// --------------------------------------------------------------- GETATTR

#[derive(Clone, Debug, Default)]
pub struct GETATTR4args {
    pub attr_request: bitmap4,
}
DeserializeStruct!(GETATTR4args, attr_request);
SerializeStruct!(GETATTR4args, attr_request);

#[derive(Clone, Debug, Default)]
pub struct GETATTR4res {
    pub status: nfsstat4,
    pub obj_attributes: fattr4,
}
SerializeStatusRes!(GETATTR4res, obj_attributes);

// ----------------------------------------------------------------- GETFH

#[derive(Clone, Debug, Default)]
pub struct GETFH4res {
    pub status: nfsstat4,
    pub object: nfs_fh4,
}
SerializeStatusRes!(GETFH4res, object);

// ------------------------------------------------------------------ LINK

#[derive(Clone, Debug, Default)]
pub struct LINK4args {
    pub newname: component4,
}
DeserializeStruct!(LINK4args, newname);
SerializeStruct!(LINK4args, newname);

#[derive(Clone, Debug, Default)]
pub struct LINK4res {
    pub status: nfsstat4,
    pub cinfo: change_info4,
}
SerializeStatusRes!(LINK4res, cinfo);

// ---------------------------------------------------------------- LOOKUP

#[derive(Clone, Debug, Default)]
pub struct LOOKUP4args {
    pub objname: component4,
}
DeserializeStruct!(LOOKUP4args, objname);
SerializeStruct!(LOOKUP4args, objname);

#[derive(Clone, Debug, Default)]
pub struct LOOKUP4res {
    pub status: nfsstat4,
}
SerializeStatusRes!(LOOKUP4res,);

#[derive(Clone, Debug, Default)]
pub struct LOOKUPP4res {
    pub status: nfsstat4,
}
SerializeStatusRes!(LOOKUPP4res,);

// ------------------------------------------------------------------ OPEN

/// How OPEN creates the object when opentype is CREATE.
#[derive(Clone, Debug)]
pub enum createhow4 {
    /// Create or open the existing file, applying the attributes
    UNCHECKED4(fattr4),
    /// Create only if absent, applying the attributes
    GUARDED4(fattr4),
    /// v4.0 exclusive create keyed by the verifier
    EXCLUSIVE4(verifier4),
    /// v4.1 exclusive create carrying a verifier and attributes
    EXCLUSIVE4_1(verifier4, fattr4),
}

impl Default for createhow4 {
    fn default() -> createhow4 {
        createhow4::UNCHECKED4(fattr4::default())
    }
}

impl Serialize for createhow4 {
    fn serialize<W: Write + ?Sized>(&self, dest: &mut W) -> std::io::Result<()> {
        match self {
            createhow4::UNCHECKED4(attrs) => {
                0_u32.serialize(dest)?;
                attrs.serialize(dest)
            }
            createhow4::GUARDED4(attrs) => {
                1_u32.serialize(dest)?;
                attrs.serialize(dest)
            }
            createhow4::EXCLUSIVE4(verf) => {
                2_u32.serialize(dest)?;
                verf.serialize(dest)
            }
            createhow4::EXCLUSIVE4_1(verf, attrs) => {
                3_u32.serialize(dest)?;
                verf.serialize(dest)?;
                attrs.serialize(dest)
            }
        }
    }
}

impl Deserialize for createhow4 {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        *self = match deserialize::<u32>(src)? {
            0 => createhow4::UNCHECKED4(deserialize(src)?),
            1 => createhow4::GUARDED4(deserialize(src)?),
            2 => createhow4::EXCLUSIVE4(deserialize(src)?),
            3 => createhow4::EXCLUSIVE4_1(deserialize(src)?, deserialize(src)?),
            mode => return Err(invalid_data(&format!("Invalid createhow4 mode: {mode}"))),
        };
        Ok(())
    }
}

/// Whether OPEN may create the object.
#[derive(Clone, Debug, Default)]
pub enum openflag4 {
    /// Open an existing object
    #[default]
    OPEN4_NOCREATE,
    /// Create the object according to the enclosed createhow
    OPEN4_CREATE(createhow4),
}

impl Serialize for openflag4 {
    fn serialize<W: Write + ?Sized>(&self, dest: &mut W) -> std::io::Result<()> {
        match self {
            openflag4::OPEN4_NOCREATE => 0_u32.serialize(dest),
            openflag4::OPEN4_CREATE(how) => {
                1_u32.serialize(dest)?;
                how.serialize(dest)
            }
        }
    }
}

impl Deserialize for openflag4 {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        *self = match deserialize::<u32>(src)? {
            0 => openflag4::OPEN4_NOCREATE,
            1 => openflag4::OPEN4_CREATE(deserialize(src)?),
            opentype => return Err(invalid_data(&format!("Invalid opentype4: {opentype}"))),
        };
        Ok(())
    }
}

/// What the client claims about the object being opened.
#[derive(Clone, Debug)]
pub enum open_claim4 {
    /// Open by name relative to the current FH
    CLAIM_NULL(component4),
    /// Reclaim after server restart; the delegate type is carried
    CLAIM_PREVIOUS(u32),
    /// Open the current FH directly (v4.1)
    CLAIM_FH,
}

impl Default for open_claim4 {
    fn default() -> open_claim4 {
        open_claim4::CLAIM_NULL(Vec::new())
    }
}

impl Serialize for open_claim4 {
    fn serialize<W: Write + ?Sized>(&self, dest: &mut W) -> std::io::Result<()> {
        match self {
            open_claim4::CLAIM_NULL(name) => {
                0_u32.serialize(dest)?;
                name.serialize(dest)
            }
            open_claim4::CLAIM_PREVIOUS(delegate_type) => {
                1_u32.serialize(dest)?;
                delegate_type.serialize(dest)
            }
            open_claim4::CLAIM_FH => 4_u32.serialize(dest),
        }
    }
}

impl Deserialize for open_claim4 {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        *self = match deserialize::<u32>(src)? {
            0 => open_claim4::CLAIM_NULL(deserialize(src)?),
            1 => open_claim4::CLAIM_PREVIOUS(deserialize(src)?),
            4 => open_claim4::CLAIM_FH,
            claim => return Err(invalid_data(&format!("Unsupported open claim: {claim}"))),
        };
        Ok(())
    }
}

#[derive(Clone, Debug, Default)]
pub struct OPEN4args {
    pub seqid: seqid4,
    pub share_access: u32,
    pub share_deny: u32,
    pub owner: open_owner4,
    pub openhow: openflag4,
    pub claim: open_claim4,
}
DeserializeStruct!(OPEN4args, seqid, share_access, share_deny, owner, openhow, claim);
SerializeStruct!(OPEN4args, seqid, share_access, share_deny, owner, openhow, claim);

/// Delegation returned by OPEN; this server never grants one.
#[derive(Copy, Clone, Debug, Default)]
pub enum open_delegation4 {
    /// No delegation granted
    #[default]
    OPEN_DELEGATE_NONE,
}

impl Serialize for open_delegation4 {
    fn serialize<W: Write + ?Sized>(&self, dest: &mut W) -> std::io::Result<()> {
        0_u32.serialize(dest)
    }
}

impl Deserialize for open_delegation4 {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        match deserialize::<u32>(src)? {
            0 => Ok(()),
            kind => Err(invalid_data(&format!("Unsupported delegation type: {kind}"))),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct OPEN4res {
    pub status: nfsstat4,
    pub stateid: stateid4,
    pub cinfo: change_info4,
    pub rflags: u32,
    pub attrset: bitmap4,
    pub delegation: open_delegation4,
}
SerializeStatusRes!(OPEN4res, stateid, cinfo, rflags, attrset, delegation);

#[derive(Clone, Debug, Default)]
pub struct OPEN_CONFIRM4args {
    pub open_stateid: stateid4,
    pub seqid: seqid4,
}
DeserializeStruct!(OPEN_CONFIRM4args, open_stateid, seqid);
SerializeStruct!(OPEN_CONFIRM4args, open_stateid, seqid);

#[derive(Clone, Debug, Default)]
pub struct OPEN_CONFIRM4res {
    pub status: nfsstat4,
    pub open_stateid: stateid4,
}
SerializeStatusRes!(OPEN_CONFIRM4res, open_stateid);

#[derive(Clone, Debug, Default)]
pub struct OPEN_DOWNGRADE4args {
    pub open_stateid: stateid4,
    pub seqid: seqid4,
    pub share_access: u32,
    pub share_deny: u32,
}
DeserializeStruct!(OPEN_DOWNGRADE4args, open_stateid, seqid, share_access, share_deny);
SerializeStruct!(OPEN_DOWNGRADE4args, open_stateid, seqid, share_access, share_deny);

#[derive(Clone, Debug, Default)]
pub struct OPEN_DOWNGRADE4res {
    pub status: nfsstat4,
    pub open_stateid: stateid4,
}
SerializeStatusRes!(OPEN_DOWNGRADE4res, open_stateid);

// ----------------------------------------------------------------- PUTFH

#[derive(Clone, Debug, Default)]
pub struct PUTFH4args {
    pub object: nfs_fh4,
}
DeserializeStruct!(PUTFH4args, object);
SerializeStruct!(PUTFH4args, object);

#[derive(Clone, Debug, Default)]
pub struct PUTFH4res {
    pub status: nfsstat4,
}
SerializeStatusRes!(PUTFH4res,);

#[derive(Clone, Debug, Default)]
pub struct PUTPUBFH4res {
    pub status: nfsstat4,
}
SerializeStatusRes!(PUTPUBFH4res,);

#[derive(Clone, Debug, Default)]
pub struct PUTROOTFH4res {
    pub status: nfsstat4,
}
SerializeStatusRes!(PUTROOTFH4res,);

// ------------------------------------------------------------------ READ

#[derive(Clone, Debug, Default)]
pub struct READ4args {
    pub stateid: stateid4,
    pub offset: offset4,
    pub count: count4,
}
DeserializeStruct!(READ4args, stateid, offset, count);
SerializeStruct!(READ4args, stateid, offset, count);

#[derive(Clone, Debug, Default)]
pub struct READ4res {
    pub status: nfsstat4,
    pub eof: bool,
    pub data: Vec<u8>,
}
SerializeStatusRes!(READ4res, eof, data);

// --------------------------------------------------------------- READDIR

#[derive(Clone, Debug, Default)]
pub struct READDIR4args {
    pub cookie: nfs_cookie4,
    pub cookieverf: verifier4,
    pub dircount: count4,
    pub maxcount: count4,
    pub attr_request: bitmap4,
}
DeserializeStruct!(READDIR4args, cookie, cookieverf, dircount, maxcount, attr_request);
SerializeStruct!(READDIR4args, cookie, cookieverf, dircount, maxcount, attr_request);

/// One directory entry with its requested attributes.
#[derive(Clone, Debug, Default)]
pub struct entry4 {
    pub cookie: nfs_cookie4,
    pub name: component4,
    pub attrs: fattr4,
}
DeserializeStruct!(entry4, cookie, name, attrs);
SerializeStruct!(entry4, cookie, name, attrs);

/// Directory listing: the wire form is an XDR linked list of entries
/// terminated by a FALSE discriminant, followed by the eof flag.
#[derive(Clone, Debug, Default)]
pub struct dirlist4 {
    pub entries: Vec<entry4>,
    pub eof: bool,
}

impl Serialize for dirlist4 {
    fn serialize<W: Write + ?Sized>(&self, dest: &mut W) -> std::io::Result<()> {
        for entry in &self.entries {
            true.serialize(dest)?;
            entry.serialize(dest)?;
        }
        false.serialize(dest)?;
        self.eof.serialize(dest)
    }
}

impl Deserialize for dirlist4 {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        self.entries.clear();
        loop {
            let more: bool = deserialize(src)?;
            if !more {
                break;
            }
            self.entries.push(deserialize(src)?);
        }
        self.eof.deserialize(src)
    }
}

#[derive(Clone, Debug, Default)]
pub struct READDIR4res {
    pub status: nfsstat4,
    pub cookieverf: verifier4,
    pub reply: dirlist4,
}
SerializeStatusRes!(READDIR4res, cookieverf, reply);

// -------------------------------------------------------------- READLINK

#[derive(Clone, Debug, Default)]
pub struct READLINK4res {
    pub status: nfsstat4,
    pub link: linktext4,
}
SerializeStatusRes!(READLINK4res, link);

// ---------------------------------------------------------------- REMOVE

#[derive(Clone, Debug, Default)]
pub struct REMOVE4args {
    pub target: component4,
}
DeserializeStruct!(REMOVE4args, target);
SerializeStruct!(REMOVE4args, target);

#[derive(Clone, Debug, Default)]
pub struct REMOVE4res {
    pub status: nfsstat4,
    pub cinfo: change_info4,
}
SerializeStatusRes!(REMOVE4res, cinfo);

// ---------------------------------------------------------------- RENAME

#[derive(Clone, Debug, Default)]
pub struct RENAME4args {
    pub oldname: component4,
    pub newname: component4,
}
DeserializeStruct!(RENAME4args, oldname, newname);
SerializeStruct!(RENAME4args, oldname, newname);

#[derive(Clone, Debug, Default)]
pub struct RENAME4res {
    pub status: nfsstat4,
    pub source_cinfo: change_info4,
    pub target_cinfo: change_info4,
}
SerializeStatusRes!(RENAME4res, source_cinfo, target_cinfo);

// ----------------------------------------------------------------- RENEW

#[derive(Clone, Debug, Default)]
pub struct RENEW4args {
    pub clientid: clientid4,
}
DeserializeStruct!(RENEW4args, clientid);
SerializeStruct!(RENEW4args, clientid);

#[derive(Clone, Debug, Default)]
pub struct RENEW4res {
    pub status: nfsstat4,
}
SerializeStatusRes!(RENEW4res,);

#[derive(Clone, Debug, Default)]
pub struct RESTOREFH4res {
    pub status: nfsstat4,
}
SerializeStatusRes!(RESTOREFH4res,);

#[derive(Clone, Debug, Default)]
pub struct SAVEFH4res {
    pub status: nfsstat4,
}
SerializeStatusRes!(SAVEFH4res,);

// ------------------------------------------------------ SECINFO_NO_NAME

/// Security flavor descriptor; only AUTH_NONE and AUTH_SYS are advertised,
/// neither of which carries a body.
#[derive(Copy, Clone, Debug, Default)]
pub struct secinfo4 {
    pub flavor: u32,
}
DeserializeStruct!(secinfo4, flavor);
SerializeStruct!(secinfo4, flavor);

#[derive(Clone, Debug, Default)]
pub struct SECINFO_NO_NAME4args {
    /// SECINFO_STYLE4_CURRENT_FH (0) or SECINFO_STYLE4_PARENT (1)
    pub style: u32,
}
DeserializeStruct!(SECINFO_NO_NAME4args, style);
SerializeStruct!(SECINFO_NO_NAME4args, style);

#[derive(Clone, Debug, Default)]
pub struct SECINFO_NO_NAME4res {
    pub status: nfsstat4,
    pub flavors: Vec<secinfo4>,
}

impl Serialize for SECINFO_NO_NAME4res {
    fn serialize<W: Write + ?Sized>(&self, dest: &mut W) -> std::io::Result<()> {
        self.status.serialize(dest)?;
        if self.status == nfsstat4::NFS4_OK {
            serialize_array(&self.flavors, dest)?;
        }
        Ok(())
    }
}

impl Deserialize for SECINFO_NO_NAME4res {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        self.status.deserialize(src)?;
        if self.status == nfsstat4::NFS4_OK {
            self.flavors = deserialize_array(src, 16)?;
        }
        Ok(())
    }
}

// -------------------------------------------------------------- SEQUENCE

#[derive(Clone, Debug, Default)]
pub struct SEQUENCE4args {
    pub sa_sessionid: sessionid4,
    pub sa_sequenceid: sequenceid4,
    pub sa_slotid: slotid4,
    pub sa_highest_slotid: slotid4,
    pub sa_cachethis: bool,
}
DeserializeStruct!(
    SEQUENCE4args,
    sa_sessionid,
    sa_sequenceid,
    sa_slotid,
    sa_highest_slotid,
    sa_cachethis
);
SerializeStruct!(
    SEQUENCE4args,
    sa_sessionid,
    sa_sequenceid,
    sa_slotid,
    sa_highest_slotid,
    sa_cachethis
);

#[derive(Clone, Debug, Default)]
pub struct SEQUENCE4res {
    pub status: nfsstat4,
    pub sr_sessionid: sessionid4,
    pub sr_sequenceid: sequenceid4,
    pub sr_slotid: slotid4,
    pub sr_highest_slotid: slotid4,
    pub sr_target_highest_slotid: slotid4,
    pub sr_status_flags: u32,
}
SerializeStatusRes!(
    SEQUENCE4res,
    sr_sessionid,
    sr_sequenceid,
    sr_slotid,
    sr_highest_slotid,
    sr_target_highest_slotid,
    sr_status_flags
);

// --------------------------------------------------------------- SETATTR

#[derive(Clone, Debug, Default)]
pub struct SETATTR4args {
    pub stateid: stateid4,
    pub obj_attributes: fattr4,
}
DeserializeStruct!(SETATTR4args, stateid, obj_attributes);
SerializeStruct!(SETATTR4args, stateid, obj_attributes);

/// SETATTR reports the attributes actually set regardless of status.
#[derive(Clone, Debug, Default)]
pub struct SETATTR4res {
    pub status: nfsstat4,
    pub attrsset: bitmap4,
}
DeserializeStruct!(SETATTR4res, status, attrsset);
SerializeStruct!(SETATTR4res, status, attrsset);

// ----------------------------------------------------------- SETCLIENTID

#[derive(Clone, Debug, Default)]
pub struct SETCLIENTID4args {
    pub client: nfs_client_id4,
    pub callback: cb_client4,
    pub callback_ident: u32,
}
DeserializeStruct!(SETCLIENTID4args, client, callback, callback_ident);
SerializeStruct!(SETCLIENTID4args, client, callback, callback_ident);

#[derive(Clone, Debug, Default)]
pub struct SETCLIENTID4res {
    pub status: nfsstat4,
    pub clientid: clientid4,
    pub setclientid_confirm: verifier4,
}
SerializeStatusRes!(SETCLIENTID4res, clientid, setclientid_confirm);

#[derive(Clone, Debug, Default)]
pub struct SETCLIENTID_CONFIRM4args {
    pub clientid: clientid4,
    pub setclientid_confirm: verifier4,
}
DeserializeStruct!(SETCLIENTID_CONFIRM4args, clientid, setclientid_confirm);
SerializeStruct!(SETCLIENTID_CONFIRM4args, clientid, setclientid_confirm);

#[derive(Clone, Debug, Default)]
pub struct SETCLIENTID_CONFIRM4res {
    pub status: nfsstat4,
}
SerializeStatusRes!(SETCLIENTID_CONFIRM4res,);

// ----------------------------------------------------------------- WRITE

#[derive(Clone, Debug, Default, FromPrimitive, ToPrimitive, PartialEq, Eq, Copy)]
#[repr(u32)]
pub enum stable_how4 {
    #[default]
    UNSTABLE4 = 0,
    DATA_SYNC4 = 1,
    FILE_SYNC4 = 2,
}
SerializeEnum!(stable_how4);
DeserializeEnum!(stable_how4);

#[derive(Clone, Debug, Default)]
pub struct WRITE4args {
    pub stateid: stateid4,
    pub offset: offset4,
    pub stable: stable_how4,
    pub data: Vec<u8>,
}
DeserializeStruct!(WRITE4args, stateid, offset, stable, data);
SerializeStruct!(WRITE4args, stateid, offset, stable, data);

#[derive(Clone, Debug, Default)]
pub struct WRITE4res {
    pub status: nfsstat4,
    pub count: count4,
    pub committed: stable_how4,
    pub writeverf: verifier4,
}
SerializeStatusRes!(WRITE4res, count, committed, writeverf);

// ----------------------------------------------------------- EXCHANGE_ID

#[derive(Clone, Debug, Default)]
pub struct EXCHANGE_ID4args {
    pub eia_clientowner: client_owner4,
    pub eia_flags: u32,
    /// State protection; only SP4_NONE is accepted
    pub eia_state_protect: u32,
    pub eia_client_impl_id: Vec<nfs_impl_id4>,
}

impl Deserialize for EXCHANGE_ID4args {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        self.eia_clientowner.deserialize(src)?;
        self.eia_flags.deserialize(src)?;
        self.eia_state_protect.deserialize(src)?;
        if self.eia_state_protect != SP4_NONE {
            return Err(invalid_data("unsupported state protection"));
        }
        self.eia_client_impl_id = deserialize_array(src, 1)?;
        Ok(())
    }
}

impl Serialize for EXCHANGE_ID4args {
    fn serialize<W: Write + ?Sized>(&self, dest: &mut W) -> std::io::Result<()> {
        self.eia_clientowner.serialize(dest)?;
        self.eia_flags.serialize(dest)?;
        self.eia_state_protect.serialize(dest)?;
        serialize_array(&self.eia_client_impl_id, dest)
    }
}

#[derive(Clone, Debug, Default)]
pub struct EXCHANGE_ID4res {
    pub status: nfsstat4,
    pub eir_clientid: clientid4,
    pub eir_sequenceid: sequenceid4,
    pub eir_flags: u32,
    /// State protection; always SP4_NONE
    pub eir_state_protect: u32,
    pub eir_server_owner: server_owner4,
    pub eir_server_scope: Vec<u8>,
    pub eir_server_impl_id: Vec<nfs_impl_id4>,
}

impl Serialize for EXCHANGE_ID4res {
    fn serialize<W: Write + ?Sized>(&self, dest: &mut W) -> std::io::Result<()> {
        self.status.serialize(dest)?;
        if self.status == nfsstat4::NFS4_OK {
            self.eir_clientid.serialize(dest)?;
            self.eir_sequenceid.serialize(dest)?;
            self.eir_flags.serialize(dest)?;
            self.eir_state_protect.serialize(dest)?;
            self.eir_server_owner.serialize(dest)?;
            self.eir_server_scope.serialize(dest)?;
            serialize_array(&self.eir_server_impl_id, dest)?;
        }
        Ok(())
    }
}

impl Deserialize for EXCHANGE_ID4res {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        self.status.deserialize(src)?;
        if self.status == nfsstat4::NFS4_OK {
            self.eir_clientid.deserialize(src)?;
            self.eir_sequenceid.deserialize(src)?;
            self.eir_flags.deserialize(src)?;
            self.eir_state_protect.deserialize(src)?;
            self.eir_server_owner.deserialize(src)?;
            self.eir_server_scope.deserialize(src)?;
            self.eir_server_impl_id = deserialize_array(src, 1)?;
        }
        Ok(())
    }
}

// -------------------------------------------------------- CREATE_SESSION

/// Callback channel security parameters; AUTH_NONE and AUTH_SYS only.
#[derive(Clone, Debug, Default)]
pub enum callback_sec_parms4 {
    /// No authentication on the callback channel
    #[default]
    AUTH_NONE,
    /// UNIX-style credentials for the callback channel
    AUTH_SYS(crate::protocol::xdr::rpc::auth_unix),
}

impl Serialize for callback_sec_parms4 {
    fn serialize<W: Write + ?Sized>(&self, dest: &mut W) -> std::io::Result<()> {
        match self {
            callback_sec_parms4::AUTH_NONE => 0_u32.serialize(dest),
            callback_sec_parms4::AUTH_SYS(creds) => {
                1_u32.serialize(dest)?;
                creds.serialize(dest)
            }
        }
    }
}

impl Deserialize for callback_sec_parms4 {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        *self = match deserialize::<u32>(src)? {
            0 => callback_sec_parms4::AUTH_NONE,
            1 => callback_sec_parms4::AUTH_SYS(deserialize(src)?),
            flavor => {
                return Err(invalid_data(&format!("Unsupported callback sec flavor: {flavor}")))
            }
        };
        Ok(())
    }
}

#[derive(Clone, Debug, Default)]
pub struct CREATE_SESSION4args {
    pub csa_clientid: clientid4,
    pub csa_sequence: sequenceid4,
    pub csa_flags: u32,
    pub csa_fore_chan_attrs: channel_attrs4,
    pub csa_back_chan_attrs: channel_attrs4,
    pub csa_cb_program: u32,
    pub csa_sec_parms: Vec<callback_sec_parms4>,
}

impl Deserialize for CREATE_SESSION4args {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        self.csa_clientid.deserialize(src)?;
        self.csa_sequence.deserialize(src)?;
        self.csa_flags.deserialize(src)?;
        self.csa_fore_chan_attrs.deserialize(src)?;
        self.csa_back_chan_attrs.deserialize(src)?;
        self.csa_cb_program.deserialize(src)?;
        self.csa_sec_parms = deserialize_array(src, 16)?;
        Ok(())
    }
}

impl Serialize for CREATE_SESSION4args {
    fn serialize<W: Write + ?Sized>(&self, dest: &mut W) -> std::io::Result<()> {
        self.csa_clientid.serialize(dest)?;
        self.csa_sequence.serialize(dest)?;
        self.csa_flags.serialize(dest)?;
        self.csa_fore_chan_attrs.serialize(dest)?;
        self.csa_back_chan_attrs.serialize(dest)?;
        self.csa_cb_program.serialize(dest)?;
        serialize_array(&self.csa_sec_parms, dest)
    }
}

#[derive(Clone, Debug, Default)]
pub struct CREATE_SESSION4res {
    pub status: nfsstat4,
    pub csr_sessionid: sessionid4,
    pub csr_sequence: sequenceid4,
    pub csr_flags: u32,
    pub csr_fore_chan_attrs: channel_attrs4,
    pub csr_back_chan_attrs: channel_attrs4,
}
SerializeStatusRes!(
    CREATE_SESSION4res,
    csr_sessionid,
    csr_sequence,
    csr_flags,
    csr_fore_chan_attrs,
    csr_back_chan_attrs
);

// ------------------------------------------------------- DESTROY_SESSION

#[derive(Clone, Debug, Default)]
pub struct DESTROY_SESSION4args {
    pub dsa_sessionid: sessionid4,
}
DeserializeStruct!(DESTROY_SESSION4args, dsa_sessionid);
SerializeStruct!(DESTROY_SESSION4args, dsa_sessionid);

#[derive(Clone, Debug, Default)]
pub struct DESTROY_SESSION4res {
    pub status: nfsstat4,
}
SerializeStatusRes!(DESTROY_SESSION4res,);

#[derive(Clone, Debug, Default)]
pub struct DESTROY_CLIENTID4args {
    pub dca_clientid: clientid4,
}
DeserializeStruct!(DESTROY_CLIENTID4args, dca_clientid);
SerializeStruct!(DESTROY_CLIENTID4args, dca_clientid);

#[derive(Clone, Debug, Default)]
pub struct DESTROY_CLIENTID4res {
    pub status: nfsstat4,
}
SerializeStatusRes!(DESTROY_CLIENTID4res,);

#[derive(Clone, Debug, Default)]
pub struct RECLAIM_COMPLETE4args {
    pub rca_one_fs: bool,
}
DeserializeStruct!(RECLAIM_COMPLETE4args, rca_one_fs);
SerializeStruct!(RECLAIM_COMPLETE4args, rca_one_fs);

#[derive(Clone, Debug, Default)]
pub struct RECLAIM_COMPLETE4res {
    pub status: nfsstat4,
}
SerializeStatusRes!(RECLAIM_COMPLETE4res,);

// ------------------------------------------------- ALLOCATE / DEALLOCATE

#[derive(Clone, Debug, Default)]
pub struct ALLOCATE4args {
    pub stateid: stateid4,
    pub offset: offset4,
    pub length: length4,
}
DeserializeStruct!(ALLOCATE4args, stateid, offset, length);
SerializeStruct!(ALLOCATE4args, stateid, offset, length);

#[derive(Clone, Debug, Default)]
pub struct ALLOCATE4res {
    pub status: nfsstat4,
}
SerializeStatusRes!(ALLOCATE4res,);

#[derive(Clone, Debug, Default)]
pub struct DEALLOCATE4args {
    pub stateid: stateid4,
    pub offset: offset4,
    pub length: length4,
}
DeserializeStruct!(DEALLOCATE4args, stateid, offset, length);
SerializeStruct!(DEALLOCATE4args, stateid, offset, length);

#[derive(Clone, Debug, Default)]
pub struct DEALLOCATE4res {
    pub status: nfsstat4,
}
SerializeStatusRes!(DEALLOCATE4res,);

// ------------------------------------------------------------------ SEEK

#[derive(Clone, Debug, Default)]
pub struct SEEK4args {
    pub sa_stateid: stateid4,
    pub sa_offset: offset4,
    /// NFS4_CONTENT_DATA or NFS4_CONTENT_HOLE
    pub sa_what: u32,
}
DeserializeStruct!(SEEK4args, sa_stateid, sa_offset, sa_what);
SerializeStruct!(SEEK4args, sa_stateid, sa_offset, sa_what);

#[derive(Clone, Debug, Default)]
pub struct SEEK4res {
    pub status: nfsstat4,
    pub sr_eof: bool,
    pub sr_offset: offset4,
}
SerializeStatusRes!(SEEK4res, sr_eof, sr_offset);

// ----------------------------------------------------------- TEST_STATEID

#[derive(Clone, Debug, Default)]
pub struct TEST_STATEID4args {
    pub ts_stateids: Vec<stateid4>,
}

impl Deserialize for TEST_STATEID4args {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        self.ts_stateids = deserialize_array(src, 1024)?;
        Ok(())
    }
}

impl Serialize for TEST_STATEID4args {
    fn serialize<W: Write + ?Sized>(&self, dest: &mut W) -> std::io::Result<()> {
        serialize_array(&self.ts_stateids, dest)
    }
}

#[derive(Clone, Debug, Default)]
pub struct TEST_STATEID4res {
    pub status: nfsstat4,
    pub tsr_status_codes: Vec<u32>,
}
SerializeStatusRes!(TEST_STATEID4res, tsr_status_codes);

// ------------------------------------------------------- argop and resop

/// One decoded COMPOUND sub-operation.
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Debug)]
pub enum nfs_argop4 {
    ACCESS(ACCESS4args),
    CLOSE(CLOSE4args),
    COMMIT(COMMIT4args),
    CREATE(CREATE4args),
    DELEGRETURN(DELEGRETURN4args),
    GETATTR(GETATTR4args),
    GETFH,
    LINK(LINK4args),
    LOOKUP(LOOKUP4args),
    LOOKUPP,
    OPEN(OPEN4args),
    OPEN_CONFIRM(OPEN_CONFIRM4args),
    OPEN_DOWNGRADE(OPEN_DOWNGRADE4args),
    PUTFH(PUTFH4args),
    PUTPUBFH,
    PUTROOTFH,
    READ(READ4args),
    READDIR(READDIR4args),
    READLINK,
    REMOVE(REMOVE4args),
    RENAME(RENAME4args),
    RENEW(RENEW4args),
    RESTOREFH,
    SAVEFH,
    SECINFO_NO_NAME(SECINFO_NO_NAME4args),
    SEQUENCE(SEQUENCE4args),
    SETATTR(SETATTR4args),
    SETCLIENTID(SETCLIENTID4args),
    SETCLIENTID_CONFIRM(SETCLIENTID_CONFIRM4args),
    WRITE(WRITE4args),
    EXCHANGE_ID(EXCHANGE_ID4args),
    CREATE_SESSION(CREATE_SESSION4args),
    DESTROY_SESSION(DESTROY_SESSION4args),
    DESTROY_CLIENTID(DESTROY_CLIENTID4args),
    RECLAIM_COMPLETE(RECLAIM_COMPLETE4args),
    ALLOCATE(ALLOCATE4args),
    DEALLOCATE(DEALLOCATE4args),
    SEEK(SEEK4args),
    TEST_STATEID(TEST_STATEID4args),
    /// Recognized opcode that this server does not implement
    ILLEGAL(nfs_opnum4),
}

impl Default for nfs_argop4 {
    fn default() -> nfs_argop4 {
        nfs_argop4::PUTROOTFH
    }
}

impl nfs_argop4 {
    /// The operation number the result entry must carry.
    pub fn opnum(&self) -> nfs_opnum4 {
        match self {
            nfs_argop4::ACCESS(_) => nfs_opnum4::OP_ACCESS,
            nfs_argop4::CLOSE(_) => nfs_opnum4::OP_CLOSE,
            nfs_argop4::COMMIT(_) => nfs_opnum4::OP_COMMIT,
            nfs_argop4::CREATE(_) => nfs_opnum4::OP_CREATE,
            nfs_argop4::DELEGRETURN(_) => nfs_opnum4::OP_DELEGRETURN,
            nfs_argop4::GETATTR(_) => nfs_opnum4::OP_GETATTR,
            nfs_argop4::GETFH => nfs_opnum4::OP_GETFH,
            nfs_argop4::LINK(_) => nfs_opnum4::OP_LINK,
            nfs_argop4::LOOKUP(_) => nfs_opnum4::OP_LOOKUP,
            nfs_argop4::LOOKUPP => nfs_opnum4::OP_LOOKUPP,
            nfs_argop4::OPEN(_) => nfs_opnum4::OP_OPEN,
            nfs_argop4::OPEN_CONFIRM(_) => nfs_opnum4::OP_OPEN_CONFIRM,
            nfs_argop4::OPEN_DOWNGRADE(_) => nfs_opnum4::OP_OPEN_DOWNGRADE,
            nfs_argop4::PUTFH(_) => nfs_opnum4::OP_PUTFH,
            nfs_argop4::PUTPUBFH => nfs_opnum4::OP_PUTPUBFH,
            nfs_argop4::PUTROOTFH => nfs_opnum4::OP_PUTROOTFH,
            nfs_argop4::READ(_) => nfs_opnum4::OP_READ,
            nfs_argop4::READDIR(_) => nfs_opnum4::OP_READDIR,
            nfs_argop4::READLINK => nfs_opnum4::OP_READLINK,
            nfs_argop4::REMOVE(_) => nfs_opnum4::OP_REMOVE,
            nfs_argop4::RENAME(_) => nfs_opnum4::OP_RENAME,
            nfs_argop4::RENEW(_) => nfs_opnum4::OP_RENEW,
            nfs_argop4::RESTOREFH => nfs_opnum4::OP_RESTOREFH,
            nfs_argop4::SAVEFH => nfs_opnum4::OP_SAVEFH,
            nfs_argop4::SECINFO_NO_NAME(_) => nfs_opnum4::OP_SECINFO_NO_NAME,
            nfs_argop4::SEQUENCE(_) => nfs_opnum4::OP_SEQUENCE,
            nfs_argop4::SETATTR(_) => nfs_opnum4::OP_SETATTR,
            nfs_argop4::SETCLIENTID(_) => nfs_opnum4::OP_SETCLIENTID,
            nfs_argop4::SETCLIENTID_CONFIRM(_) => nfs_opnum4::OP_SETCLIENTID_CONFIRM,
            nfs_argop4::WRITE(_) => nfs_opnum4::OP_WRITE,
            nfs_argop4::EXCHANGE_ID(_) => nfs_opnum4::OP_EXCHANGE_ID,
            nfs_argop4::CREATE_SESSION(_) => nfs_opnum4::OP_CREATE_SESSION,
            nfs_argop4::DESTROY_SESSION(_) => nfs_opnum4::OP_DESTROY_SESSION,
            nfs_argop4::DESTROY_CLIENTID(_) => nfs_opnum4::OP_DESTROY_CLIENTID,
            nfs_argop4::RECLAIM_COMPLETE(_) => nfs_opnum4::OP_RECLAIM_COMPLETE,
            nfs_argop4::ALLOCATE(_) => nfs_opnum4::OP_ALLOCATE,
            nfs_argop4::DEALLOCATE(_) => nfs_opnum4::OP_DEALLOCATE,
            nfs_argop4::SEEK(_) => nfs_opnum4::OP_SEEK,
            nfs_argop4::TEST_STATEID(_) => nfs_opnum4::OP_TEST_STATEID,
            nfs_argop4::ILLEGAL(op) => *op,
        }
    }
}

impl Deserialize for nfs_argop4 {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        let opnum: nfs_opnum4 = deserialize(src)?;
        *self = match opnum {
            nfs_opnum4::OP_ACCESS => nfs_argop4::ACCESS(deserialize(src)?),
            nfs_opnum4::OP_CLOSE => nfs_argop4::CLOSE(deserialize(src)?),
            nfs_opnum4::OP_COMMIT => nfs_argop4::COMMIT(deserialize(src)?),
            nfs_opnum4::OP_CREATE => nfs_argop4::CREATE(deserialize(src)?),
            nfs_opnum4::OP_DELEGRETURN => nfs_argop4::DELEGRETURN(deserialize(src)?),
            nfs_opnum4::OP_GETATTR => nfs_argop4::GETATTR(deserialize(src)?),
            nfs_opnum4::OP_GETFH => nfs_argop4::GETFH,
            nfs_opnum4::OP_LINK => nfs_argop4::LINK(deserialize(src)?),
            nfs_opnum4::OP_LOOKUP => nfs_argop4::LOOKUP(deserialize(src)?),
            nfs_opnum4::OP_LOOKUPP => nfs_argop4::LOOKUPP,
            nfs_opnum4::OP_OPEN => nfs_argop4::OPEN(deserialize(src)?),
            nfs_opnum4::OP_OPEN_CONFIRM => nfs_argop4::OPEN_CONFIRM(deserialize(src)?),
            nfs_opnum4::OP_OPEN_DOWNGRADE => nfs_argop4::OPEN_DOWNGRADE(deserialize(src)?),
            nfs_opnum4::OP_PUTFH => nfs_argop4::PUTFH(deserialize(src)?),
            nfs_opnum4::OP_PUTPUBFH => nfs_argop4::PUTPUBFH,
            nfs_opnum4::OP_PUTROOTFH => nfs_argop4::PUTROOTFH,
            nfs_opnum4::OP_READ => nfs_argop4::READ(deserialize(src)?),
            nfs_opnum4::OP_READDIR => nfs_argop4::READDIR(deserialize(src)?),
            nfs_opnum4::OP_READLINK => nfs_argop4::READLINK,
            nfs_opnum4::OP_REMOVE => nfs_argop4::REMOVE(deserialize(src)?),
            nfs_opnum4::OP_RENAME => nfs_argop4::RENAME(deserialize(src)?),
            nfs_opnum4::OP_RENEW => nfs_argop4::RENEW(deserialize(src)?),
            nfs_opnum4::OP_RESTOREFH => nfs_argop4::RESTOREFH,
            nfs_opnum4::OP_SAVEFH => nfs_argop4::SAVEFH,
            nfs_opnum4::OP_SECINFO_NO_NAME => nfs_argop4::SECINFO_NO_NAME(deserialize(src)?),
            nfs_opnum4::OP_SEQUENCE => nfs_argop4::SEQUENCE(deserialize(src)?),
            nfs_opnum4::OP_SETATTR => nfs_argop4::SETATTR(deserialize(src)?),
            nfs_opnum4::OP_SETCLIENTID => nfs_argop4::SETCLIENTID(deserialize(src)?),
            nfs_opnum4::OP_SETCLIENTID_CONFIRM => {
                nfs_argop4::SETCLIENTID_CONFIRM(deserialize(src)?)
            }
            nfs_opnum4::OP_WRITE => nfs_argop4::WRITE(deserialize(src)?),
            nfs_opnum4::OP_EXCHANGE_ID => nfs_argop4::EXCHANGE_ID(deserialize(src)?),
            nfs_opnum4::OP_CREATE_SESSION => nfs_argop4::CREATE_SESSION(deserialize(src)?),
            nfs_opnum4::OP_DESTROY_SESSION => nfs_argop4::DESTROY_SESSION(deserialize(src)?),
            nfs_opnum4::OP_DESTROY_CLIENTID => nfs_argop4::DESTROY_CLIENTID(deserialize(src)?),
            nfs_opnum4::OP_RECLAIM_COMPLETE => nfs_argop4::RECLAIM_COMPLETE(deserialize(src)?),
            nfs_opnum4::OP_ALLOCATE => nfs_argop4::ALLOCATE(deserialize(src)?),
            nfs_opnum4::OP_DEALLOCATE => nfs_argop4::DEALLOCATE(deserialize(src)?),
            nfs_opnum4::OP_SEEK => nfs_argop4::SEEK(deserialize(src)?),
            nfs_opnum4::OP_TEST_STATEID => nfs_argop4::TEST_STATEID(deserialize(src)?),
            // The opcode is known but unimplemented; the args cannot be
            // skipped without their schema, so the driver fails the op and
            // the compound terminates there.
            other => nfs_argop4::ILLEGAL(other),
        };
        Ok(())
    }
}

impl Serialize for nfs_argop4 {
    fn serialize<W: Write + ?Sized>(&self, dest: &mut W) -> std::io::Result<()> {
        self.opnum().serialize(dest)?;
        match self {
            nfs_argop4::ACCESS(args) => args.serialize(dest),
            nfs_argop4::CLOSE(args) => args.serialize(dest),
            nfs_argop4::COMMIT(args) => args.serialize(dest),
            nfs_argop4::CREATE(args) => args.serialize(dest),
            nfs_argop4::DELEGRETURN(args) => args.serialize(dest),
            nfs_argop4::GETATTR(args) => args.serialize(dest),
            nfs_argop4::GETFH => Ok(()),
            nfs_argop4::LINK(args) => args.serialize(dest),
            nfs_argop4::LOOKUP(args) => args.serialize(dest),
            nfs_argop4::LOOKUPP => Ok(()),
            nfs_argop4::OPEN(args) => args.serialize(dest),
            nfs_argop4::OPEN_CONFIRM(args) => args.serialize(dest),
            nfs_argop4::OPEN_DOWNGRADE(args) => args.serialize(dest),
            nfs_argop4::PUTFH(args) => args.serialize(dest),
            nfs_argop4::PUTPUBFH => Ok(()),
            nfs_argop4::PUTROOTFH => Ok(()),
            nfs_argop4::READ(args) => args.serialize(dest),
            nfs_argop4::READDIR(args) => args.serialize(dest),
            nfs_argop4::READLINK => Ok(()),
            nfs_argop4::REMOVE(args) => args.serialize(dest),
            nfs_argop4::RENAME(args) => args.serialize(dest),
            nfs_argop4::RENEW(args) => args.serialize(dest),
            nfs_argop4::RESTOREFH => Ok(()),
            nfs_argop4::SAVEFH => Ok(()),
            nfs_argop4::SECINFO_NO_NAME(args) => args.serialize(dest),
            nfs_argop4::SEQUENCE(args) => args.serialize(dest),
            nfs_argop4::SETATTR(args) => args.serialize(dest),
            nfs_argop4::SETCLIENTID(args) => args.serialize(dest),
            nfs_argop4::SETCLIENTID_CONFIRM(args) => args.serialize(dest),
            nfs_argop4::WRITE(args) => args.serialize(dest),
            nfs_argop4::EXCHANGE_ID(args) => args.serialize(dest),
            nfs_argop4::CREATE_SESSION(args) => args.serialize(dest),
            nfs_argop4::DESTROY_SESSION(args) => args.serialize(dest),
            nfs_argop4::DESTROY_CLIENTID(args) => args.serialize(dest),
            nfs_argop4::RECLAIM_COMPLETE(args) => args.serialize(dest),
            nfs_argop4::ALLOCATE(args) => args.serialize(dest),
            nfs_argop4::DEALLOCATE(args) => args.serialize(dest),
            nfs_argop4::SEEK(args) => args.serialize(dest),
            nfs_argop4::TEST_STATEID(args) => args.serialize(dest),
            nfs_argop4::ILLEGAL(_) => Ok(()),
        }
    }
}

/// One COMPOUND sub-operation result.
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Debug)]
pub enum nfs_resop4 {
    ACCESS(ACCESS4res),
    CLOSE(CLOSE4res),
    COMMIT(COMMIT4res),
    CREATE(CREATE4res),
    DELEGRETURN(DELEGRETURN4res),
    GETATTR(GETATTR4res),
    GETFH(GETFH4res),
    LINK(LINK4res),
    LOOKUP(LOOKUP4res),
    LOOKUPP(LOOKUPP4res),
    OPEN(OPEN4res),
    OPEN_CONFIRM(OPEN_CONFIRM4res),
    OPEN_DOWNGRADE(OPEN_DOWNGRADE4res),
    PUTFH(PUTFH4res),
    PUTPUBFH(PUTPUBFH4res),
    PUTROOTFH(PUTROOTFH4res),
    READ(READ4res),
    READDIR(READDIR4res),
    READLINK(READLINK4res),
    REMOVE(REMOVE4res),
    RENAME(RENAME4res),
    RENEW(RENEW4res),
    RESTOREFH(RESTOREFH4res),
    SAVEFH(SAVEFH4res),
    SECINFO_NO_NAME(SECINFO_NO_NAME4res),
    SEQUENCE(SEQUENCE4res),
    SETATTR(SETATTR4res),
    SETCLIENTID(SETCLIENTID4res),
    SETCLIENTID_CONFIRM(SETCLIENTID_CONFIRM4res),
    WRITE(WRITE4res),
    EXCHANGE_ID(EXCHANGE_ID4res),
    CREATE_SESSION(CREATE_SESSION4res),
    DESTROY_SESSION(DESTROY_SESSION4res),
    DESTROY_CLIENTID(DESTROY_CLIENTID4res),
    RECLAIM_COMPLETE(RECLAIM_COMPLETE4res),
    ALLOCATE(ALLOCATE4res),
    DEALLOCATE(DEALLOCATE4res),
    SEEK(SEEK4res),
    TEST_STATEID(TEST_STATEID4res),
    /// Status-only entry for an unimplemented operation
    ILLEGAL(nfs_opnum4, nfsstat4),
}

impl nfs_resop4 {
    /// The operation number serialized ahead of the result body.
    pub fn opnum(&self) -> nfs_opnum4 {
        match self {
            nfs_resop4::ACCESS(_) => nfs_opnum4::OP_ACCESS,
            nfs_resop4::CLOSE(_) => nfs_opnum4::OP_CLOSE,
            nfs_resop4::COMMIT(_) => nfs_opnum4::OP_COMMIT,
            nfs_resop4::CREATE(_) => nfs_opnum4::OP_CREATE,
            nfs_resop4::DELEGRETURN(_) => nfs_opnum4::OP_DELEGRETURN,
            nfs_resop4::GETATTR(_) => nfs_opnum4::OP_GETATTR,
            nfs_resop4::GETFH(_) => nfs_opnum4::OP_GETFH,
            nfs_resop4::LINK(_) => nfs_opnum4::OP_LINK,
            nfs_resop4::LOOKUP(_) => nfs_opnum4::OP_LOOKUP,
            nfs_resop4::LOOKUPP(_) => nfs_opnum4::OP_LOOKUPP,
            nfs_resop4::OPEN(_) => nfs_opnum4::OP_OPEN,
            nfs_resop4::OPEN_CONFIRM(_) => nfs_opnum4::OP_OPEN_CONFIRM,
            nfs_resop4::OPEN_DOWNGRADE(_) => nfs_opnum4::OP_OPEN_DOWNGRADE,
            nfs_resop4::PUTFH(_) => nfs_opnum4::OP_PUTFH,
            nfs_resop4::PUTPUBFH(_) => nfs_opnum4::OP_PUTPUBFH,
            nfs_resop4::PUTROOTFH(_) => nfs_opnum4::OP_PUTROOTFH,
            nfs_resop4::READ(_) => nfs_opnum4::OP_READ,
            nfs_resop4::READDIR(_) => nfs_opnum4::OP_READDIR,
            nfs_resop4::READLINK(_) => nfs_opnum4::OP_READLINK,
            nfs_resop4::REMOVE(_) => nfs_opnum4::OP_REMOVE,
            nfs_resop4::RENAME(_) => nfs_opnum4::OP_RENAME,
            nfs_resop4::RENEW(_) => nfs_opnum4::OP_RENEW,
            nfs_resop4::RESTOREFH(_) => nfs_opnum4::OP_RESTOREFH,
            nfs_resop4::SAVEFH(_) => nfs_opnum4::OP_SAVEFH,
            nfs_resop4::SECINFO_NO_NAME(_) => nfs_opnum4::OP_SECINFO_NO_NAME,
            nfs_resop4::SEQUENCE(_) => nfs_opnum4::OP_SEQUENCE,
            nfs_resop4::SETATTR(_) => nfs_opnum4::OP_SETATTR,
            nfs_resop4::SETCLIENTID(_) => nfs_opnum4::OP_SETCLIENTID,
            nfs_resop4::SETCLIENTID_CONFIRM(_) => nfs_opnum4::OP_SETCLIENTID_CONFIRM,
            nfs_resop4::WRITE(_) => nfs_opnum4::OP_WRITE,
            nfs_resop4::EXCHANGE_ID(_) => nfs_opnum4::OP_EXCHANGE_ID,
            nfs_resop4::CREATE_SESSION(_) => nfs_opnum4::OP_CREATE_SESSION,
            nfs_resop4::DESTROY_SESSION(_) => nfs_opnum4::OP_DESTROY_SESSION,
            nfs_resop4::DESTROY_CLIENTID(_) => nfs_opnum4::OP_DESTROY_CLIENTID,
            nfs_resop4::RECLAIM_COMPLETE(_) => nfs_opnum4::OP_RECLAIM_COMPLETE,
            nfs_resop4::ALLOCATE(_) => nfs_opnum4::OP_ALLOCATE,
            nfs_resop4::DEALLOCATE(_) => nfs_opnum4::OP_DEALLOCATE,
            nfs_resop4::SEEK(_) => nfs_opnum4::OP_SEEK,
            nfs_resop4::TEST_STATEID(_) => nfs_opnum4::OP_TEST_STATEID,
            nfs_resop4::ILLEGAL(op, _) => *op,
        }
    }

    /// The status carried by this result; the COMPOUND driver stops at the
    /// first entry whose status is not NFS4_OK.
    pub fn status(&self) -> nfsstat4 {
        match self {
            nfs_resop4::ACCESS(res) => res.status,
            nfs_resop4::CLOSE(res) => res.status,
            nfs_resop4::COMMIT(res) => res.status,
            nfs_resop4::CREATE(res) => res.status,
            nfs_resop4::DELEGRETURN(res) => res.status,
            nfs_resop4::GETATTR(res) => res.status,
            nfs_resop4::GETFH(res) => res.status,
            nfs_resop4::LINK(res) => res.status,
            nfs_resop4::LOOKUP(res) => res.status,
            nfs_resop4::LOOKUPP(res) => res.status,
            nfs_resop4::OPEN(res) => res.status,
            nfs_resop4::OPEN_CONFIRM(res) => res.status,
            nfs_resop4::OPEN_DOWNGRADE(res) => res.status,
            nfs_resop4::PUTFH(res) => res.status,
            nfs_resop4::PUTPUBFH(res) => res.status,
            nfs_resop4::PUTROOTFH(res) => res.status,
            nfs_resop4::READ(res) => res.status,
            nfs_resop4::READDIR(res) => res.status,
            nfs_resop4::READLINK(res) => res.status,
            nfs_resop4::REMOVE(res) => res.status,
            nfs_resop4::RENAME(res) => res.status,
            nfs_resop4::RENEW(res) => res.status,
            nfs_resop4::RESTOREFH(res) => res.status,
            nfs_resop4::SAVEFH(res) => res.status,
            nfs_resop4::SECINFO_NO_NAME(res) => res.status,
            nfs_resop4::SEQUENCE(res) => res.status,
            nfs_resop4::SETATTR(res) => res.status,
            nfs_resop4::SETCLIENTID(res) => res.status,
            nfs_resop4::SETCLIENTID_CONFIRM(res) => res.status,
            nfs_resop4::WRITE(res) => res.status,
            nfs_resop4::EXCHANGE_ID(res) => res.status,
            nfs_resop4::CREATE_SESSION(res) => res.status,
            nfs_resop4::DESTROY_SESSION(res) => res.status,
            nfs_resop4::DESTROY_CLIENTID(res) => res.status,
            nfs_resop4::RECLAIM_COMPLETE(res) => res.status,
            nfs_resop4::ALLOCATE(res) => res.status,
            nfs_resop4::DEALLOCATE(res) => res.status,
            nfs_resop4::SEEK(res) => res.status,
            nfs_resop4::TEST_STATEID(res) => res.status,
            nfs_resop4::ILLEGAL(_, status) => *status,
        }
    }
}

impl Serialize for nfs_resop4 {
    fn serialize<W: Write + ?Sized>(&self, dest: &mut W) -> std::io::Result<()> {
        self.opnum().serialize(dest)?;
        match self {
            nfs_resop4::ACCESS(res) => res.serialize(dest),
            nfs_resop4::CLOSE(res) => res.serialize(dest),
            nfs_resop4::COMMIT(res) => res.serialize(dest),
            nfs_resop4::CREATE(res) => res.serialize(dest),
            nfs_resop4::DELEGRETURN(res) => res.serialize(dest),
            nfs_resop4::GETATTR(res) => res.serialize(dest),
            nfs_resop4::GETFH(res) => res.serialize(dest),
            nfs_resop4::LINK(res) => res.serialize(dest),
            nfs_resop4::LOOKUP(res) => res.serialize(dest),
            nfs_resop4::LOOKUPP(res) => res.serialize(dest),
            nfs_resop4::OPEN(res) => res.serialize(dest),
            nfs_resop4::OPEN_CONFIRM(res) => res.serialize(dest),
            nfs_resop4::OPEN_DOWNGRADE(res) => res.serialize(dest),
            nfs_resop4::PUTFH(res) => res.serialize(dest),
            nfs_resop4::PUTPUBFH(res) => res.serialize(dest),
            nfs_resop4::PUTROOTFH(res) => res.serialize(dest),
            nfs_resop4::READ(res) => res.serialize(dest),
            nfs_resop4::READDIR(res) => res.serialize(dest),
            nfs_resop4::READLINK(res) => res.serialize(dest),
            nfs_resop4::REMOVE(res) => res.serialize(dest),
            nfs_resop4::RENAME(res) => res.serialize(dest),
            nfs_resop4::RENEW(res) => res.serialize(dest),
            nfs_resop4::RESTOREFH(res) => res.serialize(dest),
            nfs_resop4::SAVEFH(res) => res.serialize(dest),
            nfs_resop4::SECINFO_NO_NAME(res) => res.serialize(dest),
            nfs_resop4::SEQUENCE(res) => res.serialize(dest),
            nfs_resop4::SETATTR(res) => res.serialize(dest),
            nfs_resop4::SETCLIENTID(res) => res.serialize(dest),
            nfs_resop4::SETCLIENTID_CONFIRM(res) => res.serialize(dest),
            nfs_resop4::WRITE(res) => res.serialize(dest),
            nfs_resop4::EXCHANGE_ID(res) => res.serialize(dest),
            nfs_resop4::CREATE_SESSION(res) => res.serialize(dest),
            nfs_resop4::DESTROY_SESSION(res) => res.serialize(dest),
            nfs_resop4::DESTROY_CLIENTID(res) => res.serialize(dest),
            nfs_resop4::RECLAIM_COMPLETE(res) => res.serialize(dest),
            nfs_resop4::ALLOCATE(res) => res.serialize(dest),
            nfs_resop4::DEALLOCATE(res) => res.serialize(dest),
            nfs_resop4::SEEK(res) => res.serialize(dest),
            nfs_resop4::TEST_STATEID(res) => res.serialize(dest),
            nfs_resop4::ILLEGAL(_, status) => status.serialize(dest),
        }
    }
}

// ----------------------------------------------------- COMPOUND envelope

/// Arguments to the COMPOUND procedure.
#[derive(Clone, Debug, Default)]
pub struct COMPOUND4args {
    /// Client-supplied tag echoed in the reply
    pub tag: Vec<u8>,
    /// 0 for NFSv4.0, 1 for NFSv4.1
    pub minorversion: u32,
    /// The ordered sub-operations
    pub argarray: Vec<nfs_argop4>,
}

impl Deserialize for COMPOUND4args {
    fn deserialize<R: Read>(&mut self, src: &mut R) -> std::io::Result<()> {
        self.tag.deserialize(src)?;
        if self.tag.len() > NFS4_OPAQUE_LIMIT {
            return Err(invalid_data("COMPOUND tag too long"));
        }
        self.minorversion.deserialize(src)?;
        self.argarray = deserialize_array(src, COMPOUND_MAX_OPS)?;
        Ok(())
    }
}

impl Serialize for COMPOUND4args {
    fn serialize<W: Write + ?Sized>(&self, dest: &mut W) -> std::io::Result<()> {
        self.tag.serialize(dest)?;
        self.minorversion.serialize(dest)?;
        serialize_array(&self.argarray, dest)
    }
}

/// Results of the COMPOUND procedure. On mid-compound failure the result
/// array is truncated so the failing op is its last entry.
#[derive(Clone, Debug, Default)]
pub struct COMPOUND4res {
    /// Status of the last executed operation
    pub status: nfsstat4,
    /// The client tag echoed back
    pub tag: Vec<u8>,
    /// Results for each executed operation
    pub resarray: Vec<nfs_resop4>,
}

impl Serialize for COMPOUND4res {
    fn serialize<W: Write + ?Sized>(&self, dest: &mut W) -> std::io::Result<()> {
        self.status.serialize(dest)?;
        self.tag.serialize(dest)?;
        serialize_array(&self.resarray, dest)
    }
}
