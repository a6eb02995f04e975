//! READDIR procedure (procedure 16): iterate directory entries.
//!
//! The reply is limited by a client byte budget, not an entry count. An
//! accumulator tracks the wire size used so far and the handler stops
//! appending when the next entry would overflow; eof is reported only
//! when every remaining entry fit.

use std::io::{Cursor, Read, Write};

use tracing::{debug, error, trace};

use super::attr::{post_op_attr_from, NFS3_ATTR_MASK};
use crate::protocol::rpc;
use crate::protocol::xdr::{self, deserialize, nfs3, Serialize};
use crate::vfs::open_flags::{OPEN_DIRECTORY, OPEN_INFERRED, OPEN_PATH};
use crate::write_counter::WriteCounter;

/// Room reserved for the trailing list terminator and eof flag.
const REPLY_TAIL_RESERVE: usize = 128;

pub async fn nfsproc3_readdir(
    xid: u32,
    input: &mut impl Read,
    output: &mut impl Write,
    context: &rpc::Context,
) -> Result<(), anyhow::Error> {
    let args = deserialize::<nfs3::dir::READDIR3args>(input)?;
    debug!("nfsproc3_readdir({:?},{:?})", xid, args);

    let cred = super::call_cred(context);
    let router = context.server.router();

    let dir_fh = match super::decode_fh(&args.dir) {
        Ok(fh) => fh,
        Err(err) => {
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            super::status_of(err).serialize(output)?;
            nfs3::post_op_attr::None.serialize(output)?;
            return Ok(());
        }
    };

    let dir = match router
        .open_fh(&cred, &dir_fh, OPEN_PATH | OPEN_INFERRED | OPEN_DIRECTORY)
        .await
    {
        Ok(handle) => handle,
        Err(err) => {
            error!("nfsproc3_readdir open error {:?} --> {:?}", xid, err);
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            super::status_of(err).serialize(output)?;
            nfs3::post_op_attr::None.serialize(output)?;
            return Ok(());
        }
    };

    let max_bytes_allowed = (args.dircount as usize).saturating_sub(REPLY_TAIL_RESERVE);
    // dircount bounds just fileid/name/cookie; a conservative per-entry
    // floor turns it into an entry estimate for the backend call.
    let estimated_max_results = (args.dircount / 16).max(1);

    let verifier = u64::from_be_bytes(args.cookieverf);
    let result = router
        .readdir(&cred, &dir, args.cookie, verifier, estimated_max_results, 0, NFS3_ATTR_MASK)
        .await;
    let dir_attr = match &result {
        Ok((_, _, _, dir_attr)) => post_op_attr_from(dir_attr),
        Err(_) => None,
    };
    router.release(&dir);

    match result {
        Ok((entries, end, next_verifier, _)) => {
            let mut counting_output = WriteCounter::new(output);

            xdr::rpc::make_success_reply(xid).serialize(&mut counting_output)?;
            nfs3::nfsstat3::NFS3_OK.serialize(&mut counting_output)?;
            dir_attr.serialize(&mut counting_output)?;
            next_verifier.to_be_bytes().serialize(&mut counting_output)?;

            let mut all_entries_written = true;
            let mut written = 0usize;
            for entry in entries {
                let wire_entry = nfs3::dir::entry3 {
                    fileid: entry.inum,
                    name: entry.name.into(),
                    cookie: entry.cookie,
                };
                let mut write_buf: Vec<u8> = Vec::new();
                let mut write_cursor = Cursor::new(&mut write_buf);
                // true flag marking that another entry follows
                true.serialize(&mut write_cursor)?;
                wire_entry.serialize(&mut write_cursor)?;

                if counting_output.bytes_written() + write_buf.len() >= max_bytes_allowed {
                    trace!(" -- insufficient space, truncating");
                    all_entries_written = false;
                    break;
                }
                counting_output.write_all(&write_buf)?;
                written += 1;
            }
            // terminate the entry list
            false.serialize(&mut counting_output)?;
            // eof only holds if everything fit
            (all_entries_written && end).serialize(&mut counting_output)?;
            debug!(
                "readdir {:?}, start at {}, flushed {} entries, complete {}",
                dir_fh, args.cookie, written, all_entries_written
            );
        }
        Err(err) => {
            error!("nfsproc3_readdir error {:?} --> {:?}", xid, err);
            xdr::rpc::make_success_reply(xid).serialize(output)?;
            super::status_of(err).serialize(output)?;
            nfs3::post_op_attr::None.serialize(output)?;
        }
    }
    Ok(())
}
