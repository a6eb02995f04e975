//! RPC message framing and dispatch (RFC 5531 record marking).
//!
//! Reassembles record-marked fragments from a TCP stream, decodes the
//! RPC envelope, suppresses retransmissions and routes each call to the
//! owning program handler (NFSv3, NFSv4, MOUNT, PORTMAP/rpcbind).

use std::io::Cursor;
use std::io::{Read, Write};

use anyhow::anyhow;
use tokio::io::AsyncReadExt;
use tokio::io::DuplexStream;
use tokio::sync::mpsc;
use tracing::{debug, error, trace, warn};

use crate::protocol::nfs;
use crate::protocol::rpc;
use crate::protocol::rpc::command_queue::{CommandQueue, CommandResult, ResponseBuffer};
use crate::protocol::xdr::{self, deserialize, mount, nfs3, nfs4, portmap, Serialize};

/// RPC program number for NFS Access Control Lists
const NFS_ACL_PROGRAM: u32 = 100227;
/// RPC program number for NFS ID Mapping
const NFS_ID_MAP_PROGRAM: u32 = 100270;
/// RPC program number for the LOCALIO auxiliary protocol
const NFS_LOCALIO_PROGRAM: u32 = 400122;
/// RPC program number for NFS Metadata
const NFS_METADATA_PROGRAM: u32 = 200024;
/// Initial size of the per-connection response buffer
const DEFAULT_RESPONSE_BUFFER_CAPACITY: usize = 8192;

/// Processes a single RPC message.
///
/// Deserializes the envelope, validates the RPC version, extracts
/// AUTH_UNIX credentials when present, drops retransmissions, and routes
/// the call by program and version. Returns true when a response was
/// written.
pub async fn handle_rpc(
    input: &mut impl Read,
    output: &mut impl Write,
    mut context: rpc::Context,
) -> Result<bool, anyhow::Error> {
    let recv = deserialize::<xdr::rpc::rpc_msg>(input)?;
    let xid = recv.xid;
    if let xdr::rpc::rpc_body::CALL(call) = recv.body {
        context.auth_flavor = call.cred.flavor;
        if let xdr::rpc::auth_flavor::AUTH_UNIX = call.cred.flavor {
            context.auth = deserialize(&mut Cursor::new(&call.cred.body))?;
        }
        if call.rpcvers != 2 {
            warn!("invalid RPC version {} != 2", call.rpcvers);
            xdr::rpc::rpc_vers_mismatch(xid).serialize(output)?;
            return Ok(true);
        }

        if context.transaction_tracker.is_retransmission(xid, &context.client_addr) {
            debug!(
                "retransmission detected, xid: {}, client_addr: {}, prog: {}",
                xid, context.client_addr, call.prog
            );
            return Ok(false);
        }

        let res = {
            match call.prog {
                nfs3::PROGRAM => match call.vers {
                    nfs3::VERSION => nfs::v3::handle_nfs(xid, call, input, output, &context).await,
                    nfs4::VERSION => nfs::v4::handle_nfs(xid, call, input, output, &context).await,
                    _ => {
                        warn!(
                            "unsupported NFS program version {} (supported 3, 4)",
                            call.vers
                        );
                        xdr::rpc::prog_mismatch_reply_message(xid, nfs3::VERSION)
                            .serialize(output)?;
                        Ok(())
                    }
                },
                portmap::PROGRAM => {
                    nfs::portmap::handle_portmap(xid, &call, input, output, &context)
                }
                mount::PROGRAM => {
                    nfs::mount::handle_mount(xid, call, input, output, &context).await
                }
                NFS_ACL_PROGRAM | NFS_ID_MAP_PROGRAM | NFS_METADATA_PROGRAM => {
                    trace!("ignoring NFS sideband program {}", call.prog);
                    xdr::rpc::prog_unavail_reply_message(xid).serialize(output)?;
                    Ok(())
                }
                NFS_LOCALIO_PROGRAM => {
                    trace!("ignoring LOCALIO packet");
                    xdr::rpc::prog_unavail_reply_message(xid).serialize(output)?;
                    Ok(())
                }
                unknown_number => {
                    warn!("unknown RPC program number {}", unknown_number);
                    xdr::rpc::prog_unavail_reply_message(xid).serialize(output)?;
                    Ok(())
                }
            }
        }
        .map(|_| true);
        context.transaction_tracker.mark_processed(xid, &context.client_addr);
        res
    } else {
        error!("unexpectedly received a Reply instead of a Call");
        Err(anyhow!("bad RPC call format"))
    }
}

/// Reads one record-marked fragment and appends it to `append_to`.
/// Returns true when it was the last fragment of the record.
async fn read_fragment(
    socket: &mut DuplexStream,
    append_to: &mut Vec<u8>,
) -> Result<bool, anyhow::Error> {
    let mut header_buf = [0_u8; 4];
    socket.read_exact(&mut header_buf).await?;
    let fragment_header = u32::from_be_bytes(header_buf);
    let is_last = (fragment_header & (1 << 31)) > 0;
    let length = (fragment_header & ((1 << 31) - 1)) as usize;
    trace!("reading fragment length:{}, last:{}", length, is_last);
    if append_to.len().saturating_add(length) > rpc::MAX_RPC_RECORD_LENGTH {
        return Err(anyhow!(
            "RPC record length {} exceeds max {}",
            length,
            rpc::MAX_RPC_RECORD_LENGTH
        ));
    }
    let start_offset = append_to.len();
    append_to.resize(start_offset + length, 0);
    socket.read_exact(&mut append_to[start_offset..]).await?;
    Ok(is_last)
}

/// Writes `buf` to the socket as record-marked fragments.
///
/// The 4-byte header carries the fragment length in the lower 31 bits
/// and the last-fragment flag in the highest bit.
pub async fn write_fragment(
    socket: &mut tokio::net::TcpStream,
    buf: &[u8],
) -> Result<(), anyhow::Error> {
    use tokio::io::AsyncWriteExt;

    // Maximum fragment size is 2^31 - 1 bytes
    const MAX_FRAGMENT_SIZE: usize = (1 << 31) - 1;

    let mut offset = 0;
    while offset < buf.len() {
        let remaining = buf.len() - offset;
        let fragment_size = std::cmp::min(remaining, MAX_FRAGMENT_SIZE);
        let is_last = offset + fragment_size >= buf.len();
        let fragment_header =
            if is_last { fragment_size as u32 + (1 << 31) } else { fragment_size as u32 };

        socket.write_all(&u32::to_be_bytes(fragment_header)).await?;
        trace!("writing fragment length:{}, last:{}", fragment_size, is_last);
        socket.write_all(&buf[offset..offset + fragment_size]).await?;

        offset += fragment_size;
    }

    Ok(())
}

pub type SocketMessageType = Result<Vec<u8>, anyhow::Error>;

/// Handles RPC message processing over one TCP connection: reassembles
/// records, submits them to the per-connection FIFO queue and forwards
/// completed responses.
#[derive(Debug)]
pub struct SocketMessageHandler {
    cur_fragment: Vec<u8>,
    socket_receive_channel: DuplexStream,
    context: rpc::Context,
    command_queue: CommandQueue,
}

impl SocketMessageHandler {
    /// Creates a handler for a connection. Returns the handler, a duplex
    /// stream the socket pump writes into, and the receiver for
    /// completed response buffers.
    pub fn new(
        context: &rpc::Context,
    ) -> (Self, DuplexStream, mpsc::UnboundedReceiver<SocketMessageType>) {
        let (socksend, sockrecv) = tokio::io::duplex(256_000);
        let (msgsend, msgrecv) = mpsc::unbounded_channel();
        let (result_sender, mut result_receiver) = mpsc::unbounded_channel::<CommandResult>();

        let command_queue =
            CommandQueue::new(process_rpc_command, result_sender, DEFAULT_RESPONSE_BUFFER_CAPACITY);

        tokio::spawn(async move {
            while let Some(result) = result_receiver.recv().await {
                match result {
                    Ok(Some(response_buffer)) if response_buffer.has_content() => {
                        let _ = msgsend.send(Ok(response_buffer.into_inner()));
                    }
                    Ok(_) => {
                        // No response owed, nothing to forward.
                    }
                    Err(e) => {
                        error!("RPC error: {:?}", e);
                        let _ = msgsend.send(Err(e));
                    }
                }
            }
            debug!("command result handler finished");
        });

        (
            Self {
                cur_fragment: Vec::new(),
                socket_receive_channel: sockrecv,
                context: context.clone(),
                command_queue,
            },
            socksend,
            msgrecv,
        )
    }

    /// Reads one fragment; on record completion, submits the record for
    /// ordered processing. Call in a loop.
    pub async fn read(&mut self) -> Result<(), anyhow::Error> {
        let is_last =
            read_fragment(&mut self.socket_receive_channel, &mut self.cur_fragment).await?;
        if is_last {
            let fragment_data = std::mem::take(&mut self.cur_fragment);
            let context = self.context.clone();
            self.command_queue.submit_command(fragment_data, context)?;
        }
        Ok(())
    }
}

/// Queue processor: decodes one record, runs the RPC handler and reports
/// whether a response was produced.
pub fn process_rpc_command<'a>(
    data: &[u8],
    output: &'a mut ResponseBuffer,
    context: rpc::Context,
) -> futures::future::BoxFuture<'a, anyhow::Result<bool>> {
    let data_clone = data.to_vec();

    Box::pin(async move {
        let mut input_cursor = Cursor::new(data_clone);
        let output_buffer = output.get_mut_buffer();
        let mut output_cursor = Cursor::new(output_buffer);
        handle_rpc(&mut input_cursor, &mut output_cursor, context).await
    })
}
