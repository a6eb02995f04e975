//! Command queue for ordered processing of RPC commands.
//!
//! NFS requires that requests on one connection are processed in the
//! order they were received; this queue preserves FIFO semantics while
//! keeping command submission decoupled from processing.

use anyhow::anyhow;
use tokio::sync::mpsc;
use tracing::{debug, error, trace};

use crate::protocol::rpc;

/// Response buffer reused across commands on a connection.
pub struct ResponseBuffer {
    buffer: Vec<u8>,
    has_content: bool,
}

impl ResponseBuffer {
    /// Creates a buffer with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self { buffer: Vec::with_capacity(capacity), has_content: false }
    }

    /// The internal buffer for writing.
    pub fn get_mut_buffer(&mut self) -> &mut Vec<u8> {
        &mut self.buffer
    }

    /// Marks the buffer as containing data to send.
    pub fn mark_has_content(&mut self) {
        self.has_content = true;
    }

    /// True when the buffer contains data to send.
    pub fn has_content(&self) -> bool {
        self.has_content
    }

    /// Takes the accumulated bytes, consuming the buffer.
    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }

    /// Clears the buffer for reuse.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.has_content = false;
    }
}

/// One queued RPC record with its connection context.
#[derive(Debug)]
pub struct RpcCommand {
    pub data: Vec<u8>,
    pub context: rpc::Context,
}

/// Command processing result: a response buffer, or nothing when no
/// reply is owed (retransmissions).
pub type CommandResult = Result<Option<ResponseBuffer>, anyhow::Error>;

/// Asynchronous RPC command processor signature.
pub type AsyncCommandProcessor = for<'a> fn(
    data: &[u8],
    output: &'a mut ResponseBuffer,
    context: rpc::Context,
) -> futures::future::BoxFuture<'a, anyhow::Result<bool>>;

/// FIFO queue feeding one worker task per connection.
#[derive(Debug, Clone)]
pub struct CommandQueue {
    command_sender: mpsc::UnboundedSender<RpcCommand>,
}

impl CommandQueue {
    /// Creates the queue and starts its worker task. The processor runs
    /// each command in submission order and decides whether a response
    /// is owed.
    pub fn new(
        processor: AsyncCommandProcessor,
        result_sender: mpsc::UnboundedSender<CommandResult>,
        buffer_capacity: usize,
    ) -> Self {
        let (command_sender, mut command_receiver) = mpsc::unbounded_channel::<RpcCommand>();

        tokio::spawn(async move {
            let mut output_buffer = ResponseBuffer::with_capacity(buffer_capacity);

            while let Some(command) = command_receiver.recv().await {
                trace!("processing command from queue");
                output_buffer.clear();

                let result =
                    match processor(&command.data, &mut output_buffer, command.context).await {
                        Ok(true) => {
                            output_buffer.mark_has_content();
                            let buffer_to_send = std::mem::replace(
                                &mut output_buffer,
                                ResponseBuffer::with_capacity(buffer_capacity),
                            );
                            Ok(Some(buffer_to_send))
                        }
                        Ok(false) => Ok(None),
                        Err(e) => Err(e),
                    };

                if result_sender.send(result).is_err() {
                    error!("failed to send command processing result");
                    break;
                }
            }
            debug!("command queue handler finished");
        });

        Self { command_sender }
    }

    /// Submits a command; commands are processed in submission order.
    pub fn submit_command(&self, data: Vec<u8>, context: rpc::Context) -> anyhow::Result<()> {
        self.command_sender
            .send(RpcCommand { data, context })
            .map_err(|e| anyhow!("failed to enqueue command: {e}"))
    }
}
