//! RPC (Remote Procedure Call) protocol machinery as specified in
//! RFC 5531.
//!
//! This module is the communication layer for the NFS, MOUNT and
//! PORTMAP/rpcbind programs:
//!
//! 1. Message framing for TCP using the Record Marking Standard
//! 2. Transaction tracking for detecting and handling retransmissions
//! 3. Authentication decode (AUTH_UNIX)
//! 4. Program/version/procedure dispatch
//! 5. Ordered command processing with FIFO guarantees per connection

mod command_queue;
mod context;
mod transaction_tracker;
mod wire;

pub use context::{Context, Transport};
pub use transaction_tracker::TransactionTracker;
pub use wire::{write_fragment, SocketMessageHandler};

/// Upper bound for one reassembled RPC record; larger records are
/// rejected before allocation.
pub const MAX_RPC_RECORD_LENGTH: usize = 8 * 1024 * 1024;
