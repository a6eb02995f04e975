//! Transaction tracking for RPC idempotency (RFC 5531).
//!
//! Retransmitted requests are identified by transaction ID (XID) and
//! client address. A retransmission of an in-progress or recently
//! completed transaction is dropped rather than re-executed, preserving
//! at-most-once semantics for non-idempotent operations like WRITE.
//! Completed entries age out after a retention period.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

/// Tracks RPC transactions to detect and suppress retransmissions.
pub struct TransactionTracker {
    retention_period: Duration,
    transactions: Mutex<HashMap<(u32, String), TransactionState>>,
}

impl TransactionTracker {
    /// Creates a tracker that remembers completed transactions for the
    /// given retention period.
    pub fn new(retention_period: Duration) -> Self {
        Self { retention_period, transactions: Mutex::new(HashMap::new()) }
    }

    /// Checks whether the transaction has been seen before; a new
    /// transaction is marked in-progress as a side effect.
    pub fn is_retransmission(&self, xid: u32, client_addr: &str) -> bool {
        let key = (xid, client_addr.to_string());
        let mut transactions =
            self.transactions.lock().expect("transaction tracker lock poisoned");
        housekeeping(&mut transactions, self.retention_period);
        if let std::collections::hash_map::Entry::Vacant(entry) = transactions.entry(key) {
            entry.insert(TransactionState::InProgress);
            false
        } else {
            true
        }
    }

    /// Marks a transaction as processed, starting its retention clock.
    pub fn mark_processed(&self, xid: u32, client_addr: &str) {
        let key = (xid, client_addr.to_string());
        let completion_time = SystemTime::now();
        let mut transactions =
            self.transactions.lock().expect("transaction tracker lock poisoned");
        if let Some(tx) = transactions.get_mut(&key) {
            *tx = TransactionState::Completed(completion_time);
        }
    }
}

/// Drops completed transactions older than the retention period.
/// In-progress transactions are kept regardless of age so duplicates of
/// long-running calls stay suppressed.
fn housekeeping(transactions: &mut HashMap<(u32, String), TransactionState>, max_age: Duration) {
    let cutoff = SystemTime::now() - max_age;
    transactions.retain(|_, state| match state {
        TransactionState::InProgress => true,
        TransactionState::Completed(completion_time) => *completion_time >= cutoff,
    });
}

enum TransactionState {
    InProgress,
    Completed(SystemTime),
}
