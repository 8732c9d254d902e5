//! Supersession of long-running operations.
//!
//! Bulk placement and streaming export run in batches. When the user starts
//! a new operation the older one must stop at its next batch boundary and
//! discard whatever it has not committed yet.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Hands out operation tokens; only the newest token is current.
#[derive(Debug, Clone, Default)]
pub struct OperationTracker {
    generation: Arc<AtomicU64>,
}

impl OperationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new operation, superseding any in-flight one
    pub fn begin(&self) -> OperationToken {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        OperationToken {
            generation,
            tracker: Arc::clone(&self.generation),
        }
    }

    /// Generation of the newest operation
    pub fn current(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}

/// Handle held by a running operation.
#[derive(Debug, Clone)]
pub struct OperationToken {
    generation: u64,
    tracker: Arc<AtomicU64>,
}

impl OperationToken {
    /// False once a newer operation has begun
    pub fn is_current(&self) -> bool {
        self.tracker.load(Ordering::SeqCst) == self.generation
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}
