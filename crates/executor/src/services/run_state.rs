use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use common::models::RunResult;

/// Single-flight guard over the trading cycle. The `running` flag is owned
/// here exclusively; business logic never touches it directly.
#[derive(Debug, Default)]
pub struct ExecutionGuard {
    running: AtomicBool,
}

impl ExecutionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically flip `running` from false to true. Exactly one caller
    /// wins until the returned permit is dropped; losers get `None` and
    /// must not do any cycle work.
    pub fn try_acquire(self: &Arc<Self>) -> Option<CyclePermit> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
            .then(|| CyclePermit {
                guard: Arc::clone(self),
            })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    fn release(&self) {
        self.running.store(false, Ordering::Release);
    }
}

/// Proof of cycle ownership. Dropping it releases the guard, which covers
/// every exit path of a cycle, including panics in the worker task.
#[derive(Debug)]
pub struct CyclePermit {
    guard: Arc<ExecutionGuard>,
}

impl Drop for CyclePermit {
    fn drop(&mut self) {
        self.guard.release();
    }
}

/// Terminal state of a cycle as published to pollers.
#[derive(Debug, Clone)]
pub enum CycleOutcome {
    Completed(RunResult),
    Failed {
        timestamp: DateTime<Utc>,
        error: String,
    },
}

/// Last-writer-wins cell holding the most recent cycle outcome. No
/// history: each store replaces the previous value.
#[derive(Debug, Default)]
pub struct ResultSlot {
    inner: RwLock<Option<CycleOutcome>>,
}

impl ResultSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn store(&self, outcome: CycleOutcome) {
        *self.inner.write().await = Some(outcome);
    }

    pub async fn load(&self) -> Option<CycleOutcome> {
        self.inner.read().await.clone()
    }
}
