//! Per-cell completion tracking for the wavefront scheduler.
//!
//! One [`CellSync`] per pixel lives in a single contiguous arena, indexed
//! like the grids. A cell goes from unprocessed to processed exactly once
//! per run and is never reset; a new run allocates a new arena.
#![cfg_attr(not(feature = "rayon"), allow(dead_code))]

use crate::{DitherError, grid::try_buffer};
use std::{
    hint,
    sync::{
        Condvar, Mutex, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
    thread,
};

/// Spins before [`WaitStrategy::Spin`] starts yielding its time slice.
const SPIN_LIMIT: u32 = 64;

/// How a worker waits for a predecessor cell.
///
/// Both strategies produce identical output; they only trade CPU time for
/// wake-up latency.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WaitStrategy {
    /// Sleep on the cell's condition variable until it is published.
    #[default]
    Block,
    /// Poll the cell's flag, yielding to the OS scheduler after a short
    /// burst of spins.
    Spin,
}

struct CellSync {
    processed: AtomicBool,
    lock: Mutex<()>,
    ready: Condvar,
}

impl CellSync {
    fn new() -> Self {
        Self {
            processed: AtomicBool::new(false),
            lock: Mutex::new(()),
            ready: Condvar::new(),
        }
    }

    #[inline(always)]
    fn is_processed(&self) -> bool {
        self.processed.load(Ordering::Acquire)
    }

    fn wait(&self, strategy: WaitStrategy) {
        if self.is_processed() {
            return;
        }

        match strategy {
            WaitStrategy::Block => {
                let mut guard =
                    self.lock.lock().unwrap_or_else(PoisonError::into_inner);
                // Wakeups are re-checked against the flag.
                while !self.is_processed() {
                    guard = self
                        .ready
                        .wait(guard)
                        .unwrap_or_else(PoisonError::into_inner);
                }
            }
            WaitStrategy::Spin => {
                let mut spins = 0;
                while !self.is_processed() {
                    if spins < SPIN_LIMIT {
                        spins += 1;
                        hint::spin_loop();
                    } else {
                        thread::yield_now();
                    }
                }
            }
        }
    }

    fn publish(&self, strategy: WaitStrategy) {
        match strategy {
            WaitStrategy::Block => {
                // The flag must flip under the lock or a waiter that just
                // saw `false` could miss the notification.
                let guard =
                    self.lock.lock().unwrap_or_else(PoisonError::into_inner);
                self.processed.store(true, Ordering::Release);
                drop(guard);
                self.ready.notify_all();
            }
            WaitStrategy::Spin => {
                self.processed.store(true, Ordering::Release);
            }
        }
    }
}

/// Proof that every predecessor of a cell has been processed.
///
/// Only [`Frontier::settle`] creates one, and [`Frontier::publish`]
/// consumes it, so each cell is published at most once.
#[derive(Debug)]
pub(crate) struct Settled {
    index: usize,
}

impl Settled {
    #[inline(always)]
    pub(crate) fn index(&self) -> usize {
        self.index
    }
}

/// The arena of per-cell synchronization state for one run.
pub(crate) struct Frontier {
    cells: Box<[CellSync]>,
    strategy: WaitStrategy,
}

impl Frontier {
    pub(crate) fn try_new(
        len: usize,
        strategy: WaitStrategy,
    ) -> Result<Self, DitherError> {
        let cells = try_buffer(len, "cell synchronization", |_| CellSync::new())?;

        Ok(Self {
            cells: cells.into_boxed_slice(),
            strategy,
        })
    }

    /// Blocks until every cell in `predecessors` is processed, then hands
    /// out the token for cell `index`.
    pub(crate) fn settle(
        &self,
        index: usize,
        predecessors: impl IntoIterator<Item = usize>,
    ) -> Settled {
        for predecessor in predecessors {
            self.cells[predecessor].wait(self.strategy);
        }

        Settled { index }
    }

    /// Marks the cell as processed and wakes everyone waiting on it.
    pub(crate) fn publish(&self, cell: Settled) {
        self.cells[cell.index].publish(self.strategy);
    }

    pub(crate) fn is_processed(&self, index: usize) -> bool {
        self.cells[index].is_processed()
    }
}
