//! Multi-threaded wavefront scheduler.
//!
//! Cells on one anti-diagonal (`x + y` constant) never feed error into
//! each other, and every cell a kernel application depends on lies on an
//! earlier diagonal. Diagonals are dealt round-robin to a fixed set of
//! workers; instead of a barrier per diagonal, each cell waits only on its
//! own predecessors:
//!
//! ```text
//!        .   .   U
//!        L   *
//! ```
//!
//! `L` is the left neighbor and `U` the up-right one. Waiting on both
//! transitively covers the cells above and above-left, which also spill
//! into `*`.

use crate::{
    Accumulator, BinaryGrid, Diffuse, Dimensions, DitherError, WaitStrategy,
    grid::try_buffer,
    kernel,
    sync::{Frontier, Settled},
};
use log::{debug, trace};
use rayon::ThreadPoolBuilder;
use smallvec::SmallVec;
use std::sync::atomic::{AtomicI32, AtomicU8, Ordering};

/// Floyd–Steinberg diffusion on `workers` threads, bit-identical to
/// [`Sequential`](crate::Sequential).
///
/// Worker `t` of `n` owns every diagonal `d` with `d % n == t` and walks
/// them in ascending order. Each run builds its own pool and per-cell
/// state; nothing carries over between runs.
///
/// # Example
///
/// ```rust
/// use wavefront_dither::{
///     Accumulator, Diffuse, LumaGrid, Sequential, Wavefront,
/// };
///
/// let luma = LumaGrid::from_fn(64, 48, |x, y| (x * 4 + y) as u8).unwrap();
///
/// let mut reference = Accumulator::try_from_luma(&luma).unwrap();
/// let expected = Sequential.diffuse(&mut reference).unwrap();
///
/// let mut accumulator = Accumulator::try_from_luma(&luma).unwrap();
/// let output = Wavefront::new(3).diffuse(&mut accumulator).unwrap();
///
/// assert_eq!(output, expected);
/// assert_eq!(accumulator, reference);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "WavefrontSettings"))]
pub struct Wavefront {
    workers: usize,
    wait: WaitStrategy,
}

impl Wavefront {
    /// Creates a scheduler with `workers` threads. Zero is treated as one.
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            wait: WaitStrategy::default(),
        }
    }

    pub fn with_wait_strategy(mut self, wait: WaitStrategy) -> Self {
        self.wait = wait;
        self
    }

    #[inline]
    pub fn workers(&self) -> usize {
        self.workers
    }

    #[inline]
    pub fn wait_strategy(&self) -> WaitStrategy {
        self.wait
    }
}

/// Deserialized form of [`Wavefront`], normalized through
/// [`Wavefront::new()`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct WavefrontSettings {
    workers: usize,
    #[serde(default)]
    wait: WaitStrategy,
}

#[cfg(feature = "serde")]
impl From<WavefrontSettings> for Wavefront {
    fn from(settings: WavefrontSettings) -> Self {
        Wavefront::new(settings.workers).with_wait_strategy(settings.wait)
    }
}

impl Diffuse for Wavefront {
    fn diffuse(
        &self,
        accumulator: &mut Accumulator,
    ) -> Result<BinaryGrid, DitherError> {
        let dimensions = accumulator.dimensions();

        let cells = SharedAccumulator::try_from_accumulator(accumulator)?;
        let levels = try_buffer(dimensions.len(), "output grid", |_| {
            AtomicU8::new(0)
        })?;
        let frontier = Frontier::try_new(dimensions.len(), self.wait)?;

        debug!(
            "Wavefront over {}x{} with {} workers ({:?} waits)",
            dimensions.width(),
            dimensions.height(),
            self.workers,
            self.wait
        );

        // Scoped so every worker thread is joined before we return.
        ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|index| format!("wavefront-{index}"))
            .build_scoped(
                |thread| thread.run(),
                |pool| {
                    pool.broadcast(|context| {
                        Worker {
                            id: context.index(),
                            count: self.workers,
                            dimensions,
                            cells: &cells,
                            levels: &levels,
                            frontier: &frontier,
                        }
                        .run()
                    });
                },
            )?;

        cells.write_back(accumulator);

        Ok(BinaryGrid::from_levels(
            dimensions,
            levels.into_iter().map(AtomicU8::into_inner).collect(),
        ))
    }
}

/// The accumulator while workers share it.
///
/// Deposits are atomic per cell, which is all concurrent writers to the
/// same cell need. A cell's value is only read through a [`Settled`]
/// token, at which point no writer to it remains.
struct SharedAccumulator {
    values: Box<[AtomicI32]>,
}

impl SharedAccumulator {
    fn try_from_accumulator(
        accumulator: &Accumulator,
    ) -> Result<Self, DitherError> {
        let seed = accumulator.as_slice();
        let values = try_buffer(seed.len(), "shared accumulator", |index| {
            AtomicI32::new(seed[index])
        })?;

        Ok(Self {
            values: values.into_boxed_slice(),
        })
    }

    #[inline(always)]
    fn read(&self, cell: &Settled) -> i32 {
        // Ordered by the acquire in `Frontier::settle`.
        self.values[cell.index()].load(Ordering::Relaxed)
    }

    #[inline(always)]
    fn deposit(&self, index: usize, amount: i32) {
        self.values[index].fetch_add(amount, Ordering::Relaxed);
    }

    fn write_back(self, accumulator: &mut Accumulator) {
        for (target, value) in accumulator
            .values_mut()
            .iter_mut()
            .zip(self.values.into_vec())
        {
            *target = value.into_inner();
        }
    }
}

struct Worker<'a> {
    id: usize,
    count: usize,
    dimensions: Dimensions,
    cells: &'a SharedAccumulator,
    levels: &'a [AtomicU8],
    frontier: &'a Frontier,
}

impl Worker<'_> {
    fn run(self) {
        let diagonals = self.dimensions.diagonal_count();
        trace!(
            "Worker {} owns {} of {} diagonals",
            self.id,
            diagonals.saturating_sub(self.id).div_ceil(self.count),
            diagonals
        );

        for diagonal in (self.id..diagonals).step_by(self.count) {
            for (x, y) in self.dimensions.diagonal(diagonal) {
                self.process(x, y);
            }
        }

        trace!("Worker {} done", self.id);
    }

    fn process(&self, x: usize, y: usize) {
        let index = self.dimensions.index(x, y);
        let cell = self
            .frontier
            .settle(index, predecessors(self.dimensions, x, y));

        let diffusion =
            kernel::diffuse(self.cells.read(&cell), x, y, self.dimensions);

        self.levels[index].store(diffusion.level, Ordering::Relaxed);
        for spill in diffusion.spills() {
            self.cells.deposit(spill.index, spill.amount);
        }

        self.frontier.publish(cell);
    }
}

/// Cells that must be processed before `(x, y)` may be read.
///
/// The up-right neighbor, or the cell straight above when there is none,
/// then the left neighbor. In a single-column grid the cell above is the
/// only remaining writer, so it can not be skipped.
fn predecessors(
    dimensions: Dimensions,
    x: usize,
    y: usize,
) -> SmallVec<[usize; 2]> {
    let mut cells = SmallVec::new();

    if y > 0 {
        let above = (x + 1).min(dimensions.width() - 1);
        cells.push(dimensions.index(above, y - 1));
    }
    if x > 0 {
        cells.push(dimensions.index(x - 1, y));
    }

    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predecessors_of_interior_cell() {
        let dimensions = Dimensions::new(4, 4).unwrap();
        assert_eq!(
            predecessors(dimensions, 1, 2).as_slice(),
            &[dimensions.index(2, 1), dimensions.index(0, 2)]
        );
    }

    #[test]
    fn first_row_and_column_wait_less() {
        let dimensions = Dimensions::new(4, 4).unwrap();
        assert!(predecessors(dimensions, 0, 0).is_empty());
        assert_eq!(predecessors(dimensions, 2, 0).as_slice(), &[1]);
        assert_eq!(
            predecessors(dimensions, 0, 3).as_slice(),
            &[dimensions.index(1, 2)]
        );
    }

    #[test]
    fn right_column_waits_on_cell_above() {
        let dimensions = Dimensions::new(4, 4).unwrap();
        assert_eq!(
            predecessors(dimensions, 3, 1).as_slice(),
            &[dimensions.index(3, 0), dimensions.index(2, 1)]
        );

        let column = Dimensions::new(1, 5).unwrap();
        assert_eq!(predecessors(column, 0, 3).as_slice(), &[2]);
    }

    #[test]
    fn predecessors_lie_on_previous_diagonal_or_above() {
        let dimensions = Dimensions::new(5, 3).unwrap();
        for y in 0..3 {
            for x in 0..5 {
                for predecessor in predecessors(dimensions, x, y) {
                    let (px, py) = (
                        predecessor % dimensions.width(),
                        predecessor / dimensions.width(),
                    );
                    assert!(px + py < x + y);
                }
            }
        }
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialized_worker_count_is_normalized() {
        let wavefront: Wavefront =
            serde_json::from_str(r#"{"workers":0,"wait":"Spin"}"#).unwrap();
        assert_eq!(wavefront.workers(), 1);
        assert_eq!(wavefront.wait_strategy(), WaitStrategy::Spin);

        let wavefront: Wavefront =
            serde_json::from_str(r#"{"workers":6}"#).unwrap();
        assert_eq!(wavefront, Wavefront::new(6));
    }
}
