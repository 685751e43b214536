//! Choosing an engine for a run.

use crate::{Diffuse, Dimensions, Sequential, WaitStrategy};
#[cfg(feature = "rayon")]
use crate::Wavefront;
use enum_dispatch::enum_dispatch;
use log::debug;

/// Grids with fewer cells than this run sequentially by default.
///
/// Below roughly this size the per-cell synchronization costs more than
/// the extra threads win back. It is a tuning knob only; the wavefront
/// scheduler is correct at any size.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 10_000;

/// Engine selected by [`DitherConfig::engine()`].
///
/// All variants implement [`Diffuse`](crate::Diffuse) through
/// [`macro@enum_dispatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[enum_dispatch(Diffuse)]
pub enum Engine {
    /// Single-threaded, row-major.
    Sequential(Sequential),
    /// Diagonal wavefront on a fixed worker pool.
    #[cfg(feature = "rayon")]
    Wavefront(Wavefront),
}

/// Settings for [`dither_with()`](crate::dither_with).
///
/// # Example
///
/// ```rust
/// use wavefront_dither::{DitherConfig, LumaGrid, WaitStrategy, dither_with};
///
/// // Go parallel even for tiny grids, polling instead of sleeping.
/// let config = DitherConfig::new(4)
///     .with_parallel_threshold(0)
///     .with_wait_strategy(WaitStrategy::Spin);
///
/// let luma = LumaGrid::filled(8, 8, 100).unwrap();
/// let output = dither_with(&luma, &config).unwrap();
/// assert_eq!(output.get(0, 0), 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DitherConfig {
    /// Requested worker threads; `0` and `1` mean sequential.
    pub threads: usize,
    /// Grids with fewer cells than this run sequentially.
    pub parallel_threshold: usize,
    /// How wavefront workers wait on predecessor cells.
    pub wait: WaitStrategy,
}

impl Default for DitherConfig {
    fn default() -> Self {
        Self {
            threads: 1,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            wait: WaitStrategy::default(),
        }
    }
}

impl DitherConfig {
    pub fn new(threads: usize) -> Self {
        Self {
            threads,
            ..Default::default()
        }
    }

    pub fn with_parallel_threshold(mut self, parallel_threshold: usize) -> Self {
        self.parallel_threshold = parallel_threshold;
        self
    }

    pub fn with_wait_strategy(mut self, wait: WaitStrategy) -> Self {
        self.wait = wait;
        self
    }

    /// Picks the engine for a grid of `dimensions`.
    ///
    /// Sequential when `threads <= 1` or the grid has fewer than
    /// `parallel_threshold` cells, the wavefront scheduler otherwise.
    /// Without the `rayon` feature this is always sequential.
    pub fn engine(&self, dimensions: Dimensions) -> Engine {
        if self.threads <= 1 {
            debug!("Sequential: {} thread requested", self.threads);
            return Sequential.into();
        }

        if dimensions.len() < self.parallel_threshold {
            debug!(
                "Sequential: {} cells below threshold of {}",
                dimensions.len(),
                self.parallel_threshold
            );
            return Sequential.into();
        }

        #[cfg(feature = "rayon")]
        {
            debug!("Wavefront: {} threads", self.threads);
            return Wavefront::new(self.threads)
                .with_wait_strategy(self.wait)
                .into();
        }

        #[cfg(not(feature = "rayon"))]
        {
            debug!("Sequential: built without the `rayon` feature");
            Sequential.into()
        }
    }
}
