//! Floyd–Steinberg error diffusion with a deterministic multi-threaded
//! wavefront scheduler.
//!
//! Converts a grid of 8-bit luminance values into a grid of `0`/`255`
//! values by thresholding each cell and diffusing the error into its
//! not-yet-visited neighbors with the classic weights:
//!
//! ```text
//!             *    7
//!        3    5    1      (÷ 16, floored)
//! ```
//!
//! Two engines implement [`Diffuse`]:
//!
//! - [`Sequential`] -- the row-major reference. Its output is canonical.
//! - [`Wavefront`] -- processes anti-diagonals on a fixed pool of worker
//!   threads with per-cell synchronization, producing bit-identical output
//!   (requires the `rayon` feature, on by default).
//!
//! [`DitherConfig`] chooses between them: small grids and single-threaded
//! requests go to [`Sequential`].
//!
//! # Example
//!
//! ```rust
//! use wavefront_dither::{LumaGrid, dither};
//!
//! let luma = LumaGrid::from_fn(256, 64, |x, _| x as u8).unwrap();
//! let output = dither(&luma, 4).unwrap();
//!
//! assert_eq!(output.dimensions(), luma.dimensions());
//! assert!(output.as_slice().iter().all(|&v| v == 0 || v == 255));
//! ```
//!
//! # Features
//!
//! - `rayon` (default) -- the [`Wavefront`] scheduler.
//! - `image` -- conversions from/to `image::GrayImage`.
//! - `serde` -- `Serialize`/`Deserialize` for configuration types.
use enum_dispatch::enum_dispatch;

mod dispatch;
mod error;
mod grid;
#[cfg(feature = "image")]
mod gray_image;
pub mod kernel;
mod sequential;
mod sync;
#[cfg(feature = "rayon")]
mod wavefront;

pub use dispatch::*;
pub use error::*;
pub use grid::{Accumulator, BinaryGrid, Dimensions, LumaGrid};
pub use sequential::*;
pub use sync::WaitStrategy;
#[cfg(feature = "rayon")]
pub use wavefront::*;

/// An error diffusion engine.
///
/// Consumes the accumulator's contents in place: on return it holds each
/// cell's final value, luminance plus all error diffused into it.
#[enum_dispatch]
pub trait Diffuse {
    fn diffuse(
        &self,
        accumulator: &mut Accumulator,
    ) -> Result<BinaryGrid, DitherError>;
}

/// Dithers `luma` using up to `threads` worker threads.
///
/// Shorthand for [`dither_with()`] with [`DitherConfig::new()`].
pub fn dither(luma: &LumaGrid, threads: usize) -> Result<BinaryGrid, DitherError> {
    dither_with(luma, &DitherConfig::new(threads))
}

/// Dithers `luma` with the engine `config` selects for its size.
pub fn dither_with(
    luma: &LumaGrid,
    config: &DitherConfig,
) -> Result<BinaryGrid, DitherError> {
    let mut accumulator = Accumulator::try_from_luma(luma)?;
    config.engine(luma.dimensions()).diffuse(&mut accumulator)
}
