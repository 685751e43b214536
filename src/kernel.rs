//! The Floyd–Steinberg diffusion kernel.
//!
//! ```text
//!             *    7
//!        3    5    1      (÷ 16)
//! ```
//!
//! Every share is floored toward negative infinity, so `-7 * 7 / 16` is
//! `-4`, not the `-3` integer division would give.

use crate::Dimensions;
use smallvec::SmallVec;

/// Accumulator values strictly above this quantize to white.
pub const THRESHOLD: i32 = 128;
/// Output level for white cells.
pub const WHITE: u8 = 255;
/// Output level for black cells.
pub const BLACK: u8 = 0;
/// Common denominator of all kernel weights.
pub const DENOMINATOR: i32 = 16;

/// `(dx, dy, weight)` for each neighbor that receives error.
pub const WEIGHTS: [(isize, usize, i32); 4] =
    [(1, 0, 7), (-1, 1, 3), (0, 1, 5), (1, 1, 1)];

/// Error amount added to one neighbor cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Spill {
    /// Flat index of the receiving cell.
    pub index: usize,
    pub amount: i32,
}

/// Result of applying the kernel to one cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diffusion {
    /// [`BLACK`] or [`WHITE`].
    pub level: u8,
    /// `value - level`.
    pub error: i32,
    spills: SmallVec<[Spill; 4]>,
}

impl Diffusion {
    /// The in-bounds neighbors receiving error, in kernel order.
    #[inline]
    pub fn spills(&self) -> &[Spill] {
        &self.spills
    }
}

/// Thresholds `value`, returning the output level and the quantization
/// error.
#[inline(always)]
pub fn quantize(value: i32) -> (u8, i32) {
    let level = if value > THRESHOLD { WHITE } else { BLACK };
    (level, value - i32::from(level))
}

/// `⌊error × weight / 16⌋`.
#[inline(always)]
pub fn share(error: i32, weight: i32) -> i32 {
    // `div_euclid` by a positive divisor is floor division.
    (error * weight).div_euclid(DENOMINATOR)
}

/// Applies the kernel to the cell at `(x, y)` holding `value`.
///
/// Pure: nothing is written. Neighbors outside `dimensions` are dropped
/// together with their share of the error.
pub fn diffuse(
    value: i32,
    x: usize,
    y: usize,
    dimensions: Dimensions,
) -> Diffusion {
    let (level, error) = quantize(value);

    let spills = WEIGHTS
        .iter()
        .filter_map(|&(dx, dy, weight)| {
            let nx = x.checked_add_signed(dx)?;
            let ny = y + dy;
            (nx < dimensions.width() && ny < dimensions.height()).then(|| {
                Spill {
                    index: dimensions.index(nx, ny),
                    amount: share(error, weight),
                }
            })
        })
        .collect();

    Diffusion {
        level,
        error,
        spills,
    }
}
