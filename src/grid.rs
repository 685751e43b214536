//! Pixel grids used by the engines.
//!
//! All grids are stored row-major in one flat buffer and addressed by
//! `y * width + x`.

use crate::DitherError;

/// Allocates a buffer of `len` elements without aborting on exhaustion.
pub(crate) fn try_buffer<T>(
    len: usize,
    what: &'static str,
    fill: impl FnMut(usize) -> T,
) -> Result<Vec<T>, DitherError> {
    let mut buffer = Vec::new();
    buffer.try_reserve_exact(len).map_err(|source| {
        DitherError::AllocationFailure {
            what,
            cells: len,
            source,
        }
    })?;
    buffer.extend((0..len).map(fill));

    Ok(buffer)
}

/// Width and height of a non-empty grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawDimensions"))]
pub struct Dimensions {
    width: usize,
    height: usize,
}

/// Unvalidated [`Dimensions`] as read by `serde`.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawDimensions {
    width: usize,
    height: usize,
}

#[cfg(feature = "serde")]
impl TryFrom<RawDimensions> for Dimensions {
    type Error = DitherError;

    fn try_from(raw: RawDimensions) -> Result<Self, Self::Error> {
        Dimensions::new(raw.width, raw.height)
    }
}

impl Dimensions {
    /// Validates `width` × `height`.
    ///
    /// Fails with [`DitherError::InvalidDimensions`] if either side is zero
    /// or the cell count does not fit in a `usize`.
    pub fn new(width: usize, height: usize) -> Result<Self, DitherError> {
        match width.checked_mul(height) {
            Some(len) if len > 0 => Ok(Self { width, height }),
            _ => Err(DitherError::InvalidDimensions { width, height }),
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    /// Always `false`; a `Dimensions` can not describe an empty grid.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Flat index of `(x, y)`.
    #[inline(always)]
    pub fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.height);
        y * self.width + x
    }

    /// Number of anti-diagonals, `width + height - 1`.
    #[inline]
    pub fn diagonal_count(&self) -> usize {
        self.width + self.height - 1
    }

    /// The in-bounds cells `(x, y)` with `x + y == diagonal`, in ascending
    /// `y`.
    ///
    /// Yields nothing for `diagonal >= self.diagonal_count()`.
    pub fn diagonal(
        &self,
        diagonal: usize,
    ) -> impl Iterator<Item = (usize, usize)> + use<> {
        let first = diagonal.saturating_sub(self.width - 1);
        let last = diagonal.min(self.height - 1);

        // `first > last` past the final diagonal, giving an empty range.
        (first..=last).map(move |y| (diagonal - y, y))
    }
}

/// Input grid of 8-bit luminance samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LumaGrid {
    dimensions: Dimensions,
    samples: Vec<u8>,
}

impl LumaGrid {
    /// Wraps a row-major sample buffer.
    ///
    /// `samples.len()` must equal `width * height`.
    pub fn new(
        width: usize,
        height: usize,
        samples: Vec<u8>,
    ) -> Result<Self, DitherError> {
        let dimensions = Dimensions::new(width, height)?;
        if samples.len() != dimensions.len() {
            return Err(DitherError::BufferSize {
                expected: dimensions.len(),
                actual: samples.len(),
            });
        }

        Ok(Self {
            dimensions,
            samples,
        })
    }

    /// Builds a grid by evaluating `f(x, y)` for every cell.
    pub fn from_fn(
        width: usize,
        height: usize,
        mut f: impl FnMut(usize, usize) -> u8,
    ) -> Result<Self, DitherError> {
        let dimensions = Dimensions::new(width, height)?;
        let samples = try_buffer(dimensions.len(), "luminance grid", |i| {
            f(i % width, i / width)
        })?;

        Ok(Self {
            dimensions,
            samples,
        })
    }

    /// A grid where every sample is `value`.
    pub fn filled(
        width: usize,
        height: usize,
        value: u8,
    ) -> Result<Self, DitherError> {
        Self::from_fn(width, height, |_, _| value)
    }

    #[inline]
    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.dimensions.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.dimensions.height
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.samples[self.dimensions.index(x, y)]
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.samples
    }
}

/// Dithered output; every value is either `0` or `255`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryGrid {
    dimensions: Dimensions,
    levels: Vec<u8>,
}

impl BinaryGrid {
    pub(crate) fn from_levels(dimensions: Dimensions, levels: Vec<u8>) -> Self {
        debug_assert_eq!(levels.len(), dimensions.len());
        Self { dimensions, levels }
    }

    #[inline]
    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.dimensions.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.dimensions.height
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.levels[self.dimensions.index(x, y)]
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.levels
    }

    /// Iterates over rows, top to bottom.
    pub fn rows(&self) -> std::slice::ChunksExact<'_, u8> {
        self.levels.chunks_exact(self.dimensions.width)
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.levels
    }
}

/// The error accumulator: each cell's luminance plus all error diffused
/// into it so far.
///
/// Values stay roughly within `-4080..=4335` for 8-bit input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accumulator {
    dimensions: Dimensions,
    values: Vec<i32>,
}

impl Accumulator {
    /// Seeds the accumulator from `luma`.
    pub fn try_from_luma(luma: &LumaGrid) -> Result<Self, DitherError> {
        let samples = luma.as_slice();
        let values = try_buffer(samples.len(), "accumulator", |i| {
            i32::from(samples[i])
        })?;

        Ok(Self {
            dimensions: luma.dimensions(),
            values,
        })
    }

    #[inline]
    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> i32 {
        self.values[self.dimensions.index(x, y)]
    }

    #[inline]
    pub fn as_slice(&self) -> &[i32] {
        &self.values
    }

    #[inline(always)]
    pub(crate) fn value(&self, index: usize) -> i32 {
        self.values[index]
    }

    #[inline(always)]
    pub(crate) fn deposit(&mut self, index: usize, amount: i32) {
        self.values[index] += amount;
    }

    #[cfg(feature = "rayon")]
    pub(crate) fn values_mut(&mut self) -> &mut [i32] {
        &mut self.values
    }
}
