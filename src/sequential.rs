//! Single-threaded reference engine.

use crate::{
    Accumulator, BinaryGrid, Diffuse, DitherError, grid::try_buffer, kernel,
};

/// Row-major Floyd–Steinberg diffusion on the calling thread.
///
/// Every kernel target lies to the right on the same row or on the next
/// row, so visiting `y` then `x` in ascending order applies all
/// contributions to a cell before it is read. The output of this engine is
/// the reference any other engine must reproduce.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sequential;

impl Diffuse for Sequential {
    fn diffuse(
        &self,
        accumulator: &mut Accumulator,
    ) -> Result<BinaryGrid, DitherError> {
        let dimensions = accumulator.dimensions();
        let mut levels = try_buffer(dimensions.len(), "output grid", |_| 0u8)?;

        for y in 0..dimensions.height() {
            for x in 0..dimensions.width() {
                let index = dimensions.index(x, y);
                let diffusion =
                    kernel::diffuse(accumulator.value(index), x, y, dimensions);

                levels[index] = diffusion.level;
                for spill in diffusion.spills() {
                    accumulator.deposit(spill.index, spill.amount);
                }
            }
        }

        Ok(BinaryGrid::from_levels(dimensions, levels))
    }
}
