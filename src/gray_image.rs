//! Conversions between the grids and [`image::GrayImage`].
//!
//! Color to luminance reduction is left to the caller, e.g. via
//! [`DynamicImage::to_luma8()`](::image::DynamicImage::to_luma8).

use crate::{BinaryGrid, DitherError, LumaGrid};
use ::image::GrayImage;

impl TryFrom<&GrayImage> for LumaGrid {
    type Error = DitherError;

    fn try_from(image: &GrayImage) -> Result<Self, Self::Error> {
        LumaGrid::new(
            image.width() as usize,
            image.height() as usize,
            image.as_raw().clone(),
        )
    }
}

impl TryFrom<GrayImage> for LumaGrid {
    type Error = DitherError;

    fn try_from(image: GrayImage) -> Result<Self, Self::Error> {
        let (width, height) = (image.width() as usize, image.height() as usize);
        LumaGrid::new(width, height, image.into_raw())
    }
}

impl BinaryGrid {
    /// Copies the grid into a single-channel 8-bit image.
    ///
    /// Fails with [`DitherError::InvalidDimensions`] if a side does not fit
    /// in a `u32`.
    pub fn to_gray_image(&self) -> Result<GrayImage, DitherError> {
        let invalid = || DitherError::InvalidDimensions {
            width: self.width(),
            height: self.height(),
        };

        let width = u32::try_from(self.width()).map_err(|_| invalid())?;
        let height = u32::try_from(self.height()).map_err(|_| invalid())?;

        GrayImage::from_raw(width, height, self.as_slice().to_vec())
            .ok_or_else(invalid)
    }
}
