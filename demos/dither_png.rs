//! Dithers a PNG to black and white.
//!
//! ```text
//! cargo run --release --example dither_png --features image -- \
//!     input.png output.png [threads]
//! ```
//!
//! Color is reduced with truncated BT.601 weights bumped up by one level,
//! not `image`'s own `to_luma8()`, so the output matches the C tool this
//! replaces.

use image::RgbImage;
use log::info;
use std::{env, error::Error, process, time::Instant};
use wavefront_dither::{DitherError, LumaGrid, dither};

fn luminance([r, g, b]: [u8; 3]) -> u8 {
    let value = (0.2989 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b))
        as u8;
    if value > 0 && value < 255 { value + 1 } else { value }
}

fn to_luma(image: &RgbImage) -> Result<LumaGrid, DitherError> {
    LumaGrid::from_fn(image.width() as usize, image.height() as usize, |x, y| {
        luminance(image.get_pixel(x as u32, y as u32).0)
    })
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .init();

    let args: Vec<String> = env::args().collect();
    if !(3..=4).contains(&args.len()) {
        eprintln!("Usage: {} <input.png> <output.png> [threads]", args[0]);
        process::exit(1);
    }

    let threads = match args.get(3) {
        Some(threads) => threads.parse()?,
        None => 1,
    };

    let luma = to_luma(&image::open(&args[1])?.to_rgb8())?;

    let start = Instant::now();
    let output = dither(&luma, threads)?;
    info!(
        "Dithered {}x{} with {threads} threads in {:.4}s",
        luma.width(),
        luma.height(),
        start.elapsed().as_secs_f64()
    );

    output.to_gray_image()?.save(&args[2])?;
    info!("Wrote {}", args[2]);

    Ok(())
}
