//! Pixel transforms applied to a decoded [`RasterImage`].
//!
//! Every transform implements [`RasterTransform`] and mutates the raster in
//! place. Grayscale and sepia are independent per pixel and go through
//! [`map_pixels`], which fans rows out over the rayon pool. Dithering carries
//! error from pixel to pixel and runs its own sequential sweep.
//!
//! No transform touches the alpha channel.

pub mod dither;
pub mod grayscale;
pub mod sepia;

pub use dither::Dither;
pub use grayscale::Grayscale;
pub use sepia::Sepia;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::raster::{RasterImage, CHANNELS};

/// A transform over a whole raster.
pub trait RasterTransform: Send + Sync {
    /// Mutate `raster` in place. Dimensions never change.
    fn apply(&self, raster: &mut RasterImage);
}

/// Identifies one of the three transforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformKind {
    Grayscale,
    Sepia,
    Dither,
}

impl TransformKind {
    /// All transforms, in the order jobs are launched for an image.
    pub const ALL: [TransformKind; 3] = [Self::Grayscale, Self::Sepia, Self::Dither];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Grayscale => "grayscale",
            Self::Sepia => "sepia",
            Self::Dither => "dither",
        }
    }

    /// The implementation behind this kind.
    pub fn transform(&self) -> &'static dyn RasterTransform {
        match self {
            Self::Grayscale => &Grayscale,
            Self::Sepia => &Sepia,
            Self::Dither => &Dither,
        }
    }
}

impl std::fmt::Display for TransformKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Apply `f` to every pixel of `raster`, rows in parallel.
///
/// `f` receives one 4-byte RGBA slice at a time and must only depend on that
/// pixel.
pub fn map_pixels<F>(raster: &mut RasterImage, f: F)
where
    F: Fn(&mut [u8]) + Send + Sync,
{
    let row_len = raster.width() as usize * CHANNELS;
    raster
        .as_bytes_mut()
        .par_chunks_mut(row_len)
        .for_each(|row| row.chunks_exact_mut(CHANNELS).for_each(&f));
}
