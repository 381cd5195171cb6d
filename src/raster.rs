//! Read-only access to decoded pixels.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use image::{ImageBuffer, ImageReader, Rgb};
use tracing::debug;

use crate::error::{Result, ViewError};

/// Decoded pixels, 16 bits per channel.
pub type Rgb16Image = ImageBuffer<Rgb<u16>, Vec<u16>>;

/// Half-open pixel bounds `[min_x, max_x) × [min_y, max_y)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min_x: i64,
    pub min_y: i64,
    pub max_x: i64,
    pub max_y: i64,
}

impl Bounds {
    pub fn from_size(width: u32, height: u32) -> Self {
        Self {
            min_x: 0,
            min_y: 0,
            max_x: i64::from(width),
            max_y: i64::from(height),
        }
    }

    pub fn width(&self) -> i64 {
        (self.max_x - self.min_x).max(0)
    }

    pub fn height(&self) -> i64 {
        (self.max_y - self.min_y).max(0)
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}

/// A decoded image as seen by the renderer.
///
/// Channels are 16 bits wide; the sampler narrows them to 8 bits only after
/// averaging. Callers never ask for pixels outside [`Raster::bounds`].
pub trait Raster {
    fn bounds(&self) -> Bounds;

    fn rgb16(&self, x: i64, y: i64) -> [u16; 3];
}

impl Raster for Rgb16Image {
    fn bounds(&self) -> Bounds {
        Bounds::from_size(self.width(), self.height())
    }

    fn rgb16(&self, x: i64, y: i64) -> [u16; 3] {
        self.get_pixel(x as u32, y as u32).0
    }
}

/// Decode the file at `path` into a 16-bit RGB raster, dropping alpha.
pub fn open_image(path: &Path) -> Result<Rgb16Image> {
    let decoded = {
        let file = File::open(path).map_err(|source| ViewError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        ImageReader::new(BufReader::new(file))
            .with_guessed_format()
            .map_err(|source| ViewError::Io {
                path: path.to_path_buf(),
                source,
            })?
            .decode()?
    };

    let (width, height) = (decoded.width(), decoded.height());
    if width == 0 || height == 0 {
        return Err(ViewError::EmptyImage { width, height });
    }
    debug!(path = %path.display(), width, height, "decoded image");

    Ok(decoded.into_rgb16())
}
