/// Source pixels per output cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    /// Integer window edge for grid-aligned sampling.
    pub block_size: u32,
    /// Unrounded ratio for continuous zoom.
    pub factor: f64,
}

/// Compute the scale that fits an image into a viewport of cells.
///
/// Every cell carries two source rows, so the vertical ratio is taken against
/// `viewport_height * 2`. Below 1 the block size is rounded up so a window
/// never covers zero pixels; at or above 1 it is rounded to nearest. The
/// resulting jump at exactly 1 is intended.
///
/// Both viewport dimensions must be non-zero.
pub fn calculate_scale(
    image_height: u32,
    image_width: u32,
    viewport_height: u16,
    viewport_width: u16,
) -> Scale {
    let width_ratio = f64::from(image_width) / f64::from(viewport_width);
    let height_ratio = f64::from(image_height) / (f64::from(viewport_height) * 2.0);
    let factor = width_ratio.max(height_ratio);

    let block_size = if factor < 1.0 {
        factor.ceil()
    } else {
        factor.round()
    };

    Scale {
        // an empty image gives factor 0
        block_size: (block_size as u32).max(1),
        factor,
    }
}
