use image::Rgb;

use crate::raster::Raster;

/// Edge length of the square sampled for one half cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Window {
    Block(u32),
    Continuous(f64),
}

impl Window {
    /// Window edge in whole pixels, never below one.
    pub fn span(self) -> i64 {
        match self {
            Window::Block(size) => i64::from(size),
            Window::Continuous(factor) => factor.round() as i64,
        }
        .max(1)
    }
}

/// Box-average the window starting at `(start_x, start_y)`.
///
/// The window is clipped to the image bounds and averaged over the pixels it
/// actually covers, so border windows keep their brightness. The start must
/// lie inside the image.
pub fn sample<R: Raster + ?Sized>(image: &R, start_x: i64, start_y: i64, window: Window) -> Rgb<u8> {
    let span = window.span();
    if span <= 1 {
        return narrow(image.rgb16(start_x, start_y));
    }

    let bounds = image.bounds();
    let x_end = bounds.max_x.min(start_x + span);
    let y_end = bounds.max_y.min(start_y + span);

    let mut sum = [0u64; 3];
    for y in start_y..y_end {
        for x in start_x..x_end {
            let px = image.rgb16(x, y);
            sum[0] += u64::from(px[0]);
            sum[1] += u64::from(px[1]);
            sum[2] += u64::from(px[2]);
        }
    }

    let count = ((x_end - start_x) * (y_end - start_y)).max(1) as u64;
    Rgb([
        ((sum[0] / count) >> 8) as u8,
        ((sum[1] / count) >> 8) as u8,
        ((sum[2] / count) >> 8) as u8,
    ])
}

fn narrow(px: [u16; 3]) -> Rgb<u8> {
    Rgb([(px[0] >> 8) as u8, (px[1] >> 8) as u8, (px[2] >> 8) as u8])
}
