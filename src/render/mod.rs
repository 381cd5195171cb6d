//! Half-block rendering of a raster into a grid of terminal cells.
//!
//! Every cell shows two vertically stacked source windows: the upper one as
//! the foreground color of `▀` and the lower one as the background.

mod sample;
mod scale;

use std::fmt::Write as _;

use image::Rgb;
use tracing::trace;

use crate::raster::Raster;
use crate::viewport::{PanOffset, ViewportSize};

pub use sample::{Window, sample};
pub use scale::{Scale, calculate_scale};

pub const UPPER_HALF_BLOCK: char = '\u{2580}';
pub const RESET: &str = "\x1b[0m";

/// How source pixels are mapped onto cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScaleMode {
    /// Fit the whole image with an integer block size. Pan offsets are ignored.
    BlockAligned,
    /// Sample with an arbitrary factor (source pixels per cell column).
    Continuous(f64),
}

/// One rendered cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HalfBlock {
    pub upper: Rgb<u8>,
    /// `None` when the lower window falls below the image.
    pub lower: Option<Rgb<u8>>,
}

/// Output of a single render pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub text: String,
    pub rows: Vec<Vec<HalfBlock>>,
    pub block_size: u32,
    pub factor: f64,
    pub viewport: ViewportSize,
}

impl RenderFrame {
    fn empty(viewport: ViewportSize) -> Self {
        Self {
            text: String::new(),
            rows: Vec::new(),
            block_size: 1,
            factor: 1.0,
            viewport,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub fn render<R: Raster + ?Sized>(
    image: &R,
    viewport: ViewportSize,
    mode: ScaleMode,
    offset: PanOffset,
) -> RenderFrame {
    let bounds = image.bounds();
    if viewport.is_empty() || bounds.is_empty() {
        return RenderFrame::empty(viewport);
    }

    let (block_size, factor) = match mode {
        ScaleMode::BlockAligned => {
            let scale = calculate_scale(
                bounds.height() as u32,
                bounds.width() as u32,
                viewport.height,
                viewport.width,
            );
            (scale.block_size, scale.factor)
        }
        ScaleMode::Continuous(factor) => (Window::Continuous(factor).span() as u32, factor),
    };

    // (top row, bottom row, window) for a cell row / the x and window for a column
    let row_of = |vy: i64| -> (i64, i64, Window) {
        match mode {
            ScaleMode::BlockAligned => {
                let size = i64::from(block_size);
                let y = vy * size * 2 + bounds.min_y;
                (y, y + size, Window::Block(block_size))
            }
            ScaleMode::Continuous(f) => {
                let y = (vy as f64 * f * 2.0).round() as i64 + bounds.min_y + offset.y;
                (y, (y as f64 + f).round() as i64, Window::Continuous(f))
            }
        }
    };
    let column_of = |vx: i64| -> i64 {
        match mode {
            ScaleMode::BlockAligned => vx * i64::from(block_size) + bounds.min_x,
            ScaleMode::Continuous(f) => (vx as f64 * f).round() as i64 + bounds.min_x + offset.x,
        }
    };

    let mut rows = Vec::with_capacity(usize::from(viewport.height));
    for vy in 0..i64::from(viewport.height) {
        let (y, bottom, window) = row_of(vy);
        if y >= bounds.max_y || y < bounds.min_y {
            continue;
        }

        let mut cells = Vec::with_capacity(usize::from(viewport.width));
        for vx in 0..i64::from(viewport.width) {
            let x = column_of(vx);
            if x >= bounds.max_x || x < bounds.min_x {
                continue;
            }

            let upper = sample(image, x, y, window);
            let lower = (bottom < bounds.max_y).then(|| sample(image, x, bottom, window));
            cells.push(HalfBlock { upper, lower });
        }
        rows.push(cells);
    }

    trace!(
        rows = rows.len(),
        block_size,
        factor,
        "rendered frame"
    );

    RenderFrame {
        text: encode_ansi(&rows),
        rows,
        block_size,
        factor,
        viewport,
    }
}

/// Encode cell rows as truecolor escape sequences, one line per row.
pub fn encode_ansi(rows: &[Vec<HalfBlock>]) -> String {
    let mut out = String::new();
    for (i, row) in rows.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        for cell in row {
            let Rgb([r, g, b]) = cell.upper;
            let _ = write!(out, "\x1b[38;2;{r};{g};{b}m");
            if let Some(Rgb([r, g, b])) = cell.lower {
                let _ = write!(out, "\x1b[48;2;{r};{g};{b}m");
            }
            out.push(UPPER_HALF_BLOCK);
        }
        out.push_str(RESET);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::Rgb16Image;

    const RED: Rgb<u8> = Rgb([255, 0, 0]);
    const BLUE: Rgb<u8> = Rgb([0, 0, 255]);

    fn wide(c: Rgb<u8>) -> image::Rgb<u16> {
        image::Rgb(c.0.map(|v| u16::from(v) * 257))
    }

    fn red_over_blue(width: u32) -> Rgb16Image {
        Rgb16Image::from_fn(width, 2, |_, y| if y == 0 { wide(RED) } else { wide(BLUE) })
    }

    #[test]
    fn two_rows_fold_into_one_cell() {
        let img = red_over_blue(2);
        let frame = render(
            &img,
            ViewportSize::new(2, 1),
            ScaleMode::BlockAligned,
            PanOffset::ZERO,
        );
        assert_eq!(frame.block_size, 1);
        assert_eq!(frame.rows.len(), 1);
        for cell in &frame.rows[0] {
            assert_eq!(cell.upper, RED);
            assert_eq!(cell.lower, Some(BLUE));
        }
        assert_eq!(
            frame.text,
            "\x1b[38;2;255;0;0m\x1b[48;2;0;0;255m▀\x1b[38;2;255;0;0m\x1b[48;2;0;0;255m▀\x1b[0m"
        );
    }

    #[test]
    fn one_pixel_wide_column_into_one_cell() {
        let img = red_over_blue(1);
        let frame = render(
            &img,
            ViewportSize::new(1, 1),
            ScaleMode::BlockAligned,
            PanOffset::ZERO,
        );
        assert_eq!(frame.text, "\x1b[38;2;255;0;0m\x1b[48;2;0;0;255m▀\x1b[0m");
    }

    #[test]
    fn square_image_in_single_cell_keeps_aspect() {
        // width ratio 2 wins, so the whole image lands in one top window
        let img = red_over_blue(2);
        let frame = render(
            &img,
            ViewportSize::new(1, 1),
            ScaleMode::BlockAligned,
            PanOffset::ZERO,
        );
        assert_eq!(frame.block_size, 2);
        assert_eq!(
            frame.rows,
            vec![vec![HalfBlock {
                upper: Rgb([127, 0, 127]),
                lower: None
            }]]
        );
    }

    #[test]
    fn single_pixel_has_no_background() {
        let img = Rgb16Image::from_pixel(1, 1, wide(Rgb([10, 20, 30])));
        let frame = render(
            &img,
            ViewportSize::new(5, 4),
            ScaleMode::BlockAligned,
            PanOffset::ZERO,
        );
        assert_eq!(frame.rows.len(), 1);
        assert_eq!(frame.text, "\x1b[38;2;10;20;30m▀\x1b[0m");
        assert!(!frame.text.contains("48;2"));
    }

    #[test]
    fn empty_viewport_renders_nothing() {
        let img = red_over_blue(2);
        for viewport in [ViewportSize::new(0, 5), ViewportSize::new(5, 0)] {
            let frame = render(&img, viewport, ScaleMode::BlockAligned, PanOffset::ZERO);
            assert!(frame.is_empty());
            assert_eq!(frame.text, "");
        }
    }

    #[test]
    fn exact_fit_covers_every_cell() {
        let img = Rgb16Image::from_fn(8, 6, |x, y| wide(Rgb([x as u8 * 30, y as u8 * 40, 7])));
        let viewport = ViewportSize::new(8, 3);
        for mode in [ScaleMode::BlockAligned, ScaleMode::Continuous(1.0)] {
            let frame = render(&img, viewport, mode, PanOffset::ZERO);
            assert_eq!(frame.block_size, 1);
            assert_eq!(frame.rows.len(), 3);
            for (vy, row) in frame.rows.iter().enumerate() {
                assert_eq!(row.len(), 8);
                for (vx, cell) in row.iter().enumerate() {
                    assert_eq!(cell.upper, Rgb([vx as u8 * 30, vy as u8 * 80, 7]));
                    assert_eq!(cell.lower, Some(Rgb([vx as u8 * 30, vy as u8 * 80 + 40, 7])));
                }
            }
            assert_eq!(frame.text.lines().count(), 3);
            assert!(!frame.text.ends_with('\n'));
        }
    }

    #[test]
    fn odd_height_drops_background_on_last_row() {
        let img = Rgb16Image::from_pixel(2, 3, wide(RED));
        let frame = render(
            &img,
            ViewportSize::new(2, 2),
            ScaleMode::BlockAligned,
            PanOffset::ZERO,
        );
        assert_eq!(frame.rows.len(), 2);
        assert!(frame.rows[0].iter().all(|c| c.lower == Some(RED)));
        assert!(frame.rows[1].iter().all(|c| c.lower.is_none()));
    }

    #[test]
    fn block_rows_tile_without_overlap() {
        // 12 px wide, 4 cells: block 3, columns start at 0, 3, 6, 9
        let img = Rgb16Image::from_fn(12, 2, |x, _| wide(Rgb([(x / 3) as u8 * 50, 0, 0])));
        let frame = render(
            &img,
            ViewportSize::new(4, 1),
            ScaleMode::BlockAligned,
            PanOffset::ZERO,
        );
        assert_eq!(frame.block_size, 3);
        let reds: Vec<u8> = frame.rows[0].iter().map(|c| c.upper.0[0]).collect();
        assert_eq!(reds, vec![0, 50, 100, 150]);
    }

    #[test]
    fn continuous_mode_applies_pan_offset() {
        let img = Rgb16Image::from_fn(4, 4, |x, y| wide(Rgb([x as u8, y as u8, 0])));
        let frame = render(
            &img,
            ViewportSize::new(2, 1),
            ScaleMode::Continuous(1.0),
            PanOffset { x: 2, y: 1 },
        );
        assert_eq!(frame.rows[0][0].upper, Rgb([2, 1, 0]));
        assert_eq!(frame.rows[0][0].lower, Some(Rgb([2, 2, 0])));
        assert_eq!(frame.rows[0][1].upper, Rgb([3, 1, 0]));
    }

    #[test]
    fn continuous_upsampling_repeats_pixels() {
        let img = Rgb16Image::from_fn(2, 1, |x, _| if x == 0 { wide(RED) } else { wide(BLUE) });
        let frame = render(
            &img,
            ViewportSize::new(4, 1),
            ScaleMode::Continuous(0.5),
            PanOffset::ZERO,
        );
        let uppers: Vec<Rgb<u8>> = frame.rows[0].iter().map(|c| c.upper).collect();
        // columns map to x = 0, 1, 1, 2; the last one is past the edge
        assert_eq!(uppers, vec![RED, BLUE, BLUE]);
    }

    #[test]
    fn rendering_is_deterministic() {
        let img = Rgb16Image::from_fn(33, 17, |x, y| wide(Rgb([(x * 7) as u8, (y * 13) as u8, 99])));
        let viewport = ViewportSize::new(9, 4);
        let a = render(&img, viewport, ScaleMode::Continuous(2.3), PanOffset { x: 1, y: 2 });
        let b = render(&img, viewport, ScaleMode::Continuous(2.3), PanOffset { x: 1, y: 2 });
        assert_eq!(a, b);
    }

    struct Shifted(Rgb16Image);

    impl Raster for Shifted {
        fn bounds(&self) -> crate::raster::Bounds {
            crate::raster::Bounds {
                min_x: 10,
                min_y: 20,
                max_x: 10 + i64::from(self.0.width()),
                max_y: 20 + i64::from(self.0.height()),
            }
        }

        fn rgb16(&self, x: i64, y: i64) -> [u16; 3] {
            self.0.get_pixel((x - 10) as u32, (y - 20) as u32).0
        }
    }

    #[test]
    fn honors_non_zero_origin() {
        let img = Shifted(red_over_blue(2));
        let frame = render(
            &img,
            ViewportSize::new(2, 1),
            ScaleMode::BlockAligned,
            PanOffset::ZERO,
        );
        assert_eq!(frame.rows[0].len(), 2);
        assert_eq!(frame.rows[0][1].lower, Some(BLUE));
    }
}
