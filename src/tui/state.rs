//! Zoom and pan state for the interactive viewer.
//!
//! The state is a small `Copy` value. Every input event produces a new value
//! through [`ViewState::reduce`]; nothing else writes to it.

use tracing::debug;

use crate::raster::Bounds;
use crate::render::calculate_scale;
use crate::viewport::{PanOffset, ViewportSize};

/// Rows taken by the title and help bars.
pub const CHROME_ROWS: u16 = 2;

pub const COARSE_ZOOM_STEP: f64 = 0.25;
pub const FINE_ZOOM_STEP: f64 = 0.01;
/// Zoom never drops to or below zero.
pub const MIN_ZOOM: f64 = 0.01;

/// Slack, in cells, allowed when deciding whether the zoomed image fits.
const FIT_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Coarse,
    Fine,
}

impl Step {
    pub fn amount(self) -> f64 {
        match self {
            Step::Coarse => COARSE_ZOOM_STEP,
            Step::Fine => FINE_ZOOM_STEP,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewEvent {
    Resize { width: u16, height: u16 },
    ZoomIn(Step),
    ZoomOut(Step),
    Pan(Direction),
    Quit,
}

/// Where and how the zoomed image is drawn inside the image area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Source pixels per cell column.
    pub factor: f64,
    /// Cells actually covered by the image, never larger than the area.
    pub viewport: ViewportSize,
    /// The whole zoomed image is visible; draw it centered.
    pub fits: bool,
    pub max_offset: PanOffset,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ViewState {
    /// Fraction of native resolution. `None` until the first resize with an image.
    pub zoom: Option<f64>,
    pub offset: PanOffset,
    pub last_window: ViewportSize,
}

impl ViewState {
    /// Apply one event. Returns `None` when the session should end.
    ///
    /// `image` is `None` when no image could be loaded; zoom and pan are
    /// ignored then.
    pub fn reduce(self, event: ViewEvent, image: Option<Bounds>) -> Option<Self> {
        let mut next = self;
        match event {
            ViewEvent::Quit => return None,
            ViewEvent::Resize { width, height } => {
                next.last_window = ViewportSize::new(width, height);
                if next.zoom.is_none() {
                    let area = next.image_area();
                    next.zoom = image.and_then(|bounds| fit_zoom(bounds, area));
                }
            }
            ViewEvent::ZoomIn(step) => {
                next.zoom = self.zoom.map(|zoom| zoom + step.amount());
            }
            ViewEvent::ZoomOut(step) => {
                next.zoom = self.zoom.map(|zoom| (zoom - step.amount()).max(MIN_ZOOM));
            }
            ViewEvent::Pan(direction) => {
                if image.is_some() {
                    let PanOffset { x, y } = self.offset;
                    next.offset = match direction {
                        Direction::Up => PanOffset { x, y: y - 1 },
                        Direction::Down => PanOffset { x, y: y + 1 },
                        Direction::Left => PanOffset { x: x - 1, y },
                        Direction::Right => PanOffset { x: x + 1, y },
                    };
                }
            }
        }

        if let Some(placement) = image.and_then(|bounds| next.placement(bounds)) {
            next.offset = if placement.fits {
                PanOffset::ZERO
            } else {
                PanOffset {
                    x: next.offset.x.clamp(0, placement.max_offset.x),
                    y: next.offset.y.clamp(0, placement.max_offset.y),
                }
            };
        }

        if next != self {
            debug!(?event, zoom = ?next.zoom, offset = ?next.offset, "view state changed");
        }
        Some(next)
    }

    /// Cells left for the image once the chrome is drawn.
    pub fn image_area(&self) -> ViewportSize {
        ViewportSize::new(
            self.last_window.width,
            self.last_window.height.saturating_sub(CHROME_ROWS),
        )
    }

    /// Lay the zoomed image out in the image area, or `None` before the
    /// first zoom is known.
    pub fn placement(&self, bounds: Bounds) -> Option<Placement> {
        let zoom = self.zoom?;
        let area = self.image_area();
        let (width, height) = (bounds.width() as f64, bounds.height() as f64);
        let (area_width, area_height) = (f64::from(area.width), f64::from(area.height));

        let scaled_width = width * zoom;
        let scaled_height = height * zoom;
        let factor = 1.0 / zoom;

        // 1/factor rarely multiplies back to an exact cell count
        let fits = scaled_width <= area_width + FIT_TOLERANCE
            && scaled_height <= area_height * 2.0 + FIT_TOLERANCE;
        let viewport = ViewportSize::new(
            (scaled_width - FIT_TOLERANCE).ceil().max(1.0).min(area_width) as u16,
            (scaled_height / 2.0 - FIT_TOLERANCE).ceil().max(1.0).min(area_height) as u16,
        );
        // the last visible column and row must still land inside the image
        let max_offset = PanOffset {
            x: (width - 1.0 - ((area_width - 1.0).max(0.0) * factor).round()).max(0.0) as i64,
            y: (height - 1.0 - ((area_height - 1.0).max(0.0) * 2.0 * factor).round()).max(0.0)
                as i64,
        };

        Some(Placement {
            factor,
            viewport,
            fits,
            max_offset,
        })
    }
}

/// The zoom at which the image just fits the area.
fn fit_zoom(bounds: Bounds, area: ViewportSize) -> Option<f64> {
    if area.is_empty() || bounds.is_empty() {
        return None;
    }
    let scale = calculate_scale(
        bounds.height() as u32,
        bounds.width() as u32,
        area.height,
        area.width,
    );
    Some((1.0 / scale.factor).max(MIN_ZOOM))
}
