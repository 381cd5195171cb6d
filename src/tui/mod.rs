mod state;

use std::path::{Path, PathBuf};

use image::Rgb;
use ratatui::{
    Frame,
    buffer::Buffer,
    layout::{Constraint, Direction as LayoutDirection, Flex, Layout, Rect},
    style::{Color, Style},
    widgets::{Paragraph, Widget, Wrap},
};
use tracing::{debug, warn};

use crate::raster::{Raster, Rgb16Image, open_image};
use crate::render::{RenderFrame, ScaleMode, UPPER_HALF_BLOCK, render};

pub use state::{
    CHROME_ROWS, COARSE_ZOOM_STEP, Direction, FINE_ZOOM_STEP, MIN_ZOOM, Placement, Step,
    ViewEvent, ViewState,
};

const HELP: &str = "q quit  +/= zoom in  -/_ zoom out  \u{2190}\u{2191}\u{2193}\u{2192} pan";

/// One interactive viewing session over a single file.
#[derive(Debug)]
pub struct Viewer {
    path: PathBuf,
    image: Result<Rgb16Image, String>,
    state: ViewState,
    frame: Option<RenderFrame>,
    placement: Option<Placement>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerAction {
    Quit,
}

impl Viewer {
    /// Load `path`. A decode failure is kept and shown in place of the image.
    pub fn open(path: &Path) -> Self {
        let image = open_image(path).map_err(|err| {
            warn!(path = %path.display(), %err, "failed to load image");
            err.to_string()
        });
        Self::with_image(path.to_path_buf(), image)
    }

    pub fn with_image(path: PathBuf, image: Result<Rgb16Image, String>) -> Self {
        Self {
            path,
            image,
            state: ViewState::default(),
            frame: None,
            placement: None,
        }
    }

    pub fn handle_event(&mut self, event: ViewEvent) -> Option<ViewerAction> {
        let bounds = self.image.as_ref().ok().map(|image| image.bounds());
        let Some(next) = self.state.reduce(event, bounds) else {
            return Some(ViewerAction::Quit);
        };
        if next != self.state || self.frame.is_none() {
            self.state = next;
            self.rerender();
        }
        None
    }

    fn rerender(&mut self) {
        let Ok(image) = self.image.as_ref() else {
            return;
        };
        self.placement = self.state.placement(image.bounds());
        self.frame = self.placement.map(|placement| {
            render(
                image,
                placement.viewport,
                ScaleMode::Continuous(placement.factor),
                self.state.offset,
            )
        });
        if let Some(frame) = &self.frame {
            debug!(
                rows = frame.rows.len(),
                factor = frame.factor,
                "frame ready"
            );
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn frame(&self) -> Option<&RenderFrame> {
        self.frame.as_ref()
    }

    pub fn placement(&self) -> Option<&Placement> {
        self.placement.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.image.as_ref().err().map(String::as_str)
    }

    fn title(&self) -> String {
        let mut title = self.path.display().to_string();
        if let Ok(image) = &self.image {
            title.push_str(&format!("  {}x{}", image.width(), image.height()));
        }
        if let Some(zoom) = self.state.zoom {
            title.push_str(&format!("  {:.0}%", zoom * 100.0));
        }
        if let Some(placement) = &self.placement {
            title.push_str(if placement.fits { "  fit" } else { "  partial" });
        }
        title
    }
}

pub fn view(frame: &mut Frame, viewer: &Viewer) {
    let area = frame.area();

    let rows = Layout::default()
        .direction(LayoutDirection::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    let title = Paragraph::new(viewer.title())
        .style(Style::default().bg(Color::White).fg(Color::Black));
    frame.render_widget(title, rows[0]);

    if let Some(message) = viewer.error() {
        let placeholder = Paragraph::new(format!("Error: {message}")).wrap(Wrap { trim: true });
        frame.render_widget(placeholder, rows[1]);
    } else if let (Some(image), Some(placement)) = (viewer.frame(), viewer.placement()) {
        let target = if placement.fits {
            centered(rows[1], placement.viewport.width, placement.viewport.height)
        } else {
            rows[1]
        };
        frame.render_widget(HalfBlocks(image), target);
    }

    let help = Paragraph::new(HELP).centered();
    frame.render_widget(help, rows[2]);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(row);
    cell
}

/// Paints a [`RenderFrame`] cell by cell. Cells without a lower window keep
/// the terminal's default background.
pub struct HalfBlocks<'a>(pub &'a RenderFrame);

impl Widget for HalfBlocks<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for (dy, row) in self.0.rows.iter().enumerate().take(usize::from(area.height)) {
            for (dx, cell) in row.iter().enumerate().take(usize::from(area.width)) {
                let position = (area.x + dx as u16, area.y + dy as u16);
                let Some(target) = buf.cell_mut(position) else {
                    continue;
                };
                target
                    .set_char(UPPER_HALF_BLOCK)
                    .set_fg(color(cell.upper))
                    .set_bg(cell.lower.map_or(Color::Reset, color));
            }
        }
    }
}

fn color(Rgb([r, g, b]): Rgb<u8>) -> Color {
    Color::Rgb(r, g, b)
}
