use crate::error::{Result, ViewError};

/// Size of a text viewport in character cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewportSize {
    pub width: u16,
    pub height: u16,
}

impl ViewportSize {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Pan offset in source pixels, applied before sampling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PanOffset {
    pub x: i64,
    pub y: i64,
}

impl PanOffset {
    pub const ZERO: Self = Self { x: 0, y: 0 };
}

pub trait ViewportSizeProvider {
    fn viewport_size(&self) -> Result<ViewportSize>;
}

/// Queries the controlling terminal, leaving `reserved_rows` free at the
/// bottom so the shell prompt does not scroll the top rows away.
#[derive(Debug, Clone, Copy)]
pub struct TerminalSize {
    pub reserved_rows: u16,
}

impl ViewportSizeProvider for TerminalSize {
    fn viewport_size(&self) -> Result<ViewportSize> {
        let (cols, rows) = crossterm::terminal::size().map_err(ViewError::TerminalSize)?;
        Ok(ViewportSize::new(
            cols,
            rows.saturating_sub(self.reserved_rows),
        ))
    }
}

/// A size given up front, e.g. from the command line.
#[derive(Debug, Clone, Copy)]
pub struct FixedSize(pub ViewportSize);

impl ViewportSizeProvider for FixedSize {
    fn viewport_size(&self) -> Result<ViewportSize> {
        Ok(self.0)
    }
}
