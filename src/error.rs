use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ViewError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("terminal size unavailable: {0}")]
    TerminalSize(#[source] std::io::Error),

    #[error("image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
}

pub type Result<T> = std::result::Result<T, ViewError>;
