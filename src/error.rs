use thiserror::Error;

/// Failures of the window host and the demo binary.
#[derive(Debug, Error)]
pub enum GaugeError {
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("pixel surface error: {0}")]
    Surface(#[from] pixels::Error),

    #[error("font data is not a valid TrueType or OpenType font")]
    InvalidFont,

    #[error("invalid argument: {0}")]
    Argument(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
