use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("no suitable graphics adapter: {0}")]
    Adapter(String),
    #[error("unable to create device: {0}")]
    Device(String),
    #[error("unable to create surface: {0}")]
    Surface(String),
    #[error("surface is not supported by the adapter")]
    SurfaceConfig,
    #[error("unable to load font {path:?}: {reason}")]
    Font { path: PathBuf, reason: String },
    #[error("window: {0}")]
    Window(#[from] winit::error::OsError),
    #[error("event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ViewerResult<T> = Result<T, ViewerError>;
