//! Error types for the renderer.

use thiserror::Error;

/// Errors from the persistent worker pool.
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("Worker {0} exited before finishing its task")]
    WorkerLost(usize),

    #[error("Worker group has already been terminated")]
    Terminated,
}

/// Errors that can occur while setting up, running, or saving a render.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Invalid render settings: {0}")]
    InvalidSettings(String),

    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),
}

pub type RenderResult<T> = Result<T, RenderError>;
