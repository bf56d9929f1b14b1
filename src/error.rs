use std::io;
use thiserror::Error;

/// Failures talking to the remote store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("RPC failed: {0}")]
    Status(#[from] tonic::Status),
}

/// An event that cannot be turned into a frame
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("Event carries no payload")]
    Empty,

    #[error("Invalid rectangle {0:?}: expected [x, y, width, height] with non-negative values")]
    InvalidRectangle(Vec<i32>),

    #[error("Audio parameter out of range: {field}={value}")]
    AudioParameter { field: &'static str, value: u32 },
}

/// Failures while turning a render frame into pixels on a sink
#[derive(Error, Debug)]
pub enum DisplayError {
    #[error("Failed to inflate render frame: {0}")]
    Inflate(io::Error),

    #[error("Pixel buffer size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Failures handing an audio container to a media sink
#[derive(Error, Debug)]
pub enum PlaybackError {
    #[error("Audio device error: {0}")]
    Device(String),

    #[error("Failed to decode audio container: {0}")]
    Decode(String),

    #[error("Audio sink is closed")]
    Closed,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
