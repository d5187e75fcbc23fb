use thiserror::Error;

#[derive(Debug, Error)]
pub enum PaintError {
    #[error("No texture has been seeded on this surface")]
    NotSeeded,

    #[error("Invalid texture dimensions {width}x{height} (max {max})")]
    InvalidDimensions { width: u32, height: u32, max: u32 },

    #[error("Failed to encode texture: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("Commit queue is closed")]
    CommitClosed,
}
