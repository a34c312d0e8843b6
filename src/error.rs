use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DetectError {
    #[error("opencv error: {0}")]
    OpenCv(#[from] opencv::Error),

    #[error("image path is not valid UTF-8: {0:?}")]
    InvalidPath(PathBuf),

    /// `imread` gave back an empty matrix: missing file or unsupported format.
    #[error("could not read image {0:?}")]
    ImageLoad(PathBuf),

    #[error("image of {width}x{height} is too small to downscale to {scale_percent}%")]
    ImageTooSmall {
        width: i32,
        height: i32,
        scale_percent: i32,
    },

    #[error("no contour approximates to a quadrilateral")]
    NoQuadrilateral,

    #[error("invalid detector configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to serialize feature points: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to probe image: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, DetectError>;
