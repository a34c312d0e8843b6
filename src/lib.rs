//! Finds the largest quadrilateral in a photographed document or lid and
//! reports its four corners.
//!
//! Corners come back in the vertex order of the polygon approximation, as
//! `{"points": [[x, y], ...]}`. Whole-pixel values are written as JSON
//! integers, so downscaled results that scale back to whole pixels are
//! integers too.
//!
//! The debug window (`view`) only opens for downscaled analyses unless
//! [`DetectOptions::view_unscaled`] is set.
//!
//! ```rust,no_run
//! let json = cornerscan::detect("scan.jpg", true, false)?;
//! println!("{json}");
//! # Ok::<(), cornerscan::DetectError>(())
//! ```

pub mod config;
pub mod detect;
pub mod error;
pub mod points;
pub mod utils;

pub use config::{DetectOptions, DetectorConfig};
pub use detect::{detect, select_largest_quadrilateral, shows_overlay, CornerDetector, Quadrilateral};
pub use error::{DetectError, Result};
pub use points::{Coord, Corners, FeaturePoints};
pub use utils::image_dimensions;
