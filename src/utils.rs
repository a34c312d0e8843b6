use std::path::Path;

use log::debug;
use opencv::{
    core::{Mat, Point, Size, Vector},
    highgui, imgcodecs,
    imgproc::{
        self, cvt_color_def, find_contours, threshold, CHAIN_APPROX_SIMPLE, COLOR_BGR2GRAY,
        INTER_AREA, RETR_EXTERNAL, THRESH_BINARY_INV, THRESH_OTSU,
    },
    prelude::*,
};

use crate::error::{DetectError, Result};

pub type Contours = Vector<Vector<Point>>;

pub fn load_image(path: &Path) -> Result<Mat> {
    let path_str = path
        .to_str()
        .ok_or_else(|| DetectError::InvalidPath(path.to_path_buf()))?;
    let image = imgcodecs::imread(path_str, imgcodecs::IMREAD_COLOR)?;
    if image.empty() {
        return Err(DetectError::ImageLoad(path.to_path_buf()));
    }
    debug!("Loaded {} ({}x{})", path.display(), image.cols(), image.rows());
    Ok(image)
}

/// Shrinks both sides to `scale_percent` of the original, truncating.
pub fn downscale(image: &Mat, scale_percent: i32) -> Result<Mat> {
    let width = image.cols() * scale_percent / 100;
    let height = image.rows() * scale_percent / 100;
    if width == 0 || height == 0 {
        return Err(DetectError::ImageTooSmall {
            width: image.cols(),
            height: image.rows(),
            scale_percent,
        });
    }

    let mut resized = Mat::default();
    imgproc::resize(image, &mut resized, Size::new(width, height), 0.0, 0.0, INTER_AREA)?;
    debug!("Resized to {}x{}", width, height);
    Ok(resized)
}

pub fn to_gray(image: &Mat) -> Result<Mat> {
    let mut gray = Mat::default();
    cvt_color_def(image, &mut gray, COLOR_BGR2GRAY)?;
    Ok(gray)
}

/// Inverted Otsu: dark regions become foreground.
pub fn otsu_binarize(gray: &Mat) -> Result<Mat> {
    let mut thresh = Mat::default();
    let level = threshold(gray, &mut thresh, 0.0, 255.0, THRESH_BINARY_INV | THRESH_OTSU)?;
    debug!("Otsu threshold level {}", level);
    Ok(thresh)
}

pub fn external_contours(binary: &Mat) -> Result<Contours> {
    let mut contours = Contours::new();
    find_contours(
        binary,
        &mut contours,
        RETR_EXTERNAL,
        CHAIN_APPROX_SIMPLE,
        Point::new(0, 0),
    )?;
    debug!("Found {} external contours", contours.len());
    Ok(contours)
}

/// Blocks until a key is pressed.
pub fn show_image(title: &str, image: &Mat) -> Result<()> {
    highgui::imshow(title, image)?;
    highgui::wait_key(0)?;
    Ok(())
}

/// Reads width and height from the file header without decoding pixels.
pub fn image_dimensions(path: &Path) -> Result<(u32, u32)> {
    Ok(image::image_dimensions(path)?)
}
