//! Largest-quadrilateral corner detection.
//!
//! The image is binarized with an inverted Otsu threshold, its external
//! contours are simplified with Douglas-Peucker, and the four-vertex polygon
//! with the longest perimeter wins.

use std::path::Path;

use log::{debug, info};
use opencv::{
    core::{Mat, Point, Vector},
    imgproc::{self, approx_poly_dp, arc_length, LINE_8},
    prelude::*,
};

use crate::config::{DetectOptions, DetectorConfig};
use crate::error::{DetectError, Result};
use crate::points::{Coord, FeaturePoints};
use crate::utils::{
    downscale, external_contours, load_image, otsu_binarize, show_image, to_gray, Contours,
};

/// A four-vertex approximation of a contour, in analysis pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quadrilateral {
    pub vertices: [Point; 4],
    /// Perimeter of the source contour, not of the simplified polygon.
    pub perimeter: f64,
}

impl Quadrilateral {
    fn to_contours(&self) -> Contours {
        let polygon: Vector<Point> = self.vertices.iter().copied().collect();
        Vector::from_iter([polygon])
    }
}

/// Picks the contour with the longest closed perimeter among those whose
/// approximation has exactly four vertices. Ties keep the first one seen.
pub fn select_largest_quadrilateral(
    contours: &Contours,
    epsilon_ratio: f64,
) -> Result<Option<Quadrilateral>> {
    let mut best_perimeter = 0.0;
    let mut best = None;

    for contour in contours.iter() {
        let perimeter = arc_length(&contour, true)?;
        let mut approx = Vector::<Point>::new();
        approx_poly_dp(&contour, &mut approx, epsilon_ratio * perimeter, true)?;

        if let [a, b, c, d] = approx.as_slice() {
            if best_perimeter < perimeter {
                best_perimeter = perimeter;
                best = Some(Quadrilateral {
                    vertices: [*a, *b, *c, *d],
                    perimeter,
                });
            }
        }
    }

    Ok(best)
}

/// Everything one pass over an image produces.
struct Analysis {
    image: Mat,
    quad: Quadrilateral,
    points: FeaturePoints,
}

#[derive(Debug, Clone, Default)]
pub struct CornerDetector {
    config: DetectorConfig,
}

impl CornerDetector {
    pub fn new(config: DetectorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Corners of the largest quadrilateral in the image at `path`, in
    /// original-resolution pixels even when `options.resize` is set.
    pub fn detect_points(&self, path: &Path, options: DetectOptions) -> Result<FeaturePoints> {
        let analysis = self.analyse(path, options.resize)?;
        if shows_overlay(options) {
            self.view(&analysis)?;
        }
        Ok(analysis.points)
    }

    /// Same as [`detect_points`](Self::detect_points), encoded as
    /// `{"points": [[x, y], ...]}`.
    pub fn detect(&self, path: &Path, options: DetectOptions) -> Result<String> {
        let analysis = self.analyse(path, options.resize)?;
        let json = analysis.points.to_json()?;
        if shows_overlay(options) {
            self.view(&analysis)?;
        }
        Ok(json)
    }

    /// Copy of `image` with `quad` outlined in the overlay color.
    pub fn render_overlay(&self, image: &Mat, quad: &Quadrilateral) -> Result<Mat> {
        let mut canvas = image.try_clone()?;
        imgproc::draw_contours(
            &mut canvas,
            &quad.to_contours(),
            -1,
            self.config.overlay_color,
            self.config.overlay_thickness,
            LINE_8,
            &Mat::default(),
            i32::MAX,
            Point::new(0, 0),
        )?;
        Ok(canvas)
    }

    fn analyse(&self, path: &Path, resize: bool) -> Result<Analysis> {
        let mut image = load_image(path)?;
        if resize {
            image = downscale(&image, self.config.scale_percent)?;
        }

        let gray = to_gray(&image)?;
        let thresh = otsu_binarize(&gray)?;
        let contours = external_contours(&thresh)?;

        let quad = select_largest_quadrilateral(&contours, self.config.epsilon_ratio)?
            .ok_or(DetectError::NoQuadrilateral)?;
        debug!("Selected quadrilateral with perimeter {:.1}", quad.perimeter);

        let factor = if resize {
            self.config.scale_back_factor()
        } else {
            1.0
        };
        let points: Vec<Coord> = quad
            .vertices
            .iter()
            .map(|p| [p.x as f64 * factor, p.y as f64 * factor])
            .collect();
        info!("Detected corners {:?} in {}", points, path.display());

        Ok(Analysis {
            image,
            quad,
            points: FeaturePoints::new(points),
        })
    }

    fn view(&self, analysis: &Analysis) -> Result<()> {
        let overlay = self.render_overlay(&analysis.image, &analysis.quad)?;
        show_image(&self.config.window_title, &overlay)
    }
}

/// The debug window only opens for downscaled analyses unless the caller
/// opts into `view_unscaled`.
pub fn shows_overlay(options: DetectOptions) -> bool {
    options.view && (options.resize || options.view_unscaled)
}

/// Runs a default-configured [`CornerDetector`] and returns the points JSON.
pub fn detect(path: impl AsRef<Path>, resize: bool, view: bool) -> Result<String> {
    CornerDetector::default().detect(path.as_ref(), DetectOptions::new(resize, view))
}
