//! End-to-end detection on synthetic images written to the temp directory.

use std::path::PathBuf;

use cornerscan::{
    detect, image_dimensions, Coord, CornerDetector, DetectError, DetectOptions, FeaturePoints,
};
use opencv::{
    core::{Mat, Point, Rect, Scalar, Vector, CV_8UC3},
    imgcodecs, imgproc,
    prelude::*,
};

const ROWS: i32 = 400;
const COLS: i32 = 500;

fn blank() -> Mat {
    Mat::new_rows_cols_with_default(ROWS, COLS, CV_8UC3, Scalar::all(255.0)).unwrap()
}

fn fill_rect(image: &mut Mat, rect: Rect) {
    imgproc::rectangle(image, rect, Scalar::all(0.0), -1, imgproc::LINE_8, 0).unwrap();
}

fn save(name: &str, image: &Mat) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "cornerscan_{}_{}.png",
        name,
        std::process::id()
    ));
    let written =
        imgcodecs::imwrite(path.to_str().unwrap(), image, &Vector::<i32>::new()).unwrap();
    assert!(written, "failed to write {}", path.display());
    path
}

fn rect_corners(rect: Rect) -> [Coord; 4] {
    let (x0, y0) = (rect.x as f64, rect.y as f64);
    let (x1, y1) = ((rect.x + rect.width - 1) as f64, (rect.y + rect.height - 1) as f64);
    [[x0, y0], [x1, y0], [x1, y1], [x0, y1]]
}

fn assert_matches_corners(points: &FeaturePoints, expected: &[Coord], tolerance: f64) {
    assert_eq!(points.points.len(), 4, "got {:?}", points.points);
    for corner in expected {
        let hit = points.points.iter().any(|p| {
            (p[0] - corner[0]).abs() <= tolerance && (p[1] - corner[1]).abs() <= tolerance
        });
        assert!(hit, "corner {:?} missing from {:?}", corner, points.points);
    }
}

#[test]
fn finds_exact_rectangle_corners() {
    let rect = Rect::new(40, 30, 300, 200);
    let mut image = blank();
    fill_rect(&mut image, rect);
    let path = save("exact", &image);

    let points = CornerDetector::default()
        .detect_points(&path, DetectOptions::default())
        .unwrap();
    assert_matches_corners(&points, &rect_corners(rect), 0.0);
}

#[test]
fn resized_analysis_scales_back_to_original() {
    let rect = Rect::new(100, 50, 300, 300);
    let mut image = blank();
    fill_rect(&mut image, rect);
    let path = save("resized", &image);

    let points = CornerDetector::default()
        .detect_points(&path, DetectOptions::new(true, false))
        .unwrap();
    assert_matches_corners(&points, &rect_corners(rect), 5.0);
    for p in &points.points {
        // every coordinate is a multiple of the scale-back factor
        assert_eq!(p[0] % 5.0, 0.0);
        assert_eq!(p[1] % 5.0, 0.0);
    }
}

#[test]
fn circle_has_no_quadrilateral() {
    let mut image = blank();
    imgproc::circle(
        &mut image,
        Point::new(250, 200),
        120,
        Scalar::all(0.0),
        -1,
        imgproc::LINE_8,
        0,
    )
    .unwrap();
    let path = save("circle", &image);

    let result = detect(&path, false, false);
    assert!(matches!(result, Err(DetectError::NoQuadrilateral)));
}

#[test]
fn prefers_larger_perimeter() {
    let large = Rect::new(30, 30, 200, 150);
    let small = Rect::new(300, 250, 80, 60);
    let mut image = blank();
    fill_rect(&mut image, small);
    fill_rect(&mut image, large);
    let path = save("two_quads", &image);

    let points = CornerDetector::default()
        .detect_points(&path, DetectOptions::default())
        .unwrap();
    assert_matches_corners(&points, &rect_corners(large), 0.0);
}

#[test]
fn finds_rotated_quadrilateral() {
    let diamond: Vector<Point> = [(250, 50), (450, 200), (250, 350), (50, 200)]
        .into_iter()
        .map(|(x, y)| Point::new(x, y))
        .collect();
    let mut image = blank();
    imgproc::fill_poly(
        &mut image,
        &Vector::<Vector<Point>>::from_iter([diamond]),
        Scalar::all(0.0),
        imgproc::LINE_8,
        0,
        Point::new(0, 0),
    )
    .unwrap();
    let path = save("diamond", &image);

    let points = CornerDetector::default()
        .detect_points(&path, DetectOptions::default())
        .unwrap();
    let expected = [[250.0, 50.0], [450.0, 200.0], [250.0, 350.0], [50.0, 200.0]];
    assert_matches_corners(&points, &expected, 4.0);

    // x + y ordering: the left vertex has the smallest sum, the right one the largest
    let corners = points.corners().unwrap();
    assert!((corners.top_left[0] - 50.0).abs() <= 4.0);
    assert!((corners.bottom_right[0] - 450.0).abs() <= 4.0);
}

#[test]
fn repeated_calls_are_identical() {
    let mut image = blank();
    fill_rect(&mut image, Rect::new(60, 80, 250, 120));
    let path = save("stable", &image);

    let first = detect(&path, false, false).unwrap();
    let second = detect(&path, false, false).unwrap();
    assert_eq!(first, second);

    let first = detect(&path, true, false).unwrap();
    let second = detect(&path, true, false).unwrap();
    assert_eq!(first, second);
}

#[test]
fn output_is_a_single_points_object() {
    let mut image = blank();
    fill_rect(&mut image, Rect::new(20, 20, 400, 300));
    let path = save("shape", &image);

    let json = detect(&path, false, false).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let object = value.as_object().unwrap();
    assert_eq!(object.len(), 1);

    let points = object["points"].as_array().unwrap();
    assert_eq!(points.len(), 4);
    for point in points {
        let pair = point.as_array().unwrap();
        assert_eq!(pair.len(), 2);
        assert!(pair.iter().all(|v| v.is_number()));
    }
}

#[test]
fn whole_pixel_corners_are_json_integers() {
    let rect = Rect::new(40, 30, 300, 200);
    let mut image = blank();
    fill_rect(&mut image, rect);
    let path = save("integers", &image);

    let json = detect(&path, false, false).unwrap();
    assert!(json.contains("[40,30]"), "{json}");
    assert!(json.contains("[339,229]"), "{json}");
    assert!(!json.contains(".0"), "{json}");
}

#[test]
fn rectangle_corners_are_keyed_by_position() {
    let rect = Rect::new(40, 30, 300, 200);
    let mut image = blank();
    fill_rect(&mut image, rect);
    let path = save("keyed", &image);

    let corners = CornerDetector::default()
        .detect_points(&path, DetectOptions::default())
        .unwrap()
        .corners()
        .unwrap();
    assert_eq!(corners.top_left, [40.0, 30.0]);
    assert_eq!(corners.top_right, [339.0, 30.0]);
    assert_eq!(corners.bottom_left, [40.0, 229.0]);
    assert_eq!(corners.bottom_right, [339.0, 229.0]);
}

#[test]
fn missing_image_is_reported() {
    let path = std::env::temp_dir().join("cornerscan_does_not_exist.png");
    assert!(matches!(
        detect(&path, false, false),
        Err(DetectError::ImageLoad(_))
    ));
}

#[test]
fn tiny_image_cannot_be_resized() {
    let image = Mat::new_rows_cols_with_default(3, 3, CV_8UC3, Scalar::all(255.0)).unwrap();
    let path = save("tiny", &image);
    assert!(matches!(
        detect(&path, true, false),
        Err(DetectError::ImageTooSmall { .. })
    ));
}

#[test]
fn reports_original_dimensions() {
    let path = save("dimensions", &blank());
    assert_eq!(image_dimensions(&path).unwrap(), (COLS as u32, ROWS as u32));
}
