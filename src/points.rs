use serde::ser::SerializeSeq;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::Result;

/// An `[x, y]` pair in image pixels.
pub type Coord = [f64; 2];

/// Largest magnitude at which every integer is exactly representable in `f64`.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Detected corner points, in the vertex order produced by polygon
/// approximation.
///
/// Whole-pixel coordinates serialize as JSON integers (`[40, 30]`), others
/// keep their fraction (`[12.5, 8]`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeaturePoints {
    #[serde(serialize_with = "serialize_points")]
    pub points: Vec<Coord>,
}

struct Component(f64);

impl Serialize for Component {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        if self.0.fract() == 0.0 && self.0.abs() <= MAX_EXACT_INTEGER {
            serializer.serialize_i64(self.0 as i64)
        } else {
            serializer.serialize_f64(self.0)
        }
    }
}

fn serialize_points<S: Serializer>(
    points: &[Coord],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    let mut seq = serializer.serialize_seq(Some(points.len()))?;
    for [x, y] in points {
        seq.serialize_element(&[Component(*x), Component(*y)])?;
    }
    seq.end()
}

impl FeaturePoints {
    pub fn new(points: Vec<Coord>) -> Self {
        Self { points }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Orders the four points by position. `None` unless there are exactly four.
    pub fn corners(&self) -> Option<Corners> {
        match self.points.as_slice() {
            [p1, p2, p3, p4] => Some(Corners::from_unordered([*p1, *p2, *p3, *p4])),
            _ => None,
        }
    }
}

/// The four corners of a quadrilateral named by their position in the image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Corners {
    pub top_left: Coord,
    pub top_right: Coord,
    pub bottom_left: Coord,
    pub bottom_right: Coord,
}

impl Corners {
    /// Smallest `x + y` is top-left, largest is bottom-right; the other two
    /// are split by `x`.
    pub fn from_unordered(mut points: [Coord; 4]) -> Self {
        points.sort_by(|a, b| (a[0] + a[1]).total_cmp(&(b[0] + b[1])));
        let [p1, p2, p3, p4] = points;
        let (bottom_left, top_right) = if p2[0] < p3[0] { (p2, p3) } else { (p3, p2) };

        Self {
            top_left: p1,
            top_right,
            bottom_left,
            bottom_right: p4,
        }
    }
}
