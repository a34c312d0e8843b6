use std::env;
use std::str::FromStr;

use log::debug;
use opencv::core::Scalar;

use crate::error::{DetectError, Result};

pub const SCALE_PERCENT_VAR: &str = "CORNERSCAN_SCALE_PERCENT";
pub const EPSILON_RATIO_VAR: &str = "CORNERSCAN_EPSILON_RATIO";

const DEFAULT_SCALE_PERCENT: i32 = 20;
const DEFAULT_EPSILON_RATIO: f64 = 0.015;
const DEFAULT_OVERLAY_THICKNESS: i32 = 5;
const DEFAULT_WINDOW_TITLE: &str = "image";

/// Tuning knobs for [`CornerDetector`](crate::CornerDetector).
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Downscale target in percent of the original width and height.
    pub scale_percent: i32,
    /// Maximum polygon deviation as a fraction of the contour perimeter.
    pub epsilon_ratio: f64,
    /// BGR color of the debug overlay.
    pub overlay_color: Scalar,
    pub overlay_thickness: i32,
    pub window_title: String,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            scale_percent: DEFAULT_SCALE_PERCENT,
            epsilon_ratio: DEFAULT_EPSILON_RATIO,
            overlay_color: Scalar::new(0.0, 0.0, 255.0, 0.0),
            overlay_thickness: DEFAULT_OVERLAY_THICKNESS,
            window_title: DEFAULT_WINDOW_TITLE.to_string(),
        }
    }
}

impl DetectorConfig {
    /// Builds a configuration from `CORNERSCAN_*` environment variables,
    /// falling back to the defaults for anything unset.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(scale_percent) = read_var::<i32>(SCALE_PERCENT_VAR)? {
            config.scale_percent = scale_percent;
        }
        if let Some(epsilon_ratio) = read_var::<f64>(EPSILON_RATIO_VAR)? {
            config.epsilon_ratio = epsilon_ratio;
        }

        config.validate()?;
        debug!("Detector configuration: {:?}", config);
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.scale_percent) {
            return Err(DetectError::InvalidConfig(format!(
                "scale percent must be within 1..=100, got {}",
                self.scale_percent
            )));
        }
        if !self.epsilon_ratio.is_finite() || self.epsilon_ratio <= 0.0 {
            return Err(DetectError::InvalidConfig(format!(
                "epsilon ratio must be a positive number, got {}",
                self.epsilon_ratio
            )));
        }
        if self.overlay_thickness <= 0 {
            return Err(DetectError::InvalidConfig(format!(
                "overlay thickness must be positive, got {}",
                self.overlay_thickness
            )));
        }
        Ok(())
    }

    /// Factor that maps downscaled coordinates back to the original resolution.
    pub fn scale_back_factor(&self) -> f64 {
        100.0 / self.scale_percent as f64
    }
}

fn read_var<T: FromStr>(name: &str) -> Result<Option<T>> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| DetectError::InvalidConfig(format!("{name}={raw:?} is not a valid value"))),
        Err(_) => Ok(None),
    }
}

/// Per-call switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DetectOptions {
    /// Analyse a downscaled copy and scale the corners back up.
    pub resize: bool,
    /// Show the detected quadrilateral in a window and wait for a key press.
    /// Only honoured together with `resize` unless `view_unscaled` is set.
    pub view: bool,
    /// Lets `view` open the window on full-resolution analyses as well.
    pub view_unscaled: bool,
}

impl DetectOptions {
    pub fn new(resize: bool, view: bool) -> Self {
        Self {
            resize,
            view,
            view_unscaled: false,
        }
    }

    pub fn with_view_unscaled(mut self, view_unscaled: bool) -> Self {
        self.view_unscaled = view_unscaled;
        self
    }
}
