use std::time::Duration;

use crate::Arguments;

/// Parameters of the plate border search.
#[derive(Clone, Debug, PartialEq)]
pub struct BorderSearchSettings {
    /// Half width of the centered window used to estimate in-plate brightness.
    pub window_half_width: usize,
    /// Half height of that window.
    pub window_half_height: usize,
    /// Foreground indices discarded at each end to suppress noise spikes.
    pub skip: usize,
}

impl Default for BorderSearchSettings {
    fn default() -> Self {
        Self {
            window_half_width: 100,
            window_half_height: 50,
            skip: 20,
        }
    }
}

/// Fractions of the border dimension, measured inward from each border edge,
/// between which the grid cropper looks for the darkest gap.
#[derive(Clone, Debug, PartialEq)]
pub struct CropSearchSettings {
    pub search_start: f64,
    pub search_end: f64,
}

impl Default for CropSearchSettings {
    fn default() -> Self {
        Self {
            search_start: 0.035,
            search_end: 0.065,
        }
    }
}

/// Read-only configuration shared by every tile of a plate.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub color_threshold: u8,
    pub red_gain: f32,
    pub blue_green_gain: f32,
    pub border: BorderSearchSettings,
    pub crop: CropSearchSettings,
    pub min_particle_area: usize,
    pub background_dilations: usize,
    pub tile_timeout: Option<Duration>,
}

pub const DEFAULT_COLOR_THRESHOLD: u8 = 55;
pub const DEFAULT_RED_GAIN: f32 = 2.0;
pub const DEFAULT_BLUE_GREEN_GAIN: f32 = 1.0;
pub const DEFAULT_TILE_TIMEOUT: Duration = Duration::from_secs(30);

impl Default for Settings {
    fn default() -> Self {
        Self {
            color_threshold: DEFAULT_COLOR_THRESHOLD,
            red_gain: DEFAULT_RED_GAIN,
            blue_green_gain: DEFAULT_BLUE_GREEN_GAIN,
            border: BorderSearchSettings::default(),
            crop: CropSearchSettings::default(),
            min_particle_area: 5,
            background_dilations: 3,
            tile_timeout: Some(DEFAULT_TILE_TIMEOUT),
        }
    }
}

impl From<&Arguments> for Settings {
    fn from(value: &Arguments) -> Self {
        Self {
            color_threshold: value.color_threshold,
            red_gain: value.red_gain,
            blue_green_gain: value.blue_green_gain,
            tile_timeout: value.tile_timeout,
            ..Settings::default()
        }
    }
}
