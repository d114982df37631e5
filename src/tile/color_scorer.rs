//! Color and biofilm scoring of a classified colony.

use super::{
    morphology::{grow_background, mask_from_region},
    segmentation::BinaryMask,
};
use crate::{
    color::RGBColorFormat,
    error::Error,
    image::{Region, RgbImage},
    saturating::{add_arrays, multiply_array, subtract_arrays, sum},
    settings::Settings,
    Result,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ColorMeasurements {
    pub color_intensity_sum: u64,
    pub biofilm_area: usize,
    pub color_intensity_sum_in_biofilm_area: u64,
}

pub struct ColorPhenotypeScorer<'a> {
    settings: &'a Settings,
}

impl<'a> ColorPhenotypeScorer<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    /// Scores the pixels of `tile` inside the colony region after its rim
    /// has been eroded away. Everything inside the region counts, including
    /// pixels darker than the surrounding agar. The tile itself is left
    /// untouched.
    pub fn score(&self, tile: &RgbImage, colony: Region) -> Result<ColorMeasurements> {
        let colony = colony.intersect(&tile.bounds());
        if colony.is_degenerate() {
            return Err(Error::SegmentationFailure(
                "colony region lies outside the tile",
            ));
        }
        let colony = mask_from_region(tile.width(), tile.height(), colony);
        let core = grow_background(&colony, self.settings.background_dilations);
        let masked = Self::remove_background(tile, &core)?;
        let relative = self.relative_color_intensity(&masked);
        Ok(self.measure(&relative))
    }

    fn remove_background(tile: &RgbImage, keep: &BinaryMask) -> Result<RgbImage> {
        let dots = tile
            .dots()
            .iter()
            .zip(keep.dots())
            .map(|(&dot, &inside)| if inside { dot } else { RGBColorFormat::black() })
            .collect();
        RgbImage::from_dots(tile.width(), tile.height(), dots)
    }

    /// `2·red - (green + blue)` per pixel with the configured gains, computed
    /// in clamping 8-bit arithmetic.
    pub fn relative_color_intensity(&self, image: &RgbImage) -> Vec<u8> {
        let channels = image.split_color_channels();
        let weighted_red = multiply_array(&channels.red, self.settings.red_gain);
        let green_blue = add_arrays(&channels.green, &channels.blue);
        let weighted_green_blue = multiply_array(&green_blue, self.settings.blue_green_gain);
        subtract_arrays(&weighted_red, &weighted_green_blue)
    }

    fn measure(&self, relative: &[u8]) -> ColorMeasurements {
        let threshold = self.settings.color_threshold;
        let biofilm: Vec<u8> = relative
            .iter()
            .copied()
            .filter(|&value| value > threshold)
            .collect();
        ColorMeasurements {
            color_intensity_sum: sum(relative),
            biofilm_area: biofilm.len(),
            color_intensity_sum_in_biofilm_area: sum(&biofilm),
        }
    }
}

#[cfg(test)]
mod test {
    use super::{ColorMeasurements, ColorPhenotypeScorer};
    use crate::{
        color::RGBColorFormat,
        image::{Image, Region, RgbImage},
        settings::Settings,
    };

    fn tile_with_colony(colony: RGBColorFormat<u8>, region: Region) -> RgbImage {
        let mut tile = Image::filled(20, 20, RGBColorFormat::gray(30));
        tile.fill_region(region, colony);
        tile
    }

    #[test]
    fn pure_red_saturates() {
        let settings = Settings::default();
        let scorer = ColorPhenotypeScorer::new(&settings);
        let tile = Image::filled(4, 1, RGBColorFormat::new(255, 0, 0));
        assert_eq!(scorer.relative_color_intensity(&tile), vec![255; 4]);
    }

    #[test]
    fn green_blue_floors_at_zero() {
        let settings = Settings::default();
        let scorer = ColorPhenotypeScorer::new(&settings);
        let tile = Image::filled(4, 1, RGBColorFormat::new(0, 255, 255));
        assert_eq!(scorer.relative_color_intensity(&tile), vec![0; 4]);
    }

    #[test]
    fn only_eroded_colony_core_is_scored() {
        let settings = Settings::default();
        let scorer = ColorPhenotypeScorer::new(&settings);
        let region = Region::new(4, 4, 10, 10);
        let tile = tile_with_colony(RGBColorFormat::new(255, 0, 0), region);
        let measurements = scorer.score(&tile, region).unwrap();
        // 10x10 colony loses three rings, leaving 4x4
        assert_eq!(
            measurements,
            ColorMeasurements {
                color_intensity_sum: 16 * 255,
                biofilm_area: 16,
                color_intensity_sum_in_biofilm_area: 16 * 255,
            }
        );
    }

    #[test]
    fn background_outside_colony_is_ignored() {
        let settings = Settings::default();
        let scorer = ColorPhenotypeScorer::new(&settings);
        let mut tile = tile_with_colony(RGBColorFormat::new(0, 0, 0), Region::new(4, 4, 10, 10));
        tile.fill_region(Region::new(0, 0, 3, 3), RGBColorFormat::new(255, 0, 0));
        assert_eq!(
            scorer.score(&tile, Region::new(4, 4, 10, 10)).unwrap(),
            ColorMeasurements::default()
        );
    }

    #[test]
    fn threshold_is_exclusive() {
        let settings = Settings {
            color_threshold: 20,
            ..Settings::default()
        };
        let scorer = ColorPhenotypeScorer::new(&settings);
        let region = Region::new(0, 0, 20, 20);
        // 2*20 - (10 + 10) = 20, not above the threshold
        let tile = tile_with_colony(RGBColorFormat::new(20, 10, 10), region);
        let measurements = scorer.score(&tile, region).unwrap();
        assert_eq!(measurements.color_intensity_sum, 14 * 14 * 20);
        assert_eq!(measurements.biofilm_area, 0);
        assert_eq!(measurements.color_intensity_sum_in_biofilm_area, 0);
    }

    #[test]
    fn scoring_does_not_modify_tile() {
        let settings = Settings::default();
        let scorer = ColorPhenotypeScorer::new(&settings);
        let region = Region::new(4, 4, 10, 10);
        let tile = tile_with_colony(RGBColorFormat::new(200, 10, 10), region);
        let before = tile.clone();
        scorer.score(&tile, region).unwrap();
        assert_eq!(tile, before);
    }

    #[test]
    fn dark_center_inside_region_is_scored() {
        let settings = Settings::default();
        let scorer = ColorPhenotypeScorer::new(&settings);
        let region = Region::new(2, 2, 16, 16);
        let mut tile = tile_with_colony(RGBColorFormat::new(240, 60, 60), region);
        tile.fill_region(Region::new(8, 8, 4, 4), RGBColorFormat::new(130, 20, 20));
        let measurements = scorer.score(&tile, region).unwrap();
        // 10x10 core: 84 pixels at 255 - 120, 16 darker ones at 255 - 40
        assert_eq!(measurements.color_intensity_sum, 84 * 135 + 16 * 215);
        assert_eq!(measurements.biofilm_area, 100);
    }

    #[test]
    fn region_outside_tile_is_segmentation_failure() {
        let settings = Settings::default();
        let scorer = ColorPhenotypeScorer::new(&settings);
        let tile = Image::filled(4, 4, RGBColorFormat::black());
        assert!(scorer.score(&tile, Region::new(5, 5, 3, 3)).is_err());
    }
}
