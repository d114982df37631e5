//! Turns one owned tile buffer into one measurement record.

use super::{
    classifier::{decide, ParticleStatistics, TileClassification},
    color_scorer::ColorPhenotypeScorer,
    segmentation::{BinaryMask, ParticleSegmenter, Segmentation},
};
use crate::{
    error::Error,
    image::{GrayImage, Region, RgbImage},
    logger,
    settings::Settings,
    Result,
};

/// Everything needed to measure one tile. The optional fields replace the
/// automatic choices: a confirmed colony region replaces the candidate's
/// bounding box as the scored region,
/// a thresholded mask replaces Otsu binarization and a center point selects
/// the particle under it as the colony instead of the largest one.
pub struct TileReaderInput<'a> {
    pub row: u32,
    pub column: u32,
    pub image: RgbImage,
    pub colony_region: Option<Region>,
    pub thresholded: Option<BinaryMask>,
    pub center: Option<(u32, u32)>,
    pub settings: &'a Settings,
}

impl<'a> TileReaderInput<'a> {
    pub fn new(row: u32, column: u32, image: RgbImage, settings: &'a Settings) -> Self {
        Self {
            row,
            column,
            image,
            colony_region: None,
            thresholded: None,
            center: None,
            settings,
        }
    }
}

/// Measurement record of one tile. Fields a stage does not compute stay zero.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TileReaderOutput {
    pub row: u32,
    pub column: u32,
    pub colony_size: usize,
    pub circularity: f64,
    pub colony_opacity: u64,
    pub morphology_score_fixed_circles: f64,
    pub morphology_score_whole_colony: f64,
    pub normalized_morphology_score: f64,
    pub in_agar_size: usize,
    pub in_agar_circularity: f64,
    pub in_agar_opacity: u64,
    pub whole_tile_opacity: u64,
    pub color_intensity_sum: u64,
    pub biofilm_area: usize,
    pub color_intensity_sum_in_biofilm_area: u64,
    pub relative_color_intensity: u64,
    pub colony_found: bool,
    pub segmentation_failed: bool,
    pub timed_out: bool,
}

impl TileReaderOutput {
    pub fn zero(row: u32, column: u32) -> Self {
        Self {
            row,
            column,
            ..Default::default()
        }
    }

    pub fn failed(row: u32, column: u32) -> Self {
        Self {
            segmentation_failed: true,
            ..Self::zero(row, column)
        }
    }

    pub fn timed_out(row: u32, column: u32) -> Self {
        Self {
            timed_out: true,
            ..Self::zero(row, column)
        }
    }

    pub fn has_error(&self) -> bool {
        self.segmentation_failed || self.timed_out
    }
}

/// Measures one tile. Errors are turned into a flagged zero record so that
/// the caller can go on with the next tile. The tile buffer is dropped when
/// this returns.
pub fn read_tile(input: TileReaderInput) -> TileReaderOutput {
    let (row, column) = (input.row, input.column);
    let output = match measure_tile(input) {
        Ok(output) => output,
        Err(e) => {
            log::warn!("Tile ({}, {}) failed: {}", row, column, e);
            TileReaderOutput::failed(row, column)
        }
    };
    logger::log_tile_outcome(&output);
    output
}

fn measure_tile(input: TileReaderInput) -> Result<TileReaderOutput> {
    let TileReaderInput {
        row,
        column,
        image,
        colony_region,
        thresholded,
        center,
        settings,
    } = input;
    let segmenter = ParticleSegmenter::new(settings);
    let mut segmentation = match thresholded {
        Some(foreground) => segmenter.segment_thresholded(&image, foreground)?,
        None => segmenter.segment(&image)?,
    };
    let statistics = ParticleStatistics::from_table(&segmentation.particles)
        .ok_or(Error::SegmentationFailure("no particle above minimum area"))?;
    let decision = decide(&statistics);
    log::debug!(
        "Tile ({}, {}) classified as {:?} by rule '{}'",
        row,
        column,
        decision.classification,
        decision.rule
    );
    if decision.classification == TileClassification::Empty {
        return Ok(TileReaderOutput::zero(row, column));
    }
    if let Some((x, y)) = center {
        select_particle_at(&mut segmentation, x, y);
    }
    let candidate = segmentation.candidate();
    let colony_size = candidate.area;
    let scored_region = colony_region.unwrap_or(candidate.bounding_box);
    let color = ColorPhenotypeScorer::new(settings).score(&image, scored_region)?;
    Ok(TileReaderOutput {
        row,
        column,
        colony_size,
        circularity: candidate.circularity,
        colony_opacity: masked_intensity_sum(&segmentation.gray, &segmentation.candidate_mask()),
        whole_tile_opacity: masked_intensity_sum(&segmentation.gray, &segmentation.foreground),
        color_intensity_sum: color.color_intensity_sum,
        biofilm_area: color.biofilm_area,
        color_intensity_sum_in_biofilm_area: color.color_intensity_sum_in_biofilm_area,
        relative_color_intensity: color
            .color_intensity_sum
            .checked_div(colony_size as u64)
            .unwrap_or(0),
        colony_found: true,
        ..TileReaderOutput::zero(row, column)
    })
}

fn select_particle_at(segmentation: &mut Segmentation, x: u32, y: u32) {
    if !segmentation.labels.bounds().contains(x, y) {
        return;
    }
    let label = segmentation.labels.dot(x, y);
    if let Some(index) = segmentation
        .particles
        .iter()
        .position(|particle| particle.label == label)
    {
        segmentation.candidate = index;
    }
}

fn masked_intensity_sum(gray: &GrayImage, mask: &BinaryMask) -> u64 {
    gray.dots()
        .iter()
        .zip(mask.dots())
        .filter(|&(_, &inside)| inside)
        .map(|(&value, _)| value as u64)
        .sum()
}
