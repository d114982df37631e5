//! Otsu binarization and connected component analysis of a single tile.

use std::f64::consts::{PI, SQRT_2};

use super::particle::{Particle, ParticleTable};
use crate::{
    error::Error,
    image::{GrayImage, Image, Region, RgbImage},
    settings::Settings,
    Result,
};

pub type BinaryMask = Image<bool>;
pub type LabelMap = Image<u32>;

const BACKGROUND_LABEL: u32 = 0;

/// Everything a tile reader needs after segmenting one tile.
#[derive(Debug)]
pub struct Segmentation {
    pub gray: GrayImage,
    pub foreground: BinaryMask,
    pub labels: LabelMap,
    pub particles: ParticleTable,
    /// Index of the colony candidate, the particle with the largest area.
    pub candidate: usize,
}

impl Segmentation {
    pub fn candidate(&self) -> &Particle {
        &self.particles.as_slice()[self.candidate]
    }

    /// Mask of the pixels belonging to the colony candidate.
    pub fn candidate_mask(&self) -> BinaryMask {
        let label = self.candidate().label;
        let dots = self.labels.dots().iter().map(|&l| l == label).collect();
        Image::from_dots(self.labels.width(), self.labels.height(), dots)
            .unwrap_or_else(|_| Image::filled(self.labels.width(), self.labels.height(), false))
    }
}

pub struct ParticleSegmenter<'a> {
    settings: &'a Settings,
}

impl<'a> ParticleSegmenter<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    /// Binarizes the tile at its Otsu threshold and extracts the particles.
    pub fn segment(&self, tile: &RgbImage) -> Result<Segmentation> {
        let gray = tile.to_gray();
        let threshold = otsu_threshold(&histogram(&gray))
            .ok_or(Error::SegmentationFailure("tile has a single intensity level"))?;
        log::trace!("Otsu threshold of tile is {}", threshold);
        let foreground = binarize(&gray, threshold);
        self.extract_particles(gray, foreground)
    }

    /// Extracts particles from an already thresholded foreground mask.
    pub fn segment_thresholded(
        &self,
        tile: &RgbImage,
        foreground: BinaryMask,
    ) -> Result<Segmentation> {
        if foreground.width() != tile.width() || foreground.height() != tile.height() {
            return Err(Error::SegmentationFailure(
                "thresholded mask does not match tile size",
            ));
        }
        self.extract_particles(tile.to_gray(), foreground)
    }

    fn extract_particles(&self, gray: GrayImage, foreground: BinaryMask) -> Result<Segmentation> {
        let (labels, number_of_labels) = label_components(&foreground);
        let particles: Vec<Particle> = measure_components(&labels, number_of_labels)
            .into_iter()
            .filter(|particle| particle.area >= self.settings.min_particle_area)
            .collect();
        let particles = ParticleTable::new(particles);
        let candidate = particles
            .largest_index()
            .ok_or(Error::SegmentationFailure("no particle above minimum area"))?;
        let segmentation = Segmentation {
            gray,
            foreground,
            labels,
            particles,
            candidate,
        };
        if segmentation.candidate().bounding_box.is_degenerate() {
            return Err(Error::SegmentationFailure("degenerate colony candidate"));
        }
        Ok(segmentation)
    }
}

pub fn histogram(gray: &GrayImage) -> [u32; 256] {
    let mut histogram = [0_u32; 256];
    for &value in gray.dots() {
        histogram[value as usize] += 1;
    }
    histogram
}

/// Threshold `k` maximizing the between-class variance of the classes
/// `<= k` and `> k`. The lowest such `k` wins ties. Returns `None` when no
/// split separates anything, i.e. every pixel has the same value.
pub fn otsu_threshold(histogram: &[u32; 256]) -> Option<u8> {
    let total: u64 = histogram.iter().map(|&count| count as u64).sum();
    let total_sum: f64 = histogram
        .iter()
        .enumerate()
        .map(|(value, &count)| value as f64 * count as f64)
        .sum();

    let mut background_weight = 0_u64;
    let mut background_sum = 0_f64;
    let mut best: Option<(u8, f64)> = None;
    for (value, &count) in histogram.iter().enumerate().take(255) {
        background_weight += count as u64;
        background_sum += value as f64 * count as f64;
        if background_weight == 0 {
            continue;
        }
        let foreground_weight = total - background_weight;
        if foreground_weight == 0 {
            break;
        }
        let background_mean = background_sum / background_weight as f64;
        let foreground_mean = (total_sum - background_sum) / foreground_weight as f64;
        let variance = background_weight as f64
            * foreground_weight as f64
            * (background_mean - foreground_mean).powi(2);
        match best {
            Some((_, best_variance)) if best_variance >= variance => {}
            _ => best = Some((value as u8, variance)),
        }
    }
    best.filter(|&(_, variance)| variance > 0.0)
        .map(|(threshold, _)| threshold)
}

/// Pixels brighter than `threshold` become foreground.
pub fn binarize(gray: &GrayImage, threshold: u8) -> BinaryMask {
    let dots = gray.dots().iter().map(|&value| value > threshold).collect();
    Image::from_dots(gray.width(), gray.height(), dots)
        .unwrap_or_else(|_| Image::filled(gray.width(), gray.height(), false))
}

struct DisjointSet {
    parent: Vec<u32>,
}

impl DisjointSet {
    fn new() -> Self {
        // slot 0 stands for the background
        Self { parent: vec![0] }
    }

    fn make_set(&mut self) -> u32 {
        let label = self.parent.len() as u32;
        self.parent.push(label);
        label
    }

    fn find(&mut self, mut label: u32) -> u32 {
        while self.parent[label as usize] != label {
            let grandparent = self.parent[self.parent[label as usize] as usize];
            self.parent[label as usize] = grandparent;
            label = grandparent;
        }
        label
    }

    fn union(&mut self, a: u32, b: u32) {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a < root_b {
            self.parent[root_b as usize] = root_a;
        } else if root_b < root_a {
            self.parent[root_a as usize] = root_b;
        }
    }
}

/// Two pass, 8-connected labeling. Final labels start at 1 and follow the
/// raster order of each component's first pixel.
pub fn label_components(mask: &BinaryMask) -> (LabelMap, u32) {
    let width = mask.width();
    let height = mask.height();
    let mut provisional = Image::filled(width, height, BACKGROUND_LABEL);
    let mut sets = DisjointSet::new();

    for y in 0..height {
        for x in 0..width {
            if !mask.dot(x, y) {
                continue;
            }
            let neighbours = previous_neighbours(&provisional, x, y);
            let label = match neighbours.iter().copied().filter(|&l| l != 0).min() {
                None => sets.make_set(),
                Some(smallest) => {
                    for &other in neighbours.iter().filter(|&&l| l != 0) {
                        sets.union(smallest, other);
                    }
                    smallest
                }
            };
            provisional.set_dot(x, y, label);
        }
    }

    let mut final_labels = vec![BACKGROUND_LABEL; sets.parent.len()];
    let mut next_label = 0;
    for label in provisional.dots_mut().iter_mut() {
        if *label == BACKGROUND_LABEL {
            continue;
        }
        let root = sets.find(*label) as usize;
        if final_labels[root] == BACKGROUND_LABEL {
            next_label += 1;
            final_labels[root] = next_label;
        }
        *label = final_labels[root];
    }
    (provisional, next_label)
}

/// Labels of the west, north-west, north and north-east neighbours.
fn previous_neighbours(labels: &LabelMap, x: u32, y: u32) -> [u32; 4] {
    let label_at = |dx: i64, dy: i64| -> u32 {
        let nx = x as i64 + dx;
        let ny = y as i64 + dy;
        if nx < 0 || ny < 0 || nx >= labels.width() as i64 {
            return BACKGROUND_LABEL;
        }
        labels.dot(nx as u32, ny as u32)
    };
    [
        label_at(-1, 0),
        label_at(-1, -1),
        label_at(0, -1),
        label_at(1, -1),
    ]
}

#[derive(Clone, Default)]
struct ComponentAccumulator {
    area: u64,
    min_x: u32,
    min_y: u32,
    max_x: u32,
    max_y: u32,
    sum_x: f64,
    sum_y: f64,
    sum_xx: f64,
    sum_yy: f64,
    sum_xy: f64,
    edges: u64,
    corners: u64,
}

impl ComponentAccumulator {
    fn add_pixel(&mut self, x: u32, y: u32) {
        if self.area == 0 {
            self.min_x = x;
            self.min_y = y;
            self.max_x = x;
            self.max_y = y;
        } else {
            self.min_x = self.min_x.min(x);
            self.min_y = self.min_y.min(y);
            self.max_x = self.max_x.max(x);
            self.max_y = self.max_y.max(y);
        }
        self.area += 1;
        let (fx, fy) = (x as f64, y as f64);
        self.sum_x += fx;
        self.sum_y += fy;
        self.sum_xx += fx * fx;
        self.sum_yy += fy * fy;
        self.sum_xy += fx * fy;
    }

    /// Length of the polygon through the midpoints of the outline's pixel
    /// edges: each corner replaces two half edges by a half diagonal.
    fn perimeter(&self) -> f64 {
        self.edges as f64 - self.corners as f64 * (1.0 - SQRT_2 / 2.0)
    }

    fn aspect_ratio(&self) -> f64 {
        let n = self.area as f64;
        let mean_x = self.sum_x / n;
        let mean_y = self.sum_y / n;
        // each pixel is a unit square, which adds 1/12 to both variances
        let xx = self.sum_xx / n - mean_x * mean_x + 1.0 / 12.0;
        let yy = self.sum_yy / n - mean_y * mean_y + 1.0 / 12.0;
        let xy = self.sum_xy / n - mean_x * mean_y;
        let half_trace = (xx + yy) / 2.0;
        let spread = (((xx - yy) / 2.0).powi(2) + xy * xy).sqrt();
        let major = half_trace + spread;
        let minor = (half_trace - spread).max(f64::EPSILON);
        (major / minor).sqrt()
    }

    fn into_particle(self, label: u32) -> Particle {
        let perimeter = self.perimeter();
        let area = self.area as f64;
        Particle {
            label,
            area: self.area as usize,
            perimeter,
            bounding_box: Region::from_corners(
                self.min_x,
                self.min_y,
                self.max_x + 1,
                self.max_y + 1,
            ),
            centroid: (self.sum_x / area + 0.5, self.sum_y / area + 0.5),
            circularity: 4.0 * PI * area / (perimeter * perimeter),
            aspect_ratio: self.aspect_ratio(),
        }
    }
}

/// Measures every labelled component. Particles come back in label order.
pub fn measure_components(labels: &LabelMap, number_of_labels: u32) -> Vec<Particle> {
    let mut accumulators = vec![ComponentAccumulator::default(); number_of_labels as usize + 1];
    let width = labels.width();
    let height = labels.height();
    let label_at = |x: i64, y: i64| -> u32 {
        if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
            return BACKGROUND_LABEL;
        }
        labels.dot(x as u32, y as u32)
    };

    for y in 0..height {
        for x in 0..width {
            let label = labels.dot(x, y);
            if label == BACKGROUND_LABEL {
                continue;
            }
            let accumulator = &mut accumulators[label as usize];
            accumulator.add_pixel(x, y);
            let (ix, iy) = (x as i64, y as i64);
            for (dx, dy) in [(-1, 0), (1, 0), (0, -1), (0, 1)] {
                if label_at(ix + dx, iy + dy) != label {
                    accumulator.edges += 1;
                }
            }
        }
    }

    for vy in 0..=height as i64 {
        for vx in 0..=width as i64 {
            let window = [
                label_at(vx - 1, vy - 1),
                label_at(vx, vy - 1),
                label_at(vx - 1, vy),
                label_at(vx, vy),
            ];
            for (position, &label) in window.iter().enumerate() {
                if label == BACKGROUND_LABEL || window[..position].contains(&label) {
                    continue;
                }
                accumulators[label as usize].corners += corners_at_vertex(&window, label);
            }
        }
    }

    accumulators
        .into_iter()
        .enumerate()
        .skip(1)
        .map(|(label, accumulator)| accumulator.into_particle(label as u32))
        .collect()
}

/// Outline corners of `label` at a grid vertex, given the 2x2 window of
/// labels around it ordered top-left, top-right, bottom-left, bottom-right.
fn corners_at_vertex(window: &[u32; 4], label: u32) -> u64 {
    let inside = window.map(|l| l == label);
    match inside.iter().filter(|&&b| b).count() {
        1 | 3 => 1,
        2 if inside[0] == inside[3] => 2,
        _ => 0,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::color::RGBColorFormat;

    fn mask_from_rows(rows: &[&str]) -> BinaryMask {
        let height = rows.len() as u32;
        let width = rows[0].len() as u32;
        let dots = rows
            .iter()
            .flat_map(|row| row.chars().map(|c| c == '#'))
            .collect();
        Image::from_dots(width, height, dots).unwrap()
    }

    fn disk_tile(size: u32, radius: f64, inside: u8, outside: u8) -> RgbImage {
        let mut tile = Image::filled(size, size, RGBColorFormat::gray(outside));
        let center = size as f64 / 2.0;
        for y in 0..size {
            for x in 0..size {
                let dx = x as f64 + 0.5 - center;
                let dy = y as f64 + 0.5 - center;
                if dx * dx + dy * dy <= radius * radius {
                    tile.set_dot(x, y, RGBColorFormat::gray(inside));
                }
            }
        }
        tile
    }

    #[test]
    fn otsu_splits_two_levels() {
        let mut histogram = [0_u32; 256];
        histogram[20] = 500;
        histogram[200] = 100;
        assert_eq!(otsu_threshold(&histogram), Some(20));
    }

    #[test]
    fn otsu_separates_two_clusters() {
        let mut histogram = [0_u32; 256];
        for value in 10..20 {
            histogram[value] = 50;
        }
        for value in 150..170 {
            histogram[value] = 20;
        }
        let threshold = otsu_threshold(&histogram).unwrap();
        assert!(
            (19..150).contains(&threshold),
            "threshold {} must lie between the clusters",
            threshold
        );
    }

    #[test]
    fn otsu_of_flat_histogram_is_none() {
        let mut histogram = [0_u32; 256];
        histogram[77] = 1000;
        assert_eq!(otsu_threshold(&histogram), None);
        assert_eq!(otsu_threshold(&[0; 256]), None);
    }

    #[test]
    fn label_eight_connected_components() {
        let mask = mask_from_rows(&[
            "##...#",
            "..#..#",
            "......",
            "###..#",
        ]);
        let (labels, count) = label_components(&mask);
        assert_eq!(count, 4);
        assert_eq!(labels.dot(0, 0), 1);
        assert_eq!(labels.dot(2, 1), 1, "diagonal neighbour joins component");
        assert_eq!(labels.dot(5, 0), 2);
        assert_eq!(labels.dot(5, 1), 2);
        assert_eq!(labels.dot(0, 3), 3);
        assert_eq!(labels.dot(5, 3), 4);
    }

    #[test]
    fn label_merges_u_shape() {
        let mask = mask_from_rows(&[
            "#...#",
            "#...#",
            "#####",
        ]);
        let (labels, count) = label_components(&mask);
        assert_eq!(count, 1);
        assert!(labels.dots().iter().all(|&l| l <= 1));
    }

    #[test]
    fn measure_square() {
        let mask = mask_from_rows(&[
            "......",
            ".####.",
            ".####.",
            ".####.",
            ".####.",
            "......",
        ]);
        let (labels, count) = label_components(&mask);
        let particles = measure_components(&labels, count);
        assert_eq!(particles.len(), 1);
        let square = &particles[0];
        assert_eq!(square.area, 16);
        assert_eq!(square.bounding_box, Region::new(1, 1, 4, 4));
        assert_eq!(square.centroid, (3.0, 3.0));
        let expected_perimeter = 16.0 - 4.0 * (1.0 - SQRT_2 / 2.0);
        assert!((square.perimeter - expected_perimeter).abs() < 1e-9);
        assert!((square.aspect_ratio - 1.0).abs() < 1e-9);
    }

    #[test]
    fn measure_line_has_high_aspect_ratio() {
        let mask = mask_from_rows(&["..........", "##########", ".........."]);
        let (labels, count) = label_components(&mask);
        let line = &measure_components(&labels, count)[0];
        assert!((line.aspect_ratio - 10.0).abs() < 1e-6, "was {}", line.aspect_ratio);
        assert!(line.circularity < 0.5);
    }

    #[test]
    fn disk_is_nearly_circular() {
        let segmenter_settings = Settings::default();
        let segmenter = ParticleSegmenter::new(&segmenter_settings);
        let segmentation = segmenter.segment(&disk_tile(60, 20.0, 220, 30)).unwrap();
        let colony = segmentation.candidate();
        assert_eq!(segmentation.particles.len(), 1);
        assert!(colony.circularity > 0.85, "was {}", colony.circularity);
        assert!(colony.aspect_ratio < 1.1, "was {}", colony.aspect_ratio);
        assert!((colony.centroid.0 - 30.0).abs() < 0.5);
    }

    #[test]
    fn small_components_are_discarded() {
        let settings = Settings::default();
        let segmenter = ParticleSegmenter::new(&settings);
        let mut tile = disk_tile(40, 10.0, 200, 20);
        tile.fill_region(Region::new(0, 0, 2, 2), RGBColorFormat::gray(200));
        let segmentation = segmenter.segment(&tile).unwrap();
        assert_eq!(segmentation.particles.len(), 1, "4 pixel speck must be dropped");
        assert!(segmentation.foreground.dot(0, 0), "speck stays in the foreground mask");
    }

    #[test]
    fn uniform_tile_fails() {
        let settings = Settings::default();
        let segmenter = ParticleSegmenter::new(&settings);
        let tile = Image::filled(20, 20, RGBColorFormat::gray(90));
        match segmenter.segment(&tile) {
            Err(Error::SegmentationFailure(_)) => {}
            _ => panic!("Uniform tile must not yield a colony candidate"),
        }
    }

    #[test]
    fn only_specks_fails() {
        let settings = Settings::default();
        let segmenter = ParticleSegmenter::new(&settings);
        let mut tile = Image::filled(20, 20, RGBColorFormat::gray(10));
        tile.fill_region(Region::new(5, 5, 2, 2), RGBColorFormat::gray(240));
        assert!(segmenter.segment(&tile).is_err());
    }

    #[test]
    fn candidate_mask_covers_only_candidate() {
        let settings = Settings::default();
        let segmenter = ParticleSegmenter::new(&settings);
        let mut tile = disk_tile(40, 10.0, 200, 20);
        tile.fill_region(Region::new(0, 0, 3, 3), RGBColorFormat::gray(200));
        let segmentation = segmenter.segment(&tile).unwrap();
        let mask = segmentation.candidate_mask();
        assert!(mask.dot(20, 20));
        assert!(!mask.dot(1, 1));
        let area = mask.dots().iter().filter(|&&b| b).count();
        assert_eq!(area, segmentation.candidate().area);
    }

    #[test]
    fn thresholded_mask_size_must_match() {
        let settings = Settings::default();
        let segmenter = ParticleSegmenter::new(&settings);
        let tile = Image::filled(10, 10, RGBColorFormat::gray(0));
        let mask = Image::filled(5, 5, true);
        assert!(segmenter.segment_thresholded(&tile, mask).is_err());
    }
}
