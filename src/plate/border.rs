use crate::{
    color::Intensity,
    error::Error,
    image::{window_mean, Image, IntensityProfile, Region},
    settings::BorderSearchSettings,
    Result,
};

/// Locates the physical plate border from row and column intensity sums.
///
/// The brightness typical for the plate interior is estimated as the mean of
/// the sums inside a small window at the image center. Every index whose sum
/// exceeds that mean counts as foreground. The border lies `skip` foreground
/// indices in from each end, which tolerates the sawtooth reflections along
/// the plastic edge better than a single extreme would.
pub struct PlateBorderDetector<'a> {
    settings: &'a BorderSearchSettings,
}

impl<'a> PlateBorderDetector<'a> {
    pub fn new(settings: &'a BorderSearchSettings) -> Self {
        Self { settings }
    }

    pub fn detect<T: Intensity>(&self, image: &Image<T>) -> Result<Region> {
        let profile = IntensityProfile::from_image(image);
        let (left, right) = self.find_bounds(
            &profile.column_sums,
            self.settings.window_half_width,
            "columns",
        )?;
        let (top, bottom) = self.find_bounds(
            &profile.row_sums,
            self.settings.window_half_height,
            "rows",
        )?;
        Ok(Region::from_corners(
            left as u32,
            top as u32,
            right as u32,
            bottom as u32,
        ))
    }

    fn find_bounds(
        &self,
        sums: &[u64],
        window_half_size: usize,
        dimension: &'static str,
    ) -> Result<(usize, usize)> {
        let mean = window_mean(sums, sums.len() / 2, window_half_size);
        let foreground = Self::foreground_indices(sums, mean);
        self.skip_robust_bounds(&foreground, dimension)
    }

    fn foreground_indices(sums: &[u64], mean: f64) -> Vec<usize> {
        sums.iter()
            .enumerate()
            .filter(|&(_, &sum)| sum as f64 > mean)
            .map(|(index, _)| index)
            .collect()
    }

    fn skip_robust_bounds(
        &self,
        foreground: &[usize],
        dimension: &'static str,
    ) -> Result<(usize, usize)> {
        let skip = self.settings.skip;
        let required = 2 * skip + 1;
        if foreground.len() < required {
            return Err(Error::GeometryPrecondition {
                dimension,
                found: foreground.len(),
                required,
            });
        }
        Ok((foreground[skip], foreground[foreground.len() - 1 - skip]))
    }
}
