use crate::{
    color::Intensity,
    error::Error,
    image::{argmin_in_range, Image, IntensityProfile, Region},
    settings::CropSearchSettings,
    Result,
};

/// Tightens a plate border to the colony grid by placing each side at the
/// darkest row or column within a narrow band just inside the border.
pub struct GridCropper<'a> {
    settings: &'a CropSearchSettings,
}

/// Offsets, counted inward from a border edge, of a half open search band.
struct SearchBand {
    start: usize,
    end: usize,
}

impl<'a> GridCropper<'a> {
    pub fn new(settings: &'a CropSearchSettings) -> Self {
        Self { settings }
    }

    pub fn crop<T: Intensity>(&self, image: &Image<T>, border: Region) -> Result<Region> {
        let profile = IntensityProfile::from_image(image);
        let horizontal = self.search_band(border.width);
        let vertical = self.search_band(border.height);
        let columns = &profile.column_sums;
        let rows = &profile.row_sums;

        let left = Self::search_inward(columns, border.x as usize, &horizontal, "left")?;
        let right = Self::search_outward(columns, border.right() as usize, &horizontal, "right")?;
        let top = Self::search_inward(rows, border.y as usize, &vertical, "top")?;
        let bottom = Self::search_outward(rows, border.bottom() as usize, &vertical, "bottom")?;

        Ok(Region::from_corners(
            left as u32,
            top as u32,
            right as u32,
            bottom as u32,
        ))
    }

    fn search_band(&self, dimension: u32) -> SearchBand {
        SearchBand {
            start: (dimension as f64 * self.settings.search_start) as usize,
            end: (dimension as f64 * self.settings.search_end) as usize,
        }
    }

    /// Searches `[edge + start, edge + end)`, used for the left and top sides.
    fn search_inward(
        sums: &[u64],
        edge: usize,
        band: &SearchBand,
        side: &'static str,
    ) -> Result<usize> {
        argmin_in_range(sums, edge + band.start, edge + band.end)
            .ok_or(Error::EmptySearchRange(side))
    }

    /// Searches `[edge - end, edge - start)`, used for the right and bottom sides.
    fn search_outward(
        sums: &[u64],
        edge: usize,
        band: &SearchBand,
        side: &'static str,
    ) -> Result<usize> {
        if edge < band.end {
            return Err(Error::EmptySearchRange(side));
        }
        argmin_in_range(sums, edge - band.end, edge - band.start)
            .ok_or(Error::EmptySearchRange(side))
    }
}
