use super::Image;
use crate::color::Intensity;

/// Row and column intensity sums of a gray view of an image.
/// `row_sums[y]` sums over all x, `column_sums[x]` over all y.
pub struct IntensityProfile {
    pub row_sums: Vec<u64>,
    pub column_sums: Vec<u64>,
}

impl IntensityProfile {
    pub fn from_image<T: Intensity>(image: &Image<T>) -> Self {
        let width = image.width() as usize;
        let height = image.height() as usize;
        let mut row_sums = vec![0_u64; height];
        let mut column_sums = vec![0_u64; width];
        if width == 0 {
            return Self {
                row_sums,
                column_sums,
            };
        }
        for (y, row) in image.dots().chunks_exact(width).enumerate() {
            for (x, dot) in row.iter().enumerate() {
                let value = dot.intensity() as u64;
                row_sums[y] += value;
                column_sums[x] += value;
            }
        }
        Self {
            row_sums,
            column_sums,
        }
    }
}

/// Mean of `sums` over the window `center ± half_width`, clipped to the slice.
pub fn window_mean(sums: &[u64], center: usize, half_width: usize) -> f64 {
    if sums.is_empty() {
        return 0.0;
    }
    let start = center.saturating_sub(half_width);
    let end = (center + half_width + 1).min(sums.len());
    let window = &sums[start..end];
    window.iter().sum::<u64>() as f64 / window.len() as f64
}

/// Index of the first minimum within `sums[start..end]`.
pub fn argmin_in_range(sums: &[u64], start: usize, end: usize) -> Option<usize> {
    let end = end.min(sums.len());
    if start >= end {
        return None;
    }
    sums[start..end]
        .iter()
        .enumerate()
        .min_by_key(|&(_, value)| *value)
        .map(|(offset, _)| start + offset)
}

#[cfg(test)]
mod test {
    use super::{argmin_in_range, window_mean, IntensityProfile};
    use crate::image::Image;

    #[test]
    fn sums_along_both_axes() {
        #[rustfmt::skip]
        let image = Image::from_dots(3, 2, vec![
            1_u8, 2, 3,
            4,    5, 6,
        ]).unwrap();
        let profile = IntensityProfile::from_image(&image);
        assert_eq!(profile.row_sums, vec![6, 15]);
        assert_eq!(profile.column_sums, vec![5, 7, 9]);
    }

    #[test]
    fn window_mean_clips_at_edges() {
        let sums = [10, 20, 30, 40];
        assert_eq!(window_mean(&sums, 0, 1), 15.0);
        assert_eq!(window_mean(&sums, 2, 100), 25.0);
    }

    #[test]
    fn argmin_returns_first_minimum() {
        let sums = [5, 1, 3, 1, 4];
        assert_eq!(argmin_in_range(&sums, 0, 5), Some(1));
        assert_eq!(argmin_in_range(&sums, 2, 5), Some(3));
    }

    #[test]
    fn argmin_of_empty_range_is_none() {
        let sums = [5, 1, 3];
        assert_eq!(argmin_in_range(&sums, 2, 2), None);
        assert_eq!(argmin_in_range(&sums, 4, 9), None);
    }
}
