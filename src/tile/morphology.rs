use super::segmentation::BinaryMask;
use crate::image::{Image, Region};

/// Mask that is `true` exactly inside `region`.
pub fn mask_from_region(width: u32, height: u32, region: Region) -> BinaryMask {
    let mut mask = Image::filled(width, height, false);
    mask.fill_region(region, true);
    mask
}

/// Grows the background (`false`) into the foreground once per iteration
/// using the 8-neighbourhood. Pixels outside the mask count as background.
pub fn grow_background(mask: &BinaryMask, iterations: usize) -> BinaryMask {
    let mut current = mask.clone();
    for _ in 0..iterations {
        current = grow_background_once(&current);
    }
    current
}

fn grow_background_once(mask: &BinaryMask) -> BinaryMask {
    let width = mask.width() as i64;
    let height = mask.height() as i64;
    let is_foreground = |x: i64, y: i64| -> bool {
        x >= 0 && y >= 0 && x < width && y < height && mask.dot(x as u32, y as u32)
    };
    let mut grown = mask.clone();
    for y in 0..height {
        for x in 0..width {
            if !is_foreground(x, y) {
                continue;
            }
            let touches_background = (-1..=1)
                .flat_map(|dy| (-1..=1).map(move |dx| (dx, dy)))
                .any(|(dx, dy)| !is_foreground(x + dx, y + dy));
            if touches_background {
                grown.set_dot(x as u32, y as u32, false);
            }
        }
    }
    grown
}

#[cfg(test)]
mod test {
    use super::{grow_background, mask_from_region};
    use crate::image::Region;

    fn count(mask: &crate::tile::segmentation::BinaryMask) -> usize {
        mask.dots().iter().filter(|&&b| b).count()
    }

    #[test]
    fn region_mask() {
        let mask = mask_from_region(10, 10, Region::new(2, 3, 4, 5));
        assert_eq!(count(&mask), 20);
        assert!(mask.dot(2, 3));
        assert!(!mask.dot(6, 3));
    }

    #[test]
    fn three_iterations_shrink_square_by_three() {
        let mask = mask_from_region(20, 20, Region::new(2, 2, 12, 12));
        let shrunk = grow_background(&mask, 3);
        assert_eq!(shrunk, mask_from_region(20, 20, Region::new(5, 5, 6, 6)));
    }

    #[test]
    fn image_border_counts_as_background() {
        let mask = mask_from_region(10, 10, Region::new(0, 0, 10, 10));
        let shrunk = grow_background(&mask, 1);
        assert_eq!(shrunk, mask_from_region(10, 10, Region::new(1, 1, 8, 8)));
    }

    #[test]
    fn small_object_vanishes() {
        let mask = mask_from_region(10, 10, Region::new(4, 4, 3, 3));
        assert_eq!(count(&grow_background(&mask, 2)), 0);
    }

    #[test]
    fn zero_iterations_is_identity() {
        let mask = mask_from_region(10, 10, Region::new(4, 4, 3, 3));
        assert_eq!(grow_background(&mask, 0), mask);
    }
}
