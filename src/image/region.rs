use std::fmt::Display;

/// Axis aligned rectangle in pixel coordinates. A region with zero width
/// and zero height means "no region".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Builds a region from inclusive start and exclusive end coordinates.
    pub fn from_corners(left: u32, top: u32, right: u32, bottom: u32) -> Self {
        Self {
            x: left,
            y: top,
            width: right.saturating_sub(left),
            height: bottom.saturating_sub(top),
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_none(&self) -> bool {
        self.width == 0 && self.height == 0
    }

    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.right() <= width && self.bottom() <= height
    }

    pub fn intersect(&self, other: &Region) -> Region {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= left || bottom <= top {
            return Region::none();
        }
        Region::from_corners(left, top, right, bottom)
    }
}

impl Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[x={}, y={}, w={}, h={}]",
            self.x, self.y, self.width, self.height
        )
    }
}

#[cfg(test)]
mod test {
    use super::Region;

    #[test]
    fn none_is_distinct_from_single_pixel() {
        assert!(Region::none().is_none());
        assert!(!Region::new(0, 0, 1, 1).is_none());
    }

    #[test]
    fn from_corners_never_underflows() {
        let region = Region::from_corners(10, 10, 5, 20);
        assert_eq!(region.width, 0);
        assert_eq!(region.height, 10);
        assert!(region.is_degenerate());
    }

    #[test]
    fn intersect_overlapping() {
        let a = Region::new(0, 0, 10, 10);
        let b = Region::new(5, 6, 10, 10);
        assert_eq!(a.intersect(&b), Region::new(5, 6, 5, 4));
    }

    #[test]
    fn intersect_disjoint_is_none() {
        let a = Region::new(0, 0, 4, 4);
        let b = Region::new(4, 0, 4, 4);
        assert!(a.intersect(&b).is_none());
    }

    #[test]
    fn fits_within_checks_far_edges() {
        let region = Region::new(2, 2, 3, 3);
        assert!(region.fits_within(5, 5));
        assert!(!region.fits_within(4, 5));
    }
}
