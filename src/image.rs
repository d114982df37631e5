use crate::{error::Error, Result};

mod profile;
pub mod reader;
mod region;

pub use profile::{argmin_in_range, window_mean, IntensityProfile};
pub use region::Region;

use crate::color::{Intensity, RGBColorFormat};

pub type RgbImage = Image<RGBColorFormat<u8>>;
pub type GrayImage = Image<u8>;

/// Row-major pixel buffer. Every stage that mutates pixels works on its own
/// `Image`; sharing happens only through `&Image` or an `Arc`.
#[derive(Clone, Debug, PartialEq)]
pub struct Image<T> {
    width: u32,
    height: u32,
    dots: Vec<T>,
}

impl<T> Image<T> {
    pub fn from_dots(width: u32, height: u32, dots: Vec<T>) -> Result<Self> {
        if width as usize * height as usize != dots.len() {
            return Err(Error::MismatchOfSizeBetweenHeaderAndValues);
        }
        Ok(Self {
            width,
            height,
            dots,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dots(&self) -> &[T] {
        &self.dots
    }

    pub fn dots_mut(&mut self) -> &mut [T] {
        &mut self.dots
    }

    pub fn bounds(&self) -> Region {
        Region::new(0, 0, self.width, self.height)
    }

    fn index(&self, x: u32, y: u32) -> usize {
        x as usize + y as usize * self.width as usize
    }
}

impl<T: Copy> Image<T> {
    pub fn filled(width: u32, height: u32, value: T) -> Self {
        Self {
            width,
            height,
            dots: vec![value; width as usize * height as usize],
        }
    }

    pub fn dot(&self, x: u32, y: u32) -> T {
        self.dots[self.index(x, y)]
    }

    pub fn set_dot(&mut self, x: u32, y: u32, value: T) {
        let index = self.index(x, y);
        self.dots[index] = value;
    }

    pub fn fill_region(&mut self, region: Region, value: T) {
        let clipped = region.intersect(&self.bounds());
        for y in clipped.y..clipped.bottom() {
            for x in clipped.x..clipped.right() {
                self.set_dot(x, y, value);
            }
        }
    }

    /// Copies `region` into a freshly owned buffer. The caller owns the result
    /// outright, so concurrent tile workers never share a staging buffer.
    pub fn duplicate_region(&self, region: Region) -> Result<Image<T>> {
        if !region.fits_within(self.width, self.height) {
            return Err(Error::RegionOutOfBounds {
                region: region.to_string(),
                width: self.width,
                height: self.height,
            });
        }
        let mut dots = Vec::with_capacity(region.area());
        for y in region.y..region.bottom() {
            let row_start = self.index(region.x, y);
            dots.extend_from_slice(&self.dots[row_start..row_start + region.width as usize]);
        }
        Ok(Image {
            width: region.width,
            height: region.height,
            dots,
        })
    }
}

impl<T: Intensity> Image<T> {
    pub fn to_gray(&self) -> GrayImage {
        Image {
            width: self.width,
            height: self.height,
            dots: self.dots.iter().map(Intensity::intensity).collect(),
        }
    }
}

pub struct SeparateColorChannels {
    pub red: Vec<u8>,
    pub green: Vec<u8>,
    pub blue: Vec<u8>,
}

impl RgbImage {
    pub fn split_color_channels(&self) -> SeparateColorChannels {
        let capacity = self.dots.len();
        let mut red = Vec::with_capacity(capacity);
        let mut green = Vec::with_capacity(capacity);
        let mut blue = Vec::with_capacity(capacity);
        for dot in self.dots.iter() {
            red.push(dot.red);
            green.push(dot.green);
            blue.push(dot.blue);
        }
        SeparateColorChannels { red, green, blue }
    }
}

#[cfg(test)]
mod test {
    use super::{GrayImage, Image, Region, RgbImage};
    use crate::color::RGBColorFormat;

    #[rustfmt::skip]
    const TEST_CHANNEL_ONE: &[u8] = &[
         1,  2,  3,  4,
         5,  6,  7,  8,
         9, 10, 11, 12,
        13, 14, 15, 16,
    ];

    fn create_test_image() -> GrayImage {
        Image::from_dots(4, 4, Vec::from(TEST_CHANNEL_ONE)).unwrap()
    }

    #[test]
    fn from_dots_rejects_wrong_length() {
        let result = Image::from_dots(3, 3, vec![0_u8; 8]);
        assert!(result.is_err(), "Mismatch of size was not detected");
    }

    #[test]
    fn dot_is_row_major() {
        let image = create_test_image();
        assert_eq!(image.dot(2, 1), 7);
    }

    #[test]
    fn duplicate_region_copies_inner_square() {
        let image = create_test_image();
        let copy = image.duplicate_region(Region::new(1, 1, 2, 2)).unwrap();
        assert_eq!(copy.width(), 2);
        assert_eq!(copy.height(), 2);
        assert_eq!(copy.dots(), &[6, 7, 10, 11]);
    }

    #[test]
    fn duplicate_region_is_independent_of_source() {
        let image = create_test_image();
        let mut copy = image.duplicate_region(image.bounds()).unwrap();
        copy.set_dot(0, 0, 200);
        assert_eq!(image.dot(0, 0), 1, "Source must not change when the copy does");
    }

    #[test]
    fn duplicate_region_out_of_bounds() {
        let image = create_test_image();
        let result = image.duplicate_region(Region::new(3, 3, 2, 1));
        assert!(result.is_err(), "Region outside of image was not detected");
    }

    #[test]
    fn fill_region_clips_to_bounds() {
        let mut image = create_test_image();
        image.fill_region(Region::new(2, 2, 10, 10), 0);
        assert_eq!(image.dot(3, 3), 0);
        assert_eq!(image.dot(1, 1), 6);
    }

    #[test]
    fn split_color_channels() {
        let image: RgbImage = Image::from_dots(
            2,
            1,
            vec![RGBColorFormat::new(1, 2, 3), RGBColorFormat::new(4, 5, 6)],
        )
        .unwrap();
        let channels = image.split_color_channels();
        assert_eq!(channels.red, vec![1, 4]);
        assert_eq!(channels.green, vec![2, 5]);
        assert_eq!(channels.blue, vec![3, 6]);
    }

    #[test]
    fn to_gray_uses_channel_mean() {
        let image: RgbImage =
            Image::from_dots(1, 1, vec![RGBColorFormat::new(30, 60, 90)]).unwrap();
        assert_eq!(image.to_gray().dots(), &[60]);
    }
}
