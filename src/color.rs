use crate::error::Error;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RGBColorFormat<T> {
    pub red: T,
    pub green: T,
    pub blue: T,
}

pub struct RangeColorFormat<T> {
    max: T,
    red: T,
    green: T,
    blue: T,
}

/// Single channel brightness of a dot, used wherever a stage needs a gray view.
pub trait Intensity {
    fn intensity(&self) -> u8;
}

impl Intensity for u8 {
    fn intensity(&self) -> u8 {
        *self
    }
}

impl Intensity for RGBColorFormat<u8> {
    /// Unweighted channel mean, truncated.
    fn intensity(&self) -> u8 {
        let sum = self.red as u16 + self.green as u16 + self.blue as u16;
        (sum / 3) as u8
    }
}

impl RGBColorFormat<u8> {
    pub fn new(red: u8, green: u8, blue: u8) -> Self {
        RGBColorFormat { red, green, blue }
    }

    pub fn gray(value: u8) -> Self {
        RGBColorFormat {
            red: value,
            green: value,
            blue: value,
        }
    }

    pub fn black() -> Self {
        RGBColorFormat::default()
    }
}

impl From<&RangeColorFormat<u16>> for RGBColorFormat<u8> {
    fn from(value: &RangeColorFormat<u16>) -> Self {
        RGBColorFormat {
            red: rescale_to_byte(value.red, value.max),
            green: rescale_to_byte(value.green, value.max),
            blue: rescale_to_byte(value.blue, value.max),
        }
    }
}

impl From<RangeColorFormat<u16>> for RGBColorFormat<u8> {
    fn from(value: RangeColorFormat<u16>) -> Self {
        RGBColorFormat::from(&value)
    }
}

impl RangeColorFormat<u16> {
    pub fn new(max: u16, red: u16, green: u16, blue: u16) -> crate::Result<Self> {
        for component in [red, green, blue] {
            if component > max {
                return Err(Error::ColorValueExceedsMaxValue(component, max));
            }
        }
        Ok(RangeColorFormat {
            max,
            red,
            green,
            blue,
        })
    }
}

fn rescale_to_byte(value: u16, max: u16) -> u8 {
    if max == u8::MAX as u16 {
        return value as u8;
    }
    let max = max as u32;
    ((value as u32 * 255 + max / 2) / max) as u8
}
