use std::io::Read;

use super::super::{Image, RgbImage};
use super::ImageReader;
use crate::color::{RGBColorFormat, RangeColorFormat};
use crate::Error;

/// Reads plain and binary portable pixmaps (P3, P6) and graymaps (P2, P5).
/// Graymaps are expanded to RGB so every plate reaches the pipeline in the
/// same representation.
pub struct PPMImageReader<T: Read> {
    reader: T,
}

impl<T: Read> PPMImageReader<T> {
    pub fn new(reader: T) -> Self {
        Self { reader }
    }
}

impl<T: Read> ImageReader for PPMImageReader<T> {
    fn read_image(&mut self) -> crate::Result<RgbImage> {
        let header = {
            let mut tokenizer = PPMTokenizer::new(&mut self.reader);
            let mut parser = PPMParser::new(&mut tokenizer);
            let header = parser.parse_header()?;
            if !header.format.is_binary() {
                let dots = parser.parse_all_dots(header.format.components())?;
                return header.build_image(dots);
            }
            header
        };
        let dots = read_binary_dots(&mut self.reader, &header)?;
        header.build_image(dots)
    }
}

struct PPMTokenizer<'a, R: Read> {
    reader: &'a mut R,
    buffer: Vec<u8>,
}

impl<'a, R: Read> PPMTokenizer<'a, R> {
    pub fn new(reader: &'a mut R) -> Self {
        PPMTokenizer {
            reader,
            buffer: Vec::new(),
        }
    }
}

impl<R: Read> Iterator for PPMTokenizer<'_, R> {
    type Item = String;

    /// Consumes exactly one whitespace byte after a token, so a binary
    /// raster starts right after the max value token has been read.
    fn next(&mut self) -> Option<Self::Item> {
        self.buffer.clear();
        let mut byte = [0; 1];
        let mut in_comment = false;

        while self.reader.read(&mut byte).unwrap_or(0) > 0 {
            if in_comment {
                if byte[0] == b'\n' {
                    in_comment = false;
                }
                continue;
            }
            if byte[0] == b'#' {
                in_comment = true;
                continue;
            }
            if byte[0].is_ascii_whitespace() {
                if !self.buffer.is_empty() {
                    break;
                }
            } else {
                self.buffer.push(byte[0]);
            }
        }

        if self.buffer.is_empty() {
            return None;
        }

        Some(String::from_utf8_lossy(&self.buffer).into_owned())
    }
}

const MAGIC_NUMBER_TOKEN_NAME: &str = "Magic Number Header";
const WIDTH_HEADER_TOKEN_NAME: &str = "Width Header";
const HEIGHT_HEADER_TOKEN_NAME: &str = "Height Header";
const MAX_VALUE_HEADER_TOKEN_NAME: &str = "Max Value Header";
const COLOR_COMPONENT_VALUE_TOKEN_NAME: &str = "Color Component Value";

#[derive(Clone, Copy, Debug, PartialEq)]
enum PortableFormat {
    PlainGray,
    PlainColor,
    BinaryGray,
    BinaryColor,
}

impl PortableFormat {
    fn from_magic(magic: &str) -> crate::Result<Self> {
        match magic {
            "P2" => Ok(Self::PlainGray),
            "P3" => Ok(Self::PlainColor),
            "P5" => Ok(Self::BinaryGray),
            "P6" => Ok(Self::BinaryColor),
            other => Err(Error::UnsupportedMagicNumber(other.to_owned())),
        }
    }

    fn is_binary(&self) -> bool {
        matches!(self, Self::BinaryGray | Self::BinaryColor)
    }

    fn components(&self) -> usize {
        match self {
            Self::PlainGray | Self::BinaryGray => 1,
            Self::PlainColor | Self::BinaryColor => 3,
        }
    }
}

struct Header {
    format: PortableFormat,
    width: u32,
    height: u32,
    max_value: u16,
}

impl Header {
    fn number_of_dots(&self) -> usize {
        self.width as usize * self.height as usize
    }

    fn build_image(&self, dots: Vec<Dot>) -> crate::Result<RgbImage> {
        if dots.len() != self.number_of_dots() {
            return Err(Error::MismatchOfSizeBetweenHeaderAndValues);
        }
        let dots = dots
            .into_iter()
            .map(|d| RangeColorFormat::new(self.max_value, d.red(), d.green(), d.blue()))
            .map(|c| c.map(RGBColorFormat::from))
            .collect::<crate::Result<Vec<RGBColorFormat<u8>>>>()?;
        Image::from_dots(self.width, self.height, dots)
    }
}

#[derive(Clone, Copy)]
struct Dot {
    buffer: [u16; 3],
    index: usize,
    components: usize,
}

impl Dot {
    fn new(components: usize) -> Self {
        Self {
            buffer: [u16::default(); 3],
            index: 0,
            components,
        }
    }

    fn red(&self) -> u16 {
        self.buffer[0]
    }

    fn green(&self) -> u16 {
        self.buffer[self.components / 3]
    }

    fn blue(&self) -> u16 {
        self.buffer[2 * (self.components / 3)]
    }

    fn push_color_component(&mut self, component: u16) {
        if self.is_complete() {
            return;
        }
        self.buffer[self.index] = component;
        self.index += 1;
    }

    fn is_complete(&self) -> bool {
        self.index == self.components
    }

    fn reset(&mut self) {
        self.index = 0;
    }

    fn is_empty(&self) -> bool {
        self.index == 0
    }
}

struct PPMParser<'a, T> {
    tokenizer: &'a mut T,
}

impl<'a, T> PPMParser<'a, T>
where
    T: Iterator<Item = String>,
{
    fn new(tokenizer: &'a mut T) -> Self {
        Self { tokenizer }
    }

    fn parse_header(&mut self) -> crate::Result<Header> {
        let magic = self.next_token(MAGIC_NUMBER_TOKEN_NAME)?;
        let format = PortableFormat::from_magic(&magic)?;
        let width = self.parse_dimension(WIDTH_HEADER_TOKEN_NAME)?;
        let height = self.parse_dimension(HEIGHT_HEADER_TOKEN_NAME)?;
        let max_value = self.parse_max_value()?;
        Ok(Header {
            format,
            width,
            height,
            max_value,
        })
    }

    fn next_token(&mut self, token_name: &'static str) -> crate::Result<String> {
        self.tokenizer
            .next()
            .ok_or(Error::PPMFileDoesNotContainRequiredToken(token_name))
    }

    fn parse_dimension(&mut self, token_name: &'static str) -> crate::Result<u32> {
        self.next_token(token_name)?
            .parse()
            .map_err(|_| Error::ParsingOfTokenFailed(token_name))
    }

    fn parse_max_value(&mut self) -> crate::Result<u16> {
        let max_value: u32 = self
            .next_token(MAX_VALUE_HEADER_TOKEN_NAME)?
            .parse()
            .map_err(|_| Error::ParsingOfTokenFailed(MAX_VALUE_HEADER_TOKEN_NAME))?;
        if max_value == 0 || max_value > u16::MAX as u32 {
            return Err(Error::UnsupportedMaxValue(max_value));
        }
        Ok(max_value as u16)
    }

    fn parse_all_dots(&mut self, components: usize) -> crate::Result<Vec<Dot>> {
        let mut current_dot = Dot::new(components);
        let mut dots = Vec::new();
        for token in self.tokenizer.by_ref() {
            let component = Self::parse_color_value(&token)?;
            current_dot.push_color_component(component);
            if current_dot.is_complete() {
                dots.push(current_dot);
                current_dot.reset();
            }
        }
        Self::check_pixel_was_complete(&current_dot)?;
        Ok(dots)
    }

    fn check_pixel_was_complete(dot: &Dot) -> crate::Result<()> {
        if !dot.is_empty() {
            return Err(Error::IncompletePixelParsed(dot.index));
        }
        Ok(())
    }

    fn parse_color_value(token: &str) -> crate::Result<u16> {
        token
            .parse()
            .map_err(|_| Error::ParsingOfTokenFailed(COLOR_COMPONENT_VALUE_TOKEN_NAME))
    }
}

fn read_binary_dots<R: Read>(reader: &mut R, header: &Header) -> crate::Result<Vec<Dot>> {
    let components = header.format.components();
    let bytes_per_sample = if header.max_value > u8::MAX as u16 { 2 } else { 1 };
    let mut raster = vec![0_u8; header.number_of_dots() * components * bytes_per_sample];
    reader
        .read_exact(&mut raster)
        .map_err(Error::FailedToReadImageData)?;
    let dots = raster
        .chunks_exact(components * bytes_per_sample)
        .map(|pixel| {
            let mut dot = Dot::new(components);
            for sample in pixel.chunks_exact(bytes_per_sample) {
                let value = match sample {
                    [high, low] => u16::from_be_bytes([*high, *low]),
                    [single] => *single as u16,
                    _ => 0,
                };
                dot.push_color_component(value);
            }
            dot
        })
        .collect();
    Ok(dots)
}
