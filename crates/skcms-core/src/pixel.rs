//! Pixel formats and alpha handling
//!
//! Numeric codes follow the classic layout where the low bit selects BGR
//! channel order and `code >> 1` selects the storage layout. Packed formats
//! are little-endian words; `*Le`/`*Be` name the byte order of 16-bit
//! channels; half and float formats are little-endian IEEE values.

use crate::error::{Error, Result};

/// Memory layout of one pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u32)]
pub enum PixelFormat {
    A8 = 0,
    G8 = 2,
    Rgb565 = 4,
    Bgr565 = 5,
    Abgr4444 = 6,
    Argb4444 = 7,
    Rgb888 = 8,
    Bgr888 = 9,
    Rgba8888 = 10,
    Bgra8888 = 11,
    /// 8888 with the sRGB curve applied on load and store
    Rgba8888Srgb = 12,
    Bgra8888Srgb = 13,
    Rgba1010102 = 14,
    Bgra1010102 = 15,
    Rgb161616Le = 16,
    Bgr161616Le = 17,
    Rgba16161616Le = 18,
    Bgra16161616Le = 19,
    Rgb161616Be = 20,
    Bgr161616Be = 21,
    Rgba16161616Be = 22,
    Bgra16161616Be = 23,
    /// Half floats clamped to [0, 1] on load and store
    RgbHhhNorm = 24,
    BgrHhhNorm = 25,
    RgbaHhhhNorm = 26,
    BgraHhhhNorm = 27,
    RgbHhh = 28,
    BgrHhh = 29,
    RgbaHhhh = 30,
    BgraHhhh = 31,
    RgbFff = 32,
    BgrFff = 33,
    RgbaFfff = 34,
    BgraFfff = 35,
    /// Extended-range 10-bit channels, unclamped
    Rgb101010xXr = 36,
    Bgr101010xXr = 37,
}

/// Storage layout shared by an RGB/BGR format pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Layout {
    A8,
    G8,
    P565,
    P4444,
    P888,
    P8888,
    P8888Srgb,
    P1010102,
    P161616Le,
    P16161616Le,
    P161616Be,
    P16161616Be,
    HhhNorm,
    HhhhNorm,
    Hhh,
    Hhhh,
    Fff,
    Ffff,
    P101010xXr,
}

impl PixelFormat {
    const ALL: [Self; 36] = [
        Self::A8,
        Self::G8,
        Self::Rgb565,
        Self::Bgr565,
        Self::Abgr4444,
        Self::Argb4444,
        Self::Rgb888,
        Self::Bgr888,
        Self::Rgba8888,
        Self::Bgra8888,
        Self::Rgba8888Srgb,
        Self::Bgra8888Srgb,
        Self::Rgba1010102,
        Self::Bgra1010102,
        Self::Rgb161616Le,
        Self::Bgr161616Le,
        Self::Rgba16161616Le,
        Self::Bgra16161616Le,
        Self::Rgb161616Be,
        Self::Bgr161616Be,
        Self::Rgba16161616Be,
        Self::Bgra16161616Be,
        Self::RgbHhhNorm,
        Self::BgrHhhNorm,
        Self::RgbaHhhhNorm,
        Self::BgraHhhhNorm,
        Self::RgbHhh,
        Self::BgrHhh,
        Self::RgbaHhhh,
        Self::BgraHhhh,
        Self::RgbFff,
        Self::BgrFff,
        Self::RgbaFfff,
        Self::BgraFfff,
        Self::Rgb101010xXr,
        Self::Bgr101010xXr,
    ];

    /// Every distinct format
    pub fn all() -> &'static [Self] {
        &Self::ALL
    }

    /// Format for a numeric code
    ///
    /// Codes 1 and 3 alias A8 and G8, whose channel swap is a no-op.
    pub fn from_u32(code: u32) -> Result<Self> {
        match code {
            1 => Ok(Self::A8),
            3 => Ok(Self::G8),
            _ => Self::ALL
                .iter()
                .copied()
                .find(|f| *f as u32 == code)
                .ok_or(Error::UnknownPixelFormat(code)),
        }
    }

    /// True for the BGR-ordered member of a format pair
    #[inline]
    pub fn is_bgr(self) -> bool {
        self as u32 & 1 == 1
    }

    pub(crate) fn layout(self) -> Layout {
        match self as u32 >> 1 {
            0 => Layout::A8,
            1 => Layout::G8,
            2 => Layout::P565,
            3 => Layout::P4444,
            4 => Layout::P888,
            5 => Layout::P8888,
            6 => Layout::P8888Srgb,
            7 => Layout::P1010102,
            8 => Layout::P161616Le,
            9 => Layout::P16161616Le,
            10 => Layout::P161616Be,
            11 => Layout::P16161616Be,
            12 => Layout::HhhNorm,
            13 => Layout::HhhhNorm,
            14 => Layout::Hhh,
            15 => Layout::Hhhh,
            16 => Layout::Fff,
            17 => Layout::Ffff,
            _ => Layout::P101010xXr,
        }
    }

    /// Bytes occupied by one pixel
    pub fn bytes_per_pixel(self) -> usize {
        match self.layout() {
            Layout::A8 | Layout::G8 => 1,
            Layout::P565 | Layout::P4444 => 2,
            Layout::P888 => 3,
            Layout::P8888 | Layout::P8888Srgb | Layout::P1010102 | Layout::P101010xXr => 4,
            Layout::P161616Le | Layout::P161616Be | Layout::HhhNorm | Layout::Hhh => 6,
            Layout::P16161616Le | Layout::P16161616Be | Layout::HhhhNorm | Layout::Hhhh => 8,
            Layout::Fff => 12,
            Layout::Ffff => 16,
        }
    }

    /// True if values are clamped to [0, 1] before storing in this format
    ///
    /// Unnormalized half, float and extended-range formats keep out-of-range
    /// values.
    pub fn clamps_on_store(self) -> bool {
        (self as u32) < Self::RgbHhh as u32
    }
}

/// How alpha is represented in pixel data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AlphaFormat {
    /// Alpha is ignored and treated as 1
    Opaque,
    /// Color is independent of alpha
    #[default]
    Unpremul,
    /// Color is premultiplied by alpha in the encoded space
    PremulAsEncoded,
}
