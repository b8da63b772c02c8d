//! ICC Profile Basic Types
//!
//! Four-character signatures and big-endian field readers. Readers take a
//! slice and an offset and return `None` when the field does not fit, so
//! callers never index past the data they were handed.

/// ICC Tag Signature (4-byte ASCII code)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TagSignature(pub u32);

impl TagSignature {
    /// Create from 4 ASCII characters
    pub const fn from_bytes(b: [u8; 4]) -> Self {
        Self(u32::from_be_bytes(b))
    }

    /// Convert to ASCII string (lossy)
    pub fn to_fourcc(&self) -> String {
        let bytes = self.0.to_be_bytes();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    pub const A2B0: Self = Self::from_bytes(*b"A2B0");
    pub const A2B1: Self = Self::from_bytes(*b"A2B1");
    pub const A2B2: Self = Self::from_bytes(*b"A2B2");
    pub const B2A0: Self = Self::from_bytes(*b"B2A0");
    pub const B2A1: Self = Self::from_bytes(*b"B2A1");
    pub const B2A2: Self = Self::from_bytes(*b"B2A2");
    pub const RED_COLORANT: Self = Self::from_bytes(*b"rXYZ");
    pub const GREEN_COLORANT: Self = Self::from_bytes(*b"gXYZ");
    pub const BLUE_COLORANT: Self = Self::from_bytes(*b"bXYZ");
    pub const RED_TRC: Self = Self::from_bytes(*b"rTRC");
    pub const GREEN_TRC: Self = Self::from_bytes(*b"gTRC");
    pub const BLUE_TRC: Self = Self::from_bytes(*b"bTRC");
    pub const GRAY_TRC: Self = Self::from_bytes(*b"kTRC");
    pub const CHAD: Self = Self::from_bytes(*b"chad");
    pub const MEDIA_WHITE: Self = Self::from_bytes(*b"wtpt");
    pub const CICP: Self = Self::from_bytes(*b"cicp");

    /// A2B tag for a rendering intent (0 perceptual, 1 relative, 2 saturation)
    pub const fn a2b(intent: u32) -> Self {
        Self(Self::A2B0.0 + intent)
    }

    /// B2A tag for a rendering intent
    pub const fn b2a(intent: u32) -> Self {
        Self(Self::B2A0.0 + intent)
    }
}

/// Type signatures for ICC tag data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeSignature(pub u32);

impl TypeSignature {
    pub const fn from_bytes(b: [u8; 4]) -> Self {
        Self(u32::from_be_bytes(b))
    }

    pub const XYZ: Self = Self::from_bytes(*b"XYZ ");
    pub const CURVE: Self = Self::from_bytes(*b"curv");
    pub const PARA: Self = Self::from_bytes(*b"para");
    pub const LUT8: Self = Self::from_bytes(*b"mft1");
    pub const LUT16: Self = Self::from_bytes(*b"mft2");
    pub const LUTA2B: Self = Self::from_bytes(*b"mAB ");
    pub const LUTB2A: Self = Self::from_bytes(*b"mBA ");
    pub const SF32: Self = Self::from_bytes(*b"sf32");
    pub const CICP: Self = Self::from_bytes(*b"cicp");
}

/// Data and connection color space signatures (header bytes 16 and 20)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorSpaceSignature(pub u32);

impl ColorSpaceSignature {
    pub const fn from_bytes(b: [u8; 4]) -> Self {
        Self(u32::from_be_bytes(b))
    }

    /// Convert to ASCII string (lossy)
    pub fn to_fourcc(&self) -> String {
        String::from_utf8_lossy(&self.0.to_be_bytes()).into_owned()
    }

    pub const RGB: Self = Self::from_bytes(*b"RGB ");
    pub const CMYK: Self = Self::from_bytes(*b"CMYK");
    pub const GRAY: Self = Self::from_bytes(*b"GRAY");
    pub const XYZ: Self = Self::from_bytes(*b"XYZ ");
    pub const LAB: Self = Self::from_bytes(*b"Lab ");
}

/// Profile file signature - must be 'acsp'
pub const PROFILE_SIGNATURE: u32 = u32::from_be_bytes(*b"acsp");

#[inline]
fn array<const N: usize>(data: &[u8], offset: usize) -> Option<[u8; N]> {
    let end = offset.checked_add(N)?;
    data.get(offset..end)?.try_into().ok()
}

/// Read a big-endian u16
#[inline]
pub fn read_u16(data: &[u8], offset: usize) -> Option<u16> {
    array::<2>(data, offset).map(u16::from_be_bytes)
}

/// Read a big-endian u32
#[inline]
pub fn read_u32(data: &[u8], offset: usize) -> Option<u32> {
    array::<4>(data, offset).map(u32::from_be_bytes)
}

/// Read a byte
#[inline]
pub fn read_u8(data: &[u8], offset: usize) -> Option<u8> {
    data.get(offset).copied()
}

/// Read an s15Fixed16Number as f32 (`i32 × 1/65536`)
#[inline]
pub fn read_s15fixed16(data: &[u8], offset: usize) -> Option<f32> {
    array::<4>(data, offset).map(|b| i32::from_be_bytes(b) as f32 * (1.0 / 65536.0))
}

/// Read three consecutive s15Fixed16 values
#[inline]
pub fn read_xyz_number(data: &[u8], offset: usize) -> Option<[f32; 3]> {
    Some([
        read_s15fixed16(data, offset)?,
        read_s15fixed16(data, offset + 4)?,
        read_s15fixed16(data, offset + 8)?,
    ])
}
