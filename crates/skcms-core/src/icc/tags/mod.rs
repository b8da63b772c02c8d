//! ICC Tag Parsing
//!
//! The tag table follows the 128-byte header: a u32 count, then 12-byte
//! entries of (signature, offset, size). Tags are decoded lazily from the
//! borrowed profile bytes.

mod cicp;
mod curves;
mod lut;
mod xyz;

pub use cicp::{Cicp, read_cicp};
pub use curves::{Curve, read_curve, read_curves};
pub use lut::{A2B, B2A, Clut, ClutStage, Grid, MatrixStage, read_a2b, read_b2a};
pub use xyz::{read_sf32_matrix, read_to_xyzd50, read_xyz};

use super::types::{TagSignature, TypeSignature, read_u32};

/// Byte offset of the first tag table entry
pub const TAG_TABLE_OFFSET: usize = 132;

/// Bytes per tag table entry
pub const TAG_ENTRY_SIZE: usize = 12;

/// A tag resolved against the profile bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IccTag<'a> {
    pub signature: TagSignature,
    /// First four bytes of the tag data
    pub type_sig: TypeSignature,
    pub size: u32,
    /// The full tag body, type signature included
    pub data: &'a [u8],
}

/// Raw tag table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TagEntry {
    pub signature: u32,
    pub offset: u32,
    pub size: u32,
}

/// Read tag table entry `index` from the profile bytes
pub(crate) fn tag_entry(profile: &[u8], index: u32) -> Option<TagEntry> {
    let base = TAG_TABLE_OFFSET.checked_add((index as usize).checked_mul(TAG_ENTRY_SIZE)?)?;
    Some(TagEntry {
        signature: read_u32(profile, base)?,
        offset: read_u32(profile, base + 4)?,
        size: read_u32(profile, base + 8)?,
    })
}

/// Resolve tag `index`; `None` when the index or its byte range is out of bounds
pub(crate) fn tag_at(profile: &[u8], tag_count: u32, index: u32) -> Option<IccTag<'_>> {
    if index >= tag_count {
        return None;
    }
    let entry = tag_entry(profile, index)?;
    let start = entry.offset as usize;
    let end = start.checked_add(entry.size as usize)?;
    let data = profile.get(start..end)?;
    Some(IccTag {
        signature: TagSignature(entry.signature),
        type_sig: TypeSignature(read_u32(data, 0)?),
        size: entry.size,
        data,
    })
}

/// First tag with `signature`
pub(crate) fn find_tag(profile: &[u8], tag_count: u32, signature: TagSignature) -> Option<IccTag<'_>> {
    (0..tag_count)
        .filter_map(|i| tag_at(profile, tag_count, i))
        .find(|tag| tag.signature == signature)
}
