//! ICC Profile Parser
//!
//! Validates the header and tag table, then decodes the tags the pipeline
//! compiler consumes: TRCs, colorants, A2B/B2A and cicp.

use super::error::IccError;
use super::header::IccHeader;
use super::tags::{self, Curve, read_a2b, read_b2a, read_cicp, read_curve, read_to_xyzd50};
use super::types::{ColorSpaceSignature, TagSignature};
use crate::math::Matrix3x3;
use crate::profile::IccProfile;

/// A2B/B2A lookup order used by [`IccProfile::parse`]: perceptual, then
/// relative colorimetric
pub const DEFAULT_A2B_PRIORITY: [i32; 2] = [0, 1];

/// Fill in the tag signature on errors raised by tag decoders
fn for_tag(signature: TagSignature) -> impl Fn(IccError) -> IccError {
    move |err| match err {
        IccError::InvalidTagType { type_sig, .. } => IccError::InvalidTagType {
            tag: signature.0,
            type_sig,
        },
        other => other,
    }
}

fn validate_tag_table(buffer: &[u8], tag_count: u32) -> Result<(), IccError> {
    let profile_size = buffer.len() as u32;
    for i in 0..tag_count {
        let entry = tags::tag_entry(buffer, i).ok_or(IccError::TagTableOverflow {
            tag_count,
            profile_size,
        })?;
        if entry.size < 4 {
            return Err(IccError::CorruptedData(format!(
                "tag {:08X} smaller than its type signature",
                entry.signature
            )));
        }
        if entry.offset as u64 + entry.size as u64 > profile_size as u64 {
            return Err(IccError::TagOutOfBounds {
                tag: entry.signature,
                offset: entry.offset,
                size: entry.size,
                profile_size,
            });
        }
    }
    Ok(())
}

impl<'a> IccProfile<'a> {
    /// Parse a profile, preferring the perceptual A2B/B2A tables
    ///
    /// The profile borrows `data`; no tag data is copied.
    pub fn parse(data: &'a [u8]) -> Result<Self, IccError> {
        Self::parse_with_a2b_priority(data, &DEFAULT_A2B_PRIORITY)
    }

    /// Parse a profile, taking the first present A2B/B2A tag in `priority`
    ///
    /// Each priority is a rendering intent in 0..=2. An out-of-range value is
    /// an error even if an earlier one matched nothing. A present tag that
    /// fails to decode fails the whole parse rather than falling through.
    pub fn parse_with_a2b_priority(data: &'a [u8], priority: &[i32]) -> Result<Self, IccError> {
        let header = IccHeader::parse(data)?;
        let buffer = &data[..header.size as usize];
        validate_tag_table(buffer, header.tag_count)?;

        let pcs = header.pcs;
        if pcs != ColorSpaceSignature::XYZ && pcs != ColorSpaceSignature::LAB {
            return Err(IccError::InvalidColorSpace(pcs.0));
        }

        let mut profile = IccProfile {
            buffer,
            size: header.size,
            data_color_space: header.data_color_space,
            pcs,
            tag_count: header.tag_count,
            trc: None,
            to_xyzd50: None,
            a2b: None,
            b2a: None,
            cicp: None,
        };

        let gray_trc = if header.data_color_space == ColorSpaceSignature::GRAY {
            profile.tag_by_signature(TagSignature::GRAY_TRC)
        } else {
            None
        };

        if let Some(ktrc) = gray_trc {
            let (curve, _) = read_curve(ktrc.data).map_err(for_tag(ktrc.signature))?;
            profile.trc = Some([curve; 3]);
            if pcs == ColorSpaceSignature::XYZ {
                let [x, y, z] = header.illuminant;
                profile.to_xyzd50 = Some(Matrix3x3::diagonal(x, y, z));
            }
        } else {
            let trc_tags = [TagSignature::RED_TRC, TagSignature::GREEN_TRC, TagSignature::BLUE_TRC]
                .map(|sig| profile.tag_by_signature(sig));
            if let [Some(r), Some(g), Some(b)] = trc_tags {
                let mut trc = [Curve::default(); 3];
                for (curve, tag) in trc.iter_mut().zip([r, g, b]) {
                    *curve = read_curve(tag.data).map_err(for_tag(tag.signature))?.0;
                }
                profile.trc = Some(trc);
            }

            let colorants = [
                TagSignature::RED_COLORANT,
                TagSignature::GREEN_COLORANT,
                TagSignature::BLUE_COLORANT,
            ]
            .map(|sig| profile.tag_by_signature(sig));
            if let [Some(r), Some(g), Some(b)] = colorants {
                profile.to_xyzd50 = Some(read_to_xyzd50(&r, &g, &b)?);
            }
        }

        for &intent in priority {
            let intent = u32::try_from(intent)
                .ok()
                .filter(|i| *i <= 2)
                .ok_or(IccError::InvalidRenderingIntent(intent))?;
            if let Some(tag) = profile.tag_by_signature(TagSignature::a2b(intent)) {
                profile.a2b = Some(read_a2b(tag.data, pcs).map_err(for_tag(tag.signature))?);
                break;
            }
        }

        for &intent in priority {
            let intent = u32::try_from(intent)
                .ok()
                .filter(|i| *i <= 2)
                .ok_or(IccError::InvalidRenderingIntent(intent))?;
            if let Some(tag) = profile.tag_by_signature(TagSignature::b2a(intent)) {
                profile.b2a = Some(read_b2a(tag.data, pcs).map_err(for_tag(tag.signature))?);
                break;
            }
        }

        if let Some(tag) = profile.tag_by_signature(TagSignature::CICP) {
            profile.cicp = Some(read_cicp(&tag)?);
        }

        if !profile.is_usable_as_source() {
            return Err(IccError::NotUsableAsSource);
        }

        tracing::trace!(
            size = profile.size,
            tags = profile.tag_count,
            color_space = %profile.data_color_space.to_fourcc(),
            pcs = %profile.pcs.to_fourcc(),
            has_trc = profile.trc.is_some(),
            has_a2b = profile.a2b.is_some(),
            has_b2a = profile.b2a.is_some(),
            "parsed ICC profile"
        );
        Ok(profile)
    }
}
