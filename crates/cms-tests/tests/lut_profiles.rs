//! A2B/B2A pipelines, CMYK, gray and Lab profiles

use cms_tests::builder::{self, LutAb, ProfileBuilder};
use cms_tests::parity::{Endpoint, check_backend_parity};
use skcms_core::{
    AlphaFormat, IccError, IccProfile, PixelFormat, approximately_equal_profiles, srgb_profile,
    transform, xyzd50_profile,
};

fn rgb_identity_a2b() -> Vec<u8> {
    ProfileBuilder::new(b"RGB ")
        .tag(b"A2B0", builder::mft2(3, 3, 2, |c| c.to_vec()))
        .build()
}

/// CMYK profile: device values pass through as inverted CMY, K is ignored
fn cmyk_profile() -> Vec<u8> {
    ProfileBuilder::new(b"CMYK")
        .tag(b"A2B0", builder::mft2(4, 3, 2, |c| c[..3].to_vec()))
        .tag(b"B2A0", builder::mft2(3, 4, 2, |c| vec![c[0], c[1], c[2], 0.0]))
        .build()
}

fn convert(
    src: &[u8],
    from: PixelFormat,
    from_profile: &IccProfile<'_>,
    to: PixelFormat,
    to_profile: &IccProfile<'_>,
) -> Vec<u8> {
    let n = src.len() / from.bytes_per_pixel();
    let mut dst = vec![0u8; n * to.bytes_per_pixel()];
    transform(
        src,
        from,
        AlphaFormat::Unpremul,
        Some(from_profile),
        &mut dst,
        to,
        AlphaFormat::Unpremul,
        Some(to_profile),
        n,
    )
    .unwrap();
    dst
}

fn f32s(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

#[test]
fn test_identity_a2b_matches_xyz_profile() {
    let bytes = rgb_identity_a2b();
    let profile = IccProfile::parse(&bytes).unwrap();
    assert!(profile.a2b.is_some());
    assert!(profile.trc.is_none());
    assert!(!profile.is_usable_as_destination());

    let src: Vec<u8> = (0..=255).step_by(5).flat_map(|v| [v, 255 - v, v / 2]).collect();
    let dst = convert(&src, PixelFormat::Rgb888, &profile, PixelFormat::Rgb888, xyzd50_profile());
    for (a, b) in src.iter().zip(&dst) {
        assert!(a.abs_diff(*b) <= 1, "{a} vs {b}");
    }
    assert!(approximately_equal_profiles(&profile, xyzd50_profile()));
}

#[test]
fn test_cmyk_source() {
    let bytes = cmyk_profile();
    let profile = IccProfile::parse(&bytes).unwrap();
    assert!(profile.is_cmyk());
    assert_eq!(profile.a2b.unwrap().input_channels(), 4);

    let src = [0u8, 0, 0, 0, 255, 0, 0, 0, 0, 0, 128, 200];
    let dst = convert(&src, PixelFormat::Rgba8888, &profile, PixelFormat::Rgb888, xyzd50_profile());
    assert_eq!(&dst[..6], [255, 255, 255, 0, 255, 255]);
    assert!(dst[8].abs_diff(127) <= 1, "{dst:?}");

    assert!(!approximately_equal_profiles(&profile, srgb_profile()));
}

#[test]
fn test_cmyk_destination_through_b2a() {
    let bytes = cmyk_profile();
    let profile = IccProfile::parse(&bytes).unwrap();
    assert_eq!(profile.b2a.unwrap().output_channels(), 4);
    assert!(profile.is_usable_as_destination());

    let dst = convert(&[255, 0, 0], PixelFormat::Rgb888, xyzd50_profile(), PixelFormat::Rgba8888, &profile);
    assert_eq!(dst, [0, 255, 255, 255]);
}

#[test]
fn test_cmyk_backend_parity() {
    let bytes = cmyk_profile();
    let profile = IccProfile::parse(&bytes).unwrap();
    let src: Vec<u8> = (0..4 * 61).map(|i| (i * 29 % 256) as u8).collect();
    check_backend_parity(
        &src,
        Endpoint::new(PixelFormat::Rgba8888, Some(&profile)),
        Endpoint::new(PixelFormat::RgbaFfff, Some(srgb_profile())),
    )
    .unwrap();
}

#[test]
fn test_lab_pcs_white() {
    let white = 128.0 / 255.0;
    let bytes = ProfileBuilder::new(b"RGB ")
        .pcs(b"Lab ")
        .tag(b"A2B0", builder::mft2(3, 3, 2, move |_| vec![1.0, white, white]))
        .build();
    let profile = IccProfile::parse(&bytes).unwrap();

    let dst = convert(&[10, 20, 30], PixelFormat::Rgb888, &profile, PixelFormat::RgbFff, xyzd50_profile());
    let xyz = f32s(&dst);
    for (v, d50) in xyz.iter().zip([0.9642, 1.0, 0.8249]) {
        assert!((v - d50).abs() < 0.002, "{xyz:?}");
    }
}

#[test]
fn test_a2b_priority() {
    let bytes = ProfileBuilder::new(b"RGB ")
        .tag(b"A2B1", builder::mft2(3, 3, 2, |c| c.to_vec()))
        .build();
    assert!(IccProfile::parse(&bytes).unwrap().a2b.is_some());
    assert_eq!(
        IccProfile::parse_with_a2b_priority(&bytes, &[0]),
        Err(IccError::NotUsableAsSource)
    );
    assert!(IccProfile::parse_with_a2b_priority(&bytes, &[2, 1]).is_ok());
}

#[test]
fn test_gray_destination() {
    let bytes = ProfileBuilder::new(b"GRAY").tag(b"kTRC", builder::curv_identity()).build();
    let gray = IccProfile::parse(&bytes).unwrap();

    let dst = convert(&[255, 255, 255, 0, 0, 0], PixelFormat::Rgb888, srgb_profile(), PixelFormat::G8, &gray);
    assert!(dst[0] >= 254, "{dst:?}");
    assert_eq!(dst[1], 0);
}

#[test]
fn test_gray_source() {
    let bytes = ProfileBuilder::new(b"GRAY").tag(b"kTRC", builder::curv_gamma(2.2)).build();
    let gray = IccProfile::parse(&bytes).unwrap();

    let dst = convert(&[255, 0], PixelFormat::G8, &gray, PixelFormat::Rgb888, srgb_profile());
    for &v in &dst[..3] {
        assert!(v >= 253, "{dst:?}");
    }
    assert_eq!(&dst[3..], [0, 0, 0]);
}

#[test]
fn test_lut_without_trc_is_not_a_matrix_destination() {
    let bytes = rgb_identity_a2b();
    let mut profile = IccProfile::parse(&bytes).unwrap();
    assert!(profile.make_usable_as_destination().is_err());

    let mut dst = [0u8; 3];
    let err = transform(
        &[1, 2, 3],
        PixelFormat::Rgb888,
        AlphaFormat::Unpremul,
        None,
        &mut dst,
        PixelFormat::Rgb888,
        AlphaFormat::Unpremul,
        Some(&profile),
        1,
    )
    .unwrap_err();
    assert_eq!(err, skcms_core::Error::UnusableDestination);
}

#[test]
fn test_cmyk_k_channel_is_not_alpha() {
    // Every output channel is K.
    let bytes = ProfileBuilder::new(b"CMYK")
        .tag(b"A2B0", builder::mft2(4, 3, 2, |c| vec![c[3]; 3]))
        .build();
    let profile = IccProfile::parse(&bytes).unwrap();

    for alpha in [AlphaFormat::Opaque, AlphaFormat::PremulAsEncoded, AlphaFormat::Unpremul] {
        let mut dst = [0u8; 3];
        transform(
            &[255, 255, 255, 55],
            PixelFormat::Rgba8888,
            alpha,
            Some(&profile),
            &mut dst,
            PixelFormat::Rgb888,
            AlphaFormat::Unpremul,
            Some(xyzd50_profile()),
            1,
        )
        .unwrap();
        for v in dst {
            assert!(v.abs_diff(200) <= 1, "{alpha:?}: {dst:?}");
        }
    }
}

#[test]
fn test_mab_clut_source() {
    let a2b = LutAb::mab(3)
        .clut(&[2, 2, 2], |c| vec![c[2], c[1], c[0]])
        .a_curves(3)
        .build();
    let bytes = ProfileBuilder::new(b"RGB ").tag(b"A2B0", a2b).build();
    let profile = IccProfile::parse(&bytes).unwrap();
    assert!(profile.a2b.unwrap().clut_stage.is_some());

    let src = [10u8, 20, 200, 255, 0, 0];
    let dst = convert(&src, PixelFormat::Rgb888, &profile, PixelFormat::Rgb888, xyzd50_profile());
    for (a, b) in dst.iter().zip([200u8, 20, 10, 0, 0, 255]) {
        assert!(a.abs_diff(b) <= 1, "{dst:?}");
    }

    let src: Vec<u8> = (0..3 * 37).map(|i| (i * 53 % 256) as u8).collect();
    check_backend_parity(
        &src,
        Endpoint::new(PixelFormat::Rgb888, Some(&profile)),
        Endpoint::new(PixelFormat::RgbaFfff, Some(srgb_profile())),
    )
    .unwrap();
}

#[test]
fn test_mab_zero_input_clut_is_skipped() {
    let a2b = LutAb::mab(0)
        .clut(&[], |_| vec![200.0 / 255.0, 100.0 / 255.0, 50.0 / 255.0])
        .a_curves(0)
        .build();
    let bytes = ProfileBuilder::new(b"RGB ").tag(b"A2B0", a2b).build();
    let profile = IccProfile::parse(&bytes).unwrap();
    assert!(profile.a2b.unwrap().clut_stage.is_none());

    let dst = convert(&[10, 20, 30], PixelFormat::Rgb888, &profile, PixelFormat::Rgb888, xyzd50_profile());
    for (a, b) in dst.iter().zip([10u8, 20, 30]) {
        assert!(a.abs_diff(b) <= 1, "{dst:?}");
    }
}

#[test]
fn test_cmyk_destination_through_mba() {
    let b2a = LutAb::mba(4)
        .clut(&[2, 2, 2], |c| vec![c[0], c[1], c[2], 0.0])
        .a_curves(4)
        .build();
    let bytes = ProfileBuilder::new(b"CMYK")
        .tag(b"A2B0", builder::mft2(4, 3, 2, |c| c[..3].to_vec()))
        .tag(b"B2A0", b2a)
        .build();
    let profile = IccProfile::parse(&bytes).unwrap();
    assert_eq!(profile.b2a.unwrap().output_channels(), 4);

    let src = [255, 0, 0, 0, 255, 0];
    let dst = convert(&src, PixelFormat::Rgb888, xyzd50_profile(), PixelFormat::Rgba8888, &profile);
    assert_eq!(dst, [0, 255, 255, 255, 255, 0, 255, 255]);
}

