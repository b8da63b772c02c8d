//! Profile parsing against synthetic profiles
//!
//! Valid profiles must parse to the expected fields; truncated or corrupted
//! ones must fail cleanly.

use cms_tests::builder::{self, ProfileBuilder};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use skcms_core::icc::tags::Cicp;
use skcms_core::{
    IccError, IccProfile, TagSignature, TransferFunction, TypeSignature,
    approximately_equal_profiles, srgb_profile,
};

#[test]
fn test_parse_srgb_like() {
    let bytes = ProfileBuilder::srgb().build();
    let profile = IccProfile::parse(&bytes).unwrap();

    assert!(profile.is_usable_as_source());
    assert!(profile.is_usable_as_destination());
    assert!(profile.a2b.is_none());

    let m = profile.to_xyzd50.unwrap();
    let builtin = srgb_profile().to_xyzd50.unwrap();
    for r in 0..3 {
        for c in 0..3 {
            assert!((m.m[r][c] - builtin.m[r][c]).abs() < 1e-4, "{r},{c}");
        }
    }

    assert!(approximately_equal_profiles(&profile, srgb_profile()));
}

#[test]
fn test_truncated_profiles_fail() {
    let bytes = ProfileBuilder::srgb().build();
    for len in 0..bytes.len() {
        assert!(IccProfile::parse(&bytes[..len]).is_err(), "prefix {len} parsed");
    }
}

#[test]
fn test_corrupted_profiles_do_not_panic() {
    let bytes = ProfileBuilder::srgb().tag(b"cicp", builder::cicp(1, 13, 0, 1)).build();
    let mut rng = ChaCha8Rng::seed_from_u64(0x5eed);
    for _ in 0..2000 {
        let mut corrupted = bytes.clone();
        for _ in 0..rng.gen_range(1..4) {
            let at = rng.gen_range(128..corrupted.len());
            corrupted[at] = rng.r#gen();
        }
        let _ = IccProfile::parse(&corrupted);
    }
}

#[test]
fn test_tag_access() {
    let bytes = ProfileBuilder::srgb().build();
    let profile = IccProfile::parse(&bytes).unwrap();

    let first = profile.tag_by_index(0).unwrap();
    assert_eq!(first.signature, TagSignature::RED_COLORANT);
    assert_eq!(first.type_sig, TypeSignature::XYZ);
    assert!(profile.tag_by_index(6).is_none());

    let trc = profile.tag_by_signature(TagSignature::BLUE_TRC).unwrap();
    assert_eq!(trc.type_sig, TypeSignature::PARA);
    assert!(profile.tag_by_signature(TagSignature::CHAD).is_none());
}

#[test]
fn test_cicp_tag() {
    let bytes = ProfileBuilder::srgb().tag(b"cicp", builder::cicp(9, 16, 0, 1)).build();
    let profile = IccProfile::parse(&bytes).unwrap();
    assert_eq!(
        profile.cicp,
        Some(Cicp {
            color_primaries: 9,
            transfer_characteristics: 16,
            matrix_coefficients: 0,
            video_full_range_flag: 1,
        })
    );
}

#[test]
fn test_gray_profile() {
    let bytes = ProfileBuilder::new(b"GRAY").tag(b"kTRC", builder::curv_gamma(2.2)).build();
    let profile = IccProfile::parse(&bytes).unwrap();

    let trc = profile.trc.unwrap();
    assert_eq!(trc[0], trc[2]);
    let tf = trc[0].parametric().unwrap();
    assert!((tf.eval(0.5) - 0.5f32.powf(2.2)).abs() < 0.01);

    // Gray maps onto the PCS illuminant.
    let m = profile.to_xyzd50.unwrap();
    assert!((m.m[1][1] - 1.0).abs() < 1e-4);
    assert_eq!(m.m[0][1], 0.0);
}

#[test]
fn test_missing_colorants_is_unusable() {
    let bytes = ProfileBuilder::new(b"RGB ")
        .tag(b"rTRC", builder::curv_identity())
        .tag(b"gTRC", builder::curv_identity())
        .tag(b"bTRC", builder::curv_identity())
        .build();
    assert_eq!(IccProfile::parse(&bytes), Err(IccError::NotUsableAsSource));
}

#[test]
fn test_rejects_future_version() {
    let bytes = ProfileBuilder::srgb().version(5).build();
    assert_eq!(
        IccProfile::parse(&bytes),
        Err(IccError::UnsupportedVersion { major: 5 })
    );
}

#[test]
fn test_invalid_intent_priority() {
    let bytes = ProfileBuilder::srgb().build();
    assert_eq!(
        IccProfile::parse_with_a2b_priority(&bytes, &[0, 3]),
        Err(IccError::InvalidRenderingIntent(3))
    );
    assert!(IccProfile::parse_with_a2b_priority(&bytes, &[]).is_ok());
}

#[test]
fn test_wrong_curve_type_names_tag() {
    let bytes = ProfileBuilder::new(b"RGB ")
        .tag(b"rXYZ", builder::xyz(builder::SRGB_COLORANTS[0]))
        .tag(b"gXYZ", builder::xyz(builder::SRGB_COLORANTS[1]))
        .tag(b"bXYZ", builder::xyz(builder::SRGB_COLORANTS[2]))
        .tag(b"rTRC", builder::xyz([0.5; 3]))
        .tag(b"gTRC", builder::curv_identity())
        .tag(b"bTRC", builder::curv_identity())
        .build();
    assert_eq!(
        IccProfile::parse(&bytes),
        Err(IccError::InvalidTagType {
            tag: TagSignature::RED_TRC.0,
            type_sig: TypeSignature::XYZ.0,
        })
    );
}

#[test]
fn test_para_types_parse_as_srgbish() {
    for (function_type, params) in [
        (0u16, vec![2.2f32]),
        (1, vec![2.2, 1.0, 0.0]),
        (2, vec![2.2, 1.0, 0.0, 0.0]),
        (3, vec![2.4, 1.0 / 1.055, 0.055 / 1.055, 1.0 / 12.92, 0.04045]),
        (4, vec![2.4, 1.0 / 1.055, 0.055 / 1.055, 1.0 / 12.92, 0.04045, 0.0, 0.0]),
    ] {
        let bytes =
            ProfileBuilder::matrix_trc(builder::SRGB_COLORANTS, builder::para(function_type, &params))
                .build();
        let profile = IccProfile::parse(&bytes).unwrap();
        let tf = profile.trc.unwrap()[0];
        assert!(
            matches!(tf.parametric(), Some(TransferFunction::Srgbish(_))),
            "type {function_type}"
        );
        assert!(profile.is_usable_as_destination(), "type {function_type}");
    }
}
