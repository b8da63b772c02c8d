//! Transforms running concurrently on many threads

use cms_tests::{TestPattern, encode_pattern, generate_pattern};
use rayon::prelude::*;
use skcms_core::{AlphaFormat, Backend, PixelFormat, cpu_type, transform, xyzd50_profile};

const CHUNK_PIXELS: usize = 97;

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn convert(src: &[u8], dst: &mut [u8]) {
    let n = src.len() / 4;
    transform(
        src,
        PixelFormat::Rgba8888,
        AlphaFormat::Unpremul,
        None,
        dst,
        PixelFormat::RgbaFfff,
        AlphaFormat::Unpremul,
        Some(xyzd50_profile()),
        n,
    )
    .unwrap();
}

#[test]
fn test_parallel_matches_sequential() {
    init_logging();
    let src = encode_pattern(&generate_pattern(TestPattern::Random(1), 64 * CHUNK_PIXELS), PixelFormat::Rgba8888).unwrap();

    let mut sequential = vec![0u8; src.len() * 4];
    for (s, d) in src
        .chunks(4 * CHUNK_PIXELS)
        .zip(sequential.chunks_mut(16 * CHUNK_PIXELS))
    {
        convert(s, d);
    }

    let mut parallel = vec![0u8; src.len() * 4];
    src.par_chunks(4 * CHUNK_PIXELS)
        .zip(parallel.par_chunks_mut(16 * CHUNK_PIXELS))
        .for_each(|(s, d)| convert(s, d));

    assert_eq!(parallel, sequential);
}

#[test]
fn test_detection_is_shared_across_threads() {
    init_logging();
    let detected: Vec<_> = (0..32).into_par_iter().map(|_| cpu_type()).collect();
    assert!(detected.iter().all(|&cpu| cpu == detected[0]));
    assert_eq!(Backend::from(detected[0]), Backend::detected());
}
