//! End-to-end scenarios for the per-face alignment pipeline.

use facealign_core::{align_face, AlignOptions, AlignOutcome, SkipReason, LANDMARK_COUNT};
use image::{Rgb, RgbImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// 68 landmarks with the given eye centers and outer mouth corners, in
/// source-pixel coordinates (the half-pixel sanitization offset is undone
/// here so the tests can reason in plain pixels). Points the geometry never
/// reads sit at the origin.
fn landmarks(
    eye_left: [f64; 2],
    eye_right: [f64; 2],
    mouth_left: [f64; 2],
    mouth_right: [f64; 2],
) -> Vec<[f64; 2]> {
    let raw = |p: [f64; 2]| [p[0] - 0.5, p[1] - 0.5];
    let mut points = vec![[-0.5, -0.5]; LANDMARK_COUNT];
    for i in 36..42 {
        points[i] = raw(eye_left);
    }
    for i in 42..48 {
        points[i] = raw(eye_right);
    }
    points[48] = raw(mouth_left);
    points[54] = raw(mouth_right);
    points
}

fn gradient_image(size: u32) -> RgbImage {
    RgbImage::from_fn(size, size, |x, y| {
        Rgb([(x / 2).min(255) as u8, (y / 2).min(255) as u8, 128])
    })
}

/// Frontal face in a 512x512 gradient: level eyes 80px apart at y=216,
/// mouth corners at y=300. Crop size works out to 320, so no shrink and no
/// padding are needed.
fn frontal_setup() -> (RgbImage, Vec<[f64; 2]>) {
    let img = gradient_image(512);
    let lm = landmarks([216.0, 216.0], [296.0, 216.0], [236.0, 300.0], [276.0, 300.0]);
    (img, lm)
}

/// Face in a 128x128 image whose crop quad (size 192) extends well beyond
/// the raster on every side.
fn oversized_setup() -> (RgbImage, Vec<[f64; 2]>) {
    let img = RgbImage::from_fn(128, 128, |x, y| {
        Rgb([(x * 2).min(254) as u8, (y * 2).min(254) as u8, 128])
    });
    let lm = landmarks([40.0, 50.0], [88.0, 50.0], [50.0, 100.0], [78.0, 100.0]);
    (img, lm)
}

#[test]
fn frontal_face_aligns_centered_and_unrotated() {
    let (img, lm) = frontal_setup();
    let opts = AlignOptions {
        target_size: 256,
        supersampling: 1,
        enable_padding: false,
        ..AlignOptions::default()
    };
    let mut rng = StdRng::seed_from_u64(12345);
    let mut untouched = StdRng::seed_from_u64(12345);

    let out = match align_face(img, &lm, 1.0, &opts, &mut rng).unwrap() {
        AlignOutcome::Aligned(out) => out,
        AlignOutcome::Skipped(reason) => panic!("unexpected skip: {}", reason),
    };

    // No jitter requested, so the shared RNG must not have advanced.
    assert_eq!(rng.gen::<u64>(), untouched.gen::<u64>());

    assert_eq!(out.dimensions(), (256, 256));

    // The output center maps to the crop center (256, 224.4) in the source
    // gradient, i.e. roughly (128, 112, 128).
    let center = out.get_pixel(128, 128);
    assert!((center[0] as i32 - 128).abs() <= 6, "center was {:?}", center);
    assert!((center[1] as i32 - 112).abs() <= 6, "center was {:?}", center);

    // Unrotated: rows of the output sample rows of the source, so the green
    // ramp is constant along each row and increases down the image.
    let left = out.get_pixel(20, 128)[1] as i32;
    let right = out.get_pixel(236, 128)[1] as i32;
    assert!((left - right).abs() <= 3, "row not level: {} vs {}", left, right);
    let high = out.get_pixel(128, 20)[1] as i32;
    let low = out.get_pixel(128, 236)[1] as i32;
    assert!(low > high + 50, "no vertical ramp: {} vs {}", high, low);
}

#[test]
fn output_shape_is_fixed_for_awkward_sources() {
    // Source is neither square nor a multiple of anything convenient.
    let img = RgbImage::from_fn(100, 73, |x, y| Rgb([x as u8, y as u8, 7]));
    let lm = landmarks([30.0, 20.0], [60.0, 20.0], [38.0, 45.0], [52.0, 45.0]);
    let opts = AlignOptions {
        target_size: 96,
        supersampling: 4,
        ..AlignOptions::default()
    };
    let mut rng = StdRng::seed_from_u64(12345);

    match align_face(img, &lm, 1.0, &opts, &mut rng).unwrap() {
        AlignOutcome::Aligned(out) => assert_eq!(out.dimensions(), (96, 96)),
        AlignOutcome::Skipped(reason) => panic!("unexpected skip: {}", reason),
    }
}

#[test]
fn huge_crop_takes_the_shrink_path() {
    // Crop size 1200 against a 64px target forces an integer pre-shrink.
    let img = gradient_image(600);
    let lm = landmarks([150.0, 300.0], [450.0, 300.0], [260.0, 480.0], [340.0, 480.0]);
    let opts = AlignOptions {
        target_size: 64,
        supersampling: 1,
        ..AlignOptions::default()
    };
    let mut rng = StdRng::seed_from_u64(12345);

    match align_face(img, &lm, 1.0, &opts, &mut rng).unwrap() {
        AlignOutcome::Aligned(out) => assert_eq!(out.dimensions(), (64, 64)),
        AlignOutcome::Skipped(reason) => panic!("unexpected skip: {}", reason),
    }
}

#[test]
fn jittered_runs_are_reproducible_under_a_fixed_seed() {
    let opts = AlignOptions {
        target_size: 64,
        supersampling: 2,
        random_shift: 0.1,
        ..AlignOptions::default()
    };

    let render = || {
        let (img, lm) = oversized_setup();
        let mut rng = StdRng::seed_from_u64(777);
        match align_face(img, &lm, 1.0, &opts, &mut rng).unwrap() {
            AlignOutcome::Aligned(out) => out,
            AlignOutcome::Skipped(reason) => panic!("unexpected skip: {}", reason),
        }
    };

    let first = render();
    let second = render();
    assert_eq!(first.as_raw(), second.as_raw());
}

#[test]
fn impossible_retry_crops_skip_the_face() {
    // A 320px crop can never sit inside a 16x16 raster.
    let img = RgbImage::new(16, 16);
    let lm = landmarks([216.0, 216.0], [296.0, 216.0], [236.0, 300.0], [276.0, 300.0]);
    let opts = AlignOptions {
        target_size: 64,
        supersampling: 1,
        random_shift: 0.05,
        retry_crops: true,
        ..AlignOptions::default()
    };
    let mut rng = StdRng::seed_from_u64(12345);

    match align_face(img, &lm, 1.0, &opts, &mut rng).unwrap() {
        AlignOutcome::Skipped(SkipReason::ShiftRetriesExhausted) => {}
        other => panic!("expected skip, got {:?}", other),
    }
}

#[test]
fn short_landmark_sets_are_rejected_before_any_geometry() {
    let img = RgbImage::new(32, 32);
    let lm = vec![[1.0, 1.0]; 42];
    let mut rng = StdRng::seed_from_u64(12345);
    let err = align_face(img, &lm, 1.0, &AlignOptions::default(), &mut rng).unwrap_err();
    assert!(err.to_string().contains("68"));
}

#[test]
fn padding_fades_toward_the_median_not_the_mirror() {
    let (img, lm) = oversized_setup();
    let opts = AlignOptions {
        target_size: 64,
        supersampling: 1,
        enable_padding: true,
        ..AlignOptions::default()
    };
    let mut rng = StdRng::seed_from_u64(12345);

    let out = match align_face(img, &lm, 1.0, &opts, &mut rng).unwrap() {
        AlignOutcome::Aligned(out) => out,
        AlignOutcome::Skipped(reason) => panic!("unexpected skip: {}", reason),
    };
    assert_eq!(out.dimensions(), (64, 64));

    // The output's top-left corner lands deep in the synthesized padding.
    // Plain reflection would reproduce the dark left edge of the red ramp
    // (about 63); the blend must pull it toward the per-channel median
    // (about 128 for both ramps).
    let corner = out.get_pixel(0, 0);
    let red = corner[0] as i32;
    assert!(
        (red - 128).abs() < (red - 63).abs(),
        "corner red {} is closer to the mirror than to the median",
        red
    );
    let green = corner[1] as i32;
    assert!(green > 90, "corner green {} not pulled toward the median", green);
    // The flat blue channel must come through the blend unchanged.
    assert!((corner[2] as i32 - 128).abs() <= 3, "corner was {:?}", corner);
}

#[test]
fn axis_aligned_mode_ignores_face_tilt() {
    // Strongly tilted face; with rotate_level off the crop stays upright,
    // so output rows still sample source rows (level green ramp).
    let img = gradient_image(512);
    let lm = landmarks([200.0, 200.0], [276.0, 224.0], [216.0, 296.0], [256.0, 308.0]);
    let opts = AlignOptions {
        target_size: 128,
        supersampling: 1,
        enable_padding: false,
        rotate_level: false,
        ..AlignOptions::default()
    };
    let mut rng = StdRng::seed_from_u64(12345);

    let out = match align_face(img, &lm, 1.0, &opts, &mut rng).unwrap() {
        AlignOutcome::Aligned(out) => out,
        AlignOutcome::Skipped(reason) => panic!("unexpected skip: {}", reason),
    };
    let left = out.get_pixel(10, 64)[1] as i32;
    let right = out.get_pixel(118, 64)[1] as i32;
    assert!((left - right).abs() <= 3, "row not level: {} vs {}", left, right);
}
