//! End-to-end pipeline test on a small synthetic scene.
//!
//! A 100x100 scene split into four 50x50 quadrants: top-left and
//! bottom-right are vegetation-like (high NIR, low red), the other two
//! are bare-ground-like. Ten points per class, three trees, fixed seed.

use vegclass_algorithms::classify::{classify_scene, PipelineParams};
use vegclass_algorithms::imagery::SourceBands;
use vegclass_core::io::read_geotiff;
use vegclass_core::points::GeoPoint;
use vegclass_core::{GeoTransform, Raster};

const ROWS: usize = 100;
const COLS: usize = 100;

fn is_vegetation(row: usize, col: usize) -> bool {
    (row < ROWS / 2) == (col < COLS / 2)
}

fn make_scene() -> SourceBands {
    let gt = GeoTransform::new(400_000.0, 4_000_000.0, 1.0, -1.0);
    let mut band = |veg: f32, bare: f32| {
        let mut r: Raster<f32> = Raster::new(ROWS, COLS);
        r.set_transform(gt);
        for row in 0..ROWS {
            for col in 0..COLS {
                let base = if is_vegetation(row, col) { veg } else { bare };
                // Deterministic jitter so no feature is constant per class
                let jitter = ((row * 31 + col * 17) % 13) as f32 * 0.1;
                r.set(row, col, base + jitter).unwrap();
            }
        }
        r
    };
    SourceBands {
        red: band(20.0, 120.0),
        green: band(40.0, 110.0),
        blue: band(30.0, 100.0),
        nir: band(200.0, 40.0),
    }
}

/// Map coordinate slightly inside pixel (row, col), so rounding the
/// inverse transform recovers exactly that pixel.
fn point_at(gt: &GeoTransform, row: usize, col: usize) -> GeoPoint {
    GeoPoint {
        x: gt.origin_x + (col as f64 + 0.3) * gt.pixel_width,
        y: gt.origin_y + (row as f64 + 0.3) * gt.pixel_height,
    }
}

#[test]
fn checkerboard_scene_classifies_correctly() {
    let scene = make_scene();
    let gt = *scene.red.transform();

    // Ten points per class, all at least 20 pixels from the quadrant
    // boundaries so the blurred background bands stay unmixed
    let veg_pixels = [
        (10, 10), (25, 25), (12, 28), (28, 12), (28, 8),
        (70, 70), (85, 85), (72, 90), (90, 72), (78, 72),
    ];
    let bare_pixels = [
        (10, 70), (25, 85), (12, 90), (28, 72), (8, 72),
        (70, 10), (85, 25), (72, 28), (90, 12), (78, 8),
    ];
    let vegetation: Vec<GeoPoint> = veg_pixels.iter().map(|&(r, c)| point_at(&gt, r, c)).collect();
    let background: Vec<GeoPoint> = bare_pixels.iter().map(|&(r, c)| point_at(&gt, r, c)).collect();

    let out_dir = tempfile::tempdir().unwrap();
    let outputs = classify_scene(
        scene,
        None,
        &vegetation,
        &background,
        out_dir.path(),
        &PipelineParams::default(),
    )
    .unwrap();

    // All three artifacts exist
    assert!(outputs.classification.exists());
    assert!(outputs.quicklook.exists());
    assert!(outputs.training_table.exists());

    // Training table: header plus all 20 points
    let table = std::fs::read_to_string(&outputs.training_table).unwrap();
    assert_eq!(table.lines().count(), 21);

    // The written GeoTIFF round-trips to the in-memory result exactly
    let on_disk: Raster<u8> = read_geotiff(&outputs.classification).unwrap();
    assert_eq!(on_disk.shape(), (ROWS, COLS));
    assert_eq!(on_disk.data(), outputs.raster.data());

    // Quadrant interiors (away from the blurred boundaries) are correct
    for row in (25..=35).chain(65..=75) {
        for col in (25..=35).chain(65..=75) {
            let expected = u8::from(is_vegetation(row, col));
            assert_eq!(
                outputs.raster.get(row, col).unwrap(),
                expected,
                "pixel ({}, {})",
                row,
                col
            );
        }
    }

    // Roughly half the scene is vegetation
    assert!(
        outputs.vegetation_pixels > 3500 && outputs.vegetation_pixels < 6500,
        "vegetation pixel count {} out of range",
        outputs.vegetation_pixels
    );

    // The classification inherits the scene georeference
    let out_gt = on_disk.transform();
    assert_eq!(out_gt.origin_x, 400_000.0);
    assert_eq!(out_gt.origin_y, 4_000_000.0);
}

#[test]
fn run_is_reproducible_for_a_fixed_tree_count() {
    let gt = *make_scene().red.transform();
    let vegetation: Vec<GeoPoint> = (0..10).map(|i| point_at(&gt, 10 + 2 * i, 10)).collect();
    let background: Vec<GeoPoint> = (0..10).map(|i| point_at(&gt, 10 + 2 * i, 90)).collect();

    let dir_a = tempfile::tempdir().unwrap();
    let dir_b = tempfile::tempdir().unwrap();
    let params = PipelineParams::default();

    let a = classify_scene(make_scene(), None, &vegetation, &background, dir_a.path(), &params)
        .unwrap();
    let b = classify_scene(make_scene(), None, &vegetation, &background, dir_b.path(), &params)
        .unwrap();

    assert_eq!(a.raster.data(), b.raster.data());
    assert_eq!(a.vegetation_pixels, b.vegetation_pixels);
}
