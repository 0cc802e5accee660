//! End-to-end compositing scenarios.

use fabmap_raster::{
    blit_onto, pixel_scale, resample, trim_to, z_scale, BlitOutcome, Bounds, Compositor, GridRegion,
    Placement, RasterTile, Region,
};

/// Deterministic pseudo-random samples.
fn noise(width: usize, height: usize, seed: u32) -> Vec<u16> {
    let mut state = seed;
    (0..width * height)
        .map(|_| {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            (state >> 16) as u16
        })
        .collect()
}

fn assert_shape(tile: &RasterTile) {
    assert_eq!(tile.as_slice().len(), tile.width() * tile.height());
    assert_eq!(tile.rows().len(), if tile.width() == 0 { 0 } else { tile.height() });
}

#[test]
fn test_scaled_tile_lands_in_center() {
    let mut target = RasterTile::new(4, 4).with_bounds(Bounds::new(0.0, 4.0, 0.0, 4.0, 0.0, 10.0));
    let source = RasterTile::from_grid(2, 2, vec![1000; 4])
        .unwrap()
        .with_bounds(Bounds::new(1.0, 3.0, 1.0, 3.0, 5.0, 15.0));

    blit_onto(&source, &mut target).unwrap();

    let expected: Vec<u16> = vec![
        0, 0, 0, 0, //
        0, 1500, 1500, 0, //
        0, 1500, 1500, 0, //
        0, 0, 0, 0,
    ];
    assert_eq!(target.as_slice(), expected.as_slice());
    assert_shape(&target);
}

#[test]
fn test_upsampled_source_fills_window() {
    // Source has half the canvas's pixel density: every sample becomes 2x2
    let mut target = RasterTile::new(8, 8).with_bounds(Bounds::new(0.0, 8.0, 0.0, 8.0, 0.0, 1.0));
    let source = RasterTile::from_grid(2, 2, vec![10, 20, 30, 40])
        .unwrap()
        .with_bounds(Bounds::new(2.0, 6.0, 2.0, 6.0, 0.0, 1.0));

    let outcome = blit_onto(&source, &mut target).unwrap();
    assert_eq!(
        outcome,
        BlitOutcome::Merged(Placement { row: 2, col: 2, rows: 4, cols: 4 })
    );

    // Bottom source row (30, 40) is at the canvas's lower rows
    assert_eq!(target.row(2), &[0, 0, 30, 30, 40, 40, 0, 0]);
    assert_eq!(target.row(3), &[0, 0, 30, 30, 40, 40, 0, 0]);
    assert_eq!(target.row(4), &[0, 0, 10, 10, 20, 20, 0, 0]);
    assert_eq!(target.row(5), &[0, 0, 10, 10, 20, 20, 0, 0]);
    assert_eq!(target.row(6), &[0; 8]);
}

#[test]
fn test_max_merge_against_placed_source() {
    let target_bounds = Bounds::new(0.0, 30.0, 0.0, 20.0, 0.0, 5.0);
    let source_bounds = Bounds::new(12.0, 42.0, -4.0, 11.0, 0.0, 4.0);

    let mut target = RasterTile::from_grid(30, 20, noise(30, 20, 7))
        .unwrap()
        .with_bounds(target_bounds);
    let before = target.clone();
    let source = RasterTile::from_grid(15, 10, noise(15, 10, 99))
        .unwrap()
        .with_bounds(source_bounds);

    let outcome = blit_onto(&source, &mut target).unwrap();
    let BlitOutcome::Merged(placement) = outcome else {
        panic!("tile should be merged");
    };
    assert!(!placement.is_empty());
    assert_shape(&target);

    // Rebuild the placed source independently
    let (row_scale, col_scale) = pixel_scale(&source, &source_bounds, &before, &target_bounds);
    let mut placed =
        resample(&source, row_scale, col_scale, z_scale(&source_bounds, &target_bounds)).unwrap();
    trim_to(&mut placed, &target_bounds);

    for j in 0..target.height() {
        for i in 0..target.width() {
            let pre = before.get(j, i).unwrap();
            let post = target.get(j, i).unwrap();
            if placement.contains(j, i) {
                let src = placed.get(j - placement.row, i - placement.col).unwrap();
                assert_eq!(post, pre.max(src), "pixel ({j}, {i})");
            } else {
                assert_eq!(post, pre, "pixel ({j}, {i}) outside the window");
            }
        }
    }
    assert_eq!(target.bounds(), before.bounds());
}

#[test]
fn test_zero_scale_leaves_target_bit_for_bit() {
    let mut target = RasterTile::from_grid(6, 6, noise(6, 6, 3))
        .unwrap()
        .with_bounds(Bounds::new(0.0, 6.0, 0.0, 6.0, 0.0, 1.0));
    let before = target.clone();

    let source = RasterTile::from_grid(3, 3, vec![u16::MAX; 9])
        .unwrap()
        .with_bounds(Bounds::new(0.0, 6.0, 0.0, f64::from_bits(1), 0.0, 1.0));

    assert_eq!(blit_onto(&source, &mut target).unwrap(), BlitOutcome::Skipped);
    assert_eq!(target, before);
}

#[test]
fn test_flat_target_keeps_source_values() {
    let mut target = RasterTile::new(2, 2).with_bounds(Bounds::new(0.0, 2.0, 0.0, 2.0, 3.0, 3.0));
    let source = RasterTile::from_grid(2, 2, vec![7, 7, 7, 7])
        .unwrap()
        .with_bounds(Bounds::new(0.0, 2.0, 0.0, 2.0, 0.0, 100.0));

    blit_onto(&source, &mut target).unwrap();
    assert_eq!(target.as_slice(), &[7, 7, 7, 7]);
}

#[test]
fn test_rounding_overhang_is_cut_to_fit() {
    // 3.6 canvas pixels round up to 4, but only 3 columns remain after the
    // trim starting at column 2
    let mut target = RasterTile::new(5, 1).with_bounds(Bounds::new(0.0, 5.0, 0.0, 1.0, 0.0, 1.0));
    let source = RasterTile::from_grid(3, 1, vec![9, 9, 9])
        .unwrap()
        .with_bounds(Bounds::new(2.0, 5.6, 0.0, 1.0, 0.0, 1.0));

    let outcome = blit_onto(&source, &mut target).unwrap();
    let BlitOutcome::Merged(placement) = outcome else {
        panic!("tile should be merged");
    };
    assert_eq!(placement.col, 2);
    assert_eq!(placement.cols, 3);
    assert_eq!(target.as_slice(), &[0, 0, 9, 9, 9]);
}

#[test]
fn test_trim_to_containing_bounds_is_noop() {
    let bounds = Bounds::new(-3.0, 3.0, -1.0, 1.0, 0.0, 2.0);
    let mut tile = RasterTile::from_grid(6, 2, noise(6, 2, 11))
        .unwrap()
        .with_bounds(bounds);
    let before = tile.clone();

    trim_to(&mut tile, &Bounds::new(-10.0, 10.0, -10.0, 10.0, 0.0, 1.0));
    assert_eq!(tile, before);
}

#[test]
fn test_region_round_trip() {
    let region = GridRegion::uniform((5, 3, 2), (-2.5, 7.25), (0.125, 3.0), (-1.0, 0.5));
    let tile = RasterTile::from_region(&region, 1.0).unwrap();

    assert_eq!(tile.shape(), (3, 5));
    assert!(tile.as_slice().iter().all(|&v| v == 0));

    let b = tile.bounds().unwrap();
    assert_eq!(b.xmin, region.x()[0]);
    assert_eq!(b.xmax, region.x()[region.ni()]);
    assert_eq!(b.ymin, region.y()[0]);
    assert_eq!(b.ymax, region.y()[region.nj()]);
    assert_eq!(b.zmin, region.z()[0]);
    assert_eq!(b.zmax, region.z()[region.nk()]);
}

#[test]
fn test_copy_never_aliases() {
    let original = RasterTile::from_grid(3, 3, noise(3, 3, 5))
        .unwrap()
        .with_bounds(Bounds::new(0.0, 3.0, 0.0, 3.0, 0.0, 1.0));
    let snapshot = original.as_slice().to_vec();

    let mut copy = original.clone();
    copy.bounds_mut().unwrap().zmax = 50.0;
    copy.fill(1);
    assert_eq!(original.bounds().unwrap().zmax, 1.0);
    assert_eq!(original.as_slice(), snapshot.as_slice());

    // Resampling produces a new buffer as well
    let resampled = resample(&original, 1.0, 1.0, 1.0).unwrap();
    assert_ne!(resampled.as_slice().as_ptr(), original.as_slice().as_ptr());
}

#[test]
fn test_shape_invariant_across_many_tiles() {
    let mut compositor = Compositor::new(
        RasterTile::new(40, 25).with_bounds(Bounds::new(-10.0, 30.0, 0.0, 25.0, 0.0, 8.0)),
    )
    .unwrap();

    let tiles = [
        (7, 5, Bounds::new(-20.0, 0.0, -5.0, 10.0, 0.0, 8.0)),
        (13, 3, Bounds::new(5.0, 18.0, 20.0, 23.0, 1.0, 6.0)),
        (64, 64, Bounds::new(0.0, 10.0, 0.0, 10.0, 0.0, 2.0)),
        (1, 1, Bounds::new(29.5, 31.5, 24.5, 26.5, 0.0, 10.0)),
        (9, 9, Bounds::new(100.0, 101.0, 100.0, 101.0, 0.0, 1.0)),
    ];
    for (seed, (w, h, bounds)) in tiles.into_iter().enumerate() {
        let tile = RasterTile::from_grid(w, h, noise(w, h, seed as u32))
            .unwrap()
            .with_bounds(bounds);
        compositor.blit(&tile).unwrap();
        assert_shape(compositor.canvas());
        assert_eq!(compositor.canvas().shape(), (25, 40));
    }

    assert_eq!(compositor.merged() + compositor.skipped(), 5);
    let canvas = compositor.finish();
    assert!(canvas.max_sample().unwrap() > 0);
}
