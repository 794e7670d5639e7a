use approx::assert_abs_diff_eq;
use geojson::Value;
use legacy_contour::geojson_export::{band_to_feature, output_to_collection};
use legacy_contour::{
    ContourConfig, ContourOutput, ContourSet, CornerMask, Extend, Grid, LevelSpec,
};

/// Peak of 25 in the middle of a 5x5 grid, 5 on the border
fn create_circular_values() -> Vec<Vec<f64>> {
    vec![
        vec![5.0, 5.0, 5.0, 5.0, 5.0],
        vec![5.0, 15.0, 15.0, 15.0, 5.0],
        vec![5.0, 15.0, 25.0, 15.0, 5.0],
        vec![5.0, 15.0, 15.0, 15.0, 5.0],
        vec![5.0, 5.0, 5.0, 5.0, 5.0],
    ]
}

fn circular_grid() -> Grid {
    Grid::from_axes(
        &[-100.0, -99.0, -98.0, -97.0, -96.0],
        &[40.0, 41.0, 42.0, 43.0, 44.0],
        create_circular_values(),
        None,
    )
    .unwrap()
}

#[test]
fn test_auto_line_levels() {
    let set = ContourSet::new(circular_grid(), ContourConfig::default()).unwrap();

    // steps of 2.5 strictly inside (5, 25)
    assert_eq!(set.levels().len(), 7);
    assert_abs_diff_eq!(set.levels()[0], 7.5, epsilon = 1e-12);
    assert_abs_diff_eq!(set.levels()[6], 22.5, epsilon = 1e-12);
    assert_eq!(set.layers(), set.levels());
    assert!(set.bands().is_empty());

    let output = set.allsegs_and_allkinds().unwrap();
    assert_eq!(output.len(), set.levels().len());
    let ContourOutput::Lines(levels) = output else {
        panic!("expected lines");
    };
    for (_, segments) in &levels {
        // every level is a single ring around the peak
        assert_eq!(segments.len(), 1);
        assert!(segments[0].closed);
    }
}

#[test]
fn test_filled_rings_nest() {
    let config = ContourConfig {
        filled: true,
        levels: LevelSpec::Explicit(vec![5.0, 10.0, 20.0, 30.0]),
        ..Default::default()
    };
    let set = ContourSet::new(circular_grid(), config).unwrap();
    assert_eq!(set.bands(), &[(5.0, 10.0), (10.0, 20.0), (20.0, 30.0)]);
    assert_eq!(set.layers(), &[7.5, 15.0, 25.0]);

    let output = set.allsegs_and_allkinds().unwrap();
    let ContourOutput::Filled(bands) = &output else {
        panic!("expected filled output");
    };

    // outer band is the grid with a hole, middle band a ring, inner a cap
    assert_eq!(bands[0].1.len(), 2);
    assert_eq!(bands[1].1.len(), 2);
    assert_eq!(bands[2].1.len(), 1);

    let total: f64 = bands
        .iter()
        .flat_map(|(_, polys)| polys.iter().map(|p| p.signed_area()))
        .sum();
    assert_abs_diff_eq!(total, 16.0, epsilon = 1e-9);

    let allsegs = output.allsegs();
    let allkinds = output.allkinds().unwrap();
    assert_eq!(allsegs.len(), 3);
    for (segs, kinds) in allsegs.iter().zip(&allkinds) {
        for (seg, kind) in segs.iter().zip(kinds) {
            assert_eq!(seg.len(), kind.len());
        }
    }
}

#[test]
fn test_geojson_holes_attached() {
    let config = ContourConfig {
        filled: true,
        levels: LevelSpec::Explicit(vec![10.0, 20.0]),
        ..Default::default()
    };
    let set = ContourSet::new(circular_grid(), config).unwrap();
    let output = set.allsegs_and_allkinds().unwrap();
    let ContourOutput::Filled(bands) = &output else {
        panic!("expected filled output");
    };
    let ((lower, upper), polygons) = &bands[0];

    let feature = band_to_feature(*lower, *upper, polygons);
    match feature.geometry.unwrap().value {
        Value::MultiPolygon(mp) => {
            assert_eq!(mp.len(), 1);
            assert_eq!(mp[0].len(), 2);
        }
        other => panic!("unexpected geometry {:?}", other),
    }

    let collection = output_to_collection(&output);
    assert_eq!(collection.features.len(), 1);
}

fn ring_area(ring: &[Vec<f64>]) -> f64 {
    ring.windows(2)
        .map(|w| w[0][0] * w[1][1] - w[1][0] * w[0][1])
        .sum::<f64>()
        / 2.0
}

#[test]
fn test_descending_latitude_keeps_outer_boundary() {
    // rows run north to south, as in most gridded geo products
    let grid = Grid::from_axes(
        &[-100.0, -99.0, -98.0, -97.0, -96.0],
        &[44.0, 43.0, 42.0, 41.0, 40.0],
        create_circular_values(),
        None,
    )
    .unwrap();
    assert_eq!(grid.orientation(), -1.0);

    let config = ContourConfig {
        filled: true,
        levels: LevelSpec::Explicit(vec![5.0, 10.0, 20.0]),
        ..Default::default()
    };
    let set = ContourSet::new(grid, config).unwrap();
    let output = set.allsegs_and_allkinds().unwrap();
    let ContourOutput::Filled(bands) = &output else {
        panic!("expected filled output");
    };
    let ((lower, upper), polygons) = &bands[0];

    let outer: Vec<_> = polygons.iter().filter(|p| !p.is_hole()).collect();
    let holes: Vec<_> = polygons.iter().filter(|p| p.is_hole()).collect();
    assert_eq!(outer.len(), 1);
    assert_eq!(holes.len(), 1);
    assert_abs_diff_eq!(outer[0].signed_area().abs(), 16.0, epsilon = 1e-9);
    assert!(holes[0].signed_area().abs() < 16.0);

    let feature = band_to_feature(*lower, *upper, polygons);
    match feature.geometry.unwrap().value {
        Value::MultiPolygon(mp) => {
            assert_eq!(mp.len(), 1);
            assert_eq!(mp[0].len(), 2);
            assert_abs_diff_eq!(ring_area(&mp[0][0]), 16.0, epsilon = 1e-9);
            assert!(ring_area(&mp[0][1]) < 0.0);
        }
        other => panic!("unexpected geometry {:?}", other),
    }
}

#[test]
fn test_extend_adds_open_bands() {
    let config = ContourConfig {
        filled: true,
        levels: LevelSpec::Explicit(vec![10.0, 20.0]),
        extend: Extend::Both,
        ..Default::default()
    };
    let set = ContourSet::new(circular_grid(), config).unwrap();
    assert_eq!(set.bands().len(), 3);

    let output = set.allsegs_and_allkinds().unwrap();
    let ContourOutput::Filled(bands) = &output else {
        panic!("expected filled output");
    };
    assert!(bands.iter().all(|(_, polys)| !polys.is_empty()));
    let total: f64 = bands
        .iter()
        .flat_map(|(_, polys)| polys.iter().map(|p| p.signed_area()))
        .sum();
    assert_abs_diff_eq!(total, 16.0, epsilon = 1e-9);
}

#[test]
fn test_algorithm_selected_from_config() {
    for (mask, name) in [
        (CornerMask::Legacy, "legacy"),
        (CornerMask::Enabled, "corner-mask"),
        (CornerMask::Disabled, "standard"),
    ] {
        let config = ContourConfig {
            corner_mask: mask,
            ..Default::default()
        };
        let set = ContourSet::new(circular_grid(), config).unwrap();
        assert_eq!(set.algorithm_name(), name);
    }
}

#[test]
fn test_config_from_json_drives_set() {
    let config = ContourConfig::from_json(
        r#"{"corner_mask": "legacy", "filled": true, "levels": {"count": 4}, "nchunk": 2}"#,
    )
    .unwrap();
    let set = ContourSet::new(circular_grid(), config).unwrap();
    assert!(set.is_filled());
    assert!(set.bands().len() >= 2);

    let chunked = set.allsegs_and_allkinds().unwrap();
    let total: f64 = match &chunked {
        ContourOutput::Filled(bands) => bands
            .iter()
            .flat_map(|(_, polys)| polys.iter().map(|p| p.signed_area()))
            .sum(),
        ContourOutput::Lines(_) => panic!("expected filled output"),
    };
    assert_abs_diff_eq!(total, 16.0, epsilon = 1e-9);
}

#[test]
fn test_invalid_config_rejected() {
    let config = ContourConfig {
        filled: true,
        levels: LevelSpec::Explicit(vec![3.0]),
        ..Default::default()
    };
    assert!(ContourSet::new(circular_grid(), config).is_err());
}
