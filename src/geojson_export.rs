//! GeoJSON features from traced contours
//!
//! Line contours become MultiLineString features. Filled bands become
//! MultiPolygon features, with each hole attached to the smallest outer loop
//! containing it. Exterior rings are written counter-clockwise and holes
//! clockwise in data coordinates, whichever way the grid axes run.

use crate::contour_set::ContourOutput;
use crate::point::Point;
use crate::tracer::{FilledPolygon, Segment};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Position, Value as GeoValue};

/// Bounding box of one ring
#[derive(Debug, Clone, Copy)]
struct BBox {
    min_x: f64,
    max_x: f64,
    min_y: f64,
    max_y: f64,
}

impl BBox {
    fn from_ring(ring: &[Point]) -> Self {
        ring.iter().fold(
            Self {
                min_x: f64::INFINITY,
                max_x: f64::NEG_INFINITY,
                min_y: f64::INFINITY,
                max_y: f64::NEG_INFINITY,
            },
            |b, p| Self {
                min_x: b.min_x.min(p.x),
                max_x: b.max_x.max(p.x),
                min_y: b.min_y.min(p.y),
                max_y: b.max_y.max(p.y),
            },
        )
    }

    /// Whether this box lies within `other`
    fn is_inside(&self, other: &BBox) -> bool {
        self.min_x >= other.min_x
            && self.max_x <= other.max_x
            && self.min_y >= other.min_y
            && self.max_y <= other.max_y
    }
}

/// Even-odd ray casting
fn point_in_ring(p: &Point, ring: &[Point]) -> bool {
    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let a = &ring[i];
        let b = &ring[j];
        if ((a.y > p.y) != (b.y > p.y)) && (p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x) {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Whether `subject` lies inside `container`
///
/// Loops from one band never cross, so a single vertex decides. Vertices the
/// two rings share are skipped.
fn ring_in_ring(subject: &[Point], container: &[Point]) -> bool {
    if container.len() < 3 {
        return false;
    }
    subject
        .iter()
        .find(|p| !container.contains(*p))
        .map_or(true, |p| point_in_ring(p, container))
}

fn to_positions(points: &[Point]) -> Vec<Position> {
    points.iter().map(|p| vec![p.x, p.y]).collect()
}

/// Positions of a closed loop wound counter-clockwise when `ccw`, else clockwise
fn oriented_positions(polygon: &FilledPolygon, ccw: bool) -> Vec<Position> {
    let mut positions = to_positions(&polygon.vertices);
    if (polygon.signed_area() > 0.0) != ccw {
        positions.reverse();
    }
    positions
}

fn feature(value: GeoValue, properties: JsonObject) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(value)),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

/// MultiLineString feature for one level, with a `level` property
///
/// Closed segments repeat their first point, as GeoJSON expects.
pub fn lines_to_feature(level: f64, segments: &[Segment]) -> Feature {
    let lines: Vec<Vec<Position>> = segments
        .iter()
        .map(|s| {
            let mut line = to_positions(&s.points);
            if s.closed {
                if let Some(first) = line.first().cloned() {
                    line.push(first);
                }
            }
            line
        })
        .collect();

    let mut properties = JsonObject::new();
    properties.insert("level".to_string(), serde_json::json!(level));
    feature(GeoValue::MultiLineString(lines), properties)
}

/// MultiPolygon feature for one band, with `lower_level` and `upper_level`
///
/// Infinite bounds of extension bands serialize as `null`.
pub fn band_to_feature(lower: f64, upper: f64, polygons: &[FilledPolygon]) -> Feature {
    let (outers, holes): (Vec<&FilledPolygon>, Vec<&FilledPolygon>) =
        polygons.iter().partition(|p| !p.is_hole());

    let outer_boxes: Vec<BBox> = outers.iter().map(|p| BBox::from_ring(p.ring())).collect();
    let outer_areas: Vec<f64> = outers.iter().map(|p| p.signed_area().abs()).collect();
    let mut rings: Vec<Vec<Vec<Position>>> = outers
        .iter()
        .map(|p| vec![oriented_positions(p, true)])
        .collect();

    let mut orphans = 0usize;
    for hole in holes {
        let hole_box = BBox::from_ring(hole.ring());
        let container = outers
            .iter()
            .enumerate()
            .filter(|(i, outer)| {
                hole_box.is_inside(&outer_boxes[*i]) && ring_in_ring(hole.ring(), outer.ring())
            })
            .min_by(|(a, _), (b, _)| outer_areas[*a].total_cmp(&outer_areas[*b]))
            .map(|(i, _)| i);

        match container {
            Some(i) => rings[i].push(oriented_positions(hole, false)),
            None => orphans += 1,
        }
    }
    if orphans > 0 {
        tracing::warn!(lower, upper, orphans, "holes without an enclosing boundary dropped");
    }

    let mut properties = JsonObject::new();
    properties.insert("lower_level".to_string(), serde_json::json!(lower));
    properties.insert("upper_level".to_string(), serde_json::json!(upper));
    feature(GeoValue::MultiPolygon(rings), properties)
}

fn has_coordinates(feature: &Feature) -> bool {
    match feature.geometry.as_ref().map(|g| &g.value) {
        Some(GeoValue::MultiPolygon(polygons)) => !polygons.is_empty(),
        Some(GeoValue::MultiLineString(lines)) => !lines.is_empty(),
        _ => false,
    }
}

/// One feature per non-empty level or band, in level order
pub fn output_to_collection(output: &ContourOutput) -> FeatureCollection {
    let features: Vec<Feature> = match output {
        ContourOutput::Lines(levels) => levels
            .iter()
            .map(|(level, segments)| lines_to_feature(*level, segments))
            .filter(has_coordinates)
            .collect(),
        ContourOutput::Filled(bands) => bands
            .iter()
            .map(|((lower, upper), polygons)| band_to_feature(*lower, *upper, polygons))
            .filter(has_coordinates)
            .collect(),
    };

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: f64, y0: f64, size: f64, clockwise: bool) -> FilledPolygon {
        let mut ring = vec![
            Point::new(x0, y0),
            Point::new(x0 + size, y0),
            Point::new(x0 + size, y0 + size),
            Point::new(x0, y0 + size),
        ];
        if clockwise {
            ring.reverse();
        }
        FilledPolygon::from_ring(ring).unwrap()
    }

    fn multi_polygon(feature: &Feature) -> &Vec<Vec<Vec<Position>>> {
        match &feature.geometry.as_ref().unwrap().value {
            GeoValue::MultiPolygon(p) => p,
            other => panic!("unexpected geometry {:?}", other),
        }
    }

    #[test]
    fn test_hole_goes_to_smallest_container() {
        let polygons = vec![
            square(0.0, 0.0, 10.0, false),
            square(2.0, 2.0, 6.0, true),
            square(3.0, 3.0, 4.0, false),
            square(4.0, 4.0, 1.0, true),
        ];
        let feature = band_to_feature(1.0, 2.0, &polygons);
        let mp = multi_polygon(&feature);

        assert_eq!(mp.len(), 2);
        // outer square with its hole, inner island with its own hole
        assert_eq!(mp[0].len(), 2);
        assert_eq!(mp[1].len(), 2);
        assert_eq!(mp[1][1][0], vec![4.0, 5.0]);

        let props = feature.properties.as_ref().unwrap();
        assert_eq!(props["lower_level"], serde_json::json!(1.0));
        assert_eq!(props["upper_level"], serde_json::json!(2.0));
    }

    fn ring_area(ring: &[Position]) -> f64 {
        ring.windows(2)
            .map(|w| w[0][0] * w[1][1] - w[1][0] * w[0][1])
            .sum::<f64>()
            / 2.0
    }

    #[test]
    fn test_mirrored_loops_use_hole_flag() {
        // traced on a grid with a descending axis: the outer loop is
        // clockwise in data coordinates and the hole counter-clockwise
        let mut outer = square(0.0, 0.0, 10.0, true);
        outer.hole = false;
        let mut hole = square(2.0, 2.0, 6.0, false);
        hole.hole = true;

        let feature = band_to_feature(0.0, 1.0, &[outer, hole]);
        let mp = multi_polygon(&feature);
        assert_eq!(mp.len(), 1);
        assert_eq!(mp[0].len(), 2);
        assert!(ring_area(&mp[0][0]) > 0.0);
        assert!(ring_area(&mp[0][1]) < 0.0);
        assert_eq!(ring_area(&mp[0][0]), 100.0);
    }

    #[test]
    fn test_disjoint_hole_is_dropped() {
        let polygons = vec![square(0.0, 0.0, 1.0, false), square(5.0, 5.0, 1.0, true)];
        let feature = band_to_feature(0.0, 1.0, &polygons);
        let mp = multi_polygon(&feature);
        assert_eq!(mp.len(), 1);
        assert_eq!(mp[0].len(), 1);
    }

    #[test]
    fn test_closed_line_repeats_first_point() {
        let segment = Segment {
            points: vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(0.0, 1.0)],
            closed: true,
        };
        let feature = lines_to_feature(0.5, &[segment]);
        match &feature.geometry.as_ref().unwrap().value {
            GeoValue::MultiLineString(lines) => {
                assert_eq!(lines[0].len(), 4);
                assert_eq!(lines[0][0], lines[0][3]);
            }
            other => panic!("unexpected geometry {:?}", other),
        }
        assert_eq!(feature.properties.as_ref().unwrap()["level"], serde_json::json!(0.5));
    }

    #[test]
    fn test_collection_skips_empty_levels() {
        let output = ContourOutput::Lines(vec![
            (1.0, Vec::new()),
            (
                2.0,
                vec![Segment {
                    points: vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)],
                    closed: false,
                }],
            ),
        ]);
        let collection = output_to_collection(&output);
        assert_eq!(collection.features.len(), 1);
    }
}
