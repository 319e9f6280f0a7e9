//! Polygon offsetting: per-vertex normal displacement with rounded convex
//! corners, cleaned up through the Boolean engine.

use crate::boolean::clean_polygon_set;
use crate::error::Result;
use log::debug;
use opencut_types::{ManhattanArea, Point, Polygon, PolygonSet, Unit};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetKind {
    /// Closed ring: every vertex offset, including the implicit closing
    /// corner.
    Closed,
    /// Open polyline: out along one side, back along the other, round end
    /// caps.
    Open,
    /// Open polyline offset on the forward side only, returning along the
    /// reversed source path.
    OpenRight,
}

/// Largest angular step that keeps the chord sagitta within `error` on a
/// circle of the given radius.
pub fn delta_angle_for_error(error: f64, radius: f64) -> f64 {
    let error = error.max(1.0).min(radius / 2.0);
    (2.0 * (1.0 - error / radius).powi(2) - 1.0)
        .clamp(-1.0, 1.0)
        .acos()
}

fn get_normal(p1: Point, p2: Point, amount: Unit) -> Point {
    let dx = (p2.x - p1.x) as f64;
    let dy = (p2.y - p1.y) as f64;
    let length = (dx * dx + dy * dy).sqrt();
    Point::new(
        (dy * amount as f64 / length).round() as Unit,
        (-dx * amount as f64 / length).round() as Unit,
    )
}

/// Emit the offset image of vertex p1 with neighbours p0, p2.
fn process_segment(
    raw: &mut Vec<Point>,
    p0: Point,
    p1: Point,
    p2: Point,
    amount: Unit,
    arc_tolerance: Unit,
) {
    if p1 == p0 {
        return;
    }
    let n01 = get_normal(p0, p1, amount);
    if p2 == p1 {
        raw.push(p1 + n01);
        return;
    }
    let n12 = get_normal(p1, p2, amount);

    let cross = n01.x as ManhattanArea * n12.y as ManhattanArea
        - n01.y as ManhattanArea * n12.x as ManhattanArea;
    let dot = n01.x as ManhattanArea * n12.x as ManhattanArea
        + n01.y as ManhattanArea * n12.y as ManhattanArea;
    let mut o = cross.signum();
    if amount < 0 {
        o = -o;
    }

    if o > 0 || (o == 0 && dot < 0) {
        // Convex on the offset side: round the corner about p1.
        raw.push(p1 + n01);

        let mut base_angle = (n01.y as f64).atan2(n01.x as f64);
        let q = (dot as f64 / amount as f64 / amount as f64).clamp(-1.0, 1.0);
        let mut sweep_angle = q.acos();
        let num_segments = (sweep_angle
            / delta_angle_for_error(arc_tolerance as f64, amount.unsigned_abs() as f64))
        .ceil() as i64;
        if amount < 0 {
            base_angle += std::f64::consts::PI;
            sweep_angle = -sweep_angle;
        }
        for i in 1..num_segments {
            let angle = base_angle + sweep_angle * i as f64 / num_segments as f64;
            raw.push(Point::new(
                (p1.x as f64 + amount as f64 * angle.cos()).round() as Unit,
                (p1.y as f64 + amount as f64 * angle.sin()).round() as Unit,
            ));
        }
        raw.push(p1 + n12);
    } else if o == 0 {
        raw.push(p1 + n01);
    } else {
        // Concave on the offset side; the self-intersection resolves in
        // the Boolean cleanup.
        raw.push(p1 + n01);
        raw.push(p1);
        raw.push(p1 + n12);
    }
}

/// The raw (self-intersecting) offset of a single path. Positive amounts
/// grow a counterclockwise ring outward.
pub fn raw_offset(path: &[Point], amount: Unit, arc_tolerance: Unit, kind: OffsetKind) -> Polygon {
    if amount == 0 {
        return path.to_vec();
    }
    if path.len() < 2 {
        return Polygon::new();
    }

    let n = path.len();
    let mut raw = Polygon::new();
    match kind {
        OffsetKind::Closed => {
            let mut p0 = path[n - 1];
            let mut p1 = path[0];
            for i in 0..n {
                let p2 = path[(i + 1) % n];
                process_segment(&mut raw, p0, p1, p2, amount, arc_tolerance);
                p0 = p1;
                p1 = p2;
            }
        }
        OffsetKind::Open => {
            // Forward along one side (the first call sweeps the start
            // cap), then back along the other; the implicit closing edge
            // finishes the strip.
            let mut p0 = path[1];
            let mut p1 = path[0];
            for &p2 in path.iter().skip(1) {
                process_segment(&mut raw, p0, p1, p2, amount, arc_tolerance);
                p0 = p1;
                p1 = p2;
            }
            for i in (0..n - 1).rev() {
                let p2 = path[i];
                process_segment(&mut raw, p0, p1, p2, amount, arc_tolerance);
                p0 = p1;
                p1 = p2;
            }
        }
        OffsetKind::OpenRight => {
            raw.push(path[0] + get_normal(path[0], path[1], amount));
            let mut p0 = path[0];
            let mut p1 = path[1];
            for &p2 in path.iter().skip(2) {
                process_segment(&mut raw, p0, p1, p2, amount, arc_tolerance);
                p0 = p1;
                p1 = p2;
            }
            raw.push(path[n - 1] + get_normal(path[n - 2], path[n - 1], amount));
            raw.extend(path.iter().rev());
        }
    }
    raw
}

/// Offset a whole set and normalize the result.
pub fn offset_polygon_set(
    ps: &PolygonSet,
    amount: Unit,
    arc_tolerance: Unit,
    kind: OffsetKind,
) -> Result<PolygonSet> {
    let mut raw_set = PolygonSet::new();
    for poly in ps {
        let raw = raw_offset(poly, amount, arc_tolerance, kind);
        if raw.len() >= 3 {
            raw_set.push(raw);
        }
    }
    debug!(
        "offset {:+}: {} raw rings from {} inputs",
        amount,
        raw_set.len(),
        ps.len()
    );
    clean_polygon_set(&raw_set)
}

/// Offset a single path.
pub fn offset_polygon(
    path: &[Point],
    amount: Unit,
    arc_tolerance: Unit,
    kind: OffsetKind,
) -> Result<PolygonSet> {
    offset_polygon_set(&vec![path.to_vec()], amount, arc_tolerance, kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencut_types::{polygon_bounds, polygon_set_area};

    fn square() -> Polygon {
        vec![
            Point::new(0, 0),
            Point::new(100, 0),
            Point::new(100, 100),
            Point::new(0, 100),
        ]
    }

    #[test]
    fn delta_angle_matches_sagitta_bound() {
        // e = r/2 is the clamp point: acos(2*(1/2)^2 - 1) = 2*pi/3.
        let a = delta_angle_for_error(50.0, 100.0);
        assert!((a - 2.0 * std::f64::consts::FRAC_PI_3).abs() < 1e-12);
        // Smaller error, smaller step.
        assert!(delta_angle_for_error(1.0, 100.0) < a);
    }

    #[test]
    fn square_grows_by_amount() {
        let out = offset_polygon(&square(), 10, 1, OffsetKind::Closed).unwrap();
        assert_eq!(out.len(), 1);
        let bounds = polygon_bounds(&out[0]).unwrap();
        assert_eq!((bounds.x, bounds.y), (-10, -10));
        assert_eq!((bounds.width, bounds.height), (120, 120));
        // Four rounded corners: more vertices than the plain square.
        assert!(out[0].len() > 8);
    }

    #[test]
    fn square_shrinks_by_negative_amount() {
        let out = offset_polygon(&square(), -10, 1, OffsetKind::Closed).unwrap();
        assert_eq!(out.len(), 1);
        let bounds = polygon_bounds(&out[0]).unwrap();
        assert_eq!((bounds.x, bounds.y), (10, 10));
        assert_eq!((bounds.width, bounds.height), (80, 80));
    }

    #[test]
    fn shrinking_past_the_core_leaves_nothing() {
        let out = offset_polygon(&square(), -60, 1, OffsetKind::Closed).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn open_offset_builds_a_fattened_strip() {
        let path = vec![Point::new(0, 0), Point::new(200, 0)];
        let out = offset_polygon(&path, 10, 1, OffsetKind::Open).unwrap();
        assert_eq!(out.len(), 1);
        let bounds = polygon_bounds(&out[0]).unwrap();
        assert_eq!((bounds.x, bounds.y), (-10, -10));
        assert_eq!((bounds.width, bounds.height), (220, 20));
        let area = polygon_set_area(&out);
        // Rectangle plus two round caps, within chord error.
        let expected = 200.0 * 20.0 + std::f64::consts::PI * 100.0;
        assert!((area - expected).abs() / expected < 0.1);
    }

    #[test]
    fn zero_amount_is_identity_before_cleanup() {
        let raw = raw_offset(&square(), 0, 1, OffsetKind::Closed);
        assert_eq!(raw, square());
    }
}
