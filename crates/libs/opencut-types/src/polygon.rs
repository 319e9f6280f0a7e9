use crate::point::{ManhattanArea, Point, Unit};

/// A closed ring (closing segment implicit) or, for toolpath output, an
/// open polyline.
pub type Polygon = Vec<Point>;

/// An ordered sequence of polygons. Membership follows the winding rule:
/// a point is inside the set when its winding number is positive.
pub type PolygonSet = Vec<Polygon>;

/// Axis-aligned bounds of a polygon.
#[cfg_attr(feature = "node", napi(object, namespace = "Polygon"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
  pub x: i64,
  pub y: i64,
  pub width: i64,
  pub height: i64,
}

/// Signed area of a ring; counterclockwise rings are positive.
pub fn polygon_area(points: &[Point]) -> f64 {
  let n = points.len();
  if n < 3 {
    return 0.0;
  }
  let mut area2: ManhattanArea = 0;
  for i in 0..n {
    let j = if i == 0 { n - 1 } else { i - 1 };
    area2 += points[j].x as ManhattanArea * points[i].y as ManhattanArea
      - points[i].x as ManhattanArea * points[j].y as ManhattanArea;
  }
  0.5 * area2 as f64
}

/// Bounds of a point sequence, `None` when empty.
pub fn polygon_bounds(points: &[Point]) -> Option<Rect> {
  let first = *points.first()?;
  let (xmin, xmax, ymin, ymax) = points.iter().skip(1).fold(
    (first.x, first.x, first.y, first.y),
    |(xmin, xmax, ymin, ymax), p| (xmin.min(p.x), xmax.max(p.x), ymin.min(p.y), ymax.max(p.y)),
  );
  Some(Rect {
    x: xmin as i64,
    y: ymin as i64,
    width: xmax as i64 - xmin as i64,
    height: ymax as i64 - ymin as i64,
  })
}

/// Bounds of a whole polygon set.
pub fn polygon_set_bounds(ps: &[Polygon]) -> Option<Rect> {
  let mut it = ps.iter().filter_map(|p| polygon_bounds(p));
  let mut acc = it.next()?;
  for r in it {
    let x0 = acc.x.min(r.x);
    let y0 = acc.y.min(r.y);
    let x1 = (acc.x + acc.width).max(r.x + r.width);
    let y1 = (acc.y + acc.height).max(r.y + r.height);
    acc = Rect {
      x: x0,
      y: y0,
      width: x1 - x0,
      height: y1 - y0,
    };
  }
  Some(acc)
}

/// Total signed area of a set.
pub fn polygon_set_area(ps: &[Polygon]) -> f64 {
  ps.iter().map(|p| polygon_area(p)).sum()
}

/// Reject non-finite or out-of-range input before it reaches the integer
/// kernel.
pub fn unit_from_f64(v: f64) -> Option<Unit> {
  if !v.is_finite() {
    return None;
  }
  let r = v.round();
  if r < Unit::MIN as f64 || r > Unit::MAX as f64 {
    return None;
  }
  Some(r as Unit)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn square(size: Unit) -> Polygon {
    vec![
      Point::new(0, 0),
      Point::new(size, 0),
      Point::new(size, size),
      Point::new(0, size),
    ]
  }

  #[test]
  fn ccw_area_is_positive() {
    assert_eq!(polygon_area(&square(100)), 10_000.0);
    let mut cw = square(100);
    cw.reverse();
    assert_eq!(polygon_area(&cw), -10_000.0);
  }

  #[test]
  fn bounds_of_square() {
    let r = polygon_bounds(&square(100)).unwrap();
    assert_eq!(
      r,
      Rect {
        x: 0,
        y: 0,
        width: 100,
        height: 100
      }
    );
  }

  #[test]
  fn non_finite_coordinates_are_rejected() {
    assert_eq!(unit_from_f64(f64::NAN), None);
    assert_eq!(unit_from_f64(f64::INFINITY), None);
    assert_eq!(unit_from_f64(3.0e10), None);
    assert_eq!(unit_from_f64(12.4), Some(12));
  }
}
