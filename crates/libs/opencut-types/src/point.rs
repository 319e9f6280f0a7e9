use derive_more::{From, Into};
use std::cmp::Ordering;
use std::ops::{Add, Sub};

/// Coordinate unit. All geometry is integer; 100 000 units = 1 inch.
pub type Unit = i32;

/// Accumulator wide enough for products of coordinate differences.
pub type ManhattanArea = i64;

/// Integer 2D point
#[cfg_attr(feature = "node", napi(object, namespace = "Point"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, From, Into)]
pub struct Point {
  pub x: Unit,
  pub y: Unit,
}

impl Point {
  pub fn new(x: Unit, y: Unit) -> Self {
    Self { x, y }
  }
}

impl Add for Point {
  type Output = Self;
  fn add(self, other: Self) -> Self {
    Self {
      x: self.x + other.x,
      y: self.y + other.y,
    }
  }
}

impl Sub for Point {
  type Output = Self;
  fn sub(self, other: Self) -> Self {
    Self {
      x: self.x - other.x,
      y: self.y - other.y,
    }
  }
}

impl PartialOrd for Point {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl Ord for Point {
  fn cmp(&self, other: &Self) -> Ordering {
    self.x.cmp(&other.x).then(self.y.cmp(&other.y))
  }
}

/// 2D point with Z. This is not a 3D point: z is extra data carried along
/// the toolpath, and equality ignores it.
#[cfg_attr(feature = "node", napi(object, namespace = "Point"))]
#[derive(Debug, Clone, Copy, From, Into)]
pub struct PointWithZ {
  pub x: Unit,
  pub y: Unit,
  pub z: Unit,
}

impl PointWithZ {
  pub fn new(x: Unit, y: Unit, z: Unit) -> Self {
    Self { x, y, z }
  }

  pub fn to_point(self) -> Point {
    Point { x: self.x, y: self.y }
  }
}

impl From<Point> for PointWithZ {
  fn from(p: Point) -> Self {
    Self { x: p.x, y: p.y, z: 0 }
  }
}

impl PartialEq for PointWithZ {
  fn eq(&self, other: &Self) -> bool {
    self.x == other.x && self.y == other.y
  }
}

impl Eq for PointWithZ {}

/// Euclidean distance between two points.
pub fn point_distance(a: Point, b: Point) -> f64 {
  (squared_distance(a, b) as f64).sqrt()
}

/// Squared euclidean distance, exact.
pub fn squared_distance(a: Point, b: Point) -> i128 {
  let dx = a.x as i128 - b.x as i128;
  let dy = a.y as i128 - b.y as i128;
  dx * dx + dy * dy
}
