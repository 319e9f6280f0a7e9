#![deny(clippy::all)]
//! Node bindings for the CAM kernel. Polygon sets cross the boundary as
//! packed coordinate arrays: `paths[i]` is `[x0, y0, x1, y1, ...]`
//! (stride 2), or `[x0, y0, z0, ...]` (stride 3) for depth-carrying
//! toolpaths.

use opencut_cam as cam;
use opencut_types::{unit_from_f64, Point, PointWithZ, Polygon, PolygonSet};

#[macro_use]
extern crate napi_derive;

#[napi]
#[derive(Debug)]
pub enum ClipOp {
  Union,
  Intersection,
  Difference,
}

#[napi]
#[derive(Debug)]
pub enum PathKind {
  Closed,
  Open,
  OpenRight,
}

fn decode_path(path: &[f64]) -> napi::Result<Polygon> {
  if path.len() % 2 != 0 {
    return Err(napi::Error::from_reason("path length must be even"));
  }
  let mut out = Polygon::with_capacity(path.len() / 2);
  for pair in path.chunks_exact(2) {
    let x = unit_from_f64(pair[0]);
    let y = unit_from_f64(pair[1]);
    match (x, y) {
      (Some(x), Some(y)) => out.push(Point::new(x, y)),
      _ => return Err(napi::Error::from_reason("non-finite or out-of-range coordinate")),
    }
  }
  Ok(out)
}

fn decode_paths(paths: &[Vec<f64>]) -> napi::Result<PolygonSet> {
  paths.iter().map(|p| decode_path(p)).collect()
}

fn encode_paths(ps: &[Polygon]) -> Vec<Vec<f64>> {
  ps.iter()
    .map(|poly| {
      let mut flat = Vec::with_capacity(poly.len() * 2);
      for p in poly {
        flat.push(p.x as f64);
        flat.push(p.y as f64);
      }
      flat
    })
    .collect()
}

fn encode_paths_xyz(ps: &[Vec<PointWithZ>]) -> Vec<Vec<f64>> {
  ps.iter()
    .map(|poly| {
      let mut flat = Vec::with_capacity(poly.len() * 3);
      for p in poly {
        flat.push(p.x as f64);
        flat.push(p.y as f64);
        flat.push(p.z as f64);
      }
      flat
    })
    .collect()
}

fn cam_err(e: cam::CamError) -> napi::Error {
  napi::Error::from_reason(e.to_string())
}

/// Boolean combination of two polygon sets; the result is
/// winding-normalized.
#[napi]
pub fn boolean_combine(
  a: Vec<Vec<f64>>,
  b: Vec<Vec<f64>>,
  op: ClipOp,
) -> napi::Result<Vec<Vec<f64>>> {
  let a = decode_paths(&a)?;
  let b = decode_paths(&b)?;
  let op = match op {
    ClipOp::Union => cam::BooleanOp::Union,
    ClipOp::Intersection => cam::BooleanOp::Intersect,
    ClipOp::Difference => cam::BooleanOp::Difference,
  };
  let result = cam::boolean_combine(&a, &b, op).map_err(|e| cam_err(e.into()))?;
  Ok(encode_paths(&result))
}

/// Normalize a polygon set.
#[napi]
pub fn clean(paths: Vec<Vec<f64>>) -> napi::Result<Vec<Vec<f64>>> {
  let ps = decode_paths(&paths)?;
  let result = cam::clean(&ps).map_err(|e| cam_err(e.into()))?;
  Ok(encode_paths(&result))
}

/// Offset a polygon set by a signed amount.
#[napi]
pub fn offset(
  paths: Vec<Vec<f64>>,
  amount: f64,
  arc_tolerance: f64,
  kind: PathKind,
) -> napi::Result<Vec<Vec<f64>>> {
  let ps = decode_paths(&paths)?;
  let amount =
    unit_from_f64(amount).ok_or_else(|| napi::Error::from_reason("bad offset amount"))?;
  let arc_tolerance =
    unit_from_f64(arc_tolerance).ok_or_else(|| napi::Error::from_reason("bad arc tolerance"))?;
  let kind = match kind {
    PathKind::Closed => cam::OffsetKind::Closed,
    PathKind::Open => cam::OffsetKind::Open,
    PathKind::OpenRight => cam::OffsetKind::OpenRight,
  };
  let result = cam::offset(&ps, amount, arc_tolerance, kind).map_err(|e| cam_err(e.into()))?;
  Ok(encode_paths(&result))
}

/// High-speed pocket toolpaths for a part outline.
#[napi]
#[allow(clippy::too_many_arguments)]
pub fn hspocket(
  paths: Vec<Vec<f64>>,
  cutter_dia: f64,
  start_x: f64,
  start_y: f64,
  spiral_r: f64,
  stepover: f64,
  min_progress: f64,
) -> napi::Result<Vec<Vec<f64>>> {
  let outline = decode_paths(&paths)?;
  let cutter_dia =
    unit_from_f64(cutter_dia).ok_or_else(|| napi::Error::from_reason("bad cutter diameter"))?;
  let start = match (unit_from_f64(start_x), unit_from_f64(start_y)) {
    (Some(x), Some(y)) => Point::new(x, y),
    _ => return Err(napi::Error::from_reason("bad start position")),
  };
  let stepover =
    unit_from_f64(stepover).ok_or_else(|| napi::Error::from_reason("bad stepover"))?;
  let min_progress =
    unit_from_f64(min_progress).ok_or_else(|| napi::Error::from_reason("bad min progress"))?;
  let result = cam::hspocket(&outline, cutter_dia, start, spiral_r, stepover, min_progress)
    .map_err(cam_err)?;
  Ok(encode_paths(&result))
}

/// V-pocket toolpaths (stride-3 output: x, y, z per vertex).
#[napi]
pub fn vpocket(
  paths: Vec<Vec<f64>>,
  cutter_angle_deg: f64,
  pass_depth: f64,
  max_depth: f64,
) -> napi::Result<Vec<Vec<f64>>> {
  let outline = decode_paths(&paths)?;
  let pass_depth =
    unit_from_f64(pass_depth).ok_or_else(|| napi::Error::from_reason("bad pass depth"))?;
  let max_depth =
    unit_from_f64(max_depth).ok_or_else(|| napi::Error::from_reason("bad max depth"))?;
  let result =
    cam::vpocket(&outline, cutter_angle_deg, pass_depth, max_depth).map_err(cam_err)?;
  Ok(encode_paths_xyz(&result))
}

/// Result of separating a toolpath at tab footprints: sub-paths in path
/// order and a parallel over-tab flag per sub-path.
#[napi(object)]
pub struct SeparatedTabs {
  pub paths: Vec<Vec<f64>>,
  pub over_tab: Vec<bool>,
}

/// Split an open toolpath into alternating over-tab / normal spans.
#[napi]
pub fn separate_tabs(path: Vec<f64>, tabs: Vec<Vec<f64>>) -> napi::Result<SeparatedTabs> {
  let path = decode_path(&path)?;
  let tabs = decode_paths(&tabs)?;
  let spans = cam::separate_tabs(&path, &tabs).map_err(cam_err)?;
  let over_tab = spans.iter().map(|s| s.over_tab).collect();
  let paths = encode_paths(
    &spans
      .into_iter()
      .map(|s| s.path)
      .collect::<Vec<Polygon>>(),
  );
  Ok(SeparatedTabs { paths, over_tab })
}
