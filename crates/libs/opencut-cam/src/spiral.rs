//! The clockwise Archimedean seed spiral for pocketing, and its trim
//! against the safe area.

use crate::{Result, SPIRAL_ARC_TOLERANCE};
use log::debug;
use opencut_types::{Point, Polygon, PolygonSet, Unit};
use polyscan::edge::{insert_edge, insert_polygon_set, sort_edges};
use polyscan::exact::intersect_edges;
use polyscan::scan::{scan, ScanCallback, ScanlineEdge};
use polyscan::winding::AccumulateWinding;
use polyscan::{delta_angle_for_error, Edge};

/// Build a clockwise Archimedean spiral with radius advancing one stepover
/// per turn, chord-linearized at the coarse spiral tolerance, stopping at
/// `spiral_r`.
pub fn create_spiral(stepover: Unit, start: Point, spiral_r: f64) -> Polygon {
    let mut spiral = Polygon::new();
    let mut angle: f64 = 0.0;
    loop {
        let r = angle / std::f64::consts::PI / 2.0 * stepover as f64;
        spiral.push(Point::new(
            (r * (-angle).cos() + start.x as f64).round() as Unit,
            (r * (-angle).sin() + start.y as f64).round() as Unit,
        ));
        let delta_angle =
            delta_angle_for_error(SPIRAL_ARC_TOLERANCE as f64, r.max(SPIRAL_ARC_TOLERANCE as f64));
        angle += delta_angle;
        if r >= spiral_r {
            break;
        }
    }
    debug!("spiral: {} points", spiral.len());
    spiral
}

/// Collects the first spiral point index observed outside the geometry.
struct TrimCollector {
    end_index: usize,
}

impl ScanCallback for TrimCollector {
    fn group(&mut self, _x: Unit, group: &mut [ScanlineEdge], edges: &mut [Edge]) {
        for se in group.iter() {
            let e = &edges[se.edge];
            if !e.is_geometry
                && se.winding_before == 0
                && se.winding_after == 0
                && e.index < self.end_index
            {
                self.end_index = e.index;
            }
        }
    }
}

/// Truncate the spiral at the first point that leaves the safe area.
pub fn trim_spiral(spiral: &mut Polygon, safe: &PolygonSet) -> Result<()> {
    if spiral.is_empty() {
        return Ok(());
    }
    let mut edges: Vec<Edge> = Vec::new();
    let r = insert_polygon_set(&mut edges, safe, true);
    for e in &mut edges[r] {
        e.is_geometry = true;
    }
    for i in 0..spiral.len() - 1 {
        if let Some(k) = insert_edge(&mut edges, spiral[i], spiral[i + 1], false) {
            edges[k].index = i;
        }
    }
    let mut edges = intersect_edges(edges)?;
    sort_edges(&mut edges);

    let mut acc = AccumulateWinding::first(|e: &Edge| e.is_geometry);
    let mut collector = TrimCollector {
        end_index: spiral.len(),
    };
    scan(&mut edges, &mut [&mut acc as &mut dyn ScanCallback, &mut collector])?;

    debug!(
        "spiral trim: {} of {} points survive",
        collector.end_index.min(spiral.len()),
        spiral.len()
    );
    spiral.truncate(collector.end_index);
    Ok(())
}
