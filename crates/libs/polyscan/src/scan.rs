//! The scanline driver.
//!
//! Sweeps sorted edges left to right. At each event x it refreshes the
//! active records, sorts them by (y intercept, at-endpoint, slope), and
//! hands each maximal group of co-located records to every callback in
//! turn. Vertical edges are represented by one record per endpoint so that
//! both of their vertex groups observe them; all vertical records die at
//! the end of their x event.

use crate::edge::Edge;
use crate::error::{Result, ScanError};
use crate::exact::{less_slope, YAtX};
use opencut_types::Unit;
use std::cmp::Ordering;

///////////////////////////////////////////////////////////////////////////////
// ScanlineEdge
///////////////////////////////////////////////////////////////////////////////

/// Transient projection of an edge onto the current scan x.
#[derive(Debug, Clone)]
pub struct ScanlineEdge {
    /// Index of the underlying edge in the operation's edge vector.
    pub edge: usize,
    pub y_intercept: YAtX,
    pub at_endpoint: bool,
    pub at_point1: bool,
    pub at_point2: bool,
    /// Winding numbers below/above (or left/right of) this record for the
    /// first operand.
    pub winding_before: i32,
    pub winding_after: i32,
    /// Independent pair for the second operand of a two-set Boolean.
    pub winding2_before: i32,
    pub winding2_after: i32,
}

impl ScanlineEdge {
    fn new(edge: usize, y_intercept: YAtX) -> Self {
        Self {
            edge,
            y_intercept,
            at_endpoint: false,
            at_point1: false,
            at_point2: false,
            winding_before: 0,
            winding_after: 0,
            winding2_before: 0,
            winding2_after: 0,
        }
    }
}

/// A pass over scanline groups. Callbacks see every group exactly once per
/// event, in the order they were supplied to `scan`.
pub trait ScanCallback {
    fn group(&mut self, scan_x: Unit, group: &mut [ScanlineEdge], edges: &mut [Edge]);
}

fn compare_records(a: &ScanlineEdge, b: &ScanlineEdge, edges: &[Edge]) -> Ordering {
    a.y_intercept
        .cmp(&b.y_intercept)
        .then(a.at_endpoint.cmp(&b.at_endpoint))
        .then_with(|| {
            let ea = &edges[a.edge];
            let eb = &edges[b.edge];
            if less_slope(ea.dx(), ea.dy(), eb.dx(), eb.dy()) {
                Ordering::Less
            } else if less_slope(eb.dx(), eb.dy(), ea.dx(), ea.dy()) {
                Ordering::Greater
            } else {
                Ordering::Equal
            }
        })
}

/// Run the scan over edges sorted by `sort_edges`.
pub fn scan(edges: &mut [Edge], callbacks: &mut [&mut dyn ScanCallback]) -> Result<()> {
    if edges.is_empty() {
        return Ok(());
    }

    let mut next_edge = 0usize;
    let mut active: Vec<ScanlineEdge> = Vec::new();
    let mut scan_x = edges[0].point1.x;

    while next_edge < edges.len() || !active.is_empty() {
        // Admit edges starting at this x.
        while next_edge < edges.len() && edges[next_edge].point1.x == scan_x {
            let e = &edges[next_edge];
            if e.is_vertical() {
                let mut lower = ScanlineEdge::new(next_edge, YAtX::from_int(e.point1.y));
                lower.at_point1 = true;
                lower.at_endpoint = true;
                let mut upper = ScanlineEdge::new(next_edge, YAtX::from_int(e.point2.y));
                upper.at_point2 = true;
                upper.at_endpoint = true;
                active.push(lower);
                active.push(upper);
            } else {
                active.push(ScanlineEdge::new(next_edge, YAtX::from_int(e.point1.y)));
            }
            next_edge += 1;
        }

        // Refresh the non-vertical records at this x.
        for se in active.iter_mut() {
            let e = &edges[se.edge];
            if e.is_vertical() {
                continue;
            }
            if scan_x < e.point1.x || scan_x > e.point2.x {
                return Err(ScanError::ExactPrimitiveFailure(format!(
                    "active edge does not span scan x {}",
                    scan_x
                )));
            }
            if scan_x == e.point1.x {
                se.y_intercept = YAtX::from_int(e.point1.y);
            } else if scan_x == e.point2.x {
                se.y_intercept = YAtX::from_int(e.point2.y);
            } else {
                se.y_intercept = YAtX::eval(scan_x, e.point1, e.point2);
            }
            se.at_point1 = scan_x == e.point1.x;
            se.at_point2 = scan_x == e.point2.x;
            se.at_endpoint = se.at_point1 || se.at_point2;
        }

        {
            let edges_ref: &[Edge] = edges;
            active.sort_by(|a, b| compare_records(a, b, edges_ref));
        }

        // Partition into groups and run the callback chain.
        let mut i = 0;
        while i < active.len() {
            let mut j = i + 1;
            if active[i].at_endpoint {
                while j < active.len()
                    && active[j].at_endpoint
                    && active[j].y_intercept == active[i].y_intercept
                {
                    j += 1;
                }
            }
            for cb in callbacks.iter_mut() {
                cb.group(scan_x, &mut active[i..j], edges);
            }
            i = j;
        }

        // Retire finished records: non-verticals at their far endpoint, and
        // every vertical record (verticals live for exactly one event).
        active.retain(|se| !se.at_point2 && !edges[se.edge].is_vertical());

        // Advance to the next event.
        let mut next_x: Option<Unit> = None;
        for se in &active {
            let x2 = edges[se.edge].point2.x;
            next_x = Some(next_x.map_or(x2, |v: Unit| v.min(x2)));
        }
        if next_edge < edges.len() {
            let x1 = edges[next_edge].point1.x;
            next_x = Some(next_x.map_or(x1, |v: Unit| v.min(x1)));
        }
        match next_x {
            Some(x) => scan_x = x,
            None => break,
        }
    }
    Ok(())
}
