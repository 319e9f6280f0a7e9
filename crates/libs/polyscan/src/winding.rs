//! Winding-number accumulation over scanline groups.
//!
//! Two persistent counters track the winding number just below the sweep
//! position on either side of the scan line: `right` advances over edges
//! that extend past scanX (ascending group order), `left` over edges that
//! arrive from before scanX (descending group order, which is ascending in
//! y on that side). Every record receives before/after values from the
//! counter of its own side; the two agree for mid-span records.
//!
//! Vertical edges are recorded against the left counter and their
//! additions are undone when the cluster ends: a vertical contributes to
//! the winding the scanline sees while sweeping over it, but not to the
//! horizontal propagation.

use crate::edge::Edge;
use crate::scan::{ScanCallback, ScanlineEdge};
use opencut_types::Unit;

/// Which before/after pair of the record an accumulator writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    First,
    Second,
}

pub struct AccumulateWinding<S> {
    select: S,
    operand: Operand,
    left: i32,
    right: i32,
}

impl<S: Fn(&Edge) -> bool> AccumulateWinding<S> {
    /// Accumulator for the first operand, counting edges picked by
    /// `select`.
    pub fn first(select: S) -> Self {
        Self {
            select,
            operand: Operand::First,
            left: 0,
            right: 0,
        }
    }

    /// Independent accumulator for the second operand of a two-set
    /// Boolean.
    pub fn second(select: S) -> Self {
        Self {
            select,
            operand: Operand::Second,
            left: 0,
            right: 0,
        }
    }

    fn counts(&self, e: &Edge) -> bool {
        !e.exclude && (self.select)(e)
    }

    fn record(&self, se: &mut ScanlineEdge, before: i32, after: i32) {
        match self.operand {
            Operand::First => {
                se.winding_before = before;
                se.winding_after = after;
            }
            Operand::Second => {
                se.winding2_before = before;
                se.winding2_after = after;
            }
        }
    }
}

impl<S: Fn(&Edge) -> bool> ScanCallback for AccumulateWinding<S> {
    fn group(&mut self, _scan_x: Unit, group: &mut [ScanlineEdge], edges: &mut [Edge]) {
        // Vertical records at their upper endpoint: the edge spans the
        // column below this vertex. Recorded from the arriving left
        // counter, additions undone.
        let mut w = self.left;
        for se in group.iter_mut() {
            let e = &edges[se.edge];
            if e.is_vertical() && se.at_point2 {
                let before = w;
                if self.counts(e) {
                    w += e.delta_winding_number;
                }
                self.record(se, before, w);
            }
        }

        // Right side, ascending: edges extending past scanX.
        for se in group.iter_mut() {
            let e = &edges[se.edge];
            if !e.is_vertical() && !se.at_point2 {
                let before = self.right;
                if self.counts(e) {
                    self.right += e.delta_winding_number;
                }
                self.record(se, before, self.right);
            }
        }

        // Left side, descending: edges arriving from before scanX.
        for se in group.iter_mut().rev() {
            let e = &edges[se.edge];
            if !e.is_vertical() && !se.at_point1 {
                let before = self.left;
                if self.counts(e) {
                    self.left += e.delta_winding_number;
                }
                self.record(se, before, self.left);
            }
        }

        // Vertical records at their lower endpoint: the edge spans the
        // column above this vertex. Recorded from the advanced left
        // counter, additions undone.
        let mut w = self.left;
        for se in group.iter_mut() {
            let e = &edges[se.edge];
            if e.is_vertical() && se.at_point1 {
                let before = w;
                if self.counts(e) {
                    w += e.delta_winding_number;
                }
                self.record(se, before, w);
            }
        }
    }
}
