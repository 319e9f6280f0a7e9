//! Scanline passes that cancel duplicates and pair edges into output
//! rings/chains.

use crate::edge::Edge;
use crate::scan::{ScanCallback, ScanlineEdge};
use opencut_types::Unit;

///////////////////////////////////////////////////////////////////////////////
// ExcludeOppositeEdges
///////////////////////////////////////////////////////////////////////////////

/// Cancels pairs of edges with identical geometry and opposite winding
/// delta. Two such edges net to zero; later passes skip excluded edges.
pub struct ExcludeOppositeEdges;

impl ScanCallback for ExcludeOppositeEdges {
    fn group(&mut self, _scan_x: Unit, group: &mut [ScanlineEdge], edges: &mut [Edge]) {
        for i in 0..group.len() {
            let ei = group[i].edge;
            if edges[ei].exclude {
                continue;
            }
            for j in i + 1..group.len() {
                let ej = group[j].edge;
                if ej == ei || edges[ej].exclude {
                    continue;
                }
                if edges[ei].delta_winding_number == -edges[ej].delta_winding_number
                    && edges[ei].point1 == edges[ej].point1
                    && edges[ei].point2 == edges[ej].point2
                {
                    edges[ei].exclude = true;
                    edges[ej].exclude = true;
                    break;
                }
            }
        }
    }
}

///////////////////////////////////////////////////////////////////////////////
// CombinePairs
///////////////////////////////////////////////////////////////////////////////

/// How a pair-combination pass selects output edges.
pub enum PairCondition {
    /// Boundary of a region defined by a membership test on the two
    /// winding numbers. Coincident duplicate edges are evaluated as one
    /// run: membership must flip across the whole run, and the run is
    /// represented by its first edge oriented with the region interior on
    /// its left. This is what suppresses one of two overlapping
    /// coincident edges.
    Region(fn(i32, i32) -> bool),
    /// Per-edge filter for open-path clipping; orientation comes from the
    /// edge's own source direction.
    OpenEdge(fn(&ScanlineEdge, &Edge) -> bool),
}

/// Pairs eligible edges at each vertex group: every selected record that
/// touches the group's point is classified by its output orientation;
/// incoming records in group order pair with outgoing records in reverse
/// order, and `combine` links them.
pub struct CombinePairs<F> {
    condition: PairCondition,
    combine: F,
}

impl<F> CombinePairs<F>
where
    F: FnMut(&mut [Edge], usize, usize),
{
    pub fn new(condition: PairCondition, combine: F) -> Self {
        Self { condition, combine }
    }
}

/// Run-wide winding pairs: the values below and above the whole run of
/// coincident records. Records were filled in group order for right-side
/// and vertical records and in reverse order for left-side (ending)
/// records.
fn run_windings(run: &[ScanlineEdge], edges: &[Edge]) -> ((i32, i32), (i32, i32)) {
    let first = &run[0];
    let last = &run[run.len() - 1];
    let e = &edges[first.edge];
    if !e.is_vertical() && first.at_point2 {
        (
            (last.winding_before, first.winding_after),
            (last.winding2_before, first.winding2_after),
        )
    } else {
        (
            (first.winding_before, last.winding_after),
            (first.winding2_before, last.winding2_after),
        )
    }
}

impl<F> ScanCallback for CombinePairs<F>
where
    F: FnMut(&mut [Edge], usize, usize),
{
    fn group(&mut self, _scan_x: Unit, group: &mut [ScanlineEdge], edges: &mut [Edge]) {
        let mut incoming: Vec<usize> = Vec::new();
        let mut outgoing: Vec<usize> = Vec::new();

        match self.condition {
            PairCondition::Region(membership) => {
                let mut i = 0;
                while i < group.len() {
                    let ei = group[i].edge;
                    let mut j = i + 1;
                    while j < group.len()
                        && edges[group[j].edge].point1 == edges[ei].point1
                        && edges[group[j].edge].point2 == edges[ei].point2
                    {
                        j += 1;
                    }
                    if !group[i].at_point1 && !group[i].at_point2 {
                        i = j;
                        continue;
                    }
                    let ((b1, a1), (b2, a2)) = run_windings(&group[i..j], edges);
                    if membership(b1, b2) != membership(a1, a2) {
                        // Orient the boundary with the interior on its
                        // left: above for a rightward edge, right of a
                        // downward one.
                        let interior_high = membership(a1, a2);
                        let desired_swapped = if edges[ei].is_vertical() {
                            interior_high
                        } else {
                            !interior_high
                        };
                        if let Some(k) = (i..j).find(|&k| {
                            let e = &edges[group[k].edge];
                            !e.exclude && e.swapped() == desired_swapped
                        }) {
                            let idx = group[k].edge;
                            edges[idx].kept = true;
                            let arrives = if group[k].at_point1 {
                                desired_swapped
                            } else {
                                !desired_swapped
                            };
                            if arrives {
                                incoming.push(idx);
                            } else {
                                outgoing.push(idx);
                            }
                        }
                    }
                    i = j;
                }
            }
            PairCondition::OpenEdge(filter) => {
                for se in group.iter() {
                    if !se.at_point1 && !se.at_point2 {
                        continue;
                    }
                    let e = &edges[se.edge];
                    if e.exclude || !filter(se, e) {
                        continue;
                    }
                    let idx = se.edge;
                    edges[idx].kept = true;
                    let arrives = if se.at_point1 {
                        edges[idx].swapped()
                    } else {
                        !edges[idx].swapped()
                    };
                    if arrives {
                        incoming.push(idx);
                    } else {
                        outgoing.push(idx);
                    }
                }
            }
        }

        for (k, &inc) in incoming.iter().enumerate() {
            if k < outgoing.len() {
                let out = outgoing[outgoing.len() - 1 - k];
                (self.combine)(edges, inc, out);
            }
        }
    }
}

///////////////////////////////////////////////////////////////////////////////
// Conditions and combiners
///////////////////////////////////////////////////////////////////////////////

/// Membership of the positively wound region of the first operand.
pub fn positive_winding(w1: i32, _w2: i32) -> bool {
    w1 > 0
}

/// Open-minus-closed: keep first-operand edges not strictly inside the
/// second operand.
pub fn open_minus_closed(se: &ScanlineEdge, e: &Edge) -> bool {
    e.id == 0 && !(se.winding2_before > 0 && se.winding2_after > 0)
}

/// Link the arriving edge to the departing one.
pub fn set_next(edges: &mut [Edge], incoming: usize, outgoing: usize) {
    edges[incoming].next = Some(outgoing);
}

/// Link both directions, for open-chain reassembly.
pub fn set_next_and_prev(edges: &mut [Edge], incoming: usize, outgoing: usize) {
    edges[incoming].next = Some(outgoing);
    edges[outgoing].prev = Some(incoming);
}
