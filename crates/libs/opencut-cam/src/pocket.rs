//! High-speed pocket planning: seed spiral, then greedy growth of the cut
//! area one stepover at a time.

use crate::spiral::{create_spiral, trim_spiral};
use crate::{Result, ARC_TOLERANCE};
use log::debug;
use opencut_types::{point_distance, Point, Polygon, PolygonSet, Unit};
use polyscan::{
    combine_polygon_sets, offset_polygon, offset_polygon_set, open_difference, BooleanOp,
    OffsetKind,
};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Upper bound on planner iterations; each accepted candidate grows the
/// cut area by at least the acceptance test, so real parts finish far
/// earlier.
const MAX_POCKET_ITERATIONS: usize = 1024;

struct CandidatePath {
    path: Polygon,
    dist_to_current_pos: f64,
}

impl PartialEq for CandidatePath {
    fn eq(&self, other: &Self) -> bool {
        self.dist_to_current_pos == other.dist_to_current_pos
    }
}

impl Eq for CandidatePath {}

impl PartialOrd for CandidatePath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CandidatePath {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse: the heap pops the nearest candidate first.
        other
            .dist_to_current_pos
            .total_cmp(&self.dist_to_current_pos)
    }
}

/// Clear the interior of `outline` with a cutter of the given diameter.
/// Returns the cutter centre paths in cutting order, starting with the
/// seed spiral.
pub fn hspocket(
    outline: &PolygonSet,
    cutter_dia: Unit,
    start: Point,
    spiral_r: f64,
    stepover: Unit,
    min_progress: Unit,
) -> Result<Vec<Polygon>> {
    if cutter_dia <= 0 || stepover <= 0 || min_progress <= 0 {
        return Err(crate::CamError::IllegalInput(
            "cutter diameter, stepover, and min progress must be positive".to_string(),
        ));
    }

    let safe = offset_polygon_set(outline, -cutter_dia / 2, ARC_TOLERANCE, OffsetKind::Closed)?;
    if safe.is_empty() {
        return Ok(Vec::new());
    }

    let mut spiral = create_spiral(stepover, start, spiral_r);
    trim_spiral(&mut spiral, &safe)?;
    if spiral.len() < 2 {
        return Ok(Vec::new());
    }

    // Frontier smoothing radius: features of front ∩ safe narrower than
    // twice this vanish in the shrink/grow pass.
    let min_radius = cutter_dia / 8;
    let mut cutter_paths: Vec<Polygon> = vec![spiral];
    let mut cut_area =
        offset_polygon_set(&cutter_paths, cutter_dia / 2, ARC_TOLERANCE, OffsetKind::Open)?;
    let mut current_pos = *cutter_paths[0].last().expect("spiral has points");

    for pass in 0..MAX_POCKET_ITERATIONS {
        // Frontier one stepover ahead of the cleared area, and the
        // minimum-progress line behind it.
        let front = offset_polygon_set(
            &cut_area,
            -cutter_dia / 2 + stepover,
            ARC_TOLERANCE,
            OffsetKind::Closed,
        )?;
        let back = offset_polygon_set(
            &front,
            min_progress - stepover,
            ARC_TOLERANCE,
            OffsetKind::Closed,
        )?;

        let mut q = combine_polygon_sets(&front, &safe, BooleanOp::Intersect)?;
        q = offset_polygon_set(&q, -min_radius, ARC_TOLERANCE, OffsetKind::Closed)?;
        q = offset_polygon_set(&q, min_radius, ARC_TOLERANCE, OffsetKind::Closed)?;
        if q.is_empty() {
            debug!("pocket: frontier exhausted after {} passes", pass);
            break;
        }

        let paths = open_difference(&q, &back)?;
        let mut candidates: BinaryHeap<CandidatePath> = paths
            .into_iter()
            .filter(|p| p.len() >= 2)
            .map(|p| CandidatePath {
                dist_to_current_pos: point_distance(*p.last().expect("non-empty"), current_pos),
                path: p,
            })
            .collect();

        let mut found = false;
        while let Some(mut candidate) = candidates.pop() {
            candidate.path.reverse();
            let closed = candidate.path.first() == candidate.path.last();
            let new_cut_area = offset_polygon(
                &candidate.path,
                cutter_dia / 2,
                ARC_TOLERANCE,
                if closed {
                    OffsetKind::Closed
                } else {
                    OffsetKind::Open
                },
            )?;
            let gained = combine_polygon_sets(&new_cut_area, &cut_area, BooleanOp::Difference)?;
            if gained.is_empty() {
                continue;
            }
            cut_area = combine_polygon_sets(&cut_area, &new_cut_area, BooleanOp::Union)?;
            current_pos = *candidate.path.last().expect("non-empty");
            cutter_paths.push(candidate.path);
            found = true;
            break;
        }

        if !found {
            debug!("pocket: no candidate makes progress, stopping");
            break;
        }
    }

    Ok(cutter_paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearest_candidate_pops_first() {
        let mut heap = BinaryHeap::new();
        heap.push(CandidatePath {
            path: vec![Point::new(0, 0)],
            dist_to_current_pos: 50.0,
        });
        heap.push(CandidatePath {
            path: vec![Point::new(1, 1)],
            dist_to_current_pos: 10.0,
        });
        heap.push(CandidatePath {
            path: vec![Point::new(2, 2)],
            dist_to_current_pos: 30.0,
        });
        assert_eq!(heap.pop().unwrap().dist_to_current_pos, 10.0);
        assert_eq!(heap.pop().unwrap().dist_to_current_pos, 30.0);
    }
}
