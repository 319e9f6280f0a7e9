//! End-to-end Boolean operations: decompose, intersect, sort, scan with
//! the right callback chain, then reassemble rings or open chains.

use crate::combine::{
    open_minus_closed, positive_winding, set_next, set_next_and_prev, CombinePairs,
    ExcludeOppositeEdges, PairCondition,
};
use crate::edge::{insert_polygon_set, sort_edges, Edge};
use crate::error::{Result, ScanError};
use crate::exact::intersect_edges;
use crate::scan::{scan, ScanCallback};
use crate::winding::AccumulateWinding;
use log::debug;
use opencut_types::{Polygon, PolygonSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanOp {
    Union,
    Intersect,
    Difference,
}

fn included_union(w1: i32, w2: i32) -> bool {
    w1 > 0 || w2 > 0
}

fn included_intersect(w1: i32, w2: i32) -> bool {
    w1 > 0 && w2 > 0
}

/// Difference membership, with the second operand inserted reversed so
/// that its interior winds negative and its boundary edges already carry
/// the hole orientation.
fn included_difference(w1: i32, w2: i32) -> bool {
    w1 > 0 && w2 >= 0
}

/// Boolean combination of two polygon sets. The result is always
/// winding-normalized: counterclockwise rings, positive interior.
pub fn combine_polygon_sets(a: &PolygonSet, b: &PolygonSet, op: BooleanOp) -> Result<PolygonSet> {
    let included = match op {
        BooleanOp::Union => included_union,
        BooleanOp::Intersect => included_intersect,
        BooleanOp::Difference => included_difference,
    };

    let mut edges: Vec<Edge> = Vec::new();
    insert_polygon_set(&mut edges, a, true);
    let rb = if op == BooleanOp::Difference {
        let reversed: PolygonSet = b
            .iter()
            .map(|p| p.iter().rev().copied().collect())
            .collect();
        insert_polygon_set(&mut edges, &reversed, true)
    } else {
        insert_polygon_set(&mut edges, b, true)
    };
    for e in &mut edges[rb] {
        e.id = 1;
    }
    let mut edges = intersect_edges(edges)?;
    sort_edges(&mut edges);
    debug!("boolean {:?}: {} edges after intersection", op, edges.len());

    let mut acc1 = AccumulateWinding::first(|e: &Edge| e.id == 0);
    let mut acc2 = AccumulateWinding::second(|e: &Edge| e.id == 1);
    let mut pairs = CombinePairs::new(PairCondition::Region(included), set_next);
    scan(&mut edges, &mut [&mut acc1 as &mut dyn ScanCallback, &mut acc2, &mut pairs])?;

    extract_rings(&mut edges)
}

/// Normalize a single set: drop opposite-winding duplicates, resolve
/// self-intersections, keep the boundary of the positively wound region.
pub fn clean_polygon_set(ps: &PolygonSet) -> Result<PolygonSet> {
    let mut edges: Vec<Edge> = Vec::new();
    insert_polygon_set(&mut edges, ps, true);
    let mut edges = intersect_edges(edges)?;
    sort_edges(&mut edges);
    debug!("clean: {} edges after intersection", edges.len());

    let mut exclude = ExcludeOppositeEdges;
    let mut acc = AccumulateWinding::first(|_: &Edge| true);
    let mut pairs = CombinePairs::new(PairCondition::Region(positive_winding), set_next);
    scan(&mut edges, &mut [&mut exclude as &mut dyn ScanCallback, &mut acc, &mut pairs])?;

    extract_rings(&mut edges)
}

/// The parts of `subject`'s ring boundaries outside the `clip` region,
/// reassembled as open polylines. Chains that survive whole come back as
/// closed polylines (first point repeated at the end).
pub fn open_difference(subject: &PolygonSet, clip: &PolygonSet) -> Result<PolygonSet> {
    let mut edges: Vec<Edge> = Vec::new();
    insert_polygon_set(&mut edges, subject, true);
    let rb = insert_polygon_set(&mut edges, clip, true);
    for e in &mut edges[rb] {
        e.id = 1;
    }
    let mut edges = intersect_edges(edges)?;
    sort_edges(&mut edges);

    let mut acc2 = AccumulateWinding::second(|e: &Edge| e.id == 1);
    let mut pairs = CombinePairs::new(PairCondition::OpenEdge(open_minus_closed), set_next_and_prev);
    scan(&mut edges, &mut [&mut acc2 as &mut dyn ScanCallback, &mut pairs])?;

    extract_open(&mut edges)
}

/// Walk `next` pointers into closed rings, emitting the output-direction
/// start point of each edge. Links are cleared as they are consumed so
/// repeat extraction is safe.
pub fn extract_rings(edges: &mut [Edge]) -> Result<PolygonSet> {
    let mut out = PolygonSet::new();
    for start in 0..edges.len() {
        if edges[start].next.is_none() {
            continue;
        }
        let mut ring = Polygon::new();
        let mut cur = start;
        loop {
            let e = &edges[cur];
            ring.push(if e.swapped() { e.point2 } else { e.point1 });
            let next = e.next;
            edges[cur].next = None;
            match next {
                Some(n) => cur = n,
                None => return Err(ScanError::PathReconstructionFailed),
            }
            if cur == start {
                break;
            }
            if ring.len() > edges.len() {
                return Err(ScanError::PathReconstructionFailed);
            }
        }
        if ring.len() >= 3 {
            out.push(ring);
        }
    }
    Ok(out)
}

/// Walk kept edges into open chains: back along `prev` to the head, then
/// forward along `next`. A chain that closes on itself is emitted with its
/// first point repeated.
pub fn extract_open(edges: &mut [Edge]) -> Result<PolygonSet> {
    let mut out = PolygonSet::new();
    let mut visited = vec![false; edges.len()];
    for i in 0..edges.len() {
        if !edges[i].kept || visited[i] {
            continue;
        }
        // Find the chain head, watching for cycles.
        let mut head = i;
        let mut steps = 0usize;
        loop {
            match edges[head].prev {
                Some(p) if p == i => {
                    // Closed chain: start anywhere.
                    head = i;
                    break;
                }
                Some(p) => {
                    head = p;
                    steps += 1;
                    if steps > edges.len() {
                        return Err(ScanError::PathReconstructionFailed);
                    }
                }
                None => break,
            }
        }

        let mut path = Polygon::new();
        path.push(edges[head].source_start());
        let mut cur = head;
        loop {
            visited[cur] = true;
            path.push(edges[cur].source_end());
            match edges[cur].next {
                Some(n) if !visited[n] => cur = n,
                _ => break,
            }
        }
        out.push(path);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencut_types::{polygon_area, polygon_set_area, Point};

    fn square(x0: i32, y0: i32, size: i32) -> Polygon {
        vec![
            Point::new(x0, y0),
            Point::new(x0 + size, y0),
            Point::new(x0 + size, y0 + size),
            Point::new(x0, y0 + size),
        ]
    }

    #[test]
    fn clean_passes_a_simple_square_through() {
        let ps = vec![square(0, 0, 100)];
        let cleaned = clean_polygon_set(&ps).unwrap();
        assert_eq!(cleaned.len(), 1);
        assert_eq!(polygon_area(&cleaned[0]), 10_000.0);
        assert_eq!(cleaned[0].len(), 4);
    }

    #[test]
    fn clean_drops_a_clockwise_ring() {
        let mut cw = square(0, 0, 100);
        cw.reverse();
        let cleaned = clean_polygon_set(&vec![cw]).unwrap();
        assert!(cleaned.is_empty());
    }

    #[test]
    fn union_of_disjoint_squares_keeps_both() {
        let a = vec![square(0, 0, 100)];
        let b = vec![square(200, 0, 100)];
        let u = combine_polygon_sets(&a, &b, BooleanOp::Union).unwrap();
        assert_eq!(u.len(), 2);
        assert_eq!(polygon_set_area(&u), 20_000.0);
    }

    #[test]
    fn intersection_of_overlapping_squares() {
        let a = vec![square(0, 0, 100)];
        let b = vec![square(50, 50, 100)];
        let i = combine_polygon_sets(&a, &b, BooleanOp::Intersect).unwrap();
        assert_eq!(i.len(), 1);
        assert_eq!(polygon_area(&i[0]), 2_500.0);
    }

    #[test]
    fn difference_carves_a_corner() {
        let a = vec![square(0, 0, 100)];
        let b = vec![square(50, 50, 100)];
        let d = combine_polygon_sets(&a, &b, BooleanOp::Difference).unwrap();
        assert_eq!(polygon_set_area(&d), 7_500.0);
    }

    #[test]
    fn open_difference_clips_ring_to_open_chains() {
        // A ring crossing a clip square: the surviving boundary comes back
        // as open chains, endpoints on the clip boundary.
        let subject = vec![square(0, 0, 100)];
        let clip = vec![square(50, -10, 200)];
        let paths = open_difference(&subject, &clip).unwrap();
        assert!(!paths.is_empty());
        for path in &paths {
            assert!(path.len() >= 2);
            for p in path {
                assert!(p.x <= 50);
            }
        }
    }

    #[test]
    fn open_difference_keeps_untouched_ring_closed() {
        let subject = vec![square(0, 0, 100)];
        let clip = vec![square(500, 500, 10)];
        let paths = open_difference(&subject, &clip).unwrap();
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].first(), paths[0].last());
        assert_eq!(paths[0].len(), 5);
    }
}
