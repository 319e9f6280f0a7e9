//! V-carve planning: medial-axis extraction from a segment Voronoi
//! diagram, depth lifting by the cutter half-angle, travel ordering, and
//! depth-pass synthesis.

use crate::{CamError, Result};
use boostvoronoi::prelude as bv;
use log::debug;
use opencut_types::{Point, PointWithZ, PolygonSet, Unit};
use polyscan::edge::{insert_edge, insert_polygon_set, sort_edges};
use polyscan::exact::intersect_edges;
use polyscan::scan::{scan, ScanCallback, ScanlineEdge};
use polyscan::winding::AccumulateWinding;
use polyscan::{clean_polygon_set, Edge};

/// Sample count for parabolic and point-generated medial edges.
const MEDIAL_SAMPLES: usize = 20;
/// Corner bisector edges are kept only below this generator angle; flatter
/// corners produce spurious medial stubs.
const CORNER_ANGLE_LIMIT_DEG: f64 = 95.0;

#[derive(Clone, Copy)]
struct Vec2 {
    x: f64,
    y: f64,
}

impl Vec2 {
    fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn dot(self, o: Self) -> f64 {
        self.x * o.x + self.y * o.y
    }

    fn sub(self, o: Self) -> Self {
        Self::new(self.x - o.x, self.y - o.y)
    }

    fn norm(self) -> f64 {
        self.dot(self).sqrt()
    }
}

fn line_start(line: &bv::Line<i64>) -> Vec2 {
    Vec2::new(line.start.x as f64, line.start.y as f64)
}

fn line_end(line: &bv::Line<i64>) -> Vec2 {
    Vec2::new(line.end.x as f64, line.end.y as f64)
}

fn dist_point_segment(p: Vec2, line: &bv::Line<i64>) -> f64 {
    let a = line_start(line);
    let b = line_end(line);
    let ab = b.sub(a);
    let len2 = ab.dot(ab);
    if len2 == 0.0 {
        return p.sub(a).norm();
    }
    let t = (p.sub(a).dot(ab) / len2).clamp(0.0, 1.0);
    let proj = Vec2::new(a.x + ab.x * t, a.y + ab.y * t);
    p.sub(proj).norm()
}

/// The point generator of a point cell: whichever endpoint of the cell's
/// source segment lies nearest the probe location.
fn cell_point(line: &bv::Line<i64>, probe: Vec2) -> Vec2 {
    let s = line_start(line);
    let e = line_end(line);
    if probe.sub(s).norm() <= probe.sub(e).norm() {
        s
    } else {
        e
    }
}

/// True when the two generator segments meet in a corner flat enough that
/// their bisector edge is noise rather than a carveable valley.
fn flat_corner(a: &bv::Line<i64>, b: &bv::Line<i64>) -> bool {
    let ends_a = [(a.start, a.end), (a.end, a.start)];
    let ends_b = [(b.start, b.end), (b.end, b.start)];
    for (ca, oa) in ends_a {
        for (cb, ob) in ends_b {
            if ca.x == cb.x && ca.y == cb.y {
                let u1 = Vec2::new((oa.x - ca.x) as f64, (oa.y - ca.y) as f64);
                let u2 = Vec2::new((ob.x - cb.x) as f64, (ob.y - cb.y) as f64);
                let n1 = u1.norm();
                let n2 = u2.norm();
                if n1 == 0.0 || n2 == 0.0 {
                    return false;
                }
                let cos_corner = u1.dot(u2) / n1 / n2;
                return cos_corner <= CORNER_ANGLE_LIMIT_DEG.to_radians().cos();
            }
        }
    }
    false
}

fn rounded(p: Vec2, z: Unit) -> PointWithZ {
    PointWithZ::new(p.x.round() as Unit, p.y.round() as Unit, z)
}

/// Sample a straight medial edge generated by a point site: depth varies
/// with the distance to the site.
fn sample_from_point<L: Fn(f64) -> Unit>(p0: Vec2, p1: Vec2, focus: Vec2, lift: &L) -> Vec<PointWithZ> {
    let mut out = Vec::with_capacity(MEDIAL_SAMPLES + 1);
    for i in 0..=MEDIAL_SAMPLES {
        let t = i as f64 / MEDIAL_SAMPLES as f64;
        let q = Vec2::new(p0.x + (p1.x - p0.x) * t, p0.y + (p1.y - p0.y) * t);
        out.push(rounded(q, lift(q.sub(focus).norm())));
    }
    out
}

/// Sample a parabolic medial edge by its focus (point site) and directrix
/// (segment site), evaluated in the directrix frame.
fn sample_parabola<L: Fn(f64) -> Unit>(
    p0: Vec2,
    p1: Vec2,
    focus: Vec2,
    directrix: &bv::Line<i64>,
    lift: &L,
) -> Vec<PointWithZ> {
    let a = line_start(directrix);
    let b = line_end(directrix);
    let ab = b.sub(a);
    let len = ab.norm();
    let u = Vec2::new(ab.x / len, ab.y / len);
    let mut n = Vec2::new(-u.y, u.x);
    let mut vf = focus.sub(a).dot(n);
    if vf < 0.0 {
        n = Vec2::new(-n.x, -n.y);
        vf = -vf;
    }
    if vf < 1e-9 {
        // Degenerate focus on the directrix.
        return sample_from_point(p0, p1, focus, lift);
    }
    let uf = focus.sub(a).dot(u);
    let u0 = p0.sub(a).dot(u);
    let u1 = p1.sub(a).dot(u);

    let mut out = Vec::with_capacity(MEDIAL_SAMPLES + 1);
    for i in 0..=MEDIAL_SAMPLES {
        let t = i as f64 / MEDIAL_SAMPLES as f64;
        let uc = u0 + (u1 - u0) * t;
        let vc = ((uc - uf) * (uc - uf) + vf * vf) / (2.0 * vf);
        let world = if i == 0 {
            p0
        } else if i == MEDIAL_SAMPLES {
            p1
        } else {
            Vec2::new(a.x + u.x * uc + n.x * vc, a.y + u.y * uc + n.y * vc)
        };
        out.push(rounded(world, lift(vc)));
    }
    out
}

/// Walk the Voronoi diagram once and lift its interior skeleton to depth.
fn medial_edges(
    geometry: &PolygonSet,
    segments: &[bv::Line<i64>],
    cutter_angle_deg: f64,
    max_depth: Unit,
) -> Result<Vec<Vec<PointWithZ>>> {
    let diagram = bv::Builder::<i64>::default()
        .with_segments(segments.iter())?
        .build()?;

    let tan_half = (cutter_angle_deg.to_radians() / 2.0).tan();
    let lift = move |dist: f64| -> Unit {
        (-dist / tan_half).max(max_depth as f64).round() as Unit
    };

    let mut medial: Vec<Vec<PointWithZ>> = Vec::new();
    let edge_cells = diagram.edges();
    let mut visited = vec![false; edge_cells.len()];
    let mut curved = 0usize;
    for eid in 0..edge_cells.len() {
        if visited[eid] {
            continue;
        }
        let edge = edge_cells[eid];
        let twin = edge
            .twin()
            .map_err(|_| CamError::Voronoi("edge without twin".to_string()))?
            .usize();
        visited[eid] = true;
        visited[twin] = true;
        if !edge.is_primary() {
            continue;
        }
        let (v0, v1) = match (edge.vertex0(), edge_cells[twin].vertex0()) {
            (Some(v0), Some(v1)) => (v0, v1),
            _ => continue, // infinite edge
        };
        let vx0 = &diagram.vertices()[v0.usize()];
        let vx1 = &diagram.vertices()[v1.usize()];
        let p0 = Vec2::new(vx0.x(), vx0.y());
        let p1 = Vec2::new(vx1.x(), vx1.y());
        let mid = Vec2::new((p0.x + p1.x) / 2.0, (p0.y + p1.y) / 2.0);

        let cell_id = edge
            .cell()
            .map_err(|_| CamError::Voronoi("edge without cell".to_string()))?
            .usize();
        let twin_cell_id = edge_cells[twin]
            .cell()
            .map_err(|_| CamError::Voronoi("edge without cell".to_string()))?
            .usize();
        let cell = &diagram.cells()[cell_id];
        let twin_cell = &diagram.cells()[twin_cell_id];
        let cell_line = &segments[cell.source_index().usize()];
        let twin_line = &segments[twin_cell.source_index().usize()];

        if edge.is_curved() {
            curved += 1;
            let (focus, directrix) = if cell.contains_point() {
                (cell_point(cell_line, mid), twin_line)
            } else {
                (cell_point(twin_line, mid), cell_line)
            };
            medial.push(sample_parabola(p0, p1, focus, directrix, &lift));
        } else if cell.contains_point() || twin_cell.contains_point() {
            let focus = if cell.contains_point() {
                cell_point(cell_line, mid)
            } else {
                cell_point(twin_line, mid)
            };
            medial.push(sample_from_point(p0, p1, focus, &lift));
        } else {
            if flat_corner(cell_line, twin_line) {
                continue;
            }
            let z0 = lift(dist_point_segment(p0, cell_line));
            let z1 = lift(dist_point_segment(p1, cell_line));
            medial.push(vec![rounded(p0, z0), rounded(p1, z1)]);
        }
    }
    debug!(
        "voronoi walk: {} medial edges ({} curved) from {} segments in {} polygons",
        medial.len(),
        curved,
        segments.len(),
        geometry.len()
    );
    Ok(medial)
}

/// Flags medial polylines observed outside the part interior.
struct ClipCollector {
    outside: Vec<bool>,
}

impl ScanCallback for ClipCollector {
    fn group(&mut self, _x: Unit, group: &mut [ScanlineEdge], edges: &mut [Edge]) {
        for se in group.iter() {
            let e = &edges[se.edge];
            if !e.is_geometry && se.winding_before == 0 && se.winding_after == 0 {
                self.outside[e.index] = true;
            }
        }
    }
}

/// Drop medial polylines that leave the interior of the geometry.
fn clip_to_interior(
    geometry: &PolygonSet,
    medial: Vec<Vec<PointWithZ>>,
) -> Result<Vec<Vec<PointWithZ>>> {
    let mut edges: Vec<Edge> = Vec::new();
    let r = insert_polygon_set(&mut edges, geometry, true);
    for e in &mut edges[r] {
        e.is_geometry = true;
    }
    for (mi, poly) in medial.iter().enumerate() {
        for w in poly.windows(2) {
            if let Some(k) = insert_edge(&mut edges, w[0].to_point(), w[1].to_point(), false) {
                edges[k].index = mi;
            }
        }
    }
    let mut edges = intersect_edges(edges)?;
    sort_edges(&mut edges);

    let mut acc = AccumulateWinding::first(|e: &Edge| e.is_geometry);
    let mut collector = ClipCollector {
        outside: vec![false; medial.len()],
    };
    scan(&mut edges, &mut [&mut acc as &mut dyn ScanCallback, &mut collector])?;

    let kept: Vec<Vec<PointWithZ>> = medial
        .into_iter()
        .zip(collector.outside)
        .filter_map(|(poly, outside)| if outside { None } else { Some(poly) })
        .collect();
    Ok(kept)
}

struct EndpointRecord {
    point: Point,
    z: Unit,
    other: Point,
    other_z: Unit,
    edge: usize,
    is_point2: bool,
}

fn rank(rec: &EndpointRecord, cur: Point) -> u8 {
    let shares = rec.point == cur;
    if shares && rec.other_z == 0 {
        3
    } else if shares && rec.z == 0 {
        2
    } else if shares {
        1
    } else {
        0
    }
}

/// Greedy travel ordering: prefer continuing a connected chain toward a
/// surface-level exit, otherwise jump to the nearest loose end.
fn order_edges(medial: Vec<Vec<PointWithZ>>) -> Vec<Vec<PointWithZ>> {
    let mut records: Vec<EndpointRecord> = Vec::with_capacity(medial.len() * 2);
    for (i, poly) in medial.iter().enumerate() {
        let first = poly[0];
        let last = *poly.last().expect("medial edges are non-empty");
        records.push(EndpointRecord {
            point: first.to_point(),
            z: first.z,
            other: last.to_point(),
            other_z: last.z,
            edge: i,
            is_point2: false,
        });
        records.push(EndpointRecord {
            point: last.to_point(),
            z: last.z,
            other: first.to_point(),
            other_z: first.z,
            edge: i,
            is_point2: true,
        });
    }
    records.sort_by_key(|r| r.point);

    let mut taken = vec![false; medial.len()];
    // Surface-level entry when one exists.
    let start = records.iter().position(|r| r.z == 0).unwrap_or(0);
    let mut cur = records[start].point;
    let mut cur_z = records[start].z;

    let mut ordered = Vec::with_capacity(medial.len());
    for _ in 0..medial.len() {
        let Some(ri) = best_candidate(&records, &taken, cur, cur_z) else {
            break;
        };
        let rec = &records[ri];
        let mut path = medial[rec.edge].clone();
        if rec.is_point2 {
            path.reverse();
        }
        taken[rec.edge] = true;
        cur = rec.other;
        cur_z = rec.other_z;
        ordered.push(path);
    }
    ordered
}

/// Score is (rank desc, |dz near| asc, |dz far| asc, planar distance asc);
/// the sorted index bounds the sweep by |dx| once a connected candidate
/// exists.
fn best_candidate(
    records: &[EndpointRecord],
    taken: &[bool],
    cur: Point,
    cur_z: Unit,
) -> Option<usize> {
    let mut best: Option<(u8, i64, i64, i128, usize)> = None;
    let center = records.partition_point(|r| r.point < cur);

    let mut consider = |i: usize, best: &mut Option<(u8, i64, i64, i128, usize)>| -> bool {
        let rec = &records[i];
        if taken[rec.edge] {
            return true;
        }
        let dx = rec.point.x as i128 - cur.x as i128;
        if let Some((rank_best, _, _, dist_best, _)) = best {
            if *rank_best >= 1 && dx * dx > *dist_best {
                return false;
            }
        }
        let dy = rec.point.y as i128 - cur.y as i128;
        let dist2 = dx * dx + dy * dy;
        let score = (
            rank(rec, cur),
            (cur_z as i64 - rec.z as i64).abs(),
            (cur_z as i64 - rec.other_z as i64).abs(),
            dist2,
            i,
        );
        let better = match best {
            None => true,
            Some((r, dzn, dzf, d2, _)) => {
                score.0 > *r
                    || (score.0 == *r && (score.1, score.2, score.3) < (*dzn, *dzf, *d2))
            }
        };
        if better {
            *best = Some(score);
        }
        true
    };

    // Walk outward from the current point in both directions of the
    // sorted index so the |dx| bound prunes early.
    let mut lo = center;
    let mut hi = center;
    let mut lo_alive = true;
    let mut hi_alive = hi < records.len();
    while lo_alive || hi_alive {
        if hi_alive {
            if hi < records.len() {
                hi_alive = consider(hi, &mut best);
                hi += 1;
            } else {
                hi_alive = false;
            }
        }
        if lo_alive {
            if lo > 0 {
                lo -= 1;
                lo_alive = consider(lo, &mut best);
            } else {
                lo_alive = false;
            }
        }
    }
    best.map(|(_, _, _, _, i)| i)
}

/// Split the ordered chain into depth passes: each connected span of
/// below-surface cutting is repeated at one pass depth per round,
/// alternating direction, with surface-level entry and exit moves.
fn split_into_passes(ordered: &[Vec<PointWithZ>], pass_depth: Unit) -> Vec<Vec<PointWithZ>> {
    let mut result = Vec::new();
    let mut span: Vec<PointWithZ> = Vec::new();
    for path in ordered {
        for (k, p) in path.iter().enumerate() {
            let connected = span.last().map_or(false, |l| l.to_point() == p.to_point());
            if k == 0 {
                if connected {
                    continue;
                }
                if !span.is_empty() {
                    flush_span(&mut result, &span, pass_depth);
                    span.clear();
                }
            }
            span.push(*p);
            if p.z == 0 && span.len() > 1 {
                flush_span(&mut result, &span, pass_depth);
                span.clear();
                span.push(*p);
            }
        }
    }
    flush_span(&mut result, &span, pass_depth);
    result
}

fn flush_span(result: &mut Vec<Vec<PointWithZ>>, span: &[PointWithZ], pass_depth: Unit) {
    if span.len() < 2 {
        return;
    }
    let min_z = span.iter().map(|p| p.z).min().expect("non-empty span");
    let depth = -min_z;
    let mut out: Vec<PointWithZ> = Vec::new();
    if span[0].z != 0 {
        out.push(PointWithZ::new(span[0].x, span[0].y, 0));
    }
    let mut offset = (depth - pass_depth).max(0);
    let mut forward = true;
    loop {
        if forward {
            for p in span.iter() {
                out.push(PointWithZ::new(p.x, p.y, (p.z + offset).min(0)));
            }
        } else {
            for p in span.iter().rev() {
                out.push(PointWithZ::new(p.x, p.y, (p.z + offset).min(0)));
            }
        }
        if offset == 0 {
            break;
        }
        offset = (offset - pass_depth).max(0);
        forward = !forward;
    }
    if let Some(last) = out.last().copied() {
        if last.z != 0 {
            out.push(PointWithZ::new(last.x, last.y, 0));
        }
    }
    result.push(out);
}

/// Plan a V-pocket: cut every interior point to the depth at which the
/// conical cutter touches both nearest boundary walls, split into passes.
pub fn vpocket(
    outline: &PolygonSet,
    cutter_angle_deg: f64,
    pass_depth: Unit,
    max_depth: Unit,
) -> Result<Vec<Vec<PointWithZ>>> {
    if !(cutter_angle_deg > 0.0 && cutter_angle_deg < 180.0) {
        return Err(CamError::IllegalInput(
            "cutter angle must be in (0, 180) degrees".to_string(),
        ));
    }
    if pass_depth <= 0 {
        return Err(CamError::IllegalInput(
            "pass depth must be positive".to_string(),
        ));
    }
    if max_depth > 0 {
        return Err(CamError::IllegalInput(
            "max depth must not be above the surface".to_string(),
        ));
    }

    let geometry = clean_polygon_set(outline)?;
    let mut segments: Vec<bv::Line<i64>> = Vec::new();
    for poly in &geometry {
        let n = poly.len();
        for i in 0..n {
            let a = poly[i];
            let b = poly[(i + 1) % n];
            if a != b {
                segments.push(bv::Line::new(
                    bv::Point {
                        x: a.x as i64,
                        y: a.y as i64,
                    },
                    bv::Point {
                        x: b.x as i64,
                        y: b.y as i64,
                    },
                ));
            }
        }
    }
    if segments.len() < 2 {
        return Err(CamError::DegenerateVoronoi);
    }

    let mut medial = medial_edges(&geometry, &segments, cutter_angle_deg, max_depth)?;
    medial.retain(|poly| {
        poly.windows(2)
            .any(|w| w[0].to_point() != w[1].to_point())
    });
    if medial.is_empty() {
        return Ok(Vec::new());
    }
    let medial = clip_to_interior(&geometry, medial)?;
    if medial.is_empty() {
        return Ok(Vec::new());
    }
    let ordered = order_edges(medial);
    Ok(split_into_passes(&ordered, pass_depth))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pz(x: Unit, y: Unit, z: Unit) -> PointWithZ {
        PointWithZ::new(x, y, z)
    }

    #[test]
    fn flat_corner_filter() {
        let mk = |x1, y1, x2, y2| {
            bv::Line::new(bv::Point { x: x1, y: y1 }, bv::Point { x: x2, y: y2 })
        };
        // Right angle: keep.
        assert!(!flat_corner(&mk(0, 0, 100, 0), &mk(0, 0, 0, 100)));
        // Nearly straight continuation: reject.
        assert!(flat_corner(&mk(0, 0, 100, 0), &mk(100, 0, 200, 3)));
        // No shared corner: keep.
        assert!(!flat_corner(&mk(0, 0, 100, 0), &mk(0, 50, 100, 50)));
    }

    #[test]
    fn span_depth_passes_alternate_and_step() {
        // A simple V dip to z = -25 with pass depth 10: three passes.
        let span = vec![pz(0, 0, 0), pz(50, 0, -25), pz(100, 0, 0)];
        let mut result = Vec::new();
        flush_span(&mut result, &span, 10);
        assert_eq!(result.len(), 1);
        let path = &result[0];
        // Pass offsets 15, 5, 0: z at the dip is -10, -20, -25.
        let dips: Vec<Unit> = path.iter().filter(|p| p.x == 50).map(|p| p.z).collect();
        assert_eq!(dips, vec![-10, -20, -25]);
        // Ends at the surface.
        assert_eq!(path.first().unwrap().z, 0);
        assert_eq!(path.last().unwrap().z, 0);
        // Alternating direction: consecutive passes share their turn
        // point.
        assert_eq!(path[2].to_point(), Point::new(100, 0));
        assert_eq!(path[3].to_point(), Point::new(100, 0));
    }

    #[test]
    fn shallow_span_is_a_single_pass() {
        let span = vec![pz(0, 0, 0), pz(50, 0, -8), pz(100, 0, 0)];
        let mut result = Vec::new();
        flush_span(&mut result, &span, 10);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].len(), 3);
        assert_eq!(result[0][1].z, -8);
    }

    #[test]
    fn ordering_starts_at_surface_and_chains() {
        let medial = vec![
            vec![pz(0, 0, 0), pz(50, 50, -20)],
            vec![pz(50, 50, -20), pz(100, 100, 0)],
        ];
        let ordered = order_edges(medial);
        assert_eq!(ordered.len(), 2);
        assert_eq!(ordered[0][0].z, 0);
        // The second edge continues from the first's far end.
        assert_eq!(
            ordered[0].last().unwrap().to_point(),
            ordered[1][0].to_point()
        );
    }
}
