//! Splitting an open toolpath at tab footprints into alternating
//! over-tab / normal spans.

use crate::Result;
use itertools::Itertools;
use log::debug;
use opencut_types::{ManhattanArea, Polygon, PolygonSet, Unit};
use polyscan::edge::{insert_edge, insert_polygon_set, sort_edges};
use polyscan::exact::intersect_edges;
use polyscan::scan::{scan, ScanCallback, ScanlineEdge};
use polyscan::winding::AccumulateWinding;
use polyscan::{Edge, ScanError};

/// A run of the toolpath that is either entirely over tabs or entirely
/// clear of them.
#[derive(Debug, Clone, PartialEq)]
pub struct TabSpan {
    pub path: Polygon,
    pub over_tab: bool,
}

/// Labels toolpath fragments that lie inside the tab winding.
struct TabLabeler;

impl ScanCallback for TabLabeler {
    fn group(&mut self, _x: Unit, group: &mut [ScanlineEdge], edges: &mut [Edge]) {
        for se in group.iter() {
            let e = &mut edges[se.edge];
            if e.id == 0 && se.winding_before != 0 && se.winding_after != 0 {
                e.over_tab = true;
            }
        }
    }
}

/// Split `path` wherever it enters or leaves the tab footprints. Spans come
/// back in path order with their over-tab flag; consecutive spans share
/// their boundary point.
pub fn separate_tabs(path: &Polygon, tabs: &PolygonSet) -> Result<Vec<TabSpan>> {
    if path.len() < 2 {
        return Ok(Vec::new());
    }

    let mut edges: Vec<Edge> = Vec::new();
    for (i, (a, b)) in path.iter().tuple_windows().enumerate() {
        if let Some(k) = insert_edge(&mut edges, *a, *b, false) {
            edges[k].index = i;
        }
    }
    let r = insert_polygon_set(&mut edges, tabs, true);
    for e in &mut edges[r] {
        e.id = 1;
    }
    let mut edges = intersect_edges(edges)?;
    sort_edges(&mut edges);

    let mut acc = AccumulateWinding::first(|e: &Edge| e.id == 1);
    let mut labeler = TabLabeler;
    scan(&mut edges, &mut [&mut acc as &mut dyn ScanCallback, &mut labeler])?;

    // Re-chain the fragments in original path order; within one source
    // edge they sort by advance along its direction.
    let source_count = path.len() - 1;
    let mut fragments: Vec<Vec<usize>> = vec![Vec::new(); source_count];
    for (k, e) in edges.iter().enumerate() {
        if e.id == 0 {
            fragments[e.index].push(k);
        }
    }
    for (i, list) in fragments.iter_mut().enumerate() {
        let dir = path[i + 1] - path[i];
        list.sort_by_key(|&k| {
            let s = edges[k].source_start() - path[i];
            s.x as ManhattanArea * dir.x as ManhattanArea
                + s.y as ManhattanArea * dir.y as ManhattanArea
        });
    }

    let mut spans: Vec<TabSpan> = Vec::new();
    let mut cur = path[0];
    let mut cur_flag: Option<bool> = None;
    let mut span: Polygon = vec![cur];
    for list in &fragments {
        for &k in list {
            let e = &edges[k];
            if e.source_start() != cur {
                return Err(ScanError::PathReconstructionFailed.into());
            }
            match cur_flag {
                None => cur_flag = Some(e.over_tab),
                Some(flag) if flag != e.over_tab => {
                    spans.push(TabSpan {
                        path: std::mem::replace(&mut span, vec![cur]),
                        over_tab: flag,
                    });
                    cur_flag = Some(e.over_tab);
                }
                _ => {}
            }
            cur = e.source_end();
            span.push(cur);
        }
    }
    if span.len() > 1 {
        spans.push(TabSpan {
            path: span,
            over_tab: cur_flag.unwrap_or(false),
        });
    }
    debug!("separate tabs: {} spans", spans.len());
    Ok(spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencut_types::Point;

    #[test]
    fn path_clear_of_tabs_is_one_normal_span() {
        let path = vec![Point::new(0, 0), Point::new(200, 0)];
        let tabs = vec![vec![
            Point::new(0, 100),
            Point::new(50, 100),
            Point::new(50, 150),
            Point::new(0, 150),
        ]];
        let spans = separate_tabs(&path, &tabs).unwrap();
        assert_eq!(spans.len(), 1);
        assert!(!spans[0].over_tab);
        assert_eq!(spans[0].path, path);
    }

    #[test]
    fn path_through_tab_splits_in_three() {
        let path = vec![Point::new(0, 0), Point::new(200, 0)];
        let tabs = vec![vec![
            Point::new(40, -10),
            Point::new(60, -10),
            Point::new(60, 10),
            Point::new(40, 10),
        ]];
        let spans = separate_tabs(&path, &tabs).unwrap();
        assert_eq!(spans.len(), 3);
        assert_eq!(
            spans[0],
            TabSpan {
                path: vec![Point::new(0, 0), Point::new(40, 0)],
                over_tab: false
            }
        );
        assert_eq!(
            spans[1],
            TabSpan {
                path: vec![Point::new(40, 0), Point::new(60, 0)],
                over_tab: true
            }
        );
        assert_eq!(
            spans[2],
            TabSpan {
                path: vec![Point::new(60, 0), Point::new(200, 0)],
                over_tab: false
            }
        );
    }

    #[test]
    fn multi_segment_path_keeps_its_corners() {
        let path = vec![Point::new(0, 0), Point::new(100, 0), Point::new(100, 100)];
        let tabs = PolygonSet::new();
        let spans = separate_tabs(&path, &tabs).unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].path, path);
    }
}
