//! Tab separation scenarios.

use opencut_cam::{separate_tabs, TabSpan};
use opencut_types::{Point, Polygon, PolygonSet};

fn tab(x0: i32, y0: i32, x1: i32, y1: i32) -> Polygon {
    vec![
        Point::new(x0, y0),
        Point::new(x1, y0),
        Point::new(x1, y1),
        Point::new(x0, y1),
    ]
}

#[test]
fn s4_horizontal_path_with_one_tab() {
    let path = vec![Point::new(0, 0), Point::new(200, 0)];
    let tabs = vec![tab(40, -10, 60, 10)];
    let spans = separate_tabs(&path, &tabs).unwrap();
    assert_eq!(
        spans,
        vec![
            TabSpan {
                path: vec![Point::new(0, 0), Point::new(40, 0)],
                over_tab: false
            },
            TabSpan {
                path: vec![Point::new(40, 0), Point::new(60, 0)],
                over_tab: true
            },
            TabSpan {
                path: vec![Point::new(60, 0), Point::new(200, 0)],
                over_tab: false
            },
        ]
    );
}

#[test]
fn vertical_path_segment_over_a_tab() {
    let path = vec![Point::new(0, 0), Point::new(0, 200)];
    let tabs = vec![tab(-10, 40, 10, 60)];
    let spans = separate_tabs(&path, &tabs).unwrap();
    assert_eq!(spans.len(), 3);
    assert!(!spans[0].over_tab);
    assert!(spans[1].over_tab);
    assert!(!spans[2].over_tab);
    assert_eq!(
        spans[1].path,
        vec![Point::new(0, 40), Point::new(0, 60)]
    );
}

#[test]
fn two_tabs_give_five_spans() {
    let path = vec![Point::new(0, 0), Point::new(1000, 0)];
    let tabs = vec![tab(100, -10, 150, 10), tab(700, -10, 780, 10)];
    let spans = separate_tabs(&path, &tabs).unwrap();
    assert_eq!(spans.len(), 5);
    let flags: Vec<bool> = spans.iter().map(|s| s.over_tab).collect();
    assert_eq!(flags, vec![false, true, false, true, false]);
    // Spans chain: each starts where the previous ended.
    for pair in spans.windows(2) {
        assert_eq!(pair[0].path.last(), Some(&pair[1].path[0]));
    }
}

#[test]
fn path_corner_inside_a_tab() {
    // The path turns inside the tab; the whole corner is one over-tab
    // span.
    let path = vec![
        Point::new(0, 0),
        Point::new(100, 0),
        Point::new(100, 100),
    ];
    let tabs = vec![tab(80, -20, 120, 20)];
    let spans = separate_tabs(&path, &tabs).unwrap();
    assert_eq!(spans.len(), 3);
    assert_eq!(
        spans[1],
        TabSpan {
            path: vec![
                Point::new(80, 0),
                Point::new(100, 0),
                Point::new(100, 20)
            ],
            over_tab: true
        }
    );
    assert_eq!(spans[2].path[0], Point::new(100, 20));
    assert_eq!(spans[2].path.last(), Some(&Point::new(100, 100)));
}

#[test]
fn empty_inputs() {
    assert!(separate_tabs(&Polygon::new(), &PolygonSet::new())
        .unwrap()
        .is_empty());
    let path = vec![Point::new(0, 0), Point::new(10, 0)];
    let spans = separate_tabs(&path, &PolygonSet::new()).unwrap();
    assert_eq!(spans.len(), 1);
    assert!(!spans[0].over_tab);
}
