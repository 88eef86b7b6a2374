//! Whole-diagram integration checks against the concrete scenarios.

use fortune_voronoi::{build, Graph, Vertex};

const EPS: f32 = 1e-1;

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < EPS
}

fn vertex_close(a: Vertex, b: Vertex) -> bool {
    close(a.x, b.x) && close(a.y, b.y)
}

fn cell_polygon(graph: &Graph, cell_idx: usize) -> Vec<Vertex> {
    graph.cells()[cell_idx]
        .half_edges
        .iter()
        .map(|he| graph.half_edge_start(he))
        .collect()
}

fn polygon_area(points: &[Vertex]) -> f32 {
    let n = points.len();
    let mut sum = 0.0f32;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        sum += a.x * b.y - b.x * a.y;
    }
    sum.abs() / 2.0
}

fn assert_closed_polygon(graph: &Graph, cell_idx: usize) {
    let half_edges = &graph.cells()[cell_idx].half_edges;
    assert!(!half_edges.is_empty(), "cell {cell_idx} has no half-edges");
    let n = half_edges.len();
    for i in 0..n {
        let end = graph.half_edge_end(&half_edges[i]);
        let next_start = graph.half_edge_start(&half_edges[(i + 1) % n]);
        assert!(
            vertex_close(end, next_start),
            "cell {cell_idx}: half-edge {i} end {end:?} does not meet half-edge {} start {next_start:?}",
            (i + 1) % n
        );
    }
}

#[test]
fn two_sites_produce_a_vertical_bisector() {
    let sites = vec![Vertex::new(100.0, 100.0), Vertex::new(400.0, 100.0)];
    let graph = build(sites, 500.0, 500.0);

    assert_eq!(graph.sites().len(), 2);
    assert_eq!(graph.cells().len(), 2);

    let has_bisector = graph.edges().iter().any(|e| {
        e.right_site.is_some()
            && e.p0.is_defined()
            && e.p1.is_defined()
            && close(e.p0.x, 250.0)
            && close(e.p1.x, 250.0)
            && ((close(e.p0.y, 0.0) && close(e.p1.y, 500.0)) || (close(e.p0.y, 500.0) && close(e.p1.y, 0.0)))
    });
    assert!(has_bisector, "expected a vertical bisector at x=250: {:?}", graph.edges());

    for i in 0..graph.cells().len() {
        assert_closed_polygon(&graph, i);
    }
}

#[test]
fn three_sites_meet_at_circumcenter() {
    let sites = vec![
        Vertex::new(100.0, 100.0),
        Vertex::new(400.0, 100.0),
        Vertex::new(250.0, 400.0),
    ];
    let graph = build(sites, 500.0, 500.0);

    assert_eq!(graph.cells().len(), 3);

    let has_circumcenter = graph
        .edges()
        .iter()
        .any(|e| e.right_site.is_some() && (e.p0.is_defined() && vertex_close(e.p0, Vertex::new(250.0, 212.5)) || e.p1.is_defined() && vertex_close(e.p1, Vertex::new(250.0, 212.5))));
    assert!(has_circumcenter, "expected an edge touching the circumcenter (250, 212.5)");

    for i in 0..graph.cells().len() {
        assert_closed_polygon(&graph, i);
    }
}

#[test]
fn single_site_cell_is_the_whole_viewport() {
    let graph = build(vec![Vertex::new(250.0, 250.0)], 500.0, 500.0);

    assert_eq!(graph.cells().len(), 1);
    assert_closed_polygon(&graph, 0);
    let area = polygon_area(&cell_polygon(&graph, 0));
    assert!(close(area, 250_000.0), "expected viewport area 250000, got {area}");
}

#[test]
fn duplicate_site_collapses_to_one_cell() {
    let graph = build(vec![Vertex::new(100.0, 100.0), Vertex::new(100.0, 100.0)], 500.0, 500.0);

    assert_eq!(graph.sites().len(), 2, "duplicate site must still be present in sites()");
    assert_eq!(graph.cells().len(), 1);
    assert_closed_polygon(&graph, 0);
}

#[test]
fn four_sites_produce_four_square_cells() {
    let sites = vec![
        Vertex::new(125.0, 125.0),
        Vertex::new(375.0, 125.0),
        Vertex::new(125.0, 375.0),
        Vertex::new(375.0, 375.0),
    ];
    let graph = build(sites, 500.0, 500.0);

    assert_eq!(graph.cells().len(), 4);
    for i in 0..4 {
        assert_closed_polygon(&graph, i);
        let area = polygon_area(&cell_polygon(&graph, i));
        assert!(close(area, 62_500.0), "cell {i} expected area 62500 (250x250 square), got {area}");
    }
}

#[test]
fn collinear_sites_produce_no_circle_events() {
    let sites = vec![
        Vertex::new(100.0, 250.0),
        Vertex::new(250.0, 250.0),
        Vertex::new(400.0, 250.0),
    ];
    let graph = build(sites, 500.0, 500.0);

    assert_eq!(graph.cells().len(), 3);

    let verticals: Vec<f32> = graph
        .edges()
        .iter()
        .filter(|e| e.right_site.is_some() && e.p0.is_defined() && e.p1.is_defined() && close(e.p0.x, e.p1.x))
        .map(|e| e.p0.x)
        .collect();
    assert!(verticals.iter().any(|&x| close(x, 175.0)), "expected a vertical edge at x=175, got {verticals:?}");
    assert!(verticals.iter().any(|&x| close(x, 325.0)), "expected a vertical edge at x=325, got {verticals:?}");

    for i in 0..3 {
        assert_closed_polygon(&graph, i);
    }
}

#[test]
fn zero_sites_produce_empty_graph() {
    let graph = build(Vec::new(), 500.0, 500.0);
    assert!(graph.sites().is_empty());
    assert!(graph.cells().is_empty());
    assert!(graph.edges().is_empty());
}
