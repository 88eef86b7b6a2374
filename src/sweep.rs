//! The sweep-line driver: consumes site and circle events in `(y, x)`
//! order, growing the beachline and handing edge geometry off to the
//! graph as beach sections are born and collapse.

use crate::beachline::{left_break_point, right_break_point, BeachArc, Beachline};
use crate::event::{CircleEvent, EventQueue};
use crate::graph::Graph;
use crate::site::SiteIndex;
use crate::tree::NodeId;
use crate::vertex::Vertex;
use crate::MIN_E;

pub(crate) struct Fortune {
    beachline: Beachline,
    events: EventQueue,
    top_event: Option<NodeId<CircleEvent>>,
}

impl Fortune {
    fn new() -> Self {
        Fortune {
            beachline: Beachline::new(),
            events: EventQueue::new(),
            top_event: None,
        }
    }

    /// Finds the arc directly above `x` under the current `directrix`, and
    /// the arc immediately to its right if splitting at `x` doesn't fall
    /// exactly on an existing break-point.
    fn locate_arc_above(
        &self,
        graph: &Graph,
        x: f32,
        directrix: f32,
    ) -> (Option<NodeId<BeachArc>>, Option<NodeId<BeachArc>>) {
        let sites = graph.sites_ref();
        let mut node = match self.beachline.root() {
            Some(root) => root,
            None => return (None, None),
        };

        loop {
            let left_bp = left_break_point(&self.beachline, sites, node, directrix) - x;
            if left_bp > MIN_E {
                node = match self.beachline.left(node) {
                    Some(l) => l,
                    None => return (self.beachline.prev(node), Some(node)),
                };
                continue;
            }
            let right_bp = x - right_break_point(&self.beachline, sites, node, directrix);
            if right_bp > MIN_E {
                if left_bp > -MIN_E {
                    return (self.beachline.prev(node), Some(node));
                }
                if right_bp > -MIN_E {
                    return (Some(node), self.beachline.next(node));
                }
                return (Some(node), Some(node));
            }
            node = match self.beachline.right(node) {
                Some(r) => r,
                None => return (Some(node), self.beachline.next(node)),
            };
        }
    }

    fn add_beach_section(&mut self, graph: &mut Graph, site_index: SiteIndex) {
        let site = graph.sites_ref().get(site_index).unwrap().point;
        let (x, directrix) = (site.x, site.y);

        let (left_arc, right_arc) = self.locate_arc_above(graph, x, directrix);

        match (left_arc, right_arc) {
            (None, None) => {
                self.beachline.insert(None, BeachArc::new(site_index));
            }
            (Some(left), Some(right)) if left == right => {
                // Split a single arc in two: the existing arc stays as the
                // left half (keeping whatever edge it was already born
                // with), and a new right half with the same site is
                // allocated after the new arc.
                let arc_site = self.beachline.get(left).site;
                self.detach_circle_event(left);

                let new_arc = self.beachline.insert(Some(left), BeachArc::new(site_index));
                let new_right = self.beachline.insert(Some(new_arc), BeachArc::new(arc_site));

                let edge = graph.create_edge(arc_site, site_index, None, None);
                self.beachline.get_mut(new_arc).edge = Some(edge);
                self.beachline.get_mut(new_right).edge = Some(edge);

                self.attach_circle_event(graph, left);
                self.attach_circle_event(graph, new_right);
            }
            (Some(left), None) => {
                // New site is the rightmost arc: no split, just append.
                let edge = graph.create_edge(self.beachline.get(left).site, site_index, None, None);
                let new_arc = self.beachline.insert(Some(left), BeachArc::new(site_index));
                self.beachline.get_mut(new_arc).edge = Some(edge);
            }
            (None, Some(right)) => {
                let edge = graph.create_edge(site_index, self.beachline.get(right).site, None, None);
                let new_arc = self.beachline.insert(self.beachline.prev(right), BeachArc::new(site_index));
                self.beachline.get_mut(new_arc).edge = Some(edge);
            }
            (Some(left), Some(right)) => {
                // Sitting exactly on the break-point between two distinct arcs.
                let left_site = self.beachline.get(left).site;
                let right_site = self.beachline.get(right).site;
                self.detach_circle_event(left);
                self.detach_circle_event(right);

                let vertex = Vertex::new(x, {
                    let l = graph.sites_ref().get(left_site).unwrap().point;
                    let s = l.y - directrix;
                    let h = x - l.x;
                    directrix + (h * h) / (2.0 * s) + s / 2.0
                });

                // The edge disappearing between leftArc and rightArc was
                // born on rightArc's left break-point, so it lives on
                // right.edge, not left.edge.
                graph.set_startpoint(self.beachline.get(right).edge.unwrap(), left_site, right_site, vertex);

                let new_edge = graph.create_edge(left_site, site_index, None, Some(vertex));
                let new_right_edge = graph.create_edge(site_index, right_site, None, Some(vertex));
                self.beachline.get_mut(right).edge = Some(new_right_edge);

                let new_arc = self.beachline.insert(Some(left), BeachArc::new(site_index));
                self.beachline.get_mut(new_arc).edge = Some(new_edge);

                self.attach_circle_event(graph, left);
                self.attach_circle_event(graph, right);
            }
        }
    }

    fn remove_beach_section(&mut self, graph: &mut Graph, arc: NodeId<BeachArc>) {
        let event = self.beachline.get(arc).circle_event.unwrap();
        let event = *self.events.get(event);
        let vertex = Vertex::new(event.x, event.y_center);

        // Capture neighbors before any detaching, so the run-walk below
        // sees the beachline exactly as it was when the circle fired.
        let mut left_iter = self.beachline.prev(arc);
        let mut right_iter = self.beachline.next(arc);

        let mut detached = vec![arc];

        while let Some(left) = left_iter {
            if let Some(ev_id) = self.beachline.get(left).circle_event {
                let ev = *self.events.get(ev_id);
                if (ev.x - vertex.x).abs() < MIN_E && (ev.y_center - vertex.y).abs() < MIN_E {
                    detached.insert(0, left);
                    left_iter = self.beachline.prev(left);
                    continue;
                }
            }
            break;
        }
        let left_flank = left_iter;

        while let Some(right) = right_iter {
            if let Some(ev_id) = self.beachline.get(right).circle_event {
                let ev = *self.events.get(ev_id);
                if (ev.x - vertex.x).abs() < MIN_E && (ev.y_center - vertex.y).abs() < MIN_E {
                    detached.push(right);
                    right_iter = self.beachline.next(right);
                    continue;
                }
            }
            break;
        }
        let right_flank = right_iter;

        for &node in &detached {
            self.detach_circle_event(node);
        }

        // Terminate every edge born at the boundary between consecutive
        // detached arcs (and the flanks) at the shared vertex.
        let mut boundary = Vec::with_capacity(detached.len() + 1);
        if let Some(lf) = left_flank {
            boundary.push(lf);
        }
        boundary.extend(detached.iter().copied());
        if let Some(rf) = right_flank {
            boundary.push(rf);
        }
        for pair in boundary.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let a_site = self.beachline.get(a).site;
            let b_site = self.beachline.get(b).site;
            if let Some(edge) = self.beachline.get(b).edge {
                graph.set_startpoint(edge, a_site, b_site, vertex);
            }
        }

        for &node in &detached {
            self.beachline.remove(node);
        }

        if let (Some(lf), Some(rf)) = (left_flank, right_flank) {
            let lf_site = self.beachline.get(lf).site;
            let rf_site = self.beachline.get(rf).site;
            let new_edge = graph.create_edge(lf_site, rf_site, Some(vertex), None);
            self.beachline.get_mut(lf).edge = Some(new_edge);
            self.attach_circle_event(graph, lf);
            self.attach_circle_event(graph, rf);
        }
    }

    fn attach_circle_event(&mut self, graph: &Graph, arc: NodeId<BeachArc>) {
        let left = match self.beachline.prev(arc) {
            Some(l) => l,
            None => return,
        };
        let right = match self.beachline.next(arc) {
            Some(r) => r,
            None => return,
        };

        let left_site = self.beachline.get(left).site;
        let right_site = self.beachline.get(right).site;
        let arc_site = self.beachline.get(arc).site;
        if left_site == right_site {
            return;
        }

        let sites = graph.sites_ref();
        let a = sites.get(left_site).unwrap().point;
        let b = sites.get(arc_site).unwrap().point;
        let c = sites.get(right_site).unwrap().point;

        // Translate so `b` is at the origin; this keeps the determinant
        // well conditioned regardless of the sites' absolute coordinates.
        let bx = b.x;
        let by = b.y;
        let ax = a.x - bx;
        let ay = a.y - by;
        let cx = c.x - bx;
        let cy = c.y - by;

        let d = 2.0 * (ax * cy - ay * cx);
        if d >= -2e-9 {
            return;
        }

        let ha = ax * ax + ay * ay;
        let hc = cx * cx + cy * cy;
        let vx = (cy * ha - ay * hc) / d;
        let vy = (ax * hc - cx * ha) / d;

        let y_center = vy + by;
        let radius = (vx * vx + vy * vy).sqrt();
        let event = CircleEvent {
            arc,
            site: arc_site,
            x: vx + bx,
            y: y_center + radius,
            y_center,
        };

        let predecessor = self.find_event_predecessor(event.y, event.x);
        let is_new_first = predecessor.is_none();
        let event_id = self.events.insert(predecessor, event);
        self.beachline.get_mut(arc).circle_event = Some(event_id);
        if is_new_first {
            self.top_event = Some(event_id);
        }
    }

    fn find_event_predecessor(&self, y: f32, x: f32) -> Option<NodeId<CircleEvent>> {
        let mut node = self.events.root()?;
        let mut predecessor = None;
        loop {
            let candidate = self.events.get(node);
            let goes_right = (candidate.y, candidate.x) < (y, x);
            if goes_right {
                predecessor = Some(node);
                node = match self.events.right(node) {
                    Some(r) => r,
                    None => return predecessor,
                };
            } else {
                node = match self.events.left(node) {
                    Some(l) => l,
                    None => return self.events.prev(node),
                };
            }
        }
    }

    fn detach_circle_event(&mut self, arc: NodeId<BeachArc>) {
        let event_id = match self.beachline.get(arc).circle_event {
            Some(id) => id,
            None => return,
        };
        if self.top_event == Some(event_id) {
            self.top_event = self.events.next(event_id);
        }
        self.events.remove(event_id);
        self.beachline.get_mut(arc).circle_event = None;
    }
}

/// Runs Fortune's algorithm to completion and returns the assembled graph.
pub(crate) fn run(points: Vec<Vertex>, x_bound: f32, y_bound: f32) -> Graph {
    let mut graph = Graph::new(points, x_bound, y_bound);
    let site_order = graph.sorted_site_indices();
    let mut fortune = Fortune::new();

    let mut next_site_pos = 0usize;

    loop {
        let next_site = site_order.get(next_site_pos).map(|&idx| {
            let point = graph.sites_ref().get(idx).unwrap().point;
            (idx, point)
        });

        let top_event_key = fortune
            .top_event
            .map(|id| *fortune.events.get(id));

        let site_wins = match (&next_site, &top_event_key) {
            (Some((_, site_point)), Some(event)) => {
                (site_point.y, site_point.x) <= (event.y, event.x)
            }
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => break,
        };

        if site_wins {
            let (site_idx, _) = next_site.unwrap();
            let cell = graph.add_cell(site_idx);
            graph.sites_mut().get_mut(site_idx).unwrap().cell = Some(cell);
            fortune.add_beach_section(&mut graph, site_idx);
            next_site_pos += 1;
        } else {
            let event_id = fortune.top_event.unwrap();
            let arc = fortune.events.get(event_id).arc;
            fortune.remove_beach_section(&mut graph, arc);
        }
    }

    graph.clip_edges();
    graph.close_cells();
    graph
}
