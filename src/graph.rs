//! Edges, cells, and the `Graph` that owns them — edge lifecycle (create,
//! connect to the viewport, Liang-Barsky clip) and cell closure along the
//! viewport walls.

use crate::site::{Site, SiteIndex};
use crate::typedvector::{TypedIndex, TypedVec};
use crate::vertex::Vertex;

pub(crate) const MIN_E: f32 = 1e-4;

pub type EdgeIndex = TypedIndex<Edge>;
pub type CellIndex = TypedIndex<Cell>;

/// The locus of points equidistant from `left_site` and `right_site`,
/// clipped to the viewport. `right_site` is absent for border edges,
/// synthesized during cell closure to walk the viewport boundary.
#[derive(Clone, Copy, Debug)]
pub struct Edge {
    pub left_site: SiteIndex,
    pub right_site: Option<SiteIndex>,
    pub p0: Vertex,
    pub p1: Vertex,
}

impl Edge {
    fn new(left_site: SiteIndex, right_site: Option<SiteIndex>) -> Self {
        Edge {
            left_site,
            right_site,
            p0: Vertex::UNDEFINED,
            p1: Vertex::UNDEFINED,
        }
    }

    fn set_startpoint(&mut self, left_site: SiteIndex, right_site: SiteIndex, vertex: Vertex) {
        if !self.p0.is_defined() && !self.p1.is_defined() {
            self.p0 = vertex;
            self.left_site = left_site;
            self.right_site = Some(right_site);
        } else if self.left_site == right_site {
            self.p1 = vertex;
        } else {
            self.p0 = vertex;
        }
    }

    fn set_endpoint(&mut self, left_site: SiteIndex, right_site: SiteIndex, vertex: Vertex) {
        self.set_startpoint(right_site, left_site, vertex);
    }
}

/// The directed view of an edge from one of its two sites, used to walk a
/// cell's boundary. `angle` sorts descending into counter-clockwise order
/// around `site`.
#[derive(Clone, Copy, Debug)]
pub struct HalfEdge {
    pub site: SiteIndex,
    pub edge: EdgeIndex,
    pub angle: f32,
}

/// A site's Voronoi cell: its half-edges, in counter-clockwise order once
/// closed. `close_me` marks cells touched by `clipEdges` that still need
/// their boundary completed against the viewport.
#[derive(Clone, Debug)]
pub struct Cell {
    pub site: SiteIndex,
    pub half_edges: Vec<HalfEdge>,
    pub close_me: bool,
}

pub struct Graph {
    sites: TypedVec<Site>,
    edges: TypedVec<Edge>,
    cells: TypedVec<Cell>,
    x_bound: f32,
    y_bound: f32,
}

impl Graph {
    pub(crate) fn new(points: Vec<Vertex>, x_bound: f32, y_bound: f32) -> Self {
        let mut sites = TypedVec::new();
        for point in points {
            sites.insert(Site::new(point));
        }
        Graph {
            sites,
            edges: TypedVec::new(),
            cells: TypedVec::new(),
            x_bound,
            y_bound,
        }
    }

    pub(crate) fn sites_mut(&mut self) -> &mut TypedVec<Site> {
        &mut self.sites
    }

    pub(crate) fn sites_ref(&self) -> &TypedVec<Site> {
        &self.sites
    }

    pub fn sites(&self) -> &[Site] {
        self.sites.as_slice()
    }

    pub fn edges(&self) -> &[Edge] {
        self.edges.as_slice()
    }

    pub fn cells(&self) -> &[Cell] {
        self.cells.as_slice()
    }

    pub fn half_edge_start(&self, he: &HalfEdge) -> Vertex {
        let edge = self.edges.get(he.edge).unwrap();
        if edge.left_site == he.site {
            edge.p0
        } else {
            edge.p1
        }
    }

    pub fn half_edge_end(&self, he: &HalfEdge) -> Vertex {
        let edge = self.edges.get(he.edge).unwrap();
        if edge.left_site == he.site {
            edge.p1
        } else {
            edge.p0
        }
    }

    /// Deduplicates adjacent sites (by exact coordinate, in original
    /// insertion order) and returns the survivors' indices sorted by
    /// `(y, x)` ascending.
    pub(crate) fn sorted_site_indices(&self) -> Vec<SiteIndex> {
        let mut indices = Vec::with_capacity(self.sites.len());
        let mut last: Option<Vertex> = None;
        for (idx, site) in self.sites.iter() {
            let keep = last != Some(site.point);
            if keep {
                indices.push(idx);
            }
            last = Some(site.point);
        }
        indices.sort_by(|&a, &b| {
            let pa = self.sites.get(a).unwrap().point;
            let pb = self.sites.get(b).unwrap().point;
            pa.y.partial_cmp(&pb.y)
                .unwrap()
                .then_with(|| pa.x.partial_cmp(&pb.x).unwrap())
        });
        indices
    }

    pub(crate) fn add_cell(&mut self, site: SiteIndex) -> CellIndex {
        self.cells.insert(Cell {
            site,
            half_edges: Vec::new(),
            close_me: false,
        })
    }

    pub(crate) fn set_startpoint(&mut self, edge: EdgeIndex, left_site: SiteIndex, right_site: SiteIndex, vertex: Vertex) {
        self.edges.get_mut(edge).unwrap().set_startpoint(left_site, right_site, vertex);
    }

    /// Creates an edge between `left_site` and `right_site`, optionally
    /// seeding its endpoints, and registers a half-edge on each site's
    /// cell.
    pub(crate) fn create_edge(
        &mut self,
        left_site: SiteIndex,
        right_site: SiteIndex,
        va: Option<Vertex>,
        vb: Option<Vertex>,
    ) -> EdgeIndex {
        let edge_idx = self.edges.insert(Edge::new(left_site, Some(right_site)));
        if let Some(va) = va {
            self.edges.get_mut(edge_idx).unwrap().set_startpoint(left_site, right_site, va);
        }
        if let Some(vb) = vb {
            self.edges.get_mut(edge_idx).unwrap().set_endpoint(left_site, right_site, vb);
        }

        let left_cell = self.sites.get(left_site).unwrap().cell.unwrap();
        let right_cell = self.sites.get(right_site).unwrap().cell.unwrap();

        let he_left = self.create_half_edge(edge_idx, left_site, Some(right_site));
        let he_right = self.create_half_edge(edge_idx, right_site, Some(left_site));

        self.cells.get_mut(left_cell).unwrap().half_edges.push(he_left);
        self.cells.get_mut(right_cell).unwrap().half_edges.push(he_right);

        edge_idx
    }

    fn create_border_edge(&mut self, site: SiteIndex, va: Vertex, vb: Vertex) -> EdgeIndex {
        let mut edge = Edge::new(site, None);
        edge.p0 = va;
        edge.p1 = vb;
        self.edges.insert(edge)
    }

    fn create_half_edge(&self, edge: EdgeIndex, site: SiteIndex, other: Option<SiteIndex>) -> HalfEdge {
        let angle = match other {
            Some(other_site) => {
                let owner = self.sites.get(site).unwrap().point;
                let other = self.sites.get(other_site).unwrap().point;
                (other.y - owner.y).atan2(other.x - owner.x)
            }
            None => {
                let e = self.edges.get(edge).unwrap();
                if e.left_site != site {
                    (e.p0.x - e.p1.x).atan2(e.p1.y - e.p0.y)
                } else {
                    (e.p1.x - e.p0.x).atan2(e.p0.y - e.p1.y)
                }
            }
        };
        HalfEdge { site, edge, angle }
    }

    /// Extends a dangling edge's undefined endpoint to the viewport along
    /// its bisector. No-op if the edge is already fully formed. Returns
    /// `false` if the bisector never crosses the viewport at all.
    fn connect_edge(&mut self, edge_idx: EdgeIndex) -> bool {
        if self.edges.get(edge_idx).unwrap().p1.is_defined() {
            return true;
        }

        let (xl, xr, yt, yb) = (0.0f32, self.x_bound, 0.0f32, self.y_bound);

        let (left_site, right_site) = {
            let edge = self.edges.get(edge_idx).unwrap();
            (edge.left_site, edge.right_site.expect("connect_edge only runs on interior edges"))
        };
        let l = self.sites.get(left_site).unwrap().point;
        let r = self.sites.get(right_site).unwrap().point;
        let (lx, ly, rx, ry) = (l.x, l.y, r.x, r.y);
        let fx = (lx + rx) / 2.0;
        let fy = (ly + ry) / 2.0;

        let mut p0 = self.edges.get(edge_idx).unwrap().p0;
        let p1;

        if ry == ly {
            if fx < xl || fx >= xr {
                return false;
            }
            if lx <= rx {
                if !p0.is_defined() || p0.y > yb {
                    p0 = Vertex::new(fx, yb);
                } else if p0.y < yt {
                    return false;
                }
                p1 = Vertex::new(fx, yt);
            } else {
                if !p0.is_defined() || p0.y < yt {
                    p0 = Vertex::new(fx, yt);
                } else if p0.y >= yb {
                    return false;
                }
                p1 = Vertex::new(fx, yb);
            }
        } else {
            let fm = (lx - rx) / (ry - ly);
            let fb = fy - fm * fx;
            if !(-1.0..=1.0).contains(&fm) {
                if lx <= rx {
                    if !p0.is_defined() || p0.y > yb {
                        p0 = Vertex::new((yb - fb) / fm, yb);
                    } else if p0.y < yt {
                        return false;
                    }
                    p1 = Vertex::new((yt - fb) / fm, yt);
                } else {
                    if !p0.is_defined() || p0.y < yt {
                        p0 = Vertex::new((yt - fb) / fm, yt);
                    } else if p0.y >= yb {
                        return false;
                    }
                    p1 = Vertex::new((yb - fb) / fm, yb);
                }
            } else if ly >= ry {
                if !p0.is_defined() || p0.x > xr {
                    p0 = Vertex::new(xr, fm * xr + fb);
                } else if p0.x < xl {
                    return false;
                }
                p1 = Vertex::new(xl, fm * xl + fb);
            } else {
                if !p0.is_defined() || p0.x < xl {
                    p0 = Vertex::new(xl, fm * xl + fb);
                } else if p0.x >= xr {
                    return false;
                }
                p1 = Vertex::new(xr, fm * xr + fb);
            }
        }

        let edge = self.edges.get_mut(edge_idx).unwrap();
        edge.p0 = p0;
        edge.p1 = p1;
        true
    }

    /// Liang-Barsky clip against `[0, xBound] x [0, yBound]`.
    fn clip_edge(&mut self, edge_idx: EdgeIndex) -> bool {
        let (x_bound, y_bound) = (self.x_bound, self.y_bound);
        let (ax, ay, bx, by) = {
            let e = self.edges.get(edge_idx).unwrap();
            (e.p0.x, e.p0.y, e.p1.x, e.p1.y)
        };
        let dx = bx - ax;
        let dy = by - ay;
        let mut t0 = 0.0f32;
        let mut t1 = 1.0f32;

        macro_rules! clip_plane {
            ($q:expr, $d:expr, $pos:expr) => {
                let q: f32 = $q;
                let d: f32 = $d;
                if d == 0.0 {
                    if q < 0.0 {
                        return false;
                    }
                } else {
                    let r = q / d;
                    if d < 0.0 {
                        if $pos {
                            if r > t1 {
                                return false;
                            }
                            if r > t0 {
                                t0 = r;
                            }
                        } else {
                            if r < t0 {
                                return false;
                            }
                            if r < t1 {
                                t1 = r;
                            }
                        }
                    } else if $pos {
                        if r < t0 {
                            return false;
                        }
                        if r < t1 {
                            t1 = r;
                        }
                    } else {
                        if r > t1 {
                            return false;
                        }
                        if r > t0 {
                            t0 = r;
                        }
                    }
                }
            };
        }

        clip_plane!(-ax, dx, true);
        clip_plane!(x_bound - ax, dx, false);
        clip_plane!(-ay, dy, true);
        clip_plane!(y_bound - ay, dy, false);

        let (left_site, right_site) = {
            let e = self.edges.get(edge_idx).unwrap();
            (e.left_site, e.right_site)
        };

        let mut changed = false;
        {
            let edge = self.edges.get_mut(edge_idx).unwrap();
            if t0 > 0.0 {
                let mut p0 = Vertex::new(ax + t0 * dx, ay + t0 * dy);
                if p0.x < MIN_E {
                    p0.x = 0.0;
                }
                if p0.y < MIN_E {
                    p0.y = 0.0;
                }
                edge.p0 = p0;
                changed = true;
            }
            if t1 < 1.0 {
                let mut p1 = Vertex::new(ax + t1 * dx, ay + t1 * dy);
                if p1.x < MIN_E {
                    p1.x = 0.0;
                }
                if p1.y < MIN_E {
                    p1.y = 0.0;
                }
                edge.p1 = p1;
                changed = true;
            }
        }

        if changed {
            let left_cell = self.sites.get(left_site).unwrap().cell.unwrap();
            let right_cell = self.sites.get(right_site.unwrap()).unwrap().cell.unwrap();
            self.cells.get_mut(left_cell).unwrap().close_me = true;
            self.cells.get_mut(right_cell).unwrap().close_me = true;
        }

        true
    }

    /// Connects and clips every edge against the viewport, killing
    /// whatever doesn't survive. The edge vector never shrinks — indices
    /// must stay stable for half-edges that reference them.
    pub(crate) fn clip_edges(&mut self) {
        let count = self.edges.len();
        for i in 0..count {
            let edge_idx = EdgeIndex::new(i);
            let ok = self.connect_edge(edge_idx) && self.clip_edge(edge_idx);
            let dead = if ok {
                let edge = self.edges.get(edge_idx).unwrap();
                (edge.p0.x - edge.p1.x).abs() < MIN_E && (edge.p0.y - edge.p1.y).abs() < MIN_E
            } else {
                true
            };
            if dead {
                let edge = self.edges.get_mut(edge_idx).unwrap();
                edge.p0 = Vertex::UNDEFINED;
                edge.p1 = Vertex::UNDEFINED;
            }
        }
    }

    fn prepare_half_edges_for_cell(&mut self, cell: CellIndex) -> usize {
        let keep: Vec<bool> = self
            .cells
            .get(cell)
            .unwrap()
            .half_edges
            .iter()
            .map(|he| {
                let edge = self.edges.get(he.edge).unwrap();
                edge.p0.is_defined() && edge.p1.is_defined()
            })
            .collect();
        let mut i = 0;
        self.cells.get_mut(cell).unwrap().half_edges.retain(|_| {
            let k = keep[i];
            i += 1;
            k
        });
        self.cells
            .get_mut(cell)
            .unwrap()
            .half_edges
            .sort_by(|a, b| b.angle.partial_cmp(&a.angle).unwrap());
        self.cells.get(cell).unwrap().half_edges.len()
    }

    /// Closes every cell touched by `clip_edges`, synthesizing border
    /// edges along the viewport walls (left, bottom, right, top) to fill
    /// any gap between consecutive half-edges.
    pub(crate) fn close_cells(&mut self) {
        let (xl, xr, yt, yb) = (0.0f32, self.x_bound, 0.0f32, self.y_bound);
        let cell_count = self.cells.len();

        for i in (0..cell_count).rev() {
            let cell_idx = CellIndex::new(i);
            let n = self.prepare_half_edges_for_cell(cell_idx);
            if n == 0 || !self.cells.get(cell_idx).unwrap().close_me {
                continue;
            }

            let site = self.cells.get(cell_idx).unwrap().site;
            let mut n_half_edges = n;
            let mut i_left = 0usize;

            while i_left < n_half_edges {
                let va = {
                    let he = self.cells.get(cell_idx).unwrap().half_edges[i_left];
                    self.half_edge_end(&he)
                };
                let i_next_left = (i_left + 1) % n_half_edges;
                let vz = {
                    let he = self.cells.get(cell_idx).unwrap().half_edges[i_next_left];
                    self.half_edge_start(&he)
                };

                if (va.x - vz.x).abs() >= MIN_E || (va.y - vz.y).abs() >= MIN_E {
                    let mut current = va;
                    let mut last_border_segment = false;
                    let mut walks = 0;

                    while !last_border_segment {
                        walks += 1;
                        if walks > 8 {
                            panic!("cell closure failed to terminate after walking the viewport boundary twice");
                        }

                        let vb;
                        if (current.x - xl).abs() < MIN_E && (yb - current.y) > MIN_E {
                            last_border_segment = (vz.x - xl).abs() < MIN_E;
                            vb = Vertex::new(xl, if last_border_segment { vz.y } else { yb });
                        } else if (current.y - yb).abs() < MIN_E && (xr - current.x) > MIN_E {
                            last_border_segment = (vz.y - yb).abs() < MIN_E;
                            vb = Vertex::new(if last_border_segment { vz.x } else { xr }, yb);
                        } else if (current.x - xr).abs() < MIN_E && (current.y - yt) > MIN_E {
                            last_border_segment = (vz.x - xr).abs() < MIN_E;
                            vb = Vertex::new(xr, if last_border_segment { vz.y } else { yt });
                        } else if (current.y - yt).abs() < MIN_E && (current.x - xl) > MIN_E {
                            last_border_segment = (vz.y - yt).abs() < MIN_E;
                            vb = Vertex::new(if last_border_segment { vz.x } else { xl }, yt);
                        } else {
                            panic!("cell boundary point is not on any viewport wall");
                        }

                        let edge_idx = self.create_border_edge(site, current, vb);
                        let he = self.create_half_edge(edge_idx, site, None);
                        i_left += 1;
                        self.cells.get_mut(cell_idx).unwrap().half_edges.insert(i_left, he);
                        n_half_edges += 1;

                        current = vb;
                    }
                }
                i_left += 1;
            }

            self.cells.get_mut(cell_idx).unwrap().close_me = false;
        }
    }
}
