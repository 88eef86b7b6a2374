//! Beach-section arcs and the break-point math used to order them.

use crate::graph::EdgeIndex;
use crate::site::{Site, SiteIndex};
use crate::tree::{NodeId, Tree};
use crate::typedvector::TypedVec;

pub(crate) type EventId = NodeId<crate::event::CircleEvent>;

/// One parabolic arc on the beachline, ordered left-to-right by the tree
/// it lives in. `edge` is the edge born with this arc's left break-point,
/// once one exists.
#[derive(Clone, Copy, Debug)]
pub(crate) struct BeachArc {
    pub site: SiteIndex,
    pub edge: Option<EdgeIndex>,
    pub circle_event: Option<EventId>,
}

impl BeachArc {
    pub fn new(site: SiteIndex) -> Self {
        BeachArc {
            site,
            edge: None,
            circle_event: None,
        }
    }
}

pub(crate) type Beachline = Tree<BeachArc>;

/// The x coordinate where arc `node` meets its left neighbor, under the
/// sweep line `directrix`.
pub(crate) fn left_break_point(
    beachline: &Beachline,
    sites: &TypedVec<Site>,
    node: NodeId<BeachArc>,
    directrix: f32,
) -> f32 {
    let focus = sites.get(beachline.get(node).site).unwrap().point;
    let pby2 = focus.y - directrix;
    if pby2 == 0.0 {
        return focus.x;
    }

    let left = match beachline.prev(node) {
        Some(l) => l,
        None => return f32::NEG_INFINITY,
    };
    let left_site = sites.get(beachline.get(left).site).unwrap().point;
    let plby2 = left_site.y - directrix;
    if plby2 == 0.0 {
        return left_site.x;
    }

    let hl = left_site.x - focus.x;
    let a = 1.0 / pby2 - 1.0 / plby2;
    if a == 0.0 {
        return (focus.x + left_site.x) / 2.0;
    }
    let b = hl / plby2;
    let discriminant = b * b - 2.0 * a * (hl * hl / (-2.0 * plby2) - left_site.y + plby2 / 2.0 + focus.y - pby2 / 2.0);
    (-b + discriminant.sqrt()) / a + focus.x
}

/// The x coordinate where arc `node` meets its right neighbor, under the
/// sweep line `directrix`. Equal to the left break-point of the right
/// neighbor, or a boundary value if there is none.
pub(crate) fn right_break_point(
    beachline: &Beachline,
    sites: &TypedVec<Site>,
    node: NodeId<BeachArc>,
    directrix: f32,
) -> f32 {
    match beachline.next(node) {
        Some(right) => left_break_point(beachline, sites, right, directrix),
        None => {
            let focus = sites.get(beachline.get(node).site).unwrap().point;
            if focus.y == directrix {
                focus.x
            } else {
                f32::INFINITY
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vertex::Vertex;

    fn site_at(sites: &mut TypedVec<Site>, x: f32, y: f32) -> SiteIndex {
        sites.insert(Site::new(Vertex::new(x, y)))
    }

    #[test]
    fn two_equal_height_sites_break_at_midpoint() {
        let mut sites = TypedVec::new();
        let left_site = site_at(&mut sites, 100.0, 100.0);
        let right_site = site_at(&mut sites, 400.0, 100.0);

        let mut beachline = Beachline::new();
        let left = beachline.insert(None, BeachArc::new(left_site));
        let right = beachline.insert(Some(left), BeachArc::new(right_site));

        // Directrix below both foci's y so both parabolas are proper (not degenerate).
        let directrix = 50.0;
        let bp = right_break_point(&beachline, &sites, left, directrix);
        assert!((bp - 250.0).abs() < 1e-3, "expected ~250.0, got {bp}");
        let bp2 = left_break_point(&beachline, &sites, right, directrix);
        assert!((bp2 - bp).abs() < 1e-5);
    }

    #[test]
    fn arc_on_directrix_breaks_at_its_own_x() {
        let mut sites = TypedVec::new();
        let left_site = site_at(&mut sites, 100.0, 100.0);
        let right_site = site_at(&mut sites, 400.0, 100.0);

        let mut beachline = Beachline::new();
        let left = beachline.insert(None, BeachArc::new(left_site));
        let right = beachline.insert(Some(left), BeachArc::new(right_site));

        let bp = left_break_point(&beachline, &sites, right, 100.0);
        assert_eq!(bp, 400.0);
        // The break between the two arcs is the same point computed either way.
        let bp2 = right_break_point(&beachline, &sites, left, 100.0);
        assert_eq!(bp2, bp);
    }

    #[test]
    fn sole_arc_has_infinite_break_points() {
        let mut sites = TypedVec::new();
        let site = site_at(&mut sites, 250.0, 250.0);
        let mut beachline = Beachline::new();
        let arc = beachline.insert(None, BeachArc::new(site));

        assert_eq!(left_break_point(&beachline, &sites, arc, 100.0), f32::NEG_INFINITY);
        assert_eq!(right_break_point(&beachline, &sites, arc, 100.0), f32::INFINITY);
    }
}
