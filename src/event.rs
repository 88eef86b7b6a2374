//! Circle events: predicted beach-section collapses, ordered by `(y, x)`.

use crate::beachline::BeachArc;
use crate::site::SiteIndex;
use crate::tree::{NodeId, Tree};

/// A predicted collapse of three consecutive beach arcs into one Voronoi
/// vertex. `y` is the sweep position at which the collapse fires (the
/// bottom of the arcs' common circumscribed circle); `y_center` is the
/// vertex's actual y coordinate.
#[derive(Clone, Copy, Debug)]
pub(crate) struct CircleEvent {
    pub arc: NodeId<BeachArc>,
    pub site: SiteIndex,
    pub x: f32,
    pub y: f32,
    pub y_center: f32,
}

pub(crate) type EventQueue = Tree<CircleEvent>;
