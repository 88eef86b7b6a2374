use crate::graph::CellIndex;
use crate::typedvector::TypedIndex;
use crate::vertex::Vertex;

pub type SiteIndex = TypedIndex<Site>;

/// An input point plus the cell assigned to it once its site event fires.
#[derive(Clone, Copy, Debug)]
pub struct Site {
    pub point: Vertex,
    pub cell: Option<CellIndex>,
}

impl Site {
    pub(crate) fn new(point: Vertex) -> Self {
        Site { point, cell: None }
    }
}
