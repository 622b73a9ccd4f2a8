//! Global node numbering

/// Graph node identifier.
pub type NodeId = u64;

/// Hands out node ids for one graph build.
///
/// Ids start at 1 and are strictly increasing; an id is never handed out
/// twice. All events of a build share one allocator so node ids are unique
/// across the whole graph.
#[derive(Debug)]
pub struct NodeIdAllocator {
    /// Next id to hand out
    next: NodeId,

    /// Number of ids handed out so far
    allocated: u64,
}

impl NodeIdAllocator {
    /// Create an allocator whose first id is 1.
    pub fn new() -> Self {
        Self {
            next: 1,
            allocated: 0,
        }
    }

    /// Take the next id.
    pub fn allocate(&mut self) -> NodeId {
        let id = self.next;
        self.next += 1;
        self.allocated += 1;
        id
    }

    /// Total ids handed out.
    pub fn allocated(&self) -> u64 {
        self.allocated
    }
}
