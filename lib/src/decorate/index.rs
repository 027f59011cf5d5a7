use rustc_hash::FxHashMap;

use crate::decorate::{Node, NodeId};

/// Route and video lookup over a decorated course.
///
/// External links (`web`, `github`) route to the URL they point at, so two
/// of them can share a route. Every node stays reachable through
/// [`LoIndex::get_all()`]; [`LoIndex::get()`] returns the first.
#[derive(Debug, Default, Clone)]
pub struct LoIndex {
    routes: FxHashMap<String, Vec<NodeId>>,
    videos: FxHashMap<String, Vec<NodeId>>,
}

impl LoIndex {
    /// Indexes every node by route and, if it has one, by video route, in
    /// traversal order.
    pub fn build(nodes: &[Node]) -> Self {
        let mut index = LoIndex::default();
        for node in nodes {
            insert(&mut index.routes, &node.lo.route, node.id, "route");
            if let Some(video) = &node.lo.video {
                insert(&mut index.videos, video, node.id, "video");
            }
        }

        index
    }

    pub fn get(&self, route: &str) -> Option<NodeId> {
        self.get_all(route).first().copied()
    }

    /// Every node with route `route`, in traversal order.
    pub fn get_all(&self, route: &str) -> &[NodeId] {
        self.routes.get(route).map_or(&[][..], Vec::as_slice)
    }

    pub fn get_video(&self, route: &str) -> Option<NodeId> {
        self.videos.get(route).and_then(|ids| ids.first()).copied()
    }

    /// The number of indexed nodes.
    pub fn len(&self) -> usize {
        self.routes.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

fn insert(map: &mut FxHashMap<String, Vec<NodeId>>, key: &str, id: NodeId, what: &str) {
    let ids = map.entry(key.to_string()).or_default();
    if let Some(first) = ids.first() {
        tracing::warn!(%key, ?first, duplicate = ?id, "duplicate {what}");
    }

    ids.push(id);
}
