use std::collections::HashMap;

use crate::data::geometry::Coord;
use crate::data::osm::OsmId;

/// Scopes node dedup. Two lookups share a node only when both the formatted
/// coordinate and the group match. Way vertices all use `TagGroup::VERTEX`;
/// each encoded feature gets a fresh group for its own point nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TagGroup(u64);

impl TagGroup {
    pub const VERTEX: TagGroup = TagGroup(0);

    pub fn next(&self) -> TagGroup {
        TagGroup(self.0 + 1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeKey {
    lon: String,
    lat: String,
    group: TagGroup,
}

impl NodeKey {
    /// Coordinates compare by their decimal text, not within a tolerance.
    pub fn new(coord: Coord, group: TagGroup) -> Self {
        NodeKey {
            lon: format_degrees(coord.x),
            lat: format_degrees(coord.y),
            group,
        }
    }
}

pub fn format_degrees(value: f64) -> String {
    value.to_string()
}

/// Lookup table from coordinate + group to the node created for it.
#[derive(Debug, Default)]
pub struct NodeRegistry {
    index: HashMap<NodeKey, OsmId>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        NodeRegistry::default()
    }

    pub fn lookup(&self, key: &NodeKey) -> Option<OsmId> {
        self.index.get(key).copied()
    }

    pub fn remember(&mut self, key: NodeKey, id: OsmId) {
        self.index.insert(key, id);
    }

    pub(crate) fn len(&self) -> usize {
        self.index.len()
    }
}
