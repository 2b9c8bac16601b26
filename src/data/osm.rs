use super::Tags;

/// Element id. Elements created by the encoder get negative ids; positive ids
/// only appear when a way references a node that already exists upstream.
pub type OsmId = i64;

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: OsmId,
    pub lon: f64,
    pub lat: f64,
    pub tags: Tags,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Way {
    pub id: OsmId,
    pub nodes: Vec<OsmId>,
    pub tags: Tags,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberRole {
    Outer,
    Inner,
}

impl MemberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberRole::Outer => "outer",
            MemberRole::Inner => "inner",
        }
    }
}

/// Relation members are always ways.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub way: OsmId,
    pub role: MemberRole,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    pub id: OsmId,
    pub members: Vec<Member>,
    pub tags: Tags,
}

/// Top-level element produced for a geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementRef {
    Node(OsmId),
    Way(OsmId),
    Relation(OsmId),
}

/// Append-only changeset: everything in it is a creation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OsmChange {
    pub nodes: Vec<Node>,
    pub ways: Vec<Way>,
    pub relations: Vec<Relation>,
}

impl OsmChange {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.ways.is_empty() && self.relations.is_empty()
    }

    pub fn element_count(&self) -> usize {
        self.nodes.len() + self.ways.len() + self.relations.len()
    }

    pub fn node(&self, id: OsmId) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn way(&self, id: OsmId) -> Option<&Way> {
        self.ways.iter().find(|way| way.id == id)
    }

    pub fn relation(&self, id: OsmId) -> Option<&Relation> {
        self.relations.iter().find(|relation| relation.id == id)
    }

    /// Number of `tag` entries across all elements.
    pub fn tag_count(&self) -> usize {
        self.nodes.iter().map(|n| n.tags.len()).sum::<usize>()
            + self.ways.iter().map(|w| w.tags.len()).sum::<usize>()
            + self.relations.iter().map(|r| r.tags.len()).sum::<usize>()
    }
}
