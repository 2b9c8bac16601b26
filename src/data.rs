use indexmap::IndexMap;

use self::geometry::Geometry;

pub mod geojson_source;
pub mod geometry;
pub mod osm;

/// Ordered key/value tags. Keys are unique; insertion order is the order the
/// tags are written out in.
pub type Tags = IndexMap<String, String>;

/// References to pre-existing nodes a line should start or end on. Features
/// sharing a reference share the node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointRefs {
    pub first: Option<String>,
    pub last: Option<String>,
}

impl EndpointRefs {
    pub fn is_empty(&self) -> bool {
        self.first.is_none() && self.last.is_none()
    }
}

/// One unit of input: a geometry plus the tags that go with it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Feature {
    pub geometry: Option<Geometry>,
    pub tags: Tags,
    pub endpoints: EndpointRefs,
}

impl Feature {
    pub fn new(geometry: Geometry, tags: Tags) -> Self {
        Feature {
            geometry: Some(geometry),
            tags,
            endpoints: EndpointRefs::default(),
        }
    }

    pub fn with_endpoints(mut self, endpoints: EndpointRefs) -> Self {
        self.endpoints = endpoints;
        self
    }
}

/// Builds a `Tags` map from string pairs, keeping the first value of a
/// repeated key.
pub fn tags<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Tags {
    let mut tags = Tags::new();
    for (key, value) in pairs {
        tags.entry(key.to_string()).or_insert_with(|| value.to_string());
    }
    tags
}
