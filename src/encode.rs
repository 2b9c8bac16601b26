//! Turns features into OSM nodes, ways and multipolygon relations.
//!
//! An [`Encoder`] is one export session. It owns the changeset being built,
//! the id counter and the node dedup table, and must be fed features one at
//! a time in the order they arrive: dedup scoping depends on call order.
//!
//! Routing by geometry type:
//! - points become nodes carrying the feature tags,
//! - lines become one or more ways (long lines are split, see [`ways`]),
//! - single-ring polygons short enough for one way become a closed way,
//! - every other polygon becomes a multipolygon relation (see [`polygon`]),
//! - multi-geometries and collections are encoded member by member.

pub mod ids;
pub mod nodes;
pub mod polygon;
pub mod ring;
pub mod tags;
pub mod ways;

use std::collections::HashMap;

use log::debug;

use crate::data::geometry::{Coord, Geometry, Polygon};
use crate::data::osm::{ElementRef, Node, OsmChange, OsmId};
use crate::data::{EndpointRefs, Feature, Tags};
use crate::errors::{Error, Result};

use self::ids::IdAllocator;
use self::nodes::{NodeKey, NodeRegistry, TagGroup};
use self::ring::{validate_ring, wind_ring, Winding};
use self::tags::validate_tags;

/// Largest number of node refs written into a single way.
pub const DEFAULT_WAY_SPLIT_SIZE: usize = 495;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderOptions {
    pub way_split_size: usize,
    pub winding: Winding,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        EncoderOptions {
            way_split_size: DEFAULT_WAY_SPLIT_SIZE,
            winding: Winding::default(),
        }
    }
}

impl EncoderOptions {
    pub fn validate(&self) -> Result<()> {
        if self.way_split_size < 2 {
            return Err(Error::Config(format!(
                "way_split_size must be at least 2, got {}",
                self.way_split_size
            )));
        }
        Ok(())
    }
}

/// What the members of one feature's geometry share while being encoded.
#[derive(Clone, Copy)]
struct Scope<'f> {
    tags: &'f Tags,
    group: TagGroup,
    endpoints: Option<&'f EndpointRefs>,
    in_collection: bool,
}

impl Scope<'_> {
    fn member(self) -> Self {
        Scope {
            in_collection: true,
            ..self
        }
    }
}

pub struct Encoder {
    options: EncoderOptions,
    ids: IdAllocator,
    registry: NodeRegistry,
    endpoint_nodes: HashMap<String, OsmId>,
    last_group: TagGroup,
    document: OsmChange,
}

impl Encoder {
    pub fn new(options: EncoderOptions) -> Result<Self> {
        options.validate()?;
        Ok(Encoder {
            options,
            ids: IdAllocator::new(),
            registry: NodeRegistry::new(),
            endpoint_nodes: HashMap::new(),
            last_group: TagGroup::VERTEX,
            document: OsmChange::default(),
        })
    }

    /// Derive ids from `seed` so that re-exporting the same source gives
    /// the same ids.
    pub fn with_id_seed(mut self, seed: &[u8]) -> Self {
        self.ids = IdAllocator::seeded(seed);
        self
    }

    /// Seed line-endpoint references with nodes that already exist.
    pub fn with_known_nodes(mut self, known: impl IntoIterator<Item = (String, OsmId)>) -> Self {
        self.endpoint_nodes.extend(known);
        self
    }

    pub fn options(&self) -> &EncoderOptions {
        &self.options
    }

    pub fn document(&self) -> &OsmChange {
        &self.document
    }

    pub fn finish(self) -> OsmChange {
        self.document
    }

    /// Encodes one feature and returns the top-level elements created for
    /// it. A feature without geometry produces nothing. Invalid geometry
    /// and over-long tags are rejected before anything is added to the
    /// document.
    pub fn encode(&mut self, feature: &Feature) -> Result<Vec<ElementRef>> {
        let Some(geometry) = &feature.geometry else {
            return Ok(Vec::new());
        };
        validate_tags(&feature.tags)?;
        validate_geometry(geometry)?;

        self.last_group = self.last_group.next();
        let scope = Scope {
            tags: &feature.tags,
            group: self.last_group,
            endpoints: Some(&feature.endpoints).filter(|e| !e.is_empty()),
            in_collection: false,
        };
        let elements = self.dispatch(geometry, scope)?;
        debug!(
            geometry_type = geometry.type_name(),
            elements = elements.len(),
            nodes_total = self.document.nodes.len(),
            nodes_indexed = self.registry.len();
            "Encoded feature"
        );
        Ok(elements)
    }

    /// Returns the node for `coord`. With `dedup` set, a node created
    /// earlier for the same coordinate and group is reused; otherwise a new
    /// node is always created and left out of the lookup table.
    pub fn resolve_node(&mut self, coord: Coord, group: TagGroup, dedup: bool, tags: Option<&Tags>) -> OsmId {
        let key = NodeKey::new(coord, group);
        if dedup {
            if let Some(id) = self.registry.lookup(&key) {
                return id;
            }
        }

        let id = self.ids.next_id();
        self.document.nodes.push(Node {
            id,
            lon: coord.lon(),
            lat: coord.lat(),
            tags: tags.cloned().unwrap_or_default(),
        });
        if dedup {
            self.registry.remember(key, id);
        }
        id
    }

    fn dispatch(&mut self, geometry: &Geometry, scope: Scope) -> Result<Vec<ElementRef>> {
        let split_size = self.options.way_split_size;
        let elements = match geometry {
            Geometry::Point(coord) => {
                let id = self.resolve_node(*coord, scope.group, scope.in_collection, Some(scope.tags));
                vec![ElementRef::Node(id)]
            },
            Geometry::LineString(coords) => self
                .build_way(coords, Some(scope.tags), scope.endpoints)
                .into_iter()
                .map(ElementRef::Way)
                .collect(),
            Geometry::Polygon(polygon) if is_single_way_polygon(polygon, split_size) => {
                let ring = wind_ring(&polygon.rings[0], true, self.options.winding)?;
                self.build_way(&ring, Some(scope.tags), None)
                    .into_iter()
                    .map(ElementRef::Way)
                    .collect()
            },
            Geometry::Polygon(polygon) => {
                let id = self.build_multipolygon(std::slice::from_ref(polygon), scope.tags)?;
                vec![ElementRef::Relation(id)]
            },
            Geometry::MultiPolygon(polygons) if polygons.is_empty() => Vec::new(),
            Geometry::MultiPolygon(polygons) => {
                vec![ElementRef::Relation(self.build_multipolygon(polygons, scope.tags)?)]
            },
            Geometry::MultiPoint(coords) => {
                let member = scope.member();
                coords
                    .iter()
                    .map(|coord| {
                        ElementRef::Node(self.resolve_node(*coord, member.group, true, Some(member.tags)))
                    })
                    .collect()
            },
            Geometry::MultiLineString(lines) => {
                let mut elements = Vec::new();
                for line in lines {
                    let ways = self.build_way(line, Some(scope.tags), scope.endpoints);
                    elements.extend(ways.into_iter().map(ElementRef::Way));
                }
                elements
            },
            Geometry::GeometryCollection(members) => {
                let mut elements = Vec::new();
                for member in members {
                    elements.extend(self.dispatch(member, scope.member())?);
                }
                elements
            },
        };
        Ok(elements)
    }
}

fn is_single_way_polygon(polygon: &Polygon, split_size: usize) -> bool {
    polygon.holes().is_empty() && polygon.exterior().is_some_and(|ring| ring.len() <= split_size)
}

fn validate_coord(coord: &Coord) -> Result<()> {
    if coord.x.is_finite() && coord.y.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidGeometry(format!("non-finite coordinate ({}, {})", coord.x, coord.y)))
    }
}

fn validate_line(coords: &[Coord]) -> Result<()> {
    if coords.len() < 2 {
        return Err(Error::InvalidGeometry(format!(
            "line needs at least 2 coordinates, got {}",
            coords.len()
        )));
    }
    coords.iter().try_for_each(validate_coord)
}

fn validate_polygon(polygon: &Polygon) -> Result<()> {
    if polygon.rings.is_empty() {
        return Err(Error::InvalidGeometry("polygon has no rings".into()));
    }
    for ring in &polygon.rings {
        ring.iter().try_for_each(validate_coord)?;
        validate_ring(ring)?;
    }
    Ok(())
}

fn validate_geometry(geometry: &Geometry) -> Result<()> {
    match geometry {
        Geometry::Point(coord) => validate_coord(coord),
        Geometry::LineString(coords) => validate_line(coords),
        Geometry::Polygon(polygon) => validate_polygon(polygon),
        Geometry::MultiPoint(coords) => coords.iter().try_for_each(validate_coord),
        Geometry::MultiLineString(lines) => lines.iter().try_for_each(|line| validate_line(line)),
        Geometry::MultiPolygon(polygons) => polygons.iter().try_for_each(validate_polygon),
        Geometry::GeometryCollection(members) => members.iter().try_for_each(validate_geometry),
    }
}
