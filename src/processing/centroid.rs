use geo::{Centroid as _, CoordsIter, InteriorPoint};

use crate::data::geometry::{Coord, Geometry};
use crate::errors::{Error, Result};

use super::Processor;

/// Replaces a geometry with its centre of mass. Polygons are weighted by
/// area with holes subtracted, lines by length, points count equally. Only
/// the highest dimension present contributes.
pub struct Centroid;

/// Replaces a geometry with a point guaranteed to lie on it, which the
/// centroid of a concave polygon or a bent line is not.
pub struct PointOnSurface;

impl Processor for Centroid {
    fn name(&self) -> &'static str {
        "centroid"
    }

    fn process(&self, geometry: Geometry) -> Result<Geometry> {
        geo_types::Geometry::from(&geometry)
            .centroid()
            .map(|point| Geometry::Point(Coord::from(point)))
            .ok_or_else(|| empty_geometry(self.name()))
    }
}

impl Processor for PointOnSurface {
    fn name(&self) -> &'static str {
        "point_on_surface"
    }

    fn process(&self, geometry: Geometry) -> Result<Geometry> {
        let shape = geo_types::Geometry::from(&geometry);
        // zero-area rings have no interior; fall back to their first vertex
        shape
            .interior_point()
            .or_else(|| shape.coords_iter().next().map(geo_types::Point::from))
            .map(|point| Geometry::Point(Coord::from(point)))
            .ok_or_else(|| empty_geometry(self.name()))
    }
}

fn empty_geometry(processor: &'static str) -> Error {
    Error::Processing {
        processor,
        message: "geometry has no coordinates".to_string(),
    }
}
