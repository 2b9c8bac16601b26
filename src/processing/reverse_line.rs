use crate::data::geometry::Geometry;
use crate::errors::{Error, Result};

use super::Processor;

/// Reverses the coordinate order of lines. Only valid for line layers, and
/// only worth using once the source direction has been checked by hand.
pub struct ReverseLine;

impl Processor for ReverseLine {
    fn name(&self) -> &'static str {
        "reverse_line"
    }

    fn process(&self, geometry: Geometry) -> Result<Geometry> {
        match geometry {
            Geometry::LineString(mut coords) => {
                coords.reverse();
                Ok(Geometry::LineString(coords))
            },
            Geometry::MultiLineString(mut lines) => {
                lines.iter_mut().for_each(|line| line.reverse());
                Ok(Geometry::MultiLineString(lines))
            },
            other => Err(Error::Processing {
                processor: self.name(),
                message: format!("only lines can be reversed, got {}", other.type_name()),
            }),
        }
    }
}
