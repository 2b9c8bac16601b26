use serde::Deserialize;

use crate::data::geometry::Coord;
use crate::errors::{Error, Result};

/// Direction outer rings are wound in. Inner rings always go the other way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum Winding {
    #[serde(rename = "cw")]
    Clockwise,
    #[default]
    #[serde(rename = "ccw")]
    CounterClockwise,
}

impl Winding {
    fn wants_clockwise(&self, is_outer: bool) -> bool {
        match self {
            Winding::Clockwise => is_outer,
            Winding::CounterClockwise => !is_outer,
        }
    }
}

/// Checks a ring is closed and has at least three distinct vertices.
pub fn validate_ring(ring: &[Coord]) -> Result<()> {
    if ring.len() < 4 {
        return Err(Error::InvalidGeometry(format!(
            "ring needs at least 4 coordinates, got {}",
            ring.len()
        )));
    }
    if ring[0] != ring[ring.len() - 1] {
        return Err(Error::InvalidGeometry("ring is not closed".into()));
    }
    let mut distinct: Vec<&Coord> = Vec::with_capacity(3);
    for coord in &ring[..ring.len() - 1] {
        if !distinct.contains(&coord) {
            distinct.push(coord);
            if distinct.len() == 3 {
                return Ok(());
            }
        }
    }
    Err(Error::InvalidGeometry(
        "ring has fewer than 3 distinct vertices".into(),
    ))
}

/// Twice the signed area of a closed ring (shoelace formula). Positive for
/// counter-clockwise rings; repeated vertices add nothing.
pub fn signed_area2(ring: &[Coord]) -> f64 {
    ring.windows(2)
        .map(|pair| pair[0].x * pair[1].y - pair[1].x * pair[0].y)
        .sum()
}

/// A non-positive signed area means clockwise, so all-collinear rings
/// count as clockwise.
pub fn ring_is_clockwise(ring: &[Coord]) -> Result<bool> {
    validate_ring(ring)?;
    Ok(signed_area2(ring) <= 0.0)
}

/// Returns the ring in the orientation required for its role.
pub fn wind_ring(ring: &[Coord], is_outer: bool, winding: Winding) -> Result<Vec<Coord>> {
    let mut wound = ring.to_vec();
    if ring_is_clockwise(ring)? != winding.wants_clockwise(is_outer) {
        wound.reverse();
    }
    Ok(wound)
}
