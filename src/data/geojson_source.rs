use std::io::Read;
use std::vec;

use geojson::{JsonObject, Value};
use indexmap::map::Entry;
use log::debug;
use serde_json::{json, Value as JsonValue};

use crate::data::geometry::{Coord, Geometry, Polygon};
use crate::data::{EndpointRefs, Feature, Tags};
use crate::errors::{Error, Result};

/// How feature properties become tags.
#[derive(Debug, Clone, Default)]
pub struct PropertyMapping {
    /// Appended to every feature; a property with the same key wins.
    pub extra_tags: Tags,
    /// Property holding the reference of the node a line starts on.
    pub start_field: Option<String>,
    /// Property holding the reference of the node a line ends on.
    pub end_field: Option<String>,
}

/// Features of a parsed GeoJSON document, converted one at a time.
///
/// Yields an error for a feature that cannot be converted; the caller
/// decides whether to skip it. Features with a geometry type GeoJSON does
/// not define are dropped silently.
pub struct FeatureReader {
    items: vec::IntoIter<JsonValue>,
    mapping: PropertyMapping,
    index: usize,
}

impl FeatureReader {
    /// Accepts a FeatureCollection, a single Feature or a bare geometry.
    pub fn from_reader<R: Read>(reader: R, mapping: PropertyMapping) -> Result<Self> {
        let root: JsonValue = serde_json::from_reader(reader)?;
        let JsonValue::Object(mut root) = root else {
            return Err("GeoJSON document must be a JSON object".into());
        };

        let kind = root.get("type").and_then(JsonValue::as_str).map(str::to_owned);
        let items = match kind.as_deref() {
            Some("FeatureCollection") => match root.remove("features") {
                Some(JsonValue::Array(features)) => features,
                _ => return Err("FeatureCollection has no features array".into()),
            },
            Some("Feature") => vec![JsonValue::Object(root)],
            Some(_) => vec![json!({
                "type": "Feature",
                "geometry": JsonValue::Object(root),
                "properties": null,
            })],
            None => return Err("GeoJSON object has no type".into()),
        };

        Ok(FeatureReader {
            items: items.into_iter(),
            mapping,
            index: 0,
        })
    }

    pub fn remaining(&self) -> usize {
        self.items.len()
    }
}

impl Iterator for FeatureReader {
    type Item = Result<Feature>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let item = self.items.next()?;
            let index = self.index;
            self.index += 1;
            match convert_feature(item, &self.mapping) {
                Err(Error::UnsupportedGeometryType(kind)) => {
                    debug!(feature = index, geometry_type = kind.as_str(); "Skipping unsupported geometry");
                },
                converted => return Some(converted),
            }
        }
    }
}

fn convert_feature(item: JsonValue, mapping: &PropertyMapping) -> Result<Feature> {
    let feature = match geojson::Feature::try_from(item) {
        Ok(feature) => feature,
        Err(geojson::Error::GeometryUnknownType(kind)) => {
            return Err(Error::UnsupportedGeometryType(kind))
        },
        Err(err) => {
            return Err(Error::InvalidGeometry(format!("malformed GeoJSON feature: {err}")))
        },
    };

    let geometry = feature
        .geometry
        .as_ref()
        .map(|geometry| convert_value(&geometry.value))
        .transpose()?
        .filter(|geometry| !geometry.is_empty());
    let (tags, endpoints) = tags_from_properties(feature.properties.as_ref(), mapping);

    Ok(Feature {
        geometry,
        tags,
        endpoints,
    })
}

/// Builds tags from properties in source order. Strings are
/// trimmed, empty strings and nulls dropped, anything else keeps its JSON
/// text. Endpoint reference fields are consumed rather than tagged. Keys
/// are trimmed too; when two trim to the same key the first one is kept.
pub fn tags_from_properties(properties: Option<&JsonObject>, mapping: &PropertyMapping) -> (Tags, EndpointRefs) {
    let mut tags = Tags::new();
    let mut endpoints = EndpointRefs::default();

    for (key, value) in properties.into_iter().flatten() {
        let mut consumed = false;
        if mapping.start_field.as_deref() == Some(key.as_str()) {
            endpoints.first = property_text(value);
            consumed = true;
        }
        if mapping.end_field.as_deref() == Some(key.as_str()) {
            endpoints.last = property_text(value);
            consumed = true;
        }
        if consumed {
            continue;
        }
        if let Some(text) = property_text(value) {
            match tags.entry(key.trim().to_string()) {
                Entry::Vacant(entry) => {
                    entry.insert(text);
                },
                Entry::Occupied(entry) => {
                    debug!(key = entry.key().as_str(); "Skipping duplicate property key");
                },
            }
        }
    }

    for (key, value) in &mapping.extra_tags {
        tags.entry(key.clone()).or_insert_with(|| value.clone());
    }
    (tags, endpoints)
}

fn property_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Null => None,
        JsonValue::String(text) => {
            let text = text.trim();
            (!text.is_empty()).then(|| text.to_string())
        },
        other => Some(other.to_string()),
    }
}

fn convert_position(position: &[f64]) -> Result<Coord> {
    match position {
        [x, y, ..] => Ok(Coord::new(*x, *y)),
        _ => Err(Error::InvalidGeometry(format!(
            "position needs 2 ordinates, got {}",
            position.len()
        ))),
    }
}

fn convert_positions(positions: &[Vec<f64>]) -> Result<Vec<Coord>> {
    positions.iter().map(|p| convert_position(p)).collect()
}

fn convert_polygon(rings: &[Vec<Vec<f64>>]) -> Result<Polygon> {
    let rings = rings
        .iter()
        .map(|ring| convert_positions(ring))
        .collect::<Result<Vec<_>>>()?;
    Ok(Polygon { rings })
}

pub fn convert_value(value: &Value) -> Result<Geometry> {
    Ok(match value {
        Value::Point(position) => Geometry::Point(convert_position(position)?),
        Value::MultiPoint(positions) => Geometry::MultiPoint(convert_positions(positions)?),
        Value::LineString(positions) => Geometry::LineString(convert_positions(positions)?),
        Value::MultiLineString(lines) => Geometry::MultiLineString(
            lines
                .iter()
                .map(|line| convert_positions(line))
                .collect::<Result<_>>()?,
        ),
        Value::Polygon(rings) => Geometry::Polygon(convert_polygon(rings)?),
        Value::MultiPolygon(polygons) => Geometry::MultiPolygon(
            polygons
                .iter()
                .map(|rings| convert_polygon(rings))
                .collect::<Result<_>>()?,
        ),
        Value::GeometryCollection(members) => Geometry::GeometryCollection(
            members
                .iter()
                .map(|member| convert_value(&member.value))
                .collect::<Result<_>>()?,
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::tags;

    fn read(text: &str, mapping: PropertyMapping) -> Vec<Result<Feature>> {
        FeatureReader::from_reader(text.as_bytes(), mapping).unwrap().collect()
    }

    #[test]
    fn reads_feature_collection_in_order() {
        let features = read(
            r#"{"type": "FeatureCollection", "features": [
                {"type": "Feature", "geometry": {"type": "Point", "coordinates": [174.7, -41.3]},
                 "properties": {"name": "  Te Aro  ", "height": 12, "ref": "", "note": null, "lit": true}},
                {"type": "Feature", "geometry": {"type": "LineString", "coordinates": [[0, 0], [1, 1, 5]]},
                 "properties": {}}
            ]}"#,
            PropertyMapping::default(),
        );
        assert_eq!(features.len(), 2);

        let first = features[0].as_ref().unwrap();
        assert_eq!(first.geometry, Some(Geometry::Point(Coord::new(174.7, -41.3))));
        assert_eq!(first.tags, tags([("name", "Te Aro"), ("height", "12"), ("lit", "true")]));

        let second = features[1].as_ref().unwrap();
        assert_eq!(
            second.geometry,
            Some(Geometry::LineString(vec![Coord::new(0.0, 0.0), Coord::new(1.0, 1.0)]))
        );
    }

    #[test]
    fn skips_unknown_geometry_types() {
        let features = read(
            r#"{"type": "FeatureCollection", "features": [
                {"type": "Feature", "geometry": {"type": "Relation", "coordinates": []}, "properties": {}},
                {"type": "Feature", "geometry": null, "properties": {"a": "b"}}
            ]}"#,
            PropertyMapping::default(),
        );
        assert_eq!(features.len(), 1);
        let feature = features[0].as_ref().unwrap();
        assert!(feature.geometry.is_none());
        assert_eq!(feature.tags, tags([("a", "b")]));
    }

    #[test]
    fn short_position_is_invalid() {
        let features = read(
            r#"{"type": "Feature", "geometry": {"type": "Point", "coordinates": [1]}, "properties": {}}"#,
            PropertyMapping::default(),
        );
        assert!(matches!(features[0], Err(Error::InvalidGeometry(_))));
    }

    #[test]
    fn bare_geometry_becomes_untagged_feature() {
        let features = read(
            r#"{"type": "Polygon", "coordinates": [[[0, 0], [1, 1], [2, 0], [0, 0]]]}"#,
            PropertyMapping::default(),
        );
        let feature = features[0].as_ref().unwrap();
        assert!(matches!(feature.geometry, Some(Geometry::Polygon(_))));
        assert!(feature.tags.is_empty());
    }

    #[test]
    fn mapping_adds_extra_tags_and_endpoints() {
        let mapping = PropertyMapping {
            extra_tags: tags([("source", "survey"), ("name", "ignored")]),
            start_field: Some("from_node".into()),
            end_field: Some("to_node".into()),
        };
        let features = read(
            r#"{"type": "Feature", "geometry": {"type": "LineString", "coordinates": [[0, 0], [1, 1]]},
                "properties": {"name": "Main St", "from_node": 17, "to_node": " "}}"#,
            mapping,
        );
        let feature = features[0].as_ref().unwrap();
        assert_eq!(feature.tags, tags([("name", "Main St"), ("source", "survey")]));
        assert_eq!(
            feature.endpoints,
            EndpointRefs {
                first: Some("17".into()),
                last: None,
            }
        );
    }

    #[test]
    fn first_of_colliding_trimmed_keys_wins() {
        let properties = json!({"name": "Cuba St", " name ": "Cuba Mall", "ref": "7"});
        let (tags_out, _) = tags_from_properties(properties.as_object(), &PropertyMapping::default());
        assert_eq!(tags_out, tags([("name", "Cuba St"), ("ref", "7")]));
    }

    #[test]
    fn rejects_non_geojson() {
        assert!(FeatureReader::from_reader("[1, 2]".as_bytes(), PropertyMapping::default()).is_err());
        assert!(FeatureReader::from_reader("{\"a\": 1}".as_bytes(), PropertyMapping::default()).is_err());
    }
}
