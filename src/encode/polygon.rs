use crate::data::geometry::Polygon;
use crate::data::osm::{Member, MemberRole, OsmId, Relation};
use crate::data::Tags;
use crate::errors::Result;

use super::ring::wind_ring;
use super::Encoder;

impl Encoder {
    /// Builds one multipolygon relation holding the rings of every polygon.
    /// The relation is only added to the document once all of its members
    /// exist.
    pub fn build_multipolygon(&mut self, polygons: &[Polygon], tags: &Tags) -> Result<OsmId> {
        let id = self.ids.next_id();

        let mut relation_tags = Tags::with_capacity(tags.len() + 1);
        relation_tags.insert("type".to_string(), "multipolygon".to_string());
        for (key, value) in tags {
            relation_tags.entry(key.clone()).or_insert_with(|| value.clone());
        }

        let mut members = Vec::new();
        for polygon in polygons {
            self.add_polygon_members(polygon, tags, &mut members)?;
        }

        self.document.relations.push(Relation {
            id,
            members,
            tags: relation_tags,
        });
        Ok(id)
    }

    /// Outer ring first, then holes in order. Only the outer ring's ways
    /// get the feature tags.
    fn add_polygon_members(&mut self, polygon: &Polygon, tags: &Tags, members: &mut Vec<Member>) -> Result<()> {
        let rings = polygon
            .exterior()
            .map(|ring| (ring, MemberRole::Outer))
            .into_iter()
            .chain(polygon.holes().iter().map(|ring| (ring, MemberRole::Inner)));
        for (ring, role) in rings {
            let is_outer = role == MemberRole::Outer;
            let ring = wind_ring(ring, is_outer, self.options.winding)?;
            let ways = self.build_way(&ring, is_outer.then_some(tags), None);
            members.extend(ways.into_iter().map(|way| Member { way, role }));
        }
        Ok(())
    }
}
