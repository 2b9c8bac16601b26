use std::io::Write;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;

use crate::data::osm::{Node, OsmChange, Relation, Way};
use crate::data::Tags;
use crate::encode::nodes::format_degrees;
use crate::errors::Result;

pub const GENERATOR: &str = "geo2osc";
pub const OSM_API_VERSION: &str = "0.6";

/// Serialises the changeset as an indented `osmChange` document holding a
/// single `create` block: nodes, then ways, then relations.
pub fn write_osm_change<W: Write>(out: W, change: &OsmChange) -> Result<()> {
    let mut writer = Writer::new_with_indent(out, b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let header = [("version", OSM_API_VERSION), ("generator", GENERATOR)];
    writer.write_event(Event::Start(BytesStart::new("osmChange").with_attributes(header)))?;
    writer.write_event(Event::Start(BytesStart::new("create").with_attributes(header)))?;

    for node in &change.nodes {
        write_node(&mut writer, node)?;
    }
    for way in &change.ways {
        write_way(&mut writer, way)?;
    }
    for relation in &change.relations {
        write_relation(&mut writer, relation)?;
    }

    writer.write_event(Event::End(BytesEnd::new("create")))?;
    writer.write_event(Event::End(BytesEnd::new("osmChange")))?;
    writer.into_inner().write_all(b"\n")?;
    Ok(())
}

/// Convenience wrapper returning the document as a string.
pub fn osm_change_to_string(change: &OsmChange) -> Result<String> {
    let mut buf = Vec::new();
    write_osm_change(&mut buf, change)?;
    String::from_utf8(buf).map_err(|e| e.to_string().into())
}

fn write_node<W: Write>(writer: &mut Writer<W>, node: &Node) -> Result<()> {
    let id = node.id.to_string();
    let lat = format_degrees(node.lat);
    let lon = format_degrees(node.lon);
    let start = BytesStart::new("node").with_attributes([
        ("id", id.as_str()),
        ("lat", lat.as_str()),
        ("lon", lon.as_str()),
    ]);

    if node.tags.is_empty() {
        writer.write_event(Event::Empty(start))?;
    } else {
        writer.write_event(Event::Start(start))?;
        write_tags(writer, &node.tags)?;
        writer.write_event(Event::End(BytesEnd::new("node")))?;
    }
    Ok(())
}

fn write_way<W: Write>(writer: &mut Writer<W>, way: &Way) -> Result<()> {
    let id = way.id.to_string();
    writer.write_event(Event::Start(BytesStart::new("way").with_attributes([("id", id.as_str())])))?;
    for node_id in &way.nodes {
        let node_ref = node_id.to_string();
        writer.write_event(Event::Empty(
            BytesStart::new("nd").with_attributes([("ref", node_ref.as_str())]),
        ))?;
    }
    write_tags(writer, &way.tags)?;
    writer.write_event(Event::End(BytesEnd::new("way")))?;
    Ok(())
}

fn write_relation<W: Write>(writer: &mut Writer<W>, relation: &Relation) -> Result<()> {
    let id = relation.id.to_string();
    writer.write_event(Event::Start(
        BytesStart::new("relation").with_attributes([("id", id.as_str())]),
    ))?;
    for member in &relation.members {
        let way_ref = member.way.to_string();
        writer.write_event(Event::Empty(BytesStart::new("member").with_attributes([
            ("type", "way"),
            ("ref", way_ref.as_str()),
            ("role", member.role.as_str()),
        ])))?;
    }
    write_tags(writer, &relation.tags)?;
    writer.write_event(Event::End(BytesEnd::new("relation")))?;
    Ok(())
}

fn write_tags<W: Write>(writer: &mut Writer<W>, tags: &Tags) -> Result<()> {
    for (key, value) in tags {
        writer.write_event(Event::Empty(
            BytesStart::new("tag").with_attributes([("k", key.as_str()), ("v", value.as_str())]),
        ))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::osm::{Member, MemberRole};
    use crate::data::tags;

    #[test]
    fn empty_change_has_create_block() {
        let xml = osm_change_to_string(&OsmChange::default()).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<osmChange version=\"0.6\" generator=\"geo2osc\">"));
        assert!(xml.contains("<create version=\"0.6\" generator=\"geo2osc\">"));
        assert!(xml.ends_with("</osmChange>\n"));
    }

    #[test]
    fn writes_elements_in_order() {
        let change = OsmChange {
            nodes: vec![
                Node { id: -1, lon: 174.5, lat: -41.25, tags: Tags::new() },
                Node { id: -2, lon: 175.0, lat: -41.0, tags: tags([("amenity", "bench")]) },
            ],
            ways: vec![Way { id: -3, nodes: vec![-1, -2], tags: tags([("highway", "path")]) }],
            relations: vec![Relation {
                id: -4,
                members: vec![Member { way: -3, role: MemberRole::Outer }],
                tags: tags([("type", "multipolygon")]),
            }],
        };
        let xml = osm_change_to_string(&change).unwrap();

        let expected = [
            "<node id=\"-1\" lat=\"-41.25\" lon=\"174.5\"/>",
            "<node id=\"-2\" lat=\"-41\" lon=\"175\">",
            "<tag k=\"amenity\" v=\"bench\"/>",
            "<way id=\"-3\">",
            "<nd ref=\"-1\"/>",
            "<nd ref=\"-2\"/>",
            "<tag k=\"highway\" v=\"path\"/>",
            "<relation id=\"-4\">",
            "<member type=\"way\" ref=\"-3\" role=\"outer\"/>",
            "<tag k=\"type\" v=\"multipolygon\"/>",
        ];
        let mut cursor = 0;
        for fragment in expected {
            let found = xml[cursor..].find(fragment).unwrap_or_else(|| panic!("missing {fragment} in {xml}"));
            cursor += found + fragment.len();
        }
    }

    #[test]
    fn escapes_tag_text() {
        let change = OsmChange {
            nodes: vec![Node {
                id: -1,
                lon: 0.0,
                lat: 0.0,
                tags: tags([("name", "Fish & \"Chips\" <Ltd>")]),
            }],
            ..OsmChange::default()
        };
        let xml = osm_change_to_string(&change).unwrap();
        assert!(xml.contains("v=\"Fish &amp; &quot;Chips&quot; &lt;Ltd&gt;\""));
    }
}
