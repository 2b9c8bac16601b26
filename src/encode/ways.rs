use std::ops::Range;

use crate::data::geometry::Coord;
use crate::data::osm::{OsmId, Way};
use crate::data::{EndpointRefs, Tags};

use super::nodes::TagGroup;
use super::Encoder;

/// Splits `len` coordinates into index ranges of at most `max_nodes`, each
/// range starting on the last index of the one before it. Stops once fewer
/// than two coordinates remain, so every range spans at least two.
pub fn chunk_ranges(len: usize, max_nodes: usize) -> Vec<Range<usize>> {
    debug_assert!(max_nodes >= 2, "way split size below 2 never advances");
    let mut ranges = Vec::new();
    if len < 2 {
        return ranges;
    }
    let mut start = 0;
    loop {
        ranges.push(start..len.min(start + max_nodes));
        start += max_nodes - 1;
        if len.saturating_sub(start) < 2 {
            break;
        }
    }
    ranges
}

impl Encoder {
    /// Writes `coords` as one way per chunk, every way carrying the full
    /// tags. Vertices dedup on coordinate alone, so chunks join on a shared
    /// node and a closed ring reuses its first node as its last.
    pub fn build_way(&mut self, coords: &[Coord], tags: Option<&Tags>, endpoints: Option<&EndpointRefs>) -> Vec<OsmId> {
        let last_index = coords.len().saturating_sub(1);
        let ranges = chunk_ranges(coords.len(), self.options.way_split_size);
        let mut way_ids = Vec::with_capacity(ranges.len());

        for range in ranges {
            let id = self.ids.next_id();
            let mut refs = Vec::with_capacity(range.len());
            for index in range {
                let reference = endpoints.and_then(|ends| match index {
                    0 => ends.first.as_deref(),
                    i if i == last_index => ends.last.as_deref(),
                    _ => None,
                });
                refs.push(self.resolve_vertex(coords[index], reference));
            }
            self.document.ways.push(Way {
                id,
                nodes: refs,
                tags: tags.cloned().unwrap_or_default(),
            });
            way_ids.push(id);
        }
        way_ids
    }

    /// A vertex tied to an endpoint reference reuses the node already known
    /// for that reference, and otherwise becomes the node for it.
    fn resolve_vertex(&mut self, coord: Coord, reference: Option<&str>) -> OsmId {
        match reference.filter(|r| !r.is_empty()) {
            Some(reference) => {
                if let Some(id) = self.endpoint_nodes.get(reference) {
                    return *id;
                }
                let id = self.resolve_node(coord, TagGroup::VERTEX, true, None);
                self.endpoint_nodes.insert(reference.to_string(), id);
                id
            },
            None => self.resolve_node(coord, TagGroup::VERTEX, true, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::tags;
    use crate::encode::EncoderOptions;

    fn encoder(way_split_size: usize) -> Encoder {
        Encoder::new(EncoderOptions {
            way_split_size,
            ..EncoderOptions::default()
        })
        .unwrap()
    }

    fn diagonal(len: usize) -> Vec<Coord> {
        (0..len).map(|x| Coord::new(x as f64, -(x as f64))).collect()
    }

    #[test]
    fn chunks_overlap_by_one() {
        assert_eq!(chunk_ranges(10, 10), vec![0..10]);
        assert_eq!(chunk_ranges(11, 10), vec![0..10, 9..11]);
        assert_eq!(chunk_ranges(19, 10), vec![0..10, 9..19]);
        assert_eq!(chunk_ranges(31, 10), vec![0..10, 9..19, 18..28, 27..31]);
        assert_eq!(chunk_ranges(5, 2), vec![0..2, 1..3, 2..4, 3..5]);
    }

    #[test]
    fn too_short_for_a_way() {
        assert!(chunk_ranges(0, 10).is_empty());
        assert!(chunk_ranges(1, 10).is_empty());
        assert_eq!(chunk_ranges(2, 10), vec![0..2]);
    }

    #[test]
    fn simple_way() {
        let mut encoder = encoder(495);
        let coords = vec![Coord::new(1.0, 1.0), Coord::new(2.0, 2.0), Coord::new(3.0, 3.0)];
        let ids = encoder.build_way(&coords, Some(&Tags::new()), None);
        let doc = encoder.document();
        assert_eq!(ids.len(), 1);
        assert_eq!(doc.nodes.len(), 3);
        let way = doc.way(ids[0]).unwrap();
        for (node_id, coord) in way.nodes.iter().zip(&coords) {
            let node = doc.node(*node_id).unwrap();
            assert_eq!((node.lon, node.lat), (coord.x, coord.y));
        }
    }

    #[test]
    fn ways_share_repeated_vertices() {
        let mut encoder = encoder(495);
        let c: Vec<Coord> = (0..6).map(|i| Coord::new(i as f64 * 10.0, i as f64)).collect();
        encoder.build_way(&[c[0], c[1], c[2]], None, None);
        encoder.build_way(&[c[1], c[2], c[3]], Some(&Tags::new()), None);
        encoder.build_way(&[c[1], c[3]], Some(&Tags::new()), None);
        encoder.build_way(&[c[4], c[1], c[5]], Some(&tags([("t", "v")])), None);
        assert_eq!(encoder.document().ways.len(), 4);
        assert_eq!(encoder.document().nodes.len(), 6);
    }

    #[test]
    fn crossing_way_reuses_node() {
        let mut encoder = encoder(495);
        let coords: Vec<Coord> = [(0.0, 0.0), (1.0, 1.0), (2.0, 0.0), (0.0, 0.0), (-1.0, -1.0)]
            .into_iter()
            .map(Coord::from)
            .collect();
        let ids = encoder.build_way(&coords, None, None);
        let way = encoder.document().way(ids[0]).unwrap();
        assert_eq!(encoder.document().nodes.len(), 4);
        assert_eq!(way.nodes.len(), 5);
        assert_eq!(way.nodes[0], way.nodes[3]);
    }

    #[test]
    fn split_way_is_connected() {
        let mut encoder = encoder(10);
        let ids = encoder.build_way(&diagonal(31), Some(&tags([("mytag", "myvalue")])), None);
        let doc = encoder.document();
        assert_eq!(ids.len(), 4);
        assert_eq!(doc.nodes.len(), 31);
        assert!(doc.relations.is_empty());

        let mut total_refs = 0;
        for pair in doc.ways.windows(2) {
            assert_eq!(pair[0].nodes.last(), pair[1].nodes.first());
        }
        for (i, way) in doc.ways.iter().enumerate() {
            assert!(way.nodes.len() <= 10);
            assert_eq!(way.tags, tags([("mytag", "myvalue")]));
            total_refs += way.nodes.len() - usize::from(i > 0);
        }
        assert_eq!(total_refs, 31);
    }

    #[test]
    fn no_empty_trailing_way() {
        let mut encoder = encoder(10);
        encoder.build_way(&diagonal(19), None, None);
        assert_eq!(encoder.document().ways.len(), 2);
    }

    #[test]
    fn endpoints_reuse_referenced_nodes() {
        let mut encoder = encoder(495).with_known_nodes([("junction-1".to_string(), 4242)]);
        let ends = EndpointRefs {
            first: Some("junction-1".into()),
            last: Some("junction-2".into()),
        };
        let first = encoder.build_way(&diagonal(3), None, Some(&ends));
        let shifted: Vec<Coord> = (10..13).map(|x| Coord::new(x as f64, 0.0)).collect();
        let second = encoder.build_way(&shifted, None, Some(&ends));

        let doc = encoder.document();
        let a = doc.way(first[0]).unwrap();
        let b = doc.way(second[0]).unwrap();
        assert_eq!(a.nodes[0], 4242);
        assert_eq!(b.nodes[0], 4242);
        // junction-2 was created by the first way and reused by the second
        assert_eq!(a.nodes[2], b.nodes[2]);
        assert_eq!(doc.nodes.len(), 3);
    }

    #[test]
    fn endpoints_span_split_ways() {
        let mut encoder = encoder(10).with_known_nodes([
            ("start".to_string(), 1),
            ("end".to_string(), 2),
        ]);
        let ends = EndpointRefs {
            first: Some("start".into()),
            last: Some("end".into()),
        };
        let ids = encoder.build_way(&diagonal(15), None, Some(&ends));
        let doc = encoder.document();
        assert_eq!(ids.len(), 2);
        assert_eq!(doc.way(ids[0]).unwrap().nodes.first(), Some(&1));
        assert_eq!(doc.way(ids[1]).unwrap().nodes.last(), Some(&2));
        assert_eq!(doc.nodes.len(), 13);
    }
}
