use sha2::{Digest, Sha256};

use crate::data::osm::OsmId;

/// Hands out ids for new elements: -1, -2, -3, ... or, when seeded, a run
/// of negative ids starting below an offset derived from the seed, so
/// repeated exports of the same source get the same ids.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    last: OsmId,
}

impl IdAllocator {
    pub fn new() -> Self {
        IdAllocator { last: 0 }
    }

    /// The offset is the first 24 bits of the seed's SHA-256, negated.
    pub fn seeded(seed: &[u8]) -> Self {
        let digest = Sha256::digest(seed);
        let offset = u32::from_be_bytes([0, digest[0], digest[1], digest[2]]);
        IdAllocator {
            last: -OsmId::from(offset),
        }
    }

    pub fn next_id(&mut self) -> OsmId {
        self.last -= 1;
        self.last
    }
}
