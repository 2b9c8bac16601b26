//! Encodes GeoJSON features as an OSM changeset (`osmChange` XML) of new
//! nodes, ways and multipolygon relations, ready for upload.

pub mod config;
pub mod data;
pub mod encode;
pub mod errors;
pub mod etl;
pub mod osm_change;
pub mod processing;

pub use crate::config::ExportConfig;
pub use crate::data::{Feature, Tags};
pub use crate::encode::{Encoder, EncoderOptions};
pub use crate::errors::{Error, Result};
pub use crate::osm_change::write_osm_change;
