use std::collections::HashMap;
use std::fs::{create_dir_all, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::data::geojson_source::PropertyMapping;
use crate::data::osm::OsmId;
use crate::data::Tags;
use crate::encode::ring::Winding;
use crate::encode::{EncoderOptions, DEFAULT_WAY_SPLIT_SIZE};
use crate::errors::{Error, Result};
use crate::processing::ProcessorKind;

/// Settings for one export run, read from a JSON file.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    /// GeoJSON input. A `.xz` suffix means the file is xz-compressed.
    pub data_path: String,
    #[serde(default = "default_output_root")]
    pub output_root: String,
    #[serde(default = "default_way_split_size")]
    pub way_split_size: usize,
    #[serde(default)]
    pub winding: Winding,
    /// When set, ids are derived from this string instead of counting down
    /// from -1.
    #[serde(default)]
    pub id_seed: Option<String>,
    #[serde(default)]
    pub processors: Vec<ProcessorKind>,
    #[serde(default)]
    pub extra_tags: Tags,
    #[serde(default)]
    pub node_reuse: Option<NodeReuseConfig>,
    #[serde(default)]
    pub show_progress: bool,
}

/// Lets lines start and end on shared nodes identified by a property
/// value rather than by coordinate.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodeReuseConfig {
    pub start_field: Option<String>,
    pub end_field: Option<String>,
    /// References that map onto nodes already in the database.
    #[serde(default)]
    pub known_nodes: HashMap<String, OsmId>,
}

fn default_output_root() -> String {
    "output".to_string()
}

fn default_way_split_size() -> usize {
    DEFAULT_WAY_SPLIT_SIZE
}

impl ExportConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .map_err(|err| Error::Config(format!("could not open {}: {err}", path.display())))?;
        let config: ExportConfig = serde_json::from_reader(BufReader::new(file))
            .map_err(|err| Error::Config(format!("could not parse {}: {err}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.data_path.trim().is_empty() {
            return Err(Error::Config("data_path must not be empty".to_string()));
        }
        self.encoder_options().validate()
    }

    pub fn encoder_options(&self) -> EncoderOptions {
        EncoderOptions {
            way_split_size: self.way_split_size,
            winding: self.winding,
        }
    }

    pub fn property_mapping(&self) -> PropertyMapping {
        let node_reuse = self.node_reuse.clone().unwrap_or_default();
        PropertyMapping {
            extra_tags: self.extra_tags.clone(),
            start_field: node_reuse.start_field,
            end_field: node_reuse.end_field,
        }
    }

    pub fn known_nodes(&self) -> impl Iterator<Item = (String, OsmId)> + '_ {
        self.node_reuse
            .iter()
            .flat_map(|reuse| reuse.known_nodes.iter().map(|(key, id)| (key.clone(), *id)))
    }

    pub fn is_compressed(&self) -> bool {
        self.data_path.ends_with(".xz")
    }
}

/// Creates `<output_root>/<input file name>` and returns it.
pub fn create_output_dir(config: &ExportConfig) -> Result<PathBuf> {
    let input_fname = Path::new(&config.data_path)
        .file_name()
        .ok_or("Could not get input file name")?;
    let output_dir = Path::new(&config.output_root).join(input_fname);
    create_dir_all(&output_dir)?;
    Ok(output_dir)
}
