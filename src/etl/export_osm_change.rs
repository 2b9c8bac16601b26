use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use log::{info, warn};
use xz::bufread::XzDecoder;

use crate::config::ExportConfig;
use crate::data::geojson_source::FeatureReader;
use crate::data::osm::OsmChange;
use crate::data::Feature;
use crate::encode::Encoder;
use crate::errors::Result;
use crate::etl::Etl;
use crate::osm_change::write_osm_change;
use crate::processing::Pipeline;

pub const ETL_NAME: &str = "export_osm_change";
pub const OUTPUT_FILE_NAME: &str = "osm_change.osc";

/// Counts from the last transform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub features: usize,
    pub skipped: usize,
    pub without_output: usize,
    pub nodes: usize,
    pub ways: usize,
    pub relations: usize,
}

/// Reads the configured GeoJSON file, runs each feature through the
/// processors and the encoder, and writes the result as `osm_change.osc`.
///
/// Features that fail validation or processing are logged and left out;
/// any other error aborts the run.
pub struct ExportOsmChangeEtl<'a> {
    config: &'a ExportConfig,
    summary: ExportSummary,
}

impl ExportOsmChangeEtl<'_> {
    pub fn new(config: &ExportConfig) -> ExportOsmChangeEtl {
        ExportOsmChangeEtl {
            config,
            summary: ExportSummary::default(),
        }
    }

    pub fn summary(&self) -> ExportSummary {
        self.summary
    }

    fn create_encoder(&self) -> Result<Encoder> {
        let mut encoder = Encoder::new(self.config.encoder_options())?.with_known_nodes(self.config.known_nodes());
        if let Some(seed) = &self.config.id_seed {
            encoder = encoder.with_id_seed(seed.as_bytes());
        }
        Ok(encoder)
    }
}

impl Etl for ExportOsmChangeEtl<'_> {
    type Input = FeatureReader;
    type Output = OsmChange;

    fn etl_name(&self) -> &str {
        ETL_NAME
    }

    fn output_file_name(&self) -> &str {
        OUTPUT_FILE_NAME
    }

    fn extract(&mut self, _dir: &Path) -> Result<Self::Input> {
        let file_reader = BufReader::new(File::open(&self.config.data_path)?);
        let mapping = self.config.property_mapping();
        let reader = if self.config.is_compressed() {
            let xz_reader = XzDecoder::new(file_reader);
            FeatureReader::from_reader(BufReader::new(xz_reader), mapping)?
        } else {
            FeatureReader::from_reader(file_reader, mapping)?
        };
        info!(features = reader.remaining(), compressed = self.config.is_compressed(); "Read GeoJSON input");
        Ok(reader)
    }

    fn transform(&mut self, input: Self::Input) -> Result<Self::Output> {
        let pipeline = Pipeline::new(&self.config.processors);
        if !pipeline.is_empty() {
            info!(processors = pipeline.names().join(",").as_str(); "Applying processors");
        }
        let mut encoder = self.create_encoder()?;
        let mut summary = ExportSummary::default();

        let features: Box<dyn Iterator<Item = Result<Feature>>> = if self.config.show_progress {
            Box::new(tqdm::tqdm(input))
        } else {
            Box::new(input)
        };

        for (index, feature) in features.enumerate() {
            let encoded = feature
                .and_then(|feature| pipeline.apply(feature))
                .and_then(|feature| encoder.encode(&feature));
            match encoded {
                Ok(elements) => {
                    summary.features += 1;
                    if elements.is_empty() {
                        summary.without_output += 1;
                    }
                },
                Err(err) if err.is_feature_error() => {
                    summary.skipped += 1;
                    warn!(feature = index, err = err.to_string().as_str(); "Skipping feature");
                },
                Err(err) => return Err(err),
            }
        }

        let change = encoder.finish();
        summary.nodes = change.nodes.len();
        summary.ways = change.ways.len();
        summary.relations = change.relations.len();
        self.summary = summary;

        info!(
            features = summary.features,
            skipped = summary.skipped,
            without_output = summary.without_output,
            nodes = summary.nodes,
            ways = summary.ways,
            relations = summary.relations;
            "Encoded features"
        );
        Ok(change)
    }

    fn load(&mut self, dir: &Path, output: Self::Output) -> Result<()> {
        let mut writer = BufWriter::new(File::create(self.output_path(dir))?);
        write_osm_change(&mut writer, &output)?;
        writer.flush()?;
        Ok(())
    }
}
