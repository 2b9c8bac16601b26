pub mod centroid;
pub mod reverse_line;

use serde::Deserialize;

use crate::data::geometry::Geometry;
use crate::data::Feature;
use crate::errors::Result;

use self::centroid::{Centroid, PointOnSurface};
use self::reverse_line::ReverseLine;

/// A geometry rewrite applied to each feature before it is encoded.
pub trait Processor {
    fn name(&self) -> &'static str;

    fn process(&self, geometry: Geometry) -> Result<Geometry>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessorKind {
    ReverseLine,
    Centroid,
    PointOnSurface,
}

impl ProcessorKind {
    pub fn build(&self) -> Box<dyn Processor> {
        match self {
            ProcessorKind::ReverseLine => Box::new(ReverseLine),
            ProcessorKind::Centroid => Box::new(Centroid),
            ProcessorKind::PointOnSurface => Box::new(PointOnSurface),
        }
    }
}

/// Processors run in the order they are configured.
#[derive(Default)]
pub struct Pipeline {
    processors: Vec<Box<dyn Processor>>,
}

impl Pipeline {
    pub fn new(kinds: &[ProcessorKind]) -> Self {
        Pipeline {
            processors: kinds.iter().map(ProcessorKind::build).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.processors.iter().map(|p| p.name()).collect()
    }

    pub fn apply(&self, mut feature: Feature) -> Result<Feature> {
        if let Some(mut geometry) = feature.geometry.take() {
            for processor in &self.processors {
                geometry = processor.process(geometry)?;
            }
            feature.geometry = Some(geometry);
        }
        Ok(feature)
    }
}
