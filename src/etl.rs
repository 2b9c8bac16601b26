pub mod export_osm_change;

use std::fs;
use std::path::{Path, PathBuf};

use log::{error, info};

use crate::errors::Result;

/// A pipeline stage that reads its input, converts it and writes a single
/// output file into the run directory. A stage whose output file already
/// exists is skipped.
pub trait Etl {
    type Input;
    type Output;

    fn etl_name(&self) -> &str;
    fn output_file_name(&self) -> &str;

    fn extract(&mut self, dir: &Path) -> Result<Self::Input>;
    fn transform(&mut self, input: Self::Input) -> Result<Self::Output>;
    fn load(&mut self, dir: &Path, output: Self::Output) -> Result<()>;

    fn output_path(&self, dir: &Path) -> PathBuf {
        dir.join(self.output_file_name())
    }

    fn is_cached(&self, dir: &Path) -> Result<bool> {
        Ok(self.output_path(dir).try_exists()?)
    }

    fn clean(&self, dir: &Path) -> Result<()> {
        if self.is_cached(dir)? {
            info!(etl_name = self.etl_name(); "Removing cached output");
            fs::remove_file(self.output_path(dir))?;
        }
        Ok(())
    }

    /// Runs the stage, first discarding any cached output when `force` is
    /// set.
    fn run(&mut self, dir: &Path, force: bool) -> Result<()> {
        if force {
            self.clean(dir)?;
        }
        self.process(dir)
    }

    fn process(&mut self, dir: &Path) -> Result<()> {
        info!(etl_name = self.etl_name(); "Starting ETL process");
        if self.is_cached(dir)? {
            info!(etl_name = self.etl_name(); "Using cached value");
        } else {
            info!(etl_name = self.etl_name(); "Extracting");
            let input = self.extract(dir).map_err(|err| log_failure(self.etl_name(), "Extraction", err))?;

            info!(etl_name = self.etl_name(); "Transforming");
            let output = self
                .transform(input)
                .map_err(|err| log_failure(self.etl_name(), "Transformation", err))?;

            info!(etl_name = self.etl_name(); "Loading");
            self.load(dir, output)
                .map_err(|err| log_failure(self.etl_name(), "Loading", err))?;
        }
        info!(etl_name = self.etl_name(); "Process finished");
        Ok(())
    }
}

fn log_failure<E: std::fmt::Display>(etl_name: &str, stage: &str, err: E) -> E {
    error!(etl_name = etl_name, stage = stage, err = err.to_string().as_str(); "ETL stage failed with error");
    err
}
