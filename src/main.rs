use std::io;
use std::path::PathBuf;

use clap::Parser;
use log::info;
use structured_logger::json::new_writer;
use structured_logger::Builder;

use geo2osc::config::{create_output_dir, ExportConfig};
use geo2osc::errors::Result;
use geo2osc::etl::export_osm_change::ExportOsmChangeEtl;
use geo2osc::etl::Etl;

/// Convert a GeoJSON file into an osmChange file of new OSM elements.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Export configuration (JSON)
    #[arg(short, long, default_value = "config/export.json")]
    config: PathBuf,

    /// Discard cached output and export again
    #[arg(long)]
    clean: bool,

    /// Log level: error, warn, info, debug or trace
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn setup_logging(level: &str) {
    Builder::with_level(level)
        .with_target_writer("*", new_writer(io::stdout()))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(&cli.log_level);

    let config = ExportConfig::load(&cli.config)?;
    let output_dir = create_output_dir(&config)?;
    info!(config = &*cli.config.to_string_lossy(), output_dir = &*output_dir.to_string_lossy(); "Loaded configuration");

    let mut etl = ExportOsmChangeEtl::new(&config);
    etl.run(&output_dir, cli.clean)?;
    Ok(())
}
