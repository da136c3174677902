//! Prepares the input files for an origin/destination network analysis: a clipped OSM extract,
//! building centroids as origins and destinations, zones with only a `name`, and a
//! `from,to,count` trip table.
//!
//! The stages run in a fixed order and the first failure aborts the whole run.

#[macro_use]
extern crate log;

mod centroids;
mod clip;
mod configuration;
mod error;
mod od;
mod utils;
mod zones;

use std::fmt;

use anyhow::{Context, Result};

use prep_util::Timer;

pub use crate::centroids::extract_centroids;
pub use crate::clip::clip_region;
pub use crate::configuration::{
    load_configuration, parse_configuration, BoundingBox, Downloads, Mode, PipelineConfig,
    SourceMode,
};
pub use crate::error::Error;
pub use crate::od::{convert_trip_table, convert_trips};
pub use crate::utils::{download, download_inputs};
pub use crate::zones::{keep_only_names, normalize_zones};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Setup,
    Download,
    ClipRegion,
    Origins,
    Destinations,
    Zones,
    OD,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Stage::Setup => "setup",
            Stage::Download => "download",
            Stage::ClipRegion => "clip region",
            Stage::Origins => "origins",
            Stage::Destinations => "destinations",
            Stage::Zones => "zones",
            Stage::OD => "od",
        };
        write!(f, "{}", name)
    }
}

/// Runs every stage in order.
pub async fn run(config: &PipelineConfig) -> Result<()> {
    let mut timer = Timer::new("prepare inputs");

    run_stage(&mut timer, Stage::Setup, || {
        prep_io::create_dir_all(&config.output_dir)
            .map_err(|err| Error::io(&config.output_dir, err))
    })?;

    if config.source == SourceMode::Download {
        timer.start(Stage::Download.to_string());
        download_inputs(config)
            .await
            .with_context(|| format!("{} stage failed", Stage::Download))?;
        timer.stop(Stage::Download.to_string());
    }

    run_stage(&mut timer, Stage::ClipRegion, || {
        if config.clip_region {
            clip_region(
                &config.osmium,
                &config.bounding_box,
                &config.input_map_path,
                &config.clipped_map_path(),
            )
        } else {
            info!("Skipping, because clip_region is off");
            Ok(())
        }
    })?;

    run_stage(&mut timer, Stage::Origins, || {
        extract_centroids(&config.clipped_map_path(), &config.origins_path())
    })?;

    run_stage(&mut timer, Stage::Destinations, || {
        let path = config.destinations_path();
        info!("Destinations are every building, same as origins, in {}", path);
        error::require_file(&path)
    })?;

    run_stage(&mut timer, Stage::Zones, || {
        normalize_zones(&config.zones_input, &config.zones_path())
    })?;

    run_stage(&mut timer, Stage::OD, || {
        convert_trip_table(&config.od_input, &config.od_path(), &config.mode)
    })?;

    timer.done();
    Ok(())
}

fn run_stage<T, F: FnOnce() -> Result<T, Error>>(
    timer: &mut Timer,
    stage: Stage,
    f: F,
) -> Result<T> {
    timer.start(stage.to_string());
    let result = f().with_context(|| format!("{} stage failed", stage))?;
    timer.stop(stage.to_string());
    Ok(result)
}
