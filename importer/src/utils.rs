use anyhow::Result;

use crate::configuration::PipelineConfig;

/// If the output file doesn't already exist, downloads the URL into that location.
pub async fn download(url: &str, output: &str) -> Result<()> {
    if prep_io::file_exists(output) {
        info!("- {} already exists", output);
        return Ok(());
    }
    info!("- Missing {}, so downloading {}", output, url);
    prep_io::download_to_file(url, output, false).await
}

/// Fetches every raw input that has a URL configured. The regional OSM extract is only useful
/// when it's going to be clipped, so it's skipped otherwise.
pub async fn download_inputs(config: &PipelineConfig) -> Result<()> {
    let osm = if config.clip_region {
        config.downloads.osm.as_ref()
    } else {
        if config.downloads.osm.is_some() {
            info!("- Not downloading the OSM extract, because clip_region is off");
        }
        None
    };

    for (url, output) in [
        (osm, &config.input_map_path),
        (config.downloads.zones.as_ref(), &config.zones_input),
        (config.downloads.od.as_ref(), &config.od_input),
    ] {
        if let Some(url) = url {
            download(url, output).await?;
        }
    }
    Ok(())
}
