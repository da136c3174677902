use anyhow::Result;
use structopt::StructOpt;

use importer::{load_configuration, Mode, SourceMode};

#[derive(StructOpt)]
#[structopt(
    name = "importer",
    about = "Prepares OSM, zone, and trip inputs for an origin/destination network analysis"
)]
struct Args {
    /// A TOML file overriding parts of the default configuration. If it doesn't exist, the
    /// defaults are used.
    #[structopt(long, default_value = "setup.toml")]
    config: String,
    /// Which column of the trip table becomes `count`: bicycle (to compare against cycle
    /// counters), car or all_modes (to estimate mode shift), or any other column
    #[structopt(long)]
    mode: Option<Mode>,
    /// Clip the regional OSM extract to the bounding box before extracting buildings
    #[structopt(long)]
    clip: bool,
    /// Download any missing inputs that have a URL configured
    #[structopt(long)]
    download: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    prep_util::setup_logging();
    let args = Args::from_args();

    let mut config = load_configuration(&args.config)?;
    if let Some(mode) = args.mode {
        config.mode = mode;
    }
    if args.clip {
        config.clip_region = true;
    }
    if args.download {
        config.source = SourceMode::Download;
    }

    importer::run(&config).await
}
