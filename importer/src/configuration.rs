use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::Deserialize;

/// A rectangle in WGS84, in decimal degrees.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct BoundingBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl BoundingBox {
    /// Swaps corners given in the wrong order, so west <= east and south <= north.
    pub fn normalized(self) -> BoundingBox {
        BoundingBox {
            west: self.west.min(self.east),
            south: self.south.min(self.north),
            east: self.west.max(self.east),
            north: self.south.max(self.north),
        }
    }

    pub fn is_normalized(&self) -> bool {
        self.west <= self.east && self.south <= self.north
    }

    /// The `LEFT,BOTTOM,RIGHT,TOP` form that `osmium extract -b` expects.
    pub fn to_osmium_arg(&self) -> String {
        let b = self.normalized();
        format!("{},{},{},{}", b.west, b.south, b.east, b.north)
    }
}

/// Which column of the trip table becomes `count`. The right choice depends on the goal:
/// `bicycle` to compare against cycle counters, `car` or `all_modes` to estimate mode shift.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum Mode {
    Bicycle,
    Car,
    AllModes,
    /// Any other column in the input table, like `walking`
    Other(String),
}

impl Mode {
    pub fn column(&self) -> &str {
        match self {
            Mode::Bicycle => "bicycle",
            Mode::Car => "car",
            Mode::AllModes => "all_modes",
            Mode::Other(column) => column,
        }
    }
}

impl From<String> for Mode {
    fn from(column: String) -> Mode {
        match column.as_str() {
            "bicycle" => Mode::Bicycle,
            "car" => Mode::Car,
            "all_modes" => Mode::AllModes,
            _ => Mode::Other(column),
        }
    }
}

impl FromStr for Mode {
    type Err = std::convert::Infallible;

    fn from_str(x: &str) -> Result<Mode, Self::Err> {
        Ok(Mode::from(x.to_string()))
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.column())
    }
}

/// Where the raw inputs come from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceMode {
    /// Fetch every input that has a URL and isn't already on disk
    Download,
    /// Only use files already on disk
    LocalFile,
}

/// Remote locations of the raw inputs, used in `SourceMode::Download`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Downloads {
    pub osm: Option<String>,
    pub zones: Option<String>,
    pub od: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PipelineConfig {
    pub source: SourceMode,
    /// Every output goes here. Created if needed.
    pub output_dir: String,
    pub bounding_box: BoundingBox,
    /// The large regional extract that gets clipped
    pub input_map_path: String,
    /// Clip `input_map_path` to `bounding_box` before extracting buildings. Off by default, when
    /// the clipped map already exists.
    pub clip_region: bool,
    pub zones_input: String,
    pub od_input: String,
    pub mode: Mode,
    pub downloads: Downloads,
    /// The osmium binary
    pub osmium: String,
}

impl PipelineConfig {
    /// The clipped map, written by the clip stage and read to find buildings.
    pub fn clipped_map_path(&self) -> String {
        prep_io::join(&self.output_dir, "input.osm.pbf")
    }

    pub fn origins_path(&self) -> String {
        prep_io::join(&self.output_dir, "buildings.geojson")
    }

    /// Not every zone has a school or similar destination, so every building is used for both
    /// origins and destinations.
    pub fn destinations_path(&self) -> String {
        self.origins_path()
    }

    pub fn zones_path(&self) -> String {
        prep_io::join(&self.output_dir, "zones.geojson")
    }

    pub fn od_path(&self) -> String {
        prep_io::join(&self.output_dir, "od.csv")
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        default_configuration()
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPipelineConfig {
    source: Option<SourceMode>,
    output_dir: Option<String>,
    bounding_box: Option<BoundingBox>,
    input_map_path: Option<String>,
    clip_region: Option<bool>,
    zones_input: Option<String>,
    od_input: Option<String>,
    mode: Option<Mode>,
    downloads: Option<Downloads>,
    osmium: Option<String>,
}

/// Reads a TOML file. Every key is optional; a missing file means all defaults. A file that
/// exists but doesn't parse is an error.
pub fn load_configuration(path: &str) -> Result<PipelineConfig> {
    match fs_err::read_to_string(path) {
        Ok(text) => parse_configuration(&text).with_context(|| format!("parsing {}", path)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            info!("No {}, using the default configuration", path);
            Ok(default_configuration())
        }
        Err(err) => Err(err.into()),
    }
}

pub fn parse_configuration(text: &str) -> Result<PipelineConfig> {
    let raw = toml::from_str::<RawPipelineConfig>(text)?;
    Ok(fill_in_defaults(raw))
}

fn default_configuration() -> PipelineConfig {
    PipelineConfig {
        source: SourceMode::LocalFile,
        output_dir: String::from("input"),
        // Warsaw
        bounding_box: BoundingBox {
            west: 20.65773959858012,
            south: 52.116953830607656,
            east: 21.227893240031676,
            north: 52.360051812862565,
        },
        input_map_path: String::from("input/poland-latest.osm.pbf"),
        clip_region: false,
        zones_input: String::from("input/zones_warsaw.geojson"),
        od_input: String::from("input/od_warsaw.csv"),
        mode: Mode::Bicycle,
        downloads: Downloads {
            osm: Some(String::from(
                "http://download.geofabrik.de/europe/poland-latest.osm.pbf",
            )),
            zones: None,
            od: None,
        },
        osmium: String::from("osmium"),
    }
}

fn fill_in_defaults(config: RawPipelineConfig) -> PipelineConfig {
    let mut result = default_configuration();

    result.source = value_or_default(config.source, result.source);
    result.output_dir = value_or_default(config.output_dir, result.output_dir);
    result.bounding_box = value_or_default(config.bounding_box, result.bounding_box);
    result.input_map_path = value_or_default(config.input_map_path, result.input_map_path);
    result.clip_region = value_or_default(config.clip_region, result.clip_region);
    result.zones_input = value_or_default(config.zones_input, result.zones_input);
    result.od_input = value_or_default(config.od_input, result.od_input);
    result.mode = value_or_default(config.mode, result.mode);
    result.downloads = value_or_default(config.downloads, result.downloads);
    result.osmium = value_or_default(config.osmium, result.osmium);

    result
}

fn value_or_default<T>(maybe_value: Option<T>, default: T) -> T {
    maybe_value.unwrap_or(default)
}
