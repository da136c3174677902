use std::process::Command;

use prep_util::must_run_cmd;

use crate::configuration::BoundingBox;
use crate::error::{require_file, Error};

/// Uses `osmium extract` to cut `input` down to `bbox`, producing `output`. Overwrites `output`.
/// The tool's exit status is the only success signal; a missing binary or a failed run aborts.
pub fn clip_region(
    osmium: &str,
    bbox: &BoundingBox,
    input: &str,
    output: &str,
) -> Result<(), Error> {
    require_file(input)?;
    if !bbox.is_normalized() {
        warn!(
            "Bounding box corners are out of order; clipping to {} instead",
            bbox.to_osmium_arg()
        );
    }
    prep_io::create_parent_dir(output).map_err(|err| Error::io(output, err))?;

    info!("Clipping {} to {}", input, bbox.to_osmium_arg());
    must_run_cmd(&mut osmium_extract(osmium, bbox, input, output))?;
    Ok(())
}

fn osmium_extract(osmium: &str, bbox: &BoundingBox, input: &str, output: &str) -> Command {
    let mut cmd = Command::new(osmium);
    cmd.arg("extract")
        .arg("-b")
        .arg(bbox.to_osmium_arg())
        .arg(input)
        .arg("-o")
        .arg(output)
        .arg("--overwrite");
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;

    fn warsaw() -> BoundingBox {
        BoundingBox {
            west: 20.65773959858012,
            south: 52.360051812862565,
            east: 21.227893240031676,
            north: 52.116953830607656,
        }
    }

    #[test]
    fn extract_args() {
        let bbox = BoundingBox {
            west: 20.5,
            south: 52.25,
            east: 21.25,
            north: 52.0,
        };
        let cmd = osmium_extract("osmium", &bbox, "input/poland.osm.pbf", "input/input.osm.pbf");
        assert_eq!(
            prep_util::describe_cmd(&cmd),
            "osmium extract -b 20.5,52,21.25,52.25 input/poland.osm.pbf -o input/input.osm.pbf --overwrite"
        );
    }

    #[test]
    fn missing_input() {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("nope.osm.pbf").display().to_string();
        let output = tmp.path().join("out.osm.pbf").display().to_string();
        match clip_region("osmium", &warsaw(), &input, &output) {
            Err(Error::FileNotFound { path }) => assert_eq!(path, input),
            x => panic!("expected FileNotFound, got {:?}", x),
        }
    }

    #[test]
    fn missing_tool() {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("big.osm.pbf").display().to_string();
        fs_err::write(&input, b"not really a pbf").unwrap();
        let output = tmp.path().join("out.osm.pbf").display().to_string();
        let result = clip_region("definitely_not_osmium_7c1e", &warsaw(), &input, &output);
        assert!(matches!(result, Err(Error::SubprocessFailure { .. })));
        assert!(!prep_io::file_exists(&output));
    }

    #[cfg(unix)]
    #[test]
    fn failing_tool() {
        // `false` ignores its arguments and exits non-zero
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("big.osm.pbf").display().to_string();
        fs_err::write(&input, b"not really a pbf").unwrap();
        let output = tmp.path().join("out.osm.pbf").display().to_string();
        match clip_region("false", &warsaw(), &input, &output) {
            Err(Error::SubprocessFailure { cmd, .. }) => assert!(cmd.starts_with("false extract")),
            x => panic!("expected SubprocessFailure, got {:?}", x),
        }
    }
}
