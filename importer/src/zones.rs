use geojson::{FeatureCollection, GeoJson, JsonObject};

use prep_util::prettyprint_usize;

use crate::error::{require_file, Error};

/// Reads a GeoJSON FeatureCollection of zones and writes it back with every feature's properties
/// reduced to just `name`. Geometry is untouched. Returns the number of zones.
pub fn normalize_zones(input: &str, output: &str) -> Result<usize, Error> {
    require_file(input)?;
    let text = fs_err::read_to_string(input).map_err(|err| Error::io(input, err))?;
    let collection = match text.parse::<GeoJson>() {
        Ok(GeoJson::FeatureCollection(collection)) => collection,
        Ok(_) => return Err(Error::malformed(input, "not a FeatureCollection")),
        Err(err) => return Err(Error::malformed(input, err)),
    };

    let collection = keep_only_names(collection, input)?;
    let num_zones = collection.features.len();
    prep_io::write_string(output, &GeoJson::from(collection).to_string())
        .map_err(|err| Error::io(output, err))?;
    info!("Wrote {} zones to {}", prettyprint_usize(num_zones), output);
    Ok(num_zones)
}

/// Every feature must have a non-null `name`. All features are checked before any is changed.
/// `path` is only used to describe errors.
pub fn keep_only_names(
    mut collection: FeatureCollection,
    path: &str,
) -> Result<FeatureCollection, Error> {
    let mut names = Vec::with_capacity(collection.features.len());
    for (idx, feature) in collection.features.iter().enumerate() {
        match feature.property("name") {
            Some(name) if !name.is_null() => names.push(name.clone()),
            _ => {
                return Err(Error::MissingField {
                    path: path.to_string(),
                    feature: idx,
                    field: "name".to_string(),
                });
            }
        }
    }

    for (feature, name) in collection.features.iter_mut().zip(names) {
        let mut properties = JsonObject::new();
        properties.insert("name".to_string(), name);
        feature.properties = Some(properties);
    }
    Ok(collection)
}
