use std::collections::{HashMap, HashSet};

use geo::{Centroid, LineString, MultiPolygon, Polygon};
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject, Value};
use osmpbf::elements::RelMemberType;
use osmpbf::{BlobReader, BlobType, Element, ElementReader};

use prep_util::prettyprint_usize;

use crate::error::{require_file, Error};

/// Finds every building in an .osm.pbf file and writes one GeoJSON point per building, at the
/// centroid of its outer ring(s). Buildings stay in the order the file stores them: ways, then
/// multipolygon relations. Returns the number of points written.
pub fn extract_centroids(map_path: &str, output: &str) -> Result<usize, Error> {
    require_file(map_path)?;
    require_header(map_path)?;
    let mut buildings = Buildings::default();

    // Relations are stored after the ways they reference, so find building multipolygons first
    read_pbf(map_path, |element| {
        if let Element::Relation(rel) = element {
            if is_building_multipolygon(rel.tags()) {
                let outer_ways = rel
                    .members()
                    .filter(|m| {
                        m.member_type == RelMemberType::Way
                            && m.role().map_or(false, is_outer_role)
                    })
                    .map(|m| m.member_id)
                    .collect();
                buildings.add_relation(rel.id(), outer_ways);
            }
        }
    })?;

    read_pbf(map_path, |element| match element {
        Element::Node(node) => buildings.add_node(node.id(), node.lon(), node.lat()),
        Element::DenseNode(node) => buildings.add_node(node.id(), node.lon(), node.lat()),
        Element::Way(way) => buildings.add_way(way.id(), is_building(way.tags()), way.refs()),
        Element::Relation(_) => {}
    })?;

    let (collection, skipped) = buildings.into_feature_collection();
    if skipped > 0 {
        warn!(
            "Skipped {} buildings with missing nodes or unclosed rings",
            prettyprint_usize(skipped)
        );
    }
    let num_points = collection.features.len();
    prep_io::write_string(output, &GeoJson::from(collection).to_string())
        .map_err(|err| Error::io(output, err))?;
    info!(
        "Wrote {} building centroids to {}",
        prettyprint_usize(num_points),
        output
    );
    Ok(num_points)
}

/// An empty file reads as zero elements, so check for the header block every PBF starts with.
fn require_header(path: &str) -> Result<(), Error> {
    let mut blobs = BlobReader::from_path(path).map_err(|err| Error::malformed(path, err))?;
    match blobs.next() {
        Some(Ok(blob)) if matches!(blob.get_type(), BlobType::OsmHeader) => Ok(()),
        Some(Err(err)) => Err(Error::malformed(path, err)),
        _ => Err(Error::malformed(path, "no OSM data")),
    }
}

fn read_pbf<F: for<'a> FnMut(Element<'a>)>(path: &str, f: F) -> Result<(), Error> {
    ElementReader::from_path(path)
        .map_err(|err| Error::malformed(path, err))?
        .for_each(f)
        .map_err(|err| Error::malformed(path, err))
}

fn is_building<'a, I: Iterator<Item = (&'a str, &'a str)>>(mut tags: I) -> bool {
    tags.any(|(k, v)| k == "building" && v != "no")
}

fn is_building_multipolygon<'a, I: Iterator<Item = (&'a str, &'a str)>>(tags: I) -> bool {
    let mut building = false;
    let mut multipolygon = false;
    for (k, v) in tags {
        match k {
            "building" => building = v != "no",
            "type" => multipolygon = v == "multipolygon",
            _ => {}
        }
    }
    building && multipolygon
}

/// Old-style multipolygons leave the role of outer members empty.
fn is_outer_role(role: &str) -> bool {
    role == "outer" || role.is_empty()
}

/// Collects just enough of an OSM file to place every building.
#[derive(Default)]
struct Buildings {
    nodes: HashMap<i64, (f64, f64)>,
    /// Closed building ways, in file order
    ways: Vec<(i64, Vec<i64>)>,
    /// Building multipolygons and their outer member ways, in file order
    relations: Vec<(i64, Vec<i64>)>,
    member_ids: HashSet<i64>,
    member_ways: HashMap<i64, Vec<i64>>,
}

impl Buildings {
    fn add_relation(&mut self, id: i64, outer_ways: Vec<i64>) {
        self.member_ids.extend(outer_ways.iter().cloned());
        self.relations.push((id, outer_ways));
    }

    fn add_node(&mut self, id: i64, lon: f64, lat: f64) {
        self.nodes.insert(id, (lon, lat));
    }

    fn add_way<I: IntoIterator<Item = i64>>(&mut self, id: i64, is_building: bool, refs: I) {
        let wanted_as_member = self.member_ids.contains(&id);
        if !is_building && !wanted_as_member {
            return;
        }
        let refs: Vec<i64> = refs.into_iter().collect();
        if is_building && refs.len() >= 4 && refs.first() == refs.last() {
            self.ways.push((id, refs.clone()));
        }
        if wanted_as_member {
            self.member_ways.insert(id, refs);
        }
    }

    /// Also returns how many buildings couldn't be placed.
    fn into_feature_collection(self) -> (FeatureCollection, usize) {
        let mut features = Vec::new();
        let mut skipped = 0;

        for (id, refs) in &self.ways {
            match self.ring(refs).and_then(|ring| centroid(vec![ring])) {
                Some(pt) => features.push(point_feature(format!("way/{}", id), pt)),
                None => skipped += 1,
            }
        }

        for (id, outer_ways) in &self.relations {
            let pieces: Option<Vec<Vec<i64>>> = outer_ways
                .iter()
                .map(|way| self.member_ways.get(way).cloned())
                .collect();
            let pt = pieces
                .and_then(stitch_rings)
                .and_then(|rings| rings.iter().map(|refs| self.ring(refs)).collect())
                .and_then(centroid);
            match pt {
                Some(pt) => features.push(point_feature(format!("relation/{}", id), pt)),
                None => skipped += 1,
            }
        }

        let collection = FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        };
        (collection, skipped)
    }

    fn ring(&self, refs: &[i64]) -> Option<Vec<(f64, f64)>> {
        refs.iter().map(|id| self.nodes.get(id).cloned()).collect()
    }
}

/// Joins way pieces end-to-end into closed rings, flipping pieces as needed. Returns `None` if
/// any ring can't be closed.
fn stitch_rings(mut pieces: Vec<Vec<i64>>) -> Option<Vec<Vec<i64>>> {
    pieces.retain(|piece| piece.len() >= 2);
    let mut rings = Vec::new();
    while !pieces.is_empty() {
        let mut ring = pieces.remove(0);
        while ring.first() != ring.last() {
            let end = *ring.last()?;
            let idx = pieces
                .iter()
                .position(|piece| piece[0] == end || piece[piece.len() - 1] == end)?;
            let mut next = pieces.remove(idx);
            if next[0] != end {
                next.reverse();
            }
            ring.extend(next.into_iter().skip(1));
        }
        if ring.len() < 4 {
            return None;
        }
        rings.push(ring);
    }
    Some(rings)
}

/// The area-weighted centroid of the outer rings. Holes are ignored.
fn centroid(rings: Vec<Vec<(f64, f64)>>) -> Option<(f64, f64)> {
    if rings.is_empty() {
        return None;
    }
    let polygons = rings
        .into_iter()
        .map(|ring| Polygon::new(LineString::from(ring), Vec::new()))
        .collect::<Vec<_>>();
    let pt = MultiPolygon(polygons).centroid()?;
    Some((pt.x(), pt.y()))
}

fn point_feature(osm_id: String, (x, y): (f64, f64)) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert("osm_id".to_string(), osm_id.into());
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Point(vec![x, y]))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}
