use std::io::Read;

use geo::{Geometry, MultiPolygon};
use geojson::{Feature, FeatureCollection, GeoJson};

use crate::refmap::{
    io_common::{open_source, simplify_file_name},
    *,
};

const CODE_PROPERTY: &str = "code";
const NAME_PROPERTY: &str = "nom";

fn property_string(feature: &Feature, name: &str) -> Option<String> {
    match feature.property(name)? {
        JSValue::String(s) => Some(s.trim().to_string()),
        JSValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn read_feature(
    path: &str,
    idx: usize,
    feature: Feature,
) -> MapResult<RegionGeometry<MultiPolygon<f64>>> {
    let region_name =
        property_string(&feature, NAME_PROPERTY).context(MalformedGeometrySnafu {
            path,
            message: format!("feature {} has no {:?} property", idx, NAME_PROPERTY),
        })?;
    let region_code = property_string(&feature, CODE_PROPERTY).unwrap_or_default();
    let value = feature.geometry.map(|g| g.value).context(MalformedGeometrySnafu {
        path,
        message: format!("region {:?} has no geometry", region_name),
    })?;
    let geometry = Geometry::<f64>::try_from(value).context(ParsingGeoJsonSnafu { path })?;
    let polygon = match geometry {
        Geometry::Polygon(p) => MultiPolygon(vec![p]),
        Geometry::MultiPolygon(mp) => mp,
        other => {
            return MalformedGeometrySnafu {
                path,
                message: format!("region {:?} is not a surface: {:?}", region_name, other),
            }
            .fail()
        }
    };
    debug!(
        "read_feature: {} {:?}: {} polygons",
        region_code,
        region_name,
        polygon.0.len()
    );
    Ok(RegionGeometry {
        region_code,
        region_name,
        polygon,
    })
}

/// Reads the outline of the regions from a GeoJSON feature collection.
///
/// Each feature needs a `nom` property (the display name of the region) and a
/// polygon or multipolygon geometry.
pub fn read_region_geometries(path: &str) -> MapResult<Vec<RegionGeometry<MultiPolygon<f64>>>> {
    let contents = {
        let mut file = open_source(path)?;
        let mut s = String::new();
        file.read_to_string(&mut s)
            .context(ReadingSourceSnafu { path })?;
        s
    };
    let gj: GeoJson = contents
        .parse::<GeoJson>()
        .context(ParsingGeoJsonSnafu { path })?;
    let collection = FeatureCollection::try_from(gj).context(ParsingGeoJsonSnafu { path })?;

    let res = collection
        .features
        .into_iter()
        .enumerate()
        .map(|(idx, f)| read_feature(path, idx, f))
        .collect::<MapResult<Vec<_>>>()?;
    info!(
        "Read {} region outlines from {}",
        res.len(),
        simplify_file_name(path)
    );
    Ok(res)
}
