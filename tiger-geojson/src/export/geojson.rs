//! Écriture d'une feature en GeoJSON compact

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use geojson::feature::Id;

use crate::config::AreaType;
use crate::error::ConvertError;
use crate::transform::TransformedFeature;

/// Convertit une feature transformée en `geojson::Feature`
pub fn to_geojson(feature: &TransformedFeature) -> geojson::Feature {
    geojson::Feature {
        bbox: None,
        geometry: Some(geojson::Geometry::new(geojson::Value::from(
            &feature.geometry,
        ))),
        id: Some(Id::String(feature.id.clone())),
        properties: Some(feature.attributes.clone()),
        foreign_members: None,
    }
}

/// Écrit une feature (sans indentation); un fichier existant est écrasé
pub fn write_feature(
    area_type: AreaType,
    feature: &TransformedFeature,
    output_path: &Path,
) -> Result<(), ConvertError> {
    let file = File::create(output_path).map_err(|e| ConvertError::file_system(output_path, e))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer(&mut writer, &to_geojson(feature)).map_err(|source| {
        ConvertError::Serialization {
            area_type,
            id: feature.id.clone(),
            source,
        }
    })?;

    writer
        .flush()
        .map_err(|e| ConvertError::file_system(output_path, e))
}
