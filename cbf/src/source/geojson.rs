//! Lecture streaming d'une FeatureCollection GeoJSON

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use geo::Geometry;
use geojson::FeatureReader;

use crate::types::{Attributes, RawFeature};
use crate::CbfError;

type FeatureIter = Box<dyn Iterator<Item = Result<geojson::Feature, geojson::Error>>>;

/// Source d'enregistrements depuis un fichier GeoJSON
pub struct GeoJsonSource {
    features: Option<FeatureIter>,
}

impl GeoJsonSource {
    /// Ouvre un fichier GeoJSON (lecture en streaming, feature par feature)
    pub fn open(path: &Path) -> Result<Self, CbfError> {
        let file = File::open(path)?;
        Ok(Self::from_reader(BufReader::new(file)))
    }

    /// Construit une source depuis n'importe quel lecteur
    pub fn from_reader<R: Read + 'static>(reader: R) -> Self {
        let features = FeatureReader::from_reader(reader).features();
        Self {
            features: Some(Box::new(features)),
        }
    }

    /// Itère sur les enregistrements. Un seul passage possible.
    pub fn records(&mut self) -> Box<dyn Iterator<Item = Result<RawFeature, CbfError>> + '_> {
        match self.features.take() {
            Some(features) => Box::new(
                features
                    .enumerate()
                    .map(|(index, feature)| convert_feature(index, feature?)),
            ),
            None => Box::new(std::iter::empty()),
        }
    }
}

/// Convertit une feature GeoJSON en `RawFeature`
fn convert_feature(index: usize, feature: geojson::Feature) -> Result<RawFeature, CbfError> {
    let geometry = feature
        .geometry
        .ok_or(CbfError::MissingGeometry { index })?;

    let geometry = Geometry::<f64>::try_from(geometry)
        .map_err(|e| CbfError::invalid_geometry(index, e.to_string()))?;

    let attributes: Attributes = feature.properties.unwrap_or_default();

    Ok(RawFeature::new(geometry, attributes))
}
