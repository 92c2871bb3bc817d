//! Types de données pour le crate cbf

use geo::Geometry;

/// Table d'attributs d'un enregistrement (nom de champ -> valeur JSON)
pub type Attributes = serde_json::Map<String, serde_json::Value>;

/// Un enregistrement brut lu depuis le fichier source
#[derive(Debug, Clone, PartialEq)]
pub struct RawFeature {
    /// Géométrie (Polygon ou MultiPolygon pour les fichiers de limites)
    pub geometry: Geometry,

    /// Attributs tels que lus dans la source
    pub attributes: Attributes,
}

impl RawFeature {
    pub fn new(geometry: Geometry, attributes: Attributes) -> Self {
        Self {
            geometry,
            attributes,
        }
    }
}

/// Format du fichier source, déduit de son extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// ESRI shapefile (.shp + .dbf)
    Shapefile,
    /// GeoJSON FeatureCollection
    GeoJson,
}
