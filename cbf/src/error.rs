//! Types d'erreurs pour le crate cbf

use thiserror::Error;

/// Erreurs pouvant survenir lors de la lecture d'un fichier de limites
#[derive(Debug, Error)]
pub enum CbfError {
    /// Erreur d'I/O lors de l'ouverture ou de la lecture
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Erreur remontée par le lecteur shapefile (.shp/.dbf)
    #[error("Shapefile error: {0}")]
    Shapefile(String),

    /// Erreur remontée par le lecteur GeoJSON
    #[error("GeoJSON error: {0}")]
    GeoJson(String),

    /// Extension de fichier non reconnue
    #[error("Unsupported source format: {0}")]
    UnsupportedFormat(String),

    /// Enregistrement sans géométrie
    #[error("Record #{index} has no geometry")]
    MissingGeometry { index: usize },

    /// Géométrie non convertible en `geo::Geometry`
    #[error("Invalid geometry for record #{index}: {reason}")]
    InvalidGeometry { index: usize, reason: String },
}

impl CbfError {
    /// Crée une erreur de géométrie invalide
    pub fn invalid_geometry(index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            index,
            reason: reason.into(),
        }
    }
}

impl From<geojson::Error> for CbfError {
    fn from(err: geojson::Error) -> Self {
        Self::GeoJson(err.to_string())
    }
}

#[cfg(feature = "shapefile")]
impl From<shapefile::Error> for CbfError {
    fn from(err: shapefile::Error) -> Self {
        Self::Shapefile(err.to_string())
    }
}
