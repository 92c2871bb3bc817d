//! Sources d'enregistrements (shapefile, GeoJSON)

pub mod geojson;
#[cfg(feature = "shapefile")]
pub mod shp;

use std::path::Path;

use tracing::debug;

use crate::types::{RawFeature, SourceFormat};
use crate::CbfError;

pub use self::geojson::GeoJsonSource;
#[cfg(feature = "shapefile")]
pub use self::shp::ShapefileSource;

/// Source ouverte, quel que soit son format
pub enum Source {
    #[cfg(feature = "shapefile")]
    Shapefile(ShapefileSource),
    GeoJson(GeoJsonSource),
}

impl Source {
    /// Itère sur les enregistrements dans l'ordre du fichier
    pub fn records(&mut self) -> Box<dyn Iterator<Item = Result<RawFeature, CbfError>> + '_> {
        match self {
            #[cfg(feature = "shapefile")]
            Source::Shapefile(src) => src.records(),
            Source::GeoJson(src) => src.records(),
        }
    }

    pub fn format(&self) -> SourceFormat {
        match self {
            #[cfg(feature = "shapefile")]
            Source::Shapefile(_) => SourceFormat::Shapefile,
            Source::GeoJson(_) => SourceFormat::GeoJson,
        }
    }
}

/// Détecte le format d'après l'extension du fichier
pub fn detect_format(path: &Path) -> Result<SourceFormat, CbfError> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase());

    match ext.as_deref() {
        Some("shp") => Ok(SourceFormat::Shapefile),
        Some("geojson") | Some("json") => Ok(SourceFormat::GeoJson),
        _ => Err(CbfError::UnsupportedFormat(path.display().to_string())),
    }
}

/// Ouvre un fichier source
pub fn open(path: &Path) -> Result<Source, CbfError> {
    let format = detect_format(path)?;
    debug!(path = %path.display(), format = ?format, "Opening source");

    match format {
        #[cfg(feature = "shapefile")]
        SourceFormat::Shapefile => Ok(Source::Shapefile(ShapefileSource::open(path)?)),
        #[cfg(not(feature = "shapefile"))]
        SourceFormat::Shapefile => Err(CbfError::UnsupportedFormat(format!(
            "{} (built without the `shapefile` feature)",
            path.display()
        ))),
        SourceFormat::GeoJson => Ok(Source::GeoJson(GeoJsonSource::open(path)?)),
    }
}
