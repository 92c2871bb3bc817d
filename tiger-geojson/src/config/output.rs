//! Répertoires de sortie et outil de conversion TopoJSON

use std::path::{Path, PathBuf};

/// Extension des fichiers GeoJSON produits
pub const GEOJSON_EXT: &str = "geojson";

/// Extension des fichiers TopoJSON produits
pub const TOPOJSON_EXT: &str = "topojson";

/// Configuration des sorties
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Racine des fichiers GeoJSON (`<root>/<area_type>/...`)
    pub geojson_root: PathBuf,

    /// Racine des fichiers TopoJSON
    pub topojson_root: PathBuf,

    /// Exécutable `topojson` (CLI node)
    pub topojson_bin: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            geojson_root: PathBuf::from("geojson"),
            topojson_root: PathBuf::from("topojson"),
            topojson_bin: "topojson".into(),
        }
    }
}

impl OutputConfig {
    /// Charge la configuration depuis les variables d'environnement
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            geojson_root: std::env::var_os("TIGER_GEOJSON_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.geojson_root),
            topojson_root: std::env::var_os("TIGER_TOPOJSON_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.topojson_root),
            topojson_bin: std::env::var("TOPOJSON_BIN").unwrap_or(defaults.topojson_bin),
        }
    }

    /// Configuration avec les deux racines sous un même répertoire
    pub fn under(base: &Path) -> Self {
        Self {
            geojson_root: base.join("geojson"),
            topojson_root: base.join("topojson"),
            ..Self::default()
        }
    }
}
