//! Erreurs de conversion

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::AreaType;

/// Erreurs pouvant survenir pendant la conversion d'un enregistrement ou d'un lot
///
/// Les variantes par enregistrement portent le type de zone et, dès qu'il est
/// connu, l'identifiant de la feature.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Type de zone inconnu (vérifié avant toute écriture)
    #[error("Invalid area type: {0}. Valid values are zipcode, state, region, nation")]
    InvalidAreaType(String),

    /// Champ identifiant absent de l'enregistrement
    #[error("[{area_type}] missing identifier field {field}")]
    MissingIdentifierField { area_type: AreaType, field: String },

    /// Identifiant inutilisable comme nom de fichier
    #[error("[{area_type}] invalid identifier in {field}: {reason}")]
    InvalidIdentifier {
        area_type: AreaType,
        field: String,
        reason: String,
    },

    /// Échec de la simplification
    #[error("[{area_type}:{id}] geometry simplification failed: {reason}")]
    GeometrySimplification {
        area_type: AreaType,
        id: String,
        reason: String,
    },

    /// Création de répertoire ou écriture de fichier en échec
    #[error("I/O error on {}: {source}", path.display())]
    FileSystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Sérialisation GeoJSON en échec
    #[error("[{area_type}:{id}] failed to serialize feature: {source}")]
    Serialization {
        area_type: AreaType,
        id: String,
        #[source]
        source: serde_json::Error,
    },

    /// Conversion TopoJSON en échec (lancement ou code de sortie non nul)
    #[error("[{area_type}:{id}] topojson conversion failed: {reason}")]
    CompanionTool {
        area_type: AreaType,
        id: String,
        reason: String,
    },

    /// Lecture de la source en échec
    #[error("Source error: {0}")]
    Source(#[from] cbf::CbfError),

    /// Construction du pool de workers en échec
    #[error("Worker pool error: {0}")]
    WorkerPool(String),

    /// Configuration des zones invalide
    #[error("Invalid area configuration: {0}")]
    Config(String),
}

impl ConvertError {
    /// Crée une erreur d'I/O avec le chemin concerné
    pub fn file_system(path: &Path, source: std::io::Error) -> Self {
        Self::FileSystem {
            path: path.to_path_buf(),
            source,
        }
    }
}
