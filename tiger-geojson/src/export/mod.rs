//! Écriture des sorties (GeoJSON, TopoJSON)

pub mod geojson;
pub mod topojson;

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::output::{GEOJSON_EXT, TOPOJSON_EXT};
use crate::config::{AreaType, OutputConfig};
use crate::error::ConvertError;
use crate::transform::TransformedFeature;

pub use self::topojson::TopojsonCommand;

/// Chemins de sortie d'une feature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    /// Nom relatif sans extension (`95/95832`, `AK`)
    pub filename: String,
    pub primary_path: PathBuf,
    pub companion_path: Option<PathBuf>,
}

impl OutputTarget {
    /// Calcule les chemins à partir du type de zone et de l'identifiant
    pub fn derive(
        config: &OutputConfig,
        area_type: AreaType,
        id: &str,
        emit_companion: bool,
    ) -> Self {
        let filename = filename(area_type, id);
        let primary_path = output_path(&config.geojson_root, area_type, &filename, GEOJSON_EXT);
        let companion_path = emit_companion
            .then(|| output_path(&config.topojson_root, area_type, &filename, TOPOJSON_EXT));

        Self {
            filename,
            primary_path,
            companion_path,
        }
    }
}

/// Nom de fichier relatif: les ZCTA sont rangées par leurs deux premiers caractères
pub fn filename(area_type: AreaType, id: &str) -> String {
    match area_type {
        AreaType::Zipcode => {
            let prefix: String = id.chars().take(2).collect();
            format!("{}/{}", prefix, id)
        }
        AreaType::State | AreaType::Region | AreaType::Nation => id.to_string(),
    }
}

fn output_path(root: &Path, area_type: AreaType, filename: &str, ext: &str) -> PathBuf {
    root.join(area_type.as_str())
        .join(format!("{}.{}", filename, ext))
}

/// Résultat de `ensure_dir`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirStatus {
    Created,
    Existing,
}

/// Crée un répertoire et ses parents manquants.
///
/// Tolère les créations concurrentes: un répertoire créé entre-temps par un
/// autre worker est rapporté `Existing`, pas comme une erreur.
pub fn ensure_dir(path: &Path) -> Result<DirStatus, ConvertError> {
    if path.as_os_str().is_empty() || path.is_dir() {
        return Ok(DirStatus::Existing);
    }

    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }

    match std::fs::create_dir(path) {
        Ok(()) => Ok(DirStatus::Created),
        Err(e) if e.kind() == ErrorKind::AlreadyExists && path.is_dir() => Ok(DirStatus::Existing),
        Err(e) => Err(ConvertError::file_system(path, e)),
    }
}

fn ensure_parent(path: &Path) -> Result<(), ConvertError> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    Ok(())
}

/// Écrit les features transformées sur disque
#[derive(Debug, Clone)]
pub struct OutputWriter {
    config: OutputConfig,
    topojson: TopojsonCommand,
}

impl OutputWriter {
    pub fn new(config: OutputConfig) -> Self {
        let topojson = TopojsonCommand::new(config.topojson_bin.clone());
        Self { config, topojson }
    }

    /// Écrit le GeoJSON puis, si demandé, le TopoJSON
    pub fn write(
        &self,
        area_type: AreaType,
        feature: &TransformedFeature,
        emit_companion: bool,
    ) -> Result<OutputTarget, ConvertError> {
        let target = OutputTarget::derive(&self.config, area_type, &feature.id, emit_companion);

        ensure_parent(&target.primary_path)?;
        geojson::write_feature(area_type, feature, &target.primary_path)?;

        if let Some(ref companion_path) = target.companion_path {
            ensure_parent(companion_path)?;
            self.topojson
                .run(&target.primary_path, companion_path)
                .map_err(|reason| ConvertError::CompanionTool {
                    area_type,
                    id: feature.id.clone(),
                    reason,
                })?;
        }

        info!(
            filename = %target.filename,
            pid = std::process::id(),
            worker = ?rayon::current_thread_index(),
            "done"
        );

        Ok(target)
    }
}
