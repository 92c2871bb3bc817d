//! Configuration des types de zones
//!
//! Pour chaque type de zone: le champ utilisé comme identifiant, les champs
//! supprimés de la sortie et le nom du fichier Census par défaut.

pub mod output;

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConvertError;

pub use output::OutputConfig;

/// Type de zone traité
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AreaType {
    Zipcode,
    State,
    Region,
    Nation,
}

impl AreaType {
    pub const ALL: [AreaType; 4] = [
        AreaType::Zipcode,
        AreaType::State,
        AreaType::Region,
        AreaType::Nation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AreaType::Zipcode => "zipcode",
            AreaType::State => "state",
            AreaType::Region => "region",
            AreaType::Nation => "nation",
        }
    }

    /// Liste des valeurs acceptées, pour les messages d'erreur
    pub fn valid_values() -> String {
        Self::ALL
            .iter()
            .map(|a| a.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for AreaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AreaType {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "zipcode" => Ok(AreaType::Zipcode),
            "state" => Ok(AreaType::State),
            "region" => Ok(AreaType::Region),
            "nation" => Ok(AreaType::Nation),
            _ => Err(ConvertError::InvalidAreaType(s.to_string())),
        }
    }
}

/// Configuration d'un type de zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaTypeConfig {
    pub area_type: AreaType,

    /// Champ dont la valeur devient l'identifiant de la feature
    pub id_field: String,

    /// Champs supprimés des propriétés (absents = ignorés)
    pub drop_fields: Vec<String>,

    /// Nom du fichier Census attendu dans `<data>/<area_type>/`
    pub source_file: String,
}

/// Entrée du fichier JSON de configuration
#[derive(Debug, Deserialize, Serialize)]
struct AreaEntry {
    id_field: String,

    #[serde(default)]
    drop_fields: Vec<String>,

    #[serde(default)]
    source_file: String,
}

/// Registre des types de zones, construit une fois au démarrage
#[derive(Debug, Clone)]
pub struct Registry {
    areas: HashMap<AreaType, AreaTypeConfig>,
}

impl Registry {
    /// Registre embarqué (Cartographic Boundary Files 2014)
    pub fn builtin() -> Result<Self, ConvertError> {
        Self::from_json(include_str!("presets/census2014.json"))
    }

    /// Charge un registre depuis un fichier JSON
    pub fn load(path: &Path) -> Result<Self, ConvertError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConvertError::file_system(path, e))?;
        Self::from_json(&content)
    }

    /// Parse un registre JSON; les quatre types de zones doivent être présents
    pub fn from_json(json: &str) -> Result<Self, ConvertError> {
        let entries: HashMap<String, AreaEntry> = serde_json::from_str(json)
            .map_err(|e| ConvertError::Config(format!("failed to parse JSON: {}", e)))?;

        let mut areas = HashMap::with_capacity(entries.len());
        for (name, entry) in entries {
            let area_type: AreaType = name.parse()?;
            if entry.id_field.is_empty() {
                return Err(ConvertError::Config(format!(
                    "{}: id_field must not be empty",
                    area_type
                )));
            }
            areas.insert(
                area_type,
                AreaTypeConfig {
                    area_type,
                    id_field: entry.id_field,
                    drop_fields: entry.drop_fields,
                    source_file: entry.source_file,
                },
            );
        }

        if let Some(missing) = AreaType::ALL.iter().find(|a| !areas.contains_key(a)) {
            return Err(ConvertError::Config(format!(
                "missing configuration for area type {}",
                missing
            )));
        }

        Ok(Self { areas })
    }

    /// Recherche par nom; échoue pour tout nom hors des quatre types connus
    pub fn lookup(&self, area_type: &str) -> Result<&AreaTypeConfig, ConvertError> {
        let area_type: AreaType = area_type.parse()?;
        Ok(self.get(area_type))
    }

    /// Configuration d'un type de zone (toujours présente après chargement)
    pub fn get(&self, area_type: AreaType) -> &AreaTypeConfig {
        &self.areas[&area_type]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry() {
        let registry = Registry::builtin().unwrap();

        let state = registry.get(AreaType::State);
        assert_eq!(state.id_field, "STUSPS");
        assert_eq!(
            state.drop_fields,
            vec!["AFFGEOID", "GEOID", "LSAD", "STATEFP", "STATENS"]
        );
        assert_eq!(state.source_file, "cb_2014_us_state_500k.shp");

        assert_eq!(registry.get(AreaType::Zipcode).id_field, "ZCTA5CE10");
        assert_eq!(registry.get(AreaType::Region).id_field, "NAME");
        assert_eq!(registry.get(AreaType::Nation).id_field, "GEOID");
        assert_eq!(
            registry.get(AreaType::Nation).source_file,
            "cb_2014_us_nation_5m.shp"
        );
    }

    #[test]
    fn test_lookup() {
        let registry = Registry::builtin().unwrap();
        assert_eq!(
            registry.lookup("region").unwrap().area_type,
            AreaType::Region
        );
        assert!(matches!(
            registry.lookup("county"),
            Err(ConvertError::InvalidAreaType(name)) if name == "county"
        ));
        // Sensible à la casse, comme la CLI
        assert!(registry.lookup("State").is_err());
        assert!(registry.lookup("").is_err());
    }

    #[test]
    fn test_area_type_roundtrip_names() {
        for area in AreaType::ALL {
            assert_eq!(area.as_str().parse::<AreaType>().unwrap(), area);
            assert_eq!(area.to_string(), area.as_str());
        }
        assert_eq!(AreaType::valid_values(), "zipcode, state, region, nation");
    }

    #[test]
    fn test_from_json_missing_area() {
        let json = r#"{"state": {"id_field": "STUSPS"}}"#;
        let err = Registry::from_json(json).unwrap_err();
        assert!(matches!(err, ConvertError::Config(_)));
    }

    #[test]
    fn test_from_json_unknown_area() {
        let json = r#"{
            "zipcode": {"id_field": "ZCTA5CE10"},
            "state": {"id_field": "STUSPS"},
            "region": {"id_field": "NAME"},
            "nation": {"id_field": "GEOID"},
            "county": {"id_field": "GEOID"}
        }"#;
        assert!(matches!(
            Registry::from_json(json),
            Err(ConvertError::InvalidAreaType(_))
        ));
    }

    #[test]
    fn test_from_json_defaults() {
        let json = r#"{
            "zipcode": {"id_field": "GEOID10"},
            "state": {"id_field": "STUSPS"},
            "region": {"id_field": "NAME"},
            "nation": {"id_field": "GEOID"}
        }"#;
        let registry = Registry::from_json(json).unwrap();
        assert!(registry.get(AreaType::Zipcode).drop_fields.is_empty());
        assert_eq!(registry.get(AreaType::Zipcode).source_file, "");
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("tiger-registry-{}.json", std::process::id()));
        std::fs::write(&path, include_str!("presets/census2014.json")).unwrap();

        let registry = Registry::load(&path).unwrap();
        assert_eq!(registry.get(AreaType::State).id_field, "STUSPS");

        std::fs::remove_file(path).ok();
    }
}
