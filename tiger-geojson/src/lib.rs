//! # tiger-geojson
//!
//! Conversion des Cartographic Boundary Files du US Census Bureau (ZCTA,
//! états, régions, nation) en fichiers GeoJSON simplifiés, un fichier par
//! feature, avec conversion TopoJSON optionnelle.
//!
//! ## Features
//!
//! - Réduction des attributs et identifiant par type de zone (registre JSON embarqué)
//! - Simplification avec préservation de topologie (tolérance fixe 0.0003°)
//! - Chemins de sortie déterministes (`geojson/zipcode/95/95832.geojson`)
//! - Pool de workers rayon avec file bornée
//!
//! ## Usage CLI
//!
//! ```bash
//! # Un fichier GeoJSON par état
//! tiger-geojson state
//!
//! # ZCTA en parallèle, avec TopoJSON
//! tiger-geojson zipcode -m --topo
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod report;
pub mod simplify;
pub mod transform;

pub use config::{AreaType, AreaTypeConfig, OutputConfig, Registry};
pub use error::ConvertError;
pub use export::{OutputTarget, OutputWriter};
pub use pipeline::{run, RunOptions};
pub use report::{RunReport, RunStatus};
pub use transform::{TransformedFeature, Transformer, SIMPLIFY_TOLERANCE};
