//! # cbf
//!
//! Lecture des Cartographic Boundary Files du US Census Bureau
//! (ZCTA, états, régions, nation).
//!
//! ## Features
//!
//! - Shapefile (.shp + .dbf) via le crate `shapefile` (feature `shapefile`, active par défaut)
//! - GeoJSON FeatureCollection en streaming via `geojson::FeatureReader`
//! - Types `geo` pour l'interopérabilité avec l'écosystème Rust géospatial
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::path::Path;
//!
//! let mut source = cbf::open(Path::new("data/state/cb_2014_us_state_500k.shp"))?;
//! for record in source.records() {
//!     let record = record?;
//!     println!("{:?}", record.attributes.get("NAME"));
//! }
//! ```

pub mod error;
pub mod source;
pub mod types;

pub use error::CbfError;
pub use source::{detect_format, open, GeoJsonSource, Source};
#[cfg(feature = "shapefile")]
pub use source::ShapefileSource;
pub use types::{Attributes, RawFeature, SourceFormat};
