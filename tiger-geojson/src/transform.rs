//! Transformation d'un enregistrement brut: identifiant, attributs, simplification

use geo::{CoordsIter, Geometry, MultiPolygon};
use serde_json::Value;
use tracing::debug;

use cbf::{Attributes, RawFeature};

use crate::config::{AreaType, AreaTypeConfig, Registry};
use crate::error::ConvertError;
use crate::simplify::{simplify_polygon, simplify_polygons};

/// Tolérance de simplification, en unités natives (degrés non projetés).
///
/// Seul réglage numérique du traitement: la préservation de topologie est
/// toujours active et la tolérance n'est pas paramétrable par appel.
pub const SIMPLIFY_TOLERANCE: f64 = 0.0003;

/// Feature prête à être écrite
#[derive(Debug, Clone, PartialEq)]
pub struct TransformedFeature {
    /// Valeur d'origine du champ identifiant
    pub id: String,

    /// Géométrie simplifiée
    pub geometry: Geometry,

    /// Attributs sans les champs supprimés
    pub attributes: Attributes,
}

/// Transforme les enregistrements bruts selon le registre des zones
#[derive(Debug, Clone, Copy)]
pub struct Transformer<'a> {
    registry: &'a Registry,
}

impl<'a> Transformer<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    /// Réduit les attributs, extrait l'identifiant et simplifie la géométrie
    pub fn transform(
        &self,
        area_type: AreaType,
        raw: &RawFeature,
    ) -> Result<TransformedFeature, ConvertError> {
        let config = self.registry.get(area_type);

        let id = extract_id(config, &raw.attributes)?;
        let attributes = reduce_attributes(&raw.attributes, &config.drop_fields);

        let geometry = simplify(&raw.geometry).map_err(|reason| {
            ConvertError::GeometrySimplification {
                area_type,
                id: id.clone(),
                reason,
            }
        })?;

        debug!(
            area_type = %area_type,
            id = %id,
            vertices_in = raw.geometry.coords_count(),
            vertices_out = geometry.coords_count(),
            "Feature transformed"
        );

        Ok(TransformedFeature {
            id,
            geometry,
            attributes,
        })
    }
}

/// Extrait l'identifiant depuis `attributes[id_field]`
fn extract_id(config: &AreaTypeConfig, attributes: &Attributes) -> Result<String, ConvertError> {
    let invalid = |reason: &str| ConvertError::InvalidIdentifier {
        area_type: config.area_type,
        field: config.id_field.clone(),
        reason: reason.to_string(),
    };

    let value = attributes
        .get(&config.id_field)
        .filter(|v| !v.is_null())
        .ok_or_else(|| ConvertError::MissingIdentifierField {
            area_type: config.area_type,
            field: config.id_field.clone(),
        })?;

    let id = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return Err(invalid("not a scalar value")),
    };

    // L'identifiant devient un nom de fichier
    if id.is_empty() {
        return Err(invalid("empty value"));
    }
    if id == "." || id == ".." || id.contains(['/', '\\']) {
        return Err(invalid(&format!("{:?} is not a valid file name", id)));
    }

    Ok(id)
}

/// Copie des attributs sans les champs listés; un champ absent est ignoré
fn reduce_attributes(attributes: &Attributes, drop_fields: &[String]) -> Attributes {
    let mut reduced = attributes.clone();
    for field in drop_fields {
        reduced.remove(field);
    }
    reduced
}

/// Simplifie un Polygon/MultiPolygon à `SIMPLIFY_TOLERANCE` en préservant la topologie.
///
/// Douglas-Peucker en distance: un sommet à moins de la tolérance du segment
/// qui le remplace disparaît, sauf si ce segment croisait un autre anneau.
pub fn simplify(geometry: &Geometry) -> Result<Geometry, String> {
    match geometry {
        Geometry::Polygon(p) if p.exterior().0.is_empty() => Err("empty polygon".to_string()),
        Geometry::Polygon(p) => Ok(Geometry::Polygon(simplify_polygon(p, SIMPLIFY_TOLERANCE))),
        Geometry::MultiPolygon(mp) if mp.0.is_empty() => Err("empty multipolygon".to_string()),
        Geometry::MultiPolygon(mp) => Ok(Geometry::MultiPolygon(MultiPolygon::new(
            simplify_polygons(&mp.0, SIMPLIFY_TOLERANCE),
        ))),
        other => Err(format!(
            "unsupported geometry type {}",
            geometry_type_name(other)
        )),
    }
}

fn geometry_type_name(geometry: &Geometry) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, Coord, LineString, MultiPolygon, Point, Polygon};
    use serde_json::json;
    use std::collections::BTreeSet;

    fn attrs(value: Value) -> Attributes {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    fn square() -> Geometry {
        Geometry::Polygon(polygon![
            (x: -150.0, y: 60.0),
            (x: -140.0, y: 60.0),
            (x: -140.0, y: 70.0),
            (x: -150.0, y: 70.0),
            (x: -150.0, y: 60.0),
        ])
    }

    /// Cercle dense légèrement bruité (rayon ~0.01°)
    fn noisy_circle(n: usize) -> Polygon {
        let mut coords: Vec<Coord> = (0..n)
            .map(|i| {
                let angle = i as f64 * std::f64::consts::TAU / n as f64;
                let r = 0.01 + 0.00002 * ((i * 7) % 5) as f64;
                Coord {
                    x: -121.4 + r * angle.cos(),
                    y: 38.5 + r * angle.sin(),
                }
            })
            .collect();
        coords.push(coords[0]);
        Polygon::new(LineString::new(coords), vec![])
    }

    fn alaska() -> RawFeature {
        RawFeature::new(
            square(),
            attrs(json!({
                "AFFGEOID": "0400000US02",
                "GEOID": "02",
                "LSAD": "00",
                "STATEFP": "02",
                "STATENS": "01785533",
                "STUSPS": "AK",
                "NAME": "Alaska",
                "ALAND": 1477849359548u64,
                "AWATER": 245487700921u64
            })),
        )
    }

    #[test]
    fn test_transform_state() {
        let registry = Registry::builtin().unwrap();
        let transformer = Transformer::new(&registry);

        let feature = transformer.transform(AreaType::State, &alaska()).unwrap();

        assert_eq!(feature.id, "AK");
        let keys: BTreeSet<&str> = feature.attributes.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, BTreeSet::from(["ALAND", "AWATER", "NAME", "STUSPS"]));
        assert_eq!(feature.attributes["NAME"], "Alaska");
        assert_eq!(feature.attributes["ALAND"], 1477849359548u64);
    }

    #[test]
    fn test_transform_zipcode_drops_id_field() {
        let registry = Registry::builtin().unwrap();
        let transformer = Transformer::new(&registry);
        let raw = RawFeature::new(
            square(),
            attrs(json!({
                "ZCTA5CE10": "95832",
                "GEOID10": "95832",
                "AFFGEOID10": "8600000US95832",
                "ALAND10": 21414053.0,
                "AWATER10": 1511680.0
            })),
        );

        let feature = transformer.transform(AreaType::Zipcode, &raw).unwrap();

        assert_eq!(feature.id, "95832");
        assert!(!feature.attributes.contains_key("ZCTA5CE10"));
        let keys: BTreeSet<&str> = feature.attributes.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, BTreeSet::from(["ALAND10", "AWATER10"]));
    }

    #[test]
    fn test_output_keys_are_input_minus_drop_list() {
        let registry = Registry::builtin().unwrap();
        let transformer = Transformer::new(&registry);

        for area in AreaType::ALL {
            let config = registry.get(area);
            // Identifiant + un seul champ de la liste + un champ libre
            let dropped = config
                .drop_fields
                .iter()
                .find(|f| **f != config.id_field)
                .unwrap();
            let mut input = Attributes::new();
            input.insert(config.id_field.clone(), json!("X1"));
            input.insert(dropped.clone(), json!("dropped"));
            input.insert("EXTRA".to_string(), json!(1));

            let raw = RawFeature::new(square(), input.clone());
            let feature = transformer.transform(area, &raw).unwrap();

            let expected: BTreeSet<&String> = input
                .keys()
                .filter(|k| !config.drop_fields.contains(k))
                .collect();
            let actual: BTreeSet<&String> = feature.attributes.keys().collect();
            assert_eq!(actual, expected, "area type {}", area);
            assert_eq!(feature.id, "X1");
            assert_eq!(
                feature.attributes.contains_key(&config.id_field),
                !config.drop_fields.contains(&config.id_field)
            );
        }
    }

    #[test]
    fn test_absent_drop_fields_are_ignored() {
        let registry = Registry::builtin().unwrap();
        let transformer = Transformer::new(&registry);
        let raw = RawFeature::new(square(), attrs(json!({"NAME": "Northeast"})));

        let feature = transformer.transform(AreaType::Region, &raw).unwrap();
        assert_eq!(feature.id, "Northeast");
        assert_eq!(feature.attributes.len(), 1);
    }

    #[test]
    fn test_missing_identifier() {
        let registry = Registry::builtin().unwrap();
        let transformer = Transformer::new(&registry);

        let raw = RawFeature::new(square(), attrs(json!({"NAME": "Alaska"})));
        let err = transformer.transform(AreaType::State, &raw).unwrap_err();
        assert!(matches!(
            err,
            ConvertError::MissingIdentifierField { area_type: AreaType::State, ref field } if field == "STUSPS"
        ));

        let raw = RawFeature::new(square(), attrs(json!({"STUSPS": null})));
        assert!(matches!(
            transformer.transform(AreaType::State, &raw),
            Err(ConvertError::MissingIdentifierField { .. })
        ));
    }

    #[test]
    fn test_numeric_identifier() {
        let registry = Registry::builtin().unwrap();
        let transformer = Transformer::new(&registry);
        let raw = RawFeature::new(square(), attrs(json!({"GEOID": 1})));

        let feature = transformer.transform(AreaType::Nation, &raw).unwrap();
        assert_eq!(feature.id, "1");
    }

    #[test]
    fn test_invalid_identifier() {
        let registry = Registry::builtin().unwrap();
        let transformer = Transformer::new(&registry);

        for bad in [json!(""), json!("../etc"), json!(".."), json!(["A"]), json!({"a": 1})] {
            let raw = RawFeature::new(square(), attrs(json!({ "NAME": bad })));
            assert!(
                matches!(
                    transformer.transform(AreaType::Region, &raw),
                    Err(ConvertError::InvalidIdentifier { .. })
                ),
                "{:?} should be rejected",
                bad
            );
        }
    }

    /// Carré unité dont le bord bas porte un sommet décalé de `offset`
    fn bent_square(offset: f64) -> Geometry {
        Geometry::Polygon(polygon![
            (x: 0.0, y: 0.0),
            (x: 0.5, y: offset),
            (x: 1.0, y: 0.0),
            (x: 1.0, y: 1.0),
            (x: 0.0, y: 1.0),
            (x: 0.0, y: 0.0),
        ])
    }

    fn exterior_len(geometry: &Geometry) -> usize {
        match geometry {
            Geometry::Polygon(p) => p.exterior().0.len(),
            other => panic!("expected a polygon, got {:?}", other),
        }
    }

    #[test]
    fn test_simplify_removes_vertex_within_tolerance() {
        let simplified = simplify(&bent_square(0.0002)).unwrap();

        assert_eq!(exterior_len(&simplified), 5);
        let Geometry::Polygon(p) = simplified else {
            unreachable!()
        };
        assert!(!p.exterior().0.contains(&Coord { x: 0.5, y: 0.0002 }));
        assert!(p.exterior().is_closed());
    }

    #[test]
    fn test_simplify_keeps_vertex_beyond_tolerance() {
        let simplified = simplify(&bent_square(0.0004)).unwrap();
        assert_eq!(exterior_len(&simplified), 6);
        assert_eq!(simplified, bent_square(0.0004));
    }

    #[test]
    fn test_simplify_zcta_sized_ring() {
        // Côtés de 0.02°, ondulations de 0.0001° et une avancée de 0.001°
        let (x0, y0) = (-121.42, 38.48);
        let ring = polygon![
            (x: x0, y: y0),
            (x: x0 + 0.01, y: y0 - 0.0001),
            (x: x0 + 0.02, y: y0),
            (x: x0 + 0.0201, y: y0 + 0.01),
            (x: x0 + 0.02, y: y0 + 0.02),
            (x: x0 + 0.01, y: y0 + 0.021),
            (x: x0, y: y0 + 0.02),
            (x: x0 - 0.0001, y: y0 + 0.01),
            (x: x0, y: y0),
        ];

        let Geometry::Polygon(p) = simplify(&Geometry::Polygon(ring)).unwrap() else {
            panic!("expected a polygon");
        };

        let expected = vec![
            Coord { x: x0, y: y0 },
            Coord { x: x0 + 0.02, y: y0 },
            Coord { x: x0 + 0.02, y: y0 + 0.02 },
            Coord { x: x0 + 0.01, y: y0 + 0.021 },
            Coord { x: x0, y: y0 + 0.02 },
            Coord { x: x0, y: y0 },
        ];
        assert_eq!(p.exterior().0, expected);
    }

    #[test]
    fn test_simplify_keeps_significant_vertices() {
        let geometry = square();
        assert_eq!(simplify(&geometry).unwrap(), geometry);
    }

    #[test]
    fn test_simplify_is_idempotent() {
        let circle = Geometry::Polygon(noisy_circle(2000));

        let once = simplify(&circle).unwrap();
        let twice = simplify(&once).unwrap();

        assert!(once.coords_count() < circle.coords_count());
        assert_eq!(once.coords_count(), twice.coords_count());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_simplify_multipolygon() {
        let mut far = noisy_circle(500);
        far.exterior_mut(|ring| {
            for c in ring.0.iter_mut() {
                c.x += 1.0;
            }
        });
        let multi = Geometry::MultiPolygon(MultiPolygon::new(vec![noisy_circle(500), far]));

        let Geometry::MultiPolygon(out) = simplify(&multi).unwrap() else {
            panic!("expected a multipolygon");
        };
        assert_eq!(out.0.len(), 2);
        assert!(out.0.iter().all(|p| p.exterior().0.len() < 500));
    }

    #[test]
    fn test_simplify_unsupported_geometry() {
        let registry = Registry::builtin().unwrap();
        let transformer = Transformer::new(&registry);
        let raw = RawFeature::new(
            Geometry::Point(Point::new(-71.4, 41.8)),
            attrs(json!({"STUSPS": "RI"})),
        );

        let err = transformer.transform(AreaType::State, &raw).unwrap_err();
        match err {
            ConvertError::GeometrySimplification { id, reason, .. } => {
                assert_eq!(id, "RI");
                assert!(reason.contains("Point"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_simplify_empty_geometry() {
        assert!(simplify(&Geometry::MultiPolygon(MultiPolygon::new(vec![]))).is_err());
    }
}
