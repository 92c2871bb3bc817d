//! Lecture d'un shapefile (.shp + .dbf) des Cartographic Boundary Files

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use geo::Geometry;
use serde_json::{Number, Value};
use shapefile::dbase::{FieldValue, Record};
use shapefile::{Reader, Shape};

use crate::types::{Attributes, RawFeature};
use crate::CbfError;

/// Source d'enregistrements depuis un shapefile
pub struct ShapefileSource {
    reader: Reader<BufReader<File>, BufReader<File>>,
    consumed: bool,
}

impl ShapefileSource {
    /// Ouvre un shapefile; le .dbf voisin est ouvert automatiquement
    pub fn open(path: &Path) -> Result<Self, CbfError> {
        let reader = Reader::from_path(path)?;
        Ok(Self {
            reader,
            consumed: false,
        })
    }

    /// Itère sur les enregistrements. Un seul passage possible.
    pub fn records(&mut self) -> Box<dyn Iterator<Item = Result<RawFeature, CbfError>> + '_> {
        if self.consumed {
            return Box::new(std::iter::empty());
        }
        self.consumed = true;

        Box::new(
            self.reader
                .iter_shapes_and_records()
                .enumerate()
                .map(|(index, item)| {
                    let (shape, record) = item?;
                    convert_record(index, shape, record)
                }),
        )
    }
}

fn convert_record(index: usize, shape: Shape, record: Record) -> Result<RawFeature, CbfError> {
    let geometry = Geometry::<f64>::try_from(shape)
        .map_err(|e| CbfError::invalid_geometry(index, e.to_string()))?;

    let fields: HashMap<String, FieldValue> = record.into();
    let attributes: Attributes = fields
        .into_iter()
        .map(|(name, value)| (name, field_value_to_json(value)))
        .collect();

    Ok(RawFeature::new(geometry, attributes))
}

/// Convertit une valeur dBase en valeur JSON
///
/// Les champs numériques vides (ou non finis) deviennent `null`.
pub fn field_value_to_json(value: FieldValue) -> Value {
    match value {
        FieldValue::Character(Some(s)) => Value::String(s),
        FieldValue::Memo(s) => Value::String(s),
        FieldValue::Numeric(Some(n)) => number(n),
        FieldValue::Double(n) => number(n),
        FieldValue::Currency(n) => number(n),
        FieldValue::Float(Some(n)) => number(f64::from(n)),
        FieldValue::Integer(n) => Value::from(n),
        FieldValue::Logical(Some(b)) => Value::Bool(b),
        FieldValue::Date(Some(d)) => {
            Value::String(format!("{:04}-{:02}-{:02}", d.year(), d.month(), d.day()))
        }
        FieldValue::Character(None)
        | FieldValue::Numeric(None)
        | FieldValue::Float(None)
        | FieldValue::Logical(None)
        | FieldValue::Date(None) => Value::Null,
        other => Value::String(format!("{:?}", other)),
    }
}

/// Les entiers restent des entiers en sortie (ALAND, AWATER... déclarés N(14,0)).
///
/// La précision déclarée du champ n'est pas visible ici: une valeur entière
/// d'un champ à décimales sort aussi en entier.
fn number(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 9.0e15 {
        return Value::from(n as i64);
    }
    Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
}
