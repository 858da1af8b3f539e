//! # Serialization
//!
//! Depth-bounded conversion of DTO graphs into plain [`Attributes`] and JSON.
//!
//! The depth budget drops by one per DTO level, never per list level, so a DTO
//! inside a list inside a DTO costs one level. At depth zero a DTO serializes
//! to an empty map, which cuts cycles and runaway nesting.
//!
//! ```text
//! ProductDto.to_array(3)
//! └── features: [ProductFeatureDto.to_array(2)]
//!     └── subFeatures: [ProductFeatureDto.to_array(1)]
//!         └── subFeatures: {}                       <- depth 0
//! ```

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::dto::Dto;
use super::error::DtoError;
use super::value::{Attributes, Value};

/// Encoder options for [`Dto::to_json`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonOptions {
    /// Indented output.
    pub pretty: bool,
}

impl JsonOptions {
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

/// Field map of `dto`, skipping write-once slots that were never filled.
pub fn to_array<D: Dto>(dto: &D, depth: i32) -> Attributes {
    if depth <= 0 {
        return Attributes::new();
    }
    D::schema()
        .fields()
        .filter_map(|field| {
            let value = field.read(dto)?;
            Some((field.name().to_string(), cast_output_value(value, depth - 1)))
        })
        .collect()
}

/// Converts nested DTOs to maps and sequences to lists. Other objects and
/// scalars are returned as they are.
pub fn cast_output_value(value: Value, depth: i32) -> Value {
    match value {
        Value::Model(model) => match model.to_output(depth) {
            Some(fields) => Value::Map(fields),
            None => Value::Model(model),
        },
        Value::List(items) | Value::Collection(items) => Value::List(
            items
                .into_iter()
                .map(|item| cast_output_value(item, depth))
                .collect(),
        ),
        Value::Map(map) => Value::Map(
            map.into_iter()
                .map(|(key, item)| (key, cast_output_value(item, depth)))
                .collect(),
        ),
        other => other,
    }
}

/// Encodes a field map as JSON.
pub fn to_json(fields: &Attributes, options: JsonOptions) -> Result<String, DtoError> {
    let encoded = if options.pretty {
        serde_json::to_string_pretty(fields)
    } else {
        serde_json::to_string(fields)
    };
    encoded.map_err(|err| {
        warn!(error = %err, "JSON encoding failed");
        DtoError::SerializationError(err.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::value::attributes;
    use crate::model::{LegacyModel, ProductFeatureDto};
    use rstest::rstest;
    use serde_json::json;
    use std::sync::Arc;

    fn nested_feature(levels: usize) -> Value {
        let mut feature = json!({"name": format!("level {levels}")});
        for level in (0..levels).rev() {
            feature = json!({"name": format!("level {level}"), "subFeatures": [feature]});
        }
        feature.into()
    }

    #[test]
    fn depth_drops_once_per_dto_level() {
        let Value::Map(raw) = nested_feature(4) else {
            panic!("expected a map");
        };
        let feature = ProductFeatureDto::new(raw).unwrap();
        let out = Value::Map(feature.to_array(2));

        let child = &out.get("subFeatures").unwrap().as_items().unwrap()[0];
        assert_eq!(child.get("name"), Some(&Value::from("level 1")));
        let grandchild = &child.get("subFeatures").unwrap().as_items().unwrap()[0];
        assert_eq!(grandchild, &Value::Map(Attributes::new()));
    }

    #[test]
    fn non_dto_objects_stay_objects() {
        let legacy = Value::model(LegacyModel { foo: "bar".into() });
        let out = cast_output_value(Value::List(vec![legacy.clone()]), 3);
        assert_eq!(out, Value::List(vec![legacy]));
    }

    #[test]
    fn unencodable_values_fail_with_encoder_message() {
        let fields = attributes([("bad", Value::Handle(Arc::new(())))]);
        let err = to_json(&fields, JsonOptions::default()).unwrap_err();
        assert!(err.to_string().starts_with("JSON error:"), "{err}");
    }

    #[rstest]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    #[case(f64::NEG_INFINITY)]
    fn non_finite_floats_fail_to_encode(#[case] value: f64) {
        let fields = attributes([("price", Value::Float(value))]);
        let err = to_json(&fields, JsonOptions::default()).unwrap_err();
        assert!(matches!(err, DtoError::SerializationError(_)));
        assert!(err.to_string().contains("Inf and NaN cannot be JSON encoded"), "{err}");
    }

    #[test]
    fn options_load_from_config() {
        let options: JsonOptions = serde_json::from_value(json!({"pretty": true})).unwrap();
        assert_eq!(options, JsonOptions::pretty());
        let defaults: JsonOptions = serde_json::from_value(json!({})).unwrap();
        assert!(!defaults.pretty);
    }
}
