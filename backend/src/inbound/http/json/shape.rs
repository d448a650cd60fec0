//! Typed decoding of an already-parsed JSON tree.
//!
//! `serde_json` reports data errors as opaque messages. Decoding through
//! [`Node`] instead yields a [`ShapeError`] that keeps the offending field
//! path, the unknown key, or the runtime-format marker as data. Struct
//! destinations always reject keys outside their declared field list, but only
//! after every declared field has decoded, so a type mismatch outranks an
//! unknown key.
//!
//! A JSON `null` aimed at a scalar, sequence, map, or struct leaves that
//! destination at its zero value instead of failing. Hints that reach
//! `deserialize_any` (such as `Value` itself) still see the `null`.

use std::fmt;

use serde::de::value::{MapDeserializer, SeqDeserializer, StringDeserializer};
use serde::de::{self, Deserializer, IntoDeserializer, Unexpected, Visitor};
use serde::forward_to_deserialize_any;
use serde_json::{Map, Number, Value};

use crate::domain::INVALID_RUNTIME_FORMAT;

/// Failure raised while mapping a JSON tree onto a destination type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub(super) enum ShapeError {
    /// Wrong JSON type; `path` lists enclosing field names, outermost first.
    #[error("incorrect JSON type at {path:?}")]
    TypeMismatch { path: Vec<String> },
    #[error("unknown field {0:?}")]
    UnknownField(String),
    #[error("invalid runtime format")]
    InvalidRuntimeFormat,
    #[error("{0}")]
    Other(String),
}

impl ShapeError {
    const fn type_mismatch() -> Self {
        Self::TypeMismatch { path: Vec::new() }
    }

    fn within(self, field: &str) -> Self {
        match self {
            Self::TypeMismatch { mut path } => {
                path.insert(0, field.to_owned());
                Self::TypeMismatch { path }
            }
            other => other,
        }
    }
}

impl de::Error for ShapeError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Self::Other(msg.to_string())
    }

    fn invalid_type(_unexp: Unexpected<'_>, _exp: &dyn de::Expected) -> Self {
        Self::type_mismatch()
    }

    fn invalid_value(unexp: Unexpected<'_>, _exp: &dyn de::Expected) -> Self {
        match unexp {
            Unexpected::Other(marker) if marker == INVALID_RUNTIME_FORMAT => {
                Self::InvalidRuntimeFormat
            }
            _ => Self::type_mismatch(),
        }
    }

    fn invalid_length(_len: usize, _exp: &dyn de::Expected) -> Self {
        Self::type_mismatch()
    }

    fn unknown_field(field: &str, _expected: &'static [&'static str]) -> Self {
        Self::UnknownField(field.to_owned())
    }
}

/// Hinted entry points that turn `null` into the hinted type's zero value.
macro_rules! zero_on_null {
    ($($method:ident => $visit:ident($zero:expr);)*) => {
        $(
            fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, ShapeError> {
                match self.0 {
                    Value::Null => visitor.$visit($zero),
                    other => Self(other).deserialize_any(visitor),
                }
            }
        )*
    };
}

/// Hinted entry points that defer to [`Node`] under the field's scope.
macro_rules! scoped_hints {
    ($($method:ident)*) => {
        $(
            fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, ShapeError> {
                self.scoped(|node| node.$method(visitor))
            }
        )*
    };
}

/// Deserializer over an owned JSON value.
pub(super) struct Node(pub(super) Value);

impl<'de> IntoDeserializer<'de, ShapeError> for Node {
    type Deserializer = Self;

    fn into_deserializer(self) -> Self {
        self
    }
}

impl<'de> Deserializer<'de> for Node {
    type Error = ShapeError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, ShapeError> {
        match self.0 {
            Value::Null => visitor.visit_unit(),
            Value::Bool(value) => visitor.visit_bool(value),
            Value::Number(number) => visit_number(&number, visitor),
            Value::String(value) => visitor.visit_string(value),
            Value::Array(items) => visit_array(items, visitor),
            Value::Object(entries) => visit_object(entries, visitor),
        }
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, ShapeError> {
        match self.0 {
            Value::Null => visitor.visit_none(),
            other => visitor.visit_some(Self(other)),
        }
    }

    zero_on_null! {
        deserialize_bool => visit_bool(false);
        deserialize_i8 => visit_i64(0);
        deserialize_i16 => visit_i64(0);
        deserialize_i32 => visit_i64(0);
        deserialize_i64 => visit_i64(0);
        deserialize_i128 => visit_i64(0);
        deserialize_u8 => visit_u64(0);
        deserialize_u16 => visit_u64(0);
        deserialize_u32 => visit_u64(0);
        deserialize_u64 => visit_u64(0);
        deserialize_u128 => visit_u64(0);
        deserialize_f32 => visit_f64(0.0);
        deserialize_f64 => visit_f64(0.0);
        deserialize_str => visit_string(String::new());
        deserialize_string => visit_string(String::new());
        deserialize_bytes => visit_byte_buf(Vec::new());
        deserialize_byte_buf => visit_byte_buf(Vec::new());
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, ShapeError> {
        match self.0 {
            Value::Null => visit_array(Vec::new(), visitor),
            other => Self(other).deserialize_any(visitor),
        }
    }

    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, ShapeError> {
        match self.0 {
            Value::Null => visit_object(Map::new(), visitor),
            other => Self(other).deserialize_any(visitor),
        }
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, ShapeError> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, ShapeError> {
        let entries = match self.0 {
            Value::Object(entries) => entries,
            Value::Null => Map::new(),
            _ => return Err(ShapeError::type_mismatch()),
        };
        let (known, unknown): (Map<String, Value>, Map<String, Value>) = entries
            .into_iter()
            .partition(|(key, _)| fields.contains(&key.as_str()));
        let value = visit_object(known, visitor)?;
        match unknown.into_iter().next() {
            Some((key, _)) => Err(ShapeError::UnknownField(key)),
            None => Ok(value),
        }
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, ShapeError> {
        match self.0 {
            Value::String(variant) => {
                let access: StringDeserializer<ShapeError> = variant.into_deserializer();
                visitor.visit_enum(access)
            }
            other => Self(other).deserialize_any(visitor),
        }
    }

    forward_to_deserialize_any! {
        char unit unit_struct tuple tuple_struct identifier ignored_any
    }
}

/// Object member that prefixes type mismatches with its own name.
struct Field {
    name: String,
    value: Value,
}

impl Field {
    fn scoped<T>(self, decode: impl FnOnce(Node) -> Result<T, ShapeError>) -> Result<T, ShapeError> {
        let Self { name, value } = self;
        decode(Node(value)).map_err(|error| error.within(&name))
    }
}

impl<'de> IntoDeserializer<'de, ShapeError> for Field {
    type Deserializer = Self;

    fn into_deserializer(self) -> Self {
        self
    }
}

impl<'de> Deserializer<'de> for Field {
    type Error = ShapeError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, ShapeError> {
        self.scoped(|node| node.deserialize_any(visitor))
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, ShapeError> {
        self.scoped(|node| node.deserialize_option(visitor))
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        visitor: V,
    ) -> Result<V::Value, ShapeError> {
        self.scoped(|node| node.deserialize_newtype_struct(name, visitor))
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, ShapeError> {
        self.scoped(|node| node.deserialize_struct(name, fields, visitor))
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, ShapeError> {
        self.scoped(|node| node.deserialize_enum(name, variants, visitor))
    }

    scoped_hints! {
        deserialize_bool deserialize_i8 deserialize_i16 deserialize_i32 deserialize_i64
        deserialize_i128 deserialize_u8 deserialize_u16 deserialize_u32 deserialize_u64
        deserialize_u128 deserialize_f32 deserialize_f64 deserialize_str deserialize_string
        deserialize_bytes deserialize_byte_buf deserialize_seq deserialize_map
    }

    forward_to_deserialize_any! {
        char unit unit_struct tuple tuple_struct identifier ignored_any
    }
}

fn visit_number<'de, V: Visitor<'de>>(number: &Number, visitor: V) -> Result<V::Value, ShapeError> {
    if let Some(value) = number.as_u64() {
        visitor.visit_u64(value)
    } else if let Some(value) = number.as_i64() {
        visitor.visit_i64(value)
    } else if let Some(value) = number.as_f64() {
        visitor.visit_f64(value)
    } else {
        Err(ShapeError::Other(format!("unrepresentable number {number}")))
    }
}

fn visit_array<'de, V: Visitor<'de>>(items: Vec<Value>, visitor: V) -> Result<V::Value, ShapeError> {
    let mut seq: SeqDeserializer<_, ShapeError> = SeqDeserializer::new(items.into_iter().map(Node));
    let value = visitor.visit_seq(&mut seq)?;
    seq.end()?;
    Ok(value)
}

fn visit_object<'de, V: Visitor<'de>>(
    entries: Map<String, Value>,
    visitor: V,
) -> Result<V::Value, ShapeError> {
    let mut map: MapDeserializer<'de, _, ShapeError> = MapDeserializer::new(
        entries
            .into_iter()
            .map(|(name, value)| (name.clone(), Field { name, value })),
    );
    let value = visitor.visit_map(&mut map)?;
    map.end()?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde::de::DeserializeOwned;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Inner {
        count: u8,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Outer {
        label: String,
        inner: Inner,
        tags: Vec<String>,
    }

    fn shape<T: DeserializeOwned>(value: Value) -> Result<T, ShapeError> {
        T::deserialize(Node(value))
    }

    #[test]
    fn nested_mismatch_reports_full_path() {
        let result = shape::<Outer>(json!({
            "label": "x",
            "inner": { "count": "three" },
            "tags": [],
        }));
        assert_eq!(
            result,
            Err(ShapeError::TypeMismatch {
                path: vec!["inner".to_owned(), "count".to_owned()]
            })
        );
    }

    #[test]
    fn sequence_element_mismatch_reports_enclosing_field() {
        let result = shape::<Outer>(json!({
            "label": "x",
            "inner": { "count": 3 },
            "tags": ["a", 1],
        }));
        assert_eq!(
            result,
            Err(ShapeError::TypeMismatch {
                path: vec!["tags".to_owned()]
            })
        );
    }

    #[test]
    fn out_of_range_integer_is_a_type_mismatch() {
        let result = shape::<Inner>(json!({ "count": 300 }));
        assert_eq!(
            result,
            Err(ShapeError::TypeMismatch {
                path: vec!["count".to_owned()]
            })
        );
    }

    #[test]
    fn undeclared_keys_are_rejected_at_any_depth() {
        let result = shape::<Outer>(json!({
            "label": "x",
            "inner": { "count": 3, "extra": true },
            "tags": [],
        }));
        assert_eq!(result, Err(ShapeError::UnknownField("extra".to_owned())));
    }

    #[test]
    fn mismatch_in_nested_struct_outranks_outer_unknown_key() {
        let result = shape::<Outer>(json!({
            "aaa": 1,
            "label": "x",
            "inner": { "count": "three" },
            "tags": [],
        }));
        assert_eq!(
            result,
            Err(ShapeError::TypeMismatch {
                path: vec!["inner".to_owned(), "count".to_owned()]
            })
        );
    }

    #[test]
    fn null_scalars_and_structs_take_zero_values() {
        let decoded = shape::<Outer>(json!({
            "label": null,
            "inner": null,
            "tags": null,
        }));
        assert_eq!(decoded, Err(ShapeError::Other("missing field `count`".to_owned())));

        let inner = shape::<Inner>(json!({ "count": null })).expect("null count decodes");
        assert_eq!(inner, Inner { count: 0 });
    }

    #[test]
    fn null_reaches_untyped_destinations_unchanged() {
        let decoded = shape::<Value>(Value::Null).expect("null decodes");
        assert_eq!(decoded, Value::Null);
    }

    #[test]
    fn well_shaped_tree_decodes() {
        let decoded = shape::<Outer>(json!({
            "label": "x",
            "inner": { "count": 3 },
            "tags": ["a"],
        }))
        .expect("decodes");
        assert_eq!(decoded.inner, Inner { count: 3 });
    }
}
