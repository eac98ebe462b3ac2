use crate::document::{Document, ObjectId, Value};
use crate::errors::{DocMapError, DocMapResult, ErrorKind};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::str::FromStr;
use uuid::Uuid;

fn mapping_error(message: String) -> DocMapError {
    log::error!("{}", message);
    DocMapError::new(message, ErrorKind::Mapping)
}

/// Converts a Rust value to and from its [Value] form.
///
/// Decoding is lenient for scalars: a numeric variant of any width
/// decodes into any numeric target that can hold it, strings parse into
/// the scalar types, and [Value::Null] decodes into the type's zero
/// value. Conversions that would lose meaning, such as decoding a
/// document into an integer, fail with a mapping error.
pub trait Codec: Sized {
    /// Encodes this value into its [Value] form.
    fn encode(&self) -> DocMapResult<Value>;

    /// Decodes a value from its [Value] form.
    fn decode(value: &Value) -> DocMapResult<Self>;
}

/// Encodes a value into its [Value] form.
pub fn encode<T: Codec>(value: &T) -> DocMapResult<Value> {
    value.encode()
}

/// Decodes a value from its [Value] form.
pub fn decode<T: Codec>(value: &Value) -> DocMapResult<T> {
    T::decode(value)
}

impl Codec for Value {
    fn encode(&self) -> DocMapResult<Value> {
        Ok(self.clone())
    }

    fn decode(value: &Value) -> DocMapResult<Self> {
        Ok(value.clone())
    }
}

impl Codec for bool {
    fn encode(&self) -> DocMapResult<Value> {
        Ok(Value::Bool(*self))
    }

    fn decode(value: &Value) -> DocMapResult<Self> {
        match value {
            Value::Null => Ok(false),
            Value::Bool(v) => Ok(*v),
            Value::String(s) => Ok(s.parse::<bool>()?),
            v if v.is_integer() => Ok(v.as_integer() != Some(0)),
            other => Err(mapping_error(format!("cannot decode {:?} as bool", other))),
        }
    }
}

impl Codec for i64 {
    fn encode(&self) -> DocMapResult<Value> {
        Ok(Value::I64(*self))
    }

    fn decode(value: &Value) -> DocMapResult<Self> {
        match value {
            Value::Null => Ok(0),
            Value::String(s) => Ok(s.parse::<i64>()?),
            v => {
                if let Some(i) = v.as_integer() {
                    Ok(i)
                } else if let Some(d) = v.as_decimal() {
                    Ok(d as i64)
                } else {
                    Err(mapping_error(format!("cannot decode {:?} as i64", v)))
                }
            }
        }
    }
}

impl Codec for i32 {
    fn encode(&self) -> DocMapResult<Value> {
        Ok(Value::I32(*self))
    }

    fn decode(value: &Value) -> DocMapResult<Self> {
        let wide = i64::decode(value)?;
        i32::try_from(wide)
            .map_err(|_| mapping_error(format!("value {} does not fit in i32", wide)))
    }
}

impl Codec for f64 {
    fn encode(&self) -> DocMapResult<Value> {
        Ok(Value::F64(*self))
    }

    fn decode(value: &Value) -> DocMapResult<Self> {
        match value {
            Value::Null => Ok(0.0),
            Value::String(s) => Ok(s.parse::<f64>()?),
            v => {
                if let Some(d) = v.as_decimal() {
                    Ok(d)
                } else if let Some(i) = v.as_integer() {
                    Ok(i as f64)
                } else {
                    Err(mapping_error(format!("cannot decode {:?} as f64", v)))
                }
            }
        }
    }
}

impl Codec for f32 {
    fn encode(&self) -> DocMapResult<Value> {
        Ok(Value::F32(*self))
    }

    fn decode(value: &Value) -> DocMapResult<Self> {
        Ok(f64::decode(value)? as f32)
    }
}

impl Codec for char {
    fn encode(&self) -> DocMapResult<Value> {
        Ok(Value::Char(*self))
    }

    fn decode(value: &Value) -> DocMapResult<Self> {
        match value {
            Value::Null => Ok('\0'),
            Value::Char(c) => Ok(*c),
            Value::String(s) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(c),
                    _ => Err(mapping_error(format!(
                        "cannot decode string \"{}\" as char",
                        s
                    ))),
                }
            }
            other => Err(mapping_error(format!("cannot decode {:?} as char", other))),
        }
    }
}

impl Codec for String {
    fn encode(&self) -> DocMapResult<Value> {
        Ok(Value::String(self.clone()))
    }

    fn decode(value: &Value) -> DocMapResult<Self> {
        match value {
            Value::Null => Ok(String::new()),
            Value::String(s) => Ok(s.clone()),
            Value::Bool(v) => Ok(v.to_string()),
            Value::Char(c) => Ok(c.to_string()),
            Value::DateTime(v) => Ok(v.to_rfc3339()),
            Value::ObjectId(v) => Ok(v.to_hex()),
            // Numbers, arrays and documents all stringify through Display.
            v => Ok(v.to_string()),
        }
    }
}

impl Codec for DateTime<Utc> {
    fn encode(&self) -> DocMapResult<Value> {
        Ok(Value::DateTime(*self))
    }

    fn decode(value: &Value) -> DocMapResult<Self> {
        match value {
            Value::Null => Ok(DateTime::UNIX_EPOCH),
            Value::DateTime(v) => Ok(*v),
            Value::String(s) => DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| {
                    mapping_error(format!("cannot decode \"{}\" as date time: {}", s, e))
                }),
            other => Err(mapping_error(format!(
                "cannot decode {:?} as date time",
                other
            ))),
        }
    }
}

impl Codec for ObjectId {
    fn encode(&self) -> DocMapResult<Value> {
        Ok(Value::ObjectId(*self))
    }

    fn decode(value: &Value) -> DocMapResult<Self> {
        match value {
            Value::Null => Ok(ObjectId::ZERO),
            Value::ObjectId(v) => Ok(*v),
            Value::String(s) => ObjectId::parse_str(s),
            other => Err(mapping_error(format!(
                "cannot decode {:?} as object id",
                other
            ))),
        }
    }
}

// Uuids travel as their canonical string form.
impl Codec for Uuid {
    fn encode(&self) -> DocMapResult<Value> {
        Ok(Value::String(self.to_string()))
    }

    fn decode(value: &Value) -> DocMapResult<Self> {
        match value {
            Value::Null => Ok(Uuid::nil()),
            Value::String(s) => Uuid::parse_str(s)
                .map_err(|e| mapping_error(format!("cannot decode \"{}\" as uuid: {}", s, e))),
            other => Err(mapping_error(format!("cannot decode {:?} as uuid", other))),
        }
    }
}

impl<T: Codec> Codec for Option<T> {
    fn encode(&self) -> DocMapResult<Value> {
        match self {
            Some(v) => v.encode(),
            None => Ok(Value::Null),
        }
    }

    fn decode(value: &Value) -> DocMapResult<Self> {
        match value {
            Value::Null => Ok(None),
            v => Ok(Some(T::decode(v)?)),
        }
    }
}

impl<T: Codec> Codec for Vec<T> {
    fn encode(&self) -> DocMapResult<Value> {
        let items = self
            .iter()
            .map(|v| v.encode())
            .collect::<DocMapResult<Vec<Value>>>()?;
        Ok(Value::Array(items))
    }

    fn decode(value: &Value) -> DocMapResult<Self> {
        match value {
            Value::Null => Ok(Vec::new()),
            Value::Array(items) => items.iter().map(T::decode).collect(),
            other => Err(mapping_error(format!("cannot decode {:?} as array", other))),
        }
    }
}

fn encode_map<'a, K, V, I>(entries: I) -> DocMapResult<Value>
where
    K: ToString + 'a,
    V: Codec + 'a,
    I: Iterator<Item = (&'a K, &'a V)>,
{
    let mut doc = Document::new();
    for (key, value) in entries {
        doc.put(key.to_string(), value.encode()?)?;
    }
    Ok(Value::Document(doc))
}

fn decode_map_entries<K, V>(value: &Value) -> DocMapResult<Vec<(K, V)>>
where
    K: FromStr,
    V: Codec,
{
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Document(doc) => {
            let mut entries = Vec::with_capacity(doc.len());
            for (key, item) in doc.iter() {
                let key = K::from_str(key).map_err(|_| {
                    mapping_error(format!("cannot decode map key \"{}\"", key))
                })?;
                entries.push((key, V::decode(item)?));
            }
            Ok(entries)
        }
        other => Err(mapping_error(format!("cannot decode {:?} as map", other))),
    }
}

impl<K, V> Codec for BTreeMap<K, V>
where
    K: ToString + FromStr + Ord,
    V: Codec,
{
    fn encode(&self) -> DocMapResult<Value> {
        encode_map(self.iter())
    }

    fn decode(value: &Value) -> DocMapResult<Self> {
        Ok(decode_map_entries(value)?.into_iter().collect())
    }
}

impl<K, V> Codec for HashMap<K, V>
where
    K: ToString + FromStr + Eq + Hash,
    V: Codec,
{
    fn encode(&self) -> DocMapResult<Value> {
        encode_map(self.iter())
    }

    fn decode(value: &Value) -> DocMapResult<Self> {
        Ok(decode_map_entries(value)?.into_iter().collect())
    }
}

/// Implements [Codec] for a fieldless enum, storing each variant under a
/// string name. Unknown names fail with a mapping error; [Value::Null]
/// decodes to the enum's [Default] variant.
///
/// # Examples
///
/// ```rust
/// use docmap::codec_enum;
///
/// #[derive(Debug, Default, PartialEq)]
/// enum Status {
///     #[default]
///     Active,
///     Suspended,
/// }
///
/// codec_enum!(Status {
///     Active => "active",
///     Suspended => "suspended",
/// });
/// ```
#[macro_export]
macro_rules! codec_enum {
    ($ty:ident { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $crate::mapper::Codec for $ty {
            fn encode(&self) -> $crate::errors::DocMapResult<$crate::document::Value> {
                match self {
                    $( $ty::$variant => Ok($crate::document::Value::String($name.to_string())), )+
                }
            }

            fn decode(
                value: &$crate::document::Value,
            ) -> $crate::errors::DocMapResult<Self> {
                match value {
                    $crate::document::Value::Null => Ok(<$ty as Default>::default()),
                    $crate::document::Value::String(s) => match s.as_str() {
                        $( $name => Ok($ty::$variant), )+
                        other => Err($crate::errors::DocMapError::new(
                            format!(
                                "unknown {} variant \"{}\"",
                                stringify!($ty),
                                other
                            ),
                            $crate::errors::ErrorKind::Mapping,
                        )),
                    },
                    other => Err($crate::errors::DocMapError::new(
                        format!("cannot decode {:?} as {}", other, stringify!($ty)),
                        $crate::errors::ErrorKind::Mapping,
                    )),
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_round_trips() {
        assert_eq!(i64::decode(&42i64.encode().unwrap()).unwrap(), 42);
        assert_eq!(i32::decode(&7i32.encode().unwrap()).unwrap(), 7);
        assert_eq!(f64::decode(&2.5f64.encode().unwrap()).unwrap(), 2.5);
        assert!(bool::decode(&true.encode().unwrap()).unwrap());
        assert_eq!(char::decode(&'x'.encode().unwrap()).unwrap(), 'x');
        assert_eq!(
            String::decode(&"hello".to_string().encode().unwrap()).unwrap(),
            "hello"
        );
    }

    #[test]
    fn test_null_decodes_to_zero_values() {
        assert_eq!(i64::decode(&Value::Null).unwrap(), 0);
        assert_eq!(i32::decode(&Value::Null).unwrap(), 0);
        assert_eq!(f64::decode(&Value::Null).unwrap(), 0.0);
        assert!(!bool::decode(&Value::Null).unwrap());
        assert_eq!(String::decode(&Value::Null).unwrap(), "");
        assert_eq!(Vec::<i64>::decode(&Value::Null).unwrap(), Vec::<i64>::new());
        assert_eq!(
            DateTime::<Utc>::decode(&Value::Null).unwrap(),
            DateTime::UNIX_EPOCH
        );
    }

    #[test]
    fn test_numeric_width_coercion() {
        assert_eq!(i64::decode(&Value::I32(42)).unwrap(), 42);
        assert_eq!(i32::decode(&Value::I64(42)).unwrap(), 42);
        assert_eq!(f64::decode(&Value::F32(2.5)).unwrap(), 2.5);
        assert_eq!(f64::decode(&Value::I64(3)).unwrap(), 3.0);
    }

    #[test]
    fn test_i32_overflow_is_mapping_error() {
        let result = i32::decode(&Value::I64(i64::MAX));
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().kind(), &ErrorKind::Mapping);
    }

    #[test]
    fn test_string_parses_into_scalars() {
        assert_eq!(i64::decode(&Value::from("42")).unwrap(), 42);
        assert_eq!(f64::decode(&Value::from("2.5")).unwrap(), 2.5);
        assert!(bool::decode(&Value::from("true")).unwrap());
    }

    #[test]
    fn test_scalars_stringify() {
        assert_eq!(String::decode(&Value::I64(42)).unwrap(), "42");
        assert_eq!(String::decode(&Value::Bool(true)).unwrap(), "true");
    }

    #[test]
    fn test_composites_stringify() {
        let array = Value::Array(vec![Value::I64(1), Value::I64(2)]);
        assert_eq!(String::decode(&array).unwrap(), "[1, 2]");

        let mut doc = Document::new();
        doc.put("name", "alice").unwrap();
        assert_eq!(
            String::decode(&Value::Document(doc)).unwrap(),
            "{\"name\": \"alice\"}"
        );
    }

    #[test]
    fn test_unparseable_string_is_error() {
        assert!(i64::decode(&Value::from("not a number")).is_err());
        assert!(bool::decode(&Value::from("not a bool")).is_err());
    }

    #[test]
    fn test_composite_into_scalar_is_mapping_error() {
        let doc_value = Value::Document(Document::new());
        let result = i64::decode(&doc_value);
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().kind(), &ErrorKind::Mapping);
    }

    #[test]
    fn test_option_round_trip() {
        let some = Some(42i64);
        assert_eq!(Option::<i64>::decode(&some.encode().unwrap()).unwrap(), some);
        let none: Option<i64> = None;
        assert_eq!(none.encode().unwrap(), Value::Null);
        assert_eq!(Option::<i64>::decode(&Value::Null).unwrap(), None);
    }

    #[test]
    fn test_vec_round_trip() {
        let tags = vec!["a".to_string(), "b".to_string()];
        let encoded = tags.encode().unwrap();
        assert_eq!(Vec::<String>::decode(&encoded).unwrap(), tags);
    }

    #[test]
    fn test_date_time_round_trip() {
        let now = Utc::now();
        let encoded = now.encode().unwrap();
        assert_eq!(DateTime::<Utc>::decode(&encoded).unwrap(), now);
    }

    #[test]
    fn test_date_time_from_string() {
        let decoded =
            DateTime::<Utc>::decode(&Value::from("2024-01-15T10:30:00Z")).unwrap();
        assert_eq!(decoded.to_rfc3339(), "2024-01-15T10:30:00+00:00");
    }

    #[test]
    fn test_uuid_travels_as_string() {
        let id = Uuid::new_v4();
        let encoded = id.encode().unwrap();
        assert!(encoded.is_string());
        assert_eq!(Uuid::decode(&encoded).unwrap(), id);
        assert_eq!(Uuid::decode(&Value::Null).unwrap(), Uuid::nil());
    }

    #[test]
    fn test_object_id_from_string() {
        let id = ObjectId::new();
        let decoded = ObjectId::decode(&Value::from(id.to_hex())).unwrap();
        assert_eq!(decoded, id);
    }

    #[test]
    fn test_map_round_trip() {
        let mut scores = BTreeMap::new();
        scores.insert("alice".to_string(), 10i64);
        scores.insert("bob".to_string(), 20i64);
        let encoded = scores.encode().unwrap();
        assert!(encoded.is_document());
        assert_eq!(BTreeMap::<String, i64>::decode(&encoded).unwrap(), scores);
    }

    #[derive(Debug, Default, PartialEq)]
    enum Status {
        #[default]
        Active,
        Suspended,
    }

    codec_enum!(Status {
        Active => "active",
        Suspended => "suspended",
    });

    #[test]
    fn test_enum_round_trip() {
        let encoded = Status::Suspended.encode().unwrap();
        assert_eq!(encoded, Value::from("suspended"));
        assert_eq!(Status::decode(&encoded).unwrap(), Status::Suspended);
    }

    #[test]
    fn test_enum_unknown_variant_is_mapping_error() {
        let result = Status::decode(&Value::from("archived"));
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().kind(), &ErrorKind::Mapping);
    }

    #[test]
    fn test_enum_null_decodes_to_default() {
        assert_eq!(Status::decode(&Value::Null).unwrap(), Status::Active);
    }
}
