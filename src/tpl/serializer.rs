use crate::error::TemplateError;
use crate::tpl::value::Value;
use serde::Serialize;
use serde::ser::*;

use std::collections::HashMap;

pub struct ValueSerializer;

impl Serializer for ValueSerializer {
    type Ok = Value;
    type Error = TemplateError;
    type SerializeSeq = ListSerializer;
    type SerializeTuple = ListSerializer;
    type SerializeTupleStruct = ListSerializer;
    type SerializeTupleVariant = ListSerializer;
    type SerializeMap = MapSerializer;
    type SerializeStruct = MapSerializer;
    type SerializeStructVariant = MapSerializer;

    fn serialize_bool(self, v: bool) -> Result<Value, TemplateError> {
        Ok(Value::Bool(v))
    }
    fn serialize_i8(self, v: i8) -> Result<Value, TemplateError> {
        Ok(Value::Int(v as i64))
    }
    fn serialize_i16(self, v: i16) -> Result<Value, TemplateError> {
        Ok(Value::Int(v as i64))
    }
    fn serialize_i32(self, v: i32) -> Result<Value, TemplateError> {
        Ok(Value::Int(v as i64))
    }
    fn serialize_i64(self, v: i64) -> Result<Value, TemplateError> {
        Ok(Value::Int(v))
    }
    fn serialize_u8(self, v: u8) -> Result<Value, TemplateError> {
        Ok(Value::Int(v as i64))
    }
    fn serialize_u16(self, v: u16) -> Result<Value, TemplateError> {
        Ok(Value::Int(v as i64))
    }
    fn serialize_u32(self, v: u32) -> Result<Value, TemplateError> {
        Ok(Value::Int(v as i64))
    }
    fn serialize_u64(self, v: u64) -> Result<Value, TemplateError> {
        i64::try_from(v)
            .map(Value::Int)
            .map_err(|_| TemplateError::Value(format!("integer {} out of range", v)))
    }
    fn serialize_f32(self, v: f32) -> Result<Value, TemplateError> {
        Ok(Value::Float(v as f64))
    }
    fn serialize_f64(self, v: f64) -> Result<Value, TemplateError> {
        Ok(Value::Float(v))
    }
    fn serialize_char(self, v: char) -> Result<Value, TemplateError> {
        Ok(Value::Str(v.to_string()))
    }
    fn serialize_str(self, v: &str) -> Result<Value, TemplateError> {
        Ok(Value::Str(v.to_string()))
    }
    fn serialize_bytes(self, v: &[u8]) -> Result<Value, TemplateError> {
        Ok(Value::List(v.iter().map(|b| Value::Int(*b as i64)).collect()))
    }
    fn serialize_none(self) -> Result<Value, TemplateError> {
        Ok(Value::Null)
    }
    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<Value, TemplateError> {
        value.serialize(self)
    }
    fn serialize_unit(self) -> Result<Value, TemplateError> {
        Ok(Value::Null)
    }
    fn serialize_unit_struct(self, _: &'static str) -> Result<Value, TemplateError> {
        Ok(Value::Null)
    }
    fn serialize_unit_variant(
        self,
        _: &'static str,
        _: u32,
        variant: &'static str,
    ) -> Result<Value, TemplateError> {
        Ok(Value::Str(variant.to_string()))
    }
    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _: &'static str,
        value: &T,
    ) -> Result<Value, TemplateError> {
        value.serialize(self)
    }
    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        value: &T,
    ) -> Result<Value, TemplateError> {
        value.serialize(self)
    }
    fn serialize_seq(self, len: Option<usize>) -> Result<ListSerializer, TemplateError> {
        Ok(ListSerializer {
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }
    fn serialize_tuple(self, len: usize) -> Result<ListSerializer, TemplateError> {
        self.serialize_seq(Some(len))
    }
    fn serialize_tuple_struct(
        self,
        _: &'static str,
        len: usize,
    ) -> Result<ListSerializer, TemplateError> {
        self.serialize_seq(Some(len))
    }
    fn serialize_tuple_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        len: usize,
    ) -> Result<ListSerializer, TemplateError> {
        self.serialize_seq(Some(len))
    }
    fn serialize_map(self, len: Option<usize>) -> Result<MapSerializer, TemplateError> {
        Ok(MapSerializer::with_capacity(len.unwrap_or(0)))
    }
    fn serialize_struct(self, _: &'static str, len: usize) -> Result<MapSerializer, TemplateError> {
        Ok(MapSerializer::with_capacity(len))
    }
    fn serialize_struct_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        len: usize,
    ) -> Result<MapSerializer, TemplateError> {
        Ok(MapSerializer::with_capacity(len))
    }
}

pub struct ListSerializer {
    items: Vec<Value>,
}

macro_rules! impl_serialize_seq {
    ($trait:ident, $method:ident) => {
        impl $trait for ListSerializer {
            type Ok = Value;
            type Error = TemplateError;

            fn $method<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), TemplateError> {
                self.items.push(value.serialize(ValueSerializer)?);
                Ok(())
            }

            fn end(self) -> Result<Value, TemplateError> {
                Ok(Value::List(self.items))
            }
        }
    };
}

impl_serialize_seq!(SerializeSeq, serialize_element);
impl_serialize_seq!(SerializeTuple, serialize_element);
impl_serialize_seq!(SerializeTupleStruct, serialize_field);
impl_serialize_seq!(SerializeTupleVariant, serialize_field);

pub struct MapSerializer {
    map: HashMap<String, Value>,
    key: Option<String>,
}

impl MapSerializer {
    fn with_capacity(len: usize) -> Self {
        MapSerializer {
            map: HashMap::with_capacity(len),
            key: None,
        }
    }
}

impl SerializeMap for MapSerializer {
    type Ok = Value;
    type Error = TemplateError;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<(), TemplateError> {
        match key.serialize(ValueSerializer)? {
            Value::Str(s) => self.key = Some(s),
            Value::Int(i) => self.key = Some(i.to_string()),
            _ => return Err(TemplateError::Value("map key must be a string".into())),
        }
        Ok(())
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), TemplateError> {
        let key = self
            .key
            .take()
            .ok_or_else(|| TemplateError::Value("missing key for map value".into()))?;
        self.map.insert(key, value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value, TemplateError> {
        Ok(Value::Map(self.map))
    }
}

macro_rules! impl_serialize_struct {
    ($trait:ident) => {
        impl $trait for MapSerializer {
            type Ok = Value;
            type Error = TemplateError;

            fn serialize_field<T: ?Sized + Serialize>(
                &mut self,
                key: &'static str,
                value: &T,
            ) -> Result<(), TemplateError> {
                self.map.insert(key.to_string(), value.serialize(ValueSerializer)?);
                Ok(())
            }

            fn end(self) -> Result<Value, TemplateError> {
                Ok(Value::Map(self.map))
            }
        }
    };
}

impl_serialize_struct!(SerializeStruct);
impl_serialize_struct!(SerializeStructVariant);

/// Convert render arguments into a context value.
pub fn to_value<T: ?Sized + Serialize>(t: &T) -> Result<Value, TemplateError> {
    t.serialize(ValueSerializer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Page {
        title: String,
        tags: Vec<&'static str>,
        draft: Option<bool>,
    }

    #[test]
    fn test_struct_to_map() {
        let page = Page {
            title: "Home".into(),
            tags: vec!["a", "b"],
            draft: None,
        };
        let Value::Map(map) = to_value(&page).unwrap() else {
            panic!("Expected Map");
        };
        assert_eq!(map["title"], Value::from("Home"));
        assert_eq!(map["tags"], Value::List(vec![Value::from("a"), Value::from("b")]));
        assert_eq!(map["draft"], Value::Null);
    }

    #[test]
    fn test_unit_is_null() {
        assert_eq!(to_value(&()).unwrap(), Value::Null);
    }

    #[test]
    fn test_u64_overflow() {
        assert!(to_value(&u64::MAX).is_err());
        assert_eq!(to_value(&7u64).unwrap(), Value::Int(7));
    }

    #[test]
    fn test_non_string_key_rejected() {
        let mut m = std::collections::BTreeMap::new();
        m.insert(true, 1);
        assert!(to_value(&m).is_err());
    }
}
