//! Log-ready descriptions of argument and return values
//!
//! A value is described once, by its type, as one of a few shapes. The
//! redactor decides how each shape is rendered: custom representations are
//! trusted verbatim, text is scanned for embedded `name=value` secrets and
//! structured values are rendered field by field with sensitive fields left
//! out.

use crate::constants::UNRENDERABLE;
use serde::Serialize;
use std::borrow::Cow;
use std::fmt::{self, Write};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum LogValue {
    /// Absent value
    Null,
    /// Number, boolean or character
    Primitive(String),
    /// Free text, may embed `name=value` pairs
    Text(String),
    /// Representation chosen by the type's author, used as-is
    Custom(String),
    /// Named fields of a record type
    Structured(Structured),
    /// Sequence of values
    List(Vec<LogValue>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Structured {
    pub type_name: String,
    pub fields: Vec<(String, LogValue)>,
}

impl LogValue {
    pub fn primitive(value: impl fmt::Display) -> Self {
        LogValue::Primitive(value.to_string())
    }

    pub fn text(value: impl Into<String>) -> Self {
        LogValue::Text(value.into())
    }

    /// Use the value's `Display` output verbatim.
    ///
    /// An implementation that reports a formatting error yields the
    /// unrenderable placeholder instead of panicking.
    pub fn custom(value: &dyn fmt::Display) -> Self {
        let mut out = String::new();
        match write!(out, "{value}") {
            Ok(()) => LogValue::Custom(out),
            Err(_) => LogValue::Custom(UNRENDERABLE.to_string()),
        }
    }

    /// Describe `value` ahead of the call it belongs to. A panic raised while
    /// describing yields the unrenderable placeholder.
    pub fn describe(value: &dyn Loggable) -> Self {
        std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| value.to_log_value()))
            .unwrap_or_else(|_| LogValue::Custom(UNRENDERABLE.to_string()))
    }

    /// Start describing a record type field by field
    pub fn structured(type_name: impl Into<String>) -> StructuredBuilder {
        StructuredBuilder {
            inner: Structured {
                type_name: type_name.into(),
                fields: Vec::new(),
            },
        }
    }

    /// Describe any serde-serializable value, named after its type.
    ///
    /// Objects become structured values so their field names are visible to
    /// the redactor.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Self {
        let type_name = short_type_name(std::any::type_name::<T>());
        match serde_json::to_value(value) {
            Ok(json) => Self::from_json(type_name, json),
            Err(_) => LogValue::Custom(UNRENDERABLE.to_string()),
        }
    }

    fn from_json(type_name: &str, json: serde_json::Value) -> Self {
        use serde_json::Value;

        match json {
            Value::Null => LogValue::Null,
            Value::Bool(b) => LogValue::primitive(b),
            Value::Number(n) => LogValue::primitive(n),
            Value::String(s) => LogValue::Text(s),
            Value::Array(items) => LogValue::List(
                items
                    .into_iter()
                    .map(|item| Self::from_json("Object", item))
                    .collect(),
            ),
            Value::Object(map) => LogValue::Structured(Structured {
                type_name: type_name.to_string(),
                fields: map
                    .into_iter()
                    .map(|(name, value)| (name, Self::from_json("Object", value)))
                    .collect(),
            }),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, LogValue::Null)
    }
}

pub struct StructuredBuilder {
    inner: Structured,
}

impl StructuredBuilder {
    pub fn field(mut self, name: impl Into<String>, value: &dyn Loggable) -> Self {
        self.inner.fields.push((name.into(), value.to_log_value()));
        self
    }

    pub fn build(self) -> LogValue {
        LogValue::Structured(self.inner)
    }
}

/// Last path segment of a type name, without generic arguments
pub fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Types that can describe themselves for call logging
pub trait Loggable: Sync {
    fn to_log_value(&self) -> LogValue;
}

macro_rules! primitive_loggable {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Loggable for $ty {
                fn to_log_value(&self) -> LogValue {
                    LogValue::primitive(self)
                }
            }
        )*
    };
}

primitive_loggable!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
);

impl Loggable for str {
    fn to_log_value(&self) -> LogValue {
        LogValue::Text(self.to_string())
    }
}

impl Loggable for String {
    fn to_log_value(&self) -> LogValue {
        LogValue::Text(self.clone())
    }
}

impl Loggable for Cow<'_, str> {
    fn to_log_value(&self) -> LogValue {
        LogValue::Text(self.to_string())
    }
}

impl Loggable for () {
    fn to_log_value(&self) -> LogValue {
        LogValue::Null
    }
}

impl Loggable for LogValue {
    fn to_log_value(&self) -> LogValue {
        self.clone()
    }
}

impl<T: Loggable> Loggable for Option<T> {
    fn to_log_value(&self) -> LogValue {
        match self {
            Some(value) => value.to_log_value(),
            None => LogValue::Null,
        }
    }
}

impl<T: Loggable> Loggable for [T] {
    fn to_log_value(&self) -> LogValue {
        LogValue::List(self.iter().map(Loggable::to_log_value).collect())
    }
}

impl<T: Loggable> Loggable for Vec<T> {
    fn to_log_value(&self) -> LogValue {
        self.as_slice().to_log_value()
    }
}

impl<T: Loggable + ?Sized> Loggable for &T {
    fn to_log_value(&self) -> LogValue {
        (**self).to_log_value()
    }
}

impl<T: Loggable + ?Sized> Loggable for Box<T> {
    fn to_log_value(&self) -> LogValue {
        (**self).to_log_value()
    }
}

impl<T: Loggable + Send + ?Sized> Loggable for Arc<T> {
    fn to_log_value(&self) -> LogValue {
        (**self).to_log_value()
    }
}
